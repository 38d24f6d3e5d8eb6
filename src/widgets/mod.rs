pub mod coordinate_picker;
pub mod create_form;
pub mod page;
pub mod search_select;

pub use coordinate_picker::{CoordinatePicker, CoordinatePickerView, PickerMode};
pub use create_form::{CreateFormView, EntityCreateForm};
pub use page::{PageHost, Toast};
pub use search_select::{
    ListContent, SearchPhase, SearchSelect, SearchSelectEvent, SearchSelectView,
};
