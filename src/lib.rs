pub mod adapters;
pub mod config;
pub mod domain;
pub mod utils;
pub mod widgets;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{HttpUserDirectory, HeadlessMapProvider};
pub use config::{toml_config::TomlConfig, WidgetConfig};
pub use domain::model::{Candidate, Coordinate, CreatedUser, FormField, Selection};
pub use utils::error::{Result, WidgetError};
pub use widgets::{CoordinatePicker, EntityCreateForm, PageHost, SearchSelect};
