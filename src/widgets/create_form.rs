use crate::config::{CoordinatePickerConfig, CreateFormConfig};
use crate::domain::model::{Coordinate, CreatedUser, FormDraft, FormField};
use crate::domain::ports::{CreateUserRequest, GeolocationProvider, MapProvider, UserDirectory};
use crate::utils::error::{ErrorCategory, Result, WidgetError};
use crate::utils::text::derive_username;
use crate::widgets::coordinate_picker::CoordinatePicker;
use crate::widgets::page::PageHost;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFormView {
    pub visible: bool,
    pub title: String,
    pub fields: Vec<(FormField, String)>,
    pub focused: Option<FormField>,
    pub submit_label: String,
    pub submit_enabled: bool,
    pub error: Option<String>,
    pub location_text: Option<String>,
    pub coordinates_text: Option<String>,
}

#[derive(Debug, Default)]
struct FormState {
    draft: FormDraft,
    /// 使用者名稱目前是否為自動產生
    username_auto: bool,
    /// 使用者手動修改過使用者名稱 (此對話框內永久有效)
    username_edited: bool,
    location: Option<Coordinate>,
    visible: bool,
    submitting: bool,
    error: Option<String>,
    focused: Option<FormField>,
    /// 每次關閉對話框時遞增，用來丟棄舊請求的結果
    generation: u64,
}

impl FormState {
    fn reset(&mut self) {
        self.draft.reset();
        self.username_auto = false;
        self.username_edited = false;
        self.location = None;
        self.error = None;
        self.focused = None;
    }
}

/// 建立使用者的對話框。
///
/// All methods take `&self` so the host can keep rendering [`view`](Self::view)
/// while a submission is in flight.
pub struct EntityCreateForm<D: UserDirectory> {
    directory: Arc<D>,
    config: CreateFormConfig,
    picker_config: CoordinatePickerConfig,
    page: Arc<PageHost>,
    map_provider: Option<Arc<dyn MapProvider>>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    state: Mutex<FormState>,
}

impl<D: UserDirectory> EntityCreateForm<D> {
    pub fn new(
        directory: Arc<D>,
        config: CreateFormConfig,
        picker_config: CoordinatePickerConfig,
        page: Arc<PageHost>,
    ) -> Self {
        Self {
            directory,
            config,
            picker_config,
            page,
            map_provider: None,
            geolocation: None,
            state: Mutex::new(FormState::default()),
        }
    }

    /// 位置選擇器使用的地圖與定位服務
    pub fn with_map(
        mut self,
        map_provider: Option<Arc<dyn MapProvider>>,
        geolocation: Option<Arc<dyn GeolocationProvider>>,
    ) -> Self {
        self.map_provider = map_provider;
        self.geolocation = geolocation;
        self
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 顯示對話框並鎖定頁面捲動；等待版面穩定後聚焦第一個欄位
    pub async fn show(&self) {
        {
            let mut state = self.state();
            if !state.visible {
                state.visible = true;
                self.page.lock_scroll();
            }
        }

        tokio::time::sleep(self.config.focus_delay()).await;

        let mut state = self.state();
        if state.visible {
            state.focused = Some(FormField::FirstName);
        }
    }

    /// Closes the modal, resets every field and clears errors.
    pub fn hide(&self) {
        let mut state = self.state();
        if state.visible {
            state.visible = false;
            self.page.unlock_scroll();
        }
        state.reset();
        state.generation += 1;
        state.submitting = false;
    }

    /// Cancel button and overlay click.
    pub fn cancel(&self) {
        self.hide();
    }

    pub fn destroy(self) {
        if self.state().visible {
            self.page.unlock_scroll();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    /// Keystroke in one of the visible fields.
    pub fn set_field(&self, field: FormField, value: &str) {
        let mut state = self.state();
        match field {
            FormField::Latitude | FormField::Longitude => {
                tracing::debug!("Ignoring direct edit of hidden field {:?}", field);
            }
            FormField::Username => {
                state.draft.set(field, value);
                state.username_auto = false;
                state.username_edited = true;
            }
            FormField::FirstName | FormField::LastName => {
                state.draft.set(field, value);
                if !state.username_edited {
                    if let Some(username) = derive_username(
                        state.draft.get(FormField::FirstName),
                        state.draft.get(FormField::LastName),
                    ) {
                        state.draft.set(FormField::Username, username);
                        state.username_auto = true;
                    }
                }
            }
            _ => state.draft.set(field, value),
        }
    }

    pub fn field(&self, field: FormField) -> String {
        self.state().draft.get(field).to_string()
    }

    pub fn is_username_auto_generated(&self) -> bool {
        self.state().username_auto
    }

    /// Builds a picker for the location field. Feed its confirmed value back
    /// through [`apply_location`](Self::apply_location).
    pub fn open_location_picker(&self) -> CoordinatePicker {
        CoordinatePicker::new(
            self.picker_config.clone(),
            Arc::clone(&self.page),
            self.map_provider.clone(),
            self.geolocation.clone(),
        )
    }

    pub fn apply_location(&self, coordinate: Coordinate) {
        let mut state = self.state();
        state
            .draft
            .set(FormField::Latitude, coordinate.lat.to_string());
        state
            .draft
            .set(FormField::Longitude, coordinate.lng.to_string());
        state.location = Some(coordinate);
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.state().location
    }

    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// 送出表單。成功時關閉對話框、顯示提示訊息並回傳新使用者；
    /// 失敗時保留對話框並顯示錯誤。
    pub async fn submit(&self) -> Result<CreatedUser> {
        let (request, generation) = {
            let mut state = self.state();
            if state.submitting {
                return Err(WidgetError::SubmitInProgress);
            }
            state.submitting = true;
            state.error = None;
            let request = CreateUserRequest {
                draft: state.draft.clone(),
                csrf_token: self.config.csrf_token.clone(),
            };
            (request, state.generation)
        };

        let result = self.directory.create(&request).await;

        // 對話框已關閉 (或重新開啟) 時，結果不再寫回畫面
        let current = {
            let mut state = self.state();
            let current = state.generation == generation;
            if current {
                state.submitting = false;
            }
            current
        };

        match result {
            Ok(response) => {
                tracing::info!(
                    "✅ User created: {} ({})",
                    response.user.account.display_name(),
                    response.user.account.id
                );
                if current {
                    self.hide();
                }
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| self.config.success_text.clone());
                self.page.show_toast(message, self.config.toast_duration());
                Ok(response.user)
            }
            Err(e) => {
                tracing::warn!("❌ User creation failed: {}", e);
                if current {
                    self.state().error = Some(self.error_text(&e));
                } else {
                    tracing::debug!("Discarding failure of a closed create form");
                }
                Err(e)
            }
        }
    }

    fn error_text(&self, error: &WidgetError) -> String {
        if let Some(payload) = error.payload() {
            return payload.render();
        }
        match error.category() {
            ErrorCategory::TransportFailure => self.config.connection_error_text.clone(),
            _ => self.config.default_error_text.clone(),
        }
    }

    pub fn view(&self) -> CreateFormView {
        let state = self.state();
        let fields = FormField::ALL
            .iter()
            .filter(|field| !field.is_hidden())
            .map(|field| (*field, state.draft.get(*field).to_string()))
            .collect();

        CreateFormView {
            visible: state.visible,
            title: self.config.title.clone(),
            fields,
            focused: state.focused,
            submit_label: if state.submitting {
                self.config.busy_label.clone()
            } else {
                self.config.submit_label.clone()
            },
            submit_enabled: !state.submitting,
            error: state.error.clone(),
            location_text: state
                .location
                .map(|_| self.config.location_selected_text.clone()),
            coordinates_text: state.location.map(|c| c.to_string()),
        }
    }
}
