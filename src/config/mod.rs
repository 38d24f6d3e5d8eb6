#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_endpoint, validate_non_empty_string, validate_positive_number, validate_range,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 多個搜尋請求同時進行時，以哪一個回應為準
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Responses of superseded requests are dropped.
    #[default]
    LatestIssued,
    /// Whatever resolves last is rendered.
    LatestArrived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSelectConfig {
    pub search_url: String,
    pub create_url: String,
    pub min_chars: usize,
    pub debounce_delay_ms: u64,
    pub placeholder_text: String,
    pub no_results_text: String,
    pub create_label: String,
    pub loading_text: String,
    pub search_error_text: String,
    pub connection_error_text: String,
    pub response_ordering: ResponseOrdering,
}

impl Default for SearchSelectConfig {
    fn default() -> Self {
        Self {
            search_url: "/sales/ajax/search-users/".to_string(),
            create_url: "/sales/ajax/create-user/".to_string(),
            min_chars: 2,
            debounce_delay_ms: 300,
            placeholder_text: "Search user...".to_string(),
            no_results_text: "No users found".to_string(),
            create_label: "+ Create new user".to_string(),
            loading_text: "Searching users...".to_string(),
            search_error_text: "Error searching users".to_string(),
            connection_error_text: "Connection error while searching users".to_string(),
            response_ordering: ResponseOrdering::default(),
        }
    }
}

impl SearchSelectConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }
}

impl Validate for SearchSelectConfig {
    fn validate(&self) -> Result<()> {
        validate_endpoint("search.search_url", &self.search_url)?;
        validate_endpoint("search.create_url", &self.create_url)?;
        validate_positive_number("search.min_chars", self.min_chars, 1)?;
        validate_non_empty_string("search.no_results_text", &self.no_results_text)?;
        validate_non_empty_string("search.create_label", &self.create_label)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateFormConfig {
    /// Anti-forgery token sent with every create request.
    pub csrf_token: String,
    pub title: String,
    pub submit_label: String,
    pub busy_label: String,
    pub default_error_text: String,
    pub connection_error_text: String,
    pub success_text: String,
    pub location_selected_text: String,
    pub focus_delay_ms: u64,
    pub toast_duration_ms: u64,
}

impl Default for CreateFormConfig {
    fn default() -> Self {
        Self {
            csrf_token: String::new(),
            title: "Create New User".to_string(),
            submit_label: "Create User".to_string(),
            busy_label: "Creating...".to_string(),
            default_error_text: "Error creating user".to_string(),
            connection_error_text: "Connection error while creating user".to_string(),
            success_text: "User created successfully".to_string(),
            location_selected_text: "Location selected".to_string(),
            focus_delay_ms: 100,
            toast_duration_ms: 3000,
        }
    }
}

impl CreateFormConfig {
    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl Validate for CreateFormConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("create_form.csrf_token", &self.csrf_token)?;
        validate_non_empty_string("create_form.submit_label", &self.submit_label)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatePickerConfig {
    pub title: String,
    pub hint_text: String,
    pub default_lat: f64,
    pub default_lng: f64,
    pub default_zoom: u8,
    pub located_zoom: u8,
    pub tile_url_template: String,
    pub tile_attribution: String,
    pub init_delay_ms: u64,
}

impl Default for CoordinatePickerConfig {
    fn default() -> Self {
        Self {
            title: "Select Location on the Map".to_string(),
            hint_text: "Click on the map to select the home location".to_string(),
            // Santa Cruz de la Sierra
            default_lat: -17.8146,
            default_lng: -63.1560,
            default_zoom: 13,
            located_zoom: 15,
            tile_url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution: "© OpenStreetMap contributors".to_string(),
            init_delay_ms: 100,
        }
    }
}

impl CoordinatePickerConfig {
    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }
}

impl Validate for CoordinatePickerConfig {
    fn validate(&self) -> Result<()> {
        validate_range("picker.default_lat", self.default_lat, -90.0, 90.0)?;
        validate_range("picker.default_lng", self.default_lng, -180.0, 180.0)?;
        validate_range("picker.default_zoom", self.default_zoom, 0, 22)?;
        validate_range("picker.located_zoom", self.located_zoom, 0, 22)?;
        validate_non_empty_string("picker.tile_url_template", &self.tile_url_template)?;
        Ok(())
    }
}

/// 三個元件的設定集合
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub search: SearchSelectConfig,
    pub create_form: CreateFormConfig,
    pub picker: CoordinatePickerConfig,
}

impl Validate for WidgetConfig {
    fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.create_form.validate()?;
        self.picker.validate()
    }
}
