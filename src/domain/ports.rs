use crate::domain::model::{Candidate, Coordinate, CreatedUser, FormDraft};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 建立使用者請求：表單值加上防偽 token
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub draft: FormDraft,
    pub csrf_token: String,
}

#[derive(Debug, Clone)]
pub struct CreateUserResponse {
    pub user: CreatedUser,
    pub message: Option<String>,
}

/// Remote user directory: search and create endpoints.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `None` asks for the unfiltered default list.
    async fn search(&self, query: Option<&str>) -> Result<Vec<Candidate>>;
    async fn create(&self, request: &CreateUserRequest) -> Result<CreateUserResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// 地圖元件能力：建立地圖、底圖圖層、標記
pub trait MapProvider: Send + Sync {
    fn create_map(&self, center: Coordinate, zoom: u8) -> Result<Box<dyn MapSurface>>;
}

pub trait MapSurface: Send {
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str);
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    fn place_marker(&mut self, at: Coordinate) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
}

/// Best-effort current position lookup.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate>;
}
