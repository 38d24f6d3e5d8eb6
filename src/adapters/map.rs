use crate::domain::model::Coordinate;
use crate::domain::ports::{GeolocationProvider, MapProvider, MapSurface, MarkerId};
use crate::utils::error::{Result, WidgetError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

/// 無畫面地圖的狀態紀錄，供 CLI 與測試檢查
#[derive(Debug, Clone, Default)]
pub struct MapState {
    pub center: Option<Coordinate>,
    pub zoom: u8,
    pub tile_layers: Vec<TileLayer>,
    pub markers: BTreeMap<u64, Coordinate>,
    next_marker: u64,
}

/// A map collaborator without a renderer. Every map it creates shares one
/// inspectable [`MapState`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessMapProvider {
    state: Arc<Mutex<MapState>>,
}

impl HeadlessMapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MapState {
        lock(&self.state).clone()
    }
}

impl MapProvider for HeadlessMapProvider {
    fn create_map(&self, center: Coordinate, zoom: u8) -> Result<Box<dyn MapSurface>> {
        {
            let mut state = lock(&self.state);
            *state = MapState::default();
            state.center = Some(center);
            state.zoom = zoom;
        }
        Ok(Box::new(HeadlessMap {
            state: Arc::clone(&self.state),
        }))
    }
}

struct HeadlessMap {
    state: Arc<Mutex<MapState>>,
}

impl MapSurface for HeadlessMap {
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str) {
        lock(&self.state).tile_layers.push(TileLayer {
            url_template: url_template.to_string(),
            attribution: attribution.to_string(),
        });
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        let mut state = lock(&self.state);
        state.center = Some(center);
        state.zoom = zoom;
    }

    fn place_marker(&mut self, at: Coordinate) -> MarkerId {
        let mut state = lock(&self.state);
        state.next_marker += 1;
        let id = state.next_marker;
        state.markers.insert(id, at);
        MarkerId(id)
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        lock(&self.state).markers.remove(&marker.0);
    }
}

fn lock(state: &Mutex<MapState>) -> MutexGuard<'_, MapState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 固定位置 (例如由設定或命令列提供)
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation(pub Coordinate);

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> Result<Coordinate> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGeolocation;

#[async_trait]
impl GeolocationProvider for UnavailableGeolocation {
    async fn current_position(&self) -> Result<Coordinate> {
        Err(WidgetError::CollaboratorUnavailable {
            name: "geolocation".to_string(),
        })
    }
}
