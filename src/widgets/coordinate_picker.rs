use crate::config::CoordinatePickerConfig;
use crate::domain::model::Coordinate;
use crate::domain::ports::{GeolocationProvider, MapProvider, MapSurface, MarkerId};
use crate::utils::error::{Result, WidgetError};
use crate::widgets::page::PageHost;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

type SharedSurface = Arc<Mutex<Box<dyn MapSurface>>>;

/// 地圖模式：顯示中的地圖與目前的標記
pub struct MapBacked {
    surface: SharedSurface,
    marker: Option<MarkerId>,
    /// 背景定位工作，完成後才重新置中
    locate: Option<JoinHandle<()>>,
}

impl MapBacked {
    fn surface(&self) -> MutexGuard<'_, Box<dyn MapSurface>> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_marker(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.surface().remove_marker(marker);
        }
    }
}

impl Drop for MapBacked {
    fn drop(&mut self) {
        if let Some(locate) = self.locate.take() {
            locate.abort();
        }
    }
}

/// 無地圖時的手動輸入模式
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    pub lat_text: String,
    pub lng_text: String,
}

/// Picker variant, chosen once when the map is initialised.
pub enum PickerBackend {
    MapBacked(MapBacked),
    ManualEntry(ManualEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Uninitialized,
    Map,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatePickerView {
    pub visible: bool,
    pub title: String,
    pub hint_text: String,
    pub mode: PickerMode,
    pub readout: Option<String>,
    pub confirm_enabled: bool,
    pub manual_lat: String,
    pub manual_lng: String,
}

/// Modal for choosing a latitude/longitude pair on a map, with a manual
/// numeric fallback when no map collaborator is available.
pub struct CoordinatePicker {
    config: CoordinatePickerConfig,
    page: Arc<PageHost>,
    map_provider: Option<Arc<dyn MapProvider>>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    backend: Option<PickerBackend>,
    pending: Option<Coordinate>,
    visible: bool,
}

impl CoordinatePicker {
    /// `map_provider = None` means the mapping collaborator is absent.
    pub fn new(
        config: CoordinatePickerConfig,
        page: Arc<PageHost>,
        map_provider: Option<Arc<dyn MapProvider>>,
        geolocation: Option<Arc<dyn GeolocationProvider>>,
    ) -> Self {
        Self {
            config,
            page,
            map_provider,
            geolocation,
            backend: None,
            pending: None,
            visible: false,
        }
    }

    /// 顯示對話框，等待版面穩定後初始化地圖
    pub async fn show(&mut self) {
        if !self.visible {
            self.visible = true;
            self.page.lock_scroll();
        }

        tokio::time::sleep(self.config.init_delay()).await;
        if self.visible && self.backend.is_none() {
            self.initialize_map();
        }
    }

    fn initialize_map(&mut self) {
        let center = Coordinate::new(self.config.default_lat, self.config.default_lng);

        let surface = match &self.map_provider {
            Some(provider) => provider.create_map(center, self.config.default_zoom),
            None => Err(WidgetError::CollaboratorUnavailable {
                name: "map".to_string(),
            }),
        };

        let mut surface = match surface {
            Ok(surface) => surface,
            Err(e) => {
                tracing::error!("❌ Map unavailable, switching to manual entry: {}", e);
                self.backend = Some(PickerBackend::ManualEntry(ManualEntry::default()));
                return;
            }
        };

        surface.add_tile_layer(&self.config.tile_url_template, &self.config.tile_attribution);
        let surface: SharedSurface = Arc::new(Mutex::new(surface));

        // 定位只用來重新置中，地圖不必等待結果
        let locate = self.geolocation.clone().map(|geolocation| {
            let surface = Arc::clone(&surface);
            let zoom = self.config.located_zoom;
            tokio::spawn(async move {
                match geolocation.current_position().await {
                    Ok(position) => {
                        tracing::debug!("Centering map on current position {}", position);
                        surface
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .set_view(position, zoom);
                    }
                    Err(e) => tracing::warn!("Could not get current position: {}", e),
                }
            })
        });

        self.backend = Some(PickerBackend::MapBacked(MapBacked {
            surface,
            marker: None,
            locate,
        }));
    }

    /// Map click handler. Ignored unless the map variant is active.
    pub fn on_map_click(&mut self, lat: f64, lng: f64) {
        if self.mode() == PickerMode::Map {
            self.set_location(lat, lng);
        }
    }

    /// 設定待確認的座標，並取代地圖上原有的標記
    pub fn set_location(&mut self, lat: f64, lng: f64) {
        let coordinate = Coordinate::new(lat, lng);

        if let Some(PickerBackend::MapBacked(map)) = &mut self.backend {
            map.clear_marker();
            let marker = map.surface().place_marker(coordinate);
            map.marker = Some(marker);
        }

        tracing::debug!("Pending location set: {}", coordinate);
        self.pending = Some(coordinate);
    }

    pub fn set_manual_latitude(&mut self, text: &str) -> Result<Coordinate> {
        if let Some(PickerBackend::ManualEntry(entry)) = &mut self.backend {
            entry.lat_text = text.to_string();
        }
        self.refresh_manual()
    }

    pub fn set_manual_longitude(&mut self, text: &str) -> Result<Coordinate> {
        if let Some(PickerBackend::ManualEntry(entry)) = &mut self.backend {
            entry.lng_text = text.to_string();
        }
        self.refresh_manual()
    }

    /// 兩個欄位都是有效數字時才有待確認座標；不檢查範圍
    fn refresh_manual(&mut self) -> Result<Coordinate> {
        let entry = match &self.backend {
            Some(PickerBackend::ManualEntry(entry)) => entry.clone(),
            _ => {
                return Err(WidgetError::InputParseError {
                    field: "manual entry".to_string(),
                    value: "manual entry is not active".to_string(),
                })
            }
        };

        let parsed = parse_number("latitude", &entry.lat_text)
            .and_then(|lat| parse_number("longitude", &entry.lng_text).map(|lng| (lat, lng)));

        match parsed {
            Ok((lat, lng)) => {
                self.set_location(lat, lng);
                Ok(Coordinate::new(lat, lng))
            }
            Err(e) => {
                self.pending = None;
                Err(e)
            }
        }
    }

    pub fn pending(&self) -> Option<Coordinate> {
        self.pending
    }

    pub fn is_confirm_enabled(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands the pending coordinate to the caller and closes the modal.
    /// Returns `None` (and stays open) while confirm is disabled.
    pub fn confirm(&mut self) -> Option<Coordinate> {
        let coordinate = self.pending.take()?;
        tracing::info!("✅ Location confirmed: {}", coordinate);
        self.clear_marker();
        self.hide();
        Some(coordinate)
    }

    /// Cancel button and overlay click: close without a result.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.clear_marker();
        self.hide();
    }

    /// 地圖上的標記永遠代表待確認座標
    fn clear_marker(&mut self) {
        if let Some(PickerBackend::MapBacked(map)) = &mut self.backend {
            map.clear_marker();
        }
    }

    pub fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.page.unlock_scroll();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn mode(&self) -> PickerMode {
        match &self.backend {
            None => PickerMode::Uninitialized,
            Some(PickerBackend::MapBacked(_)) => PickerMode::Map,
            Some(PickerBackend::ManualEntry(_)) => PickerMode::Manual,
        }
    }

    pub fn view(&self) -> CoordinatePickerView {
        let (manual_lat, manual_lng) = match &self.backend {
            Some(PickerBackend::ManualEntry(entry)) => {
                (entry.lat_text.clone(), entry.lng_text.clone())
            }
            _ => (String::new(), String::new()),
        };

        CoordinatePickerView {
            visible: self.visible,
            title: self.config.title.clone(),
            hint_text: self.config.hint_text.clone(),
            mode: self.mode(),
            readout: self.pending.map(|c| c.to_string()),
            confirm_enabled: self.is_confirm_enabled(),
            manual_lat,
            manual_lng,
        }
    }

    pub fn destroy(mut self) {
        self.hide();
    }
}

fn parse_number(field: &str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| WidgetError::InputParseError {
            field: field.to_string(),
            value: text.to_string(),
        })
}
