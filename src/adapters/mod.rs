// Adapters layer: concrete implementations of the domain ports (http directory, headless map, geolocation).

pub mod http;
pub mod map;

pub use http::HttpUserDirectory;
pub use map::{FixedGeolocation, HeadlessMapProvider, UnavailableGeolocation};
