// Domain layer: models and ports (interfaces) shared by the widgets and adapters.

pub mod model;
pub mod ports;
