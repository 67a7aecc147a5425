// Domain layer: core models and ports (interfaces).

pub mod model;
pub mod ports;
pub mod settings;
