// Domain layer: form/card models and ports (interfaces).

pub mod model;
pub mod ports;
