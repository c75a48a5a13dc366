// Domain layer: request-scoped models and the provider port.

pub mod model;
pub mod ports;
