// Domain layer: core models, ports and the map surface contract.

pub mod model;
pub mod ports;
pub mod surface;
