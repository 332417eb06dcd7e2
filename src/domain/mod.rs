// Domain layer: write models, field maps and the persistence port.

pub mod model;
pub mod ports;
