// Domain layer: the request bag and the port the pipeline talks to.

pub mod model;
pub mod ports;
