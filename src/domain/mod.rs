// Domain layer: value objects, the test-data builder and the reporting port.

pub mod builder;
pub mod model;
pub mod ports;
