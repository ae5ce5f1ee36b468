// Domain layer: provider records and the two I/O ports. No network code here.

pub mod model;
pub mod ports;
