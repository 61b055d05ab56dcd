//! HTTP control server for remote start, stop and inspection.

mod core;
mod http;
mod lifecycle;
mod params;
pub mod protocol;
mod registry;
mod routes;


pub use self::core::{ControlServer, ShutdownHandle};
pub use http::{Request, Response, MAX_HEAD_BYTES};
pub use params::{format_duration, percent_decode, Query, StartParams};
pub use registry::{SimulationRegistry, StartedRun};
