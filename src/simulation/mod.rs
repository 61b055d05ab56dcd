//! Timed simulation driving N philosopher threads against one monitor.

mod config;
mod driver;
mod status;


pub use config::{CycleTiming, SimulationConfig};
pub use driver::Simulation;
pub use status::SimulationStatus;
