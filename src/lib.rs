pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod server;
pub mod simulation;
pub mod validation;
