//! Integration tests for the dining control service
//!
//! These tests run a real control server on a loopback port and drive it
//! over TCP, both with raw HTTP and through the blocking client.

pub mod client_api;
pub mod helpers;
pub mod http_api;
pub mod lifecycle;
