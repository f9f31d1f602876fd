pub mod core;
pub mod config;
pub mod gateway;
pub mod shield;

// Process wiring
pub mod logging;
