pub mod config;
pub mod error;
pub mod selection;
pub mod session;
pub mod telemetry;
