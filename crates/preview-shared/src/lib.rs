//! # Preview Shared
//! 
//! Configuration, telemetry and constants shared by every image preview crate.

pub mod constants;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::AppError;
