//! # Preview Core
//! 
//! Domain types, ports and the session / access / cache-slot services of the
//! image preview service.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain types
pub use domain::*;
pub use error::DomainError;
