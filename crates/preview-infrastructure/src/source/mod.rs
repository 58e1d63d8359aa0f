//! Ingestion source adapters

pub mod local;
pub mod http;

pub use local::SandboxedLocalSource;
pub use http::HttpRemoteSource;
