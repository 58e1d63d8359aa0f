//! # Preview API
//! 
//! HTTP handlers, session middleware, templates and error mapping.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
pub use templates::Templates;
