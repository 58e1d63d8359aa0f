//! # Preview Core - Services

pub mod session_manager;
pub mod access_controller;
pub mod cache_slot_manager;
pub mod preview_renderer;

pub use session_manager::{SessionManager, SessionPolicy};
pub use access_controller::{AccessController, AccessDecision};
pub use cache_slot_manager::{CacheSlotManager, SlotPolicy};
pub use preview_renderer::{PreviewPayload, PreviewRenderer};
