//! # Preview Infrastructure
//! 
//! Session store, byte store and ingestion source implementations (adapters).

pub mod session;
pub mod storage;
pub mod source;

pub use session::{MemorySessionStore, RedisSessionStore};
pub use storage::FilesystemByteStore;
pub use source::{HttpRemoteSource, SandboxedLocalSource};
