//! Repository traits (ports)

pub mod session_store;
pub mod byte_store;
pub mod source;

pub use session_store::{SessionStore, StoreError};
pub use byte_store::{ByteStore, ByteStream, SlotBody, WriteError};
pub use source::{LocalSource, RemoteSource, SourceError};

#[cfg(test)]
pub use session_store::MockSessionStore;
