//! # Preview Core - Domain Module
//! 
//! Session records, cache slots and ingestion outcomes.

pub mod session;
pub mod slot;
pub mod ingest;

pub use session::{SessionCookie, SessionRecord};
pub use slot::{ConsumptionPolicy, ExtensionAllowList, SlotId, SlotNamespace};
pub use ingest::{IngestOutcome, SourceLocator};
