//! Session store adapters

pub mod redis_store;
pub mod memory_store;

pub use redis_store::RedisSessionStore;
pub use memory_store::MemorySessionStore;
