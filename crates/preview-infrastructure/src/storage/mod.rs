//! Byte store adapters

pub mod filesystem;

pub use filesystem::FilesystemByteStore;
