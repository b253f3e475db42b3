//! # Storage Adapters
//!
//! Infrastructure implementations of the key-value storage interface.

pub mod filesystem_store;
pub mod memory_store;

pub use filesystem_store::FilesystemKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
