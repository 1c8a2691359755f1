//! Storage module providing the durable key-value port and the snapshot codec.
//!
//! This module implements:
//! - [`Storage`]: synchronous `get/set/remove` over string keys and values
//! - [`MemoryStorage`]: process-local store with an optional byte quota
//! - [`FileStorage`]: single JSON file on disk
//! - [`PersistenceCodec`]: validation and encoding of the persisted snapshot
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tombola::storage::{MemoryStorage, PersistedSnapshot, PersistenceCodec};
//!
//! let codec = PersistenceCodec::new(Arc::new(MemoryStorage::new()), 90);
//! codec.persist("tombola:state", &PersistedSnapshot { drawn_numbers: vec![7], history: vec![] });
//!
//! let outcome = codec.parse("tombola:state");
//! assert!(!outcome.invalid);
//! assert_eq!(outcome.state.unwrap().drawn_numbers, vec![7]);
//! ```

pub mod codec;
pub mod errors;
pub mod file;
pub mod memory;

pub use codec::{ParseOutcome, PersistedSnapshot, PersistenceCodec};
pub use errors::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Durable string key-value store
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key succeeds
    fn remove(&self, key: &str) -> StorageResult<()>;
}
