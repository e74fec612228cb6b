//! Session store adapter.
//!
//! The engine needs very little from its persistence substrate: byte values
//! by key and one set of members for the game index. `KeyValueStore` is that
//! contract; `MemoryStore` is the in-process implementation the binary runs
//! with, and `SessionRepository` layers the session codec and key layout on top.

use thiserror::Error;

pub mod memory;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::SessionRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value and set operations the session engine relies on.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the value at `key` in one step.
    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove `key`. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), StoreError>;

    fn set_members(&self, set_key: &str) -> Result<Vec<String>, StoreError>;

    fn remove_from_set(&self, set_key: &str, member: &str) -> Result<(), StoreError>;
}
