//! Key-value persistence behind the session store.
//!
//! The medium is a cache: every failure here is reported as a
//! [`StorageError`] and swallowed one layer up, in [`SessionStore`].

pub mod file;
pub mod memory;
pub mod session_store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session_store::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupted storage: {0}")]
    Corrupted(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String entries addressed by a stable key, surviving as long as the
/// backend does.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
