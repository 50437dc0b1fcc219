//! Volatile key-value storage port.
//!
//! The session indicator keeps a single string entry in per-tab storage. The
//! browser side is `sessionStorage`; tests and native embedders use
//! [`MemoryStore`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StoreError::Unavailable` | storage disabled (privacy mode, sandboxed frame) | caller treats entry as absent |
//! | `StoreError::Access` | host threw on read/write | caller treats entry as absent |
//! | `StoreError::Quota` | write exceeded quota | write dropped |

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Errors that can occur while touching the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The host has no storage area for this document.
    Unavailable(String),
    /// The host rejected the read or write.
    Access(String),
    /// The write would exceed the storage quota.
    Quota { key: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            StoreError::Access(msg) => write!(f, "storage access denied: {msg}"),
            StoreError::Quota { key } => write!(f, "storage quota exceeded writing {key:?}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Per-tab string storage.
///
/// All methods take `&self`; hosts are interior-mutable in the same way the
/// browser's `Storage` object is.
pub trait KeyValueStore: 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove the entry under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Remove every entry.
    fn clear(&self) -> StoreResult<()>;
}

/// In-memory store for tests and non-browser embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .data
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        store
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.data
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.data.borrow_mut().clear();
        Ok(())
    }
}
