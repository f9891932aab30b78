//! Durable string storage keyed by name.
//!
//! A [`KeyValueStore`] holds one string per key and nothing else: no
//! transactions, no partial writes. Every `set` replaces the whole value, and
//! a missing key is `Ok(None)`, never an error.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::io;

/// Failures surfaced by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read key '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write key '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("stored value for key '{key}' is corrupt: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid key '{0}'")]
    InvalidKey(String),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        use crate::error::ErrorCode;
        match self {
            Self::Read { .. } | Self::Decode { .. } => ErrorCode::StoreReadFailed,
            Self::Write { .. } | Self::Encode { .. } => ErrorCode::StoreWriteFailed,
            Self::InvalidKey(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// One string value per key, overwritten wholesale on each write.
pub trait KeyValueStore {
    /// Return the value under `key`, or `None` if nothing was ever stored.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Forget `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
