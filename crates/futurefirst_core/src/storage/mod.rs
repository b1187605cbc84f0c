//! Local key-value persistence.
//!
//! # Responsibility
//! - Define the `KeyValueStore` backend contract (the browser-local store
//!   analogue) and its SQLite and in-memory implementations.
//! - Layer per-user namespacing and owner-tagged envelopes on top
//!   (`UserDataStore`).
//!
//! # Invariants
//! - Backends never interpret values; they store opaque strings.
//! - Only `UserDataStore` and the maintenance sweep build `user_` keys.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod keys;
pub mod memory;
pub mod sqlite;
pub mod user_data;

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend or encoding failure. Callers above `UserDataStore` never see it
/// from reads; writes surface it so the caller can log it.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Write would push the backend past its byte quota.
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        quota_bytes: usize,
    },
    Serialization(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes needed, quota {quota_bytes}"
            ),
            Self::Serialization(err) => write!(f, "envelope serialization failed: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// String key-value backend shared process-wide.
///
/// Methods take `&self`; implementations use interior mutability because a
/// single backend is shared by every feature container through `Rc`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    /// Inserts or overwrites `key`.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// All keys, sorted ascending.
    fn keys(&self) -> StorageResult<Vec<String>>;
}
