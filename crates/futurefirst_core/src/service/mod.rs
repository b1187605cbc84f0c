//! Per-feature state containers.
//!
//! # Responsibility
//! - Hold one feature's in-memory collection for the signed-in user.
//! - Persist the whole collection through `UserDataStore` after every
//!   mutation.
//! - Expose the `UserScoped` lifecycle used by `SessionCoordinator`.
//!
//! # Invariants
//! - A container is the only writer of its `DataType` key.
//! - Mutations without an active user fail with `StoreError::NoActiveUser`.
//! - Save failures are logged and never undo the in-memory change.
//! - `clear_user_data` never deletes persisted records.

use crate::model::user::UserId;
use crate::storage::keys::DataType;
use crate::storage::user_data::UserDataStore;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod conversation_store;
pub mod favorites_store;
pub mod notes_store;
pub mod quiz_store;
pub mod task_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Domain-level failure returned by container operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Mutation attempted before `set_current_user`.
    NoActiveUser,
    /// No entity with this id in the active user's collection.
    NotFound(String),
    InvalidInput(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveUser => write!(f, "no active user"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidInput(details) => write!(f, "invalid input: {details}"),
        }
    }
}

impl Error for StoreError {}

/// Login/logout lifecycle shared by every container.
pub trait UserScoped {
    /// Stable container name used in logs and init reports.
    fn name(&self) -> &'static str;

    /// Loads `user_id`'s record unless it is already active.
    ///
    /// Returns `true` when in-memory state was replaced.
    fn set_current_user(&mut self, user_id: &UserId) -> bool;

    /// Drops in-memory state and the active user. Persisted data stays.
    fn clear_user_data(&mut self);

    fn current_user(&self) -> Option<&UserId>;
}

/// Writes the full collection.
///
/// A failed save is already logged by `UserDataStore::save`; the in-memory
/// change stays authoritative for the session.
pub(crate) fn persist<T: Serialize>(
    data: &UserDataStore,
    user_id: &UserId,
    data_type: DataType,
    payload: &T,
) {
    let _ = data.save(user_id, data_type, payload);
}

pub(crate) fn require_user(current: Option<&UserId>) -> StoreResult<UserId> {
    current.cloned().ok_or(StoreError::NoActiveUser)
}

#[cfg(test)]
mod tests {
    use super::persist;
    use crate::model::user::UserId;
    use crate::storage::keys::DataType;
    use crate::storage::memory::MemoryKeyValueStore;
    use crate::storage::user_data::UserDataStore;
    use crate::storage::KeyValueStore;
    use std::rc::Rc;

    #[test]
    fn persist_swallows_save_failure() {
        let backend = Rc::new(MemoryKeyValueStore::with_quota(8));
        let data = UserDataStore::new(backend.clone());
        let user_id = UserId::parse("u1").unwrap();

        persist(&data, &user_id, DataType::Notes, &vec!["x".repeat(32)]);

        assert_eq!(backend.get_item("user_u1_notes").unwrap(), None);
    }
}
