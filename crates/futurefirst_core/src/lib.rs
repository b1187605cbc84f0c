//! Per-user local data layer for the FutureFirst student dashboard.
//!
//! Namespaced key-value persistence, the feature containers built on it,
//! the session coordinator that scopes them to the signed-in user, and the
//! maintenance sweep that resets them.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod maintenance;
pub mod model;
pub mod service;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig, OAuthConfig, ProtectedAccount};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use maintenance::bulk_reset;
pub use model::conversation::{Conversation, ConversationId, Message, MessageRole};
pub use model::note::{Note, NoteId, NoteUpdate};
pub use model::task::{NewTask, Task, TaskId, TaskPriority, TaskProgress, TaskUpdate};
pub use model::user::{UserId, UserIdError};
pub use service::conversation_store::ConversationStore;
pub use service::favorites_store::FavoritesStore;
pub use service::notes_store::NotesStore;
pub use service::quiz_store::QuizStore;
pub use service::task_store::TaskStore;
pub use service::{StoreError, StoreResult, UserScoped};
pub use session::{FeatureStores, InitReport, SessionCoordinator, SessionPhase};
pub use storage::keys::DataType;
pub use storage::memory::MemoryKeyValueStore;
pub use storage::sqlite::SqliteKeyValueStore;
pub use storage::user_data::{Envelope, SweepReport, UserDataStore};
pub use storage::{KeyValueStore, StorageError, StorageResult};

use std::rc::Rc;

/// Composition root: one namespaced store and one coordinator over it.
pub struct Dashboard {
    data: UserDataStore,
    session: SessionCoordinator,
}

impl Dashboard {
    pub fn new(data: UserDataStore) -> Self {
        let session = SessionCoordinator::new(FeatureStores::new(&data));
        Self { data, session }
    }

    /// Opens the SQLite backend named by `config` with its protected account.
    pub fn open(config: &CoreConfig) -> StorageResult<Self> {
        let backend: Rc<dyn KeyValueStore> =
            Rc::new(SqliteKeyValueStore::open(&config.db_path)?);
        let data =
            UserDataStore::new(backend).with_protected_account(config.protected_account.clone());
        Ok(Self::new(data))
    }

    pub fn data(&self) -> &UserDataStore {
        &self.data
    }

    pub fn session(&self) -> &SessionCoordinator {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionCoordinator {
        &mut self.session
    }

    /// Logs the current user out, then deletes all of their records except
    /// protected-account tagged ones.
    pub fn reset_user(&mut self, user_id: &UserId, user_email: Option<&str>) -> SweepReport {
        if self.session.current_user() == Some(user_id) {
            self.session.clear_all_user_data();
        }
        self.data.clear_all(user_id, user_email)
    }
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, Dashboard, MemoryKeyValueStore, UserDataStore, UserId};
    use std::rc::Rc;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn reset_user_logs_out_active_user() {
        let data = UserDataStore::new(Rc::new(MemoryKeyValueStore::new()));
        let mut dashboard = Dashboard::new(data);
        let u1 = UserId::parse("u1").unwrap();
        dashboard.session_mut().initialize_user_data(&u1);
        dashboard
            .session_mut()
            .stores_mut()
            .notes
            .add_note("Biology", "")
            .unwrap();

        let report = dashboard.reset_user(&u1, None);
        assert_eq!(report.removed, vec!["user_u1_notes".to_string()]);
        assert!(!dashboard.session().is_initialized());
        assert!(dashboard.data().user_keys(&u1).unwrap().is_empty());
    }
}
