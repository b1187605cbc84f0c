//! Login/logout coordination across feature containers.
//!
//! # Responsibility
//! - Own the five feature containers for one running app.
//! - Fan `set_current_user` out on login and `clear_user_data` on logout.
//!
//! # Invariants
//! - The coordinator never reads or writes feature data itself.
//! - Containers are visited in a fixed order: quiz, notes, conversations,
//!   favorites, tasks.
//! - Initialization is best-effort: every container is visited even if an
//!   earlier one could not load its record (loads degrade to defaults).

use crate::model::user::UserId;
use crate::service::conversation_store::ConversationStore;
use crate::service::favorites_store::FavoritesStore;
use crate::service::notes_store::NotesStore;
use crate::service::quiz_store::QuizStore;
use crate::service::task_store::TaskStore;
use crate::service::UserScoped;
use crate::storage::user_data::UserDataStore;
use log::info;
use std::time::Instant;

/// Coordinator lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Initializing(UserId),
    Ready(UserId),
}

/// Outcome of `initialize_user_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub user_id: UserId,
    /// True when the user was already ready and nothing ran.
    pub skipped: bool,
    /// Containers whose in-memory state was replaced.
    pub reloaded: Vec<&'static str>,
}

/// The feature containers owned by a coordinator.
pub struct FeatureStores {
    pub quiz: QuizStore,
    pub notes: NotesStore,
    pub conversations: ConversationStore,
    pub favorites: FavoritesStore,
    pub tasks: TaskStore,
}

impl FeatureStores {
    /// Builds every container over clones of one namespaced store.
    pub fn new(data: &UserDataStore) -> Self {
        Self {
            quiz: QuizStore::new(data.clone()),
            notes: NotesStore::new(data.clone()),
            conversations: ConversationStore::new(data.clone()),
            favorites: FavoritesStore::new(data.clone()),
            tasks: TaskStore::new(data.clone()),
        }
    }

    fn scoped_mut(&mut self) -> [&mut dyn UserScoped; 5] {
        [
            &mut self.quiz,
            &mut self.notes,
            &mut self.conversations,
            &mut self.favorites,
            &mut self.tasks,
        ]
    }
}

pub struct SessionCoordinator {
    stores: FeatureStores,
    phase: SessionPhase,
}

impl SessionCoordinator {
    pub fn new(stores: FeatureStores) -> Self {
        Self {
            stores,
            phase: SessionPhase::Uninitialized,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn current_user(&self) -> Option<&UserId> {
        match &self.phase {
            SessionPhase::Ready(user_id) | SessionPhase::Initializing(user_id) => Some(user_id),
            SessionPhase::Uninitialized => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.phase, SessionPhase::Ready(_))
    }

    pub fn stores(&self) -> &FeatureStores {
        &self.stores
    }

    pub fn stores_mut(&mut self) -> &mut FeatureStores {
        &mut self.stores
    }

    /// Points every container at `user_id`.
    ///
    /// Skips all work when already ready for the same user. Switching users
    /// goes straight through `Initializing(new)`; each container drops the
    /// previous user's state in its own `set_current_user`.
    pub fn initialize_user_data(&mut self, user_id: &UserId) -> InitReport {
        if self.phase == SessionPhase::Ready(user_id.clone()) {
            return InitReport {
                user_id: user_id.clone(),
                skipped: true,
                reloaded: Vec::new(),
            };
        }

        let started_at = Instant::now();
        self.phase = SessionPhase::Initializing(user_id.clone());
        let mut reloaded = Vec::new();
        for container in self.stores.scoped_mut() {
            if container.set_current_user(user_id) {
                reloaded.push(container.name());
            }
        }
        self.phase = SessionPhase::Ready(user_id.clone());

        info!(
            "event=session_init module=session status=ok reloaded={} duration_ms={}",
            reloaded.len(),
            started_at.elapsed().as_millis()
        );
        InitReport {
            user_id: user_id.clone(),
            skipped: false,
            reloaded,
        }
    }

    /// Releases every container's in-memory state on logout.
    pub fn clear_all_user_data(&mut self) {
        for container in self.stores.scoped_mut() {
            container.clear_user_data();
        }
        self.phase = SessionPhase::Uninitialized;
        info!("event=session_clear module=session status=ok");
    }
}
