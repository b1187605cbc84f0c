//! Competition-recommendation quiz selections.

use super::{persist, require_user, StoreResult, UserScoped};
use crate::model::user::UserId;
use crate::storage::keys::DataType;
use crate::storage::user_data::UserDataStore;

const CONTAINER: &str = "quiz";

/// Ordered list of competitions the user picked from quiz results.
pub struct QuizStore {
    data: UserDataStore,
    user_id: Option<UserId>,
    selections: Vec<String>,
}

impl QuizStore {
    pub fn new(data: UserDataStore) -> Self {
        Self {
            data,
            user_id: None,
            selections: Vec::new(),
        }
    }

    pub fn selections(&self) -> &[String] {
        &self.selections
    }

    pub fn contains(&self, competition: &str) -> bool {
        self.selections.iter().any(|name| name == competition.trim())
    }

    /// Replaces the whole selection.
    ///
    /// Names are trimmed; blanks and repeats are dropped, first occurrence
    /// wins.
    pub fn set_selections(&mut self, competitions: Vec<String>) -> StoreResult<&[String]> {
        let user_id = require_user(self.user_id.as_ref())?;
        let mut normalized: Vec<String> = Vec::with_capacity(competitions.len());
        for name in competitions {
            let name = name.trim();
            if !name.is_empty() && !normalized.iter().any(|existing| existing == name) {
                normalized.push(name.to_string());
            }
        }
        self.selections = normalized;
        self.commit(&user_id);
        Ok(&self.selections)
    }

    /// Adds or removes one competition. Returns whether it is now selected.
    pub fn toggle_competition(&mut self, competition: &str) -> StoreResult<bool> {
        let user_id = require_user(self.user_id.as_ref())?;
        let name = competition.trim();
        if name.is_empty() {
            return Err(super::StoreError::InvalidInput("competition name is blank"));
        }

        let selected = match self.selections.iter().position(|existing| existing == name) {
            Some(index) => {
                self.selections.remove(index);
                false
            }
            None => {
                self.selections.push(name.to_string());
                true
            }
        };
        self.commit(&user_id);
        Ok(selected)
    }

    /// Empties the selection and persists the empty list. The key stays.
    pub fn reset_selections(&mut self) -> StoreResult<()> {
        let user_id = require_user(self.user_id.as_ref())?;
        self.selections.clear();
        self.commit(&user_id);
        Ok(())
    }

    fn commit(&self, user_id: &UserId) {
        persist(&self.data, user_id, DataType::QuizCompetitions, &self.selections);
    }
}

impl UserScoped for QuizStore {
    fn name(&self) -> &'static str {
        CONTAINER
    }

    fn set_current_user(&mut self, user_id: &UserId) -> bool {
        if self.user_id.as_ref() == Some(user_id) {
            return false;
        }
        self.selections = self
            .data
            .load(user_id, DataType::QuizCompetitions, Vec::new());
        self.user_id = Some(user_id.clone());
        true
    }

    fn clear_user_data(&mut self) {
        self.selections.clear();
        self.user_id = None;
    }

    fn current_user(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}
