//! Favorited repository (drive) items.
//!
//! Only item ids are stored; titles and links are fetched live from the
//! drive collaborator when the favorites view renders.

use super::{persist, require_user, StoreError, StoreResult, UserScoped};
use crate::model::user::UserId;
use crate::storage::keys::DataType;
use crate::storage::user_data::UserDataStore;
use std::collections::BTreeSet;

const CONTAINER: &str = "favorites";

pub struct FavoritesStore {
    data: UserDataStore,
    user_id: Option<UserId>,
    item_ids: BTreeSet<String>,
}

impl FavoritesStore {
    pub fn new(data: UserDataStore) -> Self {
        Self {
            data,
            user_id: None,
            item_ids: BTreeSet::new(),
        }
    }

    /// Favorited ids in ascending order.
    pub fn favorites(&self) -> impl Iterator<Item = &str> {
        self.item_ids.iter().map(String::as_str)
    }

    pub fn is_favorite(&self, item_id: &str) -> bool {
        self.item_ids.contains(item_id.trim())
    }

    pub fn count(&self) -> usize {
        self.item_ids.len()
    }

    /// Returns whether the item is a favorite after the toggle.
    pub fn toggle_favorite(&mut self, item_id: &str) -> StoreResult<bool> {
        let user_id = require_user(self.user_id.as_ref())?;
        let item_id = normalize_item_id(item_id)?;
        let now_favorite = if self.item_ids.remove(item_id) {
            false
        } else {
            self.item_ids.insert(item_id.to_string());
            true
        };
        self.commit(&user_id);
        Ok(now_favorite)
    }

    /// Returns `false` when the item was already a favorite (no write).
    pub fn add_favorite(&mut self, item_id: &str) -> StoreResult<bool> {
        let user_id = require_user(self.user_id.as_ref())?;
        let item_id = normalize_item_id(item_id)?;
        if !self.item_ids.insert(item_id.to_string()) {
            return Ok(false);
        }
        self.commit(&user_id);
        Ok(true)
    }

    /// Returns `false` when the item was not a favorite (no write).
    pub fn remove_favorite(&mut self, item_id: &str) -> StoreResult<bool> {
        let user_id = require_user(self.user_id.as_ref())?;
        let item_id = normalize_item_id(item_id)?;
        if !self.item_ids.remove(item_id) {
            return Ok(false);
        }
        self.commit(&user_id);
        Ok(true)
    }

    fn commit(&self, user_id: &UserId) {
        persist(&self.data, user_id, DataType::GccrFavorites, &self.item_ids);
    }
}

fn normalize_item_id(item_id: &str) -> StoreResult<&str> {
    let trimmed = item_id.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput("repository item id is blank"));
    }
    Ok(trimmed)
}

impl UserScoped for FavoritesStore {
    fn name(&self) -> &'static str {
        CONTAINER
    }

    fn set_current_user(&mut self, user_id: &UserId) -> bool {
        if self.user_id.as_ref() == Some(user_id) {
            return false;
        }
        self.item_ids = self
            .data
            .load(user_id, DataType::GccrFavorites, BTreeSet::new());
        self.user_id = Some(user_id.clone());
        true
    }

    fn clear_user_data(&mut self) {
        self.item_ids.clear();
        self.user_id = None;
    }

    fn current_user(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}
