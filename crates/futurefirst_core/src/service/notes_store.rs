//! Notes container.
//!
//! # Invariants
//! - Newest notes sit at the front of the collection.
//! - `favorite_count` is re-derived on every mutation and load.
//! - `last_modified` is bumped by every update and favorite toggle.

use super::{persist, require_user, StoreError, StoreResult, UserScoped};
use crate::clock::next_timestamp;
use crate::model::note::{normalize_title, Note, NoteId, NoteUpdate};
use crate::model::user::UserId;
use crate::storage::keys::DataType;
use crate::storage::user_data::UserDataStore;

const CONTAINER: &str = "notes";

pub struct NotesStore {
    data: UserDataStore,
    user_id: Option<UserId>,
    notes: Vec<Note>,
    favorite_count: usize,
}

impl NotesStore {
    pub fn new(data: UserDataStore) -> Self {
        Self {
            data,
            user_id: None,
            notes: Vec::new(),
            favorite_count: 0,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|note| note.is_favorite)
    }

    pub fn favorite_count(&self) -> usize {
        self.favorite_count
    }

    pub fn add_note(&mut self, title: &str, content: impl Into<String>) -> StoreResult<Note> {
        let user_id = require_user(self.user_id.as_ref())?;
        let note = Note::new(title, content, self.data.now_ms());
        self.notes.insert(0, note.clone());
        self.commit(&user_id);
        Ok(note)
    }

    pub fn update_note(&mut self, id: NoteId, update: NoteUpdate) -> StoreResult<Note> {
        let user_id = require_user(self.user_id.as_ref())?;
        let now_ms = self.data.now_ms();
        let note = self.find_mut(id)?;
        if let Some(title) = update.title {
            note.title = normalize_title(&title);
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        note.last_modified = next_timestamp(now_ms, note.last_modified);
        let updated = note.clone();
        self.commit(&user_id);
        Ok(updated)
    }

    pub fn delete_note(&mut self, id: NoteId) -> StoreResult<Note> {
        let user_id = require_user(self.user_id.as_ref())?;
        let index = self
            .notes
            .iter()
            .position(|note| note.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = self.notes.remove(index);
        self.commit(&user_id);
        Ok(removed)
    }

    /// Flips `is_favorite` and returns the updated note.
    pub fn toggle_favorite(&mut self, id: NoteId) -> StoreResult<Note> {
        let user_id = require_user(self.user_id.as_ref())?;
        let now_ms = self.data.now_ms();
        let note = self.find_mut(id)?;
        note.is_favorite = !note.is_favorite;
        note.last_modified = next_timestamp(now_ms, note.last_modified);
        let updated = note.clone();
        self.commit(&user_id);
        Ok(updated)
    }

    fn find_mut(&mut self, id: NoteId) -> StoreResult<&mut Note> {
        self.notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn recount(&mut self) {
        self.favorite_count = self.notes.iter().filter(|note| note.is_favorite).count();
    }

    fn commit(&mut self, user_id: &UserId) {
        self.recount();
        persist(&self.data, user_id, DataType::Notes, &self.notes);
    }
}

impl UserScoped for NotesStore {
    fn name(&self) -> &'static str {
        CONTAINER
    }

    fn set_current_user(&mut self, user_id: &UserId) -> bool {
        if self.user_id.as_ref() == Some(user_id) {
            return false;
        }
        self.notes = self.data.load(user_id, DataType::Notes, Vec::new());
        self.user_id = Some(user_id.clone());
        self.recount();
        true
    }

    fn clear_user_data(&mut self) {
        self.notes.clear();
        self.favorite_count = 0;
        self.user_id = None;
    }

    fn current_user(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}
