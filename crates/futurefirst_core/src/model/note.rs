//! Note entity owned by `NotesStore`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

/// Title given to notes created without one.
pub const UNTITLED_NOTE: &str = "Untitled Note";

/// One user note. Persisted as part of the full notes array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds of the last title/content/favorite change.
    pub last_modified: i64,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Note {
    /// Creates a note with a generated id. Blank titles become `Untitled Note`.
    pub fn new(title: &str, content: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: normalize_title(title),
            content: content.into(),
            last_modified: now_ms,
            is_favorite: false,
        }
    }
}

/// Partial update for `NotesStore::update_note`. `None` keeps the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub(crate) fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, UNTITLED_NOTE};

    #[test]
    fn new_note_defaults() {
        let note = Note::new("  ", "", 42);
        assert_eq!(note.title, UNTITLED_NOTE);
        assert!(!note.is_favorite);
        assert_eq!(note.last_modified, 42);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let note = Note::new("Biology", "cells", 7);
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["isFavorite"], false);
        assert_eq!(value["lastModified"], 7);
        assert_eq!(value["title"], "Biology");
    }
}
