//! AI study-assistant conversation threads owned by `ConversationStore`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ConversationId = Uuid;

/// Title of a conversation the user has not named yet.
pub const NEW_CHAT_TITLE: &str = "New Chat";
const DERIVED_TITLE_MAX_CHARS: usize = 40;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    /// Reply produced by the study-assistant flow.
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: i64,
}

impl Conversation {
    pub fn new(title: Option<&str>, now_ms: i64) -> Self {
        let title = title
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(NEW_CHAT_TITLE);
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            messages: Vec::new(),
            created_at: now_ms,
        }
    }

    /// Whether the title is still the placeholder.
    pub fn has_default_title(&self) -> bool {
        self.title == NEW_CHAT_TITLE
    }
}

/// Derives a short title from the first user message.
///
/// Whitespace is collapsed and the result is capped at 40 chars with a
/// trailing `...` when cut. Returns `None` for blank input.
pub fn derive_title(message: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(message.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    let mut title: String = collapsed.chars().take(DERIVED_TITLE_MAX_CHARS).collect();
    if collapsed.chars().count() > DERIVED_TITLE_MAX_CHARS {
        title = title.trim_end().to_string();
        title.push_str("...");
    }
    Some(title)
}
