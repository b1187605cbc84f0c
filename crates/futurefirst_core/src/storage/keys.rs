//! Namespaced key naming: `user_<userId>_<dataType>`.

use crate::model::user::UserId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const USER_KEY_PREFIX: &str = "user_";
pub const KEY_SEPARATOR: char = '_';

static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]").expect("valid identity sanitize regex"));

/// Fixed set of per-user record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    QuizCompetitions,
    Notes,
    AiConversations,
    GccrFavorites,
    ProgressTasks,
    UserProfile,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::QuizCompetitions,
        DataType::Notes,
        DataType::AiConversations,
        DataType::GccrFavorites,
        DataType::ProgressTasks,
        DataType::UserProfile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuizCompetitions => "quiz_competitions",
            Self::Notes => "notes",
            Self::AiConversations => "ai_conversations",
            Self::GccrFavorites => "gccr_favorites",
            Self::ProgressTasks => "progress_tasks",
            Self::UserProfile => "user_profile",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Record key for one user and data type.
pub fn user_key(user_id: &UserId, data_type: DataType) -> String {
    format!("{}{}", user_prefix(user_id), data_type.as_str())
}

/// Prefix shared by every key owned by `user_id`, separator included.
pub fn user_prefix(user_id: &UserId) -> String {
    format!("{USER_KEY_PREFIX}{}{KEY_SEPARATOR}", user_id.as_str())
}

/// Extracts the user-id segment from a namespaced key.
///
/// Returns `None` for keys outside the `user_` namespace or with an empty
/// segment. User ids never contain `_`, so the segment ends at the next one.
pub fn user_id_segment(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(USER_KEY_PREFIX)?;
    let (segment, _) = rest.split_once(KEY_SEPARATOR)?;
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Lowercases `identity` and replaces every non-alphanumeric char with `_`.
///
/// `aaryanp0302@gmail.com` becomes `aaryanp0302_gmail_com`.
pub fn sanitize_identity(identity: &str) -> String {
    NON_ALNUM_RE
        .replace_all(&identity.trim().to_ascii_lowercase(), "_")
        .into_owned()
}

/// Key under which the raffle tool keeps entries collected by `owner_email`.
pub fn raffle_entries_key(user_id: &UserId, owner_email: &str) -> String {
    format!(
        "{}raffle_entries_{}",
        user_prefix(user_id),
        sanitize_identity(owner_email)
    )
}
