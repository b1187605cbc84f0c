//! User identity as seen by the local data layer.
//!
//! # Invariants
//! - A `UserId` is non-empty and contains only ASCII alphanumerics and `-`.
//! - `_` is the key separator, so no `UserId` can contain it. This keeps the
//!   `user_<id>_` prefix of one user from matching another user's keys.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_USER_ID_CHARS: usize = 128;

/// Opaque, validated identifier supplied by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

/// Rejection reason for a raw user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdError {
    Empty,
    TooLong(usize),
    InvalidChar(char),
}

impl Display for UserIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "user id cannot be empty"),
            Self::TooLong(len) => write!(
                f,
                "user id has {len} chars; at most {MAX_USER_ID_CHARS} allowed"
            ),
            Self::InvalidChar(ch) => write!(f, "user id contains unsupported character `{ch}`"),
        }
    }
}

impl Error for UserIdError {}

impl UserId {
    /// Validates and wraps a raw identifier. Surrounding whitespace is trimmed.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, UserIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_USER_ID_CHARS {
            return Err(UserIdError::TooLong(len));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-'))
        {
            return Err(UserIdError::InvalidChar(bad));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}
