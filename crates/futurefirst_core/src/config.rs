//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve storage/logging settings and the protected-account exemption.
//! - Validate OAuth collaborator settings up front, naming every missing key.
//!
//! # Invariants
//! - Readers take a lookup function so tests never mutate process env.
//! - Missing required keys are reported all at once, in declaration order.

use crate::logging::default_log_level;
use crate::storage::keys::sanitize_identity;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FUTUREFIRST_DB_PATH";
pub const ENV_LOG_DIR: &str = "FUTUREFIRST_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "FUTUREFIRST_LOG_LEVEL";
pub const ENV_PROTECTED_ACCOUNT: &str = "FUTUREFIRST_PROTECTED_ACCOUNT";
pub const ENV_PROTECTED_TAG: &str = "FUTUREFIRST_PROTECTED_TAG";

pub const ENV_OAUTH_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_OAUTH_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const ENV_OAUTH_REDIRECT_URI: &str = "GOOGLE_REDIRECT_URI";

pub const DEFAULT_DB_FILE_NAME: &str = "futurefirst.sqlite3";
pub const DEFAULT_PROTECTED_TAG: &str = "raffle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required keys absent or blank.
    MissingKeys(Vec<String>),
    /// A key is present but its value is unusable.
    Invalid { key: String, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKeys(keys) => {
                write!(f, "missing required configuration: {}", keys.join(", "))
            }
            Self::Invalid { key, reason } => write!(f, "invalid value for {key}: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Account whose tagged keys survive destructive resets.
///
/// `identifier` is the account email; `tag` is the key fragment that marks
/// exempt records (raffle entries by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedAccount {
    identifier: String,
    tag: String,
}

impl ProtectedAccount {
    pub fn new(identifier: &str, tag: &str) -> Result<Self, ConfigError> {
        let identifier = identifier.trim().to_ascii_lowercase();
        let tag = tag.trim().to_string();
        if identifier.is_empty() {
            return Err(ConfigError::Invalid {
                key: ENV_PROTECTED_ACCOUNT.to_string(),
                reason: "identifier cannot be blank".to_string(),
            });
        }
        if tag.is_empty() {
            return Err(ConfigError::Invalid {
                key: ENV_PROTECTED_TAG.to_string(),
                reason: "tag cannot be blank".to_string(),
            });
        }
        Ok(Self { identifier, tag })
    }

    /// Protects `identifier` for the default `raffle` tag.
    pub fn with_default_tag(identifier: &str) -> Result<Self, ConfigError> {
        Self::new(identifier, DEFAULT_PROTECTED_TAG)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Case-insensitive comparison against a signed-in user's email.
    pub fn matches_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.identifier)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        key.contains(self.tag.as_str())
    }

    /// True when `key` both encodes this account and carries the tag.
    pub fn protects_key(&self, key: &str) -> bool {
        self.has_tag(key) && key.contains(sanitize_identity(&self.identifier).as_str())
    }
}

/// Settings shared by the maintenance binary and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub protected_account: Option<ProtectedAccount>,
}

impl CoreConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_path = get(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));
        let log_dir = get(ENV_LOG_DIR).map(PathBuf::from);
        let log_level = get(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());
        let protected_account = match get(ENV_PROTECTED_ACCOUNT) {
            Some(identifier) => {
                let tag = get(ENV_PROTECTED_TAG).unwrap_or_else(|| DEFAULT_PROTECTED_TAG.into());
                Some(ProtectedAccount::new(&identifier, &tag)?)
            }
            None => None,
        };

        Ok(Self {
            db_path,
            log_dir,
            log_level,
            protected_account,
        })
    }

    /// Layers explicit identifier/tag overrides over the env-derived account.
    ///
    /// Blank overrides count as unset. A tag without any identifier is
    /// ignored since there is no account to protect.
    pub fn override_protected_account(
        &mut self,
        identifier: Option<&str>,
        tag: Option<&str>,
    ) -> Result<(), ConfigError> {
        let identifier = identifier.filter(|value| !value.trim().is_empty());
        let tag = tag.filter(|value| !value.trim().is_empty());
        if identifier.is_none() && tag.is_none() {
            return Ok(());
        }

        let current = self.protected_account.as_ref();
        let Some(identifier) = identifier
            .map(str::to_string)
            .or_else(|| current.map(|account| account.identifier().to_string()))
        else {
            return Ok(());
        };
        let tag = tag
            .map(str::to_string)
            .or_else(|| current.map(|account| account.tag().to_string()))
            .unwrap_or_else(|| DEFAULT_PROTECTED_TAG.to_string());

        self.protected_account = Some(ProtectedAccount::new(&identifier, &tag)?);
        Ok(())
    }
}

/// Credentials for the drive/calendar OAuth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |key: &str| match lookup(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let client_id = require(ENV_OAUTH_CLIENT_ID);
        let client_secret = require(ENV_OAUTH_CLIENT_SECRET);
        let redirect_uri = require(ENV_OAUTH_REDIRECT_URI);
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn core_config_defaults_without_env() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.protected_account, None);
    }

    #[test]
    fn core_config_reads_protected_account_with_default_tag() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_PROTECTED_ACCOUNT, " Advisor@Example.org "),
            (ENV_DB_PATH, "/var/lib/futurefirst/kv.sqlite3"),
        ]))
        .unwrap();
        let account = config.protected_account.unwrap();
        assert_eq!(account.identifier(), "advisor@example.org");
        assert_eq!(account.tag(), DEFAULT_PROTECTED_TAG);
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/futurefirst/kv.sqlite3")
        );
    }

    #[test]
    fn blank_env_tag_falls_back_to_default() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_PROTECTED_ACCOUNT, "a@b.org"),
            (ENV_PROTECTED_TAG, ""),
        ]))
        .unwrap();
        assert_eq!(config.protected_account.unwrap().tag(), DEFAULT_PROTECTED_TAG);
    }

    #[test]
    fn overrides_layer_over_env_account() {
        let mut config = CoreConfig::from_lookup(lookup(&[
            (ENV_PROTECTED_ACCOUNT, "a@b.org"),
            (ENV_PROTECTED_TAG, "attendance"),
        ]))
        .unwrap();

        config.override_protected_account(None, Some(" ")).unwrap();
        assert_eq!(config.protected_account.as_ref().unwrap().tag(), "attendance");

        config
            .override_protected_account(Some("Other@B.org"), None)
            .unwrap();
        let account = config.protected_account.as_ref().unwrap();
        assert_eq!(account.identifier(), "other@b.org");
        assert_eq!(account.tag(), "attendance");
    }

    #[test]
    fn tag_override_without_account_is_ignored() {
        let mut config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        config.override_protected_account(None, Some("raffle")).unwrap();
        assert_eq!(config.protected_account, None);

        config.override_protected_account(Some("a@b.org"), None).unwrap();
        assert_eq!(
            config.protected_account.unwrap().tag(),
            DEFAULT_PROTECTED_TAG
        );
    }

    #[test]
    fn protected_account_matches_keys_and_emails() {
        let account = ProtectedAccount::with_default_tag("aaryanp0302@gmail.com").unwrap();
        assert!(account.matches_email("AaryanP0302@gmail.com"));
        assert!(!account.matches_email("someone@gmail.com"));
        assert!(account.protects_key("user_U1_raffle_entries_aaryanp0302_gmail_com"));
        assert!(!account.protects_key("user_U1_raffle_entries_other_gmail_com"));
        assert!(!account.protects_key("user_U1_notes"));
    }

    #[test]
    fn blank_protected_tag_is_invalid() {
        let err = ProtectedAccount::new("a@b.c", "  ").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == ENV_PROTECTED_TAG));
    }

    #[test]
    fn oauth_config_enumerates_every_missing_key() {
        let err = OAuthConfig::from_lookup(lookup(&[(ENV_OAUTH_CLIENT_ID, "id")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKeys(vec![
                ENV_OAUTH_CLIENT_SECRET.to_string(),
                ENV_OAUTH_REDIRECT_URI.to_string(),
            ])
        );
        assert!(err.to_string().contains(ENV_OAUTH_CLIENT_SECRET));
    }

    #[test]
    fn oauth_config_reads_all_keys() {
        let config = OAuthConfig::from_lookup(lookup(&[
            (ENV_OAUTH_CLIENT_ID, "id"),
            (ENV_OAUTH_CLIENT_SECRET, "secret"),
            (ENV_OAUTH_REDIRECT_URI, "http://localhost/callback"),
        ]))
        .unwrap();
        assert_eq!(config.client_secret, "secret");
    }
}
