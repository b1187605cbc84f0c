//! Access-token cache with early refresh.
//!
//! # Invariants
//! - A cached token is returned only while it has more than
//!   `REFRESH_WINDOW_MS` left before expiry.
//! - A rejected or malformed endpoint response never replaces a cached
//!   token.

use crate::config::{ConfigError, OAuthConfig};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Refresh when the token expires within five minutes.
pub const REFRESH_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Body returned by `GET /token` and `POST /token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Transport failure or non-2xx status from the endpoint.
    Transport(String),
    /// Endpoint answered but refused to issue a token.
    Rejected(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(details) => write!(f, "token endpoint unreachable: {details}"),
            Self::Rejected(details) => write!(f, "token request rejected: {details}"),
        }
    }
}

impl Error for AuthError {}

/// Token collaborator (`GET /token` reads, `POST /token` refreshes).
pub trait TokenEndpoint {
    fn fetch_token(&self) -> Result<TokenResponse, AuthError>;
    fn refresh_token(&self) -> Result<TokenResponse, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now_ms: i64) -> bool {
        self.expires_at.saturating_sub(now_ms) > REFRESH_WINDOW_MS
    }
}

pub struct TokenCache<E: TokenEndpoint> {
    endpoint: E,
    cached: Option<CachedToken>,
}

impl<E: TokenEndpoint> TokenCache<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            cached: None,
        }
    }

    /// Validates OAuth credentials from the process environment, then builds
    /// the endpoint with them.
    pub fn from_env(connect: impl FnOnce(OAuthConfig) -> E) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), connect)
    }

    /// Like `from_env`, reading through `lookup`.
    ///
    /// Missing credentials fail here, before any token request.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        connect: impl FnOnce(OAuthConfig) -> E,
    ) -> Result<Self, ConfigError> {
        let config = OAuthConfig::from_lookup(lookup).inspect_err(|err| {
            error!("event=token_config module=auth status=error error={}", err);
        })?;
        Ok(Self::new(connect(config)))
    }

    /// Returns a token valid for at least the refresh window.
    ///
    /// First call fetches; a token close to expiry is refreshed.
    pub fn access_token(&mut self, now_ms: i64) -> Result<String, AuthError> {
        if let Some(cached) = self.cached.as_ref().filter(|token| token.is_fresh(now_ms)) {
            return Ok(cached.access_token.clone());
        }

        let response = if self.cached.is_some() {
            info!("event=token_refresh module=auth status=start reason=expiring");
            self.endpoint.refresh_token()?
        } else {
            self.endpoint.fetch_token()?
        };

        let token = accept(response).inspect_err(|err| {
            warn!("event=token_refresh module=auth status=error error={}", err);
        })?;
        let access_token = token.access_token.clone();
        self.cached = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token, e.g. after a 401 from a drive call.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.cached.as_ref().map(|token| token.expires_at)
    }
}

fn accept(response: TokenResponse) -> Result<CachedToken, AuthError> {
    if !response.success {
        return Err(AuthError::Rejected(
            response.error.unwrap_or_else(|| "success=false".to_string()),
        ));
    }
    match (response.access_token, response.expires_at) {
        (Some(access_token), Some(expires_at)) if !access_token.is_empty() => Ok(CachedToken {
            access_token,
            expires_at,
        }),
        _ => Err(AuthError::Rejected(
            "response missing access_token or expires_at".to_string(),
        )),
    }
}
