//! OAuth token plumbing for the drive/calendar collaborators.
//!
//! The token HTTP endpoint itself is external; this module owns only the
//! refresh policy and cache.

pub mod token;

pub use token::{AuthError, TokenCache, TokenEndpoint, TokenResponse, REFRESH_WINDOW_MS};
