//! Per-feature entities persisted under namespaced keys.
//!
//! # Responsibility
//! - Define the JSON shapes stored inside each feature's envelope.
//! - Keep field names stable (camelCase) across releases.
//!
//! # Invariants
//! - Notes, tasks and conversations carry generated UUID v4 ids.
//! - Favorites and quiz selections are plain strings and need no entity type.

pub mod conversation;
pub mod note;
pub mod task;
pub mod user;
