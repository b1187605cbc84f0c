//! Per-user namespaced persistence with owner-tagged envelopes.
//!
//! # Responsibility
//! - Map `(UserId, DataType)` to one backend key.
//! - Wrap every payload as `{ data, timestamp, userId }` on write.
//! - Degrade every read failure to the caller's default.
//! - Sweep a user's keys, honoring the protected-account exemption.
//!
//! # Invariants
//! - `load` never returns data whose embedded `userId` differs from the
//!   requested one.
//! - `load` never fails; `save`/`remove` failures are logged and returned.
//! - Each key holds at most one record; `save` always overwrites.

use super::keys::{user_id_segment, user_key, user_prefix, DataType, USER_KEY_PREFIX};
use super::{KeyValueStore, StorageError, StorageResult};
use crate::clock::{Clock, SystemClock};
use crate::config::ProtectedAccount;
use crate::model::user::UserId;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Stored wrapper around every feature payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub data: T,
    /// Write time, Unix epoch milliseconds.
    pub timestamp: i64,
    pub user_id: String,
}

/// Outcome of a destructive key sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<String>,
    pub preserved: Vec<String>,
    /// Keys whose delete failed; they are still present.
    pub failed: Vec<String>,
}

impl SweepReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn preserved_count(&self) -> usize {
        self.preserved.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Namespaced view over a shared `KeyValueStore`.
///
/// Cheap to clone; every feature container holds its own clone.
#[derive(Clone)]
pub struct UserDataStore {
    backend: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    protected: Option<ProtectedAccount>,
}

impl UserDataStore {
    /// Uses the system clock and no protected account.
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            clock: Rc::new(SystemClock),
            protected: None,
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_protected_account(mut self, protected: Option<ProtectedAccount>) -> Self {
        self.protected = protected;
        self
    }

    pub fn protected_account(&self) -> Option<&ProtectedAccount> {
        self.protected.as_ref()
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Writes `payload` for `user_id`, overwriting any previous record.
    pub fn save<T: Serialize>(
        &self,
        user_id: &UserId,
        data_type: DataType,
        payload: &T,
    ) -> StorageResult<()> {
        let key = user_key(user_id, data_type);
        let envelope = Envelope {
            data: payload,
            timestamp: self.clock.now_ms(),
            user_id: user_id.as_str().to_string(),
        };

        let result = serde_json::to_string(&envelope)
            .map_err(StorageError::from)
            .and_then(|raw| {
                self.backend.set_item(&key, &raw)?;
                Ok(raw.len())
            });

        match result {
            Ok(bytes) => {
                debug!(
                    "event=user_data_save module=storage status=ok data_type={} bytes={}",
                    data_type.as_str(),
                    bytes
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=user_data_save module=storage status=error data_type={} error={}",
                    data_type.as_str(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Reads the payload for `user_id`, or `default` when the record is
    /// absent, unreadable, unparsable, or owned by someone else.
    pub fn load<T: DeserializeOwned>(
        &self,
        user_id: &UserId,
        data_type: DataType,
        default: T,
    ) -> T {
        let key = user_key(user_id, data_type);
        let raw = match self.backend.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                error!(
                    "event=user_data_load module=storage status=error data_type={} error_code=backend_read_failed error={}",
                    data_type.as_str(),
                    err
                );
                return default;
            }
        };

        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(
                    "event=user_data_load module=storage status=degraded data_type={} error_code=corrupt_record error={}",
                    data_type.as_str(),
                    err
                );
                return default;
            }
        };

        if envelope.user_id != user_id.as_str() {
            warn!(
                "event=user_data_load module=storage status=degraded data_type={} error_code=owner_mismatch",
                data_type.as_str()
            );
            return default;
        }

        envelope.data
    }

    /// Deletes one record. Missing records are not an error.
    pub fn remove(&self, user_id: &UserId, data_type: DataType) -> StorageResult<()> {
        self.backend
            .remove_item(&user_key(user_id, data_type))
            .inspect_err(|err| {
                error!(
                    "event=user_data_remove module=storage status=error data_type={} error={}",
                    data_type.as_str(),
                    err
                );
            })
    }

    /// Deletes every key owned by `user_id`.
    ///
    /// When `user_email` is the protected account, keys carrying the
    /// protected tag are kept.
    pub fn clear_all(&self, user_id: &UserId, user_email: Option<&str>) -> SweepReport {
        let exempt = self
            .protected
            .as_ref()
            .filter(|account| user_email.is_some_and(|email| account.matches_email(email)));
        let prefix = user_prefix(user_id);

        let report = sweep_keys(
            self.backend.as_ref(),
            |key| key.starts_with(prefix.as_str()),
            |key| exempt.is_some_and(|account| account.has_tag(key)),
            false,
        );

        match report {
            Ok(report) => {
                info!(
                    "event=user_data_clear module=storage status=ok removed={} preserved={} failed={}",
                    report.removed_count(),
                    report.preserved_count(),
                    report.failed_count()
                );
                report
            }
            Err(err) => {
                error!(
                    "event=user_data_clear module=storage status=error error_code=key_scan_failed error={}",
                    err
                );
                SweepReport::default()
            }
        }
    }

    /// Distinct user-id segments of all `user_` keys, sorted.
    pub fn list_user_ids(&self) -> Vec<String> {
        match self.backend.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| user_id_segment(key))
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            Err(err) => {
                error!(
                    "event=user_data_list module=storage status=error error_code=key_scan_failed error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    /// All keys owned by `user_id`, sorted.
    pub fn user_keys(&self, user_id: &UserId) -> StorageResult<Vec<String>> {
        let prefix = user_prefix(user_id);
        let keys = self.backend.keys().inspect_err(|err| {
            error!(
                "event=user_data_keys module=storage status=error error_code=key_scan_failed error={}",
                err
            );
        })?;
        Ok(keys
            .into_iter()
            .filter(|key| key.starts_with(prefix.as_str()))
            .collect())
    }

    /// Every key in the `user_` namespace.
    pub fn namespaced_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(USER_KEY_PREFIX))
            .collect())
    }
}

/// Removes every key selected by `in_scope` unless `keep` holds for it.
///
/// With `dry_run`, nothing is deleted and the report shows what would be.
/// Individual delete failures land in `failed`; only the initial key scan
/// can fail the sweep.
pub(crate) fn sweep_keys(
    backend: &dyn KeyValueStore,
    in_scope: impl Fn(&str) -> bool,
    keep: impl Fn(&str) -> bool,
    dry_run: bool,
) -> StorageResult<SweepReport> {
    let mut report = SweepReport::default();
    for key in backend.keys()? {
        if !in_scope(&key) {
            continue;
        }
        if keep(&key) {
            report.preserved.push(key);
            continue;
        }
        if dry_run {
            report.removed.push(key);
            continue;
        }
        match backend.remove_item(&key) {
            Ok(()) => report.removed.push(key),
            Err(err) => {
                warn!(
                    "event=key_sweep module=storage status=error error_code=remove_failed error={}",
                    err
                );
                report.failed.push(key);
            }
        }
    }
    Ok(report)
}
