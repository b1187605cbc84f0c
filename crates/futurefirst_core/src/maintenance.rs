//! Out-of-band destructive maintenance.
//!
//! # Responsibility
//! - Erase every per-user record across all users (`bulk_reset`).
//!
//! # Invariants
//! - Only keys in the `user_` namespace are touched.
//! - Keys that both encode the protected account and carry its tag survive.
//! - A failed delete never aborts the sweep; it is reported in `failed`.

use crate::config::ProtectedAccount;
use crate::storage::keys::USER_KEY_PREFIX;
use crate::storage::user_data::{sweep_keys, SweepReport};
use crate::storage::{KeyValueStore, StorageResult};
use log::{error, info};

/// Removes every `user_` key except protected-account tagged ones.
///
/// With `dry_run`, nothing is deleted; the report lists what would be.
pub fn bulk_reset(
    backend: &dyn KeyValueStore,
    protected: Option<&ProtectedAccount>,
    dry_run: bool,
) -> StorageResult<SweepReport> {
    let result = sweep_keys(
        backend,
        |key| key.starts_with(USER_KEY_PREFIX),
        |key| protected.is_some_and(|account| account.protects_key(key)),
        dry_run,
    );

    match &result {
        Ok(report) => info!(
            "event=bulk_reset module=maintenance status=ok dry_run={} removed={} preserved={} failed={}",
            dry_run,
            report.removed_count(),
            report.preserved_count(),
            report.failed_count()
        ),
        Err(err) => error!(
            "event=bulk_reset module=maintenance status=error dry_run={} error={}",
            dry_run, err
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::bulk_reset;
    use crate::config::ProtectedAccount;
    use crate::storage::memory::{FaultyKeyValueStore, MemoryKeyValueStore};
    use crate::storage::KeyValueStore;

    fn seeded() -> MemoryKeyValueStore {
        let backend = MemoryKeyValueStore::new();
        for key in [
            "user_U1_notes",
            "user_U1_raffle_entries_aaryanp0302_gmail_com",
            "user_U2_raffle_entries_someone_gmail_com",
            "user_U2_notes",
            "app_theme",
        ] {
            backend.set_item(key, "{}").unwrap();
        }
        backend
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let backend = seeded();
        let account = ProtectedAccount::with_default_tag("aaryanp0302@gmail.com").unwrap();
        let report = bulk_reset(&backend, Some(&account), true).unwrap();
        assert_eq!(report.removed_count(), 3);
        assert_eq!(report.preserved_count(), 1);
        assert_eq!(backend.len(), 5);
    }

    #[test]
    fn without_protected_account_everything_namespaced_goes() {
        let backend = seeded();
        let report = bulk_reset(&backend, None, false).unwrap();
        assert_eq!(report.removed_count(), 4);
        assert_eq!(backend.keys().unwrap(), vec!["app_theme".to_string()]);
    }

    #[test]
    fn failed_delete_is_reported_and_sweep_continues() {
        let backend = FaultyKeyValueStore::seeded(&[
            "user_U1_notes",
            "user_U1_progress_tasks",
            "user_U2_notes",
        ]);
        backend.fail_remove_of("user_U1_notes");

        let report = bulk_reset(&backend, None, false).unwrap();

        assert_eq!(report.failed, vec!["user_U1_notes".to_string()]);
        assert_eq!(report.removed_count(), 2);
        assert_eq!(
            backend.inner.keys().unwrap(),
            vec!["user_U1_notes".to_string()]
        );
    }

    #[test]
    fn key_scan_failure_is_returned() {
        let backend = FaultyKeyValueStore::seeded(&["user_U1_notes"]);
        backend.fail_scan.set(true);

        assert!(bulk_reset(&backend, None, true).is_err());
        assert!(bulk_reset(&backend, None, false).is_err());
        assert_eq!(backend.inner.len(), 1);
    }
}
