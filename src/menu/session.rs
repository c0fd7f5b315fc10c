//! Per-user selection memory and browse authorization
//!
//! Selections live for the process lifetime: created on first pick,
//! overwritten on re-pick, never expired. Entries are scoped by user id so
//! concurrent sessions never contend on the same key, and no operation
//! spans more than one key.

use dashmap::{DashMap, DashSet};

use crate::rclone::config::ConfigStore;
use crate::settings::Settings;

/// Prompt sent when a user must pick a cloud before browsing.
pub const MSG_SELECT_CLOUD_FIRST: &str = "Select a cloud first, use /mirrorselect command";

/// What a remembered value is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    /// Remote chosen as the mirror destination.
    MirrorRemote,
    /// Base directory chosen on that remote.
    MirrorBaseDir,
}

/// Concurrent per-user selection store plus the multi-remote upload set.
#[derive(Debug, Default)]
pub struct SelectionStore {
    selections: DashMap<(i64, SelectionKey), String>,
    multi_remotes: DashSet<String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: i64, key: SelectionKey, value: impl Into<String>) {
        self.selections.insert((user_id, key), value.into());
    }

    pub fn get(&self, user_id: i64, key: SelectionKey) -> Option<String> {
        self.selections.get(&(user_id, key)).map(|v| v.value().clone())
    }

    /// Add a remote to the multi-remote upload set. Returns false if it was
    /// already present.
    pub fn multi_add(&self, remote: impl Into<String>) -> bool {
        self.multi_remotes.insert(remote.into())
    }

    pub fn multi_remove(&self, remote: &str) -> bool {
        self.multi_remotes.remove(remote).is_some()
    }

    /// Flip a remote's membership, returning the new state.
    pub fn multi_toggle(&self, remote: &str) -> bool {
        if self.multi_remove(remote) {
            false
        } else {
            self.multi_add(remote.to_string())
        }
    }

    pub fn multi_contains(&self, remote: &str) -> bool {
        self.multi_remotes.contains(remote)
    }

    pub fn multi_is_empty(&self) -> bool {
        self.multi_remotes.is_empty()
    }

    pub fn multi_reset(&self) {
        self.multi_remotes.clear();
    }

    /// Snapshot of the multi-remote set, for upload fan-out.
    pub fn multi_snapshot(&self) -> Vec<String> {
        self.multi_remotes.iter().map(|r| r.key().clone()).collect()
    }
}

/// Outcome of the browse-authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAccess {
    Allowed,
    /// Caller should prompt with [`MSG_SELECT_CLOUD_FIRST`].
    SelectRemoteFirst,
}

/// Whether a user may browse/select remotes right now. Privileged users
/// with a configured default remote are always allowed; as a side effect
/// the default is written into the store so later steps see a selection.
/// With multi-config off everyone is allowed; with it on, a remembered
/// selection or a non-empty multi-remote set is required.
pub fn check_remote_selected(
    settings: &Settings,
    store: &SelectionStore,
    user_id: i64,
) -> BrowseAccess {
    if settings.is_sudo(user_id) {
        if let Some(default) = &settings.default_owner_remote {
            store.set(user_id, SelectionKey::MirrorRemote, default.clone());
            return BrowseAccess::Allowed;
        }
    }
    if !settings.multi_rclone_config {
        return BrowseAccess::Allowed;
    }
    if store.get(user_id, SelectionKey::MirrorRemote).is_some() || !store.multi_is_empty() {
        BrowseAccess::Allowed
    } else {
        BrowseAccess::SelectRemoteFirst
    }
}

/// Outcome of the config-presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCheck {
    Present,
    /// Leech requests run without a destination remote, so a missing
    /// personal config is tolerated.
    MissingTolerated,
    /// Caller should send `hint` to the user.
    Missing { hint: &'static str },
}

impl ConfigCheck {
    pub fn is_usable(&self) -> bool {
        !matches!(self, ConfigCheck::Missing { .. })
    }
}

/// Check that the config file serving this user exists, per the path rule
/// in [`ConfigStore::path_for`].
pub fn check_config(
    configs: &ConfigStore,
    settings: &Settings,
    user_id: i64,
    is_leech: bool,
) -> ConfigCheck {
    let (path, hint) = configs.path_for(user_id, settings.is_sudo(user_id));
    if path.exists() {
        ConfigCheck::Present
    } else if is_leech {
        ConfigCheck::MissingTolerated
    } else {
        ConfigCheck::Missing { hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rclone::config::{MSG_GLOBAL_CONFIG_MISSING, MSG_USER_CONFIG_MISSING};

    fn settings() -> Settings {
        Settings::new("rclone", "rclone")
    }

    #[test]
    fn test_selection_overwrite() {
        let store = SelectionStore::new();
        store.set(7, SelectionKey::MirrorRemote, "gdrive");
        store.set(7, SelectionKey::MirrorRemote, "s3");
        assert_eq!(store.get(7, SelectionKey::MirrorRemote).as_deref(), Some("s3"));
        assert_eq!(store.get(8, SelectionKey::MirrorRemote), None);
    }

    #[test]
    fn test_multi_toggle() {
        let store = SelectionStore::new();
        assert!(store.multi_toggle("gdrive"));
        assert!(store.multi_contains("gdrive"));
        assert!(!store.multi_toggle("gdrive"));
        assert!(store.multi_is_empty());
    }

    #[test]
    fn test_multi_reset() {
        let store = SelectionStore::new();
        store.multi_add("a");
        store.multi_add("b");
        assert_eq!(store.multi_snapshot().len(), 2);
        store.multi_reset();
        assert!(store.multi_is_empty());
    }

    #[test]
    fn test_everyone_allowed_without_multi_config() {
        let store = SelectionStore::new();
        assert_eq!(
            check_remote_selected(&settings(), &store, 7),
            BrowseAccess::Allowed
        );
    }

    #[test]
    fn test_multi_config_requires_selection() {
        let mut s = settings();
        s.multi_rclone_config = true;
        let store = SelectionStore::new();
        assert_eq!(
            check_remote_selected(&s, &store, 7),
            BrowseAccess::SelectRemoteFirst
        );

        store.set(7, SelectionKey::MirrorRemote, "gdrive");
        assert_eq!(check_remote_selected(&s, &store, 7), BrowseAccess::Allowed);
    }

    #[test]
    fn test_multi_set_grants_access() {
        let mut s = settings();
        s.multi_rclone_config = true;
        let store = SelectionStore::new();
        store.multi_add("gdrive");
        assert_eq!(check_remote_selected(&s, &store, 7), BrowseAccess::Allowed);
    }

    #[test]
    fn test_owner_default_remote_written() {
        let mut s = settings();
        s.multi_rclone_config = true;
        s.sudo_users.insert(1);
        s.default_owner_remote = Some("owner-drive".into());
        let store = SelectionStore::new();

        assert_eq!(check_remote_selected(&s, &store, 1), BrowseAccess::Allowed);
        assert_eq!(
            store.get(1, SelectionKey::MirrorRemote).as_deref(),
            Some("owner-drive")
        );
        // Unprivileged users get no default.
        assert_eq!(
            check_remote_selected(&s, &store, 2),
            BrowseAccess::SelectRemoteFirst
        );
    }

    #[test]
    fn test_check_config_missing_global() {
        let dir = tempfile::tempdir().unwrap();
        let configs = ConfigStore::new(dir.path(), false);
        let result = check_config(&configs, &settings(), 7, false);
        assert_eq!(
            result,
            ConfigCheck::Missing {
                hint: MSG_GLOBAL_CONFIG_MISSING
            }
        );
        assert!(!result.is_usable());
    }

    #[test]
    fn test_check_config_leech_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let configs = ConfigStore::new(dir.path(), false);
        let result = check_config(&configs, &settings(), 7, true);
        assert_eq!(result, ConfigCheck::MissingTolerated);
        assert!(result.is_usable());
    }

    #[test]
    fn test_check_config_personal_hint_for_sudo() {
        let dir = tempfile::tempdir().unwrap();
        let configs = ConfigStore::new(dir.path(), false);
        let mut s = settings();
        s.sudo_users.insert(7);
        assert_eq!(
            check_config(&configs, &s, 7, false),
            ConfigCheck::Missing {
                hint: MSG_USER_CONFIG_MISSING
            }
        );
    }

    #[test]
    fn test_check_config_present() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("rclone_global");
        std::fs::create_dir_all(&global).unwrap();
        std::fs::write(global.join("rclone.conf"), "[r]\ntype = drive\n").unwrap();

        let configs = ConfigStore::new(dir.path(), false);
        assert_eq!(check_config(&configs, &settings(), 7, false), ConfigCheck::Present);
    }
}
