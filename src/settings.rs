//! Process configuration snapshot.
//!
//! The bot's configuration store lives outside this crate; the engine
//! consumes an owned snapshot so a navigation step never reads ambient
//! mutable state mid-flight.

use std::collections::HashSet;
use std::path::PathBuf;

/// Default number of entry buttons per menu page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Snapshot of the bot configuration consumed by the navigation engine.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the rclone executable.
    pub rclone_exe: PathBuf,
    /// Base directory holding per-user and global config files.
    pub rclone_dir: PathBuf,
    /// Every user maintains an independent config file when set.
    pub multi_rclone_config: bool,
    /// Uploads fan out to every remote in the multi-remote selection set.
    pub multi_remote_upload: bool,
    /// Remote auto-selected for privileged owners.
    pub default_owner_remote: Option<String>,
    /// Pass `--drive-server-side-across-configs` on transfers.
    pub server_side_copies: bool,
    /// Comma-separated custom flags per transfer operation, `key:value`
    /// items becoming flag+argument pairs.
    pub copy_flags: Option<String>,
    pub upload_flags: Option<String>,
    pub download_flags: Option<String>,
    /// File extensions excluded from every transfer.
    pub extension_filter: Vec<String>,
    /// User ids allowed privileged operations.
    pub sudo_users: HashSet<i64>,
    /// Entry buttons shown per folder-menu page.
    pub items_per_page: usize,
}

impl Settings {
    pub fn new(rclone_exe: impl Into<PathBuf>, rclone_dir: impl Into<PathBuf>) -> Self {
        Self {
            rclone_exe: rclone_exe.into(),
            rclone_dir: rclone_dir.into(),
            multi_rclone_config: false,
            multi_remote_upload: false,
            default_owner_remote: None,
            server_side_copies: false,
            copy_flags: None,
            upload_flags: None,
            download_flags: None,
            extension_filter: Vec::new(),
            sudo_users: HashSet::new(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }

    /// Whether a user may perform privileged operations.
    pub fn is_sudo(&self, user_id: i64) -> bool {
        self.sudo_users.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sudo_check() {
        let mut settings = Settings::new("rclone", "rclone");
        settings.sudo_users.insert(42);
        assert!(settings.is_sudo(42));
        assert!(!settings.is_sudo(7));
    }
}
