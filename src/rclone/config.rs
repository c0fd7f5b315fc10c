//! Rclone configuration resolution
//!
//! Locates the config file a user's menus operate on, parses the INI format
//! into ordered remote sections, and resolves crypt-remote indirection to
//! the underlying physical remote for capability checks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{NavError, Result};

/// Storage provider classification used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Backed by Google Drive (directly or through a crypt overlay).
    Drive,
    /// Anything else.
    Other,
}

/// A parsed remote section from an rclone config file.
#[derive(Debug, Clone)]
pub struct RemoteSection {
    /// Remote name (section header without brackets).
    pub name: String,
    /// Declared `type` (e.g. "drive", "crypt", "s3").
    pub remote_type: String,
    /// Remaining key-value options.
    pub options: HashMap<String, String>,
}

impl RemoteSection {
    pub fn is_crypt(&self) -> bool {
        self.remote_type == "crypt"
    }

    /// The `remote` pointer of a crypt section, `<target>:<path-prefix>`.
    pub fn crypt_pointer(&self) -> Option<&str> {
        self.options.get("remote").map(String::as_str)
    }
}

/// Parsed rclone configuration. Section order follows the file so menus
/// list remotes the way the user wrote them.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    sections: Vec<RemoteSection>,
}

impl RemoteConfig {
    /// Parse config from INI text. Unknown keys are kept as options;
    /// `#` and `;` comment lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut config = RemoteConfig::default();
        let mut current: Option<RemoteSection> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                if let Some(section) = current.take() {
                    config.sections.push(section);
                }
                current = Some(RemoteSection {
                    name: line[1..line.len() - 1].to_string(),
                    remote_type: String::new(),
                    options: HashMap::new(),
                });
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let (key, value) = (key.trim(), value.trim());
                if let Some(ref mut section) = current {
                    if key == "type" {
                        section.remote_type = value.to_string();
                    } else {
                        section.options.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        if let Some(section) = current {
            config.sections.push(section);
        }

        config
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| NavError::ConfigNotFound {
            path: path.to_path_buf(),
            hint: MSG_GLOBAL_CONFIG_MISSING,
        })?;
        Ok(Self::parse(&content))
    }

    /// All sections in file order.
    pub fn sections(&self) -> &[RemoteSection] {
        &self.sections
    }

    /// Find a remote by name.
    pub fn section(&self, name: &str) -> Option<&RemoteSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn require_section(&self, name: &str) -> Result<&RemoteSection> {
        self.section(name)
            .ok_or_else(|| NavError::invalid_remote(name, "remote not in config"))
    }

    /// Classify the storage provider behind `remote`, unwrapping one level
    /// of crypt indirection. A crypt section's `remote` pointer has the form
    /// `<target-remote>:<path-prefix>`; only the target's declared type
    /// decides the kind, so crypt-on-crypt resolves to `Other`.
    pub fn provider_kind(&self, remote: &str) -> Result<ProviderKind> {
        let section = self.require_section(remote)?;
        match section.remote_type.as_str() {
            "drive" => Ok(ProviderKind::Drive),
            "crypt" => {
                let pointer = section.crypt_pointer().ok_or_else(|| {
                    NavError::invalid_remote(remote, "crypt section has no remote pointer")
                })?;
                let target_name = pointer.split(':').next().unwrap_or(pointer);
                let target = self.section(target_name).ok_or_else(|| {
                    NavError::invalid_remote(
                        remote,
                        format!("crypt target '{target_name}' not in config"),
                    )
                })?;
                if target.remote_type == "drive" {
                    Ok(ProviderKind::Drive)
                } else {
                    Ok(ProviderKind::Other)
                }
            }
            _ => Ok(ProviderKind::Other),
        }
    }

    /// The crypt pointer of `remote`, validated against the config. Used by
    /// mirror-select menus to show the physical path behind a crypt remote.
    pub fn resolved_crypt_pointer(&self, remote: &str) -> Result<&str> {
        let section = self.require_section(remote)?;
        if !section.is_crypt() {
            return Err(NavError::invalid_remote(remote, "not a crypt remote"));
        }
        let pointer = section
            .crypt_pointer()
            .ok_or_else(|| NavError::invalid_remote(remote, "crypt section has no remote pointer"))?;
        let target_name = pointer.split(':').next().unwrap_or(pointer);
        self.section(target_name).ok_or_else(|| {
            NavError::invalid_remote(remote, format!("crypt target '{target_name}' not in config"))
        })?;
        Ok(pointer)
    }
}

/// Recovery hint when a per-user config file is missing.
pub const MSG_USER_CONFIG_MISSING: &str = "Send a rclone config file, use /files command";
/// Recovery hint when the shared global config file is missing.
pub const MSG_GLOBAL_CONFIG_MISSING: &str = "Rclone config file not found";

/// Locates per-user and global rclone config files under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: PathBuf,
    multi_config: bool,
}

impl ConfigStore {
    pub fn new(base_dir: impl Into<PathBuf>, multi_config: bool) -> Self {
        Self {
            base_dir: base_dir.into(),
            multi_config,
        }
    }

    fn user_path(&self, user_id: i64) -> PathBuf {
        self.base_dir.join(user_id.to_string()).join("rclone.conf")
    }

    fn global_path(&self) -> PathBuf {
        self.base_dir.join("rclone_global").join("rclone.conf")
    }

    /// Which config file serves this user. Multi-config mode always uses the
    /// per-user path; otherwise privileged users get a personal file and
    /// everyone else shares the global one.
    pub fn path_for(&self, user_id: i64, is_privileged: bool) -> (PathBuf, &'static str) {
        if self.multi_config || is_privileged {
            (self.user_path(user_id), MSG_USER_CONFIG_MISSING)
        } else {
            (self.global_path(), MSG_GLOBAL_CONFIG_MISSING)
        }
    }

    /// Resolve and verify the config path, failing with `ConfigNotFound`
    /// when the file does not exist.
    pub fn require(&self, user_id: i64, is_privileged: bool) -> Result<PathBuf> {
        let (path, hint) = self.path_for(user_id, is_privileged);
        if path.exists() {
            Ok(path)
        } else {
            Err(NavError::ConfigNotFound { path, hint })
        }
    }

    /// Resolve, verify and parse in one step.
    pub fn load(&self, user_id: i64, is_privileged: bool) -> Result<(PathBuf, RemoteConfig)> {
        let path = self.require(user_id, is_privileged)?;
        let config = RemoteConfig::read(&path)?;
        Ok((path, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RemoteConfig {
        RemoteConfig::parse(
            r#"
# personal clouds
[gdrive]
type = drive
client_id = abc123

[enc]
type = crypt
remote = gdrive:secret
password = obscured

[s3]
type = s3
provider = AWS

[enc2]
type = crypt
remote = s3:bucket

[dangling]
type = crypt
remote = gone:dir
"#,
        )
    }

    #[test]
    fn test_parse_keeps_section_order() {
        let config = sample_config();
        let names: Vec<&str> = config.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["gdrive", "enc", "s3", "enc2", "dangling"]);
    }

    #[test]
    fn test_parse_options() {
        let config = sample_config();
        let gdrive = config.section("gdrive").unwrap();
        assert_eq!(gdrive.remote_type, "drive");
        assert_eq!(gdrive.options.get("client_id"), Some(&"abc123".to_string()));
        assert!(config.section("missing").is_none());
    }

    #[test]
    fn test_provider_kind_drive() {
        let config = sample_config();
        assert_eq!(config.provider_kind("gdrive").unwrap(), ProviderKind::Drive);
    }

    #[test]
    fn test_provider_kind_crypt_over_drive() {
        let config = sample_config();
        assert_eq!(config.provider_kind("enc").unwrap(), ProviderKind::Drive);
    }

    #[test]
    fn test_provider_kind_crypt_over_s3() {
        let config = sample_config();
        assert_eq!(config.provider_kind("enc2").unwrap(), ProviderKind::Other);
        assert_eq!(config.provider_kind("s3").unwrap(), ProviderKind::Other);
    }

    #[test]
    fn test_provider_kind_dangling_crypt_target() {
        let config = sample_config();
        let err = config.provider_kind("dangling").unwrap_err();
        assert!(matches!(err, NavError::InvalidRemote { .. }));
    }

    #[test]
    fn test_provider_kind_unknown_remote() {
        let config = sample_config();
        assert!(matches!(
            config.provider_kind("nope"),
            Err(NavError::InvalidRemote { .. })
        ));
    }

    #[test]
    fn test_resolved_crypt_pointer() {
        let config = sample_config();
        assert_eq!(config.resolved_crypt_pointer("enc").unwrap(), "gdrive:secret");
        assert!(config.resolved_crypt_pointer("gdrive").is_err());
        assert!(config.resolved_crypt_pointer("dangling").is_err());
    }

    #[test]
    fn test_path_rule_multi_config() {
        let store = ConfigStore::new("rclone", true);
        let (path, hint) = store.path_for(7, false);
        assert_eq!(path, PathBuf::from("rclone/7/rclone.conf"));
        assert_eq!(hint, MSG_USER_CONFIG_MISSING);
    }

    #[test]
    fn test_path_rule_shared_config() {
        let store = ConfigStore::new("rclone", false);
        let (privileged, _) = store.path_for(7, true);
        assert_eq!(privileged, PathBuf::from("rclone/7/rclone.conf"));
        let (shared, hint) = store.path_for(7, false);
        assert_eq!(shared, PathBuf::from("rclone/rclone_global/rclone.conf"));
        assert_eq!(hint, MSG_GLOBAL_CONFIG_MISSING);
    }

    #[test]
    fn test_require_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path(), false);
        let err = store.require(7, false).unwrap_err();
        assert!(matches!(err, NavError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let user_dir = dir.path().join("7");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("rclone.conf"), "[gdrive]\ntype = drive\n").unwrap();

        let store = ConfigStore::new(dir.path(), true);
        let (_, config) = store.load(7, false).unwrap();
        assert_eq!(config.sections().len(), 1);
        assert_eq!(config.provider_kind("gdrive").unwrap(), ProviderKind::Drive);
    }
}
