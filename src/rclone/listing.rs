//! Directory listing via `rclone lsjson`
//!
//! One level at a time: menus never need recursion, and leech menus ask for
//! the fast-enumeration flags so large folders stay responsive.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::rclone::process::Rclone;

/// One listed item as the menu layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Raw lsjson row. Only `Name` and `IsDir` matter for navigation; the rest
/// is parsed when present and dropped.
#[derive(Debug, Clone, Deserialize)]
struct LsJsonEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "IsDir")]
    is_dir: bool,
    #[serde(rename = "Size", default)]
    _size: Option<i64>,
    #[serde(rename = "ModTime", default)]
    _mod_time: Option<DateTime<Utc>>,
}

impl From<LsJsonEntry> for DirectoryEntry {
    fn from(entry: LsJsonEntry) -> Self {
        Self {
            name: entry.name,
            is_dir: entry.is_dir,
        }
    }
}

/// Listing performance options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Pass `--fast-list` (fewer transactions on bucket-based remotes).
    pub fast_list: bool,
    /// Pass `--no-modtime` (skip the per-entry modification-time fetch).
    pub no_modtime: bool,
}

impl ListOptions {
    /// The flag set leech menus browse with.
    pub fn fast() -> Self {
        Self {
            fast_list: true,
            no_modtime: true,
        }
    }
}

fn target(remote: &str, path: &str) -> String {
    format!("{remote}:{path}")
}

/// List one directory of `remote:path`. Entry order is whatever rclone
/// returned; the menu layer does not re-sort.
pub async fn list_dir(
    rclone: &Rclone,
    remote: &str,
    path: &str,
    options: ListOptions,
) -> Result<Vec<DirectoryEntry>> {
    let mut args = vec!["lsjson".to_string(), target(remote, path)];
    if options.fast_list {
        args.push("--fast-list".to_string());
    }
    if options.no_modtime {
        args.push("--no-modtime".to_string());
    }

    let output = rclone.run(&args).await?;
    if !output.success() {
        return Err(NavError::ListingFailed(format!(
            "rclone lsjson exited with status {}: {}",
            output.status,
            output.stderr.trim()
        )));
    }

    let entries: Vec<LsJsonEntry> = serde_json::from_str(output.stdout.trim())
        .map_err(|err| NavError::ListingFailed(format!("unparsable lsjson payload: {err}")))?;

    Ok(entries.into_iter().map(DirectoryEntry::from).collect())
}

/// Probe whether `remote:path` exists. Existence is judged purely by the
/// probe's exit status — nonzero means "no", never an error. Only a failure
/// to spawn rclone at all propagates.
pub async fn path_exists(rclone: &Rclone, remote: &str, path: &str) -> Result<bool> {
    let args = ["lsjson".to_string(), target(remote, path)];
    let output = rclone.run(&args).await?;
    if !output.success() {
        tracing::info!(remote, path, status = output.status, "path probe failed");
    }
    Ok(output.success())
}
