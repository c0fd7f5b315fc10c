//! Rclone process runner
//!
//! Spawns rclone through tokio so a hung listing suspends only the session
//! that asked for it. Output is captured whole; listings are small and the
//! menu layer needs the complete payload anyway.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{NavError, Result};

/// Captured output of one rclone invocation.
#[derive(Debug, Clone)]
pub struct RcloneOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status code, -1 when terminated by signal.
    pub status: i32,
}

impl RcloneOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs rclone commands against a specific config file.
#[derive(Debug, Clone)]
pub struct Rclone {
    exe_path: PathBuf,
    config_path: Option<PathBuf>,
}

impl Rclone {
    pub fn new(exe_path: impl AsRef<Path>) -> Self {
        Self {
            exe_path: exe_path.as_ref().to_path_buf(),
            config_path: None,
        }
    }

    /// Set the config file passed as `--config=<path>`.
    pub fn with_config(mut self, config_path: impl AsRef<Path>) -> Self {
        self.config_path = Some(config_path.as_ref().to_path_buf());
        self
    }

    /// Run an rclone command and capture output. Spawn failures (missing
    /// executable) surface as `ListingFailed`; a nonzero exit does not —
    /// callers decide what the status means.
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<RcloneOutput> {
        let mut cmd = Command::new(&self.exe_path);
        if let Some(ref config) = self.config_path {
            cmd.arg(format!("--config={}", config.display()));
        }
        for arg in args {
            cmd.arg(arg.as_ref());
        }
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|err| {
            NavError::ListingFailed(format!(
                "failed to spawn rclone at {:?}: {err}",
                self.exe_path
            ))
        })?;

        Ok(RcloneOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }

    pub fn exe_path(&self) -> &Path {
        &self.exe_path
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_failure_is_listing_failed() {
        let rclone = Rclone::new("/nonexistent/rclone-binary");
        let err = rclone.run(&["version"]).await.unwrap_err();
        assert!(matches!(err, NavError::ListingFailed(_)));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_nonzero_exit_is_not_an_error() {
        // `false` takes no args and exits 1; good enough to stand in for a
        // probe against a missing path.
        let rclone = Rclone::new("false");
        let output = rclone.run::<&str>(&[]).await.unwrap();
        assert!(!output.success());
        assert_eq!(output.status, 1);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_config_flag_prepended() {
        let rclone = Rclone::new("echo").with_config("/tmp/rclone.conf");
        let output = rclone.run(&["lsjson", "remote:"]).await.unwrap();
        assert!(output.success());
        assert_eq!(
            output.stdout.trim(),
            "--config=/tmp/rclone.conf lsjson remote:"
        );
    }
}
