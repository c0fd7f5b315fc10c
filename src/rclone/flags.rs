//! Transfer flag assembly
//!
//! Builds the extra rclone arguments a copy/upload/download invocation
//! carries. The transfer engine itself lives outside this crate; it calls
//! in here so user-configured flags and the global extension filter are
//! applied uniformly.

use crate::settings::Settings;

/// Which transfer operation the flags are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    Copy,
    Upload,
    Download,
}

/// Assemble the flag set for a transfer invocation.
pub fn transfer_flags(settings: &Settings, op: TransferOp) -> Vec<String> {
    let mut args = Vec::new();

    if !settings.extension_filter.is_empty() {
        args.push("--exclude".to_string());
        args.push(format!("*.{{{}}}", settings.extension_filter.join(",")));
    }
    if settings.server_side_copies {
        args.push("--drive-server-side-across-configs".to_string());
    }

    let custom = match op {
        TransferOp::Copy => settings.copy_flags.as_deref(),
        TransferOp::Upload => settings.upload_flags.as_deref(),
        TransferOp::Download => settings.download_flags.as_deref(),
    };
    if let Some(raw) = custom {
        append_flags(raw, &mut args);
    }

    args
}

/// Split a comma-separated flag string into arguments. A `key:value` item
/// becomes a flag followed by its argument; a bare item becomes a lone flag;
/// empty items are skipped.
fn append_flags(raw: &str, args: &mut Vec<String>) {
    for flag in raw.split(',') {
        if let Some((key, value)) = flag.split_once(':') {
            args.push(key.to_string());
            args.push(value.to_string());
        } else if !flag.is_empty() {
            args.push(flag.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::new("rclone", "rclone")
    }

    #[test]
    fn test_extension_filter_first() {
        let mut s = settings();
        s.extension_filter = vec!["iso".into(), "zip".into()];
        let args = transfer_flags(&s, TransferOp::Copy);
        assert_eq!(args, ["--exclude", "*.{iso,zip}"]);
    }

    #[test]
    fn test_server_side_flag() {
        let mut s = settings();
        s.server_side_copies = true;
        let args = transfer_flags(&s, TransferOp::Upload);
        assert_eq!(args, ["--drive-server-side-across-configs"]);
    }

    #[test]
    fn test_custom_flags_split() {
        let mut s = settings();
        s.download_flags = Some("--transfers:8,--progress".into());
        let args = transfer_flags(&s, TransferOp::Download);
        assert_eq!(args, ["--transfers", "8", "--progress"]);
    }

    #[test]
    fn test_op_selects_flag_string() {
        let mut s = settings();
        s.copy_flags = Some("--checkers:16".into());
        s.upload_flags = Some("--progress".into());
        assert_eq!(transfer_flags(&s, TransferOp::Copy), ["--checkers", "16"]);
        assert_eq!(transfer_flags(&s, TransferOp::Upload), ["--progress"]);
        assert!(transfer_flags(&s, TransferOp::Download).is_empty());
    }

    #[test]
    fn test_empty_items_skipped() {
        let mut args = Vec::new();
        append_flags("--progress,,--fast-list", &mut args);
        assert_eq!(args, ["--progress", "--fast-list"]);
    }
}
