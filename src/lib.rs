//! rclone-nav library crate
//!
//! Remote/path navigation engine for an rclone-backed Telegram mirror bot:
//! turns a remote configuration file plus on-demand directory listings into
//! a paginated, callback-driven menu tree, unwrapping crypt-remote
//! indirection along the way. The messaging transport, keyboard widget and
//! transfer engine live outside this crate behind small interfaces.

pub mod error;
pub mod menu;
pub mod navigator;
pub mod rclone;
pub mod settings;

pub use error::NavError;
pub use navigator::{MenuTransport, Navigator, StepOutcome};
pub use settings::Settings;
