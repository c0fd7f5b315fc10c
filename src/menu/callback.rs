//! Callback wire protocol
//!
//! Navigation state rides through the messaging transport as a compact
//! `^`-delimited string: menu code, action word, then a tail whose shape
//! depends on the action. The action vocabulary is closed and every decode
//! validates the field count for the declared action, so a corrupt button
//! press surfaces as `MalformedCallback` instead of scrambled state.

use std::fmt;
use std::str::FromStr;

use crate::error::{NavError, Result};

/// Field delimiter. Must not appear in remote names or paths.
pub const DELIMITER: char = '^';

/// Telegram bounds callback data at 64 bytes; encodings beyond this will
/// not survive the round trip.
pub const MAX_CALLBACK_LEN: usize = 64;

/// Which menu a callback belongs to. Determines caption text, button set
/// and the file-pick action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuType {
    RemoteSelect,
    Cleanup,
    Storage,
    MirrorSelect,
    Sync,
    Leech,
    Copy,
}

impl MenuType {
    pub fn all() -> &'static [MenuType] {
        &[
            MenuType::RemoteSelect,
            MenuType::Cleanup,
            MenuType::Storage,
            MenuType::MirrorSelect,
            MenuType::Sync,
            MenuType::Leech,
            MenuType::Copy,
        ]
    }

    /// Stable wire code carried as the first callback field.
    pub fn code(&self) -> &'static str {
        match self {
            MenuType::RemoteSelect => "remotes",
            MenuType::Cleanup => "cleanup",
            MenuType::Storage => "storage",
            MenuType::MirrorSelect => "mirrorselect",
            MenuType::Sync => "sync",
            MenuType::Leech => "leech",
            MenuType::Copy => "copy",
        }
    }
}

impl FromStr for MenuType {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "remotes" => Ok(MenuType::RemoteSelect),
            "cleanup" => Ok(MenuType::Cleanup),
            "storage" => Ok(MenuType::Storage),
            "mirrorselect" => Ok(MenuType::MirrorSelect),
            "sync" => Ok(MenuType::Sync),
            "leech" => Ok(MenuType::Leech),
            "copy" => Ok(MenuType::Copy),
            _ => Err(NavError::MalformedCallback(format!("unknown menu '{s}'"))),
        }
    }
}

/// Which side of an operation a remote pick refers to. Sync menus browse
/// both sides; everything else picks a plain remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRole {
    Remote,
    Source,
    Destination,
}

impl RemoteRole {
    fn word(&self) -> &'static str {
        match self {
            RemoteRole::Remote => "remote",
            RemoteRole::Source => "source",
            RemoteRole::Destination => "destination",
        }
    }
}

impl fmt::Display for RemoteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// What a picked file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
    Mirror,
    Leech,
}

impl PickPurpose {
    fn word(&self) -> &'static str {
        match self {
            PickPurpose::Mirror => "mirror_file",
            PickPurpose::Leech => "leech_file",
        }
    }
}

/// One button press, decoded. Each variant carries exactly the fields its
/// wire tail holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A remote chosen from the remote-listing menu.
    SelectRemote {
        role: RemoteRole,
        remote: String,
        is_crypt: bool,
        user_id: i64,
    },
    /// Descend into a directory.
    OpenDir {
        remote: String,
        path: String,
        is_crypt: bool,
        user_id: i64,
    },
    /// A file chosen from a folder menu.
    PickFile {
        purpose: PickPurpose,
        remote: String,
        path: String,
        is_crypt: bool,
        user_id: i64,
    },
    /// Return to the parent of the current path.
    Back {
        remote: String,
        path: String,
        is_crypt: bool,
        user_id: i64,
    },
    /// Re-render the current folder at another page.
    NextPage {
        remote: String,
        path: String,
        is_crypt: bool,
        page: usize,
        user_id: i64,
    },
    /// "Select this folder" on a leech menu.
    SelectFolder { user_id: i64 },
    /// Clear the multi-remote selection set.
    Reset { user_id: i64 },
    /// Dismiss the menu.
    Close { user_id: i64 },
}

impl Action {
    /// The user the pressed button was rendered for.
    pub fn user_id(&self) -> i64 {
        match self {
            Action::SelectRemote { user_id, .. }
            | Action::OpenDir { user_id, .. }
            | Action::PickFile { user_id, .. }
            | Action::Back { user_id, .. }
            | Action::NextPage { user_id, .. }
            | Action::SelectFolder { user_id }
            | Action::Reset { user_id }
            | Action::Close { user_id } => *user_id,
        }
    }
}

/// A complete callback: menu plus action. Value type; decoding always
/// produces a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub menu: MenuType,
    pub action: Action,
}

impl Callback {
    pub fn new(menu: MenuType, action: Action) -> Self {
        Self { menu, action }
    }

    pub fn user_id(&self) -> i64 {
        self.action.user_id()
    }

    /// Encode to the wire string. Infallible; the transport length bound is
    /// checked where buttons are built.
    pub fn encode(&self) -> String {
        let menu = self.menu.code();
        let d = DELIMITER;
        match &self.action {
            Action::SelectRemote {
                role,
                remote,
                is_crypt,
                user_id,
            } => format!("{menu}{d}{}{d}{remote}{d}{is_crypt}{d}{user_id}", role.word()),
            Action::OpenDir {
                remote,
                path,
                is_crypt,
                user_id,
            } => format!("{menu}{d}remote_dir{d}{remote}{d}{path}{d}{is_crypt}{d}{user_id}"),
            Action::PickFile {
                purpose,
                remote,
                path,
                is_crypt,
                user_id,
            } => format!(
                "{menu}{d}{}{d}{remote}{d}{path}{d}{is_crypt}{d}{user_id}",
                purpose.word()
            ),
            Action::Back {
                remote,
                path,
                is_crypt,
                user_id,
            } => format!("{menu}{d}back{d}{remote}{d}{path}{d}{is_crypt}{d}{user_id}"),
            Action::NextPage {
                remote,
                path,
                is_crypt,
                page,
                user_id,
            } => format!(
                "{menu}{d}next_page{d}{remote}{d}{path}{d}{is_crypt}{d}{page}{d}{user_id}"
            ),
            Action::SelectFolder { user_id } => format!("{menu}{d}leech_folder{d}{user_id}"),
            Action::Reset { user_id } => format!("{menu}{d}reset{d}{user_id}"),
            Action::Close { user_id } => format!("{menu}{d}close{d}{user_id}"),
        }
    }

    /// Decode a wire string, validating field count and field types for the
    /// declared action.
    pub fn decode(data: &str) -> Result<Self> {
        let fields: Vec<&str> = data.split(DELIMITER).collect();
        if fields.len() < 3 {
            return Err(NavError::MalformedCallback(format!(
                "expected at least 3 fields, got {}",
                fields.len()
            )));
        }

        let menu: MenuType = fields[0].parse()?;
        let word = fields[1];

        let action = match word {
            "remote" | "source" | "destination" => {
                require_fields(word, &fields, 5)?;
                let role = match word {
                    "remote" => RemoteRole::Remote,
                    "source" => RemoteRole::Source,
                    _ => RemoteRole::Destination,
                };
                Action::SelectRemote {
                    role,
                    remote: fields[2].to_string(),
                    is_crypt: parse_bool(fields[3])?,
                    user_id: parse_user_id(fields[4])?,
                }
            }
            "remote_dir" => {
                require_fields(word, &fields, 6)?;
                Action::OpenDir {
                    remote: fields[2].to_string(),
                    path: fields[3].to_string(),
                    is_crypt: parse_bool(fields[4])?,
                    user_id: parse_user_id(fields[5])?,
                }
            }
            "mirror_file" | "leech_file" => {
                require_fields(word, &fields, 6)?;
                let purpose = if word == "mirror_file" {
                    PickPurpose::Mirror
                } else {
                    PickPurpose::Leech
                };
                Action::PickFile {
                    purpose,
                    remote: fields[2].to_string(),
                    path: fields[3].to_string(),
                    is_crypt: parse_bool(fields[4])?,
                    user_id: parse_user_id(fields[5])?,
                }
            }
            "back" => {
                require_fields(word, &fields, 6)?;
                Action::Back {
                    remote: fields[2].to_string(),
                    path: fields[3].to_string(),
                    is_crypt: parse_bool(fields[4])?,
                    user_id: parse_user_id(fields[5])?,
                }
            }
            "next_page" => {
                require_fields(word, &fields, 7)?;
                Action::NextPage {
                    remote: fields[2].to_string(),
                    path: fields[3].to_string(),
                    is_crypt: parse_bool(fields[4])?,
                    page: fields[5].parse().map_err(|_| {
                        NavError::MalformedCallback(format!("bad page '{}'", fields[5]))
                    })?,
                    user_id: parse_user_id(fields[6])?,
                }
            }
            "leech_folder" => {
                require_fields(word, &fields, 3)?;
                Action::SelectFolder {
                    user_id: parse_user_id(fields[2])?,
                }
            }
            "reset" => {
                require_fields(word, &fields, 3)?;
                Action::Reset {
                    user_id: parse_user_id(fields[2])?,
                }
            }
            "close" => {
                require_fields(word, &fields, 3)?;
                Action::Close {
                    user_id: parse_user_id(fields[2])?,
                }
            }
            _ => {
                return Err(NavError::MalformedCallback(format!(
                    "unknown action '{word}'"
                )))
            }
        };

        Ok(Callback { menu, action })
    }
}

fn require_fields(word: &str, fields: &[&str], expected: usize) -> Result<()> {
    if fields.len() != expected {
        return Err(NavError::MalformedCallback(format!(
            "action '{word}' expects {expected} fields, got {}",
            fields.len()
        )));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(NavError::MalformedCallback(format!("bad bool '{s}'"))),
    }
}

fn parse_user_id(s: &str) -> Result<i64> {
    s.parse()
        .map_err(|_| NavError::MalformedCallback(format!("bad user id '{s}'")))
}
