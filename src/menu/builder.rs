//! Menu construction policy
//!
//! Decides which buttons a menu shows, their labels, glyphs, ordering,
//! pagination and caption text. The output is a plain caption + button
//! grid; whether it becomes a fresh message or an edit is the caller's
//! call, and actually sending it is the transport's.

use crate::error::Result;
use crate::menu::callback::{
    Action, Callback, MenuType, PickPurpose, RemoteRole, MAX_CALLBACK_LEN,
};
use crate::menu::session::{SelectionKey, SelectionStore};
use crate::rclone::config::RemoteConfig;
use crate::rclone::listing::DirectoryEntry;
use crate::settings::Settings;

const FOLDER_GLYPH: &str = "📁";
const FILE_GLYPH: &str = "📄";
const CRYPT_GLYPH: &str = "🔐";
const SELECTED_GLYPH: &str = "✅";

const CLOSE_LABEL: &str = "✘ Close Menu";
const BACK_LABEL: &str = "⬅️ Back";
const RESET_LABEL: &str = "🔄 Reset";
const PREV_PAGE_LABEL: &str = "⏪ Prev";
const NEXT_PAGE_LABEL: &str = "⏩ Next";

/// Buttons shown side by side in the grid body.
const GRID_COLUMNS: usize = 2;

/// One inline button: visible label plus encoded callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

/// A menu ready for the transport: caption text (simple HTML markup) and
/// the button grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMenu {
    pub caption: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl RenderedMenu {
    /// Flat iterator over every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.keyboard.iter().flatten()
    }
}

/// Accumulates buttons, then lays them out two per row with each footer
/// button on its own row.
#[derive(Debug, Default)]
struct GridBuilder {
    body: Vec<Button>,
    footer: Vec<Button>,
}

impl GridBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, label: impl Into<String>, callback: &Callback) {
        self.body.push(make_button(label, callback));
    }

    fn push_footer(&mut self, label: impl Into<String>, callback: &Callback) {
        self.footer.push(make_button(label, callback));
    }

    fn build(self) -> Vec<Vec<Button>> {
        let mut rows: Vec<Vec<Button>> = self
            .body
            .chunks(GRID_COLUMNS)
            .map(|chunk| chunk.to_vec())
            .collect();
        for button in self.footer {
            rows.push(vec![button]);
        }
        rows
    }
}

fn make_button(label: impl Into<String>, callback: &Callback) -> Button {
    let data = callback.encode();
    if data.len() > MAX_CALLBACK_LEN {
        tracing::warn!(
            len = data.len(),
            limit = MAX_CALLBACK_LEN,
            data = %data,
            "callback data exceeds transport limit and will not round-trip"
        );
    }
    Button {
        label: label.into(),
        data,
    }
}

/// Inputs for a remote-listing menu (the top level of the tree, before a
/// folder has been entered).
#[derive(Debug, Clone, Copy)]
pub struct RemoteMenuRequest {
    pub menu: MenuType,
    pub role: RemoteRole,
    pub user_id: i64,
    pub is_privileged: bool,
    pub is_second_menu: bool,
}

/// Build the remote-listing menu: one button per configured remote, in
/// config-file order, then the menu-type footer buttons.
pub fn build_remote_menu(
    settings: &Settings,
    store: &SelectionStore,
    config: &RemoteConfig,
    req: RemoteMenuRequest,
) -> RenderedMenu {
    let mut grid = GridBuilder::new();
    let multi_upload = settings.multi_remote_upload && req.is_privileged;

    for section in config.sections() {
        let is_crypt = section.is_crypt();
        let mut label = String::new();
        if multi_upload && store.multi_contains(&section.name) {
            label.push_str(SELECTED_GLYPH);
            label.push(' ');
        }
        if is_crypt {
            label.push_str(CRYPT_GLYPH);
            label.push(' ');
        }
        label.push_str(FOLDER_GLYPH);
        label.push(' ');
        label.push_str(&section.name);

        let callback = Callback::new(
            req.menu,
            Action::SelectRemote {
                role: req.role,
                remote: section.name.clone(),
                is_crypt,
                user_id: req.user_id,
            },
        );
        grid.push(label, &callback);
    }

    if req.menu == MenuType::MirrorSelect && settings.multi_remote_upload {
        grid.push_footer(
            RESET_LABEL,
            &Callback::new(req.menu, Action::Reset { user_id: req.user_id }),
        );
    }
    grid.push_footer(
        CLOSE_LABEL,
        &Callback::new(req.menu, Action::Close { user_id: req.user_id }),
    );

    RenderedMenu {
        caption: remote_menu_caption(settings, store, req),
        keyboard: grid.build(),
    }
}

fn remote_menu_caption(
    settings: &Settings,
    store: &SelectionStore,
    req: RemoteMenuRequest,
) -> String {
    if req.is_second_menu {
        return "Select folder where you want to copy".to_string();
    }
    match req.menu {
        MenuType::RemoteSelect => "Select cloud where you want to mirror the file".to_string(),
        MenuType::Cleanup => "Select cloud to delete trash".to_string(),
        MenuType::Storage => "Select cloud to view info".to_string(),
        MenuType::MirrorSelect => {
            if settings.multi_remote_upload {
                "Select all clouds where you want to upload file".to_string()
            } else {
                let remote = store
                    .get(req.user_id, SelectionKey::MirrorRemote)
                    .unwrap_or_default();
                let base_dir = store
                    .get(req.user_id, SelectionKey::MirrorBaseDir)
                    .unwrap_or_default();
                format!(
                    "Select cloud where you want to store files\n\n<b>Path:</b> <code>{remote}:{base_dir}</code>"
                )
            }
        }
        MenuType::Sync => format!(
            "Select <b>{}</b> cloud\n\n<b>Note</b>: Sync makes source and destination identical, modifying destination only.",
            req.role
        ),
        MenuType::Leech | MenuType::Copy => "Select cloud where your files are stored".to_string(),
    }
}

/// Where in the menu tree a folder menu is being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderMenuState {
    pub menu: MenuType,
    pub remote: String,
    pub path: String,
    pub is_crypt: bool,
    pub user_id: i64,
}

/// Presentation flags for one folder-menu render.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderMenuFlags {
    /// Zero-based page of the entry window.
    pub page: usize,
    /// Confirmation step after a folder pick; adds the back button.
    pub is_second_menu: bool,
}

/// Build a folder menu: the menu type's selection affordance, one button
/// per (windowed) directory entry, pagination, then the footer buttons.
///
/// Browsing a crypt remote under mirror-select does not list entries at
/// all: the whole overlay is selected as one unit and the caption shows
/// the physical path behind it.
pub fn build_folder_menu(
    settings: &Settings,
    config: &RemoteConfig,
    state: &FolderMenuState,
    entries: &[DirectoryEntry],
    flags: FolderMenuFlags,
) -> Result<RenderedMenu> {
    let mut grid = GridBuilder::new();
    let user_id = state.user_id;
    let location = format!("{}:{}", state.remote, state.path);

    let (caption, purpose) = match state.menu {
        MenuType::Leech => {
            grid.push(
                format!("{SELECTED_GLYPH} Select this folder"),
                &Callback::new(state.menu, Action::SelectFolder { user_id }),
            );
            (
                format!(
                    "Select folder or file that you want to leech\n\n<b>Path:</b> <code>{location}</code>"
                ),
                PickPurpose::Leech,
            )
        }
        MenuType::MirrorSelect if state.is_crypt => {
            // The overlay hides real names; selecting the remote as a whole
            // is the only meaningful pick.
            let pointer = config.resolved_crypt_pointer(&state.remote)?;
            grid.push(
                format!("{SELECTED_GLYPH} Select"),
                &Callback::new(state.menu, Action::Close { user_id }),
            );
            grid.push_footer(
                CLOSE_LABEL,
                &Callback::new(state.menu, Action::Close { user_id }),
            );
            return Ok(RenderedMenu {
                caption: format!("Crypt Remote\n\n<b>Path:</b> <code>{pointer}</code>"),
                keyboard: grid.build(),
            });
        }
        MenuType::MirrorSelect => {
            grid.push(
                format!("{SELECTED_GLYPH} Select"),
                &Callback::new(state.menu, Action::Close { user_id }),
            );
            (
                format!("Select folder or file to mirror\n\n<b>Path:</b> <code>{location}</code>"),
                PickPurpose::Mirror,
            )
        }
        _ => (
            format!("Select folder or file from <b>Path:</b> <code>{location}</code>"),
            PickPurpose::Mirror,
        ),
    };

    let per_page = settings.items_per_page.max(1);
    let start = flags.page * per_page;
    let end = (start + per_page).min(entries.len());
    for entry in entries.iter().take(end).skip(start.min(end)) {
        let entry_path = format!("{}/{}", state.path, entry.name);
        let (glyph, action) = if entry.is_dir {
            (
                FOLDER_GLYPH,
                Action::OpenDir {
                    remote: state.remote.clone(),
                    path: entry_path,
                    is_crypt: state.is_crypt,
                    user_id,
                },
            )
        } else {
            (
                FILE_GLYPH,
                Action::PickFile {
                    purpose,
                    remote: state.remote.clone(),
                    path: entry_path,
                    is_crypt: state.is_crypt,
                    user_id,
                },
            )
        };
        grid.push(
            format!("{glyph} {}", entry.name),
            &Callback::new(state.menu, action),
        );
    }

    let page_callback = |page: usize| {
        Callback::new(
            state.menu,
            Action::NextPage {
                remote: state.remote.clone(),
                path: state.path.clone(),
                is_crypt: state.is_crypt,
                page,
                user_id,
            },
        )
    };
    if flags.page > 0 {
        grid.push_footer(PREV_PAGE_LABEL, &page_callback(flags.page - 1));
    }
    if end < entries.len() {
        grid.push_footer(NEXT_PAGE_LABEL, &page_callback(flags.page + 1));
    }

    if flags.is_second_menu {
        grid.push_footer(
            BACK_LABEL,
            &Callback::new(
                state.menu,
                Action::Back {
                    remote: state.remote.clone(),
                    path: state.path.clone(),
                    is_crypt: state.is_crypt,
                    user_id,
                },
            ),
        );
    }
    grid.push_footer(
        CLOSE_LABEL,
        &Callback::new(state.menu, Action::Close { user_id }),
    );

    Ok(RenderedMenu {
        caption,
        keyboard: grid.build(),
    })
}
