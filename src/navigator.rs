//! Navigation pipeline
//!
//! One navigation step: an inbound menu request or button press enters
//! here, flows through config resolution, the (optional) directory listing
//! and menu construction, and leaves as a send or edit on the transport.
//! Every failure is reported to the requesting user at this boundary;
//! nothing propagates far enough to take the process down, and nothing is
//! retried.

use crate::error::Result;
use crate::menu::builder::{
    build_folder_menu, build_remote_menu, FolderMenuFlags, FolderMenuState, RemoteMenuRequest,
    RenderedMenu,
};
use crate::menu::callback::{Action, Callback, MenuType, PickPurpose, RemoteRole};
use crate::menu::session::{
    check_config, check_remote_selected, BrowseAccess, ConfigCheck, SelectionKey, SelectionStore,
    MSG_SELECT_CLOUD_FIRST,
};
use crate::rclone::config::{ConfigStore, ProviderKind};
use crate::rclone::listing::{list_dir, path_exists, ListOptions};
use crate::rclone::process::Rclone;
use crate::settings::Settings;

/// Outbound half of the messaging transport. Implemented outside this
/// crate against the actual bot API; tests use a recording stub.
pub trait MenuTransport {
    /// Deliver a menu as a fresh message.
    async fn send_menu(&self, user_id: i64, menu: &RenderedMenu) -> anyhow::Result<()>;
    /// Deliver a menu by editing the message the user pressed a button on.
    async fn edit_menu(&self, user_id: i64, menu: &RenderedMenu) -> anyhow::Result<()>;
    /// Plain text notice (errors, prompts).
    async fn send_text(&self, user_id: i64, text: &str) -> anyhow::Result<()>;
    /// Tear down the menu message.
    async fn close_menu(&self, user_id: i64) -> anyhow::Result<()>;
}

/// What a handled button press amounted to. Picks are surfaced to the
/// caller because acting on them (starting a mirror or leech) is not this
/// crate's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A menu was rendered (or an error reported) and the session goes on.
    Rendered,
    /// The callback did not decode; logged and dropped.
    Ignored,
    /// The user picked a file.
    FilePicked {
        purpose: PickPurpose,
        remote: String,
        path: String,
        user_id: i64,
    },
    /// The user picked the current folder on a leech menu.
    FolderPicked { user_id: i64 },
    /// The user dismissed the menu.
    Closed { user_id: i64 },
}

/// Drives the menu tree for all users. Cheap to share behind an `Arc`;
/// per-user state lives in the [`SelectionStore`].
pub struct Navigator<T> {
    settings: Settings,
    configs: ConfigStore,
    store: SelectionStore,
    transport: T,
}

impl<T: MenuTransport> Navigator<T> {
    pub fn new(settings: Settings, transport: T) -> Self {
        let configs = ConfigStore::new(settings.rclone_dir.clone(), settings.multi_rclone_config);
        Self {
            settings,
            configs,
            store: SelectionStore::new(),
            transport,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gate: may this user browse remotes right now? Sends the
    /// select-a-cloud prompt when not.
    pub async fn ensure_remote_selected(&self, user_id: i64) -> anyhow::Result<bool> {
        match check_remote_selected(&self.settings, &self.store, user_id) {
            BrowseAccess::Allowed => Ok(true),
            BrowseAccess::SelectRemoteFirst => {
                self.transport.send_text(user_id, MSG_SELECT_CLOUD_FIRST).await?;
                Ok(false)
            }
        }
    }

    /// Gate: does this user's config file exist? Leech requests tolerate a
    /// missing one. Sends the recovery hint when not.
    pub async fn ensure_config(&self, user_id: i64, is_leech: bool) -> anyhow::Result<bool> {
        match check_config(&self.configs, &self.settings, user_id, is_leech) {
            ConfigCheck::Present | ConfigCheck::MissingTolerated => Ok(true),
            ConfigCheck::Missing { hint } => {
                self.transport.send_text(user_id, hint).await?;
                Ok(false)
            }
        }
    }

    /// Classify the provider behind one of this user's remotes, unwrapping
    /// crypt indirection. Used for capability checks before a transfer.
    pub fn provider_kind(&self, user_id: i64, remote: &str) -> Result<ProviderKind> {
        let (_, config) = self.configs.load(user_id, self.settings.is_sudo(user_id))?;
        config.provider_kind(remote)
    }

    /// Probe whether `remote:path` exists under this user's config.
    pub async fn path_exists(&self, user_id: i64, remote: &str, path: &str) -> Result<bool> {
        let config_path = self.configs.require(user_id, self.settings.is_sudo(user_id))?;
        let rclone = Rclone::new(&self.settings.rclone_exe).with_config(&config_path);
        path_exists(&rclone, remote, path).await
    }

    /// Render the remote-listing menu (the top of the tree).
    pub async fn open_remote_menu(
        &self,
        menu: MenuType,
        role: RemoteRole,
        user_id: i64,
        is_second_menu: bool,
        edit: bool,
    ) -> anyhow::Result<()> {
        let rendered = self.remote_menu(menu, role, user_id, is_second_menu);
        self.deliver(user_id, rendered, edit).await
    }

    /// Render one folder of the tree.
    pub async fn open_folder_menu(
        &self,
        state: FolderMenuState,
        flags: FolderMenuFlags,
        edit: bool,
    ) -> anyhow::Result<()> {
        let rendered = self.folder_menu(&state, flags).await;
        self.deliver(state.user_id, rendered, edit).await
    }

    /// Handle one button press. A malformed callback is logged and dropped;
    /// every other failure is reported to the user. Only transport errors
    /// propagate.
    pub async fn handle_callback(&self, data: &str) -> anyhow::Result<StepOutcome> {
        let callback = match Callback::decode(data) {
            Ok(callback) => callback,
            Err(err) => {
                tracing::warn!(%err, data, "ignoring malformed callback");
                return Ok(StepOutcome::Ignored);
            }
        };

        let menu = callback.menu;
        match callback.action {
            Action::SelectRemote {
                role,
                remote,
                is_crypt,
                user_id,
            } => {
                if menu == MenuType::MirrorSelect
                    && self.settings.multi_remote_upload
                    && self.settings.is_sudo(user_id)
                {
                    // Multi-upload toggles membership and redraws the
                    // checkmarks instead of descending.
                    self.store.multi_toggle(&remote);
                    self.open_remote_menu(menu, role, user_id, false, true).await?;
                    return Ok(StepOutcome::Rendered);
                }
                if menu == MenuType::MirrorSelect {
                    self.store.set(user_id, SelectionKey::MirrorRemote, remote.clone());
                    self.store.set(user_id, SelectionKey::MirrorBaseDir, "");
                }
                let state = FolderMenuState {
                    menu,
                    remote,
                    path: String::new(),
                    is_crypt,
                    user_id,
                };
                self.open_folder_menu(state, FolderMenuFlags::default(), true).await?;
                Ok(StepOutcome::Rendered)
            }
            Action::OpenDir {
                remote,
                path,
                is_crypt,
                user_id,
            } => {
                if menu == MenuType::MirrorSelect {
                    self.store.set(user_id, SelectionKey::MirrorBaseDir, path.clone());
                }
                let state = FolderMenuState {
                    menu,
                    remote,
                    path,
                    is_crypt,
                    user_id,
                };
                self.open_folder_menu(state, FolderMenuFlags::default(), true).await?;
                Ok(StepOutcome::Rendered)
            }
            Action::PickFile {
                purpose,
                remote,
                path,
                user_id,
                ..
            } => {
                self.transport.close_menu(user_id).await?;
                Ok(StepOutcome::FilePicked {
                    purpose,
                    remote,
                    path,
                    user_id,
                })
            }
            Action::Back {
                remote,
                path,
                is_crypt,
                user_id,
            } => {
                match parent_path(&path) {
                    Some(parent) => {
                        let state = FolderMenuState {
                            menu,
                            remote,
                            path: parent,
                            is_crypt,
                            user_id,
                        };
                        self.open_folder_menu(state, FolderMenuFlags::default(), true).await?;
                    }
                    None => {
                        self.open_remote_menu(menu, RemoteRole::Remote, user_id, false, true)
                            .await?;
                    }
                }
                Ok(StepOutcome::Rendered)
            }
            Action::NextPage {
                remote,
                path,
                is_crypt,
                page,
                user_id,
            } => {
                let state = FolderMenuState {
                    menu,
                    remote,
                    path,
                    is_crypt,
                    user_id,
                };
                let flags = FolderMenuFlags {
                    page,
                    is_second_menu: false,
                };
                self.open_folder_menu(state, flags, true).await?;
                Ok(StepOutcome::Rendered)
            }
            Action::SelectFolder { user_id } => {
                self.transport.close_menu(user_id).await?;
                Ok(StepOutcome::FolderPicked { user_id })
            }
            Action::Reset { user_id } => {
                self.store.multi_reset();
                self.open_remote_menu(menu, RemoteRole::Remote, user_id, false, true).await?;
                Ok(StepOutcome::Rendered)
            }
            Action::Close { user_id } => {
                self.transport.close_menu(user_id).await?;
                Ok(StepOutcome::Closed { user_id })
            }
        }
    }

    fn remote_menu(
        &self,
        menu: MenuType,
        role: RemoteRole,
        user_id: i64,
        is_second_menu: bool,
    ) -> Result<RenderedMenu> {
        let is_privileged = self.settings.is_sudo(user_id);
        let (_, config) = self.configs.load(user_id, is_privileged)?;
        Ok(build_remote_menu(
            &self.settings,
            &self.store,
            &config,
            RemoteMenuRequest {
                menu,
                role,
                user_id,
                is_privileged,
                is_second_menu,
            },
        ))
    }

    async fn folder_menu(
        &self,
        state: &FolderMenuState,
        flags: FolderMenuFlags,
    ) -> Result<RenderedMenu> {
        let is_privileged = self.settings.is_sudo(state.user_id);
        let (config_path, config) = self.configs.load(state.user_id, is_privileged)?;

        // Crypt remotes under mirror-select are selected whole; listing the
        // overlay would only show encrypted names.
        let skip_listing = state.menu == MenuType::MirrorSelect && state.is_crypt;
        let entries = if skip_listing {
            Vec::new()
        } else {
            let rclone = Rclone::new(&self.settings.rclone_exe).with_config(&config_path);
            let options = if state.menu == MenuType::Leech {
                ListOptions::fast()
            } else {
                ListOptions::default()
            };
            list_dir(&rclone, &state.remote, &state.path, options).await?
        };

        build_folder_menu(&self.settings, &config, state, &entries, flags)
    }

    async fn deliver(
        &self,
        user_id: i64,
        rendered: Result<RenderedMenu>,
        edit: bool,
    ) -> anyhow::Result<()> {
        match rendered {
            Ok(menu) => {
                if edit {
                    self.transport.edit_menu(user_id, &menu).await
                } else {
                    self.transport.send_menu(user_id, &menu).await
                }
            }
            Err(err) => {
                tracing::info!(%err, user_id, "navigation step failed");
                self.transport.send_text(user_id, &err.user_message()).await
            }
        }
    }
}

/// Parent of a menu path. `None` means the press was already at the remote
/// root and navigation returns to the remote-listing menu.
fn parent_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    path.rsplit_once('/').map(|(parent, _)| parent.to_string())
}
