//! Menu protocol and construction
//!
//! Provides functionality for:
//! - Encoding/decoding navigation state as callback data
//! - Remembering per-user selections across a multi-step session
//! - Deciding button sets, captions and pagination per menu type

pub mod builder;
pub mod callback;
pub mod session;

pub use builder::{
    build_folder_menu, build_remote_menu, Button, FolderMenuFlags, FolderMenuState,
    RemoteMenuRequest, RenderedMenu,
};
pub use callback::{Action, Callback, MenuType, PickPurpose, RemoteRole, MAX_CALLBACK_LEN};
pub use session::{
    check_config, check_remote_selected, BrowseAccess, ConfigCheck, SelectionKey, SelectionStore,
    MSG_SELECT_CLOUD_FIRST,
};
