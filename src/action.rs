use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::project::ProjectState;

/// High-level actions that can be triggered by UI or components.
///
/// I/O completions (`ConfigLoaded`, `ConfigSaved`, `ProjectReloaded`) are sent
/// back over the app's action channel by spawned tasks; errors cross the
/// channel as strings since `io::Error` is neither `Clone` nor serializable.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
pub enum Action {
    Tick,
    Render,
    Quit,
    Error(String),
    /// User requested to open the config editor dialog
    OpenConfigEditor,
    /// Close any active dialog
    DialogClose,
    /// Config editor requests its initial file read
    LoadConfig { path: PathBuf },
    /// Result of the config file read
    ConfigLoaded(Result<String, String>),
    /// Config editor requests a write of the edited text
    SaveConfig { path: PathBuf, contents: String },
    /// Result of the config file write
    ConfigSaved(Result<(), String>),
    /// Editor saved and closed; host must re-initialize the project from `root`
    ConfigApplied { root: PathBuf },
    /// User requested a manual project reload
    ReloadProject { root: PathBuf },
    /// Result of a project re-initialization
    ProjectReloaded(Result<ProjectState, String>),
}
