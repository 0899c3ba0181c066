pub mod config_editor_dialog;
pub mod message_dialog;

pub use config_editor_dialog::{ConfigEditorDialog, ConfigEditorMode};
pub use message_dialog::MessageDialog;
