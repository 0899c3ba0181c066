pub mod action;
pub mod app;
pub mod components;
pub mod dialog;
pub mod logging;
pub mod project;

// Re-export commonly used types
pub use action::Action;
pub use app::App;
pub use dialog::{ConfigEditorDialog, ConfigEditorMode, MessageDialog};
pub use project::{ProjectModel, ProjectOptions, ProjectState};
