//! ConfigEditorDialog: modal editor for a project's JSON configuration file.
//!
//! Lifecycle: the host opens the dialog and performs the file read requested
//! by [`ConfigEditorDialog::on_open`]; once the text arrives the user edits it
//! freely and either applies (validate as JSON, write back, close, reload the
//! project) or cancels (discard edits, close). Validation failures and write
//! failures keep the dialog open so the user can correct and retry; a failed
//! initial read is fatal to the dialog instance.

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use textwrap::wrap;
use tui_textarea::TextArea;

use crate::action::Action;
use crate::components::Component;
use crate::components::dialog_layout::split_dialog_area;
use crate::project::ProjectState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEditorMode {
    /// Initial read in flight; editing and apply are unavailable
    Loading,
    /// Buffer populated, user is editing
    Ready,
    /// Write in flight
    Saving,
    /// Alert overlay. `close_on_dismiss` is set for fatal errors (load
    /// failure); recoverable errors return to `Ready` with the buffer intact.
    Error { message: String, close_on_dismiss: bool },
    /// Terminal state, no further actions are emitted
    Closed,
}

#[derive(Debug)]
pub struct ConfigEditorDialog {
    pub mode: ConfigEditorMode,
    pub textarea: TextArea<'static>,
    pub show_instructions: bool,
    /// Pre-edit project state snapshot. The reload after a successful save
    /// uses `state.root` as it was when the dialog opened, never a path
    /// re-derived from the edited text.
    state: ProjectState,
    load_requested: bool,
}

impl ConfigEditorDialog {
    pub fn new(state: ProjectState) -> Self {
        let mut textarea = TextArea::default();
        textarea.set_line_number_style(Style::default().bg(Color::DarkGray));
        Self {
            mode: ConfigEditorMode::Loading,
            textarea,
            show_instructions: true,
            state,
            load_requested: false,
        }
    }

    /// Request the initial file read. Emits `LoadConfig` exactly once per
    /// dialog instance; the host performs the read and feeds the result back
    /// as `ConfigLoaded`.
    pub fn on_open(&mut self) -> Option<Action> {
        if self.load_requested {
            return None;
        }
        self.load_requested = true;
        Some(Action::LoadConfig { path: self.state.config_path.clone() })
    }

    pub fn contents(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn set_contents(&mut self, text: &str) {
        let mut textarea = TextArea::default();
        textarea.insert_str(text);
        textarea.set_line_number_style(Style::default().bg(Color::DarkGray));
        textarea.move_cursor(tui_textarea::CursorMove::Top);
        self.textarea = textarea;
    }

    fn set_error(&mut self, message: String, close_on_dismiss: bool) {
        self.mode = ConfigEditorMode::Error { message, close_on_dismiss };
    }

    /// Validate the buffer and request the write. Syntax check only; the
    /// typed options parse happens in the project load pipeline.
    fn apply(&mut self) -> Option<Action> {
        let contents = self.contents();
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&contents) {
            self.set_error(format!("configuration file format error: {e}"), false);
            return None;
        }
        self.mode = ConfigEditorMode::Saving;
        Some(Action::SaveConfig { path: self.state.config_path.clone(), contents })
    }

    fn close(&mut self) -> Option<Action> {
        self.mode = ConfigEditorMode::Closed;
        Some(Action::DialogClose)
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        use tui_textarea::Input as TuiInput;

        if key.kind != KeyEventKind::Press {
            return None;
        }

        match &self.mode {
            ConfigEditorMode::Loading => {
                // Only the close affordance works before the read settles.
                // The in-flight read is not cancelled; its late result lands
                // on a removed dialog and is dropped by the host.
                if key.code == KeyCode::Esc {
                    return self.close();
                }
                None
            }
            ConfigEditorMode::Ready => {
                if key.code == KeyCode::Esc {
                    // Cancel discards edits without prompting
                    return self.close();
                }
                if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return self.apply();
                }
                // Everything else edits the buffer
                let input: TuiInput = key.into();
                self.textarea.input(input);
                None
            }
            ConfigEditorMode::Saving => None,
            ConfigEditorMode::Error { close_on_dismiss, .. } => match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    if *close_on_dismiss {
                        self.close()
                    } else {
                        self.mode = ConfigEditorMode::Ready;
                        None
                    }
                }
                _ => None,
            },
            ConfigEditorMode::Closed => None,
        }
    }

    pub fn update(&mut self, action: Action) -> Option<Action> {
        match action {
            Action::ConfigLoaded(result) => {
                if self.mode != ConfigEditorMode::Loading {
                    return None;
                }
                match result {
                    Ok(text) => {
                        self.set_contents(&text);
                        self.mode = ConfigEditorMode::Ready;
                    }
                    Err(e) => {
                        self.set_error(format!("failed to read configuration file: {e}"), true);
                    }
                }
                None
            }
            Action::ConfigSaved(result) => {
                if self.mode != ConfigEditorMode::Saving {
                    return None;
                }
                match result {
                    Ok(()) => {
                        // Close first; the host triggers the reload after
                        // dropping the dialog and never awaits its outcome.
                        self.mode = ConfigEditorMode::Closed;
                        Some(Action::ConfigApplied { root: self.state.root.clone() })
                    }
                    Err(e) => {
                        self.set_error(format!("failed to save configuration file: {e}"), false);
                        None
                    }
                }
            }
            _ => None,
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let outer_block = Block::default()
            .title("Edit Configuration")
            .borders(Borders::ALL)
            .border_type(BorderType::Double);
        let inner_area = outer_block.inner(area);
        outer_block.render(area, buf);

        let instructions = "Ctrl+S:Apply  Esc:Cancel";
        let layout = split_dialog_area(inner_area, self.show_instructions, Some(instructions));
        let content_area = layout.content_area;
        let wrap_width = content_area.width.saturating_sub(2) as usize;

        match &self.mode {
            ConfigEditorMode::Loading => {
                buf.set_string(
                    content_area.x + 1,
                    content_area.y + 1,
                    "Loading configuration ...",
                    Style::default().fg(Color::Gray),
                );
            }
            ConfigEditorMode::Ready | ConfigEditorMode::Saving => {
                self.textarea.set_block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(self.state.config_path.display().to_string()),
                );
                ratatui::widgets::Widget::render(&self.textarea, content_area, buf);
                if self.mode == ConfigEditorMode::Saving {
                    let y = content_area.y + content_area.height.saturating_sub(1);
                    buf.set_string(
                        content_area.x + 1,
                        y,
                        "Saving ...",
                        Style::default().fg(Color::Yellow),
                    );
                }
            }
            ConfigEditorMode::Error { message, .. } => {
                let y = content_area.y;
                buf.set_string(
                    content_area.x,
                    y,
                    "Error:",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                );
                let error_lines = wrap(message, wrap_width.max(10));
                for (i, line) in error_lines.iter().enumerate() {
                    buf.set_string(
                        content_area.x,
                        y + 1 + i as u16,
                        line,
                        Style::default().fg(Color::Red),
                    );
                }
                buf.set_string(
                    content_area.x,
                    y + 1 + error_lines.len() as u16,
                    "Press Esc or Enter to close error",
                    Style::default().fg(Color::Yellow),
                );
            }
            ConfigEditorMode::Closed => {}
        }

        if self.show_instructions
            && let Some(instructions_area) = layout.instructions_area
        {
            let instructions_paragraph = Paragraph::new(instructions)
                .block(Block::default().title("Instructions").borders(Borders::ALL))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true });
            instructions_paragraph.render(instructions_area, buf);
        }
    }
}

impl Component for ConfigEditorDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(self.handle_key_event(key))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        Ok(self.update(action))
    }

    fn draw(&mut self, frame: &mut ratatui::Frame, area: Rect) -> Result<()> {
        self.render(area, frame.buffer_mut());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectOptions;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn test_state() -> ProjectState {
        ProjectState {
            root: PathBuf::from("/work/demo"),
            config_path: PathBuf::from("/work/demo/project.json"),
            data_dir: PathBuf::from("/data/demo.0"),
            options: ProjectOptions {
                name: "demo".to_string(),
                uuid: Some("0".to_string()),
                version: None,
                title: None,
                description: None,
                entry: None,
                workers: None,
                devtools: None,
            },
        }
    }

    fn open_and_load(text: &str) -> ConfigEditorDialog {
        let mut dialog = ConfigEditorDialog::new(test_state());
        let requested = dialog.on_open();
        assert_eq!(
            requested,
            Some(Action::LoadConfig { path: PathBuf::from("/work/demo/project.json") })
        );
        let followup = dialog.update(Action::ConfigLoaded(Ok(text.to_string())));
        assert_eq!(followup, None);
        assert_eq!(dialog.mode, ConfigEditorMode::Ready);
        dialog
    }

    fn press(dialog: &mut ConfigEditorDialog, code: KeyCode) -> Option<Action> {
        dialog.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn press_apply(dialog: &mut ConfigEditorDialog) -> Option<Action> {
        dialog.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
    }

    #[test]
    fn load_is_requested_exactly_once() {
        let mut dialog = ConfigEditorDialog::new(test_state());
        assert!(dialog.on_open().is_some());
        assert_eq!(dialog.on_open(), None);
    }

    #[test]
    fn apply_valid_json_writes_then_closes_then_reloads() {
        let text = "{\n  \"name\": \"demo\",\n  \"uuid\": \"0\"\n}";
        let mut dialog = open_and_load(text);

        let save = press_apply(&mut dialog);
        assert_eq!(
            save,
            Some(Action::SaveConfig {
                path: PathBuf::from("/work/demo/project.json"),
                contents: text.to_string(),
            })
        );
        assert_eq!(dialog.mode, ConfigEditorMode::Saving);

        // Write settles; close precedes the reload request, which carries
        // the pre-edit root path
        let applied = dialog.update(Action::ConfigSaved(Ok(())));
        assert_eq!(applied, Some(Action::ConfigApplied { root: PathBuf::from("/work/demo") }));
        assert_eq!(dialog.mode, ConfigEditorMode::Closed);

        // A duplicate completion emits nothing further
        assert_eq!(dialog.update(Action::ConfigSaved(Ok(()))), None);
    }

    #[test]
    fn apply_invalid_json_shows_alert_and_preserves_buffer() {
        let mut dialog = open_and_load("{invalid");

        let result = press_apply(&mut dialog);
        assert_eq!(result, None);
        match &dialog.mode {
            ConfigEditorMode::Error { message, close_on_dismiss } => {
                assert!(message.starts_with("configuration file format error"));
                assert!(!close_on_dismiss);
            }
            other => panic!("expected format error, got {other:?}"),
        }
        assert_eq!(dialog.contents(), "{invalid");

        // Dismissing the alert returns to editing, not to closing
        assert_eq!(press(&mut dialog, KeyCode::Esc), None);
        assert_eq!(dialog.mode, ConfigEditorMode::Ready);
    }

    #[test]
    fn load_failure_alerts_then_closes_on_dismiss() {
        let mut dialog = ConfigEditorDialog::new(test_state());
        dialog.on_open();

        let followup = dialog.update(Action::ConfigLoaded(Err("permission denied".to_string())));
        assert_eq!(followup, None);
        match &dialog.mode {
            ConfigEditorMode::Error { message, close_on_dismiss } => {
                assert!(message.starts_with("failed to read configuration file"));
                assert!(close_on_dismiss);
            }
            other => panic!("expected load error, got {other:?}"),
        }

        assert_eq!(press(&mut dialog, KeyCode::Enter), Some(Action::DialogClose));
        assert_eq!(dialog.mode, ConfigEditorMode::Closed);
        // No further close after the first
        assert_eq!(press(&mut dialog, KeyCode::Enter), None);
    }

    #[test]
    fn save_failure_keeps_dialog_open_and_allows_retry() {
        let text = "{\"workers\": 4}";
        let mut dialog = open_and_load(text);

        assert!(press_apply(&mut dialog).is_some());
        let followup = dialog.update(Action::ConfigSaved(Err("disk full".to_string())));
        assert_eq!(followup, None);
        match &dialog.mode {
            ConfigEditorMode::Error { message, close_on_dismiss } => {
                assert!(message.starts_with("failed to save configuration file"));
                assert!(!close_on_dismiss);
            }
            other => panic!("expected save error, got {other:?}"),
        }

        // Dismiss and retry: exactly one more write with the same contents
        assert_eq!(press(&mut dialog, KeyCode::Esc), None);
        assert_eq!(dialog.mode, ConfigEditorMode::Ready);
        let retry = press_apply(&mut dialog);
        assert_eq!(
            retry,
            Some(Action::SaveConfig {
                path: PathBuf::from("/work/demo/project.json"),
                contents: text.to_string(),
            })
        );
    }

    #[test]
    fn cancel_discards_edits_without_io() {
        let mut dialog = open_and_load("{}");
        press(&mut dialog, KeyCode::Char('x'));

        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(Action::DialogClose));
        assert_eq!(dialog.mode, ConfigEditorMode::Closed);
    }

    #[test]
    fn cancel_during_load_closes_and_drops_late_result() {
        let mut dialog = ConfigEditorDialog::new(test_state());
        dialog.on_open();

        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(Action::DialogClose));
        // Read resolving afterwards is a no-op
        assert_eq!(dialog.update(Action::ConfigLoaded(Ok("{}".to_string()))), None);
        assert_eq!(dialog.mode, ConfigEditorMode::Closed);
    }

    #[test]
    fn untouched_content_round_trips_verbatim() {
        let text = "{\n  \"name\": \"demo\",\n  \"uuid\": \"0\"\n}\n";
        let mut dialog = open_and_load(text);

        let save = press_apply(&mut dialog);
        match save {
            Some(Action::SaveConfig { contents, .. }) => assert_eq!(contents, text),
            other => panic!("expected save request, got {other:?}"),
        }
    }

    #[test]
    fn editing_is_gated_until_load_settles() {
        let mut dialog = ConfigEditorDialog::new(test_state());
        dialog.on_open();

        // Keystrokes before the read settles neither edit nor apply
        assert_eq!(press(&mut dialog, KeyCode::Char('x')), None);
        assert_eq!(press_apply(&mut dialog), None);
        assert_eq!(dialog.mode, ConfigEditorMode::Loading);

        dialog.update(Action::ConfigLoaded(Ok("{}".to_string())));
        assert_eq!(dialog.contents(), "{}");
    }
}
