//! Application state: hosts the project summary view and the config editor
//! dialog, routes actions, and runs file I/O on spawned tokio tasks.

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info};

use crate::action::Action;
use crate::components::Component;
use crate::dialog::{ConfigEditorDialog, MessageDialog};
use crate::project::{self, ProjectModel};

pub struct App {
    project: ProjectModel,
    config_editor: Option<ConfigEditorDialog>,
    message_dialog: Option<MessageDialog>,
    status: String,
    should_quit: bool,
    runtime: tokio::runtime::Handle,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(project: ProjectModel, runtime: tokio::runtime::Handle) -> Self {
        let (action_tx, action_rx) = unbounded_channel();
        Self {
            project,
            config_editor: None,
            message_dialog: None,
            status: String::new(),
            should_quit: false,
            runtime,
            action_tx,
            action_rx,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Drain I/O completions queued by spawned tasks since the last frame.
    pub fn drain_completions(&mut self) -> Result<()> {
        while let Ok(action) = self.action_rx.try_recv() {
            self.handle_action(action)?;
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Message overlay consumes input first
        if let Some(dialog) = &mut self.message_dialog {
            if let Some(Action::DialogClose) = Component::handle_key_event(dialog, key)? {
                self.message_dialog = None;
            }
            return Ok(());
        }

        if let Some(dialog) = &mut self.config_editor {
            if let Some(action) = dialog.handle_key_event(key) {
                self.handle_action(action)?;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('e') => self.handle_action(Action::OpenConfigEditor)?,
            KeyCode::Char('r') => {
                if let Some(state) = &self.project.state {
                    self.handle_action(Action::ReloadProject { root: state.root.clone() })?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        debug!("action: {action}");
        match action {
            Action::Quit => self.should_quit = true,
            Action::OpenConfigEditor => self.open_config_editor()?,
            Action::DialogClose => {
                self.config_editor = None;
            }
            Action::LoadConfig { path } => {
                let tx = self.action_tx.clone();
                self.runtime.spawn(async move {
                    let result = tokio::fs::read_to_string(&path)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Action::ConfigLoaded(result));
                });
            }
            Action::SaveConfig { path, contents } => {
                let tx = self.action_tx.clone();
                self.runtime.spawn(async move {
                    let result = tokio::fs::write(&path, contents)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Action::ConfigSaved(result));
                });
            }
            Action::ConfigLoaded(_) | Action::ConfigSaved(_) => {
                // Completions for an already-closed dialog are dropped
                if let Some(dialog) = &mut self.config_editor {
                    if let Some(followup) = dialog.update(action) {
                        self.handle_action(followup)?;
                    }
                } else {
                    debug!("dropping completion for closed editor: {action}");
                }
            }
            Action::ConfigApplied { root } => {
                // Close first, then trigger the reload. The reload outcome
                // never blocks the dialog lifecycle; it comes back as
                // ProjectReloaded.
                self.config_editor = None;
                self.status = "configuration saved".to_string();
                info!("configuration applied, reloading project at {}", root.display());
                self.handle_action(Action::ReloadProject { root })?;
            }
            Action::ReloadProject { root } => {
                let tx = self.action_tx.clone();
                self.runtime.spawn(async move {
                    let result = project::load_state(root).await.map_err(|e| e.to_string());
                    let _ = tx.send(Action::ProjectReloaded(result));
                });
            }
            Action::ProjectReloaded(result) => match result {
                Ok(state) => {
                    self.status = format!("project '{}' reloaded", state.options.name);
                    self.project.state = Some(state);
                }
                Err(e) => {
                    error!("project reload failed: {e}");
                    self.message_dialog =
                        Some(MessageDialog::with_title(format!("failed to reload project: {e}"), "Reload Error"));
                }
            },
            Action::Error(msg) => {
                self.message_dialog = Some(MessageDialog::with_title(msg, "Error"));
            }
            Action::Tick | Action::Render => {}
        }
        Ok(())
    }

    fn open_config_editor(&mut self) -> Result<()> {
        if self.config_editor.is_some() {
            return Ok(());
        }
        // Caller-owned precondition: the project is initialized before the
        // editor can be opened.
        let Some(state) = self.project.state.clone() else {
            self.message_dialog = Some(MessageDialog::new("no project loaded"));
            return Ok(());
        };
        let mut dialog = ConfigEditorDialog::new(state);
        if let Some(load) = dialog.on_open() {
            self.config_editor = Some(dialog);
            self.handle_action(load)?;
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let area = frame.area();
        self.render_summary(frame, area);

        if let Some(dialog) = &mut self.config_editor {
            let modal = centered_area(area, 80, 80);
            dialog.draw(frame, modal)?;
        }
        if let Some(dialog) = &mut self.message_dialog {
            dialog.draw(frame, area)?;
        }
        Ok(())
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Project")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);

        let mut lines: Vec<Line> = Vec::new();
        match &self.project.state {
            Some(state) => {
                let opts = &state.options;
                lines.push(summary_line("Name", &opts.name));
                if let Some(uuid) = &opts.uuid {
                    lines.push(summary_line("Uuid", uuid));
                }
                if let Some(version) = &opts.version {
                    lines.push(summary_line("Version", version));
                }
                if let Some(title) = &opts.title {
                    lines.push(summary_line("Title", title));
                }
                if let Some(entry) = &opts.entry {
                    lines.push(summary_line("Entry", entry));
                }
                if let Some(workers) = opts.workers {
                    lines.push(summary_line("Workers", &workers.to_string()));
                }
                lines.push(summary_line("Root", &state.root.display().to_string()));
                lines.push(summary_line("Config", &state.config_path.display().to_string()));
                lines.push(summary_line("Data dir", &state.data_dir.display().to_string()));
            }
            None => lines.push(Line::from("no project loaded")),
        }
        lines.push(Line::from(""));
        if !self.status.is_empty() {
            lines.push(Line::from(Span::styled(
                self.status.clone(),
                Style::default().fg(Color::Green),
            )));
        }
        lines.push(Line::from(Span::styled(
            "e:Edit Configuration  r:Reload  q:Quit",
            Style::default().fg(Color::Yellow),
        )));

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }
}

fn summary_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ])
}

fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ProjectOptions, ProjectState};
    use std::path::PathBuf;

    fn test_state() -> ProjectState {
        ProjectState {
            // Nonexistent on purpose: background reloads spawned by the app
            // fail fast without touching the filesystem
            root: PathBuf::from("/nonexistent/confedit-app-test"),
            config_path: PathBuf::from("/nonexistent/confedit-app-test/project.json"),
            data_dir: PathBuf::from("/nonexistent/confedit-app-test-data"),
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

    fn test_app() -> App {
        let project = ProjectModel { state: Some(test_state()) };
        App::new(project, tokio::runtime::Handle::current())
    }

    #[tokio::test]
    async fn reload_failure_surfaces_alert() {
        let mut app = test_app();
        app.handle_action(Action::ProjectReloaded(Err("boom".to_string())))
            .unwrap();

        let dialog = app.message_dialog.as_ref().expect("alert shown");
        assert!(dialog.message().contains("failed to reload project"));
        assert!(dialog.message().contains("boom"));
        // The previous state stays in place
        assert!(app.project.state.is_some());
    }

    #[tokio::test]
    async fn config_applied_closes_dialog_before_reload() {
        let mut app = test_app();
        app.config_editor = Some(ConfigEditorDialog::new(test_state()));

        app.handle_action(Action::ConfigApplied {
            root: PathBuf::from("/nonexistent/confedit-app-test"),
        })
        .unwrap();

        assert!(app.config_editor.is_none());
        assert_eq!(app.status, "configuration saved");
    }

    #[tokio::test]
    async fn completions_for_closed_editor_are_dropped() {
        let mut app = test_app();
        app.handle_action(Action::ConfigLoaded(Ok("{}".to_string())))
            .unwrap();
        app.handle_action(Action::ConfigSaved(Ok(()))).unwrap();

        assert!(app.config_editor.is_none());
        assert!(app.message_dialog.is_none());
    }
}
