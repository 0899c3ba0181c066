pub mod dialog_layout;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::action::Action;

/// Base trait for UI components and dialogs.
///
/// Components translate key events into [`Action`]s and receive follow-up
/// actions (including async I/O completions) through `update`.
pub trait Component {
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    fn update(&mut self, _action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame, area: Rect) -> Result<()>;
}
