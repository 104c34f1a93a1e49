//! Key bindings (normal and vim-style) and mouse mapping onto the board.

use crate::game::InputEvent;
use crate::ui;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    /// Pick up the tile under the cursor, or drop it if already held.
    Grab,
    Pause,
    Tutorial,
    Quit,
    /// Any other key ("press any key" screens).
    Other,
    None,
}

/// Map key event to action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('t' | 'T') => Action::Tutorial,
        KeyCode::Left | KeyCode::Char('h') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Move(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(Direction::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Grab,
        KeyCode::Modifier(_) => Action::None,
        _ => Action::Other,
    }
}

/// Left-button press/release over the board becomes a grid gesture. Positions
/// off the board still map (to out-of-range coordinates) so the engine can
/// ignore them.
pub fn mouse_to_input(mouse: MouseEvent, board: Rect) -> Option<InputEvent> {
    let (x, y) = ui::cell_to_grid(board, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PressAt { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::ReleaseAt { x, y }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrows_and_vim_keys_move() {
        assert_eq!(key_to_action(press(KeyCode::Left)), Action::Move(Direction::Left));
        assert_eq!(key_to_action(press(KeyCode::Char('j'))), Action::Move(Direction::Down));
        assert_eq!(key_to_action(press(KeyCode::Char(' '))), Action::Grab);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(key_to_action(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(press(KeyCode::Char('Q'))), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_other_keys_and_modifiers() {
        assert_eq!(key_to_action(press(KeyCode::Char('x'))), Action::Other);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn test_mouse_maps_to_grid_gestures() {
        let board = Rect::new(10, 5, ui::BOARD_COLS, ui::BOARD_ROWS);
        let down = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10 + ui::TILE_W * 2,
            row: 5 + ui::TILE_H * 3 + 1,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(mouse_to_input(down, board), Some(InputEvent::PressAt { x: 2, y: 3 }));

        let up_outside = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 0,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert!(matches!(
            mouse_to_input(up_outside, board),
            Some(InputEvent::ReleaseAt { x, y: 0 }) if x < 0
        ));

        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            ..down
        };
        assert_eq!(mouse_to_input(moved, board), None);
    }
}
