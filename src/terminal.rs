// src/terminal.rs
// Terminal rendering for the 1-90 board, draw history and announcement
// banner, plus keyboard mapping for the interactive clients. Output uses
// \r\n line endings because the clients keep raw mode enabled.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::announcement::Overlay;
use crate::defs::{BOARD_COLS, Colors, FIRST_NUMBER, LAST_NUMBER, Number};
use crate::reconcile::ClientView;
use crate::role::Role;

/// Keyboard actions understood by the clients. Role gating happens in the
/// client loop; this is just the mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// ENTER: draw a random number, or toggle the typed one.
    Draw,
    /// A digit typed towards a number to toggle.
    Digit(char),
    Backspace,
    AnnounceLine,
    AnnounceBingo,
    HideOverlay,
    Reset,
    Quit,
}

pub fn map_key(event: &KeyEvent) -> Option<KeyAction> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }
    match event.code {
        KeyCode::Enter => Some(KeyAction::Draw),
        KeyCode::Backspace => Some(KeyAction::Backspace),
        KeyCode::Esc => Some(KeyAction::HideOverlay),
        KeyCode::Char(c) if c.is_ascii_digit() => Some(KeyAction::Digit(c)),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(KeyAction::AnnounceLine),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(KeyAction::AnnounceBingo),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyAction::Reset),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Quit),
        _ => None,
    }
}

/// The full 1-90 grid: last number green, called numbers yellow.
pub fn format_board(view: &ClientView) -> String {
    let mut out = String::new();
    for n in FIRST_NUMBER..=LAST_NUMBER {
        if view.last_called() == Some(n) {
            out.push_str(&format!("{}{n:2}{}", Colors::green(), Colors::reset()));
        } else if view.is_called(n) {
            out.push_str(&format!("{}{n:2}{}", Colors::yellow(), Colors::reset()));
        } else {
            out.push_str(&format!("{n:2}"));
        }
        if (n as usize) % BOARD_COLS == 0 {
            out.push_str("\r\n");
        } else {
            out.push(' ');
        }
    }
    out
}

pub fn format_overlay(overlay: &Overlay) -> String {
    let Some(payload) = overlay.payload() else {
        return String::new();
    };
    let amount = if payload.amount.is_empty() { "---" } else { &payload.amount };
    format!(
        "{}==============================={}\r\n\
         {}  {}{}\r\n\
         {}  {}{}\r\n\
         {}  Prize: {}{}\r\n\
         {}==============================={}\r\n",
        Colors::red(), Colors::reset(),
        Colors::yellow(), payload.title, Colors::reset(),
        Colors::yellow(), payload.status, Colors::reset(),
        Colors::green(), amount, Colors::reset(),
        Colors::red(), Colors::reset(),
    )
}

/// Full-screen redraw of the client view.
pub fn render_screen(view: &ClientView, overlay: &Overlay, playing: Option<Number>, input: &str) {
    print!("\x1Bc"); // Clear the screen

    match view.last_called() {
        Some(n) => print!("Last number: {}{n}{}\r\n", Colors::green(), Colors::reset()),
        None => print!("Last number: -\r\n"),
    }
    print!("Previous numbers: {:?}\r\n", view.history());
    if let Some(n) = playing {
        print!("Calling: {}{n}{}\r\n", Colors::yellow(), Colors::reset());
    }
    print!("\r\n{}\r\n", format_board(view));
    print!(
        "Line prize: {}   Bingo prize: {}\r\n",
        view.line_prize, view.bingo_prize
    );

    if overlay.is_visible() {
        print!("\r\n{}", format_overlay(overlay));
    }

    match view.role() {
        Role::Admin => {
            if input.is_empty() {
                print!("\r\n[ENTER] draw  [digits+ENTER] toggle  [L] line  [B] bingo  [ESC] hide  [R] reset  [Q] quit\r\n");
            } else {
                print!("\r\nToggle number: {input}_\r\n");
            }
        }
        Role::Guest => {
            print!("\r\nWatching live. [Q] quit\r\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AnnouncementPayload;

    #[test]
    fn test_map_key_basics() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(&press(KeyCode::Enter)), Some(KeyAction::Draw));
        assert_eq!(map_key(&press(KeyCode::Char('l'))), Some(KeyAction::AnnounceLine));
        assert_eq!(map_key(&press(KeyCode::Char('B'))), Some(KeyAction::AnnounceBingo));
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(KeyAction::HideOverlay));
        assert_eq!(map_key(&press(KeyCode::Char('4'))), Some(KeyAction::Digit('4')));
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&event), Some(KeyAction::Quit));
    }

    #[test]
    fn test_board_marks_called_numbers() {
        let mut view = ClientView::new(Role::Guest);
        view.on_number_drawn(5);
        view.on_number_drawn(42);

        let board = format_board(&view);
        // 5 was called earlier: yellow. 42 is the last: green.
        assert!(board.contains(&format!("{} 5{}", Colors::yellow(), Colors::reset())));
        assert!(board.contains(&format!("{}42{}", Colors::green(), Colors::reset())));
        assert!(board.contains("90"));
    }

    #[test]
    fn test_overlay_formatting_with_amount_fallback() {
        let mut overlay = Overlay::new();
        overlay.show(AnnouncementPayload {
            title: "BINGO WINNER!".to_string(),
            status: "BINGO VERIFIED".to_string(),
            amount: String::new(),
        });
        let text = format_overlay(&overlay);
        assert!(text.contains("BINGO WINNER!"));
        assert!(text.contains("Prize: ---"));
    }

    #[test]
    fn test_hidden_overlay_formats_empty() {
        assert_eq!(format_overlay(&Overlay::new()), String::new());
    }
}
