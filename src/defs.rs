// src/defs.rs
// Shared constants and type aliases for the bingocast game.

pub type Number = u8;

pub const FIRST_NUMBER: Number = 1;
pub const LAST_NUMBER: Number = 90;

// Numbers shown in the "previous draws" strip, newest first.
pub const HISTORY_SIZE: usize = 5;

// Board grid geometry for terminal rendering (9 rows of 10).
pub const BOARD_COLS: usize = 10;

// Placeholder shown until the admin sets real prize amounts.
pub const DEFAULT_PRIZE: &str = "0€";

pub struct Colors;

impl Colors {
    pub fn green() -> &'static str {
        "\x1b[1;32m"
    }

    pub fn yellow() -> &'static str {
        "\x1b[1;33m"
    }

    pub fn red() -> &'static str {
        "\x1b[1;31m"
    }

    pub fn reset() -> &'static str {
        "\x1b[0m"
    }
}
