// src/state.rs
// Authoritative game state owned by the broadcast hub: the append-only
// sequence of called numbers plus the two prize display strings.
// Serialized camelCase so the wire snapshot is directly usable by
// browser-based viewers as well.

use serde::{Deserialize, Serialize};

use crate::defs::{DEFAULT_PRIZE, Number};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Insertion order is call order, not numeric order.
    pub called_numbers: Vec<Number>,
    pub last_number: Option<Number>,
    #[serde(default = "default_prize")]
    pub line_prize: String,
    #[serde(default = "default_prize")]
    pub bingo_prize: String,
}

fn default_prize() -> String {
    DEFAULT_PRIZE.to_string()
}

impl GameState {
    pub fn new() -> Self {
        Self {
            called_numbers: Vec::new(),
            last_number: None,
            line_prize: default_prize(),
            bingo_prize: default_prize(),
        }
    }

    /// Append a drawn number. Duplicates are silently ignored and the
    /// caller must not re-broadcast; returns whether the state changed.
    pub fn draw(&mut self, number: Number) -> bool {
        if self.called_numbers.contains(&number) {
            return false;
        }
        self.called_numbers.push(number);
        self.last_number = Some(number);
        true
    }

    pub fn set_prizes(&mut self, line: String, bingo: String) {
        self.line_prize = line;
        self.bingo_prize = bingo;
    }

    pub fn is_called(&self, number: Number) -> bool {
        self.called_numbers.contains(&number)
    }

    pub fn len(&self) -> usize {
        self.called_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.called_numbers.is_empty()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
