// src/reconcile.rs
// Client-side view state and the reconciliation rules that keep it in
// agreement with the hub without duplicating side effects: snapshot replay
// marks silently, live draws are duplicate-suppressed, and voice is only
// ever cued for the admin's own locally-originated draws.

use rand::RngExt;

use crate::defs::{FIRST_NUMBER, HISTORY_SIZE, LAST_NUMBER, Number};
use crate::protocol::ClientEvent;
use crate::role::Role;
use crate::state::GameState;

/// Side effects requested by the view; the runtime executes them. The view
/// itself performs no I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Newly marked as called; redraw the board cell.
    Mark(Number),
    /// Un-called by an admin correction; redraw the board cell.
    Unmark(Number),
    /// Cue voice playback through the audio announcer.
    Speak(Number),
    /// Drop the number from the audio queue, stopping it if playing.
    CancelVoice(Number),
    /// Send an event to the hub.
    Send(ClientEvent),
    /// Full local reset: board, history, audio queue, playing marker.
    ClearAll,
}

pub struct ClientView {
    role: Role,
    called_numbers: Vec<Number>,
    pub line_prize: String,
    pub bingo_prize: String,
}

impl ClientView {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            called_numbers: Vec::new(),
            line_prize: String::new(),
            bingo_prize: String::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_called(&self, number: Number) -> bool {
        self.called_numbers.contains(&number)
    }

    pub fn called_numbers(&self) -> &[Number] {
        &self.called_numbers
    }

    pub fn last_called(&self) -> Option<Number> {
        self.called_numbers.last().copied()
    }

    /// The numbers preceding the most recent one, newest first.
    pub fn history(&self) -> Vec<Number> {
        if self.called_numbers.len() <= 1 {
            return Vec::new();
        }

        let available_previous = self.called_numbers.len() - 1;
        let to_show = std::cmp::min(HISTORY_SIZE, available_previous);
        let start = self.called_numbers.len() - to_show - 1;
        let end = self.called_numbers.len() - 1;

        let mut result: Vec<Number> = self.called_numbers[start..end].to_vec();
        result.reverse();
        result
    }

    /// Replay a full snapshot into the local view. Marks every number the
    /// client has not yet seen but never cues voice: a late joiner must not
    /// replay the whole call history as an audio burst.
    pub fn apply_snapshot(&mut self, state: &GameState) -> Vec<Effect> {
        let mut effects = Vec::new();
        for &number in &state.called_numbers {
            if !self.is_called(number) {
                self.called_numbers.push(number);
                effects.push(Effect::Mark(number));
            }
        }
        self.line_prize = state.line_prize.clone();
        self.bingo_prize = state.bingo_prize.clone();
        effects
    }

    /// A live `number-drawn` broadcast. Already-marked numbers are ignored,
    /// which also absorbs the admin's echo of its own draw.
    pub fn on_number_drawn(&mut self, number: Number) -> Vec<Effect> {
        if self.is_called(number) {
            return Vec::new();
        }
        self.called_numbers.push(number);
        vec![Effect::Mark(number)]
    }

    /// A `game-reset` broadcast: unconditional local wipe, regardless of role.
    pub fn on_reset(&mut self) -> Vec<Effect> {
        self.called_numbers.clear();
        vec![Effect::ClearAll]
    }

    /// Admin-originated draw: mark, cue the local voice call, and tell the
    /// hub. The hub's echo broadcast then converges with this local update
    /// through `on_number_drawn`'s duplicate check.
    pub fn local_draw(&mut self, number: Number) -> Vec<Effect> {
        if self.is_called(number) {
            return Vec::new();
        }
        self.called_numbers.push(number);

        let mut effects = vec![Effect::Mark(number)];
        if self.role.is_admin() {
            effects.push(Effect::Speak(number));
        }
        effects.push(Effect::Send(ClientEvent::DrawNumber(number)));
        effects
    }

    /// Admin correction: un-call a called number (local only, never sent to
    /// the hub) or draw an un-called one.
    pub fn toggle(&mut self, number: Number) -> Vec<Effect> {
        if self.is_called(number) {
            self.called_numbers.retain(|&n| n != number);
            vec![Effect::Unmark(number), Effect::CancelVoice(number)]
        } else {
            self.local_draw(number)
        }
    }

    /// Client-local random choice among the numbers not yet called.
    pub fn pick_random(&self) -> Option<Number> {
        let available: Vec<Number> = (FIRST_NUMBER..=LAST_NUMBER)
            .filter(|n| !self.is_called(*n))
            .collect();
        if available.is_empty() {
            return None;
        }
        let mut rng = rand::rng();
        Some(available[rng.random_range(0..available.len())])
    }
}
