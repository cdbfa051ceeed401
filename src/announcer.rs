// src/announcer.rs
// Single-flight, ordered voice announcement queue. The queue itself is a
// plain state machine driven by the client's event loop; actual audio
// output goes through the VoicePlayer seam, whose completions come back as
// events. Advancement is an explicit loop, so rapid-fire corrections can
// never grow the call stack.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use crate::defs::Number;
use crate::logging::log_warning;

/// Result of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CancelOutcome {
    /// The number was the one playing; playback state was cleared and the
    /// caller must stop the player and advance.
    StoppedPlaying,
    /// The number was waiting in the queue and has been removed.
    Removed,
    /// The number was neither queued nor playing. Safe no-op.
    NotQueued,
}

pub struct AnnouncerQueue {
    queue: VecDeque<Number>,
    playing: Option<Number>,
}

impl AnnouncerQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            playing: None,
        }
    }

    pub fn playing(&self) -> Option<Number> {
        self.playing
    }

    pub fn is_idle(&self) -> bool {
        self.playing.is_none() && self.queue.is_empty()
    }

    /// Queue a number for voice playback. Ignored when already queued or
    /// playing. Returns the number to start now, if playback was idle.
    pub fn enqueue<F>(&mut self, number: Number, is_called: F) -> Option<Number>
    where
        F: Fn(Number) -> bool,
    {
        if self.playing == Some(number) || self.queue.contains(&number) {
            return None;
        }
        self.queue.push_back(number);
        self.advance(is_called)
    }

    /// Playback of the current clip finished (or failed, which counts the
    /// same). Sole re-entry point that drains the queue.
    pub fn complete<F>(&mut self, is_called: F) -> Option<Number>
    where
        F: Fn(Number) -> bool,
    {
        self.playing = None;
        self.advance(is_called)
    }

    /// Remove a number from the announcer. See `CancelOutcome` for what the
    /// caller must do next.
    pub fn cancel(&mut self, number: Number) -> CancelOutcome {
        if self.playing == Some(number) {
            self.playing = None;
            return CancelOutcome::StoppedPlaying;
        }
        let before = self.queue.len();
        self.queue.retain(|&n| n != number);
        if self.queue.len() < before {
            CancelOutcome::Removed
        } else {
            CancelOutcome::NotQueued
        }
    }

    /// Pop queue heads until one is still in the called set, and mark it
    /// playing. Numbers un-called while waiting are skipped, never played.
    /// Does nothing while a clip is active (single-flight).
    pub fn advance<F>(&mut self, is_called: F) -> Option<Number>
    where
        F: Fn(Number) -> bool,
    {
        if self.playing.is_some() {
            return None;
        }
        while let Some(next) = self.queue.pop_front() {
            if !is_called(next) {
                continue;
            }
            self.playing = Some(next);
            return Some(next);
        }
        None
    }

    /// Full wipe on game reset.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.playing = None;
    }
}

impl Default for AnnouncerQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a drawn number to its voice clip on disk. The core never cares
/// how clips are stored, only that each number maps to a playable handle.
#[derive(Debug, Clone)]
pub struct ClipLibrary {
    dir: PathBuf,
}

impl ClipLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn clip_path(&self, number: Number) -> PathBuf {
        self.dir.join(format!("{number}.mp3"))
    }
}

/// Audio output seam. `start` must return immediately; completion arrives
/// as a message on the channel the implementation was built with.
pub trait VoicePlayer {
    fn start(&mut self, number: Number);
    fn stop(&mut self);
}

/// Plays clips by spawning an external player process. Natural completion
/// (and spawn failure, which is completion-equivalent) reports the number
/// on the done channel; a stopped clip reports nothing, because the cancel
/// path already advances the queue.
pub struct CommandPlayer {
    program: String,
    library: ClipLibrary,
    done_tx: mpsc::Sender<Number>,
    kill_tx: Option<oneshot::Sender<()>>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, library: ClipLibrary, done_tx: mpsc::Sender<Number>) -> Self {
        Self {
            program: program.into(),
            library,
            done_tx,
            kill_tx: None,
        }
    }
}

impl VoicePlayer for CommandPlayer {
    fn start(&mut self, number: Number) {
        let clip = self.library.clip_path(number);
        let program = self.program.clone();
        let done_tx = self.done_tx.clone();
        let (kill_tx, mut kill_rx) = oneshot::channel::<()>();
        self.kill_tx = Some(kill_tx);

        tokio::spawn(async move {
            let child = Command::new(&program)
                .arg(&clip)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            let mut child = match child {
                Ok(child) => child,
                Err(e) => {
                    log_warning(&format!(
                        "Voice playback failed for {number} ({}): {e}",
                        clip.display()
                    ));
                    let _ = done_tx.send(number).await;
                    return;
                }
            };

            tokio::select! {
                _ = child.wait() => {
                    let _ = done_tx.send(number).await;
                }
                _ = &mut kill_rx => {
                    let _ = child.kill().await;
                }
            }
        });
    }

    fn stop(&mut self) {
        if let Some(kill_tx) = self.kill_tx.take() {
            let _ = kill_tx.send(());
        }
    }
}
