// src/hub.rs
// The broadcast hub: a single task owns the GameState and consumes a
// serialized stream of client events, so every mutation and its fan-out
// run to completion before the next event is looked at. Connections talk
// to it over an mpsc channel and listen on a tokio broadcast channel.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::logging::{log_info, log_warning};
use crate::protocol::{ClientEvent, ServerEvent};
use crate::state::GameState;

/// Identity of one WebSocket connection, assigned by the server layer.
pub type ConnId = u64;

const COMMAND_BUFFER: usize = 256;
const BROADCAST_BUFFER: usize = 128;

/// Commands consumed by the hub loop.
#[derive(Debug)]
pub enum HubCommand {
    /// An event received from a connected client.
    Client { origin: ConnId, event: ClientEvent },
    /// Consistent full-state copy for a newly connected client.
    Snapshot(oneshot::Sender<GameState>),
}

/// A server event fanned out to connections. Announcement events are peer
/// broadcasts: the originator already updated itself locally and is
/// excluded; everything else echoes back to the originator as well.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub origin: ConnId,
    pub echo_origin: bool,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn delivers_to(&self, conn: ConnId) -> bool {
        self.echo_origin || conn != self.origin
    }
}

/// Apply one client event to the game state and decide what to broadcast.
/// Pure with respect to channels, so the protocol semantics are testable
/// without spinning up the loop.
pub fn apply(state: &mut GameState, origin: ConnId, event: ClientEvent) -> Option<Outbound> {
    match event {
        ClientEvent::DrawNumber(number) => {
            // Duplicate submissions (re-sent frames, races between two admin
            // clicks) are silently dropped: no state change, no re-broadcast.
            if !state.draw(number) {
                return None;
            }
            log_info(&format!("Number drawn: {number} ({} called)", state.len()));
            Some(Outbound {
                origin,
                echo_origin: true,
                event: ServerEvent::NumberDrawn(number),
            })
        }
        ClientEvent::ResetGame => {
            // Fresh instance rather than clearing in place: an in-flight
            // mutation of the old state can never leak into the new game.
            *state = GameState::new();
            log_info("Game reset, state replaced");
            Some(Outbound {
                origin,
                echo_origin: true,
                event: ServerEvent::GameReset,
            })
        }
        ClientEvent::SetPrizes { line, bingo } => {
            // Prizes propagate only through the next snapshot. Known gap,
            // kept as-is: prizes are a soft value read at connect time.
            state.set_prizes(line, bingo);
            log_info(&format!(
                "Prizes updated: line={}, bingo={}",
                state.line_prize, state.bingo_prize
            ));
            None
        }
        ClientEvent::ShowAnnouncement(payload) => Some(Outbound {
            origin,
            echo_origin: false,
            event: ServerEvent::ShowAnnouncement(payload),
        }),
        ClientEvent::HideAnnouncement => Some(Outbound {
            origin,
            echo_origin: false,
            event: ServerEvent::HideAnnouncement,
        }),
    }
}

/// Handle used by the server layer to talk to a running hub.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    broadcast: broadcast::Sender<Outbound>,
}

impl HubHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.broadcast.subscribe()
    }

    pub async fn send(&self, command: HubCommand) -> Result<(), mpsc::error::SendError<HubCommand>> {
        self.commands.send(command).await
    }

    /// Request a consistent snapshot from the hub loop. Returns None only
    /// when the hub task has gone away.
    pub async fn snapshot(&self) -> Option<GameState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands.send(HubCommand::Snapshot(reply_tx)).await.ok()?;
        reply_rx.await.ok()
    }
}

/// Spawn the hub loop. The returned handle is cheap to clone per connection.
pub fn spawn() -> (HubHandle, tokio::task::JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (broadcast_tx, _) = broadcast::channel(BROADCAST_BUFFER);

    let handle = HubHandle {
        commands: command_tx,
        broadcast: broadcast_tx.clone(),
    };

    let task = tokio::spawn(run(command_rx, broadcast_tx));
    (handle, task)
}

async fn run(mut commands: mpsc::Receiver<HubCommand>, broadcast_tx: broadcast::Sender<Outbound>) {
    let mut state = GameState::new();
    log_info("Hub started with empty game state");

    while let Some(command) = commands.recv().await {
        match command {
            HubCommand::Snapshot(reply) => {
                if reply.send(state.clone()).is_err() {
                    log_warning("Snapshot requester went away before delivery");
                }
            }
            HubCommand::Client { origin, event } => {
                if let Some(outbound) = apply(&mut state, origin, event) {
                    // Send fails only with zero subscribers, which is fine.
                    let _ = broadcast_tx.send(outbound);
                }
            }
        }
    }

    log_info("Hub shutting down, all handles dropped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AnnouncementPayload;

    fn announcement() -> AnnouncementPayload {
        AnnouncementPayload {
            title: "LINE WINNER!".to_string(),
            status: "LINE VERIFIED".to_string(),
            amount: "150€".to_string(),
        }
    }

    #[test]
    fn test_draw_broadcasts_to_everyone_including_origin() {
        let mut state = GameState::new();
        let out = apply(&mut state, 1, ClientEvent::DrawNumber(12)).unwrap();
        assert_eq!(out.event, ServerEvent::NumberDrawn(12));
        assert!(out.delivers_to(1), "originator must receive its own draw");
        assert!(out.delivers_to(2));
    }

    #[test]
    fn test_duplicate_draw_is_silent() {
        let mut state = GameState::new();
        assert!(apply(&mut state, 1, ClientEvent::DrawNumber(12)).is_some());
        assert!(apply(&mut state, 1, ClientEvent::DrawNumber(12)).is_none());
        assert!(apply(&mut state, 2, ClientEvent::DrawNumber(12)).is_none());
        assert_eq!(state.called_numbers, vec![12]);
    }

    #[test]
    fn test_reset_replaces_state_and_broadcasts() {
        let mut state = GameState::new();
        let _ = apply(&mut state, 1, ClientEvent::DrawNumber(12));
        let _ = apply(
            &mut state,
            1,
            ClientEvent::SetPrizes { line: "1€".to_string(), bingo: "2€".to_string() },
        );

        let out = apply(&mut state, 1, ClientEvent::ResetGame).unwrap();
        assert_eq!(out.event, ServerEvent::GameReset);
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_set_prizes_mutates_without_broadcast() {
        let mut state = GameState::new();
        let out = apply(
            &mut state,
            1,
            ClientEvent::SetPrizes { line: "150€".to_string(), bingo: "500€".to_string() },
        );
        assert!(out.is_none());
        assert_eq!(state.line_prize, "150€");
        assert_eq!(state.bingo_prize, "500€");
    }

    #[test]
    fn test_announcements_exclude_origin() {
        let mut state = GameState::new();
        let out = apply(&mut state, 7, ClientEvent::ShowAnnouncement(announcement())).unwrap();
        assert!(!out.delivers_to(7), "sender already showed the overlay locally");
        assert!(out.delivers_to(8));

        let out = apply(&mut state, 7, ClientEvent::HideAnnouncement).unwrap();
        assert!(!out.delivers_to(7));
        assert!(out.delivers_to(8));
    }

    #[tokio::test]
    async fn test_hub_loop_draw_and_snapshot() {
        let (hub, _task) = spawn();
        let mut rx = hub.subscribe();

        hub.send(HubCommand::Client { origin: 1, event: ClientEvent::DrawNumber(42) })
            .await
            .unwrap();

        let out = rx.recv().await.unwrap();
        assert_eq!(out.event, ServerEvent::NumberDrawn(42));

        let snapshot = hub.snapshot().await.unwrap();
        assert_eq!(snapshot.called_numbers, vec![42]);
        assert_eq!(snapshot.last_number, Some(42));
    }

    #[tokio::test]
    async fn test_hub_loop_duplicate_draw_single_broadcast() {
        let (hub, _task) = spawn();
        let mut rx = hub.subscribe();

        for _ in 0..2 {
            hub.send(HubCommand::Client { origin: 1, event: ClientEvent::DrawNumber(12) })
                .await
                .unwrap();
        }
        hub.send(HubCommand::Client { origin: 1, event: ClientEvent::DrawNumber(13) })
            .await
            .unwrap();

        // Exactly one broadcast for 12, then the one for 13.
        let out = rx.recv().await.unwrap();
        assert_eq!(out.event, ServerEvent::NumberDrawn(12));
        let out = rx.recv().await.unwrap();
        assert_eq!(out.event, ServerEvent::NumberDrawn(13));
    }

    #[tokio::test]
    async fn test_reset_then_snapshot_is_empty() {
        let (hub, _task) = spawn();

        hub.send(HubCommand::Client { origin: 1, event: ClientEvent::DrawNumber(5) })
            .await
            .unwrap();
        hub.send(HubCommand::Client { origin: 1, event: ClientEvent::ResetGame })
            .await
            .unwrap();

        let snapshot = hub.snapshot().await.unwrap();
        assert!(snapshot.called_numbers.is_empty());
        assert_eq!(snapshot.last_number, None);
    }
}
