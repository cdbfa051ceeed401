// src/protocol.rs
// Wire protocol between clients and the broadcast hub. Events travel as
// JSON text frames, adjacently tagged so each frame reads as
// {"event": "...", "data": ...} with the data field omitted for signals.

use serde::{Deserialize, Serialize};

use crate::defs::Number;
use crate::state::GameState;

/// Overlay payload for line/bingo win announcements. Ephemeral: never part
/// of GameState, so a reconnecting client sees no announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementPayload {
    pub title: String,
    pub status: String,
    pub amount: String,
}

/// Events a client sends to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "draw-number")]
    DrawNumber(Number),
    #[serde(rename = "reset-game")]
    ResetGame,
    #[serde(rename = "set-prizes")]
    SetPrizes { line: String, bingo: String },
    #[serde(rename = "show-announcement")]
    ShowAnnouncement(AnnouncementPayload),
    #[serde(rename = "hide-announcement")]
    HideAnnouncement,
}

/// Events the hub sends to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "init-state")]
    InitState(GameState),
    #[serde(rename = "number-drawn")]
    NumberDrawn(Number),
    #[serde(rename = "game-reset")]
    GameReset,
    #[serde(rename = "show-announcement")]
    ShowAnnouncement(AnnouncementPayload),
    #[serde(rename = "hide-announcement")]
    HideAnnouncement,
}

impl ClientEvent {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_number_wire_format() {
        let event = ClientEvent::DrawNumber(42);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"event": "draw-number", "data": 42}));
    }

    #[test]
    fn test_signal_events_omit_data() {
        let json = serde_json::to_value(&ClientEvent::ResetGame).unwrap();
        assert_eq!(json, serde_json::json!({"event": "reset-game"}));

        let json = serde_json::to_value(&ServerEvent::GameReset).unwrap();
        assert_eq!(json, serde_json::json!({"event": "game-reset"}));

        let json = serde_json::to_value(&ClientEvent::HideAnnouncement).unwrap();
        assert_eq!(json, serde_json::json!({"event": "hide-announcement"}));
    }

    #[test]
    fn test_set_prizes_wire_format() {
        let event = ClientEvent::SetPrizes {
            line: "150€".to_string(),
            bingo: "500€".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "set-prizes", "data": {"line": "150€", "bingo": "500€"}})
        );
    }

    #[test]
    fn test_announcement_wire_format() {
        let event = ServerEvent::ShowAnnouncement(AnnouncementPayload {
            title: "LINE WINNER!".to_string(),
            status: "LINE VERIFIED".to_string(),
            amount: "150€".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "show-announcement");
        assert_eq!(json["data"]["title"], "LINE WINNER!");
        assert_eq!(json["data"]["amount"], "150€");
    }

    #[test]
    fn test_init_state_round_trip() {
        let mut state = GameState::new();
        state.draw(5);
        state.draw(12);
        let event = ServerEvent::InitState(state.clone());

        let json = event.to_json().unwrap();
        assert!(json.contains("\"init-state\""));
        assert!(json.contains("\"calledNumbers\":[5,12]"));

        match ServerEvent::from_json(&json).unwrap() {
            ServerEvent::InitState(decoded) => assert_eq!(decoded, state),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_client_event_parse() {
        let event = ClientEvent::from_json(r#"{"event":"draw-number","data":7}"#).unwrap();
        assert_eq!(event, ClientEvent::DrawNumber(7));

        let event = ClientEvent::from_json(r#"{"event":"reset-game"}"#).unwrap();
        assert_eq!(event, ClientEvent::ResetGame);
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        assert!(ClientEvent::from_json("not json").is_err());
        assert!(ClientEvent::from_json(r#"{"event":"unknown-thing"}"#).is_err());
    }
}
