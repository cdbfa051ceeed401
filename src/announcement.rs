// src/announcement.rs
// Transient full-screen overlay for line/bingo wins. Two states, visible
// and hidden; a second show simply replaces the payload. Never persisted:
// a reconnecting client starts hidden whatever was showing before.

use crate::protocol::AnnouncementPayload;

#[derive(Debug, Default)]
pub struct Overlay {
    current: Option<AnnouncementPayload>,
}

impl Overlay {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn show(&mut self, payload: AnnouncementPayload) {
        self.current = Some(payload);
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn payload(&self) -> Option<&AnnouncementPayload> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> AnnouncementPayload {
        AnnouncementPayload {
            title: title.to_string(),
            status: "VERIFIED".to_string(),
            amount: "150€".to_string(),
        }
    }

    #[test]
    fn test_starts_hidden() {
        let overlay = Overlay::new();
        assert!(!overlay.is_visible());
        assert!(overlay.payload().is_none());
    }

    #[test]
    fn test_show_then_hide() {
        let mut overlay = Overlay::new();
        overlay.show(payload("LINE WINNER!"));
        assert!(overlay.is_visible());
        assert_eq!(overlay.payload().unwrap().title, "LINE WINNER!");

        overlay.hide();
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_second_show_replaces_payload() {
        let mut overlay = Overlay::new();
        overlay.show(payload("LINE WINNER!"));
        overlay.show(payload("BINGO WINNER!"));
        assert!(overlay.is_visible());
        assert_eq!(overlay.payload().unwrap().title, "BINGO WINNER!");
    }

    #[test]
    fn test_hide_when_hidden_is_harmless() {
        let mut overlay = Overlay::new();
        overlay.hide();
        assert!(!overlay.is_visible());
    }
}
