//! Stateless chat relay

use crate::session::SessionRegistry;
use shared::{ChatMessage, PlayerId, ANON_NAME, CHAT_MAX_CHARS};

/// Cuts `text` down to at most `max_chars` characters, never splitting a character
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Builds the public chat message for `sender`. Senders without a player speak as "anon".
pub fn relay(registry: &SessionRegistry, sender: PlayerId, text: &str) -> ChatMessage {
    let name = registry
        .get(sender)
        .map(|player| player.name.clone())
        .unwrap_or_else(|| ANON_NAME.to_string());

    ChatMessage {
        id: sender,
        name,
        text: truncate_text(text, CHAT_MAX_CHARS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::WorldBounds;
    use std::time::Instant;

    #[test]
    fn test_long_text_is_cut_to_limit() {
        let text = "x".repeat(500);
        assert_eq!(truncate_text(&text, CHAT_MAX_CHARS).chars().count(), 300);
    }

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_text("hi there", 300), "hi there");
        assert_eq!(truncate_text("", 300), "");
        assert_eq!(truncate_text(&"y".repeat(300), 300).len(), 300);
    }

    #[test]
    fn test_truncation_respects_multibyte_chars() {
        let text = "é".repeat(400);
        let cut = truncate_text(&text, 300);
        assert_eq!(cut.chars().count(), 300);
        assert_eq!(cut.len(), 600);
    }

    #[test]
    fn test_relay_uses_player_name() {
        let mut registry = SessionRegistry::with_seed(WorldBounds::default(), 3);
        registry.join(4, Some("zed".to_string()), Instant::now());

        let message = relay(&registry, 4, "hello");
        assert_eq!(message.id, 4);
        assert_eq!(message.name, "zed");
        assert_eq!(message.text, "hello");
    }

    #[test]
    fn test_relay_without_player_falls_back_to_anon() {
        let registry = SessionRegistry::with_seed(WorldBounds::default(), 3);
        let message = relay(&registry, 11, "lurking");
        assert_eq!(message.name, "anon");
        assert_eq!(message.id, 11);
    }
}
