use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::{Message, MessageEntityKind, MessageEntityRef, User};

/* History represents the messages the bot replays during a recovery.
 * A HistoricalMessage is a trimmed-down copy of a Telegram message,
 * keeping only what the reconciler needs: who wrote it, who it mentions,
 * its text, and when it was sent.
 */

// Opaque identity of a user, keyed by lower-cased username.
// Users without a username are keyed by their numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    pub fn from_username(username: &str) -> UserKey {
        UserKey(username.trim_start_matches('@').to_lowercase())
    }

    pub fn from_user(user: &User) -> UserKey {
        match &user.username {
            Some(username) => UserKey::from_username(username),
            None => UserKey(format!("id:{}", user.id.0)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.starts_with("id:") {
            write!(f, "{}", self.0)
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMessage {
    pub author: UserKey,
    pub mentions: Vec<UserKey>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl HistoricalMessage {
    /* Builds a history entry from a Telegram message.
     * Returns None for service messages and messages with no text or caption.
     */
    pub fn from_telegram(msg: &Message) -> Option<HistoricalMessage> {
        let author = UserKey::from_user(msg.from()?);

        let (content, entities) = match msg.text() {
            Some(text) => (text, msg.parse_entities()),
            None => (msg.caption()?, msg.parse_caption_entities()),
        };

        Some(HistoricalMessage {
            author,
            mentions: entities.map(|e| collect_mentions(&e)).unwrap_or_default(),
            content: content.to_string(),
            created_at: msg.date,
        })
    }
}

// Mentioned users, in the order they appear in the text.
fn collect_mentions(entities: &[MessageEntityRef<'_>]) -> Vec<UserKey> {
    entities
        .iter()
        .filter_map(|entity| match entity.kind() {
            MessageEntityKind::Mention => Some(UserKey::from_username(entity.text())),
            MessageEntityKind::TextMention { user } => Some(UserKey::from_user(user)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_message(json: &str) -> Message {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_user_key_normalises_username() {
        assert_eq!(UserKey::from_username("@Alice"), UserKey::from_username("alice"));
        assert_eq!(UserKey::from_username("@Alice").as_str(), "alice");
        assert_eq!(UserKey::from_username("Alice").to_string(), "@alice");
    }

    #[test]
    fn test_from_telegram_collects_mentions_in_order() {
        let msg = parse_message(
            r#"{
                "message_id": 42,
                "date": 1700000000,
                "chat": {"id": -1001, "type": "supergroup", "title": "Casino"},
                "from": {"id": 7, "is_bot": true, "first_name": "Slots", "username": "SlotBot"},
                "text": "@Alice Your balance is: 10 @bob",
                "entities": [
                    {"type": "mention", "offset": 0, "length": 6},
                    {"type": "mention", "offset": 27, "length": 4}
                ]
            }"#,
        );

        let history = HistoricalMessage::from_telegram(&msg).unwrap();
        assert_eq!(history.author, UserKey::from_username("slotbot"));
        assert_eq!(
            history.mentions,
            vec![UserKey::from_username("alice"), UserKey::from_username("bob")]
        );
        assert_eq!(history.content, "@Alice Your balance is: 10 @bob");
        assert_eq!(history.created_at.timestamp(), 1700000000);
    }

    #[test]
    fn test_from_telegram_without_entities() {
        let msg = parse_message(
            r#"{
                "message_id": 43,
                "date": 1700000000,
                "chat": {"id": -1001, "type": "supergroup", "title": "Casino"},
                "from": {"id": 8, "is_bot": false, "first_name": "Carol"},
                "text": "hello"
            }"#,
        );

        let history = HistoricalMessage::from_telegram(&msg).unwrap();
        assert_eq!(history.author.as_str(), "id:8");
        assert!(history.mentions.is_empty());
    }

    #[test]
    fn test_history_entry_json() {
        let entry = HistoricalMessage {
            author: UserKey::from_username("slotbot"),
            mentions: vec![UserKey::from_username("alice")],
            content: "@alice Your balance is: 10".to_string(),
            created_at: DateTime::from_timestamp(1700000000, 0).unwrap(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""author":"slotbot""#));
        assert_eq!(serde_json::from_str::<HistoricalMessage>(&json).unwrap(), entry);
    }
}
