//! Payload-to-view-model translation
//!
//! Pure, stateless functions turning raw gateway payloads into the domain
//! entities the engine exposes. Missing or null fields get sensible defaults
//! here; nothing in this module performs IO or fails on a malformed optional
//! field.

use chrono::DateTime;

use crate::adapters::unipile::payloads::{RawAccount, RawChat, RawEvent, RawMessage};
use crate::types::{
    CalendarEvent, ChatMessage, ConnectedAccount, ConversationSummary, Platform, SenderRole,
};

/// Sender type the gateway uses for messages sent by the connected account
const SELF_SENDER_TYPE: &str = "USER";

/// Map the gateway chat list into conversation summaries
pub fn map_conversations(items: &[RawChat]) -> Vec<ConversationSummary> {
    items.iter().map(map_conversation).collect()
}

fn map_conversation(item: &RawChat) -> ConversationSummary {
    let contact_name = item
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown contact".to_string());

    let contact_avatar = item
        .image
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| placeholder_avatar(&contact_name));

    ConversationSummary {
        id: item.id.clone().unwrap_or_default(),
        platform: item
            .account_type
            .as_deref()
            .map(Platform::parse)
            .unwrap_or(Platform::Unknown),
        contact_name,
        contact_avatar,
        last_message: item
            .last_message
            .as_ref()
            .and_then(|m| m.text.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No messages yet".to_string()),
        last_message_time: format_clock_time(item.timestamp.as_deref()),
        unread_count: item.unread_count.unwrap_or(0),
    }
}

/// Map a gateway message list onto one conversation
///
/// The gateway returns messages newest-first; the engine wants them
/// oldest-first, so the order is reversed here.
pub fn map_messages(items: &[RawMessage], conversation_id: &str) -> Vec<ChatMessage> {
    items
        .iter()
        .rev()
        .map(|m| ChatMessage {
            id: m.id.clone().unwrap_or_default(),
            conversation_id: conversation_id.to_string(),
            sender: if m.sender_type.as_deref() == Some(SELF_SENDER_TYPE) {
                SenderRole::Outgoing
            } else {
                SenderRole::Incoming
            },
            body: m.text.clone().unwrap_or_default(),
            timestamp: format_clock_time(m.timestamp.as_deref()),
        })
        .collect()
}

/// Map gateway calendar events for display
pub fn map_events(items: &[RawEvent]) -> Vec<CalendarEvent> {
    items
        .iter()
        .map(|e| CalendarEvent {
            summary: e
                .summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Untitled event".to_string()),
            start_time: e
                .start
                .as_ref()
                .and_then(|s| s.date_time.as_deref())
                .map(format_event_time)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "All day".to_string()),
            location: e.location.clone().unwrap_or_default(),
            status: e
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "confirmed".to_string()),
        })
        .collect()
}

/// Map connected accounts for the platform connection overview
pub fn map_accounts(items: &[RawAccount]) -> Vec<ConnectedAccount> {
    items
        .iter()
        .map(|a| ConnectedAccount {
            id: a.id.clone().unwrap_or_default(),
            platform: a
                .account_type
                .as_deref()
                .map(Platform::parse)
                .unwrap_or(Platform::Unknown),
            name: a.name.clone().unwrap_or_default(),
        })
        .collect()
}

/// Placeholder avatar URL derived from the contact's name
pub fn placeholder_avatar(name: &str) -> String {
    format!(
        "https://api.dicebear.com/7.x/initials/svg?seed={}",
        urlencoding::encode(name)
    )
}

/// Format an RFC 3339 timestamp as a wall-clock time, or empty when absent
/// or unparseable
fn format_clock_time(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Format an event start as date plus time; empty string when unparseable
fn format_event_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::unipile::payloads::{RawEventStart, RawLastMessage};

    fn chat(id: &str, name: &str) -> RawChat {
        RawChat {
            id: Some(id.to_string()),
            account_type: Some("LINKEDIN".to_string()),
            name: Some(name.to_string()),
            image: Some(format!("https://cdn.example.com/{}.png", id)),
            last_message: Some(RawLastMessage {
                text: Some("hi".to_string()),
            }),
            timestamp: Some("2026-08-06T08:30:00Z".to_string()),
            unread_count: Some(1),
        }
    }

    #[test]
    fn test_maps_every_item() {
        let items: Vec<RawChat> = (0..5).map(|i| chat(&i.to_string(), "A")).collect();
        let mapped = map_conversations(&items);
        assert_eq!(mapped.len(), 5);
        assert!(mapped.iter().all(|c| c.platform == Platform::Linkedin));
    }

    #[test]
    fn test_empty_list_maps_to_empty() {
        assert!(map_conversations(&[]).is_empty());
    }

    #[test]
    fn test_known_chat_scenario() {
        let item = RawChat {
            id: Some("1".to_string()),
            account_type: Some("LINKEDIN".to_string()),
            name: Some("Sarah Jenkins".to_string()),
            image: None,
            last_message: Some(RawLastMessage {
                text: Some("hi".to_string()),
            }),
            timestamp: None,
            unread_count: Some(1),
        };
        let mapped = map_conversations(&[item]);
        assert_eq!(mapped[0].id, "1");
        assert_eq!(mapped[0].platform, Platform::Linkedin);
        assert_eq!(mapped[0].contact_name, "Sarah Jenkins");
        assert_eq!(mapped[0].last_message, "hi");
        assert_eq!(mapped[0].unread_count, 1);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let mapped = map_conversations(&[RawChat::default()]);
        let summary = &mapped[0];
        assert_eq!(summary.platform, Platform::Unknown);
        assert_eq!(summary.contact_name, "Unknown contact");
        assert_eq!(summary.last_message, "No messages yet");
        assert_eq!(summary.last_message_time, "");
        assert_eq!(summary.unread_count, 0);
        assert!(summary
            .contact_avatar
            .contains("seed=Unknown%20contact"));
    }

    #[test]
    fn test_placeholder_avatar_only_when_image_missing() {
        let with_image = map_conversations(&[chat("1", "A")]);
        assert_eq!(with_image[0].contact_avatar, "https://cdn.example.com/1.png");
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let items: Vec<RawChat> = (0..3).map(|i| chat(&i.to_string(), "B")).collect();
        assert_eq!(map_conversations(&items), map_conversations(&items));
    }

    #[test]
    fn test_messages_reversed_to_oldest_first() {
        let items = vec![
            RawMessage {
                id: Some("m3".to_string()),
                sender_type: Some("USER".to_string()),
                text: Some("newest".to_string()),
                timestamp: Some("2026-08-06T10:00:00Z".to_string()),
            },
            RawMessage {
                id: Some("m2".to_string()),
                sender_type: Some("CONTACT".to_string()),
                text: Some("middle".to_string()),
                timestamp: Some("2026-08-06T09:00:00Z".to_string()),
            },
            RawMessage {
                id: Some("m1".to_string()),
                sender_type: None,
                text: Some("oldest".to_string()),
                timestamp: None,
            },
        ];
        let mapped = map_messages(&items, "chat-1");
        assert_eq!(mapped[0].id, "m1");
        assert_eq!(mapped[2].id, "m3");
        assert_eq!(mapped[2].sender, SenderRole::Outgoing);
        assert_eq!(mapped[1].sender, SenderRole::Incoming);
        assert_eq!(mapped[0].sender, SenderRole::Incoming);
        assert!(mapped.iter().all(|m| m.conversation_id == "chat-1"));
    }

    #[test]
    fn test_clock_time_formatting() {
        let items = vec![RawMessage {
            id: Some("m1".to_string()),
            sender_type: None,
            text: Some("x".to_string()),
            timestamp: Some("2026-08-06T08:30:00+00:00".to_string()),
        }];
        let mapped = map_messages(&items, "c");
        assert_eq!(mapped[0].timestamp, "08:30");
    }

    #[test]
    fn test_garbage_timestamp_maps_to_empty() {
        let items = vec![RawMessage {
            timestamp: Some("yesterday-ish".to_string()),
            ..Default::default()
        }];
        assert_eq!(map_messages(&items, "c")[0].timestamp, "");
    }

    #[test]
    fn test_event_defaults() {
        let mapped = map_events(&[RawEvent::default()]);
        assert_eq!(mapped[0].summary, "Untitled event");
        assert_eq!(mapped[0].start_time, "All day");
        assert_eq!(mapped[0].status, "confirmed");
        assert_eq!(mapped[0].location, "");
    }

    #[test]
    fn test_accounts_unknown_type_falls_back() {
        let items = vec![
            RawAccount {
                id: Some("acc-1".to_string()),
                account_type: Some("TELEGRAM".to_string()),
                name: Some("Personal".to_string()),
            },
            RawAccount::default(),
        ];
        let mapped = map_accounts(&items);
        assert_eq!(mapped[0].platform, Platform::Telegram);
        assert_eq!(mapped[1].platform, Platform::Unknown);
        assert_eq!(mapped[1].id, "");
    }

    #[test]
    fn test_event_with_start_time() {
        let event = RawEvent {
            summary: Some("Standup".to_string()),
            start: Some(RawEventStart {
                date_time: Some("2026-08-06T09:00:00Z".to_string()),
            }),
            location: Some("Room 2".to_string()),
            status: Some("tentative".to_string()),
        };
        let mapped = map_events(&[event]);
        assert_eq!(mapped[0].start_time, "2026-08-06 09:00");
        assert_eq!(mapped[0].status, "tentative");
    }
}
