pub mod error;

use serde::{Deserialize, Serialize};

/// Messaging network a conversation belongs to
///
/// Parsed from the gateway's `account_type` field. Anything the gateway
/// reports that we do not recognize maps to `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Whatsapp,
    Linkedin,
    Gmail,
    Instagram,
    Telegram,
    GoogleCalendar,
    Unknown,
}

impl Platform {
    /// Parse a gateway `account_type` value, case-insensitively
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Platform::Whatsapp,
            "linkedin" => Platform::Linkedin,
            "gmail" => Platform::Gmail,
            "instagram" => Platform::Instagram,
            "telegram" => Platform::Telegram,
            "google_calendar" | "googlecalendar" => Platform::GoogleCalendar,
            _ => Platform::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Whatsapp => "whatsapp",
            Platform::Linkedin => "linkedin",
            Platform::Gmail => "gmail",
            Platform::Instagram => "instagram",
            Platform::Telegram => "telegram",
            Platform::GoogleCalendar => "google_calendar",
            Platform::Unknown => "unknown",
        }
    }

    /// Provider code the gateway expects when creating a hosted connection
    /// link. Google Calendar connects through the GOOGLE provider with a
    /// calendar scope; every other platform uses its own uppercase code.
    pub fn provider_code(&self) -> &'static str {
        match self {
            Platform::Whatsapp => "WHATSAPP",
            Platform::Linkedin => "LINKEDIN",
            Platform::Gmail => "GMAIL",
            Platform::Instagram => "INSTAGRAM",
            Platform::Telegram => "TELEGRAM",
            Platform::GoogleCalendar => "GOOGLE",
            Platform::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who authored a message within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    /// Sent by the connected account ("self")
    Outgoing,
    /// Sent by the counterparty
    Incoming,
}

/// One row of the unified inbox list
///
/// Rebuilt wholesale from the gateway's chat list on every poll; `id` is the
/// stable per-thread identity used for replace-by-id semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub platform: Platform,
    pub contact_name: String,
    pub contact_avatar: String,
    pub last_message: String,
    pub last_message_time: String,
    pub unread_count: u32,
}

/// A single message within the selected conversation
///
/// The timestamp is display-formatted and not orderable; ordering comes from
/// the position in the collection (oldest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender: SenderRole,
    pub body: String,
    pub timestamp: String,
}

/// Tone label attached to a reply suggestion
///
/// The generator is asked for Professional/Friendly/Casual but is not
/// contractually bound to them; unrecognized labels are carried through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SuggestionTone {
    Professional,
    Friendly,
    Casual,
    Other(String),
}

impl From<String> for SuggestionTone {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "professional" => SuggestionTone::Professional,
            "friendly" => SuggestionTone::Friendly,
            "casual" => SuggestionTone::Casual,
            _ => SuggestionTone::Other(value),
        }
    }
}

impl From<SuggestionTone> for String {
    fn from(value: SuggestionTone) -> Self {
        match value {
            SuggestionTone::Professional => "Professional".to_string(),
            SuggestionTone::Friendly => "Friendly".to_string(),
            SuggestionTone::Casual => "Casual".to_string(),
            SuggestionTone::Other(label) => label,
        }
    }
}

impl std::fmt::Display for SuggestionTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionTone::Professional => f.write_str("Professional"),
            SuggestionTone::Friendly => f.write_str("Friendly"),
            SuggestionTone::Casual => f.write_str("Casual"),
            SuggestionTone::Other(label) => f.write_str(label),
        }
    }
}

/// One AI-drafted reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub tone: SuggestionTone,
    pub text: String,
}

/// Read-only calendar entry for the calendar view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start_time: String,
    pub location: String,
    pub status: String,
}

/// An account the user has connected through the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub platform: Platform,
    pub name: String,
}
