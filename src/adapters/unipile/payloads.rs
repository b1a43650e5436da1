//! Raw wire shapes of the messaging gateway API
//!
//! Every field the gateway may omit or null out is optional here; the
//! view-model mapper is the only place that decides on defaults. Unknown
//! fields are ignored so payload additions on the gateway side do not
//! break deserialization.

use serde::{Deserialize, Serialize};

use crate::types::Platform;

/// Generic list envelope: `{ "items": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// A connected account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAccount {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub name: Option<String>,
}

/// One chat/thread in the gateway's chat list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChat {
    pub id: Option<String>,
    pub account_type: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub last_message: Option<RawLastMessage>,
    pub timestamp: Option<String>,
    pub unread_count: Option<u32>,
}

/// Preview of the newest message in a chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLastMessage {
    pub text: Option<String>,
}

/// One message in a chat, as returned newest-first by the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: Option<String>,
    pub sender_type: Option<String>,
    pub text: Option<String>,
    pub timestamp: Option<String>,
}

/// Calendar event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub summary: Option<String>,
    pub start: Option<RawEventStart>,
    pub location: Option<String>,
    pub status: Option<String>,
}

/// Event start time wrapper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEventStart {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

/// Body for `POST /messages`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Body for `POST /hosted/accounts/link`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedLinkRequest {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub success_url: String,
    pub failure_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}

impl HostedLinkRequest {
    /// Build the link request for a platform, redirecting back to `origin`
    ///
    /// Google Calendar connects through the GOOGLE provider restricted to
    /// the calendar scope; all other platforms connect with their own code.
    pub fn for_platform(platform: Platform, origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            provider_type: platform.provider_code().to_string(),
            success_url: format!("{}?status=success", origin),
            failure_url: format!("{}?status=error", origin),
            providers: match platform {
                Platform::GoogleCalendar => Some(vec!["calendar".to_string()]),
                _ => None,
            },
        }
    }
}

/// Response for `POST /hosted/accounts/link`
#[derive(Debug, Clone, Deserialize)]
pub struct HostedLinkResponse {
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_with_all_fields() {
        let json = r#"{
            "id": "1",
            "account_type": "LINKEDIN",
            "name": "Sarah Jenkins",
            "image": "https://cdn.example.com/a.png",
            "last_message": { "text": "hi" },
            "timestamp": "2026-08-06T08:30:00Z",
            "unread_count": 1
        }"#;
        let chat: RawChat = serde_json::from_str(json).unwrap();
        assert_eq!(chat.id.as_deref(), Some("1"));
        assert_eq!(chat.account_type.as_deref(), Some("LINKEDIN"));
        assert_eq!(chat.last_message.unwrap().text.as_deref(), Some("hi"));
        assert_eq!(chat.unread_count, Some(1));
    }

    #[test]
    fn test_chat_tolerates_missing_and_null_fields() {
        let chat: RawChat = serde_json::from_str(r#"{"id": null, "name": "x"}"#).unwrap();
        assert!(chat.id.is_none());
        assert!(chat.last_message.is_none());
        assert!(chat.unread_count.is_none());
    }

    #[test]
    fn test_chat_tolerates_unknown_fields() {
        let chat: RawChat =
            serde_json::from_str(r#"{"id": "1", "some_new_field": {"a": 1}}"#).unwrap();
        assert_eq!(chat.id.as_deref(), Some("1"));
    }

    #[test]
    fn test_list_response_defaults_to_empty() {
        let list: RawListResponse<RawChat> = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn test_event_nested_start() {
        let json = r#"{"summary": "Standup", "start": {"dateTime": "2026-08-06T09:00:00Z"}}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.start.unwrap().date_time.as_deref(),
            Some("2026-08-06T09:00:00Z")
        );
    }

    #[test]
    fn test_hosted_link_request_for_calendar() {
        let request = HostedLinkRequest::for_platform(
            Platform::GoogleCalendar,
            "http://localhost:3000",
        );
        assert_eq!(request.provider_type, "GOOGLE");
        assert_eq!(request.success_url, "http://localhost:3000?status=success");
        assert_eq!(request.providers, Some(vec!["calendar".to_string()]));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "GOOGLE");
    }

    #[test]
    fn test_hosted_link_request_omits_providers() {
        let request = HostedLinkRequest::for_platform(Platform::Whatsapp, "https://app.test/");
        assert_eq!(request.provider_type, "WHATSAPP");
        assert_eq!(request.failure_url, "https://app.test?status=error");

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("providers"));
    }
}
