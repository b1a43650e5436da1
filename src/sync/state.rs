//! Shared inbox state
//!
//! One container owns the authoritative copies of everything the dashboard
//! displays. The sync engine is its only writer; callers read through cheap
//! snapshots, so no observer can see a partially updated collection.

use serde::{Deserialize, Serialize};

use crate::types::{CalendarEvent, ChatMessage, ConversationSummary};

/// Which view the sync loop is currently feeding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    Messages,
    Calendar,
}

/// Fetch status of one collection
///
/// Recorded alongside each collection so callers can distinguish a genuinely
/// empty result from a failed fetch that left stale data in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "error")]
pub enum FetchState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// The inbox state container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxState {
    pub active_view: ActiveView,
    pub conversations: Vec<ConversationSummary>,
    pub conversations_state: FetchState,
    pub selected_conversation: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub messages_state: FetchState,
    pub events: Vec<CalendarEvent>,
    pub events_state: FetchState,
}

impl InboxState {
    pub fn new() -> Self {
        Self {
            active_view: ActiveView::Messages,
            conversations: Vec::new(),
            conversations_state: FetchState::Idle,
            selected_conversation: None,
            messages: Vec::new(),
            messages_state: FetchState::Idle,
            events: Vec::new(),
            events_state: FetchState::Idle,
        }
    }

    /// Whether a conversation id is present in the current summaries
    pub fn contains_conversation(&self, id: &str) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }
}

impl Default for InboxState {
    fn default() -> Self {
        Self::new()
    }
}
