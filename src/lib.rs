//! Orchestrated - unified inbox sync and reply-assist engine
//!
//! Pulls conversations, messages and calendar events from a messaging
//! aggregation gateway into one observable inbox state, and drafts
//! tone-labeled reply suggestions through a generative-language API.
//!
//! ## Module Organization
//!
//! - `adapters/`: HTTP clients for the gateway and the suggestion generator
//! - `mapper/`: pure payload-to-view-model translation
//! - `sync/`: the inbox engine, shared state, and the view poll loop
//! - `suggest/`: reply suggestion orchestration
//! - `config/`: configuration management
//! - `types/`: data structures and error types

pub mod adapters;
pub mod config;
pub mod mapper;
pub mod suggest;
pub mod sync;
pub mod types;

pub use adapters::{MessagingGateway, SuggestionBackend};
pub use suggest::{SuggestionOrchestrator, SuggestionSnapshot};
pub use sync::engine::{EngineConfig, InboxEngine, SyncEvent};
pub use sync::poller::PollConfig;
pub use sync::state::{ActiveView, FetchState, InboxState};
pub use types::error::{OrchestratedError, Result};
pub use types::{
    CalendarEvent, ChatMessage, ConnectedAccount, ConversationSummary, Platform, SenderRole,
    Suggestion, SuggestionTone,
};
