//! External service adapters
//!
//! Each adapter wraps one remote API behind a trait so the engine and
//! orchestrator can be driven against in-process fakes in tests.

pub mod gemini;
pub mod unipile;

use async_trait::async_trait;

use crate::types::error::Result;
use crate::types::Suggestion;
use crate::adapters::unipile::payloads::{
    HostedLinkRequest, RawAccount, RawChat, RawEvent, RawMessage,
};

/// Remote messaging gateway operations
///
/// One request/response per call, no local retries. List operations surface
/// their failures; the sync engine decides how to degrade them.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<RawAccount>>;

    async fn list_chats(&self) -> Result<Vec<RawChat>>;

    /// Messages for one chat, in the gateway's native newest-first order
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<RawMessage>>;

    /// Send a message; returns the echoed message record
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<RawMessage>;

    /// Create a hosted connection link; returns the URL to open
    async fn create_hosted_link(&self, request: &HostedLinkRequest) -> Result<String>;

    async fn list_events(&self) -> Result<Vec<RawEvent>>;
}

/// Reply suggestion generation
///
/// A single prompt-in, structured-suggestions-out call.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<Suggestion>>;
}
