//! Reply suggestion orchestration
//!
//! Owns the suggestion set shown next to the selected conversation. One
//! generation runs per request; a newer request supersedes an older one
//! still in flight, so two result sets can never interleave. Generation
//! failures degrade to an empty set instead of surfacing to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::adapters::SuggestionBackend;
use crate::sync::state::FetchState;
use crate::types::error::Result;
use crate::types::{ChatMessage, SenderRole, Suggestion};

/// How many trailing messages feed the prompt context
const CONTEXT_WINDOW: usize = 3;

/// Current suggestion set plus its fetch status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionSnapshot {
    pub suggestions: Vec<Suggestion>,
    pub state: FetchState,
}

impl SuggestionSnapshot {
    fn empty() -> Self {
        Self {
            suggestions: Vec::new(),
            state: FetchState::Idle,
        }
    }
}

/// Build the generation prompt from the tail of a conversation
///
/// Only the last three messages are included, oldest first, each tagged by
/// who sent it.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    let start = messages.len().saturating_sub(CONTEXT_WINDOW);
    let context = messages[start..]
        .iter()
        .map(|m| {
            let speaker = match m.sender {
                SenderRole::Outgoing => "Me",
                SenderRole::Incoming => "Them",
            };
            format!("{}: {}", speaker, m.body)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate 3 distinct reply suggestions based on this conversation history.\n\
         Provide exactly one for each tone: Professional, Friendly, and Casual.\n\n\
         Conversation:\n{}",
        context
    )
}

/// Drives suggestion generation for the selected conversation
pub struct SuggestionOrchestrator {
    backend: Arc<dyn SuggestionBackend>,
    snapshot: RwLock<SuggestionSnapshot>,
    epoch: AtomicU64,
}

impl SuggestionOrchestrator {
    pub fn new(backend: Arc<dyn SuggestionBackend>) -> Self {
        Self {
            backend,
            snapshot: RwLock::new(SuggestionSnapshot::empty()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Get the current suggestion set
    pub async fn snapshot(&self) -> SuggestionSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Clear the suggestion set (on conversation switch)
    ///
    /// Also invalidates any generation still in flight so its result is
    /// discarded instead of resurfacing under the new selection.
    pub async fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut snapshot = self.snapshot.write().await;
        *snapshot = SuggestionSnapshot::empty();
    }

    /// Request a fresh suggestion set for the given messages
    ///
    /// An empty message list is a no-op: no generator call is made and the
    /// current set is left alone. Re-invoking while a request is in flight
    /// supersedes it; the superseded result is dropped on arrival.
    pub async fn request(&self, messages: &[ChatMessage]) -> Result<()> {
        if messages.is_empty() {
            debug!("No messages selected, skipping suggestion generation");
            return Ok(());
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.state = FetchState::Loading;
        }

        let prompt = build_prompt(messages);
        let result = self.backend.generate(&prompt).await;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("Suggestion result superseded, discarding");
            return Ok(());
        }

        let mut snapshot = self.snapshot.write().await;
        match result {
            Ok(suggestions) => {
                debug!("Generated {} suggestions", suggestions.len());
                snapshot.suggestions = suggestions;
                snapshot.state = FetchState::Ready;
            }
            Err(e) => {
                warn!("Suggestion generation failed: {}", e);
                snapshot.suggestions = Vec::new();
                snapshot.state = FetchState::Failed(e.to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::error::OrchestratedError;
    use crate::types::SuggestionTone;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct RecordingBackend {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        result: Mutex<Result<Vec<Suggestion>>>,
        gate: Option<Arc<tokio::sync::Notify>>,
        entered: Option<Arc<tokio::sync::Notify>>,
    }

    impl RecordingBackend {
        fn returning(result: Result<Vec<Suggestion>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                result: Mutex::new(result),
                gate: None,
                entered: None,
            }
        }
    }

    #[async_trait]
    impl SuggestionBackend for RecordingBackend {
        async fn generate(&self, prompt: &str) -> Result<Vec<Suggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(entered) = &self.entered {
                entered.notify_one();
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.result.lock().unwrap().clone()
        }
    }

    fn message(id: &str, body: &str, sender: SenderRole) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            conversation_id: "c1".to_string(),
            sender,
            body: body.to_string(),
            timestamp: "08:30".to_string(),
        }
    }

    fn sample_suggestions() -> Vec<Suggestion> {
        vec![Suggestion {
            tone: SuggestionTone::Friendly,
            text: "Sounds great!".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_empty_messages_never_calls_backend() {
        let backend = Arc::new(RecordingBackend::returning(Ok(sample_suggestions())));
        let orchestrator = SuggestionOrchestrator::new(backend.clone());

        orchestrator.request(&[]).await.unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.snapshot().await.state, FetchState::Idle);
    }

    #[tokio::test]
    async fn test_prompt_uses_only_last_three_messages() {
        let backend = Arc::new(RecordingBackend::returning(Ok(sample_suggestions())));
        let orchestrator = SuggestionOrchestrator::new(backend.clone());

        let messages = vec![
            message("m1", "first message", SenderRole::Incoming),
            message("m2", "second message", SenderRole::Outgoing),
            message("m3", "third message", SenderRole::Incoming),
            message("m4", "fourth message", SenderRole::Outgoing),
            message("m5", "fifth message", SenderRole::Incoming),
        ];
        orchestrator.request(&messages).await.unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(!prompts[0].contains("first message"));
        assert!(!prompts[0].contains("second message"));
        assert!(prompts[0].contains("Them: third message"));
        assert!(prompts[0].contains("Me: fourth message"));
        assert!(prompts[0].contains("Them: fifth message"));
    }

    #[test]
    fn test_prompt_preserves_chronological_order() {
        let messages = vec![
            message("m1", "alpha", SenderRole::Incoming),
            message("m2", "beta", SenderRole::Outgoing),
        ];
        let prompt = build_prompt(&messages);
        let alpha = prompt.find("alpha").unwrap();
        let beta = prompt.find("beta").unwrap();
        assert!(alpha < beta);
    }

    #[tokio::test]
    async fn test_result_replaces_previous_set() {
        let backend = Arc::new(RecordingBackend::returning(Ok(sample_suggestions())));
        let orchestrator = SuggestionOrchestrator::new(backend.clone());
        let messages = vec![message("m1", "hello", SenderRole::Incoming)];

        orchestrator.request(&messages).await.unwrap();
        assert_eq!(orchestrator.snapshot().await.suggestions.len(), 1);

        *backend.result.lock().unwrap() = Ok(vec![
            Suggestion {
                tone: SuggestionTone::Professional,
                text: "Certainly.".to_string(),
            },
            Suggestion {
                tone: SuggestionTone::Casual,
                text: "yep".to_string(),
            },
        ]);
        orchestrator.request(&messages).await.unwrap();

        let snapshot = orchestrator.snapshot().await;
        assert_eq!(snapshot.suggestions.len(), 2);
        assert_eq!(snapshot.state, FetchState::Ready);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty_set() {
        let backend = Arc::new(RecordingBackend::returning(Err(
            OrchestratedError::Generator("model unavailable".to_string()),
        )));
        let orchestrator = SuggestionOrchestrator::new(backend);
        let messages = vec![message("m1", "hello", SenderRole::Incoming)];

        orchestrator.request(&messages).await.unwrap();

        let snapshot = orchestrator.snapshot().await;
        assert!(snapshot.suggestions.is_empty());
        assert!(matches!(snapshot.state, FetchState::Failed(_)));
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_in_flight_one() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let entered = Arc::new(tokio::sync::Notify::new());
        let slow_backend = Arc::new(RecordingBackend {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            result: Mutex::new(Ok(vec![Suggestion {
                tone: SuggestionTone::Casual,
                text: "stale".to_string(),
            }])),
            gate: Some(gate.clone()),
            entered: Some(entered.clone()),
        });

        let orchestrator = Arc::new(SuggestionOrchestrator::new(slow_backend.clone()));
        let messages = vec![message("m1", "hello", SenderRole::Incoming)];

        let first = {
            let orchestrator = orchestrator.clone();
            let messages = messages.clone();
            tokio::spawn(async move { orchestrator.request(&messages).await })
        };
        entered.notified().await;

        // Second request lands while the first is blocked in the backend
        *slow_backend.result.lock().unwrap() = Ok(vec![Suggestion {
            tone: SuggestionTone::Friendly,
            text: "fresh".to_string(),
        }]);
        let second = {
            let orchestrator = orchestrator.clone();
            let messages = messages.clone();
            tokio::spawn(async move { orchestrator.request(&messages).await })
        };
        entered.notified().await;

        // Release both blocked generate() calls; the first result must be
        // discarded as superseded
        gate.notify_waiters();
        second.await.unwrap().unwrap();
        first.await.unwrap().unwrap();

        let snapshot = orchestrator.snapshot().await;
        assert_eq!(snapshot.suggestions.len(), 1);
        assert_eq!(snapshot.suggestions[0].text, "fresh");
    }

    #[tokio::test]
    async fn test_clear_invalidates_in_flight_request() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let entered = Arc::new(tokio::sync::Notify::new());
        let slow_backend = Arc::new(RecordingBackend {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            result: Mutex::new(Ok(sample_suggestions())),
            gate: Some(gate.clone()),
            entered: Some(entered.clone()),
        });

        let orchestrator = Arc::new(SuggestionOrchestrator::new(slow_backend));
        let messages = vec![message("m1", "hello", SenderRole::Incoming)];

        let pending = {
            let orchestrator = orchestrator.clone();
            let messages = messages.clone();
            tokio::spawn(async move { orchestrator.request(&messages).await })
        };
        entered.notified().await;

        orchestrator.clear().await;
        gate.notify_waiters();
        pending.await.unwrap().unwrap();

        let snapshot = orchestrator.snapshot().await;
        assert!(snapshot.suggestions.is_empty());
        assert_eq!(snapshot.state, FetchState::Idle);
    }
}
