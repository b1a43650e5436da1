//! Inbox sync engine
//!
//! Drives the refresh cycle against the messaging gateway and owns the
//! shared inbox state. Collections are replaced wholesale on every
//! successful poll; a failed poll keeps the previous data (stale beats
//! empty) and records the failure on the collection's fetch state.
//!
//! Two independent timelines feed the state: the periodic view poll and the
//! on-demand message load triggered by conversation selection. Both carry
//! epoch counters so a result that arrives after the view or selection has
//! moved on is discarded instead of overwriting fresher data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::adapters::unipile::payloads::HostedLinkRequest;
use crate::adapters::{MessagingGateway, SuggestionBackend};
use crate::mapper;
use crate::suggest::{SuggestionOrchestrator, SuggestionSnapshot};
use crate::types::error::{OrchestratedError, Result};
use crate::types::{ChatMessage, ConnectedAccount, Platform, SenderRole};

use super::poller::{PollConfig, PollSignal, ViewPoller};
use super::state::{ActiveView, FetchState, InboxState};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Periodic refresh behavior
    pub poll: PollConfig,
    /// Origin the hosted connection flow redirects back to
    pub redirect_origin: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            redirect_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Event emitted by the engine whenever observable state changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SyncEvent {
    ConversationsUpdated { count: usize },
    EventsUpdated { count: usize },
    MessagesUpdated { conversation_id: String, count: usize },
    SuggestionsUpdated { count: usize },
    SelectionChanged { conversation_id: Option<String> },
    MessageSent { conversation_id: String },
    RefreshFailed { view: ActiveView, error: String },
}

/// The inbox sync engine
pub struct InboxEngine {
    gateway: Arc<dyn MessagingGateway>,
    suggestions: SuggestionOrchestrator,
    state: RwLock<InboxState>,
    poller: Mutex<Option<Arc<ViewPoller>>>,
    view_epoch: AtomicU64,
    selection_epoch: AtomicU64,
    config: EngineConfig,
    events_tx: flume::Sender<SyncEvent>,
}

impl InboxEngine {
    /// Create an engine and the receiving end of its event channel
    pub fn new(
        gateway: Arc<dyn MessagingGateway>,
        generator: Arc<dyn SuggestionBackend>,
        config: EngineConfig,
    ) -> (Arc<Self>, flume::Receiver<SyncEvent>) {
        let (tx, rx) = flume::unbounded();

        let engine = Arc::new(Self {
            gateway,
            suggestions: SuggestionOrchestrator::new(generator),
            state: RwLock::new(InboxState::new()),
            poller: Mutex::new(None),
            view_epoch: AtomicU64::new(0),
            selection_epoch: AtomicU64::new(0),
            config,
            events_tx: tx,
        });

        (engine, rx)
    }

    /// Get a snapshot of the current inbox state
    pub async fn snapshot(&self) -> InboxState {
        self.state.read().await.clone()
    }

    /// Get the current suggestion set
    pub async fn suggestions(&self) -> SuggestionSnapshot {
        self.suggestions.snapshot().await
    }

    fn emit_event(&self, event: SyncEvent) {
        if let Err(e) = self.events_tx.send(event) {
            warn!("Failed to emit sync event: {}", e);
        }
    }

    /// Activate a view: cancel the previous view's poll loop and start a new
    /// one for `view`
    ///
    /// The new poller ticks immediately, so activation refreshes right away
    /// and then every poll interval until the view changes or `shutdown` is
    /// called.
    pub async fn activate_view(self: Arc<Self>, view: ActiveView) {
        let epoch = self.view_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        // Synchronously cancel the previous view's poller before the new one
        // exists, so two timers never overlap
        if let Some(old) = self.poller.lock().await.take() {
            old.stop();
        }

        {
            let mut state = self.state.write().await;
            state.active_view = view;
        }

        info!("Activating view: {:?}", view);

        let (poller, signal_rx) = ViewPoller::new(view, self.config.poll.clone());
        let poller = Arc::new(poller);
        poller.mark_running();

        {
            let mut slot = self.poller.lock().await;
            *slot = Some(poller.clone());
        }

        tokio::spawn({
            let poller = poller.clone();
            async move { poller.run().await }
        });

        // Pump ticks into refreshes until the poller stops or the view moves on
        let engine = self.clone();
        tokio::spawn(async move {
            while let Ok(signal) = signal_rx.recv_async().await {
                match signal {
                    PollSignal::Tick => {
                        if engine.view_epoch.load(Ordering::SeqCst) != epoch {
                            debug!("View changed, dropping stale poll tick");
                            break;
                        }
                        if let Err(e) = engine.refresh(view).await {
                            warn!("Refresh failed for view {:?}: {}", view, e);
                        }
                    }
                    PollSignal::Shutdown => break,
                }
            }
            debug!("Refresh pump stopped for view: {:?}", view);
        });
    }

    /// Stop polling and invalidate any in-flight work
    pub async fn shutdown(&self) {
        info!("Shutting down inbox engine");
        self.view_epoch.fetch_add(1, Ordering::SeqCst);
        self.selection_epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(poller) = self.poller.lock().await.take() {
            poller.stop();
        }
    }

    /// Refresh the collection backing `view` with one gateway call
    ///
    /// List failures never propagate: the previous collection is kept, the
    /// failure is recorded on the collection's fetch state, and `Ok(())` is
    /// returned.
    pub async fn refresh(&self, view: ActiveView) -> Result<()> {
        match view {
            ActiveView::Messages => self.refresh_conversations().await,
            ActiveView::Calendar => self.refresh_events().await,
        }
    }

    async fn refresh_conversations(&self) -> Result<()> {
        let epoch = self.view_epoch.load(Ordering::SeqCst);

        {
            let mut state = self.state.write().await;
            state.conversations_state = FetchState::Loading;
        }

        match self.gateway.list_chats().await {
            Ok(items) => {
                if self.view_epoch.load(Ordering::SeqCst) != epoch {
                    debug!("View changed during chat refresh, discarding result");
                    return Ok(());
                }

                let mapped = mapper::map_conversations(&items);
                let count = mapped.len();

                let (selection_cleared, auto_select) = {
                    let mut state = self.state.write().await;
                    let previous_selection = state.selected_conversation.clone();
                    state.conversations = mapped;
                    state.conversations_state = FetchState::Ready;

                    match previous_selection {
                        Some(id) if state.contains_conversation(&id) => (false, None),
                        Some(_) => {
                            // Selected thread vanished from the remote list
                            state.selected_conversation = None;
                            state.messages.clear();
                            state.messages_state = FetchState::Idle;
                            (true, None)
                        }
                        None => (false, state.conversations.first().map(|c| c.id.clone())),
                    }
                };

                self.emit_event(SyncEvent::ConversationsUpdated { count });

                if selection_cleared {
                    self.selection_epoch.fetch_add(1, Ordering::SeqCst);
                    self.suggestions.clear().await;
                    self.emit_event(SyncEvent::SelectionChanged {
                        conversation_id: None,
                    });
                }

                if let Some(id) = auto_select {
                    self.select_conversation(Some(id)).await?;
                }

                Ok(())
            }
            Err(e) => {
                warn!("Chat list refresh failed: {}", e);
                if self.view_epoch.load(Ordering::SeqCst) == epoch {
                    let mut state = self.state.write().await;
                    state.conversations_state = FetchState::Failed(e.to_string());
                }
                self.emit_event(SyncEvent::RefreshFailed {
                    view: ActiveView::Messages,
                    error: e.to_string(),
                });
                Ok(())
            }
        }
    }

    async fn refresh_events(&self) -> Result<()> {
        let epoch = self.view_epoch.load(Ordering::SeqCst);

        {
            let mut state = self.state.write().await;
            state.events_state = FetchState::Loading;
        }

        match self.gateway.list_events().await {
            Ok(items) => {
                if self.view_epoch.load(Ordering::SeqCst) != epoch {
                    debug!("View changed during event refresh, discarding result");
                    return Ok(());
                }

                let mapped = mapper::map_events(&items);
                let count = mapped.len();

                {
                    let mut state = self.state.write().await;
                    state.events = mapped;
                    state.events_state = FetchState::Ready;
                }

                self.emit_event(SyncEvent::EventsUpdated { count });
                Ok(())
            }
            Err(e) => {
                warn!("Event list refresh failed: {}", e);
                if self.view_epoch.load(Ordering::SeqCst) == epoch {
                    let mut state = self.state.write().await;
                    state.events_state = FetchState::Failed(e.to_string());
                }
                self.emit_event(SyncEvent::RefreshFailed {
                    view: ActiveView::Calendar,
                    error: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Change the selected conversation
    ///
    /// Clears the suggestion set, loads the new conversation's messages
    /// (oldest first), then requests fresh suggestions. If the selection
    /// changes again while the load is in flight, the late result is
    /// discarded: the displayed messages always belong to the most recent
    /// selection.
    pub async fn select_conversation(&self, id: Option<String>) -> Result<()> {
        let epoch = self.selection_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let active_view = {
            let mut state = self.state.write().await;
            state.selected_conversation = id.clone();
            if id.is_none() {
                state.messages.clear();
                state.messages_state = FetchState::Idle;
            }
            state.active_view
        };

        self.suggestions.clear().await;
        self.emit_event(SyncEvent::SelectionChanged {
            conversation_id: id.clone(),
        });

        let conversation_id = match id {
            Some(id) if active_view == ActiveView::Messages => id,
            _ => return Ok(()),
        };

        self.load_messages(&conversation_id, epoch).await
    }

    async fn load_messages(&self, conversation_id: &str, epoch: u64) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.messages_state = FetchState::Loading;
        }

        match self.gateway.list_messages(conversation_id).await {
            Ok(items) => {
                if self.selection_epoch.load(Ordering::SeqCst) != epoch {
                    debug!(
                        "Selection moved on, discarding messages for conversation {}",
                        conversation_id
                    );
                    return Ok(());
                }

                let mapped = mapper::map_messages(&items, conversation_id);
                let count = mapped.len();

                {
                    let mut state = self.state.write().await;
                    state.messages = mapped.clone();
                    state.messages_state = FetchState::Ready;
                }

                self.emit_event(SyncEvent::MessagesUpdated {
                    conversation_id: conversation_id.to_string(),
                    count,
                });

                // Fresh suggestions for the new thread; empty threads skip
                // the generator entirely
                self.suggestions.request(&mapped).await?;
                let suggestion_count = self.suggestions.snapshot().await.suggestions.len();
                self.emit_event(SyncEvent::SuggestionsUpdated {
                    count: suggestion_count,
                });

                Ok(())
            }
            Err(e) => {
                warn!(
                    "Message load failed for conversation {}: {}",
                    conversation_id, e
                );
                if self.selection_epoch.load(Ordering::SeqCst) == epoch {
                    let mut state = self.state.write().await;
                    state.messages_state = FetchState::Failed(e.to_string());
                }
                Ok(())
            }
        }
    }

    /// Send a message to the selected conversation
    ///
    /// Blank input or no selection is a no-op (`Ok(false)`): no network call,
    /// no state change. On a successful send an optimistic local entry is
    /// appended immediately; the next poll reconciles it with the gateway's
    /// copy. Send failures propagate so the caller can keep the typed text
    /// for retry.
    pub async fn send_message(&self, text: &str) -> Result<bool> {
        if text.trim().is_empty() {
            return Ok(false);
        }

        let conversation_id = {
            let state = self.state.read().await;
            match &state.selected_conversation {
                Some(id) => id.clone(),
                None => return Ok(false),
            }
        };

        self.gateway.send_message(&conversation_id, text).await?;

        let message = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            sender: SenderRole::Outgoing,
            body: text.to_string(),
            timestamp: "Just now".to_string(),
        };

        {
            let mut state = self.state.write().await;
            // The user may have switched threads while the send was in
            // flight; only append to the thread the message belongs to
            if state.selected_conversation.as_deref() == Some(conversation_id.as_str()) {
                state.messages.push(message);
            }
        }

        self.emit_event(SyncEvent::MessageSent { conversation_id });
        Ok(true)
    }

    /// Regenerate suggestions for the currently loaded messages
    pub async fn regenerate_suggestions(&self) -> Result<()> {
        let messages = {
            let state = self.state.read().await;
            state.messages.clone()
        };

        self.suggestions.request(&messages).await?;
        let count = self.suggestions.snapshot().await.suggestions.len();
        self.emit_event(SyncEvent::SuggestionsUpdated { count });
        Ok(())
    }

    /// List the accounts currently connected through the gateway
    ///
    /// A failed fetch degrades to an empty list, matching the other list
    /// operations.
    pub async fn connected_accounts(&self) -> Vec<ConnectedAccount> {
        match self.gateway.list_accounts().await {
            Ok(items) => mapper::map_accounts(&items),
            Err(e) => {
                warn!("Account list fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Create a hosted connection link for a platform
    ///
    /// Failures propagate; there is nothing to degrade to when the user is
    /// explicitly asking to connect an account.
    pub async fn create_connection_link(&self, platform: Platform) -> Result<String> {
        if platform == Platform::Unknown {
            return Err(OrchestratedError::InvalidInput(
                "cannot create a connection link for an unknown platform".to_string(),
            ));
        }

        let request = HostedLinkRequest::for_platform(platform, &self.config.redirect_origin);
        let url = self.gateway.create_hosted_link(&request).await?;
        info!("Created hosted connection link for {}", platform);
        Ok(url)
    }
}
