//! Wizard navigation
//!
//! Owns the draft aggregate and moves the user through the ordered
//! section list. Local state is authoritative; remote persistence of
//! completion flags and the current-section pointer is best-effort
//! and observable through [`SyncEvent`]s. The backing record is
//! created lazily, at most once, on the first navigation that needs
//! it.

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::scenario::ScenarioGate;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use willforge_client::{
    ApiError, ConversationRequest, ConversationService, DocumentStore, ScenarioAnalysis,
};
use willforge_draft::{DraftId, DraftKind, DraftState, Message, SectionPayload};
use willforge_section::{Progress, Scenario, Section, BASE};
use willforge_stream::{ConversationChannel, TurnOutcome};

/// Which background persistence call a [`SyncEvent`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Structured-data extraction ping for a conversational section
    Extraction,
    /// Remote mirror of a local completion flag
    SectionComplete,
    /// Current-section pointer persistence
    CurrentSection,
    /// Post-creation push of locally-buffered payloads
    BufferedPayload,
}

/// Outcome of one best-effort background sync
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub kind: SyncKind,
    pub draft: DraftId,
    pub section: Section,
    /// `None` on success, the error text otherwise
    pub error: Option<String>,
}

impl SyncEvent {
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// What the wizard should currently present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardView {
    /// A section editor
    Section(Section),
    /// The scenario-detection interstitial
    ScenarioGate,
}

/// At-most-once lazy creation of the backing draft record.
///
/// Shareable across concurrent callers; the slot lock guarantees a
/// single create call even when two navigations race.
pub struct DraftCreator {
    store: Arc<dyn DocumentStore>,
    slot: tokio::sync::Mutex<Option<DraftId>>,
}

impl DraftCreator {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            slot: tokio::sync::Mutex::new(None),
        }
    }

    /// Return the existing id or create the record exactly once.
    ///
    /// # Errors
    /// Creation failure leaves the slot empty; the next call retries.
    pub async fn ensure(&self, kind: DraftKind) -> Result<DraftId, ApiError> {
        let mut slot = self.slot.lock().await;
        if let Some(id) = *slot {
            return Ok(id);
        }
        let id = self.store.create_draft(kind).await?;
        info!(%id, ?kind, "draft record created");
        *slot = Some(id);
        Ok(id)
    }
}

/// The wizard's single logical mutator
pub struct WizardNavigator {
    config: WizardConfig,
    store: Arc<dyn DocumentStore>,
    analysis: Arc<dyn ScenarioAnalysis>,
    conversation: Arc<dyn ConversationService>,
    creator: DraftCreator,
    draft: DraftState,
    gate: ScenarioGate,
    /// One-shot: set once the post-creation payload push succeeds
    buffered_pushed: bool,
    sync_tx: UnboundedSender<SyncEvent>,
    sync_rx: Option<UnboundedReceiver<SyncEvent>>,
}

impl WizardNavigator {
    #[must_use]
    pub fn new(
        config: WizardConfig,
        store: Arc<dyn DocumentStore>,
        analysis: Arc<dyn ScenarioAnalysis>,
        conversation: Arc<dyn ConversationService>,
    ) -> Self {
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        Self {
            config,
            creator: DraftCreator::new(Arc::clone(&store)),
            store,
            analysis,
            conversation,
            draft: DraftState::default(),
            gate: ScenarioGate::new(),
            buffered_pushed: false,
            sync_tx,
            sync_rx: Some(sync_rx),
        }
    }

    /// Resume from a previously-fetched draft snapshot
    #[must_use]
    pub fn with_draft(mut self, draft: DraftState) -> Self {
        self.buffered_pushed = draft.id().is_some();
        self.draft = draft;
        self
    }

    #[inline]
    #[must_use]
    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    #[inline]
    #[must_use]
    pub fn draft_mut(&mut self) -> &mut DraftState {
        &mut self.draft
    }

    #[inline]
    #[must_use]
    pub fn gate(&self) -> &ScenarioGate {
        &self.gate
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.draft.progress()
    }

    /// Receiver for background sync outcomes. Yields `Some` once;
    /// the navigator keeps the sending side either way.
    pub fn take_sync_events(&mut self) -> Option<UnboundedReceiver<SyncEvent>> {
        self.sync_rx.take()
    }

    /// Lazily create the backing record, then push any payloads the
    /// user filled in before it existed.
    ///
    /// Creation happens at most once; a failed buffered push is
    /// logged and retried on the next navigation attempt.
    ///
    /// # Errors
    /// Creation failure only; buffered-push failures are best-effort.
    pub async fn ensure_draft(&mut self) -> Result<DraftId, WizardError> {
        let id = match self.draft.id() {
            Some(id) => id,
            None => {
                let id = self.creator.ensure(self.draft.kind()).await?;
                self.draft.assign_id(id);
                id
            }
        };

        if !self.buffered_pushed {
            self.push_buffered(id).await;
        }
        Ok(id)
    }

    async fn push_buffered(&mut self, id: DraftId) {
        let pending: Vec<(Section, serde_json::Value)> = self
            .draft
            .payloads()
            .iter()
            .map(|(s, v)| (*s, v.clone()))
            .collect();

        let mut all_ok = true;
        for (section, payload) in pending {
            let result = self.store.update_section(id, section, payload).await;
            if let Err(e) = &result {
                warn!(%id, %section, error = %e, "buffered payload push failed");
                all_ok = false;
            }
            let _ = self.sync_tx.send(SyncEvent {
                kind: SyncKind::BufferedPayload,
                draft: id,
                section,
                error: result.err().map(|e| e.to_string()),
            });
        }
        self.buffered_pushed = all_ok;
    }

    /// Validate and store one section's payload; persisted remotely
    /// when the backing record exists, buffered locally otherwise.
    ///
    /// # Errors
    /// Edge validation failure, or the remote update when one is made.
    pub async fn save_section(
        &mut self,
        section: Section,
        payload: serde_json::Value,
    ) -> Result<(), WizardError> {
        SectionPayload::from_value(section, payload.clone())?;
        self.draft.set_payload(section, payload.clone());

        if let Some(id) = self.draft.id() {
            self.store.update_section(id, section, payload).await?;
        } else {
            debug!(%section, "payload buffered until draft creation");
        }
        Ok(())
    }

    /// Complete the current section and move to the next entry of the
    /// ordered list.
    ///
    /// The local completion flag is authoritative; the remote mirror,
    /// the extraction ping for conversational sections, and the
    /// pointer persistence are all fire-and-forget.
    ///
    /// # Errors
    /// Lazy draft creation only.
    pub async fn advance(&mut self) -> Result<Section, WizardError> {
        let id = self.ensure_draft().await?;
        let current = self.draft.current_section();

        if current.is_conversational() {
            let store = Arc::clone(&self.store);
            self.spawn_sync(SyncKind::Extraction, id, current, async move {
                store.request_extraction(id, current).await
            });
        }

        if current != Section::Review {
            self.draft.mark_complete(current);
            let store = Arc::clone(&self.store);
            self.spawn_sync(SyncKind::SectionComplete, id, current, async move {
                store.mark_section_complete(id, current).await
            });
        }

        let next = self
            .draft
            .progress()
            .next_after(current)
            .unwrap_or(current);
        if next != current {
            self.set_current(id, next);
        }
        info!(%id, from = %current, to = %next, "advanced");
        Ok(next)
    }

    /// Navigate directly to `section`. Completion flags are untouched;
    /// the pointer is persisted best-effort when a record exists.
    pub fn jump_to(&mut self, section: Section) {
        match self.draft.id() {
            Some(id) => self.set_current(id, section),
            None => self.draft.set_current_section(section),
        }
    }

    fn set_current(&mut self, id: DraftId, section: Section) {
        self.draft.set_current_section(section);
        let store = Arc::clone(&self.store);
        self.spawn_sync(SyncKind::CurrentSection, id, section, async move {
            store.set_current_section(id, section).await
        });
    }

    /// What to present right now. Once every base section is complete
    /// and detection has not succeeded this session, the scenario
    /// interstitial takes over regardless of the nominal current
    /// section.
    #[must_use]
    pub fn current_view(&self) -> WizardView {
        let base_done = BASE.iter().all(|&s| self.draft.is_complete(s));
        if base_done && !self.gate.has_run() {
            return WizardView::ScenarioGate;
        }
        WizardView::Section(self.draft.current_section())
    }

    /// Run scenario detection for the interstitial.
    ///
    /// # Errors
    /// `NoDraft` before creation, or a retryable detection failure.
    pub async fn detect_scenarios(&mut self) -> Result<BTreeSet<Scenario>, WizardError> {
        self.ensure_draft().await?;
        let detected = self.gate.detect(self.analysis.as_ref(), &self.draft).await?;
        Ok(detected.clone())
    }

    /// Adjust the gate's selection before confirming
    pub fn scenario_opt_in(&mut self, scenario: Scenario) {
        self.gate.opt_in(scenario);
    }

    pub fn scenario_opt_out(&mut self, scenario: Scenario) {
        self.gate.opt_out(scenario);
    }

    /// Confirm the scenario selection and route to the first optional
    /// section (or review).
    ///
    /// # Errors
    /// `NoDraft`, or persistence of the combined scenario set.
    pub async fn confirm_scenarios(&mut self) -> Result<Section, WizardError> {
        let id = self.ensure_draft().await?;
        let next = self.gate.confirm(self.store.as_ref(), &mut self.draft).await?;
        self.set_current(id, next);
        Ok(next)
    }

    /// Open a conversation channel for the current section, preloaded
    /// with stored history.
    ///
    /// # Errors
    /// Lazy creation or the history fetch.
    pub async fn open_conversation(&mut self) -> Result<ConversationChannel, WizardError> {
        let id = self.ensure_draft().await?;
        let section = self.draft.current_section();
        let history = self.conversation.history(id, section).await?;

        let mut channel = ConversationChannel::new();
        channel.load_history(history);
        Ok(channel)
    }

    /// Send one user turn on `channel` and stream the reply into its
    /// transcript. The request carries a bounded recent-message
    /// window plus the structured draft context.
    ///
    /// # Errors
    /// Lazy creation, the stream open, or a channel/stream failure.
    pub async fn converse(
        &mut self,
        channel: &mut ConversationChannel,
        user_message: &str,
    ) -> Result<TurnOutcome, WizardError> {
        let id = self.ensure_draft().await?;
        let section = self.draft.current_section();

        let window = self.config.history_limit.saturating_sub(1);
        let mut messages: Vec<Message> = channel.transcript().recent(window).to_vec();
        messages.push(Message::user(user_message));

        let context = serde_json::to_value(self.draft.payloads()).map_err(ApiError::from)?;
        let request = ConversationRequest {
            draft_id: id,
            section,
            messages,
            context,
        };

        let stream = self.conversation.stream_reply(request).await?;
        let outcome = channel.send(user_message, stream).await?;
        Ok(outcome)
    }

    fn spawn_sync<F>(&self, kind: SyncKind, draft: DraftId, section: Section, fut: F)
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let tx = self.sync_tx.clone();
        tokio::spawn(async move {
            let result = fut.await;
            if let Err(e) = &result {
                warn!(%draft, ?kind, %section, error = %e, "background sync failed");
            }
            let _ = tx.send(SyncEvent {
                kind,
                draft,
                section,
                error: result.err().map(|e| e.to_string()),
            });
        });
    }
}

impl std::fmt::Debug for WizardNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardNavigator")
            .field("draft", &self.draft.id())
            .field("current", &self.draft.current_section())
            .field("gate", &self.gate.state())
            .finish_non_exhaustive()
    }
}
