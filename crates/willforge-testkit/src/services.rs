//! In-memory and scripted service implementations
//!
//! Deterministic fakes for every wizard collaborator. Each records the
//! calls it receives and can be scripted to fail, so tests can assert
//! on side effects without a network.

use crate::sse::{byte_stream, chunked_byte_stream};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use willforge_client::{
    AcknowledgeResponse, ApiError, ByteStream, ConversationRequest, ConversationService,
    DocumentStore, DraftSummary, PaymentGateway, PaymentSession, PaymentState, PaymentStatus,
    ScenarioAnalysis, VerificationService,
};
use willforge_draft::{DraftId, DraftKind, DraftState, Message};
use willforge_section::{Scenario, Section};

fn server_error(body: &str) -> ApiError {
    ApiError::Server {
        status: 500,
        body: body.to_string(),
    }
}

#[derive(Default)]
struct StoreInner {
    drafts: HashMap<DraftId, DraftState>,
    fail_creates: u32,
    fail_completes: u32,
    fail_updates: u32,
    extraction_requests: Vec<(DraftId, Section)>,
    completes: Vec<(DraftId, Section)>,
    pointer_updates: Vec<(DraftId, Section)>,
    scenario_sets: Vec<(DraftId, BTreeSet<Scenario>)>,
}

/// In-memory [`DocumentStore`] with call recording and scriptable
/// failures
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
    create_calls: AtomicU32,
    /// Slept before taking the lock, to widen concurrent-create races
    create_delay: Option<Duration>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    /// Fail the next `n` create calls with a server error
    pub fn fail_creates(&self, n: u32) {
        self.inner.lock().unwrap().fail_creates = n;
    }

    /// Fail the next `n` mark-complete calls with a server error
    pub fn fail_completes(&self, n: u32) {
        self.inner.lock().unwrap().fail_completes = n;
    }

    /// Fail the next `n` section-payload updates with a server error
    pub fn fail_updates(&self, n: u32) {
        self.inner.lock().unwrap().fail_updates = n;
    }

    /// Insert a draft directly, assigning an id if it has none
    pub fn seed(&self, mut draft: DraftState) -> DraftId {
        let id = draft.id().unwrap_or_else(|| {
            let id = DraftId::new();
            draft.assign_id(id);
            id
        });
        self.inner.lock().unwrap().drafts.insert(id, draft);
        id
    }

    #[must_use]
    pub fn draft(&self, id: DraftId) -> Option<DraftState> {
        self.inner.lock().unwrap().drafts.get(&id).cloned()
    }

    #[must_use]
    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn extraction_requests(&self) -> Vec<(DraftId, Section)> {
        self.inner.lock().unwrap().extraction_requests.clone()
    }

    #[must_use]
    pub fn completes(&self) -> Vec<(DraftId, Section)> {
        self.inner.lock().unwrap().completes.clone()
    }

    #[must_use]
    pub fn pointer_updates(&self) -> Vec<(DraftId, Section)> {
        self.inner.lock().unwrap().pointer_updates.clone()
    }

    #[must_use]
    pub fn scenario_sets(&self) -> Vec<(DraftId, BTreeSet<Scenario>)> {
        self.inner.lock().unwrap().scenario_sets.clone()
    }

    fn with_draft<T>(
        &self,
        id: DraftId,
        f: impl FnOnce(&mut DraftState, &mut StoreInner) -> T,
    ) -> Result<T, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let inner = &mut *inner;
        match inner.drafts.remove(&id) {
            Some(mut draft) => {
                let out = f(&mut draft, inner);
                inner.drafts.insert(id, draft);
                Ok(out)
            }
            None => Err(ApiError::Server {
                status: 404,
                body: format!("no draft {id}"),
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_draft(&self, kind: DraftKind) -> Result<DraftId, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.fail_creates > 0 {
            inner.fail_creates -= 1;
            return Err(server_error("create failed"));
        }

        let id = DraftId::new();
        let mut draft = DraftState::new(kind);
        draft.assign_id(id);
        inner.drafts.insert(id, draft);
        Ok(id)
    }

    async fn fetch_draft(&self, id: DraftId) -> Result<DraftState, ApiError> {
        self.draft(id).ok_or(ApiError::Server {
            status: 404,
            body: format!("no draft {id}"),
        })
    }

    async fn list_drafts(&self) -> Result<Vec<DraftSummary>, ApiError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .drafts
            .values()
            .map(|d| DraftSummary {
                id: d.id().unwrap_or_default(),
                kind: d.kind(),
                status: if d.is_paid() { "paid" } else { "draft" }.to_string(),
                updated_at: d.created_at().to_rfc3339(),
            })
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn update_section(
        &self,
        id: DraftId,
        section: Section,
        payload: Value,
    ) -> Result<(), ApiError> {
        self.with_draft(id, |draft, inner| {
            if inner.fail_updates > 0 {
                inner.fail_updates -= 1;
                return Err(server_error("update failed"));
            }
            draft.set_payload(section, payload);
            Ok(())
        })?
    }

    async fn mark_section_complete(&self, id: DraftId, section: Section) -> Result<(), ApiError> {
        self.with_draft(id, |draft, inner| {
            if inner.fail_completes > 0 {
                inner.fail_completes -= 1;
                return Err(server_error("complete failed"));
            }
            inner.completes.push((id, section));
            draft.mark_complete(section);
            Ok(())
        })?
    }

    async fn set_current_section(&self, id: DraftId, section: Section) -> Result<(), ApiError> {
        self.with_draft(id, |draft, inner| {
            inner.pointer_updates.push((id, section));
            draft.set_current_section(section);
        })
    }

    async fn set_scenarios(
        &self,
        id: DraftId,
        scenarios: BTreeSet<Scenario>,
    ) -> Result<(), ApiError> {
        self.with_draft(id, |draft, inner| {
            inner.scenario_sets.push((id, scenarios.clone()));
            draft.add_scenarios(scenarios);
        })
    }

    async fn acknowledge_warnings(
        &self,
        id: DraftId,
        codes: Vec<String>,
    ) -> Result<AcknowledgeResponse, ApiError> {
        self.with_draft(id, |draft, _| {
            draft.acknowledge_warnings(codes);
            let acked = draft.acknowledged_warnings().clone();
            let can_proceed = draft
                .verification()
                .map_or(true, |report| report.can_proceed(&acked));
            AcknowledgeResponse {
                acknowledged: acked.into_iter().collect(),
                can_proceed,
            }
        })
    }

    async fn request_extraction(&self, id: DraftId, section: Section) -> Result<(), ApiError> {
        self.inner
            .lock()
            .unwrap()
            .extraction_requests
            .push((id, section));
        Ok(())
    }
}

/// Scripted [`ScenarioAnalysis`]: a queue of outcomes, empty set once
/// the queue runs dry
#[derive(Default)]
pub struct ScriptedScenarios {
    outcomes: Mutex<VecDeque<Result<BTreeSet<Scenario>, String>>>,
    calls: AtomicU32,
}

impl ScriptedScenarios {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_detection<I: IntoIterator<Item = Scenario>>(&self, scenarios: I) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(scenarios.into_iter().collect()));
    }

    pub fn push_failure(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScenarioAnalysis for ScriptedScenarios {
    async fn detect(&self, _id: DraftId) -> Result<BTreeSet<Scenario>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(scenarios)) => Ok(scenarios),
            Some(Err(message)) => Err(server_error(&message)),
            None => Ok(BTreeSet::new()),
        }
    }
}

/// Scripted [`ConversationService`]: queued SSE reply bodies plus a
/// per-section history map
#[derive(Default)]
pub struct ScriptedConversation {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ConversationRequest>>,
    history: Mutex<HashMap<(DraftId, Section), Vec<Message>>>,
    /// When set, reply bodies are re-chunked into pieces of this size
    chunk_size: Option<usize>,
}

impl ScriptedConversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Queue one raw SSE body as the next streamed reply
    pub fn push_reply(&self, body: impl Into<String>) {
        self.replies.lock().unwrap().push_back(body.into());
    }

    pub fn set_history(&self, id: DraftId, section: Section, messages: Vec<Message>) {
        self.history.lock().unwrap().insert((id, section), messages);
    }

    /// Requests received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<ConversationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationService for ScriptedConversation {
    async fn stream_reply(&self, request: ConversationRequest) -> Result<ByteStream, ApiError> {
        self.requests.lock().unwrap().push(request);
        let body = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| server_error("no scripted reply"))?;
        Ok(match self.chunk_size {
            Some(size) => chunked_byte_stream(body, size),
            None => byte_stream(vec![body]),
        })
    }

    async fn history(&self, id: DraftId, section: Section) -> Result<Vec<Message>, ApiError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(&(id, section))
            .cloned()
            .unwrap_or_default())
    }
}

/// Scripted [`VerificationService`]: queued SSE bodies
#[derive(Default)]
pub struct ScriptedVerification {
    bodies: Mutex<VecDeque<String>>,
    calls: AtomicU32,
}

impl ScriptedVerification {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_body(&self, body: impl Into<String>) {
        self.bodies.lock().unwrap().push_back(body.into());
    }

    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationService for ScriptedVerification {
    async fn stream_verification(&self, _id: DraftId) -> Result<ByteStream, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| server_error("no scripted verification"))?;
        Ok(byte_stream(vec![body]))
    }
}

/// Scripted [`PaymentGateway`]: one session plus a status queue whose
/// last entry repeats
pub struct ScriptedGateway {
    payment_id: String,
    statuses: Mutex<VecDeque<PaymentStatus>>,
}

impl ScriptedGateway {
    #[must_use]
    pub fn new(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
            statuses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_status(&self, state: PaymentState, token: Option<&str>) {
        self.statuses.lock().unwrap().push_back(PaymentStatus {
            status: state,
            download_token: token.map(str::to_string),
        });
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initiate(&self, id: DraftId) -> Result<PaymentSession, ApiError> {
        Ok(PaymentSession {
            payment_id: self.payment_id.clone(),
            redirect_url: format!("https://pay.example/checkout/{id}"),
        })
    }

    async fn status(&self, _payment_id: &str) -> Result<PaymentStatus, ApiError> {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            Ok(statuses.pop_front().unwrap_or_else(|| PaymentStatus {
                status: PaymentState::Pending,
                download_token: None,
            }))
        } else {
            Ok(statuses.front().cloned().unwrap_or(PaymentStatus {
                status: PaymentState::Pending,
                download_token: None,
            }))
        }
    }
}
