//! Service contracts for the wizard's remote collaborators
//!
//! Each external system is an opaque service behind a narrow async
//! trait; the core composes against these, the HTTP client implements
//! them, and the testkit fakes them.

use crate::error::ApiError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::pin::Pin;
use willforge_draft::{DraftId, DraftKind, DraftState, Message};
use willforge_section::{Scenario, Section};

/// Chunked response body from a server-push endpoint
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// Summary row for the user's draft dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSummary {
    pub id: DraftId,
    pub kind: DraftKind,
    /// Backend lifecycle status, e.g. "draft" or "paid"
    pub status: String,
    pub updated_at: String,
}

/// Backend response to a warning-acknowledgment call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgeResponse {
    /// Full acknowledged set after the merge
    pub acknowledged: Vec<String>,
    pub can_proceed: bool,
}

/// Document store: create/read/update the draft record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the backing record for a local draft
    async fn create_draft(&self, kind: DraftKind) -> Result<DraftId, ApiError>;

    /// Full draft snapshot
    async fn fetch_draft(&self, id: DraftId) -> Result<DraftState, ApiError>;

    /// The user's drafts, newest first
    async fn list_drafts(&self) -> Result<Vec<DraftSummary>, ApiError>;

    /// Replace one section's payload record
    async fn update_section(
        &self,
        id: DraftId,
        section: Section,
        payload: Value,
    ) -> Result<(), ApiError>;

    /// Mark one section complete
    async fn mark_section_complete(&self, id: DraftId, section: Section) -> Result<(), ApiError>;

    /// Persist the current-section pointer for session resume
    async fn set_current_section(&self, id: DraftId, section: Section) -> Result<(), ApiError>;

    /// Persist the combined scenario set
    async fn set_scenarios(
        &self,
        id: DraftId,
        scenarios: BTreeSet<Scenario>,
    ) -> Result<(), ApiError>;

    /// Merge acknowledged warning codes (additive, idempotent)
    async fn acknowledge_warnings(
        &self,
        id: DraftId,
        codes: Vec<String>,
    ) -> Result<AcknowledgeResponse, ApiError>;

    /// Kick off a best-effort structured-data extraction pass for a
    /// conversational section
    async fn request_extraction(&self, id: DraftId, section: Section) -> Result<(), ApiError>;
}

/// Scenario analysis: detect applicable optional sections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScenarioAnalysis: Send + Sync {
    async fn detect(&self, id: DraftId) -> Result<BTreeSet<Scenario>, ApiError>;
}

/// One conversation turn's request payload.
///
/// Field names follow the backend's wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationRequest {
    #[serde(rename = "will_id")]
    pub draft_id: DraftId,
    #[serde(rename = "current_section")]
    pub section: Section,
    /// Bounded recent history, oldest first
    pub messages: Vec<Message>,
    /// Structured will context for the model
    #[serde(rename = "will_context")]
    pub context: Value,
}

/// Conversation/completion service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Open the streamed reply for one turn
    async fn stream_reply(&self, request: ConversationRequest) -> Result<ByteStream, ApiError>;

    /// Stored history for one (draft, section) pair; empty on first
    /// visit
    async fn history(&self, id: DraftId, section: Section) -> Result<Vec<Message>, ApiError>;
}

/// Verification service: structured compliance check as a stream
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn stream_verification(&self, id: DraftId) -> Result<ByteStream, ApiError>;
}

/// Lifecycle state reported by the payment gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Failed,
}

/// Gateway response when initiating a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub payment_id: String,
    /// Where to send the user to complete payment
    pub redirect_url: String,
}

/// Gateway status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub status: PaymentState,
    /// Present once the payment completed
    #[serde(default)]
    pub download_token: Option<String>,
}

/// Payment gateway
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, id: DraftId) -> Result<PaymentSession, ApiError>;
    async fn status(&self, payment_id: &str) -> Result<PaymentStatus, ApiError>;
}

/// Document rendering service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Watermarked preview PDF
    async fn preview(&self, id: DraftId) -> Result<Bytes, ApiError>;

    /// Final PDF by paid download token
    async fn download(&self, token: &str) -> Result<Bytes, ApiError>;
}

/// Bearer-token source backing authenticated calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` for anonymous endpoints
    async fn token(&self) -> Result<Option<String>, ApiError>;
}
