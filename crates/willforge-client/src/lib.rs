//! Remote collaborators of the will wizard
//!
//! Narrow async contracts for each external service (document store,
//! scenario analysis, conversation, verification, payments, rendering,
//! auth tokens), an HTTP implementation over one API gateway, and the
//! bounded payment-status poller.
//!
//! Wire compatibility is owned by the backend; the only structural
//! contracts honoured here are the streaming event shapes consumed by
//! `willforge-stream`.

#![warn(unreachable_pub)]

pub mod error;
pub mod http;
pub mod payment;
pub mod services;

pub use error::ApiError;
pub use http::HttpApi;
pub use payment::{poll_payment, PaymentOutcome, MAX_ATTEMPTS, POLL_INTERVAL};
pub use services::{
    AcknowledgeResponse, ByteStream, ConversationRequest, ConversationService, DocumentRenderer,
    DocumentStore, DraftSummary, PaymentGateway, PaymentSession, PaymentState, PaymentStatus,
    ScenarioAnalysis, TokenProvider, VerificationService,
};
