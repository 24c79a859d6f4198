//! Testing utilities for the Willforge workspace
//!
//! In-memory service implementations, draft fixtures, and scripted
//! SSE byte streams shared by unit and integration tests.

#![allow(missing_docs)]

pub mod fixtures;
pub mod services;
pub mod sse;

pub use fixtures::{base_complete_draft, personal_payload, warning_report};
pub use services::{
    InMemoryStore, ScriptedConversation, ScriptedGateway, ScriptedScenarios,
    ScriptedVerification,
};
pub use sse::{byte_stream, chunked_byte_stream, delta_event, sse_event};
