//! Streaming protocol plumbing for the will wizard
//!
//! - Incremental SSE parsing over chunked bytes
//! - Typed decoding of the conversation and verification event kinds
//! - The one-turn-at-a-time conversation channel
//!
//! Delta events for a turn apply strictly in arrival order; malformed
//! event payloads are dropped without aborting the stream; transport
//! failures surface exactly one error.

#![warn(unreachable_pub)]

pub mod channel;
pub mod event;
pub mod sse;

pub use channel::{AbortHandle, ConversationChannel, StreamError, TurnOutcome};
pub use event::{ConversationEvent, SectionProgress, VerifyEvent};
pub use sse::{SseParser, SseRecord};
