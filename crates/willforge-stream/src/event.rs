//! Typed decoding of the wizard's two streaming protocols
//!
//! Conversation streams carry `delta`/`filtered`/`error`/`done`;
//! verification streams carry `check`/`section_result`/`done`/`error`.
//! Malformed payloads decode to `None` and are skipped; the stream
//! continues.

use crate::sse::SseRecord;
use serde::Deserialize;
use willforge_draft::{SectionStatus, VerificationReport};
use willforge_section::Section;

/// One event of a streamed assistant reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// Incremental chunk to append to the in-progress reply
    Delta { content: String },
    /// Terminal full replacement after server-side content filtering
    Filtered { content: String },
    /// Remote failure; ends the stream
    Error { message: String },
    /// Explicit end-of-stream marker
    Done,
}

#[derive(Deserialize)]
struct ContentPayload {
    content: String,
}

#[derive(Deserialize)]
struct MessagePayload {
    message: String,
}

impl ConversationEvent {
    /// Decode a parsed record; `None` for unknown events or malformed
    /// payloads (both are skipped)
    #[must_use]
    pub fn decode(record: &SseRecord) -> Option<Self> {
        match record.event.as_str() {
            "delta" => serde_json::from_str::<ContentPayload>(&record.data)
                .ok()
                .map(|p| ConversationEvent::Delta { content: p.content }),
            "filtered" => serde_json::from_str::<ContentPayload>(&record.data)
                .ok()
                .map(|p| ConversationEvent::Filtered { content: p.content }),
            "error" => serde_json::from_str::<MessagePayload>(&record.data)
                .ok()
                .map(|p| ConversationEvent::Error { message: p.message }),
            "done" => Some(ConversationEvent::Done),
            other => {
                if !other.is_empty() {
                    tracing::debug!(event = other, "skipping unknown conversation event");
                }
                None
            }
        }
    }
}

/// Running section outcome streamed during verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SectionProgress {
    pub section: Section,
    pub status: SectionStatus,
    pub issue_count: u32,
}

/// One event of a streamed verification run
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyEvent {
    /// Informational "check step started" progress event
    Check { step: String, message: String },
    /// One section's outcome, appended to a running list
    SectionResult(SectionProgress),
    /// Terminal event carrying the full structured report
    Done(Box<VerificationReport>),
    /// Remote failure; ends the stream
    Error { message: String },
}

#[derive(Deserialize)]
struct CheckPayload {
    step: String,
    message: String,
}

impl VerifyEvent {
    /// Decode a parsed record; `None` for unknown events or malformed
    /// payloads (both are skipped)
    #[must_use]
    pub fn decode(record: &SseRecord) -> Option<Self> {
        match record.event.as_str() {
            "check" => serde_json::from_str::<CheckPayload>(&record.data)
                .ok()
                .map(|p| VerifyEvent::Check {
                    step: p.step,
                    message: p.message,
                }),
            "section_result" => serde_json::from_str::<SectionProgress>(&record.data)
                .ok()
                .map(VerifyEvent::SectionResult),
            "done" => serde_json::from_str::<VerificationReport>(&record.data)
                .ok()
                .map(|r| VerifyEvent::Done(Box::new(r))),
            "error" => serde_json::from_str::<MessagePayload>(&record.data)
                .ok()
                .map(|p| VerifyEvent::Error { message: p.message }),
            other => {
                if !other.is_empty() {
                    tracing::debug!(event = other, "skipping unknown verification event");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event: &str, data: &str) -> SseRecord {
        SseRecord {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn delta_decodes() {
        let event = ConversationEvent::decode(&record("delta", r#"{"content":"Hel"}"#));
        assert_eq!(
            event,
            Some(ConversationEvent::Delta {
                content: "Hel".to_string()
            })
        );
    }

    #[test]
    fn malformed_payload_is_skipped() {
        assert_eq!(ConversationEvent::decode(&record("delta", "{not json")), None);
        assert_eq!(
            ConversationEvent::decode(&record("delta", r#"{"content":42}"#)),
            None
        );
        assert_eq!(VerifyEvent::decode(&record("section_result", "[]")), None);
    }

    #[test]
    fn unknown_event_is_skipped() {
        assert_eq!(ConversationEvent::decode(&record("heartbeat", "{}")), None);
        assert_eq!(VerifyEvent::decode(&record("heartbeat", "{}")), None);
    }

    #[test]
    fn section_result_decodes() {
        let event = VerifyEvent::decode(&record(
            "section_result",
            r#"{"section":"residue","status":"warning","issue_count":2}"#,
        ));
        assert_eq!(
            event,
            Some(VerifyEvent::SectionResult(SectionProgress {
                section: Section::Residue,
                status: SectionStatus::Warning,
                issue_count: 2,
            }))
        );
    }

    #[test]
    fn done_carries_full_report() {
        let data = r#"{
            "overall_status": "pass",
            "sections": [],
            "attorney_referral": {"recommended": false, "reasons": []},
            "summary": "Looks good."
        }"#;
        match VerifyEvent::decode(&record("done", data)) {
            Some(VerifyEvent::Done(report)) => assert_eq!(report.summary, "Looks good."),
            other => panic!("expected done event, got {other:?}"),
        }
    }

    #[test]
    fn conversation_done_needs_no_payload() {
        assert_eq!(
            ConversationEvent::decode(&record("done", "{}")),
            Some(ConversationEvent::Done)
        );
    }
}
