//! Conversation transcripts
//!
//! An append-only, role-tagged message log scoped to one
//! (draft, section) pair. Replaced wholesale when history is loaded
//! from durable storage; the streaming channel mutates only the
//! trailing assistant message.

use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// User message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message log for one (draft, section) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Empty transcript
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in order
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append an empty assistant message for a streamed reply to
    /// accumulate into
    pub fn push_assistant_placeholder(&mut self) {
        self.messages.push(Message::assistant(""));
    }

    /// Append a streamed chunk to the trailing assistant message.
    ///
    /// Deltas apply strictly in arrival order; a chunk arriving when
    /// the trailing message is not an assistant one is dropped.
    pub fn append_delta(&mut self, chunk: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Assistant {
                last.content.push_str(chunk);
            }
        }
    }

    /// Replace the trailing assistant message's entire content.
    ///
    /// Used when server-side content filtering substitutes the whole
    /// reply; prior deltas are discarded.
    pub fn replace_trailing(&mut self, content: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Assistant {
                last.content.clear();
                last.content.push_str(content);
            }
        }
    }

    /// Replace the whole transcript with loaded history
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// The most recent `limit` messages, oldest first. Bounds the
    /// request payload sent to the conversation service.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_accumulate_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        transcript.push_assistant_placeholder();
        transcript.append_delta("Hel");
        transcript.append_delta("lo");
        transcript.append_delta(" world");
        assert_eq!(transcript.messages().last().unwrap().content, "Hello world");
    }

    #[test]
    fn filtered_replacement_discards_deltas() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        transcript.push_assistant_placeholder();
        transcript.append_delta("Hel");
        transcript.append_delta("lo");
        transcript.replace_trailing("REDACTED");
        assert_eq!(transcript.messages().last().unwrap().content, "REDACTED");
    }

    #[test]
    fn delta_without_assistant_trailing_is_dropped() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        transcript.append_delta("lost");
        assert_eq!(transcript.messages().last().unwrap().content, "hi");
    }

    #[test]
    fn recent_bounds_the_window() {
        let mut transcript = Transcript::new();
        for i in 0..30 {
            transcript.push(Message::user(format!("m{i}")));
        }
        let window = transcript.recent(20);
        assert_eq!(window.len(), 20);
        assert_eq!(window.first().unwrap().content, "m10");
        assert_eq!(window.last().unwrap().content, "m29");

        // Shorter transcripts are returned whole
        let mut short = Transcript::new();
        short.push(Message::user("only"));
        assert_eq!(short.recent(20).len(), 1);
    }

    #[test]
    fn replace_all_swaps_history_wholesale() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("local"));
        transcript.replace_all(vec![
            Message::user("from store"),
            Message::assistant("reply"),
        ]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].content, "from store");
    }
}
