//! Streaming conversation channel
//!
//! Carries one turn at a time to the remote text-generation endpoint
//! and folds the streamed reply into the transcript's trailing
//! assistant message. One stream per channel may be active; a second
//! send while one runs is rejected, never implicitly cancelled.

use crate::event::ConversationEvent;
use crate::sse::SseParser;
use bytes::Bytes;
use futures::{FutureExt, Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use willforge_draft::{Message, Transcript};

/// Streaming channel failures
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// A stream is already active; the send was ignored
    #[error("a stream is already active for this channel")]
    Busy,
    /// Transport-level failure; surfaced once, ends the stream
    #[error("stream transport failed: {0}")]
    Transport(String),
    /// Remote error event received on the stream
    #[error("remote stream error: {0}")]
    Remote(String),
}

/// How a streamed turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Reply streamed to completion
    Completed,
    /// Server-side content filtering replaced the entire reply
    Filtered,
    /// Caller aborted mid-stream; partial content is retained
    Aborted,
}

/// Handle for aborting an in-flight stream from outside the channel
#[derive(Debug, Clone)]
pub struct AbortHandle {
    notify: Arc<Notify>,
    streaming: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Abort the active stream at its next suspension point. Content
    /// already appended to the transcript is retained. A no-op while
    /// no stream is active: a stop pressed after the reply finished
    /// must not cancel the next turn.
    pub fn abort(&self) {
        if self.streaming.load(Ordering::Acquire) {
            self.notify.notify_one();
        }
    }
}

/// Clears the streaming flag even if the send future is dropped
struct StreamingGuard(Arc<AtomicBool>);

impl Drop for StreamingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Duplex-like channel: request out, incrementally-growing reply in
#[derive(Debug)]
pub struct ConversationChannel {
    transcript: Transcript,
    streaming: Arc<AtomicBool>,
    abort: Arc<Notify>,
}

impl ConversationChannel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            streaming: Arc::new(AtomicBool::new(false)),
            abort: Arc::new(Notify::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Replace the transcript wholesale with history loaded from
    /// durable storage
    pub fn load_history(&mut self, messages: Vec<Message>) {
        self.transcript.replace_all(messages);
    }

    #[inline]
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    /// Handle for aborting the in-flight stream
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            notify: Arc::clone(&self.abort),
            streaming: Arc::clone(&self.streaming),
        }
    }

    /// Send one user turn and consume the streamed reply.
    ///
    /// Pushes the user message plus an empty trailing assistant
    /// message, then applies delta events strictly in arrival order.
    /// A `filtered` event replaces the whole reply. Malformed event
    /// payloads are skipped.
    ///
    /// # Errors
    /// - `StreamError::Busy` while a previous stream is active
    /// - `StreamError::Transport` on transport failure
    /// - `StreamError::Remote` when the server streams an error event
    pub async fn send<S, E>(
        &mut self,
        user_message: impl Into<String>,
        stream: S,
    ) -> Result<TurnOutcome, StreamError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        // An abort that raced the end of the previous stream may have
        // left a stored permit; it must not cancel this turn
        let _ = self.abort.notified().now_or_never();

        if self.streaming.swap(true, Ordering::AcqRel) {
            return Err(StreamError::Busy);
        }
        let _guard = StreamingGuard(Arc::clone(&self.streaming));

        self.transcript.push(Message::user(user_message));
        self.transcript.push_assistant_placeholder();

        self.drive(stream).await
    }

    async fn drive<S, E>(&mut self, mut stream: S) -> Result<TurnOutcome, StreamError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let abort = Arc::clone(&self.abort);
        let mut parser = SseParser::new();
        let mut filtered = false;

        loop {
            let chunk = tokio::select! {
                biased;
                () = abort.notified() => {
                    tracing::debug!("conversation stream aborted by caller");
                    return Ok(TurnOutcome::Aborted);
                }
                next = stream.next() => match next {
                    None => {
                        return Ok(if filtered {
                            TurnOutcome::Filtered
                        } else {
                            TurnOutcome::Completed
                        });
                    }
                    Some(Err(e)) => return Err(StreamError::Transport(e.to_string())),
                    Some(Ok(chunk)) => chunk,
                },
            };

            for record in parser.feed(&chunk) {
                match ConversationEvent::decode(&record) {
                    Some(ConversationEvent::Delta { content }) => {
                        self.transcript.append_delta(&content);
                    }
                    Some(ConversationEvent::Filtered { content }) => {
                        self.transcript.replace_trailing(&content);
                        filtered = true;
                    }
                    Some(ConversationEvent::Error { message }) => {
                        return Err(StreamError::Remote(message));
                    }
                    // Stream will end naturally after done
                    Some(ConversationEvent::Done) | None => {}
                }
            }
        }
    }
}

impl Default for ConversationChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn chunks(parts: &[&str]) -> Vec<Result<Bytes, Infallible>> {
        parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
            .collect()
    }

    fn sse_delta(content: &str) -> String {
        format!("event: delta\ndata: {{\"content\":\"{content}\"}}\n\n")
    }

    #[tokio::test]
    async fn deltas_build_the_reply_in_order() {
        let mut channel = ConversationChannel::new();
        let body = format!(
            "{}{}{}event: done\ndata: {{}}\n\n",
            sse_delta("Hel"),
            sse_delta("lo"),
            sse_delta(" world"),
        );
        let stream = futures::stream::iter(chunks(&[&body]));

        let outcome = channel.send("hi", stream).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(channel.transcript().len(), 2);
        assert_eq!(
            channel.transcript().messages().last().unwrap().content,
            "Hello world"
        );
        assert!(!channel.is_streaming());
    }

    #[tokio::test]
    async fn filtered_event_replaces_prior_deltas() {
        let mut channel = ConversationChannel::new();
        let body = format!(
            "{}{}event: filtered\ndata: {{\"content\":\"REDACTED\"}}\n\n",
            sse_delta("Hel"),
            sse_delta("lo"),
        );
        let stream = futures::stream::iter(chunks(&[&body]));

        let outcome = channel.send("hi", stream).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Filtered);
        assert_eq!(
            channel.transcript().messages().last().unwrap().content,
            "REDACTED"
        );
    }

    #[tokio::test]
    async fn chunk_boundaries_inside_events_are_harmless() {
        let mut channel = ConversationChannel::new();
        let stream = futures::stream::iter(chunks(&[
            "event: del",
            "ta\ndata: {\"cont",
            "ent\":\"Hi\"}\n\n",
        ]));

        channel.send("hi", stream).await.unwrap();
        assert_eq!(channel.transcript().messages().last().unwrap().content, "Hi");
    }

    #[tokio::test]
    async fn malformed_event_does_not_abort_stream() {
        let mut channel = ConversationChannel::new();
        let body = format!(
            "event: delta\ndata: {{not json\n\n{}",
            sse_delta("still here"),
        );
        let stream = futures::stream::iter(chunks(&[&body]));

        let outcome = channel.send("hi", stream).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(
            channel.transcript().messages().last().unwrap().content,
            "still here"
        );
    }

    #[tokio::test]
    async fn remote_error_event_surfaces_once() {
        let mut channel = ConversationChannel::new();
        let body = "event: error\ndata: {\"message\":\"quota exceeded\"}\n\n";
        let stream = futures::stream::iter(chunks(&[body]));

        let err = channel.send("hi", stream).await.unwrap_err();
        assert!(matches!(err, StreamError::Remote(m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn transport_failure_keeps_partial_content() {
        let mut channel = ConversationChannel::new();
        let body = sse_delta("partial");
        let stream = futures::stream::iter(vec![
            Ok(Bytes::copy_from_slice(body.as_bytes())),
            Err("connection reset"),
        ]);

        let err = channel.send("hi", stream).await.unwrap_err();
        assert!(matches!(err, StreamError::Transport(_)));
        assert_eq!(
            channel.transcript().messages().last().unwrap().content,
            "partial"
        );
        assert!(!channel.is_streaming());
    }

    #[tokio::test]
    async fn abort_mid_stream_retains_partial_content() {
        let mut channel = ConversationChannel::new();
        let handle = channel.abort_handle();

        let first = sse_delta("kept");
        // One chunk, then a stream that pends until aborted
        let stream = futures::stream::iter(chunks(&[&first[..]]))
            .chain(futures::stream::pending());
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            handle.abort();
        });

        let outcome = channel.send("hi", Box::pin(stream)).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Aborted);
        // No rollback: the partial reply stays in place
        assert_eq!(channel.transcript().len(), 2);
        assert_eq!(channel.transcript().messages().last().unwrap().content, "kept");
        assert!(!channel.is_streaming());
    }

    #[tokio::test]
    async fn abort_with_no_active_stream_is_inert() {
        let mut channel = ConversationChannel::new();
        let handle = channel.abort_handle();

        let body = format!("{}event: done\ndata: {{}}\n\n", sse_delta("first"));
        let stream = futures::stream::iter(chunks(&[&body]));
        assert_eq!(channel.send("one", stream).await.unwrap(), TurnOutcome::Completed);

        // Stop pressed after the reply already finished
        handle.abort();

        let body = format!("{}event: done\ndata: {{}}\n\n", sse_delta("second"));
        let stream = futures::stream::iter(chunks(&[&body]));
        assert_eq!(channel.send("two", stream).await.unwrap(), TurnOutcome::Completed);
        assert_eq!(
            channel.transcript().messages().last().unwrap().content,
            "second"
        );
    }

    #[tokio::test]
    async fn history_load_replaces_transcript() {
        let mut channel = ConversationChannel::new();
        channel.load_history(vec![Message::user("a"), Message::assistant("b")]);
        assert_eq!(channel.transcript().len(), 2);
    }
}
