//! Scripted SSE byte streams

use bytes::Bytes;
use serde_json::Value;
use willforge_client::{ApiError, ByteStream};

/// Render one SSE event block
pub fn sse_event(event: &str, data: &Value) -> String {
    format!("event: {event}\ndata: {data}\n\n")
}

/// Delta event block for a streamed reply chunk
pub fn delta_event(content: &str) -> String {
    sse_event("delta", &serde_json::json!({ "content": content }))
}

/// A stream yielding each part as one chunk
pub fn byte_stream(parts: Vec<String>) -> ByteStream {
    let parts: Vec<Result<Bytes, ApiError>> = parts
        .into_iter()
        .map(|p| Ok(Bytes::from(p.into_bytes())))
        .collect();
    Box::pin(futures::stream::iter(parts))
}

/// A stream re-chunked into `size`-byte pieces, so chunk boundaries
/// land mid-line and mid-JSON
pub fn chunked_byte_stream(body: String, size: usize) -> ByteStream {
    let bytes = body.into_bytes();
    let chunks: Vec<Result<Bytes, ApiError>> = bytes
        .chunks(size.max(1))
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    Box::pin(futures::stream::iter(chunks))
}
