//! Client error taxonomy
//!
//! Transport and server failures are retryable per operation and never
//! fatal to the session; remote business-rule failures live in the
//! response data, not here.

/// Remote call failures
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the backend
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Bearer token could not be obtained
    #[error("authentication token unavailable: {0}")]
    Auth(String),
}

impl ApiError {
    /// Every client failure is locally recoverable by retry; only
    /// auth failures need outside help first
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_carries_status_and_body() {
        let err = ApiError::Server {
            status: 422,
            body: "shares must total 100".to_string(),
        };
        assert!(err.to_string().contains("422"));
        assert!(err.is_retryable());
    }

    #[test]
    fn auth_errors_are_not_retryable() {
        assert!(!ApiError::Auth("no session".to_string()).is_retryable());
    }
}
