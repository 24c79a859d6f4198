//! Wizard error taxonomy

use willforge_client::ApiError;
use willforge_draft::PayloadError;
use willforge_stream::StreamError;

/// Failures surfaced by the wizard core
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Remote API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Streaming channel failure
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Section payload failed edge validation
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Operation needs a backing record that does not exist yet
    #[error("no draft record exists yet")]
    NoDraft,

    /// Scenario detection failed; the gate stays retryable
    #[error("scenario detection failed: {0}")]
    ScenarioDetection(String),

    /// Verification stream reported an error event
    #[error("verification failed: {0}")]
    Verification(String),

    /// Verification stream ended without a final report
    #[error("verification stream ended without a report")]
    VerificationIncomplete,
}

impl WizardError {
    /// Whether retrying the same operation could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            WizardError::Api(e) => e.is_retryable(),
            WizardError::Stream(StreamError::Busy) => false,
            WizardError::Stream(_) => true,
            WizardError::Payload(_) | WizardError::NoDraft => false,
            WizardError::ScenarioDetection(_)
            | WizardError::Verification(_)
            | WizardError::VerificationIncomplete => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_stream_is_not_retryable() {
        assert!(!WizardError::Stream(StreamError::Busy).is_retryable());
        assert!(WizardError::Stream(StreamError::Transport("reset".into())).is_retryable());
    }

    #[test]
    fn detection_failure_is_retryable() {
        assert!(WizardError::ScenarioDetection("timeout".into()).is_retryable());
        assert!(!WizardError::NoDraft.is_retryable());
    }
}
