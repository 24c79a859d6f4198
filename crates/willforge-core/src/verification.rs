//! Verification gate
//!
//! Streams the compliance check, records live progress, stores the
//! final report on the draft, and enforces the proceed rule. A re-run
//! replaces the previous run's state outright.

use crate::error::WizardError;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use willforge_client::{DocumentStore, VerificationService};
use willforge_draft::{DraftState, VerificationReport};
use willforge_stream::{SectionProgress, SseParser, VerifyEvent};

/// One live progress line from the verification stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckProgress {
    pub step: String,
    pub message: String,
}

/// Drives verification runs and warning acknowledgment
pub struct VerificationGate {
    service: Arc<dyn VerificationService>,
    store: Arc<dyn DocumentStore>,
    checks: Vec<CheckProgress>,
    section_results: Vec<SectionProgress>,
}

impl VerificationGate {
    #[must_use]
    pub fn new(service: Arc<dyn VerificationService>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            service,
            store,
            checks: Vec::new(),
            section_results: Vec::new(),
        }
    }

    /// Live check steps from the current or last run
    #[inline]
    #[must_use]
    pub fn checks(&self) -> &[CheckProgress] {
        &self.checks
    }

    /// Per-section progress from the current or last run
    #[inline]
    #[must_use]
    pub fn section_results(&self) -> &[SectionProgress] {
        &self.section_results
    }

    /// Run verification and store the final report on the draft.
    ///
    /// Progress from any previous run is cleared first; the stored
    /// report is replaced, never merged.
    ///
    /// # Errors
    /// - `NoDraft` before creation
    /// - transport/server failure mid-stream
    /// - a remote error event
    /// - `VerificationIncomplete` when the stream ends without a
    ///   final report
    pub async fn run(&mut self, draft: &mut DraftState) -> Result<VerificationReport, WizardError> {
        let id = draft.id().ok_or(WizardError::NoDraft)?;
        self.checks.clear();
        self.section_results.clear();

        let mut stream = self.service.stream_verification(id).await?;
        let mut parser = SseParser::new();
        let mut report: Option<VerificationReport> = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for record in parser.feed(&chunk) {
                match VerifyEvent::decode(&record) {
                    Some(VerifyEvent::Check { step, message }) => {
                        debug!(%id, step, "verification check");
                        self.checks.push(CheckProgress { step, message });
                    }
                    Some(VerifyEvent::SectionResult(progress)) => {
                        self.section_results.push(progress);
                    }
                    Some(VerifyEvent::Done(full)) => report = Some(*full),
                    Some(VerifyEvent::Error { message }) => {
                        warn!(%id, error = %message, "verification stream error");
                        return Err(WizardError::Verification(message));
                    }
                    None => {}
                }
            }
        }

        let report = report.ok_or(WizardError::VerificationIncomplete)?;
        info!(
            %id,
            overall = ?report.overall_status,
            issues = report.issues().count(),
            "verification complete"
        );
        draft.set_verification(report.clone());
        Ok(report)
    }

    /// Acknowledge warning codes. Additive and idempotent; only codes
    /// not yet acknowledged are synced to the store.
    ///
    /// Returns whether the draft may now proceed to generation.
    ///
    /// # Errors
    /// `NoDraft`, or the store sync when new codes were added.
    pub async fn acknowledge(
        &self,
        draft: &mut DraftState,
        codes: Vec<String>,
    ) -> Result<bool, WizardError> {
        let id = draft.id().ok_or(WizardError::NoDraft)?;
        let newly = draft.acknowledge_warnings(codes);
        if !newly.is_empty() {
            self.store.acknowledge_warnings(id, newly).await?;
        }
        Ok(Self::can_proceed(draft))
    }

    /// Acknowledge every warning in the stored report at once
    ///
    /// # Errors
    /// Same as [`Self::acknowledge`].
    pub async fn acknowledge_all(&self, draft: &mut DraftState) -> Result<bool, WizardError> {
        let codes: Vec<String> = draft
            .verification()
            .map(|r| r.warning_codes().into_iter().collect())
            .unwrap_or_default();
        self.acknowledge(draft, codes).await
    }

    /// Proceed rule: a report exists, it has no error-severity issues,
    /// and every warning code is acknowledged
    #[must_use]
    pub fn can_proceed(draft: &DraftState) -> bool {
        draft
            .verification()
            .is_some_and(|report| report.can_proceed(draft.acknowledged_warnings()))
    }
}

impl std::fmt::Debug for VerificationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationGate")
            .field("checks", &self.checks.len())
            .field("section_results", &self.section_results.len())
            .finish_non_exhaustive()
    }
}
