//! Structured verification report and the proceed-gating rule

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use willforge_section::Section;

/// Issue severity, ordered least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Per-section (and overall) verification status, ordered least to
/// most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Pass,
    Warning,
    Error,
}

/// One typed compliance issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationIssue {
    /// Machine code, e.g. "W-RESIDUE-SHARES"
    pub code: String,
    pub severity: Severity,
    pub section: Section,
    pub title: String,
    pub explanation: String,
    pub suggestion: String,
}

/// Result for one section of the draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub section: Section,
    pub status: SectionStatus,
    pub issues: Vec<VerificationIssue>,
}

/// Whether the user should be referred to an attorney, with reasons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttorneyReferral {
    pub recommended: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Full structured verification report.
///
/// Invariant: `overall_status` is the most severe of all section
/// statuses; `computed_overall_status` derives it for checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub overall_status: SectionStatus,
    pub sections: Vec<SectionResult>,
    #[serde(default)]
    pub attorney_referral: AttorneyReferral,
    #[serde(default)]
    pub summary: String,
}

impl VerificationReport {
    /// Most severe section status across the report
    #[must_use]
    pub fn computed_overall_status(&self) -> SectionStatus {
        self.sections
            .iter()
            .map(|s| s.status)
            .max()
            .unwrap_or(SectionStatus::Pass)
    }

    /// All issues across all sections
    pub fn issues(&self) -> impl Iterator<Item = &VerificationIssue> {
        self.sections.iter().flat_map(|s| s.issues.iter())
    }

    /// Any error-severity issue blocks document generation outright
    #[must_use]
    pub fn has_blocking_errors(&self) -> bool {
        self.issues().any(|i| i.severity == Severity::Error)
    }

    /// Codes of every warning-severity issue
    #[must_use]
    pub fn warning_codes(&self) -> BTreeSet<String> {
        self.issues()
            .filter(|i| i.severity == Severity::Warning)
            .map(|i| i.code.clone())
            .collect()
    }

    /// Warning-severity issues, for acknowledgment UIs
    pub fn warning_issues(&self) -> impl Iterator<Item = &VerificationIssue> {
        self.issues().filter(|i| i.severity == Severity::Warning)
    }

    /// Gate rule: proceed only with zero error-severity issues and
    /// every warning code present in the acknowledged set. Unknown
    /// codes in the acknowledged set are inert.
    #[must_use]
    pub fn can_proceed(&self, acknowledged: &BTreeSet<String>) -> bool {
        !self.has_blocking_errors()
            && self
                .warning_codes()
                .iter()
                .all(|code| acknowledged.contains(code))
    }
}
