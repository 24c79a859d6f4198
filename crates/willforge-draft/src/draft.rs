//! The draft aggregate
//!
//! One will (or one additional document) in progress. Created lazily,
//! mutated throughout the wizard by a single owner, finalized once an
//! external payment confirms. Deletion is a backend housekeeping
//! concern, never the core's.

use crate::verification::VerificationReport;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;
use willforge_section::{Progress, ProgressInput, Scenario, Section};

/// Opaque draft identifier, absent until the backing record is
/// lazily created
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DraftId(pub Uuid);

impl DraftId {
    /// Generate a new id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of document this draft produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    /// A last will and testament
    #[default]
    Will,
    /// Living will (advance directive)
    LivingWill,
    /// Funeral wishes document
    FuneralWishes,
}

/// The aggregate representing one document in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftState {
    /// Absent until the backing record is created
    id: Option<DraftId>,
    kind: DraftKind,
    /// Schema-light per-section records, insertion-ordered
    payloads: IndexMap<Section, Value>,
    /// Set only by explicit user action; never unset automatically
    sections_complete: BTreeMap<Section, bool>,
    /// Persisted so a resumed session starts where the user left off
    current_section: Section,
    /// Append-only from detection, user-extendable via opt-in
    scenarios: BTreeSet<Scenario>,
    /// Warning codes the user has explicitly accepted
    acknowledged_warnings: BTreeSet<String>,
    /// Last verification report, if any
    verification: Option<VerificationReport>,
    /// Set once an external payment confirms
    paid: bool,
    created_at: DateTime<Utc>,
}

impl DraftState {
    /// New local draft with no backing record yet
    #[must_use]
    pub fn new(kind: DraftKind) -> Self {
        Self {
            id: None,
            kind,
            payloads: IndexMap::new(),
            sections_complete: BTreeMap::new(),
            current_section: Section::Personal,
            scenarios: BTreeSet::new(),
            acknowledged_warnings: BTreeSet::new(),
            verification: None,
            paid: false,
            created_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<DraftId> {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> DraftKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Bind the lazily-created backing record's id. First assignment
    /// wins; later calls with a different id are ignored.
    pub fn assign_id(&mut self, id: DraftId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    /// Raw record for one section, if any
    #[must_use]
    pub fn payload(&self, section: Section) -> Option<&Value> {
        self.payloads.get(&section)
    }

    /// Store a section's record, replacing any previous one
    pub fn set_payload(&mut self, section: Section, value: Value) {
        self.payloads.insert(section, value);
    }

    /// All stored section records in insertion order
    #[must_use]
    pub fn payloads(&self) -> &IndexMap<Section, Value> {
        &self.payloads
    }

    /// Whether a joint-will block has been configured; this activates
    /// the joint section without a scenario
    #[must_use]
    pub fn has_joint_config(&self) -> bool {
        self.payloads
            .get(&Section::Joint)
            .and_then(|v| v.get("will_structure"))
            .is_some_and(|v| !v.is_null())
    }

    #[inline]
    #[must_use]
    pub fn current_section(&self) -> Section {
        self.current_section
    }

    pub fn set_current_section(&mut self, section: Section) {
        self.current_section = section;
    }

    #[must_use]
    pub fn is_complete(&self, section: Section) -> bool {
        self.sections_complete.get(&section).copied().unwrap_or(false)
    }

    /// Mark a section complete. Completion is one-way: there is no
    /// automatic unset on later edits.
    pub fn mark_complete(&mut self, section: Section) {
        self.sections_complete.insert(section, true);
    }

    #[inline]
    #[must_use]
    pub fn sections_complete(&self) -> &BTreeMap<Section, bool> {
        &self.sections_complete
    }

    #[inline]
    #[must_use]
    pub fn scenarios(&self) -> &BTreeSet<Scenario> {
        &self.scenarios
    }

    /// Merge scenarios into the draft. Append-only: existing entries
    /// are never removed here.
    pub fn add_scenarios<I: IntoIterator<Item = Scenario>>(&mut self, scenarios: I) {
        self.scenarios.extend(scenarios);
    }

    #[inline]
    #[must_use]
    pub fn acknowledged_warnings(&self) -> &BTreeSet<String> {
        &self.acknowledged_warnings
    }

    /// Record acknowledged warning codes. Additive and idempotent;
    /// returns the codes that were newly added.
    pub fn acknowledge_warnings<I: IntoIterator<Item = String>>(
        &mut self,
        codes: I,
    ) -> Vec<String> {
        codes
            .into_iter()
            .filter(|code| self.acknowledged_warnings.insert(code.clone()))
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn verification(&self) -> Option<&VerificationReport> {
        self.verification.as_ref()
    }

    /// Store the latest verification report, replacing the previous
    /// run's report outright
    pub fn set_verification(&mut self, report: VerificationReport) {
        self.verification = Some(report);
    }

    #[inline]
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.paid
    }

    /// Finalize after external payment confirmation
    pub fn mark_paid(&mut self) {
        self.paid = true;
    }

    /// View for the progress computation
    #[must_use]
    pub fn progress_input(&self) -> ProgressInput<'_> {
        ProgressInput {
            sections_complete: &self.sections_complete,
            current_section: self.current_section,
            scenarios: &self.scenarios,
            has_joint_config: self.has_joint_config(),
        }
    }

    /// Current navigation state
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::compute(&self.progress_input())
    }
}

impl Default for DraftState {
    fn default() -> Self {
        Self::new(DraftKind::Will)
    }
}
