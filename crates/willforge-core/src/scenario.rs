//! Scenario detection gate
//!
//! The interstitial between the base sections and the optional ones.
//! Detection runs at most once per session; a failed run stays
//! retryable, a successful run is terminal until the session ends.
//! The user can adjust the selection before confirming; confirmation
//! merges the selection into the draft and routes onward.

use crate::error::WizardError;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use willforge_client::{DocumentStore, ScenarioAnalysis};
use willforge_draft::DraftState;
use willforge_section::{active_complex_sections, Scenario, Section};

/// Detection lifecycle for one session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    NotRun,
    Running,
    /// Detection succeeded; terminal for this session
    Detected,
    /// Detection failed; a new `detect` call may be attempted
    Failed(String),
}

/// One-shot scenario gate with a user-adjustable selection
#[derive(Debug, Default)]
pub struct ScenarioGate {
    state: GateState,
    detected: BTreeSet<Scenario>,
    /// Detected set plus opt-ins, minus opt-outs
    selected: BTreeSet<Scenario>,
}

impl ScenarioGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Whether detection has completed successfully this session
    #[must_use]
    pub fn has_run(&self) -> bool {
        self.state == GateState::Detected
    }

    #[inline]
    #[must_use]
    pub fn detected(&self) -> &BTreeSet<Scenario> {
        &self.detected
    }

    #[inline]
    #[must_use]
    pub fn selected(&self) -> &BTreeSet<Scenario> {
        &self.selected
    }

    /// Run detection against the draft's current data.
    ///
    /// Idempotent after success: once `Detected`, the cached set is
    /// returned without another remote call. Does not touch the
    /// draft's current section.
    ///
    /// # Errors
    /// `WizardError::ScenarioDetection` on analysis failure; the gate
    /// moves to `Failed` and may be retried.
    pub async fn detect(
        &mut self,
        analysis: &dyn ScenarioAnalysis,
        draft: &DraftState,
    ) -> Result<&BTreeSet<Scenario>, WizardError> {
        if self.has_run() {
            debug!("scenario detection already ran this session");
            return Ok(&self.detected);
        }
        let id = draft.id().ok_or(WizardError::NoDraft)?;

        self.state = GateState::Running;
        match analysis.detect(id).await {
            Ok(scenarios) => {
                info!(%id, count = scenarios.len(), "scenario detection complete");
                self.detected = scenarios.clone();
                self.selected = scenarios;
                self.state = GateState::Detected;
                Ok(&self.detected)
            }
            Err(e) => {
                warn!(%id, error = %e, "scenario detection failed");
                let reason = e.to_string();
                self.state = GateState::Failed(reason.clone());
                Err(WizardError::ScenarioDetection(reason))
            }
        }
    }

    /// Add a scenario to the selection before confirmation
    pub fn opt_in(&mut self, scenario: Scenario) {
        self.selected.insert(scenario);
    }

    /// Remove a scenario from the selection before confirmation
    pub fn opt_out(&mut self, scenario: Scenario) {
        self.selected.remove(&scenario);
    }

    /// Confirm the selection: merge it into the draft (append-only),
    /// persist the combined set, and return the first section to
    /// route to (`review` when nothing is active).
    ///
    /// # Errors
    /// Persistence failure; the local merge has already happened and
    /// is not rolled back.
    pub async fn confirm(
        &mut self,
        store: &dyn DocumentStore,
        draft: &mut DraftState,
    ) -> Result<Section, WizardError> {
        let id = draft.id().ok_or(WizardError::NoDraft)?;

        draft.add_scenarios(self.selected.iter().copied());
        store.set_scenarios(id, draft.scenarios().clone()).await?;

        let first = active_complex_sections(draft.scenarios(), draft.has_joint_config())
            .first()
            .copied()
            .unwrap_or(Section::Review);
        info!(%id, scenarios = draft.scenarios().len(), next = %first, "scenario gate confirmed");
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use willforge_testkit::{InMemoryStore, ScriptedScenarios};

    async fn draft_with_id(store: &InMemoryStore) -> DraftState {
        let mut draft = DraftState::default();
        let id = store.seed(draft.clone());
        draft.assign_id(id);
        draft
    }

    #[tokio::test]
    async fn detection_runs_once_per_session() {
        let store = InMemoryStore::new();
        let draft = draft_with_id(&store).await;
        let analysis = ScriptedScenarios::new();
        analysis.push_detection([Scenario::Usufruct]);

        let mut gate = ScenarioGate::new();
        let detected = gate.detect(&analysis, &draft).await.unwrap().clone();
        assert_eq!(detected.len(), 1);
        assert!(gate.has_run());

        // Second call is served from the cache
        gate.detect(&analysis, &draft).await.unwrap();
        assert_eq!(analysis.calls(), 1);
    }

    #[tokio::test]
    async fn failed_detection_is_retryable() {
        let store = InMemoryStore::new();
        let draft = draft_with_id(&store).await;
        let analysis = ScriptedScenarios::new();
        analysis.push_failure("analysis timed out");
        analysis.push_detection([Scenario::BusinessAssets]);

        let mut gate = ScenarioGate::new();
        let err = gate.detect(&analysis, &draft).await.unwrap_err();
        assert!(matches!(err, WizardError::ScenarioDetection(_)));
        assert!(err.is_retryable());
        assert!(matches!(gate.state(), GateState::Failed(_)));

        gate.detect(&analysis, &draft).await.unwrap();
        assert!(gate.has_run());
        assert_eq!(analysis.calls(), 2);
    }

    #[tokio::test]
    async fn opt_in_and_out_adjust_the_selection() {
        let store = InMemoryStore::new();
        let draft = draft_with_id(&store).await;
        let analysis = ScriptedScenarios::new();
        analysis.push_detection([Scenario::TestamentaryTrust]);

        let mut gate = ScenarioGate::new();
        gate.detect(&analysis, &draft).await.unwrap();
        gate.opt_in(Scenario::Usufruct);
        gate.opt_out(Scenario::TestamentaryTrust);

        assert!(gate.selected().contains(&Scenario::Usufruct));
        assert!(!gate.selected().contains(&Scenario::TestamentaryTrust));
        // The detected record is untouched by selection edits
        assert!(gate.detected().contains(&Scenario::TestamentaryTrust));
    }

    #[tokio::test]
    async fn confirm_merges_persists_and_routes() {
        let store = InMemoryStore::new();
        let mut draft = draft_with_id(&store).await;
        let analysis = ScriptedScenarios::new();
        analysis.push_detection([Scenario::BusinessAssets]);

        let mut gate = ScenarioGate::new();
        gate.detect(&analysis, &draft).await.unwrap();
        gate.opt_in(Scenario::Usufruct);

        let next = gate.confirm(&store, &mut draft).await.unwrap();
        // Canonical order puts usufruct before business
        assert_eq!(next, Section::Usufruct);
        assert_eq!(draft.scenarios().len(), 2);
        assert_eq!(store.scenario_sets().len(), 1);
    }

    #[tokio::test]
    async fn empty_selection_routes_to_review() {
        let store = InMemoryStore::new();
        let mut draft = draft_with_id(&store).await;
        let analysis = ScriptedScenarios::new();

        let mut gate = ScenarioGate::new();
        gate.detect(&analysis, &draft).await.unwrap();
        let next = gate.confirm(&store, &mut draft).await.unwrap();
        assert_eq!(next, Section::Review);
    }
}
