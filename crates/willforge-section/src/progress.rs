//! Pure progress computation over draft completion state
//!
//! Derives the navigable section list, completion counts, and the
//! review gate from the draft's mutable state. No I/O, no errors.

use crate::scenario::Scenario;
use crate::section::{Section, BASE, COMPLEX, REQUIRED_FOR_REVIEW};
use std::collections::{BTreeMap, BTreeSet};

/// View of the draft state the progress computation needs
#[derive(Debug, Clone, Copy)]
pub struct ProgressInput<'a> {
    /// Per-section completion flags, set only by explicit user action
    pub sections_complete: &'a BTreeMap<Section, bool>,
    /// Section currently being edited
    pub current_section: Section,
    /// Detected plus opted-in scenarios
    pub scenarios: &'a BTreeSet<Scenario>,
    /// Whether a joint-will block has been configured (activates the
    /// joint section without a scenario)
    pub has_joint_config: bool,
}

/// One entry of the navigable section list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    /// Section key
    pub section: Section,
    /// Display label
    pub label: &'static str,
    /// Marked complete by the user
    pub is_complete: bool,
    /// Currently being edited
    pub is_current: bool,
}

/// Derived navigation state for the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Ordered section list: base, then active complex in canonical
    /// order, then review
    pub sections: Vec<SectionEntry>,
    /// Completed trackable sections (review excluded)
    pub completed_count: usize,
    /// Total trackable sections (review excluded)
    pub total_sections: usize,
    /// Every trackable section is complete
    pub is_all_complete: bool,
    /// The required subset (personal, beneficiaries, executor, residue)
    /// is complete; independent of optional sections
    pub can_review: bool,
    /// Active complex sections, canonical order
    pub active_complex: Vec<Section>,
}

impl Progress {
    /// Compute navigation state from the draft state.
    ///
    /// The section list is always: the seven base sections, then
    /// exactly the complex sections implied by the scenario set (plus
    /// joint when configured) in canonical order, then review. Input
    /// order and duplicates of the scenario set cannot affect output.
    #[must_use]
    pub fn compute(input: &ProgressInput<'_>) -> Self {
        let active_complex = active_complex_sections(input.scenarios, input.has_joint_config);

        let ordered: Vec<Section> = BASE
            .iter()
            .chain(active_complex.iter())
            .copied()
            .chain(std::iter::once(Section::Review))
            .collect();

        let is_done =
            |s: Section| input.sections_complete.get(&s).copied().unwrap_or(false);

        let sections: Vec<SectionEntry> = ordered
            .iter()
            .map(|&section| SectionEntry {
                section,
                label: section.label(),
                is_complete: is_done(section),
                is_current: input.current_section == section,
            })
            .collect();

        let total_sections = BASE.len() + active_complex.len();
        let completed_count = ordered
            .iter()
            .filter(|&&s| s != Section::Review && is_done(s))
            .count();

        let can_review = REQUIRED_FOR_REVIEW.iter().all(|&s| is_done(s));

        Self {
            sections,
            completed_count,
            total_sections,
            is_all_complete: completed_count == total_sections,
            can_review,
            active_complex,
        }
    }

    /// Next entry after `section` in the current ordered list
    #[must_use]
    pub fn next_after(&self, section: Section) -> Option<Section> {
        let idx = self.sections.iter().position(|e| e.section == section)?;
        self.sections.get(idx + 1).map(|e| e.section)
    }

    /// Whether `section` is part of the current ordered list
    #[must_use]
    pub fn contains(&self, section: Section) -> bool {
        self.sections.iter().any(|e| e.section == section)
    }
}

/// Complex sections implied by the scenario set, in canonical order
/// (trust, usufruct, business, joint). The joint section activates
/// from draft data, not from a scenario.
#[must_use]
pub fn active_complex_sections(
    scenarios: &BTreeSet<Scenario>,
    has_joint_config: bool,
) -> Vec<Section> {
    let triggered: BTreeSet<Section> = scenarios.iter().map(|s| s.target_section()).collect();

    COMPLEX
        .iter()
        .copied()
        .filter(|&section| {
            if section == Section::Joint {
                has_joint_config
            } else {
                triggered.contains(&section)
            }
        })
        .collect()
}

/// First complex section to route to after scenario confirmation, or
/// review when no scenario applies. Stable across runs with identical
/// input.
#[must_use]
pub fn first_complex_section(scenarios: &BTreeSet<Scenario>) -> Section {
    active_complex_sections(scenarios, false)
        .first()
        .copied()
        .unwrap_or(Section::Review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn complete(sections: &[Section]) -> BTreeMap<Section, bool> {
        sections.iter().map(|&s| (s, true)).collect()
    }

    fn scenarios(list: &[Scenario]) -> BTreeSet<Scenario> {
        list.iter().copied().collect()
    }

    fn keys(progress: &Progress) -> Vec<Section> {
        progress.sections.iter().map(|e| e.section).collect()
    }

    #[test]
    fn no_scenarios_yields_base_plus_review() {
        let done = BTreeMap::new();
        let scen = BTreeSet::new();
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Personal,
            scenarios: &scen,
            has_joint_config: false,
        });

        let mut expected: Vec<Section> = BASE.to_vec();
        expected.push(Section::Review);
        assert_eq!(keys(&progress), expected);
        assert_eq!(progress.total_sections, 7);
        assert_eq!(progress.completed_count, 0);
        assert!(!progress.can_review);
    }

    #[test]
    fn usufruct_scenario_injects_only_usufruct() {
        let done = BTreeMap::new();
        let scen = scenarios(&[Scenario::Usufruct]);
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Residue,
            scenarios: &scen,
            has_joint_config: false,
        });

        let mut expected: Vec<Section> = BASE.to_vec();
        expected.push(Section::Usufruct);
        expected.push(Section::Review);
        assert_eq!(keys(&progress), expected);
        assert_eq!(progress.next_after(Section::Residue), Some(Section::Usufruct));
        assert_eq!(progress.next_after(Section::Usufruct), Some(Section::Review));
    }

    #[test]
    fn both_trust_scenarios_inject_trust_once() {
        let done = BTreeMap::new();
        let scen = scenarios(&[Scenario::BlendedFamily, Scenario::TestamentaryTrust]);
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Personal,
            scenarios: &scen,
            has_joint_config: false,
        });

        let trust_count = keys(&progress)
            .iter()
            .filter(|&&s| s == Section::Trust)
            .count();
        assert_eq!(trust_count, 1);
        assert_eq!(progress.total_sections, 8);
    }

    #[test]
    fn joint_section_activates_from_config_not_scenario() {
        let done = BTreeMap::new();
        let scen = BTreeSet::new();
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Personal,
            scenarios: &scen,
            has_joint_config: true,
        });
        assert_eq!(progress.active_complex, vec![Section::Joint]);
    }

    #[test]
    fn can_review_requires_exactly_the_required_subset() {
        let done = complete(&REQUIRED_FOR_REVIEW);
        let scen = scenarios(&[Scenario::BusinessAssets]);
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Review,
            scenarios: &scen,
            has_joint_config: false,
        });

        // Business section incomplete, assets/guardians/bequests incomplete
        assert!(progress.can_review);
        assert!(!progress.is_all_complete);

        // Missing one required section blocks review
        let mut partial = done.clone();
        partial.insert(Section::Residue, false);
        let blocked = Progress::compute(&ProgressInput {
            sections_complete: &partial,
            current_section: Section::Review,
            scenarios: &scen,
            has_joint_config: false,
        });
        assert!(!blocked.can_review);
    }

    #[test]
    fn review_excluded_from_denominator() {
        let mut done = complete(&BASE);
        done.insert(Section::Review, true);
        let scen = BTreeSet::new();
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Review,
            scenarios: &scen,
            has_joint_config: false,
        });
        assert_eq!(progress.completed_count, 7);
        assert_eq!(progress.total_sections, 7);
        assert!(progress.is_all_complete);
    }

    #[test]
    fn current_flag_set_on_single_entry() {
        let done = BTreeMap::new();
        let scen = BTreeSet::new();
        let progress = Progress::compute(&ProgressInput {
            sections_complete: &done,
            current_section: Section::Executor,
            scenarios: &scen,
            has_joint_config: false,
        });
        let current: Vec<Section> = progress
            .sections
            .iter()
            .filter(|e| e.is_current)
            .map(|e| e.section)
            .collect();
        assert_eq!(current, vec![Section::Executor]);
    }

    #[test]
    fn first_complex_prefers_canonical_order() {
        assert_eq!(
            first_complex_section(&scenarios(&[Scenario::BusinessAssets, Scenario::Usufruct])),
            Section::Usufruct
        );
        assert_eq!(
            first_complex_section(&scenarios(&[
                Scenario::BusinessAssets,
                Scenario::TestamentaryTrust
            ])),
            Section::Trust
        );
        assert_eq!(first_complex_section(&BTreeSet::new()), Section::Review);
    }

    fn arb_scenario() -> impl Strategy<Value = Scenario> {
        prop_oneof![
            Just(Scenario::BlendedFamily),
            Just(Scenario::TestamentaryTrust),
            Just(Scenario::Usufruct),
            Just(Scenario::BusinessAssets),
        ]
    }

    proptest! {
        /// For all scenario sets, the list is base sections, then the
        /// implied complex sections in canonical order, then review.
        #[test]
        fn section_list_shape_holds(scen in proptest::collection::btree_set(arb_scenario(), 0..=4), joint in any::<bool>()) {
            let done = BTreeMap::new();
            let progress = Progress::compute(&ProgressInput {
                sections_complete: &done,
                current_section: Section::Personal,
                scenarios: &scen,
                has_joint_config: joint,
            });

            let listed = keys(&progress);
            prop_assert_eq!(&listed[..7], &BASE[..]);
            prop_assert_eq!(listed.last().copied(), Some(Section::Review));

            let middle = &listed[7..listed.len() - 1];
            // Canonical order and no duplicates
            let mut expected: Vec<Section> = Vec::new();
            for candidate in COMPLEX {
                let active = if candidate == Section::Joint {
                    joint
                } else {
                    scen.iter().any(|s| s.target_section() == candidate)
                };
                if active {
                    expected.push(candidate);
                }
            }
            prop_assert_eq!(middle, &expected[..]);
        }

        /// can_review never depends on optional-section completion
        #[test]
        fn can_review_ignores_complex_sections(
            scen in proptest::collection::btree_set(arb_scenario(), 0..=4),
            complex_done in any::<bool>(),
        ) {
            let mut done = complete(&REQUIRED_FOR_REVIEW);
            for section in COMPLEX {
                done.insert(section, complex_done);
            }
            let progress = Progress::compute(&ProgressInput {
                sections_complete: &done,
                current_section: Section::Review,
                scenarios: &scen,
                has_joint_config: false,
            });
            prop_assert!(progress.can_review);
        }
    }
}
