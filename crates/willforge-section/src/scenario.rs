//! Complex estate scenarios that activate optional sections

use crate::section::Section;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A detected or opted-in condition that activates an optional section.
///
/// Scenarios come from the remote analysis service or from user opt-in;
/// the joint-will section is the one optional section not scenario-driven
/// (it activates from a configured joint-will block in the draft).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Step-children or children from prior relationships
    BlendedFamily,
    /// Minor beneficiaries needing a testamentary trust
    TestamentaryTrust,
    /// Property plus a surviving spouse
    Usufruct,
    /// Business interests in the estate
    BusinessAssets,
}

impl Scenario {
    /// The optional section this scenario activates
    #[must_use]
    pub fn target_section(self) -> Section {
        match self {
            Scenario::BlendedFamily | Scenario::TestamentaryTrust => Section::Trust,
            Scenario::Usufruct => Section::Usufruct,
            Scenario::BusinessAssets => Section::Business,
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Scenario::BlendedFamily => "Blended Family",
            Scenario::TestamentaryTrust => "Testamentary Trust",
            Scenario::Usufruct => "Usufruct",
            Scenario::BusinessAssets => "Business Assets",
        }
    }

    /// One-line explanation shown when the scenario is detected
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Scenario::BlendedFamily => {
                "Your family situation may benefit from specific provisions for step-children"
            }
            Scenario::TestamentaryTrust => {
                "You have minor beneficiaries who will need a testamentary trust"
            }
            Scenario::Usufruct => "You have property and a spouse, a usufruct can protect both",
            Scenario::BusinessAssets => {
                "Your business interests need special provisions in your will"
            }
        }
    }

    /// Stable wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::BlendedFamily => "blended_family",
            Scenario::TestamentaryTrust => "testamentary_trust",
            Scenario::Usufruct => "usufruct",
            Scenario::BusinessAssets => "business_assets",
        }
    }

    /// Scenarios a user can manually opt into (blended-family is
    /// detection-only; its provisions ride on the trust section)
    #[must_use]
    pub fn opt_in_choices() -> [Scenario; 3] {
        [
            Scenario::TestamentaryTrust,
            Scenario::Usufruct,
            Scenario::BusinessAssets,
        ]
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown scenario wire name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario: {0}")]
pub struct ParseScenarioError(pub String);

impl FromStr for Scenario {
    type Err = ParseScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blended_family" => Ok(Scenario::BlendedFamily),
            "testamentary_trust" => Ok(Scenario::TestamentaryTrust),
            "usufruct" => Ok(Scenario::Usufruct),
            "business_assets" => Ok(Scenario::BusinessAssets),
            other => Err(ParseScenarioError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_trust_scenarios_target_trust_section() {
        assert_eq!(Scenario::BlendedFamily.target_section(), Section::Trust);
        assert_eq!(Scenario::TestamentaryTrust.target_section(), Section::Trust);
    }

    #[test]
    fn wire_names_roundtrip() {
        for scenario in [
            Scenario::BlendedFamily,
            Scenario::TestamentaryTrust,
            Scenario::Usufruct,
            Scenario::BusinessAssets,
        ] {
            let parsed: Scenario = scenario.as_str().parse().unwrap();
            assert_eq!(parsed, scenario);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Scenario::BusinessAssets).unwrap();
        assert_eq!(json, "\"business_assets\"");
    }
}
