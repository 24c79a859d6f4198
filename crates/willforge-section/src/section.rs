//! Section identifiers and the static section catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One logical unit of the will draft, independently completable.
///
/// Wire names are stable snake_case strings shared with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Testator personal details plus marital status
    Personal,
    /// Who inherits
    Beneficiaries,
    /// Estate inventory
    Assets,
    /// Guardians for minor children
    Guardians,
    /// Executor appointment
    Executor,
    /// Specific bequests
    Bequests,
    /// Residue of the estate
    Residue,
    /// Testamentary trust provisions (optional)
    Trust,
    /// Usufruct provision (optional)
    Usufruct,
    /// Business asset provisions (optional)
    Business,
    /// Joint will configuration (optional)
    Joint,
    /// Trailing review pseudo-section
    Review,
}

/// Base sections always present in the wizard, in navigation order
pub const BASE: [Section; 7] = [
    Section::Personal,
    Section::Beneficiaries,
    Section::Assets,
    Section::Guardians,
    Section::Executor,
    Section::Bequests,
    Section::Residue,
];

/// Optional sections in canonical navigation order
pub const COMPLEX: [Section; 4] = [
    Section::Trust,
    Section::Usufruct,
    Section::Business,
    Section::Joint,
];

/// Sections that must be complete before the will can be reviewed,
/// independent of any optional section
pub const REQUIRED_FOR_REVIEW: [Section; 4] = [
    Section::Personal,
    Section::Beneficiaries,
    Section::Executor,
    Section::Residue,
];

impl Section {
    /// Stable wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Personal => "personal",
            Section::Beneficiaries => "beneficiaries",
            Section::Assets => "assets",
            Section::Guardians => "guardians",
            Section::Executor => "executor",
            Section::Bequests => "bequests",
            Section::Residue => "residue",
            Section::Trust => "trust",
            Section::Usufruct => "usufruct",
            Section::Business => "business",
            Section::Joint => "joint",
            Section::Review => "review",
        }
    }

    /// Display label for navigation UIs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Section::Personal => "Personal",
            Section::Beneficiaries => "Beneficiaries",
            Section::Assets => "Assets",
            Section::Guardians => "Guardians",
            Section::Executor => "Executor",
            Section::Bequests => "Bequests",
            Section::Residue => "Residue",
            Section::Trust => "Trust",
            Section::Usufruct => "Usufruct",
            Section::Business => "Business",
            Section::Joint => "Joint Will",
            Section::Review => "Review",
        }
    }

    /// Whether this is one of the optional complex sections
    #[inline]
    #[must_use]
    pub fn is_complex(self) -> bool {
        COMPLEX.contains(&self)
    }

    /// Whether this section is driven by the AI conversation
    /// (as opposed to a client-side input form)
    #[inline]
    #[must_use]
    pub fn is_conversational(self) -> bool {
        matches!(
            self,
            Section::Beneficiaries
                | Section::Assets
                | Section::Guardians
                | Section::Executor
                | Section::Bequests
                | Section::Residue
        )
    }

    /// Whether this section is captured purely client-side before a
    /// backing draft record exists
    #[inline]
    #[must_use]
    pub fn is_form_based(self) -> bool {
        matches!(self, Section::Personal)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown section wire name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct ParseSectionError(pub String);

impl FromStr for Section {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Section::Personal),
            "beneficiaries" => Ok(Section::Beneficiaries),
            "assets" => Ok(Section::Assets),
            "guardians" => Ok(Section::Guardians),
            "executor" => Ok(Section::Executor),
            "bequests" => Ok(Section::Bequests),
            "residue" => Ok(Section::Residue),
            "trust" => Ok(Section::Trust),
            "usufruct" => Ok(Section::Usufruct),
            "business" => Ok(Section::Business),
            "joint" => Ok(Section::Joint),
            "review" => Ok(Section::Review),
            other => Err(ParseSectionError(other.to_string())),
        }
    }
}

/// Catalog entry: section key plus display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMeta {
    /// Section key
    pub section: Section,
    /// Display label
    pub label: &'static str,
}

/// Static ordered catalog of the base sections
pub const BASE_SECTIONS: [SectionMeta; 7] = [
    SectionMeta { section: Section::Personal, label: "Personal" },
    SectionMeta { section: Section::Beneficiaries, label: "Beneficiaries" },
    SectionMeta { section: Section::Assets, label: "Assets" },
    SectionMeta { section: Section::Guardians, label: "Guardians" },
    SectionMeta { section: Section::Executor, label: "Executor" },
    SectionMeta { section: Section::Bequests, label: "Bequests" },
    SectionMeta { section: Section::Residue, label: "Residue" },
];

/// The ordered base-section catalog
#[inline]
#[must_use]
pub fn registry() -> &'static [SectionMeta] {
    &BASE_SECTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_roundtrip() {
        for meta in BASE_SECTIONS {
            let parsed: Section = meta.section.as_str().parse().unwrap();
            assert_eq!(parsed, meta.section);
        }
        for section in COMPLEX {
            let parsed: Section = section.as_str().parse().unwrap();
            assert_eq!(parsed, section);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "attic".parse::<Section>().unwrap_err();
        assert_eq!(err, ParseSectionError("attic".to_string()));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Section::Joint).unwrap();
        assert_eq!(json, "\"joint\"");
        let back: Section = serde_json::from_str("\"usufruct\"").unwrap();
        assert_eq!(back, Section::Usufruct);
    }

    #[test]
    fn conversational_sections_exclude_forms_and_review() {
        assert!(!Section::Personal.is_conversational());
        assert!(!Section::Review.is_conversational());
        assert!(Section::Beneficiaries.is_conversational());
        assert!(Section::Residue.is_conversational());
    }

    #[test]
    fn catalog_order_matches_base() {
        let from_catalog: Vec<Section> = BASE_SECTIONS.iter().map(|m| m.section).collect();
        assert_eq!(from_catalog, BASE.to_vec());
    }
}
