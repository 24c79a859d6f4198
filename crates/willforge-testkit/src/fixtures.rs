//! Draft and report fixtures

use serde_json::json;
use willforge_draft::{
    AttorneyReferral, DraftState, SectionResult, SectionStatus, Severity, VerificationIssue,
    VerificationReport,
};
use willforge_section::{Section, BASE};

/// Valid personal-section record (testator plus marital block)
#[must_use]
pub fn personal_payload() -> serde_json::Value {
    json!({
        "testator": {
            "first_name": "Thandi",
            "last_name": "Nkosi",
            "id_number": "8001015009087",
            "date_of_birth": "1980-01-01",
            "address": "12 Vilakazi Street",
            "city": "Johannesburg",
            "province": "GP",
            "postal_code": "1804",
            "phone": "+27 82 000 0000",
            "email": "thandi@example.co.za"
        },
        "marital": {"status": "married_anc"}
    })
}

/// A draft with every base section filled and complete, current
/// section on the last base section. No id assigned.
#[must_use]
pub fn base_complete_draft() -> DraftState {
    let mut draft = DraftState::default();
    draft.set_payload(Section::Personal, personal_payload());
    draft.set_payload(
        Section::Beneficiaries,
        json!([
            {"id": "b1", "full_name": "Sipho Nkosi", "relationship": "son"},
            {"id": "b2", "full_name": "Lerato Nkosi", "relationship": "daughter"}
        ]),
    );
    draft.set_payload(
        Section::Assets,
        json!([
            {"id": "a1", "asset_type": "property", "description": "House in Soweto"}
        ]),
    );
    draft.set_payload(Section::Guardians, json!([]));
    draft.set_payload(Section::Executor, json!({"name": "Naledi Dlamini"}));
    draft.set_payload(Section::Bequests, json!([]));
    draft.set_payload(
        Section::Residue,
        json!({"beneficiaries": [
            {"name": "Sipho Nkosi", "share_percent": 50.0},
            {"name": "Lerato Nkosi", "share_percent": 50.0}
        ]}),
    );
    for section in BASE {
        draft.mark_complete(section);
    }
    draft.set_current_section(Section::Residue);
    draft
}

/// A report with two warnings and no errors, so proceeding requires
/// acknowledging both codes
#[must_use]
pub fn warning_report() -> VerificationReport {
    let residue = VerificationIssue {
        code: "W-RESIDUE-SHARES".to_string(),
        severity: Severity::Warning,
        section: Section::Residue,
        title: "Residue shares may be uneven".to_string(),
        explanation: "The residue is split unevenly between children.".to_string(),
        suggestion: "Confirm the split is intentional.".to_string(),
    };
    let guardian = VerificationIssue {
        code: "W-GUARDIAN-NONE".to_string(),
        severity: Severity::Warning,
        section: Section::Guardians,
        title: "No guardian nominated".to_string(),
        explanation: "Minor beneficiaries exist but no guardian is nominated.".to_string(),
        suggestion: "Nominate a guardian for minor children.".to_string(),
    };

    VerificationReport {
        overall_status: SectionStatus::Warning,
        sections: vec![
            SectionResult {
                section: Section::Personal,
                status: SectionStatus::Pass,
                issues: vec![],
            },
            SectionResult {
                section: Section::Residue,
                status: SectionStatus::Warning,
                issues: vec![residue],
            },
            SectionResult {
                section: Section::Guardians,
                status: SectionStatus::Warning,
                issues: vec![guardian],
            },
        ],
        attorney_referral: AttorneyReferral::default(),
        summary: "Two warnings found.".to_string(),
    }
}
