//! Typed per-section payloads
//!
//! The aggregate stores section data as schema-light JSON records; this
//! module is the tagged union used at the boundary where a section is
//! rendered or validated, so type safety is regained at the point of
//! use without fighting the backend's generic storage.

use serde::{Deserialize, Serialize};
use willforge_section::Section;

/// South African marital regimes recognised by the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    MarriedInCommunity,
    MarriedAnc,
    MarriedCop,
    Divorced,
    Widowed,
}

/// South African provinces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Province {
    EC,
    FS,
    GP,
    KZN,
    LP,
    MP,
    NC,
    NW,
    WC,
}

/// Testator personal details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Testator {
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub date_of_birth: String,
    pub address: String,
    pub city: String,
    pub province: Province,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
}

/// Marital status block captured alongside personal details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MaritalInfo {
    pub status: MaritalStatus,
    #[serde(default)]
    pub spouse_first_name: Option<String>,
    #[serde(default)]
    pub spouse_last_name: Option<String>,
    #[serde(default)]
    pub spouse_id_number: Option<String>,
    #[serde(default)]
    pub married_outside_sa: bool,
    #[serde(default)]
    pub marriage_country: Option<String>,
}

/// A beneficiary of the estate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Beneficiary {
    pub id: String,
    pub full_name: String,
    pub relationship: String,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub share_percent: Option<f64>,
    #[serde(default)]
    pub alternate_beneficiary: Option<String>,
    #[serde(default)]
    pub is_charity: bool,
}

/// Asset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Property,
    Vehicle,
    BankAccount,
    Investment,
    Insurance,
    Business,
    Other,
}

/// One item of the estate inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Asset {
    pub id: String,
    pub asset_type: AssetType,
    pub description: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Guardian nominated for minor children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Guardian {
    pub id: String,
    pub full_name: String,
    pub relationship: String,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Executor appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutorInfo {
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub is_professional: bool,
    #[serde(default)]
    pub backup_name: Option<String>,
    #[serde(default)]
    pub backup_relationship: Option<String>,
}

/// A specific bequest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Bequest {
    pub id: String,
    pub item_description: String,
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_relationship: Option<String>,
}

/// Share of the residue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResidueBeneficiary {
    pub name: String,
    pub share_percent: f64,
}

/// Residue of the estate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResidueInfo {
    pub beneficiaries: Vec<ResidueBeneficiary>,
    #[serde(default)]
    pub simultaneous_death_clause: Option<String>,
}

/// A trustee of a testamentary trust
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Trustee {
    pub name: String,
    #[serde(default)]
    pub id_number: Option<String>,
    pub relationship: String,
}

/// Testamentary trust provisions for minor beneficiaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrustProvisions {
    pub trust_name: String,
    pub minor_beneficiaries: Vec<String>,
    pub vesting_age: u8,
    pub trustees: Vec<Trustee>,
    #[serde(default)]
    pub income_for_maintenance: bool,
    #[serde(default)]
    pub capital_for_education: bool,
}

/// Bare dominium holder under a usufruct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BareDominiumHolder {
    pub name: String,
    #[serde(default)]
    pub id_number: Option<String>,
    pub share_percent: f64,
}

/// Usufruct provision over a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UsufructProvision {
    pub property_description: String,
    pub usufructuary_name: String,
    #[serde(default)]
    pub usufructuary_id_number: Option<String>,
    pub bare_dominium_holders: Vec<BareDominiumHolder>,
    /// "lifetime" or a fixed term description
    pub duration: String,
}

/// Forms of business interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    CcMemberInterest,
    CompanyShares,
    Partnership,
}

/// One business interest with succession details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BusinessAssetDetail {
    pub id: String,
    pub business_name: String,
    pub business_type: BusinessType,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub percentage_held: Option<f64>,
    #[serde(default)]
    pub heir_name: Option<String>,
    #[serde(default)]
    pub heir_relationship: Option<String>,
    #[serde(default)]
    pub has_buy_sell_agreement: bool,
    #[serde(default)]
    pub has_association_agreement: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Mutual vs mirror joint-will structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WillStructure {
    Mutual,
    Mirror,
}

/// Joint will configuration with a co-testator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JointWillConfig {
    pub co_testator_first_name: String,
    pub co_testator_last_name: String,
    pub co_testator_id_number: String,
    pub will_structure: WillStructure,
    #[serde(default)]
    pub massing: bool,
    #[serde(default)]
    pub irrevocability_acknowledged: bool,
}

/// Personal section payload: testator details plus the marital block.
/// Either half may be absent while the form is mid-entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PersonalDetails {
    #[serde(default)]
    pub testator: Option<Testator>,
    #[serde(default)]
    pub marital: Option<MaritalInfo>,
}

/// Tagged union of section payloads, keyed by section identifier.
///
/// Used wherever one section's data is rendered or validated; the
/// aggregate itself stores plain JSON records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "data", rename_all = "snake_case")]
pub enum SectionPayload {
    Personal(PersonalDetails),
    Beneficiaries(Vec<Beneficiary>),
    Assets(Vec<Asset>),
    Guardians(Vec<Guardian>),
    Executor(ExecutorInfo),
    Bequests(Vec<Bequest>),
    Residue(ResidueInfo),
    Trust(TrustProvisions),
    Usufruct(UsufructProvision),
    Business(Vec<BusinessAssetDetail>),
    Joint(JointWillConfig),
}

/// Payload / section mismatch or decode failure
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The JSON record does not match the section's expected shape
    #[error("invalid {section} payload: {source}")]
    Invalid {
        section: Section,
        #[source]
        source: serde_json::Error,
    },
    /// The section has no typed payload shape (review)
    #[error("section {0} carries no payload")]
    NoPayload(Section),
}

impl SectionPayload {
    /// The section this payload belongs to
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            SectionPayload::Personal(_) => Section::Personal,
            SectionPayload::Beneficiaries(_) => Section::Beneficiaries,
            SectionPayload::Assets(_) => Section::Assets,
            SectionPayload::Guardians(_) => Section::Guardians,
            SectionPayload::Executor(_) => Section::Executor,
            SectionPayload::Bequests(_) => Section::Bequests,
            SectionPayload::Residue(_) => Section::Residue,
            SectionPayload::Trust(_) => Section::Trust,
            SectionPayload::Usufruct(_) => Section::Usufruct,
            SectionPayload::Business(_) => Section::Business,
            SectionPayload::Joint(_) => Section::Joint,
        }
    }

    /// Decode a raw JSON record as the payload of `section`.
    ///
    /// # Errors
    /// `PayloadError::Invalid` when the record does not match the
    /// section's shape; `PayloadError::NoPayload` for review.
    pub fn from_value(section: Section, value: serde_json::Value) -> Result<Self, PayloadError> {
        let invalid = |source| PayloadError::Invalid { section, source };
        match section {
            Section::Personal => serde_json::from_value(value)
                .map(SectionPayload::Personal)
                .map_err(invalid),
            Section::Beneficiaries => serde_json::from_value(value)
                .map(SectionPayload::Beneficiaries)
                .map_err(invalid),
            Section::Assets => serde_json::from_value(value)
                .map(SectionPayload::Assets)
                .map_err(invalid),
            Section::Guardians => serde_json::from_value(value)
                .map(SectionPayload::Guardians)
                .map_err(invalid),
            Section::Executor => serde_json::from_value(value)
                .map(SectionPayload::Executor)
                .map_err(invalid),
            Section::Bequests => serde_json::from_value(value)
                .map(SectionPayload::Bequests)
                .map_err(invalid),
            Section::Residue => serde_json::from_value(value)
                .map(SectionPayload::Residue)
                .map_err(invalid),
            Section::Trust => serde_json::from_value(value)
                .map(SectionPayload::Trust)
                .map_err(invalid),
            Section::Usufruct => serde_json::from_value(value)
                .map(SectionPayload::Usufruct)
                .map_err(invalid),
            Section::Business => serde_json::from_value(value)
                .map(SectionPayload::Business)
                .map_err(invalid),
            Section::Joint => serde_json::from_value(value)
                .map(SectionPayload::Joint)
                .map_err(invalid),
            Section::Review => Err(PayloadError::NoPayload(section)),
        }
    }

    /// Encode back into the aggregate's generic record form.
    ///
    /// # Panics
    /// Never: all payload types serialize to JSON.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        let wrapped = serde_json::to_value(self).unwrap_or_default();
        wrapped
            .get("data")
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn beneficiaries_from_generic_record() {
        let raw = json!([{
            "id": "b1",
            "full_name": "Thandi Nkosi",
            "relationship": "daughter",
            "share_percent": 50.0,
            "is_charity": false
        }]);
        let payload = SectionPayload::from_value(Section::Beneficiaries, raw).unwrap();
        match &payload {
            SectionPayload::Beneficiaries(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].full_name, "Thandi Nkosi");
                assert_eq!(list[0].share_percent, Some(50.0));
            }
            other => panic!("wrong variant: {other:?}"),
        }
        assert_eq!(payload.section(), Section::Beneficiaries);
    }

    #[test]
    fn wrong_shape_is_invalid() {
        let raw = json!({"name": "not a list"});
        let err = SectionPayload::from_value(Section::Beneficiaries, raw).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::Invalid {
                section: Section::Beneficiaries,
                ..
            }
        ));
    }

    #[test]
    fn review_has_no_payload() {
        let err = SectionPayload::from_value(Section::Review, json!({})).unwrap_err();
        assert!(matches!(err, PayloadError::NoPayload(Section::Review)));
    }

    #[test]
    fn into_value_strips_the_tag() {
        let payload = SectionPayload::Executor(ExecutorInfo {
            name: "Sipho Dlamini".into(),
            relationship: Some("brother".into()),
            is_professional: false,
            backup_name: None,
            backup_relationship: None,
        });
        let value = payload.clone().into_value();
        assert_eq!(value["name"], "Sipho Dlamini");
        assert!(value.get("section").is_none());

        let back = SectionPayload::from_value(Section::Executor, value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn joint_config_roundtrip() {
        let raw = json!({
            "co_testator_first_name": "Anna",
            "co_testator_last_name": "Botha",
            "co_testator_id_number": "8001014800082",
            "will_structure": "mutual",
            "massing": true,
            "irrevocability_acknowledged": true
        });
        let payload = SectionPayload::from_value(Section::Joint, raw).unwrap();
        match payload {
            SectionPayload::Joint(cfg) => {
                assert_eq!(cfg.will_structure, WillStructure::Mutual);
                assert!(cfg.massing);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn partial_personal_details_decode() {
        let raw = json!({
            "marital": {
                "status": "married_anc",
                "married_outside_sa": false
            }
        });
        let payload = SectionPayload::from_value(Section::Personal, raw).unwrap();
        match payload {
            SectionPayload::Personal(details) => {
                assert!(details.testator.is_none());
                assert_eq!(details.marital.unwrap().status, MaritalStatus::MarriedAnc);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
