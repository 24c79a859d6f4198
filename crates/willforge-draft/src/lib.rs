//! Draft data model for the will wizard
//!
//! Holds everything the wizard mutates:
//! - The draft aggregate (payloads, completion flags, scenarios,
//!   verification state, current-section pointer)
//! - Typed per-section payloads (tagged union at the boundary,
//!   schema-light JSON records in the aggregate)
//! - Conversation transcripts scoped to one (draft, section) pair
//! - The structured verification report and its gating rule

#![warn(unreachable_pub)]

pub mod draft;
pub mod payload;
pub mod transcript;
pub mod verification;

pub use draft::{DraftId, DraftKind, DraftState};
pub use payload::{
    Asset, AssetType, BareDominiumHolder, Beneficiary, Bequest, BusinessAssetDetail,
    BusinessType, ExecutorInfo, Guardian, JointWillConfig, MaritalInfo, MaritalStatus,
    PayloadError, PersonalDetails, Province, ResidueBeneficiary, ResidueInfo, SectionPayload,
    Testator, TrustProvisions, Trustee, UsufructProvision, WillStructure,
};
pub use transcript::{Message, Role, Transcript};
pub use verification::{
    AttorneyReferral, SectionResult, SectionStatus, Severity, VerificationIssue,
    VerificationReport,
};
