//! Wizard orchestration for the will-drafting flow
//!
//! Ties the leaf crates together:
//! - [`WizardNavigator`] owns the draft and moves the user through
//!   the ordered section list, creating the backing record lazily
//! - [`ScenarioGate`] runs one-shot scenario detection between the
//!   base sections and the optional ones
//! - [`VerificationGate`] streams the compliance check and enforces
//!   the acknowledge-to-proceed rule
//!
//! Local draft state is authoritative throughout; remote mirrors of
//! completion flags and the section pointer are best-effort and
//! observable as [`SyncEvent`]s.

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod navigator;
pub mod scenario;
pub mod verification;

pub use config::WizardConfig;
pub use error::WizardError;
pub use navigator::{DraftCreator, SyncEvent, SyncKind, WizardNavigator, WizardView};
pub use scenario::{GateState, ScenarioGate};
pub use verification::{CheckProgress, VerificationGate};
