//! Section registry and progress computation for the will wizard
//!
//! Provides the fixed building blocks the wizard navigates over:
//! - The ordered section catalog (seven base sections, four optional
//!   "complex" sections, trailing review)
//! - The scenario catalog that activates optional sections
//! - Pure progress computation over draft completion state
//!
//! Everything in this crate is a pure function of its inputs; no I/O,
//! no error conditions beyond string parsing.

#![warn(unreachable_pub)]

pub mod progress;
pub mod scenario;
pub mod section;

pub use progress::{
    active_complex_sections, first_complex_section, Progress, ProgressInput, SectionEntry,
};
pub use scenario::{ParseScenarioError, Scenario};
pub use section::{
    registry, ParseSectionError, Section, SectionMeta, BASE, BASE_SECTIONS, COMPLEX,
    REQUIRED_FOR_REVIEW,
};
