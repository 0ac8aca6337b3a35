//! Domain layer: Core clinical types and the risk calculation engine.
//!
//! Pure Rust types and functions with no I/O. Every entity is built fresh
//! for a calculation and discarded afterwards.

mod assessment;
mod evidence;
mod patient;
pub mod risk;
mod therapy;

pub use assessment::{Assessment, Recommendation};
pub use evidence::{evidence_for, evidence_for_identifier, Evidence, EVIDENCE_TABLE};
pub use patient::{PatientProfile, Sex};
pub use risk::{
    assess_risk, convert_to_five_year, estimate_lifetime_risk, estimate_ten_year_risk,
    project_ldl, Estimate, RiskError, RiskResult,
};
pub use therapy::{
    Therapy, TherapyError, TherapySelection, ADD_ON_LDL_THRESHOLD, LDL_FLOOR, NO_THERAPY,
};
