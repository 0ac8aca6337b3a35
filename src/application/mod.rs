//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the questionnaire's use cases.

mod assessment;
mod request;
mod session;

pub use assessment::AssessmentService;
pub use request::{AssessmentRequest, TherapyInput};
pub use session::{AssessmentSession, RegimenForm, WizardStep};
