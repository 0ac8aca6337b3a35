//! # Lipidwise
//!
//! Cardiovascular risk and LDL projection for a lipid-lowering therapy
//! questionnaire.
//!
//! This crate provides:
//! - A pure risk calculation engine (projected LDL, 5-year, 10-year and
//!   lifetime CVD risk, ARR/RRR)
//! - A static evidence table for recommended therapies
//! - An explicit wizard session object for hosts that render the form
//! - Plain-text and JSON report export
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core clinical types and the risk engine
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (report formats, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven runtime settings
//!
//! The risk estimates are illustrative heuristics, not a validated clinical
//! model.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{
    convert_to_five_year, estimate_lifetime_risk, estimate_ten_year_risk, project_ldl, Estimate,
    PatientProfile, RiskResult, Sex, Therapy, TherapySelection,
};

/// Result type for Lipidwise operations
pub type Result<T> = std::result::Result<T, LipidwiseError>;

/// Main error type for Lipidwise
#[derive(Debug, thiserror::Error)]
pub enum LipidwiseError {
    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Invalid therapy selection: {0}")]
    Therapy(#[from] domain::TherapyError),

    #[error("Risk calculation failed: {0}")]
    Risk(#[from] domain::RiskError),

    #[error("Report export failed: {0}")]
    Export(#[from] ports::ExportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
