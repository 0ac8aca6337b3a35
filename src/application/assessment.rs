//! Assessment service: Orchestrates one risk calculation.
//!
//! This service coordinates:
//! - Input validation
//! - LDL projection for the chosen regimens
//! - Risk estimation at every horizon
//! - Report export

use std::sync::Arc;

use crate::domain::{assess_risk, Assessment, PatientProfile, TherapySelection};
use crate::ports::ReportExporter;
use crate::{LipidwiseError, Result};

/// Service for running assessments and exporting their reports.
pub struct AssessmentService<E>
where
    E: ReportExporter,
{
    exporter: Arc<E>,
}

impl<E> AssessmentService<E>
where
    E: ReportExporter,
{
    /// Create a new assessment service.
    pub fn new(exporter: Arc<E>) -> Self {
        Self { exporter }
    }

    #[must_use]
    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// Run the full calculation for a patient.
    ///
    /// Performs:
    /// 1. Validate the profile and therapy selection
    /// 2. Project LDL after therapy
    /// 3. Estimate risk with the pre-admission therapy count as burden
    ///
    /// # Errors
    /// Returns `LipidwiseError::Validation` for out-of-range answers,
    /// `LipidwiseError::Therapy` for regimens the form cannot produce
    /// (including add-on agents without eligibility) and
    /// `LipidwiseError::Risk` for inputs outside the formula's domain.
    pub fn assess(
        &self,
        profile: PatientProfile,
        therapies: TherapySelection,
    ) -> Result<Assessment> {
        profile
            .validate()
            .map_err(|errors| LipidwiseError::Validation(errors.join("; ")))?;
        therapies.validate(profile.baseline_ldl)?;

        tracing::debug!("Step 1: Projecting LDL...");
        let projected_ldl = therapies.projected_ldl(profile.baseline_ldl);
        tracing::debug!(
            "Projected LDL {:.2} -> {:.2} mmol/L over {} therapies",
            profile.baseline_ldl,
            projected_ldl,
            therapies.iter().count()
        );

        tracing::debug!("Step 2: Estimating risk...");
        let vasc = therapies.prior_therapy_count();
        let risk = assess_risk(&profile, vasc)?;

        let assessment = Assessment::new(profile, therapies, projected_ldl, risk);

        tracing::info!(
            "Assessment complete: 10y={:.1}%, 5y={:.1}%, lifetime={}",
            assessment.risk.ten_year,
            assessment.risk.five_year,
            assessment
                .risk
                .lifetime
                .value()
                .map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}%"))
        );

        Ok(assessment)
    }

    /// Render the report for a completed assessment.
    ///
    /// # Errors
    /// Returns `LipidwiseError::Export` if the exporter fails.
    pub fn export(&self, assessment: &Assessment) -> Result<Vec<u8>> {
        let bytes = self.exporter.export(assessment)?;
        tracing::info!(
            "Exported {} report ({} bytes)",
            self.exporter.media_type(),
            bytes.len()
        );
        Ok(bytes)
    }
}
