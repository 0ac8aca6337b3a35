//! Completed assessment record handed to report exporters.

use serde::Serialize;

use super::{evidence_for, Evidence, PatientProfile, RiskResult, Therapy, TherapySelection};

/// A therapy from the intensified regimen with its supporting trial.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub therapy: Therapy,
    pub evidence: Evidence,
}

/// Everything computed for one patient in one session.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// Report identifier, e.g. `CVD-1f3a9c0e42b7d615`
    pub id: String,

    pub profile: PatientProfile,

    pub therapies: TherapySelection,

    /// Number of pre-admission therapies used as the risk burden term
    pub prior_therapy_count: u32,

    /// LDL after every selected therapy (mmol/L)
    pub projected_ldl: f64,

    /// Whether PCSK9 inhibitor / inclisiran could be added
    pub add_on_eligible: bool,

    pub risk: RiskResult,

    pub recommendations: Vec<Recommendation>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Assemble a record from the computed parts, stamping id and time.
    #[must_use]
    pub fn new(
        profile: PatientProfile,
        therapies: TherapySelection,
        projected_ldl: f64,
        risk: RiskResult,
    ) -> Self {
        let recommendations = therapies
            .intensified
            .iter()
            .map(|&therapy| Recommendation {
                therapy,
                evidence: *evidence_for(therapy),
            })
            .collect();

        Self {
            id: report_id(),
            prior_therapy_count: therapies.prior_therapy_count(),
            add_on_eligible: therapies.add_on_eligible(profile.baseline_ldl),
            profile,
            therapies,
            projected_ldl,
            risk,
            recommendations,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Random 64-bit report id drawn from an OS-seeded ChaCha20 generator.
fn report_id() -> String {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    format!("CVD-{:016x}", rng.gen::<u64>())
}
