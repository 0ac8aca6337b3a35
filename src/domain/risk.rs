//! Risk calculation engine.
//!
//! Closed-form, side-effect-free functions for projected LDL and
//! cardiovascular risk at 5-year, 10-year and lifetime horizons. Every
//! percentage is clamped to `[0, MAX_RISK_PCT]` and rounded to one decimal.
//! The horizon converters take the rounded 10-year value so that displayed
//! numbers can be reproduced by hand.

use serde::{Deserialize, Serialize};

use super::patient::PatientProfile;
use super::therapy::{apply_reductions, reduction_for_identifier};

/// Upper bound for any reported risk percentage.
pub const MAX_RISK_PCT: f64 = 95.0;

/// Age at which the lifetime horizon ends.
pub const LIFETIME_HORIZON_AGE: u32 = 85;

/// Baseline 10-year survival of the hazard model.
const BASELINE_SURVIVAL: f64 = 0.900;

/// Centering constant subtracted from the linear predictor.
const LP_OFFSET: f64 = 5.8;

/// Errors raised by the engine for inputs outside the formula's domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("CRP {0} outside the log domain (must be > -1)")]
    CrpDomain(f64),

    #[error("Non-finite input: {0}")]
    NonFinite(&'static str),
}

/// A derived value that may be undefined for the patient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Estimate {
    Value(f64),
    NotApplicable,
}

impl Estimate {
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotApplicable => None,
        }
    }

    #[must_use]
    pub fn is_applicable(self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Option<f64>> for Estimate {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::NotApplicable, Self::Value)
    }
}

/// Risk estimates for one patient at every horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub five_year: f64,
    pub ten_year: f64,
    pub lifetime: Estimate,
    /// Absolute risk reduction over 10 years, in percentage points
    pub absolute_reduction: Estimate,
    /// Relative risk reduction, in percent
    pub relative_reduction: Estimate,
}

/// Round to one decimal place.
#[must_use]
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn cap(pct: f64) -> f64 {
    pct.clamp(0.0, MAX_RISK_PCT)
}

/// Project LDL after applying each recognised therapy in `pre` then `new`.
///
/// Identifiers without a reduction factor ("None", icosapent ethyl,
/// semaglutide, anything unrecognised) are skipped. Identifiers must match a
/// display name exactly. The result never falls below 0.5 mmol/L.
pub fn project_ldl<S: AsRef<str>>(baseline_ldl: f64, pre: &[S], new: &[S]) -> f64 {
    let factors = pre.iter().chain(new.iter()).filter_map(|id| {
        let factor = reduction_for_identifier(id.as_ref());
        if factor.is_none() {
            tracing::debug!("No LDL reduction for '{}', skipping", id.as_ref());
        }
        factor
    });
    apply_reductions(baseline_ldl, factors)
}

/// Ten-year CVD risk in percent.
///
/// `vasc` is the count of prior or concurrent risk-modifying therapies.
///
/// # Errors
/// Returns `RiskError::CrpDomain` when `crp <= -1`, and
/// `RiskError::NonFinite` for NaN or infinite measurements.
pub fn estimate_ten_year_risk(profile: &PatientProfile, vasc: u32) -> Result<f64, RiskError> {
    let measurements = [
        ("total_cholesterol", profile.total_cholesterol),
        ("hdl", profile.hdl),
        ("crp", profile.crp),
    ];
    if let Some((name, _)) = measurements.iter().find(|(_, v)| !v.is_finite()) {
        return Err(RiskError::NonFinite(*name));
    }
    if profile.crp <= -1.0 {
        return Err(RiskError::CrpDomain(profile.crp));
    }

    let smoker = if profile.smoker { 1.0 } else { 0.0 };
    let diabetic = if profile.diabetic { 1.0 } else { 0.0 };
    let crp_log = (profile.crp + 1.0).ln();

    let lp = 0.064 * f64::from(profile.age)
        + 0.34 * profile.sex.indicator()
        + 0.02 * f64::from(profile.systolic_bp)
        + 0.25 * profile.total_cholesterol
        - 0.25 * profile.hdl
        + 0.44 * smoker
        + 0.51 * diabetic
        - 0.2 * (f64::from(profile.egfr) / 10.0)
        + 0.25 * crp_log
        + 0.4 * f64::from(vasc);

    let raw = 1.0 - BASELINE_SURVIVAL.powf((lp - LP_OFFSET).exp());
    Ok(round1(cap(raw * 100.0)))
}

/// Five-year risk from a ten-year risk under a constant annual hazard.
#[must_use]
pub fn convert_to_five_year(ten_year_pct: f64) -> f64 {
    let p = ten_year_pct.min(MAX_RISK_PCT) / 100.0;
    round1(cap((1.0 - (1.0 - p).powf(0.5)) * 100.0))
}

/// Risk accumulated from `age` to 85 at the annual hazard implied by the
/// ten-year risk. Not applicable at 85 and over.
#[must_use]
pub fn estimate_lifetime_risk(age: u32, ten_year_pct: f64) -> Estimate {
    if age >= LIFETIME_HORIZON_AGE {
        return Estimate::NotApplicable;
    }
    let years = f64::from(LIFETIME_HORIZON_AGE - age);
    let p10 = ten_year_pct.min(MAX_RISK_PCT) / 100.0;
    let annual = 1.0 - (1.0 - p10).powf(1.0 / 10.0);
    Estimate::Value(round1(cap((1.0 - (1.0 - annual).powf(years)) * 100.0)))
}

/// Ten-year minus lifetime risk, in percentage points.
#[must_use]
pub fn absolute_risk_reduction(ten_year_pct: f64, lifetime: Estimate) -> Estimate {
    lifetime
        .value()
        .map(|lifetime_pct| round1(ten_year_pct - lifetime_pct))
        .into()
}

/// ARR as a percentage of the ten-year risk.
#[must_use]
pub fn relative_risk_reduction(ten_year_pct: f64, arr: Estimate) -> Estimate {
    match arr {
        Estimate::Value(arr) if ten_year_pct != 0.0 => {
            Estimate::Value(round1(arr / ten_year_pct * 100.0))
        }
        _ => Estimate::NotApplicable,
    }
}

/// Compute every horizon and the derived metrics for one patient.
///
/// # Errors
/// Propagates `RiskError` from the ten-year estimator.
pub fn assess_risk(profile: &PatientProfile, vasc: u32) -> Result<RiskResult, RiskError> {
    let ten_year = estimate_ten_year_risk(profile, vasc)?;
    let five_year = convert_to_five_year(ten_year);
    let lifetime = estimate_lifetime_risk(profile.age, ten_year);
    let absolute_reduction = absolute_risk_reduction(ten_year, lifetime);
    let relative_reduction = relative_risk_reduction(ten_year, absolute_reduction);

    Ok(RiskResult {
        five_year,
        ten_year,
        lifetime,
        absolute_reduction,
        relative_reduction,
    })
}

/// Format a percentage for display, e.g. `12.3%`.
#[must_use]
pub fn fmt_pct(x: f64) -> String {
    format!("{x:.1}%")
}

/// Format a percentage-point difference for display, e.g. `12.3 pp`.
#[must_use]
pub fn fmt_pp(x: f64) -> String {
    format!("{x:.1} pp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sex;

    const EMPTY: [&str; 0] = [];

    fn reference_profile(age: u32) -> PatientProfile {
        PatientProfile {
            age,
            sex: Sex::Male,
            systolic_bp: 140,
            total_cholesterol: 5.2,
            hdl: 1.3,
            crp: 2.5,
            smoker: false,
            diabetic: false,
            egfr: 90,
            ..Default::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_projection_examples() {
        let with_placeholder = project_ldl(3.0, &["None"], &["Atorvastatin 80 mg"]);
        let without = project_ldl(3.0, &EMPTY, &["Atorvastatin 80 mg"]);
        assert!(close(with_placeholder, without));
        assert!(close(without, 1.5));

        let combined = project_ldl(3.0, &["Atorvastatin 80 mg"], &["Ezetimibe 10 mg"]);
        assert!(close(combined, 1.2));
    }

    #[test]
    fn test_projection_skips_unknown_and_non_ldl_therapies() {
        let ldl = project_ldl(
            3.0,
            &["Icosapent ethyl", "Semaglutide"],
            &["Made-up drug", "None"],
        );
        assert!(close(ldl, 3.0));

        let padded = project_ldl(3.0, &EMPTY, &[" Atorvastatin 80 mg "]);
        assert!(close(padded, 3.0));
    }

    #[test]
    fn test_projection_floor() {
        let all = [
            "Rosuvastatin 20 mg",
            "Ezetimibe 10 mg",
            "Bempedoic acid",
            "PCSK9 inhibitor",
            "Inclisiran",
        ];
        for baseline in [0.5, 1.0, 3.0, 6.0, 12.0] {
            assert!(project_ldl(baseline, &all, &all) >= 0.5);
            assert!(project_ldl(baseline, &EMPTY, &all) >= 0.5);
        }
        assert!(close(project_ldl(0.1, &EMPTY, &EMPTY), 0.5));
    }

    #[test]
    fn test_projection_order_independent() {
        let a = project_ldl(4.2, &["Bempedoic acid"], &["Rosuvastatin 20 mg", "Inclisiran"]);
        let b = project_ldl(4.2, &["Inclisiran", "Rosuvastatin 20 mg"], &["Bempedoic acid"]);
        assert!(close(a, b));
    }

    #[test]
    fn test_ten_year_golden_values() {
        let at_85 = estimate_ten_year_risk(&reference_profile(85), 0).expect("Should compute");
        assert!(close(at_85, 63.9));

        let at_60 = estimate_ten_year_risk(&reference_profile(60), 0).expect("Should compute");
        assert!(close(at_60, 18.6));

        let female = PatientProfile {
            sex: Sex::Female,
            ..reference_profile(60)
        };
        assert!(close(estimate_ten_year_risk(&female, 0).expect("Should compute"), 13.6));

        let loaded = PatientProfile {
            smoker: true,
            diabetic: true,
            ..reference_profile(60)
        };
        assert!(close(estimate_ten_year_risk(&loaded, 1).expect("Should compute"), 54.7));
    }

    #[test]
    fn test_ten_year_capped() {
        let extreme = PatientProfile {
            age: 90,
            systolic_bp: 200,
            total_cholesterol: 10.0,
            hdl: 0.5,
            crp: 20.0,
            smoker: true,
            diabetic: true,
            egfr: 15,
            ..Default::default()
        };
        let risk = estimate_ten_year_risk(&extreme, 3).expect("Should compute");
        assert!(close(risk, MAX_RISK_PCT));
    }

    #[test]
    fn test_ten_year_bounds_over_grid() {
        for age in (30..=90).step_by(5) {
            for vasc in 0..=3 {
                for smoker in [false, true] {
                    let profile = PatientProfile {
                        smoker,
                        diabetic: !smoker,
                        ..reference_profile(age)
                    };
                    let r10 = estimate_ten_year_risk(&profile, vasc).expect("Should compute");
                    assert!((0.0..=MAX_RISK_PCT).contains(&r10));
                    assert!(convert_to_five_year(r10) <= r10);
                }
            }
        }
    }

    #[test]
    fn test_crp_domain_error() {
        let profile = PatientProfile {
            crp: -1.0,
            ..Default::default()
        };
        assert_eq!(
            estimate_ten_year_risk(&profile, 0),
            Err(RiskError::CrpDomain(-1.0))
        );

        let nan = PatientProfile {
            hdl: f64::NAN,
            ..Default::default()
        };
        assert_eq!(
            estimate_ten_year_risk(&nan, 0),
            Err(RiskError::NonFinite("hdl"))
        );
    }

    #[test]
    fn test_five_year_conversion() {
        assert!(close(convert_to_five_year(63.9), 39.9));
        assert!(close(convert_to_five_year(18.6), 9.8));
        assert!(close(convert_to_five_year(0.0), 0.0));
        // 1 - sqrt(0.05)
        assert!(close(convert_to_five_year(95.0), 77.6));
        assert!(close(convert_to_five_year(120.0), 77.6));
    }

    #[test]
    fn test_lifetime_not_applicable_from_85() {
        for age in 85..=90 {
            assert_eq!(estimate_lifetime_risk(age, 40.0), Estimate::NotApplicable);
        }
    }

    #[test]
    fn test_lifetime_values() {
        assert_eq!(estimate_lifetime_risk(60, 18.6), Estimate::Value(40.2));
        assert_eq!(estimate_lifetime_risk(60, 13.6), Estimate::Value(30.6));
        assert_eq!(estimate_lifetime_risk(45, 2.1), Estimate::Value(8.1));
        assert_eq!(estimate_lifetime_risk(70, 95.0), Estimate::Value(95.0));
    }

    #[test]
    fn test_lifetime_at_least_ten_year_with_ten_years_left() {
        for age in (30..=75).step_by(5) {
            let r10 = estimate_ten_year_risk(&reference_profile(age), 0).expect("Should compute");
            let lifetime = estimate_lifetime_risk(age, r10)
                .value()
                .expect("Should be applicable");
            assert!(lifetime >= r10, "age {age}: {lifetime} < {r10}");
        }
    }

    #[test]
    fn test_derived_metrics() {
        let arr = absolute_risk_reduction(18.6, Estimate::Value(40.2));
        assert_eq!(arr, Estimate::Value(-21.6));

        let rrr = relative_risk_reduction(18.6, arr);
        assert_eq!(rrr, Estimate::Value(-116.1));
    }

    #[test]
    fn test_derived_metrics_not_applicable() {
        let arr = absolute_risk_reduction(63.9, Estimate::NotApplicable);
        assert_eq!(arr, Estimate::NotApplicable);
        assert_eq!(relative_risk_reduction(63.9, arr), Estimate::NotApplicable);

        assert_eq!(
            relative_risk_reduction(0.0, Estimate::Value(0.0)),
            Estimate::NotApplicable
        );
    }

    #[test]
    fn test_assess_risk_over_85() {
        let result = assess_risk(&reference_profile(85), 0).expect("Should compute");
        assert!(close(result.ten_year, 63.9));
        assert!(close(result.five_year, 39.9));
        assert_eq!(result.lifetime, Estimate::NotApplicable);
        assert_eq!(result.absolute_reduction, Estimate::NotApplicable);
        assert_eq!(result.relative_reduction, Estimate::NotApplicable);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(fmt_pct(18.6), "18.6%");
        assert_eq!(fmt_pp(-21.6), "-21.6 pp");
        assert_eq!(fmt_pct(5.0), "5.0%");
    }
}
