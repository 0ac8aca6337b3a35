//! Patient profile types for CVD risk estimation.
//!
//! Field ranges mirror the bounds of the questionnaire's input widgets.

use serde::{Deserialize, Serialize};

/// Biological sex, as used by the risk equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    /// Indicator used by the linear predictor (1 = male, 0 = female).
    #[must_use]
    pub fn indicator(self) -> f64 {
        match self {
            Self::Male => 1.0,
            Self::Female => 0.0,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

/// Risk factors collected by the profile and labs steps.
///
/// Cholesterol values are in mmol/L, CRP in mg/L, eGFR in mL/min/1.73 m².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Age in whole years (30-90)
    pub age: u32,

    pub sex: Sex,

    /// Systolic blood pressure in mmHg (90-200)
    pub systolic_bp: u32,

    /// Total cholesterol (2.0-10.0)
    pub total_cholesterol: f64,

    /// HDL cholesterol (0.5-3.0)
    pub hdl: f64,

    /// Baseline LDL cholesterol before any new therapy (0.5-6.0)
    pub baseline_ldl: f64,

    /// High-sensitivity CRP (0.1-20.0)
    pub crp: f64,

    pub smoker: bool,

    pub diabetic: bool,

    /// eGFR (15-120)
    pub egfr: u32,

    /// Weight in kg (40-200), report only
    #[serde(default)]
    pub weight_kg: Option<f64>,

    /// Height in cm (140-210), report only
    #[serde(default)]
    pub height_cm: Option<f64>,

    /// HbA1c in % (4.0-14.0), report only
    #[serde(default)]
    pub hba1c: Option<f64>,

    /// Triglycerides (0.3-5.0), report only
    #[serde(default)]
    pub triglycerides: Option<f64>,
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            age: 60,
            sex: Sex::Male,
            systolic_bp: 140,
            total_cholesterol: 5.2,
            hdl: 1.3,
            baseline_ldl: 3.0,
            crp: 2.5,
            smoker: false,
            diabetic: false,
            egfr: 90,
            weight_kg: Some(75.0),
            height_cm: Some(170.0),
            hba1c: Some(7.0),
            triglycerides: Some(1.2),
        }
    }
}

impl PatientProfile {
    /// Body mass index in kg/m², when both weight and height are known.
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        match (self.weight_kg, self.height_cm) {
            (Some(w), Some(h)) if h > 0.0 => Some(w / (h / 100.0).powi(2)),
            _ => None,
        }
    }

    /// Validate that all fields are within the questionnaire's ranges.
    ///
    /// # Errors
    /// Returns every validation failure as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(30..=90).contains(&self.age) {
            errors.push(format!("Age {} out of range [30, 90]", self.age));
        }
        if !(90..=200).contains(&self.systolic_bp) {
            errors.push(format!(
                "Systolic BP {} out of range [90, 200]",
                self.systolic_bp
            ));
        }
        if !(15..=120).contains(&self.egfr) {
            errors.push(format!("eGFR {} out of range [15, 120]", self.egfr));
        }

        let required = [
            ("Total cholesterol", self.total_cholesterol, 2.0, 10.0),
            ("HDL cholesterol", self.hdl, 0.5, 3.0),
            ("Baseline LDL", self.baseline_ldl, 0.5, 6.0),
            ("hs-CRP", self.crp, 0.1, 20.0),
        ];
        for (label, value, min, max) in required {
            check_range(&mut errors, label, value, min, max);
        }

        let optional = [
            ("Weight", self.weight_kg, 40.0, 200.0),
            ("Height", self.height_cm, 140.0, 210.0),
            ("HbA1c", self.hba1c, 4.0, 14.0),
            ("Triglycerides", self.triglycerides, 0.3, 5.0),
        ];
        for (label, value, min, max) in optional {
            if let Some(value) = value {
                check_range(&mut errors, label, value, min, max);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// NaN fails the range check as well.
fn check_range(errors: &mut Vec<String>, label: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{label} {value} out of range [{min}, {max}]"));
    }
}
