//! Lipid-lowering therapies and the pre-admission / intensified regimens.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder identifier the questionnaire uses for "no statin selected".
pub const NO_THERAPY: &str = "None";

/// PCSK9 inhibitor and inclisiran are only offered above this projected LDL (mmol/L).
pub const ADD_ON_LDL_THRESHOLD: f64 = 1.8;

/// Projected LDL never drops below this value (mmol/L).
pub const LDL_FLOOR: f64 = 0.5;

/// Errors raised when building a therapy selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TherapyError {
    #[error("Unknown therapy identifier: {0}")]
    Unknown(String),

    #[error("{0} is not a statin")]
    NotAStatin(Therapy),

    #[error("More than one statin in the {0} regimen")]
    MultipleStatins(&'static str),

    #[error("{0} listed more than once in the {1} regimen")]
    Duplicate(Therapy, &'static str),

    #[error("{0} requires projected LDL above {} mmol/L on oral therapy", ADD_ON_LDL_THRESHOLD)]
    AddOnIneligible(Therapy),
}

/// Therapies the questionnaire can select or recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Therapy {
    #[serde(rename = "Atorvastatin 80 mg")]
    Atorvastatin80,
    #[serde(rename = "Rosuvastatin 20 mg")]
    Rosuvastatin20,
    #[serde(rename = "Ezetimibe 10 mg")]
    Ezetimibe10,
    #[serde(rename = "Bempedoic acid")]
    BempedoicAcid,
    #[serde(rename = "PCSK9 inhibitor")]
    Pcsk9Inhibitor,
    #[serde(rename = "Inclisiran")]
    Inclisiran,
    #[serde(rename = "Icosapent ethyl")]
    IcosapentEthyl,
    #[serde(rename = "Semaglutide")]
    Semaglutide,
}

impl Therapy {
    pub const ALL: [Therapy; 8] = [
        Therapy::Atorvastatin80,
        Therapy::Rosuvastatin20,
        Therapy::Ezetimibe10,
        Therapy::BempedoicAcid,
        Therapy::Pcsk9Inhibitor,
        Therapy::Inclisiran,
        Therapy::IcosapentEthyl,
        Therapy::Semaglutide,
    ];

    /// Identifier shown to clinicians and accepted in input files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Atorvastatin80 => "Atorvastatin 80 mg",
            Self::Rosuvastatin20 => "Rosuvastatin 20 mg",
            Self::Ezetimibe10 => "Ezetimibe 10 mg",
            Self::BempedoicAcid => "Bempedoic acid",
            Self::Pcsk9Inhibitor => "PCSK9 inhibitor",
            Self::Inclisiran => "Inclisiran",
            Self::IcosapentEthyl => "Icosapent ethyl",
            Self::Semaglutide => "Semaglutide",
        }
    }

    /// Fractional LDL reduction, or `None` for therapies that do not lower LDL.
    #[must_use]
    pub fn ldl_reduction(self) -> Option<f64> {
        match self {
            Self::Atorvastatin80 => Some(0.50),
            Self::Rosuvastatin20 => Some(0.55),
            Self::Ezetimibe10 => Some(0.20),
            Self::BempedoicAcid => Some(0.18),
            Self::Pcsk9Inhibitor => Some(0.60),
            Self::Inclisiran => Some(0.55),
            Self::IcosapentEthyl | Self::Semaglutide => None,
        }
    }

    #[must_use]
    pub fn is_statin(self) -> bool {
        matches!(self, Self::Atorvastatin80 | Self::Rosuvastatin20)
    }

    /// Add-on agents gated by the projected LDL after oral therapy.
    #[must_use]
    pub fn is_add_on(self) -> bool {
        matches!(self, Self::Pcsk9Inhibitor | Self::Inclisiran)
    }

    /// Parse an identifier, mapping the "None" placeholder to `Ok(None)`.
    ///
    /// # Errors
    /// Returns `TherapyError::Unknown` for anything else not in the catalogue.
    pub fn parse_optional(id: &str) -> Result<Option<Self>, TherapyError> {
        if id == NO_THERAPY {
            return Ok(None);
        }
        id.parse().map(Some)
    }
}

impl FromStr for Therapy {
    type Err = TherapyError;

    /// Identifiers must match a display name exactly, including case and spacing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| TherapyError::Unknown(s.to_string()))
    }
}

impl std::fmt::Display for Therapy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reduction factor for a raw identifier; unknown identifiers and "None" yield `None`.
#[must_use]
pub fn reduction_for_identifier(id: &str) -> Option<f64> {
    id.parse::<Therapy>().ok().and_then(Therapy::ldl_reduction)
}

/// Therapies already taken before admission and those newly started or intensified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapySelection {
    pub pre_admission: Vec<Therapy>,
    pub intensified: Vec<Therapy>,
}

impl TherapySelection {
    #[must_use]
    pub fn new(pre_admission: Vec<Therapy>, intensified: Vec<Therapy>) -> Self {
        Self {
            pre_admission,
            intensified,
        }
    }

    /// Build a selection from display identifiers, dropping "None" placeholders.
    ///
    /// # Errors
    /// Returns `TherapyError::Unknown` on the first unrecognised identifier.
    pub fn from_identifiers<S: AsRef<str>>(pre: &[S], new: &[S]) -> Result<Self, TherapyError> {
        fn parse_all<S: AsRef<str>>(ids: &[S]) -> Result<Vec<Therapy>, TherapyError> {
            let mut out = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(therapy) = Therapy::parse_optional(id.as_ref())? {
                    out.push(therapy);
                }
            }
            Ok(out)
        }

        Ok(Self::new(parse_all(pre)?, parse_all(new)?))
    }

    /// Reject regimens the questionnaire cannot express.
    ///
    /// Each regimen holds at most one statin and no therapy twice; the same
    /// therapy may appear in both regimens. Add-on agents need the oral
    /// regimens to leave LDL above [`ADD_ON_LDL_THRESHOLD`].
    ///
    /// # Errors
    /// Returns `TherapyError::MultipleStatins`, `TherapyError::Duplicate` or
    /// `TherapyError::AddOnIneligible` for the first rule broken.
    pub fn validate(&self, baseline_ldl: f64) -> Result<(), TherapyError> {
        check_regimen(&self.pre_admission, "pre-admission")?;
        check_regimen(&self.intensified, "intensified")?;

        if let Some(add_on) = self.iter().find(|t| t.is_add_on()) {
            if !self.add_on_eligible(baseline_ldl) {
                return Err(TherapyError::AddOnIneligible(add_on));
            }
        }
        Ok(())
    }

    /// All therapies in application order: pre-admission first, then intensified.
    pub fn iter(&self) -> impl Iterator<Item = Therapy> + '_ {
        self.pre_admission
            .iter()
            .chain(self.intensified.iter())
            .copied()
    }

    /// Count of pre-admission therapies; feeds the risk equation's burden term.
    #[must_use]
    pub fn prior_therapy_count(&self) -> u32 {
        u32::try_from(self.pre_admission.len()).unwrap_or(u32::MAX)
    }

    /// Projected LDL after applying every therapy in the selection.
    #[must_use]
    pub fn projected_ldl(&self, baseline_ldl: f64) -> f64 {
        apply_reductions(baseline_ldl, self.iter().filter_map(Therapy::ldl_reduction))
    }

    /// Projected LDL from the oral regimens only (add-on agents excluded).
    #[must_use]
    pub fn oral_projected_ldl(&self, baseline_ldl: f64) -> f64 {
        apply_reductions(
            baseline_ldl,
            self.iter()
                .filter(|t| !t.is_add_on())
                .filter_map(Therapy::ldl_reduction),
        )
    }

    /// Whether PCSK9 inhibitor / inclisiran may be added for this patient.
    #[must_use]
    pub fn add_on_eligible(&self, baseline_ldl: f64) -> bool {
        self.oral_projected_ldl(baseline_ldl) > ADD_ON_LDL_THRESHOLD
    }
}

fn check_regimen(regimen: &[Therapy], label: &'static str) -> Result<(), TherapyError> {
    if regimen.iter().filter(|t| t.is_statin()).count() > 1 {
        return Err(TherapyError::MultipleStatins(label));
    }
    for (i, therapy) in regimen.iter().enumerate() {
        if regimen[..i].contains(therapy) {
            return Err(TherapyError::Duplicate(*therapy, label));
        }
    }
    Ok(())
}

pub(crate) fn apply_reductions(baseline_ldl: f64, factors: impl Iterator<Item = f64>) -> f64 {
    let ldl = factors.fold(baseline_ldl, |ldl, factor| ldl * (1.0 - factor));
    ldl.max(LDL_FLOOR)
}
