//! Assessment input file format.
//!
//! ```json
//! {
//!   "profile": { "age": 60, "sex": "Male", ... },
//!   "therapies": {
//!     "pre_admission": ["Atorvastatin 80 mg"],
//!     "intensified": ["None", "Ezetimibe 10 mg"]
//!   }
//! }
//! ```

use serde::Deserialize;

use crate::domain::{PatientProfile, TherapySelection};
use crate::Result;

/// Therapy identifiers as entered, "None" placeholders included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TherapyInput {
    #[serde(default)]
    pub pre_admission: Vec<String>,
    #[serde(default)]
    pub intensified: Vec<String>,
}

/// One patient's answers, as read from an input file.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub profile: PatientProfile,
    #[serde(default)]
    pub therapies: TherapyInput,
}

impl AssessmentRequest {
    /// Parse a request from JSON text.
    ///
    /// # Errors
    /// Returns `LipidwiseError::Serialization` for malformed input.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Split into the engine's inputs, resolving therapy identifiers.
    ///
    /// # Errors
    /// Returns `LipidwiseError::Therapy` for unrecognised identifiers.
    pub fn into_parts(self) -> Result<(PatientProfile, TherapySelection)> {
        let therapies = TherapySelection::from_identifiers(
            self.therapies.pre_admission.as_slice(),
            self.therapies.intensified.as_slice(),
        )?;
        Ok((self.profile, therapies))
    }
}
