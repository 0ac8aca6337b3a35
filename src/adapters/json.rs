//! JSON report exporter for hosts that post-process results.

use crate::domain::Assessment;
use crate::ports::{ExportError, ReportExporter};

/// Serializes the full assessment record with `serde_json`.
#[derive(Debug, Clone, Copy)]
pub struct JsonReportExporter {
    pretty: bool,
}

impl JsonReportExporter {
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output, e.g. for log shipping.
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonReportExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportExporter for JsonReportExporter {
    fn export(&self, assessment: &Assessment) -> Result<Vec<u8>, ExportError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(assessment)?
        } else {
            serde_json::to_vec(assessment)?
        };
        Ok(bytes)
    }

    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{assess_risk, PatientProfile, Therapy, TherapySelection};

    fn assessment(age: u32) -> Assessment {
        let profile = PatientProfile {
            age,
            ..Default::default()
        };
        let therapies = TherapySelection::new(vec![], vec![Therapy::Rosuvastatin20]);
        let projected = therapies.projected_ldl(profile.baseline_ldl);
        let risk = assess_risk(&profile, 0).expect("Should compute");
        Assessment::new(profile, therapies, projected, risk)
    }

    #[test]
    fn test_export_structure() {
        let bytes = JsonReportExporter::compact()
            .export(&assessment(60))
            .expect("Should export");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("Valid JSON");

        assert_eq!(value["profile"]["age"], 60);
        assert_eq!(value["therapies"]["intensified"][0], "Rosuvastatin 20 mg");
        assert_eq!(value["risk"]["ten_year"], 18.6);
        assert_eq!(value["risk"]["lifetime"]["kind"], "value");
        assert_eq!(value["recommendations"][0]["evidence"]["trial"], "CTT meta-analysis");
    }

    #[test]
    fn test_not_applicable_serialization() {
        let bytes = JsonReportExporter::new()
            .export(&assessment(88))
            .expect("Should export");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("Valid JSON");
        assert_eq!(value["risk"]["lifetime"]["kind"], "not_applicable");
        assert!(value["risk"]["lifetime"].get("value").is_none());
    }
}
