//! Plain-text report exporter.
//!
//! Layout: a title, one `field: value` line per questionnaire answer, the
//! therapy regimens, then the risk summary and supporting evidence.

use std::fmt::Write;

use crate::domain::risk::{fmt_pct, fmt_pp};
use crate::domain::{Assessment, Estimate, Therapy};
use crate::ports::{ExportError, ReportExporter};

/// Shown for estimates that do not apply to the patient.
pub const NOT_APPLICABLE: &str = "N/A";

const DISCLAIMER: &str = "For informational purposes; not a substitute for clinical advice.";

/// Renders an assessment as a human-readable UTF-8 document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportExporter;

impl TextReportExporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render to a `String`.
    ///
    /// # Errors
    /// Returns `std::fmt::Error` only if writing into the buffer fails.
    pub fn render(&self, a: &Assessment) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let p = &a.profile;

        writeln!(out, "CVD Risk Report")?;
        writeln!(out, "===============")?;
        writeln!(out, "report_id: {}", a.id)?;
        writeln!(out, "created_at: {}", a.created_at.to_rfc3339())?;
        writeln!(out)?;

        writeln!(out, "age: {}", p.age)?;
        writeln!(out, "sex: {}", p.sex)?;
        write_optional(&mut out, "weight_kg", p.weight_kg)?;
        write_optional(&mut out, "height_cm", p.height_cm)?;
        if let Some(bmi) = p.bmi() {
            writeln!(out, "bmi: {bmi:.1}")?;
        }
        writeln!(out, "smoker: {}", p.smoker)?;
        writeln!(out, "diabetes: {}", p.diabetic)?;
        writeln!(out, "egfr: {}", p.egfr)?;
        writeln!(out, "sbp: {}", p.systolic_bp)?;
        writeln!(out, "tc: {}", p.total_cholesterol)?;
        writeln!(out, "hdl: {}", p.hdl)?;
        writeln!(out, "ldl0: {}", p.baseline_ldl)?;
        writeln!(out, "crp: {}", p.crp)?;
        write_optional(&mut out, "hba1c", p.hba1c)?;
        write_optional(&mut out, "tg", p.triglycerides)?;
        writeln!(out)?;

        writeln!(out, "pre_admission: {}", regimen(&a.therapies.pre_admission))?;
        writeln!(out, "intensified: {}", regimen(&a.therapies.intensified))?;
        writeln!(out, "projected_ldl: {:.2} mmol/L", a.projected_ldl)?;
        writeln!(
            out,
            "pcsk9_inclisiran_eligible: {}",
            if a.add_on_eligible { "yes" } else { "no" }
        )?;
        writeln!(out)?;

        let r = &a.risk;
        writeln!(
            out,
            "5-yr Risk: {}, 10-yr Risk: {}, Lifetime: {}",
            fmt_pct(r.five_year),
            fmt_pct(r.ten_year),
            estimate(r.lifetime, fmt_pct)
        )?;
        writeln!(
            out,
            "ARR (10y): {}, RRR (10y): {}",
            estimate(r.absolute_reduction, fmt_pp),
            estimate(r.relative_reduction, fmt_pct)
        )?;

        if !a.recommendations.is_empty() {
            writeln!(out)?;
            writeln!(out, "Evidence")?;
            for rec in &a.recommendations {
                let e = rec.evidence;
                writeln!(out, "- {}: {} ({})", rec.therapy, e.trial, e.url)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{DISCLAIMER}")?;
        Ok(out)
    }
}

impl ReportExporter for TextReportExporter {
    fn export(&self, assessment: &Assessment) -> Result<Vec<u8>, ExportError> {
        Ok(self.render(assessment)?.into_bytes())
    }

    fn media_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

fn write_optional(out: &mut String, label: &str, value: Option<f64>) -> std::fmt::Result {
    match value {
        Some(v) => writeln!(out, "{label}: {v}"),
        None => Ok(()),
    }
}

fn regimen(therapies: &[Therapy]) -> String {
    if therapies.is_empty() {
        return "none".to_string();
    }
    therapies
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn estimate(value: Estimate, fmt: fn(f64) -> String) -> String {
    value.value().map_or_else(|| NOT_APPLICABLE.to_string(), fmt)
}
