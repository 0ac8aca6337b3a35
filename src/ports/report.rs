//! Report port: Trait for rendering a completed assessment.
//!
//! Keeps the document format out of the application logic; the host picks
//! an exporter and decides where the bytes go.

use crate::domain::Assessment;

/// Errors that can occur while exporting a report.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Trait for report exporters.
pub trait ReportExporter: Send + Sync {
    /// Render the assessment into the exporter's document format.
    ///
    /// # Errors
    /// Returns `ExportError` if rendering fails.
    fn export(&self, assessment: &Assessment) -> Result<Vec<u8>, ExportError>;

    /// MIME type of the rendered document.
    fn media_type(&self) -> &'static str;

    /// File extension without the leading dot.
    fn extension(&self) -> &'static str;

    /// Suggested download file name.
    fn file_name(&self) -> String {
        format!("report.{}", self.extension())
    }
}
