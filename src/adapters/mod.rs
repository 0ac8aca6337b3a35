//! Adapters layer: Concrete implementations of ports.
//!
//! - `text`: plain-text report
//! - `json`: JSON report via serde_json
//! - `sanitize`: patient-identifier filtering for logs

pub mod json;
pub mod sanitize;
pub mod text;
