//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the outside world (report formats).

mod report;

pub use report::{ExportError, ReportExporter};
