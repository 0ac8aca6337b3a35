//! Lipidwise: CVD risk and LDL projection CLI
//!
//! Host application for the risk engine: reads an assessment input file,
//! prints or exports the report, and exposes the projection and evidence
//! lookups directly.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lipidwise::adapters::json::JsonReportExporter;
use lipidwise::adapters::sanitize::SanitizingMakeWriter;
use lipidwise::adapters::text::TextReportExporter;
use lipidwise::application::{AssessmentRequest, AssessmentService};
use lipidwise::config::{AppConfig, ReportFormat};
use lipidwise::domain::{Therapy, EVIDENCE_TABLE, LDL_FLOOR};
use lipidwise::ports::ReportExporter;
use lipidwise::project_ldl;

#[derive(Parser)]
#[command(
    name = "lipidwise",
    about = "CVD risk and projected LDL for lipid-lowering therapy decisions",
    long_about = "Computes projected LDL after lipid-lowering therapy and 5-year, 10-year and \
                  lifetime CVD risk estimates. The risk model is an illustrative heuristic, \
                  not a substitute for clinical advice."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full assessment from a JSON input file
    Assess {
        /// Path to the assessment input (profile and therapies)
        #[arg(short, long, value_name = "INPUT")]
        input: PathBuf,

        /// Report format (defaults to LIPIDWISE_REPORT_FORMAT, then text)
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Project LDL after therapy
    Project {
        /// Baseline LDL in mmol/L
        #[arg(short, long)]
        baseline: f64,

        /// Pre-admission therapy identifier (repeatable)
        #[arg(long = "pre", value_name = "THERAPY")]
        pre: Vec<String>,

        /// New or intensified therapy identifier (repeatable)
        #[arg(long = "new", value_name = "THERAPY")]
        new: Vec<String>,
    },

    /// List the outcome-trial evidence for each therapy
    Evidence,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;

    // Logs go to a file when stdout is interactive so they do not interleave
    // with the report; otherwise to stderr.
    let (writer, _guard) = if config.log_to_file(std::io::stdout().is_terminal()) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces on open below.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Cannot open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer, config.sanitize_max_bytes)),
        )
        .init();

    match cli.command {
        Commands::Assess {
            input,
            format,
            output,
        } => match format.unwrap_or(config.report_format) {
            ReportFormat::Text => run_assess(TextReportExporter::new(), &input, output),
            ReportFormat::Json => run_assess(JsonReportExporter::new(), &input, output),
        },
        Commands::Project { baseline, pre, new } => run_project(baseline, &pre, &new),
        Commands::Evidence => run_evidence(),
    }
}

fn run_assess<E: ReportExporter>(
    exporter: E,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Cannot read input file {input:?}"))?;
    let (profile, therapies) = AssessmentRequest::from_json(&text)?.into_parts()?;

    let service = AssessmentService::new(Arc::new(exporter));
    let assessment = service.assess(profile, therapies)?;
    let report = service.export(&assessment)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &report)
                .with_context(|| format!("Cannot write report to {path:?}"))?;
            tracing::info!("Report written");
        }
        None => std::io::stdout().write_all(&report)?,
    }
    Ok(())
}

fn run_project(baseline: f64, pre: &[String], new: &[String]) -> Result<()> {
    anyhow::ensure!(
        baseline.is_finite() && baseline > 0.0,
        "Baseline LDL must be a positive number, got {baseline}"
    );
    for id in pre.iter().chain(new) {
        if Therapy::parse_optional(id).is_err() {
            tracing::warn!("Unrecognised therapy '{}' has no LDL effect", id);
        }
    }

    let projected = project_ldl(baseline, pre, new);
    let floor_note = if (projected - LDL_FLOOR).abs() < f64::EPSILON {
        " (floor)"
    } else {
        ""
    };
    println!("Projected LDL: {projected:.2} mmol/L{floor_note}");
    Ok(())
}

fn run_evidence() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for (therapy, evidence) in &EVIDENCE_TABLE {
        writeln!(stdout, "{:<20} {:<18} {}", therapy.name(), evidence.trial, evidence.url)?;
    }
    Ok(())
}
