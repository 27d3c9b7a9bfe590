//! Export Module
//!
//! Writes the current search report to disk:
//! - the whole report as JSON
//! - the vote history (casts and removals) as CSV, when a proposal is shown
//!
//! Files are timestamped and land in the data directory unless a directory
//! is given.

mod csv_export;
mod json_export;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Local;

use crate::config;
use crate::domain::governance::SearchReport;

pub use csv_export::write_vote_history;
pub use json_export::{report_json, write_report, ExportableReport};

/// Files written by one export
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub rows: usize,
}

/// Get the export directory path, creating it if needed
pub fn export_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let export_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => config::export_dir().unwrap_or_else(|| PathBuf::from("exports")),
    };
    fs::create_dir_all(&export_dir)
        .with_context(|| format!("Failed to create export directory {}", export_dir.display()))?;
    Ok(export_dir)
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

fn file_prefix(report: &SearchReport) -> String {
    match &report.view {
        Some(view) => format!("proposal-{}", sanitize(&view.proposal_id)),
        None => format!("address-{}", sanitize(&report.query)),
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Export `report` as JSON, plus the vote history as CSV when there is a view
pub fn export_report(report: &SearchReport, dir: Option<&Path>) -> Result<ExportSummary> {
    let dir = export_dir(dir)?;
    let prefix = file_prefix(report);
    let mut summary = ExportSummary::default();

    let json_path = dir.join(generate_filename(&prefix, "json"));
    write_report(&json_path, report)
        .map_err(|e| anyhow!("JSON export to {} failed: {}", json_path.display(), e))?;
    summary.json = Some(json_path);

    if let Some(view) = &report.view {
        let csv_path = dir.join(generate_filename(&format!("{}-votes", prefix), "csv"));
        summary.rows = write_vote_history(&csv_path, view)
            .map_err(|e| anyhow!("CSV export to {} failed: {}", csv_path.display(), e))?;
        summary.csv = Some(csv_path);
    }

    tracing::info!(json = ?summary.json, csv = ?summary.csv, rows = summary.rows, "exported report");
    Ok(summary)
}
