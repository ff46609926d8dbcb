//! Reporting: append accepted records to the CSV export and keep the
//! portfolio summary snapshot current.
//!
//! Runs on its own thread fed by an mpsc channel; per-record failures are
//! logged and swallowed so one bad export never stops intake.

use std::io::Write;
use std::path::Path;
use std::sync::mpsc::Receiver;

use anyhow::{Context, Result};
use tracing::{error, info};

use kanopi_common::config::Config;
use kanopi_common::tree::TreeRecord;

use crate::summary::PortfolioSummary;
use crate::ReportPayload;

const CSV_HEADER: &str = "id;recorded_at;species;dbh_cm;height_m;proximity;condition;\
latitude;longitude;biomass_kg;co2_kg;stormwater_l;pollution_g;value_idr;notes";

/// Run the reporting loop on its own thread.
pub fn handle_queue(rx: Receiver<ReportPayload>, config: &Config) {
    while let Ok(payload) = rx.recv() {
        if let Err(e) = process_report(&payload, config) {
            error!("Reporting error: {e:#}");
        }
    }
    info!("Reporting thread finished");
}

fn process_report(payload: &ReportPayload, config: &Config) -> Result<()> {
    append_csv_row(&config.csv_path(), &payload.record)?;
    write_summary_snapshot(config, &payload.summary)?;
    info!(
        "Exported {} ({} tree(s) total)",
        payload.record.id, payload.summary.total_trees
    );
    Ok(())
}

// ── CSV export ───────────────────────────────────────────────────────────

fn append_csv_row(path: &Path, record: &TreeRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let fresh = !path.exists();

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open CSV export: {}", path.display()))?;

    if fresh {
        writeln!(file, "{CSV_HEADER}")?;
    }
    writeln!(file, "{}", format_row(record))?;
    Ok(())
}

/// Free-text fields must not smuggle the column separator in.
fn escape_field(s: &str) -> String {
    s.replace(';', ",")
}

fn format_row(record: &TreeRecord) -> String {
    let m = &record.measurement;
    format!(
        "{};{};{};{};{};{};{};{};{};{:.3};{:.3};{:.3};{:.3};{:.3};{}",
        record.id,
        record.recorded_at,
        escape_field(&m.species),
        m.dbh_cm,
        m.height_m,
        m.proximity,
        m.condition,
        m.latitude,
        m.longitude,
        record.carbon.biomass_kg,
        record.carbon.co2_sequestered_kg,
        record.services.stormwater_intercepted_l,
        record.services.air_pollution_removed_g,
        record.services.annual_value.total_idr,
        escape_field(&m.notes),
    )
}

// ── summary snapshot ─────────────────────────────────────────────────────

/// Overwrite the snapshot JSON handed to presentation.
///
/// The summary arrives precomputed from the inventory's single writer;
/// this thread never touches the inventory file itself.
pub fn write_summary_snapshot(config: &Config, summary: &PortfolioSummary) -> Result<()> {
    let path = config.summary_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(summary)?)
        .with_context(|| format!("Cannot write summary: {}", path.display()))?;
    Ok(())
}
