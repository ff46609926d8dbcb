//! Kanopi Inventory Engine – polls the intake directory for field
//! submissions, derives carbon and ecosystem-service metrics, persists
//! the inventory, and keeps the CSV export and summary snapshot current.

mod assemble;
mod carbon;
mod intake;
mod report;
mod repository;
mod services;
mod summary;
mod vision;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use anyhow::{Context, Result};
use tracing::info;

use kanopi_common::tree::TreeRecord;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Payload sent from the intake loop to the reporting thread.
///
/// Carries the summary computed by the inventory's single writer so the
/// reporting thread never re-reads a file the intake loop may be
/// rewriting.
pub struct ReportPayload {
    pub record: TreeRecord,
    pub summary: summary::PortfolioSummary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── load config ──────────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| kanopi_common::config::Config::default_path().to_string());
    let config =
        kanopi_common::config::load(&PathBuf::from(&config_path)).context("Config load failed")?;

    info!(
        "Kanopi Inventory Engine starting (inventory={})",
        config.inventory_path.display()
    );

    // ── load inventory ───────────────────────────────────────────────
    let store = repository::JsonStore::new(&config.inventory_path);
    let mut inventory = repository::Inventory::new();
    inventory.replace_all(store.load()?);

    // ── image-analysis client (optional) ─────────────────────────────
    let vision_client = vision::VisionClient::from_config(&config)?;
    match &config.vision_url {
        Some(url) => info!("Vision service: {url}"),
        None => info!("Vision service disabled"),
    }

    // ── ctrl-c ───────────────────────────────────────────────────────
    ctrlc::set_handler(move || {
        SHUTDOWN.store(true, Ordering::Relaxed);
        info!("Shutdown signal received");
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── reporting thread ─────────────────────────────────────────────
    let (report_tx, report_rx) = mpsc::sync_channel::<ReportPayload>(16);
    let report_config = config.clone();
    let report_thread = std::thread::Builder::new()
        .name("reporting".into())
        .spawn(move || {
            report::handle_queue(report_rx, &report_config);
        })
        .context("Cannot spawn reporting thread")?;

    // ── intake loop ──────────────────────────────────────────────────
    let mut ids = assemble::SessionIds::resuming_from(inventory.len() as u64);
    if let Err(e) = intake::poll_and_process(
        &config,
        &mut inventory,
        &store,
        vision_client.as_ref(),
        &mut ids,
        &assemble::SystemClock,
        &report_tx,
        &SHUTDOWN,
    ) {
        tracing::error!("Intake loop error: {e:#}");
    }

    // Signal reporting thread to finish
    drop(report_tx);
    report_thread.join().ok();

    // Leave a current snapshot behind even if the last cycle was idle.
    let final_summary = summary::summarize(inventory.all());
    if let Err(e) = report::write_summary_snapshot(&config, &final_summary) {
        tracing::warn!("Final summary snapshot failed: {e:#}");
    }

    info!(
        "Kanopi Inventory Engine stopped ({} tree(s) on record)",
        inventory.len()
    );
    Ok(())
}
