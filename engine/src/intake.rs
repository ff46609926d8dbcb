//! Intake loop – polls the intake directory for submission files and
//! turns each one into an inventory record.
//!
//! Field devices drop one JSON `Submission` per file. Each poll cycle
//! lists the directory, processes every submission, persists the grown
//! inventory, and deletes the handled file. Files that fail to parse are
//! moved aside so they never wedge the loop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use kanopi_common::config::Config;
use kanopi_common::submission::Submission;
use kanopi_common::vision::VisionEstimate;

use crate::assemble::{assemble, Clock, IdGenerator};
use crate::repository::{Inventory, JsonStore};
use crate::summary::summarize;
use crate::vision::VisionClient;
use crate::ReportPayload;

/// Poll the intake directory and process submissions until `shutdown`.
pub fn poll_and_process(
    config: &Config,
    inventory: &mut Inventory,
    store: &JsonStore,
    vision: Option<&VisionClient>,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
    report_tx: &SyncSender<ReportPayload>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let poll_interval = Duration::from_secs(config.poll_interval_secs);
    std::fs::create_dir_all(&config.intake_dir)
        .with_context(|| format!("Cannot create intake dir: {}", config.intake_dir.display()))?;

    info!(
        "Polling {} every {}s",
        config.intake_dir.display(),
        config.poll_interval_secs
    );

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let files = match list_submissions(&config.intake_dir) {
            Ok(f) => f,
            Err(e) => {
                warn!("Cannot list intake dir: {e}");
                std::thread::sleep(poll_interval);
                continue;
            }
        };

        if files.is_empty() {
            debug!("Intake empty – sleeping");
            std::thread::sleep(poll_interval);
            continue;
        }

        info!("Found {} submission(s)", files.len());

        for path in &files {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            match process_submission(path, config, inventory, store, vision, ids, clock, report_tx)
            {
                Ok(()) => {
                    std::fs::remove_file(path).ok();
                }
                Err(e) => {
                    error!("Rejected {}: {e:#}", path.display());
                    move_aside(path);
                }
            }
        }

        std::thread::sleep(poll_interval);
    }

    info!("Intake loop stopped");
    Ok(())
}

/// Handle one submission file: parse, resolve, assemble, persist, report.
fn process_submission(
    path: &Path,
    config: &Config,
    inventory: &mut Inventory,
    store: &JsonStore,
    vision: Option<&VisionClient>,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
    report_tx: &SyncSender<ReportPayload>,
) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let submission: Submission =
        serde_json::from_str(&text).context("Submission JSON is invalid")?;

    let estimate = fetch_estimate(&submission, vision);

    let measurement = submission
        .resolve((config.latitude, config.longitude), estimate.as_ref())
        .context("Cannot resolve submission")?;

    let record = assemble(measurement, ids, clock);
    info!("Recorded {record}");

    inventory.append(record.clone());
    store.save(inventory.all())?;

    report_tx
        .send(ReportPayload {
            record,
            summary: summarize(inventory.all()),
        })
        .map_err(|_| anyhow::anyhow!("Reporting channel closed"))?;

    Ok(())
}

/// Consult the vision service when the submission has a photo and gaps.
fn fetch_estimate(
    submission: &Submission,
    vision: Option<&VisionClient>,
) -> Option<VisionEstimate> {
    if !submission.wants_vision() {
        return None;
    }
    let client = vision?;
    let photo = submission.photo.as_deref()?;
    client.analyze(photo, &submission.notes)
}

fn list_submissions(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

/// Park an unparseable file next to the intake dir so it stops matching
/// the `.json` listing but stays available for inspection.
fn move_aside(path: &Path) {
    let mut rejected = path.to_path_buf();
    rejected.set_extension("rejected");
    if let Err(e) = std::fs::rename(path, &rejected) {
        warn!("Cannot move aside {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::assemble::SessionIds;
    use kanopi_common::tree::Condition;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> String {
            "2025-03-01T09:00:00+07:00".into()
        }
    }

    fn test_config(root: &Path) -> Config {
        Config {
            latitude: -6.2,
            longitude: 106.8,
            inventory_path: root.join("inventory.json"),
            export_dir: root.join("export"),
            intake_dir: root.join("intake"),
            poll_interval_secs: 1,
            vision_url: None,
            vision_timeout_secs: 5,
        }
    }

    #[test]
    fn test_process_submission_end_to_end() {
        let root = std::env::temp_dir().join("kanopi_intake_test");
        std::fs::remove_dir_all(&root).ok();
        std::fs::create_dir_all(root.join("intake")).unwrap();

        let config = test_config(&root);
        let path = root.join("intake/0001.json");
        std::fs::write(
            &path,
            r#"{"species":"Jati","dbh_cm":50.0,"height_m":25.0,"proximity":"Near","condition":"healthy"}"#,
        )
        .unwrap();

        let mut inventory = Inventory::new();
        let store = JsonStore::new(&config.inventory_path);
        let mut ids = SessionIds::default();
        let (tx, rx) = mpsc::sync_channel(4);

        process_submission(
            &path,
            &config,
            &mut inventory,
            &store,
            None,
            &mut ids,
            &FixedClock,
            &tx,
        )
        .unwrap();

        assert_eq!(inventory.len(), 1);
        let record = &inventory.all()[0];
        assert_eq!(record.id, "tree-0001");
        assert_eq!(record.measurement.condition, Condition::Healthy);
        assert_eq!(record.services.energy_savings_idr, 360_000.0);
        // Persisted wholesale.
        assert!(config.inventory_path.exists());
        // Reported to the export thread, summary already computed so the
        // reporting side never reads the inventory file.
        let payload = rx.try_recv().unwrap();
        assert_eq!(payload.record.id, "tree-0001");
        assert_eq!(payload.summary.total_trees, 1);
        assert_eq!(payload.summary.species[0].name, "Jati");
    }

    #[test]
    fn test_invalid_submission_is_an_error() {
        let root = std::env::temp_dir().join("kanopi_intake_bad_test");
        std::fs::remove_dir_all(&root).ok();
        std::fs::create_dir_all(root.join("intake")).unwrap();

        let config = test_config(&root);
        let path = root.join("intake/bad.json");
        std::fs::write(&path, "not json").unwrap();

        let mut inventory = Inventory::new();
        let store = JsonStore::new(&config.inventory_path);
        let mut ids = SessionIds::default();
        let (tx, _rx) = mpsc::sync_channel(4);

        let result = process_submission(
            &path,
            &config,
            &mut inventory,
            &store,
            None,
            &mut ids,
            &FixedClock,
            &tx,
        );
        assert!(result.is_err());
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_list_submissions_only_json() {
        let dir = std::env::temp_dir().join("kanopi_intake_list_test");
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.json"), "{}").unwrap();
        std::fs::write(dir.join("a.json"), "{}").unwrap();
        std::fs::write(dir.join("c.rejected"), "junk").unwrap();

        let files = list_submissions(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.json", "b.json"]);
    }
}
