//! Inventory repository – owns the ordered record collection and its
//! whole-file JSON persistence.
//!
//! The collection is newest-first; index 0 is always the most recent
//! record and every consumer (map, dashboard, exports) relies on that.
//! Persistence overwrites the entire file on every change and reloads it
//! wholesale at session start.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use kanopi_common::tree::TreeRecord;

/// In-memory ordered collection of tree records, newest first.
#[derive(Debug, Default)]
pub struct Inventory {
    records: Vec<TreeRecord>,
}

impl Inventory {
    pub fn new() -> Inventory {
        Inventory::default()
    }

    /// Prepend a record; the newest entry always sits at index 0.
    pub fn append(&mut self, record: TreeRecord) {
        self.records.insert(0, record);
    }

    /// Read-only view of the whole ordered collection.
    pub fn all(&self) -> &[TreeRecord] {
        &self.records
    }

    /// Replace the whole collection (session reload).
    pub fn replace_all(&mut self, records: Vec<TreeRecord>) {
        self.records = records;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Whole-file JSON store for the inventory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: &Path) -> JsonStore {
        JsonStore {
            path: path.to_path_buf(),
        }
    }

    /// Load the whole collection; a missing file is an empty inventory.
    pub fn load(&self) -> Result<Vec<TreeRecord>> {
        if !self.path.exists() {
            info!("No inventory at {} – starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read inventory: {}", self.path.display()))?;
        let records: Vec<TreeRecord> =
            serde_json::from_str(&text).context("Inventory JSON is invalid")?;
        info!(
            "Loaded {} record(s) from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Overwrite the file with the full ordered collection.
    ///
    /// Writes to a sibling temp file and renames it into place so a
    /// reader (or a crash mid-save) never sees a truncated inventory.
    pub fn save(&self, records: &[TreeRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(records)?;
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        std::fs::write(&tmp, text)
            .with_context(|| format!("Cannot write inventory: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Cannot replace inventory: {}", self.path.display()))?;
        Ok(())
    }
}
