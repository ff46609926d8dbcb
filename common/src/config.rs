//! Configuration parsing – reads a KEY=VALUE file (`kanopi.conf`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Application configuration for the inventory engine.
#[derive(Debug, Clone)]
pub struct Config {
    // ── site location (fallback for submissions without GPS) ─────────
    pub latitude: f64,
    pub longitude: f64,

    // ── storage ──────────────────────────────────────────────────────
    /// JSON file holding the whole ordered inventory.
    pub inventory_path: PathBuf,
    /// Directory where CSV exports and the summary snapshot are written.
    pub export_dir: PathBuf,

    // ── intake ───────────────────────────────────────────────────────
    /// Directory polled for submission JSON files.
    pub intake_dir: PathBuf,
    pub poll_interval_secs: u64,

    // ── image-analysis service ───────────────────────────────────────
    /// Base URL of the image-analysis service; absent disables it.
    pub vision_url: Option<String>,
    pub vision_timeout_secs: u64,
}

impl Config {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/kanopi/kanopi.conf"
    }

    /// Convenience: the summary snapshot path under `export_dir`.
    pub fn summary_path(&self) -> PathBuf {
        self.export_dir.join("summary.json")
    }

    /// Convenience: the CSV export path under `export_dir`.
    pub fn csv_path(&self) -> PathBuf {
        self.export_dir.join("inventory.csv")
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored.
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let map = parse_conf(&text);
    info!("Loaded config from {}", path.display());

    let get = |key: &str| -> Option<String> { map.get(key).cloned() };
    let get_f64 = |key: &str, default: f64| -> f64 {
        get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    };
    let get_u64 = |key: &str, default: u64| -> u64 {
        get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    let export_dir = PathBuf::from(get("EXPORT_DIR").unwrap_or_else(|| "/data/export".into()));

    Ok(Config {
        latitude: get_f64("LATITUDE", 0.0),
        longitude: get_f64("LONGITUDE", 0.0),
        inventory_path: PathBuf::from(
            get("INVENTORY_PATH").unwrap_or_else(|| "/data/inventory.json".into()),
        ),
        export_dir,
        intake_dir: PathBuf::from(get("INTAKE_DIR").unwrap_or_else(|| "/data/intake".into())),
        poll_interval_secs: get_u64("POLL_INTERVAL_SECS", 5),
        vision_url: get("VISION_URL").filter(|s| !s.is_empty()),
        vision_timeout_secs: get_u64("VISION_TIMEOUT_SECS", 30),
    })
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conf() {
        let text = r#"
# comment
LATITUDE=-6.2088
LONGITUDE="106.8456"
INVENTORY_PATH=/data/trees.json
VISION_URL="http://vision:9000"
"#;
        let map = parse_conf(text);
        assert_eq!(map["LATITUDE"], "-6.2088");
        assert_eq!(map["LONGITUDE"], "106.8456");
        assert_eq!(map["VISION_URL"], "http://vision:9000");
    }

    #[test]
    fn test_config_defaults_and_paths() {
        let text = "EXPORT_DIR=/tmp/kanopi_export\n";
        let tmp = tempfile(text);
        let config = load(tmp.as_path()).unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert!(config.vision_url.is_none());
        assert_eq!(
            config.summary_path(),
            PathBuf::from("/tmp/kanopi_export/summary.json")
        );
        assert_eq!(
            config.csv_path(),
            PathBuf::from("/tmp/kanopi_export/inventory.csv")
        );
    }

    fn tempfile(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("kanopi_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.conf");
        std::fs::write(&path, content).unwrap();
        path
    }
}
