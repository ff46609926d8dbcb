//! HTTP client for the image-analysis service.
//!
//! The service is fallible and untrusted: any transport failure, non-2xx
//! status, or malformed body degrades to `None` with a warning so intake
//! never stalls on it.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use kanopi_common::config::Config;
use kanopi_common::vision::{parse_response, VisionEstimate, VisionOutcome};

pub struct VisionClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl VisionClient {
    /// Build a client from config; `None` when no service is configured.
    pub fn from_config(config: &Config) -> Result<Option<VisionClient>> {
        let base_url = match &config.vision_url {
            Some(url) => url.clone(),
            None => return Ok(None),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.vision_timeout_secs))
            .build()
            .context("Cannot create HTTP client")?;
        Ok(Some(VisionClient { client, base_url }))
    }

    /// Ask the service for a structural estimate of the photographed tree.
    ///
    /// Best effort: returns `None` on any failure.
    pub fn analyze(&self, photo: &str, notes: &str) -> Option<VisionEstimate> {
        match self.request(photo, notes) {
            Ok(VisionOutcome::Estimate(estimate)) => {
                debug!("Vision estimate: {estimate:?}");
                Some(estimate)
            }
            Ok(VisionOutcome::Malformed(reason)) => {
                warn!("Vision response malformed: {reason}");
                None
            }
            Err(e) => {
                warn!("Vision service unavailable: {e:#}");
                None
            }
        }
    }

    fn request(&self, photo: &str, notes: &str) -> Result<VisionOutcome> {
        let url = format!("{}/api/analyze", self.base_url);
        let body = serde_json::json!({ "photo": photo, "notes": notes });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .context("POST /api/analyze")?;

        if !resp.status().is_success() {
            anyhow::bail!("POST /api/analyze returned {}", resp.status());
        }

        let value: serde_json::Value = resp.json().context("Parse analyze JSON")?;
        Ok(parse_response(&value))
    }
}
