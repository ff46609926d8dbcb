//! Image-analysis service response protocol.
//!
//! The service inspects a photo (plus free-text notes) and returns a
//! best-effort structural estimate of the tree.  The response shape is
//! loose JSON and the service is untrusted, so parsing probes the value
//! field by field and degrades to a tagged `Malformed` outcome instead
//! of an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tree::Condition;

/// A best-effort structural estimate inferred from a photo.
///
/// Every field may be wrong; explicit user-entered values always take
/// precedence during intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionEstimate {
    pub species: Option<String>,
    pub condition: Condition,
    pub dbh_cm: Option<f64>,
    pub height_m: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Outcome of parsing a service response.
#[derive(Debug, Clone)]
pub enum VisionOutcome {
    Estimate(VisionEstimate),
    Malformed(String),
}

/// Parse the raw JSON body returned by the image-analysis service.
///
/// A response is `Malformed` when it is not an object or when it carries
/// neither a species nor a diameter (nothing usable). An unrecognized
/// condition label falls back to `Healthy` rather than rejecting the
/// whole estimate.
pub fn parse_response(body: &serde_json::Value) -> VisionOutcome {
    let obj = match body.as_object() {
        Some(o) => o,
        None => return VisionOutcome::Malformed("response is not a JSON object".into()),
    };

    let species = obj
        .get("species")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let condition = match obj.get("condition").and_then(|v| v.as_str()) {
        Some(raw) => {
            let parsed = Condition::parse_loose(raw);
            if !raw.trim().eq_ignore_ascii_case(parsed.name()) {
                warn!("Unrecognized condition {raw:?} from vision service, assuming Healthy");
            }
            parsed
        }
        None => Condition::Healthy,
    };

    let dbh_cm = obj.get("dbh_cm").and_then(|v| v.as_f64());
    let height_m = obj.get("height_m").and_then(|v| v.as_f64());
    let latitude = obj.get("latitude").and_then(|v| v.as_f64());
    let longitude = obj.get("longitude").and_then(|v| v.as_f64());

    if species.is_none() && dbh_cm.is_none() {
        return VisionOutcome::Malformed("no species and no dbh in response".into());
    }

    VisionOutcome::Estimate(VisionEstimate {
        species,
        condition,
        dbh_cm,
        height_m,
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let body = serde_json::json!({
            "species": "Pterocarpus indicus",
            "condition": "damaged",
            "dbh_cm": 42.0,
            "height_m": 18.5,
            "latitude": -6.2,
            "longitude": 106.8,
        });
        match parse_response(&body) {
            VisionOutcome::Estimate(e) => {
                assert_eq!(e.species.as_deref(), Some("Pterocarpus indicus"));
                assert_eq!(e.condition, Condition::Damaged);
                assert_eq!(e.dbh_cm, Some(42.0));
                assert_eq!(e.height_m, Some(18.5));
            }
            VisionOutcome::Malformed(reason) => panic!("unexpected malformed: {reason}"),
        }
    }

    #[test]
    fn test_unknown_condition_falls_back_to_healthy() {
        let body = serde_json::json!({
            "species": "Jati",
            "condition": "flourishing",
        });
        match parse_response(&body) {
            VisionOutcome::Estimate(e) => assert_eq!(e.condition, Condition::Healthy),
            VisionOutcome::Malformed(reason) => panic!("unexpected malformed: {reason}"),
        }
    }

    #[test]
    fn test_non_object_is_malformed() {
        let body = serde_json::json!([1, 2, 3]);
        assert!(matches!(parse_response(&body), VisionOutcome::Malformed(_)));
    }

    #[test]
    fn test_empty_object_is_malformed() {
        let body = serde_json::json!({ "confidence": 0.9 });
        assert!(matches!(parse_response(&body), VisionOutcome::Malformed(_)));
    }
}
