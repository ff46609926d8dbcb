//! Field submission protocol.
//!
//! A submission is the JSON payload a field device drops into the intake
//! directory: a partial measurement, possibly just a photo reference and
//! notes. Resolution merges it with the site defaults and an optional
//! vision estimate into a complete `Measurement`.

use serde::{Deserialize, Serialize};

use crate::tree::{Condition, Measurement, Proximity};
use crate::vision::VisionEstimate;

/// A partial measurement as submitted from the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub species: Option<String>,
    pub dbh_cm: Option<f64>,
    pub height_m: Option<f64>,
    pub proximity: Option<Proximity>,
    /// Free-form condition label, parsed loosely.
    pub condition: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: String,
    pub photo: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("no species: not submitted and no usable vision estimate")]
    MissingSpecies,
}

impl Submission {
    /// Whether a vision estimate could add anything to this submission.
    pub fn wants_vision(&self) -> bool {
        self.photo.is_some()
            && (self.species.is_none() || self.dbh_cm.is_none() || self.height_m.is_none())
    }

    /// Merge into a complete `Measurement`.
    ///
    /// Precedence per field: submitted value, then vision estimate, then
    /// site default (coordinates) or zero (dimensions).  Dimensions that
    /// remain unknown resolve to 0.0 and flow through the benefit models
    /// as all-zero metrics rather than failing here.
    pub fn resolve(
        &self,
        site: (f64, f64),
        estimate: Option<&VisionEstimate>,
    ) -> Result<Measurement, SubmissionError> {
        let species = self
            .species
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| estimate.and_then(|e| e.species.clone()))
            .ok_or(SubmissionError::MissingSpecies)?;

        let condition = match &self.condition {
            Some(raw) => Condition::parse_loose(raw),
            None => estimate.map(|e| e.condition).unwrap_or_default(),
        };

        Ok(Measurement {
            species,
            dbh_cm: self
                .dbh_cm
                .or_else(|| estimate.and_then(|e| e.dbh_cm))
                .unwrap_or(0.0),
            height_m: self
                .height_m
                .or_else(|| estimate.and_then(|e| e.height_m))
                .unwrap_or(0.0),
            proximity: self.proximity.unwrap_or_default(),
            condition,
            latitude: self
                .latitude
                .or_else(|| estimate.and_then(|e| e.latitude))
                .unwrap_or(site.0),
            longitude: self
                .longitude
                .or_else(|| estimate.and_then(|e| e.longitude))
                .unwrap_or(site.1),
            notes: self.notes.clone(),
            photo: self.photo.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate() -> VisionEstimate {
        VisionEstimate {
            species: Some("Mahoni".into()),
            condition: Condition::Damaged,
            dbh_cm: Some(33.0),
            height_m: Some(14.0),
            latitude: Some(-6.9),
            longitude: Some(107.6),
        }
    }

    #[test]
    fn test_submitted_fields_win_over_estimate() {
        let sub = Submission {
            species: Some("Jati".into()),
            dbh_cm: Some(50.0),
            condition: Some("dead".into()),
            ..Default::default()
        };
        let m = sub.resolve((0.0, 0.0), Some(&estimate())).unwrap();
        assert_eq!(m.species, "Jati");
        assert_eq!(m.dbh_cm, 50.0);
        assert_eq!(m.condition, Condition::Dead);
        // Height not submitted: taken from the estimate.
        assert_eq!(m.height_m, 14.0);
    }

    #[test]
    fn test_estimate_fills_missing_fields() {
        let sub = Submission {
            photo: Some("photos/0001.jpg".into()),
            ..Default::default()
        };
        assert!(sub.wants_vision());
        let m = sub.resolve((-6.2, 106.8), Some(&estimate())).unwrap();
        assert_eq!(m.species, "Mahoni");
        assert_eq!(m.condition, Condition::Damaged);
        assert_eq!(m.latitude, -6.9);
    }

    #[test]
    fn test_site_default_coordinates() {
        let sub = Submission {
            species: Some("Pinus".into()),
            ..Default::default()
        };
        let m = sub.resolve((-6.2, 106.8), None).unwrap();
        assert_eq!(m.latitude, -6.2);
        assert_eq!(m.longitude, 106.8);
        // Unknown dimensions resolve to zero, not an error.
        assert_eq!(m.dbh_cm, 0.0);
        assert_eq!(m.height_m, 0.0);
    }

    #[test]
    fn test_missing_species_is_an_error() {
        let sub = Submission::default();
        assert!(matches!(
            sub.resolve((0.0, 0.0), None),
            Err(SubmissionError::MissingSpecies)
        ));
    }
}
