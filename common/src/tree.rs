//! Tree record types shared between intake, the benefit engine, and export.

use serde::{Deserialize, Serialize};

/// Coarse proximity of a tree to the nearest building.
///
/// Only used to gate the energy-savings estimate; `Far` and `None` are
/// treated identically by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Proximity {
    #[default]
    None,
    Near,
    Far,
}

impl Proximity {
    pub fn name(&self) -> &'static str {
        match self {
            Proximity::None => "None",
            Proximity::Near => "Near",
            Proximity::Far => "Far",
        }
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Health condition of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    #[default]
    Healthy,
    Damaged,
    Dead,
}

impl Condition {
    /// The three conditions in the fixed display order used by summaries.
    pub const ALL: [Condition; 3] = [Condition::Healthy, Condition::Damaged, Condition::Dead];

    /// Parse a free-form condition label, case-insensitively.
    ///
    /// Unrecognized values fall back to `Healthy`. The image-analysis
    /// service is untrusted and occasionally invents labels; a wrong
    /// default is preferred over dropping the whole estimate.
    pub fn parse_loose(s: &str) -> Condition {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" => Condition::Healthy,
            "damaged" => Condition::Damaged,
            "dead" => Condition::Dead,
            _ => Condition::Healthy,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Condition::Healthy => "Healthy",
            Condition::Damaged => "Damaged",
            Condition::Dead => "Dead",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw field measurement of a single tree, as captured on site.
///
/// Validation (non-empty species, positive dimensions, sane coordinates)
/// happens at intake; the benefit models accept whatever arrives and
/// return zeros for non-positive dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub species: String,
    /// Diameter at breast height, centimeters.
    pub dbh_cm: f64,
    /// Total height, meters.
    pub height_m: f64,
    pub proximity: Proximity,
    pub condition: Condition,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub notes: String,
    /// Opaque photo reference (path or URL); never interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Above-ground carbon metrics derived from a measurement.
///
/// Invariants: all fields are ≥ 0 and all are exactly 0 when the source
/// dimensions are non-positive; `carbon_stored_kg = biomass_kg × 0.47`
/// and `co2_sequestered_kg = carbon_stored_kg × 3.67`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CarbonMetrics {
    pub biomass_kg: f64,
    pub carbon_stored_kg: f64,
    pub co2_sequestered_kg: f64,
}

impl CarbonMetrics {
    pub const ZERO: CarbonMetrics = CarbonMetrics {
        biomass_kg: 0.0,
        carbon_stored_kg: 0.0,
        co2_sequestered_kg: 0.0,
    };
}

/// Annual monetary value of one tree, in IDR, broken down by category.
///
/// `total_idr` is always the exact sum of the four components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AnnualValue {
    pub carbon_idr: f64,
    pub stormwater_idr: f64,
    pub air_quality_idr: f64,
    pub energy_idr: f64,
    pub total_idr: f64,
}

/// Ecosystem services a single tree provides per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EcosystemServices {
    pub stormwater_intercepted_l: f64,
    pub air_pollution_removed_g: f64,
    /// Nonzero only when the tree stands `Near` a building.
    pub energy_savings_idr: f64,
    pub annual_value: AnnualValue,
}

impl EcosystemServices {
    pub const ZERO: EcosystemServices = EcosystemServices {
        stormwater_intercepted_l: 0.0,
        air_pollution_removed_g: 0.0,
        energy_savings_idr: 0.0,
        annual_value: AnnualValue {
            carbon_idr: 0.0,
            stormwater_idr: 0.0,
            air_quality_idr: 0.0,
            energy_idr: 0.0,
            total_idr: 0.0,
        },
    };
}

/// A fully assembled inventory entry: measurement plus derived metrics.
///
/// Created once at submission time, never mutated afterward. The owning
/// collection keeps records newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRecord {
    pub id: String,
    /// ISO-8601 inventory timestamp in the local timezone.
    pub recorded_at: String,
    #[serde(flatten)]
    pub measurement: Measurement,
    pub carbon: CarbonMetrics,
    pub services: EcosystemServices,
}

impl std::fmt::Display for TreeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TreeRecord({}, {}, dbh={:.1}cm, {}, {})",
            self.id,
            self.measurement.species,
            self.measurement.dbh_cm,
            self.measurement.condition,
            self.recorded_at
        )
    }
}
