//! Allometric carbon model.
//!
//! Converts (dbh, height) into above-ground biomass, stored carbon, and
//! annual CO2-equivalent sequestration using a single generic tropical
//! allometric equation. No per-species density or regional adjustment.

use kanopi_common::tree::CarbonMetrics;

/// Generic tropical-tree wood density, g/cm³.
const WOOD_DENSITY: f64 = 0.6;
/// Chave-style allometry: biomass = COEF × (ρ · dbh² · height)^EXP.
const BIOMASS_COEF: f64 = 0.0673;
const BIOMASS_EXP: f64 = 0.976;
/// Carbon fraction of dry biomass.
const CARBON_FRACTION: f64 = 0.47;
/// CO2-equivalent mass per unit carbon (44/12).
const CO2_PER_CARBON: f64 = 3.67;

/// Compute carbon metrics for a single tree.
///
/// Non-positive dimensions yield all-zero metrics rather than an error;
/// NaN inputs propagate through the arithmetic unchanged.
pub fn compute_carbon(dbh_cm: f64, height_m: f64) -> CarbonMetrics {
    if dbh_cm <= 0.0 || height_m <= 0.0 {
        return CarbonMetrics::ZERO;
    }

    let biomass_kg = BIOMASS_COEF * (WOOD_DENSITY * dbh_cm * dbh_cm * height_m).powf(BIOMASS_EXP);
    let carbon_stored_kg = biomass_kg * CARBON_FRACTION;
    let co2_sequestered_kg = carbon_stored_kg * CO2_PER_CARBON;

    CarbonMetrics {
        biomass_kg,
        carbon_stored_kg,
        co2_sequestered_kg,
    }
}
