//! Ecosystem service model.
//!
//! Converts trunk diameter (plus the coarse proximity-to-building class)
//! into annual stormwater interception, air-pollution removal, an energy
//! savings estimate, and a monetary valuation of all four categories.

use kanopi_common::tree::{AnnualValue, EcosystemServices, Proximity};

use crate::carbon::compute_carbon;

/// Leaf-area allometry: leaf_area = exp(A + B · ln dbh), m².
const LEAF_AREA_A: f64 = -2.2;
const LEAF_AREA_B: f64 = 1.8;
/// Annual interception per m² of leaf area, liters.
const STORMWATER_L_PER_M2: f64 = 180.0;
/// Annual pollutant removal per m² of leaf area, grams.
const POLLUTION_G_PER_M2: f64 = 1.5;

/// Fixed USD → IDR conversion.
const USD_TO_IDR: f64 = 16_000.0;
/// Unit prices, USD.
const CARBON_USD_PER_KG: f64 = 0.05;
const STORMWATER_USD_PER_L: f64 = 0.002;
const AIR_USD_PER_G: f64 = 0.08;
/// Energy savings for a tree near a building: base + slope × dbh, USD.
const ENERGY_BASE_USD: f64 = 10.0;
const ENERGY_USD_PER_CM: f64 = 0.25;

/// Height-from-diameter fallback used only for pricing carbon.
const PRICING_HEIGHT_RATIO: f64 = 0.5;

/// Compute the annual ecosystem services of a single tree.
///
/// `dbh ≤ 0` yields all-zero services including the monetary breakdown.
///
/// Carbon pricing approximates height as `dbh × 0.5` because true height
/// is not available here. The priced CO2 figure therefore disagrees with
/// the record's true `co2_sequestered_kg`; every monetary total on record
/// depends on that shortcut, so it must not be "corrected" silently.
pub fn compute_ecosystem_services(dbh_cm: f64, proximity: Proximity) -> EcosystemServices {
    if dbh_cm <= 0.0 {
        return EcosystemServices::ZERO;
    }

    let leaf_area_m2 = (LEAF_AREA_A + LEAF_AREA_B * dbh_cm.ln()).exp();
    let stormwater_intercepted_l = leaf_area_m2 * STORMWATER_L_PER_M2;
    let air_pollution_removed_g = leaf_area_m2 * POLLUTION_G_PER_M2;

    let energy_savings_idr = match proximity {
        Proximity::Near => (ENERGY_BASE_USD + ENERGY_USD_PER_CM * dbh_cm) * USD_TO_IDR,
        Proximity::Far | Proximity::None => 0.0,
    };

    let priced_co2_kg = compute_carbon(dbh_cm, dbh_cm * PRICING_HEIGHT_RATIO).co2_sequestered_kg;
    let carbon_idr = priced_co2_kg * CARBON_USD_PER_KG * USD_TO_IDR;
    let stormwater_idr = stormwater_intercepted_l * STORMWATER_USD_PER_L * USD_TO_IDR;
    let air_quality_idr = air_pollution_removed_g * AIR_USD_PER_G * USD_TO_IDR;
    let energy_idr = energy_savings_idr;

    EcosystemServices {
        stormwater_intercepted_l,
        air_pollution_removed_g,
        energy_savings_idr,
        annual_value: AnnualValue {
            carbon_idr,
            stormwater_idr,
            air_quality_idr,
            energy_idr,
            total_idr: carbon_idr + stormwater_idr + air_quality_idr + energy_idr,
        },
    }
}
