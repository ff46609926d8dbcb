//! Portfolio aggregation – rolls per-tree metrics into the summary
//! shapes consumed by the dashboard, map, and exports.

use serde::Serialize;

use kanopi_common::tree::{Condition, TreeRecord};

/// One species row, descending by count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesCount {
    pub name: String,
    pub value: u32,
}

/// One monetary category total; zero-sum categories are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: &'static str,
    pub value_idr: f64,
}

/// Summed sequestered CO2 for one condition; zero conditions are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionCarbon {
    pub name: &'static str,
    pub co2_kg: f64,
}

/// Portfolio-level statistics over the whole inventory.
///
/// Transient: recomputed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Default)]
pub struct PortfolioSummary {
    pub total_trees: u32,
    pub total_co2_kg: f64,
    pub total_stormwater_l: f64,
    pub total_pollution_g: f64,
    pub total_value_idr: f64,
    pub species: Vec<SpeciesCount>,
    pub monetary: Vec<CategoryTotal>,
    pub carbon_by_condition: Vec<ConditionCarbon>,
}

/// Summarize an ordered inventory.
///
/// Totals are unweighted sums; species counting is case-sensitive exact
/// match with ties kept in encounter order (stable sort).
pub fn summarize(trees: &[TreeRecord]) -> PortfolioSummary {
    if trees.is_empty() {
        return PortfolioSummary::default();
    }

    let mut total_co2_kg = 0.0;
    let mut total_stormwater_l = 0.0;
    let mut total_pollution_g = 0.0;
    let mut total_value_idr = 0.0;

    let mut species: Vec<SpeciesCount> = Vec::new();
    let mut monetary_sums = [0.0_f64; 4];
    let mut condition_sums = [0.0_f64; 3];

    for tree in trees {
        total_co2_kg += tree.carbon.co2_sequestered_kg;
        total_stormwater_l += tree.services.stormwater_intercepted_l;
        total_pollution_g += tree.services.air_pollution_removed_g;
        total_value_idr += tree.services.annual_value.total_idr;

        match species
            .iter_mut()
            .find(|s| s.name == tree.measurement.species)
        {
            Some(entry) => entry.value += 1,
            None => species.push(SpeciesCount {
                name: tree.measurement.species.clone(),
                value: 1,
            }),
        }

        let v = &tree.services.annual_value;
        monetary_sums[0] += v.carbon_idr;
        monetary_sums[1] += v.stormwater_idr;
        monetary_sums[2] += v.air_quality_idr;
        monetary_sums[3] += v.energy_idr;

        let idx = Condition::ALL
            .iter()
            .position(|c| *c == tree.measurement.condition)
            .unwrap_or(0);
        condition_sums[idx] += tree.carbon.co2_sequestered_kg;
    }

    // Stable sort keeps first-encounter order on equal counts.
    species.sort_by(|a, b| b.value.cmp(&a.value));

    // Zero-sum categories are filtered out of the breakdown; this is a
    // presentation rule, not a missing-data signal.
    const CATEGORY_NAMES: [&str; 4] = ["Carbon", "Stormwater", "Air Quality", "Energy"];
    let monetary = CATEGORY_NAMES
        .into_iter()
        .zip(monetary_sums)
        .filter(|(_, sum)| *sum != 0.0)
        .map(|(name, sum)| CategoryTotal {
            name,
            value_idr: sum,
        })
        .collect();

    let carbon_by_condition = Condition::ALL
        .into_iter()
        .zip(condition_sums)
        .filter(|(_, sum)| *sum != 0.0)
        .map(|(condition, sum)| ConditionCarbon {
            name: condition.name(),
            co2_kg: sum,
        })
        .collect();

    PortfolioSummary {
        total_trees: trees.len() as u32,
        total_co2_kg,
        total_stormwater_l,
        total_pollution_g,
        total_value_idr,
        species,
        monetary,
        carbon_by_condition,
    }
}
