//! Inverse-distance weighting, per-property aggregation and the join back
//! onto the property table

use catchment_core::error::{CatchmentError, Result};
use catchment_core::models::{
    Crs, NearPair, NearTable, ObjectId, PropertyTable, ScoredProperty, ScoredTable, WeightSum,
    WeightedPair,
};
use catchment_geo::ProjectedProperty;
use std::collections::{BTreeMap, HashMap};

/// Decimal places kept in the final score
pub const SCORE_DECIMALS: u32 = 3;

/// Weight of one near pair: 1 / distance
pub fn inverse_distance(pair: &NearPair) -> Result<f64> {
    if pair.distance <= 0.0 {
        return Err(CatchmentError::CoincidentPoints {
            property: pair.property_id,
            centre: pair.centre_id,
        });
    }
    Ok(1.0 / pair.distance)
}

/// Attach a weight to every pair of the near table
pub fn calculate_weights(table: &NearTable) -> Result<Vec<WeightedPair>> {
    table
        .iter()
        .map(|pair| {
            Ok(WeightedPair {
                pair: *pair,
                weight: inverse_distance(pair)?,
            })
        })
        .collect()
}

/// Sum weights per property
pub fn summarize(weighted: &[WeightedPair]) -> BTreeMap<ObjectId, WeightSum> {
    let mut sums: BTreeMap<ObjectId, WeightSum> = BTreeMap::new();
    for item in weighted {
        let entry = sums.entry(item.pair.property_id).or_insert(WeightSum {
            property_id: item.pair.property_id,
            total: 0.0,
            count: 0,
        });
        entry.total += item.weight;
        entry.count += 1;
    }
    sums
}

/// Round to `places` decimals on the exact binary value, ties to even:
/// 0.0625 becomes 0.062.
pub fn round_to(value: f64, places: u32) -> f64 {
    let rounded = format!("{:.*}", places as usize, value)
        .parse::<f64>()
        .unwrap_or(value);
    // Avoid emitting -0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Join summed weights onto the property table.
///
/// Every property gets exactly one score: its rounded sum, or 0 when it has
/// no centre in range. A column already named `field_name` is replaced.
pub fn join_weights(
    properties: &PropertyTable,
    projected: &[ProjectedProperty],
    sums: &BTreeMap<ObjectId, WeightSum>,
    field_name: &str,
    crs: &Crs,
) -> Result<ScoredTable> {
    let positions: HashMap<ObjectId, [f64; 2]> =
        projected.iter().map(|p| (p.id, p.position)).collect();

    let replaced = properties.column_index(field_name);
    if replaced.is_some() {
        tracing::warn!("Input already has a '{}' column; it will be replaced", field_name);
    }
    let keep = |idx: &usize| Some(*idx) != replaced;

    let headers: Vec<String> = properties
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| keep(idx))
        .map(|(_, h)| h.clone())
        .collect();

    let rows = properties
        .records
        .iter()
        .map(|record| {
            let position = positions
                .get(&record.id)
                .copied()
                .ok_or(CatchmentError::UnprojectedProperty { property: record.id })?;
            let total = sums.get(&record.id).map(|s| s.total).unwrap_or(0.0);
            let attributes = record
                .attributes
                .iter()
                .enumerate()
                .filter(|(idx, _)| keep(idx))
                .map(|(_, v)| v.clone())
                .collect();

            Ok(ScoredProperty {
                id: record.id,
                position,
                attributes,
                score: round_to(total, SCORE_DECIMALS),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScoredTable {
        headers,
        field_name: field_name.to_string(),
        crs: crs.clone(),
        rows,
    })
}
