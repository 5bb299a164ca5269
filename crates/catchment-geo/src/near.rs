//! Near-table generation: every centre inside each property's catchment

use catchment_core::config::{validate_radius, DEFAULT_SEARCH_RADIUS};
use catchment_core::error::Result;
use catchment_core::models::{NearPair, NearTable};

use crate::index::CentreIndex;
use crate::transform::ProjectedProperty;

/// Search parameters for a near table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearOptions {
    /// Catchment radius in working CRS units
    pub search_radius: f64,
    /// Keep only the N closest matches per property; 0 keeps all
    pub closest_count: usize,
}

impl Default for NearOptions {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SEARCH_RADIUS,
            closest_count: 0,
        }
    }
}

/// Generate the near table for `properties` against `index`.
///
/// Rows follow property order; within a property they are ranked by
/// distance, ties broken by centre id. Properties with no centre inside the
/// radius contribute no rows.
pub fn generate_near_table(
    properties: &[ProjectedProperty],
    index: &CentreIndex,
    options: &NearOptions,
) -> Result<NearTable> {
    validate_radius(options.search_radius)?;
    if index.is_empty() {
        tracing::debug!("No centres indexed; near table is empty");
        return Ok(NearTable::default());
    }

    let mut pairs = Vec::new();
    let mut matched = 0usize;
    for property in properties {
        let mut found = index.within(property.position, options.search_radius);
        if found.is_empty() {
            continue;
        }
        matched += 1;

        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        if options.closest_count > 0 {
            found.truncate(options.closest_count);
        }

        pairs.extend(found.into_iter().enumerate().map(|(rank, (centre_id, distance))| {
            NearPair {
                property_id: property.id,
                centre_id,
                distance,
                rank: rank as u32 + 1,
            }
        }));
    }

    tracing::debug!(
        "Near table: {} pairs for {}/{} properties within {}",
        pairs.len(),
        matched,
        properties.len(),
        options.search_radius
    );

    Ok(NearTable { pairs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catchment_core::error::CatchmentError;
    use catchment_core::models::{CentreId, CentrePoint, ObjectId};
    use proptest::prelude::*;

    fn property(id: u64, x: f64, y: f64) -> ProjectedProperty {
        ProjectedProperty {
            id: ObjectId(id),
            position: [x, y],
        }
    }

    #[test]
    fn test_pairs_are_ranked_by_distance() {
        let index = CentreIndex::build(&[
            CentrePoint::new(1, 200.0, 0.0),
            CentrePoint::new(2, 100.0, 0.0),
            CentrePoint::new(3, 0.0, 450.0),
        ]);
        let table =
            generate_near_table(&[property(1, 0.0, 0.0)], &index, &NearOptions::default()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.pairs[0].centre_id, CentreId(2));
        assert_eq!(table.pairs[0].rank, 1);
        assert_eq!(table.pairs[0].distance, 100.0);
        assert_eq!(table.pairs[1].centre_id, CentreId(1));
        assert_eq!(table.pairs[1].rank, 2);
    }

    #[test]
    fn test_unmatched_properties_produce_no_rows() {
        let index = CentreIndex::build(&[CentrePoint::new(1, 0.0, 0.0)]);
        let table = generate_near_table(
            &[property(1, 5000.0, 5000.0), property(2, 10.0, 0.0)],
            &index,
            &NearOptions::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.pairs[0].property_id, ObjectId(2));
    }

    #[test]
    fn test_equal_distances_tie_break_on_centre_id() {
        let index = CentreIndex::build(&[
            CentrePoint::new(7, 0.0, 100.0),
            CentrePoint::new(3, 100.0, 0.0),
        ]);
        let table =
            generate_near_table(&[property(1, 0.0, 0.0)], &index, &NearOptions::default()).unwrap();
        assert_eq!(table.pairs[0].centre_id, CentreId(3));
        assert_eq!(table.pairs[1].centre_id, CentreId(7));
    }

    #[test]
    fn test_closest_count_limits_matches() {
        let index = CentreIndex::build(&[
            CentrePoint::new(1, 10.0, 0.0),
            CentrePoint::new(2, 20.0, 0.0),
            CentrePoint::new(3, 30.0, 0.0),
        ]);
        let options = NearOptions {
            closest_count: 2,
            ..Default::default()
        };
        let table = generate_near_table(&[property(1, 0.0, 0.0)], &index, &options).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.pairs[1].centre_id, CentreId(2));
    }

    #[test]
    fn test_invalid_radius() {
        let index = CentreIndex::build(&[]);
        let options = NearOptions {
            search_radius: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            generate_near_table(&[], &index, &options),
            Err(CatchmentError::InvalidRadius { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_every_pair_is_inside_radius(
            centres in prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 0..40),
            px in -1000.0f64..1000.0,
            py in -1000.0f64..1000.0,
            radius in 1.0f64..800.0,
        ) {
            let points: Vec<CentrePoint> = centres
                .iter()
                .enumerate()
                .map(|(i, (x, y))| CentrePoint::new(i as u64 + 1, *x, *y))
                .collect();
            let index = CentreIndex::build(&points);
            let options = NearOptions { search_radius: radius, closest_count: 0 };
            let table = generate_near_table(&[property(1, px, py)], &index, &options).unwrap();

            let expected = points
                .iter()
                .filter(|c| ((c.position[0] - px).powi(2) + (c.position[1] - py).powi(2)).sqrt() <= radius)
                .count();
            prop_assert_eq!(table.len(), expected);
            for window in table.pairs.windows(2) {
                prop_assert!(window[0].distance <= window[1].distance);
            }
        }
    }
}
