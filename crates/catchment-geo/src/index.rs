use catchment_core::models::{CentreId, CentrePoint};
use geo::{Distance, Euclidean, Point};
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedCentre = GeomWithData<[f64; 2], CentreId>;

/// R*-tree over projected centre positions
pub struct CentreIndex {
    tree: RTree<IndexedCentre>,
}

impl CentreIndex {
    /// Bulk-load the index from projected centres
    pub fn build(centres: &[CentrePoint]) -> Self {
        let items: Vec<IndexedCentre> = centres
            .iter()
            .map(|centre| GeomWithData::new(centre.position, centre.id))
            .collect();

        Self { tree: RTree::bulk_load(items) }
    }

    /// Every centre whose planar distance to `position` is at most
    /// `radius`, with that distance, in no particular order
    pub fn within(&self, position: [f64; 2], radius: f64) -> Vec<(CentreId, f64)> {
        let origin = Point::from(position);
        self.tree
            .locate_within_distance(position, radius * radius)
            .map(|item| (item.data, Euclidean.distance(origin, Point::from(*item.geom()))))
            .filter(|(_, distance)| *distance <= radius)
            .collect()
    }

    /// Get the total number of centres in the index
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CentreIndex {
        CentreIndex::build(&[
            CentrePoint::new(1, 0.0, 0.0),
            CentrePoint::new(2, 300.0, 400.0),
            CentrePoint::new(3, 1000.0, 1000.0),
        ])
    }

    #[test]
    fn test_index_creation() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert!(CentreIndex::build(&[]).is_empty());
    }

    #[test]
    fn test_within_radius() {
        let mut found = index().within([0.0, 0.0], 600.0);
        found.sort_by_key(|(id, _)| *id);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (CentreId(1), 0.0));
        assert_eq!(found[1].0, CentreId(2));
        assert!((found[1].1 - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let found = index().within([0.0, 0.0], 500.0);
        assert!(found.iter().any(|(id, _)| *id == CentreId(2)));

        let found = index().within([0.0, 0.0], 499.999);
        assert!(!found.iter().any(|(id, _)| *id == CentreId(2)));
    }
}
