use crate::splitter::{regions_from_boundaries, BoundaryKey, Region};

/// Maps row keys to the region that owns them, given a table's split keys.
#[derive(Debug, Clone, Default)]
pub struct RegionRouter {
    boundaries: Vec<BoundaryKey>,
}

impl RegionRouter {
    pub fn new(boundaries: Vec<BoundaryKey>) -> Self {
        Self { boundaries }
    }

    pub fn region_count(&self) -> usize {
        self.boundaries.len() + 1
    }

    /// Index of the region holding `row`. Regions are `[start, end)`.
    pub fn route(&self, row: &[u8]) -> usize {
        self.boundaries
            .partition_point(|boundary| boundary.as_bytes() <= row)
    }

    pub fn regions(&self) -> Vec<Region> {
        regions_from_boundaries(&self.boundaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(keys: &[&str]) -> RegionRouter {
        RegionRouter::new(keys.iter().map(|k| BoundaryKey::new(*k)).collect())
    }

    #[test]
    fn test_unsplit_table_has_one_region() {
        let router = RegionRouter::default();
        assert_eq!(router.region_count(), 1);
        assert_eq!(router.route(b"anything"), 0);
    }

    #[test]
    fn test_boundary_belongs_to_upper_region() {
        let router = router(&["00002500", "00005000", "00007500"]);
        assert_eq!(router.route(b"00000000"), 0);
        assert_eq!(router.route(b"00002499"), 0);
        assert_eq!(router.route(b"00002500"), 1);
        assert_eq!(router.route(b"00007499"), 2);
        assert_eq!(router.route(b"00009999"), 3);
    }

    #[test]
    fn test_route_agrees_with_region_bounds() {
        let router = router(&["2500", "5000", "7500"]);
        let regions = router.regions();
        for row in ["0", "2500", "4999", "7500", "9", "00002500"] {
            let idx = router.route(row.as_bytes());
            assert!(regions[idx].contains(row.as_bytes()), "row {}", row);
        }
    }
}
