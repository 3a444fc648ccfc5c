use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use rstar::{AABB, RTree, RTreeObject};

/// Bounding box of one layer geometry, indexed by row.
#[derive(Debug, Clone)]
struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Spatial index over a layer's polygons, used to resolve a clicked
/// coordinate to the feature under it.
#[derive(Debug, Clone)]
pub(crate) struct PolygonIndex {
    rtree: RTree<BoundingBox>,
}

impl PolygonIndex {
    /// Build an index from layer geometries. Empty multipolygons are skipped.
    pub(crate) fn new(geoms: &[MultiPolygon<f64>]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                geoms
                    .iter()
                    .enumerate()
                    .filter_map(|(i, mp)| mp.bounding_rect().map(|bbox| BoundingBox { idx: i, bbox }))
                    .collect(),
            ),
        }
    }

    /// Row index of the geometry containing the point, if any. Among bbox
    /// candidates the lowest row index wins, so overlapping inputs still
    /// resolve the same way every time.
    pub(crate) fn locate(&self, geoms: &[MultiPolygon<f64>], lon: f64, lat: f64) -> Option<usize> {
        let pt = Point::new(lon, lat);
        let env = AABB::from_corners([lon, lat], [lon, lat]);

        self.rtree
            .locate_in_envelope_intersecting(&env)
            .map(|bb| bb.idx)
            .filter(|&i| geoms[i].contains(&pt))
            .min()
    }
}
