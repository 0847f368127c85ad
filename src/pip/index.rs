//! Spatial index for mangrove polygon lookups.

use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use crate::dataset::PolygonSet;

/// Wrapper for R-tree indexing of mangrove polygons
struct IndexedPolygon {
    geometry: MultiPolygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPolygon {
    fn new(geometry: MultiPolygon<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        Some(Self {
            envelope: rect_envelope(rect),
            geometry,
        })
    }
}

/// R-tree over polygon bounding boxes, in projected meters.
///
/// Candidates come from envelope intersection and are then tested exactly,
/// so results match a scan over every polygon.
pub struct MangroveIndex {
    tree: RTree<IndexedPolygon>,
}

impl MangroveIndex {
    /// Build spatial index from a loaded polygon set
    pub fn build(polygons: PolygonSet) -> Self {
        info!("Building spatial index for {} polygons...", polygons.len());

        let indexed: Vec<IndexedPolygon> = polygons
            .into_polygons()
            .into_iter()
            .filter_map(IndexedPolygon::new)
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// True if any polygon strictly contains the point
    pub fn contains(&self, point: &Point<f64>) -> bool {
        let query_envelope = AABB::from_point([point.x(), point.y()]);

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .any(|ip| ip.geometry.contains(point))
    }

    /// True if any polygon intersects the given area
    pub fn intersects(&self, area: &MultiPolygon<f64>) -> bool {
        let Some(rect) = area.bounding_rect() else {
            return false;
        };

        self.tree
            .locate_in_envelope_intersecting(&rect_envelope(rect))
            .any(|ip| ip.geometry.intersects(area))
    }

    /// Get total number of indexed polygons
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

fn rect_envelope(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}
