//! Mangrove polygon dataset.
//!
//! Loaded once from GeoJSON at startup, repaired, reprojected to Web
//! Mercator and then held read-only for the lifetime of the process.

mod loader;
mod repair;

pub use loader::{load, load_or_empty, polygon_set_from_geojson};
pub use repair::{make_valid, Repaired};

use geo::MultiPolygon;

/// Valid, non-null polygons in EPSG:3857 meters.
///
/// An empty set doubles as the "dataset unavailable" state: every lookup
/// against it reports no match.
#[derive(Debug, Clone, Default)]
pub struct PolygonSet {
    polygons: Vec<MultiPolygon<f64>>,
}

impl PolygonSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap geometries that are already valid and projected to meters.
    pub fn from_projected(polygons: Vec<MultiPolygon<f64>>) -> Self {
        Self { polygons }
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MultiPolygon<f64>> {
        self.polygons.iter()
    }

    pub fn into_polygons(self) -> Vec<MultiPolygon<f64>> {
        self.polygons
    }
}
