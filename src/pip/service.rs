//! Membership checks for a single query point.

use geo::{Buffer, Point};
use serde::Serialize;
use tracing::debug;

use super::MangroveIndex;
use crate::dataset::PolygonSet;
use crate::error::GeometryError;
use crate::projection::WebMercator;

/// Radii above this already cover the whole Web Mercator plane.
const MAX_BUFFER_M: f64 = 1.0e9;

/// Result of a membership check, serialized as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Membership {
    Outside,
    Inside,
}

impl From<bool> for Membership {
    fn from(found: bool) -> Self {
        if found {
            Membership::Inside
        } else {
            Membership::Outside
        }
    }
}

impl From<Membership> for u8 {
    fn from(m: Membership) -> Self {
        match m {
            Membership::Outside => 0,
            Membership::Inside => 1,
        }
    }
}

/// Answers "is this point in or near a mangrove polygon?"
pub struct MembershipChecker {
    index: MangroveIndex,
    projection: Option<WebMercator>,
}

impl MembershipChecker {
    /// Create a checker over a loaded polygon set, projecting queries with
    /// the same projection the set was loaded with
    pub fn new(polygons: PolygonSet, projection: WebMercator) -> Self {
        Self {
            index: MangroveIndex::build(polygons),
            projection: Some(projection),
        }
    }

    /// A checker with no data and no projection; every check is 0
    pub fn unavailable() -> Self {
        Self {
            index: MangroveIndex::build(PolygonSet::empty()),
            projection: None,
        }
    }

    /// Check a lat/lon point, optionally buffered by `buffer_km` kilometers.
    ///
    /// With `buffer_km > 0` a circle of that radius is tested for
    /// intersection; otherwise the point itself must lie strictly inside a
    /// polygon. Any geometry failure counts as [`Membership::Outside`].
    pub fn check(&self, lat: f64, lon: f64, buffer_km: i64) -> Membership {
        if self.index.is_empty() {
            return Membership::Outside;
        }

        match self.try_check(lat, lon, buffer_km) {
            Ok(found) => found.into(),
            Err(e) => {
                debug!("Check at ({}, {}) buffer {} km failed: {}", lat, lon, buffer_km, e);
                Membership::Outside
            }
        }
    }

    /// Fallible form of [`check`](Self::check).
    pub fn try_check(&self, lat: f64, lon: f64, buffer_km: i64) -> Result<bool, GeometryError> {
        let projection = self
            .projection
            .as_ref()
            .ok_or(GeometryError::ProjectionUnavailable)?;
        let point = projection.to_web_mercator(Point::new(lon, lat))?;

        if buffer_km > 0 {
            let radius_m = (buffer_km as f64 * 1000.0).min(MAX_BUFFER_M);
            let area = point.buffer(radius_m);
            if area.0.is_empty() {
                return Err(GeometryError::EmptyBuffer(radius_m));
            }
            Ok(self.index.intersects(&area))
        } else {
            Ok(self.index.contains(&point))
        }
    }

    /// Number of polygons available for lookups
    pub fn polygon_count(&self) -> usize {
        self.index.len()
    }
}
