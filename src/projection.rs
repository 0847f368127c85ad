//! EPSG:4326 -> EPSG:3857 (Web Mercator) reprojection through PROJ.
//!
//! All polygons and query points are compared in projected meters so that
//! buffer radii can be given in kilometers.

use std::sync::{Mutex, PoisonError};

use geo::{Coord, CoordsIter, Point};
use proj::{Proj, ProjCreateError, Transform};

use crate::error::GeometryError;

pub const SOURCE_CRS: &str = "EPSG:4326";
pub const TARGET_CRS: &str = "EPSG:3857";

/// Lon/lat degrees to Web Mercator meters.
///
/// Created once at startup and shared by the loader and every query. A
/// `Proj` handle is not `Sync`, so lookups serialize on the mutex.
pub struct WebMercator {
    proj: Mutex<SendProj>,
}

/// `Proj` holds raw PROJ pointers and so is not `Send`. Each `Proj` owns its
/// own PROJ context, and PROJ allows a context to move between threads as long
/// as only one thread uses it at a time, which the mutex above guarantees.
struct SendProj(Proj);

// SAFETY: see `SendProj`; access is serialized by `WebMercator::proj`.
unsafe impl Send for SendProj {}

impl WebMercator {
    pub fn new() -> Result<Self, ProjCreateError> {
        // Axis order is normalized to x = lon, y = lat
        let proj = Proj::new_known_crs(SOURCE_CRS, TARGET_CRS, None)?;
        Ok(Self {
            proj: Mutex::new(SendProj(proj)),
        })
    }

    /// Project a single lon/lat point.
    pub fn to_web_mercator(&self, point: Point<f64>) -> Result<Point<f64>, GeometryError> {
        check_finite(point.0)?;
        let projected = self.project_geometry(&point)?;
        check_finite(projected.0)?;
        Ok(projected)
    }

    /// Project every coordinate of a geometry.
    pub fn project_geometry<G>(&self, geometry: &G) -> Result<G, GeometryError>
    where
        G: Transform<f64, Output = G> + CoordsIter<Scalar = f64>,
    {
        let projected = {
            let proj = self.proj.lock().unwrap_or_else(PoisonError::into_inner);
            geometry.transformed(&proj.0)?
        };

        let non_finite = projected
            .coords_iter()
            .find(|c| !(c.x.is_finite() && c.y.is_finite()));
        match non_finite {
            Some(c) => Err(GeometryError::NonFinite { x: c.x, y: c.y }),
            None => Ok(projected),
        }
    }
}

fn check_finite(coord: Coord<f64>) -> Result<(), GeometryError> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite {
            x: coord.x,
            y: coord.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, BoundingRect, MultiPolygon};

    #[test]
    fn test_known_projection() {
        let mercator = WebMercator::new().unwrap();
        let p = mercator
            .to_web_mercator(point!(x: -36.508, y: -54.2815))
            .unwrap();
        assert!((p.x() - -4_064_052.0).abs() < 1.0);
        assert!((p.y() - -7_223_650.5).abs() < 1.0);
    }

    #[test]
    fn test_sundarbans() {
        let mercator = WebMercator::new().unwrap();
        let p = mercator.to_web_mercator(point!(x: 88.75, y: 21.95)).unwrap();
        assert!((p.x() - 9_879_604.81).abs() < 0.01);
        assert!((p.y() - 2_505_523.20).abs() < 0.01);
    }

    #[test]
    fn test_longitude_wraps() {
        let mercator = WebMercator::new().unwrap();
        let p = mercator.to_web_mercator(point!(x: 88.75, y: 21.95)).unwrap();
        for lon in [448.75, -271.25] {
            let wrapped = mercator.to_web_mercator(point!(x: lon, y: 21.95)).unwrap();
            assert!((wrapped.x() - p.x()).abs() < 0.01, "lon {lon} gave {wrapped:?}");
            assert!((wrapped.y() - p.y()).abs() < 0.01);
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let mercator = WebMercator::new().unwrap();
        let err = mercator
            .to_web_mercator(point!(x: f64::NAN, y: 10.0))
            .unwrap_err();
        assert!(matches!(err, GeometryError::NonFinite { .. }));
        assert!(mercator
            .to_web_mercator(point!(x: f64::INFINITY, y: 0.0))
            .is_err());
    }

    #[test]
    fn test_pole_rejected() {
        let mercator = WebMercator::new().unwrap();
        assert!(mercator.to_web_mercator(point!(x: 0.0, y: 95.0)).is_err());
    }

    #[test]
    fn test_project_polygon() {
        let mercator = WebMercator::new().unwrap();
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        let projected = mercator
            .project_geometry(&MultiPolygon::new(vec![square]))
            .unwrap();
        let rect = projected.bounding_rect().unwrap();
        assert!((rect.max().x - 111_319.49).abs() < 0.01);
        assert!(rect.min().x.abs() < 1e-6);
    }
}
