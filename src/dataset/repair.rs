use geo::{Coord, LineString, MultiPolygon, Polygon, Validation};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::float::simplify::SimplifyShape;

/// Outcome of validating a source geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Repaired {
    /// Already valid, returned untouched
    Valid(MultiPolygon<f64>),
    /// Was invalid and has been rebuilt
    Fixed(MultiPolygon<f64>),
    /// Nothing with area survived the rebuild
    Empty,
}

impl Repaired {
    pub fn into_geometry(self) -> Option<MultiPolygon<f64>> {
        match self {
            Repaired::Valid(mp) | Repaired::Fixed(mp) => Some(mp),
            Repaired::Empty => None,
        }
    }
}

type Shape = Vec<Vec<[f64; 2]>>;

/// Turn a possibly invalid multipolygon into the nearest valid one.
///
/// Each member is re-noded at its self-crossings and filled even-odd, so
/// every lobe of a twisted ring survives whatever its winding (a bowtie
/// becomes its two triangles) and holes stay holes. The cleaned members
/// then come out consistently oriented and are merged with a non-zero fill,
/// which unions any overlap between them.
pub fn make_valid(geometry: MultiPolygon<f64>) -> Repaired {
    if geometry.0.is_empty() {
        return Repaired::Empty;
    }

    if geometry.is_valid() {
        return Repaired::Valid(geometry);
    }

    let cleaned: Vec<Shape> = geometry
        .iter()
        .flat_map(|polygon| polygon_to_shape(polygon).simplify_shape(FillRule::EvenOdd))
        .collect();

    let merged = if cleaned.len() > 1 {
        cleaned.simplify_shape(FillRule::NonZero)
    } else {
        cleaned
    };

    let polygons: Vec<Polygon<f64>> = merged.into_iter().filter_map(shape_to_polygon).collect();
    if polygons.is_empty() {
        Repaired::Empty
    } else {
        Repaired::Fixed(MultiPolygon::new(polygons))
    }
}

fn polygon_to_shape(polygon: &Polygon<f64>) -> Shape {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_to_contour)
        .filter(|contour| contour.len() >= 3)
        .collect()
}

/// Open contour; the closing point is implied
fn ring_to_contour(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut contour: Vec<[f64; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    contour
}

fn contour_to_ring(contour: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::new(contour.into_iter().map(|[x, y]| Coord { x, y }).collect())
}

fn shape_to_polygon(shape: Shape) -> Option<Polygon<f64>> {
    let mut contours = shape.into_iter();
    let exterior = contours.next()?;
    Some(Polygon::new(
        contour_to_ring(exterior),
        contours.map(contour_to_ring).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area, Contains, Point};

    #[test]
    fn test_valid_untouched() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        let mp = MultiPolygon::new(vec![square]);
        assert_eq!(make_valid(mp.clone()), Repaired::Valid(mp));
    }

    #[test]
    fn test_bowtie_repaired() {
        // Edges cross at (1, 1)
        let bowtie = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ];
        let mp = MultiPolygon::new(vec![bowtie]);
        assert!(!mp.is_valid());

        let fixed = match make_valid(mp) {
            Repaired::Fixed(fixed) => fixed,
            other => panic!("expected repaired geometry, got {other:?}"),
        };

        assert!(fixed.is_valid());
        assert!((fixed.unsigned_area() - 2.0).abs() < 1e-6);
        assert!(fixed.contains(&Point::new(1.5, 1.0)));
        assert!(fixed.contains(&Point::new(0.5, 1.0)));
        assert!(!fixed.contains(&Point::new(1.0, 0.5)));
    }

    #[test]
    fn test_bowtie_with_reversed_winding() {
        // Same bowtie traversed the other way round
        let bowtie = polygon![
            (x: 0.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let fixed = make_valid(MultiPolygon::new(vec![bowtie]))
            .into_geometry()
            .unwrap();
        assert!((fixed.unsigned_area() - 2.0).abs() < 1e-6);
        assert!(fixed.contains(&Point::new(1.5, 1.0)));
        assert!(fixed.contains(&Point::new(0.5, 1.0)));
    }

    #[test]
    fn test_overlapping_members_merged() {
        let a = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        // Clockwise, overlapping a
        let b = polygon![
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 3.0),
            (x: 3.0, y: 3.0),
            (x: 3.0, y: 1.0),
        ];
        let mp = MultiPolygon::new(vec![a, b]);
        assert!(!mp.is_valid());

        let fixed = make_valid(mp).into_geometry().unwrap();
        assert!(fixed.is_valid());
        assert!((fixed.unsigned_area() - 7.0).abs() < 1e-6);
        assert!(fixed.contains(&Point::new(1.5, 1.5)));
    }

    #[test]
    fn test_hole_kept() {
        // Self-intersecting exterior with an ordinary hole in the right lobe
        let twisted = polygon![
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 4.0, y: 4.0),
                (x: 4.0, y: 0.0),
                (x: 0.0, y: 4.0),
            ],
            interiors: [[
                (x: 3.0, y: 1.8),
                (x: 3.4, y: 1.8),
                (x: 3.4, y: 2.2),
                (x: 3.0, y: 2.2),
            ]],
        ];
        let fixed = make_valid(MultiPolygon::new(vec![twisted]))
            .into_geometry()
            .unwrap();
        assert!(!fixed.contains(&Point::new(3.2, 2.0)));
        assert!(fixed.contains(&Point::new(2.6, 2.0)));
        assert!(fixed.contains(&Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_empty_dropped() {
        let mp: MultiPolygon<f64> = MultiPolygon::new(vec![]);
        assert_eq!(make_valid(mp), Repaired::Empty);
        assert_eq!(Repaired::Empty.into_geometry(), None);

        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        assert_eq!(make_valid(MultiPolygon::new(vec![flat])), Repaired::Empty);
    }
}
