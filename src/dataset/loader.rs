//! GeoJSON dataset loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, Value};
use tracing::{debug, error, info};

use super::repair::{make_valid, Repaired};
use super::PolygonSet;
use crate::error::DatasetError;
use crate::projection::WebMercator;

/// Load, repair and reproject the polygon dataset at `path`.
pub fn load(path: &Path, projection: &WebMercator) -> Result<PolygonSet, DatasetError> {
    info!("Loading mangrove dataset from {}", path.display());

    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let geojson: GeoJson =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    polygon_set_from_geojson(geojson, projection)
}

/// Load the dataset, falling back to an empty set on any failure.
///
/// Startup never aborts because of the dataset; an empty set makes every
/// lookup answer "not found".
pub fn load_or_empty(path: &Path, projection: &WebMercator) -> PolygonSet {
    match load(path, projection) {
        Ok(set) => set,
        Err(e) => {
            error!("Error loading mangrove dataset: {}", e);
            PolygonSet::empty()
        }
    }
}

/// Build a [`PolygonSet`] from already parsed GeoJSON.
pub fn polygon_set_from_geojson(
    geojson: GeoJson,
    projection: &WebMercator,
) -> Result<PolygonSet, DatasetError> {
    let geometries = collect_geometries(geojson);
    let total = geometries.len();

    let mut repaired = 0;
    let mut dropped = 0;
    let mut polygons = Vec::with_capacity(total);

    for (index, geometry) in geometries.into_iter().enumerate() {
        let Some(geometry) = geometry else {
            dropped += 1;
            continue;
        };

        let geometry = match make_valid(geometry) {
            Repaired::Valid(mp) => mp,
            Repaired::Fixed(mp) => {
                debug!("Repaired invalid geometry in feature {}", index);
                repaired += 1;
                mp
            }
            Repaired::Empty => {
                debug!("Feature {} has no area after repair, dropping", index);
                dropped += 1;
                continue;
            }
        };

        let projected = projection
            .project_geometry(&geometry)
            .map_err(|source| DatasetError::Projection { index, source })?;
        polygons.push(projected);
    }

    info!(
        "Read {} features: {} repaired, {} dropped, {} kept",
        total,
        repaired,
        dropped,
        polygons.len()
    );

    Ok(PolygonSet::from_projected(polygons))
}

/// One entry per feature; `None` for null geometries and those without polygons.
fn collect_geometries(geojson: GeoJson) -> Vec<Option<MultiPolygon<f64>>> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .map(|f| f.geometry.and_then(|g| value_to_multipolygon(g.value)))
            .collect(),
        GeoJson::Feature(feature) => {
            vec![feature
                .geometry
                .and_then(|g| value_to_multipolygon(g.value))]
        }
        GeoJson::Geometry(geometry) => vec![value_to_multipolygon(geometry.value)],
    }
}

fn value_to_multipolygon(value: Value) -> Option<MultiPolygon<f64>> {
    match value {
        Value::Polygon(rings) => Some(MultiPolygon::new(vec![rings_to_polygon(&rings)?])),
        Value::MultiPolygon(polygons) => non_empty(
            polygons
                .iter()
                .filter_map(|rings| rings_to_polygon(rings))
                .collect(),
        ),
        Value::GeometryCollection(members) => non_empty(
            members
                .into_iter()
                .filter_map(|g| value_to_multipolygon(g.value))
                .flat_map(|mp| mp.0)
                .collect(),
        ),
        _ => None,
    }
}

fn non_empty(polygons: Vec<Polygon<f64>>) -> Option<MultiPolygon<f64>> {
    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon::new(polygons))
    }
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        positions_to_linestring(exterior),
        interiors.iter().map(|r| positions_to_linestring(r)).collect(),
    ))
}

fn positions_to_linestring(positions: &[Vec<f64>]) -> LineString<f64> {
    LineString::new(
        positions
            .iter()
            .filter_map(|p| match p.as_slice() {
                [x, y, ..] => Some(Coord { x: *x, y: *y }),
                _ => None,
            })
            .collect(),
    )
}
