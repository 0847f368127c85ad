//! Error types for dataset loading and per-query geometry work.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while building the polygon set at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GeoJSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to reproject feature {index}: {source}")]
    Projection {
        index: usize,
        #[source]
        source: GeometryError,
    },
}

/// Failure while projecting, buffering or testing a single query.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("coordinate ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },

    #[error("projection failed: {0}")]
    Projection(#[from] proj::ProjError),

    #[error("no projection available")]
    ProjectionUnavailable,

    #[error("buffer of {0} m produced an empty geometry")]
    EmptyBuffer(f64),
}
