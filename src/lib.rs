//! Mangrove - point-in-polygon membership checks against a mangrove dataset
//!
//! This library provides the dataset loader, the membership checker and the
//! HTTP router used by the server binary.

pub mod dataset;
pub mod error;
pub mod http;
pub mod pip;
pub mod projection;

pub use dataset::PolygonSet;
pub use error::{DatasetError, GeometryError};
pub use pip::{Membership, MembershipChecker};
pub use projection::WebMercator;
