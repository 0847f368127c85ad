//! Point-in-Polygon (PIP) mangrove lookup.
//!
//! Tests a query point, or a circular buffer around it, against the loaded
//! mangrove polygons using an R-tree of bounding boxes.

mod index;
mod service;

pub use index::MangroveIndex;
pub use service::{Membership, MembershipChecker};
