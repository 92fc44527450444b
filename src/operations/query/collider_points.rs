use std::collections::HashSet;

use crate::math::{quantize, Point3};
use crate::tessellation::TriangleMesh;

/// Decimal digits kept when deduplicating collider vertices.
pub const COLLIDER_PRECISION: u32 = 4;

/// Extracts the unique vertices of a mesh for a cheap collision hull.
///
/// Flat-shaded meshes repeat every corner once per adjacent facet; rounding
/// to a fixed precision collapses those copies. The first occurrence of each
/// point is kept, in mesh order.
pub struct ColliderPoints<'a> {
    mesh: &'a TriangleMesh,
    precision: u32,
}

impl<'a> ColliderPoints<'a> {
    /// Creates a new `ColliderPoints` query using [`COLLIDER_PRECISION`].
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self {
            mesh,
            precision: COLLIDER_PRECISION,
        }
    }

    /// Sets the number of decimal digits used for deduplication.
    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Executes the query, returning the deduplicated points.
    #[must_use]
    pub fn execute(&self) -> Vec<Point3> {
        let mut seen = HashSet::new();
        self.mesh
            .vertices
            .iter()
            .filter(|v| {
                seen.insert((
                    quantize(v.x, self.precision),
                    quantize(v.y, self.precision),
                    quantize(v.z, self.precision),
                ))
            })
            .copied()
            .collect()
    }
}
