use crate::error::{GeometryError, Result};
use crate::math::hull::HullFacet;
use crate::math::Point3;

use super::TriangleMesh;

/// Tessellates convex polygonal facets into a flat-shaded triangle mesh.
///
/// Each facet is fanned from its first corner. Because hull facets are convex
/// and wound counter-clockwise, every emitted triangle keeps the facet's
/// outward winding.
pub struct TessellateFacets<'a> {
    points: &'a [Point3],
    facets: &'a [HullFacet],
}

impl<'a> TessellateFacets<'a> {
    /// Creates a new `TessellateFacets` operation.
    #[must_use]
    pub fn new(points: &'a [Point3], facets: &'a [HullFacet]) -> Self {
        Self { points, facets }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a facet has fewer than three corners or refers to
    /// a point outside the input set.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let mut mesh = TriangleMesh::default();

        for facet in self.facets {
            if facet.indices.len() < 3 {
                return Err(GeometryError::Degenerate(format!(
                    "facet with {} corners",
                    facet.indices.len()
                ))
                .into());
            }

            let base = mesh.vertices.len() as u32;
            for &idx in &facet.indices {
                let point = self.points.get(idx).ok_or_else(|| {
                    GeometryError::Degenerate(format!("facet refers to missing point {idx}"))
                })?;
                mesh.vertices.push(*point);
                mesh.normals.push(facet.normal);
            }

            let corners = facet.indices.len() as u32;
            for k in 1..corners - 1 {
                mesh.indices.push([base, base + k, base + k + 1]);
            }
        }

        Ok(mesh)
    }
}
