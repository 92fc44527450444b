mod tessellate_facets;

pub use tessellate_facets::TessellateFacets;

use crate::math::{Point3, Vector3, TOLERANCE};

/// A triangle mesh approximation of a die surface.
///
/// Vertices are not shared between facets: every facet carries its own copy
/// of its corners so that per-vertex normals can stay flat.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Returns the number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterates over the corner positions of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.iter().map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Translates every vertex by `offset`.
    pub fn translate(&mut self, offset: &Vector3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Scales every vertex uniformly about the origin.
    ///
    /// Normals are unaffected by a positive uniform scale.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.coords *= factor;
        }
    }
}

/// Computes the unit normal of a triangle from its winding, or `None` if the
/// triangle has no area.
#[must_use]
pub fn triangle_normal(tri: &[Point3; 3]) -> Option<Vector3> {
    let cross = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
    let len = cross.norm();
    if len < TOLERANCE {
        None
    } else {
        Some(cross / len)
    }
}

/// Computes the centroid of a triangle.
#[must_use]
pub fn triangle_centroid(tri: &[Point3; 3]) -> Point3 {
    Point3::from((tri[0].coords + tri[1].coords + tri[2].coords) / 3.0)
}
