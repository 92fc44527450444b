use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};
use crate::tessellation::TriangleMesh;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along each axis.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }
}

/// Computes the axis-aligned bounding box of a mesh.
pub struct BoundingBox<'a> {
    mesh: &'a TriangleMesh,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no vertices.
    pub fn execute(&self) -> Result<Aabb> {
        let first = self
            .mesh
            .vertices
            .first()
            .ok_or_else(|| GeometryError::Degenerate("empty mesh has no bounds".into()))?;

        let mut min = *first;
        let mut max = *first;
        for v in &self.mesh.vertices[1..] {
            min = min.inf(v);
            max = max.sup(v);
        }
        Ok(Aabb { min, max })
    }
}
