use crate::error::{GeometryError, Result};
use crate::math::hull::convex_hull;
use crate::math::{Point3, TOLERANCE};
use crate::tessellation::{TessellateFacets, TriangleMesh};

/// The five regular convex solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatonicSolid {
    Tetrahedron,
    Cube,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl PlatonicSolid {
    /// Number of planar faces of the solid.
    #[must_use]
    pub fn face_count(self) -> usize {
        match self {
            Self::Tetrahedron => 4,
            Self::Cube => 6,
            Self::Octahedron => 8,
            Self::Dodecahedron => 12,
            Self::Icosahedron => 20,
        }
    }

    /// Standard vertex coordinates, centered on the origin but not normalized.
    fn raw_vertices(self) -> Vec<Point3> {
        let phi = f64::midpoint(1.0, 5f64.sqrt());
        let inv = 1.0 / phi;
        let mut pts = Vec::new();
        match self {
            Self::Tetrahedron => {
                pts.extend([
                    Point3::new(1.0, 1.0, 1.0),
                    Point3::new(-1.0, -1.0, 1.0),
                    Point3::new(-1.0, 1.0, -1.0),
                    Point3::new(1.0, -1.0, -1.0),
                ]);
            }
            Self::Cube => {
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            pts.push(Point3::new(x, y, z));
                        }
                    }
                }
            }
            Self::Octahedron => {
                pts.extend([
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(-1.0, 0.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                    Point3::new(0.0, -1.0, 0.0),
                    Point3::new(0.0, 0.0, 1.0),
                    Point3::new(0.0, 0.0, -1.0),
                ]);
            }
            Self::Dodecahedron => {
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            pts.push(Point3::new(x, y, z));
                        }
                    }
                }
                for a in [-1.0, 1.0] {
                    for b in [-1.0, 1.0] {
                        pts.push(Point3::new(0.0, a * inv, b * phi));
                        pts.push(Point3::new(a * inv, b * phi, 0.0));
                        pts.push(Point3::new(a * phi, 0.0, b * inv));
                    }
                }
            }
            Self::Icosahedron => {
                for a in [-1.0, 1.0] {
                    for b in [-1.0, 1.0] {
                        pts.push(Point3::new(0.0, a, b * phi));
                        pts.push(Point3::new(a, b * phi, 0.0));
                        pts.push(Point3::new(b * phi, 0.0, a));
                    }
                }
            }
        }
        pts
    }
}

/// Creates a regular polyhedron mesh with the given circumradius.
///
/// Vertices are taken from the standard analytic coordinates, pushed onto the
/// circumscribed sphere, and triangulated through their convex hull so every
/// triangle is wound outward.
pub struct MakePolyhedron {
    solid: PlatonicSolid,
    radius: f64,
}

impl MakePolyhedron {
    /// Creates a new `MakePolyhedron` operation.
    #[must_use]
    pub fn new(solid: PlatonicSolid, radius: f64) -> Self {
        Self { solid, radius }
    }

    /// Executes the operation, returning the triangulated solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is near zero.
    pub fn execute(&self) -> Result<TriangleMesh> {
        if self.radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("polyhedron radius must be positive".into()).into(),
            );
        }

        let points: Vec<Point3> = self
            .solid
            .raw_vertices()
            .into_iter()
            .map(|p| Point3::from(p.coords.normalize() * self.radius))
            .collect();

        let facets = convex_hull(&points)?;
        if facets.len() != self.solid.face_count() {
            return Err(GeometryError::Degenerate(format!(
                "{:?} hull produced {} facets",
                self.solid,
                facets.len()
            ))
            .into());
        }

        TessellateFacets::new(&points, &facets).execute()
    }
}
