use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::hull::convex_hull;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::tessellation::{TessellateFacets, TriangleMesh};

/// Smallest plane offset accepted when taking the polar dual of a face.
const MIN_DUAL_OFFSET: f64 = 1e-3;

/// Creates an n-gonal trapezohedron (the d10 shape for `n = 5`).
///
/// The trapezohedron is the polar dual of an n-gonal antiprism. The antiprism
/// is built first: `n` vertices on a ring at `z = +height/2` and `n`
/// interleaved vertices, offset by half a sector, at `z = -height/2`. Each
/// antiprism face with plane `normal . x = d` becomes the dual point
/// `normal / d`, and the convex hull of those points is the trapezohedron,
/// with one kite-shaped face per antiprism vertex.
pub struct MakeTrapezohedron {
    sides: usize,
    radius: f64,
    height: f64,
}

impl MakeTrapezohedron {
    /// Creates a new `MakeTrapezohedron` operation.
    ///
    /// * `sides` - Vertices per antiprism ring; the result has `2 * sides` faces.
    /// * `radius` - Antiprism ring radius.
    /// * `height` - Distance between the two antiprism rings.
    #[must_use]
    pub fn new(sides: usize, radius: f64, height: f64) -> Self {
        Self {
            sides,
            radius,
            height,
        }
    }

    /// Executes the operation, returning the triangulated trapezohedron.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three sides are requested or the
    /// radius or height is near zero.
    pub fn execute(&self) -> Result<TriangleMesh> {
        if self.sides < 3 {
            return Err(GeometryError::Degenerate(
                "trapezohedron needs at least 3 sides".into(),
            )
            .into());
        }
        if self.radius < TOLERANCE || self.height < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "trapezohedron radius and height must be positive".into(),
            )
            .into());
        }

        let ring = self.antiprism_vertices();
        let dual_points = self
            .antiprism_faces()
            .iter()
            .map(|face| dual_point(&ring, face))
            .collect::<Result<Vec<_>>>()?;

        let facets = convex_hull(&dual_points)?;
        if facets.len() != 2 * self.sides {
            return Err(GeometryError::Degenerate(format!(
                "trapezohedron hull produced {} facets, expected {}",
                facets.len(),
                2 * self.sides
            ))
            .into());
        }

        TessellateFacets::new(&dual_points, &facets).execute()
    }

    /// Top ring first (indices `0..n`), then the offset bottom ring (`n..2n`).
    #[allow(clippy::cast_precision_loss)]
    fn antiprism_vertices(&self) -> Vec<Point3> {
        let n = self.sides;
        let sector = TAU / n as f64;
        let top_z = self.height / 2.0;
        let bottom_z = -self.height / 2.0;

        let top = (0..n).map(|i| {
            let theta = sector * i as f64;
            Point3::new(self.radius * theta.cos(), self.radius * theta.sin(), top_z)
        });
        let bottom = (0..n).map(|i| {
            let theta = sector * i as f64 + sector / 2.0;
            Point3::new(self.radius * theta.cos(), self.radius * theta.sin(), bottom_z)
        });
        top.chain(bottom).collect()
    }

    /// Two caps plus two side triangles per sector.
    fn antiprism_faces(&self) -> Vec<Vec<usize>> {
        let n = self.sides;
        let mut faces = Vec::with_capacity(2 * n + 2);
        faces.push((0..n).collect());
        faces.push((n..2 * n).rev().collect());

        for i in 0..n {
            let top_a = i;
            let top_b = (i + 1) % n;
            let bottom_a = i + n;
            let bottom_b = (i + 1) % n + n;
            faces.push(vec![top_a, bottom_a, top_b]);
            faces.push(vec![top_b, bottom_a, bottom_b]);
        }
        faces
    }
}

/// Polar dual point of a face: its outward normal divided by the plane offset.
#[allow(clippy::cast_precision_loss)]
fn dual_point(vertices: &[Point3], face: &[usize]) -> Result<Point3> {
    let v0 = vertices[face[0]];
    let v1 = vertices[face[1]];
    let v2 = vertices[face[2]];

    let cross = (v1 - v0).cross(&(v2 - v0));
    let len = cross.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    let mut normal = cross / len;

    let centroid = face
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + vertices[i].coords)
        / face.len() as f64;
    if normal.dot(&centroid) < 0.0 {
        normal = -normal;
    }

    let offset = normal.dot(&v0.coords).max(MIN_DUAL_OFFSET);
    Ok(Point3::from(normal / offset))
}
