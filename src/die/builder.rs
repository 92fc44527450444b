use std::collections::HashMap;

use crate::error::Result;
use crate::operations::creation::{MakePolyhedron, MakeTrapezohedron};
use crate::operations::query::{
    AssignFaceValues, BoundingBox, ClusterFaces, ColliderPoints, ANTIPODE_THRESHOLD,
    COLLIDER_PRECISION, COPLANAR_THRESHOLD,
};
use crate::tessellation::TriangleMesh;

use super::{DieKind, DieModel, DieShape};

/// Parameters controlling die model construction.
#[derive(Debug, Clone, Copy)]
pub struct BuildParams {
    /// Minimum normal dot product for two triangles to share a face.
    pub coplanar_threshold: f64,
    /// Maximum normal dot product for two faces to be numbered as opposites.
    pub antipode_threshold: f64,
    /// Decimal digits kept when deduplicating collider points.
    pub collider_precision: u32,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            coplanar_threshold: COPLANAR_THRESHOLD,
            antipode_threshold: ANTIPODE_THRESHOLD,
            collider_precision: COLLIDER_PRECISION,
        }
    }
}

/// Builds the numbered model of one die type.
///
/// The pipeline is: canonical solid, center on the bounding box, apply the
/// per-kind scale, cluster triangles into faces, number the faces, and
/// extract collider points.
pub struct BuildDieModel {
    sides: u32,
    kind: Option<DieKind>,
    shape: DieShape,
    scale: f64,
    face_count: usize,
    params: BuildParams,
}

impl BuildDieModel {
    /// Creates a new `BuildDieModel` operation for a supported die kind.
    #[must_use]
    pub fn new(kind: DieKind) -> Self {
        Self {
            sides: kind.sides(),
            kind: Some(kind),
            shape: kind.shape(),
            scale: kind.scale(),
            face_count: kind.face_count(),
            params: BuildParams::default(),
        }
    }

    /// Creates the unit-cube stand-in used for unsupported side counts.
    ///
    /// The model is numbered 1 to 6 regardless of `sides`.
    #[must_use]
    pub fn fallback(sides: u32) -> Self {
        let shape = DieShape::cube(1.0);
        Self {
            sides,
            kind: None,
            shape,
            scale: 1.0,
            face_count: shape.face_count(),
            params: BuildParams::default(),
        }
    }

    /// Sets custom build parameters.
    #[must_use]
    pub fn with_params(mut self, params: BuildParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the build, returning the finished model.
    ///
    /// # Errors
    ///
    /// Returns an error if the canonical solid is degenerate, which cannot
    /// happen for the built-in shapes.
    pub fn execute(&self) -> Result<DieModel> {
        let mut surface = self.canonical_solid()?;
        let bounds = BoundingBox::new(&surface).execute()?;
        surface.translate(&(-bounds.center().coords));
        surface.scale(self.scale);

        let groups = ClusterFaces::new(&surface)
            .with_threshold(self.params.coplanar_threshold)
            .execute();
        let faces = AssignFaceValues::new(&groups, self.face_count)
            .with_antipode_threshold(self.params.antipode_threshold)
            .execute();
        let face_lookup: HashMap<u32, usize> = faces
            .iter()
            .enumerate()
            .map(|(idx, face)| (face.value, idx))
            .collect();
        let collider_points = ColliderPoints::new(&surface)
            .with_precision(self.params.collider_precision)
            .execute();

        tracing::debug!(
            sides = self.sides,
            faces = faces.len(),
            triangles = surface.triangle_count(),
            collider_points = collider_points.len(),
            "built die model"
        );

        Ok(DieModel {
            sides: self.sides,
            kind: self.kind,
            surface,
            faces,
            face_lookup,
            collider_points,
        })
    }

    fn canonical_solid(&self) -> Result<TriangleMesh> {
        match self.shape {
            DieShape::Platonic { solid, radius } => MakePolyhedron::new(solid, radius).execute(),
            DieShape::Trapezohedron {
                sides,
                radius,
                height,
            } => MakeTrapezohedron::new(sides, radius, height).execute(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{up_axis, UnitQuaternion, Vector3};
    use crate::operations::query::BoundingBox;

    fn build(kind: DieKind) -> DieModel {
        BuildDieModel::new(kind).execute().unwrap()
    }

    #[test]
    fn every_kind_has_complete_numbering() {
        for kind in DieKind::ALL {
            let model = build(kind);
            let n = kind.face_count();
            assert_eq!(model.faces().len(), n, "{kind}");
            for value in 1..=n as u32 {
                assert_eq!(model.face(value).unwrap().value, value, "{kind} face {value}");
            }
            assert!(model.face(0).is_none());
            assert!(model.face(n as u32 + 1).is_none());
        }
    }

    #[test]
    fn opposite_faces_sum_to_one_more_than_face_count() {
        for kind in [DieKind::D6, DieKind::D8, DieKind::D10, DieKind::D12, DieKind::D20] {
            let model = build(kind);
            let n = kind.face_count() as u32;
            for face in model.faces() {
                let antipode = model.antipode_of(face.value).unwrap();
                assert_eq!(face.value + antipode.value, n + 1, "{kind} face {}", face.value);
                assert_relative_eq!(face.normal.dot(&antipode.normal), -1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn d4_faces_have_no_parallel_partner() {
        let model = build(DieKind::D4);
        for face in model.faces() {
            let antipode = model.antipode_of(face.value).unwrap();
            assert_relative_eq!(face.normal.dot(&antipode.normal), -1.0 / 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn models_are_centered() {
        for kind in DieKind::ALL {
            let model = build(kind);
            let bounds = BoundingBox::new(model.surface()).execute().unwrap();
            assert_relative_eq!(bounds.center().coords, Vector3::zeros(), epsilon = 1e-9);
        }
    }

    #[test]
    fn d6_is_scaled_to_its_canonical_size() {
        let model = build(DieKind::D6);
        let bounds = BoundingBox::new(model.surface()).execute().unwrap();
        // 1.2 edge, scaled by 1.2.
        assert_relative_eq!(bounds.extents(), Vector3::repeat(1.44), epsilon = 1e-9);
    }

    #[test]
    fn orientation_puts_each_face_on_top() {
        for kind in DieKind::ALL {
            let model = build(kind);
            for face in model.faces() {
                let q = model.orientation_for(face.value).unwrap();
                assert_relative_eq!(q * face.normal, up_axis(), epsilon = 1e-9);
                assert_eq!(model.up_face(&q).unwrap().value, face.value, "{kind}");
            }
        }
    }

    #[test]
    fn identity_rotation_reads_face_one_on_d6() {
        let model = build(DieKind::D6);
        let top = model.up_face(&UnitQuaternion::identity()).unwrap();
        assert_eq!(top.value, 1);
    }

    #[test]
    fn collider_points_are_the_solid_corners() {
        let expected = [
            (DieKind::D4, 4),
            (DieKind::D6, 8),
            (DieKind::D8, 6),
            (DieKind::D10, 12),
            (DieKind::D12, 20),
            (DieKind::D20, 12),
        ];
        for (kind, corners) in expected {
            assert_eq!(build(kind).collider_points().len(), corners, "{kind}");
        }
    }

    #[test]
    fn face_centers_lie_along_their_normals() {
        for kind in DieKind::ALL {
            for face in build(kind).faces() {
                assert!(face.center.coords.dot(&face.normal) > 0.0, "{kind}");
            }
        }
    }

    #[test]
    fn building_twice_gives_identical_numbering() {
        let a = build(DieKind::D20);
        let b = build(DieKind::D20);
        for (fa, fb) in a.faces().iter().zip(b.faces()) {
            assert_eq!(fa.value, fb.value);
            assert_relative_eq!(fa.normal, fb.normal);
        }
    }

    #[test]
    fn fallback_is_a_unit_cube() {
        let model = BuildDieModel::fallback(3).execute().unwrap();
        assert_eq!(model.sides(), 3);
        assert!(model.kind().is_none());
        assert_eq!(model.face_count(), 6);
        let bounds = BoundingBox::new(model.surface()).execute().unwrap();
        assert_relative_eq!(bounds.extents(), Vector3::repeat(1.0), epsilon = 1e-9);
    }

    #[test]
    fn loose_coplanar_threshold_is_caught_by_the_safety_net() {
        let params = BuildParams {
            coplanar_threshold: 0.5,
            ..BuildParams::default()
        };
        let model = BuildDieModel::new(DieKind::D20)
            .with_params(params)
            .execute()
            .unwrap();
        assert!(model.face_count() < 20);
    }
}
