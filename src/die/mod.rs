//! Numbered die models: die kinds, faces, and the immutable model handed to
//! rendering and physics collaborators.

mod builder;
mod registry;

pub use builder::{BuildDieModel, BuildParams};
pub use registry::{DieModelId, DieRegistry};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::{rotation_between, up_axis, Point3, UnitQuaternion, Vector3};
use crate::operations::creation::PlatonicSolid;
use crate::tessellation::TriangleMesh;

/// A supported die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    /// Percentile die: d10 geometry, numbered in tens.
    D100,
}

impl DieKind {
    /// All supported kinds.
    pub const ALL: [Self; 7] = [
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
        Self::D100,
    ];

    /// Resolves a die kind from its nominal number of sides.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedDieType`] for any other side count.
    pub fn from_sides(sides: u32) -> Result<Self, GeometryError> {
        match sides {
            4 => Ok(Self::D4),
            6 => Ok(Self::D6),
            8 => Ok(Self::D8),
            10 => Ok(Self::D10),
            12 => Ok(Self::D12),
            20 => Ok(Self::D20),
            100 => Ok(Self::D100),
            other => Err(GeometryError::UnsupportedDieType(other)),
        }
    }

    /// Nominal number of sides (100 for the percentile die).
    #[must_use]
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }

    /// Number of physical numbered faces.
    #[must_use]
    pub fn face_count(self) -> usize {
        match self {
            Self::D100 => 10,
            other => other.sides() as usize,
        }
    }

    /// Uniform scale applied after centering so all dice read at a similar size.
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            Self::D6 => 1.2,
            Self::D10 | Self::D100 => 1.05,
            Self::D4 | Self::D8 | Self::D12 | Self::D20 => 1.0,
        }
    }

    /// Canonical solid for this kind.
    #[must_use]
    pub fn shape(self) -> DieShape {
        match self {
            Self::D4 => DieShape::platonic(PlatonicSolid::Tetrahedron, 1.0),
            Self::D6 => DieShape::cube(1.2),
            Self::D8 => DieShape::platonic(PlatonicSolid::Octahedron, 1.0),
            Self::D10 | Self::D100 => DieShape::Trapezohedron {
                sides: 5,
                radius: 1.0,
                height: 0.9,
            },
            Self::D12 => DieShape::platonic(PlatonicSolid::Dodecahedron, 1.0),
            Self::D20 => DieShape::platonic(PlatonicSolid::Icosahedron, 1.0),
        }
    }

    /// Renders the label printed on the face with `value`.
    ///
    /// Only the ten-faced dice have alternative conventions: in percentile
    /// modes face 10 reads `00` (tens) or `0` (ones), and tens mode multiplies
    /// the other faces by ten.
    #[must_use]
    pub fn face_label(self, value: u32, mode: DisplayMode) -> String {
        if self.face_count() != 10 {
            return value.to_string();
        }
        match (mode, value) {
            (DisplayMode::PercentileTens, 10) => "00".to_string(),
            (DisplayMode::PercentileTens, v) => (v * 10).to_string(),
            (DisplayMode::PercentileOnes, 10) => "0".to_string(),
            (_, v) => v.to_string(),
        }
    }

    /// Maps a rolled value onto the face that shows it.
    ///
    /// Percentile conventions report the `00`/`0` face as `0`; it is face 10.
    #[must_use]
    pub fn resolve_display_value(self, value: u32, mode: DisplayMode) -> u32 {
        if self.face_count() == 10 && value == 0 && mode != DisplayMode::Standard {
            10
        } else {
            value
        }
    }
}

impl std::fmt::Display for DieKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// How the faces of a ten-faced die are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Faces read 1 through 10.
    #[default]
    Standard,
    /// Faces read 00, 10, ..., 90.
    PercentileTens,
    /// Faces read 0 through 9.
    PercentileOnes,
}

/// Construction recipe for a die solid, before centering and scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DieShape {
    /// A regular polyhedron with the given circumradius.
    Platonic { solid: PlatonicSolid, radius: f64 },
    /// A trapezohedron, dual of an antiprism with the given ring geometry.
    Trapezohedron {
        sides: usize,
        radius: f64,
        height: f64,
    },
}

impl DieShape {
    fn platonic(solid: PlatonicSolid, radius: f64) -> Self {
        Self::Platonic { solid, radius }
    }

    /// An axis-aligned cube with the given edge length.
    #[must_use]
    pub fn cube(edge: f64) -> Self {
        Self::Platonic {
            solid: PlatonicSolid::Cube,
            radius: edge * 3f64.sqrt() / 2.0,
        }
    }

    /// Number of planar faces of the shape.
    #[must_use]
    pub fn face_count(&self) -> usize {
        match self {
            Self::Platonic { solid, .. } => solid.face_count(),
            Self::Trapezohedron { sides, .. } => 2 * sides,
        }
    }
}

/// A numbered facet of a die.
#[derive(Debug, Clone)]
pub struct DieFace {
    /// The number printed on the facet.
    pub value: u32,
    /// Outward unit normal.
    pub normal: Vector3,
    /// Centroid of the facet, for label placement.
    pub center: Point3,
    /// Rotation mapping `normal` onto the up axis, so a renderer can snap
    /// the die to "this face up" without recomputing it per frame.
    pub orientation: UnitQuaternion,
}

impl DieFace {
    /// Creates a face and precomputes its orientation.
    #[must_use]
    pub fn new(value: u32, normal: Vector3, center: Point3) -> Self {
        Self {
            value,
            normal,
            center,
            orientation: rotation_between(&normal, &up_axis()),
        }
    }
}

/// The immutable, cacheable model of one die type.
#[derive(Debug, Clone)]
pub struct DieModel {
    sides: u32,
    kind: Option<DieKind>,
    surface: TriangleMesh,
    faces: Vec<DieFace>,
    face_lookup: HashMap<u32, usize>,
    collider_points: Vec<Point3>,
}

impl DieModel {
    /// The side count this model was requested for.
    #[must_use]
    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// The resolved die kind, or `None` for the fallback cube.
    #[must_use]
    pub fn kind(&self) -> Option<DieKind> {
        self.kind
    }

    /// The renderable, collidable solid, centered at the origin.
    #[must_use]
    pub fn surface(&self) -> &TriangleMesh {
        &self.surface
    }

    /// Numbered faces sorted by value.
    #[must_use]
    pub fn faces(&self) -> &[DieFace] {
        &self.faces
    }

    /// Number of numbered faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Unique mesh vertices for a cheap collision hull.
    #[must_use]
    pub fn collider_points(&self) -> &[Point3] {
        &self.collider_points
    }

    /// Looks up the face showing `value`.
    #[must_use]
    pub fn face(&self, value: u32) -> Option<&DieFace> {
        self.face_lookup.get(&value).map(|&idx| &self.faces[idx])
    }

    /// Rotation that brings the face showing `value` to the top.
    #[must_use]
    pub fn orientation_for(&self, value: u32) -> Option<UnitQuaternion> {
        self.face(value).map(|face| face.orientation)
    }

    /// The face pointing most nearly up once the die is rotated by `rotation`.
    ///
    /// A physics collaborator calls this with the die's resting rotation to
    /// read the rolled value.
    #[must_use]
    pub fn up_face(&self, rotation: &UnitQuaternion) -> Option<&DieFace> {
        let up = up_axis();
        let height = |face: &DieFace| (rotation * face.normal).dot(&up);
        self.faces
            .iter()
            .max_by(|a, b| height(a).total_cmp(&height(b)))
    }

    /// The face whose normal is most opposite to the face showing `value`.
    #[must_use]
    pub fn antipode_of(&self, value: u32) -> Option<&DieFace> {
        let normal = self.face(value)?.normal;
        self.faces
            .iter()
            .filter(|other| other.value != value)
            .min_by(|a, b| normal.dot(&a.normal).total_cmp(&normal.dot(&b.normal)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_sides() {
        for kind in DieKind::ALL {
            assert_eq!(DieKind::from_sides(kind.sides()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_sides_are_unsupported() {
        assert!(matches!(
            DieKind::from_sides(3),
            Err(GeometryError::UnsupportedDieType(3))
        ));
        assert!(DieKind::from_sides(0).is_err());
    }

    #[test]
    fn percentile_die_has_ten_faces() {
        assert_eq!(DieKind::D100.face_count(), 10);
        assert_eq!(DieKind::D100.shape(), DieKind::D10.shape());
        assert_eq!(DieKind::D100.shape().face_count(), 10);
    }

    #[test]
    fn shapes_match_face_counts() {
        for kind in DieKind::ALL {
            assert_eq!(kind.shape().face_count(), kind.face_count(), "{kind}");
        }
    }

    #[test]
    fn ten_faced_labels() {
        let d10 = DieKind::D10;
        assert_eq!(d10.face_label(10, DisplayMode::Standard), "10");
        assert_eq!(d10.face_label(10, DisplayMode::PercentileTens), "00");
        assert_eq!(d10.face_label(3, DisplayMode::PercentileTens), "30");
        assert_eq!(d10.face_label(10, DisplayMode::PercentileOnes), "0");
        assert_eq!(d10.face_label(7, DisplayMode::PercentileOnes), "7");
        assert_eq!(DieKind::D20.face_label(20, DisplayMode::PercentileTens), "20");
    }

    #[test]
    fn zero_resolves_to_face_ten_in_percentile_modes() {
        let d100 = DieKind::D100;
        assert_eq!(d100.resolve_display_value(0, DisplayMode::PercentileTens), 10);
        assert_eq!(d100.resolve_display_value(0, DisplayMode::Standard), 0);
        assert_eq!(d100.resolve_display_value(4, DisplayMode::PercentileOnes), 4);
        assert_eq!(DieKind::D6.resolve_display_value(0, DisplayMode::PercentileOnes), 0);
    }

    #[test]
    fn display_uses_die_notation() {
        assert_eq!(DieKind::D20.to_string(), "d20");
        assert_eq!(DieKind::D100.to_string(), "d100");
    }

    #[test]
    fn kind_serializes_as_variant_name() {
        let json = serde_json::to_string(&DieKind::D12).unwrap();
        assert_eq!(json, "\"D12\"");
        let back: DieKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DieKind::D12);
    }
}
