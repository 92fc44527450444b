pub mod hull;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Unit quaternion used for face orientations.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance for coplanarity and plane deduplication on analytic solids.
pub const PLANE_TOLERANCE: f64 = 1e-7;

/// The fixed "up" axis a rolled face is rotated onto.
#[must_use]
pub fn up_axis() -> Vector3 {
    Vector3::y()
}

/// Finds a unit direction perpendicular to the given unit vector.
#[must_use]
pub fn perpendicular_dir(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let perp = axis.cross(&candidate);
    perp / perp.norm()
}

/// Rotation that maps the unit vector `from` onto the unit vector `to`.
///
/// Antiparallel inputs have no unique shortest arc; a half turn around an
/// arbitrary perpendicular axis is used instead.
#[must_use]
pub fn rotation_between(from: &Vector3, to: &Vector3) -> UnitQuaternion {
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        let axis = nalgebra::Unit::new_normalize(perpendicular_dir(from));
        UnitQuaternion::from_axis_angle(&axis, std::f64::consts::PI)
    })
}

/// Quantizes a coordinate onto an integer grid with `10^-digits` spacing.
///
/// Used wherever floating-point values must be compared with a total order
/// (sort keys, hash-set keys).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize(value: f64, digits: u32) -> i64 {
    let factor = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
    (value * factor).round() as i64
}
