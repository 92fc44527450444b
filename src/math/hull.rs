use crate::error::{GeometryError, Result};

use super::{Point3, Vector3, PLANE_TOLERANCE, TOLERANCE};

/// One planar facet of a convex hull.
#[derive(Debug, Clone)]
pub struct HullFacet {
    /// Outward unit normal of the facet plane.
    pub normal: Vector3,
    /// Indices into the input point set, counter-clockwise seen from outside.
    pub indices: Vec<usize>,
}

/// Computes the convex hull of a small point set as a list of planar facets.
///
/// Every point triple spans a candidate plane; a plane is a hull facet when no
/// input point lies strictly on its positive side. Coplanar points are merged
/// into a single polygonal facet, so a cube yields six quads rather than twelve
/// triangles. The cost is quartic in the point count, which is fine for die
/// solids (at most a few dozen vertices).
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if the points do not span a volume.
pub fn convex_hull(points: &[Point3]) -> Result<Vec<HullFacet>> {
    if points.len() < 4 {
        return Err(GeometryError::Degenerate(format!(
            "convex hull needs at least 4 points, got {}",
            points.len()
        ))
        .into());
    }

    let mut planes: Vec<(Vector3, f64)> = Vec::new();
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let cross = (points[j] - points[i]).cross(&(points[k] - points[i]));
                let len = cross.norm();
                if len < TOLERANCE {
                    continue;
                }
                let normal = cross / len;
                let offset = normal.dot(&points[i].coords);

                let mut above = false;
                let mut below = false;
                for p in points {
                    let dist = normal.dot(&p.coords) - offset;
                    if dist > PLANE_TOLERANCE {
                        above = true;
                    } else if dist < -PLANE_TOLERANCE {
                        below = true;
                    }
                    if above && below {
                        break;
                    }
                }

                let candidate = match (above, below) {
                    (false, true) => (normal, offset),
                    (true, false) => (-normal, -offset),
                    _ => continue,
                };
                let known = planes.iter().any(|(pn, po)| {
                    pn.dot(&candidate.0) > 1.0 - PLANE_TOLERANCE
                        && (po - candidate.1).abs() < PLANE_TOLERANCE
                });
                if !known {
                    planes.push(candidate);
                }
            }
        }
    }

    if planes.len() < 4 {
        return Err(GeometryError::Degenerate("points do not span a volume".into()).into());
    }

    Ok(planes
        .into_iter()
        .map(|(normal, offset)| {
            let on_plane: Vec<usize> = (0..n)
                .filter(|&idx| (normal.dot(&points[idx].coords) - offset).abs() < PLANE_TOLERANCE)
                .collect();
            HullFacet {
                indices: order_around_normal(points, &on_plane, &normal),
                normal,
            }
        })
        .collect())
}

/// Sorts coplanar points counter-clockwise around their centroid, as seen
/// looking against `normal`.
fn order_around_normal(points: &[Point3], indices: &[usize], normal: &Vector3) -> Vec<usize> {
    #[allow(clippy::cast_precision_loss)]
    let centroid = indices
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + points[i].coords)
        / indices.len() as f64;

    let u = (points[indices[0]].coords - centroid).normalize();
    let v = normal.cross(&u);

    let mut keyed: Vec<(f64, usize)> = indices
        .iter()
        .map(|&i| {
            let d = points[i].coords - centroid;
            (d.dot(&v).atan2(d.dot(&u)), i)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, i)| i).collect()
}
