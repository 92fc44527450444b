use crate::math::{Point3, Vector3};
use crate::tessellation::{triangle_centroid, triangle_normal, TriangleMesh};

/// Minimum dot product between a triangle normal and a face group's average
/// normal for the triangle to join that group (about 3.6 degrees).
pub const COPLANAR_THRESHOLD: f64 = 0.998;

/// A planar facet reconstructed from one or more mesh triangles.
#[derive(Debug, Clone)]
pub struct FaceGroup {
    /// Unit average normal of the member triangles.
    pub normal: Vector3,
    /// Average of the member triangles' centroids.
    pub center: Point3,
    /// Number of member triangles.
    pub triangle_count: usize,
}

/// Running sums while grouping triangles.
struct Accumulator {
    normal_sum: Vector3,
    center_sum: Vector3,
    count: usize,
}

/// Groups mesh triangles into the flat facets of the solid.
///
/// Triangles are visited in index order. A triangle joins the first group whose
/// normalized running normal is within `threshold` of its own, otherwise it
/// opens a new group. No per-solid face tables are needed.
pub struct ClusterFaces<'a> {
    mesh: &'a TriangleMesh,
    threshold: f64,
}

impl<'a> ClusterFaces<'a> {
    /// Creates a new `ClusterFaces` query using [`COPLANAR_THRESHOLD`].
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self {
            mesh,
            threshold: COPLANAR_THRESHOLD,
        }
    }

    /// Sets a custom coplanarity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Executes the query, returning face groups in discovery order.
    ///
    /// Zero-area triangles are skipped.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Vec<FaceGroup> {
        let mut groups: Vec<Accumulator> = Vec::new();

        for tri in self.mesh.triangles() {
            let Some(normal) = triangle_normal(&tri) else {
                continue;
            };
            let center = triangle_centroid(&tri);

            let existing = groups
                .iter_mut()
                .find(|g| g.normal_sum.normalize().dot(&normal) > self.threshold);
            match existing {
                Some(group) => {
                    group.normal_sum += normal;
                    group.center_sum += center.coords;
                    group.count += 1;
                }
                None => groups.push(Accumulator {
                    normal_sum: normal,
                    center_sum: center.coords,
                    count: 1,
                }),
            }
        }

        groups
            .into_iter()
            .map(|g| FaceGroup {
                normal: g.normal_sum.normalize(),
                center: Point3::from(g.center_sum / g.count.max(1) as f64),
                triangle_count: g.count,
            })
            .collect()
    }
}
