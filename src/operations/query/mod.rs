mod assign_values;
mod bounding_box;
mod cluster_faces;
mod collider_points;

pub use assign_values::{AssignFaceValues, ANTIPODE_THRESHOLD};
pub use bounding_box::{Aabb, BoundingBox};
pub use cluster_faces::{ClusterFaces, FaceGroup, COPLANAR_THRESHOLD};
pub use collider_points::{ColliderPoints, COLLIDER_PRECISION};
