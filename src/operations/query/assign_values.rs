use std::cmp::Reverse;

use crate::die::DieFace;
use crate::math::{quantize, Vector3};

use super::FaceGroup;

/// A face pairs with its partner only when their normals' dot product is
/// below this value. Faces of the tetrahedron (dot = -1/3) stay unpaired.
pub const ANTIPODE_THRESHOLD: f64 = -0.9;

/// Decimal digits kept when comparing normals for the numbering order.
const SORT_DIGITS: u32 = 6;

/// Numbers face groups so opposite faces sum to `face_count + 1`.
///
/// Faces are paired greedily with their most opposite unpaired partner, then
/// the pairs are ordered by the upper face's normal (`y` descending, then `z`,
/// then `x`) to make numbering repeatable. Pair `i` gives `i + 1` to its upper
/// face and `face_count - i` to the lower one; an unpaired face `i` gets
/// `i + 1`.
///
/// Greedy pairing is only meaningful for the centrally symmetric solids used
/// for dice and for the tetrahedron, where nothing pairs.
pub struct AssignFaceValues<'a> {
    groups: &'a [FaceGroup],
    face_count: usize,
    antipode_threshold: f64,
}

impl<'a> AssignFaceValues<'a> {
    /// Creates a new `AssignFaceValues` query for the die's nominal face count.
    #[must_use]
    pub fn new(groups: &'a [FaceGroup], face_count: usize) -> Self {
        Self {
            groups,
            face_count,
            antipode_threshold: ANTIPODE_THRESHOLD,
        }
    }

    /// Sets a custom antipode threshold.
    #[must_use]
    pub fn with_antipode_threshold(mut self, threshold: f64) -> Self {
        self.antipode_threshold = threshold;
        self
    }

    /// Executes the query, returning faces sorted by value.
    ///
    /// If the number of groups differs from the nominal face count the result
    /// is truncated to the nominal count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Vec<DieFace> {
        let mut pairs = self.pair_antipodes();
        pairs.sort_by_key(|pair| sort_key(&self.groups[pair[0]].normal));

        let total = self.groups.len() as u32;
        let face = |value: u32, g: usize| {
            DieFace::new(value, self.groups[g].normal, self.groups[g].center)
        };
        let mut faces = Vec::with_capacity(self.groups.len());
        for (idx, pair) in pairs.iter().enumerate() {
            let low = idx as u32 + 1;
            match pair.as_slice() {
                [upper, lower] => {
                    faces.push(face(low, *upper));
                    faces.push(face(total - idx as u32, *lower));
                }
                [single] => faces.push(face(low, *single)),
                _ => {}
            }
        }

        if faces.len() != self.face_count {
            tracing::warn!(
                groups = faces.len(),
                expected = self.face_count,
                "face clustering does not match the nominal face count"
            );
            faces.sort_by_key(|f| f.value);
            faces.truncate(self.face_count);
        }

        faces.sort_by_key(|f| f.value);
        faces
    }

    /// Pairs each group with its most opposite unpaired partner. Pairs are
    /// returned upper face first.
    fn pair_antipodes(&self) -> Vec<Vec<usize>> {
        let n = self.groups.len();
        let mut used = vec![false; n];
        let mut pairs = Vec::new();

        for i in 0..n {
            if used[i] {
                continue;
            }
            used[i] = true;

            let partner = (0..n)
                .filter(|&j| !used[j])
                .map(|j| (j, self.groups[i].normal.dot(&self.groups[j].normal)))
                .filter(|&(_, dot)| dot < self.antipode_threshold)
                .min_by(|a, b| a.1.total_cmp(&b.1));

            match partner {
                Some((j, _)) => {
                    used[j] = true;
                    if sort_key(&self.groups[i].normal) <= sort_key(&self.groups[j].normal) {
                        pairs.push(vec![i, j]);
                    } else {
                        pairs.push(vec![j, i]);
                    }
                }
                None => pairs.push(vec![i]),
            }
        }
        pairs
    }
}

/// Orders normals by `y`, then `z`, then `x`, all descending.
fn sort_key(normal: &Vector3) -> (Reverse<i64>, Reverse<i64>, Reverse<i64>) {
    (
        Reverse(quantize(normal.y, SORT_DIGITS)),
        Reverse(quantize(normal.z, SORT_DIGITS)),
        Reverse(quantize(normal.x, SORT_DIGITS)),
    )
}
