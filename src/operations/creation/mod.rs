mod make_polyhedron;
mod make_trapezohedron;

pub use make_polyhedron::{MakePolyhedron, PlatonicSolid};
pub use make_trapezohedron::MakeTrapezohedron;
