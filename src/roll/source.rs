//! Uniform random sources for dice draws.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform floats in `[0, 1)`.
///
/// The engine only ever asks for one float per die; swapping the source is
/// how tests pin specific draws.
pub trait RandomSource {
    /// Returns the next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

impl RngSource<StdRng> {
    /// A standard generator seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// A standard generator with a fixed seed, for reproducible sequences.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for RngSource<StdRng> {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

/// Replays a fixed list of draws in order, wrapping around when exhausted.
///
/// An empty script always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Vec<f64>,
    queue: VecDeque<f64>,
}

impl ScriptedSource {
    /// Creates a source replaying raw unit draws.
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        let script: Vec<f64> = draws.into_iter().collect();
        Self {
            queue: script.iter().copied().collect(),
            script,
        }
    }

    /// Creates a source whose draws land on the given `(value, sides)` faces.
    #[must_use]
    pub fn faces(faces: &[(u32, u32)]) -> Self {
        Self::new(faces.iter().map(|&(value, sides)| unit_for_face(value, sides)))
    }

    /// Number of draws left before the script wraps.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.queue.is_empty() {
            self.queue.extend(self.script.iter().copied());
        }
        self.queue.pop_front().unwrap_or(0.0)
    }
}

/// The midpoint of the unit interval slice that maps to `value` on a die.
#[must_use]
pub fn unit_for_face(value: u32, sides: u32) -> f64 {
    let sides = sides.max(1);
    let value = value.clamp(1, sides);
    (f64::from(value) - 0.5) / f64::from(sides)
}

/// Maps one uniform draw onto a face in `1..=sides`.
///
/// Out-of-range draws are clamped onto the nearest face.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn draw_die<S: RandomSource + ?Sized>(source: &mut S, sides: u32) -> u32 {
    let sides = sides.max(1);
    let slot = (source.next_unit() * f64::from(sides)).floor() as u32;
    slot.min(sides - 1) + 1
}
