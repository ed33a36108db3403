//! The sampling policy of a selection round.
//!
//! Every student receives a score `u * count` where `u` is a fresh uniform draw from `[0, 1)`.
//! The roster is ranked by descending score and the first `sample` students are picked. A student
//! that has never been picked always scores `0` and therefore ranks behind every student with a
//! positive score.
//!
//! The ranking is a stable sort: students with equal scores keep the order in which the store
//! returned them.
//!
//! The source of uniform draws is a [`Draw`] capability, so tests and reproducible runs can
//! substitute their own sequence for the OS seeded generator.

use std::collections::HashSet;

use derive_more::From;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::student::Student;

/// A source of uniform draws.
pub trait Draw {
    /// Returns the next draw from the half-open interval `[0, 1)`.
    fn draw(&mut self) -> f64;
}

impl<F> Draw for F
where
    F: FnMut() -> f64,
{
    fn draw(&mut self) -> f64 {
        self()
    }
}

/// Adapts a [`rand::Rng`] into a [`Draw`].
#[derive(Debug, Clone, From)]
pub struct RngDraw<R>(R);

impl<R: Rng> Draw for RngDraw<R> {
    fn draw(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Picks students for a selection round.
#[derive(Debug, Clone)]
pub struct Selector<D> {
    draw: D,
}

impl Selector<RngDraw<ChaCha20Rng>> {
    /// Creates a selector backed by a ChaCha generator.
    ///
    /// With a `seed` the sequence of rounds is reproducible, otherwise the generator is seeded
    /// from the operating system.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        Self::new(RngDraw(rng))
    }
}

impl<D: Draw> Selector<D> {
    /// Creates a new [`Selector`] which scores students with the given draws.
    pub fn new(draw: D) -> Self {
        Self { draw }
    }

    /// Selects up to `sample` distinct students from the `roster`.
    ///
    /// The result is ordered by descending score. It holds `min(sample, roster.len())` students
    /// and is empty if `sample` is zero or the roster is empty, in which case nothing is drawn.
    /// Should the roster contain a name more than once, only its first occurrence takes part.
    pub fn select(&mut self, roster: &[Student], sample: usize) -> Vec<Student> {
        if sample == 0 || roster.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::with_capacity(roster.len());
        let mut scored = roster
            .iter()
            .filter(|&student| seen.insert(student.name.as_str()))
            .map(|student| (self.draw.draw() * student.count as f64, student))
            .collect::<Vec<_>>();
        scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

        scored
            .into_iter()
            .take(sample)
            .map(|(score, student)| {
                trace!(
                    "picked {} (count {}) with score {}",
                    student.name,
                    student.count,
                    score
                );
                student.clone()
            })
            .collect()
    }
}
