//! Reference force evaluation
//!
//! The simulation path computes accelerations through the quadtree; this
//! module keeps the exact pairwise sum behind the same softened kernel.
//! It is the ground truth the tree is measured against in tests and
//! benchmarks, and the only O(n^2) code in the crate.

use crate::simulation::states::{System, NVec2};

/// Trait for acceleration sources operating on [`System`]
/// Implementations write their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]);
}

/// Direct softened gravity, summed over every source body.
///
/// Uses the same kernel as the tree query:
/// `a += d * g * m / ((|d|^2 + eps^2) * |d|)`, zero denominators
/// contributing nothing. With `theta = 0` the tree reduces to exactly
/// this sum over its leaves.
pub struct DirectGravity {
    pub g: f64, // gravitational constant
    pub e_sq: f64, // softening squared
}

impl Acceleration for DirectGravity {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]) {
        for (i, bi) in sys.bodies.iter().enumerate() {
            let mut acc = NVec2::zeros();
            for bj in &sys.bodies {
                let d = bj.x - bi.x;
                let d_sq = d.dot(&d);
                let denom = (d_sq + self.e_sq) * d_sq.sqrt();
                if denom > 0.0 {
                    acc += d * (self.g * bj.m / denom).min(f64::MAX);
                }
            }
            out[i] = acc;
        }
    }
}
