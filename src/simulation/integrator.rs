//! Fixed-step time integration
//!
//! Semi-implicit Euler: velocity is updated from the stored
//! acceleration before the position moves, which is more stable than
//! explicit Euler for oscillatory (orbital) motion. The acceleration is
//! transient and zeroed once consumed.

use crate::simulation::states::System;

/// Advance the system by one step of size `dt`.
///
/// Per body: `v += a * dt; x += v * dt; a = 0`. Order-independent
/// across bodies, and an exact no-op on positions and velocities when
/// `dt = 0`. Advances `sys.t` by `dt`.
pub fn semi_implicit_euler(sys: &mut System, dt: f64) {
    for b in sys.bodies.iter_mut() {
        b.v += b.a * dt;
        b.x += b.v * dt;
        b.a = nalgebra::Vector2::zeros();
    }
    sys.t += dt;
}
