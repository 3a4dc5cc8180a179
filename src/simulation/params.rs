//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size `dt`,
//! - Barnes-Hut opening angle `theta` and softening `epsilon`,
//! - gravitational constant `g`,
//! - collision switch and spatial-grid sizing knobs,
//! - random seed for the scenario sampler

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub theta: f64, // opening angle, smaller is more exact but slower
    pub epsilon: f64, // softening length, prevents singular forces
    pub g: f64, // gravitational constant
    pub collision: bool, // enable the merge pass
    pub cell_radius_factor: f64, // grid cell >= factor * max body radius
    pub cell_size_divisor: f64, // grid cell >= quad.size / divisor
    pub seed: u64, // deterministic seed for the sampler
}
