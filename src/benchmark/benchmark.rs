//! Timing sweeps comparing direct and tree-based force evaluation,
//! and the full step pipeline with collisions enabled.

use std::time::Instant;

use crate::simulation::engine::Simulation;
use crate::simulation::forces::{Acceleration, DirectGravity};
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{Quad, Quadtree};
use crate::simulation::states::{Body, NVec2, System};

fn bench_params() -> Parameters {
    Parameters {
        dt: 0.01,
        theta: 1.0,
        epsilon: 0.05,
        g: 1.0,
        collision: true,
        cell_radius_factor: 4.0,
        cell_size_divisor: 50.0,
        seed: 42,
    }
}

/// Deterministic scattered population, no rand needed.
fn scatter(n: usize) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(n);
    for i in 0..n {
        let i_f = i as f64;
        let x = NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0);
        bodies.push(Body::new(x, NVec2::zeros(), [1.0, 1.0, 1.0], 1.0, 0.01));
    }
    bodies
}

/// Time one direct O(n^2) evaluation against one tree build + query
/// pass, for doubling system sizes.
pub fn bench_attract() {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let p = bench_params();

    for n in ns {
        let sys = System {
            bodies: scatter(n),
            t: 0.0,
        };
        let mut out = vec![NVec2::zeros(); n];

        let direct = DirectGravity {
            g: p.g,
            e_sq: p.epsilon * p.epsilon,
        };
        let start = Instant::now();
        direct.acceleration(&sys, &mut out);
        let t_direct = start.elapsed();

        let mut qt = Quadtree::new(p.theta, p.epsilon, p.g);
        let start = Instant::now();
        qt.clear(Quad::containing(&sys.bodies));
        for b in &sys.bodies {
            qt.insert(b.x, b.m);
        }
        qt.propagate();
        for (i, b) in sys.bodies.iter().enumerate() {
            out[i] = qt.acc(b.x);
        }
        let t_tree = start.elapsed();

        println!(
            "n = {:>6}: direct {:>10.2?}  tree {:>10.2?}  ({} nodes)",
            n,
            t_direct,
            t_tree,
            qt.nodes.len()
        );
    }
}

/// Time full steps (attract + collide + integrate) of a merging system.
pub fn bench_step() {
    let ns = [1000, 4000, 16000, 64000];

    for n in ns {
        let sys = System {
            bodies: scatter(n),
            t: 0.0,
        };
        let mut sim = Simulation::new(bench_params(), sys);

        let steps = 10;
        let start = Instant::now();
        for _ in 0..steps {
            sim.step();
        }
        let elapsed = start.elapsed();

        println!(
            "n = {:>6}: {:.2} ms/step, {} bodies after {} steps",
            n,
            elapsed.as_secs_f64() * 1e3 / steps as f64,
            sim.bodies().len(),
            steps
        );
    }
}
