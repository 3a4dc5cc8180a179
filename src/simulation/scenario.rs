//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0)
//!
//! Initial bodies come from the explicit `bodies:` list, the seeded
//! `distribution:` disc sampler, or both. The sampler only promises the
//! core's body invariant (positive mass, non-negative radius); the
//! physics does not depend on how the population was drawn.

use anyhow::Result;
use rand::prelude::*;
use rand_distr::{Bernoulli, Normal};

use crate::configuration::config::{BodyConfig, DistributionConfig, ScenarioConfig};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, System};

/// A fully-initialized simulation scenario: parameters plus the initial
/// body population at `t = 0`.
pub struct Scenario {
    pub parameters: Parameters,
    pub system: System,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        let parameters = Parameters {
            dt: cfg.parameters.dt,
            theta: cfg.engine.theta.unwrap_or(1.5),
            epsilon: cfg.parameters.epsilon,
            g: cfg.parameters.g,
            collision: cfg.engine.collision,
            cell_radius_factor: cfg.parameters.cell_radius_factor,
            cell_size_divisor: cfg.parameters.cell_size_divisor,
            seed: cfg.parameters.seed,
        };

        // Explicit bodies first, then the sampled population.
        let mut bodies: Vec<Body> = cfg
            .bodies
            .iter()
            .map(|bc: &BodyConfig| {
                Body::new(
                    NVec2::new(bc.x[0], bc.x[1]),
                    NVec2::new(bc.v[0], bc.v[1]),
                    bc.color,
                    bc.m,
                    bc.radius,
                )
            })
            .collect();

        if let Some(dist) = &cfg.distribution {
            bodies.extend(sample_disc(dist, parameters.seed)?);
        }

        log::info!("scenario built with {} bodies", bodies.len());

        Ok(Self {
            parameters,
            system: System { bodies, t: 0.0 },
        })
    }
}

/// Draw a central body plus `n` orbiters from the configured disc
/// distribution, deterministically for a given seed.
///
/// Each orbiter gets a tangential velocity at the local circular-orbit
/// speed for the central mass, scaled by a small uniform jitter; bodies
/// closer than the cutoff to the origin start at rest. The result is
/// sorted by squared distance from the origin so the first tree build
/// inserts spatially close bodies together.
fn sample_disc(cfg: &DistributionConfig, seed: u64) -> Result<Vec<Body>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let x_east = Normal::new(cfg.x_mean, cfg.x_std)?;
    let x_west = Normal::new(-cfg.x_mean, cfg.x_std)?;
    let mix_x = Bernoulli::new(0.5)?;
    let y_dist = Normal::new(cfg.y_mean, cfg.y_std)?;

    let mut bodies = Vec::with_capacity(cfg.n + 1);
    bodies.push(Body::new(
        NVec2::zeros(),
        NVec2::zeros(),
        cfg.sun_color,
        cfg.sun_mass,
        cfg.sun_radius,
    ));

    for _ in 0..cfg.n {
        let radius = rng.gen_range(cfg.radius_range[0]..cfg.radius_range[1]);
        let density = rng.gen_range(cfg.density_range[0]..cfg.density_range[1]);
        let mass = density * radius * radius;

        let x = if mix_x.sample(&mut rng) {
            x_east.sample(&mut rng)
        } else {
            x_west.sample(&mut rng)
        };
        let y = y_dist.sample(&mut rng);
        let position = NVec2::new(x, y);

        let mut velocity = NVec2::zeros();
        let distance = position.norm();
        if distance > 1e-3 {
            let tangent = NVec2::new(-y, x) / distance;
            let orbital_speed = (cfg.sun_mass / distance).sqrt()
                * rng.gen_range(cfg.speed_jitter[0]..cfg.speed_jitter[1]);
            velocity = tangent * orbital_speed;
        }

        bodies.push(Body::new(position, velocity, [1.0, 1.0, 1.0], mass, radius));
    }

    bodies.sort_unstable_by(|a, b| a.x.norm_squared().total_cmp(&b.x.norm_squared()));
    Ok(bodies)
}
