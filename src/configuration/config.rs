//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of
//! a scenario. A scenario consists of:
//!
//! - [`EngineConfig`]       – pipeline options (collision pass, opening angle)
//! - [`ParametersConfig`]   – numerical parameters and physical constants
//! - [`BodyConfig`]         – explicit initial state for individual bodies
//! - [`DistributionConfig`] – seeded random disc sampler for large populations
//! - [`ScenarioConfig`]     – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   collision: true
//!   theta: 1.5              # opening angle, 0 = exact
//!
//! parameters:
//!   dt: 0.01                # fixed step size
//!   epsilon: 1.0            # softening length
//!   g: 1.0                  # gravitational constant
//!   seed: 42                # sampler seed
//!
//! distribution:
//!   n: 100000               # orbiters around the central body
//!   sun_mass: 10000.0
//!   x_mean: 15.0            # bimodal: +/- x_mean
//!   x_std: 10.0
//!   y_std: 10.0
//!
//! bodies:                   # optional explicit bodies, appended first
//!   - x: [ -0.5, 0.0 ]
//!     v: [  0.0, 1.0 ]
//!     m: 1.0
//!     radius: 0.02
//! ```
//!
//! The engine maps this configuration into its internal runtime scenario
//! representation, which uses different structs optimized for stepping.

use serde::Deserialize;

/// High-level engine configuration
/// Controls the structure of the per-step pipeline
#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub collision: bool, // `true` - overlapping bodies merge each step
    pub theta: Option<f64>, // opening angle; node is summarized when size < theta * distance
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64,      // time step size
    pub epsilon: f64, // softening - prevents singular forces at very small separations
    pub g: f64,       // gravitational constant
    #[serde(default = "default_seed")]
    pub seed: u64,    // deterministic seed to make runs reproducible
    #[serde(default = "default_cell_radius_factor")]
    pub cell_radius_factor: f64, // collision grid: cell >= factor * max radius
    #[serde(default = "default_cell_size_divisor")]
    pub cell_size_divisor: f64, // collision grid: cell >= quad size / divisor
}

fn default_seed() -> u64 {
    42
}

fn default_cell_radius_factor() -> f64 {
    4.0
}

fn default_cell_size_divisor() -> f64 {
    50.0
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug)]
pub struct BodyConfig {
    pub x: [f64; 2], // initial position in simulation units
    pub v: [f64; 2], // initial velocity in simulation units per time unit
    pub m: f64,      // mass of the body
    pub radius: f64, // disc radius, used for collision merging and rendering
    #[serde(default = "default_body_color")]
    pub color: [f32; 3], // presentation color
}

fn default_body_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Seeded random disc distribution around a central body.
///
/// Orbiter x positions are bimodal normal (an even coin flip between
/// `+x_mean` and `-x_mean`), y positions normal, radii and densities
/// uniform (`m = density * r^2`), and each orbiter starts on a near
/// circular tangential orbit around the central mass with a small
/// uniform speed jitter.
#[derive(Deserialize, Debug, Clone)]
pub struct DistributionConfig {
    pub n: usize, // number of orbiters (the central body is extra)
    pub sun_mass: f64,
    #[serde(default = "default_sun_radius")]
    pub sun_radius: f64,
    #[serde(default = "default_sun_color")]
    pub sun_color: [f32; 3],
    pub x_mean: f64,
    pub x_std: f64,
    #[serde(default)]
    pub y_mean: f64,
    pub y_std: f64,
    #[serde(default = "default_radius_range")]
    pub radius_range: [f64; 2],
    #[serde(default = "default_density_range")]
    pub density_range: [f64; 2],
    #[serde(default = "default_speed_jitter")]
    pub speed_jitter: [f64; 2], // multiplier range on the circular-orbit speed
}

fn default_sun_radius() -> f64 {
    0.2
}

fn default_sun_color() -> [f32; 3] {
    [1.0, 1.0, 0.0]
}

fn default_radius_range() -> [f64; 2] {
    [0.005, 0.02]
}

fn default_density_range() -> [f64; 2] {
    [0.8, 2.5]
}

fn default_speed_jitter() -> [f64; 2] {
    [0.95, 1.05]
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // pipeline configuration (collision, opening angle)
    pub parameters: ParametersConfig, // global numerical and physical parameters
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // explicit bodies, may be empty
    pub distribution: Option<DistributionConfig>, // optional random population
}
