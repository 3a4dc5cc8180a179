//! Core state types for the 2D gravity simulation.
//!
//! Defines the body/system structs:
//! - `Body` using `NVec2` (position, velocity, transient acceleration)
//! - `System` holding the flat body store and the current time `t`
//!
//! The body store is owned exclusively by the simulation engine; the
//! collision pass replaces it wholesale, so no index into it is valid
//! across a step boundary.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub a: NVec2, // acceleration, zeroed after each integration
    pub m: f64, // mass, invariant m > 0
    pub radius: f64, // disc radius, invariant radius >= 0
    pub color: [f32; 3], // presentation tag, carried through merges
}

impl Body {
    pub fn new(x: NVec2, v: NVec2, color: [f32; 3], m: f64, radius: f64) -> Self {
        Self {
            x,
            v,
            a: NVec2::zeros(),
            m,
            radius,
            color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // flat collection of bodies
    pub t: f64, // time
}
