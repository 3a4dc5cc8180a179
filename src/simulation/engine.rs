//! Per-step simulation orchestration
//!
//! `Simulation` owns the body store and a reusable quadtree, and drives
//! the pipeline for one step: attract (tree rebuild + force query),
//! optional collision merging, then integration. The tree is cleared
//! and rebuilt from scratch every step; rebuilding is cheap next to the
//! force evaluation and stays correct under arbitrary motion and
//! merges.

use rayon::prelude::*;

use crate::simulation::collision::resolve_collisions;
use crate::simulation::integrator::semi_implicit_euler;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{Quad, Quadtree};
use crate::simulation::states::{Body, System};

pub struct Simulation {
    pub params: Parameters,
    pub system: System,
    pub frame: u64,
    qt: Quadtree,
}

impl Simulation {
    pub fn new(params: Parameters, system: System) -> Self {
        let qt = Quadtree::new(params.theta, params.epsilon, params.g);
        Self {
            params,
            system,
            frame: 0,
            qt,
        }
    }

    /// Advance the simulation by one step of `params.dt`.
    pub fn step(&mut self) {
        self.attract();
        if self.params.collision && self.system.bodies.len() > 1 {
            resolve_collisions(
                &mut self.system.bodies,
                self.params.cell_radius_factor,
                self.params.cell_size_divisor,
            );
        }
        self.iterate();
        self.frame += 1;
    }

    /// Consistent post-step view of the body store for a renderer.
    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    /// Rebuild the tree and write an acceleration onto every body.
    ///
    /// A zero-size bounding quad (empty store, or every body at one
    /// point) means there is no valid tree; the step degrades to
    /// integration-only.
    fn attract(&mut self) {
        let quad = Quad::containing(&self.system.bodies);
        if quad.size <= 0.0 {
            log::trace!("degenerate bounding quad, skipping force evaluation");
            return;
        }

        self.qt.clear(quad);
        for b in &self.system.bodies {
            self.qt.insert(b.x, b.m);
        }
        self.qt.propagate();

        // The tree is read-only from here; per-body queries write to
        // disjoint acceleration slots.
        let qt = &self.qt;
        self.system
            .bodies
            .par_iter_mut()
            .for_each(|b| b.a = qt.acc(b.x));
    }

    fn iterate(&mut self) {
        semi_implicit_euler(&mut self.system, self.params.dt);
    }
}
