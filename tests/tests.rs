use gravsim::simulation::states::{Body, NVec2, System};
use gravsim::simulation::params::Parameters;
use gravsim::simulation::quadtree::{Quad, Quadtree};
use gravsim::simulation::forces::{Acceleration, DirectGravity};
use gravsim::simulation::engine::Simulation;
use gravsim::simulation::collision::{merge_bodies, resolve_collisions, UnionFind};
use gravsim::simulation::scenario::Scenario;
use gravsim::configuration::config::ScenarioConfig;

use approx::assert_relative_eq;
use rand::prelude::*;

/// Shorthand body constructor for tests
pub fn body(x: [f64; 2], v: [f64; 2], m: f64, radius: f64) -> Body {
    Body::new(
        NVec2::new(x[0], x[1]),
        NVec2::new(v[0], v[1]),
        [1.0, 1.0, 1.0],
        m,
        radius,
    )
}

/// Default physics parameters for tests
pub fn test_params() -> Parameters {
    Parameters {
        dt: 0.001,
        theta: 0.0,
        epsilon: 0.05,
        g: 1.0,
        collision: false,
        cell_radius_factor: 4.0,
        cell_size_divisor: 50.0,
        seed: 42,
    }
}

/// Seeded random cloud of bodies
pub fn random_bodies(n: usize, seed: u64) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            body(
                [rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)],
                [0.0, 0.0],
                rng.gen_range(0.1..5.0),
                0.01,
            )
        })
        .collect()
}

/// Build + propagate a tree over the given bodies
pub fn build_tree(bodies: &[Body], p: &Parameters) -> Quadtree {
    let mut qt = Quadtree::new(p.theta, p.epsilon, p.g);
    qt.clear(Quad::containing(bodies));
    for b in bodies {
        qt.insert(b.x, b.m);
    }
    qt.propagate();
    qt
}

// ==================================================================================
// Quad geometry tests
// ==================================================================================

#[test]
fn bounding_quad_encloses_all_bodies() {
    let bodies = vec![
        body([-3.0, 1.0], [0.0, 0.0], 1.0, 0.0),
        body([5.0, -2.0], [0.0, 0.0], 1.0, 0.0),
        body([1.0, 4.0], [0.0, 0.0], 1.0, 0.0),
    ];
    let q = Quad::containing(&bodies);

    assert_relative_eq!(q.center.x, 1.0);
    assert_relative_eq!(q.center.y, 1.0);
    // max(width, height) = max(8, 6)
    assert_relative_eq!(q.size, 8.0);
}

#[test]
fn bounding_quad_of_empty_store_is_degenerate() {
    let q = Quad::containing(&[]);
    assert_eq!(q.size, 0.0);
    assert_eq!(q.center, NVec2::zeros());
}

#[test]
fn quadrant_encoding_matches_subdivision_layout() {
    let q = Quad::new(NVec2::zeros(), 4.0);

    assert_eq!(q.find_quadrant(&NVec2::new(-1.0, -1.0)), 0);
    assert_eq!(q.find_quadrant(&NVec2::new(1.0, -1.0)), 1);
    assert_eq!(q.find_quadrant(&NVec2::new(-1.0, 1.0)), 2);
    assert_eq!(q.find_quadrant(&NVec2::new(1.0, 1.0)), 3);

    // Each child quad must contain the points that map to its index
    for (i, child) in q.subdivide().into_iter().enumerate() {
        assert_relative_eq!(child.size, 2.0);
        assert_eq!(q.find_quadrant(&child.center), i);
    }
}

// ==================================================================================
// Quadtree tests
// ==================================================================================

#[test]
fn tree_matches_brute_force_with_zero_theta() {
    let p = test_params();
    let bodies = random_bodies(50, 7);
    let sys = System {
        bodies: bodies.clone(),
        t: 0.0,
    };

    let direct = DirectGravity {
        g: p.g,
        e_sq: p.epsilon * p.epsilon,
    };
    let mut exact = vec![NVec2::zeros(); bodies.len()];
    direct.acceleration(&sys, &mut exact);

    let qt = build_tree(&bodies, &p);
    for (b, e) in bodies.iter().zip(exact.iter()) {
        let a = qt.acc(b.x);
        assert_relative_eq!(a.x, e.x, epsilon = 1e-9, max_relative = 1e-6);
        assert_relative_eq!(a.y, e.y, epsilon = 1e-9, max_relative = 1e-6);
    }
}

#[test]
fn propagation_is_insertion_order_invariant() {
    let p = test_params();
    let bodies = random_bodies(200, 11);

    let forward = build_tree(&bodies, &p);

    let mut shuffled = bodies.clone();
    shuffled.reverse();
    let mut rng = StdRng::seed_from_u64(3);
    shuffled.shuffle(&mut rng);
    let backward = build_tree(&shuffled, &p);

    let root_a = &forward.nodes[Quadtree::ROOT];
    let root_b = &backward.nodes[Quadtree::ROOT];
    assert_relative_eq!(root_a.mass, root_b.mass, max_relative = 1e-12);
    assert_relative_eq!(root_a.pos.x, root_b.pos.x, max_relative = 1e-9);
    assert_relative_eq!(root_a.pos.y, root_b.pos.y, max_relative = 1e-9);
}

#[test]
fn coincident_insertions_aggregate_instead_of_subdividing() {
    let p = test_params();
    let mut qt = Quadtree::new(p.theta, p.epsilon, p.g);
    qt.clear(Quad::new(NVec2::zeros(), 4.0));

    let pos = NVec2::new(1.0, 1.0);
    qt.insert(pos, 2.0);
    qt.insert(pos, 3.0);
    qt.propagate();

    // Single leaf root holding the summed mass, no subdivision
    assert_eq!(qt.nodes.len(), 1);
    let root = &qt.nodes[Quadtree::ROOT];
    assert!(root.is_leaf());
    assert_relative_eq!(root.mass, 5.0);
}

#[test]
fn query_at_source_position_contributes_nothing() {
    let p = test_params();
    let bodies = vec![body([2.0, 3.0], [0.0, 0.0], 10.0, 0.0)];
    let mut qt = Quadtree::new(p.theta, p.epsilon, p.g);
    qt.clear(Quad::new(NVec2::new(2.0, 3.0), 1.0));
    qt.insert(bodies[0].x, bodies[0].m);
    qt.propagate();

    let a = qt.acc(bodies[0].x);
    assert_eq!(a, NVec2::zeros());
}

// ==================================================================================
// Engine and integrator tests
// ==================================================================================

#[test]
fn stationary_single_body_never_moves() {
    let mut p = test_params();
    p.dt = 0.01;
    let sys = System {
        bodies: vec![body([3.0, -2.0], [0.0, 0.0], 5.0, 0.1)],
        t: 0.0,
    };
    let mut sim = Simulation::new(p, sys);

    for _ in 0..100 {
        sim.step();
    }

    let b = &sim.bodies()[0];
    assert_eq!(b.x, NVec2::new(3.0, -2.0));
    assert_eq!(b.v, NVec2::zeros());
    assert_eq!(b.a, NVec2::zeros());
}

#[test]
fn two_body_orbit_stays_in_radius_band() {
    let sun_mass: f64 = 1000.0;
    let r0 = 1.0;
    let speed = (sun_mass / r0).sqrt();

    let mut p = test_params();
    p.dt = 1e-4;
    p.epsilon = 0.0;

    let sys = System {
        bodies: vec![
            body([0.0, 0.0], [0.0, 0.0], sun_mass, 0.0),
            body([r0, 0.0], [0.0, speed], 1e-6, 0.0),
        ],
        t: 0.0,
    };
    let mut sim = Simulation::new(p, sys);

    // ~10 orbital periods
    let mut min_r = f64::INFINITY;
    let mut max_r = 0.0f64;
    for _ in 0..20_000 {
        sim.step();
        let r = (sim.bodies()[1].x - sim.bodies()[0].x).norm();
        min_r = min_r.min(r);
        max_r = max_r.max(r);
    }

    assert!(min_r > 0.9 * r0, "orbit decayed to r = {}", min_r);
    assert!(max_r < 1.1 * r0, "orbit grew to r = {}", max_r);
}

#[test]
fn zero_dt_step_is_idempotent() {
    let mut p = test_params();
    p.dt = 0.0;
    let bodies = vec![
        body([0.0, 0.0], [1.0, -1.0], 10.0, 0.1),
        body([4.0, 1.0], [-0.5, 0.25], 3.0, 0.1),
    ];
    let sys = System {
        bodies: bodies.clone(),
        t: 0.0,
    };
    let mut sim = Simulation::new(p, sys);
    sim.step();

    for (before, after) in bodies.iter().zip(sim.bodies()) {
        assert_eq!(before.x, after.x);
        assert_eq!(before.v, after.v);
    }
}

#[test]
fn empty_store_steps_without_tree_work() {
    let sys = System {
        bodies: Vec::new(),
        t: 0.0,
    };
    let mut sim = Simulation::new(test_params(), sys);
    sim.step();
    sim.step();
    assert!(sim.bodies().is_empty());
    assert_eq!(sim.frame, 2);
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn union_find_is_transitive() {
    let mut sets = UnionFind::new(5);
    sets.union(0, 1);
    sets.union(1, 2);

    assert_eq!(sets.find(0), sets.find(2));
    assert_ne!(sets.find(0), sets.find(3));
    assert_ne!(sets.find(3), sets.find(4));
}

#[test]
fn merge_law_conserves_mass_and_momentum() {
    let b1 = Body::new(NVec2::new(0.0, 0.0), NVec2::new(1.0, 0.0), [1.0, 0.0, 0.0], 3.0, 1.0);
    let b2 = Body::new(NVec2::new(2.0, 0.0), NVec2::new(-1.0, 0.0), [0.0, 0.0, 1.0], 1.0, 1.0);

    let m = merge_bodies(&b1, &b2);
    assert_relative_eq!(m.m, 4.0);
    assert_relative_eq!(m.x.x, 0.5); // mass-weighted toward the heavier body
    assert_relative_eq!(m.v.x, 0.5); // (3*1 + 1*-1) / 4
    assert_relative_eq!(m.radius, 2.0f64.cbrt());
    assert_eq!(m.color, [1.0, 0.0, 0.0]); // heavier operand wins

    // Equal masses: first operand wins the color tie
    let b3 = Body::new(NVec2::zeros(), NVec2::zeros(), [0.0, 1.0, 0.0], 1.0, 1.0);
    let tie = merge_bodies(&b3, &b2);
    assert_eq!(tie.color, [0.0, 1.0, 0.0]);
}

#[test]
fn three_overlapping_bodies_merge_into_one() {
    let mut bodies = vec![
        body([0.0, 0.0], [0.0, 0.0], 1.0, 1.0),
        body([1.0, 0.0], [0.0, 0.0], 1.0, 1.0),
        body([0.5, 0.5], [0.0, 0.0], 1.0, 1.0),
    ];
    resolve_collisions(&mut bodies, 4.0, 50.0);

    assert_eq!(bodies.len(), 1);
    let b = &bodies[0];
    assert_relative_eq!(b.m, 3.0);
    assert_relative_eq!(b.radius, 3.0f64.cbrt());
    assert_relative_eq!(b.x.x, 0.5);
    assert_relative_eq!(b.x.y, 0.5 / 3.0);
    assert_eq!(b.v, NVec2::zeros());
}

#[test]
fn transitive_overlap_chain_merges_into_one_group() {
    // A overlaps B, B overlaps C, A and C do not touch directly
    let mut bodies = vec![
        body([0.0, 0.0], [0.0, 0.0], 1.0, 1.0),
        body([1.5, 0.0], [0.0, 0.0], 1.0, 1.0),
        body([3.0, 0.0], [0.0, 0.0], 1.0, 1.0),
    ];
    resolve_collisions(&mut bodies, 4.0, 50.0);

    assert_eq!(bodies.len(), 1);
    assert_relative_eq!(bodies[0].m, 3.0);
    assert_relative_eq!(bodies[0].x.x, 1.5);
}

#[test]
fn separated_bodies_pass_through_unmerged() {
    // Deliberately unsorted: farthest body first
    let mut bodies = vec![
        body([10.0, 0.0], [0.0, 0.0], 2.0, 0.1),
        body([0.0, 0.0], [0.0, 0.0], 1.0, 0.1),
        body([0.0, 7.0], [0.0, 0.0], 3.0, 0.1),
    ];
    resolve_collisions(&mut bodies, 4.0, 50.0);

    assert_eq!(bodies.len(), 3);
    let total: f64 = bodies.iter().map(|b| b.m).sum();
    assert_relative_eq!(total, 6.0);

    // A pair-free pass still re-sorts the store by distance from the origin
    assert_relative_eq!(bodies[0].m, 1.0);
    assert_relative_eq!(bodies[1].m, 3.0);
    assert_relative_eq!(bodies[2].m, 2.0);
}

#[test]
fn overlap_across_neighboring_grid_cells_is_detected() {
    // Far corner bodies stretch the bounding quad to size 20, so the
    // cell heuristic max(4 * 0.1, 20 / 50) gives 0.4-unit cells and a
    // 50x50 grid. The overlapping pair straddles a cell boundary
    // (x = 0.38 lands in column 0, x = 0.55 in column 1) and is only
    // found by the 3x3 neighborhood scan.
    let mut bodies = vec![
        body([0.0, 0.0], [0.0, 0.0], 1.0, 0.1),
        body([20.0, 20.0], [0.0, 0.0], 1.0, 0.1),
        body([0.38, 0.2], [0.0, 0.0], 1.0, 0.1),
        body([0.55, 0.2], [0.0, 0.0], 1.0, 0.1),
    ];
    resolve_collisions(&mut bodies, 4.0, 50.0);

    assert_eq!(bodies.len(), 3);
    let merged = bodies
        .iter()
        .find(|b| b.m > 1.0)
        .expect("straddling pair should have merged");
    assert_relative_eq!(merged.m, 2.0);
    assert_relative_eq!(merged.x.x, (0.38 + 0.55) / 2.0);
    assert_relative_eq!(merged.x.y, 0.2);
}

#[test]
fn collision_pass_sorts_by_distance_from_origin() {
    let mut bodies = vec![
        body([5.0, 0.0], [0.0, 0.0], 1.0, 0.1),
        body([1.0, 0.0], [0.0, 0.0], 1.0, 0.1),
        body([1.05, 0.0], [0.0, 0.0], 1.0, 0.1),
        body([-3.0, 0.0], [0.0, 0.0], 1.0, 0.1),
    ];
    resolve_collisions(&mut bodies, 4.0, 50.0);

    assert_eq!(bodies.len(), 3);
    let mut prev = 0.0;
    for b in &bodies {
        let d = b.x.norm_squared();
        assert!(d >= prev);
        prev = d;
    }
}

// ==================================================================================
// Scenario and sampler tests
// ==================================================================================

fn disc_config(n: usize, seed: u64) -> ScenarioConfig {
    let yaml = format!(
        "engine:\n  collision: true\n  theta: 1.5\nparameters:\n  dt: 0.01\n  epsilon: 1.0\n  g: 1.0\n  seed: {seed}\ndistribution:\n  n: {n}\n  sun_mass: 10000.0\n  x_mean: 10.0\n  x_std: 3.0\n  y_std: 5.0\n"
    );
    serde_yaml::from_str(&yaml).expect("valid scenario yaml")
}

#[test]
fn sampler_upholds_body_invariants() {
    let scenario = Scenario::build(disc_config(500, 42)).unwrap();
    let bodies = &scenario.system.bodies;

    assert_eq!(bodies.len(), 501); // n orbiters + central body
    for b in bodies {
        assert!(b.m > 0.0);
        assert!(b.radius >= 0.0);
    }

    // Store comes back sorted by squared distance from the origin
    let mut prev = 0.0;
    for b in bodies {
        let d = b.x.norm_squared();
        assert!(d >= prev);
        prev = d;
    }
}

#[test]
fn sampler_is_deterministic_for_a_seed() {
    let a = Scenario::build(disc_config(200, 7)).unwrap();
    let b = Scenario::build(disc_config(200, 7)).unwrap();

    for (ba, bb) in a.system.bodies.iter().zip(&b.system.bodies) {
        assert_eq!(ba.x, bb.x);
        assert_eq!(ba.v, bb.v);
        assert_eq!(ba.m, bb.m);
        assert_eq!(ba.radius, bb.radius);
    }
}

#[test]
fn explicit_bodies_round_trip_through_config() {
    let yaml = "
engine:
  collision: false
parameters:
  dt: 0.001
  epsilon: 0.0
  g: 1.0
bodies:
  - x: [ -0.5, 0.0 ]
    v: [ 0.0, 1.0 ]
    m: 1.0
    radius: 0.02
  - x: [ 0.5, 0.0 ]
    v: [ 0.0, -1.0 ]
    m: 2.0
    radius: 0.02
";
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    let scenario = Scenario::build(cfg).unwrap();

    assert_eq!(scenario.system.bodies.len(), 2);
    assert_relative_eq!(scenario.system.bodies[1].m, 2.0);
    // theta falls back to its default when omitted
    assert_relative_eq!(scenario.parameters.theta, 1.5);
}
