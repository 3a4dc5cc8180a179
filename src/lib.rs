pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, System, NVec2};
pub use simulation::params::Parameters;
pub use simulation::quadtree::{Quad, Node, Quadtree};
pub use simulation::forces::{Acceleration, DirectGravity};
pub use simulation::integrator::semi_implicit_euler;
pub use simulation::engine::Simulation;
pub use simulation::collision::{UnionFind, merge_bodies, resolve_collisions};
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    EngineConfig, ParametersConfig, BodyConfig, DistributionConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_attract, bench_step};
