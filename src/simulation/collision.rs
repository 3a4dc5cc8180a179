//! Collision detection and physical merging
//!
//! Overlapping bodies are found with a uniform spatial hash grid (each
//! body only ever tests its own cell and the 8 neighbors), grouped into
//! transitive clusters with a union-find, and each cluster is folded
//! into a single merged body under conservation rules.
//!
//! Pair detection is data-parallel with worker-local buffers; the
//! union-find and the merge fold are sequential, the structure has
//! shared mutable state with no safe parallel decomposition.

use rayon::prelude::*;

use crate::simulation::states::{Body, NVec2};
use crate::simulation::quadtree::Quad;

/// Disjoint-set over body indices with path compression and union by
/// rank.
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Root representative of `x`, compressing the path on the way up.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub fn union(&mut self, x: usize, y: usize) {
        let x = self.find(x);
        let y = self.find(y);
        if x == y {
            return;
        }
        if self.rank[x] < self.rank[y] {
            self.parent[x] = y;
        } else {
            self.parent[y] = x;
            if self.rank[x] == self.rank[y] {
                self.rank[x] += 1;
            }
        }
    }
}

/// Combine two bodies into one.
///
/// Mass adds; position and velocity are mass-weighted averages
/// (momentum conserving); the radius assumes equal-density spheres so
/// volume adds (`r = cbrt(r1^3 + r2^3)`); the color follows the heavier
/// operand, first operand on a tie.
pub fn merge_bodies(b1: &Body, b2: &Body) -> Body {
    debug_assert!(b1.m > 0.0 && b2.m > 0.0, "merge of non-positive mass");

    let m = b1.m + b2.m;
    let x = (b1.x * b1.m + b2.x * b2.m) / m;
    let v = (b1.v * b1.m + b2.v * b2.m) / m;
    let radius = (b1.radius.powi(3) + b2.radius.powi(3)).cbrt();
    let color = if b2.m > b1.m { b2.color } else { b1.color };

    Body::new(x, v, color, m, radius)
}

/// Uniform grid over the bounding quad of the current body store.
struct SpatialGrid {
    min: NVec2, // southwest corner of the covered region
    cell_size: f64,
    width: usize,
    height: usize,
    cells: Vec<Vec<usize>>, // body indices per cell
}

impl SpatialGrid {
    /// Size cells so no body spans more than its 3x3 cell neighborhood:
    /// `max(factor * r_max, quad.size / divisor)`, re-derived so the
    /// grid tiles the quad exactly. Degenerate quads (all bodies
    /// coincident) collapse to a single cell.
    fn new(bodies: &[Body], quad: &Quad, radius_factor: f64, size_divisor: f64) -> Self {
        let max_radius = bodies.iter().fold(0.0f64, |r, b| r.max(b.radius));
        let cell_size = (max_radius * radius_factor).max(quad.size / size_divisor);

        let width = if cell_size > 0.0 {
            ((quad.size / cell_size).ceil() as usize).max(1)
        } else {
            1
        };
        let height = width;
        let cell_size = quad.size / width as f64;

        let min = quad.center - NVec2::new(quad.size * 0.5, quad.size * 0.5);

        Self {
            min,
            cell_size,
            width,
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    /// Cell coordinates of `pos`, clamped to the grid bounds.
    fn cell_of(&self, pos: &NVec2) -> (usize, usize) {
        if self.cell_size <= 0.0 {
            return (0, 0);
        }
        let x = ((pos.x - self.min.x) / self.cell_size) as i64;
        let y = ((pos.y - self.min.y) / self.cell_size) as i64;
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        (x, y)
    }

    fn cell_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

/// Detect every overlapping pair, each unordered pair exactly once.
///
/// Parallel over bodies: each worker scans the 3x3 neighborhood of its
/// body's cell into a local buffer, guarded by `i < j` index ordering;
/// the buffers are merged into one list afterward.
fn detect_pairs(bodies: &[Body], grid: &SpatialGrid) -> Vec<(usize, usize)> {
    (0..bodies.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let (cx, cy) = grid.cell_of(&bodies[i].x);
            let mut local = Vec::new();

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || nx >= grid.width as i64 || ny < 0 || ny >= grid.height as i64 {
                        continue;
                    }
                    for &j in &grid.cells[grid.cell_index(nx as usize, ny as usize)] {
                        if i >= j {
                            continue;
                        }
                        let diff = bodies[i].x - bodies[j].x;
                        let reach = bodies[i].radius + bodies[j].radius;
                        if diff.dot(&diff) <= reach * reach {
                            local.push((i, j));
                        }
                    }
                }
            }
            local.into_iter()
        })
        .collect()
}

/// One full collision-merge pass.
///
/// Replaces the body store wholesale: every transitive overlap cluster
/// becomes one merged body, untouched bodies pass through. The new
/// store is sorted by squared distance from the origin, a locality
/// heuristic that improves cache behavior of the next tree build.
pub fn resolve_collisions(
    bodies: &mut Vec<Body>,
    radius_factor: f64,
    size_divisor: f64,
) {
    if bodies.len() <= 1 {
        return;
    }

    let quad = Quad::containing(bodies);
    let mut grid = SpatialGrid::new(bodies, &quad, radius_factor, size_divisor);

    // Cell assignment is parallel, the grid fill sequential.
    let cell_of: Vec<usize> = bodies
        .par_iter()
        .map(|b| {
            let (x, y) = grid.cell_of(&b.x);
            grid.cell_index(x, y)
        })
        .collect();
    for (i, &cell) in cell_of.iter().enumerate() {
        grid.cells[cell].push(i);
    }

    let pairs = detect_pairs(bodies, &grid);
    if !pairs.is_empty() {
        let mut sets = UnionFind::new(bodies.len());
        for &(i, j) in &pairs {
            sets.union(i, j);
        }

        // Group by root representative, members in ascending index order.
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); bodies.len()];
        for i in 0..bodies.len() {
            groups[sets.find(i)].push(i);
        }

        let mut new_bodies = Vec::with_capacity(bodies.len());
        for group in groups.iter().filter(|g| !g.is_empty()) {
            let mut merged = bodies[group[0]].clone();
            for &i in &group[1..] {
                merged = merge_bodies(&merged, &bodies[i]);
            }
            new_bodies.push(merged);
        }

        log::debug!(
            "collision pass: {} bodies -> {} after {} overlapping pairs",
            bodies.len(),
            new_bodies.len(),
            pairs.len()
        );

        *bodies = new_bodies;
    }

    // The sort runs on every pass, merges or not.
    bodies.sort_unstable_by(|a, b| a.x.norm_squared().total_cmp(&b.x.norm_squared()));
}
