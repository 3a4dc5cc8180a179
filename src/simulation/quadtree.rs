//! Array-backed Barnes-Hut quadtree
//!
//! The tree approximates gravity among `N` point masses in `O(N log N)`
//! instead of the naive `O(N^2)` all-pairs sum: sufficiently distant
//! groups of bodies are treated as a single pseudo-body at their center
//! of mass.
//!
//! Layout notes:
//! - Nodes live in one `Vec` and refer to each other by index, so the
//!   whole structure can be cleared and rebuilt every step without
//!   freeing or reallocating.
//! - A branch stores only the index of its first child; the four
//!   children of a subdivision are contiguous, one per quadrant.
//! - Every node carries a `next` skip index threading a pre-order
//!   flatten of the tree. Force queries walk the arena iteratively with
//!   no recursion and no explicit stack: accepting a node jumps to
//!   `next`, rejecting it steps into `children`. Index 0 is the root
//!   and doubles as the termination sentinel for `next`.
//! - Children are always allocated after their parent, so a reverse
//!   scan of the subdivision history aggregates masses bottom-up.

use crate::simulation::states::{Body, NVec2};

/// Axis-aligned square region of the plane.
///
/// Immutable once constructed; a fresh bounding quad is derived from the
/// body store every step. A zero `size` means "no valid region" and
/// callers must skip tree-dependent work.
#[derive(Debug, Clone, Copy)]
pub struct Quad {
    pub center: NVec2,
    pub size: f64, // edge length
}

impl Quad {
    pub fn new(center: NVec2, size: f64) -> Self {
        Self { center, size }
    }

    /// Smallest enclosing square over all body positions.
    ///
    /// Empty store degenerates to a zero-size quad at the origin.
    pub fn containing(bodies: &[Body]) -> Self {
        let Some(first) = bodies.first() else {
            return Self::new(NVec2::zeros(), 0.0);
        };

        let mut min = first.x;
        let mut max = first.x;
        for b in bodies {
            min.x = min.x.min(b.x.x);
            min.y = min.y.min(b.x.y);
            max.x = max.x.max(b.x.x);
            max.y = max.y.max(b.x.y);
        }

        let center = (min + max) * 0.5;
        let size = (max.x - min.x).max(max.y - min.y);
        Self::new(center, size)
    }

    /// Quadrant index of `pos` relative to this quad's center.
    ///
    /// Bit 0 encodes x (east half), bit 1 encodes y (north half).
    pub fn find_quadrant(&self, pos: &NVec2) -> usize {
        (((pos.y > self.center.y) as usize) << 1) | ((pos.x > self.center.x) as usize)
    }

    /// Half-size quad shifted into quadrant `quadrant`.
    pub fn into_quadrant(&self, quadrant: usize) -> Self {
        let size = self.size * 0.5;
        let qx = ((quadrant & 1) * 2) as f64 - 1.0;
        let qy = ((quadrant >> 1) * 2) as f64 - 1.0;
        let center = self.center + NVec2::new(qx * size * 0.5, qy * size * 0.5);
        Self::new(center, size)
    }

    /// The four child quads, indexed by `find_quadrant` encoding.
    pub fn subdivide(&self) -> [Quad; 4] {
        [
            self.into_quadrant(0),
            self.into_quadrant(1),
            self.into_quadrant(2),
            self.into_quadrant(3),
        ]
    }
}

/// One arena slot: a leaf holding at most one aggregated point mass, or
/// a branch holding the summed mass and centroid of its subtree.
#[derive(Debug, Clone)]
pub struct Node {
    pub children: usize, // 0 = leaf, otherwise index of first of 4 children
    pub next: usize, // skip pointer for the threaded traversal
    pub pos: NVec2, // point mass (leaf) or centroid (branch, after propagate)
    pub quad: Quad,
    pub mass: f64,
}

impl Node {
    fn new(next: usize, quad: Quad) -> Self {
        Self {
            children: 0,
            next,
            pos: NVec2::zeros(),
            quad,
            mass: 0.0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children == 0
    }

    pub fn is_branch(&self) -> bool {
        self.children != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mass == 0.0
    }
}

/// Reusable Barnes-Hut quadtree.
///
/// Constructed once and cleared each step; `clear` keeps the node and
/// history allocations alive so steady-state rebuilds allocate nothing.
pub struct Quadtree {
    t_sq: f64, // theta^2, opening-angle threshold squared
    e_sq: f64, // epsilon^2, softening squared
    g: f64, // gravitational constant
    pub nodes: Vec<Node>,
    parents: Vec<usize>, // subdivision history, parents in allocation order
}

impl Quadtree {
    pub const ROOT: usize = 0;

    pub fn new(theta: f64, epsilon: f64, g: f64) -> Self {
        Self {
            t_sq: theta * theta,
            e_sq: epsilon * epsilon,
            g,
            nodes: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Reset the arena to a single empty root leaf over `quad`.
    pub fn clear(&mut self, quad: Quad) {
        self.nodes.clear();
        self.parents.clear();
        self.nodes.push(Node::new(Self::ROOT, quad));
    }

    /// Insert one point mass.
    ///
    /// Descends to the leaf whose quad contains `pos`. An empty leaf
    /// takes the point directly; an occupant at the exact same position
    /// absorbs the mass (no infinite subdivision for coincident
    /// points); otherwise the leaf subdivides until the two points fall
    /// in different quadrants. Terminates because the quad size halves
    /// on every subdivision.
    pub fn insert(&mut self, pos: NVec2, mass: f64) {
        let mut node = Self::ROOT;

        while self.nodes[node].is_branch() {
            let quadrant = self.nodes[node].quad.find_quadrant(&pos);
            node = self.nodes[node].children + quadrant;
        }

        if self.nodes[node].is_empty() {
            self.nodes[node].pos = pos;
            self.nodes[node].mass = mass;
            return;
        }

        let p = self.nodes[node].pos;
        let m = self.nodes[node].mass;
        if pos == p {
            self.nodes[node].mass += mass;
            return;
        }

        loop {
            let children = self.subdivide(node);
            let q1 = self.nodes[node].quad.find_quadrant(&p);
            let q2 = self.nodes[node].quad.find_quadrant(&pos);

            if q1 != q2 {
                let n1 = children + q1;
                let n2 = children + q2;
                self.nodes[n1].pos = p;
                self.nodes[n1].mass = m;
                self.nodes[n2].pos = pos;
                self.nodes[n2].mass = mass;
                return;
            }
            node = children + q1;
        }
    }

    /// Turn a leaf into a branch with four fresh child leaves.
    ///
    /// The first three children chain to their next sibling; the fourth
    /// inherits the parent's own `next`, so leaving the last child of a
    /// subtree resumes exactly where leaving the parent would have.
    fn subdivide(&mut self, node: usize) -> usize {
        self.parents.push(node);
        let children = self.nodes.len();
        self.nodes[node].children = children;

        let nexts = [
            children + 1,
            children + 2,
            children + 3,
            self.nodes[node].next,
        ];
        let quads = self.nodes[node].quad.subdivide();
        for (next, quad) in nexts.into_iter().zip(quads) {
            self.nodes.push(Node::new(next, quad));
        }

        children
    }

    /// Bottom-up mass aggregation.
    ///
    /// Children always have larger indices than their parent, so
    /// walking the subdivision history in reverse visits every subtree
    /// before its ancestors. Each recorded branch receives the summed
    /// mass and mass-weighted centroid of its four children.
    pub fn propagate(&mut self) {
        for &node in self.parents.iter().rev() {
            let i = self.nodes[node].children;

            let mut pos_sum = NVec2::zeros();
            let mut mass_sum = 0.0;
            for j in 0..4 {
                pos_sum += self.nodes[i + j].pos * self.nodes[i + j].mass;
                mass_sum += self.nodes[i + j].mass;
            }

            // A branch only exists because at least one body passed through it.
            debug_assert!(mass_sum > 0.0, "branch with zero subtree mass");
            self.nodes[node].pos = pos_sum / mass_sum;
            self.nodes[node].mass = mass_sum;
        }
    }

    /// Gravitational acceleration at `pos` from the whole tree.
    ///
    /// Iterative threaded traversal: a node is accepted as a single
    /// point-mass source when it is a leaf, or when its quad is small
    /// relative to its distance (`size^2 < d^2 * theta^2`). Accepting
    /// jumps to `next`, skipping the subtree; rejecting steps into the
    /// first child. Traversal ends when `next` returns to the root
    /// sentinel.
    ///
    /// The kernel is softened (`epsilon^2` added to the squared
    /// distance) and clamped; a zero or negative denominator, including
    /// a query exactly on a source point, contributes nothing.
    pub fn acc(&self, pos: NVec2) -> NVec2 {
        let mut acceleration = NVec2::zeros();
        let mut node = Self::ROOT;

        loop {
            let n = &self.nodes[node];
            let d = n.pos - pos;
            let d_sq = d.dot(&d);

            if n.is_leaf() || n.quad.size * n.quad.size < d_sq * self.t_sq {
                let denom = (d_sq + self.e_sq) * d_sq.sqrt();
                if denom > 0.0 {
                    acceleration += d * (self.g * n.mass / denom).min(f64::MAX);
                }

                if n.next == Self::ROOT {
                    break;
                }
                node = n.next;
            } else {
                node = n.children;
            }
        }

        acceleration
    }
}
