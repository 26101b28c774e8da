//! QuadTree for landmark radius queries.
//!
//! Every node covers a square region given by its center and half side
//! length. Nodes whose half-size drops below the configured resolution are
//! leaves and store landmarks directly; all other nodes route each landmark
//! into exactly one of four lazily allocated quadrants.

use std::f64::consts::SQRT_2;

use tracing::{debug, trace};

use crate::{BoundsError, Landmark, Position};

/// Absolute slack added to region edges by `contains` and `overlaps`.
const CONTAINS_TOLERANCE: f64 = 1e-5;

/// One of the four sub-regions of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Quadrant {
    /// All quadrants in search traversal order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthEast,
        Quadrant::SouthWest,
    ];

    /// Quadrant of `center` that `point` is routed to.
    ///
    /// Comparisons are strict, so points on a dividing line go West/South.
    #[inline]
    pub fn of(center: Position, point: Position) -> Self {
        match (point.x > center.x, point.y > center.y) {
            (true, true) => Self::NorthEast,
            (false, true) => Self::NorthWest,
            (true, false) => Self::SouthEast,
            (false, false) => Self::SouthWest,
        }
    }

    /// Direction from a parent's center to this quadrant's center.
    #[inline]
    fn direction(self) -> Position {
        match self {
            Self::NorthEast => Position::new(1.0, 1.0),
            Self::NorthWest => Position::new(-1.0, 1.0),
            Self::SouthEast => Position::new(1.0, -1.0),
            Self::SouthWest => Position::new(-1.0, -1.0),
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    /// Center and half-size of this quadrant of the region `center ± half_size`.
    #[inline]
    fn region(self, center: Position, half_size: f64) -> (Position, f64) {
        let half_size = half_size / 2.0;
        (center + self.direction() * half_size, half_size)
    }
}

#[inline]
fn region_contains(center: Position, half_size: f64, point: Position) -> bool {
    let reach = half_size + CONTAINS_TOLERANCE;
    let delta = (point - center).abs();
    delta.x < reach && delta.y < reach
}

/// Shape of an allocated tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaf_nodes: usize,
    pub internal_nodes: usize,
    pub landmarks: usize,
    pub max_depth: u32,
}

/// Point quadtree over a square region.
///
/// Built once, queried many times. Children are owned exclusively by their
/// parent and allocated on the first insertion routed into them.
pub struct QuadTree {
    center: Position,
    half_size: f64,
    resolution: f64,
    depth: u32,
    check_bounds: bool,
    /// Indexed by `Quadrant::slot`.
    children: [Option<Box<QuadTree>>; 4],
    landmarks: Vec<Landmark>,
    /// Landmarks stored in this subtree.
    len: usize,
}

impl QuadTree {
    /// Create a root node covering `center ± half_size`.
    ///
    /// Bounds checking starts enabled. Panics if `resolution` is not a
    /// positive finite number or `half_size` is negative or not finite,
    /// since such a tree would never stop subdividing.
    pub fn new(center: Position, half_size: f64, resolution: f64) -> Self {
        assert!(
            resolution.is_finite() && resolution > 0.0,
            "resolution must be positive and finite, got {resolution}"
        );
        assert!(
            half_size.is_finite() && half_size >= 0.0,
            "half-size must be non-negative and finite, got {half_size}"
        );
        Self::node(center, half_size, resolution, 0, true)
    }

    /// Enable or disable the containment check performed by `insert`.
    pub fn with_bounds_check(mut self, enabled: bool) -> Self {
        self.check_bounds = enabled;
        self
    }

    fn node(
        center: Position,
        half_size: f64,
        resolution: f64,
        depth: u32,
        check_bounds: bool,
    ) -> Self {
        trace!(depth, x = center.x, y = center.y, half_size, "quadtree node created");
        Self {
            center,
            half_size,
            resolution,
            depth,
            check_bounds,
            children: [None, None, None, None],
            landmarks: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn center(&self) -> Position {
        self.center
    }

    #[inline]
    pub fn half_size(&self) -> f64 {
        self.half_size
    }

    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Distance from the root.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn bounds_check(&self) -> bool {
        self.check_bounds
    }

    /// Whether this node stores landmarks instead of subdividing.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.half_size < self.resolution
    }

    /// Number of landmarks stored in this subtree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Landmarks stored directly on this node. Empty for internal nodes.
    #[inline]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// The child covering `quadrant`, if it has been allocated.
    #[inline]
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadTree> {
        self.children[quadrant.slot()].as_deref()
    }

    /// Check if `point` lies within the region, widened by 1e-5 on every side.
    #[inline]
    pub fn contains(&self, point: Position) -> bool {
        region_contains(self.center, self.half_size, point)
    }

    /// Insert a landmark, descending one node per level.
    ///
    /// With bounds checking enabled, the landmark must lie inside every
    /// region on its path down to the storing leaf. Child centers are
    /// rounded, so this is checked level by level before anything is
    /// allocated or stored; a rejected landmark leaves the tree untouched.
    pub fn insert(&mut self, landmark: Landmark) -> Result<(), BoundsError> {
        if self.check_bounds {
            if let Some(err) = self.path_violation(landmark) {
                debug!("{}", err);
                return Err(err);
            }
        }

        let mut node = self;
        loop {
            node.len += 1;
            if node.is_leaf() {
                node.landmarks.push(landmark);
                return Ok(());
            }

            let quadrant = Quadrant::of(node.center, landmark.position);
            let (center, half_size) = quadrant.region(node.center, node.half_size);
            let resolution = node.resolution;
            let depth = node.depth + 1;
            let check_bounds = node.check_bounds;

            let child: &mut QuadTree = node.children[quadrant.slot()].get_or_insert_with(|| {
                Box::new(QuadTree::node(center, half_size, resolution, depth, check_bounds))
            });
            node = child;
        }
    }

    /// First region on the insertion path of `landmark` that does not contain it.
    ///
    /// Regions are recomputed the same way children are allocated, so
    /// unallocated levels are checked too.
    fn path_violation(&self, landmark: Landmark) -> Option<BoundsError> {
        let position = landmark.position;
        let (mut center, mut half_size) = (self.center, self.half_size);
        loop {
            if !region_contains(center, half_size, position) {
                return Some(BoundsError {
                    landmark,
                    center,
                    half_size,
                });
            }
            if half_size < self.resolution {
                return None;
            }
            (center, half_size) = Quadrant::of(center, position).region(center, half_size);
        }
    }

    /// Conservative test of whether a query circle may reach this region.
    ///
    /// Compares the center distance against the radius plus the circumscribed
    /// radius of the region widened the same way as `contains`. Touching
    /// counts as reaching. Never rejects a region holding a landmark within
    /// the radius, but may accept regions the circle misses near the corners.
    #[inline]
    pub fn overlaps(&self, query: Position, radius: f64) -> bool {
        let reach = SQRT_2 * (self.half_size + CONTAINS_TOLERANCE);
        query.distance(self.center) <= radius + reach
    }

    /// Find candidate landmarks within `radius` of `query`.
    ///
    /// Every landmark within the radius is returned. Leaves reached by the
    /// walk contribute all of their landmarks unfiltered, so the result may
    /// also contain landmarks further away. Order follows the traversal.
    pub fn search(&self, query: Position, radius: f64) -> Vec<Landmark> {
        let mut found = Vec::new();
        self.search_into(query, radius, &mut found);
        found
    }

    /// Same as `search`, appending into a caller-owned buffer.
    pub fn search_into(&self, query: Position, radius: f64, found: &mut Vec<Landmark>) {
        if self.is_leaf() {
            found.extend_from_slice(&self.landmarks);
            return;
        }
        // One overlap decision at this node gates all of its children.
        if !self.overlaps(query, radius) {
            return;
        }
        for child in self.children.iter().flatten() {
            child.search_into(query, radius, found);
        }
    }

    /// Find landmarks whose distance to `query` is at most `radius`.
    pub fn search_exact(&self, query: Position, radius: f64) -> Vec<Landmark> {
        let mut found = self.search(query, radius);
        found.retain(|lm| lm.distance(query) <= radius);
        found
    }

    /// Iterate over every allocated leaf, in NE, NW, SE, SW order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Iterate over every stored landmark.
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.leaves().flat_map(|leaf| leaf.landmarks.iter())
    }

    /// Count nodes and measure the depth of this subtree.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
            if node.is_leaf() {
                stats.leaf_nodes += 1;
                stats.landmarks += node.landmarks.len();
            } else {
                stats.internal_nodes += 1;
                stack.extend(node.children.iter().flatten().map(|child| &**child));
            }
        }
        stats
    }
}

impl std::fmt::Debug for QuadTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadTree")
            .field("center", &self.center)
            .field("half_size", &self.half_size)
            .field("resolution", &self.resolution)
            .field("depth", &self.depth)
            .field("landmarks", &self.len)
            .finish()
    }
}

/// Depth-first iterator over the leaves of a [`QuadTree`].
pub struct Leaves<'a> {
    stack: Vec<&'a QuadTree>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a QuadTree;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            // Reversed so NorthEast is popped first.
            self.stack
                .extend(node.children.iter().rev().flatten().map(|child| &**child));
        }
        None
    }
}
