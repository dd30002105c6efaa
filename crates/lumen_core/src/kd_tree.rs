//! Kd-tree over scene triangles.
//!
//! The tree splits round-robin on x, y, z at the median centroid. Triangles
//! that straddle a split plane are kept in the splitting node while it has
//! room and are duplicated into both children once it is full, so every
//! triangle is reachable from each region it overlaps.
//!
//! An axis on which every candidate straddles the median plane is skipped
//! in favour of the next one. This keeps flat geometry such as floors and
//! walls splitting along the directions it spans. Only a set that no axis
//! separates becomes an oversized leaf.
//!
//! Queries visit every node whose box the ray enters. There is no
//! front-to-back early exit; the nearest hit is whichever has the smallest
//! `t`, with ties resolved by triangle index. This makes the result
//! identical to a linear scan over all triangles.

use std::fmt::{self, Write};

use lumen_math::{
    half_space_triangle, ray_aabb, ray_triangle, BoundingBox, Ray, Side, Triangle, TriangleHit,
    Vec3,
};

/// Default number of triangles a node holds before it is split.
pub const DEFAULT_CAPACITY: usize = 8;

/// Split axis of an inner node.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index into a `Vec3`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Axis that follows this one in x, y, z order.
    pub fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// A node of the tree, stored in the tree's arena.
#[derive(Debug, Clone)]
pub struct KdNode {
    /// `None` for leaves.
    pub axis: Option<Axis>,
    pub split_value: f32,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub bounds: BoundingBox,
    /// Triangles owned by this node: all of them for a leaf, the
    /// straddling ones for an inner node.
    pub indices: Vec<usize>,
}

impl KdNode {
    pub fn is_leaf(&self) -> bool {
        self.axis.is_none()
    }
}

/// Shape of a built tree.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct KdStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    /// Total triangle indices stored, counting duplicates.
    pub references: usize,
}

/// Spatial index over a fixed triangle list.
///
/// The tree stores indices only. Queries take the same slice the tree was
/// built from; passing a different one gives meaningless results.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<usize>,
    capacity: usize,
}

impl KdTree {
    /// Build a tree with at most `capacity` triangles per leaf.
    ///
    /// A capacity of zero is treated as one.
    pub fn build(triangles: &[Triangle], capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
            capacity,
        };

        if triangles.is_empty() {
            return tree;
        }

        let centroids: Vec<_> = triangles.iter().map(Triangle::centroid).collect();
        let bounds = BoundingBox::enclosing(triangles.iter().flat_map(|t| t.vertices));
        let indices: Vec<usize> = (0..triangles.len()).collect();

        let builder = Builder {
            triangles,
            centroids: &centroids,
            capacity,
        };
        tree.root = Some(builder.build_node(&mut tree.nodes, indices, bounds, None));

        let stats = tree.stats();
        log::debug!(
            "Built kd-tree over {} triangles: {} nodes, {} leaves, depth {}, {} references",
            triangles.len(),
            stats.nodes,
            stats.leaves,
            stats.depth,
            stats.references
        );

        tree
    }

    /// Nearest triangle hit along `ray`, as `(triangle index, hit)`.
    pub fn nearest_triangle(&self, triangles: &[Triangle], ray: &Ray) -> Option<(usize, TriangleHit)> {
        self.root
            .and_then(|root| self.nearest_in_node(root, triangles, ray))
    }

    fn nearest_in_node(
        &self,
        node_idx: usize,
        triangles: &[Triangle],
        ray: &Ray,
    ) -> Option<(usize, TriangleHit)> {
        let node = &self.nodes[node_idx];
        if !ray_aabb(ray, &node.bounds) {
            return None;
        }

        let mut best = nearest_among(triangles, node.indices.iter().copied(), ray);
        for child in [node.left, node.right].into_iter().flatten() {
            best = nearer(best, self.nearest_in_node(child, triangles, ray));
        }
        best
    }

    /// Root node, if any triangles were indexed.
    pub fn root(&self) -> Option<&KdNode> {
        self.root.map(|idx| &self.nodes[idx])
    }

    /// Node at an arena handle.
    pub fn node(&self, idx: usize) -> Option<&KdNode> {
        self.nodes.get(idx)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Count nodes, leaves, depth and stored references.
    pub fn stats(&self) -> KdStats {
        let mut stats = KdStats::default();
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();

        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);
            stats.references += node.indices.len();
            if node.is_leaf() {
                stats.leaves += 1;
            }
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }

        stats
    }

    /// Pre-order listing of every node with its box and triangles.
    pub fn dump(&self, triangles: &[Triangle]) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.dump_node(&mut out, root, 0, triangles);
        } else {
            out.push_str("(empty)\n");
        }
        out
    }

    fn dump_node(&self, out: &mut String, idx: usize, level: usize, triangles: &[Triangle]) {
        let node = &self.nodes[idx];
        let indent = "  ".repeat(level);

        // Writing into a String cannot fail.
        let _ = match node.axis {
            Some(axis) => writeln!(
                out,
                "{indent}inner axis={axis} split={:.4} {} ({} straddling)",
                node.split_value,
                node.bounds,
                node.indices.len()
            ),
            None => writeln!(out, "{indent}leaf {} ({} triangles)", node.bounds, node.indices.len()),
        };

        for &i in &node.indices {
            let [a, b, c] = triangles[i].vertices;
            let _ = writeln!(out, "{indent}  #{i}: {a} {b} {c}");
        }

        for child in [node.left, node.right].into_iter().flatten() {
            self.dump_node(out, child, level + 1, triangles);
        }
    }
}

struct Builder<'a> {
    triangles: &'a [Triangle],
    centroids: &'a [Vec3],
    capacity: usize,
}

/// Outcome of classifying a candidate set against one split plane.
struct Partition {
    axis: Axis,
    split_value: f32,
    own: Vec<usize>,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl Builder<'_> {
    /// Recursive construction. Returns the arena handle of the new node.
    ///
    /// The median element always touches the split plane, so every inner
    /// node keeps at least one triangle and child sets strictly shrink.
    fn build_node(
        &self,
        nodes: &mut Vec<KdNode>,
        mut indices: Vec<usize>,
        bounds: BoundingBox,
        parent_axis: Option<Axis>,
    ) -> usize {
        let first = parent_axis.map_or(Axis::X, Axis::next);
        let partition = if indices.len() > self.capacity {
            [first, first.next(), first.next().next()]
                .into_iter()
                .find_map(|axis| self.partition(&mut indices, axis))
        } else {
            None
        };

        // Small enough, or no plane on any axis separates a single triangle.
        let Some(Partition {
            axis,
            split_value,
            own,
            left,
            right,
        }) = partition
        else {
            nodes.push(KdNode {
                axis: None,
                split_value: 0.0,
                left: None,
                right: None,
                bounds,
                indices,
            });
            return nodes.len() - 1;
        };

        // Reserve our slot before the children so handles stay pre-order.
        let idx = nodes.len();
        nodes.push(KdNode {
            axis: Some(axis),
            split_value,
            left: None,
            right: None,
            bounds,
            indices: own,
        });

        let a = axis.index();
        let left = (!left.is_empty()).then(|| {
            let child_bounds = bounds.split(split_value, a, Side::Less);
            self.build_node(nodes, left, child_bounds, Some(axis))
        });
        let right = (!right.is_empty()).then(|| {
            let child_bounds = bounds.split(split_value, a, Side::Greater);
            self.build_node(nodes, right, child_bounds, Some(axis))
        });

        nodes[idx].left = left;
        nodes[idx].right = right;
        idx
    }

    /// Split at the median centroid on `axis`.
    ///
    /// Returns `None` when every candidate straddles the plane, since the
    /// children would then hold the same set as this node.
    fn partition(&self, indices: &mut [usize], axis: Axis) -> Option<Partition> {
        let a = axis.index();
        indices.sort_unstable_by(|&i, &j| self.centroids[i][a].total_cmp(&self.centroids[j][a]));
        let split_value = self.centroids[indices[indices.len() / 2]][a];

        let mut own = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut separated = false;

        for &i in indices.iter() {
            let tri = &self.triangles[i];
            let below = half_space_triangle(tri, split_value, a, Side::Less);
            let above = half_space_triangle(tri, split_value, a, Side::Greater);

            match (below, above) {
                (true, false) => {
                    left.push(i);
                    separated = true;
                }
                (false, true) => {
                    right.push(i);
                    separated = true;
                }
                _ if own.len() < self.capacity => own.push(i),
                _ => {
                    left.push(i);
                    right.push(i);
                }
            }
        }

        separated.then_some(Partition {
            axis,
            split_value,
            own,
            left,
            right,
        })
    }
}

/// Pick the closer of two candidate hits. Equal distances go to the lower
/// triangle index.
pub(crate) fn nearer(
    a: Option<(usize, TriangleHit)>,
    b: Option<(usize, TriangleHit)>,
) -> Option<(usize, TriangleHit)> {
    match (a, b) {
        (Some(x), Some(y)) => {
            if y.1.t < x.1.t || (y.1.t == x.1.t && y.0 < x.0) {
                Some(y)
            } else {
                Some(x)
            }
        }
        (x, None) => x,
        (None, y) => y,
    }
}

/// Nearest hit among a subset of triangles.
pub(crate) fn nearest_among<I>(triangles: &[Triangle], indices: I, ray: &Ray) -> Option<(usize, TriangleHit)>
where
    I: IntoIterator<Item = usize>,
{
    indices.into_iter().fold(None, |best, i| {
        let candidate = ray_triangle(&triangles[i], ray).map(|hit| (i, hit));
        nearer(best, candidate)
    })
}
