//! Road graph representation and builder.
//!
//! # Data layout
//!
//! Roads are undirected, but the graph stores each road as two directed
//! half-edges in **Compressed Sparse Row (CSR)** format.  Given a `NodeId n`,
//! its outgoing half-edges occupy the index range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! of `edge_to` / `edge_weight`, so iterating a node's neighbours in the
//! router's inner loop is a contiguous scan.  A hash map from [`EdgeKey`] to
//! the base weight backs the symmetric `has_edge` / `edge_weight` lookups
//! used by agents and the congestion model.

use rustc_hash::{FxHashMap, FxHashSet};

use rb_core::{EdgeKey, NodeId, Point2};

use crate::{SpatialError, SpatialResult};

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Immutable undirected road graph.  Build with [`RoadGraphBuilder`].
#[derive(Debug, Clone)]
pub struct RoadGraph {
    /// Map position of each node.  Indexed by `NodeId`.
    node_pos: Vec<Point2>,

    /// CSR row pointer.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    /// Destination of each half-edge, sorted by source node.
    edge_to: Vec<NodeId>,

    /// Base weight of each half-edge.
    edge_weight: Vec<f64>,

    /// Symmetric weight lookup, one entry per road.
    weights: FxHashMap<EdgeKey, f64>,
}

impl RoadGraph {
    /// A graph with no nodes or roads.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of undirected roads.
    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    /// Position of `node`, or `None` if it is not in the graph.
    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Option<Point2> {
        self.node_pos.get(node.index()).copied()
    }

    /// `true` if a road joins `a` and `b` (in either direction).
    #[inline]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.weights.contains_key(&EdgeKey::new(a, b))
    }

    /// Base weight of `edge`, or `None` if there is no such road.
    #[inline]
    pub fn edge_weight(&self, edge: EdgeKey) -> Option<f64> {
        self.weights.get(&edge).copied()
    }

    /// Iterator over `(neighbor, base_weight)` for every road touching `node`.
    ///
    /// Empty for nodes outside the graph.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let (start, end) = if self.contains(node) {
            (
                self.node_out_start[node.index()] as usize,
                self.node_out_start[node.index() + 1] as usize,
            )
        } else {
            (0, 0)
        };
        (start..end).map(move |i| (self.edge_to[i], self.edge_weight[i]))
    }

    /// Number of roads touching `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).count()
    }

    /// Every road once, as `(key, base_weight)`, in key order.
    pub fn edges(&self) -> Vec<(EdgeKey, f64)> {
        let mut all: Vec<(EdgeKey, f64)> = self.weights.iter().map(|(&k, &w)| (k, w)).collect();
        all.sort_unstable_by_key(|&(k, _)| k);
        all
    }

    /// `Ok` if `node` is in the graph.
    pub fn check_node(&self, node: NodeId) -> SpatialResult<()> {
        if self.contains(node) { Ok(()) } else { Err(SpatialError::NodeNotFound(node)) }
    }

    /// `Ok` if `edge` is a road of the graph.
    pub fn check_edge(&self, edge: EdgeKey) -> SpatialResult<()> {
        if self.weights.contains_key(&edge) {
            Ok(())
        } else {
            Err(SpatialError::EdgeNotFound(edge))
        }
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use rb_core::Point2;
/// use rb_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(Point2::new(0.0, 0.0));
/// let c = b.add_node(Point2::new(3.0, 4.0));
/// let road = b.add_road(a, c).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.edge_weight(road), Some(5.0));
/// ```
pub struct RoadGraphBuilder {
    nodes: Vec<Point2>,
    roads: Vec<(EdgeKey, f64)>,
    seen:  FxHashSet<EdgeKey>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), roads: Vec::new(), seen: FxHashSet::default() }
    }

    pub fn with_capacity(nodes: usize, roads: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            roads: Vec::with_capacity(roads),
            seen:  FxHashSet::default(),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point2) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an undirected road weighted by the straight-line distance between
    /// its endpoints.
    pub fn add_road(&mut self, a: NodeId, b: NodeId) -> SpatialResult<EdgeKey> {
        let pa = self.node_pos(a)?;
        let pb = self.node_pos(b)?;
        self.add_road_weighted(a, b, pa.distance(pb))
    }

    /// Add an undirected road with an explicit non-negative weight.
    pub fn add_road_weighted(&mut self, a: NodeId, b: NodeId, weight: f64) -> SpatialResult<EdgeKey> {
        self.node_pos(a)?;
        self.node_pos(b)?;
        if a == b {
            return Err(SpatialError::SelfLoop(a));
        }
        let key = EdgeKey::new(a, b);
        if !(weight >= 0.0) || !weight.is_finite() {
            return Err(SpatialError::InvalidWeight { edge: key, weight });
        }
        if !self.seen.insert(key) {
            return Err(SpatialError::DuplicateEdge(key));
        }
        self.roads.push((key, weight));
        Ok(key)
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> SpatialResult<Point2> {
        self.nodes.get(id.index()).copied().ok_or(SpatialError::NodeNotFound(id))
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.roads.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();

        // Two half-edges per road, sorted by source for CSR construction.
        let mut half: Vec<(NodeId, NodeId, f64)> = Vec::with_capacity(self.roads.len() * 2);
        for &(key, w) in &self.roads {
            half.push((key.a(), key.b(), w));
            half.push((key.b(), key.a(), w));
        }
        half.sort_unstable_by_key(|&(from, to, _)| (from, to));

        let edge_to:     Vec<NodeId> = half.iter().map(|&(_, to, _)| to).collect();
        let edge_weight: Vec<f64>    = half.iter().map(|&(_, _, w)| w).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &half {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, half.len());

        RoadGraph {
            node_pos: self.nodes,
            node_out_start,
            edge_to,
            edge_weight,
            weights: self.roads.into_iter().collect(),
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
