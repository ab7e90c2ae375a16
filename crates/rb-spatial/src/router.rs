//! Routing trait and the constrained Dijkstra implementation.
//!
//! # Pluggability
//!
//! Agents route through the [`Router`] trait, so applications can swap in
//! A* or a behavioural model without touching the agent state machine.
//!
//! # Exclusions
//!
//! A [`RouteQuery`] may exclude edges three ways.  Relaxation skips an edge
//! if, in order:
//!
//! 1. it is in the caller's private known-obstructed set,
//! 2. it is the single edge the caller wants to avoid,
//! 3. it is publicly reported and system-aware routing was requested.
//!
//! # Misses
//!
//! The router never errors.  An unreachable destination yields the singleton
//! path `[start]`; callers detect this with [`Route::is_miss`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;

use rb_core::{EdgeKey, NodeId};

use crate::{CongestionModel, RoadGraph};

/// Set of undirected edges (known obstructions, public reports, ...).
pub type EdgeSet = FxHashSet<EdgeKey>;

// ── RouteQuery ────────────────────────────────────────────────────────────────

/// One routing request.
#[derive(Copy, Clone, Debug)]
pub struct RouteQuery<'a> {
    pub start: NodeId,
    pub end: NodeId,
    /// Edges the caller privately knows to be obstructed.
    pub exclude_known: Option<&'a EdgeSet>,
    /// One specific edge to avoid (the just-found roadblock, or the hop the
    /// caller is deviating from).
    pub exclude_edge: Option<EdgeKey>,
    /// Publicly reported edges; `Some` requests system-aware routing.
    pub avoid_public: Option<&'a EdgeSet>,
}

impl<'a> RouteQuery<'a> {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end, exclude_known: None, exclude_edge: None, avoid_public: None }
    }

    pub fn excluding_known(mut self, known: &'a EdgeSet) -> Self {
        self.exclude_known = Some(known);
        self
    }

    pub fn excluding_edge(mut self, edge: EdgeKey) -> Self {
        self.exclude_edge = Some(edge);
        self
    }

    pub fn avoiding_public(mut self, public: &'a EdgeSet) -> Self {
        self.avoid_public = Some(public);
        self
    }

    /// `true` if relaxation must skip `edge`.
    #[inline]
    pub fn excludes(&self, edge: EdgeKey) -> bool {
        if self.exclude_known.is_some_and(|k| k.contains(&edge)) {
            return true;
        }
        if self.exclude_edge == Some(edge) {
            return true;
        }
        self.avoid_public.is_some_and(|p| p.contains(&edge))
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// Ordered node path from `start` to `end` and its congested cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub cost: f64,
}

impl Route {
    /// The "no route" result for a query starting at `start`.
    pub fn miss(start: NodeId) -> Self {
        Self { nodes: vec![start], cost: 0.0 }
    }

    /// `true` if this is the singleton returned for an unreachable `end`.
    pub fn is_miss(&self, start: NodeId, end: NodeId) -> bool {
        self.nodes.len() == 1 && start != end
    }

    /// `true` if the route has no hops.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// The edges of the route in travel order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.nodes.windows(2).map(|w| EdgeKey::new(w[0], w[1]))
    }

    /// `true` if every consecutive pair is a road of `graph`.
    pub fn validate_against(&self, graph: &RoadGraph) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().all(|&n| graph.contains(n))
            && self.edges().all(|e| graph.edge_weight(e).is_some())
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so a single router can be shared by
/// every agent.
pub trait Router: Send + Sync {
    /// Compute a least-cost route for `query` under the current congestion.
    fn route(&self, graph: &RoadGraph, congestion: &CongestionModel, query: &RouteQuery<'_>) -> Route;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra over the CSR graph with cost `weight × cost_multiplier`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, congestion: &CongestionModel, query: &RouteQuery<'_>) -> Route {
        dijkstra(graph, congestion, query)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap entry.  `f64` is not `Ord`, so order by `total_cmp`, then node id
/// for deterministic tie-breaking.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.total_cmp(&other.cost).then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(graph: &RoadGraph, congestion: &CongestionModel, query: &RouteQuery<'_>) -> Route {
    let (start, end) = (query.start, query.end);
    if start == end || !graph.contains(start) || !graph.contains(end) {
        return Route::miss(start);
    }

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![NodeId::INVALID; n];
    let mut done = vec![false; n];

    dist[start.index()] = 0.0;

    let mut heap: BinaryHeap<Reverse<Frontier>> = BinaryHeap::new();
    heap.push(Reverse(Frontier { cost: 0.0, node: start }));

    while let Some(Reverse(Frontier { cost, node })) = heap.pop() {
        // First pop of a node is authoritative; later ones are stale.
        if done[node.index()] {
            continue;
        }
        done[node.index()] = true;

        if node == end {
            return reconstruct(&prev, start, end, cost);
        }

        for (neighbor, weight) in graph.neighbors(node) {
            if done[neighbor.index()] {
                continue;
            }
            let edge = EdgeKey::new(node, neighbor);
            if query.excludes(edge) {
                continue;
            }
            let new_cost = cost + weight * congestion.cost_multiplier(edge);
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = node;
                heap.push(Reverse(Frontier { cost: new_cost, node: neighbor }));
            }
        }
    }

    Route::miss(start)
}

fn reconstruct(prev: &[NodeId], start: NodeId, end: NodeId, cost: f64) -> Route {
    let mut nodes = vec![end];
    let mut cur = end;
    while cur != start {
        cur = prev[cur.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes, cost }
}
