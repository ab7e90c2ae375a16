//! What a single agent privately knows.

use std::collections::VecDeque;

use rb_core::{EdgeKey, NodeId};
use rb_spatial::EdgeSet;

/// Private knowledge: roadblocks the agent has hit, edges it knows it
/// reported falsely, and the path it intends to take.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnowledgeView {
    /// Edges the agent found blocked.  Excluded from its own route searches.
    pub known: EdgeSet,
    /// Clear edges the agent reported anyway.  Never excluded privately.
    pub false_reports: EdgeSet,
    /// Intended path; the front is always the current node.
    pub path: VecDeque<NodeId>,
}

impl KnowledgeView {
    pub fn new(path: impl IntoIterator<Item = NodeId>) -> Self {
        Self { path: path.into_iter().collect(), ..Self::default() }
    }

    #[inline]
    pub fn knows_blocked(&self, edge: EdgeKey) -> bool {
        self.known.contains(&edge)
    }

    #[inline]
    pub fn reported_falsely(&self, edge: EdgeKey) -> bool {
        self.false_reports.contains(&edge)
    }

    /// The node after the current one, if any.
    #[inline]
    pub fn next_waypoint(&self) -> Option<NodeId> {
        self.path.get(1).copied()
    }

    /// `true` if the remaining path crosses `edge` in either direction.
    pub fn path_uses(&self, edge: EdgeKey) -> bool {
        self.path
            .iter()
            .zip(self.path.iter().skip(1))
            .any(|(&a, &b)| EdgeKey::new(a, b) == edge)
    }

    pub fn path_vec(&self) -> Vec<NodeId> {
        self.path.iter().copied().collect()
    }

    pub fn set_path(&mut self, nodes: Vec<NodeId>) {
        self.path = nodes.into();
    }
}
