//! Strongly typed identifiers and the undirected edge key.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into `Vec`s via `id.0 as usize`, but callers should prefer
//! the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an agent in the simulation's agent list.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a graph node.
    pub struct NodeId(u32);
}

// ── EdgeKey ───────────────────────────────────────────────────────────────────

/// An undirected edge, normalised so that `a <= b`.
///
/// `EdgeKey::new(x, y) == EdgeKey::new(y, x)` for every pair, so roadblock,
/// congestion, and knowledge lookups are symmetric without any extra work at
/// the call site.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(NodeId, NodeId)", into = "(NodeId, NodeId)"))]
pub struct EdgeKey {
    a: NodeId,
    b: NodeId,
}

impl EdgeKey {
    #[inline]
    pub fn new(x: NodeId, y: NodeId) -> Self {
        if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }

    /// The smaller endpoint.
    #[inline]
    pub fn a(self) -> NodeId {
        self.a
    }

    /// The larger endpoint.
    #[inline]
    pub fn b(self) -> NodeId {
        self.b
    }

    /// `true` if `node` is one of the two endpoints.
    #[inline]
    pub fn touches(self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint that is not `node`, or `None` if `node` is not on this edge.
    pub fn other(self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

impl From<(NodeId, NodeId)> for EdgeKey {
    fn from((x, y): (NodeId, NodeId)) -> Self {
        EdgeKey::new(x, y)
    }
}

impl From<EdgeKey> for (NodeId, NodeId) {
    fn from(e: EdgeKey) -> Self {
        (e.a, e.b)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.a, self.b)
    }
}
