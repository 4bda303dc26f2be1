//! Identity and classification types.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a scene node.
///
/// Wraps the host's UUID. Node names are mutable and not unique, so they are
/// never used as keys; a `NodeId` is turned into a name only when a report is
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh random identity.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// What a violation's index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum ElementKind {
    /// The node itself; no element index.
    Node,
    /// A mesh vertex.
    Vertex,
    /// A mesh edge.
    Edge,
    /// A mesh polygon.
    Polygon,
    /// A UV coordinate.
    Uv,
}

impl ElementKind {
    /// Lowercase name, as used in serialized reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Polygon => "polygon",
            Self::Uv => "uv",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scene node type, as far as the rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A transform (group or object parent).
    Transform,
    /// A polygon mesh shape.
    Mesh,
    /// Anything else (cameras, lights, curves).
    Other,
}
