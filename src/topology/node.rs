//! `NodeId`: a strong, zero-cost handle for mesh graph nodes, plus the
//! node kinds and arena payloads shared by vertices and elements.
//!
//! Every node in the mesh hierarchy is addressed by a unique, opaque
//! identifier. `NodeId` wraps a nonzero `u64` so that 0 stays reserved as
//! an invalid/sentinel value, and is `repr(transparent)` for layout
//! guarantees. Identity and equality are id-based only, which lets nodes
//! populate the sets and maps the engine and processors use to
//! deduplicate touched elements.

use std::{fmt, num::NonZeroU64};

use crate::geometry::point2::Point2;
use crate::mesh_error::MeshGrammarError;

/// A strong handle for a node of the mesh graph.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct NodeId(NonZeroU64);

impl NodeId {
    /// Creates a `NodeId` from a raw `u64`, rejecting the reserved value 0.
    #[inline]
    pub fn new(raw: u64) -> Result<Self, MeshGrammarError> {
        NonZeroU64::new(raw)
            .map(NodeId)
            .ok_or(MeshGrammarError::InvalidNodeId)
    }

    /// Returns the raw integer value of this id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.get()).finish()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// The two node kinds of the mesh hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// A regular mesh point carrying 2D coordinates.
    Vertex,
    /// An interior subdivision unit owning children one level below.
    Element,
}

/// Kind-specific payload of an arena node.
#[derive(Clone, Debug)]
pub enum NodePayload {
    Vertex { coords: Point2 },
    Element { children: Vec<NodeId> },
}

/// One entry of the mesh graph's node arena.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub(crate) id: NodeId,
    pub(crate) level: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) payload: NodePayload,
}

impl MeshNode {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self.payload {
            NodePayload::Vertex { .. } => NodeKind::Vertex,
            NodePayload::Element { .. } => NodeKind::Element,
        }
    }

    /// Coordinates, for vertex nodes.
    #[inline]
    pub fn coords(&self) -> Option<Point2> {
        match self.payload {
            NodePayload::Vertex { coords } => Some(coords),
            NodePayload::Element { .. } => None,
        }
    }

    /// Child ids, for element nodes.
    #[inline]
    pub fn children(&self) -> Option<&[NodeId]> {
        match &self.payload {
            NodePayload::Vertex { .. } => None,
            NodePayload::Element { children } => Some(children),
        }
    }
}
