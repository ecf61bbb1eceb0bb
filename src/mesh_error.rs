//! `MeshGrammarError`: unified error type for the mesh-grammar public APIs.
//!
//! Every variant is a precondition violation: it signals a defect in the
//! calling orchestration (wrong arity, a selection that was not unique, an
//! invalid merge target) and is never retried. Structural inconsistencies
//! discovered while stitching refinement seams are not errors — the
//! affected stitch is skipped and logged by the caller.

use thiserror::Error;

use crate::geometry::point2::Point2;
use crate::grammar::ProductionId;
use crate::topology::node::{NodeId, NodeKind};

/// Unified error type for mesh-grammar operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshGrammarError {
    /// Attempted to construct a `NodeId` from the reserved value 0.
    #[error("NodeId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidNodeId,
    /// A node id that is not (or no longer) part of the graph.
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),
    /// A node of the wrong kind was supplied where the other kind is required.
    #[error("node {id} is a {found:?}, expected a {expected:?}")]
    KindMismatch {
        id: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
    /// A production was invoked with the wrong number of input vertices.
    #[error("production {production} expects exactly {expected} input vertices, got {found}")]
    InputArityMismatch {
        production: ProductionId,
        expected: usize,
        found: usize,
    },
    /// A production that rewrites an element was invoked without one.
    #[error("production {production} requires an anchor element")]
    MissingAnchor { production: ProductionId },
    /// An anchor was supplied to a production that does not rewrite one.
    #[error("production {production} does not take an anchor element")]
    UnexpectedAnchor { production: ProductionId },
    /// An "exactly one" selection matched zero or several nodes.
    #[error("expected exactly one match for {context}, found {found}")]
    SelectionNotUnique { context: String, found: usize },
    /// `merge` was asked to collapse a node into itself.
    #[error("cannot merge node {0} into itself")]
    MergeSelf(NodeId),
    /// `merge` was asked to discard an element whose children still exist.
    #[error("cannot discard node {0}: its children are unresolved")]
    MergeUnresolvedChildren(NodeId),
    /// A subdividing production was applied to an element that already has
    /// children.
    #[error("element {0} is already subdivided")]
    AlreadySubdivided(NodeId),
    /// An element does not have the corner count its production requires.
    #[error("element {id} has {found} corner vertices, expected {expected}")]
    CornerCount {
        id: NodeId,
        expected: usize,
        found: usize,
    },
    /// Corner vertices do not form an axis-aligned rectangle.
    #[error("corner vertices of element {0} do not form an axis-aligned rectangle")]
    DegenerateCorners(NodeId),
    /// A child assigned to an element does not sit exactly one level below it.
    #[error("child {child} is at level {found}, expected level {expected}")]
    ChildLevelMismatch {
        child: NodeId,
        expected: u32,
        found: u32,
    },
    /// A child already has a parent and cannot be adopted again.
    #[error("node {0} already descends from another element")]
    ChildAlreadyOwned(NodeId),
    /// Two vertices that a production requires to coincide do not.
    #[error("vertices {a} and {b} are not colocated")]
    NotColocated { a: NodeId, b: NodeId },
    /// Input vertices that a production requires to be collinear are not.
    #[error("input vertices {a}, {b}, {c} are not collinear")]
    NotCollinear { a: NodeId, b: NodeId, c: NodeId },
    /// Input vertices must all sit at the same refinement level.
    #[error("input vertices span levels {found:?}, expected a single level")]
    MixedInputLevels { found: Vec<u32> },
    /// Two surviving vertices at one level share identical coordinates.
    #[error("vertices at level {level} share coordinates {point}")]
    DuplicateCoordinates { level: u32, point: Point2 },
    /// Sibling adjacency must be symmetric.
    #[error("sibling adjacency between {a} and {b} is not symmetric")]
    AsymmetricAdjacency { a: NodeId, b: NodeId },
    /// An element's child set does not list a node whose parent it is.
    #[error("element {parent} does not list {child} among its children")]
    MissingChildSlot { parent: NodeId, child: NodeId },
}
