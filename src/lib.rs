//! # mesh-grammar
//!
//! mesh-grammar generates reference 2D finite-element-style meshes by
//! repeatedly rewriting a multi-level attributed graph with a fixed
//! catalog of graph-rewrite productions. It provides the mesh hierarchy
//! data model (vertices and interior elements with parent/child/sibling
//! relations across refinement levels), the production engine that
//! rewrites it while preserving topological and geometric invariants, and
//! the two fixed assembly configurations ("C" and "D") consumed by the
//! downstream numerical pipeline.
//!
//! ## Features
//! - Arena-based mesh graph with strong `NodeId` handles and eager
//!   level/kind indexing
//! - A narrow, swappable attributed-graph backend (in-memory
//!   implementation included)
//! - Deterministic productions with strict arity/anchor contracts
//! - Named geometric comparators so input ordering stays auditable
//! - Structural invariant validation for debugging and tests
//!
//! ## Determinism
//!
//! Every production is a pure rewrite of the mesh graph: identical graph
//! state and identical ordered inputs always produce an isomorphic
//! result. The whole pipeline is single-threaded and sequential by
//! design; the mesh graph is exclusively owned by one assembly run.
//!
//! ## Coordinates
//!
//! Coordinates are compared by exact value — the grammar is authored
//! against literal coordinates and depends on it. Do not introduce an
//! epsilon.

pub mod debug_invariants;
pub mod geometry;
pub mod grammar;
pub mod mesh_error;
pub mod processing;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use mesh_error::MeshGrammarError;

/// A convenient prelude for the most-used types and entry points.
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::ordering::{by_x, by_y, by_y_reversed};
    pub use crate::geometry::point2::Point2;
    pub use crate::grammar::{apply, ProductionId};
    pub use crate::mesh_error::MeshGrammarError;
    pub use crate::processing::{assemble_configuration_c, assemble_configuration_d};
    pub use crate::topology::backend::{GraphBackend, InMemoryBackend, TraversalOrder};
    pub use crate::topology::graph::MeshGraph;
    pub use crate::topology::node::{NodeId, NodeKind};
}
