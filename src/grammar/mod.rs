//! The production engine: the fixed catalog of graph-rewrite rules.
//!
//! Each production is a deterministic rewrite keyed by a small integer id,
//! operating on the mesh graph one level below the level it is addressed
//! at. Given identical graph state and identical ordered inputs, the
//! result is always isomorphic; the *order* of the inputs is part of the
//! contract (it encodes the canonical geometric ordering produced by the
//! named comparators) and is the caller's responsibility.
//!
//! Arity and anchor requirements are checked before any mutation; a
//! violation is a caller defect, surfaced as an error and never retried.

mod stitch;
mod subdivide;
mod transition;

use std::fmt;

use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeId;

/// The fixed production catalog.
///
/// The numbering keeps the ids of the historical catalog this grammar was
/// authored with; ids absent here have no counterpart in the shipped
/// assembly configurations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProductionId {
    /// P1: bootstrap the entry element into the initial square.
    InitialSquare,
    /// P2: subdivide a rectangular element into four quadrants.
    QuadSubdivide,
    /// P7: stitch a three-vertex seam edge, merging colocated duplicates.
    EdgeStitch3,
    /// P9: collapse a three-vertex collinear chain.
    ChainCollapse,
    /// P10: subdivide a rectangular element into two stacked halves.
    HalfSubdivide,
    /// P12: split a coarse edge with a fresh intermediate vertex.
    EdgeTransition,
    /// P13: stitch a two-vertex seam edge, merging colocated duplicates.
    EdgeStitch2,
}

impl ProductionId {
    /// The catalog's integer id.
    pub const fn code(self) -> u8 {
        match self {
            ProductionId::InitialSquare => 1,
            ProductionId::QuadSubdivide => 2,
            ProductionId::EdgeStitch3 => 7,
            ProductionId::ChainCollapse => 9,
            ProductionId::HalfSubdivide => 10,
            ProductionId::EdgeTransition => 12,
            ProductionId::EdgeStitch2 => 13,
        }
    }

    /// Looks a production up by its integer id.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ProductionId::InitialSquare),
            2 => Some(ProductionId::QuadSubdivide),
            7 => Some(ProductionId::EdgeStitch3),
            9 => Some(ProductionId::ChainCollapse),
            10 => Some(ProductionId::HalfSubdivide),
            12 => Some(ProductionId::EdgeTransition),
            13 => Some(ProductionId::EdgeStitch2),
            _ => None,
        }
    }

    /// Exact number of ordered input vertices the production consumes.
    pub const fn arity(self) -> usize {
        match self {
            ProductionId::InitialSquare
            | ProductionId::QuadSubdivide
            | ProductionId::HalfSubdivide => 0,
            ProductionId::EdgeStitch2 => 2,
            ProductionId::EdgeStitch3
            | ProductionId::ChainCollapse
            | ProductionId::EdgeTransition => 3,
        }
    }

    /// Whether the production rewrites an anchor element.
    pub const fn takes_anchor(self) -> bool {
        matches!(
            self,
            ProductionId::InitialSquare
                | ProductionId::QuadSubdivide
                | ProductionId::HalfSubdivide
        )
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.code())
    }
}

/// Applies one production to the mesh graph.
///
/// `anchor` names the element a subdividing production rewrites; `inputs`
/// are the ordered vertices a seam production consumes. Anchor presence
/// and exact arity are validated first.
pub fn apply<B: GraphBackend>(
    production: ProductionId,
    mesh: &mut MeshGraph<B>,
    anchor: Option<NodeId>,
    inputs: &[NodeId],
) -> Result<(), MeshGrammarError> {
    if inputs.len() != production.arity() {
        return Err(MeshGrammarError::InputArityMismatch {
            production,
            expected: production.arity(),
            found: inputs.len(),
        });
    }
    let anchor = match (production.takes_anchor(), anchor) {
        (true, Some(anchor)) => Some(anchor),
        (true, None) => return Err(MeshGrammarError::MissingAnchor { production }),
        (false, Some(_)) => return Err(MeshGrammarError::UnexpectedAnchor { production }),
        (false, None) => None,
    };
    log::debug!("applying {production} (anchor: {anchor:?}, inputs: {inputs:?})");
    match production {
        ProductionId::InitialSquare => {
            subdivide::initial_square(mesh, anchor.expect("checked above"))
        }
        ProductionId::QuadSubdivide => {
            subdivide::quad_subdivide(mesh, anchor.expect("checked above"))
        }
        ProductionId::HalfSubdivide => {
            subdivide::half_subdivide(mesh, anchor.expect("checked above"))
        }
        ProductionId::EdgeStitch2 | ProductionId::EdgeStitch3 => {
            stitch::stitch_seam(mesh, inputs)
        }
        ProductionId::EdgeTransition => transition::edge_transition(mesh, inputs),
        ProductionId::ChainCollapse => transition::chain_collapse(mesh, inputs),
    }
}
