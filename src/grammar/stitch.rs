//! Seam stitching: the productions that unify a shared boundary edge
//! between two independently refined element groups.

use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::{NodeId, NodeKind};

pub(super) fn require_vertices_at_one_level<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    inputs: &[NodeId],
) -> Result<u32, MeshGrammarError> {
    let mut levels = Vec::with_capacity(inputs.len());
    for &v in inputs {
        let node = mesh.node(v)?;
        if node.kind() != NodeKind::Vertex {
            return Err(MeshGrammarError::KindMismatch {
                id: v,
                expected: NodeKind::Vertex,
                found: node.kind(),
            });
        }
        levels.push(node.level());
    }
    let level = levels[0];
    if levels.iter().any(|&l| l != level) {
        return Err(MeshGrammarError::MixedInputLevels { found: levels });
    }
    Ok(level)
}

/// P7/P13: stitch an ordered seam edge.
///
/// Every vertex at the seam's level whose coordinates coincide with an
/// input is merged into that input, then the consecutive chain edges are
/// ensured. Inputs arrive in canonical order (sorted by x, tie-broken by
/// y), which fixes which survivor anchors each seam position.
pub(super) fn stitch_seam<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    inputs: &[NodeId],
) -> Result<(), MeshGrammarError> {
    let level = require_vertices_at_one_level(mesh, inputs)?;

    let mut merged = 0usize;
    for &survivor in inputs {
        let point = mesh.coords(survivor)?;
        let duplicates: Vec<NodeId> = mesh
            .colocated_vertices(level, point)
            .filter(|&v| v != survivor)
            .collect();
        for duplicate in duplicates {
            mesh.merge(survivor, duplicate)?;
            merged += 1;
        }
    }
    for pair in inputs.windows(2) {
        mesh.create_edge(pair[0], pair[1])?;
    }
    log::debug!(
        "stitched {}-vertex seam at level {level}, merged {merged} duplicates",
        inputs.len()
    );
    Ok(())
}
