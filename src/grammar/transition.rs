//! Level-transition productions: splitting a coarse edge with an
//! intermediate vertex, and collapsing a fine chain back into one edge.

use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeId;

use super::stitch::require_vertices_at_one_level;

/// P12: edge transition.
///
/// Inputs are `[coarse, a, c]`: `coarse` sits one level above `a` at the
/// same coordinates and anchors the walk; `a` and `c` span the fine edge
/// being refined. The a–c edge (if present) is removed, a fresh midpoint
/// vertex is created at the fine level, and the chain a–mid–c is wired
/// up. The midpoint is always created blind; a transition walked from
/// both ends of a seam therefore leaves a colocated duplicate behind, to
/// be resolved by an explicit vertex merge.
pub(super) fn edge_transition<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    inputs: &[NodeId],
) -> Result<(), MeshGrammarError> {
    let [coarse, a, c] = inputs[..] else {
        unreachable!("arity checked by the dispatcher")
    };
    let fine_level = require_vertices_at_one_level(mesh, &[a, c])?;
    let coarse_level = require_vertices_at_one_level(mesh, &[coarse])?;
    if coarse_level + 1 != fine_level {
        return Err(MeshGrammarError::MixedInputLevels {
            found: vec![coarse_level, fine_level, fine_level],
        });
    }
    if mesh.coords(coarse)? != mesh.coords(a)? {
        return Err(MeshGrammarError::NotColocated { a: coarse, b: a });
    }

    let split = mesh.remove_edge(a, c)?;
    let midpoint = mesh.coords(a)?.midpoint(mesh.coords(c)?);
    let mid = mesh.create_vertex(midpoint, fine_level, "v");
    mesh.create_edge(a, mid)?;
    mesh.create_edge(mid, c)?;
    log::debug!(
        "edge transition at level {fine_level}: inserted {midpoint}{}",
        if split { " (split existing edge)" } else { "" }
    );
    Ok(())
}

/// P9: chain collapse.
///
/// Inputs are an ordered collinear chain `[a, b, c]` at one level; the
/// middle vertex is consumed (merged into `a`) and the direct a–c edge is
/// ensured, coarsening the chain back into a single edge.
pub(super) fn chain_collapse<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    inputs: &[NodeId],
) -> Result<(), MeshGrammarError> {
    let [a, b, c] = inputs[..] else {
        unreachable!("arity checked by the dispatcher")
    };
    require_vertices_at_one_level(mesh, inputs)?;
    let (pa, pb, pc) = (mesh.coords(a)?, mesh.coords(b)?, mesh.coords(c)?);
    if !pa.collinear_with(pb, pc) {
        return Err(MeshGrammarError::NotCollinear { a, b, c });
    }
    mesh.merge(a, b)?;
    mesh.create_edge(a, c)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::geometry::point2::Point2;
    use crate::grammar::{apply, ProductionId};
    use crate::mesh_error::MeshGrammarError;
    use crate::topology::graph::MeshGraph;
    use crate::topology::node::NodeId;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn transition_site() -> (MeshGraph, NodeId, NodeId, NodeId) {
        let mut mesh = MeshGraph::new();
        let coarse = mesh.create_vertex(p(0.0, -0.5), 3, "v");
        let a = mesh.create_vertex(p(0.0, -0.5), 4, "v");
        let c = mesh.create_vertex(p(0.5, -0.5), 4, "v");
        mesh.create_edge(a, c).unwrap();
        (mesh, coarse, a, c)
    }

    #[test]
    fn transition_splits_the_fine_edge() {
        let (mut mesh, coarse, a, c) = transition_site();
        apply(ProductionId::EdgeTransition, &mut mesh, None, &[coarse, a, c]).unwrap();
        assert!(!mesh.has_edge(a, c));
        let mid = mesh.colocated_vertices(4, p(0.25, -0.5)).next().unwrap();
        assert!(mesh.has_edge(a, mid));
        assert!(mesh.has_edge(mid, c));
    }

    #[test]
    fn transition_is_blind_and_duplicates_when_rewalked() {
        let (mut mesh, coarse, a, c) = transition_site();
        apply(ProductionId::EdgeTransition, &mut mesh, None, &[coarse, a, c]).unwrap();
        let coarse_c = mesh.create_vertex(p(0.5, -0.5), 3, "v");
        apply(ProductionId::EdgeTransition, &mut mesh, None, &[coarse_c, c, a]).unwrap();
        assert_eq!(mesh.colocated_vertices(4, p(0.25, -0.5)).count(), 2);
    }

    #[test]
    fn transition_requires_a_colocated_coarse_anchor() {
        let (mut mesh, _, a, c) = transition_site();
        let wrong = mesh.create_vertex(p(1.0, 1.0), 3, "v");
        assert_eq!(
            apply(ProductionId::EdgeTransition, &mut mesh, None, &[wrong, a, c]),
            Err(MeshGrammarError::NotColocated { a: wrong, b: a })
        );
    }

    #[test]
    fn transition_requires_adjacent_levels() {
        let (mut mesh, _, a, c) = transition_site();
        let too_coarse = mesh.create_vertex(p(0.0, -0.5), 1, "v");
        assert!(matches!(
            apply(
                ProductionId::EdgeTransition,
                &mut mesh,
                None,
                &[too_coarse, a, c]
            ),
            Err(MeshGrammarError::MixedInputLevels { .. })
        ));
    }

    #[test]
    fn collapse_consumes_the_middle_vertex() {
        let mut mesh = MeshGraph::new();
        let a = mesh.create_vertex(p(0.0, 0.0), 4, "v");
        let b = mesh.create_vertex(p(0.0, -0.25), 4, "v");
        let c = mesh.create_vertex(p(0.0, -0.5), 4, "v");
        mesh.create_edge(a, b).unwrap();
        mesh.create_edge(b, c).unwrap();
        apply(ProductionId::ChainCollapse, &mut mesh, None, &[a, b, c]).unwrap();
        assert!(!mesh.contains(b));
        assert!(mesh.has_edge(a, c));
        assert_eq!(mesh.coords(a).unwrap(), p(0.0, 0.0));
    }

    #[test]
    fn collapse_rejects_non_collinear_chains() {
        let mut mesh = MeshGraph::new();
        let a = mesh.create_vertex(p(0.0, 0.0), 4, "v");
        let b = mesh.create_vertex(p(0.25, -0.25), 4, "v");
        let c = mesh.create_vertex(p(0.0, -0.5), 4, "v");
        assert_eq!(
            apply(ProductionId::ChainCollapse, &mut mesh, None, &[a, b, c]),
            Err(MeshGrammarError::NotCollinear { a, b, c })
        );
    }
}
