//! Mesh assembly processors: the fixed orchestration programs that select
//! candidate nodes by geometric predicates and drive the production
//! engine in a prescribed order.
//!
//! Each processor is a pure transform over one exclusively-owned mesh
//! graph, mutating it in place. Selections that the orchestration relies
//! on to match exactly one node go through [`exactly_one`]; a zero or
//! multiple match is a caller/graph defect surfaced immediately, never a
//! best-effort fallback.

pub mod config_c;
pub mod config_d;

pub use config_c::assemble_configuration_c;
pub use config_d::assemble_configuration_d;

use crate::geometry::ordering::{by_x, by_y, by_y_reversed};
use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeId;

/// Resolves a selection that must match exactly one node.
pub(crate) fn exactly_one(
    candidates: impl IntoIterator<Item = NodeId>,
    context: &str,
) -> Result<NodeId, MeshGrammarError> {
    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(MeshGrammarError::SelectionNotUnique {
            context: context.to_string(),
            found: 0,
        }),
        (Some(_), Some(_)) => Err(MeshGrammarError::SelectionNotUnique {
            context: context.to_string(),
            found: 2 + iter.count(),
        }),
    }
}

/// Sort key for elements and element groups: minimum corner x, then
/// minimum corner y.
pub(crate) fn min_corner_key<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    element: NodeId,
) -> Result<(f64, f64), MeshGrammarError> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for corner in mesh.element_corners(element)?.collect::<Vec<_>>() {
        let p = mesh.coords(corner)?;
        min_x = min_x.min(p.x());
        min_y = min_y.min(p.y());
    }
    Ok((min_x, min_y))
}

pub(crate) fn sort_elements_by_min_corner<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    elements: &mut Vec<NodeId>,
) -> Result<(), MeshGrammarError> {
    let mut keyed = Vec::with_capacity(elements.len());
    for &e in elements.iter() {
        keyed.push((min_corner_key(mesh, e)?, e));
    }
    keyed.sort_by(|((ax, ay), a), ((bx, by), b)| {
        ax.total_cmp(bx)
            .then(ay.total_cmp(by))
            .then(a.cmp(b))
    });
    *elements = keyed.into_iter().map(|(_, e)| e).collect();
    Ok(())
}

/// Sorts vertices into the canonical input order: by x, tie-broken by y.
pub(crate) fn sort_vertices_by_x_then_y<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    vertices: &mut Vec<NodeId>,
) -> Result<(), MeshGrammarError> {
    sort_vertices(mesh, vertices, |a, b| by_x(a, b).then(by_y(a, b)))
}

/// Sorts vertices by x, tie-broken by y descending — the order the lower
/// side of a seam is matched against.
pub(crate) fn sort_vertices_by_x_then_y_reversed<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    vertices: &mut Vec<NodeId>,
) -> Result<(), MeshGrammarError> {
    sort_vertices(mesh, vertices, |a, b| by_x(a, b).then(by_y_reversed(a, b)))
}

fn sort_vertices<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    vertices: &mut Vec<NodeId>,
    cmp: impl Fn(&crate::geometry::point2::Point2, &crate::geometry::point2::Point2) -> std::cmp::Ordering,
) -> Result<(), MeshGrammarError> {
    let mut keyed = Vec::with_capacity(vertices.len());
    for &v in vertices.iter() {
        keyed.push((mesh.coords(v)?, v));
    }
    keyed.sort_by(|(pa, a), (pb, b)| cmp(pa, pb).then(a.cmp(b)));
    *vertices = keyed.into_iter().map(|(_, v)| v).collect();
    Ok(())
}
