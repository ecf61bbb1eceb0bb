//! Configuration D: refine configuration C's output along the domain
//! boundary, then run the fixed catalog of local refinements addressed by
//! literal target coordinates, finishing with the chain collapse at the
//! domain center.

use itertools::Itertools;

use crate::geometry::point2::Point2;
use crate::grammar::{apply, ProductionId};
use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeId;

use super::config_c::assemble_configuration_c;
use super::{
    exactly_one, sort_elements_by_min_corner, sort_vertices_by_x_then_y,
    sort_vertices_by_x_then_y_reversed,
};

/// The three seam offsets refined along each domain boundary side.
const BOUNDARY_OFFSETS: [f64; 3] = [-0.5, 0.0, 0.5];

/// Runs configuration D: configuration C, boundary refinement, the
/// literal-coordinate refinement catalog, and the final chain collapse at
/// (0, 0), (0, −0.25), (0, −0.5).
pub fn assemble_configuration_d<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
) -> Result<(), MeshGrammarError> {
    assemble_configuration_c(mesh)?;

    // Both selections are taken against the max level observed here,
    // before any of this step's subdivisions advance it.
    let entry_level = mesh.max_level();
    let mut outer = Vec::new();
    let mut inner = Vec::new();
    for element in mesh.elements_at_level(entry_level).collect::<Vec<_>>() {
        if element_touches_boundary(mesh, element)? {
            outer.push(element);
        }
    }
    for element in mesh
        .elements_at_level(entry_level.saturating_sub(1))
        .collect::<Vec<_>>()
    {
        if !element_touches_boundary(mesh, element)? {
            inner.push(element);
        }
    }
    sort_elements_by_min_corner(mesh, &mut outer)?;
    sort_elements_by_min_corner(mesh, &mut inner)?;
    for &element in &outer {
        apply(ProductionId::HalfSubdivide, mesh, Some(element), &[])?;
    }
    for &element in &inner {
        apply(ProductionId::QuadSubdivide, mesh, Some(element), &[])?;
    }

    let level = mesh.max_level();

    for (p1, p2) in boundary_edge_targets() {
        stitch_boundary_edge(mesh, level, p1, p2)?;
    }

    triangular_merge(mesh, level, Point2::new(-1.0, -0.5), Point2::new(0.0, -0.5), |p| {
        p.x() == 0.0
    })?;
    triangular_merge(mesh, level, Point2::new(-1.0, 0.5), Point2::new(0.0, 0.5), |p| {
        p.x() == 0.0
    })?;
    triangular_merge(mesh, level, Point2::new(0.5, -0.5), Point2::new(1.0, -0.5), |p| {
        p.x() == 0.5
    })?;

    for (a, c) in center_walks() {
        edge_transition_at(mesh, level, a, c)?;
    }

    resolve_seam_duplicate(mesh, level, Point2::new(0.25, -0.5))?;

    collapse_center_chain(mesh, level)
}

/// The final production: consumes the three collinear vertices at (0, 0),
/// (0, −0.25), (0, −0.5). Each literal point must resolve to exactly one
/// vertex at the working level.
fn collapse_center_chain<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    level: u32,
) -> Result<(), MeshGrammarError> {
    let mut chain = Vec::with_capacity(3);
    for point in [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, -0.25),
        Point2::new(0.0, -0.5),
    ] {
        chain.push(vertex_at(mesh, level, point)?);
    }
    // Canonical order for the collapse: by x, tie-broken by y descending.
    sort_vertices_by_x_then_y_reversed(mesh, &mut chain)?;
    apply(ProductionId::ChainCollapse, mesh, None, &chain)
}

fn element_touches_boundary<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    element: NodeId,
) -> Result<bool, MeshGrammarError> {
    for corner in mesh.element_corners(element)?.collect::<Vec<_>>() {
        if is_outer(mesh.coords(corner)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_outer(p: Point2) -> bool {
    p.x() == 1.0 || p.x() == -1.0 || p.y() == 1.0 || p.y() == -1.0
}

/// Twelve boundary seam edges: the three sub-edges of the south and north
/// sides, and the vertical sub-edges starting at the three fixed offsets
/// on the west and east sides.
fn boundary_edge_targets() -> Vec<(Point2, Point2)> {
    let mut targets = Vec::with_capacity(12);
    for y in [-1.0, 1.0] {
        for (x0, x1) in [-1.0, 0.0, 0.5, 1.0].into_iter().tuple_windows() {
            targets.push((Point2::new(x0, y), Point2::new(x1, y)));
        }
    }
    for x in [-1.0, 1.0] {
        for v in BOUNDARY_OFFSETS {
            targets.push((Point2::new(x, v), Point2::new(x, v + 0.25)));
        }
    }
    targets
}

/// The seven edge-transition walks around the coarse center block. The
/// last walk returns along the south side from the east anchor and leaves
/// the seam duplicate at (0.25, −0.5).
fn center_walks() -> [(Point2, Point2); 7] {
    [
        (Point2::new(-1.0, 0.5), Point2::new(0.0, 0.5)),
        (Point2::new(0.0, 0.5), Point2::new(0.5, 0.5)),
        (Point2::new(0.5, 0.5), Point2::new(1.0, 0.5)),
        (Point2::new(-1.0, -0.5), Point2::new(0.0, -0.5)),
        (Point2::new(0.0, -0.5), Point2::new(0.5, -0.5)),
        (Point2::new(0.5, -0.5), Point2::new(1.0, -0.5)),
        (Point2::new(0.5, -0.5), Point2::new(0.0, -0.5)),
    ]
}

/// All elements at `level` whose corner coordinates include both points.
fn elements_with_corner_points<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    level: u32,
    p1: Point2,
    p2: Point2,
) -> Result<Vec<NodeId>, MeshGrammarError> {
    let mut matches = Vec::new();
    for element in mesh.elements_at_level(level).collect::<Vec<_>>() {
        let mut has_p1 = false;
        let mut has_p2 = false;
        for corner in mesh.element_corners(element)?.collect::<Vec<_>>() {
            let p = mesh.coords(corner)?;
            has_p1 |= p == p1;
            has_p2 |= p == p2;
        }
        if has_p1 && has_p2 {
            matches.push(element);
        }
    }
    Ok(matches)
}

/// Edge-merge at a literal boundary edge: locates the unique element
/// having both endpoints among its corners and stitches them.
fn stitch_boundary_edge<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    level: u32,
    p1: Point2,
    p2: Point2,
) -> Result<(), MeshGrammarError> {
    let host = exactly_one(
        elements_with_corner_points(mesh, level, p1, p2)?,
        &format!("level-{level} element with corners {p1} and {p2}"),
    )?;
    let mut edge = Vec::with_capacity(2);
    for corner in mesh.element_corners(host)?.collect::<Vec<_>>() {
        let p = mesh.coords(corner)?;
        if p == p1 || p == p2 {
            edge.push(corner);
        }
    }
    sort_vertices_by_x_then_y(mesh, &mut edge)?;
    apply(ProductionId::EdgeStitch2, mesh, None, &edge)
}

/// Triangular merge: collects the corners of every element containing the
/// two anchor points, restricts them to the given line, and stitches the
/// resulting three-vertex chain.
fn triangular_merge<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    level: u32,
    p1: Point2,
    p2: Point2,
    on_line: impl Fn(Point2) -> bool,
) -> Result<(), MeshGrammarError> {
    let hosts = elements_with_corner_points(mesh, level, p1, p2)?;
    if hosts.is_empty() {
        return Err(MeshGrammarError::SelectionNotUnique {
            context: format!("level-{level} elements with corners {p1} and {p2}"),
            found: 0,
        });
    }
    let mut chain = Vec::new();
    for host in hosts {
        for corner in mesh.element_corners(host)?.collect::<Vec<_>>() {
            if on_line(mesh.coords(corner)?) && !chain.contains(&corner) {
                chain.push(corner);
            }
        }
    }
    sort_vertices_by_x_then_y(mesh, &mut chain)?;
    apply(ProductionId::EdgeStitch3, mesh, None, &chain)
}

/// Edge transition addressed by literal coordinates: the fine endpoints at
/// the working level and the colocated coarse anchor one level above.
fn edge_transition_at<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    level: u32,
    a_point: Point2,
    c_point: Point2,
) -> Result<(), MeshGrammarError> {
    let a = vertex_at(mesh, level, a_point)?;
    let c = vertex_at(mesh, level, c_point)?;
    let coarse = vertex_at(mesh, level - 1, a_point)?;
    apply(ProductionId::EdgeTransition, mesh, None, &[coarse, a, c])
}

/// Merges the exactly two colocated vertices left at a walked-over seam,
/// keeping the earlier one.
fn resolve_seam_duplicate<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    level: u32,
    point: Point2,
) -> Result<(), MeshGrammarError> {
    let duplicates: Vec<NodeId> = mesh.colocated_vertices(level, point).sorted().collect();
    let [keep, discard] = duplicates[..] else {
        return Err(MeshGrammarError::SelectionNotUnique {
            context: format!("duplicated seam vertex at {point} on level {level}"),
            found: duplicates.len(),
        });
    };
    mesh.merge(keep, discard)
}

fn vertex_at<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    level: u32,
    point: Point2,
) -> Result<NodeId, MeshGrammarError> {
    exactly_one(
        mesh.colocated_vertices(level, point),
        &format!("level-{level} vertex at {point}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn final_collapse_requires_all_three_literal_points() {
        let mut mesh = MeshGraph::new();
        let a = mesh.create_vertex(p(0.0, 0.0), 4, "v");
        let c = mesh.create_vertex(p(0.0, -0.5), 4, "v");
        mesh.create_edge(a, c).unwrap();
        // (0, -0.25) is absent at the working level.
        assert_eq!(
            collapse_center_chain(&mut mesh, 4),
            Err(MeshGrammarError::SelectionNotUnique {
                context: "level-4 vertex at (0, -0.25)".into(),
                found: 0
            })
        );

        let b = mesh.create_vertex(p(0.0, -0.25), 4, "v");
        mesh.create_edge(a, b).unwrap();
        mesh.create_edge(b, c).unwrap();
        collapse_center_chain(&mut mesh, 4).unwrap();
        assert!(!mesh.contains(b));
        assert!(mesh.has_edge(a, c));
    }

    #[test]
    fn boundary_classification_is_exact() {
        assert!(is_outer(p(1.0, 0.25)));
        assert!(is_outer(p(-0.5, -1.0)));
        assert!(!is_outer(p(0.5, -0.5)));
        assert!(!is_outer(p(1.0 - 1e-12, 0.0)));
    }

    #[test]
    fn seam_resolution_requires_exactly_two_duplicates() {
        let mut mesh = MeshGraph::new();
        mesh.create_vertex(p(0.25, -0.5), 4, "v");
        assert!(matches!(
            resolve_seam_duplicate(&mut mesh, 4, p(0.25, -0.5)),
            Err(MeshGrammarError::SelectionNotUnique { found: 1, .. })
        ));
        mesh.create_vertex(p(0.25, -0.5), 4, "v");
        resolve_seam_duplicate(&mut mesh, 4, p(0.25, -0.5)).unwrap();
        assert_eq!(mesh.colocated_vertices(4, p(0.25, -0.5)).count(), 1);
    }
}
