//! Subdividing productions: the rewrites that create nodes one level
//! below their anchor element.

use crate::geometry::point2::Point2;
use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeId;

/// Axis-aligned bounds recovered from an element's four corner vertices.
struct Rect {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

fn corner_rect<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    anchor: NodeId,
) -> Result<Rect, MeshGrammarError> {
    let corners: Vec<NodeId> = mesh.element_corners(anchor)?.collect();
    if corners.len() != 4 {
        return Err(MeshGrammarError::CornerCount {
            id: anchor,
            expected: 4,
            found: corners.len(),
        });
    }
    let points: Vec<Point2> = corners
        .iter()
        .map(|&c| mesh.coords(c))
        .collect::<Result<_, _>>()?;
    let mut xs: Vec<f64> = points.iter().map(|p| p.x()).collect();
    let mut ys: Vec<f64> = points.iter().map(|p| p.y()).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    ys.sort_by(f64::total_cmp);
    ys.dedup();
    let (&[x0, x1], &[y0, y1]) = (&xs[..], &ys[..]) else {
        return Err(MeshGrammarError::DegenerateCorners(anchor));
    };
    for &x in &[x0, x1] {
        for &y in &[y0, y1] {
            if !points.contains(&Point2::new(x, y)) {
                return Err(MeshGrammarError::DegenerateCorners(anchor));
            }
        }
    }
    Ok(Rect { x0, x1, y0, y1 })
}

fn require_unbroken<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    anchor: NodeId,
) -> Result<u32, MeshGrammarError> {
    if !mesh.children_of(anchor)?.is_empty() {
        return Err(MeshGrammarError::AlreadySubdivided(anchor));
    }
    mesh.level(anchor)
}

fn mark_broken<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    anchor: NodeId,
) -> Result<(), MeshGrammarError> {
    let lowered = mesh.label(anchor)?.to_lowercase();
    mesh.set_label(anchor, &lowered)
}

/// P1: bootstrap. Rewrites the entry element into the initial working
/// square: one child interior plus four corner vertices at (±1, ±1), one
/// level below the anchor.
pub(super) fn initial_square<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    anchor: NodeId,
) -> Result<(), MeshGrammarError> {
    let level = require_unbroken(mesh, anchor)?;
    let child_level = level + 1;

    let interior = mesh.create_element(&[], child_level, "I")?;
    let corners: Vec<NodeId> = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)]
        .into_iter()
        .map(|(x, y)| mesh.create_vertex(Point2::new(x, y), child_level, "v"))
        .collect();
    let [sw, nw, se, ne] = corners[..] else {
        unreachable!("four corners created above")
    };
    for (a, b) in [(sw, se), (nw, ne), (sw, nw), (se, ne)] {
        mesh.create_edge(a, b)?;
    }
    for &corner in &corners {
        mesh.create_edge(interior, corner)?;
    }

    let mut children = vec![interior];
    children.extend(corners);
    mesh.assign_children(anchor, &children)?;
    mark_broken(mesh, anchor)
}

/// P2: quad subdivision. Breaks a rectangular element into four child
/// quadrants over a fresh 3×3 vertex grid one level down.
///
/// The grid vertices are always created fresh; duplicates this introduces
/// at refinement seams are consumed later by the stitch productions.
pub(super) fn quad_subdivide<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    anchor: NodeId,
) -> Result<(), MeshGrammarError> {
    let level = require_unbroken(mesh, anchor)?;
    let rect = corner_rect(mesh, anchor)?;
    let child_level = level + 1;

    let xs = [rect.x0, (rect.x0 + rect.x1) / 2.0, rect.x1];
    let ys = [rect.y0, (rect.y0 + rect.y1) / 2.0, rect.y1];
    let mut grid = [[None::<NodeId>; 3]; 3];
    for (i, &x) in xs.iter().enumerate() {
        for (j, &y) in ys.iter().enumerate() {
            grid[i][j] = Some(mesh.create_vertex(Point2::new(x, y), child_level, "v"));
        }
    }
    let grid = grid.map(|col| col.map(|v| v.expect("fully populated")));

    lattice_edges(mesh, &grid_slices(&grid))?;

    let mut children = Vec::with_capacity(13);
    for i in 0..2 {
        for j in 0..2 {
            let quad = mesh.create_element(&[], child_level, "I")?;
            for corner in [
                grid[i][j],
                grid[i + 1][j],
                grid[i][j + 1],
                grid[i + 1][j + 1],
            ] {
                mesh.create_edge(quad, corner)?;
            }
            children.push(quad);
        }
    }
    children.extend(grid.iter().flatten().copied());
    mesh.assign_children(anchor, &children)?;
    mark_broken(mesh, anchor)
}

/// P10: half subdivision. Breaks a rectangular element into two stacked
/// halves over a 2×3 vertex grid one level down.
///
/// Unlike [`quad_subdivide`], a grid position occupied by an existing
/// vertex with identical coordinates at the target level reuses the
/// earliest-created such vertex instead of duplicating it.
pub(super) fn half_subdivide<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    anchor: NodeId,
) -> Result<(), MeshGrammarError> {
    let level = require_unbroken(mesh, anchor)?;
    let rect = corner_rect(mesh, anchor)?;
    let child_level = level + 1;

    let xs = [rect.x0, rect.x1];
    let ys = [rect.y0, (rect.y0 + rect.y1) / 2.0, rect.y1];
    let mut fresh = Vec::new();
    let mut grid = [[None::<NodeId>; 3]; 2];
    for (i, &x) in xs.iter().enumerate() {
        for (j, &y) in ys.iter().enumerate() {
            let point = Point2::new(x, y);
            let reused = mesh.colocated_vertices(child_level, point).min();
            let vertex = reused.unwrap_or_else(|| {
                let v = mesh.create_vertex(point, child_level, "v");
                fresh.push(v);
                v
            });
            grid[i][j] = Some(vertex);
        }
    }
    let grid = grid.map(|col| col.map(|v| v.expect("fully populated")));

    lattice_edges(mesh, &grid_slices(&grid))?;

    let mut children = Vec::with_capacity(8);
    for j in 0..2 {
        let half = mesh.create_element(&[], child_level, "I")?;
        for corner in [grid[0][j], grid[1][j], grid[0][j + 1], grid[1][j + 1]] {
            mesh.create_edge(half, corner)?;
        }
        children.push(half);
    }
    children.extend(fresh);
    mesh.assign_children(anchor, &children)?;
    mark_broken(mesh, anchor)
}

fn grid_slices<const W: usize>(grid: &[[NodeId; 3]; W]) -> Vec<&[NodeId]> {
    grid.iter().map(|col| col.as_slice()).collect()
}

/// Inserts the horizontal and vertical lattice edges of a column-major
/// vertex grid; insertion is idempotent, so shared edges stay single.
fn lattice_edges<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    columns: &[&[NodeId]],
) -> Result<(), MeshGrammarError> {
    for i in 0..columns.len() {
        for j in 0..columns[i].len() {
            if i + 1 < columns.len() {
                mesh.create_edge(columns[i][j], columns[i + 1][j])?;
            }
            if j + 1 < columns[i].len() {
                mesh.create_edge(columns[i][j], columns[i][j + 1])?;
            }
        }
    }
    Ok(())
}
