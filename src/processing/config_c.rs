//! Configuration C: bootstrap the entry element, then break the working
//! level twice, stitching matching seams between adjacent element groups.

use itertools::Itertools;

use crate::grammar::{apply, ProductionId};
use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeId;

use super::{
    exactly_one, sort_elements_by_min_corner, sort_vertices_by_x_then_y,
    sort_vertices_by_x_then_y_reversed,
};

/// Runs configuration C on a graph containing exactly one element labeled
/// `"E"`, leaving max level 3 with a duplicate-free finest vertex layer.
pub fn assemble_configuration_c<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
) -> Result<(), MeshGrammarError> {
    let entry = find_entry_element(mesh)?;
    apply(ProductionId::InitialSquare, mesh, Some(entry), &[])?;
    break_lowest_level(mesh)?;
    break_lowest_level(mesh)?;
    Ok(())
}

fn find_entry_element<B: GraphBackend>(
    mesh: &MeshGraph<B>,
) -> Result<NodeId, MeshGrammarError> {
    let mut candidates = Vec::new();
    for level in 0..=mesh.max_level() {
        for element in mesh.elements_at_level(level) {
            if mesh.label(element)? == "E" {
                candidates.push(element);
            }
        }
    }
    exactly_one(candidates, "entry element labeled \"E\"")
}

/// Breaks the current working level: the rightmost element column is quad
/// subdivided, every other element half subdivided, and adjacent result
/// groups are stitched where their facing edges match.
pub(crate) fn break_lowest_level<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
) -> Result<(), MeshGrammarError> {
    let level = mesh.max_level();
    let vertices: Vec<NodeId> = mesh.vertices_at_level(level).collect();
    let mut coords = Vec::with_capacity(vertices.len());
    for &v in &vertices {
        coords.push(mesh.coords(v)?);
    }
    let max_x = coords
        .iter()
        .map(|p| p.x())
        .max_by(f64::total_cmp)
        .ok_or_else(|| MeshGrammarError::SelectionNotUnique {
            context: format!("vertices at working level {level}"),
            found: 0,
        })?;

    let mut column: Vec<NodeId> = Vec::new();
    for (&v, p) in vertices.iter().zip(&coords) {
        if p.x() == max_x {
            for element in mesh.adjacent_elements(v)?.collect::<Vec<_>>() {
                if !column.contains(&element) {
                    column.push(element);
                }
            }
        }
    }
    sort_elements_by_min_corner(mesh, &mut column)?;
    let mut others: Vec<NodeId> = mesh
        .elements_at_level(level)
        .filter(|e| !column.contains(e))
        .collect();
    sort_elements_by_min_corner(mesh, &mut others)?;

    for &element in &column {
        apply(ProductionId::QuadSubdivide, mesh, Some(element), &[])?;
    }
    for &element in &others {
        apply(ProductionId::HalfSubdivide, mesh, Some(element), &[])?;
    }

    let mut parents: Vec<NodeId> = column.into_iter().chain(others).collect();
    sort_elements_by_min_corner(mesh, &mut parents)?;
    for (lower, upper) in parents.into_iter().tuple_windows() {
        stitch_adjacent_groups(mesh, lower, upper)?;
    }
    Ok(())
}

/// Union of the corner vertices of a subdivided parent's child elements.
fn group_vertices<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    parent: NodeId,
) -> Result<Vec<NodeId>, MeshGrammarError> {
    let children: Vec<NodeId> = mesh.children_of(parent)?.to_vec();
    let mut group = Vec::new();
    for child in children {
        if mesh.kind(child)? != crate::topology::node::NodeKind::Element {
            continue;
        }
        for corner in mesh.element_corners(child)?.collect::<Vec<_>>() {
            if !group.contains(&corner) {
                group.push(corner);
            }
        }
    }
    Ok(group)
}

/// Stitches the shared boundary of two adjacent groups iff the lower
/// group's top edge and the upper group's bottom edge match in cardinality
/// and pairwise coordinates; a mismatch skips the stitch.
fn stitch_adjacent_groups<B: GraphBackend>(
    mesh: &mut MeshGraph<B>,
    lower: NodeId,
    upper: NodeId,
) -> Result<(), MeshGrammarError> {
    let lower_group = group_vertices(mesh, lower)?;
    let upper_group = group_vertices(mesh, upper)?;

    let mut top = extreme_y_vertices(mesh, &lower_group, Extreme::Max)?;
    sort_vertices_by_x_then_y(mesh, &mut top)?;
    let mut bottom = extreme_y_vertices(mesh, &upper_group, Extreme::Min)?;
    sort_vertices_by_x_then_y_reversed(mesh, &mut bottom)?;

    let mut matching = top.len() == bottom.len();
    if matching {
        for (&t, &b) in top.iter().zip(&bottom) {
            if mesh.coords(t)? != mesh.coords(b)? {
                matching = false;
                break;
            }
        }
    }
    if !matching {
        log::warn!(
            "skipping boundary stitch between groups of {lower} and {upper}: \
             candidate edges do not match ({} vs {} vertices)",
            top.len(),
            bottom.len()
        );
        return Ok(());
    }
    match top.len() {
        2 => apply(ProductionId::EdgeStitch2, mesh, None, &top),
        3 => apply(ProductionId::EdgeStitch3, mesh, None, &top),
        width => {
            log::warn!(
                "skipping boundary stitch between groups of {lower} and {upper}: \
                 no stitch production for seam width {width}"
            );
            Ok(())
        }
    }
}

enum Extreme {
    Min,
    Max,
}

fn extreme_y_vertices<B: GraphBackend>(
    mesh: &MeshGraph<B>,
    group: &[NodeId],
    extreme: Extreme,
) -> Result<Vec<NodeId>, MeshGrammarError> {
    let mut ys = Vec::with_capacity(group.len());
    for &v in group {
        ys.push(mesh.coords(v)?.y());
    }
    let Some(target) = ys
        .iter()
        .copied()
        .reduce(|a, b| match extreme {
            Extreme::Min => a.min(b),
            Extreme::Max => a.max(b),
        })
    else {
        return Ok(Vec::new());
    };
    Ok(group
        .iter()
        .zip(ys)
        .filter(|&(_, y)| y == target)
        .map(|(&v, _)| v)
        .collect())
}
