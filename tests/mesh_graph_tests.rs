use mesh_grammar::prelude::*;

fn p(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

/// Two colocated vertices wired to distinct neighborhoods, as left behind
/// by two independent local refinements of one seam.
fn seam_fixture() -> (MeshGraph, NodeId, NodeId, NodeId, NodeId) {
    let mut mesh = MeshGraph::new();
    let keep = mesh.create_vertex(p(0.0, 0.0), 2, "v");
    let discard = mesh.create_vertex(p(0.0, 0.0), 2, "v");
    let left = mesh.create_vertex(p(-0.5, 0.0), 2, "v");
    let right = mesh.create_vertex(p(0.5, 0.0), 2, "v");
    mesh.create_edge(keep, left).unwrap();
    mesh.create_edge(discard, right).unwrap();
    mesh.create_edge(discard, keep).unwrap();
    (mesh, keep, discard, left, right)
}

#[test]
fn merge_makes_discard_unreachable_and_redirects_edges() {
    let (mut mesh, keep, discard, left, right) = seam_fixture();
    mesh.merge(keep, discard).unwrap();

    assert!(!mesh.contains(discard));
    for survivor in [keep, left, right] {
        let reachable: Vec<NodeId> = mesh
            .traverse(survivor, TraversalOrder::DepthFirst)
            .unwrap()
            .collect();
        assert!(!reachable.contains(&discard));
    }
    assert!(mesh.has_edge(keep, right));
    assert!(mesh.has_edge(keep, left));
    assert!(!mesh.has_edge(keep, keep));
    assert_eq!(mesh.label(keep).unwrap(), "v");
    assert_eq!(mesh.coords(keep).unwrap(), p(0.0, 0.0));
}

#[test]
fn merge_rejects_self_and_unresolved_children() {
    let (mut mesh, keep, _, _, _) = seam_fixture();
    assert_eq!(mesh.merge(keep, keep), Err(MeshGrammarError::MergeSelf(keep)));

    let child = mesh.create_element(&[], 1, "I").unwrap();
    let parent = mesh.create_element(&[child], 0, "E").unwrap();
    let other = mesh.create_element(&[], 0, "F").unwrap();
    assert_eq!(
        mesh.merge(other, parent),
        Err(MeshGrammarError::MergeUnresolvedChildren(parent))
    );
}

#[test]
fn level_and_kind_index_stays_current() {
    let (mut mesh, keep, discard, _, _) = seam_fixture();
    assert_eq!(mesh.vertices_at_level(2).count(), 4);
    assert_eq!(mesh.elements_at_level(2).count(), 0);
    mesh.merge(keep, discard).unwrap();
    assert_eq!(mesh.vertices_at_level(2).count(), 3);
    assert_eq!(mesh.max_level(), 2);
}

#[test]
fn traversal_orders_cover_the_same_reachable_set() {
    let (mesh, keep, discard, left, right) = seam_fixture();
    let mut dfs: Vec<NodeId> = mesh
        .traverse(keep, TraversalOrder::DepthFirst)
        .unwrap()
        .collect();
    let mut bfs: Vec<NodeId> = mesh
        .traverse(keep, TraversalOrder::BreadthFirst)
        .unwrap()
        .collect();
    dfs.sort();
    bfs.sort();
    assert_eq!(dfs, bfs);
    assert_eq!(dfs, {
        let mut all = vec![keep, discard, left, right];
        all.sort();
        all
    });
}

#[test]
fn sibling_adjacency_is_symmetric() {
    let (mesh, keep, discard, left, right) = seam_fixture();
    for a in [keep, discard, left, right] {
        for b in mesh.vertex_siblings(a).unwrap().collect::<Vec<_>>() {
            assert!(mesh.vertex_siblings(b).unwrap().any(|s| s == a));
            assert!(mesh.is_directly_connected_with(a, b).unwrap());
        }
    }
}

#[test]
fn invariant_validation_accepts_the_fixture_after_merge() {
    let (mut mesh, keep, discard, _, _) = seam_fixture();
    // Before the merge two colocated vertices coexist at level 2.
    assert!(mesh.validate_invariants().is_err());
    mesh.merge(keep, discard).unwrap();
    assert!(mesh.validate_invariants().is_ok());
}
