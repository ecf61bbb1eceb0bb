use proptest::prelude::*;

use mesh_grammar::prelude::*;

fn vertex_row(mesh: &mut MeshGraph, count: usize) -> Vec<NodeId> {
    (0..count)
        .map(|i| mesh.create_vertex(Point2::new(i as f64, 0.0), 1, "v"))
        .collect()
}

proptest! {
    /// a is a sibling of b iff b is a sibling of a, for any edge set.
    #[test]
    fn sibling_adjacency_is_symmetric(
        edges in proptest::collection::vec((0..8usize, 0..8usize), 0..24)
    ) {
        let mut mesh = MeshGraph::new();
        let ids = vertex_row(&mut mesh, 8);
        for (a, b) in edges {
            mesh.create_edge(ids[a], ids[b]).unwrap();
        }
        for &v in &ids {
            for s in mesh.vertex_siblings(v).unwrap().collect::<Vec<_>>() {
                prop_assert!(mesh.vertex_siblings(s).unwrap().any(|t| t == v));
            }
        }
        mesh.validate_invariants().unwrap();
    }

    /// After merge(keep, discard): discard is unreachable, every edge that
    /// referenced discard references keep, and keep is untouched.
    #[test]
    fn merge_redirects_every_edge(
        keep_mask in 0u8..=255,
        discard_mask in 0u8..=255,
    ) {
        let mut mesh = MeshGraph::new();
        let neighbors = vertex_row(&mut mesh, 8);
        let keep = mesh.create_vertex(Point2::new(-1.0, 1.0), 1, "keep");
        let discard = mesh.create_vertex(Point2::new(-1.0, 1.0), 1, "discard");
        for (i, &n) in neighbors.iter().enumerate() {
            if keep_mask & (1u8 << i) != 0 {
                mesh.create_edge(keep, n).unwrap();
            }
            if discard_mask & (1u8 << i) != 0 {
                mesh.create_edge(discard, n).unwrap();
            }
        }
        mesh.merge(keep, discard).unwrap();

        prop_assert!(!mesh.contains(discard));
        for (i, &n) in neighbors.iter().enumerate() {
            let expected = (keep_mask | discard_mask) & (1u8 << i) != 0;
            prop_assert_eq!(mesh.has_edge(keep, n), expected);
            prop_assert!(!mesh.has_edge(n, discard));
        }
        prop_assert_eq!(mesh.label(keep).unwrap(), "keep");
        prop_assert_eq!(mesh.coords(keep).unwrap(), Point2::new(-1.0, 1.0));
        prop_assert!(!mesh.has_edge(keep, keep));
    }

    /// Unordered seam inputs of width 2 or 3 always stitch to a single
    /// survivor per coordinate.
    #[test]
    fn stitch_always_leaves_one_survivor_per_coordinate(
        width in 2usize..=3,
        copies in 1usize..=3,
    ) {
        let mut mesh = MeshGraph::new();
        let inputs: Vec<NodeId> = (0..width)
            .map(|i| mesh.create_vertex(Point2::new(i as f64 * 0.5, 0.0), 2, "v"))
            .collect();
        for _ in 1..copies {
            for i in 0..width {
                mesh.create_vertex(Point2::new(i as f64 * 0.5, 0.0), 2, "v");
            }
        }
        let production = if width == 2 {
            ProductionId::EdgeStitch2
        } else {
            ProductionId::EdgeStitch3
        };
        apply(production, &mut mesh, None, &inputs).unwrap();
        for i in 0..width {
            let at = Point2::new(i as f64 * 0.5, 0.0);
            prop_assert_eq!(mesh.colocated_vertices(2, at).count(), 1);
            prop_assert_eq!(mesh.colocated_vertices(2, at).next(), Some(inputs[i]));
        }
    }
}
