//! `MeshGraph`: the multi-level mesh hierarchy that productions rewrite.
//!
//! The graph owns every node across all refinement levels in a single
//! arena indexed by [`NodeId`], with an eager per-level index for the
//! level/kind queries the processors drive their selections with. The
//! attributed-graph backend stores labels and the undirected adjacency
//! (vertex–vertex sibling edges and element–corner incidence); the
//! vertical parent/child relation lives in the arena, established once by
//! the subdividing production and never mutated afterwards.
//!
//! Nodes are append-only except for [`MeshGraph::merge`], the single
//! destructive operation: it logically removes one id and redirects its
//! edges and child slots to a surviving id.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::geometry::point2::Point2;
use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::{GraphBackend, InMemoryBackend, TraversalOrder};
use crate::topology::node::{MeshNode, NodeId, NodeKind, NodePayload};

#[derive(Clone, Debug, Default)]
struct LevelIndex {
    vertices: Vec<NodeId>,
    elements: Vec<NodeId>,
}

impl LevelIndex {
    fn slot(&self, kind: NodeKind) -> &Vec<NodeId> {
        match kind {
            NodeKind::Vertex => &self.vertices,
            NodeKind::Element => &self.elements,
        }
    }

    fn slot_mut(&mut self, kind: NodeKind) -> &mut Vec<NodeId> {
        match kind {
            NodeKind::Vertex => &mut self.vertices,
            NodeKind::Element => &mut self.elements,
        }
    }
}

/// The mesh hierarchy, exclusively owned by one assembly run.
#[derive(Clone, Debug, Default)]
pub struct MeshGraph<B: GraphBackend = InMemoryBackend> {
    backend: B,
    nodes: HashMap<NodeId, MeshNode>,
    levels: BTreeMap<u32, LevelIndex>,
}

impl MeshGraph<InMemoryBackend> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: GraphBackend> MeshGraph<B> {
    pub fn with_backend(backend: B) -> Self {
        MeshGraph {
            backend,
            nodes: HashMap::new(),
            levels: BTreeMap::new(),
        }
    }

    /// Read access to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- node creation -------------------------------------------------

    /// Creates a regular vertex carrying `coords` at `level`.
    pub fn create_vertex(&mut self, coords: Point2, level: u32, label: &str) -> NodeId {
        let id = self.backend.create_node(NodeKind::Vertex, label);
        self.nodes.insert(
            id,
            MeshNode {
                id,
                level,
                parent: None,
                payload: NodePayload::Vertex { coords },
            },
        );
        self.levels.entry(level).or_default().vertices.push(id);
        id
    }

    /// Creates an interior element at `level` owning `children`.
    ///
    /// Every child must already exist, sit exactly one level below, and
    /// not descend from another element yet.
    pub fn create_element(
        &mut self,
        children: &[NodeId],
        level: u32,
        label: &str,
    ) -> Result<NodeId, MeshGrammarError> {
        self.check_adoptable(children, level)?;
        let id = self.backend.create_node(NodeKind::Element, label);
        self.nodes.insert(
            id,
            MeshNode {
                id,
                level,
                parent: None,
                payload: NodePayload::Element {
                    children: children.to_vec(),
                },
            },
        );
        self.levels.entry(level).or_default().elements.push(id);
        for &child in children {
            self.nodes.get_mut(&child).expect("validated above").parent = Some(id);
        }
        Ok(id)
    }

    /// Hands `children` to a previously childless `element`.
    ///
    /// The child set of an element is established exactly once, by the
    /// production that subdivides it.
    pub fn assign_children(
        &mut self,
        element: NodeId,
        children: &[NodeId],
    ) -> Result<(), MeshGrammarError> {
        let node = self.require_kind(element, NodeKind::Element)?;
        let level = node.level;
        if node.children().is_some_and(|c| !c.is_empty()) {
            return Err(MeshGrammarError::AlreadySubdivided(element));
        }
        self.check_adoptable(children, level)?;
        if let NodePayload::Element { children: slot } = &mut self
            .nodes
            .get_mut(&element)
            .expect("validated above")
            .payload
        {
            *slot = children.to_vec();
        }
        for &child in children {
            self.nodes.get_mut(&child).expect("validated above").parent = Some(element);
        }
        Ok(())
    }

    fn check_adoptable(&self, children: &[NodeId], level: u32) -> Result<(), MeshGrammarError> {
        for &child in children {
            let node = self.node(child)?;
            if node.level != level + 1 {
                return Err(MeshGrammarError::ChildLevelMismatch {
                    child,
                    expected: level + 1,
                    found: node.level,
                });
            }
            if node.parent.is_some() {
                return Err(MeshGrammarError::ChildAlreadyOwned(child));
            }
        }
        Ok(())
    }

    // --- accessors -----------------------------------------------------

    pub fn node(&self, id: NodeId) -> Result<&MeshNode, MeshGrammarError> {
        self.nodes.get(&id).ok_or(MeshGrammarError::UnknownNode(id))
    }

    fn require_kind(
        &self,
        id: NodeId,
        expected: NodeKind,
    ) -> Result<&MeshNode, MeshGrammarError> {
        let node = self.node(id)?;
        if node.kind() != expected {
            return Err(MeshGrammarError::KindMismatch {
                id,
                expected,
                found: node.kind(),
            });
        }
        Ok(node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind, MeshGrammarError> {
        Ok(self.node(id)?.kind())
    }

    pub fn level(&self, id: NodeId) -> Result<u32, MeshGrammarError> {
        Ok(self.node(id)?.level)
    }

    /// Coordinates of a vertex node.
    pub fn coords(&self, id: NodeId) -> Result<Point2, MeshGrammarError> {
        Ok(self
            .require_kind(id, NodeKind::Vertex)?
            .coords()
            .expect("vertex payload"))
    }

    pub fn label(&self, id: NodeId) -> Result<&str, MeshGrammarError> {
        self.node(id)?;
        Ok(self.backend.get_label(id).expect("arena and backend agree"))
    }

    pub fn set_label(&mut self, id: NodeId, label: &str) -> Result<(), MeshGrammarError> {
        self.node(id)?;
        self.backend.set_label(id, label);
        Ok(())
    }

    pub fn children_of(&self, id: NodeId) -> Result<&[NodeId], MeshGrammarError> {
        Ok(self
            .require_kind(id, NodeKind::Element)?
            .children()
            .expect("element payload"))
    }

    pub fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>, MeshGrammarError> {
        Ok(self.node(id)?.parent)
    }

    // --- level and adjacency queries -----------------------------------

    /// Greatest level for which any node exists.
    pub fn max_level(&self) -> u32 {
        self.levels
            .iter()
            .rev()
            .find(|(_, idx)| !idx.vertices.is_empty() || !idx.elements.is_empty())
            .map(|(&level, _)| level)
            .unwrap_or(0)
    }

    /// Nodes of one kind at one level, in creation order.
    ///
    /// The order is an implementation detail; callers sort explicitly
    /// with the named comparators when order matters.
    pub fn nodes_at_level(
        &self,
        level: u32,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.levels
            .get(&level)
            .map(|idx| idx.slot(kind).as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    pub fn vertices_at_level(&self, level: u32) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_at_level(level, NodeKind::Vertex)
    }

    pub fn elements_at_level(&self, level: u32) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_at_level(level, NodeKind::Element)
    }

    /// Surviving vertices at `level` whose coordinates equal `point`
    /// exactly, in creation order.
    pub fn colocated_vertices(
        &self,
        level: u32,
        point: Point2,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.vertices_at_level(level)
            .filter(move |&v| self.node(v).is_ok_and(|n| n.coords() == Some(point)))
    }

    /// Same-kind, same-level neighbors of a vertex.
    pub fn vertex_siblings(
        &self,
        id: NodeId,
    ) -> Result<impl Iterator<Item = NodeId> + '_, MeshGrammarError> {
        let level = self.require_kind(id, NodeKind::Vertex)?.level;
        Ok(self.neighbors_filtered(id, NodeKind::Vertex, level))
    }

    /// Corner vertices of an element: its same-level regular neighbors.
    pub fn element_corners(
        &self,
        id: NodeId,
    ) -> Result<impl Iterator<Item = NodeId> + '_, MeshGrammarError> {
        let level = self.require_kind(id, NodeKind::Element)?.level;
        Ok(self.neighbors_filtered(id, NodeKind::Vertex, level))
    }

    /// Elements incident to a vertex at the vertex's own level.
    pub fn adjacent_elements(
        &self,
        id: NodeId,
    ) -> Result<impl Iterator<Item = NodeId> + '_, MeshGrammarError> {
        let level = self.require_kind(id, NodeKind::Vertex)?.level;
        Ok(self.neighbors_filtered(id, NodeKind::Element, level))
    }

    fn neighbors_filtered(
        &self,
        id: NodeId,
        kind: NodeKind,
        level: u32,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.backend.neighbors(id).filter(move |&n| {
            self.nodes
                .get(&n)
                .is_some_and(|node| node.kind() == kind && node.level == level)
        })
    }

    /// Adjacency is polymorphic over node kind: two vertices are directly
    /// connected when a backend edge joins them at the same level; two
    /// elements when they share a boundary vertex; a vertex and an
    /// element when the vertex is one of the element's corners.
    pub fn is_directly_connected_with(
        &self,
        a: NodeId,
        b: NodeId,
    ) -> Result<bool, MeshGrammarError> {
        let node_a = self.node(a)?;
        let node_b = self.node(b)?;
        match (node_a.kind(), node_b.kind()) {
            (NodeKind::Vertex, NodeKind::Vertex) => {
                Ok(node_a.level == node_b.level && self.has_edge(a, b))
            }
            (NodeKind::Element, NodeKind::Element) => {
                let corners: HashSet<NodeId> = self.element_corners(a)?.collect();
                Ok(self.element_corners(b)?.any(|c| corners.contains(&c)))
            }
            _ => Ok(self.has_edge(a, b)),
        }
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.backend.neighbors(a).any(|n| n == b)
    }

    pub fn create_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), MeshGrammarError> {
        self.node(a)?;
        self.node(b)?;
        self.backend.create_edge(a, b);
        Ok(())
    }

    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool, MeshGrammarError> {
        self.node(a)?;
        self.node(b)?;
        Ok(self.backend.remove_edge(a, b))
    }

    /// All ids reachable from `root` in the requested order; a read-only
    /// snapshot view delegated to the backend.
    pub fn traverse(
        &self,
        root: NodeId,
        order: TraversalOrder,
    ) -> Result<impl Iterator<Item = NodeId> + '_, MeshGrammarError> {
        self.node(root)?;
        Ok(match order {
            TraversalOrder::DepthFirst => self.backend.depth_first_order(root),
            TraversalOrder::BreadthFirst => self.backend.breadth_first_order(root),
        })
    }

    // --- merge ---------------------------------------------------------

    /// Redirects every edge and child slot referencing `discard` to
    /// `keep`, then removes `discard` from the graph.
    ///
    /// `keep`'s label, level and coordinates are unchanged. Fails when
    /// `keep == discard` or when `discard` still owns children.
    pub fn merge(&mut self, keep: NodeId, discard: NodeId) -> Result<(), MeshGrammarError> {
        if keep == discard {
            return Err(MeshGrammarError::MergeSelf(keep));
        }
        self.node(keep)?;
        let node = self.node(discard)?;
        if node.children().is_some_and(|c| !c.is_empty()) {
            return Err(MeshGrammarError::MergeUnresolvedChildren(discard));
        }
        let level = node.level;
        let kind = node.kind();
        let parent = node.parent;

        let neighbors: Vec<NodeId> = self.backend.neighbors(discard).collect();
        for n in neighbors {
            self.backend.remove_edge(discard, n);
            if n != keep {
                self.backend.create_edge(keep, n);
            }
        }

        if let Some(p) = parent {
            if let Some(NodePayload::Element { children }) =
                self.nodes.get_mut(&p).map(|n| &mut n.payload)
            {
                for slot in children.iter_mut() {
                    if *slot == discard {
                        *slot = keep;
                    }
                }
                let mut seen = HashSet::new();
                children.retain(|&c| seen.insert(c));
            }
        }

        self.backend.remove_node(discard);
        self.nodes.remove(&discard);
        if let Some(idx) = self.levels.get_mut(&level) {
            idx.slot_mut(kind).retain(|&n| n != discard);
        }
        log::debug!("merged node {discard} into {keep}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn max_level_tracks_creation_and_merge() {
        let mut g = MeshGraph::new();
        assert_eq!(g.max_level(), 0);
        g.create_element(&[], 0, "E").unwrap();
        let v = g.create_vertex(p(0.0, 0.0), 2, "v");
        assert_eq!(g.max_level(), 2);
        let keep = g.create_vertex(p(0.0, 0.0), 1, "v");
        g.merge(keep, v).unwrap();
        assert_eq!(g.max_level(), 1);
    }

    #[test]
    fn child_level_is_validated() {
        let mut g = MeshGraph::new();
        let v = g.create_vertex(p(0.0, 0.0), 2, "v");
        let err = g.create_element(&[v], 0, "E").unwrap_err();
        assert_eq!(
            err,
            MeshGrammarError::ChildLevelMismatch {
                child: v,
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn children_are_assigned_once() {
        let mut g = MeshGraph::new();
        let e = g.create_element(&[], 0, "E").unwrap();
        let c = g.create_element(&[], 1, "I").unwrap();
        g.assign_children(e, &[c]).unwrap();
        let c2 = g.create_element(&[], 1, "I").unwrap();
        assert_eq!(
            g.assign_children(e, &[c2]),
            Err(MeshGrammarError::AlreadySubdivided(e))
        );
    }

    #[test]
    fn a_child_has_exactly_one_parent() {
        let mut g = MeshGraph::new();
        let c = g.create_element(&[], 1, "I").unwrap();
        g.create_element(&[c], 0, "E").unwrap();
        let err = g.create_element(&[c], 0, "E2").unwrap_err();
        assert_eq!(err, MeshGrammarError::ChildAlreadyOwned(c));
    }

    #[test]
    fn merge_redirects_edges_and_preserves_keep() {
        let mut g = MeshGraph::new();
        let keep = g.create_vertex(p(0.0, 0.0), 1, "k");
        let discard = g.create_vertex(p(0.0, 0.0), 1, "d");
        let other = g.create_vertex(p(1.0, 0.0), 1, "o");
        g.create_edge(discard, other).unwrap();
        g.create_edge(discard, keep).unwrap();
        g.merge(keep, discard).unwrap();
        assert!(!g.contains(discard));
        assert!(g.has_edge(keep, other));
        assert!(!g.has_edge(keep, keep));
        assert_eq!(g.label(keep).unwrap(), "k");
        assert_eq!(g.coords(keep).unwrap(), p(0.0, 0.0));
        assert_eq!(g.vertices_at_level(1).count(), 2);
    }

    #[test]
    fn merge_rewrites_parent_child_slot() {
        let mut g = MeshGraph::new();
        let keep = g.create_vertex(p(0.0, 0.0), 1, "k");
        let discard = g.create_vertex(p(0.0, 0.0), 1, "d");
        let parent = g.create_element(&[discard], 0, "E").unwrap();
        g.merge(keep, discard).unwrap();
        assert_eq!(g.children_of(parent).unwrap(), &[keep]);
    }

    #[test]
    fn merge_preconditions() {
        let mut g = MeshGraph::new();
        let v = g.create_vertex(p(0.0, 0.0), 1, "v");
        assert_eq!(g.merge(v, v), Err(MeshGrammarError::MergeSelf(v)));
        let child = g.create_vertex(p(0.0, 0.0), 1, "c");
        let e = g.create_element(&[child], 0, "E").unwrap();
        let e2 = g.create_element(&[], 0, "F").unwrap();
        assert_eq!(
            g.merge(e2, e),
            Err(MeshGrammarError::MergeUnresolvedChildren(e))
        );
    }

    #[test]
    fn sibling_queries_filter_kind_and_level() {
        let mut g = MeshGraph::new();
        let a = g.create_vertex(p(0.0, 0.0), 1, "a");
        let b = g.create_vertex(p(1.0, 0.0), 1, "b");
        let deeper = g.create_vertex(p(0.5, 0.0), 2, "c");
        let e = g.create_element(&[], 1, "I").unwrap();
        g.create_edge(a, b).unwrap();
        g.create_edge(a, deeper).unwrap();
        g.create_edge(a, e).unwrap();
        let sibs: Vec<_> = g.vertex_siblings(a).unwrap().collect();
        assert_eq!(sibs, vec![b]);
        let elems: Vec<_> = g.adjacent_elements(a).unwrap().collect();
        assert_eq!(elems, vec![e]);
        let corners: Vec<_> = g.element_corners(e).unwrap().collect();
        assert_eq!(corners, vec![a]);
    }

    #[test]
    fn element_adjacency_means_shared_corner() {
        let mut g = MeshGraph::new();
        let shared = g.create_vertex(p(0.0, 0.0), 1, "v");
        let left = g.create_element(&[], 1, "I").unwrap();
        let right = g.create_element(&[], 1, "I").unwrap();
        let lonely = g.create_element(&[], 1, "I").unwrap();
        g.create_edge(left, shared).unwrap();
        g.create_edge(right, shared).unwrap();
        assert!(g.is_directly_connected_with(left, right).unwrap());
        assert!(!g.is_directly_connected_with(left, lonely).unwrap());
    }

    #[test]
    fn colocated_vertices_match_exactly() {
        let mut g = MeshGraph::new();
        let a = g.create_vertex(p(0.25, -0.5), 4, "a");
        g.create_vertex(p(0.25, -0.5 + 1e-12), 4, "b");
        let found: Vec<_> = g.colocated_vertices(4, p(0.25, -0.5)).collect();
        assert_eq!(found, vec![a]);
    }
}
