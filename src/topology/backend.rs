//! The attributed-graph backend behind the mesh graph.
//!
//! The mesh hierarchy only needs a narrow slice of graph functionality:
//! node/edge creation, label get/set, neighbor enumeration and
//! depth-/breadth-first orders, plus the node/edge removal that `merge`
//! requires. [`GraphBackend`] captures exactly that surface so any
//! adjacency-list or graph library can satisfy it; [`InMemoryBackend`] is
//! the hash-map implementation used in practice.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::topology::node::{NodeId, NodeKind};

/// Traversal orders offered by the backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalOrder {
    DepthFirst,
    BreadthFirst,
}

/// Narrow attributed-graph API consumed by the mesh hierarchy.
///
/// Edges are undirected and unlabeled; parallel edges and self-loops are
/// never stored. Traversal and neighbor iterators are read-only views:
/// they borrow the backend, so the borrow checker rules out mutation while
/// iterating.
pub trait GraphBackend: Default {
    /// Creates a node of the given kind and returns its fresh id.
    fn create_node(&mut self, kind: NodeKind, label: &str) -> NodeId;

    /// Inserts the undirected edge `a – b`. Idempotent; self-loops are
    /// ignored.
    fn create_edge(&mut self, a: NodeId, b: NodeId);

    /// Removes the undirected edge `a – b`, returning whether it existed.
    fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool;

    /// Removes a node together with all edges touching it.
    fn remove_node(&mut self, id: NodeId);

    /// True while `id` is part of the graph.
    fn contains(&self, id: NodeId) -> bool;

    fn kind(&self, id: NodeId) -> Option<NodeKind>;

    fn get_label(&self, id: NodeId) -> Option<&str>;

    fn set_label(&mut self, id: NodeId, label: &str);

    /// Neighbors of `id` in insertion order.
    fn neighbors<'a>(&'a self, id: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a>;

    /// All ids reachable from `root` (including `root`) in depth-first
    /// order.
    fn depth_first_order<'a>(&'a self, root: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a>;

    /// All ids reachable from `root` (including `root`) in breadth-first
    /// order.
    fn breadth_first_order<'a>(&'a self, root: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a>;
}

#[derive(Clone, Debug)]
struct NodeRecord {
    kind: NodeKind,
    label: String,
}

/// Hash-map backed implementation of [`GraphBackend`].
///
/// Adjacency is mirrored: every edge appears in both endpoints' lists, and
/// debug builds assert the mirror stays consistent after each mutation.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackend {
    next_id: u64,
    records: HashMap<NodeId, NodeRecord>,
    adjacency: HashMap<NodeId, Vec<NodeId>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.records.len()
    }

    fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|v| v.iter().any(|&n| n == b))
    }

    #[cfg(debug_assertions)]
    fn debug_assert_consistent(&self) {
        for (&id, neighbors) in &self.adjacency {
            let mut seen = HashSet::new();
            for &n in neighbors {
                debug_assert!(seen.insert(n), "duplicate edge {id:?} - {n:?}");
                debug_assert!(n != id, "self-loop on {id:?}");
                let mirrored = self
                    .adjacency
                    .get(&n)
                    .is_some_and(|back| back.iter().any(|&m| m == id));
                debug_assert!(mirrored, "missing mirror for edge {id:?} - {n:?}");
            }
        }
    }
}

impl GraphBackend for InMemoryBackend {
    fn create_node(&mut self, kind: NodeKind, label: &str) -> NodeId {
        self.next_id += 1;
        let id = NodeId::new(self.next_id).expect("monotonic allocator starts at 1");
        self.records.insert(
            id,
            NodeRecord {
                kind,
                label: label.to_string(),
            },
        );
        self.adjacency.entry(id).or_default();
        id
    }

    fn create_edge(&mut self, a: NodeId, b: NodeId) {
        if a == b || self.has_edge(a, b) {
            return;
        }
        debug_assert!(self.records.contains_key(&a) && self.records.contains_key(&b));
        self.adjacency.entry(a).or_default().push(b);
        self.adjacency.entry(b).or_default().push(a);
        #[cfg(debug_assertions)]
        self.debug_assert_consistent();
    }

    fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let mut removed = false;
        if let Some(v) = self.adjacency.get_mut(&a) {
            if let Some(pos) = v.iter().position(|&n| n == b) {
                v.remove(pos);
                removed = true;
            }
        }
        if let Some(v) = self.adjacency.get_mut(&b) {
            if let Some(pos) = v.iter().position(|&n| n == a) {
                v.remove(pos);
            }
        }
        #[cfg(debug_assertions)]
        self.debug_assert_consistent();
        removed
    }

    fn remove_node(&mut self, id: NodeId) {
        let neighbors = self.adjacency.remove(&id).unwrap_or_default();
        for n in neighbors {
            if let Some(v) = self.adjacency.get_mut(&n) {
                v.retain(|&m| m != id);
            }
        }
        self.records.remove(&id);
        #[cfg(debug_assertions)]
        self.debug_assert_consistent();
    }

    fn contains(&self, id: NodeId) -> bool {
        self.records.contains_key(&id)
    }

    fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.records.get(&id).map(|r| r.kind)
    }

    fn get_label(&self, id: NodeId) -> Option<&str> {
        self.records.get(&id).map(|r| r.label.as_str())
    }

    fn set_label(&mut self, id: NodeId, label: &str) {
        if let Some(record) = self.records.get_mut(&id) {
            record.label = label.to_string();
        }
    }

    fn neighbors<'a>(&'a self, id: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        match self.adjacency.get(&id) {
            Some(v) => Box::new(v.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn depth_first_order<'a>(&'a self, root: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let mut stack = if self.contains(root) { vec![root] } else { vec![] };
        let mut seen: HashSet<NodeId> = stack.iter().copied().collect();
        Box::new(std::iter::from_fn(move || {
            let id = stack.pop()?;
            // Push in reverse so insertion-order neighbors pop first.
            let mut fresh: Vec<NodeId> =
                self.neighbors(id).filter(|n| !seen.contains(n)).collect();
            fresh.reverse();
            for n in fresh {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
            Some(id)
        }))
    }

    fn breadth_first_order<'a>(&'a self, root: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let mut queue: VecDeque<NodeId> = if self.contains(root) {
            VecDeque::from([root])
        } else {
            VecDeque::new()
        };
        let mut seen: HashSet<NodeId> = queue.iter().copied().collect();
        Box::new(std::iter::from_fn(move || {
            let id = queue.pop_front()?;
            for n in self.neighbors(id) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
            Some(id)
        }))
    }
}
