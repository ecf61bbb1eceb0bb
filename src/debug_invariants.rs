//! Structural invariant checking for the mesh hierarchy.

use std::collections::HashMap;

use crate::geometry::point2::Point2;
use crate::mesh_error::MeshGrammarError;
use crate::topology::backend::GraphBackend;
use crate::topology::graph::MeshGraph;
use crate::topology::node::NodeKind;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshGrammarError>;
}

impl<B: GraphBackend> DebugInvariants for MeshGraph<B> {
    fn debug_assert_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.validate_invariants() {
            panic!("[invariants] mesh graph: {e}");
        }
    }

    /// Checks, over the whole hierarchy:
    /// - every parent/child pair spans exactly one level and both sides
    ///   agree on the relation (child elements name their parent, parents
    ///   list their children);
    /// - sibling adjacency is symmetric;
    /// - no two surviving vertices of a level share coordinates.
    fn validate_invariants(&self) -> Result<(), MeshGrammarError> {
        for level in 0..=self.max_level() {
            for element in self.elements_at_level(level) {
                for &child in self.children_of(element)? {
                    let child_level = self.level(child)?;
                    if child_level != level + 1 {
                        return Err(MeshGrammarError::ChildLevelMismatch {
                            child,
                            expected: level + 1,
                            found: child_level,
                        });
                    }
                    if self.kind(child)? == NodeKind::Element
                        && self.parent_of(child)? != Some(element)
                    {
                        return Err(MeshGrammarError::ChildAlreadyOwned(child));
                    }
                }
            }

            for element in self.elements_at_level(level) {
                if let Some(parent) = self.parent_of(element)? {
                    if !self.children_of(parent)?.contains(&element) {
                        return Err(MeshGrammarError::MissingChildSlot {
                            parent,
                            child: element,
                        });
                    }
                }
            }

            for vertex in self.vertices_at_level(level) {
                for sibling in self.vertex_siblings(vertex)?.collect::<Vec<_>>() {
                    let mirrored = self.vertex_siblings(sibling)?.any(|s| s == vertex);
                    if !mirrored {
                        return Err(MeshGrammarError::AsymmetricAdjacency {
                            a: vertex,
                            b: sibling,
                        });
                    }
                }
            }

            let mut seen: HashMap<Point2, crate::topology::node::NodeId> = HashMap::new();
            for vertex in self.vertices_at_level(level) {
                let point = self.coords(vertex)?;
                if seen.insert(point, vertex).is_some() {
                    return Err(MeshGrammarError::DuplicateCoordinates { level, point });
                }
            }
        }
        Ok(())
    }
}
