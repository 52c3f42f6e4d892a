//! The call graph.
//!
//! A thin wrapper around a petgraph `DiGraph` that keeps a name index
//! next to it. Nodes are keyed by qualified identifier; parallel edges
//! are kept, one per recorded call site.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trellis_core::Definition;

/// Index of a node in the call graph.
pub type NodeId = NodeIndex;

/// Attributes carried by a node that came from a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Owning class, struct or interface.
    pub owner: Option<String>,
    /// Source file, relative to the scanned root.
    pub file_path: String,
}

/// A node of the call graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Qualified identifier.
    pub id: String,
    /// `None` for bare nodes that only appear as an edge endpoint.
    pub attributes: Option<NodeAttributes>,
}

impl GraphNode {
    pub fn is_bare(&self) -> bool {
        self.attributes.is_none()
    }

    pub fn owner(&self) -> Option<&str> {
        self.attributes.as_ref().and_then(|a| a.owner.as_deref())
    }

    pub fn file_path(&self) -> Option<&str> {
        self.attributes.as_ref().map(|a| a.file_path.as_str())
    }
}

/// Directed multigraph of callers and callees.
#[derive(Debug, Default)]
pub struct CallGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<String, NodeId>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition node. If the id is already present its
    /// attributes are replaced.
    pub fn add_definition(&mut self, definition: &Definition) {
        let attributes = NodeAttributes {
            owner: definition.owner.clone(),
            file_path: definition.file_path.clone(),
        };
        let idx = self.ensure_node(&definition.id);
        self.graph[idx].attributes = Some(attributes);
    }

    /// Returns the node for `id`, adding a bare one if it is missing.
    pub fn ensure_node(&mut self, id: &str) -> NodeId {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            id: id.to_string(),
            attributes: None,
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Adds one caller -> callee edge. Repeated calls add parallel edges.
    pub fn add_call(&mut self, caller: &str, callee: &str) {
        let from = self.ensure_node(caller);
        let to = self.ensure_node(callee);
        self.graph.add_edge(from, to, ());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Edges as (caller, callee) ids, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
            )
        })
    }

    /// Edges as (caller, callee) indexes, in insertion order.
    pub fn edge_endpoints(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node<'g>(graph: &'g CallGraph, id: &str) -> &'g GraphNode {
        graph.nodes().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn test_bare_nodes_are_created_on_demand() {
        let mut graph = CallGraph::new();
        graph.add_definition(&Definition::new("f", None, "a.py"));
        graph.add_call("f", "print");

        assert_eq!(graph.node_count(), 2);
        let print = node(&graph, "print");
        assert!(print.is_bare());
        assert_eq!(print.file_path(), None);
    }

    #[test]
    fn test_definition_upgrades_bare_node() {
        let mut graph = CallGraph::new();
        graph.add_call("f", "Foo.g");
        graph.add_definition(&Definition::new("g", Some("Foo"), "foo.py"));

        assert_eq!(graph.node_count(), 2);
        let g = node(&graph, "Foo.g");
        assert_eq!(g.owner(), Some("Foo"));
        assert_eq!(g.file_path(), Some("foo.py"));
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut graph = CallGraph::new();
        graph.add_call("f", "g");
        graph.add_call("f", "g");
        graph.add_call("f", "h");

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 3);
        let to_g = graph.edges().filter(|&e| e == ("f", "g")).count();
        assert_eq!(to_g, 2);
    }

    #[test]
    fn test_edges_keep_insertion_order() {
        let mut graph = CallGraph::new();
        graph.add_call("a", "b");
        graph.add_call("b", "c");
        graph.add_call("a", "c");

        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![("a", "b"), ("b", "c"), ("a", "c")]);
    }
}
