//! Graph builder for assembling the call graph from extraction output.
//!
//! Definitions become attributed nodes; every call edge becomes a graph
//! edge, with endpoints that were never defined added as bare nodes.

use crate::graph::CallGraph;
use trellis_core::{CallEdge, SymbolTable};
use tracing::debug;

/// Builds a CallGraph in two steps:
/// 1. Add every definition as a node
/// 2. Add every call edge, creating missing endpoints
#[derive(Default)]
pub struct GraphBuilder {
    graph: CallGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node per definition, in symbol table order.
    pub fn add_definitions(&mut self, symbols: &SymbolTable) {
        for definition in symbols.iter() {
            self.graph.add_definition(definition);
        }
    }

    /// Adds one edge per call. Parallel edges are not deduplicated.
    pub fn add_calls(&mut self, calls: &[CallEdge]) {
        for call in calls {
            if !self.graph.contains(&call.caller) || !self.graph.contains(&call.callee) {
                debug!("Adding bare endpoint for {}", call);
            }
            self.graph.add_call(&call.caller, &call.callee);
        }
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> CallGraph {
        self.graph
    }
}

/// Assembles the call graph for one run.
pub fn build_call_graph(symbols: &SymbolTable, calls: &[CallEdge]) -> CallGraph {
    let mut builder = GraphBuilder::new();
    builder.add_definitions(symbols);
    builder.add_calls(calls);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNode;
    use trellis_core::Definition;

    fn node<'g>(graph: &'g CallGraph, id: &str) -> &'g GraphNode {
        graph.nodes().find(|n| n.id == id).unwrap()
    }

    fn symbols(defs: &[(&str, Option<&str>, &str)]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (name, owner, file) in defs {
            table.insert(Definition::new(name, *owner, *file));
        }
        table
    }

    #[test]
    fn test_builder_adds_definitions() {
        let table = symbols(&[("f", None, "a.py"), ("g", None, "b.py")]);
        let graph = build_call_graph(&table, &[CallEdge::new("f", "g")]);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let g = node(&graph, "g");
        assert_eq!(g.file_path(), Some("b.py"));
    }

    #[test]
    fn test_every_edge_endpoint_is_a_node() {
        let table = symbols(&[("run", Some("Job"), "job.py")]);
        let calls = [
            CallEdge::new("<lambda>", "Job.run"),
            CallEdge::new("Job.run", "Other.helper"),
        ];
        let graph = build_call_graph(&table, &calls);

        assert_eq!(graph.node_count(), 3);
        for (caller, callee) in graph.edges() {
            assert!(graph.contains(caller));
            assert!(graph.contains(callee));
        }
        let lambda = node(&graph, "<lambda>");
        assert!(lambda.is_bare());
    }

    #[test]
    fn test_duplicate_calls_stay_parallel() {
        let table = symbols(&[("f", None, "a.c"), ("g", None, "a.c")]);
        let calls = [CallEdge::new("f", "g"), CallEdge::new("f", "g")];
        let graph = build_call_graph(&table, &calls);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }
}
