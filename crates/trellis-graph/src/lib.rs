//! Trellis Graph - call graph assembly and export
//!
//! Turns the definitions and call edges found by `trellis-core` into a
//! directed multigraph and writes one run of artifacts from it: a
//! node-link JSON document, a flattened CSV table and a rendered PNG.
//!
//! # Example
//!
//! ```no_run
//! use trellis_core::{extract_call_graph, Language, ScanOptions};
//! use trellis_graph::{build_call_graph, export_run, ExportOptions};
//! use std::path::Path;
//!
//! let extraction = extract_call_graph(Path::new("./repo"), Language::Python, &ScanOptions::default()).unwrap();
//! let graph = build_call_graph(&extraction.symbols, &extraction.calls);
//! let run = export_run(&graph, Path::new("output"), &ExportOptions::default()).unwrap();
//! println!("run {}", run.run_id);
//! ```

pub mod builder;
pub mod error;
pub mod export;
pub mod graph;
pub mod layout;
pub mod render;

pub use builder::{build_call_graph, GraphBuilder};
pub use error::{ExportError, Result};
pub use export::{export_run, node_link_data, ExportOptions, NodeLinkData, RunArtifacts};
pub use graph::{CallGraph, GraphNode, NodeAttributes, NodeId};
