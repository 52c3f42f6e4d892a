//! Trellis Core - definition and call-site extraction
//!
//! This crate turns a source tree into the raw material of a call graph.
//! Tree-sitter parses each file; a per-language extractor collects every
//! function and method definition in a first pass, then resolves call
//! sites against the complete symbol table in a second pass.
//!
//! # Example
//!
//! ```no_run
//! use trellis_core::{extract_call_graph, Language, ScanOptions};
//! use std::path::Path;
//!
//! let result = extract_call_graph(Path::new("./repo"), Language::Java, &ScanOptions::default()).unwrap();
//! for edge in &result.calls {
//!     println!("{}", edge);
//! }
//! ```

pub mod definition;
pub mod error;
pub mod languages;
pub mod parser;
pub mod scan;
pub mod symbol_table;

pub use definition::{qualify, CallEdge, Definition};
pub use error::{ExtractError, Result};
pub use languages::{EdgePolicy, Language, LanguageExtractor};
pub use parser::{parse_source, read_source};
pub use scan::{extract_call_graph, Extraction, ScanOptions};
pub use symbol_table::SymbolTable;
