//! Directory scanning.
//!
//! Walks a source tree, runs the definition pass over every matching
//! file, then the call pass against the finished symbol table. Paths are
//! always built from the explicit root; the working directory is never
//! touched.

use crate::definition::CallEdge;
use crate::error::{ExtractError, Result};
use crate::languages::{Language, LanguageExtractor};
use crate::parser::{parse_source, read_source};
use crate::symbol_table::SymbolTable;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Options for a directory scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Follow symbolic links when walking directories.
    pub follow_symlinks: bool,
}

/// Result of scanning a directory.
#[derive(Debug)]
pub struct Extraction {
    /// Every definition found in pass 1.
    pub symbols: SymbolTable,

    /// Call edges that survived the language's edge policy, in the order
    /// they were found.
    pub calls: Vec<CallEdge>,

    /// Number of source files that were parsed.
    pub files_scanned: usize,
}

/// Extracts definitions and call edges for one language under `root`.
///
/// # Example
///
/// ```no_run
/// use trellis_core::{extract_call_graph, Language, ScanOptions};
/// use std::path::Path;
///
/// let result = extract_call_graph(Path::new("./src"), Language::Python, &ScanOptions::default()).unwrap();
/// println!("{} definitions, {} calls", result.symbols.len(), result.calls.len());
/// ```
pub fn extract_call_graph(
    root: &Path,
    language: Language,
    options: &ScanOptions,
) -> Result<Extraction> {
    check_root(root)?;

    let start = Instant::now();
    let extractor = language.extractor();
    let files = source_files(root, extractor.as_ref(), options)?;
    info!(
        "Scanning {} {} files under {}",
        files.len(),
        language,
        root.display()
    );

    let symbols = collect_definitions(root, &files, extractor.as_ref())?;
    info!(
        "Pass 1: {} definitions from {} files",
        symbols.len(),
        files.len()
    );

    let mut calls = collect_calls(root, &files, extractor.as_ref(), &symbols)?;
    let found = calls.len();
    let policy = extractor.edge_policy();
    calls.retain(|edge| {
        let keep = policy.admits(edge, &symbols);
        if !keep {
            debug!("Dropping unresolved call {}", edge);
        }
        keep
    });
    info!(
        "Pass 2: {} call edges kept of {} found in {:?}",
        calls.len(),
        found,
        start.elapsed()
    );

    Ok(Extraction {
        symbols,
        calls,
        files_scanned: files.len(),
    })
}

fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(ExtractError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ExtractError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Root-relative, `/`-separated paths of every file the extractor
/// handles, in a stable order.
pub fn source_files(
    root: &Path,
    extractor: &dyn LanguageExtractor,
    options: &ScanOptions,
) -> Result<Vec<String>> {
    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !extractor.matches(entry.path()) {
            continue;
        }
        if let Some(relative) = relative_path(root, entry.path()) {
            files.push(relative);
        }
    }
    Ok(files)
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

fn absolute(root: &Path, relative: &str) -> PathBuf {
    root.join(relative)
}

/// Pass 1: every definition in every file.
pub fn collect_definitions(
    root: &Path,
    files: &[String],
    extractor: &dyn LanguageExtractor,
) -> Result<SymbolTable> {
    let mut symbols = SymbolTable::new();
    for relative in files {
        let source = read_source(&absolute(root, relative))?;
        let tree = parse_source(&source, extractor.language())?;
        let definitions = extractor.definitions_from(&tree, &source, relative);
        debug!("{}: {} definitions", relative, definitions.len());
        symbols.extend(definitions);
    }
    Ok(symbols)
}

/// Pass 2: raw call edges of every file, resolved against `symbols`.
///
/// The edge policy is not applied here.
pub fn collect_calls(
    root: &Path,
    files: &[String],
    extractor: &dyn LanguageExtractor,
    symbols: &SymbolTable,
) -> Result<Vec<CallEdge>> {
    let mut calls = Vec::new();
    for relative in files {
        let source = read_source(&absolute(root, relative))?;
        let tree = parse_source(&source, extractor.language())?;
        let found = extractor.calls_from(&tree, &source, symbols);
        debug!("{}: {} call sites", relative, found.len());
        calls.extend(found);
    }
    Ok(calls)
}
