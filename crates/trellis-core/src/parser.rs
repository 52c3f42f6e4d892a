//! Parser module - the Tree-sitter adapter.
//!
//! Everything the extractors know about a file comes through here:
//! bytes in, a syntax tree out. Malformed source still yields a tree
//! (with error nodes) that the extractors walk like any other.

use crate::error::{ExtractError, Result};
use std::fs;
use std::path::Path;
use tree_sitter::{Language, Tree};

/// Reads a source file from disk.
///
/// Invalid UTF-8 is replaced rather than rejected, so odd encodings never
/// abort a run; node text is always read back from this string.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(source) => source,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Parses source code with the given grammar.
///
/// # Example
///
/// ```
/// use trellis_core::{parse_source, Language};
///
/// let extractor = Language::Python.extractor();
/// let tree = parse_source("def main():\n    pass\n", extractor.language()).unwrap();
/// assert_eq!(tree.root_node().kind(), "module");
/// ```
pub fn parse_source(source: &str, language: Language) -> Result<Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ExtractError::ParserError(format!("Failed to set language: {}", e)))?;

    parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::ParserError("Tree-sitter returned no tree".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language as Lang;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_every_grammar() {
        let samples = [
            (Lang::Python, "def f():\n    g()\n"),
            (Lang::Java, "class A { void f() { g(); } }"),
            (Lang::Go, "package main\nfunc f() { g() }\n"),
            (Lang::JavaScript, "function f() { g(); }"),
            (Lang::Cpp, "void f() { g(); }"),
            (Lang::C, "void f(void) { g(); }"),
            (Lang::Php, "<?php function f() { g(); }"),
        ];

        for (language, source) in samples {
            let tree = parse_source(source, language.extractor().language()).unwrap();
            assert!(
                !tree.root_node().has_error(),
                "{} sample should parse cleanly",
                language
            );
        }
    }

    #[test]
    fn test_malformed_source_still_yields_tree() {
        let tree = parse_source("def broken(:\n", Lang::Python.extractor().language()).unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_read_source_replaces_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"def f():\n    return '\xff'\n").unwrap();

        let source = read_source(file.path()).unwrap();
        assert!(source.starts_with("def f():"));
        assert!(source.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = read_source(Path::new("/definitely/not/here.py")).unwrap_err();
        assert!(matches!(err, ExtractError::IoError { .. }));
    }
}
