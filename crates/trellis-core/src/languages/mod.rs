//! Language extractors module.
//!
//! Each supported language has its own submodule that implements the
//! LanguageExtractor trait. Resolution heuristics differ a lot between
//! languages, so each one owns its node-kind matching while sharing the
//! traversal context in `context`.

mod c;
mod context;
mod cpp;
mod go;
mod java;
mod javascript;
mod php;
mod python;

use crate::definition::{CallEdge, Definition};
use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use c::CExtractor;
pub use cpp::CppExtractor;
pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
pub use php::PhpExtractor;
pub use python::PythonExtractor;

/// Which call edges survive the end of the call pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Only the callee has to be a known definition.
    CalleeKnown,
    /// Both caller and callee have to be known definitions.
    BothKnown,
}

impl EdgePolicy {
    /// Returns true if the edge may enter the graph.
    pub fn admits(&self, edge: &CallEdge, symbols: &SymbolTable) -> bool {
        if edge.caller == edge.callee {
            return false;
        }
        match self {
            Self::CalleeKnown => symbols.contains(&edge.callee),
            Self::BothKnown => symbols.contains(&edge.caller) && symbols.contains(&edge.callee),
        }
    }
}

/// Trait for language-specific extraction logic.
///
/// Both passes walk the whole tree of one file. The definition pass needs
/// nothing but the tree; the call pass resolves against the complete
/// symbol table built from every file.
pub trait LanguageExtractor: Send + Sync {
    /// Returns the Tree-sitter language for this extractor.
    fn language(&self) -> tree_sitter::Language;

    /// File extensions this extractor handles.
    fn extensions(&self) -> &[&str];

    /// How raw call edges are filtered once the call pass is done.
    fn edge_policy(&self) -> EdgePolicy {
        EdgePolicy::BothKnown
    }

    /// Collects every named function or method definition in one tree.
    fn definitions_from(
        &self,
        tree: &tree_sitter::Tree,
        source: &str,
        file_path: &str,
    ) -> Vec<Definition>;

    /// Collects the call edges of one tree.
    fn calls_from(
        &self,
        tree: &tree_sitter::Tree,
        source: &str,
        symbols: &SymbolTable,
    ) -> Vec<CallEdge>;

    /// Checks whether a path has one of this extractor's extensions.
    fn matches(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions().contains(&ext))
            .unwrap_or(false)
    }
}

/// The fixed set of languages a run can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Python,
    Java,
    Go,
    JavaScript,
    Cpp,
    C,
    Php,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Python,
        Language::Java,
        Language::Go,
        Language::JavaScript,
        Language::Cpp,
        Language::C,
        Language::Php,
    ];

    /// Gets the extractor for this language.
    pub fn extractor(&self) -> Box<dyn LanguageExtractor> {
        match self {
            Self::Python => Box::new(PythonExtractor),
            Self::Java => Box::new(JavaExtractor),
            Self::Go => Box::new(GoExtractor),
            Self::JavaScript => Box::new(JavaScriptExtractor),
            Self::Cpp => Box::new(CppExtractor),
            Self::C => Box::new(CExtractor),
            Self::Php => Box::new(PhpExtractor),
        }
    }
}

impl FromStr for Language {
    type Err = ExtractError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "java" => Ok(Self::Java),
            "golang" | "go" => Ok(Self::Go),
            "js" | "javascript" => Ok(Self::JavaScript),
            "cpp" | "c++" => Ok(Self::Cpp),
            "c" => Ok(Self::C),
            "php" => Ok(Self::Php),
            _ => Err(ExtractError::UnsupportedLanguage(tag.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::Php => "php",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_language_tags_and_aliases() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("Golang".parse::<Language>().unwrap(), Language::Go);
        assert_eq!("go".parse::<Language>().unwrap(), Language::Go);
        assert_eq!("JS".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("c".parse::<Language>().unwrap(), Language::C);
        assert_eq!("php".parse::<Language>().unwrap(), Language::Php);
    }

    #[test]
    fn test_unsupported_tag_is_descriptive() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedLanguage(ref t) if t == "cobol"));
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for language in Language::ALL {
            assert_eq!(language.to_string().parse::<Language>().unwrap(), language);
        }
    }

    #[test]
    fn test_extension_matching() {
        let c = Language::C.extractor();
        assert!(c.matches(Path::new("src/main.c")));
        assert!(!c.matches(Path::new("src/main.cpp")));
        assert!(!c.matches(Path::new("Makefile")));

        let js = Language::JavaScript.extractor();
        assert!(js.matches(Path::new("lib/index.mjs")));
    }

    #[test]
    fn test_edge_policies() {
        let mut symbols = SymbolTable::new();
        symbols.insert(Definition::new("g", None, "b.py"));

        let unknown_caller = CallEdge::new("lambda_helper", "g");
        assert!(EdgePolicy::CalleeKnown.admits(&unknown_caller, &symbols));
        assert!(!EdgePolicy::BothKnown.admits(&unknown_caller, &symbols));

        let self_loop = CallEdge::new("g", "g");
        assert!(!EdgePolicy::CalleeKnown.admits(&self_loop, &symbols));
    }
}
