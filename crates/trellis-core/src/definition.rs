//! Definitions and call edges.
//!
//! A Definition is our abstraction over a function or method node in
//! the syntax tree. It keeps only what the call graph needs: the
//! qualified identifier, the owning type, and the file it came from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Joins an owner and a member name into a qualified identifier.
///
/// Free functions (no owner) keep their bare name.
pub fn qualify(owner: Option<&str>, name: &str) -> String {
    match owner {
        Some(owner) => format!("{}.{}", owner, name),
        None => name.to_string(),
    }
}

/// A function or method seen during the definition pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Definition {
    /// Qualified identifier (e.g., "UserService.validate").
    pub id: String,

    /// Owning class, struct or interface, if any.
    #[serde(rename = "class")]
    pub owner: Option<String>,

    /// Path to the source file, relative to the scanned root.
    pub file_path: String,
}

impl Definition {
    /// Creates a definition and derives its qualified identifier.
    pub fn new(name: &str, owner: Option<&str>, file_path: impl Into<String>) -> Self {
        Self {
            id: qualify(owner, name),
            owner: owner.map(str::to_string),
            file_path: file_path.into(),
        }
    }
}

/// A directed "caller calls callee" relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

impl fmt::Display for CallEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.caller, self.callee)
    }
}
