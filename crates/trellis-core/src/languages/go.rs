//! Go language extractor.
//!
//! Handles .go files. Go has no owner concept here: every function and
//! method name is global, and a call site is named by the literal text
//! of its function expression.

use super::context::{traverse, Context, Scope};
use super::LanguageExtractor;
use crate::definition::{CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tree_sitter::{Language, Node, Tree};

pub struct GoExtractor;

impl LanguageExtractor for GoExtractor {
    fn language(&self) -> Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn extensions(&self) -> &[&str] {
        &["go"]
    }

    fn definitions_from(&self, tree: &Tree, source: &str, file_path: &str) -> Vec<Definition> {
        let mut cx = Context::for_definitions(source, file_path);
        traverse(tree.root_node(), &mut cx, definition_step);
        cx.definitions
    }

    fn calls_from(&self, tree: &Tree, source: &str, symbols: &SymbolTable) -> Vec<CallEdge> {
        let mut cx = Context::for_calls(source, symbols);
        traverse(tree.root_node(), &mut cx, call_step);
        cx.calls
    }
}

fn is_function_kind(kind: &str) -> bool {
    kind == "function_declaration" || kind == "method_declaration"
}

fn definition_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    if is_function_kind(node.kind()) {
        if let Some(name) = cx.field_text(node, "name") {
            cx.define_free(name);
        }
    }
    Scope::Flat
}

fn call_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    if is_function_kind(node.kind()) {
        if let Some(name) = cx.field_text(node, "name") {
            cx.enter_function(name.to_string());
        }
    } else if node.kind() == "call_expression" {
        if let Some(called) = cx.field_text(node, "function") {
            cx.record_call(called.to_string());
        }
    }
    Scope::Flat
}
