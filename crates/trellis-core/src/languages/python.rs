//! Python language extractor.
//!
//! Handles .py files. Classes own the functions defined in their body,
//! `self.method()` resolves to the enclosing class, and `x = T()` binds
//! `x` to `T` when `T` is a class we saw methods for.

use super::context::{traverse, Context, Scope};
use super::{EdgePolicy, LanguageExtractor};
use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tree_sitter::{Language, Node, Tree};

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    /// Only the callee is checked; the caller is whatever function was
    /// entered last.
    fn edge_policy(&self) -> EdgePolicy {
        EdgePolicy::CalleeKnown
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

fn definition_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    match node.kind() {
        "class_definition" => {
            let name = cx.field_text(node, "name");
            cx.enter_owner(name)
        }
        "function_definition" => {
            if let Some(name) = cx.field_text(node, "name") {
                cx.define_member(name);
            }
            Scope::Flat
        }
        _ => Scope::Flat,
    }
}

fn call_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    match node.kind() {
        "class_definition" => {
            let name = cx.field_text(node, "name");
            return cx.enter_owner(name);
        }
        "function_definition" => {
            if let Some(name) = cx.field_text(node, "name") {
                let id = cx.qualify(name);
                cx.enter_function(id);
            }
        }
        "assignment" => bind_constructor(node, cx),
        "call" => resolve_call(node, cx),
        _ => {}
    }
    Scope::Flat
}

/// `x = T(...)` where `T` owns known methods binds `x` to `T`.
fn bind_constructor(node: Node<'_>, cx: &mut Context<'_>) {
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    if left.kind() != "identifier" || right.kind() != "call" {
        return;
    }
    let Some(function) = right.child_by_field_name("function") else {
        return;
    };
    if function.kind() != "identifier" {
        return;
    }

    let type_name = cx.text(function);
    if cx.is_owner(type_name) {
        let variable = cx.text(left);
        cx.bind(variable, type_name);
    }
}

fn resolve_call(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };
    let called = cx.text(function);

    let callee = match called.rsplit_once('.') {
        Some((receiver, method)) => match cx.receiver_type(receiver, "self") {
            Some(type_name) => qualify(Some(&type_name), method),
            None => called.to_string(),
        },
        None => cx.member_or_global(called),
    };

    if cx.is_known(&callee) {
        cx.record_call(callee);
    }
}
