//! PHP language extractor.
//!
//! Handles .php files. On top of the usual `$this` and `new T()`
//! receiver tracking, PHP keeps method aliases: after
//! `$f = $obj->run;` (or `$obj->run()`), a later `$f()` is treated as a
//! call to `T.run`.

use super::context::{traverse, Context, Scope};
use super::LanguageExtractor;
use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tree_sitter::{Language, Node, Tree};

pub struct PhpExtractor;

impl LanguageExtractor for PhpExtractor {
    fn language(&self) -> Language {
        tree_sitter_php::LANGUAGE_PHP.into()
    }

    fn extensions(&self) -> &[&str] {
        &["php"]
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

const THIS: &str = "$this";

fn is_owner_kind(kind: &str) -> bool {
    kind == "class_declaration" || kind == "interface_declaration"
}

fn is_function_kind(kind: &str) -> bool {
    kind == "function_definition" || kind == "method_declaration"
}

fn definition_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    if is_owner_kind(node.kind()) {
        let name = cx.field_text(node, "name");
        return cx.enter_owner(name);
    }
    if is_function_kind(node.kind()) {
        if let Some(name) = cx.field_text(node, "name") {
            cx.define_member(name);
        }
    }
    Scope::Flat
}

fn call_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    if is_owner_kind(node.kind()) {
        let name = cx.field_text(node, "name");
        return cx.enter_owner(name);
    }
    match node.kind() {
        kind if is_function_kind(kind) => {
            if let Some(name) = cx.field_text(node, "name") {
                let id = cx.qualify(name);
                cx.enter_function(id);
            }
        }
        "assignment_expression" => bind_assignment(node, cx),
        "function_call_expression" => resolve_function_call(node, cx),
        "member_call_expression" => resolve_member_call(node, cx),
        "scoped_call_expression" => resolve_scoped_call(node, cx),
        _ => {}
    }
    Scope::Flat
}

/// Unqualified class name: `\App\Models\User` -> `User`.
fn short_class_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Class instantiated by `new T(...)`.
fn created_class<'a>(node: Node<'_>, cx: &Context<'a>) -> Option<&'a str> {
    let mut cursor = node.walk();
    let last = node
        .children(&mut cursor)
        .filter(|c| c.kind() == "name" || c.kind() == "qualified_name")
        .last()?;
    Some(short_class_name(cx.text(last)))
}

/// `$obj->name` or `$obj->name()` as `Type.name`, when `$obj` has a type.
fn member_target(node: Node<'_>, cx: &Context<'_>) -> Option<String> {
    let object = cx.field_text(node, "object")?;
    let method = cx.field_text(node, "name")?;
    let type_name = cx.receiver_type(object, THIS)?;
    Some(qualify(Some(&type_name), method))
}

fn bind_assignment(node: Node<'_>, cx: &mut Context<'_>) {
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    let variable = cx.text(left);

    match right.kind() {
        "object_creation_expression" => {
            if let Some(class_name) = created_class(right, cx) {
                cx.bind(variable, class_name);
            }
        }
        "member_access_expression" | "member_call_expression" => {
            if let Some(target) = member_target(right, cx) {
                cx.alias(variable, target);
            }
        }
        _ => {}
    }
}

fn record_if_known(cx: &mut Context<'_>, callee: String) {
    if cx.is_known(&callee) {
        cx.record_call(callee);
    }
}

fn resolve_function_call(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };
    match function.kind() {
        "variable_name" => {
            if let Some(target) = cx.aliased(cx.text(function)) {
                let target = target.to_string();
                record_if_known(cx, target);
            }
        }
        "name" | "qualified_name" => {
            let name = short_class_name(cx.text(function)).to_string();
            record_if_known(cx, name);
        }
        _ => {}
    }
}

fn resolve_member_call(node: Node<'_>, cx: &mut Context<'_>) {
    if let Some(target) = member_target(node, cx) {
        record_if_known(cx, target);
    }
}

/// `self::m()`, `static::m()` and `Type::m()`.
fn resolve_scoped_call(node: Node<'_>, cx: &mut Context<'_>) {
    let (Some(scope), Some(method)) = (cx.field_text(node, "scope"), cx.field_text(node, "name"))
    else {
        return;
    };
    let owner = match scope {
        "self" | "static" => match cx.owner() {
            Some(owner) => owner.to_string(),
            None => return,
        },
        other => short_class_name(other).to_string(),
    };
    record_if_known(cx, qualify(Some(&owner), method));
}
