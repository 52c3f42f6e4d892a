//! Java language extractor.
//!
//! Handles .java files. Methods are owned by the enclosing class,
//! interface or enum. Receivers are resolved through `this` and through
//! locals whose type we can read off `new T()` or a declaration.

use super::context::{traverse, Context, Scope};
use super::LanguageExtractor;
use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tree_sitter::{Language, Node, Tree};

pub struct JavaExtractor;

impl LanguageExtractor for JavaExtractor {
    fn language(&self) -> Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn extensions(&self) -> &[&str] {
        &["java"]
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

fn is_owner_kind(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration" | "interface_declaration" | "enum_declaration"
    )
}

fn definition_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    if is_owner_kind(node.kind()) {
        let name = cx.field_text(node, "name");
        return cx.enter_owner(name);
    }
    if node.kind() == "method_declaration" {
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
        "method_declaration" => {
            if let Some(name) = cx.field_text(node, "name") {
                let id = cx.qualify(name);
                cx.enter_function(id);
            }
        }
        "assignment_expression" => bind_assignment(node, cx),
        "local_variable_declaration" => bind_declaration(node, cx),
        "method_invocation" => resolve_invocation(node, cx),
        _ => {}
    }
    Scope::Flat
}

/// Base name of a type node: `Foo`, `List<Foo>` -> `List`, `a.b.Foo`.
fn type_name<'a>(node: Node<'_>, cx: &Context<'a>) -> Option<&'a str> {
    match node.kind() {
        "type_identifier" | "scoped_type_identifier" => Some(cx.text(node)),
        "generic_type" => node.named_child(0).and_then(|base| type_name(base, cx)),
        _ => None,
    }
}

/// Type constructed by an `object_creation_expression`.
fn created_type<'a>(node: Node<'_>, cx: &Context<'a>) -> Option<&'a str> {
    if node.kind() != "object_creation_expression" {
        return None;
    }
    type_name(node.child_by_field_name("type")?, cx)
}

/// `x = new T(...)` binds `x` to `T`.
fn bind_assignment(node: Node<'_>, cx: &mut Context<'_>) {
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    if let Some(type_name) = created_type(right, cx) {
        let variable = cx.text(left);
        cx.bind(variable, type_name);
    }
}

/// `T x = ...;` binds `x` to `T`, or to the constructed type when the
/// initializer is a `new` expression.
fn bind_declaration(node: Node<'_>, cx: &mut Context<'_>) {
    let declared = node
        .child_by_field_name("type")
        .and_then(|t| type_name(t, cx));

    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        let Some(variable) = cx.field_text(declarator, "name") else {
            continue;
        };
        let constructed = declarator
            .child_by_field_name("value")
            .and_then(|value| created_type(value, cx));
        if let Some(type_name) = constructed.or(declared) {
            cx.bind(variable, type_name);
        }
    }
}

/// Splits an invocation into (receiver, method).
///
/// With an `object` field the receiver is explicit. Otherwise the
/// identifier children are read pairwise: the first is the object and
/// the second the method; a lone identifier is a receiver-less call.
fn receiver_and_method<'a>(
    node: Node<'_>,
    cx: &Context<'a>,
) -> (Option<&'a str>, Option<&'a str>) {
    if let Some(object) = node.child_by_field_name("object") {
        return (Some(cx.text(object)), cx.field_text(node, "name"));
    }

    let mut receiver = None;
    let mut method = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                if method.is_some() {
                    receiver = method;
                }
                method = Some(cx.text(child));
            }
            "field_access" => receiver = Some(cx.text(child)),
            _ => {}
        }
    }
    (receiver, method)
}

fn resolve_invocation(node: Node<'_>, cx: &mut Context<'_>) {
    let (receiver, method) = receiver_and_method(node, cx);
    let Some(method) = method else {
        return;
    };

    let callee = match receiver {
        Some(receiver) => match cx.receiver_type(receiver, "this") {
            Some(type_name) => qualify(Some(&type_name), method),
            None => qualify(Some(receiver), method),
        },
        None => cx.member_or_global(method),
    };
    cx.record_call(callee);
}

#[cfg(test)]
mod tests {
    use super::super::context::testing::{extract, has_edge, ids};
    use super::*;

    #[test]
    fn test_methods_are_owned_by_class() {
        let source = r#"
public class Account {
    public void deposit(int amount) { validate(amount); }
    private void validate(int amount) {}
}
"#;
        let (symbols, calls) = extract(&JavaExtractor, &[("Account.java", source)]);

        assert_eq!(ids(&symbols), vec!["Account.deposit", "Account.validate"]);
        assert!(has_edge(&calls, "Account.deposit", "Account.validate"));
    }

    #[test]
    fn test_this_receiver() {
        let source = r#"
class Foo {
    void bar() { this.baz(); }
    void baz() {}
}
"#;
        let (_, calls) = extract(&JavaExtractor, &[("Foo.java", source)]);
        assert_eq!(calls, vec![CallEdge::new("Foo.bar", "Foo.baz")]);
    }

    #[test]
    fn test_constructed_local_resolves_across_files() {
        let service = r#"
class Service {
    void run() {
        Repository repo = new Repository();
        repo.save();
        Cache cache;
        cache = new Cache();
        cache.flush();
    }
}
"#;
        let repository = "class Repository { void save() {} }";
        let cache = "class Cache { void flush() {} }";
        let (_, calls) = extract(
            &JavaExtractor,
            &[
                ("Service.java", service),
                ("Repository.java", repository),
                ("Cache.java", cache),
            ],
        );

        assert!(has_edge(&calls, "Service.run", "Repository.save"));
        assert!(has_edge(&calls, "Service.run", "Cache.flush"));
    }

    #[test]
    fn test_static_call_by_class_name() {
        let source = r#"
class Util { static int twice(int x) { return x * 2; } }
class App { void main() { Util.twice(2); } }
"#;
        let (_, calls) = extract(&JavaExtractor, &[("App.java", source)]);
        assert!(has_edge(&calls, "App.main", "Util.twice"));
    }

    #[test]
    fn test_unknown_receivers_are_filtered() {
        let source = r#"
class App {
    void main() { System.out.println("hi"); list.add(1); }
}
"#;
        let (_, calls) = extract(&JavaExtractor, &[("App.java", source)]);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_interface_methods_are_owned() {
        let source = "interface Shape { double area(); }";
        let (symbols, _) = extract(&JavaExtractor, &[("Shape.java", source)]);
        assert_eq!(ids(&symbols), vec!["Shape.area"]);
    }
}
