//! C language extractor.
//!
//! Handles .c files. C has no classes, but struct definitions are
//! treated as owners: once a struct with a body has been seen, the
//! functions that follow are qualified with its name until the next
//! struct. Member calls through `ptr->fn()` or `value.fn()` resolve only
//! when the receiver's declared struct type is known.

use super::context::{traverse, Context, Scope};
use super::LanguageExtractor;
use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tracing::debug;
use tree_sitter::{Language, Node, Tree};

pub struct CExtractor;

impl LanguageExtractor for CExtractor {
    fn language(&self) -> Language {
        tree_sitter_c::LANGUAGE.into()
    }

    fn extensions(&self) -> &[&str] {
        &["c"]
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

/// `struct Name { ... }` switches the flat owner slot to `Name`. Forward
/// declarations and `struct Name` used as a type do not.
fn enter_struct(node: Node<'_>, cx: &mut Context<'_>) {
    if node.child_by_field_name("body").is_none() {
        return;
    }
    if let Some(name) = cx.field_text(node, "name") {
        cx.replace_owner(name);
    }
}

/// Follows the declarator chain of a definition or declaration down to
/// the identifier it names.
fn declared_identifier(mut node: Node<'_>) -> Option<Node<'_>> {
    loop {
        if node.kind() == "identifier" {
            return Some(node);
        }
        node = node
            .child_by_field_name("declarator")
            .or_else(|| node.named_child(0))?;
    }
}

fn function_name<'a>(node: Node<'_>, cx: &Context<'a>) -> Option<&'a str> {
    let declarator = node.child_by_field_name("declarator")?;
    declared_identifier(declarator).map(|id| cx.text(id))
}

fn definition_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    match node.kind() {
        "struct_specifier" => enter_struct(node, cx),
        "function_definition" => {
            if let Some(name) = function_name(node, cx) {
                cx.define_member(name);
            }
        }
        _ => {}
    }
    Scope::Flat
}

fn call_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    match node.kind() {
        "struct_specifier" => enter_struct(node, cx),
        "function_definition" => {
            if let Some(name) = function_name(node, cx) {
                let id = cx.qualify(name);
                cx.enter_function(id);
            }
        }
        "declaration" | "parameter_declaration" => bind_declaration(node, cx),
        "call_expression" => resolve_call(node, cx),
        _ => {}
    }
    Scope::Flat
}

/// Struct type named by a declaration's type node: either a bare
/// `type_identifier` (typedef) or the name inside `struct Name`.
fn declared_type<'a>(node: Node<'_>, cx: &Context<'a>) -> Option<&'a str> {
    let type_node = node.child_by_field_name("type")?;
    if type_node.kind() == "type_identifier" {
        return Some(cx.text(type_node));
    }
    let mut cursor = type_node.walk();
    let found = type_node
        .children(&mut cursor)
        .find(|c| c.kind() == "type_identifier");
    found.map(|n| cx.text(n))
}

/// `struct Point *p;` and `Point p` parameters bind `p` to `Point`.
fn bind_declaration(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(type_name) = declared_type(node, cx) else {
        return;
    };

    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        // A function prototype declares no variable.
        if declarator.kind() == "function_declarator" {
            continue;
        }
        if let Some(variable) = declared_identifier(declarator) {
            let variable = cx.text(variable);
            cx.bind(variable, type_name);
        }
    }
}

fn resolve_call(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };

    match function.kind() {
        "field_expression" => {
            let (Some(argument), Some(field)) = (
                cx.field_text(function, "argument"),
                cx.field_text(function, "field"),
            ) else {
                return;
            };
            match cx.binding(argument) {
                Some(type_name) => {
                    let callee = qualify(Some(type_name), field);
                    cx.record_call(callee);
                }
                None => debug!("unresolved receiver {} for {}", argument, field),
            }
        }
        "identifier" => {
            let name = cx.text(function);
            if cx.is_known(name) {
                cx.record_call(name.to_string());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::testing::{extract, has_edge, ids};
    use super::*;

    #[test]
    fn test_plain_functions() {
        let source = r#"
static int square(int x) { return x * x; }

int main(void) {
    return square(3);
}
"#;
        let (symbols, calls) = extract(&CExtractor, &[("main.c", source)]);

        assert_eq!(ids(&symbols), vec!["square", "main"]);
        assert_eq!(calls, vec![CallEdge::new("main", "square")]);
    }

    #[test]
    fn test_pointer_returning_function_is_named() {
        let source = "char *dup(const char *s) { return 0; }\n";
        let (symbols, _) = extract(&CExtractor, &[("dup.c", source)]);
        assert_eq!(ids(&symbols), vec!["dup"]);
    }

    #[test]
    fn test_struct_becomes_flat_owner() {
        let source = r#"
void before(void) {}

struct Point { int x; int y; };

void move(struct Point *p) {}

struct Point *origin(void) { return 0; }
"#;
        let (symbols, _) = extract(&CExtractor, &[("point.c", source)]);

        assert_eq!(ids(&symbols), vec!["before", "Point.move", "Point.origin"]);
        assert_eq!(
            symbols.resolve("Point.move").unwrap().owner.as_deref(),
            Some("Point")
        );
    }

    #[test]
    fn test_member_call_through_typed_pointer() {
        let source = r#"
struct Op { int (*run)(int); };

int run(int x) { return x; }

int apply(struct Op *op) {
    return op->run(1);
}
"#;
        let (_, calls) = extract(&CExtractor, &[("op.c", source)]);
        assert!(has_edge(&calls, "Op.apply", "Op.run"));
    }

    #[test]
    fn test_unbound_member_call_is_dropped() {
        let source = r#"
void tick(void) {}

void loop(void) {
    handler.tick();
    tick();
}
"#;
        let (_, calls) = extract(&CExtractor, &[("loop.c", source)]);
        assert_eq!(calls, vec![CallEdge::new("loop", "tick")]);
    }

    #[test]
    fn test_typedef_named_locals_bind_to_their_struct() {
        let source = r#"
typedef struct Timer { int ticks; } Timer;

void reset(Timer *t) {}

void tick(void) {
    Timer timer;
    timer.reset();
}
"#;
        let (symbols, calls) = extract(&CExtractor, &[("timer.c", source)]);

        assert_eq!(ids(&symbols), vec!["Timer.reset", "Timer.tick"]);
        assert_eq!(calls, vec![CallEdge::new("Timer.tick", "Timer.reset")]);
    }
}
