//! C++ language extractor.
//!
//! Handles .cpp, .cc and .cxx files. A function's identity comes from
//! the identifier inside its `function_declarator`, so in-class
//! declarations, inline definitions and out-of-class `Owner::name`
//! definitions all map to the same `Owner.name` id.

use super::context::{traverse, Context, Scope};
use super::LanguageExtractor;
use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tree_sitter::{Language, Node, Tree};

pub struct CppExtractor;

impl LanguageExtractor for CppExtractor {
    fn language(&self) -> Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn extensions(&self) -> &[&str] {
        &["cpp", "cc", "cxx"]
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

/// Name carried by a `function_declarator`.
enum FunctionName<'a> {
    /// `name` inside the current owner, or free.
    Plain(&'a str),
    /// `Owner::name` written out of class.
    Scoped { owner: &'a str, name: &'a str },
}

fn function_name<'a>(declarator: Node<'_>, cx: &Context<'a>) -> Option<FunctionName<'a>> {
    let mut cursor = declarator.walk();
    let found = declarator
        .children(&mut cursor)
        .find(|c| matches!(c.kind(), "field_identifier" | "identifier" | "qualified_identifier"))?;

    match split_qualified(cx.text(found)) {
        (Some(owner), name) => Some(FunctionName::Scoped { owner, name }),
        (None, name) => Some(FunctionName::Plain(name)),
    }
}

/// Splits a `::` path into its owning segment and name, keeping only
/// the last two segments: `app::Engine::start` -> (`Engine`, `start`).
/// A path with no owner (`start`, `::start`) yields `None`.
fn split_qualified(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once("::") {
        Some((scope, name)) => {
            let owner = scope.rsplit("::").next().unwrap_or(scope).trim();
            if owner.is_empty() {
                (None, name.trim())
            } else {
                (Some(owner), name.trim())
            }
        }
        None => (None, path.trim()),
    }
}

/// The `function_declarator` under a definition, through any pointer or
/// reference declarators wrapping it.
fn function_declarator(definition: Node<'_>) -> Option<Node<'_>> {
    let mut node = definition.child_by_field_name("declarator")?;
    loop {
        if node.kind() == "function_declarator" {
            return Some(node);
        }
        node = node.child_by_field_name("declarator")?;
    }
}

fn is_owner_kind(kind: &str) -> bool {
    kind == "class_specifier" || kind == "struct_specifier"
}

fn definition_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    if is_owner_kind(node.kind()) {
        let name = cx.field_text(node, "name");
        return cx.enter_owner(name);
    }
    if node.kind() == "function_declarator" {
        match function_name(node, cx) {
            Some(FunctionName::Plain(name)) => cx.define_member(name),
            Some(FunctionName::Scoped { owner, name }) => cx.define_in(Some(owner), name),
            None => {}
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
        // `Owner::name() { ... }` walks its body inside `Owner`.
        "function_definition" => {
            let scoped = function_declarator(node).and_then(|d| function_name(d, cx));
            if let Some(FunctionName::Scoped { owner, .. }) = scoped {
                return cx.enter_owner(Some(owner));
            }
        }
        "function_declarator" => match function_name(node, cx) {
            Some(FunctionName::Plain(name)) => {
                let id = cx.qualify(name);
                cx.enter_function(id);
            }
            Some(FunctionName::Scoped { owner, name }) => {
                cx.enter_function(qualify(Some(owner), name));
            }
            None => {}
        },
        "declaration" => bind_declaration(node, cx),
        "call_expression" => resolve_call(node, cx),
        _ => {}
    }
    Scope::Flat
}

/// Unwraps pointer, reference and init declarators down to the variable.
fn declared_variable(mut declarator: Node<'_>) -> Option<Node<'_>> {
    loop {
        match declarator.kind() {
            "identifier" => return Some(declarator),
            "init_declarator" | "pointer_declarator" | "reference_declarator" => {
                declarator = declarator
                    .child_by_field_name("declarator")
                    .or_else(|| declarator.named_child(0))?;
            }
            _ => return None,
        }
    }
}

fn type_text<'a>(node: Node<'_>, cx: &Context<'a>) -> &'a str {
    match node.kind() {
        "template_type" => cx.field_text(node, "name").unwrap_or_else(|| cx.text(node)),
        _ => cx.text(node),
    }
}

/// `T x;`, `T* x = ...;` bind `x` to `T`; a `new U()` initializer wins
/// over the declared type.
fn bind_declaration(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(declared) = node.child_by_field_name("type").map(|t| type_text(t, cx)) else {
        return;
    };

    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        let Some(variable) = declared_variable(declarator) else {
            continue;
        };
        let constructed = declarator
            .child_by_field_name("value")
            .filter(|v| v.kind() == "new_expression")
            .and_then(|v| v.child_by_field_name("type"))
            .map(|t| type_text(t, cx));

        let variable = cx.text(variable);
        cx.bind(variable, constructed.unwrap_or(declared));
    }
}

fn resolve_call(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };

    let callee = match function.kind() {
        "field_expression" => {
            let (Some(object), Some(field)) = (
                function.child_by_field_name("argument"),
                function.child_by_field_name("field"),
            ) else {
                return;
            };
            let object = cx.text(object);
            let method = cx.text(field);
            match cx.receiver_type(object, "this") {
                Some(type_name) => qualify(Some(&type_name), method),
                None => qualify(Some(object), method),
            }
        }
        "identifier" => cx.member_or_global(cx.text(function)),
        "qualified_identifier" => match split_qualified(cx.text(function)) {
            (Some(owner), name) => qualify(Some(owner), name),
            (None, name) => name.to_string(),
        },
        _ => cx.text(function).to_string(),
    };
    cx.record_call(callee);
}

#[cfg(test)]
mod tests {
    use super::super::context::testing::{extract, has_edge, ids};
    use super::*;

    #[test]
    fn test_inline_methods_are_owned() {
        let source = r#"
class Engine {
public:
    void start() { ignite(); }
    void ignite() {}
};
"#;
        let (symbols, calls) = extract(&CppExtractor, &[("engine.cpp", source)]);

        assert_eq!(ids(&symbols), vec!["Engine.start", "Engine.ignite"]);
        assert!(has_edge(&calls, "Engine.start", "Engine.ignite"));
    }

    #[test]
    fn test_out_of_class_definitions_and_typed_locals() {
        let source = r#"
class Engine {
public:
    void start();
};

void Engine::start() {}

int main() {
    Engine engine;
    engine.start();
    Engine* spare = new Engine();
    spare->start();
    return 0;
}
"#;
        let (symbols, calls) = extract(&CppExtractor, &[("main.cpp", source)]);

        assert!(symbols.contains("Engine.start"));
        assert!(symbols.contains("main"));
        assert_eq!(
            calls,
            vec![
                CallEdge::new("main", "Engine.start"),
                CallEdge::new("main", "Engine.start"),
            ]
        );
    }

    #[test]
    fn test_this_and_scoped_calls() {
        let source = r#"
struct Counter {
    void bump() { this->reset(); Counter::log(); }
    void reset() {}
    static void log() {}
};
"#;
        let (_, calls) = extract(&CppExtractor, &[("counter.cpp", source)]);

        assert!(has_edge(&calls, "Counter.bump", "Counter.reset"));
        assert!(has_edge(&calls, "Counter.bump", "Counter.log"));
    }

    #[test]
    fn test_bare_call_falls_back_to_free_function() {
        let source = r#"
void helper() {}

class Job {
    void run() { helper(); }
};
"#;
        let (_, calls) = extract(&CppExtractor, &[("job.cpp", source)]);
        assert_eq!(calls, vec![CallEdge::new("Job.run", "helper")]);
    }

    #[test]
    fn test_out_of_class_bodies_resolve_against_their_owner() {
        let source = r#"
class Engine {
    void start();
    void ignite();
};

void Engine::ignite() {}

void Engine::start() {
    this->ignite();
    ignite();
}

void after() { ignite(); }
"#;
        let (symbols, calls) = extract(&CppExtractor, &[("engine.cpp", source)]);

        assert_eq!(ids(&symbols), vec!["Engine.start", "Engine.ignite", "after"]);
        assert_eq!(
            calls,
            vec![
                CallEdge::new("Engine.start", "Engine.ignite"),
                CallEdge::new("Engine.start", "Engine.ignite"),
            ]
        );
    }

    #[test]
    fn test_nested_namespace_paths_keep_last_two_segments() {
        let source = r#"
namespace app {
class Engine {
public:
    void start();
};
}

void app::Engine::start() {}

void run() {
    app::Engine::start();
}
"#;
        let (symbols, calls) = extract(&CppExtractor, &[("app.cpp", source)]);

        assert_eq!(ids(&symbols), vec!["Engine.start", "run"]);
        assert_eq!(calls, vec![CallEdge::new("run", "Engine.start")]);
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("a::B::f"), (Some("B"), "f"));
        assert_eq!(split_qualified("B::f"), (Some("B"), "f"));
        assert_eq!(split_qualified("::f"), (None, "f"));
        assert_eq!(split_qualified("f"), (None, "f"));
    }
}
