//! JavaScript language extractor.
//!
//! Handles .js, .mjs and .cjs files. Class methods are owned by their
//! class; `function` declarations are free functions. `this` resolves
//! to the enclosing class and `const x = new T()` binds `x` to `T`.

use super::context::{traverse, Context, Scope};
use super::LanguageExtractor;
use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use tree_sitter::{Language, Node, Tree};

pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        tree_sitter_javascript::LANGUAGE.into()
    }

    fn extensions(&self) -> &[&str] {
        &["js", "mjs", "cjs"]
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
        "class_declaration" => {
            let name = cx.field_text(node, "name");
            return cx.enter_owner(name);
        }
        "method_definition" => {
            if let Some(name) = cx.field_text(node, "name") {
                cx.define_member(name);
            }
        }
        "function_declaration" => {
            if let Some(name) = cx.field_text(node, "name") {
                cx.define_free(name);
            }
        }
        _ => {}
    }
    Scope::Flat
}

fn call_step(node: Node<'_>, cx: &mut Context<'_>) -> Scope {
    match node.kind() {
        "class_declaration" => {
            let name = cx.field_text(node, "name");
            return cx.enter_owner(name);
        }
        "method_definition" => {
            if let Some(name) = cx.field_text(node, "name") {
                let id = cx.qualify(name);
                cx.enter_function(id);
            }
        }
        "function_declaration" => {
            if let Some(name) = cx.field_text(node, "name") {
                cx.enter_function(name.to_string());
            }
        }
        "variable_declarator" => {
            if let (Some(name), Some(value)) = (
                node.child_by_field_name("name"),
                node.child_by_field_name("value"),
            ) {
                bind_new(name, value, cx);
            }
        }
        "assignment_expression" => {
            if let (Some(left), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) {
                bind_new(left, right, cx);
            }
        }
        "call_expression" => resolve_call(node, cx),
        _ => {}
    }
    Scope::Flat
}

/// `x = new T(...)` binds `x` to `T`.
fn bind_new(target: Node<'_>, value: Node<'_>, cx: &mut Context<'_>) {
    if target.kind() != "identifier" || value.kind() != "new_expression" {
        return;
    }
    let constructor = value
        .child_by_field_name("constructor")
        .or_else(|| value.named_child(0));
    if let Some(constructor) = constructor {
        let variable = cx.text(target);
        let type_name = cx.text(constructor);
        cx.bind(variable, type_name);
    }
}

fn resolve_call(node: Node<'_>, cx: &mut Context<'_>) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };

    let callee = if function.kind() == "member_expression" {
        let (Some(object), Some(property)) = (
            function.child_by_field_name("object"),
            function.child_by_field_name("property"),
        ) else {
            return;
        };
        let object = cx.text(object);
        let method = cx.text(property);
        match cx.receiver_type(object, "this") {
            Some(type_name) => qualify(Some(&type_name), method),
            None => qualify(Some(object), method),
        }
    } else {
        cx.text(function).to_string()
    };

    if !callee.is_empty() {
        cx.record_call(callee);
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::testing::{extract, has_edge, ids};
    use super::*;

    #[test]
    fn test_class_methods_and_this() {
        let source = r#"
class Cart {
  add(item) {
    this.recalculate();
  }
  recalculate() {}
}
"#;
        let (symbols, calls) = extract(&JavaScriptExtractor, &[("cart.js", source)]);

        assert_eq!(ids(&symbols), vec!["Cart.add", "Cart.recalculate"]);
        assert_eq!(calls, vec![CallEdge::new("Cart.add", "Cart.recalculate")]);
    }

    #[test]
    fn test_new_expression_binds_variable_type() {
        let app = r#"
function checkout() {
  const cart = new Cart();
  cart.add(1);
  let logger;
  logger = new Logger();
  logger.info("ok");
  format();
}

function format() {}
"#;
        let lib = r#"
class Cart { add(item) {} }
class Logger { info(msg) {} }
"#;
        let (symbols, calls) =
            extract(&JavaScriptExtractor, &[("app.js", app), ("lib.js", lib)]);

        assert!(symbols.contains("checkout"));
        assert!(has_edge(&calls, "checkout", "Cart.add"));
        assert!(has_edge(&calls, "checkout", "Logger.info"));
        assert!(has_edge(&calls, "checkout", "format"));
    }

    #[test]
    fn test_unbound_receivers_do_not_resolve() {
        let source = r#"
class View {
  render() {
    console.log("x");
    this.el.focus();
  }
}
"#;
        let (_, calls) = extract(&JavaScriptExtractor, &[("view.js", source)]);
        assert!(calls.is_empty());
    }
}
