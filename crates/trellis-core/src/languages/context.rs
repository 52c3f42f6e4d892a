//! Traversal context shared by every extractor.
//!
//! A `Context` carries all the mutable state of one walk over one file:
//! the owner scope, the flat current-function slot, the variable type
//! bindings and whatever the walk has produced so far. Extractors supply
//! a `Step` function that looks at one node at a time and updates the
//! context; `traverse` drives it depth-first over the tree.

use crate::definition::{qualify, CallEdge, Definition};
use crate::symbol_table::SymbolTable;
use std::collections::HashMap;
use tracing::debug;
use tree_sitter::Node;

/// What a step did to the owner scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Nothing to undo after the children are walked.
    Flat,
    /// An owner was pushed and must be popped after the children.
    Owner,
}

/// Per-node visitor used by `traverse`.
pub(crate) type Step = fn(Node<'_>, &mut Context<'_>) -> Scope;

/// Walks `node` and all its descendants in document order.
pub(crate) fn traverse(node: Node<'_>, cx: &mut Context<'_>, step: Step) {
    let scope = step(node, cx);

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        traverse(child, cx, step);
    }

    if scope == Scope::Owner {
        cx.leave_owner();
    }
}

/// State of one walk over one file.
pub(crate) struct Context<'a> {
    source: &'a str,
    file_path: &'a str,
    symbols: Option<&'a SymbolTable>,

    /// Owner scope. `None` entries are owners without a resolvable name.
    owners: Vec<Option<String>>,

    /// Most recently entered function: the caller for every call site
    /// until the next function definition.
    current_function: Option<String>,

    /// Local variable name to inferred owning type.
    bindings: HashMap<String, String>,

    /// Variable name to the qualified method it was assigned from.
    aliases: HashMap<String, String>,

    pub definitions: Vec<Definition>,
    pub calls: Vec<CallEdge>,
}

impl<'a> Context<'a> {
    /// Context for the definition pass.
    pub fn for_definitions(source: &'a str, file_path: &'a str) -> Self {
        Self::new(source, file_path, None)
    }

    /// Context for the call pass, resolving against `symbols`.
    pub fn for_calls(source: &'a str, symbols: &'a SymbolTable) -> Self {
        Self::new(source, "", Some(symbols))
    }

    fn new(source: &'a str, file_path: &'a str, symbols: Option<&'a SymbolTable>) -> Self {
        Self {
            source,
            file_path,
            symbols,
            owners: Vec::new(),
            current_function: None,
            bindings: HashMap::new(),
            aliases: HashMap::new(),
            definitions: Vec::new(),
            calls: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Source text
    // ------------------------------------------------------------------

    /// Gets text content of a node.
    pub fn text(&self, node: Node<'_>) -> &'a str {
        let source: &'a str = self.source;
        source.get(node.byte_range()).unwrap_or("")
    }

    /// Gets the text of a named field, if the node has it.
    pub fn field_text(&self, node: Node<'_>, field: &str) -> Option<&'a str> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    // ------------------------------------------------------------------
    // Owner scope
    // ------------------------------------------------------------------

    /// The innermost owner, if it has a name.
    pub fn owner(&self) -> Option<&str> {
        self.owners.last().and_then(|o| o.as_deref())
    }

    /// Pushes an owner scope that `traverse` pops after the children.
    pub fn enter_owner(&mut self, name: Option<&str>) -> Scope {
        self.owners.push(name.map(str::to_string));
        Scope::Owner
    }

    fn leave_owner(&mut self) {
        self.owners.pop();
    }

    /// Replaces the whole owner scope with a single flat slot that stays
    /// in effect until the next replacement or the end of the file.
    pub fn replace_owner(&mut self, name: &str) {
        self.owners.clear();
        self.owners.push(Some(name.to_string()));
    }

    /// Qualifies a member name with the current owner.
    pub fn qualify(&self, name: &str) -> String {
        qualify(self.owner(), name)
    }

    // ------------------------------------------------------------------
    // Definitions and the current-function slot
    // ------------------------------------------------------------------

    /// Records a definition owned by the current owner.
    pub fn define_member(&mut self, name: &str) {
        let owner = self.owner().map(str::to_string);
        self.define_in(owner.as_deref(), name);
    }

    /// Records a free function, ignoring the owner scope.
    pub fn define_free(&mut self, name: &str) {
        self.define_in(None, name);
    }

    /// Records a definition with an explicit owner.
    pub fn define_in(&mut self, owner: Option<&str>, name: &str) {
        let definition = Definition::new(name, owner, self.file_path);
        self.current_function = Some(definition.id.clone());
        self.definitions.push(definition);
    }

    /// Makes `id` the caller for the following call sites.
    pub fn enter_function(&mut self, id: String) {
        self.current_function = Some(id);
    }

    pub fn current_function(&self) -> Option<&str> {
        self.current_function.as_deref()
    }

    // ------------------------------------------------------------------
    // Variable bindings
    // ------------------------------------------------------------------

    /// Binds a local variable to an inferred type.
    pub fn bind(&mut self, variable: &str, type_name: &str) {
        self.bindings
            .insert(variable.to_string(), type_name.to_string());
    }

    pub fn binding(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(String::as_str)
    }

    /// Records that `variable` holds the method `target`.
    pub fn alias(&mut self, variable: &str, target: String) {
        self.aliases.insert(variable.to_string(), target);
    }

    pub fn aliased(&self, variable: &str) -> Option<&str> {
        self.aliases.get(variable).map(String::as_str)
    }

    /// Resolves a call receiver to a type name.
    ///
    /// The self keyword maps to the current owner, a bound variable maps
    /// to its inferred type. Anything else is unresolved.
    pub fn receiver_type(&self, receiver: &str, self_keyword: &str) -> Option<String> {
        if receiver == self_keyword {
            return self.owner().map(str::to_string);
        }
        self.binding(receiver).map(str::to_string)
    }

    // ------------------------------------------------------------------
    // Symbol lookups (call pass only)
    // ------------------------------------------------------------------

    pub fn is_known(&self, id: &str) -> bool {
        self.symbols.map_or(false, |s| s.contains(id))
    }

    pub fn is_owner(&self, name: &str) -> bool {
        self.symbols.map_or(false, |s| s.is_owner(name))
    }

    /// Resolves an unqualified call inside the current owner: the owner's
    /// member if it is known, the bare global name otherwise.
    pub fn member_or_global(&self, name: &str) -> String {
        if let Some(owner) = self.owner() {
            let member = qualify(Some(owner), name);
            if self.is_known(&member) {
                return member;
            }
        }
        name.to_string()
    }

    /// Records a call from the current function.
    ///
    /// Calls outside any function and self-calls are never recorded.
    pub fn record_call(&mut self, callee: String) {
        match self.current_function.as_deref() {
            Some(caller) if caller != callee => {
                self.calls.push(CallEdge::new(caller, callee));
            }
            Some(_) => {}
            None => debug!("call to {} outside any function", callee),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_stack_and_qualify() {
        let mut cx = Context::for_definitions("", "a.py");
        assert_eq!(cx.qualify("run"), "run");

        cx.enter_owner(Some("Outer"));
        cx.enter_owner(Some("Inner"));
        assert_eq!(cx.qualify("run"), "Inner.run");
        cx.leave_owner();
        assert_eq!(cx.qualify("run"), "Outer.run");

        cx.enter_owner(None);
        assert_eq!(cx.qualify("run"), "run");
    }

    #[test]
    fn test_replace_owner_is_flat() {
        let mut cx = Context::for_definitions("", "a.c");
        cx.replace_owner("Point");
        cx.replace_owner("Line");
        assert_eq!(cx.owner(), Some("Line"));
        cx.define_member("draw");
        assert_eq!(cx.definitions[0].id, "Line.draw");
        assert_eq!(cx.definitions[0].owner.as_deref(), Some("Line"));
    }

    #[test]
    fn test_record_call_skips_self_loops_and_orphans() {
        let symbols = SymbolTable::new();
        let mut cx = Context::for_calls("", &symbols);

        cx.record_call("orphan".to_string());
        assert!(cx.calls.is_empty());

        cx.enter_function("f".to_string());
        cx.record_call("f".to_string());
        cx.record_call("g".to_string());
        assert_eq!(cx.calls, vec![CallEdge::new("f", "g")]);
    }

    #[test]
    fn test_receiver_type_precedence() {
        let symbols = SymbolTable::new();
        let mut cx = Context::for_calls("", &symbols);
        assert_eq!(cx.receiver_type("this", "this"), None);

        cx.enter_owner(Some("Cart"));
        cx.bind("repo", "Repository");
        assert_eq!(cx.receiver_type("this", "this").as_deref(), Some("Cart"));
        assert_eq!(
            cx.receiver_type("repo", "this").as_deref(),
            Some("Repository")
        );
        assert_eq!(cx.receiver_type("other", "this"), None);
    }
}
