use crate::definition::Definition;
use std::collections::{HashMap, HashSet};

/// The run-wide table of known definitions.
///
/// Maps qualified identifiers to their Definition. Built file by file
/// during the definition pass and read-only during the call pass.
/// Iteration follows first-insertion order so exports are stable for an
/// unchanged walk order.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    /// Definitions in first-insertion order.
    definitions: Vec<Definition>,

    /// Map of qualified id to its slot in `definitions`.
    by_id: HashMap<String, usize>,

    /// Every owner name that owns at least one definition.
    owners: HashSet<String>,
}

impl SymbolTable {
    /// Creates a new empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    ///
    /// A repeated qualified id replaces the earlier entry in place: the
    /// last writer wins and the earlier file loses the symbol. Duplicate
    /// names across files collide silently.
    pub fn insert(&mut self, definition: Definition) {
        if let Some(owner) = &definition.owner {
            self.owners.insert(owner.clone());
        }

        match self.by_id.get(&definition.id) {
            Some(&slot) => self.definitions[slot] = definition,
            None => {
                self.by_id
                    .insert(definition.id.clone(), self.definitions.len());
                self.definitions.push(definition);
            }
        }
    }

    /// Merges every definition of another table, in its order.
    pub fn extend(&mut self, definitions: impl IntoIterator<Item = Definition>) {
        for definition in definitions {
            self.insert(definition);
        }
    }

    /// Looks up a qualified identifier.
    pub fn resolve(&self, id: &str) -> Option<&Definition> {
        self.by_id.get(id).map(|&slot| &self.definitions[slot])
    }

    /// Whether a qualified identifier is known.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Whether `name` owns at least one definition.
    pub fn is_owner(&self, name: &str) -> bool {
        self.owners.contains(name)
    }

    /// Iterates over definitions in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
