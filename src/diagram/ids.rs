//! Unique, diagram-safe type identifiers

use crate::error::{Error, Result};
use crate::metadata::{TypeDef, TypeRef, TypeSystem};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Allocates short identifiers for selected types and derived ones for everything else
#[derive(Debug, Default)]
pub struct IdAllocator {
    /// Reflection name of a definition -> id
    ids: HashMap<String, String>,
    taken: HashSet<String>,
}

impl IdAllocator {
    /// Assign ids to `types`, which must be supplied in a stable order.
    ///
    /// Types with a unique short name get that name; the others are numbered
    /// in supplied order, starting at 1.
    pub fn assign<'a>(types: impl IntoIterator<Item = &'a TypeDef>) -> Self {
        let mut groups: IndexMap<&str, Vec<&TypeDef>> = IndexMap::new();
        for def in types {
            groups.entry(def.name.as_str()).or_default().push(def);
        }

        let mut allocator = Self::default();

        for (name, defs) in groups.iter().filter(|(_, defs)| defs.len() == 1) {
            allocator.insert(&defs[0].full_name, sanitize(name));
        }

        for (name, defs) in groups.iter().filter(|(_, defs)| defs.len() > 1) {
            for (i, def) in defs.iter().enumerate() {
                allocator.insert(&def.full_name, format!("{}{}", sanitize(name), i + 1));
            }
        }

        allocator
    }

    /// The id of an already known definition
    pub fn get(&self, full_name: &str) -> Option<&str> {
        self.ids.get(full_name).map(String::as_str)
    }

    /// The id of any type reference that can be a diagram node.
    /// Closed generics share the id of their open definition.
    pub fn id_of(&mut self, ts: &dyn TypeSystem, ty: &TypeRef) -> Result<String> {
        match ty {
            TypeRef::Type(name) | TypeRef::Generic {
                definition: name, ..
            } => self.definition_id(ts, name),
            TypeRef::TypeParameter(name) => Ok(sanitize(name)),
            TypeRef::Array(_) | TypeRef::ByReference(_) | TypeRef::Dynamic => Err(
                Error::inconsistency(format!("no identity for type reference {ty:?}")),
            ),
        }
    }

    fn definition_id(&mut self, ts: &dyn TypeSystem, full_name: &str) -> Result<String> {
        if let Some(id) = self.ids.get(full_name) {
            return Ok(id.clone());
        }

        let def = ts.resolve(full_name)?;
        let mut id = sanitize(&display_full_name(full_name));
        for parameter in &def.type_parameters {
            id.push('_');
            id.push_str(&sanitize(parameter));
        }

        Ok(self.insert(full_name, id))
    }

    fn insert(&mut self, full_name: &str, id: String) -> String {
        let mut id = id;
        while self.taken.contains(&id) {
            id.push('_');
        }

        self.taken.insert(id.clone());
        self.ids.insert(full_name.to_string(), id.clone());
        id
    }
}

/// Replace everything but word characters with `_`
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Dotted name without generic arity, e.g. `MyApp.Outer.Store` for `MyApp.Outer+Store`1`
pub fn display_full_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '+' => result.push('.'),
            '`' => {
                while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    chars.next();
                }
            }
            c => result.push(c),
        }
    }

    result
}
