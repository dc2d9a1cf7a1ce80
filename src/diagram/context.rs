//! Per-run state shared by the diagram builder's components

use crate::diagram::ids::IdAllocator;
use crate::diagram::names::NameFormatter;
use crate::error::Result;
use crate::metadata::{TypeDef, TypeRef, TypeSystem};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Caches and accumulators for one generation run.
/// Every cache entry is written once and read many times.
pub struct DiagramContext<'a> {
    pub ts: &'a dyn TypeSystem,
    selected: HashSet<String>,
    module_types: HashSet<String>,
    pub(crate) ids: IdAllocator,
    pub(crate) names: NameFormatter,
    /// Outside reference id -> display name, in registration order
    pub(crate) outside_references: IndexMap<String, String>,
}

impl<'a> DiagramContext<'a> {
    /// Create a context for `selected`, which must be in a stable order
    pub fn new(ts: &'a dyn TypeSystem, selected: &[&'a TypeDef]) -> Self {
        Self {
            ts,
            selected: selected.iter().map(|d| d.full_name.clone()).collect(),
            module_types: ts
                .type_definitions()
                .iter()
                .map(|d| d.full_name.clone())
                .collect(),
            ids: IdAllocator::assign(selected.iter().copied()),
            names: NameFormatter::new(),
            outside_references: IndexMap::new(),
        }
    }

    /// Whether `ty` references a selected definition directly
    pub fn is_selected(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Type(name) if self.selected.contains(name))
    }

    /// Whether a definition is part of the diagram
    pub fn is_selected_definition(&self, full_name: &str) -> bool {
        self.selected.contains(full_name)
    }

    /// Whether `ty` references a type of the module that did not make the selection
    pub fn is_dropped_module_type(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Type(name)
            if self.module_types.contains(name) && !self.selected.contains(name))
    }

    pub fn id_of(&mut self, ty: &TypeRef) -> Result<String> {
        self.ids.id_of(self.ts, ty)
    }

    pub fn name_of(&mut self, ty: &TypeRef) -> Result<String> {
        self.names.name_of(self.ts, ty)
    }

    pub fn outside_references(&self) -> &IndexMap<String, String> {
        &self.outside_references
    }

    pub fn into_outside_references(self) -> IndexMap<String, String> {
        self.outside_references
    }
}
