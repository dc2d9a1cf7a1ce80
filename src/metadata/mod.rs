//! Assembly metadata consumed by the diagram builder
//!
//! The builder never talks to a metadata reader directly. It runs over a
//! [`TypeSystem`], which [`Snapshot`] implements from a JSON export.

pub mod docs;
pub mod hierarchy;
pub mod known;
pub mod snapshot;
pub mod types;

pub use docs::{DocumentationProvider, XmlDocumentationFile};
pub use hierarchy::{Ancestor, Declared, TypeMembers};
pub use snapshot::Snapshot;
pub use types::{
    Accessibility, AssemblyInfo, Field, Method, Parameter, Property, Substitution, TypeDef,
    TypeKind, TypeRef,
};

use crate::error::{Error, Result};

/// Read access to the type definitions of one module and everything it references
pub trait TypeSystem {
    /// The assembly the module belongs to
    fn assembly(&self) -> &AssemblyInfo;

    /// Type definitions of the main module, in module order
    fn type_definitions(&self) -> &[TypeDef];

    /// Look up any known definition by reflection name
    fn find_type(&self, full_name: &str) -> Option<&TypeDef>;

    /// Look up a definition that must exist
    fn resolve(&self, full_name: &str) -> Result<&TypeDef> {
        self.find_type(full_name)
            .ok_or_else(|| Error::inconsistency(format!("unresolved type '{full_name}'")))
    }
}
