// JSON snapshot of an assembly's type metadata
//
// The snapshot is the frozen input of one generation run: the module's own
// type definitions in module order plus the external definitions they
// reference. Every type reference is validated on load so that the diagram
// builder never meets a dangling reference in practice.

use crate::error::{Error, Result};
use crate::metadata::known;
use crate::metadata::types::{AssemblyInfo, TypeDef, TypeRef};
use crate::metadata::TypeSystem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Serialized form of a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SnapshotFile {
    assembly: AssemblyInfo,
    #[serde(default)]
    types: Vec<TypeDef>,
    #[serde(default)]
    references: Vec<TypeDef>,
}

/// An immutable, indexed snapshot of assembly metadata
#[derive(Debug, Clone)]
pub struct Snapshot {
    assembly: AssemblyInfo,
    types: Vec<TypeDef>,
    references: Vec<TypeDef>,
    /// Reflection name -> (is module type, index)
    index: HashMap<String, (bool, usize)>,
}

impl Snapshot {
    /// Build a snapshot from module types and referenced external types.
    /// Built-in core library definitions fill in whatever `references` omits.
    pub fn new(assembly: AssemblyInfo, types: Vec<TypeDef>, references: Vec<TypeDef>) -> Self {
        let mut types = types;
        let mut references = references;

        for def in types.iter_mut().chain(references.iter_mut()) {
            def.derive_names();
        }

        let mut index = HashMap::new();
        for (i, def) in types.iter().enumerate() {
            index.entry(def.full_name.clone()).or_insert((true, i));
        }
        for (i, def) in references.iter().enumerate() {
            index.entry(def.full_name.clone()).or_insert((false, i));
        }

        for def in known::builtin_definitions() {
            if !index.contains_key(&def.full_name) {
                index.insert(def.full_name.clone(), (false, references.len()));
                references.push(def);
            }
        }

        Self {
            assembly,
            types,
            references,
            index,
        }
    }

    /// Load and validate a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents).map_err(|e| match e {
            Error::Json(json) => Error::metadata(path, json.to_string()),
            Error::Inconsistency(message) | Error::Other(message) => Error::metadata(path, message),
            other => other,
        })
    }

    /// Parse and validate a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        let snapshot = Self::new(file.assembly, file.types, file.references);
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check that every type reference resolves to a known definition
    pub fn validate(&self) -> Result<()> {
        for def in self.types.iter().chain(self.references.iter()) {
            let mut names = Vec::new();

            if let Some(declaring) = &def.declaring_type {
                names.push(declaring.as_str());
            }
            for base in &def.base_types {
                base.collect_definitions(&mut names);
            }
            for property in &def.properties {
                property.ty.collect_definitions(&mut names);
                for parameter in &property.parameters {
                    parameter.ty.collect_definitions(&mut names);
                }
            }
            for field in &def.fields {
                field.ty.collect_definitions(&mut names);
            }
            for method in &def.methods {
                method.return_type.collect_definitions(&mut names);
                for parameter in &method.parameters {
                    parameter.ty.collect_definitions(&mut names);
                }
                if let Some(explicit) = &method.explicit_implementation {
                    explicit.interface.collect_definitions(&mut names);
                }
            }

            if let Some(missing) = names.iter().find(|name| !self.index.contains_key(**name)) {
                return Err(Error::other(format!(
                    "type '{}' references unknown type '{}'",
                    def.full_name, missing
                )));
            }

            if let Some(base) = def.base_types.iter().find(|b| {
                matches!(b, TypeRef::Array(_) | TypeRef::ByReference(_) | TypeRef::Dynamic)
            }) {
                return Err(Error::other(format!(
                    "type '{}' has an invalid base type {:?}",
                    def.full_name, base
                )));
            }
        }

        Ok(())
    }
}

impl TypeSystem for Snapshot {
    fn assembly(&self) -> &AssemblyInfo {
        &self.assembly
    }

    fn type_definitions(&self) -> &[TypeDef] {
        &self.types
    }

    fn find_type(&self, full_name: &str) -> Option<&TypeDef> {
        self.index.get(full_name).and_then(|(is_module, i)| {
            if *is_module {
                self.types.get(*i)
            } else {
                self.references.get(*i)
            }
        })
    }
}
