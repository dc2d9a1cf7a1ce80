//! Display names for type references

use crate::error::{Error, Result};
use crate::metadata::{known, TypeRef, TypeSystem};
use std::collections::HashMap;

/// Generic instantiations nest far less deeply than this in practice
const MAX_DEPTH: usize = 64;

pub const OPEN_BRACKET: char = '❰';
pub const CLOSE_BRACKET: char = '❱';

/// Formats and caches human-readable type names for the duration of one run
#[derive(Debug, Default)]
pub struct NameFormatter {
    cache: HashMap<TypeRef, String>,
}

impl NameFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_of(&mut self, ts: &dyn TypeSystem, ty: &TypeRef) -> Result<String> {
        self.cached(ts, ty, 0)
    }

    fn cached(&mut self, ts: &dyn TypeSystem, ty: &TypeRef, depth: usize) -> Result<String> {
        if let Some(name) = self.cache.get(ty) {
            return Ok(name.clone());
        }
        if depth > MAX_DEPTH {
            return Err(Error::inconsistency(format!(
                "type name nests deeper than {MAX_DEPTH} levels: {ty:?}"
            )));
        }

        let name = self.generate(ts, ty, depth)?;
        self.cache.insert(ty.clone(), name.clone());
        Ok(name)
    }

    fn generate(&mut self, ts: &dyn TypeSystem, ty: &TypeRef, depth: usize) -> Result<String> {
        match ty {
            TypeRef::Array(element) => Ok(format!("{}[]", self.cached(ts, element, depth + 1)?)),
            TypeRef::ByReference(element) => {
                Ok(format!("&{}", self.cached(ts, element, depth + 1)?))
            }
            TypeRef::TypeParameter(name) => Ok(name.clone()),
            TypeRef::Dynamic => Ok("dynamic".to_string()),
            TypeRef::Type(full_name) => {
                let def = ts.resolve(full_name)?;

                if !def.type_parameters.is_empty() {
                    // an open generic definition names its own parameters
                    let arguments: Vec<TypeRef> =
                        def.type_parameters.iter().map(TypeRef::param).collect();
                    return self.generic_name(ts, full_name, &arguments, depth);
                }

                if let Some(alias) = known::csharp_alias(full_name) {
                    return Ok(alias.to_string());
                }

                match &def.declaring_type {
                    Some(declaring) => {
                        let declaring = ts.resolve(declaring)?;
                        Ok(format!("{}+{}", declaring.name, def.name))
                    }
                    None => Ok(def.name.clone()),
                }
            }
            TypeRef::Generic {
                definition,
                arguments,
            } => self.generic_name(ts, definition, arguments, depth),
        }
    }

    fn generic_name(
        &mut self,
        ts: &dyn TypeSystem,
        definition: &str,
        arguments: &[TypeRef],
        depth: usize,
    ) -> Result<String> {
        if definition == known::NULLABLE && arguments.len() == 1 {
            return Ok(format!("{}?", self.cached(ts, &arguments[0], depth + 1)?));
        }

        let def = ts.resolve(definition)?;
        let arguments = arguments
            .iter()
            .map(|a| self.cached(ts, a, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "{}{}{}{}",
            def.name,
            OPEN_BRACKET,
            arguments.join(", "),
            CLOSE_BRACKET
        ))
    }
}
