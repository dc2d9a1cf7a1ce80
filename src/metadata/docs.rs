// XML documentation comments emitted by the C# compiler
//
// The compiler writes one `<member name="ID">` element per documented entity,
// keyed by a documentation id such as `T:MyApp.Customer` or
// `M:MyApp.Store`1.Add(`0)`. This module reads those files and computes the
// ids for entities of the metadata model.

use crate::error::{Error, Result};
use crate::metadata::known;
use crate::metadata::types::{Field, Method, Property, TypeDef, TypeRef};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Supplies the raw documentation comment of an entity by documentation id
pub trait DocumentationProvider {
    fn documentation(&self, doc_id: &str) -> Option<&str>;
}

impl DocumentationProvider for HashMap<String, String> {
    fn documentation(&self, doc_id: &str) -> Option<&str> {
        self.get(doc_id).map(String::as_str)
    }
}

/// The contents of a compiler-generated XML documentation file
#[derive(Debug, Clone, Default)]
pub struct XmlDocumentationFile {
    members: HashMap<String, String>,
}

impl XmlDocumentationFile {
    /// Read a documentation file from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let file = Self::parse(&contents)?;
        log::info!(
            "loaded {} documented members from {}",
            file.len(),
            path.display()
        );
        Ok(file)
    }

    /// Extract the inner XML of every `<member>` element
    pub fn parse(xml: &str) -> Result<Self> {
        let pattern = r#"(?s)<member\s+name="([^"]*)"\s*>(.*?)</member>"#;
        let member = Regex::new(pattern).map_err(|e| Error::pattern(pattern, e))?;

        let members = member
            .captures_iter(xml)
            .filter_map(|caps| Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string())))
            .collect();

        Ok(Self { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl DocumentationProvider for XmlDocumentationFile {
    fn documentation(&self, doc_id: &str) -> Option<&str> {
        self.members.get(doc_id).map(String::as_str)
    }
}

/// Documentation id of a type, e.g. `T:MyApp.Outer.Inner`
pub fn type_doc_id(def: &TypeDef) -> String {
    format!("T:{}", id_type_name(def))
}

/// Documentation id of a property, including indexer parameters
pub fn property_doc_id(declaring: &TypeDef, property: &Property) -> String {
    let parameters = if property.parameters.is_empty() {
        String::new()
    } else {
        let encoded: Vec<String> = property
            .parameters
            .iter()
            .map(|p| encode_parameter(&p.ty, declaring, &[]))
            .collect();
        format!("({})", encoded.join(","))
    };

    format!(
        "P:{}.{}{}",
        id_type_name(declaring),
        property.name.replace('.', "#"),
        parameters
    )
}

pub fn field_doc_id(declaring: &TypeDef, field: &Field) -> String {
    format!("F:{}.{}", id_type_name(declaring), field.name)
}

/// Documentation id of a method, e.g. `M:MyApp.Store`1.Find``1(`0,``0)`
pub fn method_doc_id(declaring: &TypeDef, method: &Method) -> String {
    let mut id = format!("M:{}.{}", id_type_name(declaring), method.name.replace('.', "#"));

    if !method.type_parameters.is_empty() {
        id.push_str(&format!("``{}", method.type_parameters.len()));
    }

    if !method.parameters.is_empty() {
        let encoded: Vec<String> = method
            .parameters
            .iter()
            .map(|p| encode_parameter(&p.ty, declaring, &method.type_parameters))
            .collect();
        id.push('(');
        id.push_str(&encoded.join(","));
        id.push(')');
    }

    id
}

fn id_type_name(def: &TypeDef) -> String {
    def.full_name.replace('+', ".")
}

/// Encode a parameter type the way documentation ids spell it
fn encode_parameter(ty: &TypeRef, declaring: &TypeDef, method_type_parameters: &[String]) -> String {
    match ty {
        TypeRef::Type(name) => name.replace('+', "."),
        TypeRef::Generic {
            definition,
            arguments,
        } => {
            let definition = definition.replace('+', ".");
            let base = definition.split('`').next().unwrap_or(&definition);
            let arguments: Vec<String> = arguments
                .iter()
                .map(|a| encode_parameter(a, declaring, method_type_parameters))
                .collect();
            format!("{}{{{}}}", base, arguments.join(","))
        }
        TypeRef::Array(element) => {
            format!("{}[]", encode_parameter(element, declaring, method_type_parameters))
        }
        TypeRef::ByReference(element) => {
            format!("{}@", encode_parameter(element, declaring, method_type_parameters))
        }
        TypeRef::TypeParameter(name) => {
            if let Some(i) = method_type_parameters.iter().position(|p| p == name) {
                format!("``{i}")
            } else if let Some(i) = declaring.type_parameters.iter().position(|p| p == name) {
                format!("`{i}")
            } else {
                name.clone()
            }
        }
        TypeRef::Dynamic => known::OBJECT.to_string(),
    }
}
