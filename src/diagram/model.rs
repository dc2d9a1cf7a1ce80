//! The serializable class diagram model handed to the HTML viewer

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Member name (empty for the type itself) -> formatted documentation
pub type XmlDocs = IndexMap<String, String>;

/// Relation label -> id of the related type
pub type Relations = IndexMap<String, String>;

/// Everything the viewer needs to render class diagrams of one assembly
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDiagram {
    /// Id -> display name of referenced types that are not part of the diagram
    pub outside_references: IndexMap<String, String>,
    /// Namespace -> type id -> type, both sorted
    pub namespaces: BTreeMap<String, IndexMap<String, DiagramType>>,
    /// Reflection names of module types left out of the diagram
    #[serde(skip)]
    pub excluded: Vec<String>,
}

impl ClassDiagram {
    /// All types in namespace order
    pub fn types(&self) -> impl Iterator<Item = &DiagramType> {
        self.namespaces.values().flat_map(|types| types.values())
    }

    /// Find a type by id
    pub fn get(&self, id: &str) -> Option<&DiagramType> {
        self.namespaces.values().find_map(|types| types.get(id))
    }

    pub fn type_count(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramType {
    #[serde(skip)]
    pub id: String,
    /// Display name, if it differs from the id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Mermaid class definition of the type and its own members
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_one: Option<Relations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_many: Option<Relations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<Relationship>>,
    /// Ancestor id -> members it contributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited: Option<IndexMap<String, InheritedMembers>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_docs: Option<XmlDocs>,
}

/// An edge to a base type or interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Members a type inherits from one ancestor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritedMembers {
    /// Member lines prefixed with the inheriting type's id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat_members: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_one: Option<Relations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_many: Option<Relations>,
}

impl InheritedMembers {
    pub fn is_empty(&self) -> bool {
        self.flat_members.is_none() && self.has_one.is_none() && self.has_many.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let ty = DiagramType {
            id: "Customer".to_string(),
            body: "class Customer {\n}".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json, serde_json::json!({ "body": "class Customer {\n}" }));
    }

    #[test]
    fn test_model_shape() {
        let mut types = IndexMap::new();
        types.insert(
            "Order".to_string(),
            DiagramType {
                id: "Order".to_string(),
                body: "class Order {\n}".to_string(),
                base_type: Some(Relationship {
                    to: "Store".to_string(),
                    label: Some("Store❰int❱".to_string()),
                }),
                ..Default::default()
            },
        );

        let mut model = ClassDiagram::default();
        model.namespaces.insert("MyApp".to_string(), types);
        model
            .outside_references
            .insert("System_Exception".to_string(), "System.Exception".to_string());
        model.excluded.push("MyApp.Hidden".to_string());

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["outsideReferences"]["System_Exception"], "System.Exception");
        assert_eq!(json["namespaces"]["MyApp"]["Order"]["baseType"]["to"], "Store");
        assert!(json.get("excluded").is_none());
        assert_eq!(model.type_count(), 1);
        assert!(model.get("Order").is_some());
    }
}
