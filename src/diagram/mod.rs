//! Class diagram model builder
//!
//! Walks the type definitions of a module, selects the ones to diagram and
//! turns each into a mermaid class definition plus the relations, inherited
//! members and documentation the viewer needs.

pub mod context;
pub mod docs;
pub mod ids;
pub mod inheritance;
pub mod members;
pub mod model;
pub mod names;
pub mod relationships;

pub use context::DiagramContext;
pub use docs::DocFormatter;
pub use model::{ClassDiagram, DiagramType, InheritedMembers, Relationship};

use crate::error::{Error, Result};
use crate::metadata::{docs as doc_ids, hierarchy, Accessibility, TypeDef, TypeSystem};
use inheritance::MembersByDeclaringType;
use log::{debug, info};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

const MEMBER_SEPARATOR: &str = "\n    ";

/// Builds the class diagram model of one module
pub struct ClassDiagramBuilder<'a> {
    ts: &'a dyn TypeSystem,
    docs: Option<DocFormatter<'a>>,
}

impl<'a> ClassDiagramBuilder<'a> {
    pub fn new(ts: &'a dyn TypeSystem) -> Self {
        Self { ts, docs: None }
    }

    /// Attach documentation comments to types and members
    pub fn with_docs(mut self, docs: DocFormatter<'a>) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Build the model for the types whose reflection name matches `include`
    /// and does not match `exclude`
    pub fn build(&self, include: Option<&str>, exclude: Option<&str>) -> Result<ClassDiagram> {
        let include = compile_filter(include)?;
        let exclude = compile_filter(exclude)?;

        let mut selected = self.select(include.as_ref(), exclude.as_ref());
        selected.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        info!(
            "selected {} of {} types",
            selected.len(),
            self.ts.type_definitions().len()
        );

        let mut ctx = DiagramContext::new(self.ts, &selected);
        let mut namespaces: BTreeMap<String, indexmap::IndexMap<String, DiagramType>> = BTreeMap::new();

        for def in &selected {
            let diagram_type = if def.is_enum() {
                self.build_enum(&mut ctx, def)?
            } else {
                self.build_type(&mut ctx, def)?
            };
            debug!("built {} as {}", def.full_name, diagram_type.id);

            namespaces
                .entry(def.namespace.clone())
                .or_default()
                .insert(diagram_type.id.clone(), diagram_type);
        }

        let selected_names: HashSet<&str> = selected.iter().map(|d| d.full_name.as_str()).collect();
        let excluded = self
            .ts
            .type_definitions()
            .iter()
            .filter(|d| !selected_names.contains(d.full_name.as_str()))
            .map(|d| d.full_name.clone())
            .collect();

        let outside_references = ctx.into_outside_references();
        info!(
            "built {} namespaces with {} outside references",
            namespaces.len(),
            outside_references.len()
        );

        Ok(ClassDiagram {
            outside_references,
            namespaces,
            excluded,
        })
    }

    /// Drop compiler-generated types and those nested in them, then apply the filters
    fn select(&self, include: Option<&Regex>, exclude: Option<&Regex>) -> Vec<&'a TypeDef> {
        self.ts
            .type_definitions()
            .iter()
            .filter(|d| !self.is_compiler_generated(d))
            .filter(|d| include.map_or(true, |r| r.is_match(&d.full_name)))
            .filter(|d| exclude.map_or(true, |r| !r.is_match(&d.full_name)))
            .collect()
    }

    fn is_compiler_generated(&self, def: &TypeDef) -> bool {
        let mut current = Some(def);
        let mut depth = 0;

        while let Some(def) = current {
            if def.is_compiler_generated || crate::metadata::known::is_compiler_generated_name(&def.name) {
                return true;
            }
            depth += 1;
            if depth > 64 {
                break;
            }
            current = def
                .declaring_type
                .as_deref()
                .and_then(|name| self.ts.find_type(name));
        }

        false
    }

    fn build_enum(&self, ctx: &mut DiagramContext, def: &TypeDef) -> Result<DiagramType> {
        let id = ctx.id_of(&def.reference())?;
        let name = ctx.name_of(&def.reference())?;

        let fields: Vec<_> = def
            .fields
            .iter()
            .filter(|f| f.is_const && f.is_static && f.accessibility == Accessibility::Public)
            .collect();

        let lines: Vec<String> = std::iter::once("<<Enumeration>>".to_string())
            .chain(fields.iter().map(|f| f.name.clone()))
            .collect();
        let body = pad_join(&lines).trim_end_matches(' ').to_string();

        let xml_docs = self.docs.as_ref().and_then(|docs| {
            let type_id = doc_ids::type_doc_id(def);
            let field_ids: Vec<(String, String)> = fields
                .iter()
                .map(|f| (f.name.clone(), doc_ids::field_doc_id(def, f)))
                .collect();

            docs.collect(
                std::iter::once(("", type_id.as_str()))
                    .chain(field_ids.iter().map(|(n, i)| (n.as_str(), i.as_str()))),
            )
        });

        Ok(DiagramType {
            name: if name == id { None } else { Some(name) },
            body: format!("class {id} {{{body}}}"),
            xml_docs,
            id,
            ..Default::default()
        })
    }

    fn build_type(&self, ctx: &mut DiagramContext, def: &TypeDef) -> Result<DiagramType> {
        let id = ctx.id_of(&def.reference())?;

        let accessible = hierarchy::accessible_members(self.ts, def)?;
        let property_docs: Vec<(String, String)> = accessible
            .properties
            .iter()
            .map(|p| (p.member.name.clone(), p.doc_id.clone()))
            .collect();

        let classified = members::classify(ctx, def, accessible)?;
        for target in &classified.dropped_targets {
            ctx.reference(target)?;
        }
        let groups = MembersByDeclaringType::new(&classified);

        let lines = match groups.get(&def.full_name) {
            Some(own) => inheritance::member_lines(ctx, own, "")?,
            None => Vec::new(),
        };
        let member_text = pad_join(&lines);

        let annotation = if def.is_interface() {
            Some("Interface")
        } else if def.is_abstract {
            Some(if def.is_sealed { "Service" } else { "Abstract" })
        } else {
            None
        };
        let body = match annotation {
            Some(annotation) => format!("{member_text}<<{annotation}>>\n"),
            None => member_text.trim_end_matches(' ').to_string(),
        };

        let xml_docs = self.docs.as_ref().and_then(|docs| {
            let type_id = doc_ids::type_doc_id(def);
            let entries: Vec<(&str, &str)> = std::iter::once(("", type_id.as_str()))
                .chain(
                    classified
                        .fields
                        .iter()
                        .map(|f| (f.member.name.as_str(), f.doc_id.as_str())),
                )
                .chain(property_docs.iter().map(|(n, i)| (n.as_str(), i.as_str())))
                .chain(
                    classified
                        .methods
                        .iter()
                        .map(|m| (m.member.name.as_str(), m.doc_id.as_str())),
                )
                .collect();
            docs.collect(entries)
        });

        let inherited = inheritance::inherited_members(ctx, def, &id, &groups)?;
        let name = ctx.name_of(&def.reference())?;

        let (has_one, has_many) = match groups.get(&def.full_name) {
            Some(own) => (
                ctx.has_one_relations(own.has_one.iter().copied())?,
                ctx.has_many_relations(own.has_many.iter().copied())?,
            ),
            None => (None, None),
        };

        Ok(DiagramType {
            name: if name == id { None } else { Some(name) },
            body: format!("class {id} {{{body}}}"),
            has_one,
            has_many,
            base_type: ctx.base_type(def)?,
            interfaces: ctx.interfaces(def)?,
            inherited,
            xml_docs,
            id,
        })
    }
}

/// Compile an include or exclude filter
pub fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).map_err(|e| Error::pattern(p, e)))
        .transpose()
}

/// Join member lines with the member separator, also placing it at both ends
fn pad_join(lines: &[String]) -> String {
    format!(
        "{MEMBER_SEPARATOR}{}{MEMBER_SEPARATOR}",
        lines.join(MEMBER_SEPARATOR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{known, AssemblyInfo, Field, Property, Snapshot, TypeKind, TypeRef};

    fn snapshot() -> Snapshot {
        let types = vec![
            TypeDef::new(TypeKind::Class, "MyApp.Models.Customer")
                .with_base(TypeRef::named(known::OBJECT))
                .with_property(Property::new("Name", TypeRef::named(known::STRING))),
            TypeDef::new(TypeKind::Class, "MyApp.Models.CustomerInternal")
                .with_base(TypeRef::named(known::OBJECT)),
            TypeDef::new(TypeKind::Class, "MyApp.Services.Foo").with_base(TypeRef::named(known::OBJECT)),
            TypeDef::new(TypeKind::Class, "MyApp.Models.Customer+<>c")
                .with_compiler_generated()
                .with_base(TypeRef::named(known::OBJECT)),
            TypeDef::new(TypeKind::Class, "MyApp.Models.Customer+<>c+Inner")
                .with_base(TypeRef::named(known::OBJECT)),
            TypeDef::new(TypeKind::Enum, "MyApp.Models.Color")
                .with_base(TypeRef::named(known::ENUM))
                .with_field(Field::new("value__", TypeRef::named(known::INT32)).with_accessibility(Accessibility::Public))
                .with_field(Field::new("Red", TypeRef::named("MyApp.Models.Color")).with_accessibility(Accessibility::Public).with_const())
                .with_field(Field::new("Green", TypeRef::named("MyApp.Models.Color")).with_accessibility(Accessibility::Public).with_const())
                .with_field(Field::new("Blue", TypeRef::named("MyApp.Models.Color")).with_accessibility(Accessibility::Public).with_const()),
            TypeDef::new(TypeKind::Interface, "MyApp.Services.IRepository"),
        ];
        Snapshot::new(AssemblyInfo::default(), types, Vec::new())
    }

    #[test]
    fn test_filters_apply_independently() {
        let ts = snapshot();
        let model = ClassDiagramBuilder::new(&ts)
            .build(Some(r"^MyApp\.Models\."), Some("Internal$"))
            .unwrap();

        assert!(model.get("Customer").is_some());
        assert!(model.get("CustomerInternal").is_none());
        assert!(model.get("Foo").is_none());
        assert!(model.excluded.contains(&"MyApp.Models.CustomerInternal".to_string()));
        assert!(model.excluded.contains(&"MyApp.Services.Foo".to_string()));
    }

    #[test]
    fn test_compiler_generated_types_and_their_nested_types_are_excluded() {
        let ts = snapshot();
        let model = ClassDiagramBuilder::new(&ts).build(None, None).unwrap();

        assert_eq!(model.type_count(), 5);
        assert!(model.excluded.contains(&"MyApp.Models.Customer+<>c".to_string()));
        assert!(model.excluded.contains(&"MyApp.Models.Customer+<>c+Inner".to_string()));
    }

    #[test]
    fn test_invalid_pattern_fails_fast() {
        let ts = snapshot();
        let result = ClassDiagramBuilder::new(&ts).build(Some("(unclosed"), None);
        assert!(matches!(result, Err(Error::Pattern { .. })));
    }

    #[test]
    fn test_enum_body() {
        let ts = snapshot();
        let model = ClassDiagramBuilder::new(&ts).build(None, None).unwrap();

        let color = model.get("Color").unwrap();
        assert_eq!(
            color.body,
            "class Color {\n    <<Enumeration>>\n    Red\n    Green\n    Blue\n}"
        );
        assert!(color.has_one.is_none() && color.has_many.is_none() && color.inherited.is_none());
        assert!(color.base_type.is_none());
    }

    #[test]
    fn test_type_bodies() {
        let ts = snapshot();
        let model = ClassDiagramBuilder::new(&ts).build(None, None).unwrap();

        assert_eq!(
            model.get("Customer").unwrap().body,
            "class Customer {\n    +string Name\n}"
        );
        assert_eq!(
            model.get("IRepository").unwrap().body,
            "class IRepository {\n    \n    <<Interface>>\n}"
        );
        assert_eq!(model.get("Foo").unwrap().body, "class Foo {\n    \n}");
    }

    #[test]
    fn test_namespaces_are_sorted() {
        let ts = snapshot();
        let model = ClassDiagramBuilder::new(&ts).build(None, None).unwrap();

        let namespaces: Vec<&str> = model.namespaces.keys().map(String::as_str).collect();
        assert_eq!(namespaces, vec!["MyApp.Models", "MyApp.Services"]);
        let models: Vec<&str> = model.namespaces["MyApp.Models"].keys().map(String::as_str).collect();
        assert_eq!(models, vec!["Color", "Customer", "CustomerInternal"]);
    }
}
