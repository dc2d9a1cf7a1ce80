//! Edges between diagram types and outside references

use crate::diagram::context::DiagramContext;
use crate::diagram::model::{Relations, Relationship};
use crate::error::{Error, Result};
use crate::metadata::hierarchy::Declared;
use crate::metadata::{Property, TypeDef, TypeRef};

impl DiagramContext<'_> {
    /// Build an edge to `target`, registering it as an outside reference
    /// if it is not part of the diagram.
    ///
    /// Property relations are labeled with the property name, closed generic
    /// targets with their display name.
    pub fn relationship(&mut self, target: &TypeRef, property: Option<&str>) -> Result<Relationship> {
        let Some(definition) = target.definition_name() else {
            return Err(Error::inconsistency(format!(
                "relationship to a type without definition: {target:?}"
            )));
        };

        let open = TypeRef::named(definition);
        let id = self.id_of(&open)?;
        self.add_outside_reference(&id, &open)?;

        let label = match property {
            Some(name) => Some(name.to_string()),
            None if target.is_parameterized() => Some(self.name_of(target)?),
            None => None,
        };

        Ok(Relationship { to: id, label })
    }

    /// Register `target` as an outside reference without building an edge
    pub fn reference(&mut self, target: &TypeRef) -> Result<()> {
        self.relationship(target, None).map(|_| ())
    }

    fn add_outside_reference(&mut self, id: &str, open: &TypeRef) -> Result<()> {
        let Some(full_name) = open.definition_name() else {
            return Ok(());
        };
        if self.is_selected_definition(full_name) || self.outside_references.contains_key(id) {
            return Ok(());
        }

        let def = self.ts.resolve(full_name)?;
        let name = self.name_of(open)?;
        let display = if def.namespace.is_empty() {
            name
        } else {
            format!("{}.{}", def.namespace, name)
        };

        self.outside_references.insert(id.to_string(), display);
        Ok(())
    }

    /// Edge to the single direct base class, unless that is `object`
    pub fn base_type(&mut self, def: &TypeDef) -> Result<Option<Relationship>> {
        let mut bases = Vec::new();
        for base in &def.base_types {
            if base.is_object() {
                continue;
            }
            if let Some(name) = base.definition_name() {
                if !self.ts.resolve(name)?.is_interface() {
                    bases.push(base);
                }
            }
        }

        match bases.as_slice() {
            [] => Ok(None),
            [base] => self.relationship(base, None).map(Some),
            _ => Err(Error::inconsistency(format!(
                "'{}' has more than one direct base class",
                def.full_name
            ))),
        }
    }

    /// Edges to the directly implemented interfaces
    pub fn interfaces(&mut self, def: &TypeDef) -> Result<Option<Vec<Relationship>>> {
        let mut interfaces = Vec::new();
        for base in &def.base_types {
            let Some(name) = base.definition_name() else {
                continue;
            };
            if self.ts.resolve(name)?.is_interface() {
                interfaces.push(self.relationship(base, None)?);
            }
        }

        Ok(if interfaces.is_empty() { None } else { Some(interfaces) })
    }

    /// Property name -> related type id; nullable relations are marked with ` ?`
    pub fn has_one_relations<'p>(
        &mut self,
        properties: impl IntoIterator<Item = &'p Declared<Property>>,
    ) -> Result<Option<Relations>> {
        let mut relations = Relations::new();

        for property in properties {
            let ty = &property.member.ty;
            let relationship = match ty.nullable_inner() {
                Some(inner) => self.relationship(inner, Some(&format!("{} ?", property.member.name)))?,
                None => self.relationship(ty, Some(&property.member.name))?,
            };
            if let Some(label) = relationship.label {
                relations.insert(label, relationship.to);
            }
        }

        Ok(if relations.is_empty() { None } else { Some(relations) })
    }

    /// Property name -> element type id
    pub fn has_many_relations<'p>(
        &mut self,
        properties: impl IntoIterator<Item = &'p (Declared<Property>, TypeRef)>,
    ) -> Result<Option<Relations>> {
        let mut relations = Relations::new();

        for (property, element) in properties {
            let relationship = self.relationship(element, Some(&property.member.name))?;
            if let Some(label) = relationship.label {
                relations.insert(label, relationship.to);
            }
        }

        Ok(if relations.is_empty() { None } else { Some(relations) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{known, AssemblyInfo, Snapshot, TypeKind, TypeSystem};

    fn snapshot() -> Snapshot {
        let types = vec![
            TypeDef::new(TypeKind::Class, "MyApp.Store`1")
                .with_type_parameters(&["T"])
                .with_base(TypeRef::named(known::OBJECT)),
            TypeDef::new(TypeKind::Class, "MyApp.IntStore")
                .with_base(TypeRef::generic("MyApp.Store`1", vec![TypeRef::named(known::INT32)]))
                .with_base(TypeRef::named("System.IDisposable")),
            TypeDef::new(TypeKind::Class, "MyApp.Failure").with_base(TypeRef::named("System.Exception")),
            TypeDef::new(TypeKind::Class, "MyApp.Hidden"),
        ];
        Snapshot::new(AssemblyInfo::default(), types, Vec::new())
    }

    fn context(ts: &Snapshot) -> DiagramContext<'_> {
        let selected: Vec<&TypeDef> = ts
            .type_definitions()
            .iter()
            .filter(|d| d.full_name != "MyApp.Hidden")
            .collect();
        DiagramContext::new(ts, &selected)
    }

    #[test]
    fn test_closed_generic_base_is_labeled() {
        let ts = snapshot();
        let mut ctx = context(&ts);

        let base = ctx.base_type(ts.find_type("MyApp.IntStore").unwrap()).unwrap().unwrap();
        assert_eq!(base.to, "Store");
        assert_eq!(base.label.as_deref(), Some("Store❰int❱"));
        assert!(ctx.outside_references().is_empty());
    }

    #[test]
    fn test_object_base_is_skipped() {
        let ts = snapshot();
        let mut ctx = context(&ts);
        assert!(ctx.base_type(ts.find_type("MyApp.Store`1").unwrap()).unwrap().is_none());
    }

    #[test]
    fn test_outside_bases_and_interfaces_are_registered() {
        let ts = snapshot();
        let mut ctx = context(&ts);

        let base = ctx.base_type(ts.find_type("MyApp.Failure").unwrap()).unwrap().unwrap();
        assert_eq!(base.to, "System_Exception");

        let interfaces = ctx.interfaces(ts.find_type("MyApp.IntStore").unwrap()).unwrap().unwrap();
        assert_eq!(interfaces[0].to, "System_IDisposable");

        assert_eq!(
            ctx.outside_references().get("System_Exception").map(String::as_str),
            Some("System.Exception")
        );
        assert_eq!(
            ctx.outside_references().get("System_IDisposable").map(String::as_str),
            Some("System.IDisposable")
        );
    }

    #[test]
    fn test_outside_references_are_registered_once() {
        let ts = snapshot();
        let mut ctx = context(&ts);

        let hidden = TypeRef::named("MyApp.Hidden");
        ctx.reference(&hidden).unwrap();
        ctx.reference(&hidden).unwrap();

        assert_eq!(ctx.outside_references().len(), 1);
        assert_eq!(
            ctx.outside_references().get("MyApp_Hidden").map(String::as_str),
            Some("MyApp.Hidden")
        );
    }

    #[test]
    fn test_nullable_has_one_label() {
        let ts = snapshot();
        let mut ctx = context(&ts);

        let property = Declared {
            declaring_type: "MyApp.Order".to_string(),
            doc_id: "P:MyApp.Order.Failure".to_string(),
            member: Property::new("Failure", TypeRef::nullable(TypeRef::named("MyApp.Failure"))),
            overridden_in: None,
        };

        let relations = ctx.has_one_relations([&property]).unwrap().unwrap();
        assert_eq!(relations.get("Failure ?").map(String::as_str), Some("Failure"));
    }

    #[test]
    fn test_empty_relations_are_absent() {
        let ts = snapshot();
        let mut ctx = context(&ts);
        assert!(ctx.has_one_relations(std::iter::empty()).unwrap().is_none());
        assert!(ctx.interfaces(ts.find_type("MyApp.Failure").unwrap()).unwrap().is_none());
    }
}
