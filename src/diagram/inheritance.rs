//! Grouping of members by declaring type and the inherited-member maps

use crate::diagram::context::DiagramContext;
use crate::diagram::members::{self, ClassifiedMembers};
use crate::diagram::model::InheritedMembers;
use crate::error::Result;
use crate::metadata::hierarchy::{self, Declared};
use crate::metadata::{Field, Method, Property, TypeDef, TypeRef};
use indexmap::IndexMap;

/// The classified members one type declares
#[derive(Debug, Default)]
pub struct DeclaredMembers<'m> {
    pub flat: Vec<&'m Property>,
    pub has_one: Vec<&'m Declared<Property>>,
    pub has_many: Vec<&'m (Declared<Property>, TypeRef)>,
    pub fields: Vec<&'m Field>,
    pub methods: Vec<&'m Method>,
}

/// Classified members keyed by the reflection name of their declaring type
#[derive(Debug, Default)]
pub struct MembersByDeclaringType<'m> {
    groups: IndexMap<&'m str, DeclaredMembers<'m>>,
}

impl<'m> MembersByDeclaringType<'m> {
    pub fn new(classified: &'m ClassifiedMembers) -> Self {
        let mut groups: IndexMap<&'m str, DeclaredMembers<'m>> = IndexMap::new();

        for p in &classified.flat {
            groups.entry(&p.declaring_type).or_default().flat.push(&p.member);
        }
        for p in &classified.has_one {
            groups.entry(&p.declaring_type).or_default().has_one.push(p);
        }
        for relation in &classified.has_many {
            groups
                .entry(&relation.0.declaring_type)
                .or_default()
                .has_many
                .push(relation);
        }
        for f in &classified.fields {
            groups.entry(&f.declaring_type).or_default().fields.push(&f.member);
        }
        for m in &classified.methods {
            groups.entry(&m.declaring_type).or_default().methods.push(&m.member);
        }

        Self { groups }
    }

    pub fn get(&self, declaring_type: &str) -> Option<&DeclaredMembers<'m>> {
        self.groups.get(declaring_type)
    }
}

/// Member lines of one declaring type: flat properties, then methods, then fields
pub fn member_lines(ctx: &mut DiagramContext, declared: &DeclaredMembers, prefix: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    for property in &declared.flat {
        lines.push(format!("{prefix}{}", members::format_property(ctx, property)?));
    }
    for method in &declared.methods {
        lines.push(format!("{prefix}{}", members::format_method(ctx, method)?));
    }
    for field in &declared.fields {
        lines.push(format!("{prefix}{}", members::format_field(ctx, field)?));
    }

    Ok(lines)
}

/// What `def` inherits from each non-interface ancestor other than `object`,
/// keyed by ancestor id. Ancestors contributing nothing are left out.
pub fn inherited_members(
    ctx: &mut DiagramContext,
    def: &TypeDef,
    type_id: &str,
    groups: &MembersByDeclaringType,
) -> Result<Option<IndexMap<String, InheritedMembers>>> {
    let ts = ctx.ts;
    let ancestry = hierarchy::non_interface_ancestry(ts, def)?;
    let prefix = format!("{type_id} : ");
    let mut inherited = IndexMap::new();

    for ancestor in ancestry.iter().skip(1) {
        if ancestor.definition.is_object() {
            continue;
        }
        let Some(declared) = groups.get(&ancestor.definition.full_name) else {
            continue;
        };

        let lines = member_lines(ctx, declared, &prefix)?;
        let members = InheritedMembers {
            flat_members: if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            },
            has_one: ctx.has_one_relations(declared.has_one.iter().copied())?,
            has_many: ctx.has_many_relations(declared.has_many.iter().copied())?,
        };

        if !members.is_empty() {
            let id = ctx.id_of(&ancestor.definition.reference())?;
            inherited.insert(id, members);
        }
    }

    Ok(if inherited.is_empty() { None } else { Some(inherited) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{known, AssemblyInfo, Snapshot, TypeKind, TypeSystem};

    fn snapshot() -> Snapshot {
        let types = vec![
            TypeDef::new(TypeKind::Class, "MyApp.Entity")
                .with_abstract()
                .with_base(TypeRef::named(known::OBJECT))
                .with_property(Property::new("Id", TypeRef::named("System.Guid"))),
            TypeDef::new(TypeKind::Class, "MyApp.Person")
                .with_base(TypeRef::named("MyApp.Entity"))
                .with_property(Property::new("Name", TypeRef::named(known::STRING)))
                .with_property(Property::new("Home", TypeRef::named("MyApp.Address"))),
            TypeDef::new(TypeKind::Class, "MyApp.Customer")
                .with_base(TypeRef::named("MyApp.Person"))
                .with_property(Property::new("Rating", TypeRef::named(known::INT32))),
            TypeDef::new(TypeKind::Class, "MyApp.Address").with_base(TypeRef::named(known::OBJECT)),
        ];
        Snapshot::new(AssemblyInfo::default(), types, Vec::new())
    }

    #[test]
    fn test_inherited_members_are_grouped_by_ancestor() {
        let ts = snapshot();
        let selected: Vec<&TypeDef> = ts.type_definitions().iter().collect();
        let mut ctx = DiagramContext::new(&ts, &selected);

        let customer = ts.find_type("MyApp.Customer").unwrap();
        let accessible = hierarchy::accessible_members(&ts, customer).unwrap();
        let classified = members::classify(&ctx, customer, accessible).unwrap();
        let groups = MembersByDeclaringType::new(&classified);

        let own = member_lines(&mut ctx, groups.get("MyApp.Customer").unwrap(), "").unwrap();
        assert_eq!(own, vec!["+int Rating"]);

        let inherited = inherited_members(&mut ctx, customer, "Customer", &groups)
            .unwrap()
            .unwrap();
        let keys: Vec<&str> = inherited.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Person", "Entity"]);

        let person = &inherited["Person"];
        assert_eq!(person.flat_members.as_deref(), Some("Customer : +string Name"));
        assert_eq!(person.has_one.as_ref().unwrap()["Home"], "Address");
        assert_eq!(
            inherited["Entity"].flat_members.as_deref(),
            Some("Customer : +Guid Id")
        );
    }

    #[test]
    fn test_no_ancestors_means_no_map() {
        let ts = snapshot();
        let selected: Vec<&TypeDef> = ts.type_definitions().iter().collect();
        let mut ctx = DiagramContext::new(&ts, &selected);

        let address = ts.find_type("MyApp.Address").unwrap();
        let accessible = hierarchy::accessible_members(&ts, address).unwrap();
        let classified = members::classify(&ctx, address, accessible).unwrap();
        let groups = MembersByDeclaringType::new(&classified);

        assert!(inherited_members(&mut ctx, address, "Address", &groups)
            .unwrap()
            .is_none());
    }
}
