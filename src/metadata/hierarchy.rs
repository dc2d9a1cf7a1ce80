// Inheritance facts derived from the metadata model
//
// Members of generic ancestors are seen through the instantiation the
// descendant inherits from: `Derived : Base<int>` sees `Base<T>.Value` as an
// `int` property declared by `Base<T>`.

use crate::error::{Error, Result};
use crate::metadata::docs;
use crate::metadata::types::{Accessibility, Field, Method, Property, Substitution, TypeDef, TypeRef};
use crate::metadata::TypeSystem;
use std::collections::HashSet;

/// A definition on the non-interface ancestry of a type
#[derive(Debug, Clone)]
pub struct Ancestor<'a> {
    pub definition: &'a TypeDef,
    /// How the descendant references this ancestor, e.g. `Base<int>`
    pub reference: TypeRef,
    /// Bindings of the ancestor's type parameters
    pub substitution: Substitution,
}

/// A member together with the type that declares it
#[derive(Debug, Clone, PartialEq)]
pub struct Declared<T> {
    /// Reflection name of the declaring type
    pub declaring_type: String,
    pub doc_id: String,
    /// The member with generic arguments of the declaring type substituted
    pub member: T,
    /// For overrides, the declaring type of the nearest overridden member
    pub overridden_in: Option<String>,
}

/// All members accessible on a type, own and inherited
#[derive(Debug, Clone, Default)]
pub struct TypeMembers {
    pub properties: Vec<Declared<Property>>,
    pub fields: Vec<Declared<Field>>,
    pub methods: Vec<Declared<Method>>,
}

/// The type itself followed by its single non-interface base at each level
pub fn non_interface_ancestry<'a, T: TypeSystem + ?Sized>(
    ts: &'a T,
    def: &'a TypeDef,
) -> Result<Vec<Ancestor<'a>>> {
    let mut ancestry = vec![Ancestor {
        definition: def,
        reference: def.reference(),
        substitution: Substitution::new(),
    }];
    let mut visited: HashSet<&str> = HashSet::from([def.full_name.as_str()]);

    loop {
        let current = &ancestry[ancestry.len() - 1];
        let mut bases = Vec::new();

        for base in &current.definition.base_types {
            let name = base.definition_name().ok_or_else(|| {
                Error::inconsistency(format!(
                    "base type of '{}' is not a type definition",
                    current.definition.full_name
                ))
            })?;
            let base_def = ts.resolve(name)?;
            if !base_def.is_interface() {
                bases.push((base.substitute(&current.substitution), base_def));
            }
        }

        if bases.len() > 1 {
            return Err(Error::inconsistency(format!(
                "'{}' has more than one non-interface base type",
                current.definition.full_name
            )));
        }

        let Some((reference, base_def)) = bases.pop() else {
            break;
        };

        if !visited.insert(base_def.full_name.as_str()) {
            return Err(Error::inconsistency(format!(
                "inheritance cycle through '{}'",
                base_def.full_name
            )));
        }

        let substitution = base_def.substitution_for(&reference);
        ancestry.push(Ancestor {
            definition: base_def,
            reference,
            substitution,
        });
    }

    Ok(ancestry)
}

/// Own members plus the non-private members of all non-interface ancestors.
/// Members overridden or hidden by a more derived declaration are left out.
pub fn accessible_members<T: TypeSystem + ?Sized>(ts: &T, def: &TypeDef) -> Result<TypeMembers> {
    let ancestry = non_interface_ancestry(ts, def)?;

    let properties: Vec<Vec<Property>> = ancestry
        .iter()
        .map(|a| {
            a.definition
                .properties
                .iter()
                .map(|p| substitute_property(p, &a.substitution))
                .collect()
        })
        .collect();
    let methods: Vec<Vec<Method>> = ancestry
        .iter()
        .map(|a| {
            a.definition
                .methods
                .iter()
                .map(|m| substitute_method(m, &a.substitution))
                .collect()
        })
        .collect();

    let mut members = TypeMembers::default();
    let mut seen_properties = HashSet::new();
    let mut seen_methods = HashSet::new();
    let mut seen_fields = HashSet::new();

    for (level, ancestor) in ancestry.iter().enumerate() {
        let inherited = level > 0;
        let declaring = ancestor.definition;

        for (original, property) in declaring.properties.iter().zip(&properties[level]) {
            if inherited && property.accessibility == Accessibility::Private {
                continue;
            }
            let signature = property_signature(property);
            if !seen_properties.insert(signature.clone()) {
                continue;
            }

            let overridden_in = if property.is_override {
                ancestry[level + 1..]
                    .iter()
                    .zip(&properties[level + 1..])
                    .find(|(_, declared)| declared.iter().any(|p| property_signature(p) == signature))
                    .map(|(a, _)| a.definition.full_name.clone())
            } else {
                None
            };

            members.properties.push(Declared {
                declaring_type: declaring.full_name.clone(),
                doc_id: docs::property_doc_id(declaring, original),
                member: property.clone(),
                overridden_in,
            });
        }

        for field in &declaring.fields {
            if inherited && field.accessibility == Accessibility::Private {
                continue;
            }
            if !seen_fields.insert(field.name.clone()) {
                continue;
            }

            members.fields.push(Declared {
                declaring_type: declaring.full_name.clone(),
                doc_id: docs::field_doc_id(declaring, field),
                member: Field {
                    ty: field.ty.substitute(&ancestor.substitution),
                    ..field.clone()
                },
                overridden_in: None,
            });
        }

        for (original, method) in declaring.methods.iter().zip(&methods[level]) {
            if inherited && (method.accessibility == Accessibility::Private || method.is_constructor) {
                continue;
            }
            let signature = method.signature();
            if !seen_methods.insert(signature.clone()) {
                continue;
            }

            let overridden_in = if method.is_override {
                ancestry[level + 1..]
                    .iter()
                    .zip(&methods[level + 1..])
                    .find(|(_, declared)| declared.iter().any(|m| m.signature() == signature))
                    .map(|(a, _)| a.definition.full_name.clone())
            } else {
                None
            };

            members.methods.push(Declared {
                declaring_type: declaring.full_name.clone(),
                doc_id: docs::method_doc_id(declaring, original),
                member: method.clone(),
                overridden_in,
            });
        }
    }

    Ok(members)
}

/// The type itself and every type it derives from or implements, transitively,
/// with generic arguments substituted
pub fn all_base_types<T: TypeSystem + ?Sized>(ts: &T, ty: &TypeRef) -> Result<Vec<TypeRef>> {
    let mut result = vec![ty.clone()];
    let mut seen: HashSet<TypeRef> = HashSet::from([ty.clone()]);
    let mut next = 0;

    while next < result.len() {
        let current = result[next].clone();
        next += 1;

        let Some(name) = current.definition_name() else {
            continue;
        };
        let def = ts.resolve(name)?;
        let substitution = def.substitution_for(&current);

        for base in &def.base_types {
            let base = base.substitute(&substitution);
            if seen.insert(base.clone()) {
                result.push(base);
            }
        }
    }

    Ok(result)
}

fn property_signature(property: &Property) -> (String, Vec<TypeRef>) {
    (
        property.name.clone(),
        property.parameters.iter().map(|p| p.ty.clone()).collect(),
    )
}

fn substitute_property(property: &Property, substitution: &Substitution) -> Property {
    let mut property = property.clone();
    property.ty = property.ty.substitute(substitution);
    for parameter in &mut property.parameters {
        parameter.ty = parameter.ty.substitute(substitution);
    }
    property
}

fn substitute_method(method: &Method, substitution: &Substitution) -> Method {
    // method type parameters shadow those of the declaring type
    let mut substitution = substitution.clone();
    for name in &method.type_parameters {
        substitution.remove(name);
    }

    let mut method = method.clone();
    method.return_type = method.return_type.substitute(&substitution);
    for parameter in &mut method.parameters {
        parameter.ty = parameter.ty.substitute(&substitution);
    }
    method
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::known;
    use crate::metadata::snapshot::Snapshot;
    use crate::metadata::types::{AssemblyInfo, TypeKind};

    fn snapshot(types: Vec<TypeDef>) -> Snapshot {
        Snapshot::new(AssemblyInfo::default(), types, Vec::new())
    }

    fn store() -> TypeDef {
        TypeDef::new(TypeKind::Class, "MyApp.Store`1")
            .with_type_parameters(&["T"])
            .with_base(TypeRef::named(known::OBJECT))
            .with_property(Property::new("Value", TypeRef::param("T")))
            .with_property(
                Property::new("Secret", TypeRef::named(known::STRING))
                    .with_accessibility(Accessibility::Private),
            )
            .with_method(
                Method::new("Describe", TypeRef::named(known::STRING))
                    .with_parameter("item", TypeRef::param("T")),
            )
            .with_method(Method::new("ToString", TypeRef::named(known::STRING)).with_override())
    }

    fn int_store() -> TypeDef {
        TypeDef::new(TypeKind::Class, "MyApp.IntStore")
            .with_base(TypeRef::generic("MyApp.Store`1", vec![TypeRef::named(known::INT32)]))
            .with_base(TypeRef::named("System.IDisposable"))
            .with_method(
                Method::new("Describe", TypeRef::named(known::STRING))
                    .with_parameter("item", TypeRef::named(known::INT32))
                    .with_override(),
            )
    }

    #[test]
    fn test_ancestry_skips_interfaces_and_substitutes() {
        let ts = snapshot(vec![store(), int_store()]);
        let def = ts.find_type("MyApp.IntStore").unwrap();

        let ancestry = non_interface_ancestry(&ts, def).unwrap();
        let names: Vec<&str> = ancestry.iter().map(|a| a.definition.full_name.as_str()).collect();
        assert_eq!(names, vec!["MyApp.IntStore", "MyApp.Store`1", known::OBJECT]);
        assert_eq!(
            ancestry[1].substitution.get("T"),
            Some(&TypeRef::named(known::INT32))
        );
    }

    #[test]
    fn test_ancestry_rejects_multiple_class_bases() {
        let a = TypeDef::new(TypeKind::Class, "MyApp.A");
        let b = TypeDef::new(TypeKind::Class, "MyApp.B");
        let c = TypeDef::new(TypeKind::Class, "MyApp.C")
            .with_base(TypeRef::named("MyApp.A"))
            .with_base(TypeRef::named("MyApp.B"));
        let ts = snapshot(vec![a, b, c]);

        let result = non_interface_ancestry(&ts, ts.find_type("MyApp.C").unwrap());
        assert!(matches!(result, Err(Error::Inconsistency(_))));
    }

    #[test]
    fn test_ancestry_rejects_cycles() {
        let a = TypeDef::new(TypeKind::Class, "MyApp.A").with_base(TypeRef::named("MyApp.B"));
        let b = TypeDef::new(TypeKind::Class, "MyApp.B").with_base(TypeRef::named("MyApp.A"));
        let ts = snapshot(vec![a, b]);

        let result = non_interface_ancestry(&ts, ts.find_type("MyApp.A").unwrap());
        assert!(matches!(result, Err(Error::Inconsistency(_))));
    }

    #[test]
    fn test_accessible_members_hide_overridden_and_private() {
        let ts = snapshot(vec![store(), int_store()]);
        let members = accessible_members(&ts, ts.find_type("MyApp.IntStore").unwrap()).unwrap();

        let value = members.properties.iter().find(|p| p.member.name == "Value").unwrap();
        assert_eq!(value.declaring_type, "MyApp.Store`1");
        assert_eq!(value.member.ty, TypeRef::named(known::INT32));
        assert_eq!(value.doc_id, "P:MyApp.Store`1.Value");
        assert!(!members.properties.iter().any(|p| p.member.name == "Secret"));

        let describe: Vec<_> = members.methods.iter().filter(|m| m.member.name == "Describe").collect();
        assert_eq!(describe.len(), 1);
        assert_eq!(describe[0].declaring_type, "MyApp.IntStore");
        assert_eq!(describe[0].overridden_in.as_deref(), Some("MyApp.Store`1"));

        let to_string: Vec<_> = members.methods.iter().filter(|m| m.member.name == "ToString").collect();
        assert_eq!(to_string.len(), 1);
        assert_eq!(to_string[0].declaring_type, "MyApp.Store`1");
        assert_eq!(to_string[0].overridden_in.as_deref(), Some(known::OBJECT));
    }

    #[test]
    fn test_generic_method_overloads_and_renamed_overrides() {
        let base = TypeDef::new(TypeKind::Class, "MyApp.Repo")
            .with_base(TypeRef::named(known::OBJECT))
            .with_method(Method::new("Get", TypeRef::named(known::OBJECT)))
            .with_method(Method::new("Get", TypeRef::param("T")).with_type_parameters(&["T"]))
            .with_method(
                Method::new("Map", TypeRef::param("T"))
                    .with_type_parameters(&["T"])
                    .with_parameter("item", TypeRef::param("T")),
            );
        let derived = TypeDef::new(TypeKind::Class, "MyApp.OrderRepo")
            .with_base(TypeRef::named("MyApp.Repo"))
            .with_method(
                Method::new("Map", TypeRef::param("U"))
                    .with_type_parameters(&["U"])
                    .with_parameter("item", TypeRef::param("U"))
                    .with_override(),
            );
        let ts = snapshot(vec![base, derived]);

        let members = accessible_members(&ts, ts.find_type("MyApp.Repo").unwrap()).unwrap();
        let gets = members.methods.iter().filter(|m| m.member.name == "Get").count();
        assert_eq!(gets, 2);

        let members = accessible_members(&ts, ts.find_type("MyApp.OrderRepo").unwrap()).unwrap();
        let maps: Vec<_> = members.methods.iter().filter(|m| m.member.name == "Map").collect();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].declaring_type, "MyApp.OrderRepo");
        assert_eq!(maps[0].overridden_in.as_deref(), Some("MyApp.Repo"));
        assert_eq!(members.methods.iter().filter(|m| m.member.name == "Get").count(), 2);
    }

    #[test]
    fn test_all_base_types_of_closed_list() {
        let ts = snapshot(Vec::new());
        let list = TypeRef::generic(known::LIST, vec![TypeRef::named("MyApp.Order")]);

        let bases = all_base_types(&ts, &list).unwrap();
        assert_eq!(bases[0], list);
        assert!(bases.contains(&TypeRef::generic(
            known::IENUMERABLE_T,
            vec![TypeRef::named("MyApp.Order")]
        )));
        assert!(bases.contains(&TypeRef::named(known::IENUMERABLE)));
    }
}
