//! Member classification and mermaid member syntax

use crate::diagram::context::DiagramContext;
use crate::diagram::names::{CLOSE_BRACKET, OPEN_BRACKET};
use crate::error::Result;
use crate::metadata::hierarchy::{self, Declared, TypeMembers};
use crate::metadata::{known, Accessibility, Field, Method, Property, TypeDef, TypeRef};

/// A type's accessible members, partitioned the way the diagram renders them
#[derive(Debug, Clone, Default)]
pub struct ClassifiedMembers {
    pub flat: Vec<Declared<Property>>,
    pub has_one: Vec<Declared<Property>>,
    /// Properties holding many of a selected type, with that element type
    pub has_many: Vec<(Declared<Property>, TypeRef)>,
    pub fields: Vec<Declared<Field>>,
    pub methods: Vec<Declared<Method>>,
    /// Dropped module types that flat properties point at
    pub dropped_targets: Vec<TypeRef>,
}

/// Partition the accessible members of `def`
pub fn classify(ctx: &DiagramContext, def: &TypeDef, members: TypeMembers) -> Result<ClassifiedMembers> {
    let mut classified = ClassifiedMembers::default();

    classified.fields = members
        .fields
        .into_iter()
        .filter(|f| !is_hidden_field(&f.member, &members.properties))
        .collect();

    classified.methods = members
        .methods
        .into_iter()
        .filter(|m| is_displayed_method(def, m))
        .collect();

    for property in members.properties {
        let one = property.member.ty.nullable_inner().unwrap_or(&property.member.ty).clone();
        if ctx.is_selected(&one) {
            classified.has_one.push(property);
            continue;
        }

        match element_type(ctx, &property.member.ty)? {
            Some(element) if ctx.is_selected(&element) => {
                classified.has_many.push((property, element));
            }
            element => {
                for target in std::iter::once(one).chain(element) {
                    if ctx.is_dropped_module_type(&target) && !classified.dropped_targets.contains(&target) {
                        classified.dropped_targets.push(target);
                    }
                }
                classified.flat.push(property);
            }
        }
    }

    Ok(classified)
}

/// The element type of an enumerable-shaped type.
///
/// Generic `IEnumerable<T>`/`IEnumerator<T>` shapes yield `T`. For the
/// non-generic shapes the first declared indexer that does not return
/// `object` supplies the element type.
pub fn element_type(ctx: &DiagramContext, ty: &TypeRef) -> Result<Option<TypeRef>> {
    if let TypeRef::Array(element) = ty {
        return Ok(Some((**element).clone()));
    }
    if ty.definition_name().is_none() {
        return Ok(None);
    }

    let bases = hierarchy::all_base_types(ctx.ts, ty)?;

    let generic = bases.iter().find_map(|base| match base {
        TypeRef::Generic {
            definition,
            arguments,
        } if (definition == known::IENUMERABLE_T || definition == known::IENUMERATOR_T)
            && arguments.len() == 1 =>
        {
            arguments.first().cloned()
        }
        _ => None,
    });
    if generic.is_some() {
        return Ok(generic);
    }

    let non_generic = bases.iter().any(|base| {
        matches!(base, TypeRef::Type(name) if name == known::IENUMERABLE || name == known::IENUMERATOR)
    });
    if !non_generic {
        return Ok(None);
    }

    let Some(name) = ty.definition_name() else {
        return Ok(None);
    };
    let def = ctx.ts.resolve(name)?;
    let substitution = def.substitution_for(ty);

    Ok(def
        .properties
        .iter()
        .find(|p| p.is_indexer && !p.ty.is_object())
        .map(|p| p.ty.substitute(&substitution)))
}

/// Compiler-generated fields and manual backing fields of visible properties
fn is_hidden_field(field: &Field, properties: &[Declared<Property>]) -> bool {
    if field.is_compiler_generated || is_auto_property_backing_field(&field.name) {
        return true;
    }

    let name = field.name.strip_prefix('_').unwrap_or(&field.name);
    properties
        .iter()
        .any(|p| p.member.ty == field.ty && p.member.name.eq_ignore_ascii_case(name))
}

fn is_auto_property_backing_field(name: &str) -> bool {
    name.starts_with('<') && name.ends_with(">k__BackingField")
}

/// Operators, constructors, compiler-generated methods and anything inherited
/// from `object` unchanged are left out
fn is_displayed_method(def: &TypeDef, method: &Declared<Method>) -> bool {
    let m = &method.member;
    if m.is_operator || m.is_compiler_generated || m.is_constructor {
        return false;
    }

    method.declaring_type == def.full_name
        || (method.declaring_type != known::OBJECT
            && !(m.is_override && method.overridden_in.as_deref() == Some(known::OBJECT)))
}

/// Single-character mermaid visibility marker
pub fn visibility(accessibility: Accessibility) -> &'static str {
    match accessibility {
        Accessibility::Private => "-",
        Accessibility::PrivateProtected | Accessibility::Internal => "~",
        Accessibility::Protected | Accessibility::ProtectedInternal => "#",
        Accessibility::Public => "+",
        Accessibility::None => "",
    }
}

fn modifier(is_abstract: bool, is_static: bool) -> &'static str {
    if is_abstract {
        "*"
    } else if is_static {
        "$"
    } else {
        ""
    }
}

/// e.g. `+Find❰TKey❱(TKey key, int count)* Order`
pub fn format_method(ctx: &mut DiagramContext, method: &Method) -> Result<String> {
    let mut parameters = Vec::with_capacity(method.parameters.len());
    for parameter in &method.parameters {
        parameters.push(format!("{} {}", ctx.name_of(&parameter.ty)?, parameter.name));
    }

    let name = match &method.explicit_implementation {
        Some(explicit) => format!("{}.{}", ctx.name_of(&explicit.interface)?, explicit.member),
        None => method.name.clone(),
    };

    let type_arguments = if method.type_parameters.is_empty() {
        String::new()
    } else {
        format!(
            "{}{}{}",
            OPEN_BRACKET,
            method.type_parameters.join(", "),
            CLOSE_BRACKET
        )
    };

    Ok(format!(
        "{}{}{}({}){} {}",
        visibility(method.accessibility),
        name,
        type_arguments,
        parameters.join(", "),
        modifier(method.is_abstract, method.is_static),
        ctx.name_of(&method.return_type)?
    ))
}

/// e.g. `+string Name$`
pub fn format_property(ctx: &mut DiagramContext, property: &Property) -> Result<String> {
    Ok(format!(
        "{}{} {}{}",
        visibility(property.accessibility),
        ctx.name_of(&property.ty)?,
        property.name,
        modifier(property.is_abstract, property.is_static)
    ))
}

pub fn format_field(ctx: &mut DiagramContext, field: &Field) -> Result<String> {
    Ok(format!(
        "{}{} {}{}",
        visibility(field.accessibility),
        ctx.name_of(&field.ty)?,
        field.name,
        modifier(false, field.is_static)
    ))
}
