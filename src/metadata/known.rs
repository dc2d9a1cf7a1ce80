// Well-known core library types
//
// Snapshots rarely describe the base class library they reference, so the
// definitions the diagram builder relies on are provided here. Definitions
// supplied by a snapshot take precedence.

use crate::metadata::types::{Accessibility, Method, Parameter, Property, TypeDef, TypeKind, TypeRef};

pub const OBJECT: &str = "System.Object";
pub const VALUE_TYPE: &str = "System.ValueType";
pub const ENUM: &str = "System.Enum";
pub const VOID: &str = "System.Void";
pub const STRING: &str = "System.String";
pub const BOOLEAN: &str = "System.Boolean";
pub const CHAR: &str = "System.Char";
pub const INT32: &str = "System.Int32";
pub const NULLABLE: &str = "System.Nullable`1";
pub const IENUMERABLE: &str = "System.Collections.IEnumerable";
pub const IENUMERATOR: &str = "System.Collections.IEnumerator";
pub const IENUMERABLE_T: &str = "System.Collections.Generic.IEnumerable`1";
pub const IENUMERATOR_T: &str = "System.Collections.Generic.IEnumerator`1";
pub const ICOLLECTION_T: &str = "System.Collections.Generic.ICollection`1";
pub const ILIST_T: &str = "System.Collections.Generic.IList`1";
pub const LIST: &str = "System.Collections.Generic.List`1";
pub const DICTIONARY: &str = "System.Collections.Generic.Dictionary`2";
pub const KEY_VALUE_PAIR: &str = "System.Collections.Generic.KeyValuePair`2";

/// C# keyword aliases for primitive types
const ALIASES: &[(&str, &str)] = &[
    (OBJECT, "object"),
    (VOID, "void"),
    (BOOLEAN, "bool"),
    (CHAR, "char"),
    ("System.SByte", "sbyte"),
    ("System.Byte", "byte"),
    ("System.Int16", "short"),
    ("System.UInt16", "ushort"),
    (INT32, "int"),
    ("System.UInt32", "uint"),
    ("System.Int64", "long"),
    ("System.UInt64", "ulong"),
    ("System.Single", "float"),
    ("System.Double", "double"),
    ("System.Decimal", "decimal"),
    (STRING, "string"),
    ("System.IntPtr", "nint"),
    ("System.UIntPtr", "nuint"),
];

const PRIMITIVE_STRUCTS: &[&str] = &[
    BOOLEAN,
    CHAR,
    "System.SByte",
    "System.Byte",
    "System.Int16",
    "System.UInt16",
    INT32,
    "System.UInt32",
    "System.Int64",
    "System.UInt64",
    "System.Single",
    "System.Double",
    "System.Decimal",
    "System.IntPtr",
    "System.UIntPtr",
    "System.DateTime",
    "System.DateTimeOffset",
    "System.TimeSpan",
    "System.Guid",
];

/// The C# keyword for a primitive type, if it has one
pub fn csharp_alias(full_name: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(name, _)| *name == full_name)
        .map(|(_, alias)| *alias)
}

/// Whether a reflection name denotes a compiler-generated type,
/// e.g. closures (`<>c`) or anonymous types (`<>f__AnonymousType0`)
pub fn is_compiler_generated_name(name: &str) -> bool {
    name.starts_with("<>") || name.contains(">d__") || name.contains(">c__")
}

/// Definitions for the core library types the diagram builder needs to reason about
pub fn builtin_definitions() -> Vec<TypeDef> {
    let t = || TypeRef::param("T");
    let generic = |definition: &str| TypeRef::generic(definition, vec![TypeRef::param("T")]);
    let object = || TypeRef::named(OBJECT);
    let value_type = || TypeRef::named(VALUE_TYPE);

    let mut defs = vec![
        TypeDef::new(TypeKind::Class, OBJECT)
            .with_method(Method::new("GetType", TypeRef::named("System.Type")))
            .with_method(Method::new("ToString", TypeRef::named(STRING)))
            .with_method(
                Method::new("Equals", TypeRef::named(BOOLEAN)).with_parameter("obj", object()),
            )
            .with_method(Method::new("GetHashCode", TypeRef::named(INT32)))
            .with_method(
                Method::new("Finalize", TypeRef::named(VOID))
                    .with_accessibility(Accessibility::Protected),
            ),
        TypeDef::new(TypeKind::Class, VALUE_TYPE)
            .with_abstract()
            .with_base(object()),
        TypeDef::new(TypeKind::Class, ENUM)
            .with_abstract()
            .with_base(value_type()),
        TypeDef::new(TypeKind::Struct, VOID).with_base(value_type()),
        TypeDef::new(TypeKind::Class, "System.Type")
            .with_abstract()
            .with_base(object()),
        TypeDef::new(TypeKind::Class, STRING)
            .with_sealed()
            .with_base(object())
            .with_base(TypeRef::generic(IENUMERABLE_T, vec![TypeRef::named(CHAR)]))
            .with_base(TypeRef::named(IENUMERABLE)),
        TypeDef::new(TypeKind::Struct, NULLABLE)
            .with_type_parameters(&["T"])
            .with_base(value_type()),
        TypeDef::new(TypeKind::Class, "System.Delegate")
            .with_abstract()
            .with_base(object()),
        TypeDef::new(TypeKind::Class, "System.MulticastDelegate")
            .with_abstract()
            .with_base(TypeRef::named("System.Delegate")),
        TypeDef::new(TypeKind::Class, "System.Attribute")
            .with_abstract()
            .with_base(object()),
        TypeDef::new(TypeKind::Class, "System.Exception")
            .with_base(object())
            .with_property(Property::new("Message", TypeRef::named(STRING)))
            .with_property(Property::new(
                "InnerException",
                TypeRef::named("System.Exception"),
            )),
        TypeDef::new(TypeKind::Class, "System.EventArgs").with_base(object()),
        TypeDef::new(TypeKind::Interface, IENUMERABLE),
        TypeDef::new(TypeKind::Interface, IENUMERATOR)
            .with_property(Property::new("Current", object())),
        TypeDef::new(TypeKind::Interface, "System.Collections.ICollection")
            .with_base(TypeRef::named(IENUMERABLE)),
        TypeDef::new(TypeKind::Interface, "System.Collections.IList")
            .with_base(TypeRef::named("System.Collections.ICollection"))
            .with_property(
                Property::new("Item", object())
                    .with_indexer(vec![Parameter::new("index", TypeRef::named(INT32))]),
            ),
        TypeDef::new(TypeKind::Class, "System.Collections.ArrayList")
            .with_base(object())
            .with_base(TypeRef::named("System.Collections.IList"))
            .with_property(
                Property::new("Item", object())
                    .with_indexer(vec![Parameter::new("index", TypeRef::named(INT32))]),
            ),
        TypeDef::new(TypeKind::Class, "System.Collections.CollectionBase")
            .with_abstract()
            .with_base(object())
            .with_base(TypeRef::named("System.Collections.IList")),
        TypeDef::new(TypeKind::Interface, "System.IDisposable"),
        TypeDef::new(TypeKind::Interface, IENUMERABLE_T)
            .with_type_parameters(&["T"])
            .with_base(TypeRef::named(IENUMERABLE)),
        TypeDef::new(TypeKind::Interface, IENUMERATOR_T)
            .with_type_parameters(&["T"])
            .with_base(TypeRef::named(IENUMERATOR))
            .with_base(TypeRef::named("System.IDisposable"))
            .with_property(Property::new("Current", t())),
        TypeDef::new(TypeKind::Interface, ICOLLECTION_T)
            .with_type_parameters(&["T"])
            .with_base(generic(IENUMERABLE_T)),
        TypeDef::new(TypeKind::Interface, ILIST_T)
            .with_type_parameters(&["T"])
            .with_base(generic(ICOLLECTION_T))
            .with_property(
                Property::new("Item", t())
                    .with_indexer(vec![Parameter::new("index", TypeRef::named(INT32))]),
            ),
        TypeDef::new(
            TypeKind::Interface,
            "System.Collections.Generic.IReadOnlyCollection`1",
        )
        .with_type_parameters(&["T"])
        .with_base(generic(IENUMERABLE_T)),
        TypeDef::new(TypeKind::Interface, "System.Collections.Generic.IReadOnlyList`1")
            .with_type_parameters(&["T"])
            .with_base(generic("System.Collections.Generic.IReadOnlyCollection`1")),
        TypeDef::new(TypeKind::Interface, "System.Collections.Generic.ISet`1")
            .with_type_parameters(&["T"])
            .with_base(generic(ICOLLECTION_T)),
        TypeDef::new(TypeKind::Class, LIST)
            .with_type_parameters(&["T"])
            .with_base(object())
            .with_base(generic(ILIST_T))
            .with_base(generic("System.Collections.Generic.IReadOnlyList`1"))
            .with_base(TypeRef::named("System.Collections.IList")),
        TypeDef::new(TypeKind::Class, "System.Collections.Generic.HashSet`1")
            .with_type_parameters(&["T"])
            .with_base(object())
            .with_base(generic("System.Collections.Generic.ISet`1")),
        TypeDef::new(TypeKind::Class, "System.Collections.ObjectModel.Collection`1")
            .with_type_parameters(&["T"])
            .with_base(object())
            .with_base(generic(ILIST_T)),
        TypeDef::new(TypeKind::Struct, KEY_VALUE_PAIR)
            .with_type_parameters(&["TKey", "TValue"])
            .with_base(value_type())
            .with_property(Property::new("Key", TypeRef::param("TKey")))
            .with_property(Property::new("Value", TypeRef::param("TValue"))),
        TypeDef::new(TypeKind::Class, DICTIONARY)
            .with_type_parameters(&["TKey", "TValue"])
            .with_base(object())
            .with_base(TypeRef::generic(
                ICOLLECTION_T,
                vec![TypeRef::generic(
                    KEY_VALUE_PAIR,
                    vec![TypeRef::param("TKey"), TypeRef::param("TValue")],
                )],
            )),
    ];

    defs.extend(
        PRIMITIVE_STRUCTS
            .iter()
            .map(|name| TypeDef::new(TypeKind::Struct, *name).with_sealed().with_base(value_type())),
    );

    defs
}
