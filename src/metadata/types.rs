// Pure-data model of .NET type metadata
//
// A snapshot of these types is materialized once from whatever reads the
// assembly and is never mutated afterwards. Everything downstream runs over
// this model only.

use crate::metadata::known;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps generic type parameter names to the arguments they are bound to
pub type Substitution = HashMap<String, TypeRef>;

/// A reference to a type, e.g. the type of a property or a base type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRef {
    /// A type definition by reflection name, e.g. `System.Int32` or the open
    /// generic definition `MyApp.Store`1`
    Type(String),
    /// A parameterized instantiation of a generic definition, e.g. `Store<int>`
    Generic {
        definition: String,
        arguments: Vec<TypeRef>,
    },
    /// A single-dimensional or multi-dimensional array
    Array(Box<TypeRef>),
    /// A `ref`/`out` parameter type
    ByReference(Box<TypeRef>),
    /// An open generic type parameter, e.g. `T`
    TypeParameter(String),
    /// The dynamic typing marker
    Dynamic,
}

impl TypeRef {
    /// Reference a type definition by its reflection name
    pub fn named(full_name: impl Into<String>) -> Self {
        TypeRef::Type(full_name.into())
    }

    /// Reference a closed (or partially closed) generic instantiation
    pub fn generic(definition: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Generic {
            definition: definition.into(),
            arguments,
        }
    }

    /// Reference `System.Nullable<inner>`
    pub fn nullable(inner: TypeRef) -> Self {
        Self::generic(known::NULLABLE, vec![inner])
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn by_reference(element: TypeRef) -> Self {
        TypeRef::ByReference(Box::new(element))
    }

    pub fn param(name: impl Into<String>) -> Self {
        TypeRef::TypeParameter(name.into())
    }

    /// The reflection name of the referenced definition, if this references one.
    /// Closed generics return their open generic definition.
    pub fn definition_name(&self) -> Option<&str> {
        match self {
            TypeRef::Type(name) => Some(name),
            TypeRef::Generic { definition, .. } => Some(definition),
            _ => None,
        }
    }

    /// Whether this is a closed generic instantiation
    pub fn is_parameterized(&self) -> bool {
        matches!(self, TypeRef::Generic { .. })
    }

    /// The generic arguments of a parameterized type
    pub fn arguments(&self) -> &[TypeRef] {
        match self {
            TypeRef::Generic { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// The wrapped type if this is `System.Nullable<T>`
    pub fn nullable_inner(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Generic {
                definition,
                arguments,
            } if definition == known::NULLABLE && arguments.len() == 1 => arguments.first(),
            _ => None,
        }
    }

    /// Whether this references the universal base type `System.Object`
    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Type(name) if name == known::OBJECT)
    }

    /// Replace bound type parameters with their arguments
    pub fn substitute(&self, substitution: &Substitution) -> TypeRef {
        if substitution.is_empty() {
            return self.clone();
        }

        match self {
            TypeRef::TypeParameter(name) => substitution
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Generic {
                definition,
                arguments,
            } => TypeRef::Generic {
                definition: definition.clone(),
                arguments: arguments.iter().map(|a| a.substitute(substitution)).collect(),
            },
            TypeRef::Array(element) => TypeRef::Array(Box::new(element.substitute(substitution))),
            TypeRef::ByReference(element) => {
                TypeRef::ByReference(Box::new(element.substitute(substitution)))
            }
            TypeRef::Type(_) | TypeRef::Dynamic => self.clone(),
        }
    }

    /// Collect the reflection names of all definitions this reference mentions
    pub fn collect_definitions<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeRef::Type(name) => names.push(name),
            TypeRef::Generic {
                definition,
                arguments,
            } => {
                names.push(definition);
                for argument in arguments {
                    argument.collect_definitions(names);
                }
            }
            TypeRef::Array(element) | TypeRef::ByReference(element) => {
                element.collect_definitions(names)
            }
            TypeRef::TypeParameter(_) | TypeRef::Dynamic => {}
        }
    }
}

/// Member accessibility as declared in metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Accessibility {
    None,
    Private,
    /// `private protected`: protected and internal
    PrivateProtected,
    Internal,
    Protected,
    /// `protected internal`: protected or internal
    ProtectedInternal,
    #[default]
    Public,
}

/// Kind of a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    /// The `<Module>` pseudo-type holding top-level functions
    Module,
}

/// Name and version of the assembly a snapshot was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssemblyInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A method or indexer parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A property declared by a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default)]
    pub is_indexer: bool,
    /// Indexer parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl Property {
    /// Create a public instance property
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            accessibility: Accessibility::Public,
            is_static: false,
            is_abstract: false,
            is_override: false,
            is_indexer: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_override(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// Turn this into an indexer (conventionally named `Item`)
    pub fn with_indexer(mut self, parameters: Vec<Parameter>) -> Self {
        self.is_indexer = true;
        self.parameters = parameters;
        self
    }
}

/// A field declared by a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_compiler_generated: bool,
}

impl Field {
    /// Create a private instance field
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            accessibility: Accessibility::Private,
            is_static: false,
            is_const: false,
            is_compiler_generated: false,
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Constants are implicitly static
    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self.is_static = true;
        self
    }

    pub fn with_compiler_generated(mut self) -> Self {
        self.is_compiler_generated = true;
        self
    }
}

/// The interface member a method implements explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitImplementation {
    pub interface: TypeRef,
    pub member: String,
}

/// A method declared by a type (property and event accessors excluded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    #[serde(default = "void")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default)]
    pub is_operator: bool,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub is_compiler_generated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_implementation: Option<ExplicitImplementation>,
}

fn void() -> TypeRef {
    TypeRef::named(known::VOID)
}

impl Method {
    /// Create a public instance method
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type,
            accessibility: Accessibility::Public,
            is_static: false,
            is_abstract: false,
            is_override: false,
            is_operator: false,
            is_constructor: false,
            is_compiler_generated: false,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            explicit_implementation: None,
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    pub fn with_type_parameters(mut self, names: &[&str]) -> Self {
        self.type_parameters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_override(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn with_operator(mut self) -> Self {
        self.is_operator = true;
        self.is_static = true;
        self
    }

    pub fn with_constructor(mut self) -> Self {
        self.is_constructor = true;
        self
    }

    pub fn with_compiler_generated(mut self) -> Self {
        self.is_compiler_generated = true;
        self
    }

    pub fn with_explicit_implementation(mut self, interface: TypeRef, member: &str) -> Self {
        self.explicit_implementation = Some(ExplicitImplementation {
            interface,
            member: member.to_string(),
        });
        self
    }

    /// Signature key used to match overrides against base declarations.
    /// Method type parameters are keyed by position (`!!0`), so `Map<T>(T)`
    /// and `Map<U>(U)` match while `Get()` and `Get<T>()` stay apart.
    pub fn signature(&self) -> (String, usize, Vec<TypeRef>) {
        let positions: Substitution = self
            .type_parameters
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), TypeRef::param(format!("!!{}", i))))
            .collect();

        (
            self.name.clone(),
            self.type_parameters.len(),
            self.parameters.iter().map(|p| p.ty.substitute(&positions)).collect(),
        )
    }
}

/// A type definition with its declared members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    /// Reflection name: namespace dots, `+` for nesting, `` `n`` for generic arity
    pub full_name: String,
    /// Short name without namespace, declaring types or generic arity
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Reflection name of the declaring type of a nested type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub is_compiler_generated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    /// Direct base class and directly implemented interfaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
}

impl TypeDef {
    /// Create a type definition, deriving name, namespace and declaring type
    /// from the reflection name
    pub fn new(kind: TypeKind, full_name: impl Into<String>) -> Self {
        let mut def = Self {
            full_name: full_name.into(),
            name: String::new(),
            namespace: String::new(),
            declaring_type: None,
            kind,
            is_abstract: false,
            is_sealed: false,
            is_compiler_generated: false,
            type_parameters: Vec::new(),
            base_types: Vec::new(),
            properties: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        };
        def.derive_names();
        def
    }

    /// Fill in name, namespace and declaring type where they were left empty
    pub fn derive_names(&mut self) {
        let (namespace, name, declaring_type) = split_reflection_name(&self.full_name);

        if self.name.is_empty() {
            self.name = name;
        }
        if self.namespace.is_empty() {
            self.namespace = namespace;
        }
        if self.declaring_type.is_none() {
            self.declaring_type = declaring_type;
        }
    }

    pub fn with_type_parameters(mut self, names: &[&str]) -> Self {
        self.type_parameters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base_types.push(base);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    pub fn with_compiler_generated(mut self) -> Self {
        self.is_compiler_generated = true;
        self
    }

    /// A reference to this (open) definition
    pub fn reference(&self) -> TypeRef {
        TypeRef::named(self.full_name.clone())
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_object(&self) -> bool {
        self.full_name == known::OBJECT
    }

    /// Bind this definition's type parameters to the arguments of `reference`
    pub fn substitution_for(&self, reference: &TypeRef) -> Substitution {
        self.type_parameters
            .iter()
            .cloned()
            .zip(reference.arguments().iter().cloned())
            .collect()
    }
}

/// Split a reflection name into namespace, short name and declaring type
fn split_reflection_name(full_name: &str) -> (String, String, Option<String>) {
    let (outermost, simple, declaring_type) = match full_name.rfind('+') {
        Some(last) => {
            let first = full_name.find('+').unwrap_or(last);
            (
                &full_name[..first],
                &full_name[last + 1..],
                Some(full_name[..last].to_string()),
            )
        }
        None => {
            let simple = full_name.rsplit('.').next().unwrap_or(full_name);
            (full_name, simple, None)
        }
    };

    let namespace = outermost
        .rfind('.')
        .map(|i| outermost[..i].to_string())
        .unwrap_or_default();
    let name = simple.split('`').next().unwrap_or(simple).to_string();

    (namespace, name, declaring_type)
}
