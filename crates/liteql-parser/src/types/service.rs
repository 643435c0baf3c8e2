//! Type-system (SDL) definitions.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use liteql_value::{Name, Value};

use crate::pos::Positioned;
use crate::types::{Directive, Type};

/// A type definition or, when `extend` is set, an extension of a previously
/// defined type. Extensions are folded into their base during merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub extend: bool,
    pub description: Option<Positioned<String>>,
    pub name: Positioned<Name>,
    pub directives: Vec<Positioned<Directive>>,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeKind {
    Scalar,
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl TypeDefinition {
    /// Output fields, for object and interface types.
    pub fn fields(&self) -> Option<&Vec<Positioned<FieldDefinition>>> {
        match &self.kind {
            TypeKind::Object(object) => Some(&object.fields),
            TypeKind::Interface(interface) => Some(&interface.fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Positioned<FieldDefinition>> {
        self.fields()
            .and_then(|fields| fields.iter().find(|f| f.node.name.node == *name))
    }

    /// Interfaces this type declares it implements.
    pub fn implements(&self) -> &[Positioned<Name>] {
        match &self.kind {
            TypeKind::Object(object) => &object.implements,
            TypeKind::Interface(interface) => &interface.implements,
            _ => &[],
        }
    }

    /// Whether selections on a field of this type must have subfields.
    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Object(_) | TypeKind::Interface(_) | TypeKind::Union(_)
        )
    }

    /// The SDL keyword for this definition's kind.
    pub fn kind_keyword(&self) -> &'static str {
        match &self.kind {
            TypeKind::Scalar => "scalar",
            TypeKind::Object(_) => "type",
            TypeKind::Interface(_) => "interface",
            TypeKind::Union(_) => "union",
            TypeKind::Enum(_) => "enum",
            TypeKind::InputObject(_) => "input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectType {
    pub implements: Vec<Positioned<Name>>,
    pub fields: Vec<Positioned<FieldDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceType {
    pub implements: Vec<Positioned<Name>>,
    pub fields: Vec<Positioned<FieldDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionType {
    pub members: Vec<Positioned<Name>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    pub values: Vec<Positioned<EnumValueDefinition>>,
}

impl EnumType {
    pub fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|v| v.node.value.node == *name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueDefinition {
    pub description: Option<Positioned<String>>,
    pub value: Positioned<Name>,
    pub directives: Vec<Positioned<Directive>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputObjectType {
    pub fields: Vec<Positioned<InputValueDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub description: Option<Positioned<String>>,
    pub name: Positioned<Name>,
    pub arguments: Vec<Positioned<InputValueDefinition>>,
    pub ty: Positioned<Type>,
    pub directives: Vec<Positioned<Directive>>,
}

/// An argument definition or an input object field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputValueDefinition {
    pub description: Option<Positioned<String>>,
    pub name: Positioned<Name>,
    pub ty: Positioned<Type>,
    pub default_value: Option<Positioned<Value>>,
    pub directives: Vec<Positioned<Directive>>,
}

impl InputValueDefinition {
    /// Required means non-null with no default.
    pub fn is_required(&self) -> bool {
        !self.ty.node.nullable && self.default_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveDefinition {
    pub description: Option<Positioned<String>>,
    pub name: Positioned<Name>,
    pub arguments: Vec<Positioned<InputValueDefinition>>,
    pub repeatable: bool,
    pub locations: Vec<Positioned<DirectiveLocation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    pub fn parse(name: &str) -> Option<Self> {
        let location = match name {
            "QUERY" => DirectiveLocation::Query,
            "MUTATION" => DirectiveLocation::Mutation,
            "SUBSCRIPTION" => DirectiveLocation::Subscription,
            "FIELD" => DirectiveLocation::Field,
            "FRAGMENT_DEFINITION" => DirectiveLocation::FragmentDefinition,
            "FRAGMENT_SPREAD" => DirectiveLocation::FragmentSpread,
            "INLINE_FRAGMENT" => DirectiveLocation::InlineFragment,
            "VARIABLE_DEFINITION" => DirectiveLocation::VariableDefinition,
            "SCHEMA" => DirectiveLocation::Schema,
            "SCALAR" => DirectiveLocation::Scalar,
            "OBJECT" => DirectiveLocation::Object,
            "FIELD_DEFINITION" => DirectiveLocation::FieldDefinition,
            "ARGUMENT_DEFINITION" => DirectiveLocation::ArgumentDefinition,
            "INTERFACE" => DirectiveLocation::Interface,
            "UNION" => DirectiveLocation::Union,
            "ENUM" => DirectiveLocation::Enum,
            "ENUM_VALUE" => DirectiveLocation::EnumValue,
            "INPUT_OBJECT" => DirectiveLocation::InputObject,
            "INPUT_FIELD_DEFINITION" => DirectiveLocation::InputFieldDefinition,
            _ => return None,
        };
        Some(location)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::Schema => "SCHEMA",
            DirectiveLocation::Scalar => "SCALAR",
            DirectiveLocation::Object => "OBJECT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
            DirectiveLocation::Interface => "INTERFACE",
            DirectiveLocation::Union => "UNION",
            DirectiveLocation::Enum => "ENUM",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputObject => "INPUT_OBJECT",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl Display for DirectiveLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicit `schema { query: … }` block binding the root operation types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDefinition {
    pub directives: Vec<Positioned<Directive>>,
    pub query: Option<Positioned<Name>>,
    pub mutation: Option<Positioned<Name>>,
    pub subscription: Option<Positioned<Name>>,
}
