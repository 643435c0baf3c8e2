//! Executable document (query) definitions.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use liteql_value::{Name, Value};

use crate::pos::Positioned;
use crate::types::{Directive, Type};

/// A parsed executable document: operations in document order, fragment
/// definitions keyed by name.
///
/// Fragments may reference each other (and themselves) by name; consumers
/// resolve spreads through this map rather than through back-pointers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutableDocument {
    pub operations: Vec<Positioned<OperationDefinition>>,
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
}

impl ExecutableDocument {
    pub fn get_fragment(&self, name: &str) -> Option<&Positioned<FragmentDefinition>> {
        self.fragments.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDefinition {
    pub ty: OperationType,
    pub name: Option<Positioned<Name>>,
    pub variable_definitions: Vec<Positioned<VariableDefinition>>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDefinition {
    pub name: Positioned<Name>,
    pub var_type: Positioned<Type>,
    pub default_value: Option<Positioned<Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SelectionSet {
    pub items: Vec<Positioned<Selection>>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Selection {
    Field(Positioned<Field>),
    FragmentSpread(Positioned<FragmentSpread>),
    InlineFragment(Positioned<InlineFragment>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub alias: Option<Positioned<Name>>,
    pub name: Positioned<Name>,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

impl Field {
    /// The key this field appears under in a response: the alias when
    /// present, the field name otherwise.
    pub fn response_key(&self) -> &Positioned<Name> {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentSpread {
    pub fragment_name: Positioned<Name>,
    pub directives: Vec<Positioned<Directive>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineFragment {
    pub type_condition: Option<Positioned<TypeCondition>>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCondition {
    pub on: Positioned<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentDefinition {
    pub type_condition: Positioned<TypeCondition>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}
