//! AST types shared by the schema and query grammars.

pub mod executable;
pub mod service;

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use liteql_value::{Name, Value};

use crate::pos::Positioned;

/// A type reference such as `User`, `User!`, `[User]`, or `[[User!]!]`.
///
/// Lists and non-null wrappers nest: nullability is a modifier on each
/// wrapper layer, not a property of the base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Type {
    pub base: BaseType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BaseType {
    Named(Name),
    List(Box<Type>),
}

impl Type {
    pub fn named(name: impl Into<String>, nullable: bool) -> Self {
        Type {
            base: BaseType::Named(Name::new(name)),
            nullable,
        }
    }

    /// The innermost named type, with all list wrappers stripped.
    pub fn base_name(&self) -> &Name {
        match &self.base {
            BaseType::Named(name) => name,
            BaseType::List(element) => element.base_name(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.base, BaseType::List(_))
    }

    /// The element type of the outermost list wrapper, if any.
    pub fn element_type(&self) -> Option<&Type> {
        match &self.base {
            BaseType::Named(_) => None,
            BaseType::List(element) => Some(element),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Named(name) => write!(f, "{name}")?,
            BaseType::List(element) => write!(f, "[{element}]")?,
        }
        if !self.nullable {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// A directive application such as `@skip(if: true)`. In the schema grammar
/// argument values are const (the parser rejects variables).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub name: Positioned<Name>,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
}

impl Directive {
    pub fn get_argument(&self, name: &str) -> Option<&Positioned<Value>> {
        self.arguments
            .iter()
            .find(|(argument_name, _)| argument_name.node == *name)
            .map(|(_, value)| value)
    }
}
