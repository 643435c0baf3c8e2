//! Literal values shared by the schema and query grammars.
//!
//! A [`Value`] is what appears on the right-hand side of an argument
//! (`user(id: 1)`), a variable default (`$limit: Int = 10`), or an input
//! field default in the schema. The [`Display`](std::fmt::Display)
//! rendering is load-bearing: validation error messages quote the offending
//! literal exactly as this module prints it.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

use indexmap::IndexMap;
use serde::Serialize;

/// A GraphQL name (type, field, argument, enum value, fragment, variable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Name(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name::new(name)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A literal value in a query or schema document.
///
/// Variables (`$name`) appear only in executable documents; the schema
/// parser rejects them in const positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(Name),
    Variable(Name),
    List(Vec<Value>),
    Object(IndexMap<Name, Value>),
}

impl Value {
    /// The kind of literal, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Enum(_) => "enum",
            Value::Variable(_) => "variable",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Null => f.write_str("null"),
            Value::Enum(name) => write!(f, "{name}"),
            Value::Variable(name) => write!(f, "${name}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Int(123).to_string(), "123");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::String("not a boolean".to_string()).to_string(),
            "\"not a boolean\""
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(Value::Enum(Name::new("ADMIN")).to_string(), "ADMIN");
        assert_eq!(Value::Variable(Name::new("id")).to_string(), "$id");
    }

    #[test]
    fn display_compound() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.to_string(), "[1, 2]");

        let mut entries = IndexMap::new();
        entries.insert(Name::new("id"), Value::Int(1));
        entries.insert(Name::new("name"), Value::String("ada".to_string()));
        assert_eq!(
            Value::Object(entries).to_string(),
            "{id: 1, name: \"ada\"}"
        );
    }

    #[test]
    fn name_lookup_by_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(Name::new("UserFragment"), 1);
        assert_eq!(map.get("UserFragment"), Some(&1));
    }

    #[test]
    fn serializes_as_plain_strings() {
        let name = Name::new("User");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"User\"");
    }
}
