//! Validation errors.
//!
//! The rendered message is an external contract: each recursion boundary
//! wraps its child in a prefix (`error validating field <f>: …`), and the
//! chain is produced by `Display` walking through the boxed sources. Tests
//! pin the exact strings.

use thiserror::Error;

use liteql_parser::types::service::DirectiveLocation;
use liteql_parser::ParseError;
use liteql_value::Value;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("error validating operations: {0}")]
    Operations(Box<ValidationError>),

    #[error("error validating field {field}: {source}")]
    Field {
        field: String,
        source: Box<ValidationError>,
    },

    #[error("field {0} is not defined in schema")]
    RootFieldNotDefined(String),

    #[error("field {field} is not defined on {ty} in schema")]
    FieldNotDefined { field: String, ty: String },

    #[error("type {0} is not defined in schema")]
    TypeNotDefined(String),

    #[error("union type {0} must have subfields")]
    UnionWithoutSubfields(String),

    #[error("type {0} must have subfields")]
    TypeWithoutSubfields(String),

    #[error("field {0} must not have subfields")]
    UnexpectedSubfields(String),

    #[error("missing required arguments: [{}]", .0.join(", "))]
    MissingRequiredArguments(Vec<String>),

    #[error("error validating directive {directive}: {source}")]
    Directive {
        directive: String,
        source: Box<ValidationError>,
    },

    #[error("directive {0} is not defined")]
    DirectiveNotDefined(String),

    #[error("directive {directive} is not allowed at location {location}")]
    DirectiveNotAllowed {
        directive: String,
        location: DirectiveLocation,
    },

    #[error("error validating argument {argument}: {source}")]
    Argument {
        argument: String,
        source: Box<ValidationError>,
    },

    #[error("error validating value for argument {argument}: {source}")]
    ArgumentValue {
        argument: String,
        source: Box<ValidationError>,
    },

    #[error("argument {0} is not defined")]
    ArgumentNotDefined(String),

    #[error("expected boolean value, got {0}")]
    ExpectedBoolean(Value),

    #[error("expected int value, got {0}")]
    ExpectedInt(Value),

    #[error("expected float value, got {0}")]
    ExpectedFloat(Value),

    #[error("expected string value, got {0}")]
    ExpectedString(Value),

    #[error("expected id value, got {0}")]
    ExpectedId(Value),

    #[error("expected enum value of {ty}, got {value}")]
    ExpectedEnum { ty: String, value: Value },

    #[error("expected object value, got {0}")]
    ExpectedObject(Value),

    #[error("expected value of type {ty}, got {value}")]
    ExpectedValue { ty: String, value: Value },

    #[error("fragment {0} is not defined")]
    FragmentNotDefined(String),

    #[error("fragment {name} is based on type {fragment_type}, but field is of type {field_type}")]
    FragmentTypeMismatch {
        name: String,
        fragment_type: String,
        field_type: String,
    },

    #[error("fragment {0} is recursively spread")]
    RecursiveFragment(String),
}

impl ValidationError {
    /// Wrap an error in the prefix for the field whose validation produced
    /// it.
    pub(crate) fn in_field(self, field: &str) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap an error in the per-argument prefix chain.
    pub(crate) fn in_argument_value(self, argument: &str) -> Self {
        ValidationError::Argument {
            argument: argument.to_string(),
            source: Box::new(ValidationError::ArgumentValue {
                argument: argument.to_string(),
                source: Box::new(self),
            }),
        }
    }
}
