use liteql_parser::schema::MergedSchema;
use liteql_parser::types::service::{EnumType, InputObjectType, InputValueDefinition, TypeKind};
use liteql_parser::types::{BaseType, Type};
use liteql_parser::Positioned;
use liteql_value::{Name, Value};

use crate::validation_error::ValidationError;

/// Validates supplied arguments against their definitions: required
/// arguments present, no stray arguments, literal values coercible to the
/// declared types. Used for field arguments, directive arguments, and
/// (recursively) input object fields.
pub(crate) struct ArgumentValidator<'a> {
    schema: &'a MergedSchema,
}

impl<'a> ArgumentValidator<'a> {
    pub(crate) fn new(schema: &'a MergedSchema) -> Self {
        Self { schema }
    }

    pub(crate) fn validate(
        &self,
        supplied: &[(Positioned<Name>, Positioned<Value>)],
        definitions: &[Positioned<InputValueDefinition>],
    ) -> Result<(), ValidationError> {
        let missing: Vec<String> = definitions
            .iter()
            .filter(|definition| definition.node.is_required())
            .filter(|definition| {
                !supplied
                    .iter()
                    .any(|(name, _)| name.node == definition.node.name.node)
            })
            .map(|definition| definition.node.name.node.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequiredArguments(missing));
        }

        for (name, value) in supplied {
            let argument_name = name.node.as_str();
            match definitions
                .iter()
                .find(|definition| definition.node.name.node == name.node)
            {
                None => {
                    return Err(ValidationError::Argument {
                        argument: argument_name.to_string(),
                        source: Box::new(ValidationError::ArgumentNotDefined(
                            argument_name.to_string(),
                        )),
                    });
                }
                Some(definition) => {
                    self.validate_value(&value.node, &definition.node.ty.node)
                        .map_err(|e| e.in_argument_value(argument_name))?;
                }
            }
        }

        Ok(())
    }

    /// Literal coercion. Variables are accepted without inspection; only
    /// literals are checked against the declared type.
    fn validate_value(&self, value: &Value, ty: &Type) -> Result<(), ValidationError> {
        match value {
            Value::Variable(_) => Ok(()),
            Value::Null => {
                if ty.nullable {
                    Ok(())
                } else {
                    Err(self.expected(ty, value))
                }
            }
            _ => match &ty.base {
                BaseType::List(element) => match value {
                    Value::List(items) => {
                        for item in items {
                            self.validate_value(item, element)?;
                        }
                        Ok(())
                    }
                    // A single value coerces to a one-element list.
                    other => self.validate_value(other, element),
                },
                BaseType::Named(name) => self.validate_named(value, name),
            },
        }
    }

    fn validate_named(&self, value: &Value, name: &Name) -> Result<(), ValidationError> {
        match name.as_str() {
            "Boolean" => match value {
                Value::Boolean(_) => Ok(()),
                _ => Err(ValidationError::ExpectedBoolean(value.clone())),
            },
            "Int" => match value {
                Value::Int(_) => Ok(()),
                _ => Err(ValidationError::ExpectedInt(value.clone())),
            },
            "Float" => match value {
                Value::Int(_) | Value::Float(_) => Ok(()),
                _ => Err(ValidationError::ExpectedFloat(value.clone())),
            },
            "String" => match value {
                Value::String(_) => Ok(()),
                _ => Err(ValidationError::ExpectedString(value.clone())),
            },
            "ID" => match value {
                Value::String(_) | Value::Int(_) => Ok(()),
                _ => Err(ValidationError::ExpectedId(value.clone())),
            },
            _ => match self.schema.get_type_definition(name.as_str()) {
                Some(definition) => match &definition.kind {
                    TypeKind::Enum(enum_type) => self.validate_enum(value, name, enum_type),
                    TypeKind::InputObject(input) => self.validate_object(value, input),
                    // Custom scalars are opaque; any literal is accepted.
                    _ => Ok(()),
                },
                None => Ok(()),
            },
        }
    }

    fn validate_enum(
        &self,
        value: &Value,
        ty: &Name,
        enum_type: &EnumType,
    ) -> Result<(), ValidationError> {
        match value {
            Value::Enum(name) if enum_type.has_value(name.as_str()) => Ok(()),
            _ => Err(ValidationError::ExpectedEnum {
                ty: ty.to_string(),
                value: value.clone(),
            }),
        }
    }

    fn validate_object(
        &self,
        value: &Value,
        input: &InputObjectType,
    ) -> Result<(), ValidationError> {
        let Value::Object(entries) = value else {
            return Err(ValidationError::ExpectedObject(value.clone()));
        };

        let missing: Vec<String> = input
            .fields
            .iter()
            .filter(|field| field.node.is_required())
            .filter(|field| !entries.contains_key(field.node.name.node.as_str()))
            .map(|field| field.node.name.node.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequiredArguments(missing));
        }

        for (key, entry) in entries {
            match input
                .fields
                .iter()
                .find(|field| field.node.name.node == *key)
            {
                None => {
                    return Err(ValidationError::Argument {
                        argument: key.to_string(),
                        source: Box::new(ValidationError::ArgumentNotDefined(key.to_string())),
                    });
                }
                Some(field) => {
                    self.validate_value(entry, &field.node.ty.node)
                        .map_err(|e| e.in_argument_value(key.as_str()))?;
                }
            }
        }

        Ok(())
    }

    /// The coercion error for a value that cannot inhabit `ty`, keyed by the
    /// innermost named type.
    fn expected(&self, ty: &Type, value: &Value) -> ValidationError {
        let base = ty.base_name();
        match base.as_str() {
            "Boolean" => ValidationError::ExpectedBoolean(value.clone()),
            "Int" => ValidationError::ExpectedInt(value.clone()),
            "Float" => ValidationError::ExpectedFloat(value.clone()),
            "String" => ValidationError::ExpectedString(value.clone()),
            "ID" => ValidationError::ExpectedId(value.clone()),
            _ => match self.schema.get_type_definition(base.as_str()).map(|td| &td.kind) {
                Some(TypeKind::Enum(_)) => ValidationError::ExpectedEnum {
                    ty: base.to_string(),
                    value: value.clone(),
                },
                Some(TypeKind::InputObject(_)) => ValidationError::ExpectedObject(value.clone()),
                _ => ValidationError::ExpectedValue {
                    ty: base.to_string(),
                    value: value.clone(),
                },
            },
        }
    }
}
