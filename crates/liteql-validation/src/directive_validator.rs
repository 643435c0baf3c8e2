use liteql_parser::schema::MergedSchema;
use liteql_parser::types::service::DirectiveLocation;
use liteql_parser::types::Directive;
use liteql_parser::Positioned;

use crate::arguments_validator::ArgumentValidator;
use crate::validation_error::ValidationError;

/// Validates a directive usage: the directive must be defined, allowed at
/// the usage location, and its arguments must validate against the
/// definition.
pub(crate) struct DirectiveValidator<'a> {
    schema: &'a MergedSchema,
}

impl<'a> DirectiveValidator<'a> {
    pub(crate) fn new(schema: &'a MergedSchema) -> Self {
        Self { schema }
    }

    pub(crate) fn validate(
        &self,
        directive: &Positioned<Directive>,
        location: DirectiveLocation,
    ) -> Result<(), ValidationError> {
        let name = directive.node.name.node.as_str();
        let definition = self
            .schema
            .get_directive_definition(name)
            .ok_or_else(|| ValidationError::DirectiveNotDefined(name.to_string()))?;

        if !definition.locations.iter().any(|l| l.node == location) {
            return Err(ValidationError::DirectiveNotAllowed {
                directive: name.to_string(),
                location,
            });
        }

        ArgumentValidator::new(self.schema)
            .validate(&directive.node.arguments, &definition.arguments)
            .map_err(|e| ValidationError::Directive {
                directive: name.to_string(),
                source: Box::new(e),
            })
    }
}
