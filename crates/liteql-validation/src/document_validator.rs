use tracing::instrument;

use liteql_parser::schema::MergedSchema;
use liteql_parser::types::executable::{ExecutableDocument, OperationDefinition, OperationType};
use liteql_parser::types::service::DirectiveLocation;
use liteql_parser::QueryParser;

use crate::directive_validator::DirectiveValidator;
use crate::selection_set_validator::SelectionSetValidator;
use crate::validation_error::ValidationError;

/// Validates executable documents against a merged schema.
///
/// The validator borrows the schema for its lifetime and owns the query
/// parser it uses; it holds no other state, so a single instance can check
/// any number of documents, and repeated validation of the same bytes
/// yields the same result.
pub struct Validator<'a> {
    schema: &'a MergedSchema,
    parser: QueryParser,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a MergedSchema, parser: QueryParser) -> Self {
        Self { schema, parser }
    }

    /// Parse `query` and walk each operation against its root type,
    /// depth-first and left-to-right. The first error aborts the walk.
    #[instrument(name = "Validator::validate", skip_all)]
    pub fn validate(&self, query: &[u8]) -> Result<(), ValidationError> {
        let document = self.parser.parse(query)?;
        for operation in &document.operations {
            self.validate_operation(&operation.node, &document)
                .map_err(|e| ValidationError::Operations(Box::new(e)))?;
        }
        Ok(())
    }

    fn validate_operation(
        &self,
        operation: &OperationDefinition,
        document: &ExecutableDocument,
    ) -> Result<(), ValidationError> {
        let root_name = self.schema.root_operation_name(operation.ty);
        let root = self
            .schema
            .get_type_definition(root_name.as_str())
            .ok_or_else(|| ValidationError::TypeNotDefined(root_name.to_string()))?;

        let location = match operation.ty {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        };
        let directive_validator = DirectiveValidator::new(self.schema);
        for directive in &operation.directives {
            directive_validator.validate(directive, location)?;
        }

        let mut selection_set_validator =
            SelectionSetValidator::new(self.schema, &document.fragments);
        selection_set_validator.validate(&operation.selection_set, root, true)
    }
}
