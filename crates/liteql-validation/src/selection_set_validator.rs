use std::collections::HashMap;

use liteql_parser::schema::MergedSchema;
use liteql_parser::types::executable::{
    Field, FragmentDefinition, FragmentSpread, InlineFragment, Selection, SelectionSet,
};
use liteql_parser::types::service::{DirectiveLocation, FieldDefinition, TypeDefinition, TypeKind};
use liteql_parser::Positioned;
use liteql_value::Name;

use crate::arguments_validator::ArgumentValidator;
use crate::directive_validator::DirectiveValidator;
use crate::validation_error::ValidationError;

/// Walks a selection set against a container type, depth-first and
/// left-to-right, stopping at the first error.
///
/// Fragment spreads are resolved through the document's fragment map; the
/// names currently being expanded are tracked so that a spread cycle is
/// reported instead of recursed into.
pub(crate) struct SelectionSetValidator<'a> {
    schema: &'a MergedSchema,
    fragment_definitions: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    active_fragments: Vec<Name>,
}

impl<'a> SelectionSetValidator<'a> {
    pub(crate) fn new(
        schema: &'a MergedSchema,
        fragment_definitions: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    ) -> Self {
        Self {
            schema,
            fragment_definitions,
            active_fragments: vec![],
        }
    }

    pub(crate) fn validate(
        &mut self,
        selection_set: &Positioned<SelectionSet>,
        container: &'a TypeDefinition,
        at_root: bool,
    ) -> Result<(), ValidationError> {
        for selection in &selection_set.node.items {
            match &selection.node {
                Selection::Field(field) => self.validate_field(field, container, at_root)?,
                Selection::FragmentSpread(spread) => {
                    self.validate_fragment_spread(spread, container)?
                }
                Selection::InlineFragment(inline) => {
                    self.validate_inline_fragment(inline, container)?
                }
            }
        }
        Ok(())
    }

    fn validate_field(
        &mut self,
        field: &Positioned<Field>,
        container: &'a TypeDefinition,
        at_root: bool,
    ) -> Result<(), ValidationError> {
        let field_name = field.node.name.node.as_str();
        let Some(definition) = container.field(field_name) else {
            return Err(if at_root {
                ValidationError::RootFieldNotDefined(field_name.to_string())
            } else {
                ValidationError::FieldNotDefined {
                    field: field_name.to_string(),
                    ty: container.name.node.to_string(),
                }
            });
        };

        let directive_validator = DirectiveValidator::new(self.schema);
        for directive in &field.node.directives {
            directive_validator.validate(directive, DirectiveLocation::Field)?;
        }

        let base_name = definition.node.ty.node.base_name();
        match self.schema.get_type_definition(base_name.as_str()) {
            Some(result_type) if result_type.is_composite() => {
                if field.node.selection_set.node.is_empty() {
                    return Err(match &result_type.kind {
                        TypeKind::Union(_) => {
                            ValidationError::UnionWithoutSubfields(base_name.to_string())
                        }
                        _ => ValidationError::TypeWithoutSubfields(base_name.to_string()),
                    });
                }
                self.validate_composite_field(field, definition, result_type)
                    .map_err(|e| e.in_field(field_name))
            }
            // Scalar and enum results are leaves.
            _ => {
                if !field.node.selection_set.node.is_empty() {
                    return Err(ValidationError::UnexpectedSubfields(field_name.to_string()));
                }
                ArgumentValidator::new(self.schema)
                    .validate(&field.node.arguments, &definition.node.arguments)
                    .map_err(|e| e.in_field(field_name))
            }
        }
    }

    fn validate_composite_field(
        &mut self,
        field: &Positioned<Field>,
        definition: &Positioned<FieldDefinition>,
        result_type: &'a TypeDefinition,
    ) -> Result<(), ValidationError> {
        ArgumentValidator::new(self.schema)
            .validate(&field.node.arguments, &definition.node.arguments)?;
        self.validate(&field.node.selection_set, result_type, false)
    }

    fn validate_fragment_spread(
        &mut self,
        spread: &Positioned<FragmentSpread>,
        container: &'a TypeDefinition,
    ) -> Result<(), ValidationError> {
        let directive_validator = DirectiveValidator::new(self.schema);
        for directive in &spread.node.directives {
            directive_validator.validate(directive, DirectiveLocation::FragmentSpread)?;
        }

        let name = &spread.node.fragment_name.node;
        let Some(fragment) = self.fragment_definitions.get(name) else {
            return Err(ValidationError::FragmentNotDefined(name.to_string()));
        };
        if self.active_fragments.contains(name) {
            return Err(ValidationError::RecursiveFragment(name.to_string()));
        }

        let condition = &fragment.node.type_condition.node.on.node;
        let condition_type = self
            .schema
            .get_type_definition(condition.as_str())
            .ok_or_else(|| ValidationError::TypeNotDefined(condition.to_string()))?;

        if !spread_compatible(condition_type, container) {
            return Err(ValidationError::FragmentTypeMismatch {
                name: name.to_string(),
                fragment_type: condition.to_string(),
                field_type: container.name.node.to_string(),
            });
        }

        self.active_fragments.push(name.clone());
        let result = self.validate(&fragment.node.selection_set, condition_type, false);
        self.active_fragments.pop();
        result
    }

    fn validate_inline_fragment(
        &mut self,
        inline: &Positioned<InlineFragment>,
        container: &'a TypeDefinition,
    ) -> Result<(), ValidationError> {
        let directive_validator = DirectiveValidator::new(self.schema);
        for directive in &inline.node.directives {
            directive_validator.validate(directive, DirectiveLocation::InlineFragment)?;
        }

        let target = match &inline.node.type_condition {
            Some(condition) => {
                let name = &condition.node.on.node;
                self.schema
                    .get_type_definition(name.as_str())
                    .ok_or_else(|| ValidationError::TypeNotDefined(name.to_string()))?
            }
            None => container,
        };

        self.validate(&inline.node.selection_set, target, false)
    }
}

/// A fragment based on `condition` may be spread where the current type is
/// `container`: the types are the same, the current type implements the
/// condition interface, or the current type is a member of the condition
/// union.
fn spread_compatible(condition: &TypeDefinition, container: &TypeDefinition) -> bool {
    if condition.name.node == container.name.node {
        return true;
    }
    match &condition.kind {
        TypeKind::Interface(_) => container
            .implements()
            .iter()
            .any(|implemented| implemented.node == condition.name.node),
        TypeKind::Union(union) => union
            .members
            .iter()
            .any(|member| member.node == container.name.node),
        _ => false,
    }
}
