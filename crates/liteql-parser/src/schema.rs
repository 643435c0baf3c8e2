//! Schema model and the merge pass.
//!
//! Parsing yields a raw [`Schema`]: definitions in document order, with
//! `extend` declarations kept as flagged definitions. [`Schema::merge`]
//! folds extensions into their bases, installs built-in scalars and
//! directives, resolves the root operation bindings, and checks referential
//! integrity, producing the immutable [`MergedSchema`] downstream consumers
//! work with.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use liteql_value::Name;

use crate::pos::{Pos, Positioned};
use crate::types::executable::OperationType;
use crate::types::service::{
    DirectiveDefinition, DirectiveLocation, EnumValueDefinition, FieldDefinition,
    InputValueDefinition, SchemaDefinition, TypeDefinition, TypeKind,
};
use crate::types::Type;

pub const QUERY_ROOT_TYPENAME: &str = "Query";
pub const MUTATION_ROOT_TYPENAME: &str = "Mutation";
pub const SUBSCRIPTION_ROOT_TYPENAME: &str = "Subscription";

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Whether `name` is one of the built-in scalar types.
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("extension target not found: {0}")]
    ExtensionTargetNotFound(String),

    #[error("extension for {name} is {extension_kind}, but the base is {base_kind}")]
    ExtensionKindMismatch {
        name: String,
        extension_kind: &'static str,
        base_kind: &'static str,
    },

    #[error("duplicate type definition: {0}")]
    DuplicateType(String),

    #[error("duplicate field {field} on type {ty}")]
    DuplicateField { ty: String, field: String },

    #[error("duplicate member {member} on union {ty}")]
    DuplicateUnionMember { ty: String, member: String },

    #[error("duplicate value {value} on enum {ty}")]
    DuplicateEnumValue { ty: String, value: String },

    #[error("duplicate directive definition: {0}")]
    DuplicateDirective(String),

    #[error("undefined type {name} referenced by {referrer}")]
    UndefinedType { name: String, referrer: String },

    #[error("type {ty} implements {name}, which is not an interface")]
    ImplementsNonInterface { ty: String, name: String },

    #[error("union {ty} member {member} is not an object type")]
    UnionMemberNotObject { ty: String, member: String },

    #[error("root {operation} type {name} is not defined")]
    RootTypeNotFound {
        operation: &'static str,
        name: String,
    },

    #[error("root {operation} type {name} is not an object type")]
    RootTypeNotObject {
        operation: &'static str,
        name: String,
    },
}

/// The raw result of parsing an SDL document. Immutable; [`Schema::merge`]
/// produces a new model rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub schema_definition: Option<Positioned<SchemaDefinition>>,
    pub type_definitions: Vec<Positioned<TypeDefinition>>,
    pub directive_definitions: Vec<Positioned<DirectiveDefinition>>,
}

impl Schema {
    /// Fold extensions into their bases, install built-ins, resolve root
    /// operation bindings, and verify referential integrity.
    pub fn merge(&self) -> Result<MergedSchema, MergeError> {
        let mut type_definitions: Vec<TypeDefinition> = vec![];
        for definition in &self.type_definitions {
            if definition.node.extend {
                continue;
            }
            if type_definitions
                .iter()
                .any(|t| t.name.node == definition.node.name.node)
            {
                return Err(MergeError::DuplicateType(
                    definition.node.name.node.to_string(),
                ));
            }
            type_definitions.push(definition.node.clone());
        }

        for extension in &self.type_definitions {
            if !extension.node.extend {
                continue;
            }
            let name = extension.node.name.node.as_str();
            let base = type_definitions
                .iter_mut()
                .find(|t| t.name.node == *name)
                .ok_or_else(|| MergeError::ExtensionTargetNotFound(name.to_string()))?;
            fold_extension(base, &extension.node)?;
            debug!(ty = name, "folded type extension");
        }

        let mut directive_definitions: Vec<DirectiveDefinition> = vec![];
        for definition in &self.directive_definitions {
            if directive_definitions
                .iter()
                .any(|d| d.name.node == definition.node.name.node)
            {
                return Err(MergeError::DuplicateDirective(
                    definition.node.name.node.to_string(),
                ));
            }
            directive_definitions.push(definition.node.clone());
        }

        for scalar in BUILTIN_SCALARS {
            if !type_definitions.iter().any(|t| t.name.node == scalar) {
                type_definitions.push(builtin_scalar(scalar));
                debug!(scalar, "installed built-in scalar");
            }
        }
        for directive in ["skip", "include"] {
            if !directive_definitions.iter().any(|d| d.name.node == directive) {
                directive_definitions.push(builtin_condition_directive(directive));
                debug!(directive, "installed built-in directive");
            }
        }

        let bindings = self.schema_definition.as_ref().map(|d| &d.node);
        let query_root = resolve_root(
            bindings.and_then(|b| b.query.as_ref()),
            QUERY_ROOT_TYPENAME,
            "query",
            &type_definitions,
        )?;
        let mutation_root = resolve_root(
            bindings.and_then(|b| b.mutation.as_ref()),
            MUTATION_ROOT_TYPENAME,
            "mutation",
            &type_definitions,
        )?;
        let subscription_root = resolve_root(
            bindings.and_then(|b| b.subscription.as_ref()),
            SUBSCRIPTION_ROOT_TYPENAME,
            "subscription",
            &type_definitions,
        )?;

        let merged = MergedSchema {
            type_definitions,
            directive_definitions,
            query_root,
            mutation_root,
            subscription_root,
        };
        merged.check_references()?;
        Ok(merged)
    }
}

/// The merged schema model: extension-free, built-ins installed, roots
/// bound. This is the surface the validator and code generation consume.
#[derive(Debug, Clone, Serialize)]
pub struct MergedSchema {
    type_definitions: Vec<TypeDefinition>,
    directive_definitions: Vec<DirectiveDefinition>,
    query_root: Name,
    mutation_root: Name,
    subscription_root: Name,
}

impl MergedSchema {
    pub fn type_definitions(&self) -> &[TypeDefinition] {
        &self.type_definitions
    }

    pub fn get_type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_definitions
            .iter()
            .find(|td| td.name.node == *name)
    }

    pub fn directive_definitions(&self) -> &[DirectiveDefinition] {
        &self.directive_definitions
    }

    pub fn get_directive_definition(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directive_definitions
            .iter()
            .find(|d| d.name.node == *name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.of_kind(|kind| matches!(kind, TypeKind::Object(_)))
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.of_kind(|kind| matches!(kind, TypeKind::Interface(_)))
    }

    pub fn unions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.of_kind(|kind| matches!(kind, TypeKind::Union(_)))
    }

    pub fn enums(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.of_kind(|kind| matches!(kind, TypeKind::Enum(_)))
    }

    pub fn scalars(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.of_kind(|kind| matches!(kind, TypeKind::Scalar))
    }

    pub fn input_objects(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.of_kind(|kind| matches!(kind, TypeKind::InputObject(_)))
    }

    fn of_kind(
        &self,
        predicate: fn(&TypeKind) -> bool,
    ) -> impl Iterator<Item = &TypeDefinition> {
        self.type_definitions.iter().filter(move |td| predicate(&td.kind))
    }

    /// The type name the given operation kind is routed to.
    pub fn root_operation_name(&self, operation: OperationType) -> &Name {
        match operation {
            OperationType::Query => &self.query_root,
            OperationType::Mutation => &self.mutation_root,
            OperationType::Subscription => &self.subscription_root,
        }
    }

    /// The root type definition for the given operation kind, when the
    /// bound name is defined.
    pub fn root_operation_type(&self, operation: OperationType) -> Option<&TypeDefinition> {
        self.get_type_definition(self.root_operation_name(operation).as_str())
    }

    fn check_references(&self) -> Result<(), MergeError> {
        for td in &self.type_definitions {
            let ty = td.name.node.as_str();

            for implemented in td.implements() {
                let target = self.get_type_definition(implemented.node.as_str()).ok_or_else(
                    || MergeError::UndefinedType {
                        name: implemented.node.to_string(),
                        referrer: format!("type {ty}"),
                    },
                )?;
                if !matches!(target.kind, TypeKind::Interface(_)) {
                    return Err(MergeError::ImplementsNonInterface {
                        ty: ty.to_string(),
                        name: implemented.node.to_string(),
                    });
                }
            }

            if let Some(fields) = td.fields() {
                for field in fields {
                    let field_name = field.node.name.node.as_str();
                    self.check_type(
                        &field.node.ty.node,
                        || format!("field {ty}.{field_name}"),
                    )?;
                    for argument in &field.node.arguments {
                        let argument_name = argument.node.name.node.as_str();
                        self.check_type(&argument.node.ty.node, || {
                            format!("argument {argument_name} of field {ty}.{field_name}")
                        })?;
                    }
                }
            }

            match &td.kind {
                TypeKind::Union(union) => {
                    for member in &union.members {
                        let target = self
                            .get_type_definition(member.node.as_str())
                            .ok_or_else(|| MergeError::UndefinedType {
                                name: member.node.to_string(),
                                referrer: format!("union {ty}"),
                            })?;
                        if !matches!(target.kind, TypeKind::Object(_)) {
                            return Err(MergeError::UnionMemberNotObject {
                                ty: ty.to_string(),
                                member: member.node.to_string(),
                            });
                        }
                    }
                }
                TypeKind::InputObject(input) => {
                    for field in &input.fields {
                        let field_name = field.node.name.node.as_str();
                        self.check_type(&field.node.ty.node, || {
                            format!("input field {ty}.{field_name}")
                        })?;
                    }
                }
                _ => {}
            }
        }

        for directive in &self.directive_definitions {
            let directive_name = directive.name.node.as_str();
            for argument in &directive.arguments {
                let argument_name = argument.node.name.node.as_str();
                self.check_type(&argument.node.ty.node, || {
                    format!("argument {argument_name} of directive {directive_name}")
                })?;
            }
        }

        Ok(())
    }

    fn check_type(
        &self,
        ty: &Type,
        referrer: impl FnOnce() -> String,
    ) -> Result<(), MergeError> {
        let base = ty.base_name();
        if self.get_type_definition(base.as_str()).is_none() {
            return Err(MergeError::UndefinedType {
                name: base.to_string(),
                referrer: referrer(),
            });
        }
        Ok(())
    }
}

fn fold_extension(
    base: &mut TypeDefinition,
    extension: &TypeDefinition,
) -> Result<(), MergeError> {
    let ty_name = base.name.node.to_string();
    let base_kind = base.kind_keyword();
    let extension_kind = extension.kind_keyword();

    base.directives.extend(extension.directives.iter().cloned());

    match (&mut base.kind, &extension.kind) {
        (TypeKind::Object(base_object), TypeKind::Object(extension_object)) => {
            append_fields(&mut base_object.fields, &extension_object.fields, &ty_name)?;
            base_object
                .implements
                .extend(extension_object.implements.iter().cloned());
        }
        (TypeKind::Interface(base_interface), TypeKind::Interface(extension_interface)) => {
            append_fields(
                &mut base_interface.fields,
                &extension_interface.fields,
                &ty_name,
            )?;
            base_interface
                .implements
                .extend(extension_interface.implements.iter().cloned());
        }
        (TypeKind::InputObject(base_input), TypeKind::InputObject(extension_input)) => {
            append_input_fields(&mut base_input.fields, &extension_input.fields, &ty_name)?;
        }
        (TypeKind::Union(base_union), TypeKind::Union(extension_union)) => {
            append_members(&mut base_union.members, &extension_union.members, &ty_name)?;
        }
        (TypeKind::Enum(base_enum), TypeKind::Enum(extension_enum)) => {
            append_values(&mut base_enum.values, &extension_enum.values, &ty_name)?;
        }
        (TypeKind::Scalar, TypeKind::Scalar) => {}
        _ => {
            return Err(MergeError::ExtensionKindMismatch {
                name: ty_name,
                extension_kind,
                base_kind,
            });
        }
    }

    Ok(())
}

fn append_fields(
    base: &mut Vec<Positioned<FieldDefinition>>,
    extra: &[Positioned<FieldDefinition>],
    ty: &str,
) -> Result<(), MergeError> {
    for field in extra {
        if base.iter().any(|f| f.node.name.node == field.node.name.node) {
            return Err(MergeError::DuplicateField {
                ty: ty.to_string(),
                field: field.node.name.node.to_string(),
            });
        }
        base.push(field.clone());
    }
    Ok(())
}

fn append_input_fields(
    base: &mut Vec<Positioned<InputValueDefinition>>,
    extra: &[Positioned<InputValueDefinition>],
    ty: &str,
) -> Result<(), MergeError> {
    for field in extra {
        if base.iter().any(|f| f.node.name.node == field.node.name.node) {
            return Err(MergeError::DuplicateField {
                ty: ty.to_string(),
                field: field.node.name.node.to_string(),
            });
        }
        base.push(field.clone());
    }
    Ok(())
}

fn append_members(
    base: &mut Vec<Positioned<Name>>,
    extra: &[Positioned<Name>],
    ty: &str,
) -> Result<(), MergeError> {
    for member in extra {
        if base.iter().any(|m| m.node == member.node) {
            return Err(MergeError::DuplicateUnionMember {
                ty: ty.to_string(),
                member: member.node.to_string(),
            });
        }
        base.push(member.clone());
    }
    Ok(())
}

fn append_values(
    base: &mut Vec<Positioned<EnumValueDefinition>>,
    extra: &[Positioned<EnumValueDefinition>],
    ty: &str,
) -> Result<(), MergeError> {
    for value in extra {
        if base
            .iter()
            .any(|v| v.node.value.node == value.node.value.node)
        {
            return Err(MergeError::DuplicateEnumValue {
                ty: ty.to_string(),
                value: value.node.value.node.to_string(),
            });
        }
        base.push(value.clone());
    }
    Ok(())
}

fn resolve_root(
    explicit: Option<&Positioned<Name>>,
    default_name: &str,
    operation: &'static str,
    types: &[TypeDefinition],
) -> Result<Name, MergeError> {
    match explicit {
        Some(name) => {
            let td = types
                .iter()
                .find(|t| t.name.node == name.node)
                .ok_or_else(|| MergeError::RootTypeNotFound {
                    operation,
                    name: name.node.to_string(),
                })?;
            if !matches!(td.kind, TypeKind::Object(_)) {
                return Err(MergeError::RootTypeNotObject {
                    operation,
                    name: name.node.to_string(),
                });
            }
            Ok(name.node.clone())
        }
        None => {
            // The default name binds whether or not the type is defined;
            // validation reports the absence if an operation routes to it.
            if let Some(td) = types.iter().find(|t| t.name.node == *default_name) {
                if !matches!(td.kind, TypeKind::Object(_)) {
                    return Err(MergeError::RootTypeNotObject {
                        operation,
                        name: default_name.to_string(),
                    });
                }
            }
            Ok(Name::new(default_name))
        }
    }
}

fn builtin_scalar(name: &str) -> TypeDefinition {
    TypeDefinition {
        extend: false,
        description: None,
        name: Positioned::new(Name::new(name), Pos::default()),
        directives: vec![],
        kind: TypeKind::Scalar,
    }
}

fn builtin_condition_directive(name: &str) -> DirectiveDefinition {
    DirectiveDefinition {
        description: None,
        name: Positioned::new(Name::new(name), Pos::default()),
        arguments: vec![Positioned::new(
            InputValueDefinition {
                description: None,
                name: Positioned::new(Name::new("if"), Pos::default()),
                ty: Positioned::new(Type::named("Boolean", false), Pos::default()),
                default_value: None,
                directives: vec![],
            },
            Pos::default(),
        )],
        repeatable: false,
        locations: vec![
            Positioned::new(DirectiveLocation::Field, Pos::default()),
            Positioned::new(DirectiveLocation::FragmentSpread, Pos::default()),
            Positioned::new(DirectiveLocation::InlineFragment, Pos::default()),
        ],
    }
}
