//! Schema (SDL) parser.

use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parse::{source_from_bytes, TokenStream};
use crate::pos::{Pos, Positioned};
use crate::schema::Schema;
use crate::types::service::{
    DirectiveDefinition, DirectiveLocation, EnumType, EnumValueDefinition, FieldDefinition,
    InputObjectType, InputValueDefinition, InterfaceType, ObjectType, SchemaDefinition,
    TypeDefinition, TypeKind, UnionType,
};

use liteql_value::Name;

/// Parses SDL bytes into a [`Schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        SchemaParser
    }

    pub fn parse(&self, sdl: &[u8]) -> Result<Schema, ParseError> {
        parse_schema(sdl)
    }
}

/// Parse an SDL document. The first grammar mismatch aborts the parse.
pub fn parse_schema(sdl: &[u8]) -> Result<Schema, ParseError> {
    let source = source_from_bytes(sdl)?;
    let mut stream = TokenStream::new(source);

    let mut schema_definition = None;
    let mut type_definitions = vec![];
    let mut directive_definitions = vec![];

    loop {
        if stream.peek()?.kind == TokenKind::Eof {
            break;
        }

        let description = stream.parse_description()?;
        let keyword = {
            let token = stream.peek()?;
            if token.kind != TokenKind::Name {
                return Err(stream.unexpected("definition"));
            }
            token.text.clone()
        };

        match keyword.as_str() {
            "schema" => {
                let token = stream.next()?;
                if schema_definition.is_some() {
                    return Err(ParseError::unexpected(
                        token.start,
                        "type system definition",
                        "duplicate schema definition",
                    ));
                }
                schema_definition = Some(parse_schema_definition(&mut stream, token.start)?);
            }
            "directive" => {
                let token = stream.next()?;
                directive_definitions.push(parse_directive_definition(
                    &mut stream,
                    description,
                    token.start,
                )?);
            }
            "extend" => {
                stream.next()?;
                let definition = parse_type_definition(&mut stream, true, description)?;
                type_definitions.push(definition);
            }
            _ => {
                let definition = parse_type_definition(&mut stream, false, description)?;
                type_definitions.push(definition);
            }
        }
    }

    Ok(Schema {
        schema_definition,
        type_definitions,
        directive_definitions,
    })
}

fn parse_schema_definition(
    stream: &mut TokenStream<'_>,
    start: usize,
) -> Result<Positioned<SchemaDefinition>, ParseError> {
    let directives = stream.parse_directives(true)?;

    let mut query = None;
    let mut mutation = None;
    let mut subscription = None;

    stream.expect(TokenKind::BraceL)?;
    while stream.eat(TokenKind::BraceR)?.is_none() {
        let operation = stream.expect_name()?;
        stream.expect(TokenKind::Colon)?;
        let name = stream.expect_name()?;
        match operation.node.as_str() {
            "query" => query = Some(name),
            "mutation" => mutation = Some(name),
            "subscription" => subscription = Some(name),
            other => {
                return Err(ParseError::unexpected(
                    operation.pos.offset,
                    "'query', 'mutation', or 'subscription'",
                    format!("'{other}'"),
                ));
            }
        }
    }

    Ok(Positioned::new(
        SchemaDefinition {
            directives,
            query,
            mutation,
            subscription,
        },
        Pos::new(start),
    ))
}

fn parse_type_definition(
    stream: &mut TokenStream<'_>,
    extend: bool,
    description: Option<Positioned<String>>,
) -> Result<Positioned<TypeDefinition>, ParseError> {
    let keyword = {
        let token = stream.peek()?;
        if token.kind != TokenKind::Name {
            return Err(stream.unexpected("type definition"));
        }
        token.text.clone()
    };

    match keyword.as_str() {
        "type" | "interface" | "input" | "union" | "enum" | "scalar" => {}
        other => {
            let token = stream.peek()?;
            return Err(ParseError::unexpected(
                token.start,
                "'type', 'interface', 'input', 'union', 'enum', or 'scalar'",
                format!("'{other}'"),
            ));
        }
    }

    let token = stream.next()?;
    let pos = Pos::new(token.start);
    let name = stream.expect_name()?;

    let (kind, directives) = match keyword.as_str() {
        "type" => {
            let implements = parse_implements(stream)?;
            let directives = stream.parse_directives(true)?;
            let fields = parse_field_block(stream)?;
            (
                TypeKind::Object(ObjectType { implements, fields }),
                directives,
            )
        }
        "interface" => {
            let implements = parse_implements(stream)?;
            let directives = stream.parse_directives(true)?;
            let fields = parse_field_block(stream)?;
            (
                TypeKind::Interface(InterfaceType { implements, fields }),
                directives,
            )
        }
        "input" => {
            let directives = stream.parse_directives(true)?;
            let fields = parse_input_field_block(stream)?;
            (TypeKind::InputObject(InputObjectType { fields }), directives)
        }
        "union" => {
            let directives = stream.parse_directives(true)?;
            let members = parse_union_members(stream)?;
            (TypeKind::Union(UnionType { members }), directives)
        }
        "enum" => {
            let directives = stream.parse_directives(true)?;
            let values = parse_enum_value_block(stream)?;
            (TypeKind::Enum(EnumType { values }), directives)
        }
        "scalar" => {
            let directives = stream.parse_directives(true)?;
            (TypeKind::Scalar, directives)
        }
        _ => unreachable!("keyword was checked above"),
    };

    Ok(Positioned::new(
        TypeDefinition {
            extend,
            description,
            name,
            directives,
            kind,
        },
        pos,
    ))
}

/// `implements A & B`, with an optional leading `&`.
fn parse_implements(stream: &mut TokenStream<'_>) -> Result<Vec<Positioned<Name>>, ParseError> {
    let mut implements = vec![];
    if stream.eat_keyword("implements")? {
        stream.eat(TokenKind::Amp)?;
        implements.push(stream.expect_name()?);
        while stream.eat(TokenKind::Amp)?.is_some() {
            implements.push(stream.expect_name()?);
        }
    }
    Ok(implements)
}

/// `{ name(args): Type @dir }`, optional for extensions like
/// `extend type User implements Node`.
fn parse_field_block(
    stream: &mut TokenStream<'_>,
) -> Result<Vec<Positioned<FieldDefinition>>, ParseError> {
    let mut fields = vec![];
    if stream.eat(TokenKind::BraceL)?.is_some() {
        while stream.eat(TokenKind::BraceR)?.is_none() {
            fields.push(parse_field_definition(stream)?);
        }
    }
    Ok(fields)
}

fn parse_field_definition(
    stream: &mut TokenStream<'_>,
) -> Result<Positioned<FieldDefinition>, ParseError> {
    let description = stream.parse_description()?;
    let name = stream.expect_name()?;
    let pos = name.pos;
    let arguments = parse_argument_definitions(stream)?;
    stream.expect(TokenKind::Colon)?;
    let ty = stream.parse_type()?;
    let directives = stream.parse_directives(true)?;
    Ok(Positioned::new(
        FieldDefinition {
            description,
            name,
            arguments,
            ty,
            directives,
        },
        pos,
    ))
}

/// `(name: Type = default @dir, …)`, optional.
fn parse_argument_definitions(
    stream: &mut TokenStream<'_>,
) -> Result<Vec<Positioned<InputValueDefinition>>, ParseError> {
    let mut arguments = vec![];
    if stream.eat(TokenKind::ParenL)?.is_some() {
        while stream.eat(TokenKind::ParenR)?.is_none() {
            arguments.push(parse_input_value_definition(stream)?);
        }
    }
    Ok(arguments)
}

fn parse_input_field_block(
    stream: &mut TokenStream<'_>,
) -> Result<Vec<Positioned<InputValueDefinition>>, ParseError> {
    let mut fields = vec![];
    if stream.eat(TokenKind::BraceL)?.is_some() {
        while stream.eat(TokenKind::BraceR)?.is_none() {
            fields.push(parse_input_value_definition(stream)?);
        }
    }
    Ok(fields)
}

fn parse_input_value_definition(
    stream: &mut TokenStream<'_>,
) -> Result<Positioned<InputValueDefinition>, ParseError> {
    let description = stream.parse_description()?;
    let name = stream.expect_name()?;
    let pos = name.pos;
    stream.expect(TokenKind::Colon)?;
    let ty = stream.parse_type()?;
    let default_value = match stream.eat(TokenKind::Equals)? {
        Some(_) => Some(stream.parse_value(true)?),
        None => None,
    };
    let directives = stream.parse_directives(true)?;
    Ok(Positioned::new(
        InputValueDefinition {
            description,
            name,
            ty,
            default_value,
            directives,
        },
        pos,
    ))
}

/// `= A | B | C`, with an optional leading `|`; the whole list is optional
/// so that `extend union` can add directives alone.
fn parse_union_members(
    stream: &mut TokenStream<'_>,
) -> Result<Vec<Positioned<Name>>, ParseError> {
    let mut members = vec![];
    if stream.eat(TokenKind::Equals)?.is_some() {
        stream.eat(TokenKind::Pipe)?;
        members.push(stream.expect_name()?);
        while stream.eat(TokenKind::Pipe)?.is_some() {
            members.push(stream.expect_name()?);
        }
    }
    Ok(members)
}

fn parse_enum_value_block(
    stream: &mut TokenStream<'_>,
) -> Result<Vec<Positioned<EnumValueDefinition>>, ParseError> {
    let mut values = vec![];
    if stream.eat(TokenKind::BraceL)?.is_some() {
        while stream.eat(TokenKind::BraceR)?.is_none() {
            let description = stream.parse_description()?;
            let value = stream.expect_name()?;
            let pos = value.pos;
            let directives = stream.parse_directives(true)?;
            values.push(Positioned::new(
                EnumValueDefinition {
                    description,
                    value,
                    directives,
                },
                pos,
            ));
        }
    }
    Ok(values)
}

/// `directive @name(args) repeatable? on LOC1 | LOC2`.
fn parse_directive_definition(
    stream: &mut TokenStream<'_>,
    description: Option<Positioned<String>>,
    start: usize,
) -> Result<Positioned<DirectiveDefinition>, ParseError> {
    stream.expect(TokenKind::At)?;
    let name = stream.expect_name()?;
    let arguments = parse_argument_definitions(stream)?;
    let repeatable = stream.eat_keyword("repeatable")?;
    stream.expect_keyword("on")?;

    let mut locations = vec![];
    stream.eat(TokenKind::Pipe)?;
    locations.push(parse_directive_location(stream)?);
    while stream.eat(TokenKind::Pipe)?.is_some() {
        locations.push(parse_directive_location(stream)?);
    }

    Ok(Positioned::new(
        DirectiveDefinition {
            description,
            name,
            arguments,
            repeatable,
            locations,
        },
        Pos::new(start),
    ))
}

fn parse_directive_location(
    stream: &mut TokenStream<'_>,
) -> Result<Positioned<DirectiveLocation>, ParseError> {
    let name = stream.expect_name()?;
    match DirectiveLocation::parse(name.node.as_str()) {
        Some(location) => Ok(Positioned::new(location, name.pos)),
        None => Err(ParseError::unexpected(
            name.pos.offset,
            "directive location",
            format!("'{}'", name.node),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sdl: &str) -> Schema {
        parse_schema(sdl.as_bytes()).expect("schema should parse")
    }

    #[test]
    fn object_type_with_fields() {
        let schema = parse(
            r#"type User {
                id: ID!
                name: String
                posts(limit: Int = 10): [Post!]!
            }"#,
        );

        let user = &schema.type_definitions[0].node;
        assert!(!user.extend);
        assert_eq!(user.name.node.as_str(), "User");

        let fields = user.fields().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].node.ty.node.to_string(), "ID!");
        assert_eq!(fields[1].node.ty.node.to_string(), "String");
        assert_eq!(fields[2].node.ty.node.to_string(), "[Post!]!");

        let limit = &fields[2].node.arguments[0].node;
        assert_eq!(limit.name.node.as_str(), "limit");
        assert!(!limit.is_required());
    }

    #[test]
    fn implements_and_directives() {
        let schema = parse(
            r#"type User implements & Node & Timestamped @entity {
                id: ID!
            }"#,
        );

        let user = &schema.type_definitions[0].node;
        let implements: Vec<_> = user
            .implements()
            .iter()
            .map(|i| i.node.as_str().to_string())
            .collect();
        assert_eq!(implements, vec!["Node", "Timestamped"]);
        assert_eq!(user.directives[0].node.name.node.as_str(), "entity");
    }

    #[test]
    fn union_enum_scalar_input() {
        let schema = parse(
            r#"union SearchResult = | User | Post
            enum Role { ADMIN USER }
            scalar DateTime
            input UserFilter { name: String role: Role = USER }"#,
        );

        let union = &schema.type_definitions[0].node;
        match &union.kind {
            TypeKind::Union(u) => assert_eq!(u.members.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }

        let role = &schema.type_definitions[1].node;
        match &role.kind {
            TypeKind::Enum(e) => {
                assert!(e.has_value("ADMIN"));
                assert!(!e.has_value("GUEST"));
            }
            other => panic!("expected enum, got {other:?}"),
        }

        assert!(matches!(schema.type_definitions[2].node.kind, TypeKind::Scalar));

        let filter = &schema.type_definitions[3].node;
        match &filter.kind {
            TypeKind::InputObject(input) => {
                assert_eq!(input.fields.len(), 2);
                assert!(input.fields[1].node.default_value.is_some());
            }
            other => panic!("expected input object, got {other:?}"),
        }
    }

    #[test]
    fn schema_block_binds_roots() {
        let schema = parse(
            r#"schema { query: RootQuery mutation: RootMutation }
            type RootQuery { ok: Boolean }
            type RootMutation { ok: Boolean }"#,
        );

        let definition = schema.schema_definition.as_ref().unwrap();
        assert_eq!(definition.node.query.as_ref().unwrap().node.as_str(), "RootQuery");
        assert_eq!(
            definition.node.mutation.as_ref().unwrap().node.as_str(),
            "RootMutation"
        );
        assert!(definition.node.subscription.is_none());
    }

    #[test]
    fn directive_definition() {
        let schema = parse(
            r#"directive @deprecated(reason: String) on FIELD_DEFINITION | ENUM_VALUE"#,
        );

        let directive = &schema.directive_definitions[0].node;
        assert_eq!(directive.name.node.as_str(), "deprecated");
        assert!(!directive.repeatable);
        let locations: Vec<_> = directive.locations.iter().map(|l| l.node).collect();
        assert_eq!(
            locations,
            vec![
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::EnumValue
            ]
        );
    }

    #[test]
    fn extend_definitions() {
        let schema = parse(
            r#"extend type User implements Node { email: String! }
            extend union SearchResult = Comment
            extend enum Role { GUEST }"#,
        );

        assert!(schema.type_definitions.iter().all(|t| t.node.extend));
        let user = &schema.type_definitions[0].node;
        assert_eq!(user.implements()[0].node.as_str(), "Node");
        assert_eq!(user.fields().unwrap()[0].node.name.node.as_str(), "email");
    }

    #[test]
    fn descriptions_attach_to_definitions() {
        let schema = parse(
            r#""""A user of the system."""
            type User {
                "The canonical identifier."
                id: ID!
            }"#,
        );

        let user = &schema.type_definitions[0].node;
        assert_eq!(
            user.description.as_ref().unwrap().node,
            "A user of the system."
        );
        assert_eq!(
            user.fields().unwrap()[0]
                .node
                .description
                .as_ref()
                .unwrap()
                .node,
            "The canonical identifier."
        );
    }

    #[test]
    fn rejects_unknown_directive_location() {
        let err = parse_schema(b"directive @d on NOWHERE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at offset 16: expected directive location, found 'NOWHERE'"
        );
    }

    #[test]
    fn rejects_variables_in_defaults() {
        let err = parse_schema(b"type Query { user(id: ID = $id): String }").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
    }

    #[test]
    fn reports_offset_of_first_mismatch() {
        let err = parse_schema(b"type User id: ID! }").unwrap_err();
        assert_eq!(err.offset(), 10);
    }

    #[test]
    fn parsing_is_deterministic() {
        let sdl = r#"type Query { users: [User] } type User { id: ID! }"#;
        assert_eq!(parse(sdl), parse(sdl));
    }
}
