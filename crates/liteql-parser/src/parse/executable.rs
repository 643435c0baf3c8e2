//! Executable document (query) parser.

use std::collections::HashMap;

use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parse::{source_from_bytes, TokenStream};
use crate::pos::{Pos, Positioned};
use crate::types::executable::{
    ExecutableDocument, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationType, Selection, SelectionSet, TypeCondition,
    VariableDefinition,
};

/// Parses executable document bytes into an [`ExecutableDocument`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        QueryParser
    }

    pub fn parse(&self, query: &[u8]) -> Result<ExecutableDocument, ParseError> {
        parse_query(query)
    }
}

/// Parse an executable document. The first grammar mismatch aborts the
/// parse.
pub fn parse_query(query: &[u8]) -> Result<ExecutableDocument, ParseError> {
    let source = source_from_bytes(query)?;
    let mut stream = TokenStream::new(source);

    let mut operations = vec![];
    let mut fragments = HashMap::new();

    loop {
        let (kind, start) = {
            let token = stream.peek()?;
            (token.kind, token.start)
        };
        match kind {
            TokenKind::Eof => break,
            // Shorthand form: a bare selection set is a query operation.
            TokenKind::BraceL => {
                let selection_set = parse_selection_set(&mut stream)?;
                operations.push(Positioned::new(
                    OperationDefinition {
                        ty: OperationType::Query,
                        name: None,
                        variable_definitions: vec![],
                        directives: vec![],
                        selection_set,
                    },
                    Pos::new(start),
                ));
            }
            TokenKind::Name => {
                if stream.eat_keyword("fragment")? {
                    let (name, definition) = parse_fragment_definition(&mut stream, start)?;
                    fragments.insert(name, definition);
                } else {
                    operations.push(parse_operation(&mut stream)?);
                }
            }
            _ => return Err(stream.unexpected("operation or fragment definition")),
        }
    }

    Ok(ExecutableDocument {
        operations,
        fragments,
    })
}

fn parse_operation(
    stream: &mut TokenStream<'_>,
) -> Result<Positioned<OperationDefinition>, ParseError> {
    let keyword = {
        let token = stream.peek()?;
        (token.text.clone(), token.start)
    };
    let ty = match keyword.0.as_str() {
        "query" => OperationType::Query,
        "mutation" => OperationType::Mutation,
        "subscription" => OperationType::Subscription,
        _ => return Err(stream.unexpected("'query', 'mutation', or 'subscription'")),
    };
    stream.next()?;

    let name = if stream.peek()?.kind == TokenKind::Name {
        Some(stream.expect_name()?)
    } else {
        None
    };

    let variable_definitions = parse_variable_definitions(stream)?;
    let directives = stream.parse_directives(false)?;
    let selection_set = parse_selection_set(stream)?;

    Ok(Positioned::new(
        OperationDefinition {
            ty,
            name,
            variable_definitions,
            directives,
            selection_set,
        },
        Pos::new(keyword.1),
    ))
}

/// `($limit: Int = 10, $role: Role)`, optional.
fn parse_variable_definitions(
    stream: &mut TokenStream<'_>,
) -> Result<Vec<Positioned<VariableDefinition>>, ParseError> {
    let mut definitions = vec![];
    if stream.eat(TokenKind::ParenL)?.is_some() {
        while stream.eat(TokenKind::ParenR)?.is_none() {
            let dollar = stream.expect(TokenKind::Dollar)?;
            let name = stream.expect_name()?;
            stream.expect(TokenKind::Colon)?;
            let var_type = stream.parse_type()?;
            let default_value = match stream.eat(TokenKind::Equals)? {
                Some(_) => Some(stream.parse_value(true)?),
                None => None,
            };
            definitions.push(Positioned::new(
                VariableDefinition {
                    name,
                    var_type,
                    default_value,
                },
                Pos::new(dollar.start),
            ));
        }
    }
    Ok(definitions)
}

/// `fragment Name on Type { … }`; `on` is not a legal fragment name.
fn parse_fragment_definition(
    stream: &mut TokenStream<'_>,
    start: usize,
) -> Result<(liteql_value::Name, Positioned<FragmentDefinition>), ParseError> {
    let name = stream.expect_name()?;
    if name.node == "on" {
        return Err(ParseError::unexpected(
            name.pos.offset,
            "fragment name",
            "'on'",
        ));
    }
    let type_condition = parse_type_condition(stream)?;
    let directives = stream.parse_directives(false)?;
    let selection_set = parse_selection_set(stream)?;

    Ok((
        name.node,
        Positioned::new(
            FragmentDefinition {
                type_condition,
                directives,
                selection_set,
            },
            Pos::new(start),
        ),
    ))
}

fn parse_type_condition(
    stream: &mut TokenStream<'_>,
) -> Result<Positioned<TypeCondition>, ParseError> {
    let on = stream.expect_keyword("on")?;
    let name = stream.expect_name()?;
    Ok(Positioned::new(
        TypeCondition { on: name },
        Pos::new(on.start),
    ))
}

/// `{ selection* }`. Empty sets parse; the validator rejects them where
/// subfields are mandatory.
fn parse_selection_set(
    stream: &mut TokenStream<'_>,
) -> Result<Positioned<SelectionSet>, ParseError> {
    let open = stream.expect(TokenKind::BraceL)?;
    let mut items = vec![];
    while stream.eat(TokenKind::BraceR)?.is_none() {
        items.push(parse_selection(stream)?);
    }
    Ok(Positioned::new(SelectionSet { items }, Pos::new(open.start)))
}

fn parse_selection(stream: &mut TokenStream<'_>) -> Result<Positioned<Selection>, ParseError> {
    let (kind, start) = {
        let token = stream.peek()?;
        (token.kind, token.start)
    };
    match kind {
        TokenKind::Spread => {
            stream.next()?;
            parse_fragment_selection(stream, start)
        }
        TokenKind::Name => {
            let field = parse_field(stream)?;
            Ok(Positioned::new(
                Selection::Field(field),
                Pos::new(start),
            ))
        }
        _ => Err(stream.unexpected("selection")),
    }
}

/// Everything after a `...`: `on Type { … }` is an inline fragment with a
/// type condition, a bare name is a fragment spread, and directives or `{`
/// open an anonymous inline fragment.
fn parse_fragment_selection(
    stream: &mut TokenStream<'_>,
    start: usize,
) -> Result<Positioned<Selection>, ParseError> {
    let pos = Pos::new(start);
    let (is_name, is_on) = {
        let token = stream.peek()?;
        (
            token.kind == TokenKind::Name,
            token.kind == TokenKind::Name && token.text == "on",
        )
    };

    if is_name && !is_on {
        let fragment_name = stream.expect_name()?;
        let directives = stream.parse_directives(false)?;
        return Ok(Positioned::new(
            Selection::FragmentSpread(Positioned::new(
                FragmentSpread {
                    fragment_name,
                    directives,
                },
                pos,
            )),
            pos,
        ));
    }

    let type_condition = if is_on {
        Some(parse_type_condition(stream)?)
    } else {
        None
    };
    let directives = stream.parse_directives(false)?;
    let selection_set = parse_selection_set(stream)?;
    Ok(Positioned::new(
        Selection::InlineFragment(Positioned::new(
            InlineFragment {
                type_condition,
                directives,
                selection_set,
            },
            pos,
        )),
        pos,
    ))
}

fn parse_field(stream: &mut TokenStream<'_>) -> Result<Positioned<Field>, ParseError> {
    let first = stream.expect_name()?;
    let pos = first.pos;

    let (alias, name) = if stream.eat(TokenKind::Colon)?.is_some() {
        (Some(first), stream.expect_name()?)
    } else {
        (None, first)
    };

    let arguments = stream.parse_arguments(false)?;
    let directives = stream.parse_directives(false)?;
    let selection_set = if stream.peek()?.kind == TokenKind::BraceL {
        parse_selection_set(stream)?
    } else {
        Positioned::new(SelectionSet::default(), pos)
    };

    Ok(Positioned::new(
        Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
        },
        pos,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use liteql_value::Value;

    fn parse(query: &str) -> ExecutableDocument {
        parse_query(query.as_bytes()).expect("query should parse")
    }

    fn single_operation(document: &ExecutableDocument) -> &OperationDefinition {
        assert_eq!(document.operations.len(), 1);
        &document.operations[0].node
    }

    fn field_at<'a>(selection_set: &'a SelectionSet, index: usize) -> &'a Field {
        match &selection_set.items[index].node {
            Selection::Field(field) => &field.node,
            other => panic!("expected field, got {other:?}"),
        }
    }

    #[test]
    fn shorthand_query() {
        let document = parse("{ users { id name } }");
        let operation = single_operation(&document);
        assert_eq!(operation.ty, OperationType::Query);
        assert!(operation.name.is_none());

        let users = field_at(&operation.selection_set.node, 0);
        assert_eq!(users.name.node.as_str(), "users");
        assert_eq!(users.selection_set.node.items.len(), 2);
    }

    #[test]
    fn named_operation_with_variables() {
        let document = parse(
            r#"query Users($limit: Int = 10, $role: Role!) {
                users(limit: $limit, role: $role) { id }
            }"#,
        );
        let operation = single_operation(&document);
        assert_eq!(operation.name.as_ref().unwrap().node.as_str(), "Users");

        let limit = &operation.variable_definitions[0].node;
        assert_eq!(limit.name.node.as_str(), "limit");
        assert_eq!(limit.var_type.node.to_string(), "Int");
        assert_eq!(limit.default_value.as_ref().unwrap().node, Value::Int(10));

        let role = &operation.variable_definitions[1].node;
        assert_eq!(role.var_type.node.to_string(), "Role!");
        assert!(role.default_value.is_none());

        let users = field_at(&operation.selection_set.node, 0);
        assert_eq!(users.arguments.len(), 2);
        assert_eq!(
            users.arguments[0].1.node,
            Value::Variable(liteql_value::Name::new("limit"))
        );
    }

    #[test]
    fn mutation_and_subscription_keywords() {
        let document = parse("mutation { createUser { id } } subscription OnUser { user { id } }");
        assert_eq!(document.operations[0].node.ty, OperationType::Mutation);
        assert_eq!(document.operations[1].node.ty, OperationType::Subscription);
    }

    #[test]
    fn aliases() {
        let document = parse("{ first: user(id: 1) { id } }");
        let field = field_at(&single_operation(&document).selection_set.node, 0);
        assert_eq!(field.alias.as_ref().unwrap().node.as_str(), "first");
        assert_eq!(field.name.node.as_str(), "user");
        assert_eq!(field.response_key().node.as_str(), "first");
    }

    #[test]
    fn spread_lookahead_resolves_all_three_forms() {
        let document = parse(
            r#"{
                results {
                    ...ResultFields
                    ...on User { name }
                    ... @include(if: true) { id }
                }
            }"#,
        );
        let results = field_at(&single_operation(&document).selection_set.node, 0);
        let items = &results.selection_set.node.items;

        match &items[0].node {
            Selection::FragmentSpread(spread) => {
                assert_eq!(spread.node.fragment_name.node.as_str(), "ResultFields");
            }
            other => panic!("expected fragment spread, got {other:?}"),
        }
        match &items[1].node {
            Selection::InlineFragment(inline) => {
                let condition = inline.node.type_condition.as_ref().unwrap();
                assert_eq!(condition.node.on.node.as_str(), "User");
            }
            other => panic!("expected inline fragment, got {other:?}"),
        }
        match &items[2].node {
            Selection::InlineFragment(inline) => {
                assert!(inline.node.type_condition.is_none());
                assert_eq!(inline.node.directives.len(), 1);
            }
            other => panic!("expected inline fragment, got {other:?}"),
        }
    }

    #[test]
    fn fragment_definitions_are_keyed_by_name() {
        let document = parse(
            r#"{ user { ...UserFragment } }
            fragment UserFragment on User { id name }"#,
        );
        let fragment = document.get_fragment("UserFragment").unwrap();
        assert_eq!(fragment.node.type_condition.node.on.node.as_str(), "User");
        assert!(document.get_fragment("Other").is_none());
    }

    #[test]
    fn directives_on_fields_and_spreads() {
        let document = parse(
            r#"{ user { name @skip(if: false) ...UserFragment @include(if: true) } }"#,
        );
        let user = field_at(&single_operation(&document).selection_set.node, 0);
        let name = field_at(&user.selection_set.node, 0);
        assert_eq!(name.directives[0].node.name.node.as_str(), "skip");
        assert_eq!(
            name.directives[0].node.get_argument("if").unwrap().node,
            Value::Boolean(false)
        );
    }

    #[test]
    fn empty_selection_sets_parse() {
        let document = parse("{ searchResults {} }");
        let field = field_at(&single_operation(&document).selection_set.node, 0);
        assert!(field.selection_set.node.is_empty());
    }

    #[test]
    fn on_is_not_a_fragment_name() {
        let err = parse_query(b"fragment on on User { id }").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at offset 9: expected fragment name, found 'on'"
        );
    }

    #[test]
    fn first_error_is_surfaced_with_offset() {
        let err = parse_query(b"{ user( } }").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at offset 8: expected name, found '}'"
        );
    }

    #[test]
    fn parsing_is_deterministic() {
        let query = "{ user { id ...F } } fragment F on User { name }";
        assert_eq!(parse(query), parse(query));
    }

    #[test]
    fn documents_serialize() {
        let document = parse("{ user { id } }");
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["operations"][0]["node"]["ty"], "Query");
    }
}
