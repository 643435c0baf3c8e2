//! Recursive-descent parsing over the shared token stream.
//!
//! Both parsers work with one token of lookahead. Productions shared by the
//! two grammars (values, type references, directives, argument lists) live
//! here; `const_context` distinguishes schema positions, where variables are
//! not legal values.

pub mod executable;
pub mod service;

use indexmap::IndexMap;

use liteql_value::{Name, Value};

use crate::error::{LexError, ParseError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::pos::{Pos, Positioned};
use crate::types::{BaseType, Directive, Type};

pub(crate) fn source_from_bytes(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| {
        ParseError::Lex(LexError::new(e.valid_up_to(), "input is not valid UTF-8"))
    })
}

/// One-token-lookahead cursor over the lexer.
pub(crate) struct TokenStream<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        TokenStream {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    pub(crate) fn peek(&mut self) -> Result<&Token, ParseError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.as_ref().expect("token was just peeked"))
    }

    pub(crate) fn next(&mut self) -> Result<Token, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => Ok(self.lexer.next_token()?),
        }
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        if self.peek()?.kind == kind {
            Ok(Some(self.next()?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::unexpected(
                token.start,
                kind.describe(),
                token.display_found(),
            ))
        }
    }

    pub(crate) fn expect_name(&mut self) -> Result<Positioned<Name>, ParseError> {
        let token = self.expect(TokenKind::Name)?;
        Ok(Positioned::new(Name::new(token.text), Pos::new(token.start)))
    }

    /// Consume the next token if it is the given keyword (a name token with
    /// matching text).
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> Result<bool, ParseError> {
        let token = self.peek()?;
        if token.kind == TokenKind::Name && token.text == keyword {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.kind == TokenKind::Name && token.text == keyword {
            Ok(token)
        } else {
            Err(ParseError::unexpected(
                token.start,
                format!("'{keyword}'"),
                token.display_found(),
            ))
        }
    }

    pub(crate) fn unexpected(&mut self, expected: &str) -> ParseError {
        match self.peek() {
            Ok(token) => ParseError::unexpected(token.start, expected, token.display_found()),
            Err(err) => err,
        }
    }

    /// An optional leading description string before a definition.
    pub(crate) fn parse_description(&mut self) -> Result<Option<Positioned<String>>, ParseError> {
        let token = self.peek()?;
        if matches!(token.kind, TokenKind::String | TokenKind::BlockString) {
            let token = self.next()?;
            Ok(Some(Positioned::new(token.text, Pos::new(token.start))))
        } else {
            Ok(None)
        }
    }

    /// `Name`, `Name!`, `[Type]`, `[Type]!`, recursively.
    pub(crate) fn parse_type(&mut self) -> Result<Positioned<Type>, ParseError> {
        let token = self.peek()?;
        let pos = Pos::new(token.start);
        let base = match token.kind {
            TokenKind::Name => {
                let name = self.expect_name()?;
                BaseType::Named(name.node)
            }
            TokenKind::BracketL => {
                self.next()?;
                let element = self.parse_type()?;
                self.expect(TokenKind::BracketR)?;
                BaseType::List(Box::new(element.node))
            }
            _ => return Err(self.unexpected("type")),
        };
        let nullable = self.eat(TokenKind::Bang)?.is_none();
        Ok(Positioned::new(Type { base, nullable }, pos))
    }

    /// A literal value. In const context `$variable` is rejected.
    pub(crate) fn parse_value(&mut self, const_context: bool) -> Result<Positioned<Value>, ParseError> {
        let token = self.peek()?;
        let pos = Pos::new(token.start);
        let value = match token.kind {
            TokenKind::Int => {
                let token = self.next()?;
                let parsed = token.text.parse::<i64>().map_err(|_| {
                    ParseError::unexpected(token.start, "integer literal", format!("'{}'", token.text))
                })?;
                Value::Int(parsed)
            }
            TokenKind::Float => {
                let token = self.next()?;
                let parsed = token.text.parse::<f64>().map_err(|_| {
                    ParseError::unexpected(token.start, "float literal", format!("'{}'", token.text))
                })?;
                Value::Float(parsed)
            }
            TokenKind::String | TokenKind::BlockString => {
                let token = self.next()?;
                Value::String(token.text)
            }
            TokenKind::Name => {
                let token = self.next()?;
                match token.text.as_str() {
                    "true" => Value::Boolean(true),
                    "false" => Value::Boolean(false),
                    "null" => Value::Null,
                    _ => Value::Enum(Name::new(token.text)),
                }
            }
            TokenKind::Dollar if !const_context => {
                self.next()?;
                let name = self.expect_name()?;
                Value::Variable(name.node)
            }
            TokenKind::BracketL => {
                self.next()?;
                let mut items = vec![];
                while self.eat(TokenKind::BracketR)?.is_none() {
                    items.push(self.parse_value(const_context)?.node);
                }
                Value::List(items)
            }
            TokenKind::BraceL => {
                self.next()?;
                let mut entries = IndexMap::new();
                while self.eat(TokenKind::BraceR)?.is_none() {
                    let key = self.expect_name()?;
                    self.expect(TokenKind::Colon)?;
                    let value = self.parse_value(const_context)?;
                    entries.insert(key.node, value.node);
                }
                Value::Object(entries)
            }
            _ => return Err(self.unexpected("value")),
        };
        Ok(Positioned::new(value, pos))
    }

    /// Zero or more `@directive(args)` applications.
    pub(crate) fn parse_directives(
        &mut self,
        const_context: bool,
    ) -> Result<Vec<Positioned<Directive>>, ParseError> {
        let mut directives = vec![];
        while let Some(at) = self.eat(TokenKind::At)? {
            let name = self.expect_name()?;
            let arguments = self.parse_arguments(const_context)?;
            directives.push(Positioned::new(
                Directive { name, arguments },
                Pos::new(at.start),
            ));
        }
        Ok(directives)
    }

    /// An optional parenthesized `name: value` list.
    pub(crate) fn parse_arguments(
        &mut self,
        const_context: bool,
    ) -> Result<Vec<(Positioned<Name>, Positioned<Value>)>, ParseError> {
        let mut arguments = vec![];
        if self.eat(TokenKind::ParenL)?.is_some() {
            while self.eat(TokenKind::ParenR)?.is_none() {
                let name = self.expect_name()?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_value(const_context)?;
                arguments.push((name, value));
            }
        }
        Ok(arguments)
    }
}
