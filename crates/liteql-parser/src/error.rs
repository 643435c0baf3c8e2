use thiserror::Error;

/// An unrecognized byte sequence or unterminated literal in the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("lex error at offset {offset}: {detail}")]
pub struct LexError {
    pub offset: usize,
    pub detail: String,
}

impl LexError {
    pub fn new(offset: usize, detail: impl Into<String>) -> Self {
        LexError {
            offset,
            detail: detail.into(),
        }
    }
}

/// A grammar mismatch. The parser does not recover; the first error is
/// surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("parse error at offset {offset}: expected {expected}, found {found}")]
    Unexpected {
        offset: usize,
        expected: String,
        found: String,
    },
}

impl ParseError {
    pub fn unexpected(offset: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::Unexpected {
            offset,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.offset,
            ParseError::Unexpected { offset, .. } => *offset,
        }
    }
}
