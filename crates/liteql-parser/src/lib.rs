//! GraphQL SDL and executable-document parsing.
//!
//! Two recursive-descent parsers share one lexer: [`SchemaParser`] turns SDL
//! bytes into a [`schema::Schema`] (which [`schema::Schema::merge`] folds
//! into a [`schema::MergedSchema`]), and [`QueryParser`] turns query bytes
//! into a [`types::executable::ExecutableDocument`]. All models are
//! immutable once parsed and safe to share across threads.

pub mod lexer;
pub mod schema;
pub mod types;

mod error;
mod parse;
mod pos;

pub use error::{LexError, ParseError};
pub use parse::executable::{parse_query, QueryParser};
pub use parse::service::{parse_schema, SchemaParser};
pub use pos::{Pos, Positioned};
