//! Composable argument parsers.
//!
//! A [`Parser`] turns the tokens under a [`Cursor`] into a typed [`Value`],
//! advancing the cursor on success. Failure is reported through the
//! [`ParseError`] family, which callers treat as "this candidate does not
//! match". Parsers compose through [`UnionParser`], which tries each member
//! against a clone of the cursor so a failing member never consumes input.

pub mod builtin;
pub mod cursor;
pub mod error;
pub mod union;
pub mod value;

use std::sync::Arc;

pub use builtin::{
    BooleanParser, FloatParser, IntegerParser, StringParser, SwitchParser, boolean, float,
    integer, string, switch,
};
pub use cursor::Cursor;
pub use error::{ParseError, ParserError, ParserResult};
pub use union::{UnionParser, or};
pub use value::Value;

/// Shared handle to a parser, as stored in argument definitions.
pub type ParserRef = Arc<dyn Parser>;

/// Unit converting cursor state into a typed value.
///
/// Implementors provide [`Parser::parse_input`]; callers go through
/// [`Parser::parse`], which enforces [`Parser::minimal_input_required`]
/// before the implementation sees the cursor.
pub trait Parser: Send + Sync {
    /// Human readable type name, used in errors and help.
    fn type_name(&self) -> String;

    /// Minimum number of tokens this parser needs.
    fn minimal_input_required(&self) -> usize {
        1
    }

    /// Parse from the cursor. Only called when enough input remains.
    fn parse_input(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value>;

    fn parse(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        let expected = self.minimal_input_required();
        let got = cursor.remaining();
        if got < expected {
            return Err(ParseError::NotEnoughInput { expected, got }.into());
        }
        self.parse_input(cursor)
    }
}
