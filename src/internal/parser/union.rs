//! Union ("or") combinator.

use std::sync::Arc;

use super::{Cursor, ParseError, Parser, ParserError, ParserRef, ParserResult, Value};

/// Tries each member in order and returns the first success.
///
/// Every attempt runs against a clone of the cursor. The clone is committed
/// only when the member succeeds, so a failing member never consumes input.
/// Faults raised by a member are propagated immediately.
pub struct UnionParser {
    parsers: Vec<ParserRef>,
}

impl UnionParser {
    /// Returns `None` for an empty member list.
    pub fn new(parsers: Vec<ParserRef>) -> Option<Self> {
        if parsers.is_empty() {
            None
        } else {
            Some(Self { parsers })
        }
    }

    pub fn members(&self) -> &[ParserRef] {
        &self.parsers
    }
}

impl Parser for UnionParser {
    fn type_name(&self) -> String {
        self.parsers
            .iter()
            .map(|p| p.type_name())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn minimal_input_required(&self) -> usize {
        self.parsers
            .iter()
            .map(|p| p.minimal_input_required())
            .min()
            .unwrap_or(0)
    }

    fn parse_input(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        for parser in &self.parsers {
            let mut attempt = cursor.clone();
            match parser.parse(&mut attempt) {
                Ok(value) => {
                    *cursor = attempt;
                    return Ok(value);
                }
                Err(ParserError::Mismatch(_)) => continue,
                Err(fault) => return Err(fault),
            }
        }
        Err(ParseError::invalid_type(
            self.type_name(),
            cursor.peek().unwrap_or_default(),
        )
        .into())
    }
}

/// Build a union from its members, or `None` when `parsers` is empty.
pub fn or(parsers: impl IntoIterator<Item = ParserRef>) -> Option<Arc<UnionParser>> {
    UnionParser::new(parsers.into_iter().collect()).map(Arc::new)
}
