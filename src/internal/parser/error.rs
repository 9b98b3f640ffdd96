//! Error types for argument parsing.

use thiserror::Error;

/// Recoverable parse failures.
///
/// These mean "this candidate does not match the input" and are only ever
/// absorbed by union parsers and signature matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer tokens remain than the parser needs.
    #[error("not enough arguments: expected {expected}, got {got}")]
    NotEnoughInput { expected: usize, got: usize },

    /// The token cannot be converted to the expected type.
    #[error("the value cannot be parsed: expected {expected}, got \"{got}\"")]
    InvalidType { expected: String, got: String },

    /// The token converts but violates a constraint.
    #[error("the parsed value is invalid{}", .0.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    InvalidValue(Option<String>),
}

impl ParseError {
    pub fn invalid_type(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::InvalidType {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn invalid_value(details: impl Into<String>) -> Self {
        Self::InvalidValue(Some(details.into()))
    }
}

/// Everything a parser can raise.
///
/// `Fault` is anything outside the parse-failure family: a bug or an
/// infrastructure failure inside the parser. It is never treated as a
/// mismatch and surfaces as an application fault.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Mismatch(#[from] ParseError),

    #[error("parser fault: {0}")]
    Fault(#[source] anyhow::Error),
}

impl ParserError {
    pub fn fault(err: impl Into<anyhow::Error>) -> Self {
        Self::Fault(err.into())
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, ParserError::Mismatch(_))
    }
}

/// Result type for parser operations.
pub type ParserResult<T> = Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::NotEnoughInput {
            expected: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "not enough arguments: expected 2, got 1");

        let err = ParseError::invalid_type("integer", "abc");
        assert_eq!(
            err.to_string(),
            "the value cannot be parsed: expected integer, got \"abc\""
        );

        assert_eq!(
            ParseError::InvalidValue(None).to_string(),
            "the parsed value is invalid"
        );
        assert_eq!(
            ParseError::invalid_value("must be positive").to_string(),
            "the parsed value is invalid: must be positive"
        );
    }

    #[test]
    fn test_parser_error_kinds() {
        let mismatch: ParserError = ParseError::InvalidValue(None).into();
        assert!(mismatch.is_mismatch());

        let fault = ParserError::fault(anyhow::anyhow!("lookup table missing"));
        assert!(!fault.is_mismatch());
        assert_eq!(fault.to_string(), "parser fault: lookup table missing");
    }
}
