//! Position over a sequence of argument tokens.

/// A read position over borrowed argument tokens.
///
/// Cloning a cursor is cheap and yields an independent copy, which is how
/// speculative parsing works: parse against a clone, then commit it back
/// only on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the first token.
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Number of tokens not consumed yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Index of the next token in the underlying slice.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// Consume and return the next token.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    /// The tokens that have not been consumed yet.
    pub fn remaining_tokens(&self) -> &'a [String] {
        self.tokens.get(self.position..).unwrap_or(&[])
    }

    /// Consume everything that is left.
    pub fn take_remaining(&mut self) -> &'a [String] {
        let rest = self.remaining_tokens();
        self.position = self.tokens.len();
        rest
    }
}
