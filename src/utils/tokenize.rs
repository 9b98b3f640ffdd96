//! Splitting message text into argument tokens.

/// Split `input` with shell-like quoting (`"two words"`, `'x'`, `\"`).
///
/// Input with unbalanced quotes falls back to plain whitespace splitting,
/// so a stray apostrophe in chat text never makes a message unreadable.
pub fn tokenize(input: &str) -> Vec<String> {
    match shlex::split(input) {
        Some(tokens) => tokens,
        None => {
            tracing::debug!("unbalanced quotes, splitting on whitespace: {input:?}");
            input.split_whitespace().map(str::to_string).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_tokens() {
        assert_eq!(
            tokenize(r#"echo "hello world" 'a b' c\ d"#),
            vec!["echo", "hello world", "a b", "c d"]
        );
    }

    #[test]
    fn test_unbalanced_quotes_fall_back() {
        assert_eq!(tokenize("say don't stop"), vec!["say", "don't", "stop"]);
    }

    #[test]
    fn test_blank_input() {
        assert!(tokenize("   ").is_empty());
    }
}
