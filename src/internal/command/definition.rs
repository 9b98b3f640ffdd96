//! Declarative argument, flag and rest definitions.

use std::collections::HashSet;

use thiserror::Error;

use crate::internal::parser::{ParserRef, UnionParser, Value};

/// Invalid command or signature definitions, detected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("argument name must not be empty")]
    EmptyName,

    #[error("duplicate argument name: {0}")]
    DuplicateName(String),

    #[error("required argument `{0}` follows an optional argument")]
    RequiredAfterOptional(String),

    #[error("required argument `{0}` cannot have a default value")]
    DefaultOnRequired(String),

    #[error("argument `{0}` has an empty type union")]
    EmptyUnion(String),
}

/// One positional argument.
#[derive(Clone)]
pub struct ArgDefinition {
    pub name: String,
    pub description: String,
    pub parser: ParserRef,
    /// Individual member types, for help output.
    pub types: Vec<ParserRef>,
    pub optional: bool,
    pub default_value: Option<Value>,
    empty_union: bool,
}

impl ArgDefinition {
    pub fn required(name: impl Into<String>, parser: ParserRef) -> Self {
        Self::build(name.into(), parser, false)
    }

    pub fn optional(name: impl Into<String>, parser: ParserRef) -> Self {
        Self::build(name.into(), parser, true)
    }

    /// A required argument accepting any of `parsers`, tried in order.
    pub fn union(name: impl Into<String>, parsers: Vec<ParserRef>) -> Self {
        let name = name.into();
        let types = parsers.clone();
        match UnionParser::new(parsers) {
            Some(union) => Self {
                types,
                ..Self::build(name, std::sync::Arc::new(union), false)
            },
            None => Self {
                empty_union: true,
                ..Self::build(name, crate::internal::parser::string(), false)
            },
        }
    }

    fn build(name: String, parser: ParserRef, optional: bool) -> Self {
        Self {
            name,
            description: String::new(),
            types: vec![parser.clone()],
            parser,
            optional,
            default_value: None,
            empty_union: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Value bound when the argument is absent. Only valid on optional arguments.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn type_name(&self) -> String {
        self.parser.type_name()
    }

    pub(crate) fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if self.empty_union {
            return Err(DefinitionError::EmptyUnion(self.name.clone()));
        }
        if !self.optional && self.default_value.is_some() {
            return Err(DefinitionError::DefaultOnRequired(self.name.clone()));
        }
        Ok(())
    }
}

/// A named flag, given as `--name`, `--name=value` or `-c`.
#[derive(Clone)]
pub struct FlagDefinition {
    pub name: String,
    pub shortcut: Option<char>,
    pub description: String,
    pub parser: ParserRef,
    pub default_value: Option<Value>,
}

impl FlagDefinition {
    pub fn new(name: impl Into<String>, parser: ParserRef) -> Self {
        Self {
            name: name.into(),
            shortcut: None,
            description: String::new(),
            parser,
            default_value: None,
        }
    }

    pub fn shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Whether `token` names this flag. Returns the inline value of
    /// `--name=value` when present.
    pub(crate) fn matches<'t>(&self, token: &'t str) -> Option<Option<&'t str>> {
        if let Some(long) = token.strip_prefix("--") {
            return match long.split_once('=') {
                Some((name, value)) if name == self.name => Some(Some(value)),
                None if long == self.name => Some(None),
                _ => None,
            };
        }
        let shortcut = self.shortcut?;
        let short = token.strip_prefix('-')?;
        let mut chars = short.chars();
        if chars.next() == Some(shortcut) && chars.next().is_none() {
            Some(None)
        } else {
            None
        }
    }
}

/// Trailing variadic tokens collected after the positional arguments.
#[derive(Clone)]
pub struct RestDefinition {
    pub name: String,
    pub description: String,
    pub parser: ParserRef,
}

impl RestDefinition {
    pub fn new(name: impl Into<String>, parser: ParserRef) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parser,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Check an ordered argument list: names are unique and non-empty, and
/// required arguments precede optional ones.
pub(crate) fn validate_args(args: &[ArgDefinition]) -> Result<(), DefinitionError> {
    let mut seen = HashSet::new();
    let mut optional_seen = false;
    for arg in args {
        arg.validate()?;
        if !seen.insert(arg.name.as_str()) {
            return Err(DefinitionError::DuplicateName(arg.name.clone()));
        }
        if arg.optional {
            optional_seen = true;
        } else if optional_seen {
            return Err(DefinitionError::RequiredAfterOptional(arg.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::parser::{integer, string};

    #[test]
    fn test_required_after_optional_is_rejected() {
        let args = vec![
            ArgDefinition::optional("a", integer()),
            ArgDefinition::required("b", string()),
        ];
        assert_eq!(
            validate_args(&args),
            Err(DefinitionError::RequiredAfterOptional("b".to_string()))
        );
    }

    #[test]
    fn test_default_on_required_is_rejected() {
        let args = vec![ArgDefinition::required("a", integer()).default_value(1)];
        assert_eq!(
            validate_args(&args),
            Err(DefinitionError::DefaultOnRequired("a".to_string()))
        );
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let args = vec![
            ArgDefinition::required("a", integer()),
            ArgDefinition::required("a", string()),
        ];
        assert_eq!(
            validate_args(&args),
            Err(DefinitionError::DuplicateName("a".to_string()))
        );
        assert_eq!(
            validate_args(&[ArgDefinition::required("", string())]),
            Err(DefinitionError::EmptyName)
        );
        assert_eq!(
            validate_args(&[ArgDefinition::union("u", Vec::new())]),
            Err(DefinitionError::EmptyUnion("u".to_string()))
        );
    }

    #[test]
    fn test_union_arg_types() {
        let arg = ArgDefinition::union("target", vec![integer() as ParserRef, string() as ParserRef]);
        assert_eq!(arg.type_name(), "integer | string");
        assert_eq!(arg.types.len(), 2);
        assert!(validate_args(&[arg]).is_ok());
    }

    #[test]
    fn test_flag_matching() {
        let flag = FlagDefinition::new("count", integer()).shortcut('c');
        assert_eq!(flag.matches("--count"), Some(None));
        assert_eq!(flag.matches("--count=3"), Some(Some("3")));
        assert_eq!(flag.matches("-c"), Some(None));
        assert_eq!(flag.matches("--counter"), None);
        assert_eq!(flag.matches("-cc"), None);
        assert_eq!(flag.matches("-5"), None);
        assert_eq!(flag.matches("count"), None);
    }
}
