//! Built-in scalar parsers.

use std::sync::Arc;

use super::{Cursor, ParseError, Parser, ParserResult, Value};

/// Takes one token verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl Parser for StringParser {
    fn type_name(&self) -> String {
        "string".to_string()
    }

    fn parse_input(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        let token = cursor.next().ok_or(ParseError::NotEnoughInput {
            expected: 1,
            got: 0,
        })?;
        Ok(Value::from(token))
    }
}

/// Signed 64-bit integer, optionally bounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerParser {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerParser {
    /// Restrict accepted values to `min..=max`.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Parser for IntegerParser {
    fn type_name(&self) -> String {
        "integer".to_string()
    }

    fn parse_input(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        let token = cursor.peek().unwrap_or_default();
        let n: i64 = token
            .parse()
            .map_err(|_| ParseError::invalid_type(self.type_name(), token))?;

        if let Some(min) = self.min {
            if n < min {
                return Err(ParseError::invalid_value(format!("{n} is less than {min}")).into());
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(ParseError::invalid_value(format!("{n} is greater than {max}")).into());
            }
        }

        cursor.next();
        Ok(Value::Integer(n))
    }
}

/// 64-bit float. Rejects NaN and infinities.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatParser;

impl Parser for FloatParser {
    fn type_name(&self) -> String {
        "number".to_string()
    }

    fn parse_input(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        let token = cursor.peek().unwrap_or_default();
        let n: f64 = token
            .parse()
            .map_err(|_| ParseError::invalid_type(self.type_name(), token))?;
        if !n.is_finite() {
            return Err(ParseError::invalid_value("number must be finite").into());
        }
        cursor.next();
        Ok(Value::Float(n))
    }
}

/// Boolean words: true/false, yes/no, on/off, 1/0.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanParser;

impl Parser for BooleanParser {
    fn type_name(&self) -> String {
        "boolean".to_string()
    }

    fn parse_input(&self, cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        let token = cursor.peek().unwrap_or_default();
        let b = match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" => false,
            _ => return Err(ParseError::invalid_type(self.type_name(), token).into()),
        };
        cursor.next();
        Ok(Value::Boolean(b))
    }
}

/// Consumes nothing and yields `true`. Presence flags use it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchParser;

impl Parser for SwitchParser {
    fn type_name(&self) -> String {
        "switch".to_string()
    }

    fn minimal_input_required(&self) -> usize {
        0
    }

    fn parse_input(&self, _cursor: &mut Cursor<'_>) -> ParserResult<Value> {
        Ok(Value::Boolean(true))
    }
}

pub fn string() -> Arc<StringParser> {
    Arc::new(StringParser)
}

pub fn integer() -> Arc<IntegerParser> {
    Arc::new(IntegerParser::default())
}

pub fn float() -> Arc<FloatParser> {
    Arc::new(FloatParser)
}

pub fn boolean() -> Arc<BooleanParser> {
    Arc::new(BooleanParser)
}

pub fn switch() -> Arc<SwitchParser> {
    Arc::new(SwitchParser)
}
