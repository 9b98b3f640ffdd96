//! Signature resolution: binding raw tokens to typed, named values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::definition::{
    ArgDefinition, DefinitionError, FlagDefinition, RestDefinition, validate_args,
};
use super::executor::Executor;
use crate::internal::parser::{Cursor, ParserError, ParserRef, Value};

/// Name → value mapping produced by a successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    args: HashMap<String, Value>,
    flags: HashMap<String, Value>,
    rest: Vec<Value>,
}

impl Bindings {
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(Value::as_str)
    }

    pub fn arg_i64(&self, name: &str) -> Option<i64> {
        self.arg(name).and_then(Value::as_i64)
    }

    pub fn arg_f64(&self, name: &str) -> Option<f64> {
        self.arg(name).and_then(Value::as_f64)
    }

    pub fn arg_bool(&self, name: &str) -> Option<bool> {
        self.arg(name).and_then(Value::as_bool)
    }

    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags.get(name)
    }

    /// `true` only when the flag is bound to boolean `true`.
    pub fn flag_set(&self, name: &str) -> bool {
        self.flag(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Trailing tokens. Parsed when the command declares a rest argument,
    /// raw strings otherwise.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    pub fn args(&self) -> &HashMap<String, Value> {
        &self.args
    }

    pub fn flags(&self) -> &HashMap<String, Value> {
        &self.flags
    }
}

/// One overload of a command: an argument list and its executor.
pub struct Signature {
    args: Vec<ArgDefinition>,
    executor: Arc<dyn Executor>,
    min_arg_needed: usize,
    arg_count: usize,
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("usage", &self.usage())
            .field("min_arg_needed", &self.min_arg_needed)
            .field("arg_count", &self.arg_count)
            .finish()
    }
}

impl Signature {
    pub fn new(
        executor: Arc<dyn Executor>,
        args: Vec<ArgDefinition>,
    ) -> Result<Self, DefinitionError> {
        validate_args(&args)?;
        let min_arg_needed = args.iter().take_while(|a| !a.optional).count();
        Ok(Self {
            arg_count: args.len(),
            min_arg_needed,
            args,
            executor,
        })
    }

    /// Number of leading required arguments.
    pub fn min_arg_needed(&self) -> usize {
        self.min_arg_needed
    }

    /// Total number of declared arguments.
    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    pub fn args(&self) -> &[ArgDefinition] {
        &self.args
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// `<required> [optional = default]`, without the command name.
    pub fn usage(&self) -> String {
        self.args
            .iter()
            .map(|arg| match (&arg.default_value, arg.optional) {
                (_, false) => format!("<{}>", arg.name),
                (Some(default), true) => format!("[{} = {default}]", arg.name),
                (None, true) => format!("[{}]", arg.name),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Try to bind `tokens` to this signature.
    ///
    /// Returns `Ok(None)` when the tokens do not fit, and `Err` only for
    /// faults raised by a parser.
    pub fn try_parse(
        &self,
        tokens: &[String],
        flags: &[FlagDefinition],
        rest: Option<&RestDefinition>,
    ) -> anyhow::Result<Option<Bindings>> {
        let mut bindings = Bindings::default();

        let Some(positional) = extract_flags(tokens, flags, &mut bindings.flags)? else {
            return Ok(None);
        };
        let mut cursor = Cursor::new(&positional);

        let (required, optional) = self.args.split_at(self.min_arg_needed);

        for arg in required {
            match arg.parser.parse(&mut cursor) {
                Ok(value) => {
                    bindings.args.insert(arg.name.clone(), value);
                }
                Err(ParserError::Mismatch(_)) => return Ok(None),
                Err(ParserError::Fault(err)) => return Err(err),
            }
        }

        let mut exhausted = false;
        for arg in optional {
            if !exhausted {
                let mut attempt = cursor.clone();
                match arg.parser.parse(&mut attempt) {
                    Ok(value) => {
                        cursor = attempt;
                        bindings.args.insert(arg.name.clone(), value);
                        continue;
                    }
                    Err(ParserError::Mismatch(_)) => exhausted = true,
                    Err(ParserError::Fault(err)) => return Err(err),
                }
            }
            if let Some(default) = &arg.default_value {
                bindings.args.insert(arg.name.clone(), default.clone());
            }
        }

        match rest {
            Some(rest) => {
                while !cursor.is_empty() {
                    let before = cursor.position();
                    match rest.parser.parse(&mut cursor) {
                        Ok(value) => bindings.rest.push(value),
                        Err(ParserError::Mismatch(_)) => return Ok(None),
                        Err(ParserError::Fault(err)) => return Err(err),
                    }
                    // A rest parser that consumes nothing cannot account
                    // for the tokens still left.
                    if cursor.position() == before {
                        return Ok(None);
                    }
                }
            }
            None => {
                bindings.rest = cursor
                    .take_remaining()
                    .iter()
                    .map(|token| Value::from(token.as_str()))
                    .collect();
            }
        }

        Ok(Some(bindings))
    }
}

/// Pull declared flags out of `tokens`, returning the positional remainder.
///
/// Tokens naming no declared flag stay positional, and `--` ends flag
/// processing. `Ok(None)` means a flag value did not parse.
fn extract_flags(
    tokens: &[String],
    flags: &[FlagDefinition],
    bound: &mut HashMap<String, Value>,
) -> anyhow::Result<Option<Vec<String>>> {
    let mut positional = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--" {
            positional.extend_from_slice(&tokens[i + 1..]);
            break;
        }

        let Some((flag, inline)) = flags
            .iter()
            .find_map(|flag| flag.matches(token).map(|inline| (flag, inline)))
        else {
            positional.push(tokens[i].clone());
            i += 1;
            continue;
        };

        let value = match inline {
            Some(inline) => {
                let inline = [inline.to_string()];
                let mut cursor = Cursor::new(&inline);
                match parse_flag(&flag.parser, &mut cursor)? {
                    Some(value) if cursor.is_empty() => value,
                    _ => return Ok(None),
                }
            }
            None => {
                let following = &tokens[i + 1..];
                let mut cursor = Cursor::new(following);
                match parse_flag(&flag.parser, &mut cursor)? {
                    Some(value) => {
                        i += cursor.position();
                        value
                    }
                    None => return Ok(None),
                }
            }
        };

        bound.insert(flag.name.clone(), value);
        i += 1;
    }

    for flag in flags {
        if !bound.contains_key(&flag.name) {
            if let Some(default) = &flag.default_value {
                bound.insert(flag.name.clone(), default.clone());
            }
        }
    }

    Ok(Some(positional))
}

fn parse_flag(parser: &ParserRef, cursor: &mut Cursor<'_>) -> anyhow::Result<Option<Value>> {
    match parser.parse(cursor) {
        Ok(value) => Ok(Some(value)),
        Err(ParserError::Mismatch(_)) => Ok(None),
        Err(ParserError::Fault(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::command::executor::Invocation;
    use crate::internal::parser::{Cursor, Parser, ParserResult, integer, string, switch};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn noop() -> Arc<dyn Executor> {
        Arc::new(|_: Invocation| async { Ok::<_, anyhow::Error>(serde_json::Value::Null) })
    }

    fn signature(args: Vec<ArgDefinition>) -> Signature {
        Signature::new(noop(), args).unwrap()
    }

    #[test]
    fn test_counts() {
        let sig = signature(vec![
            ArgDefinition::required("a", integer()),
            ArgDefinition::required("b", string()),
            ArgDefinition::optional("c", string()),
        ]);
        assert_eq!(sig.min_arg_needed(), 2);
        assert_eq!(sig.arg_count(), 3);
    }

    #[test]
    fn test_optional_default() {
        let sig = signature(vec![
            ArgDefinition::required("a", integer()),
            ArgDefinition::optional("b", string()).default_value("x"),
        ]);

        let bound = sig.try_parse(&tokens(&["5"]), &[], None).unwrap().unwrap();
        assert_eq!(bound.arg_i64("a"), Some(5));
        assert_eq!(bound.arg_str("b"), Some("x"));

        let bound = sig
            .try_parse(&tokens(&["5", "y"]), &[], None)
            .unwrap()
            .unwrap();
        assert_eq!(bound.arg_i64("a"), Some(5));
        assert_eq!(bound.arg_str("b"), Some("y"));

        assert!(sig.try_parse(&tokens(&[]), &[], None).unwrap().is_none());
    }

    #[test]
    fn test_required_failure_is_no_match() {
        let sig = signature(vec![ArgDefinition::required("a", integer())]);
        assert!(
            sig.try_parse(&tokens(&["abc"]), &[], None)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_optional_stops_at_first_failure() {
        let sig = signature(vec![
            ArgDefinition::optional("n", integer()).default_value(1),
            ArgDefinition::optional("m", integer()).default_value(2),
        ]);
        // "x" fails `n`, so `m` is never attempted even though "3" would fit.
        let bound = sig
            .try_parse(&tokens(&["x", "3"]), &[], None)
            .unwrap()
            .unwrap();
        assert_eq!(bound.arg_i64("n"), Some(1));
        assert_eq!(bound.arg_i64("m"), Some(2));
        assert_eq!(bound.rest(), &[Value::from("x"), Value::from("3")]);
    }

    #[test]
    fn test_optional_without_default_is_unbound() {
        let sig = signature(vec![ArgDefinition::optional("who", string())]);
        let bound = sig.try_parse(&tokens(&[]), &[], None).unwrap().unwrap();
        assert!(bound.arg("who").is_none());
    }

    #[test]
    fn test_rest_definition_validates_every_token() {
        let sig = signature(vec![ArgDefinition::required("first", string())]);
        let rest = RestDefinition::new("numbers", integer());

        let bound = sig
            .try_parse(&tokens(&["a", "1", "2"]), &[], Some(&rest))
            .unwrap()
            .unwrap();
        assert_eq!(bound.rest(), &[Value::Integer(1), Value::Integer(2)]);

        assert!(
            sig.try_parse(&tokens(&["a", "1", "two"]), &[], Some(&rest))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_rest_that_consumes_nothing_is_no_match() {
        let sig = signature(vec![]);
        let rest = RestDefinition::new("flags", switch());

        assert!(
            sig.try_parse(&tokens(&["a", "b"]), &[], Some(&rest))
                .unwrap()
                .is_none()
        );
        let bound = sig.try_parse(&tokens(&[]), &[], Some(&rest)).unwrap().unwrap();
        assert!(bound.rest().is_empty());
    }

    #[test]
    fn test_flags_anywhere() {
        let sig = signature(vec![ArgDefinition::required("n", integer())]);
        let flags = vec![
            FlagDefinition::new("verbose", switch()).shortcut('v'),
            FlagDefinition::new("times", integer())
                .shortcut('t')
                .default_value(1),
            FlagDefinition::new("mode", string()).default_value("fast"),
        ];

        let bound = sig
            .try_parse(&tokens(&["-v", "-5", "--times", "3"]), &flags, None)
            .unwrap()
            .unwrap();
        assert!(bound.flag_set("verbose"));
        assert_eq!(bound.flag("times"), Some(&Value::Integer(3)));
        assert_eq!(bound.flag("mode"), Some(&Value::from("fast")));
        assert_eq!(bound.arg_i64("n"), Some(-5));

        let bound = sig
            .try_parse(&tokens(&["--mode=slow", "4"]), &flags, None)
            .unwrap()
            .unwrap();
        assert!(!bound.flag_set("verbose"));
        assert_eq!(bound.flag("times"), Some(&Value::Integer(1)));
        assert_eq!(bound.flag("mode"), Some(&Value::from("slow")));
    }

    #[test]
    fn test_bad_flag_value_is_no_match() {
        let sig = signature(vec![]);
        let flags = vec![FlagDefinition::new("times", integer())];
        assert!(
            sig.try_parse(&tokens(&["--times", "many"]), &flags, None)
                .unwrap()
                .is_none()
        );
        assert!(
            sig.try_parse(&tokens(&["--times=many"]), &flags, None)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let sig = signature(vec![ArgDefinition::required("text", string())]);
        let flags = vec![FlagDefinition::new("loud", switch())];
        let bound = sig
            .try_parse(&tokens(&["--", "--loud"]), &flags, None)
            .unwrap()
            .unwrap();
        assert_eq!(bound.arg_str("text"), Some("--loud"));
        assert!(bound.flag("loud").is_none());
    }

    struct Faulty;

    impl Parser for Faulty {
        fn type_name(&self) -> String {
            "faulty".to_string()
        }

        fn parse_input(&self, _cursor: &mut Cursor<'_>) -> ParserResult<Value> {
            Err(ParserError::fault(anyhow::anyhow!("database offline")))
        }
    }

    #[test]
    fn test_parser_fault_is_propagated() {
        let sig = signature(vec![ArgDefinition::required("x", Arc::new(Faulty))]);
        let err = sig.try_parse(&tokens(&["1"]), &[], None).unwrap_err();
        assert_eq!(err.to_string(), "database offline");
    }

    #[test]
    fn test_usage() {
        let sig = signature(vec![
            ArgDefinition::required("a", integer()),
            ArgDefinition::optional("b", string()).default_value("x"),
            ArgDefinition::optional("c", string()),
        ]);
        assert_eq!(sig.usage(), "<a> [b = x] [c]");
    }
}
