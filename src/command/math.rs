//! `math`: arithmetic sub-commands showing overloads, unions and rest arguments.

use crate::internal::{
    command::{ArgDefinition, Command, Invocation, RestDefinition},
    parser::{ParserRef, Value, float, integer},
};

pub fn command() -> Command {
    Command::new("math", "Small arithmetic helpers")
        .alias("m")
        .sub(
            Command::new("add", "Add two numbers")
                .example("!math add 2 3")
                .example("!math add 0.5 2")
                .signature(
                    add_integers,
                    vec![
                        ArgDefinition::required("a", integer()),
                        ArgDefinition::required("b", integer()),
                    ],
                )
                .signature(
                    add_floats,
                    vec![
                        ArgDefinition::required("a", float()),
                        ArgDefinition::required("b", float()),
                    ],
                ),
        )
        .sub(
            Command::new("sum", "Add up any amount of numbers")
                .rest(RestDefinition::new("numbers", float()))
                .signature(sum, vec![]),
        )
        .sub(
            Command::new("abs", "Absolute value").signature(
                abs,
                vec![
                    ArgDefinition::union("n", vec![integer() as ParserRef, float() as ParserRef])
                        .description("Whole or decimal number"),
                ],
            ),
        )
        .sub(
            Command::new("clamp", "Bound a number to a range").signature(
                clamp,
                vec![
                    ArgDefinition::required("n", integer()),
                    ArgDefinition::optional("min", integer()).default_value(0),
                    ArgDefinition::optional("max", integer()).default_value(100),
                ],
            ),
        )
}

async fn add_integers(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let b = &invocation.bindings;
    let (a, c) = (b.arg_i64("a").unwrap_or_default(), b.arg_i64("b").unwrap_or_default());
    let total = a
        .checked_add(c)
        .ok_or_else(|| anyhow::anyhow!("{a} + {c} overflows"))?;
    Ok(serde_json::json!(total))
}

async fn add_floats(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let b = &invocation.bindings;
    Ok(serde_json::json!(
        b.arg_f64("a").unwrap_or_default() + b.arg_f64("b").unwrap_or_default()
    ))
}

async fn sum(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let total: f64 = invocation.bindings.rest().iter().filter_map(Value::as_f64).sum();
    Ok(serde_json::json!(total))
}

async fn abs(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    match invocation.bindings.arg("n") {
        Some(Value::Integer(n)) => Ok(serde_json::json!(n.unsigned_abs())),
        Some(Value::Float(n)) => Ok(serde_json::json!(n.abs())),
        other => anyhow::bail!("unexpected value for n: {other:?}"),
    }
}

async fn clamp(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let b = &invocation.bindings;
    let n = b.arg_i64("n").unwrap_or_default();
    let min = b.arg_i64("min").unwrap_or(0);
    let max = b.arg_i64("max").unwrap_or(100);
    if min > max {
        anyhow::bail!("min ({min}) is greater than max ({max})");
    }
    Ok(serde_json::json!(n.clamp(min, max)))
}
