//! `echo`: repeat the given text.

use std::sync::Arc;

use crate::internal::{
    command::{Command, FlagDefinition, Invocation, RestDefinition},
    parser::{IntegerParser, string, switch},
};

pub fn command() -> Command {
    Command::new("echo", "Repeat a message")
        .alias("say")
        .example("!echo hello world")
        .example("!say --upper -t 2 \"hi there\"")
        .flag(
            FlagDefinition::new("upper", switch())
                .shortcut('u')
                .description("Shout the message"),
        )
        .flag(
            FlagDefinition::new("times", Arc::new(IntegerParser::default().range(1, 5)))
                .shortcut('t')
                .default_value(1)
                .description("How many times to repeat it"),
        )
        .rest(RestDefinition::new("text", string()).description("Words to repeat"))
        .signature(execute, vec![])
}

async fn execute(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let bindings = &invocation.bindings;
    let mut text = bindings
        .rest()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    if bindings.flag_set("upper") {
        text = text.to_uppercase();
    }
    let times = bindings
        .flag("times")
        .and_then(|v| v.as_i64())
        .unwrap_or(1)
        .max(1) as usize;
    Ok(serde_json::json!(vec![text; times].join("\n")))
}
