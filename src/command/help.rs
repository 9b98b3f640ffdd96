//! `help`: list commands, or describe one.

use crate::internal::{
    command::{Command, Invocation, RestDefinition},
    help::command_help_for,
    parser::string,
};

pub fn command() -> Command {
    Command::new("help", "List commands or show how to use one")
        .alias("h")
        .example("!help")
        .example("!help math add")
        .rest(RestDefinition::new("command", string()).description("Command path"))
        .signature(execute, vec![])
}

async fn execute(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let options = &invocation.options;
    let message = &invocation.message;
    let path: Vec<String> = invocation
        .bindings
        .rest()
        .iter()
        .map(ToString::to_string)
        .collect();

    if path.is_empty() {
        let lines: Vec<String> = invocation
            .commands
            .values()
            .filter(|c| options.is_visible(c, message))
            .map(|c| format!("{}{}  {}", options.prefix, c.name(), c.description()))
            .collect();
        return Ok(serde_json::json!(lines.join("\n")));
    }

    let found = invocation
        .commands
        .resolve_path(&path)
        .filter(|(command, depth)| *depth == path.len() && options.is_visible(command, message));
    let text = match found {
        Some((command, _)) => {
            command_help_for(&command, options, message).render(&options.localization.help)
        }
        None => options
            .localization
            .help
            .command_not_found
            .replace("{name}", &path.join(" ")),
    };
    Ok(serde_json::json!(text))
}
