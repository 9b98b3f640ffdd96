//! `config get|set`: inspect and change the running configuration.

use std::sync::atomic::Ordering;

use super::bot_state;
use crate::internal::{
    command::{Access, ArgDefinition, Command, Invocation},
    parser::string,
};

pub fn command() -> Command {
    Command::new("config", "Inspect or change the bot configuration")
        .alias("cfg")
        .sub(
            Command::new("get", "Show a setting")
                .example("!config get prefix")
                .signature(
                    get,
                    vec![ArgDefinition::required("key", string()).description("Setting name")],
                ),
        )
        .sub(
            Command::new("set", "Change a setting")
                .guild_only()
                .example("!config set prefix ?")
                .can_use(|message| {
                    if message.author_id.is_empty() {
                        Access::Denied(Some("anonymous users cannot change settings".to_string()))
                    } else {
                        Access::Allowed
                    }
                })
                .signature(
                    set,
                    vec![
                        ArgDefinition::required("key", string()).description("Setting name"),
                        ArgDefinition::required("value", string()).description("New value"),
                    ],
                ),
        )
}

async fn get(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let state = bot_state(&invocation)?;
    let key = invocation.bindings.arg_str("key").unwrap_or_default();
    let value = state.config.read().get(key)?;
    Ok(serde_json::json!(format!("{key} = {value}")))
}

/// Settings that widen what a user may do, or what the bot reads from disk.
const DEV_ONLY_KEYS: &[&str] = &["dev_ids", "localization"];

async fn set(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let state = bot_state(&invocation)?;
    let key = invocation.bindings.arg_str("key").unwrap_or_default();
    let value = invocation.bindings.arg_str("value").unwrap_or_default();
    if DEV_ONLY_KEYS.contains(&key) && !invocation.options.is_dev(&invocation.message.author_id) {
        anyhow::bail!("only developers can change `{key}`");
    }
    state.config.write().set(key, value)?;
    state.config_dirty.store(true, Ordering::SeqCst);
    tracing::info!(author = %invocation.message.author_id, "config {key} set to {value}");
    Ok(serde_json::json!(format!("{key} = {value}")))
}
