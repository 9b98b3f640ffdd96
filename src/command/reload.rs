//! `reload`: developer-only configuration reload.

use std::sync::atomic::Ordering;

use super::bot_state;
use crate::internal::{
    command::{Command, Invocation, SharedState},
    config::BotConfig,
};

pub fn command() -> Command {
    Command::new("reload", "Re-read the configuration file")
        .dev()
        .keep_command_message()
        .on_init(|command: Command, state: SharedState| async move {
            if state.downcast_ref::<super::BotState>().is_none() {
                tracing::warn!(command = %command.name(), "no bot state, reload will fail");
            }
            Ok::<_, anyhow::Error>(())
        })
        .signature(execute, vec![])
}

async fn execute(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    let state = bot_state(&invocation)?;
    let source = state.config.read().source.clone();
    let config = match &source {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::default(),
    };
    *state.config.write() = config;
    state.config_dirty.store(true, Ordering::SeqCst);
    let count = state.reloads.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(serde_json::json!(format!("configuration reloaded ({count})")))
}
