//! Demo commands served by the `botcmd` binary.

pub mod config;
pub mod echo;
pub mod help;
pub mod math;
pub mod ping;
pub mod reload;

use std::sync::atomic::{AtomicBool, AtomicUsize};

use parking_lot::RwLock;

use crate::internal::{
    command::{CommandSet, CommandSetError, Invocation},
    config::{BotConfig, ParseOptions},
};

/// Application state shared by the demo commands.
#[derive(Debug, Default)]
pub struct BotState {
    pub config: RwLock<BotConfig>,
    /// Set when the config changed and parse options must be rebuilt.
    pub config_dirty: AtomicBool,
    pub reloads: AtomicUsize,
}

impl BotState {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config: RwLock::new(config),
            ..Self::default()
        }
    }
}

/// Downcast the invocation's state to [`BotState`].
pub(crate) fn bot_state(invocation: &Invocation) -> anyhow::Result<&BotState> {
    invocation
        .state::<BotState>()
        .ok_or_else(|| anyhow::anyhow!("bot state is not available"))
}

/// Every demo command, registered on a new set.
pub fn command_set(options: ParseOptions) -> Result<CommandSet, CommandSetError> {
    let mut set = CommandSet::new(options);
    set.add(ping::command())?;
    set.add(echo::command())?;
    set.add(math::command())?;
    set.add(help::command())?;
    set.add(config::command())?;
    set.add(reload::command())?;
    Ok(set)
}
