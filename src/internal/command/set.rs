//! Command set: root registry and the message dispatch loop.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{
    Access, Command, CommandCollection, CommandResult,
    executor::{ExecutionContext, HelpNotifier, SharedState},
};
use crate::internal::{config::ParseOptions, message::Message};
use crate::utils::tokenize::tokenize;

/// Why a resolved command was not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Guild-only command used outside a guild.
    GuildOnly,
    /// Rejected by a `can_use` predicate.
    Forbidden(Option<String>),
}

/// What happened to one incoming message.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The message does not start with the prefix.
    NotPrefixed,
    CommandNotFound { path: String },
    Denied { command: Command, reason: DenyReason },
    /// Rate limited; nothing ran.
    Throttled { command: Command, cooldown: Duration },
    Executed { command: Command, result: CommandResult },
}

#[derive(Debug, Error)]
pub enum CommandSetError {
    #[error("Command set is already initialized")]
    AlreadyInitialized,

    #[error("Duplicate root command: {0}")]
    DuplicateName(String),

    #[error("Command `{0}` already has a parent")]
    NotRoot(String),
}

/// Registry of root commands plus everything dispatch needs.
pub struct CommandSet {
    commands: Arc<CommandCollection>,
    options: Arc<ParseOptions>,
    state: SharedState,
    notifier: Option<Arc<dyn HelpNotifier>>,
    initialized: bool,
}

impl CommandSet {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            commands: Arc::new(CommandCollection::new()),
            options: Arc::new(options),
            state: Arc::new(()),
            notifier: None,
            initialized: false,
        }
    }

    /// Application state handed to init hooks and executors.
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = state;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn HelpNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Replace the options, e.g. after a configuration change.
    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = Arc::new(options);
    }

    pub fn commands(&self) -> &CommandCollection {
        &self.commands
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register a root command. Ignored commands are skipped.
    pub fn add(&mut self, command: Command) -> Result<(), CommandSetError> {
        if self.initialized {
            return Err(CommandSetError::AlreadyInitialized);
        }
        if command.parent().is_some() {
            return Err(CommandSetError::NotRoot(command.full_name()));
        }
        if command.is_ignored() {
            tracing::debug!(command = %command.name(), "skipping ignored command");
            return Ok(());
        }

        for alias in command.aliases() {
            if self.commands.get(&alias).is_some() || self.commands.has_alias(&alias) {
                tracing::warn!(
                    command = %command.name(),
                    "alias `{alias}` is already taken and will not resolve to this command"
                );
            }
        }

        let name = command.name().to_string();
        if !Arc::make_mut(&mut self.commands).insert(command) {
            return Err(CommandSetError::DuplicateName(name));
        }
        Ok(())
    }

    /// Initialize every root command. Idempotent; the set is frozen afterwards.
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.initialized {
            return Ok(());
        }
        for command in self.commands.values() {
            command.init(&self.state).await?;
        }
        self.initialized = true;
        tracing::info!(commands = self.commands.len(), "command set initialized");
        Ok(())
    }

    /// Walk `tokens` down the tree to the deepest matching command.
    ///
    /// Returns the command and the number of tokens that named it.
    pub fn resolve(&self, tokens: &[String]) -> Option<(Command, usize)> {
        self.commands.resolve_path(tokens)
    }

    /// Handle one incoming message end to end.
    ///
    /// # Panics
    /// If the set has not been initialized.
    pub async fn dispatch(&self, message: &Message) -> DispatchOutcome {
        assert!(
            self.initialized,
            "cannot dispatch before the command set is initialized"
        );

        let Some(input) = message.content.strip_prefix(self.options.prefix.as_str()) else {
            return DispatchOutcome::NotPrefixed;
        };
        let tokens = tokenize(input);

        let Some((command, depth)) = self.resolve(&tokens) else {
            return DispatchOutcome::CommandNotFound {
                path: tokens.first().cloned().unwrap_or_default(),
            };
        };
        if !self.options.is_visible(&command, message) {
            return DispatchOutcome::CommandNotFound {
                path: tokens[..depth].join(" "),
            };
        }
        tracing::debug!(command = %command.full_name(), author = %message.author_id, "resolved command");

        if command.is_guild_only() && message.guild_id.is_none() {
            return DispatchOutcome::Denied {
                command,
                reason: DenyReason::GuildOnly,
            };
        }
        if let Access::Denied(reason) = command.check_access(message) {
            return DispatchOutcome::Denied {
                command,
                reason: DenyReason::Forbidden(reason),
            };
        }
        if let Some(throttler) = command.throttler() {
            if throttler.increment(message) {
                let cooldown = throttler.cooldown(message);
                tracing::debug!(command = %command.full_name(), ?cooldown, "throttled");
                return DispatchOutcome::Throttled { command, cooldown };
            }
        }

        let ctx = ExecutionContext {
            message: Arc::new(message.clone()),
            options: self.options.clone(),
            commands: self.commands.clone(),
            state: self.state.clone(),
            notifier: self.notifier.clone(),
        };
        let result = command.execute(&tokens[depth..], &ctx).await;
        DispatchOutcome::Executed { command, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::command::{ArgDefinition, Invocation};
    use crate::internal::parser::integer;

    async fn echo(invocation: Invocation) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::json!(invocation.command.full_name()))
    }

    #[tokio::test]
    async fn test_resolve_walks_subs() {
        let mut set = CommandSet::new(ParseOptions::default());
        set.add(
            Command::new("config", "")
                .alias("cfg")
                .sub(Command::new("get", "").alias("g"))
                .sub(Command::new("set", "")),
        )
        .unwrap();
        set.init().await.unwrap();

        let tokens: Vec<String> = ["cfg", "g", "prefix"].iter().map(|s| s.to_string()).collect();
        let (command, depth) = set.resolve(&tokens).unwrap();
        assert_eq!(command.full_name(), "config get");
        assert_eq!(depth, 2);

        let tokens = vec!["config".to_string(), "other".to_string()];
        let (command, depth) = set.resolve(&tokens).unwrap();
        assert_eq!(command.name(), "config");
        assert_eq!(depth, 1);

        assert!(set.resolve(&["nope".to_string()]).is_none());
        assert!(set.resolve(&[]).is_none());
    }

    #[tokio::test]
    async fn test_add_rules() {
        let mut set = CommandSet::new(ParseOptions::default());
        let child = Command::new("child", "");
        let _parent = Command::new("parent", "").sub(child.clone());

        assert!(matches!(set.add(child), Err(CommandSetError::NotRoot(_))));
        set.add(Command::new("a", "")).unwrap();
        assert!(matches!(
            set.add(Command::new("a", "")),
            Err(CommandSetError::DuplicateName(_))
        ));
        set.add(Command::new("skip", "").ignore()).unwrap();
        assert!(set.commands().get("skip").is_none());

        set.init().await.unwrap();
        assert!(matches!(
            set.add(Command::new("late", "")),
            Err(CommandSetError::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn test_dispatch_passes_remaining_tokens() {
        let mut set = CommandSet::new(ParseOptions::default());
        set.add(
            Command::new("math", "").sub(
                Command::new("double", "").signature(
                    |inv: Invocation| async move {
                        let n = inv.bindings.arg_i64("n").unwrap_or_default();
                        Ok::<_, anyhow::Error>(serde_json::json!(n * 2))
                    },
                    vec![ArgDefinition::required("n", integer())],
                ),
            ),
        )
        .unwrap();
        set.add(Command::new("who", "").signature(echo, vec![])).unwrap();
        set.init().await.unwrap();

        match set.dispatch(&Message::new("!math double 21", "u")).await {
            DispatchOutcome::Executed { result, .. } => {
                assert_eq!(result.value(), Some(&serde_json::json!(42)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(
            set.dispatch(&Message::new("math double 21", "u")).await,
            DispatchOutcome::NotPrefixed
        ));
        assert!(matches!(
            set.dispatch(&Message::new("!", "u")).await,
            DispatchOutcome::CommandNotFound { .. }
        ));
    }

    #[tokio::test]
    #[should_panic(expected = "before the command set is initialized")]
    async fn test_dispatch_before_init_panics() {
        let set = CommandSet::new(ParseOptions::default());
        set.dispatch(&Message::new("!x", "u")).await;
    }
}
