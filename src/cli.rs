//! CLI entry for botcmd: reads chat lines from stdin and dispatches each one
//! through the demo command set.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{self, BotState};
use crate::internal::{
    command::{CommandResult, DenyReason, DispatchOutcome, HelpNotifier},
    config::{BotConfig, ParseOptions},
    help::CommandHelp,
    localization::HelpLabels,
    message::Message,
};

#[derive(Parser, Debug)]
#[command(
    name = "botcmd",
    about = "Dispatch chat messages read from stdin through the demo bot commands",
    version
)]
pub struct Cli {
    /// Config file to use instead of the project/user lookup
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured command prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Author id attached to every message
    #[arg(long, default_value = "user")]
    pub user: String,

    /// Guild id attached to every message; direct messages when absent
    #[arg(long)]
    pub guild: Option<String>,

    /// Treat the author as a developer
    #[arg(long)]
    pub dev: bool,
}

/// Prints the help of a command whose arguments did not match.
struct PrintHelp {
    labels: HelpLabels,
}

#[async_trait]
impl HelpNotifier for PrintHelp {
    async fn signature_not_found(&self, _message: &Message, help: &CommandHelp) -> anyhow::Result<()> {
        println!("{}", help.render(&self.labels));
        Ok(())
    }
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<BotConfig> {
        let mut config = match &self.config {
            Some(path) => BotConfig::from_file(path)?,
            None => BotConfig::load(&std::env::current_dir()?)?,
        };
        if let Some(prefix) = &self.prefix {
            config.set("prefix", prefix)?;
        }
        if self.dev && !config.dev_ids.contains(&self.user) {
            config.dev_ids.push(self.user.clone());
        }
        Ok(config)
    }

    fn message(&self, content: &str) -> Message {
        let message = Message::new(content, self.user.clone());
        match &self.guild {
            Some(guild) => message.in_guild(guild.clone()),
            None => message,
        }
    }
}

/// Run the read-dispatch-print loop until stdin closes.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    let options = config.to_options()?;
    let notifier = Arc::new(PrintHelp {
        labels: options.localization.help.clone(),
    });
    let state = Arc::new(BotState::new(config));

    let mut set = command::command_set(options)?
        .with_state(state.clone())
        .with_notifier(notifier);
    set.init().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = set.dispatch(&cli.message(line)).await;
        match describe(&outcome, set.options()) {
            Some(Ok(text)) => println!("{text}"),
            Some(Err(text)) => println!("{}", text.red()),
            None => {}
        }

        if state.config_dirty.swap(false, Ordering::SeqCst) {
            let mut config = state.config.read().clone();
            if cli.dev && !config.dev_ids.contains(&cli.user) {
                config.dev_ids.push(cli.user.clone());
            }
            match config.to_options() {
                Ok(options) => set.set_options(options),
                Err(err) => eprintln!("{}", format!("error: {err}").red()),
            }
        }
    }
    Ok(())
}

/// Text to show for an outcome; `Err` for failures. `None` when there is
/// nothing to say.
pub fn describe(outcome: &DispatchOutcome, options: &ParseOptions) -> Option<Result<String, String>> {
    match outcome {
        DispatchOutcome::NotPrefixed => None,
        DispatchOutcome::CommandNotFound { path } if path.is_empty() => None,
        DispatchOutcome::CommandNotFound { path } => Some(Err(options
            .localization
            .help
            .command_not_found
            .replace("{name}", path))),
        DispatchOutcome::Denied {
            command,
            reason: DenyReason::GuildOnly,
        } => Some(Err(format!(
            "`{}` can only be used in a server",
            command.full_name()
        ))),
        DispatchOutcome::Denied {
            command,
            reason: DenyReason::Forbidden(reason),
        } => Some(Err(match reason {
            Some(reason) => format!("cannot use `{}`: {reason}", command.full_name()),
            None => format!("cannot use `{}`", command.full_name()),
        })),
        DispatchOutcome::Throttled { command, cooldown } => Some(Err(format!(
            "`{}` is cooling down, try again in {}s",
            command.full_name(),
            cooldown.as_secs() + u64::from(cooldown.subsec_nanos() > 0)
        ))),
        DispatchOutcome::Executed { result, .. } => match result {
            CommandResult::Ok { value, .. } => match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) => Some(Ok(text.clone())),
                other => Some(Ok(other.to_string())),
            },
            CommandResult::Error { fault } => Some(Err(format!("error: {fault:#}"))),
            CommandResult::SignatureNotFound { command } => Some(Err(format!(
                "invalid arguments for `{}`",
                command.full_name()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::internal::command::Command;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["botcmd", "--prefix", "?", "--user", "42", "--guild", "7", "--dev"]);
        assert_eq!(cli.prefix.as_deref(), Some("?"));

        let message = cli.message("?ping");
        assert_eq!(message.author_id, "42");
        assert_eq!(message.guild_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_describe_outcomes() {
        let options = ParseOptions::default();
        assert_eq!(describe(&DispatchOutcome::NotPrefixed, &options), None);
        assert_eq!(
            describe(
                &DispatchOutcome::CommandNotFound {
                    path: "nope".to_string()
                },
                &options
            ),
            Some(Err("Command `nope` not found".to_string()))
        );
        assert_eq!(
            describe(
                &DispatchOutcome::Throttled {
                    command: Command::new("ping", ""),
                    cooldown: Duration::from_millis(2_500),
                },
                &options
            ),
            Some(Err("`ping` is cooling down, try again in 3s".to_string()))
        );
        assert_eq!(
            describe(
                &DispatchOutcome::Denied {
                    command: Command::new("set", ""),
                    reason: DenyReason::Forbidden(Some("no".to_string())),
                },
                &options
            ),
            Some(Err("cannot use `set`: no".to_string()))
        );
    }
}
