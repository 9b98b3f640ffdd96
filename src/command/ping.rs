//! `ping`: liveness check, throttled per user.

use crate::internal::{
    command::{Command, Invocation},
    throttle::{ThrottleScope, Throttler},
};

pub fn command() -> Command {
    let command = Command::new("ping", "Check that the bot is responding")
        .alias("p")
        .example("!ping")
        .signature(execute, vec![]);
    match Throttler::from_secs(ThrottleScope::User, 3, 10) {
        Some(throttler) => command.throttle(throttler),
        None => command,
    }
}

async fn execute(_invocation: Invocation) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::json!("pong"))
}
