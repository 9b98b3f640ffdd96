//! Outcome of executing a command.

use std::fmt;
use std::sync::Arc;

use super::{Command, signature::Signature};

/// Result of [`Command::execute`].
pub enum CommandResult {
    /// A signature matched and its executor returned a value.
    Ok {
        command: Command,
        signature: Arc<Signature>,
        value: serde_json::Value,
    },
    /// A parser or the executor failed.
    Error { fault: anyhow::Error },
    /// No signature accepted the tokens.
    SignatureNotFound { command: Command },
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResult::Ok { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CommandResult::Error { .. })
    }

    pub fn is_signature_not_found(&self) -> bool {
        matches!(self, CommandResult::SignatureNotFound { .. })
    }

    /// The executor's return value on success.
    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            CommandResult::Ok { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn fault(&self) -> Option<&anyhow::Error> {
        match self {
            CommandResult::Error { fault } => Some(fault),
            _ => None,
        }
    }
}

impl fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Ok {
                command,
                signature,
                value,
            } => f
                .debug_struct("Ok")
                .field("command", &command.full_name())
                .field("signature", &signature.usage())
                .field("value", value)
                .finish(),
            CommandResult::Error { fault } => f
                .debug_struct("Error")
                .field("fault", &format_args!("{fault:#}"))
                .finish(),
            CommandResult::SignatureNotFound { command } => f
                .debug_struct("SignatureNotFound")
                .field("command", &command.full_name())
                .finish(),
        }
    }
}
