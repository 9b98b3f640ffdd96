//! Command definition, argument parsing and dispatch for text-based bots.
//!
//! Commands are declared as a tree of [`Command`]s with one or more typed
//! signatures each, registered on a [`CommandSet`] and fed incoming
//! [`Message`]s. Arguments are bound by composable [`parser`]s, and
//! invocations can be rate limited per scope with a [`Throttler`].

pub mod cli;
pub mod command;
pub mod internal;
pub mod utils;

pub use internal::{
    command::{
        Access, ArgDefinition, Bindings, Command, CommandResult, CommandSet, DispatchOutcome,
        FlagDefinition, Invocation, RestDefinition,
    },
    config::{BotConfig, ParseOptions},
    message::Message,
    parser,
    throttle::{ThrottleScope, Throttler},
};
