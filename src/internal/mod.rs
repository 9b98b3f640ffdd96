//! Engine internals: parsers, the command tree and dispatch, throttling, help and configuration.

pub mod command;
pub mod config;
pub mod help;
pub mod localization;
pub mod message;
pub mod parser;
pub mod throttle;
