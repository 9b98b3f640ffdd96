//! Command tree, signature matching and dispatch.
//!
//! A [`Command`] is built with chained builder calls, attached into a tree
//! with [`Command::sub`], frozen by [`Command::init`] and then executed any
//! number of times. [`CommandSet`] owns the root commands and turns incoming
//! [`Message`](crate::internal::message::Message)s into executions.

pub mod collection;
pub mod definition;
pub mod executor;
pub mod node;
pub mod result;
pub mod set;
pub mod signature;

pub use collection::CommandCollection;
pub use definition::{ArgDefinition, DefinitionError, FlagDefinition, RestDefinition};
pub use executor::{ExecutionContext, Executor, HelpNotifier, InitHook, Invocation, SharedState};
pub use node::{Access, Command, Settings};
pub use result::CommandResult;
pub use set::{CommandSet, CommandSetError, DenyReason, DispatchOutcome};
pub use signature::{Bindings, Signature};
