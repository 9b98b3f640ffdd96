//! Executor and init-hook traits, and the context handed to them.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Command, CommandCollection, signature::Bindings};
use crate::internal::{config::ParseOptions, help::CommandHelp, message::Message};

/// Opaque application state shared with executors and init hooks.
pub type SharedState = Arc<dyn Any + Send + Sync>;

/// Handler bound to one signature.
///
/// Implemented for any `Fn(Invocation) -> impl Future<Output = anyhow::Result<Value>>`.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, invocation: Invocation) -> anyhow::Result<serde_json::Value>;
}

#[async_trait]
impl<F, Fut> Executor for F
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
{
    async fn execute(&self, invocation: Invocation) -> anyhow::Result<serde_json::Value> {
        (self)(invocation).await
    }
}

/// One-time setup run when a command is initialized.
#[async_trait]
pub trait InitHook: Send + Sync {
    async fn on_init(&self, command: Command, state: SharedState) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> InitHook for F
where
    F: Fn(Command, SharedState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_init(&self, command: Command, state: SharedState) -> anyhow::Result<()> {
        (self)(command, state).await
    }
}

/// Out-of-band notification sent to the invoker when no signature matches.
#[async_trait]
pub trait HelpNotifier: Send + Sync {
    async fn signature_not_found(
        &self,
        message: &Message,
        help: &CommandHelp,
    ) -> anyhow::Result<()>;
}

/// Everything `Command::execute` needs besides the argument tokens.
#[derive(Clone)]
pub struct ExecutionContext {
    pub message: Arc<Message>,
    pub options: Arc<ParseOptions>,
    /// Root commands of the owning command set.
    pub commands: Arc<CommandCollection>,
    pub state: SharedState,
    pub notifier: Option<Arc<dyn HelpNotifier>>,
}

impl ExecutionContext {
    /// Context with default options, no root commands and unit state.
    pub fn new(message: Message) -> Self {
        Self {
            message: Arc::new(message),
            options: Arc::new(ParseOptions::default()),
            commands: Arc::new(CommandCollection::default()),
            state: Arc::new(()),
            notifier: None,
        }
    }

    pub fn with_options(mut self, options: Arc<ParseOptions>) -> Self {
        self.options = options;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn HelpNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

/// The owned input of one executor call.
#[derive(Clone)]
pub struct Invocation {
    /// The command being executed.
    pub command: Command,
    pub bindings: Bindings,
    pub message: Arc<Message>,
    pub options: Arc<ParseOptions>,
    pub commands: Arc<CommandCollection>,
    pub state: SharedState,
}

impl Invocation {
    /// Downcast the shared application state.
    pub fn state<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }
}
