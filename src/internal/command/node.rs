//! The command tree node: settings, signatures, sub-commands and lifecycle.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

use super::{
    CommandCollection, CommandResult,
    definition::{ArgDefinition, DefinitionError, FlagDefinition, RestDefinition},
    executor::{ExecutionContext, Executor, InitHook, Invocation, SharedState},
    signature::Signature,
};
use crate::internal::{help, message::Message, throttle::Throttler};

/// Outcome of a caller-supplied access predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allowed,
    /// Denied, optionally with a reason to show the invoker.
    Denied(Option<String>),
}

type AccessPredicate = dyn Fn(&Message) -> Access + Send + Sync;

/// Flags configured through the builder methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub ignored: bool,
    pub dev_only: bool,
    pub guild_only: bool,
    pub delete_command_message: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignored: false,
            dev_only: false,
            guild_only: false,
            delete_command_message: true,
        }
    }
}

struct Node {
    name: String,
    description: String,
    parent: OnceLock<Weak<Node>>,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    initialized: bool,
    settings: Settings,
    aliases: Vec<String>,
    examples: Vec<String>,
    signatures: Vec<Arc<Signature>>,
    flags: Vec<FlagDefinition>,
    rest: Option<RestDefinition>,
    subs: CommandCollection,
    on_init: Option<Arc<dyn InitHook>>,
    throttler: Option<Arc<Throttler>>,
    can_use: Option<Arc<AccessPredicate>>,
}

/// A named node in the command tree.
///
/// `Command` is a cheap handle: clones refer to the same node. Children are
/// owned by their parent; the parent link is a weak back-reference that can
/// be set only once. The tree is configured through the builder methods,
/// then frozen by [`Command::init`].
#[derive(Clone)]
pub struct Command {
    node: Arc<Node>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.full_name())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Command {}

impl Command {
    /// Create a command.
    ///
    /// # Panics
    /// If `name` is empty or contains whitespace.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        assert!(
            !name.is_empty() && !name.chars().any(char::is_whitespace),
            "command name must be a non-empty word, got {name:?}"
        );
        Self {
            node: Arc::new(Node {
                name,
                description: description.into(),
                parent: OnceLock::new(),
                state: RwLock::new(State::default()),
            }),
        }
    }

    // === Builder =============================================================

    /// Apply a build-phase change, ignoring it once the tree is frozen.
    fn configure(self, what: &str, change: impl FnOnce(&mut State)) -> Self {
        {
            let mut state = self.node.state.write();
            if state.initialized {
                tracing::warn!(command = %self.node.name, "ignoring `{what}` on an initialized command");
            } else {
                change(&mut state);
            }
        }
        self
    }

    /// Exclude this command (and its subtree) from lookup.
    pub fn ignore(self) -> Self {
        self.configure("ignore", |s| s.settings.ignored = true)
    }

    /// Do not delete the message that invoked this command.
    pub fn keep_command_message(self) -> Self {
        self.configure("keep_command_message", |s| {
            s.settings.delete_command_message = false
        })
    }

    /// Only developers can see and run this command.
    pub fn dev(self) -> Self {
        self.configure("dev", |s| s.settings.dev_only = true)
    }

    /// Only runnable from inside a guild.
    pub fn guild_only(self) -> Self {
        self.configure("guild_only", |s| s.settings.guild_only = true)
    }

    pub fn alias(self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.configure("alias", |s| {
            if !s.aliases.contains(&alias) {
                s.aliases.push(alias)
            }
        })
    }

    pub fn example(self, example: impl Into<String>) -> Self {
        let example = example.into();
        self.configure("example", |s| s.examples.push(example))
    }

    /// Hook run once, after the sub-commands, when the command is initialized.
    pub fn on_init<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(Command, SharedState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let hook: Arc<dyn InitHook> = Arc::new(hook);
        self.configure("on_init", |s| s.on_init = Some(hook))
    }

    /// Add an overload.
    ///
    /// # Panics
    /// If the argument list is invalid; see [`Command::try_signature`].
    pub fn signature<F, Fut>(self, executor: F, args: Vec<ArgDefinition>) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
    {
        match self.try_signature(executor, args) {
            Ok(command) => command,
            Err((command, err)) => panic!(
                "invalid signature for command `{}`: {err}",
                command.full_name()
            ),
        }
    }

    /// Add an overload, handing the command back with the error when the
    /// argument list is invalid.
    pub fn try_signature<F, Fut>(
        self,
        executor: F,
        args: Vec<ArgDefinition>,
    ) -> Result<Self, (Self, DefinitionError)>
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
    {
        let executor: Arc<dyn Executor> = Arc::new(executor);
        match Signature::new(executor, args) {
            Ok(signature) => {
                let signature = Arc::new(signature);
                Ok(self.configure("signature", |s| s.signatures.push(signature)))
            }
            Err(err) => Err((self, err)),
        }
    }

    pub fn flag(self, flag: FlagDefinition) -> Self {
        self.configure("flag", |s| {
            s.flags.retain(|f| f.name != flag.name);
            s.flags.push(flag)
        })
    }

    pub fn rest(self, rest: RestDefinition) -> Self {
        self.configure("rest", |s| s.rest = Some(rest))
    }

    pub fn throttle(self, throttler: Throttler) -> Self {
        let throttler = Arc::new(throttler);
        self.configure("throttle", |s| s.throttler = Some(throttler))
    }

    /// Caller-supplied permission check, consulted before execution.
    pub fn can_use(self, predicate: impl Fn(&Message) -> Access + Send + Sync + 'static) -> Self {
        let predicate: Arc<AccessPredicate> = Arc::new(predicate);
        self.configure("can_use", |s| s.can_use = Some(predicate))
    }

    /// Attach a sub-command.
    ///
    /// A no-op when `child` already has a parent, is this command or one of
    /// its ancestors, or shares its name with an existing sub-command.
    pub fn sub(self, child: Command) -> Self {
        self.attach(&child);
        self
    }

    fn attach(&self, child: &Command) -> bool {
        if child.node.parent.get().is_some() {
            tracing::warn!(
                parent = %self.full_name(),
                child = %child.name(),
                "sub-command already has a parent"
            );
            return false;
        }
        if self.ancestors().any(|a| a == *child) {
            tracing::warn!(
                parent = %self.full_name(),
                child = %child.name(),
                "attaching this sub-command would create a cycle"
            );
            return false;
        }

        let mut state = self.node.state.write();
        if state.initialized {
            tracing::warn!(command = %self.node.name, "ignoring `sub` on an initialized command");
            return false;
        }
        if state.subs.get(child.name()).is_some() {
            tracing::warn!(
                parent = %self.node.name,
                child = %child.name(),
                "duplicate sub-command name"
            );
            return false;
        }
        if child.node.parent.set(Arc::downgrade(&self.node)).is_err() {
            return false;
        }
        state.subs.insert(child.clone())
    }

    // === Accessors ===========================================================

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn description(&self) -> &str {
        &self.node.description
    }

    pub fn parent(&self) -> Option<Command> {
        self.node
            .parent
            .get()
            .and_then(Weak::upgrade)
            .map(|node| Command { node })
    }

    /// This command followed by its parent, grandparent, ...
    pub fn ancestors(&self) -> impl Iterator<Item = Command> + use<> {
        std::iter::successors(Some(self.clone()), Command::parent)
    }

    /// Names from the root down to this command, space separated.
    pub fn full_name(&self) -> String {
        let mut names: Vec<String> = self.ancestors().map(|c| c.name().to_string()).collect();
        names.reverse();
        names.join(" ")
    }

    pub fn is_initialized(&self) -> bool {
        self.node.state.read().initialized
    }

    pub fn settings(&self) -> Settings {
        self.node.state.read().settings
    }

    pub fn is_ignored(&self) -> bool {
        self.settings().ignored
    }

    /// Dev-only on this command or any ancestor.
    pub fn is_dev_only(&self) -> bool {
        self.ancestors().any(|c| c.settings().dev_only)
    }

    /// Guild-only on this command or any ancestor.
    pub fn is_guild_only(&self) -> bool {
        self.ancestors().any(|c| c.settings().guild_only)
    }

    pub fn delete_command_message(&self) -> bool {
        self.settings().delete_command_message
    }

    pub fn aliases(&self) -> Vec<String> {
        self.node.state.read().aliases.clone()
    }

    pub fn examples(&self) -> Vec<String> {
        self.node.state.read().examples.clone()
    }

    /// Signatures in evaluation order (sorted once initialized).
    pub fn signatures(&self) -> Vec<Arc<Signature>> {
        self.node.state.read().signatures.clone()
    }

    pub fn flags(&self) -> Vec<FlagDefinition> {
        self.node.state.read().flags.clone()
    }

    pub fn rest_definition(&self) -> Option<RestDefinition> {
        self.node.state.read().rest.clone()
    }

    pub fn subs(&self) -> Vec<Command> {
        self.node.state.read().subs.values().cloned().collect()
    }

    /// Sub-command by exact name, ignored ones included.
    pub fn sub_command(&self, name: &str) -> Option<Command> {
        self.node.state.read().subs.get(name).cloned()
    }

    pub(crate) fn sub_collection(&self) -> CommandCollection {
        self.node.state.read().subs.clone()
    }

    pub fn throttler(&self) -> Option<Arc<Throttler>> {
        self.node.state.read().throttler.clone()
    }

    /// Run the access predicates of this command and its ancestors, root first.
    pub fn check_access(&self, message: &Message) -> Access {
        let mut chain: Vec<Command> = self.ancestors().collect();
        chain.reverse();
        for command in chain {
            let predicate = command.node.state.read().can_use.clone();
            if let Some(predicate) = predicate {
                if let Access::Denied(reason) = predicate(message) {
                    return Access::Denied(reason);
                }
            }
        }
        Access::Allowed
    }

    // === Lifecycle ===========================================================

    /// Initialize the subtree: children first, then this node's signature
    /// order, then the init hook. Idempotent.
    ///
    /// A failing hook leaves the node uninitialized and propagates the error.
    pub async fn init(&self, state: &SharedState) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        for sub in self.subs() {
            Box::pin(sub.init(state)).await?;
        }

        let hook = {
            let mut node_state = self.node.state.write();
            // Most demanding signature first; `sort_by` is stable, so ties
            // keep declaration order.
            node_state.signatures.sort_by(|a, b| {
                b.min_arg_needed()
                    .cmp(&a.min_arg_needed())
                    .then_with(|| b.arg_count().cmp(&a.arg_count()))
            });
            node_state.on_init.clone()
        };

        if let Some(hook) = hook {
            hook.on_init(self.clone(), state.clone()).await?;
        }

        self.node.state.write().initialized = true;
        tracing::debug!(command = %self.full_name(), "command initialized");
        Ok(())
    }

    /// Run the first signature that matches `tokens`.
    ///
    /// # Panics
    /// If the command has not been initialized.
    pub async fn execute(&self, tokens: &[String], ctx: &ExecutionContext) -> CommandResult {
        let (signatures, flags, rest) = {
            let state = self.node.state.read();
            assert!(
                state.initialized,
                "cannot execute command `{}` before it is initialized",
                self.node.name
            );
            (state.signatures.clone(), state.flags.clone(), state.rest.clone())
        };

        for signature in signatures {
            let bindings = match signature.try_parse(tokens, &flags, rest.as_ref()) {
                Ok(Some(bindings)) => bindings,
                Ok(None) => continue,
                Err(fault) => return CommandResult::Error { fault },
            };

            let invocation = Invocation {
                command: self.clone(),
                bindings,
                message: ctx.message.clone(),
                options: ctx.options.clone(),
                commands: ctx.commands.clone(),
                state: ctx.state.clone(),
            };
            return match signature.executor().execute(invocation).await {
                Ok(value) => CommandResult::Ok {
                    command: self.clone(),
                    signature,
                    value,
                },
                Err(fault) => CommandResult::Error { fault },
            };
        }

        if ctx.options.help_on_signature_not_found {
            if let Some(notifier) = &ctx.notifier {
                let help = help::command_help_for(self, &ctx.options, &ctx.message);
                if let Err(err) = notifier.signature_not_found(&ctx.message, &help).await {
                    tracing::warn!(command = %self.full_name(), "failed to send help: {err:#}");
                }
            }
        }

        CommandResult::SignatureNotFound {
            command: self.clone(),
        }
    }
}
