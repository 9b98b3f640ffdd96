//! Name-keyed command collection with alias lookup.

use std::collections::BTreeMap;

use super::Command;

/// Commands keyed by name, iterated in name order.
#[derive(Debug, Clone, Default)]
pub struct CommandCollection {
    commands: BTreeMap<String, Command>,
}

impl CommandCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `command`. Returns `false` and leaves the collection unchanged
    /// when the name is already taken.
    pub fn insert(&mut self, command: Command) -> bool {
        if self.commands.contains_key(command.name()) {
            return false;
        }
        self.commands.insert(command.name().to_string(), command);
        true
    }

    /// Exact name lookup, ignored commands included.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Lookup by name, then by alias. Ignored commands are never returned.
    pub fn resolve(&self, name: &str) -> Option<&Command> {
        if let Some(command) = self.commands.get(name) {
            if !command.is_ignored() {
                return Some(command);
            }
        }
        self.commands
            .values()
            .find(|c| !c.is_ignored() && c.aliases().iter().any(|a| a == name))
    }

    /// Walk `tokens` down the tree to the deepest matching command.
    ///
    /// Returns the command and the number of tokens that named it.
    pub fn resolve_path(&self, tokens: &[String]) -> Option<(Command, usize)> {
        let (first, rest) = tokens.split_first()?;
        let mut command = self.resolve(first)?.clone();
        let mut depth = 1;
        for token in rest {
            let Some(sub) = command.sub_collection().resolve(token).cloned() else {
                break;
            };
            command = sub;
            depth += 1;
        }
        Some((command, depth))
    }

    /// Whether any command, ignored or not, declares `alias`.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.commands
            .values()
            .any(|c| c.aliases().iter().any(|a| a == alias))
    }

    pub fn values(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
