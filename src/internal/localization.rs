//! Localized strings for help output: type names, labels and per-command overrides.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::command::Command;

/// Override for an argument, flag or rest argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsableLocalization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Overrides for one command; sub-commands nest under `subs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLocalization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<ParsableLocalization>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, ParsableLocalization>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, ParsableLocalization>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subs: BTreeMap<String, CommandLocalization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagLabels {
    pub dev_only: String,
    pub guild_only: String,
}

impl Default for TagLabels {
    fn default() -> Self {
        Self {
            dev_only: "Developers only".to_string(),
            guild_only: "Servers only".to_string(),
        }
    }
}

/// Section titles and fixed sentences used when rendering help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpLabels {
    pub usage: String,
    pub arg_usage_hint: String,
    pub arguments: String,
    pub flags: String,
    pub sub_commands: String,
    pub aliases: String,
    pub examples: String,
    /// `{type}` is replaced by the rest argument's type names.
    pub rest_type_name: String,
    /// `{name}` is replaced by the unknown command path.
    pub command_not_found: String,
    pub tags: TagLabels,
}

impl Default for HelpLabels {
    fn default() -> Self {
        Self {
            usage: "Usage".to_string(),
            arg_usage_hint: "<> = required, [] = optional".to_string(),
            arguments: "Arguments".to_string(),
            flags: "Flags".to_string(),
            sub_commands: "Sub-commands".to_string(),
            aliases: "Aliases".to_string(),
            examples: "Examples".to_string(),
            rest_type_name: "...{type}".to_string(),
            command_not_found: "Command `{name}` not found".to_string(),
            tags: TagLabels::default(),
        }
    }
}

/// Full localization table. Missing entries fall back to English defaults
/// and to the names declared in code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localization {
    /// Parser type name → display name.
    pub type_names: BTreeMap<String, String>,
    pub help: HelpLabels,
    /// Root command name → overrides.
    pub commands: BTreeMap<String, CommandLocalization>,
}

impl Localization {
    /// Read a JSON localization file.
    pub fn from_json_file(path: &Path) -> Result<Self, LocalizationError> {
        let content = std::fs::read_to_string(path).map_err(|source| LocalizationError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LocalizationError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Display name of a parser type, the raw name when untranslated.
    pub fn type_name(&self, raw: &str) -> String {
        self.type_names
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    /// Overrides for `command`, found by walking its path from the root.
    pub fn command(&self, command: &Command) -> Option<&CommandLocalization> {
        let mut path: Vec<Command> = command.ancestors().collect();
        path.reverse();
        let mut iter = path.iter();
        let root = iter.next()?;
        let mut current = self.commands.get(root.name())?;
        for step in iter {
            current = current.subs.get(step.name())?;
        }
        Some(current)
    }
}

/// Errors raised while loading a localization file.
#[derive(Debug, thiserror::Error)]
pub enum LocalizationError {
    #[error("Failed to read localization file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid localization file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
