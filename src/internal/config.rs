//! Bot configuration: loading, editing and conversion into parse options.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    command::Command,
    localization::{Localization, LocalizationError},
    message::Message,
};

/// Options shared by every dispatch of a command set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub prefix: String,
    /// Notify the invoker with the command's help when no signature matches.
    pub help_on_signature_not_found: bool,
    pub dev_ids: BTreeSet<String>,
    pub localization: Localization,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            help_on_signature_not_found: true,
            dev_ids: BTreeSet::new(),
            localization: Localization::default(),
        }
    }
}

impl ParseOptions {
    pub fn is_dev(&self, user_id: &str) -> bool {
        self.dev_ids.contains(user_id)
    }

    /// Whether `command` shows up for the author of `message`: dev-only
    /// commands are hidden from non-developers.
    pub fn is_visible(&self, command: &Command, message: &Message) -> bool {
        !command.is_dev_only() || self.is_dev(&message.author_id)
    }
}

const DEFAULT_PREFIX: &str = "!";

/// On-disk configuration file (`config.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub prefix: String,
    pub help_on_signature_not_found: bool,
    pub dev_ids: Vec<String>,
    /// JSON localization file, relative to the config file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localization: Option<PathBuf>,
    /// File this configuration was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            help_on_signature_not_found: true,
            dev_ids: Vec::new(),
            localization: None,
            source: None,
        }
    }
}

/// Errors raised while loading or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`BotConfig`].
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Prefix must not be empty or contain whitespace: {0:?}")]
    InvalidPrefix(String),

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Localization(#[from] LocalizationError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Project-local directory holding `config.toml`.
pub const PROJECT_DIR: &str = ".botcmd";
pub const CONFIG_FILE: &str = "config.toml";

impl BotConfig {
    /// Load configuration from the first tier that has a config file.
    ///
    /// 1. `{working_dir}/.botcmd/config.toml` (project-local)
    /// 2. `~/.config/botcmd/config.toml` (user-global)
    ///
    /// Falls back to defaults when neither exists.
    pub fn load(working_dir: &Path) -> ConfigResult<Self> {
        Self::load_tiers(working_dir, dirs::config_dir().as_deref())
    }

    fn load_tiers(working_dir: &Path, user_config_dir: Option<&Path>) -> ConfigResult<Self> {
        let mut candidates = vec![working_dir.join(PROJECT_DIR).join(CONFIG_FILE)];
        if let Some(dir) = user_config_dir {
            candidates.push(dir.join("botcmd").join(CONFIG_FILE));
        }

        for path in candidates {
            if path.is_file() {
                tracing::debug!("loading config from {}", path.display());
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Read and validate one config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: BotConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.prefix.is_empty() || self.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        Ok(())
    }

    /// Read a setting by key, for display.
    pub fn get(&self, key: &str) -> ConfigResult<String> {
        match key {
            "prefix" => Ok(self.prefix.clone()),
            "help_on_signature_not_found" => Ok(self.help_on_signature_not_found.to_string()),
            "dev_ids" => Ok(self.dev_ids.join(",")),
            "localization" => Ok(self
                .localization
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Change a setting from its string form. The config is left unchanged
    /// on error.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "prefix" => {
                let candidate = Self {
                    prefix: value.to_string(),
                    ..Self::default()
                };
                candidate.validate()?;
                self.prefix = candidate.prefix;
            }
            "help_on_signature_not_found" => {
                self.help_on_signature_not_found = value.parse().map_err(|_| invalid())?;
            }
            "dev_ids" => {
                self.dev_ids = value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "localization" => {
                self.localization = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Resolve into [`ParseOptions`], loading the localization file if any.
    pub fn to_options(&self) -> ConfigResult<ParseOptions> {
        self.validate()?;
        let localization = match &self.localization {
            Some(path) => {
                let path = match self.source.as_deref().and_then(Path::parent) {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                };
                Localization::from_json_file(&path)?
            }
            None => Localization::default(),
        };
        Ok(ParseOptions {
            prefix: self.prefix.clone(),
            help_on_signature_not_found: self.help_on_signature_not_found,
            dev_ids: self.dev_ids.iter().cloned().collect(),
            localization,
        })
    }
}
