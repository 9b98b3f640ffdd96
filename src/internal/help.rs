//! Structured help data for a command, ready for an external renderer.

use serde::Serialize;

use super::{
    command::{ArgDefinition, Command, FlagDefinition},
    config::ParseOptions,
    localization::{CommandLocalization, HelpLabels, Localization},
    message::Message,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgHelp {
    pub name: String,
    pub localized_name: String,
    pub type_names: Vec<String>,
    pub description: String,
    /// `<name>`, `[name]` or `[name = default]`.
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureHelp {
    /// Complete invocation line, prefix included.
    pub usage: String,
    pub args: Vec<ArgHelp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagHelp {
    pub name: String,
    pub localized_name: String,
    pub type_names: Vec<String>,
    pub description: String,
    pub long: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestHelp {
    pub name: String,
    pub type_names: Vec<String>,
    pub description: String,
    /// `[...name]`.
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCommandHelp {
    pub name: String,
    pub description: String,
}

/// Everything a renderer needs to describe one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandHelp {
    pub name: String,
    /// Space separated path from the root, without prefix.
    pub full_name: String,
    /// `full_name` as typed in chat, prefix included.
    pub prefixed_name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub signatures: Vec<SignatureHelp>,
    pub flags: Vec<FlagHelp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<RestHelp>,
    pub subs: Vec<SubCommandHelp>,
    pub examples: Vec<String>,
}

/// Help for `command`, listing every non-ignored sub-command.
pub fn command_help(command: &Command, options: &ParseOptions) -> CommandHelp {
    build(command, options, |sub| !sub.is_ignored())
}

/// Help for `command` as seen by the author of `message`: sub-commands they
/// cannot see or use are left out.
pub fn command_help_for(command: &Command, options: &ParseOptions, message: &Message) -> CommandHelp {
    build(command, options, |sub| {
        !sub.is_ignored()
            && options.is_visible(sub, message)
            && sub.check_access(message) == super::command::Access::Allowed
    })
}

fn build(
    command: &Command,
    options: &ParseOptions,
    show_sub: impl Fn(&Command) -> bool,
) -> CommandHelp {
    let localization = &options.localization;
    let overrides = localization.command(command).cloned().unwrap_or_default();
    let full_name = command.full_name();

    let description = overrides
        .description
        .clone()
        .unwrap_or_else(|| command.description().to_string());

    let mut tags = Vec::new();
    if command.is_dev_only() {
        tags.push(localization.help.tags.dev_only.clone());
    }
    if command.is_guild_only() {
        tags.push(localization.help.tags.guild_only.clone());
    }

    let rest = command.rest_definition().map(|rest| {
        let name = overrides
            .rest
            .as_ref()
            .and_then(|r| r.name.clone())
            .unwrap_or_else(|| rest.name.clone());
        let description = overrides
            .rest
            .as_ref()
            .and_then(|r| r.description.clone())
            .unwrap_or_else(|| rest.description.clone());
        RestHelp {
            usage: format!("[...{name}]"),
            type_names: vec![localization.type_name(&rest.parser.type_name())],
            name,
            description,
        }
    });

    let signatures = command
        .signatures()
        .iter()
        .map(|signature| {
            let args: Vec<ArgHelp> = signature
                .args()
                .iter()
                .map(|arg| arg_help(arg, &overrides, localization))
                .collect();
            let usage = std::iter::once(format!("{}{full_name}", options.prefix))
                .chain(args.iter().map(|a| a.usage.clone()))
                .chain(rest.iter().map(|r| r.usage.clone()))
                .collect::<Vec<_>>()
                .join(" ");
            SignatureHelp { usage, args }
        })
        .collect();

    let flags = command
        .flags()
        .iter()
        .map(|flag| flag_help(flag, &overrides, localization))
        .collect();

    let subs = command
        .subs()
        .iter()
        .filter(|sub| show_sub(sub))
        .map(|sub| SubCommandHelp {
            name: sub.name().to_string(),
            description: localization
                .command(sub)
                .and_then(|o| o.description.clone())
                .unwrap_or_else(|| sub.description().to_string()),
        })
        .collect();

    CommandHelp {
        name: command.name().to_string(),
        prefixed_name: format!("{}{full_name}", options.prefix),
        full_name,
        description,
        aliases: command.aliases(),
        tags,
        signatures,
        flags,
        rest,
        subs,
        examples: command.examples(),
    }
}

fn arg_help(arg: &ArgDefinition, overrides: &CommandLocalization, localization: &Localization) -> ArgHelp {
    let local = overrides.args.get(&arg.name);
    let localized_name = local
        .and_then(|l| l.name.clone())
        .unwrap_or_else(|| arg.name.clone());
    let description = local
        .and_then(|l| l.description.clone())
        .unwrap_or_else(|| arg.description.clone());
    let usage = match (arg.optional, &arg.default_value) {
        (false, _) => format!("<{localized_name}>"),
        (true, Some(default)) => format!("[{localized_name} = {default}]"),
        (true, None) => format!("[{localized_name}]"),
    };
    ArgHelp {
        name: arg.name.clone(),
        type_names: arg
            .types
            .iter()
            .map(|t| localization.type_name(&t.type_name()))
            .collect(),
        localized_name,
        description,
        usage,
    }
}

fn flag_help(
    flag: &FlagDefinition,
    overrides: &CommandLocalization,
    localization: &Localization,
) -> FlagHelp {
    let local = overrides.flags.get(&flag.name);
    FlagHelp {
        name: flag.name.clone(),
        localized_name: local
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| flag.name.clone()),
        type_names: vec![localization.type_name(&flag.parser.type_name())],
        description: local
            .and_then(|l| l.description.clone())
            .unwrap_or_else(|| flag.description.clone()),
        long: format!("--{}", flag.name),
        short: flag.shortcut.map(|c| format!("-{c}")),
    }
}

impl CommandHelp {
    /// A single signature taking nothing: the usage would only repeat the name.
    fn is_bare(&self) -> bool {
        self.rest.is_none() && matches!(self.signatures.as_slice(), [only] if only.args.is_empty())
    }

    /// Plain-text rendering, one section per non-empty field.
    pub fn render(&self, labels: &HelpLabels) -> String {
        let mut out = self.full_name.clone();
        if !self.description.is_empty() {
            out.push_str("\n  ");
            out.push_str(&self.description);
        }
        if !self.tags.is_empty() {
            out.push_str("\n  ");
            out.push_str(
                &self
                    .tags
                    .iter()
                    .map(|t| format!("[{t}]"))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }

        if !self.signatures.is_empty() && !self.is_bare() {
            let mut lines: Vec<String> = self.signatures.iter().map(|s| s.usage.clone()).collect();
            if self.signatures.iter().any(|s| !s.args.is_empty()) {
                lines.push(labels.arg_usage_hint.clone());
            }
            section(&mut out, &labels.usage, &lines);
        }

        let mut args: Vec<String> = Vec::new();
        for arg in self.signatures.iter().flat_map(|s| &s.args) {
            let line = described(&format!("{} ({})", arg.localized_name, arg.type_names.join(" | ")), &arg.description);
            if !args.contains(&line) {
                args.push(line);
            }
        }
        if let Some(rest) = &self.rest {
            let types = labels
                .rest_type_name
                .replace("{type}", &rest.type_names.join(" | "));
            args.push(described(&format!("{} ({types})", rest.name), &rest.description));
        }
        section(&mut out, &labels.arguments, &args);

        let flags: Vec<String> = self
            .flags
            .iter()
            .map(|f| {
                let names = match &f.short {
                    Some(short) => format!("{} {short}", f.long),
                    None => f.long.clone(),
                };
                described(&format!("{names} ({})", f.type_names.join(" | ")), &f.description)
            })
            .collect();
        section(&mut out, &labels.flags, &flags);

        let subs: Vec<String> = self
            .subs
            .iter()
            .map(|s| described(&s.name, &s.description))
            .collect();
        section(&mut out, &labels.sub_commands, &subs);

        if !self.aliases.is_empty() {
            section(&mut out, &labels.aliases, &[self.aliases.join(", ")]);
        }
        section(&mut out, &labels.examples, &self.examples);
        out
    }
}

fn described(head: &str, description: &str) -> String {
    if description.is_empty() {
        head.to_string()
    } else {
        format!("{head}: {description}")
    }
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str("\n\n");
    out.push_str(title);
    for line in lines {
        out.push_str("\n  ");
        out.push_str(line);
    }
}
