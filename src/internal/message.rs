//! Transport-agnostic description of an incoming chat message.

use serde::{Deserialize, Serialize};

/// The invocation context handed over by a chat transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Raw message text, prefix included.
    pub content: String,
    pub author_id: String,
    /// `None` for direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl Message {
    pub fn new(content: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author_id: author_id.into(),
            guild_id: None,
            channel_id: None,
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Identity of the author within the guild, `None` outside guilds.
    pub fn member_id(&self) -> Option<String> {
        self.guild_id
            .as_ref()
            .map(|guild| format!("{guild}:{}", self.author_id))
    }
}
