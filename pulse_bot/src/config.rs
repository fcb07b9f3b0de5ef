use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result, anyhow};
use pulse_core::helpers::bot_commands::DEFAULT_PREFIX;
use serenity::all::{ChannelId, GuildId, MessageId, RoleId};

const DEFAULT_RULES_CHANNEL: &str = "rules";

/// Runtime settings read once from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub coingecko_api_key: Option<String>,
    pub cryptopanic_api_key: Option<String>,
    pub guild_id: Option<GuildId>,
    pub rules_message_id: Option<MessageId>,
    pub member_role_id: Option<RoleId>,
    pub welcome_channel_id: Option<ChannelId>,
    pub rules_channel_name: String,
    pub command_prefix: String,
    pub chart_font_path: Option<PathBuf>,
    pub welcome_background_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = var("DISCORD_TOKEN").ok_or_else(|| anyhow!("DISCORD_TOKEN not set"))?;

        Ok(Self {
            discord_token,
            coingecko_api_key: var("COINGECKO_API_KEY"),
            cryptopanic_api_key: var("CRYPTOPANIC_API_KEY"),
            guild_id: snowflake(var("GUILD_ID"), "GUILD_ID")?.map(GuildId::new),
            rules_message_id: snowflake(var("RULES_MESSAGE_ID"), "RULES_MESSAGE_ID")?
                .map(MessageId::new),
            member_role_id: snowflake(var("MEMBER_ROLE_ID"), "MEMBER_ROLE_ID")?.map(RoleId::new),
            welcome_channel_id: snowflake(var("WELCOME_CHANNEL_ID"), "WELCOME_CHANNEL_ID")?
                .map(ChannelId::new),
            rules_channel_name: var("RULES_CHANNEL_NAME")
                .unwrap_or_else(|| DEFAULT_RULES_CHANNEL.to_string()),
            command_prefix: var("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            chart_font_path: var("CHART_FONT_PATH").map(PathBuf::from),
            welcome_background_path: var("WELCOME_BACKGROUND_PATH").map(PathBuf::from),
        })
    }
}

/// Discord ids are non-zero u64 values.
fn snowflake(value: Option<String>, key: &str) -> Result<Option<u64>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let id = u64::from_str(&value).with_context(|| format!("{} is not a valid id: {}", key, value))?;
    if id == 0 {
        return Err(anyhow!("{} must be non-zero", key));
    }
    Ok(Some(id))
}
