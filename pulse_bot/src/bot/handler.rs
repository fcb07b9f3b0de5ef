use anyhow::Result;
use log::{debug, error, info, warn};
use pulse_core::helpers::bot_commands::parse;
use serenity::{
    all::{
        Client, Context, CreateMessage, EventHandler, GatewayIntents, Member, Mentionable,
        Message, Reaction, Ready,
    },
    async_trait,
};

use super::answers::answers;
use crate::{
    dependencies::BotDependencies,
    roles::handler::{handle_reaction_add, handle_reaction_remove, setup_onboarding},
    welcome::helpers::join_greeting,
};

struct Handler {
    bot_deps: BotDependencies,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ {} is connected to Discord!", ready.user.name);

        if let Err(e) = setup_onboarding(&ctx, &self.bot_deps).await {
            error!("❌ Onboarding setup failed: {:#}", e);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let cmd = match parse(&msg.content, &self.bot_deps.config.command_prefix) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return,
            Err(e) => {
                if let Err(e) = msg.reply(&ctx, format!("⚠️ {}", e)).await {
                    error!("❌ Failed to send usage reply: {}", e);
                }
                return;
            }
        };

        debug!("📨 {} from {}", msg.content, msg.author.name);
        if let Err(e) = answers(&ctx, &msg, cmd, &self.bot_deps).await {
            error!("❌ Command `{}` failed: {:#}", msg.content, e);
            if let Err(e) = msg
                .reply(&ctx, "⚠️ Something went wrong while handling that command. Please try again later.")
                .await
            {
                error!("❌ Failed to send error reply: {}", e);
            }
        }
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let Some(channel_id) = self.bot_deps.config.welcome_channel_id else {
            return;
        };

        let guild_name = new_member
            .guild_id
            .name(&ctx)
            .unwrap_or_else(|| "the server".to_string());
        let greeting = join_greeting(&new_member.mention().to_string(), &guild_name);

        match channel_id
            .send_message(&ctx, CreateMessage::new().content(greeting))
            .await
        {
            Ok(_) => info!("👋 Greeted {} in the welcome channel", new_member.user.name),
            Err(e) => warn!("⚠️ Failed to greet {}: {}", new_member.user.name, e),
        }
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        if let Err(e) = handle_reaction_add(&ctx, &add_reaction, &self.bot_deps).await {
            error!("❌ Failed to handle reaction add: {:#}", e);
        }
    }

    async fn reaction_remove(&self, ctx: Context, removed_reaction: Reaction) {
        if let Err(e) = handle_reaction_remove(&ctx, &removed_reaction, &self.bot_deps).await {
            error!("❌ Failed to handle reaction removal: {:#}", e);
        }
    }
}

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_MEMBERS
}

/// Connects to the gateway and runs until the client stops.
pub async fn start(bot_deps: BotDependencies) -> Result<()> {
    let token = bot_deps.config.discord_token.clone();
    let handler = Handler { bot_deps };

    let mut client = Client::builder(&token, intents())
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_cover_commands_reactions_and_joins() {
        let intents = intents();

        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(intents.contains(GatewayIntents::GUILD_MEMBERS));
    }
}
