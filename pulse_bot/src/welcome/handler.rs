use std::{path::Path, sync::Arc};

use ab_glyph::FontArc;
use anyhow::{Context as _, Result};
use image::DynamicImage;
use log::{info, warn};
use reqwest::Client;
use serenity::all::{
    ChannelId, Context, CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage, GuildId,
    Mentionable, Timestamp, User,
};

use super::helpers::compose_welcome_image;
use crate::coins::handler::EMBED_COLOR;

const WELCOME_FILE: &str = "welcome.png";

#[derive(Clone)]
pub struct WelcomeService {
    client: Client,
    background: Option<Arc<DynamicImage>>,
    font: Option<FontArc>,
}

impl WelcomeService {
    pub fn new(client: Client, background: Option<DynamicImage>, font: Option<FontArc>) -> Self {
        Self {
            client,
            background: background.map(Arc::new),
            font,
        }
    }

    pub fn load_background(path: &Path) -> Result<DynamicImage> {
        image::open(path).with_context(|| format!("cannot open welcome background {}", path.display()))
    }

    async fn fetch_avatar(&self, url: &str) -> Result<DynamicImage> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    pub async fn create_welcome_image(&self, username: &str, avatar_url: &str) -> Result<Vec<u8>> {
        let avatar = match self.fetch_avatar(avatar_url).await {
            Ok(avatar) => Some(avatar),
            Err(e) => {
                warn!("⚠️ Could not load avatar for {}: {:#}", username, e);
                None
            }
        };

        compose_welcome_image(
            self.background.as_deref(),
            avatar.as_ref(),
            username,
            self.font.as_ref(),
        )
    }

    pub async fn send_welcome_message(
        &self,
        ctx: &Context,
        user: &User,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<()> {
        let avatar_url = user.face();
        let png = self.create_welcome_image(&user.name, &avatar_url).await?;

        let guild_name = guild_id
            .name(ctx)
            .unwrap_or_else(|| "the server".to_string());
        let embed = CreateEmbed::new()
            .colour(EMBED_COLOR)
            .title(format!("🎉 Welcome to {}!", guild_name))
            .description(format!(
                "Hey {}, welcome aboard! 🎉🎊\n\nThanks for accepting the rules. Enjoy your stay! 🚀",
                user.mention()
            ))
            .thumbnail(avatar_url)
            .image(format!("attachment://{}", WELCOME_FILE))
            .footer(CreateEmbedFooter::new("Welcome, new member!"))
            .timestamp(Timestamp::now());

        channel_id
            .send_message(
                ctx,
                CreateMessage::new()
                    .embed(embed)
                    .add_file(CreateAttachment::bytes(png, WELCOME_FILE)),
            )
            .await?;

        info!("✅ Sent welcome message for {}", user.name);
        Ok(())
    }
}
