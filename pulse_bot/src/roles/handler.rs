use anyhow::Result;
use log::{error, info, warn};
use serenity::all::{
    ChannelId, Context, EditRole, GuildId, Message, PermissionOverwrite, PermissionOverwriteType,
    Permissions, Reaction, ReactionType, RoleId, User, UserId,
};

use super::helpers::{
    CHECK_MARK, MEMBER_ROLE_COLOUR, MEMBER_ROLE_NAME, MOD_ROLE_NAME, is_rules_verification,
    needs_check_mark, select_member_role, welcome_channel_permissions,
};
use crate::{config::Config, dependencies::BotDependencies};

/// Runs once the gateway is ready: Member role, welcome channel overwrites
/// and the ✅ on the rules message.
pub async fn setup_onboarding(ctx: &Context, bot_deps: &BotDependencies) -> Result<()> {
    let config = &bot_deps.config;
    let Some(guild_id) = config.guild_id else {
        warn!("⚠️ GUILD_ID not set, skipping onboarding setup");
        return Ok(());
    };

    let member_role = ensure_member_role(ctx, guild_id, bot_deps).await?;

    if let Err(e) = setup_welcome_channel(ctx, guild_id, member_role, config).await {
        error!("❌ Failed to set welcome channel permissions: {:#}", e);
    }
    if let Err(e) = ensure_rules_reaction(ctx, guild_id, config).await {
        error!("❌ Failed to prepare rules message: {:#}", e);
    }

    Ok(())
}

async fn find_member_role(
    ctx: &Context,
    guild_id: GuildId,
    config: &Config,
) -> Result<Option<RoleId>> {
    let roles = guild_id.roles(ctx).await?;

    Ok(select_member_role(
        config.member_role_id,
        roles.values().map(|r| (r.id, r.name.as_str())),
    ))
}

async fn ensure_member_role(
    ctx: &Context,
    guild_id: GuildId,
    bot_deps: &BotDependencies,
) -> Result<RoleId> {
    if let Some(role_id) = find_member_role(ctx, guild_id, &bot_deps.config).await? {
        return Ok(role_id);
    }

    let role = guild_id
        .create_role(
            ctx,
            EditRole::new()
                .name(MEMBER_ROLE_NAME)
                .colour(MEMBER_ROLE_COLOUR)
                .audit_log_reason("Role for verified members"),
        )
        .await?;
    info!("✅ Created Member role: {}", role.id);
    warn!("⚠️ Set MEMBER_ROLE_ID={} in .env to reuse it", role.id);

    Ok(role.id)
}

async fn setup_welcome_channel(
    ctx: &Context,
    guild_id: GuildId,
    member_role: RoleId,
    config: &Config,
) -> Result<()> {
    let Some(channel_id) = config.welcome_channel_id else {
        warn!("⚠️ WELCOME_CHANNEL_ID not set, skipping channel permissions");
        return Ok(());
    };

    let (everyone_deny, (member_allow, member_deny)) = welcome_channel_permissions();
    channel_id
        .create_permission(
            ctx,
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: everyone_deny,
                kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
            },
        )
        .await?;
    channel_id
        .create_permission(
            ctx,
            PermissionOverwrite {
                allow: member_allow,
                deny: member_deny,
                kind: PermissionOverwriteType::Role(member_role),
            },
        )
        .await?;

    info!("✅ Updated welcome channel permissions");
    Ok(())
}

async fn ensure_rules_reaction(ctx: &Context, guild_id: GuildId, config: &Config) -> Result<()> {
    let Some(message_id) = config.rules_message_id else {
        warn!("⚠️ RULES_MESSAGE_ID not set, reaction onboarding disabled");
        return Ok(());
    };

    let channels = guild_id.channels(ctx).await?;
    let Some(channel) = channels
        .values()
        .find(|c| c.name == config.rules_channel_name)
    else {
        error!("❌ Rules channel #{} not found", config.rules_channel_name);
        return Ok(());
    };

    let message = channel.id.message(ctx, message_id).await?;
    info!("✅ Found rules message: {}", message.id);

    if needs_check_mark(&message.reactions) {
        message
            .react(ctx, ReactionType::Unicode(CHECK_MARK.to_string()))
            .await?;
        info!("✅ Added {} to the rules message", CHECK_MARK);
    }

    Ok(())
}

async fn reaction_user(ctx: &Context, reaction: &Reaction) -> Result<User> {
    match &reaction.member {
        Some(member) => Ok(member.user.clone()),
        None => Ok(reaction.user(ctx).await?),
    }
}

async fn verified_reaction(
    ctx: &Context,
    reaction: &Reaction,
    bot_deps: &BotDependencies,
) -> Result<Option<(User, GuildId, RoleId)>> {
    let rules_message = bot_deps.config.rules_message_id;
    if rules_message != Some(reaction.message_id) {
        return Ok(None);
    }

    let user = reaction_user(ctx, reaction).await?;
    if !is_rules_verification(rules_message, reaction.message_id, &reaction.emoji, user.bot) {
        return Ok(None);
    }

    let Some(guild_id) = reaction.guild_id.or(bot_deps.config.guild_id) else {
        return Ok(None);
    };
    let Some(role_id) = find_member_role(ctx, guild_id, &bot_deps.config).await? else {
        warn!("⚠️ Member role not found, ignoring reaction from {}", user.name);
        return Ok(None);
    };

    Ok(Some((user, guild_id, role_id)))
}

pub async fn handle_reaction_add(
    ctx: &Context,
    reaction: &Reaction,
    bot_deps: &BotDependencies,
) -> Result<()> {
    let Some((user, guild_id, role_id)) = verified_reaction(ctx, reaction, bot_deps).await? else {
        return Ok(());
    };

    ctx.http
        .add_member_role(guild_id, user.id, role_id, Some("Accepted the rules"))
        .await?;
    info!("✅ Granted Member role to {}", user.name);

    if let Some(channel_id) = bot_deps.config.welcome_channel_id {
        send_welcome(ctx, &user, guild_id, channel_id, bot_deps).await;
    }

    Ok(())
}

async fn send_welcome(
    ctx: &Context,
    user: &User,
    guild_id: GuildId,
    channel_id: ChannelId,
    bot_deps: &BotDependencies,
) {
    if let Err(e) = bot_deps
        .welcome
        .send_welcome_message(ctx, user, guild_id, channel_id)
        .await
    {
        error!("❌ Failed to send welcome message for {}: {:#}", user.name, e);
    }
}

pub async fn handle_reaction_remove(
    ctx: &Context,
    reaction: &Reaction,
    bot_deps: &BotDependencies,
) -> Result<()> {
    let Some((user, guild_id, role_id)) = verified_reaction(ctx, reaction, bot_deps).await? else {
        return Ok(());
    };

    ctx.http
        .remove_member_role(guild_id, user.id, role_id, Some("Withdrew rules acceptance"))
        .await?;
    info!("✅ Removed Member role from {}", user.name);
    Ok(())
}

/// `!mod @user`: administrators grant the existing Mod role.
pub async fn handle_mod(
    ctx: &Context,
    msg: &Message,
    user_id: u64,
) -> Result<()> {
    let Some(guild_id) = msg.guild_id else {
        msg.reply(ctx, "❌ This command only works inside a server.")
            .await?;
        return Ok(());
    };

    let author = msg.member(ctx).await?;
    let is_admin = ctx
        .cache
        .guild(guild_id)
        .map(|guild| guild.member_permissions(&author).administrator())
        .unwrap_or(false);
    if !is_admin {
        msg.reply(ctx, "❌ You do not have permission to use this command!")
            .await?;
        return Ok(());
    }

    if user_id == 0 {
        msg.reply(ctx, "⚠️ Please mention the user to promote, e.g. `!mod @user`.")
            .await?;
        return Ok(());
    }
    let target = UserId::new(user_id);

    let roles = guild_id.roles(ctx).await?;
    let Some(mod_role) = roles.values().find(|r| r.name == MOD_ROLE_NAME) else {
        msg.reply(ctx, format!("❌ Role `{}` does not exist on this server.", MOD_ROLE_NAME))
            .await?;
        return Ok(());
    };

    ctx.http
        .add_member_role(guild_id, target, mod_role.id, Some("Granted via mod command"))
        .await?;
    info!("✅ {} granted Mod role to {}", msg.author.name, target);

    msg.reply(ctx, format!("✅ Granted the Mod role to <@{}>.", target))
        .await?;
    Ok(())
}
