use anyhow::Result;
use log::info;
use pulse_core::helpers::{
    bot_commands::TopKind,
    utils::{format_currency, format_number, format_percentage},
};
use serenity::all::{Context, CreateEmbed, CreateEmbedFooter, CreateMessage, Message, Timestamp};

use super::helpers::{
    change_emoji, format_price_lines, format_updated_at, market_order, resolve_tokens, select_top,
    top_title, trending_field,
};
use crate::{dependencies::BotDependencies, utils::send_long_message};

pub const EMBED_COLOR: u32 = 0x0099FF;
const MARKET_PAGE_SIZE: usize = 100;

fn base_embed(title: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .colour(EMBED_COLOR)
        .timestamp(Timestamp::now())
}

async fn send_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<()> {
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

pub async fn handle_price(
    ctx: &Context,
    msg: &Message,
    tokens: &[String],
    bot_deps: &BotDependencies,
) -> Result<()> {
    let list = bot_deps.services.coin_list().await?;
    let resolved = resolve_tokens(&list, tokens);

    let mut ids: Vec<String> = resolved
        .iter()
        .filter_map(|(_, entry)| entry.map(|e| e.id.clone()))
        .collect();
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        msg.reply(ctx, "❌ No valid tokens found.").await?;
        return Ok(());
    }

    let prices = bot_deps.services.simple_price(&ids).await?;
    send_long_message(ctx, msg.channel_id, &format_price_lines(&resolved, &prices)).await
}

pub async fn handle_price_details(
    ctx: &Context,
    msg: &Message,
    ids: &[String],
    bot_deps: &BotDependencies,
) -> Result<()> {
    let prices = bot_deps.services.simple_price(ids).await?;

    let mut embed = base_embed("💰 Token prices");
    let mut found = 0;
    for id in ids {
        let Some(price) = prices.get(id) else {
            continue;
        };
        found += 1;
        embed = embed.field(
            id.to_uppercase(),
            format!(
                "💵 Price: {}\n📊 24h: {} {}\n🕒 Updated: {}",
                format_currency(price.usd),
                format_percentage(price.usd_24h_change),
                change_emoji(price.usd_24h_change),
                format_updated_at(price.last_updated_at),
            ),
            false,
        );
    }

    if found == 0 {
        msg.reply(ctx, "❌ No prices found. Use CoinGecko ids such as `bitcoin`.")
            .await?;
        return Ok(());
    }

    send_embed(ctx, msg, embed).await
}

pub async fn handle_top(
    ctx: &Context,
    msg: &Message,
    kind: TopKind,
    limit: usize,
    bot_deps: &BotDependencies,
) -> Result<()> {
    let per_page = match kind {
        TopKind::Volume => limit,
        TopKind::Gainers | TopKind::Losers => MARKET_PAGE_SIZE,
    };
    let coins = bot_deps.services.markets(market_order(kind), per_page).await?;
    let coins = select_top(kind, coins, limit);

    let mut embed = base_embed(top_title(kind, limit));
    for (index, coin) in coins.iter().enumerate() {
        let mut value = format!(
            "Price: {}\n24h: {} {}",
            format_currency(coin.current_price),
            format_percentage(coin.price_change_percentage_24h),
            change_emoji(coin.price_change_percentage_24h),
        );
        if kind == TopKind::Volume {
            value.push_str(&format!("\nVolume 24h: {}", format_currency(coin.total_volume)));
        }

        embed = embed.field(
            format!("{}. {} ({})", index + 1, coin.name, coin.symbol.to_uppercase()),
            value,
            false,
        );
    }

    send_embed(ctx, msg, embed).await
}

pub async fn handle_stats(
    ctx: &Context,
    msg: &Message,
    id: &str,
    bot_deps: &BotDependencies,
) -> Result<()> {
    let coin = match bot_deps.services.coin(id).await {
        Ok(coin) => coin,
        Err(e) => {
            info!("ℹ️ Stats lookup for {} failed: {}", id, e);
            msg.reply(ctx, format!("❌ Token `{}` not found on CoinGecko.", id))
                .await?;
            return Ok(());
        }
    };
    let data = &coin.market_data;
    let rank = coin
        .market_cap_rank
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| "N/A".to_string());

    let mut embed = base_embed(format!("{} ({}) Stats", coin.name, coin.symbol.to_uppercase()))
        .field("💰 Price", format_currency(data.current_price.usd), false)
        .field(
            "📊 Price change",
            format!(
                "24h: {}\n7d: {}\n30d: {}",
                format_percentage(data.price_change_percentage_24h),
                format_percentage(data.price_change_percentage_7d),
                format_percentage(data.price_change_percentage_30d),
            ),
            false,
        )
        .field(
            "📈 Market Cap",
            format!("{}\nRank: {}", format_currency(data.market_cap.usd), rank),
            false,
        )
        .field("💹 Volume", format_currency(data.total_volume.usd), false)
        .field(
            "🔄 Supply",
            format!(
                "Circulating: {}\nTotal: {}\nMax: {}",
                format_number(data.circulating_supply),
                format_number(data.total_supply),
                format_number(data.max_supply),
            ),
            false,
        );
    if let Some(image) = &coin.image.large {
        embed = embed.thumbnail(image);
    }

    send_embed(ctx, msg, embed).await
}

pub async fn handle_trending(
    ctx: &Context,
    msg: &Message,
    bot_deps: &BotDependencies,
) -> Result<()> {
    let coins = bot_deps.services.trending().await?;

    let mut embed = base_embed("🔥 Trending on CoinGecko")
        .footer(CreateEmbedFooter::new("Top searches in the last 24 hours"));
    for (index, coin) in coins.iter().enumerate() {
        let (name, value) = trending_field(index, coin);
        embed = embed.field(name, value, false);
    }
    if let Some(thumb) = coins.first().and_then(|c| c.thumb.as_ref()) {
        embed = embed.thumbnail(thumb);
    }

    send_embed(ctx, msg, embed).await
}
