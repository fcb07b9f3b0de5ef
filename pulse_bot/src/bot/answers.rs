use anyhow::Result;
use pulse_core::helpers::bot_commands::{Command, help_text};
use serenity::all::{Context, Message};

use crate::{
    coins::handler::{handle_price, handle_price_details, handle_stats, handle_top, handle_trending},
    dependencies::BotDependencies,
    news::handler::handle_news,
    roles::handler::handle_mod,
    technical::handler::{handle_chart, handle_technical, handle_trend},
    utils::send_long_message,
};

pub async fn answers(
    ctx: &Context,
    msg: &Message,
    cmd: Command,
    bot_deps: &BotDependencies,
) -> Result<()> {
    match cmd {
        Command::Hello => {
            msg.reply(ctx, format!("👋 Hello, {}!", msg.author.name))
                .await?;
        }
        Command::Help => {
            send_long_message(ctx, msg.channel_id, &help_text(&bot_deps.config.command_prefix))
                .await?
        }
        Command::Price(tokens) => handle_price(ctx, msg, &tokens, bot_deps).await?,
        Command::PriceDetails(ids) => handle_price_details(ctx, msg, &ids, bot_deps).await?,
        Command::Top { kind, limit } => handle_top(ctx, msg, kind, limit, bot_deps).await?,
        Command::Stats(id) => handle_stats(ctx, msg, &id, bot_deps).await?,
        Command::Trending => handle_trending(ctx, msg, bot_deps).await?,
        Command::News(query) => handle_news(ctx, msg, query.as_deref(), bot_deps).await?,
        Command::Technical(symbol) => handle_technical(ctx, msg, &symbol, bot_deps).await?,
        Command::Chart(request) => handle_chart(ctx, msg, &request, bot_deps).await?,
        Command::Trend { symbol, timeframe } => {
            handle_trend(ctx, msg, &symbol, timeframe, bot_deps).await?
        }
        Command::Mod { user_id } => handle_mod(ctx, msg, user_id).await?,
    }

    Ok(())
}
