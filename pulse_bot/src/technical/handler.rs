use anyhow::Result;
use log::{error, warn};
use pulse_core::{
    error::MarketError,
    helpers::bot_commands::ChartRequest,
    market::Timeframe,
};
use serenity::all::{
    Context, CreateAttachment, CreateEmbed, CreateMessage, Message, Timestamp,
};

use crate::{coins::handler::EMBED_COLOR, dependencies::BotDependencies, utils::send_long_message};

const CHART_FILE: &str = "chart.png";

/// User-facing text for a failed analysis request.
pub fn market_error_reply(symbol: &str, err: &MarketError) -> String {
    match err {
        MarketError::UnsupportedSymbol(_) => {
            format!("❌ Token {} is not supported or has no USDT pair on Binance.", symbol)
        }
        MarketError::InsufficientData { needed, got } => format!(
            "⚠️ Not enough data for {}: need {} candles, got {}. Try a shorter timeframe.",
            symbol, needed, got
        ),
        MarketError::InvalidTimeframe(tf) => format!(
            "❌ Invalid timeframe `{}`. Valid: {}",
            tf,
            Timeframe::ALL
                .iter()
                .map(|t| t.code())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        MarketError::UpstreamUnavailable(_) => {
            "⚠️ Market data is unavailable right now. Please try again later.".to_string()
        }
        MarketError::RenderFailure(_) => {
            "⚠️ Could not draw the chart. Please try again later.".to_string()
        }
    }
}

async fn reply_market_error(
    ctx: &Context,
    msg: &Message,
    symbol: &str,
    err: &MarketError,
) -> Result<()> {
    match err {
        MarketError::UpstreamUnavailable(_) | MarketError::RenderFailure(_) => {
            error!("❌ Analysis for {} failed: {}", symbol, err)
        }
        _ => warn!("⚠️ Analysis for {} rejected: {}", symbol, err),
    }
    msg.reply(ctx, market_error_reply(symbol, err)).await?;
    Ok(())
}

fn chart_message(title: String, description: String, png: Vec<u8>) -> CreateMessage {
    let embed = CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(EMBED_COLOR)
        .image(format!("attachment://{}", CHART_FILE))
        .timestamp(Timestamp::now());

    CreateMessage::new()
        .embed(embed)
        .add_file(CreateAttachment::bytes(png, CHART_FILE))
}

pub async fn handle_technical(
    ctx: &Context,
    msg: &Message,
    symbol: &str,
    bot_deps: &BotDependencies,
) -> Result<()> {
    msg.channel_id.broadcast_typing(ctx).await?;

    let report = match bot_deps.analysis.analyze(symbol).await {
        Ok(report) => report,
        Err(e) => return reply_market_error(ctx, msg, symbol, &e).await,
    };

    let message = chart_message(
        format!("📊 {}/USDT (1D)", report.symbol),
        report.summary(),
        report.chart_png,
    );
    msg.channel_id.send_message(ctx, message).await?;
    Ok(())
}

pub async fn handle_chart(
    ctx: &Context,
    msg: &Message,
    request: &ChartRequest,
    bot_deps: &BotDependencies,
) -> Result<()> {
    msg.channel_id.broadcast_typing(ctx).await?;

    let png = match bot_deps
        .analysis
        .chart(&request.symbol, request.timeframe, request.overlays.clone())
        .await
    {
        Ok(png) => png,
        Err(e) => return reply_market_error(ctx, msg, &request.symbol, &e).await,
    };

    let overlays = &request.overlays;
    let mut shown: Vec<String> = overlays
        .moving_averages
        .iter()
        .map(|p| format!("MA{}", p))
        .collect();
    if overlays.bollinger {
        shown.push("Bollinger Bands".to_string());
    }
    if overlays.volume {
        shown.push("Volume".to_string());
    }

    let message = chart_message(
        format!(
            "📈 {}/USDT ({})",
            request.symbol,
            request.timeframe.code().to_uppercase()
        ),
        format!("Indicators: {}", shown.join(", ")),
        png,
    );
    msg.channel_id.send_message(ctx, message).await?;
    Ok(())
}

pub async fn handle_trend(
    ctx: &Context,
    msg: &Message,
    symbol: &str,
    timeframe: Timeframe,
    bot_deps: &BotDependencies,
) -> Result<()> {
    msg.channel_id.broadcast_typing(ctx).await?;

    match bot_deps.analysis.predict_trend(symbol, timeframe).await {
        Ok(report) => send_long_message(ctx, msg.channel_id, &report.summary()).await,
        Err(e) => reply_market_error(ctx, msg, symbol, &e).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_replies() {
        let unsupported = market_error_reply("FOO", &MarketError::UnsupportedSymbol("FOO".into()));
        assert!(unsupported.contains("FOO is not supported"));

        let insufficient = market_error_reply(
            "BTC",
            &MarketError::InsufficientData { needed: 50, got: 30 },
        );
        assert!(insufficient.contains("need 50 candles, got 30"));

        let timeframe = market_error_reply("BTC", &MarketError::InvalidTimeframe("7h".into()));
        assert!(timeframe.contains("`7h`") && timeframe.contains("1M"));
    }

    #[test]
    fn test_upstream_details_stay_internal() {
        let reply = market_error_reply(
            "BTC",
            &MarketError::UpstreamUnavailable("connection refused at 10.0.0.1".into()),
        );
        assert!(!reply.contains("10.0.0.1"));
    }
}
