use std::{fmt, sync::Arc};

use futures::future::try_join;
use log::{info, warn};

use crate::{
    chart::{ChartRenderer, ChartSpec, Overlays},
    error::{MarketError, MarketResult},
    helpers::utils::{format_currency, format_percentage},
    market::{Binance, Candle, TickerStats, Timeframe},
    ta::{
        indicators::latest_rsi,
        trend::assess,
        types::TrendAssessment,
    },
};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn from_value(rsi: f64) -> Self {
        if rsi >= RSI_OVERBOUGHT {
            RsiZone::Overbought
        } else if rsi <= RSI_OVERSOLD {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsiZone::Overbought => write!(f, "Overbought 🔴"),
            RsiZone::Oversold => write!(f, "Oversold 🟢"),
            RsiZone::Neutral => write!(f, "Neutral 🟡"),
        }
    }
}

/// Daily snapshot for one symbol: ticker, momentum and a rendered chart.
#[derive(Debug, Clone)]
pub struct TechnicalReport {
    pub symbol: String,
    pub ticker: TickerStats,
    pub rsi: Option<f64>,
    pub period_high: f64,
    pub period_low: f64,
    pub chart_png: Vec<u8>,
}

impl TechnicalReport {
    pub fn rsi_zone(&self) -> Option<RsiZone> {
        self.rsi.map(RsiZone::from_value)
    }

    pub fn summary(&self) -> String {
        let rsi = match (self.rsi, self.rsi_zone()) {
            (Some(value), Some(zone)) => format!("{:.2} ({})", value, zone),
            _ => "N/A".to_string(),
        };

        format!(
            "📊 **{}/USDT technical analysis**\n\
             💰 Price: {}\n\
             📈 24h change: {}\n\
             📦 24h volume: {}\n\
             ⚡ RSI(14): {}\n\
             🔺 30d high: {}\n\
             🔻 30d low: {}",
            self.symbol,
            format_currency(self.ticker.current_price),
            format_percentage(self.ticker.price_change_24h),
            format_currency(self.ticker.volume_24h),
            rsi,
            format_currency(self.period_high),
            format_currency(self.period_low),
        )
    }
}

#[derive(Debug, Clone)]
pub struct TrendReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub close: f64,
    pub assessment: TrendAssessment,
}

impl TrendReport {
    pub fn summary(&self) -> String {
        let levels = |values: &[f64]| {
            if values.is_empty() {
                "none".to_string()
            } else {
                values
                    .iter()
                    .map(|v| format_currency(*v))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };

        let mut text = format!(
            "🔮 **{}/USDT trend ({})**\n\
             💰 Last close: {}\n\
             Trend: {}\n\
             Strength: {}\n",
            self.symbol,
            self.timeframe.code().to_uppercase(),
            format_currency(self.close),
            self.assessment.trend,
            self.assessment.strength,
        );

        if !self.assessment.signals.is_empty() {
            text.push_str("\n**Signals**\n");
            for signal in &self.assessment.signals {
                text.push_str(&format!("• {}\n", signal));
            }
        }

        text.push_str(&format!(
            "\n🛡️ Support: {}\n🚧 Resistance: {}",
            levels(&self.assessment.support_levels),
            levels(&self.assessment.resistance_levels),
        ));
        text
    }
}

/// Ties the market fetcher, indicator math and chart renderer together for
/// the bot's analysis commands.
#[derive(Clone)]
pub struct TechnicalAnalysis {
    binance: Binance,
    renderer: Arc<ChartRenderer>,
}

impl TechnicalAnalysis {
    pub fn new(binance: Binance, renderer: ChartRenderer) -> Self {
        Self {
            binance,
            renderer: Arc::new(renderer),
        }
    }

    /// 24h ticker plus daily candles: RSI, 30-day range and a chart with
    /// MA7, MA20 and volume.
    pub async fn analyze(&self, symbol: &str) -> MarketResult<TechnicalReport> {
        let symbol = symbol.trim().to_uppercase();
        let (candles, ticker) = try_join(
            self.binance.fetch_candles(&symbol, Timeframe::OneDay),
            self.binance.fetch_ticker(&symbol),
        )
        .await?;

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi = latest_rsi(&closes);
        if rsi.is_none() {
            warn!("⚠️ Not enough daily candles for RSI on {}", symbol);
        }

        let period_high = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let period_low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

        let overlays = Overlays {
            moving_averages: vec![7, 20],
            bollinger: false,
            volume: true,
        };
        let chart_png = self
            .render(&symbol, Timeframe::OneDay, overlays, candles)
            .await?;

        info!("✅ Technical analysis ready for {}", symbol);
        Ok(TechnicalReport {
            symbol,
            ticker,
            rsi,
            period_high,
            period_low,
            chart_png,
        })
    }

    pub async fn predict_trend(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> MarketResult<TrendReport> {
        let symbol = symbol.trim().to_uppercase();
        let candles = self.binance.fetch_candles(&symbol, timeframe).await?;
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let assessment = assess(&closes)?;
        info!(
            "🔮 {} ({}) classified as {} / {}",
            symbol, timeframe, assessment.trend, assessment.strength
        );

        Ok(TrendReport {
            close: closes.last().copied().unwrap_or_default(),
            symbol,
            timeframe,
            assessment,
        })
    }

    pub async fn chart(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        overlays: Overlays,
    ) -> MarketResult<Vec<u8>> {
        let candles = self.binance.fetch_candles(symbol, timeframe).await?;
        self.render(symbol, timeframe, overlays, candles).await
    }

    async fn render(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        overlays: Overlays,
        candles: Vec<Candle>,
    ) -> MarketResult<Vec<u8>> {
        let renderer = Arc::clone(&self.renderer);
        let spec = ChartSpec::new(symbol, timeframe, overlays, renderer.config());

        tokio::task::spawn_blocking(move || renderer.render_png(&candles, &spec))
            .await
            .map_err(|e| MarketError::RenderFailure(format!("render task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use reqwest::Client;
    use serde_json::{json, Value};

    use super::*;
    use crate::{chart::ChartConfig, ta::types::Trend};

    const DAY_MS: i64 = 86_400_000;

    fn klines(closes: impl Iterator<Item = f64>) -> String {
        let rows: Vec<Value> = closes
            .enumerate()
            .map(|(i, close)| {
                let open_time = 1_700_000_000_000_i64 + i as i64 * DAY_MS;
                json!([
                    open_time,
                    close.to_string(),
                    (close + 2.0).to_string(),
                    (close - 2.0).to_string(),
                    close.to_string(),
                    "100.0",
                    open_time + DAY_MS - 1
                ])
            })
            .collect();
        Value::Array(rows).to_string()
    }

    fn analysis(url: String) -> TechnicalAnalysis {
        TechnicalAnalysis::new(
            Binance::with_base_url(Client::new(), url),
            ChartRenderer::new(ChartConfig::default()),
        )
    }

    #[test]
    fn test_rsi_zones() {
        assert_eq!(RsiZone::from_value(75.0), RsiZone::Overbought);
        assert_eq!(RsiZone::from_value(70.0), RsiZone::Overbought);
        assert_eq!(RsiZone::from_value(30.0), RsiZone::Oversold);
        assert_eq!(RsiZone::from_value(50.0), RsiZone::Neutral);
    }

    #[tokio::test]
    async fn test_analyze_builds_report_and_chart() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::UrlEncoded("interval".into(), "1d".into()))
            .with_status(200)
            .with_body(klines((0..30).map(|i| 100.0 + i as f64)))
            .create_async()
            .await;
        server
            .mock("GET", "/api/v3/ticker/24hr")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "symbol": "BTCUSDT",
                    "lastPrice": "129.00",
                    "priceChangePercent": "1.20",
                    "volume": "10",
                    "highPrice": "130.00",
                    "lowPrice": "120.00"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let report = analysis(server.url()).analyze("btc").await.unwrap();

        assert_eq!(report.symbol, "BTC");
        assert_eq!(report.period_high, 131.0);
        assert_eq!(report.period_low, 98.0);
        assert_eq!(report.rsi, Some(100.0));
        assert_eq!(report.rsi_zone(), Some(RsiZone::Overbought));
        assert_eq!(&report.chart_png[..4], b"\x89PNG");

        let summary = report.summary();
        assert!(summary.contains("BTC/USDT"));
        assert!(summary.contains("+1.20%"));
    }

    #[tokio::test]
    async fn test_predict_trend_on_rising_series() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::UrlEncoded("interval".into(), "4h".into()))
            .with_status(200)
            .with_body(klines((0..60).map(|i| 100.0 + i as f64)))
            .create_async()
            .await;

        let report = analysis(server.url())
            .predict_trend("eth", Timeframe::FourHours)
            .await
            .unwrap();

        assert_eq!(report.assessment.trend, Trend::Up);
        assert_eq!(report.close, 159.0);
        assert!(report.summary().contains("ETH/USDT trend (4H)"));
    }

    #[tokio::test]
    async fn test_predict_trend_needs_long_average() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(klines((0..30).map(|i| 100.0 + i as f64)))
            .create_async()
            .await;

        let result = analysis(server.url())
            .predict_trend("eth", Timeframe::OneDay)
            .await;

        assert!(matches!(
            result,
            Err(MarketError::InsufficientData { needed: 50, got: 30 })
        ));
    }

    #[tokio::test]
    async fn test_chart_propagates_unsupported_symbol() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(400)
            .create_async()
            .await;

        let result = analysis(server.url())
            .chart("zzz", Timeframe::OneDay, Overlays::default())
            .await;

        assert!(matches!(result, Err(MarketError::UnsupportedSymbol(s)) if s == "ZZZ"));
    }
}
