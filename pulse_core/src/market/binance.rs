use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::{
    dto::{BinanceTicker, Candle, TickerStats},
    timeframe::Timeframe,
};
use crate::{
    error::{MarketError, MarketResult},
    helpers::dto::Endpoints,
};

pub const QUOTE_ASSET: &str = "USDT";
/// Charts need at least this many candles to be meaningful.
pub const MIN_CANDLES: usize = 10;
const KLINE_LIMIT: u32 = 500;

#[derive(Clone)]
pub struct Binance {
    client: Client,
    base_url: String,
}

impl Binance {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, Endpoints::Binance.to_string())
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    /// Market pair for a token symbol, e.g. `btc` -> `BTCUSDT`.
    pub fn pair(symbol: &str) -> String {
        format!("{}{}", symbol.trim().to_uppercase(), QUOTE_ASSET)
    }

    /// 24-hour ticker statistics. Also used to check that a symbol is listed.
    pub async fn fetch_ticker(&self, symbol: &str) -> MarketResult<TickerStats> {
        let pair = Self::pair(symbol);
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);

        let response = self.get(&url, &[("symbol", pair.clone())], symbol).await?;
        let raw: BinanceTicker = response.json().await?;

        TickerStats::try_from(raw).map_err(|e| {
            error!("❌ Malformed ticker payload for {}: {}", pair, e);
            MarketError::UpstreamUnavailable(format!("malformed ticker for {}: {}", pair, e))
        })
    }

    /// Candles covering the lookback window of `timeframe`, ending now.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> MarketResult<Vec<Candle>> {
        self.fetch_candles_since(symbol, timeframe, Utc::now() - timeframe.lookback())
            .await
    }

    /// Candles from `start` onwards, capped at 500 rows. Binance fills the cap
    /// from the oldest bucket, so minute timeframes whose lookback holds more
    /// than 500 buckets end before the current time.
    pub async fn fetch_candles_since(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
    ) -> MarketResult<Vec<Candle>> {
        let pair = Self::pair(symbol);
        let url = format!("{}/api/v3/klines", self.base_url);
        let query = [
            ("symbol", pair.clone()),
            ("interval", timeframe.interval().to_string()),
            ("startTime", start.timestamp_millis().to_string()),
            ("limit", KLINE_LIMIT.to_string()),
        ];

        let response = self.get(&url, &query, symbol).await?;
        let rows: Vec<Vec<Value>> = response.json().await?;

        let parsed: Vec<Candle> = rows.iter().filter_map(|row| parse_kline_row(row)).collect();
        if parsed.len() < rows.len() {
            warn!(
                "⚠️ Dropped {} malformed kline rows for {} ({})",
                rows.len() - parsed.len(),
                pair,
                timeframe
            );
        }

        let candles = normalize_candles(parsed);
        if candles.len() < MIN_CANDLES {
            warn!(
                "⚠️ Only {} candles returned for {} ({})",
                candles.len(),
                pair,
                timeframe
            );
            return Err(MarketError::InsufficientData {
                needed: MIN_CANDLES,
                got: candles.len(),
            });
        }

        debug!("✅ Fetched {} candles for {} ({})", candles.len(), pair, timeframe);
        Ok(candles)
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        symbol: &str,
    ) -> MarketResult<Response> {
        debug!("🌐 Binance request: {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Network error calling {}: {}", url, e);
                MarketError::from(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        if status == StatusCode::BAD_REQUEST {
            warn!("⚠️ Binance rejected symbol {}: {}", symbol, body);
            return Err(MarketError::UnsupportedSymbol(symbol.trim().to_uppercase()));
        }

        error!("❌ Binance responded with {}: {}", status, body);
        Err(MarketError::UpstreamUnavailable(format!(
            "Binance responded with {}",
            status
        )))
    }
}

/// Kline rows are `[openTime, open, high, low, close, volume, closeTime, ...]`
/// with prices and volume encoded as decimal strings.
fn parse_kline_row(row: &[Value]) -> Option<Candle> {
    let timestamp = DateTime::from_timestamp_millis(row.first()?.as_i64()?)?;
    let field = |index: usize| -> Option<f64> {
        match row.get(index)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };

    Some(Candle {
        timestamp,
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}

/// Orders candles by timestamp and drops duplicated buckets so the sequence is
/// strictly increasing.
pub fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp);
    candles.dedup_by_key(|c| c.timestamp);
    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const HOUR_MS: i64 = 3_600_000;

    fn kline_body(count: usize) -> String {
        let rows: Vec<Value> = (0..count)
            .rev()
            .map(|i| {
                let open_time = 1_700_000_000_000_i64 + i as i64 * HOUR_MS;
                let close = 100.0 + i as f64;
                json!([
                    open_time,
                    format!("{:.2}", close - 0.5),
                    format!("{:.2}", close + 1.0),
                    format!("{:.2}", close - 1.0),
                    format!("{:.2}", close),
                    "12.5",
                    open_time + HOUR_MS - 1,
                    "1250.0",
                    42,
                    "6.0",
                    "600.0",
                    "0"
                ])
            })
            .collect();
        Value::Array(rows).to_string()
    }

    #[tokio::test]
    async fn test_fetch_candles_orders_rows_by_timestamp() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
                Matcher::UrlEncoded("interval".into(), "1h".into()),
                Matcher::UrlEncoded("limit".into(), "500".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(kline_body(12))
            .create_async()
            .await;

        let binance = Binance::with_base_url(Client::new(), server.url());
        let candles = binance.fetch_candles("btc", Timeframe::OneHour).await.unwrap();

        mock.assert_async().await;
        assert_eq!(candles.len(), 12);
        assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(candles[0].close, 100.0);
        assert_eq!(candles[11].close, 111.0);
        assert_eq!(candles[0].volume, 12.5);
    }

    #[tokio::test]
    async fn test_fetch_candles_with_too_few_rows_is_insufficient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(kline_body(5))
            .create_async()
            .await;

        let binance = Binance::with_base_url(Client::new(), server.url());
        let result = binance.fetch_candles("eth", Timeframe::OneDay).await;

        assert!(matches!(
            result,
            Err(MarketError::InsufficientData { needed: 10, got: 5 })
        ));
    }

    #[tokio::test]
    async fn test_bad_request_maps_to_unsupported_symbol() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
            .create_async()
            .await;

        let binance = Binance::with_base_url(Client::new(), server.url());
        let result = binance.fetch_candles("notacoin", Timeframe::OneDay).await;

        assert!(matches!(result, Err(MarketError::UnsupportedSymbol(s)) if s == "NOTACOIN"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/ticker/24hr")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let binance = Binance::with_base_url(Client::new(), server.url());
        let result = binance.fetch_ticker("btc").await;

        assert!(matches!(result, Err(MarketError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_ticker_converts_volume_to_quote() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/ticker/24hr")
            .match_query(Matcher::UrlEncoded("symbol".into(), "SOLUSDT".into()))
            .with_status(200)
            .with_body(
                json!({
                    "symbol": "SOLUSDT",
                    "lastPrice": "150.00",
                    "priceChangePercent": "-2.50",
                    "volume": "1000",
                    "highPrice": "160.00",
                    "lowPrice": "140.00"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let binance = Binance::with_base_url(Client::new(), server.url());
        let ticker = binance.fetch_ticker(" sol ").await.unwrap();

        assert_eq!(ticker.symbol, "SOLUSDT");
        assert_eq!(ticker.current_price, 150.0);
        assert_eq!(ticker.price_change_24h, -2.5);
        assert_eq!(ticker.volume_24h, 150_000.0);
    }

    #[test]
    fn test_normalize_drops_duplicate_buckets() {
        let at = |ms: i64, close: f64| Candle {
            timestamp: DateTime::from_timestamp_millis(ms).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        };
        let candles = normalize_candles(vec![at(3, 3.0), at(1, 1.0), at(3, 3.5), at(2, 2.0)]);

        let stamps: Vec<i64> = candles.iter().map(|c| c.timestamp.timestamp_millis()).collect();
        assert_eq!(stamps, vec![1, 2, 3]);
    }
}
