use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One OHLCV observation for a fixed time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// 24-hour ticker statistics for a symbol quoted in USDT.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerStats {
    pub symbol: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    /// Base volume converted to quote currency at the last price.
    pub volume_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BinanceTicker {
    pub symbol: String,
    pub last_price: String,
    pub price_change_percent: String,
    pub volume: String,
    pub high_price: String,
    pub low_price: String,
}

impl TryFrom<BinanceTicker> for TickerStats {
    type Error = std::num::ParseFloatError;

    fn try_from(raw: BinanceTicker) -> Result<Self, Self::Error> {
        let current_price: f64 = raw.last_price.parse()?;
        let volume: f64 = raw.volume.parse()?;

        Ok(TickerStats {
            symbol: raw.symbol,
            current_price,
            price_change_24h: raw.price_change_percent.parse()?,
            volume_24h: volume * current_price,
            high_24h: raw.high_price.parse()?,
            low_24h: raw.low_price.parse()?,
        })
    }
}
