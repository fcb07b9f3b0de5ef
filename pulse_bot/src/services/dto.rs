use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CoinListEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// One entry of `simple/price`, keyed by coin id in the response.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct SimplePrice {
    pub usd: Option<f64>,
    pub usd_24h_change: Option<f64>,
    pub last_updated_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub total_volume: Option<f64>,
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UsdValue {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CoinImage {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: UsdValue,
    #[serde(default)]
    pub market_cap: UsdValue,
    #[serde(default)]
    pub total_volume: UsdValue,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub price_change_percentage_30d: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinDetails {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub image: CoinImage,
    #[serde(default)]
    pub market_data: CoinMarketData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub score: Option<u32>,
    pub price_btc: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingItem {
    pub item: TrendingCoin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingItem>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewsPost {
    pub title: String,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsResponse {
    #[serde(default)]
    pub results: Vec<NewsPost>,
}
