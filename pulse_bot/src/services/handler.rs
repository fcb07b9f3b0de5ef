use std::collections::HashMap;

use anyhow::{Result, anyhow};
use log::{debug, error, info};
use pulse_core::helpers::dto::Endpoints;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::dto::{
    CoinDetails, CoinListEntry, MarketCoin, NewsPost, NewsResponse, SimplePrice, TrendingCoin,
    TrendingResponse,
};

const COINGECKO_KEY_HEADER: &str = "x-cg-demo-api-key";
const TRENDING_LIMIT: usize = 7;

/// HTTP client for the CoinGecko and CryptoPanic APIs.
#[derive(Clone)]
pub struct Services {
    client: Client,
    coingecko_url: String,
    cryptopanic_url: String,
    coingecko_key: Option<String>,
    cryptopanic_key: Option<String>,
}

impl Services {
    pub fn new(
        client: Client,
        coingecko_key: Option<String>,
        cryptopanic_key: Option<String>,
    ) -> Self {
        Self::with_base_urls(
            client,
            Endpoints::CoinGecko.to_string(),
            Endpoints::CryptoPanic.to_string(),
            coingecko_key,
            cryptopanic_key,
        )
    }

    pub fn with_base_urls(
        client: Client,
        coingecko_url: String,
        cryptopanic_url: String,
        coingecko_key: Option<String>,
        cryptopanic_key: Option<String>,
    ) -> Self {
        Self {
            client,
            coingecko_url: coingecko_url.trim_end_matches('/').to_string(),
            cryptopanic_url: cryptopanic_url.trim_end_matches('/').to_string(),
            coingecko_key,
            cryptopanic_key,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        coingecko: bool,
    ) -> Result<T> {
        debug!("🌐 Making service request to: {}", url);

        let mut request = self.client.get(url).query(query);
        if coingecko {
            if let Some(key) = &self.coingecko_key {
                request = request.header(COINGECKO_KEY_HEADER, key);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("📡 Server response status: {}", status);

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        error!("❌ Server responded with error status: {}", status);
        error!("❌ Server error response body: {}", error_body);
        error!("❌ Request URL: {}", url);

        Err(anyhow!("Request to {} failed with status {}", url, status))
    }

    /// Full CoinGecko coin list, used to map tickers to coin ids.
    pub async fn coin_list(&self) -> Result<Vec<CoinListEntry>> {
        let url = format!("{}/coins/list", self.coingecko_url);
        let list: Vec<CoinListEntry> = self.get_json(&url, &[], true).await?;
        info!("✅ Loaded {} coins from CoinGecko", list.len());

        Ok(list)
    }

    pub async fn simple_price(&self, ids: &[String]) -> Result<HashMap<String, SimplePrice>> {
        let url = format!("{}/simple/price", self.coingecko_url);
        let query = [
            ("ids", ids.join(",")),
            ("vs_currencies", "usd".to_string()),
            ("include_24hr_change", "true".to_string()),
            ("include_last_updated_at", "true".to_string()),
        ];

        self.get_json(&url, &query, true).await
    }

    pub async fn markets(&self, order: &str, per_page: usize) -> Result<Vec<MarketCoin>> {
        let url = format!("{}/coins/markets", self.coingecko_url);
        let query = [
            ("vs_currency", "usd".to_string()),
            ("order", order.to_string()),
            ("per_page", per_page.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
        ];

        self.get_json(&url, &query, true).await
    }

    pub async fn coin(&self, id: &str) -> Result<CoinDetails> {
        let url = format!("{}/coins/{}", self.coingecko_url, id);
        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
        ];

        self.get_json(&url, &query, true).await
    }

    pub async fn trending(&self) -> Result<Vec<TrendingCoin>> {
        let url = format!("{}/search/trending", self.coingecko_url);
        let response: TrendingResponse = self.get_json(&url, &[], true).await?;

        Ok(response
            .coins
            .into_iter()
            .map(|c| c.item)
            .take(TRENDING_LIMIT)
            .collect())
    }

    /// Hot BTC/ETH posts from CryptoPanic.
    pub async fn news(&self) -> Result<Vec<NewsPost>> {
        let key = self
            .cryptopanic_key
            .as_ref()
            .ok_or_else(|| anyhow!("CRYPTOPANIC_API_KEY not configured"))?;

        let url = format!("{}/posts/", self.cryptopanic_url);
        let query = [
            ("auth_token", key.clone()),
            ("currencies", "BTC,ETH".to_string()),
            ("filter", "hot".to_string()),
            ("public", "true".to_string()),
        ];

        let response: NewsResponse = self.get_json(&url, &query, false).await?;
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn services(url: &str, key: Option<&str>) -> Services {
        Services::with_base_urls(
            Client::new(),
            url.to_string(),
            url.to_string(),
            Some("demo-key".to_string()),
            key.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_coin_list_sends_demo_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/coins/list")
            .match_header(COINGECKO_KEY_HEADER, "demo-key")
            .with_status(200)
            .with_body(r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin"}]"#)
            .create_async()
            .await;

        let list = services(&server.url(), None).coin_list().await.unwrap();

        mock.assert_async().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].symbol, "btc");
    }

    #[tokio::test]
    async fn test_simple_price_parses_map() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::UrlEncoded("ids".into(), "bitcoin,ethereum".into()))
            .with_status(200)
            .with_body(
                r#"{"bitcoin":{"usd":65000.5,"usd_24h_change":1.5,"last_updated_at":1700000000},
                    "ethereum":{"usd":3500.0}}"#,
            )
            .create_async()
            .await;

        let prices = services(&server.url(), None)
            .simple_price(&["bitcoin".to_string(), "ethereum".to_string()])
            .await
            .unwrap();

        assert_eq!(prices["bitcoin"].usd, Some(65000.5));
        assert_eq!(prices["ethereum"].usd_24h_change, None);
    }

    #[tokio::test]
    async fn test_trending_is_capped_at_seven() {
        let items: Vec<String> = (0..10)
            .map(|i| {
                format!(
                    r#"{{"item":{{"id":"c{i}","name":"Coin {i}","symbol":"C{i}","market_cap_rank":{i},"score":{i},"price_btc":0.0000012}}}}"#
                )
            })
            .collect();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/trending")
            .with_status(200)
            .with_body(format!(r#"{{"coins":[{}]}}"#, items.join(",")))
            .create_async()
            .await;

        let trending = services(&server.url(), None).trending().await.unwrap();

        assert_eq!(trending.len(), 7);
        assert_eq!(trending[0].id, "c0");
        assert_eq!(trending[3].score, Some(3));
        assert_eq!(trending[3].price_btc, Some(0.0000012));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/coins/nope")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"coin not found"}"#)
            .create_async()
            .await;

        let result = services(&server.url(), None).coin("nope").await;

        assert!(result.unwrap_err().to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_news_requires_key() {
        let result = services("http://127.0.0.1:9", None).news().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_news_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/posts/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("auth_token".into(), "panic".into()),
                Matcher::UrlEncoded("filter".into(), "hot".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"results":[{"title":"Bitcoin ETF inflows","url":"https://x.test/1","published_at":"2024-03-01T10:00:00Z"}]}"#,
            )
            .create_async()
            .await;

        let posts = services(&server.url(), Some("panic")).news().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Bitcoin ETF inflows");
    }
}
