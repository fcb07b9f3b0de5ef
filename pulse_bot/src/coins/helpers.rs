use std::{cmp::Ordering, collections::HashMap};

use chrono::DateTime;
use pulse_core::helpers::{bot_commands::TopKind, utils::format_currency};

use crate::services::dto::{CoinListEntry, MarketCoin, SimplePrice, TrendingCoin};

/// Matches each requested token against the coin list, preferring an exact id
/// over a ticker symbol.
pub fn resolve_tokens<'a>(
    list: &'a [CoinListEntry],
    tokens: &[String],
) -> Vec<(String, Option<&'a CoinListEntry>)> {
    tokens
        .iter()
        .map(|token| {
            let token = token.to_lowercase();
            let entry = list
                .iter()
                .find(|c| c.id.eq_ignore_ascii_case(&token))
                .or_else(|| list.iter().find(|c| c.symbol.eq_ignore_ascii_case(&token)));
            (token, entry)
        })
        .collect()
}

pub fn format_price_lines(
    resolved: &[(String, Option<&CoinListEntry>)],
    prices: &HashMap<String, SimplePrice>,
) -> String {
    let mut text = String::from("💰 **Token prices:**\n");

    for (token, entry) in resolved {
        let price = entry.and_then(|e| prices.get(&e.id).and_then(|p| p.usd).map(|usd| (e, usd)));
        match price {
            Some((entry, usd)) => text.push_str(&format!(
                "🔹 **{}**: {}\n",
                entry.symbol.to_uppercase(),
                format_currency(usd)
            )),
            None => text.push_str(&format!(
                "❌ No price found for **{}**\n",
                token.to_uppercase()
            )),
        }
    }

    text
}

pub fn change_emoji(change: Option<f64>) -> &'static str {
    match change {
        Some(c) if c > 0.0 => "📈",
        _ => "📉",
    }
}

pub fn format_updated_at(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// `coins/markets` ordering to request for each top list.
pub fn market_order(kind: TopKind) -> &'static str {
    match kind {
        TopKind::Volume => "volume_desc",
        TopKind::Gainers | TopKind::Losers => "market_cap_desc",
    }
}

pub fn select_top(kind: TopKind, mut coins: Vec<MarketCoin>, limit: usize) -> Vec<MarketCoin> {
    let key = |c: &MarketCoin| match kind {
        TopKind::Volume => c.total_volume,
        TopKind::Gainers | TopKind::Losers => c.price_change_percentage_24h,
    };
    coins.retain(|c| key(c).is_some_and(f64::is_finite));

    coins.sort_by(|a, b| {
        let (a, b) = (key(a).unwrap_or_default(), key(b).unwrap_or_default());
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match kind {
            TopKind::Losers => ord,
            TopKind::Gainers | TopKind::Volume => ord.reverse(),
        }
    });
    coins.truncate(limit);
    coins
}

pub fn top_title(kind: TopKind, limit: usize) -> String {
    let label = match kind {
        TopKind::Gainers => "Gainers",
        TopKind::Losers => "Losers",
        TopKind::Volume => "Volume",
    };
    format!("Top {} {}", limit, label)
}

/// Embed field for the `index`-th trending coin: name and symbol, then rank,
/// search score and BTC price.
pub fn trending_field(index: usize, coin: &TrendingCoin) -> (String, String) {
    let name = format!("{}. {} ({})", index + 1, coin.name, coin.symbol.to_uppercase());
    let rank = coin
        .market_cap_rank
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| "#N/A".to_string());
    let score = coin
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let price_btc = coin
        .price_btc
        .map(|p| format!("{:.10}", p))
        .unwrap_or_else(|| "N/A".to_string());

    (
        name,
        format!("Rank: {}\nScore: {}\nPrice BTC: {}", rank, score, price_btc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, symbol: &str) -> CoinListEntry {
        CoinListEntry {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: id.to_string(),
        }
    }

    fn market(id: &str, change: Option<f64>, volume: f64) -> MarketCoin {
        MarketCoin {
            id: id.to_string(),
            symbol: id.to_string(),
            name: id.to_string(),
            current_price: Some(1.0),
            price_change_percentage_24h: change,
            total_volume: Some(volume),
            market_cap: None,
        }
    }

    #[test]
    fn test_resolve_prefers_id_over_symbol() {
        let list = vec![
            entry("batcat", "btc"),
            entry("bitcoin", "btc"),
            entry("ethereum", "eth"),
        ];
        let resolved = resolve_tokens(&list, &["ETHEREUM".to_string(), "btc".to_string(), "zzz".to_string()]);

        assert_eq!(resolved[0].1.map(|e| e.id.as_str()), Some("ethereum"));
        assert_eq!(resolved[1].1.map(|e| e.id.as_str()), Some("batcat"));
        assert!(resolved[2].1.is_none());
    }

    #[test]
    fn test_price_lines_report_unknown_tokens() {
        let list = vec![entry("bitcoin", "btc")];
        let resolved = resolve_tokens(&list, &["btc".to_string(), "nope".to_string()]);
        let prices = HashMap::from([(
            "bitcoin".to_string(),
            SimplePrice {
                usd: Some(65000.0),
                ..SimplePrice::default()
            },
        )]);

        let text = format_price_lines(&resolved, &prices);
        assert!(text.contains("🔹 **BTC**: $65.00K"));
        assert!(text.contains("❌ No price found for **NOPE**"));
    }

    #[test]
    fn test_select_top_orders() {
        let coins = vec![
            market("a", Some(5.0), 10.0),
            market("b", Some(-8.0), 30.0),
            market("c", None, 50.0),
            market("d", Some(12.0), 20.0),
        ];

        let gainers: Vec<String> = select_top(TopKind::Gainers, coins.clone(), 2)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let losers: Vec<String> = select_top(TopKind::Losers, coins.clone(), 1)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let volume: Vec<String> = select_top(TopKind::Volume, coins, 3)
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(gainers, vec!["d", "a"]);
        assert_eq!(losers, vec!["b"]);
        assert_eq!(volume, vec!["c", "b", "d"]);
    }

    #[test]
    fn test_updated_at_formatting() {
        assert_eq!(format_updated_at(Some(1_700_000_000)), "2023-11-14 22:13 UTC");
        assert_eq!(format_updated_at(None), "N/A");
    }

    #[test]
    fn test_trending_field_shows_rank_score_and_btc_price() {
        let coin = TrendingCoin {
            id: "pepe".to_string(),
            name: "Pepe".to_string(),
            symbol: "pepe".to_string(),
            market_cap_rank: Some(38),
            thumb: None,
            score: Some(2),
            price_btc: Some(0.000000000123),
        };

        let (name, value) = trending_field(2, &coin);
        assert_eq!(name, "3. Pepe (PEPE)");
        assert_eq!(value, "Rank: #38\nScore: 2\nPrice BTC: 0.0000000001");

        let bare = TrendingCoin {
            market_cap_rank: None,
            score: None,
            price_btc: None,
            ..coin
        };
        assert_eq!(
            trending_field(0, &bare).1,
            "Rank: #N/A\nScore: N/A\nPrice BTC: N/A"
        );
    }
}
