use std::fmt;

/// Upstream REST hosts the bot talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoints {
    Binance,
    CoinGecko,
    CryptoPanic,
}

impl fmt::Display for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoints::Binance => write!(f, "https://api.binance.com"),
            Endpoints::CoinGecko => write!(f, "https://api.coingecko.com/api/v3"),
            Endpoints::CryptoPanic => write!(f, "https://cryptopanic.com/api/v1"),
        }
    }
}
