use thiserror::Error;

/// Failures surfaced by the market-data, indicator and chart pipeline.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("{0} is not listed on the upstream market")]
    UnsupportedSymbol(String),
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("chart rendering failed: {0}")]
    RenderFailure(String),
    #[error("unsupported timeframe: {0}")]
    InvalidTimeframe(String),
}

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        MarketError::UpstreamUnavailable(err.to_string())
    }
}

impl From<image::ImageError> for MarketError {
    fn from(err: image::ImageError) -> Self {
        MarketError::RenderFailure(err.to_string())
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
