pub mod binance;
pub mod dto;
pub mod timeframe;

pub use binance::Binance;
pub use dto::{Candle, TickerStats};
pub use timeframe::Timeframe;
