use super::config::ChartConfig;
use crate::market::{binance::QUOTE_ASSET, Timeframe};

/// Which indicators are painted over the price line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlays {
    /// Moving-average periods, drawn shortest first.
    pub moving_averages: Vec<usize>,
    pub bollinger: bool,
    pub volume: bool,
}

impl Default for Overlays {
    fn default() -> Self {
        Self {
            moving_averages: vec![7],
            bollinger: false,
            volume: false,
        }
    }
}

impl Overlays {
    /// Sorted, de-duplicated periods with zero removed.
    pub fn normalized(mut self) -> Self {
        self.moving_averages.retain(|p| *p > 0);
        self.moving_averages.sort_unstable();
        self.moving_averages.dedup();
        self
    }
}

/// Per-request chart description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub symbol: String,
    pub quote: String,
    pub timeframe: Timeframe,
    pub overlays: Overlays,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn new(
        symbol: &str,
        timeframe: Timeframe,
        overlays: Overlays,
        config: &ChartConfig,
    ) -> Self {
        let height = if overlays.volume {
            config.height_with_volume
        } else {
            config.height
        };

        Self {
            symbol: symbol.trim().to_uppercase(),
            quote: QUOTE_ASSET.to_string(),
            timeframe,
            overlays: overlays.normalized(),
            width: config.width,
            height,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "{}/{} ({})",
            self.symbol,
            self.quote,
            self.timeframe.code().to_uppercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_depends_on_volume_panel() {
        let config = ChartConfig::default();
        let plain = ChartSpec::new("btc", Timeframe::OneDay, Overlays::default(), &config);
        let with_volume = ChartSpec::new(
            "btc",
            Timeframe::OneDay,
            Overlays {
                volume: true,
                ..Overlays::default()
            },
            &config,
        );

        assert_eq!((plain.width, plain.height), (800, 400));
        assert_eq!((with_volume.width, with_volume.height), (800, 500));
    }

    #[test]
    fn test_title_and_overlay_order() {
        let spec = ChartSpec::new(
            " eth ",
            Timeframe::FourHours,
            Overlays {
                moving_averages: vec![50, 7, 20, 7, 0],
                bollinger: true,
                volume: false,
            },
            &ChartConfig::default(),
        );

        assert_eq!(spec.title(), "ETH/USDT (4H)");
        assert_eq!(spec.overlays.moving_averages, vec![7, 20, 50]);
    }
}
