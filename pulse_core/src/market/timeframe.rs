use std::{fmt, str::FromStr};

use chrono::Duration;

use crate::error::MarketError;

/// Candle bucket granularity accepted by chart and analysis commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    #[default]
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 15] = [
        Timeframe::OneMinute,
        Timeframe::ThreeMinutes,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::TwoHours,
        Timeframe::FourHours,
        Timeframe::SixHours,
        Timeframe::EightHours,
        Timeframe::TwelveHours,
        Timeframe::OneDay,
        Timeframe::ThreeDays,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    /// The user-facing interval code (`1M` is one month, `1m` one minute).
    pub fn code(self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::ThreeMinutes => "3m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::TwoHours => "2h",
            Timeframe::FourHours => "4h",
            Timeframe::SixHours => "6h",
            Timeframe::EightHours => "8h",
            Timeframe::TwelveHours => "12h",
            Timeframe::OneDay => "1d",
            Timeframe::ThreeDays => "3d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1M",
        }
    }

    /// Interval parameter sent to the klines endpoint.
    pub fn interval(self) -> &'static str {
        // Binance uses the same codes as the chat surface.
        self.code()
    }

    /// How far back the candle request reaches for this granularity.
    pub fn lookback(self) -> Duration {
        match self {
            Timeframe::OneMinute
            | Timeframe::ThreeMinutes
            | Timeframe::FiveMinutes
            | Timeframe::FifteenMinutes
            | Timeframe::ThirtyMinutes => Duration::days(1),
            Timeframe::OneHour | Timeframe::TwoHours => Duration::days(7),
            Timeframe::FourHours
            | Timeframe::SixHours
            | Timeframe::EightHours
            | Timeframe::TwelveHours => Duration::days(14),
            Timeframe::OneDay => Duration::days(30),
            Timeframe::ThreeDays => Duration::days(90),
            Timeframe::OneWeek => Duration::days(180),
            Timeframe::OneMonth => Duration::days(365),
        }
    }

    pub fn is_intraday(self) -> bool {
        !matches!(
            self,
            Timeframe::OneDay | Timeframe::ThreeDays | Timeframe::OneWeek | Timeframe::OneMonth
        )
    }

    /// chrono format string for time-axis labels.
    pub fn label_format(self) -> &'static str {
        if self.is_intraday() {
            "%d/%m %H:%M"
        } else {
            "%d/%m/%Y"
        }
    }
}

impl FromStr for Timeframe {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.code() == s.trim())
            .ok_or_else(|| MarketError::InvalidTimeframe(s.to_string()))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_round_trips() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.code().parse::<Timeframe>().unwrap(), tf);
            assert_eq!(tf.interval(), tf.code());
        }
    }

    #[test]
    fn test_lookback_table() {
        let expected = [
            ("1m", 1),
            ("3m", 1),
            ("5m", 1),
            ("15m", 1),
            ("30m", 1),
            ("1h", 7),
            ("2h", 7),
            ("4h", 14),
            ("6h", 14),
            ("8h", 14),
            ("12h", 14),
            ("1d", 30),
            ("3d", 90),
            ("1w", 180),
            ("1M", 365),
        ];
        assert_eq!(expected.len(), Timeframe::ALL.len());
        for (code, days) in expected {
            let tf: Timeframe = code.parse().unwrap();
            assert_eq!(tf.lookback(), Duration::days(days), "lookback for {}", code);
        }
    }

    #[test]
    fn test_minute_and_month_are_distinct() {
        assert_eq!("1m".parse::<Timeframe>().unwrap(), Timeframe::OneMinute);
        assert_eq!("1M".parse::<Timeframe>().unwrap(), Timeframe::OneMonth);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!(matches!(
            "2d".parse::<Timeframe>(),
            Err(MarketError::InvalidTimeframe(code)) if code == "2d"
        ));
    }

    #[test]
    fn test_label_granularity() {
        assert!(Timeframe::TwelveHours.is_intraday());
        assert!(!Timeframe::OneDay.is_intraday());
        assert_eq!(Timeframe::OneWeek.label_format(), "%d/%m/%Y");
        assert_eq!(Timeframe::FifteenMinutes.label_format(), "%d/%m %H:%M");
    }
}
