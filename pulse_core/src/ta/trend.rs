use super::{
    indicators::{default_bollinger_bands, default_macd, sma},
    types::{BollingerReading, MacdReading, Strength, Trend, TrendAssessment},
};
use crate::error::{MarketError, MarketResult};

pub const SHORT_MA_PERIOD: usize = 20;
pub const LONG_MA_PERIOD: usize = 50;

/// Latest indicator readings the classifier works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendInputs {
    pub close: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub macd: Option<MacdReading>,
    pub bollinger: Option<BollingerReading>,
}

/// Rule table over the most recent readings:
/// price vs MA20/MA50 sets the trend, MACD vs signal adds a buy/sell
/// observation and escalates strength when it agrees with the trend,
/// and the Bollinger position adds overbought/oversold notes.
pub fn classify(inputs: &TrendInputs) -> TrendAssessment {
    let TrendInputs {
        close,
        ma20,
        ma50,
        macd,
        bollinger,
    } = *inputs;

    let mut assessment = TrendAssessment::default();

    if close > ma20 && close > ma50 {
        assessment.trend = Trend::Up;
        assessment.signals.push("Price trading above MA20 and MA50".to_string());
    } else if close < ma20 && close < ma50 {
        assessment.trend = Trend::Down;
        assessment.signals.push("Price trading below MA20 and MA50".to_string());
    }

    if let Some(reading) = macd {
        if reading.macd > reading.signal {
            assessment
                .signals
                .push("MACD above its signal line: buy signal".to_string());
            if assessment.trend == Trend::Up {
                assessment.strength = Strength::Strong;
            }
        } else if reading.macd < reading.signal {
            assessment
                .signals
                .push("MACD below its signal line: sell signal".to_string());
            if assessment.trend == Trend::Down {
                assessment.strength = Strength::Strong;
            }
        }
    }

    let mut supports = vec![ma50];
    let mut resistances = vec![ma20];

    if let Some(bands) = bollinger {
        if close > bands.upper {
            assessment
                .signals
                .push("Price above the upper Bollinger band: possibly overbought".to_string());
        } else if close < bands.lower {
            assessment
                .signals
                .push("Price below the lower Bollinger band: possibly oversold".to_string());
        }
        supports.push(bands.lower);
        resistances.push(bands.upper);
    }

    supports.sort_by(|a, b| b.total_cmp(a));
    resistances.sort_by(|a, b| a.total_cmp(b));
    assessment.support_levels = supports;
    assessment.resistance_levels = resistances;

    assessment
}

/// Computes the latest readings from a close-price series and classifies them.
pub fn assess(closes: &[f64]) -> MarketResult<TrendAssessment> {
    let insufficient = || MarketError::InsufficientData {
        needed: LONG_MA_PERIOD,
        got: closes.len(),
    };

    let close = *closes.last().ok_or_else(insufficient)?;
    let ma20 = sma(closes, SHORT_MA_PERIOD).latest().ok_or_else(insufficient)?;
    let ma50 = sma(closes, LONG_MA_PERIOD).latest().ok_or_else(insufficient)?;

    Ok(classify(&TrendInputs {
        close,
        ma20,
        ma50,
        macd: default_macd(closes).latest(),
        bollinger: default_bollinger_bands(closes).latest(),
    }))
}
