use std::fmt;

/// Indicator values aligned by index with the candle sequence they were derived from.
/// Warm-up positions where the indicator is not yet defined hold `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    /// Value at the most recent index, if the indicator is defined there.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

impl MacdSeries {
    pub fn latest(&self) -> Option<MacdReading> {
        Some(MacdReading {
            macd: self.macd.latest()?,
            signal: self.signal.latest()?,
            histogram: self.histogram.latest()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BollingerSeries {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

impl BollingerSeries {
    pub fn latest(&self) -> Option<BollingerReading> {
        Some(BollingerReading {
            upper: self.upper.latest()?,
            middle: self.middle.latest()?,
            lower: self.lower.latest()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    Up,
    Down,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strength {
    #[default]
    Weak,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendAssessment {
    pub trend: Trend,
    pub strength: Strength,
    pub signals: Vec<String>,
    /// Sorted descending.
    pub support_levels: Vec<f64>,
    /// Sorted ascending.
    pub resistance_levels: Vec<f64>,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP 🟢"),
            Trend::Down => write!(f, "DOWN 🔴"),
            Trend::Neutral => write!(f, "NEUTRAL 🟡"),
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Strong => write!(f, "🔥 STRONG"),
            Strength::Weak => write!(f, "💫 WEAK"),
        }
    }
}
