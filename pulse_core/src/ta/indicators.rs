use super::types::{BollingerSeries, IndicatorSeries, MacdSeries};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;

/// Simple Moving Average. Undefined for indices below `period - 1`.
pub fn sma(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return IndicatorSeries::new(values);
    }

    let mut window_sum: f64 = prices[..period].iter().sum();
    values[period - 1] = Some(window_sum / period as f64);

    for i in period..prices.len() {
        window_sum += prices[i] - prices[i - period];
        values[i] = Some(window_sum / period as f64);
    }

    IndicatorSeries::new(values)
}

/// Exponential Moving Average seeded with the SMA of the first `period` values.
pub fn ema(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return IndicatorSeries::new(values);
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut current = prices[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(current);

    for i in period..prices.len() {
        current = (prices[i] - current) * multiplier + current;
        values[i] = Some(current);
    }

    IndicatorSeries::new(values)
}

/// EMA over the defined tail of an aligned series, keeping the original alignment.
fn ema_of_series(series: &IndicatorSeries, period: usize) -> IndicatorSeries {
    let Some(start) = series.values().iter().position(|v| v.is_some()) else {
        return IndicatorSeries::undefined(series.len());
    };

    let tail: Vec<f64> = series.values()[start..].iter().map_while(|v| *v).collect();
    let smoothed = ema(&tail, period);

    let mut values = vec![None; series.len()];
    for (offset, value) in smoothed.values().iter().enumerate() {
        values[start + offset] = *value;
    }

    IndicatorSeries::new(values)
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first average gain/loss is the simple mean over `period` price changes;
/// afterwards `avg = (avg * (period - 1) + current) / period`. The first defined
/// value sits at index `period`. A flat window reads 50, a window without losses 100.
pub fn rsi(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return IndicatorSeries::new(values);
    }

    let change = |i: usize| {
        let delta = prices[i] - prices[i - 1];
        (delta.max(0.0), (-delta).max(0.0))
    };

    let (mut avg_gain, mut avg_loss) = (1..=period).fold((0.0, 0.0), |(g, l), i| {
        let (gain, loss) = change(i);
        (g + gain, l + loss)
    });
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    values[period] = Some(rsi_value(avg_gain, avg_loss));

    let smoothing = (period - 1) as f64;
    for i in (period + 1)..prices.len() {
        let (gain, loss) = change(i);
        avg_gain = (avg_gain * smoothing + gain) / period as f64;
        avg_loss = (avg_loss * smoothing + loss) / period as f64;
        values[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    IndicatorSeries::new(values)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Latest RSI(14) reading, if enough prices are available.
pub fn latest_rsi(prices: &[f64]) -> Option<f64> {
    rsi(prices, RSI_PERIOD).latest()
}

/// MACD line (fast EMA − slow EMA), its signal EMA and the histogram.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema(prices, fast);
    let slow_ema = ema(prices, slow);

    let macd_line = IndicatorSeries::new(
        (0..prices.len())
            .map(|i| Some(fast_ema.get(i)? - slow_ema.get(i)?))
            .collect(),
    );
    let signal_line = ema_of_series(&macd_line, signal);
    let histogram = IndicatorSeries::new(
        (0..prices.len())
            .map(|i| Some(macd_line.get(i)? - signal_line.get(i)?))
            .collect(),
    );

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// MACD(12, 26, 9).
pub fn default_macd(prices: &[f64]) -> MacdSeries {
    macd(prices, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
}

/// Bollinger Bands: SMA middle band, upper/lower at `std_dev` population
/// standard deviations of the same window.
pub fn bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    let middle = sma(prices, period);
    let mut upper = vec![None; prices.len()];
    let mut lower = vec![None; prices.len()];

    for (i, mean) in middle.values().iter().enumerate() {
        let Some(mean) = *mean else { continue };
        let window = &prices[(i + 1 - period)..=i];
        let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
        let deviation = variance.sqrt();

        upper[i] = Some(mean + std_dev * deviation);
        lower[i] = Some(mean - std_dev * deviation);
    }

    BollingerSeries {
        upper: IndicatorSeries::new(upper),
        middle,
        lower: IndicatorSeries::new(lower),
    }
}

/// Bollinger Bands(20, 2σ).
pub fn default_bollinger_bands(prices: &[f64]) -> BollingerSeries {
    bollinger_bands(prices, BOLLINGER_PERIOD, BOLLINGER_STD_DEV)
}
