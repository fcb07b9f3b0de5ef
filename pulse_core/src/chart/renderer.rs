use std::path::Path;

use ab_glyph::FontArc;
use log::debug;

use super::{
    config::{ChartConfig, Color},
    raster::RasterSurface,
    spec::{ChartSpec, Overlays},
    surface::{DrawingSurface, Point, TextAlign},
};
use crate::{
    error::{MarketError, MarketResult},
    market::Candle,
    ta::{
        indicators::{default_bollinger_bands, sma},
        types::{BollingerSeries, IndicatorSeries},
    },
};

const TITLE_Y: f32 = 16.0;
const LEGEND_Y: f32 = 36.0;
const TIME_LABEL_OFFSET: f32 = 16.0;
const PRICE_LABEL_GAP: f32 = 10.0;

/// Candles together with the overlay series computed from them.
///
/// Series may be shorter than the candle list; they are aligned to the most
/// recent candle and the missing leading positions are left undrawn.
#[derive(Debug, Clone)]
pub struct ChartData<'a> {
    pub candles: &'a [Candle],
    pub moving_averages: Vec<(usize, IndicatorSeries)>,
    pub bollinger: Option<BollingerSeries>,
}

impl<'a> ChartData<'a> {
    pub fn compute(candles: &'a [Candle], overlays: &Overlays) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        Self {
            candles,
            moving_averages: overlays
                .moving_averages
                .iter()
                .map(|period| (*period, sma(&closes, *period)))
                .collect(),
            bollinger: overlays
                .bollinger
                .then(|| default_bollinger_bands(&closes)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    volume: Option<(f32, f32)>,
}

impl Layout {
    fn new(config: &ChartConfig, spec: &ChartSpec) -> Self {
        let m = config.margins;
        let volume_block = if spec.overlays.volume {
            config.volume_panel_height + config.panel_gap
        } else {
            0.0
        };

        let left = m.left;
        let top = m.top;
        let width = (spec.width as f32 - m.left - m.right).max(1.0);
        let height = (spec.height as f32 - m.top - m.bottom - volume_block).max(1.0);
        let volume = spec.overlays.volume.then(|| {
            (
                top + height + config.panel_gap,
                config.volume_panel_height,
            )
        });

        Self {
            left,
            top,
            width,
            height,
            volume,
        }
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Lowest pixel row used by either panel.
    fn content_bottom(&self) -> f32 {
        self.volume
            .map(|(top, height)| top + height)
            .unwrap_or_else(|| self.bottom())
    }

    fn x(&self, index: usize, count: usize) -> f32 {
        if count <= 1 {
            return self.left + self.width / 2.0;
        }
        self.left + self.width * index as f32 / (count - 1) as f32
    }
}

#[derive(Debug, Clone, Copy)]
struct PriceScale {
    min: f64,
    max: f64,
}

impl PriceScale {
    /// Padded range over `values`. A flat series gets a small non-zero span so
    /// the line sits mid-panel.
    fn new(values: impl Iterator<Item = f64>, padding: f64) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let (mut min, mut max) = (min, max);
        if max - min <= f64::EPSILON * max.abs().max(1.0) {
            let half = if max.abs() > 0.0 { max.abs() * 0.01 } else { 1.0 };
            min -= half;
            max += half;
        }

        let pad = (max - min) * padding;
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    fn y(&self, layout: &Layout, value: f64) -> f32 {
        let ratio = (value - self.min) / (self.max - self.min);
        let y = layout.bottom() - (ratio as f32) * layout.height;
        y.clamp(layout.top, layout.bottom())
    }
}

fn axis_price(value: f64) -> String {
    if value.abs() >= 1.0 {
        format!("${:.2}", value)
    } else {
        format!("${:.6}", value)
    }
}

/// Paints price charts onto a [`DrawingSurface`].
///
/// Draw order is fixed: background, title, price line, moving averages from
/// the shortest period up, Bollinger bands, legend row, volume panel, axis
/// labels.
#[derive(Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
    font: Option<FontArc>,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config, font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn load_font(path: impl AsRef<Path>) -> MarketResult<FontArc> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            MarketError::RenderFailure(format!("cannot read font {}: {}", path.display(), e))
        })?;
        FontArc::try_from_vec(bytes).map_err(|e| MarketError::RenderFailure(e.to_string()))
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Computes the requested overlays and renders the chart to PNG bytes.
    pub fn render_png(&self, candles: &[Candle], spec: &ChartSpec) -> MarketResult<Vec<u8>> {
        let data = ChartData::compute(candles, &spec.overlays);
        let mut surface = RasterSurface::new(spec.width, spec.height, self.font.clone());
        self.draw(&mut surface, &data, spec)?;

        let png = surface.into_png()?;
        debug!(
            "📈 Rendered {} chart: {} candles, {} bytes",
            spec.title(),
            candles.len(),
            png.len()
        );
        Ok(png)
    }

    pub fn draw<S: DrawingSurface>(
        &self,
        surface: &mut S,
        data: &ChartData<'_>,
        spec: &ChartSpec,
    ) -> MarketResult<()> {
        let candles = data.candles;
        if candles.is_empty() {
            return Err(MarketError::RenderFailure("no candles to plot".to_string()));
        }
        if candles.iter().any(|c| !c.close.is_finite()) {
            return Err(MarketError::RenderFailure(
                "price series contains non-finite values".to_string(),
            ));
        }

        if surface.size() != (spec.width, spec.height) {
            let (width, height) = surface.size();
            return Err(MarketError::RenderFailure(format!(
                "surface is {}x{}, chart needs {}x{}",
                width, height, spec.width, spec.height
            )));
        }

        let cfg = &self.config;
        let layout = Layout::new(cfg, spec);
        let count = candles.len();
        let closes: Vec<Option<f64>> = candles.iter().map(|c| Some(c.close)).collect();
        let scale = PriceScale::new(candles.iter().map(|c| c.close), cfg.price_padding);

        surface.fill_rect(
            0.0,
            0.0,
            spec.width as f32,
            spec.height as f32,
            cfg.background,
        );
        surface.text(
            &spec.title(),
            Point::new(spec.width as f32 / 2.0, TITLE_Y),
            cfg.title_font_size,
            TextAlign::Center,
            cfg.title_color,
        );

        let mut legend = vec![("Price".to_string(), cfg.price_color)];

        self.polyline(
            surface,
            &layout,
            &scale,
            &closes,
            count,
            cfg.price_line_width,
            cfg.price_color,
        );

        for (index, (period, series)) in data.moving_averages.iter().enumerate() {
            let color = cfg.moving_average_color(*period, index);
            self.polyline(
                surface,
                &layout,
                &scale,
                series.values(),
                count,
                cfg.overlay_line_width,
                color,
            );
            legend.push((format!("MA{}", period), color));
        }

        if let Some(bands) = &data.bollinger {
            for (series, color) in [
                (&bands.upper, cfg.bollinger_band_color),
                (&bands.middle, cfg.bollinger_middle_color),
                (&bands.lower, cfg.bollinger_band_color),
            ] {
                self.polyline(
                    surface,
                    &layout,
                    &scale,
                    series.values(),
                    count,
                    cfg.bollinger_line_width,
                    color,
                );
            }
            legend.push(("BB(20,2)".to_string(), cfg.bollinger_band_color));
        }

        self.legend(surface, layout.left, &legend);

        if let Some((volume_top, volume_height)) = layout.volume {
            self.volume_panel(surface, &layout, candles, volume_top, volume_height);
        }

        self.axis_labels(surface, &layout, &scale, candles, spec);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn polyline<S: DrawingSurface>(
        &self,
        surface: &mut S,
        layout: &Layout,
        scale: &PriceScale,
        series: &[Option<f64>],
        count: usize,
        width: f32,
        color: Color,
    ) {
        let offset = count.saturating_sub(series.len());
        let mut previous: Option<Point> = None;

        for (i, value) in series.iter().take(count).enumerate() {
            let point = value
                .filter(|v| v.is_finite())
                .map(|v| Point::new(layout.x(i + offset, count), scale.y(layout, v)));

            if let (Some(from), Some(to)) = (previous, point) {
                surface.line(from, to, width, color);
            }
            previous = point;
        }
    }

    fn legend<S: DrawingSurface>(
        &self,
        surface: &mut S,
        left: f32,
        entries: &[(String, Color)],
    ) {
        let cfg = &self.config;
        let mut x = left;

        for (label, color) in entries {
            surface.line(
                Point::new(x, LEGEND_Y),
                Point::new(x + cfg.legend_swatch_width, LEGEND_Y),
                cfg.price_line_width,
                *color,
            );
            surface.text(
                label,
                Point::new(x + cfg.legend_swatch_width + 5.0, LEGEND_Y),
                cfg.label_font_size,
                TextAlign::Left,
                cfg.text_color,
            );
            x += cfg.legend_entry_width;
        }
    }

    fn volume_panel<S: DrawingSurface>(
        &self,
        surface: &mut S,
        layout: &Layout,
        candles: &[Candle],
        top: f32,
        height: f32,
    ) {
        let cfg = &self.config;
        surface.text(
            "Volume",
            Point::new(layout.left - PRICE_LABEL_GAP, top + height / 2.0),
            cfg.label_font_size,
            TextAlign::Right,
            cfg.muted_text_color,
        );

        let max_volume = candles
            .iter()
            .map(|c| c.volume)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        if max_volume <= 0.0 {
            return;
        }

        let bottom = top + height;
        for (i, candle) in candles.iter().enumerate() {
            if !candle.volume.is_finite() || candle.volume <= 0.0 {
                continue;
            }
            let bar_height = (candle.volume / max_volume) as f32 * height;
            let x = layout.x(i, candles.len());
            surface.fill_rect(
                x - cfg.volume_bar_width / 2.0,
                bottom - bar_height,
                cfg.volume_bar_width,
                bar_height,
                cfg.volume_color,
            );
        }
    }

    fn axis_labels<S: DrawingSurface>(
        &self,
        surface: &mut S,
        layout: &Layout,
        scale: &PriceScale,
        candles: &[Candle],
        spec: &ChartSpec,
    ) {
        let cfg = &self.config;
        let label_x = layout.left - PRICE_LABEL_GAP;

        for (value, y) in [
            (scale.max, layout.top),
            (scale.min, layout.bottom()),
        ] {
            surface.text(
                &axis_price(value),
                Point::new(label_x, y),
                cfg.label_font_size,
                TextAlign::Right,
                cfg.text_color,
            );
        }

        let count = candles.len();
        let mut indices = vec![0, count / 2, count - 1];
        indices.dedup();

        let y = layout.content_bottom() + TIME_LABEL_OFFSET;
        for index in indices {
            let label = candles[index]
                .timestamp
                .format(spec.timeframe.label_format())
                .to_string();
            surface.text(
                &label,
                Point::new(layout.x(index, count), y),
                cfg.label_font_size,
                TextAlign::Center,
                cfg.text_color,
            );
        }
    }
}
