/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color(0x00, 0x00, 0x00);

    /// `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Color {
        Color((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Canvas geometry and palette for price charts. Built once and shared by
/// every render call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Canvas height when the volume panel is requested.
    pub height_with_volume: u32,
    pub margins: Margins,
    pub volume_panel_height: f32,
    pub panel_gap: f32,
    /// Fraction of the price range added above the max and below the min.
    pub price_padding: f64,

    pub background: Color,
    pub title_color: Color,
    pub text_color: Color,
    pub muted_text_color: Color,
    pub title_font_size: f32,
    pub label_font_size: f32,

    pub price_color: Color,
    pub price_line_width: f32,
    pub overlay_line_width: f32,
    /// Fixed colours for the standard moving-average periods.
    pub moving_average_colors: Vec<(usize, Color)>,
    /// Used, in order, for periods without a fixed colour.
    pub fallback_colors: Vec<Color>,
    pub bollinger_band_color: Color,
    pub bollinger_middle_color: Color,
    pub bollinger_line_width: f32,
    pub volume_color: Color,
    pub volume_bar_width: f32,

    pub legend_entry_width: f32,
    pub legend_swatch_width: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            height_with_volume: 500,
            margins: Margins {
                top: 50.0,
                right: 50.0,
                bottom: 40.0,
                left: 100.0,
            },
            volume_panel_height: 60.0,
            panel_gap: 10.0,
            price_padding: 0.05,

            background: Color::WHITE,
            title_color: Color::BLACK,
            text_color: Color::hex(0x333333),
            muted_text_color: Color::hex(0x666666),
            title_font_size: 16.0,
            label_font_size: 12.0,

            price_color: Color::hex(0x4CAF50),
            price_line_width: 2.0,
            overlay_line_width: 1.5,
            moving_average_colors: vec![
                (7, Color::hex(0xFF6B6B)),
                (20, Color::hex(0xFF9800)),
                (50, Color::hex(0x2196F3)),
            ],
            fallback_colors: vec![
                Color::hex(0x009688),
                Color::hex(0x795548),
                Color::hex(0x607D8B),
            ],
            bollinger_band_color: Color::hex(0x9C27B0),
            bollinger_middle_color: Color::hex(0x7B1FA2),
            bollinger_line_width: 1.0,
            volume_color: Color::hex(0xE0E0E0),
            volume_bar_width: 2.0,

            legend_entry_width: 80.0,
            legend_swatch_width: 20.0,
        }
    }
}

impl ChartConfig {
    /// Colour for the `index`-th moving average of `period` on a chart.
    pub fn moving_average_color(&self, period: usize, index: usize) -> Color {
        self.moving_average_colors
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, color)| *color)
            .or_else(|| {
                (!self.fallback_colors.is_empty())
                    .then(|| self.fallback_colors[index % self.fallback_colors.len()])
            })
            .unwrap_or(self.price_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(Color::hex(0x4CAF50), Color(0x4C, 0xAF, 0x50));
    }

    #[test]
    fn test_standard_periods_have_fixed_colors() {
        let config = ChartConfig::default();
        assert_eq!(config.moving_average_color(7, 5), Color::hex(0xFF6B6B));
        assert_eq!(config.moving_average_color(50, 0), Color::hex(0x2196F3));
        assert_eq!(config.moving_average_color(100, 1), Color::hex(0x795548));
    }
}
