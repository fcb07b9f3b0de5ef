use std::sync::Arc;

use ab_glyph::FontArc;
use anyhow::Result;
use log::{info, warn};
use pulse_core::{
    analysis::TechnicalAnalysis,
    chart::{ChartConfig, ChartRenderer},
    market::Binance,
};
use reqwest::Client;

use crate::{config::Config, services::handler::Services, welcome::handler::WelcomeService};

const FALLBACK_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

#[derive(Clone)]
pub struct BotDependencies {
    pub config: Arc<Config>,
    pub services: Services,
    pub analysis: TechnicalAnalysis,
    pub welcome: WelcomeService,
}

fn load_font(config: &Config) -> Option<FontArc> {
    let configured = config.chart_font_path.iter().map(|p| p.as_path());
    let fallbacks = FALLBACK_FONT_PATHS.iter().map(std::path::Path::new);

    for path in configured.chain(fallbacks) {
        match ChartRenderer::load_font(path) {
            Ok(font) => {
                info!("🔤 Using font {}", path.display());
                return Some(font);
            }
            Err(e) if config.chart_font_path.as_deref() == Some(path) => {
                warn!("⚠️ {}", e);
            }
            Err(_) => {}
        }
    }

    warn!("⚠️ No font found, charts and welcome cards will be drawn without text");
    None
}

impl BotDependencies {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder().gzip(true).build()?;
        let font = load_font(&config);

        let mut renderer = ChartRenderer::new(ChartConfig::default());
        if let Some(font) = font.clone() {
            renderer = renderer.with_font(font);
        }

        let background = config.welcome_background_path.as_deref().and_then(|path| {
            WelcomeService::load_background(path)
                .map_err(|e| warn!("⚠️ {:#}, using a plain background", e))
                .ok()
        });

        Ok(Self {
            services: Services::new(
                client.clone(),
                config.coingecko_api_key.clone(),
                config.cryptopanic_api_key.clone(),
            ),
            analysis: TechnicalAnalysis::new(Binance::new(client.clone()), renderer),
            welcome: WelcomeService::new(client, background, font),
            config: Arc::new(config),
        })
    }
}
