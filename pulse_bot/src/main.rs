mod bot;
mod coins;
mod config;
mod dependencies;
mod news;
mod roles;
mod services;
mod technical;
mod utils;
mod welcome;

use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use crate::{config::Config, dependencies::BotDependencies};

const RESTART_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    info!("🚀 Starting pulse_bot...");

    let config = Config::from_env()?;
    let bot_deps = BotDependencies::new(config)?;

    loop {
        match bot::start(bot_deps.clone()).await {
            Ok(()) => {
                info!("👋 Gateway client stopped");
                return Ok(());
            }
            Err(e) => {
                error!(
                    "❌ Gateway client exited: {:#}. Restarting in {}s",
                    e,
                    RESTART_DELAY.as_secs()
                );
                tokio::time::sleep(RESTART_DELAY).await;
            }
        }
    }
}
