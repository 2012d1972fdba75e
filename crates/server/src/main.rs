mod bootstrap;
mod keep_alive;

use anyhow::Result;
use formbot_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use formbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations. A
    // missing BOT_TOKEN fails here and exits the process nonzero.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap(config);

    if app.config.keep_alive.enabled {
        keep_alive::spawn(&app.config.keep_alive.bind_address, app.config.keep_alive.port).await;
    }

    tracing::info!(
        event_name = "system.server.started",
        prefix = %app.config.discord.prefix,
        store_path = %app.config.store.path.display(),
        "formbot-server started"
    );

    app.runner.start().await?;

    wait_for_shutdown().await?;
    tracing::info!(event_name = "system.server.stopping", "formbot-server stopping");

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
