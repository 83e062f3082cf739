use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api::AppState;
use common::{Config, DataSource, PriceDataGateway, UniverseFileConfig, UniverseRegistry};
use engine::{InstrumentMaster, ScanSettings, Scanner, UpstoxClient};
use offline::OfflineGateway;
use strategy::{StrategyFileConfig, StrategyRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(data_source = %cfg.data_source, port = cfg.port, "Screener starting");

    // ── Registries ────────────────────────────────────────────────────────────
    let strategies = if Path::new(&cfg.strategy_config_path).exists() {
        let file = StrategyFileConfig::load(&cfg.strategy_config_path)?;
        StrategyRegistry::from_config(&file)?
    } else {
        info!(path = %cfg.strategy_config_path, "No strategy config file, using defaults");
        StrategyRegistry::with_defaults()?
    };

    let universe_file = UniverseFileConfig::load(&cfg.universe_config_path)?;
    let universes = UniverseRegistry::from_config(&universe_file)?;
    if universes.is_empty() {
        warn!(path = %cfg.universe_config_path, "No universes configured");
    }

    // ── Price gateway (injected based on DATA_SOURCE) ─────────────────────────
    let gateway: Arc<dyn PriceDataGateway> = match cfg.data_source {
        DataSource::Upstox => {
            let token = cfg
                .upstox_access_token
                .clone()
                .context("UPSTOX_ACCESS_TOKEN is required for the upstox data source")?;
            let csv_path = cfg
                .instruments_csv_path
                .as_deref()
                .context("INSTRUMENTS_CSV is required for the upstox data source")?;
            let instruments = InstrumentMaster::from_path(csv_path)?;
            info!("Upstox data source, using UpstoxClient");
            Arc::new(UpstoxClient::new(token, instruments)?)
        }
        DataSource::Offline => {
            info!(dir = %cfg.offline_data_dir, "Offline data source, using OfflineGateway");
            Arc::new(OfflineGateway::from_dir(&cfg.offline_data_dir)?)
        }
    };

    // ── Scanner ───────────────────────────────────────────────────────────────
    let settings = ScanSettings::from_config(&cfg);
    info!(
        strategies = strategies.len(),
        universes = universes.len(),
        workers = settings.max_workers,
        stagger_ms = settings.submit_stagger.as_millis() as u64,
        timeout_ms = settings.fetch_timeout.as_millis() as u64,
        "Scanner ready"
    );
    let scanner = Scanner::new(
        Arc::new(strategies),
        Arc::new(universes),
        gateway,
        settings,
    );

    // ── HTTP API ──────────────────────────────────────────────────────────────
    let state = AppState {
        scanner: Arc::new(scanner),
    };
    api::serve(state, cfg.port)
        .await
        .with_context(|| format!("API server on port {} failed", cfg.port))?;

    Ok(())
}
