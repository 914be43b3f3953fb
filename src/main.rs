use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod api;
mod config;
mod fixtures;
mod football_data;
mod predictor;

use api::AppState;
use config::Config;
use fixtures::FixtureService;
use football_data::{FootballData, FootballDataClient, RequestBudget, StandingsCache};
use predictor::{PredictionEngine, ProfileResolver};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let credential_configured = config.has_credential();
    if !credential_configured {
        error!("FOOTBALL_DATA_KEY is not set; /api/matches and /api/competitions will fail");
    }

    let client = FootballDataClient::new(
        &config.football_data_url,
        config.football_data_key.as_deref().unwrap_or_default(),
        Duration::from_secs(config.upstream_timeout_secs),
    )?;
    let source: Arc<dyn FootballData> = Arc::new(client);

    let budget = RequestBudget::new(config.request_limit, config.rate_window(), config.call_spacing());
    budget.spawn_reset_task();
    info!(
        "Request budget: {} call(s) per {}s, spaced {}ms",
        config.request_limit, config.rate_window_secs, config.call_spacing_ms
    );

    let resolver = if config.use_standings {
        let cache = StandingsCache::new(config.standings_ttl());
        cache.spawn_purge_task();
        ProfileResolver::with_standings(source.clone(), cache, budget.clone())
    } else {
        info!("Standings lookups disabled, using the static team table");
        ProfileResolver::table_only()
    };
    let engine = PredictionEngine::new(resolver, config.model_variant, config.prediction_seed);
    info!("Prediction model: {:?}", config.model_variant);

    let fixtures = FixtureService::new(source.clone(), budget.clone(), config.fetch_mode)
        .with_range(config.range_days, config.chunk_days)
        .with_max_matches(config.max_matches);
    info!("Fetch mode: {:?}", config.fetch_mode);

    let app = api::router(AppState {
        fixtures,
        engine,
        budget,
        source,
        credential_configured,
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    info!("  GET /api/matches?date=YYYY-MM-DD");
    info!("  GET /api/status");
    info!("  GET /api/competitions");

    axum::serve(listener, app).await?;

    Ok(())
}
