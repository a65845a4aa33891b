use smartmove::prediction::assembler::PredictionAssembler;
use smartmove::state::AppState;
use smartmove::weather::cache::WeatherCache;
use smartmove::weather::source::{CachedWeather, OpenMeteoSource};
use smartmove::{api, config};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

fn init_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "smartmove starting"
    );

    let weather = build_weather(&config);
    let assembler = PredictionAssembler::new(config.peak_hours());
    tracing::info!(
        windows = ?assembler.peak_hours().windows(),
        "Peak hour windows loaded"
    );

    let state = Arc::new(RwLock::new(AppState::new(assembler, weather)));

    let app = api::router(Arc::clone(&state));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Cached Open-Meteo lookups, or `None` when weather is switched off.
fn build_weather(config: &config::Config) -> Option<CachedWeather> {
    if !config.weather_enabled() {
        tracing::warn!("Weather lookups disabled; advisories will rely on supplied weather");
        return None;
    }

    let source = OpenMeteoSource::new(config.weather_endpoint().to_string(), config.weather_timeout());
    let cache = WeatherCache::new(config.cache_ttl(), config.cache_max_entries());
    tracing::info!(
        endpoint = config.weather_endpoint(),
        ttl_secs = config.cache_ttl().as_secs(),
        max_entries = ?config.cache_max_entries(),
        "Weather source configured"
    );
    Some(CachedWeather::new(Arc::new(cache), Arc::new(source)))
}
