//! Multi-tenant chatbot builder API server

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use chatbot_studio_api::infrastructure::config::AppConfig;
use chatbot_studio_api::infrastructure::database::DatabaseConnection;
use chatbot_studio_api::{app, services};
use di_axum::RouterServiceProviderExtensions;
use log::{info, warn};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let provider = services()
        .build_provider()
        .context("invalid service registrations")?;

    let config = provider.get_required::<AppConfig>();
    provider
        .get_required::<DatabaseConnection>()
        .migrate()
        .await
        .context("failed to run database migrations")?;

    let app = app()
        .layer(cors(&config))
        .layer(TraceLayer::new_for_http())
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_address))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    info!("Shutting down...");

    Ok(())
}

fn cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
