use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vibefeed_api::api::{create_router, AppState};
use vibefeed_api::config::Config;
use vibefeed_api::services::catalog::Catalog;
use vibefeed_api::services::enrichment::{ExplanationEnricher, HttpEnricher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vibefeed_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    tracing::info!(titles = catalog.len(), "Catalog ready");

    let enricher: Option<Arc<dyn ExplanationEnricher>> = match config.enrichment_endpoint() {
        Some(base_url) => {
            let enricher = HttpEnricher::new(&base_url, config.enrichment_timeout())?;
            tracing::info!(
                endpoint = %enricher.endpoint(),
                timeout_ms = config.enrichment_timeout().as_millis() as u64,
                "Why-tags enrichment enabled"
            );
            Some(Arc::new(enricher) as Arc<dyn ExplanationEnricher>)
        }
        None => {
            tracing::info!("Why-tags enrichment disabled");
            None
        }
    };

    let state = AppState::new(catalog, enricher, &config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "VibeFeed API listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
