use anyhow::Result;
use casting::config::AppConfig;
use casting::server::ServerBuilder;
use casting::storage::InMemoryStore;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let path = std::env::var_os("CASTING_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(path.as_deref())?;

    info!(
        domain = %config.auth.domain,
        audience = %config.auth.audience,
        "Starting casting API"
    );

    let builder = ServerBuilder::from_config(&config)?;
    let builder = match config.database_url.as_deref() {
        #[cfg(feature = "postgres")]
        Some(url) => {
            let store = casting::storage::PostgresStore::connect(url).await?;
            store.ensure_schema().await?;
            info!("Using PostgreSQL store");
            builder.with_store(store)
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; using the in-memory store");
            builder.with_store(InMemoryStore::new())
        }
        None => {
            info!("Using in-memory store");
            builder.with_store(InMemoryStore::new())
        }
    };

    builder.serve(&config.bind_address).await
}
