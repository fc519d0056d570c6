//! Server builder

use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

use super::router::build_router;
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::jwks::KeySource;
use crate::core::service::{AssociationService, DataService};
use crate::core::token::{JwtVerifier, TokenVerifier};
use crate::entities::actor::Actor;
use crate::entities::movie::Movie;

type StoreHandles = (
    Arc<dyn DataService<Movie>>,
    Arc<dyn DataService<Actor>>,
    Arc<dyn AssociationService>,
);

/// Builder for the casting HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_verifier(JwtVerifier::new(keys, issuer, audience))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    stores: Option<StoreHandles>,
    verifier: Option<Arc<dyn TokenVerifier>>,
    login_url: Option<Url>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the verifier and login redirect from configuration
    ///
    /// Keys are fetched from the authority's JWKS endpoint and cached for
    /// `auth.jwks_ttl_secs`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let auth = &config.auth;
        let keys = KeySource::remote(auth.jwks_url()?, auth.jwks_ttl());
        let verifier = JwtVerifier::new(keys, auth.issuer(), auth.audience.clone())
            .with_algorithms(auth.algorithms.clone());

        Ok(Self::new()
            .with_verifier(verifier)
            .with_login_url(auth.authorize_url()?))
    }

    /// Set the store backing every service
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: DataService<Movie> + DataService<Actor> + AssociationService + 'static,
    {
        let store = Arc::new(store);
        self.stores = Some((store.clone(), store.clone(), store));
        self
    }

    /// Set the bearer token verifier
    pub fn with_verifier(self, verifier: impl TokenVerifier + 'static) -> Self {
        self.with_shared_verifier(Arc::new(verifier))
    }

    /// Set an already shared bearer token verifier
    pub fn with_shared_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Enable the `GET /` login redirect
    pub fn with_login_url(mut self, url: Url) -> Self {
        self.login_url = Some(url);
        self
    }

    /// Build the application state
    pub fn build_state(self) -> Result<AppState> {
        let (movies, actors, associations) = self
            .stores
            .ok_or_else(|| anyhow!("A store is required. Call .with_store()"))?;
        let verifier = self
            .verifier
            .ok_or_else(|| anyhow!("A token verifier is required. Call .with_verifier()"))?;

        Ok(AppState {
            movies,
            actors,
            associations,
            verifier,
            login_url: self.login_url.map(Arc::new),
        })
    }

    /// Build the router with all routes
    pub fn build(self) -> Result<Router> {
        Ok(build_router(self.build_state()?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::from_config(&config)?
    ///     .with_store(InMemoryStore::new())
    ///     .serve("0.0.0.0:8080")
    ///     .await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
