//! Application state shared across handlers

use axum::extract::FromRef;
use std::sync::Arc;
use url::Url;

use crate::core::service::{AssociationService, DataService};
use crate::core::token::TokenVerifier;
use crate::entities::actor::Actor;
use crate::entities::movie::Movie;
use crate::links::manager::AssociationManager;

/// Handles to the store and the token verifier
///
/// The three service handles usually point at the same store object, so that
/// deletes and association batches share one consistency domain.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn DataService<Movie>>,
    pub actors: Arc<dyn DataService<Actor>>,
    pub associations: Arc<dyn AssociationService>,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Authority login page `GET /` redirects to; unset disables the redirect
    pub login_url: Option<Arc<Url>>,
}

impl AppState {
    /// Build the state from one store implementing every service
    pub fn new<S>(store: Arc<S>, verifier: Arc<dyn TokenVerifier>) -> Self
    where
        S: DataService<Movie> + DataService<Actor> + AssociationService + 'static,
    {
        Self {
            movies: store.clone(),
            actors: store.clone(),
            associations: store,
            verifier,
            login_url: None,
        }
    }

    pub fn with_login_url(mut self, url: Url) -> Self {
        self.login_url = Some(Arc::new(url));
        self
    }

    /// Association manager over this state's services
    pub fn manager(&self) -> AssociationManager<'_> {
        AssociationManager::new(
            self.movies.as_ref(),
            self.actors.as_ref(),
            self.associations.as_ref(),
        )
    }
}

impl FromRef<AppState> for Arc<dyn TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
