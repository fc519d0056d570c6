//! Movie/actor association management
//!
//! Link and unlink requests run in two phases. The first resolves the request
//! against the store (parent must exist, unknown targets are dropped, pairs are
//! computed). The second commits the computed batch in one atomic store call.

use std::collections::BTreeSet;

use crate::core::error::ApiError;
use crate::core::link::{Association, Side};
use crate::core::service::{AssociationService, DataService};
use crate::entities::actor::{Actor, ActorView};
use crate::entities::movie::{Movie, MovieView};

/// Builds views and applies association batches
///
/// Borrowed from the application state for the duration of one request.
#[derive(Clone, Copy)]
pub struct AssociationManager<'a> {
    movies: &'a dyn DataService<Movie>,
    actors: &'a dyn DataService<Actor>,
    associations: &'a dyn AssociationService,
}

impl<'a> AssociationManager<'a> {
    pub fn new(
        movies: &'a dyn DataService<Movie>,
        actors: &'a dyn DataService<Actor>,
        associations: &'a dyn AssociationService,
    ) -> Self {
        Self {
            movies,
            actors,
            associations,
        }
    }

    /// Associate the `side` record `parent_id` with every existing target in `ids`
    ///
    /// Returns the number of newly created associations.
    #[tracing::instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn link(&self, side: Side, parent_id: i64, ids: &[i64]) -> Result<usize, ApiError> {
        self.require(side, parent_id).await?;

        let requested: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let targets = self.existing(side.other(), &requested).await?;
        let pairs: Vec<Association> = targets
            .into_iter()
            .map(|target| Association::between(side, parent_id, target))
            .collect();

        let created = self.associations.link_all(&pairs).await?;
        tracing::debug!(resolved = pairs.len(), created, "linked");
        Ok(created)
    }

    /// Remove the associations between `parent_id` and any id in `ids`
    ///
    /// Ids that are not associated with the parent are ignored. Returns the
    /// number of removed associations.
    #[tracing::instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn unlink(&self, side: Side, parent_id: i64, ids: &[i64]) -> Result<usize, ApiError> {
        self.require(side, parent_id).await?;

        let requested: BTreeSet<i64> = ids.iter().copied().collect();
        let pairs: Vec<Association> = self
            .associations_of(side, parent_id)
            .await?
            .into_iter()
            .filter(|assoc| requested.contains(&assoc.id_on(side.other())))
            .collect();

        let removed = self.associations.unlink_all(&pairs).await?;
        tracing::debug!(matched = pairs.len(), removed, "unlinked");
        Ok(removed)
    }

    /// Movie view by id
    pub async fn movie_view(&self, id: i64) -> Result<MovieView, ApiError> {
        let movie = self.movies.get(id).await?.ok_or(ApiError::NotFound {
            entity_type: "movie",
            id,
        })?;
        self.expand_movie(movie).await
    }

    /// Actor view by id
    pub async fn actor_view(&self, id: i64) -> Result<ActorView, ApiError> {
        let actor = self.actors.get(id).await?.ok_or(ApiError::NotFound {
            entity_type: "actor",
            id,
        })?;
        self.expand_actor(actor).await
    }

    /// Expand the actors of a movie
    pub async fn expand_movie(&self, movie: Movie) -> Result<MovieView, ApiError> {
        let actor_ids: Vec<i64> = self
            .associations
            .find_by_movie(movie.id)
            .await?
            .iter()
            .map(|assoc| assoc.actor_id)
            .collect();
        let actors = self.actors.get_many(&actor_ids).await?;
        Ok(MovieView { movie, actors })
    }

    /// Expand the movies of an actor
    pub async fn expand_actor(&self, actor: Actor) -> Result<ActorView, ApiError> {
        let movie_ids: Vec<i64> = self
            .associations
            .find_by_actor(actor.id)
            .await?
            .iter()
            .map(|assoc| assoc.movie_id)
            .collect();
        let movies = self.movies.get_many(&movie_ids).await?;
        Ok(ActorView { actor, movies })
    }

    async fn require(&self, side: Side, id: i64) -> Result<(), ApiError> {
        let found = match side {
            Side::Movie => self.movies.get(id).await?.is_some(),
            Side::Actor => self.actors.get(id).await?.is_some(),
        };
        if found {
            Ok(())
        } else {
            Err(ApiError::NotFound {
                entity_type: side.entity_type(),
                id,
            })
        }
    }

    async fn existing(&self, side: Side, ids: &[i64]) -> Result<Vec<i64>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = match side {
            Side::Movie => self.movies.get_many(ids).await?.iter().map(|m| m.id).collect(),
            Side::Actor => self.actors.get_many(ids).await?.iter().map(|a| a.id).collect(),
        };
        Ok(ids)
    }

    async fn associations_of(&self, side: Side, id: i64) -> Result<Vec<Association>, ApiError> {
        let found = match side {
            Side::Movie => self.associations.find_by_movie(id).await?,
            Side::Actor => self.associations.find_by_actor(id).await?,
        };
        Ok(found)
    }
}
