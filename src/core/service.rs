//! Service traits for entity and association storage

use crate::core::{entity::Entity, link::Association};
use anyhow::Result;
use async_trait::async_trait;

/// Service trait for managing one entity type
///
/// Implementations assign ids and own referential integrity: deleting a record
/// also removes every association that references it, in the same operation.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Store a new record and return it with its assigned id
    async fn create(&self, draft: T::Draft) -> Result<T>;

    /// Get a record by id
    async fn get(&self, id: i64) -> Result<Option<T>>;

    /// Get the records among `ids` that exist, ordered by id
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<T>>;

    /// List all records, ordered by id
    async fn list(&self) -> Result<Vec<T>>;

    /// Overwrite a stored record; `None` if it no longer exists
    async fn update(&self, entity: T) -> Result<Option<T>>;

    /// Delete a record and its associations; `false` if it did not exist
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Service trait for the movie/actor association set
///
/// Batch operations are atomic: every pair of the batch is applied, or none.
#[async_trait]
pub trait AssociationService: Send + Sync {
    /// Associations of a movie, ordered by actor id
    async fn find_by_movie(&self, movie_id: i64) -> Result<Vec<Association>>;

    /// Associations of an actor, ordered by movie id
    async fn find_by_actor(&self, actor_id: i64) -> Result<Vec<Association>>;

    /// Insert the pairs that are not stored yet
    ///
    /// Pairs already present are kept as they are. Pairs whose movie or actor
    /// no longer exists are skipped. Returns the number of inserted pairs.
    async fn link_all(&self, pairs: &[Association]) -> Result<usize>;

    /// Remove the given pairs; returns the number actually removed
    async fn unlink_all(&self, pairs: &[Association]) -> Result<usize>;
}
