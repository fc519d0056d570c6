//! In-memory implementation of the casting store for testing and development

use crate::core::entity::Entity;
use crate::core::link::{Association, Side};
use crate::core::service::{AssociationService, DataService};
use crate::entities::actor::Actor;
use crate::entities::movie::Movie;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    movies: BTreeMap<i64, Movie>,
    actors: BTreeMap<i64, Actor>,
    associations: BTreeSet<Association>,
    last_movie_id: i64,
    last_actor_id: i64,
}

impl Tables {
    fn contains(&self, assoc: &Association) -> bool {
        self.movies.contains_key(&assoc.movie_id) && self.actors.contains_key(&assoc.actor_id)
    }
}

/// In-memory store for movies, actors and their associations
///
/// All tables sit behind one lock, so every operation (a cascade or a whole
/// association batch included) is applied under a single write guard. Ids
/// start at 1 and are never reused.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }
}

/// Implement `DataService` for the table holding one entity type
macro_rules! impl_table_service {
    ($type:ty, $rows:ident, $last_id:ident, $side:expr) => {
        #[async_trait]
        impl DataService<$type> for InMemoryStore {
            async fn create(&self, draft: <$type as Entity>::Draft) -> Result<$type> {
                let mut tables = self.write()?;

                tables.$last_id += 1;
                let entity = <$type>::from_draft(tables.$last_id, draft);

                tables.$rows.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn get(&self, id: i64) -> Result<Option<$type>> {
                let tables = self.read()?;
                Ok(tables.$rows.get(&id).cloned())
            }

            async fn get_many(&self, ids: &[i64]) -> Result<Vec<$type>> {
                let tables = self.read()?;
                let ids: BTreeSet<i64> = ids.iter().copied().collect();

                Ok(ids
                    .iter()
                    .filter_map(|id| tables.$rows.get(id).cloned())
                    .collect())
            }

            async fn list(&self) -> Result<Vec<$type>> {
                let tables = self.read()?;
                Ok(tables.$rows.values().cloned().collect())
            }

            async fn update(&self, entity: $type) -> Result<Option<$type>> {
                let mut tables = self.write()?;

                match tables.$rows.get_mut(&entity.id) {
                    Some(stored) => {
                        *stored = entity.clone();
                        Ok(Some(entity))
                    }
                    None => Ok(None),
                }
            }

            async fn delete(&self, id: i64) -> Result<bool> {
                let mut tables = self.write()?;

                if tables.$rows.remove(&id).is_none() {
                    return Ok(false);
                }
                tables
                    .associations
                    .retain(|assoc| !assoc.involves($side, id));
                Ok(true)
            }
        }
    };
}

impl_table_service!(Movie, movies, last_movie_id, Side::Movie);
impl_table_service!(Actor, actors, last_actor_id, Side::Actor);

#[async_trait]
impl AssociationService for InMemoryStore {
    async fn find_by_movie(&self, movie_id: i64) -> Result<Vec<Association>> {
        let tables = self.read()?;
        Ok(tables
            .associations
            .range(Association::new(movie_id, i64::MIN)..=Association::new(movie_id, i64::MAX))
            .copied()
            .collect())
    }

    async fn find_by_actor(&self, actor_id: i64) -> Result<Vec<Association>> {
        let tables = self.read()?;
        Ok(tables
            .associations
            .iter()
            .filter(|assoc| assoc.involves(Side::Actor, actor_id))
            .copied()
            .collect())
    }

    async fn link_all(&self, pairs: &[Association]) -> Result<usize> {
        let mut tables = self.write()?;

        let fresh: Vec<Association> = pairs
            .iter()
            .filter(|assoc| tables.contains(assoc))
            .copied()
            .collect();

        let mut created = 0;
        for assoc in fresh {
            if tables.associations.insert(assoc) {
                created += 1;
            }
        }
        Ok(created)
    }

    async fn unlink_all(&self, pairs: &[Association]) -> Result<usize> {
        let mut tables = self.write()?;

        Ok(pairs
            .iter()
            .filter(|assoc| tables.associations.remove(assoc))
            .count())
    }
}
