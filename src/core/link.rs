//! Movie/actor association

use serde::{Deserialize, Serialize};

/// The end of an association a request starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Movie,
    Actor,
}

impl Side {
    /// The opposite end
    pub fn other(self) -> Side {
        match self {
            Side::Movie => Side::Actor,
            Side::Actor => Side::Movie,
        }
    }

    /// Entity type name of this end
    pub fn entity_type(self) -> &'static str {
        match self {
            Side::Movie => "movie",
            Side::Actor => "actor",
        }
    }
}

/// One (movie, actor) pair
///
/// The pair is the identity: a store holds each pair at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Association {
    pub movie_id: i64,
    pub actor_id: i64,
}

impl Association {
    pub fn new(movie_id: i64, actor_id: i64) -> Self {
        Self { movie_id, actor_id }
    }

    /// Build the pair from a parent on `side` and a target on the other side
    pub fn between(side: Side, parent_id: i64, target_id: i64) -> Self {
        match side {
            Side::Movie => Self::new(parent_id, target_id),
            Side::Actor => Self::new(target_id, parent_id),
        }
    }

    /// Id of the `side` end
    pub fn id_on(&self, side: Side) -> i64 {
        match side {
            Side::Movie => self.movie_id,
            Side::Actor => self.actor_id,
        }
    }

    /// Whether the `side` end is `id`
    pub fn involves(&self, side: Side, id: i64) -> bool {
        self.id_on(side) == id
    }
}
