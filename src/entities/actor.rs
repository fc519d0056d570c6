//! Actor records and payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::ApiError;
use crate::core::field::Field;
use crate::core::validation::{Payload, Require};
use crate::entities::movie::Movie;
use crate::impl_entity;

/// A stored actor; serializes as the actor summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: Option<String>,
}

/// Actor fields before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewActor {
    #[validate(length(min = 1, max = 30, message = "name must be 1 to 30 characters"))]
    pub name: String,
    pub age: i32,
    #[validate(length(max = 10, message = "gender must be at most 10 characters"))]
    pub gender: Option<String>,
}

impl_entity!(Actor, NewActor, "actor", "actors", { name, age, gender });

/// Actor with their movies expanded one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorView {
    #[serde(flatten)]
    pub actor: Actor,
    pub movies: Vec<Movie>,
}

/// `POST /actors` body
#[derive(Debug, Clone, Deserialize)]
pub struct ActorCreate {
    pub name: String,
    pub age: i32,
    pub gender: Option<String>,
}

impl Payload for ActorCreate {
    const FIELDS: &'static [&'static str] = &["name", "age", "gender"];
    const REQUIRE: Require = Require::All;
}

impl ActorCreate {
    pub fn into_draft(self) -> Result<NewActor, ApiError> {
        let draft = NewActor {
            name: self.name,
            age: self.age,
            gender: self.gender,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// `PATCH /actors/{id}` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorPatch {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub age: Field<i32>,
    #[serde(default)]
    pub gender: Field<String>,
}

impl Payload for ActorPatch {
    const FIELDS: &'static [&'static str] = &["name", "age", "gender"];
    const REQUIRE: Require = Require::Any;
}

impl ActorPatch {
    /// Overwrite the supplied fields of `actor`
    pub fn apply(self, actor: Actor) -> Result<Actor, ApiError> {
        let draft = NewActor {
            name: self
                .name
                .apply_required(actor.name)
                .map_err(|_| ApiError::unprocessable("name must not be null"))?,
            age: self
                .age
                .apply_required(actor.age)
                .map_err(|_| ApiError::unprocessable("age must not be null"))?,
            gender: self.gender.apply_nullable(actor.gender),
        };
        draft.validate()?;

        Ok(Actor {
            id: actor.id,
            name: draft.name,
            age: draft.age,
            gender: draft.gender,
        })
    }
}
