//! Movie records and payloads

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::core::error::ApiError;
use crate::core::field::Field;
use crate::core::validation::{Payload, Require};
use crate::entities::actor::Actor;
use crate::impl_entity;

/// Accepted input format for release dates
pub const RELEASE_DATE_FORMAT: &str = "%d.%m.%Y";

static RELEASE_DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid release date pattern"));

/// A stored movie
///
/// Serializes as the movie summary: `{id, title, release_date}` with the
/// date in ISO-8601 (`YYYY-MM-DD`) or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
}

/// Movie fields before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewMovie {
    #[validate(length(min = 1, max = 80, message = "title must be 1 to 80 characters"))]
    pub title: String,
    pub release_date: Option<NaiveDate>,
}

impl_entity!(Movie, NewMovie, "movie", "movies", { title, release_date });

/// Movie with its actors expanded one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieView {
    #[serde(flatten)]
    pub movie: Movie,
    pub actors: Vec<Actor>,
}

/// Parse a `DD.MM.YYYY` release date
///
/// Anything else, including unpadded day or month, is rejected.
pub fn parse_release_date(input: &str) -> Result<NaiveDate, ApiError> {
    let invalid = || {
        ApiError::unprocessable(format!(
            "release_date '{}' is not a valid DD.MM.YYYY date",
            input
        ))
    };

    if !RELEASE_DATE_SHAPE.is_match(input) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(input, RELEASE_DATE_FORMAT).map_err(|_| invalid())
}

/// `POST /movies` body
#[derive(Debug, Clone, Deserialize)]
pub struct MovieCreate {
    pub title: String,
    pub release_date: Option<String>,
}

impl Payload for MovieCreate {
    const FIELDS: &'static [&'static str] = &["title", "release_date"];
    const REQUIRE: Require = Require::All;
}

impl MovieCreate {
    /// Parse and check the fields
    pub fn into_draft(self) -> Result<NewMovie, ApiError> {
        let draft = NewMovie {
            title: self.title,
            release_date: self.release_date.as_deref().map(parse_release_date).transpose()?,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// `PATCH /movies/{id}` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub release_date: Field<String>,
}

impl Payload for MoviePatch {
    const FIELDS: &'static [&'static str] = &["title", "release_date"];
    const REQUIRE: Require = Require::Any;
}

impl MoviePatch {
    /// Overwrite the supplied fields of `movie`
    pub fn apply(self, movie: Movie) -> Result<Movie, ApiError> {
        let title = self
            .title
            .apply_required(movie.title)
            .map_err(|_| ApiError::unprocessable("title must not be null"))?;

        let release_date = match self.release_date {
            Field::Absent => movie.release_date,
            Field::Null => None,
            Field::Value(input) => Some(parse_release_date(&input)?),
        };

        let draft = NewMovie {
            title,
            release_date,
        };
        draft.validate()?;

        Ok(Movie {
            id: movie.id,
            title: draft.title,
            release_date: draft.release_date,
        })
    }
}
