//! Entity trait shared by movies and actors

/// Base trait for stored records.
///
/// All entities have:
/// - id: server-assigned integer, unique per entity type
/// - a draft type carrying every other field, used on create
///
/// Stores assign the id and build the record with [`Entity::from_draft`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Fields of a record that has not been stored yet
    type Draft: Send + Sync + 'static;

    /// The plural resource name used in URLs and envelopes (e.g., "movies")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "movie")
    fn resource_name_singular() -> &'static str;

    /// Get the identifier of this record
    fn id(&self) -> i64;

    /// Build a record from its draft once the store picked an id
    fn from_draft(id: i64, draft: Self::Draft) -> Self;
}
