//! Macros for reducing boilerplate when defining entities

/// Implement [`Entity`](crate::core::entity::Entity) for a record type
///
/// The record must have an `id: i64` field, and the draft type must carry
/// every other field under the same name.
///
/// # Example
/// ```rust,ignore
/// impl_entity!(Movie, NewMovie, "movie", "movies", { title, release_date });
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $draft:ident, $singular:literal, $plural:literal, { $($field:ident),* $(,)? }) => {
        impl $crate::core::entity::Entity for $type {
            type Draft = $draft;

            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> i64 {
                self.id
            }

            fn from_draft(id: i64, draft: Self::Draft) -> Self {
                Self {
                    id,
                    $($field: draft.$field,)*
                }
            }
        }
    };
}
