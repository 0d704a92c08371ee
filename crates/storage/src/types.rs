//! Identifier newtypes shared by the record and session stores.

/// Macro to define a newtype wrapper around `i64` with standard trait
/// implementations.
///
/// Each generated type:
/// - Is a transparent wrapper around `i64` (zero runtime cost)
/// - Derives `Copy`, `Clone`, `Debug`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Derives `Serialize` and `Deserialize` (transparent)
/// - Implements `From<i64>` and `Into<i64>`
/// - Implements `Display` that outputs the inner value
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Primary key of a persisted [`ResourceRecord`](crate::ResourceRecord).
    ///
    /// Sent to the repository as the usage's resource id.
    ///
    /// # Examples
    ///
    /// ```
    /// use edusharing_storage::RecordId;
    ///
    /// let id = RecordId::from(3);
    /// assert_eq!(id.to_string(), "3");
    /// ```
    RecordId
);

define_id!(
    /// Course that owns a resource record.
    ///
    /// Sent to the repository as the usage's container id.
    CourseId
);

define_id!(
    /// Host user id; keys the per-session ticket cache.
    UserId
);
