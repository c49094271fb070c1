//! UUID-backed identifier newtypes shared by every bounded context.
//!
//! Each context declares its identifiers with [`uuid_identifier!`] so that a
//! `TaskId` can never be passed where a `WorkerId` is expected, while all of
//! them share the same construction, parsing, and display behaviour.

/// Declares a `Copy` newtype around [`uuid::Uuid`].
///
/// The generated type serialises transparently, parses from the hyphenated
/// UUID form, and displays as the bare UUID.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<uuid::Uuid> for $name {
            fn as_ref(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(value.trim()).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use uuid_identifier;

/// Trims `raw` and checks it holds between 1 and `max_chars` characters.
///
/// Returns the trimmed value, or the error produced by `empty` / `too_long`.
pub(crate) fn bounded_text<E>(
    raw: &str,
    max_chars: usize,
    empty: impl FnOnce() -> E,
    too_long: impl FnOnce(usize) -> E,
) -> Result<String, E> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }
    let length = trimmed.chars().count();
    if length > max_chars {
        return Err(too_long(length));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::bounded_text;

    uuid_identifier!(
        /// Identifier used only by these tests.
        SampleId
    );

    #[test]
    fn identifiers_round_trip_through_their_string_form() {
        let id = SampleId::new();
        let parsed: SampleId = id.to_string().parse().expect("valid uuid");
        assert_eq!(parsed, id);
    }

    #[test]
    fn identifiers_reject_garbage() {
        assert!("not-a-uuid".parse::<SampleId>().is_err());
    }

    #[test]
    fn bounded_text_trims_and_checks_length() {
        let ok: Result<String, &str> = bounded_text("  Backend  ", 10, || "empty", |_| "long");
        assert_eq!(ok, Ok("Backend".to_owned()));

        let empty: Result<String, &str> = bounded_text("   ", 10, || "empty", |_| "long");
        assert_eq!(empty, Err("empty"));

        let long: Result<String, usize> = bounded_text("abcdef", 3, || 0, |n| n);
        assert_eq!(long, Err(6));
    }
}
