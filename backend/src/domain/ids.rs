//! Strongly typed identifiers for users and catalogue rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier was not a valid UUID.
    #[error("identifier must be a valid UUID")]
    Invalid,
}

fn parse_uuid(raw: &str) -> Result<Uuid, IdValidationError> {
    if raw.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdValidationError::Invalid);
    }
    Uuid::parse_str(raw).map_err(|_| IdValidationError::Invalid)
}

/// Stable user identifier issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Errors
    ///
    /// Returns [`IdValidationError`] when the input is blank or not a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, IdValidationError> {
        let parsed = parse_uuid(&id)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = IdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

macro_rules! define_row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from its hyphenated string form.
            ///
            /// # Errors
            ///
            /// Returns [`IdValidationError`] when the input is blank or not a UUID.
            pub fn parse(raw: &str) -> Result<Self, IdValidationError> {
                parse_uuid(raw).map(Self)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_row_id! {
    /// Identifier of a row in the `distilleries` table.
    DistilleryId
}

define_row_id! {
    /// Identifier of a row in the `bottles` table.
    BottleId
}

define_row_id! {
    /// Identifier of a row in the `user_visits` table.
    VisitId
}

define_row_id! {
    /// Identifier of a row in the `regions` table.
    RegionId
}

#[cfg(test)]
mod tests {
    //! Regression coverage for identifier parsing.
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "11111111-1111-1111-1111-111111111111";

    #[rstest]
    fn user_id_preserves_raw_form() {
        let id = UserId::new(SAMPLE).expect("valid uuid");
        assert_eq!(id.as_ref(), SAMPLE);
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[rstest]
    #[case::empty("", IdValidationError::Empty)]
    #[case::padded(" 11111111-1111-1111-1111-111111111111", IdValidationError::Invalid)]
    #[case::garbage("not-a-uuid", IdValidationError::Invalid)]
    fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: IdValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn row_ids_serialise_as_plain_strings() {
        let id = BottleId::parse(SAMPLE).expect("valid uuid");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, format!("\"{SAMPLE}\""));

        let back: BottleId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }

    #[rstest]
    fn user_id_deserialisation_validates() {
        let result: Result<UserId, _> = serde_json::from_str("\"nope\"");
        assert!(result.is_err());
    }
}
