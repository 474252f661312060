//! Bottle status encoding.
//!
//! A bottle carries two independent user flags, tasted and owned, which the
//! store persists as a single [`BottleStatus`] column. [`BottleStatus::encode`]
//! and [`BottleStatus::decode`] convert between the two forms and are exact
//! inverses of each other.

use serde::{Deserialize, Serialize};

/// Persisted bottle status.
///
/// # Examples
///
/// ```
/// # use distillery_backend::domain::BottleStatus;
/// let status = BottleStatus::encode(true, true);
/// assert_eq!(status, BottleStatus::OwnedAndTasted);
/// assert_eq!(status.decode(), (true, true));
/// assert_eq!(status.as_str(), "owned_and_tasted");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BottleStatus {
    /// Neither tasted nor owned.
    #[default]
    NotTasted,
    /// Tasted but not owned.
    Tasted,
    /// Owned but not tasted.
    Owned,
    /// Owned and tasted.
    OwnedAndTasted,
}

impl BottleStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::NotTasted,
        Self::Tasted,
        Self::Owned,
        Self::OwnedAndTasted,
    ];

    /// Collapse the tasted and owned flags into a status.
    pub const fn encode(tasted: bool, owned: bool) -> Self {
        match (tasted, owned) {
            (false, false) => Self::NotTasted,
            (true, false) => Self::Tasted,
            (false, true) => Self::Owned,
            (true, true) => Self::OwnedAndTasted,
        }
    }

    /// Split the status back into its `(tasted, owned)` flags.
    pub const fn decode(self) -> (bool, bool) {
        (self.is_tasted(), self.is_owned())
    }

    /// Whether the tasted flag is set.
    pub const fn is_tasted(self) -> bool {
        matches!(self, Self::Tasted | Self::OwnedAndTasted)
    }

    /// Whether the owned flag is set.
    pub const fn is_owned(self) -> bool {
        matches!(self, Self::Owned | Self::OwnedAndTasted)
    }

    /// Whether the bottle contributes to a distillery's tasted counter.
    ///
    /// The counter includes owned bottles as well as tasted ones.
    pub const fn counts_as_tasted(self) -> bool {
        !matches!(self, Self::NotTasted)
    }

    /// Returns the database string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotTasted => "not_tasted",
            Self::Tasted => "tasted",
            Self::Owned => "owned",
            Self::OwnedAndTasted => "owned_and_tasted",
        }
    }

    /// Apply a flag change and return the resulting status.
    pub const fn apply(self, change: StatusChange) -> Self {
        let (tasted, owned) = self.decode();
        match change {
            StatusChange::ToggleTasted => Self::encode(!tasted, owned),
            StatusChange::ToggleOwned => Self::encode(tasted, !owned),
            StatusChange::Set { tasted, owned } => Self::encode(tasted, owned),
        }
    }
}

impl std::fmt::Display for BottleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bottle status: {input}")]
pub struct ParseBottleStatusError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for BottleStatus {
    type Err = ParseBottleStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseBottleStatusError {
                input: s.to_owned(),
            })
    }
}

/// A requested change to a bottle's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StatusChange {
    /// Flip the tasted flag, leaving owned as is.
    ToggleTasted,
    /// Flip the owned flag, leaving tasted as is.
    ToggleOwned,
    /// Set both flags explicitly.
    Set {
        /// Desired tasted flag.
        tasted: bool,
        /// Desired owned flag.
        owned: bool,
    },
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::neither(false, false, BottleStatus::NotTasted)]
    #[case::tasted(true, false, BottleStatus::Tasted)]
    #[case::owned(false, true, BottleStatus::Owned)]
    #[case::both(true, true, BottleStatus::OwnedAndTasted)]
    fn encode_maps_every_flag_pair(
        #[case] tasted: bool,
        #[case] owned: bool,
        #[case] expected: BottleStatus,
    ) {
        assert_eq!(BottleStatus::encode(tasted, owned), expected);
        assert_eq!(BottleStatus::encode(tasted, owned).decode(), (tasted, owned));
    }

    #[rstest]
    fn encode_inverts_decode_for_every_status() {
        for status in BottleStatus::ALL {
            let (tasted, owned) = status.decode();
            assert_eq!(BottleStatus::encode(tasted, owned), status);
        }
    }

    #[rstest]
    #[case::not_tasted(BottleStatus::NotTasted, false)]
    #[case::tasted(BottleStatus::Tasted, true)]
    #[case::owned(BottleStatus::Owned, true)]
    #[case::both(BottleStatus::OwnedAndTasted, true)]
    fn tasted_counter_includes_owned(#[case] status: BottleStatus, #[case] expected: bool) {
        assert_eq!(status.counts_as_tasted(), expected);
    }

    #[rstest]
    fn as_str_matches_parse() {
        for status in BottleStatus::ALL {
            let parsed: BottleStatus = status.as_str().parse().expect("round-trip should succeed");
            assert_eq!(parsed, status);
        }
    }

    #[rstest]
    #[case::unknown("finished")]
    #[case::empty("")]
    #[case::camel("ownedAndTasted")]
    fn parse_rejects_unknown_strings(#[case] input: &str) {
        let result: Result<BottleStatus, _> = input.parse();
        assert_eq!(
            result,
            Err(ParseBottleStatusError {
                input: input.to_owned()
            })
        );
    }

    #[rstest]
    fn serde_uses_database_strings() {
        let json = serde_json::to_string(&BottleStatus::OwnedAndTasted).expect("serialise");
        assert_eq!(json, "\"owned_and_tasted\"");
    }

    #[rstest]
    #[case::toggle_tasted_on(
        BottleStatus::Owned,
        StatusChange::ToggleTasted,
        BottleStatus::OwnedAndTasted
    )]
    #[case::toggle_tasted_off(
        BottleStatus::OwnedAndTasted,
        StatusChange::ToggleTasted,
        BottleStatus::Owned
    )]
    #[case::toggle_owned_on(
        BottleStatus::Tasted,
        StatusChange::ToggleOwned,
        BottleStatus::OwnedAndTasted
    )]
    #[case::toggle_owned_off(
        BottleStatus::Owned,
        StatusChange::ToggleOwned,
        BottleStatus::NotTasted
    )]
    #[case::set(
        BottleStatus::Owned,
        StatusChange::Set { tasted: true, owned: false },
        BottleStatus::Tasted
    )]
    fn apply_changes_only_the_requested_flag(
        #[case] start: BottleStatus,
        #[case] change: StatusChange,
        #[case] expected: BottleStatus,
    ) {
        assert_eq!(start.apply(change), expected);
    }
}
