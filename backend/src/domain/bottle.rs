//! Bottle aggregate and its status transitions.
//!
//! Bottles are created by the importer and afterwards only change through
//! status edits. A status edit decides the tasting date alongside the status:
//!
//! - tasted flips on: the tasting date becomes "now";
//! - tasted flips off: the tasting date is cleared;
//! - tasted unchanged: the tasting date is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BottleId, BottleStatus, DistilleryId, StatusChange};

/// A bottle released by a distillery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottle {
    /// Row identifier.
    pub id: BottleId,
    /// Bottle name.
    pub name: String,
    /// Optional age statement such as `12 Years`.
    pub age_statement: Option<String>,
    /// Owning distillery.
    pub distillery_id: DistilleryId,
    /// Persisted status.
    pub status: BottleStatus,
    /// Set iff `status` implies tasted.
    pub tasting_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Bottle {
    /// Whether the tasted flag is set.
    pub const fn is_tasted(&self) -> bool {
        self.status.is_tasted()
    }

    /// Whether the owned flag is set.
    pub const fn is_owned(&self) -> bool {
        self.status.is_owned()
    }

    /// Display label: the name followed by the age statement in brackets.
    ///
    /// # Examples
    ///
    /// ```
    /// # use distillery_backend::domain::{Bottle, BottleId, BottleStatus, DistilleryId};
    /// # use chrono::Utc;
    /// let bottle = Bottle {
    ///     id: BottleId::random(),
    ///     name: "Hakushu".to_owned(),
    ///     age_statement: Some("12 Years".to_owned()),
    ///     distillery_id: DistilleryId::random(),
    ///     status: BottleStatus::NotTasted,
    ///     tasting_date: None,
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    /// assert_eq!(bottle.label(), "Hakushu (12 Years)");
    /// ```
    pub fn label(&self) -> String {
        match &self.age_statement {
            Some(age) => format!("{} ({age})", self.name),
            None => self.name.clone(),
        }
    }

    /// Plan the remote write for `change`, evaluated at `now`.
    pub fn plan_status_change(
        &self,
        change: StatusChange,
        now: DateTime<Utc>,
    ) -> BottleStatusUpdate {
        let status = self.status.apply(change);
        let tasting_date = match (self.status.is_tasted(), status.is_tasted()) {
            (_, false) => None,
            (false, true) => Some(now),
            (true, true) => Some(self.tasting_date.unwrap_or(now)),
        };
        BottleStatusUpdate {
            bottle_id: self.id,
            status,
            tasting_date,
        }
    }

    /// Return a copy with `update` applied.
    pub fn with_update(&self, update: &BottleStatusUpdate) -> Self {
        Self {
            status: update.status,
            tasting_date: update.tasting_date,
            ..self.clone()
        }
    }
}

/// The status columns written for one bottle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottleStatusUpdate {
    /// Target row.
    pub bottle_id: BottleId,
    /// New status.
    pub status: BottleStatus,
    /// New tasting date.
    pub tasting_date: Option<DateTime<Utc>>,
}

/// A bottle row to be inserted by the importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBottle {
    /// Bottle name.
    pub name: String,
    /// Optional age statement.
    pub age_statement: Option<String>,
    /// Owning distillery.
    pub distillery_id: DistilleryId,
}
