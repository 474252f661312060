//! Visit records.
//!
//! A user has at most one visit record per distillery. Locally the record is
//! modelled as a [`VisitSlot`] that is either absent or present with the
//! editable details.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DistilleryId, UserId, VisitId};

/// A persisted visit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVisit {
    /// Row identifier.
    pub id: VisitId,
    /// Visiting user.
    pub user_id: UserId,
    /// Visited distillery.
    pub distillery_id: DistilleryId,
    /// Calendar date of the visit.
    pub visit_date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserVisit {
    /// The editable part of the record.
    pub fn details(&self) -> VisitDetails {
        VisitDetails {
            visit_date: self.visit_date,
            notes: self.notes.clone(),
        }
    }
}

/// The user-editable fields of a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitDetails {
    /// Calendar date of the visit.
    pub visit_date: NaiveDate,
    /// Free-text notes; blank input is stored as `None`.
    pub notes: Option<String>,
}

impl VisitDetails {
    /// Build details, normalising blank notes to `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use distillery_backend::domain::VisitDetails;
    /// # use chrono::NaiveDate;
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
    /// assert_eq!(VisitDetails::new(date, "  ").notes, None);
    /// assert_eq!(VisitDetails::new(date, "Great tour").notes.as_deref(), Some("Great tour"));
    /// ```
    pub fn new(visit_date: NaiveDate, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        Self {
            visit_date,
            notes: (!notes.trim().is_empty()).then_some(notes),
        }
    }
}

/// A visit row to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    /// Visiting user.
    pub user_id: UserId,
    /// Visited distillery.
    pub distillery_id: DistilleryId,
    /// Calendar date of the visit.
    pub visit_date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl NewVisit {
    /// Combine the slot key with the details to insert.
    pub fn new(user_id: UserId, distillery_id: DistilleryId, details: VisitDetails) -> Self {
        Self {
            user_id,
            distillery_id,
            visit_date: details.visit_date,
            notes: details.notes,
        }
    }
}

/// Local state of one (user, distillery) visit slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum VisitSlot {
    /// No visit recorded.
    #[default]
    Absent,
    /// A visit is recorded with these details.
    Present(VisitDetails),
}

impl VisitSlot {
    /// Whether a visit is recorded.
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Details of the recorded visit.
    pub const fn details(&self) -> Option<&VisitDetails> {
        match self {
            Self::Absent => None,
            Self::Present(details) => Some(details),
        }
    }
}

impl From<Option<&UserVisit>> for VisitSlot {
    fn from(visit: Option<&UserVisit>) -> Self {
        visit.map_or(Self::Absent, |visit| Self::Present(visit.details()))
    }
}
