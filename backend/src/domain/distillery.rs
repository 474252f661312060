//! Distillery catalogue types and the derived view fields.
//!
//! Distilleries and regions are immutable once imported. The only values that
//! change between reads are the derived ones: the tasted counter and the
//! current user's visit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Bottle, DistilleryId, RegionId, UserVisit};

/// A geographic region, e.g. `Japan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Row identifier.
    pub id: RegionId,
    /// Unique region name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A whisky distillery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distillery {
    /// Row identifier.
    pub id: DistilleryId,
    /// Distillery name, unique within the catalogue.
    pub name: String,
    /// Region the distillery belongs to.
    pub region_id: Option<RegionId>,
    /// Sub-region the distillery belongs to.
    pub sub_region_id: Option<RegionId>,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Free-text description.
    pub description: Option<String>,
    /// Whether tours are offered.
    pub tours_available: bool,
    /// Tour details.
    pub tour_info: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A distillery row to be inserted by the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDistillery {
    /// Distillery name.
    pub name: String,
    /// Region the distillery belongs to.
    pub region_id: RegionId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Free-text description.
    pub description: Option<String>,
    /// Whether tours are offered.
    pub tours_available: bool,
    /// Tour details.
    pub tour_info: Option<String>,
}

/// Number of bottles whose status counts towards the tasted counter.
///
/// Owned bottles count alongside tasted ones.
pub fn tasted_count(bottles: &[Bottle]) -> usize {
    bottles
        .iter()
        .filter(|bottle| bottle.status.counts_as_tasted())
        .count()
}

/// A distillery together with everything the map and list views show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistilleryOverview {
    /// The distillery itself.
    pub distillery: Distillery,
    /// Bottles in the order the store returned them.
    pub bottles: Vec<Bottle>,
    /// The current user's visit, if any.
    pub visit: Option<UserVisit>,
    /// Derived tasted counter.
    pub tasted_count: usize,
}

impl DistilleryOverview {
    /// Assemble an overview and derive its tasted counter.
    pub fn new(distillery: Distillery, bottles: Vec<Bottle>, visit: Option<UserVisit>) -> Self {
        let tasted_count = tasted_count(&bottles);
        Self {
            distillery,
            bottles,
            visit,
            tasted_count,
        }
    }

    /// Whether the current user has recorded a visit.
    pub const fn is_visited(&self) -> bool {
        self.visit.is_some()
    }

    /// Recompute the tasted counter after bottles changed.
    pub fn refresh_tasted_count(&mut self) {
        self.tasted_count = tasted_count(&self.bottles);
    }

    /// Marker state for the map view.
    pub fn marker(&self) -> MarkerSummary {
        MarkerSummary {
            latitude: self.distillery.latitude,
            longitude: self.distillery.longitude,
            visited: self.is_visited(),
            tours_available: self.distillery.tours_available,
            tasted_badge: (self.tasted_count > 0).then_some(self.tasted_count),
        }
    }
}

/// Everything a map marker renders for one distillery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSummary {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Filled marker when visited.
    pub visited: bool,
    /// Highlighted marker when tours are offered.
    pub tours_available: bool,
    /// Counter badge, shown only when at least one bottle counts.
    pub tasted_badge: Option<usize>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the derived view fields.
    use super::*;
    use crate::domain::{BottleId, BottleStatus, UserId, VisitId};
    use chrono::NaiveDate;
    use rstest::rstest;

    fn distillery() -> Distillery {
        Distillery {
            id: DistilleryId::random(),
            name: "Yamazaki".to_owned(),
            region_id: None,
            sub_region_id: None,
            latitude: 34.8925,
            longitude: 135.6745,
            description: None,
            tours_available: true,
            tour_info: None,
            created_at: Utc::now(),
        }
    }

    fn bottle(distillery_id: DistilleryId, status: BottleStatus) -> Bottle {
        Bottle {
            id: BottleId::random(),
            name: "Yamazaki 12".to_owned(),
            age_statement: Some("12 Years".to_owned()),
            distillery_id,
            status,
            tasting_date: status.is_tasted().then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case::two_tasted_one_owned(
        &[BottleStatus::Tasted, BottleStatus::Tasted, BottleStatus::Owned],
        3
    )]
    #[case::two_tasted_one_untouched(
        &[BottleStatus::Tasted, BottleStatus::Tasted, BottleStatus::NotTasted],
        2
    )]
    #[case::owned_and_tasted(&[BottleStatus::OwnedAndTasted], 1)]
    #[case::empty(&[], 0)]
    fn tasted_count_includes_owned_bottles(
        #[case] statuses: &[BottleStatus],
        #[case] expected: usize,
    ) {
        let parent = distillery();
        let bottles: Vec<_> = statuses.iter().map(|status| bottle(parent.id, *status)).collect();

        let overview = DistilleryOverview::new(parent, bottles, None);
        assert_eq!(overview.tasted_count, expected);
    }

    #[rstest]
    fn marker_hides_badge_without_tasted_bottles() {
        let parent = distillery();
        let bottles = vec![bottle(parent.id, BottleStatus::NotTasted)];
        let marker = DistilleryOverview::new(parent, bottles, None).marker();

        assert_eq!(marker.tasted_badge, None);
        assert!(!marker.visited);
        assert!(marker.tours_available);
    }

    #[rstest]
    fn marker_reflects_visit_and_badge() {
        let parent = distillery();
        let visit = UserVisit {
            id: VisitId::random(),
            user_id: UserId::random(),
            distillery_id: parent.id,
            visit_date: NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"),
            notes: None,
            created_at: Utc::now(),
        };
        let bottles = vec![bottle(parent.id, BottleStatus::OwnedAndTasted)];
        let marker = DistilleryOverview::new(parent, bottles, Some(visit)).marker();

        assert!(marker.visited);
        assert_eq!(marker.tasted_badge, Some(1));
    }

    #[rstest]
    fn refresh_recomputes_after_local_edit() {
        let parent = distillery();
        let bottles = vec![bottle(parent.id, BottleStatus::NotTasted)];
        let mut overview = DistilleryOverview::new(parent, bottles, None);
        overview.bottles[0].status = BottleStatus::Owned;

        overview.refresh_tasted_count();
        assert_eq!(overview.tasted_count, 1);
    }
}
