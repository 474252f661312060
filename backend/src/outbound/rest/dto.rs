//! Row DTOs for the hosted store's JSON payloads.
//!
//! Reads decode into these transport DTOs first and then map into domain
//! records in one pass. Writes serialise the narrow column sets below.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CatalogueEntry, DistilleryName};
use crate::domain::{
    Bottle, BottleId, BottleStatus, Distillery, DistilleryId, Region, RegionId, UserId,
    UserVisit, VisitId,
};

#[derive(Debug, Deserialize)]
pub(super) struct StoreErrorDto {
    pub(super) code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl StoreErrorDto {
    /// Join message, details, and hint into one line.
    pub(super) fn into_message(self) -> Option<String> {
        let parts: Vec<String> = [self.message, self.details, self.hint]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthUserDto {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct IdRowDto<T> {
    pub(super) id: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct RegionRowDto {
    id: RegionId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl RegionRowDto {
    pub(super) fn into_domain(self) -> Region {
        Region {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DistilleryNameDto {
    id: DistilleryId,
    name: String,
}

impl DistilleryNameDto {
    pub(super) fn into_domain(self) -> DistilleryName {
        DistilleryName {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BottleRowDto {
    id: BottleId,
    name: String,
    #[serde(default)]
    age_statement: Option<String>,
    distillery_id: DistilleryId,
    #[serde(default)]
    status: Option<BottleStatus>,
    #[serde(default)]
    tasting_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BottleRowDto {
    /// A missing status reads as `not_tasted`; a tasting date on an untasted
    /// status is dropped.
    fn into_domain(self) -> Bottle {
        let status = self.status.unwrap_or_default();
        Bottle {
            id: self.id,
            name: self.name,
            age_statement: self.age_statement,
            distillery_id: self.distillery_id,
            status,
            tasting_date: self.tasting_date.filter(|_| status.is_tasted()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserVisitRowDto {
    id: VisitId,
    user_id: String,
    distillery_id: DistilleryId,
    visit_date: NaiveDate,
    #[serde(default)]
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserVisitRowDto {
    pub(super) fn into_domain(self) -> Result<UserVisit, String> {
        let user_id = UserId::new(&self.user_id)
            .map_err(|error| format!("visit {} has invalid user id: {error}", self.id))?;
        Ok(UserVisit {
            id: self.id,
            user_id,
            distillery_id: self.distillery_id,
            visit_date: self.visit_date,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CatalogueRowDto {
    id: DistilleryId,
    name: String,
    #[serde(default)]
    region_id: Option<RegionId>,
    #[serde(default)]
    sub_region_id: Option<RegionId>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tours_available: bool,
    #[serde(default)]
    tour_info: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    bottles: Vec<BottleRowDto>,
    #[serde(default)]
    user_visits: Vec<UserVisitRowDto>,
}

impl CatalogueRowDto {
    pub(super) fn into_domain(self) -> Result<CatalogueEntry, String> {
        let visits = self
            .user_visits
            .into_iter()
            .map(UserVisitRowDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CatalogueEntry {
            distillery: Distillery {
                id: self.id,
                name: self.name,
                region_id: self.region_id,
                sub_region_id: self.sub_region_id,
                latitude: self.latitude,
                longitude: self.longitude,
                description: self.description,
                tours_available: self.tours_available,
                tour_info: self.tour_info,
                created_at: self.created_at,
            },
            bottles: self.bottles.into_iter().map(BottleRowDto::into_domain).collect(),
            visits,
        })
    }
}

/// Body of a bottle status `PATCH`. `None` writes `null`.
#[derive(Debug, Serialize)]
pub(super) struct StatusPatchDto {
    pub(super) status: BottleStatus,
    pub(super) tasting_date: Option<DateTime<Utc>>,
}

/// Body of a visit details `PATCH`.
#[derive(Debug, Serialize)]
pub(super) struct VisitPatchDto<'a> {
    pub(super) visit_date: NaiveDate,
    pub(super) notes: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row decoding.

    use super::*;
    use rstest::rstest;

    const DISTILLERY_ID: &str = "7c1e1b7e-1f51-4a55-9b0c-6f1a5d3f1a01";
    const USER_ID: &str = "0b8f2f3a-4c1d-4f6e-8a2b-9d3c4e5f6a7b";

    fn catalogue_payload(user_id: &str) -> String {
        format!(
            r#"[{{
                "id": "{DISTILLERY_ID}",
                "name": "Yamazaki",
                "region_id": null,
                "sub_region_id": null,
                "latitude": 34.8925,
                "longitude": 135.6745,
                "description": "Japan's first malt distillery",
                "tours_available": true,
                "tour_info": null,
                "created_at": "2024-01-01T00:00:00Z",
                "bottles": [
                    {{
                        "id": "5d0a1c2b-3e4f-4a5b-8c6d-7e8f9a0b1c2d",
                        "name": "Yamazaki 12",
                        "age_statement": "12 Years",
                        "distillery_id": "{DISTILLERY_ID}",
                        "status": "owned",
                        "tasting_date": "2024-01-10T12:00:00Z",
                        "created_at": "2024-01-01T00:00:00Z",
                        "updated_at": "2024-01-10T12:00:00Z"
                    }}
                ],
                "user_visits": [
                    {{
                        "id": "9a8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d",
                        "user_id": "{user_id}",
                        "distillery_id": "{DISTILLERY_ID}",
                        "visit_date": "2024-01-15",
                        "notes": "Great tour",
                        "created_at": "2024-01-15T09:00:00Z"
                    }}
                ]
            }}]"#
        )
    }

    #[test]
    fn decodes_nested_catalogue_rows() {
        let rows: Vec<CatalogueRowDto> =
            serde_json::from_str(&catalogue_payload(USER_ID)).expect("payload decodes");
        let entry = rows
            .into_iter()
            .next()
            .expect("one row")
            .into_domain()
            .expect("row maps");

        assert_eq!(entry.distillery.name, "Yamazaki");
        assert!(entry.distillery.tours_available);
        assert_eq!(entry.bottles.len(), 1);
        assert_eq!(entry.bottles[0].status, BottleStatus::Owned);
        assert_eq!(entry.bottles[0].tasting_date, None, "untasted rows carry no date");
        assert_eq!(entry.visits[0].notes.as_deref(), Some("Great tour"));
        assert_eq!(entry.visits[0].user_id.as_ref(), USER_ID);
    }

    #[test]
    fn rejects_visits_with_malformed_user_ids() {
        let rows: Vec<CatalogueRowDto> =
            serde_json::from_str(&catalogue_payload("not-a-uuid")).expect("payload decodes");
        let error = rows
            .into_iter()
            .next()
            .expect("one row")
            .into_domain()
            .expect_err("user id is invalid");
        assert!(error.contains("invalid user id"));
    }

    #[rstest]
    #[case::all_parts(
        concat!(
            r#"{"code":"42501","message":"permission denied","#,
            r#""details":"row level security","hint":"sign in"}"#,
        ),
        Some("permission denied | row level security | sign in")
    )]
    #[case::message_only(r#"{"message":"boom"}"#, Some("boom"))]
    #[case::empty(r#"{"code":"PGRST116"}"#, None)]
    fn store_error_message_joins_present_parts(#[case] body: &str, #[case] expected: Option<&str>) {
        let dto: StoreErrorDto = serde_json::from_str(body).expect("error body decodes");
        assert_eq!(dto.into_message().as_deref(), expected);
    }

    #[test]
    fn status_patch_writes_null_tasting_date() {
        let body = serde_json::to_value(StatusPatchDto {
            status: BottleStatus::Owned,
            tasting_date: None,
        })
        .expect("patch serialises");
        assert_eq!(
            body,
            serde_json::json!({ "status": "owned", "tasting_date": null })
        );
    }
}
