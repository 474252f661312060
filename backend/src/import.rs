//! CSV import of distilleries and bottles.
//!
//! Rows are parsed by [`distillery_csv`] and inserted one at a time through
//! the [`ImportRepository`] port. A failing row is logged and counted; the
//! import carries on. Only a missing target region aborts a distillery
//! import, since every row would need it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use distillery_csv::{BottleRow, CsvError, DistilleryRow, ParsedRows, RowError};
use tracing::{error, info, warn};

use crate::domain::ports::{ImportRepository, ImportRepositoryError};
use crate::domain::{DistilleryId, Error, NewBottle, NewDistillery};

/// Which file an import reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Distillery rows.
    Distilleries,
    /// Bottle rows joined to distilleries by name.
    Bottles,
}

/// Counters describing one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows inserted.
    pub inserted: usize,
    /// Rows the store refused.
    pub failed: usize,
    /// Bottle rows whose distillery name matched nothing.
    pub unmatched: usize,
    /// Rows rejected while parsing.
    pub invalid: usize,
}

impl ImportReport {
    /// Rows that did not make it into the store.
    pub const fn skipped(&self) -> usize {
        self.failed + self.unmatched + self.invalid
    }
}

/// Errors that abort an import run.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file could not be read or lacks required columns.
    #[error(transparent)]
    Csv(#[from] CsvError),
    /// A store lookup the whole run depends on failed.
    #[error(transparent)]
    Store(#[from] Error),
}

/// Inserts parsed CSV rows through the import port.
#[derive(Clone)]
pub struct DataImporter<R> {
    repo: Arc<R>,
}

impl<R> DataImporter<R> {
    /// Create an importer over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn map_repository_error(error: ImportRepositoryError) -> Error {
    match error {
        ImportRepositoryError::Connection { message } => {
            Error::backend(format!("import repository unavailable: {message}"))
        }
        ImportRepositoryError::Timeout { message } => {
            Error::backend(format!("import repository timed out: {message}"))
        }
        ImportRepositoryError::Query { message } => {
            Error::backend(format!("import repository error: {message}"))
        }
    }
}

fn log_rejected(rejected: &[RowError]) -> usize {
    for row in rejected {
        warn!(line = row.line(), error = %row, "skipping invalid CSV row");
    }
    rejected.len()
}

impl<R> DataImporter<R>
where
    R: ImportRepository,
{
    /// Insert distillery rows into `region_name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the region does not exist and `BackendError`
    /// when the region lookup fails. Per-row failures only count.
    pub async fn import_distilleries(
        &self,
        parsed: ParsedRows<DistilleryRow>,
        region_name: &str,
    ) -> Result<ImportReport, Error> {
        let region = self
            .repo
            .find_region_by_name(region_name)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("region {region_name} not found")))?;

        let mut report = ImportReport {
            invalid: log_rejected(&parsed.rejected),
            ..ImportReport::default()
        };
        for row in parsed.rows {
            let distillery = NewDistillery {
                name: row.name,
                region_id: region.id,
                latitude: row.latitude,
                longitude: row.longitude,
                description: row.description,
                tours_available: row.tours_available,
                tour_info: row.tour_info,
            };
            match self.repo.insert_distillery(&distillery).await {
                Ok(id) => {
                    info!(distillery = %distillery.name, %id, "distillery imported");
                    report.inserted += 1;
                }
                Err(error) => {
                    error!(distillery = %distillery.name, %error, "distillery insert failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Insert bottle rows, joining each to its distillery by exact name.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the distillery listing fails. Unmatched
    /// names and per-row failures only count.
    pub async fn import_bottles(
        &self,
        parsed: ParsedRows<BottleRow>,
    ) -> Result<ImportReport, Error> {
        let directory: HashMap<String, DistilleryId> = self
            .repo
            .distillery_names()
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .map(|entry| (entry.name, entry.id))
            .collect();

        let mut report = ImportReport {
            invalid: log_rejected(&parsed.rejected),
            ..ImportReport::default()
        };
        for row in parsed.rows {
            let Some(distillery_id) = directory.get(&row.distillery_name).copied() else {
                warn!(
                    distillery = %row.distillery_name,
                    bottle = %row.name,
                    "distillery not found, skipping bottle"
                );
                report.unmatched += 1;
                continue;
            };
            let bottle = NewBottle {
                name: row.name,
                age_statement: row.age_statement,
                distillery_id,
            };
            match self.repo.insert_bottle(&bottle).await {
                Ok(id) => {
                    info!(bottle = %bottle.name, %id, "bottle imported");
                    report.inserted += 1;
                }
                Err(error) => {
                    error!(bottle = %bottle.name, %error, "bottle insert failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Read `path` as `kind` and import it.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Csv`] when the file is unreadable or lacks a
    /// required column, and [`ImportError::Store`] when a run-wide lookup
    /// fails.
    pub async fn import_file(
        &self,
        kind: ImportKind,
        path: &Path,
        region_name: &str,
    ) -> Result<ImportReport, ImportError> {
        let report = match kind {
            ImportKind::Distilleries => {
                let parsed = distillery_csv::read_distilleries_from_path(path)?;
                self.import_distilleries(parsed, region_name).await?
            }
            ImportKind::Bottles => {
                let parsed = distillery_csv::read_bottles_from_path(path)?;
                self.import_bottles(parsed).await?
            }
        };
        info!(
            file = %path.display(),
            inserted = report.inserted,
            skipped = report.skipped(),
            "import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for row handling against a mocked repository.

    use super::*;
    use crate::domain::ports::{DistilleryName, MockImportRepository};
    use crate::domain::{BottleId, ErrorCode, Region, RegionId};
    use chrono::Utc;
    use rstest::rstest;

    fn region() -> Region {
        Region {
            id: RegionId::random(),
            name: "Japan".to_owned(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn distillery_row(name: &str) -> DistilleryRow {
        DistilleryRow {
            name: name.to_owned(),
            latitude: 34.89,
            longitude: 135.67,
            description: None,
            tours_available: true,
            tour_info: None,
        }
    }

    fn bottle_row(distillery: &str, name: &str) -> BottleRow {
        BottleRow {
            distillery_name: distillery.to_owned(),
            name: name.to_owned(),
            age_statement: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn missing_region_aborts_distillery_import() {
        let mut repo = MockImportRepository::new();
        repo.expect_find_region_by_name()
            .times(1)
            .return_once(|_| Ok(None));
        repo.expect_insert_distillery().never();

        let importer = DataImporter::new(Arc::new(repo));
        let parsed = ParsedRows {
            rows: vec![distillery_row("Yamazaki")],
            rejected: Vec::new(),
        };
        let error = importer
            .import_distilleries(parsed, "Japan")
            .await
            .expect_err("region is required");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_distillery_rows_are_counted_not_fatal() {
        let region = region();
        let region_id = region.id;
        let mut repo = MockImportRepository::new();
        repo.expect_find_region_by_name()
            .times(1)
            .withf(|name| name == "Japan")
            .return_once(move |_| Ok(Some(region)));
        repo.expect_insert_distillery()
            .times(2)
            .withf(move |row| row.region_id == region_id)
            .returning(|row| {
                if row.name == "Chichibu" {
                    Err(ImportRepositoryError::query("duplicate name"))
                } else {
                    Ok(DistilleryId::random())
                }
            });

        let importer = DataImporter::new(Arc::new(repo));
        let parsed = ParsedRows {
            rows: vec![distillery_row("Yamazaki"), distillery_row("Chichibu")],
            rejected: vec![RowError::EmptyField {
                line: 4,
                field: "name",
            }],
        };
        let report = importer
            .import_distilleries(parsed, "Japan")
            .await
            .expect("import completes");

        assert_eq!(
            report,
            ImportReport {
                inserted: 1,
                failed: 1,
                unmatched: 0,
                invalid: 1,
            }
        );
        assert_eq!(report.skipped(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn unmatched_bottles_are_skipped() {
        let yoichi = DistilleryName {
            id: DistilleryId::random(),
            name: "Yoichi".to_owned(),
        };
        let yoichi_id = yoichi.id;
        let mut repo = MockImportRepository::new();
        repo.expect_distillery_names()
            .times(1)
            .return_once(move || Ok(vec![yoichi]));
        repo.expect_insert_bottle()
            .times(1)
            .withf(move |bottle| bottle.distillery_id == yoichi_id && bottle.name == "Yoichi 10")
            .return_once(|_| Ok(BottleId::random()));

        let importer = DataImporter::new(Arc::new(repo));
        let parsed = ParsedRows {
            rows: vec![bottle_row("Yoichi", "Yoichi 10"), bottle_row("Karuizawa", "1981")],
            rejected: Vec::new(),
        };
        let report = importer.import_bottles(parsed).await.expect("import completes");

        assert_eq!(report.inserted, 1);
        assert_eq!(report.unmatched, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_failure_aborts_bottle_import() {
        let mut repo = MockImportRepository::new();
        repo.expect_distillery_names()
            .times(1)
            .return_once(|| Err(ImportRepositoryError::timeout("deadline elapsed")));

        let importer = DataImporter::new(Arc::new(repo));
        let error = importer
            .import_bottles(ParsedRows {
                rows: Vec::new(),
                rejected: Vec::new(),
            })
            .await
            .expect_err("listing is required");
        assert_eq!(error.code(), ErrorCode::BackendError);
    }
}
