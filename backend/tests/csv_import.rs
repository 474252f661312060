//! CSV import from files into the in-memory store.

use std::io::Write;
use std::sync::Arc;

use distillery_backend::domain::ErrorCode;
use distillery_backend::import::{DataImporter, ImportError, ImportKind, ImportReport};
use distillery_backend::test_support::InMemoryStore;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

const DISTILLERIES_CSV: &str = "\
name,latitude,longitude,description,tours_available,tour_info
Yamazaki,34.8925,135.6745,Japan's first malt distillery,TRUE,Reservations required
Chichibu,35.9917,139.0856,,FALSE,
,35.0,138.0,missing name,TRUE,
Mars Shinshu,not-a-number,137.9,,TRUE,
";

const BOTTLES_CSV: &str = "\
distillery_name,name,age_statement
Yamazaki,Yamazaki 12,12 Years
Yamazaki,Yamazaki Distiller's Reserve,
Karuizawa,Karuizawa 1981,
Chichibu,Chichibu The First Ten,10 Years
";

#[fixture]
fn store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.add_region("Japan");
    store
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write csv");
    file.flush().expect("flush csv");
    file
}

#[rstest]
#[tokio::test]
async fn distilleries_then_bottles_round_out_the_catalogue(store: Arc<InMemoryStore>) {
    let importer = DataImporter::new(Arc::clone(&store));
    let distilleries = csv_file(DISTILLERIES_CSV);
    let bottles = csv_file(BOTTLES_CSV);

    let report = importer
        .import_file(ImportKind::Distilleries, distilleries.path(), "Japan")
        .await
        .expect("distillery import runs");
    assert_eq!(
        report,
        ImportReport {
            inserted: 2,
            failed: 0,
            unmatched: 0,
            invalid: 2,
        }
    );
    let names: Vec<String> = store
        .distilleries()
        .into_iter()
        .map(|distillery| distillery.name)
        .collect();
    assert_eq!(names, ["Yamazaki", "Chichibu"]);

    let report = importer
        .import_file(ImportKind::Bottles, bottles.path(), "Japan")
        .await
        .expect("bottle import runs");
    assert_eq!(report.inserted, 3);
    assert_eq!(report.unmatched, 1, "Karuizawa is not in the catalogue");
    assert!(store.bottles().iter().all(|bottle| !bottle.is_tasted()));
}

#[rstest]
#[tokio::test]
async fn rejected_rows_are_counted_and_skipped(store: Arc<InMemoryStore>) {
    store.reject_name("Chichibu");
    let importer = DataImporter::new(Arc::clone(&store));
    let file = csv_file(DISTILLERIES_CSV);

    let report = importer
        .import_file(ImportKind::Distilleries, file.path(), "Japan")
        .await
        .expect("import runs");

    assert_eq!(report.inserted, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped(), 3);
}

#[rstest]
#[tokio::test]
async fn unknown_region_aborts_before_any_insert(store: Arc<InMemoryStore>) {
    let importer = DataImporter::new(Arc::clone(&store));
    let file = csv_file(DISTILLERIES_CSV);

    let error = importer
        .import_file(ImportKind::Distilleries, file.path(), "Scotland")
        .await
        .expect_err("region must exist");

    match error {
        ImportError::Store(error) => assert_eq!(error.code(), ErrorCode::NotFound),
        other => panic!("expected store error, got {other:?}"),
    }
    assert!(store.distilleries().is_empty());
}

#[rstest]
#[tokio::test]
async fn missing_file_is_a_csv_error(store: Arc<InMemoryStore>) {
    let importer = DataImporter::new(store);
    let dir = tempfile::tempdir().expect("temp dir");

    let error = importer
        .import_file(ImportKind::Bottles, &dir.path().join("absent.csv"), "Japan")
        .await
        .expect_err("file is missing");

    assert!(matches!(error, ImportError::Csv(_)));
}
