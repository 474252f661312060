//! Import distillery or bottle CSV files into the hosted store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use distillery_backend::config::StoreSettings;
use distillery_backend::import::{DataImporter, ImportKind};
use distillery_backend::logging::init_tracing;
use distillery_backend::outbound::rest::{RestClient, RestImportRepository};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

/// Kind of rows in the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FileKind {
    /// `name,latitude,longitude,description,tours_available,tour_info`.
    Distilleries,
    /// `distillery_name,name,age_statement`.
    Bottles,
}

impl From<FileKind> for ImportKind {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Distilleries => Self::Distilleries,
            FileKind::Bottles => Self::Bottles,
        }
    }
}

/// `import-data` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-data",
    about = "Import distilleries or bottles from a CSV file",
    version
)]
struct CliArgs {
    /// What the file contains.
    #[arg(value_enum)]
    kind: FileKind,
    /// Path to the CSV file.
    #[arg(value_name = "path")]
    file: PathBuf,
    /// Region for imported distilleries. Falls back to `WHISKY_IMPORT_REGION`,
    /// then `Japan`.
    #[arg(long, value_name = "name")]
    region: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = StoreSettings::load_from_iter([OsString::from("import-data")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    init_tracing(settings.log_json);

    let connection = settings
        .connection()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    let client = RestClient::new(&connection)
        .map_err(|error| io::Error::other(format!("build HTTP client: {error}")))?;
    let importer = DataImporter::new(Arc::new(RestImportRepository::new(client)));

    let region = args
        .region
        .as_deref()
        .unwrap_or_else(|| settings.import_region());
    let report = importer
        .import_file(args.kind.into(), &args.file, region)
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    println!("inserted={}", report.inserted);
    println!("failed={}", report.failed);
    println!("unmatched={}", report.unmatched);
    println!("invalid={}", report.invalid);
    Ok(())
}
