//! Browse the distillery catalogue and record visits or tastings.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use distillery_backend::config::StoreSettings;
use distillery_backend::domain::{
    BottleId, BottleListCoordinator, CatalogueService, DistilleryId, DistilleryOverview, Session,
    VisitDetails, VisitRecordManager, VisitSlot, resolve_session,
};
use distillery_backend::logging::init_tracing;
use distillery_backend::outbound::rest::{
    RestBottleRepository, RestCatalogueRepository, RestClient, RestSessionProvider,
    RestVisitRepository,
};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

/// `catalogue` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "catalogue",
    about = "Browse distilleries and record visits and tastings",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List every distillery with its visit and tasting summary.
    List {
        /// Print the overviews as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Record a visit, or update the recorded one.
    Visit {
        /// Distillery to mark.
        distillery: DistilleryId,
        /// Visit date, `YYYY-MM-DD`.
        #[arg(long)]
        date: NaiveDate,
        /// Free-text notes.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Remove the recorded visit.
    Unvisit {
        /// Distillery to unmark.
        distillery: DistilleryId,
    },
    /// Flip one of a bottle's flags.
    Bottle {
        /// Bottle to edit.
        bottle: BottleId,
        /// Flag to flip.
        #[arg(value_enum)]
        action: BottleAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BottleAction {
    ToggleTasted,
    ToggleOwned,
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
    let settings = StoreSettings::load_from_iter([OsString::from("catalogue")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    init_tracing(settings.log_json);

    let connection = settings
        .connection()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    let client = RestClient::new(&connection)
        .map_err(|error| io::Error::other(format!("build HTTP client: {error}")))?;
    let session = resolve_session(&RestSessionProvider::new(client.clone()))
        .await
        .map_err(io::Error::other)?;
    let catalogue = CatalogueService::new(Arc::new(RestCatalogueRepository::new(client.clone())));

    match args.command {
        Command::List { json } => list(&catalogue, &session, json).await,
        Command::Visit {
            distillery,
            date,
            notes,
        } => {
            let overview = catalogue
                .fetch_overview(&session, distillery)
                .await
                .map_err(io::Error::other)?;
            let manager = visit_manager(&client, &overview);
            manager
                .mark_visited(&session, VisitDetails::new(date, notes))
                .await
                .map_err(io::Error::other)?;
            println!("{} marked visited on {date}", overview.distillery.name);
            Ok(())
        }
        Command::Unvisit { distillery } => {
            let overview = catalogue
                .fetch_overview(&session, distillery)
                .await
                .map_err(io::Error::other)?;
            let manager = visit_manager(&client, &overview);
            manager.unmark(&session).await.map_err(io::Error::other)?;
            println!("{} unmarked", overview.distillery.name);
            Ok(())
        }
        Command::Bottle { bottle, action } => {
            let overviews = catalogue
                .fetch_overviews(&session)
                .await
                .map_err(io::Error::other)?;
            let owner = overviews
                .into_iter()
                .find(|overview| overview.bottles.iter().any(|candidate| candidate.id == bottle))
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("bottle {bottle} not found"))
                })?;
            let coordinator = BottleListCoordinator::new(
                Arc::new(RestBottleRepository::new(client)),
                Arc::new(DefaultClock),
                owner.bottles,
            );
            let updated = match action {
                BottleAction::ToggleTasted => coordinator.toggle_tasted(bottle).await,
                BottleAction::ToggleOwned => coordinator.toggle_owned(bottle).await,
            }
            .map_err(io::Error::other)?;
            println!(
                "{} is now {} ({} of {} counted at {})",
                updated.label(),
                updated.status,
                coordinator.tasted_count(),
                coordinator.bottles().len(),
                owner.distillery.name
            );
            Ok(())
        }
    }
}

fn visit_manager(
    client: &RestClient,
    overview: &DistilleryOverview,
) -> VisitRecordManager<RestVisitRepository> {
    VisitRecordManager::new(
        Arc::new(RestVisitRepository::new(client.clone())),
        overview.distillery.id,
        VisitSlot::from(overview.visit.as_ref()),
    )
}

async fn list(
    catalogue: &CatalogueService<RestCatalogueRepository>,
    session: &Session,
    json: bool,
) -> io::Result<()> {
    let overviews = catalogue
        .fetch_overviews(session)
        .await
        .map_err(io::Error::other)?;
    if json {
        let body = serde_json::to_string_pretty(&overviews).map_err(io::Error::other)?;
        println!("{body}");
        return Ok(());
    }
    for overview in &overviews {
        let marker = overview.marker();
        println!(
            "{}  {}  visited={}  tours={}  tasted={}/{}",
            overview.distillery.id,
            overview.distillery.name,
            marker.visited,
            marker.tours_available,
            overview.tasted_count,
            overview.bottles.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing.

    use rstest::rstest;

    use super::*;

    const DISTILLERY: &str = "7c1e1b7e-1f51-4a55-9b0c-6f1a5d3f1a01";

    #[rstest]
    fn parses_visit_with_notes() {
        let args = CliArgs::try_parse_from([
            "catalogue",
            "visit",
            DISTILLERY,
            "--date",
            "2024-01-15",
            "--notes",
            "Great tour",
        ])
        .expect("args parse");
        let Command::Visit { date, notes, .. } = args.command else {
            panic!("expected visit command");
        };
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"));
        assert_eq!(notes, "Great tour");
    }

    #[rstest]
    fn rejects_malformed_distillery_id() {
        let error = CliArgs::try_parse_from(["catalogue", "unvisit", "yamazaki"])
            .expect_err("id must be a UUID");
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[rstest]
    #[case::tasted("toggle-tasted", BottleAction::ToggleTasted)]
    #[case::owned("toggle-owned", BottleAction::ToggleOwned)]
    fn parses_bottle_actions(#[case] raw: &str, #[case] expected: BottleAction) {
        let args = CliArgs::try_parse_from([
            "catalogue",
            "bottle",
            "5d0a1c2b-3e4f-4a5b-8c6d-7e8f9a0b1c2d",
            raw,
        ])
        .expect("args parse");
        let Command::Bottle { action, .. } = args.command else {
            panic!("expected bottle command");
        };
        assert_eq!(action, expected);
    }
}
