#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI for the Mangrove Watch toolchain.
//!
//! Provides a unified entry point that lets an operator start the API
//! server or inspect the report store from the terminal: export the
//! current snapshot to CSV, print the reporter leaderboard, or print the
//! aggregate status counts. Store access goes through the same
//! file-backed path the server uses, so the CLI sees exactly what the
//! server persisted.

use std::sync::Arc;

use dialoguer::Select;
use mangrove_watch_events::ChangeBus;
use mangrove_watch_store::{FileBackend, ReportStore};

/// Top-level tool selection.
enum Tool {
    Server,
    Export,
    Leaderboard,
    Stats,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Export, Self::Leaderboard, Self::Stats];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Export => "Export reports to CSV",
            Self::Leaderboard => "Show leaderboard",
            Self::Stats => "Show status counts",
        }
    }
}

/// Opens the report store over the configured data directory.
fn open_store() -> ReportStore {
    let data_dir = std::env::var("MANGROVE_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    ReportStore::open(
        Arc::new(FileBackend::in_dir(&data_dir)),
        ChangeBus::default(),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    println!("Mangrove Watch Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => {
            // The server uses actix-web's runtime, so run it in a
            // blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(mangrove_watch_server::run_server())
            })
            .await??;
        }
        Tool::Export => {
            let store = open_store();
            let csv = mangrove_watch_export::reports_to_csv(&store.snapshot())?;
            let path = mangrove_watch_export::EXPORT_FILE_NAME;
            std::fs::write(path, csv)?;
            println!("Exported {} reports to {path}", store.len());
        }
        Tool::Leaderboard => {
            let store = open_store();
            let rows = mangrove_watch_analytics::leaderboard(&store.snapshot());
            if rows.is_empty() {
                println!("No reports yet.");
            }
            for (rank, row) in rows.iter().enumerate() {
                println!("{:>3}. {:<30} {:>6}", rank + 1, row.name, row.score);
            }
        }
        Tool::Stats => {
            let store = open_store();
            let counts = mangrove_watch_analytics::status_counts(&store.snapshot());
            println!("Total:        {}", counts.total);
            println!("Pending:      {}", counts.pending);
            println!("Acknowledged: {}", counts.acknowledged);
            println!("In progress:  {}", counts.in_progress);
            println!("Resolved:     {} ({}%)", counts.resolved, counts.resolved_pct);
        }
    }

    Ok(())
}
