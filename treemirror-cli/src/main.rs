//! Replay recorded mutation batches through a session and print the tree.

mod args;
mod error;

use std::fs::{self, File};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};
use treemirror::inbox::{self, Batch};
use treemirror::{Session, SessionConfig};

use crate::args::Args;
use crate::error::CliError;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn init_logging(path: &Path) -> Result<(), CliError> {
    let log_file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;
    Ok(())
}

async fn run(args: Args) -> Result<(), CliError> {
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => read_json::<SessionConfig>(path)?,
        None => SessionConfig::default(),
    };
    let batches: Vec<Batch> = read_json(&args.batches)?;
    info!("Replaying {} batches from {}", batches.len(), args.batches.display());

    let session = Session::new(config);
    let (tx, rx) = inbox::channel();
    for batch in batches {
        tx.send(batch);
    }
    drop(tx);
    rx.run(session.clone()).await;

    if let Err(violation) = session.check_invariants() {
        warn!("Store invariant violated after replay: {}", violation);
    }

    for &id in &args.collapse {
        session.collapse(id);
    }
    if let Some(id) = args.select {
        session.select_by_id(id);
    }
    if let Some(pattern) = &args.search {
        session.set_pattern(pattern)?;
    }

    print_tree(&session);
    Ok(())
}

fn print_tree(session: &Session) {
    let selected = session.selected();
    let matches = session.search_matches();
    let current = session.search_current();

    for row in session.rows() {
        let Some(label) = session.label(row.id) else {
            continue;
        };
        let toggle = if !session.can_collapse(row.id) {
            "  "
        } else if session.is_collapsed(row.id) {
            "▶ "
        } else {
            "▼ "
        };
        let cursor = if selected == Some(row.id) { ">" } else { " " };
        let mark = if current == Some(row.id) {
            " <=="
        } else if matches.contains(&row.id) {
            " <"
        } else {
            ""
        };
        println!(
            "{}{}{}{} ({}){}",
            cursor,
            "  ".repeat(row.depth as usize),
            toggle,
            label,
            row.id.0,
            mark
        );
    }

    if !matches.is_empty() {
        println!("{} matches for '{}'", matches.len(), session.search_query());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
