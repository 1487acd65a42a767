//! `matoba`, the maintenance tool for a Matoba results archive.
//!
//! # Usage
//!
//! ```text
//! matoba --data-dir ./data persons build
//! matoba --data-dir ./data persons assign
//! matoba --data-dir ./data persons check
//! matoba --data-dir ./data persons report
//! matoba --config ~/.config/matoba/config.toml reindex
//! matoba history person_012
//! matoba tournament-history 佐藤
//! ```

mod commands;
mod report;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use matoba_store_fs::FsStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "matoba", about = "Maintenance tool for the Matoba results archive")]
struct Args {
  /// Path to a TOML config file (data_dir).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Root of the archive (default: ./data).
  #[arg(long, env = "MATOBA_DATA_DIR")]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Maintain the person registry.
  #[command(subcommand)]
  Persons(PersonsCommand),
  /// Rebuild the archive index from the period files on disk.
  Reindex,
  /// Print a person's gap-filled ranking history as JSON.
  History { person_id: String },
  /// Print a participant's tournament history as JSON.
  TournamentHistory { name: String },
}

#[derive(Subcommand, Debug)]
enum PersonsCommand {
  /// Regenerate persons.json from every stored period.
  Build {
    /// Report what would be written without writing it.
    #[arg(long)]
    dry_run: bool,
  },
  /// Give every row without a person id an id, registering new persons.
  Assign {
    #[arg(long)]
    dry_run: bool,
  },
  /// Cross-check persons.json against the stored periods.
  Check,
  /// Render persons.json as a Markdown overview.
  Report {
    /// Output file (default: <data-dir>/persons/persons.md).
    #[arg(short, long, value_name = "FILE", conflicts_with = "stdout")]
    output: Option<PathBuf>,
    /// Print to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  data_dir: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let data_dir = args
    .data_dir
    .or(file_cfg.data_dir)
    .unwrap_or_else(|| PathBuf::from("data"));

  let store = FsStore::open(&data_dir)
    .await
    .with_context(|| format!("opening archive at {}", data_dir.display()))?;

  let mut out = io::stdout().lock();
  match args.command {
    Command::Persons(PersonsCommand::Build { dry_run }) => {
      commands::build_registry(&store, dry_run, &mut out).await
    }
    Command::Persons(PersonsCommand::Assign { dry_run }) => {
      commands::assign_ids(&store, dry_run, &mut out).await
    }
    Command::Persons(PersonsCommand::Check) => commands::check(&store, &mut out).await,
    Command::Persons(PersonsCommand::Report { output, stdout }) => {
      let path = (!stdout)
        .then(|| output.unwrap_or_else(|| store.root().join("persons/persons.md")));
      commands::report(&store, path.as_deref(), &mut out).await
    }
    Command::Reindex => commands::reindex(&store, &mut out).await,
    Command::History { person_id } => commands::history(&store, &person_id, &mut out).await,
    Command::TournamentHistory { name } => {
      commands::tournament_history(&store, &name, &mut out).await
    }
  }
}
