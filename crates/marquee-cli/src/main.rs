//! `marquee`: query and edit a movie-ratings dataset stored as CSV files.
//!
//! # Usage
//!
//! ```
//! marquee --data-dir ./data movie per-year --start 1990 --end 1995 --genre Comedy
//! marquee rating by-user --occupation engineer --min-age 30 --json
//! marquee person add --full-name "Ana Pérez" --year-of-birth 1980 --gender F --zip-code 02139
//! marquee check
//! ```
//!
//! Settings come from `marquee.toml` (or `--config`), then `MARQUEE_*`
//! environment variables, then flags.

mod args;
mod prompt;
mod render;
mod run;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use marquee_store_csv::{CsvTables, TablePaths};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{args::Cli, render::Output, run::Session};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Debug, Deserialize)]
struct Settings {
  #[serde(default = "default_data_dir")]
  data_dir: PathBuf,
  /// Per-table file names, relative to `data_dir` unless absolute.
  #[serde(default)]
  files:    FileNames,
}

#[derive(Debug, Default, Deserialize)]
struct FileNames {
  persons: Option<PathBuf>,
  users:   Option<PathBuf>,
  workers: Option<PathBuf>,
  movies:  Option<PathBuf>,
  ratings: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf { PathBuf::from(".") }

impl Settings {
  fn load(cli: &Cli) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder()
      .add_source(config::File::from(cli.config.clone()).required(false))
      .add_source(config::Environment::with_prefix("MARQUEE").separator("__"));
    if let Some(dir) = &cli.data_dir {
      builder = builder
        .set_override("data_dir", dir.to_string_lossy().into_owned())
        .context("invalid --data-dir")?;
    }
    builder
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  fn table_paths(&self) -> TablePaths {
    let mut paths = TablePaths::in_dir(&self.data_dir);
    let dir = &self.data_dir;
    let files = &self.files;
    for (slot, name) in [
      (&mut paths.persons, &files.persons),
      (&mut paths.users, &files.users),
      (&mut paths.workers, &files.workers),
      (&mut paths.movies, &files.movies),
      (&mut paths.ratings, &files.ratings),
    ] {
      if let Some(name) = name {
        *slot = dir.join(name);
      }
    }
    paths
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli)?;
  let paths = settings.table_paths();
  tracing::debug!(?paths, "resolved table files");

  let mut session = Session::open(
    CsvTables::new(paths),
    Output { json: cli.json },
    cli.on_conflict,
  );
  session.run(cli.command)
}
