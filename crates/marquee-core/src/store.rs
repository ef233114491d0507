//! In-memory owner of the five tables.
//!
//! The store is constructed from a [`TableSource`], operated on by the
//! integrity, mutation and query modules, and optionally flushed to a
//! [`TableSink`]. A table that failed to load stays absent; operations that
//! depend on it fail with [`Error::NotLoaded`].

use std::collections::BTreeSet;

use strum::IntoEnumIterator as _;
use tracing::{info, warn};

use crate::{
  Error, Result,
  record::{Movie, Person, Rating, Record, TableKind, User, Worker},
  source::{TableSink, TableSource},
  table::Table,
};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// A table that could not be read or written.
#[derive(Debug)]
pub struct TableFailure {
  pub table: TableKind,
  pub error: Error,
}

/// Per-table failures of a bulk load or write. The remaining tables were
/// processed normally.
#[derive(Debug, Default)]
pub struct TableReport {
  pub failures: Vec<TableFailure>,
}

impl TableReport {
  pub fn is_ok(&self) -> bool { self.failures.is_empty() }

  pub fn failed_tables(&self) -> Vec<TableKind> {
    self.failures.iter().map(|f| f.table).collect()
  }
}

// ─── Table slots ─────────────────────────────────────────────────────────────

/// A record type with a slot in the [`TableStore`].
pub trait Stored: Record {
  #[doc(hidden)]
  fn slot(store: &TableStore) -> &Option<Table<Self>>;

  #[doc(hidden)]
  fn slot_mut(store: &mut TableStore) -> &mut Option<Table<Self>>;
}

macro_rules! stored {
  ($record:ty, $field:ident) => {
    impl Stored for $record {
      fn slot(store: &TableStore) -> &Option<Table<Self>> { &store.$field }

      fn slot_mut(store: &mut TableStore) -> &mut Option<Table<Self>> {
        &mut store.$field
      }
    }
  };
}

stored!(Person, persons);
stored!(User, users);
stored!(Worker, workers);
stored!(Movie, movies);
stored!(Rating, ratings);

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TableStore {
  persons: Option<Table<Person>>,
  users:   Option<Table<User>>,
  workers: Option<Table<Worker>>,
  movies:  Option<Table<Movie>>,
  ratings: Option<Table<Rating>>,
}

impl TableStore {
  /// A store with no tables loaded.
  pub fn new() -> Self { Self::default() }

  /// A store with all five tables present, e.g. built in memory.
  pub fn from_tables(
    persons: Table<Person>,
    users: Table<User>,
    workers: Table<Worker>,
    movies: Table<Movie>,
    ratings: Table<Rating>,
  ) -> Self {
    Self {
      persons: Some(persons),
      users:   Some(users),
      workers: Some(workers),
      movies:  Some(movies),
      ratings: Some(ratings),
    }
  }

  /// Read every table from `source`. A table whose read fails is logged,
  /// recorded in the report and left absent; the load itself never fails.
  pub fn load<S: TableSource>(source: &S) -> (Self, TableReport) {
    let mut report = TableReport::default();
    let store = Self {
      persons: load_table(source.read_persons(), &mut report),
      users:   load_table(source.read_users(), &mut report),
      workers: load_table(source.read_workers(), &mut report),
      movies:  load_table(source.read_movies(), &mut report),
      ratings: load_table(source.read_ratings(), &mut report),
    };
    (store, report)
  }

  /// Write every present table to `sink`. A failing table is logged and
  /// reported; the remaining tables are still written.
  pub fn write<S: TableSink>(&self, sink: &S) -> TableReport {
    let mut report = TableReport::default();
    if let Some(t) = &self.persons {
      write_table(t, sink.write_persons(t), &mut report);
    }
    if let Some(t) = &self.users {
      write_table(t, sink.write_users(t), &mut report);
    }
    if let Some(t) = &self.workers {
      write_table(t, sink.write_workers(t), &mut report);
    }
    if let Some(t) = &self.movies {
      write_table(t, sink.write_movies(t), &mut report);
    }
    if let Some(t) = &self.ratings {
      write_table(t, sink.write_ratings(t), &mut report);
    }
    report
  }

  /// The tables currently present.
  pub fn is_loaded(&self) -> BTreeSet<TableKind> {
    TableKind::iter().filter(|k| self.has(*k)).collect()
  }

  pub fn has(&self, kind: TableKind) -> bool {
    match kind {
      TableKind::Person => self.persons.is_some(),
      TableKind::User => self.users.is_some(),
      TableKind::Worker => self.workers.is_some(),
      TableKind::Movie => self.movies.is_some(),
      TableKind::Rating => self.ratings.is_some(),
    }
  }

  /// Fail with [`Error::NotLoaded`] naming the first absent table.
  pub fn require(&self, kinds: &[TableKind]) -> Result<()> {
    match kinds.iter().find(|k| !self.has(**k)) {
      Some(missing) => Err(Error::NotLoaded(*missing)),
      None => Ok(()),
    }
  }

  pub fn table<R: Stored>(&self) -> Result<&Table<R>> {
    R::slot(self).as_ref().ok_or(Error::NotLoaded(R::KIND))
  }

  pub fn table_mut<R: Stored>(&mut self) -> Result<&mut Table<R>> {
    R::slot_mut(self).as_mut().ok_or(Error::NotLoaded(R::KIND))
  }

  /// Install (or replace) a whole table.
  pub fn set_table<R: Stored>(&mut self, table: Table<R>) {
    *R::slot_mut(self) = Some(table);
  }

  /// Row counts of the present tables.
  pub fn row_counts(&self) -> Vec<(TableKind, usize)> {
    let mut counts = Vec::new();
    if let Some(t) = &self.persons {
      counts.push((TableKind::Person, t.len()));
    }
    if let Some(t) = &self.users {
      counts.push((TableKind::User, t.len()));
    }
    if let Some(t) = &self.workers {
      counts.push((TableKind::Worker, t.len()));
    }
    if let Some(t) = &self.movies {
      counts.push((TableKind::Movie, t.len()));
    }
    if let Some(t) = &self.ratings {
      counts.push((TableKind::Rating, t.len()));
    }
    counts
  }
}

fn load_table<R, E>(read: Result<Vec<R>, E>, report: &mut TableReport) -> Option<Table<R>>
where
  R: Record,
  E: std::error::Error + Send + Sync + 'static,
{
  match read {
    Ok(rows) => {
      info!(table = %R::KIND, rows = rows.len(), "table loaded");
      Some(rows.into_iter().collect())
    }
    Err(e) => {
      warn!(table = %R::KIND, error = %e, "table could not be loaded; leaving it absent");
      report.failures.push(TableFailure {
        table: R::KIND,
        error: Error::Load { table: R::KIND, source: Box::new(e) },
      });
      None
    }
  }
}

fn write_table<R, E>(table: &Table<R>, written: Result<(), E>, report: &mut TableReport)
where
  R: Record,
  E: std::error::Error + Send + Sync + 'static,
{
  match written {
    Ok(()) => info!(table = %R::KIND, rows = table.len(), "table written"),
    Err(e) => {
      warn!(table = %R::KIND, error = %e, "table could not be written");
      report.failures.push(TableFailure {
        table: R::KIND,
        error: Error::Write { table: R::KIND, source: Box::new(e) },
      });
    }
  }
}
