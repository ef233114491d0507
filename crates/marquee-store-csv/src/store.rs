//! [`CsvTables`]: the CSV implementation of [`TableSource`] and
//! [`TableSink`].

use std::{
  fs::File,
  path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use marquee_core::{
  TableSink, TableSource,
  record::{Movie, Person, Rating, Record, User, Worker},
  table::Table,
};

use crate::{
  Error, Result,
  encode::{
    Cells, Columns, decode_movie, decode_person, decode_rating, decode_user, decode_worker,
    encode_movie, encode_person, encode_rating, encode_user, encode_worker,
  },
  schema::{
    MOVIES_FILE, PERSONS_FILE, RATINGS_FILE, USERS_FILE, WORKERS_FILE, movie_headers, person,
    rating, user, worker,
  },
};

// ─── Paths ───────────────────────────────────────────────────────────────────

/// Location of each table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePaths {
  pub persons: PathBuf,
  pub users:   PathBuf,
  pub workers: PathBuf,
  pub movies:  PathBuf,
  pub ratings: PathBuf,
}

impl TablePaths {
  /// The default file names inside `dir`.
  pub fn in_dir(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref();
    Self {
      persons: dir.join(PERSONS_FILE),
      users:   dir.join(USERS_FILE),
      workers: dir.join(WORKERS_FILE),
      movies:  dir.join(MOVIES_FILE),
      ratings: dir.join(RATINGS_FILE),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dataset stored as five CSV files.
#[derive(Debug, Clone)]
pub struct CsvTables {
  paths: TablePaths,
}

impl CsvTables {
  pub fn new(paths: TablePaths) -> Self { Self { paths } }

  /// Tables with the default file names inside `dir`.
  pub fn in_dir(dir: impl AsRef<Path>) -> Self { Self::new(TablePaths::in_dir(dir)) }

  pub fn paths(&self) -> &TablePaths { &self.paths }
}

fn read_table<R, I, H>(
  path: &Path,
  required: I,
  decode: fn(&Cells<'_>) -> Result<R>,
) -> Result<Vec<R>>
where
  R: Record,
  I: IntoIterator<Item = H>,
  H: AsRef<str>,
{
  let file = File::open(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
  let csv_err = |source| Error::Csv { path: path.to_owned(), source };

  let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
  let headers = reader.headers().map_err(csv_err)?.clone();
  let required: Vec<H> = required.into_iter().collect();
  let columns = Columns::new(path, &headers, required.iter().map(|h| h.as_ref()))?;

  let mut rows = Vec::new();
  let mut record = StringRecord::new();
  while reader.read_record(&mut record).map_err(csv_err)? {
    let line = record.position().map_or(0, |p| p.line());
    rows.push(decode(&Cells { path, line, record: &record, columns: &columns })?);
  }
  debug!(table = %R::KIND, path = %path.display(), rows = rows.len(), "csv table read");
  Ok(rows)
}

fn write_table<R, H>(
  path: &Path,
  headers: &[H],
  table: &Table<R>,
  encode: fn(&R) -> Vec<String>,
) -> Result<()>
where
  R: Record,
  H: AsRef<[u8]>,
{
  let file = File::create(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
  let csv_err = |source| Error::Csv { path: path.to_owned(), source };

  let mut writer = WriterBuilder::new().from_writer(file);
  writer.write_record(headers).map_err(csv_err)?;
  for row in table.iter() {
    writer.write_record(encode(row)).map_err(csv_err)?;
  }
  writer
    .flush()
    .map_err(|source| Error::Io { path: path.to_owned(), source })?;
  debug!(table = %R::KIND, path = %path.display(), rows = table.len(), "csv table written");
  Ok(())
}

impl TableSource for CsvTables {
  type Error = Error;

  fn read_persons(&self) -> Result<Vec<Person>> {
    read_table(&self.paths.persons, person::HEADERS, decode_person)
  }

  fn read_users(&self) -> Result<Vec<User>> {
    read_table(&self.paths.users, user::HEADERS, decode_user)
  }

  fn read_workers(&self) -> Result<Vec<Worker>> {
    read_table(&self.paths.workers, worker::HEADERS, decode_worker)
  }

  fn read_movies(&self) -> Result<Vec<Movie>> {
    read_table(&self.paths.movies, movie_headers(), decode_movie)
  }

  fn read_ratings(&self) -> Result<Vec<Rating>> {
    read_table(&self.paths.ratings, rating::HEADERS, decode_rating)
  }
}

impl TableSink for CsvTables {
  type Error = Error;

  fn write_persons(&self, table: &Table<Person>) -> Result<()> {
    write_table(&self.paths.persons, person::HEADERS.as_slice(), table, encode_person)
  }

  fn write_users(&self, table: &Table<User>) -> Result<()> {
    write_table(&self.paths.users, user::HEADERS.as_slice(), table, encode_user)
  }

  fn write_workers(&self, table: &Table<Worker>) -> Result<()> {
    write_table(&self.paths.workers, worker::HEADERS.as_slice(), table, encode_worker)
  }

  fn write_movies(&self, table: &Table<Movie>) -> Result<()> {
    write_table(&self.paths.movies, movie_headers().as_slice(), table, encode_movie)
  }

  fn write_ratings(&self, table: &Table<Rating>) -> Result<()> {
    write_table(&self.paths.ratings, rating::HEADERS.as_slice(), table, encode_rating)
  }
}
