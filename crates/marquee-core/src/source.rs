//! The [`TableSource`] and [`TableSink`] traits.
//!
//! Implemented by storage backends (e.g. `marquee-store-csv`). The
//! [`TableStore`](crate::store::TableStore) depends on these abstractions,
//! never on a concrete file format.

use crate::{
  record::{Movie, Person, Rating, User, Worker},
  table::Table,
};

/// Reads the five tables. Each table is read independently so one failure
/// leaves the others loadable.
pub trait TableSource {
  type Error: std::error::Error + Send + Sync + 'static;

  fn read_persons(&self) -> Result<Vec<Person>, Self::Error>;

  fn read_users(&self) -> Result<Vec<User>, Self::Error>;

  fn read_workers(&self) -> Result<Vec<Worker>, Self::Error>;

  fn read_movies(&self) -> Result<Vec<Movie>, Self::Error>;

  fn read_ratings(&self) -> Result<Vec<Rating>, Self::Error>;
}

/// Writes the five tables back, one call per table.
pub trait TableSink {
  type Error: std::error::Error + Send + Sync + 'static;

  fn write_persons(&self, table: &Table<Person>) -> Result<(), Self::Error>;

  fn write_users(&self, table: &Table<User>) -> Result<(), Self::Error>;

  fn write_workers(&self, table: &Table<Worker>) -> Result<(), Self::Error>;

  fn write_movies(&self, table: &Table<Movie>) -> Result<(), Self::Error>;

  fn write_ratings(&self, table: &Table<Rating>) -> Result<(), Self::Error>;
}
