//! Read-only statistics over a consistent [`TableStore`].
//!
//! Every query returns typed rows that serialize with named fields; turning
//! them into tables or JSON is left to the caller. Filter arguments are
//! [`Filter`] values and every requested value must occur in the data, so a
//! typo is reported as [`Error::NotFound`] naming it instead of silently
//! producing an empty result.

mod movies;
mod people;
mod ratings;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use tracing::debug;

pub use self::{
  movies::YearGenreCount,
  people::{PersonGroupCount, PositionCount, UserGroupCount},
  ratings::{MeanRating, MovieRatingFilter, RatingSummary, UserRatingFilter, UserRatingReport},
};
use crate::{
  Error, Result,
  filter::Filter,
  genre::Genre,
  record::TableKind,
  store::{Stored, TableStore},
  table::Table,
};

/// Query entry point, borrowing the store for the lifetime of the results.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
  store: &'a TableStore,
}

impl<'a> QueryEngine<'a> {
  pub fn new(store: &'a TableStore) -> Self { Self { store } }

  fn table<R: Stored>(&self) -> Result<&'a Table<R>> { self.store.table::<R>() }

  /// Like [`Self::table`], but an empty table is an [`Error::EmptyTable`].
  fn non_empty<R: Stored>(&self) -> Result<&'a Table<R>> {
    let table = self.table::<R>()?;
    if table.is_empty() {
      return Err(Error::EmptyTable(R::KIND));
    }
    Ok(table)
  }

  fn require(&self, kinds: &[TableKind]) -> Result<()> { self.store.require(kinds) }
}

/// The genres a genre filter selects: the whole vocabulary when omitted.
fn selected_genres(genres: &Filter<String>) -> Result<BTreeSet<Genre>> {
  if genres.is_any() {
    return Ok(Genre::vocabulary().collect());
  }
  genres.values().iter().map(|label| Genre::lookup(label)).collect()
}

/// Ends a filter stage: an empty result becomes [`Error::NoMatch`].
fn stage<T>(rows: Vec<T>, name: &str, describe: impl FnOnce() -> String) -> Result<Vec<T>> {
  debug!(stage = name, rows = rows.len(), "filter stage applied");
  if rows.is_empty() {
    return Err(Error::NoMatch(describe()));
  }
  Ok(rows)
}

/// Comma-separated list of filter values for diagnostics.
fn list<T: std::fmt::Display>(values: &[T]) -> String {
  values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
