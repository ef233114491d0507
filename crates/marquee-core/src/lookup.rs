//! Single-row lookups by identifier.

use std::fmt;

use crate::{
  Error, Result,
  record::{Movie, Person, Rating, RatingKey, User, Worker},
  store::TableStore,
  table::Row,
};

/// Identifies a movie by id or by its (unique) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieRef {
  Id(i64),
  Name(String),
}

impl fmt::Display for MovieRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Id(id) => write!(f, "id {id}"),
      Self::Name(name) => write!(f, "{name:?}"),
    }
  }
}

/// Identifies a rating by row position or by its (user, movie) pair. A pair
/// may match several rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingRef {
  Position(usize),
  Pair(RatingKey),
}

impl fmt::Display for RatingRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Position(p) => write!(f, "row {p}"),
      Self::Pair(key) => key.fmt(f),
    }
  }
}

impl TableStore {
  pub fn person(&self, id: i64) -> Result<&Person> {
    self
      .table::<Person>()?
      .find_key(id)
      .map(|row| &row.record)
      .ok_or_else(|| Error::not_found("person", id))
  }

  pub fn user(&self, id: i64) -> Result<&User> {
    self
      .table::<User>()?
      .find_key(id)
      .map(|row| &row.record)
      .ok_or_else(|| Error::not_found("user", id))
  }

  pub fn worker(&self, id: i64) -> Result<&Worker> {
    self
      .table::<Worker>()?
      .find_key(id)
      .map(|row| &row.record)
      .ok_or_else(|| Error::not_found("worker", id))
  }

  pub fn movie(&self, movie: &MovieRef) -> Result<&Movie> {
    self.movie_row(movie).map(|row| &row.record)
  }

  /// First row matching `rating`.
  pub fn rating(&self, rating: RatingRef) -> Result<&Rating> {
    self.rating_row(rating).map(|row| &row.record)
  }

  pub(crate) fn movie_row(&self, movie: &MovieRef) -> Result<&Row<Movie>> {
    let movies = self.table::<Movie>()?;
    let row = match movie {
      MovieRef::Id(id) => movies.find_key(*id),
      MovieRef::Name(name) => movies.find(|m| &m.name == name),
    };
    row.ok_or_else(|| Error::not_found("movie", movie))
  }

  pub(crate) fn rating_row(&self, rating: RatingRef) -> Result<&Row<Rating>> {
    let ratings = self.table::<Rating>()?;
    let row = match rating {
      RatingRef::Position(p) => ratings.rows().iter().find(|row| row.position == p),
      RatingRef::Pair(key) => ratings.find_key(key),
    };
    row.ok_or_else(|| Error::not_found("rating", rating))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::fixture;

  #[test]
  fn movie_by_name_and_by_id_agree() {
    let store = fixture();
    let by_name = store.movie(&MovieRef::Name("Ghost".into())).unwrap();
    let by_id = store.movie(&MovieRef::Id(13)).unwrap();
    assert_eq!(by_name, by_id);
  }

  #[test]
  fn missing_rating_pair_is_not_found() {
    let store = fixture();
    let key = RatingKey { user_id: 5, movie_id: 10 };
    assert!(matches!(
      store.rating(RatingRef::Pair(key)),
      Err(Error::NotFound { what: "rating", .. })
    ));
    assert_eq!(store.rating(RatingRef::Position(0)).unwrap().movie_id, 10);
  }
}
