//! Record validation.
//!
//! Each row type implements [`Validate`]: range, uniqueness and
//! foreign-key checks against the current store. Drafts (caller input with
//! raw date strings and genre labels) implement [`Draft`], whose type check
//! parses them into a row. Mutations run every check before touching the
//! store.

use chrono::{Datelike as _, Utc};
use tracing::debug;

use crate::{
  Error, Result,
  record::{Movie, Person, Rating, TableKind, User, Worker},
  store::{Stored, TableStore},
};

pub const MIN_BIRTH_YEAR: i32 = 1900;
pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 5;

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Caller input that becomes a row once its formatted fields parse.
pub trait Draft {
  type Row: Validate;

  /// Parse dates and labels. Auto-assigned ids are left at zero.
  fn check_types(&self) -> Result<Self::Row>;
}

/// Checks a staged row against the store.
///
/// `exclude` is the position of the row being updated; it is left out of
/// every collision check so a row may keep its own id and name.
pub trait Validate: Stored {
  fn check_ranges(&self) -> Result<()> { Ok(()) }

  fn check_unique(&self, store: &TableStore, exclude: Option<usize>) -> Result<()> {
    reject_identical(self, store, exclude)
  }

  fn check_foreign_keys(&self, _store: &TableStore) -> Result<()> { Ok(()) }

  /// Run every check; the first failure wins.
  fn validate(&self, store: &TableStore, exclude: Option<usize>) -> Result<()> {
    self.check_ranges()?;
    self.check_unique(store, exclude)?;
    self.check_foreign_keys(store)?;
    debug!(table = %Self::KIND, key = %self.key(), "row validated");
    Ok(())
  }
}

// ─── Shared checks ───────────────────────────────────────────────────────────

fn reject_identical<R: Stored>(
  row: &R,
  store: &TableStore,
  exclude: Option<usize>,
) -> Result<()> {
  if store.table::<R>()?.any_other(exclude, |other| other == row) {
    return Err(Error::duplicate(R::KIND, "an identical row already exists"));
  }
  Ok(())
}

fn reject_taken_id<R: Stored<Key = i64>>(
  row: &R,
  store: &TableStore,
  exclude: Option<usize>,
) -> Result<()> {
  let id = row.key();
  if store.table::<R>()?.any_other(exclude, |other| other.key() == id) {
    return Err(Error::duplicate(R::KIND, format!("id {id} is already assigned")));
  }
  Ok(())
}

fn require_key<P: Stored<Key = i64>>(
  store: &TableStore,
  id: i64,
  referrer: TableKind,
) -> Result<()> {
  if store.table::<P>()?.contains_key(id) {
    Ok(())
  } else {
    Err(Error::Referential { table: P::KIND, id, referrer })
  }
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::range(field, format!("{value:?}"), "a non-empty value"));
  }
  Ok(())
}

// ─── Row impls ───────────────────────────────────────────────────────────────

impl Validate for Person {
  fn check_ranges(&self) -> Result<()> {
    require_text("full name", &self.full_name)?;
    let this_year = Utc::now().year();
    if !(MIN_BIRTH_YEAR..=this_year).contains(&self.year_of_birth) {
      return Err(Error::range(
        "year of birth",
        self.year_of_birth,
        format!("{MIN_BIRTH_YEAR}..={this_year}"),
      ));
    }
    Ok(())
  }

  fn check_unique(&self, store: &TableStore, exclude: Option<usize>) -> Result<()> {
    reject_identical(self, store, exclude)?;
    reject_taken_id(self, store, exclude)
  }
}

impl Validate for User {
  fn check_ranges(&self) -> Result<()> { require_text("occupation", &self.occupation) }

  fn check_unique(&self, store: &TableStore, exclude: Option<usize>) -> Result<()> {
    reject_identical(self, store, exclude)?;
    reject_taken_id(self, store, exclude)
  }

  fn check_foreign_keys(&self, store: &TableStore) -> Result<()> {
    require_key::<Person>(store, self.id, TableKind::User)
  }
}

impl Validate for Worker {
  fn check_ranges(&self) -> Result<()> { require_text("position", &self.position) }

  fn check_unique(&self, store: &TableStore, exclude: Option<usize>) -> Result<()> {
    reject_identical(self, store, exclude)?;
    reject_taken_id(self, store, exclude)
  }

  fn check_foreign_keys(&self, store: &TableStore) -> Result<()> {
    require_key::<Person>(store, self.id, TableKind::Worker)
  }
}

impl Validate for Movie {
  fn check_ranges(&self) -> Result<()> {
    require_text("movie name", &self.name)?;
    if self.genres.is_empty() {
      return Err(Error::range("genres", "none", "at least one registered genre"));
    }
    Ok(())
  }

  fn check_unique(&self, store: &TableStore, exclude: Option<usize>) -> Result<()> {
    reject_identical(self, store, exclude)?;
    reject_taken_id(self, store, exclude)?;
    let movies = store.table::<Movie>()?;
    if movies.any_other(exclude, |m| m.name == self.name) {
      return Err(Error::duplicate(
        TableKind::Movie,
        format!("a movie named {:?} is already registered", self.name),
      ));
    }
    Ok(())
  }
}

impl Validate for Rating {
  fn check_ranges(&self) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
      return Err(Error::range(
        "rating",
        self.rating,
        format!("{MIN_RATING}..={MAX_RATING}"),
      ));
    }
    Ok(())
  }

  fn check_foreign_keys(&self, store: &TableStore) -> Result<()> {
    require_key::<User>(store, self.user_id, TableKind::Rating)?;
    require_key::<Movie>(store, self.movie_id, TableKind::Rating)
  }
}
