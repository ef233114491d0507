//! Create, update and delete operations.
//!
//! Every operation validates the complete row before the store is touched,
//! so a rejected mutation leaves the tables exactly as they were. Expected
//! failures are returned as [`Error`] values.
//!
//! Person writes go through a three-way [`PersonOutcome`]: a full-name
//! collision with a different person is surfaced to the caller as
//! [`PersonOutcome::NeedsDecision`] and resolved with
//! [`TableStore::resolve_person`].

use std::collections::HashSet;

use chrono::{NaiveDateTime, Timelike as _, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
  Error, Result,
  format::{parse_date, parse_timestamp},
  genre::Genre,
  integrity::remove_keyed,
  lookup::{MovieRef, RatingRef},
  record::{Category, Gender, Movie, Person, Rating, Record, TableKind, User, Worker},
  store::{Stored, TableStore},
  validate::{Draft, Validate},
};

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// Input to [`TableStore::create_person`]. Without an id, `max + 1` is used.
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub id:            Option<i64>,
  pub full_name:     String,
  pub year_of_birth: i32,
  pub gender:        Gender,
  pub zip_code:      String,
}

/// Input to [`TableStore::create_user`]. `active_since` defaults to now.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub id:           i64,
  pub occupation:   String,
  pub active_since: Option<String>,
}

/// Input to [`TableStore::create_worker`]. `start_date` defaults to now.
#[derive(Debug, Clone)]
pub struct NewWorker {
  pub id:            i64,
  pub position:      String,
  pub category:      Category,
  pub working_hours: String,
  pub start_date:    Option<String>,
}

/// Input to [`TableStore::create_movie`]. The id is always assigned.
#[derive(Debug, Clone)]
pub struct NewMovie {
  pub name:         String,
  /// `YYYY-MM-DD`.
  pub release_date: String,
  pub url:          Option<String>,
  /// Registered genre labels; at least one.
  pub genres:       Vec<String>,
}

/// Input to [`TableStore::create_rating`].
#[derive(Debug, Clone)]
pub struct NewRating {
  pub user_id:  i64,
  pub movie_id: i64,
  pub rating:   i32,
  /// `YYYY-MM-DD HH:MM:SS`.
  pub date:     String,
}

fn now() -> NaiveDateTime {
  let now = Utc::now().naive_utc();
  now.with_nanosecond(0).unwrap_or(now)
}

fn timestamp_or_now(value: Option<&str>) -> Result<NaiveDateTime> {
  value.map_or_else(|| Ok(now()), parse_timestamp)
}

fn genre_set(labels: &[String]) -> Result<std::collections::BTreeSet<Genre>> {
  labels.iter().map(|l| Genre::registered(l)).collect()
}

impl Draft for NewPerson {
  type Row = Person;

  fn check_types(&self) -> Result<Person> {
    Ok(Person {
      id:            self.id.unwrap_or(0),
      full_name:     self.full_name.clone(),
      year_of_birth: self.year_of_birth,
      gender:        self.gender,
      zip_code:      self.zip_code.clone(),
    })
  }
}

impl Draft for NewUser {
  type Row = User;

  fn check_types(&self) -> Result<User> {
    Ok(User {
      id:           self.id,
      occupation:   self.occupation.clone(),
      active_since: timestamp_or_now(self.active_since.as_deref())?,
    })
  }
}

impl Draft for NewWorker {
  type Row = Worker;

  fn check_types(&self) -> Result<Worker> {
    Ok(Worker {
      id:            self.id,
      position:      self.position.clone(),
      category:      self.category.clone(),
      working_hours: self.working_hours.clone(),
      start_date:    timestamp_or_now(self.start_date.as_deref())?,
    })
  }
}

impl Draft for NewMovie {
  type Row = Movie;

  fn check_types(&self) -> Result<Movie> {
    Ok(Movie {
      id:           0,
      name:         self.name.clone(),
      release_date: parse_date(&self.release_date)?,
      url:          self.url.clone(),
      genres:       genre_set(&self.genres)?,
    })
  }
}

impl Draft for NewRating {
  type Row = Rating;

  fn check_types(&self) -> Result<Rating> {
    Ok(Rating {
      user_id:   self.user_id,
      movie_id:  self.movie_id,
      rating:    self.rating,
      timestamp: parse_timestamp(&self.date)?,
    })
  }
}

// ─── Patches ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
  pub full_name:     Option<String>,
  pub year_of_birth: Option<i32>,
  pub gender:        Option<Gender>,
  pub zip_code:      Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  pub occupation:   Option<String>,
  pub active_since: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerPatch {
  pub position:      Option<String>,
  pub category:      Option<Category>,
  pub working_hours: Option<String>,
  pub start_date:    Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MoviePatch {
  pub name:         Option<String>,
  pub release_date: Option<String>,
  /// `Some(None)` clears the URL.
  pub url:          Option<Option<String>>,
  pub genres:       Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct RatingPatch {
  pub rating: Option<i32>,
  pub date:   Option<String>,
}

/// Merges a patch into the current row, parsing any formatted fields.
pub trait Patch<R> {
  fn apply(&self, current: &R) -> Result<R>;
}

impl Patch<Person> for PersonPatch {
  fn apply(&self, current: &Person) -> Result<Person> {
    Ok(Person {
      id:            current.id,
      full_name:     self.full_name.clone().unwrap_or_else(|| current.full_name.clone()),
      year_of_birth: self.year_of_birth.unwrap_or(current.year_of_birth),
      gender:        self.gender.unwrap_or(current.gender),
      zip_code:      self.zip_code.clone().unwrap_or_else(|| current.zip_code.clone()),
    })
  }
}

impl Patch<User> for UserPatch {
  fn apply(&self, current: &User) -> Result<User> {
    Ok(User {
      id:           current.id,
      occupation:   self.occupation.clone().unwrap_or_else(|| current.occupation.clone()),
      active_since: match &self.active_since {
        Some(s) => parse_timestamp(s)?,
        None => current.active_since,
      },
    })
  }
}

impl Patch<Worker> for WorkerPatch {
  fn apply(&self, current: &Worker) -> Result<Worker> {
    Ok(Worker {
      id:            current.id,
      position:      self.position.clone().unwrap_or_else(|| current.position.clone()),
      category:      self.category.clone().unwrap_or_else(|| current.category.clone()),
      working_hours: self
        .working_hours
        .clone()
        .unwrap_or_else(|| current.working_hours.clone()),
      start_date:    match &self.start_date {
        Some(s) => parse_timestamp(s)?,
        None => current.start_date,
      },
    })
  }
}

impl Patch<Movie> for MoviePatch {
  fn apply(&self, current: &Movie) -> Result<Movie> {
    Ok(Movie {
      id:           current.id,
      name:         self.name.clone().unwrap_or_else(|| current.name.clone()),
      release_date: match &self.release_date {
        Some(s) => parse_date(s)?,
        None => current.release_date,
      },
      url:          self.url.clone().unwrap_or_else(|| current.url.clone()),
      genres:       match &self.genres {
        Some(labels) => genre_set(labels)?,
        None => current.genres.clone(),
      },
    })
  }
}

impl Patch<Rating> for RatingPatch {
  fn apply(&self, current: &Rating) -> Result<Rating> {
    Ok(Rating {
      user_id:   current.user_id,
      movie_id:  current.movie_id,
      rating:    self.rating.unwrap_or(current.rating),
      timestamp: match &self.date {
        Some(s) => parse_timestamp(s)?,
        None => current.timestamp,
      },
    })
  }
}

// ─── Person outcome ──────────────────────────────────────────────────────────

/// Result of a person create or update.
#[derive(Debug)]
#[must_use]
pub enum PersonOutcome {
  Created(Person),
  Updated(Person),
  /// Another person already has this full name; the caller must decide.
  NeedsDecision(PendingPerson),
  Rejected(Error),
}

/// A validated person row held back because its full name matches other
/// rows.
#[derive(Debug, Clone)]
pub struct PendingPerson {
  staged:    Person,
  /// Position of the row under update; `None` for a create.
  target:    Option<usize>,
  auto_id:   bool,
  conflicts: Vec<Person>,
}

impl PendingPerson {
  pub fn staged(&self) -> &Person { &self.staged }

  /// The existing rows sharing the staged full name.
  pub fn conflicts(&self) -> &[Person] { &self.conflicts }

  pub fn is_update(&self) -> bool { self.target.is_some() }
}

/// The caller's answer to [`PersonOutcome::NeedsDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonDecision {
  /// Write the staged row anyway (as a new person, or as the update).
  ProceedAsNew,
  /// Write the staged data onto the existing person with this id.
  AttachTo(i64),
  Abort,
}

macro_rules! attempt {
  ($e:expr) => {
    match $e {
      Ok(v) => v,
      Err(e) => return PersonOutcome::Rejected(e),
    }
  };
}

/// Removed row counts of a (possibly cascading) delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Removed {
  pub persons: usize,
  pub users:   usize,
  pub workers: usize,
  pub movies:  usize,
  pub ratings: usize,
}

/// Tables an operation on `kind` needs: persons, the kind's own table and
/// whatever it references.
pub fn dependencies(kind: TableKind) -> &'static [TableKind] {
  use TableKind as K;
  match kind {
    K::Person => &[K::Person],
    K::User => &[K::Person, K::User],
    K::Worker => &[K::Person, K::Worker],
    K::Movie => &[K::Person, K::Movie],
    K::Rating => &[K::Person, K::User, K::Movie, K::Rating],
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

impl TableStore {
  fn insert_validated<R: Validate>(&mut self, row: R) -> Result<R> {
    self.require(dependencies(R::KIND))?;
    row.validate(self, None)?;
    self.table_mut::<R>()?.push(row.clone());
    info!(table = %R::KIND, key = %row.key(), "row created");
    Ok(row)
  }

  fn replace_validated<R: Validate>(&mut self, position: usize, row: R) -> Result<R> {
    self.require(dependencies(R::KIND))?;
    row.validate(self, Some(position))?;
    self.table_mut::<R>()?.replace(position, row.clone());
    info!(table = %R::KIND, key = %row.key(), "row updated");
    Ok(row)
  }

  fn position_of<R: Stored>(&self, key: R::Key, what: &'static str) -> Result<(usize, R)> {
    self
      .table::<R>()?
      .find_key(key)
      .map(|row| (row.position, row.record.clone()))
      .ok_or_else(|| Error::not_found(what, key))
  }

  // ── Persons ──────────────────────────────────────────────────────────────

  pub fn create_person(&mut self, draft: NewPerson) -> PersonOutcome {
    attempt!(self.require(dependencies(TableKind::Person)));
    let mut row = attempt!(draft.check_types());
    if draft.id.is_none() {
      row.id = attempt!(self.table::<Person>()).next_id();
    }
    attempt!(row.validate(self, None));

    let conflicts = attempt!(self.name_conflicts(&row.full_name, None));
    if !conflicts.is_empty() {
      return PersonOutcome::NeedsDecision(PendingPerson {
        staged: row,
        target: None,
        auto_id: draft.id.is_none(),
        conflicts,
      });
    }

    match self.insert_validated(row) {
      Ok(p) => PersonOutcome::Created(p),
      Err(e) => PersonOutcome::Rejected(e),
    }
  }

  pub fn update_person(&mut self, id: i64, patch: &PersonPatch) -> PersonOutcome {
    attempt!(self.require(dependencies(TableKind::Person)));
    let (position, current) = attempt!(self.position_of::<Person>(id, "person"));
    let row = attempt!(patch.apply(&current));
    attempt!(row.validate(self, Some(position)));

    if row.full_name != current.full_name {
      let conflicts = attempt!(self.name_conflicts(&row.full_name, Some(position)));
      if !conflicts.is_empty() {
        return PersonOutcome::NeedsDecision(PendingPerson {
          staged: row,
          target: Some(position),
          auto_id: false,
          conflicts,
        });
      }
    }

    match self.replace_validated(position, row) {
      Ok(p) => PersonOutcome::Updated(p),
      Err(e) => PersonOutcome::Rejected(e),
    }
  }

  /// Apply the caller's decision to a held-back person write. The staged row
  /// is validated again against the current store.
  pub fn resolve_person(
    &mut self,
    pending: PendingPerson,
    decision: PersonDecision,
  ) -> PersonOutcome {
    let PendingPerson { mut staged, target, auto_id, .. } = pending;
    match decision {
      PersonDecision::Abort => {
        info!(name = %staged.full_name, "person write aborted by caller");
        PersonOutcome::Rejected(Error::Aborted)
      }
      PersonDecision::ProceedAsNew => match target {
        None => {
          if auto_id {
            staged.id = attempt!(self.table::<Person>()).next_id();
          }
          match self.insert_validated(staged) {
            Ok(p) => PersonOutcome::Created(p),
            Err(e) => PersonOutcome::Rejected(e),
          }
        }
        Some(position) => match self.replace_validated(position, staged) {
          Ok(p) => PersonOutcome::Updated(p),
          Err(e) => PersonOutcome::Rejected(e),
        },
      },
      PersonDecision::AttachTo(id) => {
        let (position, _) = attempt!(self.position_of::<Person>(id, "person"));
        staged.id = id;
        match self.replace_validated(position, staged) {
          Ok(p) => PersonOutcome::Updated(p),
          Err(e) => PersonOutcome::Rejected(e),
        }
      }
    }
  }

  fn name_conflicts(&self, full_name: &str, exclude: Option<usize>) -> Result<Vec<Person>> {
    Ok(
      self
        .table::<Person>()?
        .rows()
        .iter()
        .filter(|row| Some(row.position) != exclude && row.record.full_name == full_name)
        .map(|row| row.record.clone())
        .collect(),
    )
  }

  /// Remove a person together with the user, worker and rating rows keyed to
  /// its id. Absent dependent tables are skipped.
  pub fn delete_person(&mut self, id: i64) -> Result<Removed> {
    self.require(dependencies(TableKind::Person))?;
    let (position, _) = self.position_of::<Person>(id, "person")?;
    let keys = HashSet::from([id]);

    let mut removed = Removed::default();
    if let Ok(ratings) = self.table_mut::<Rating>() {
      removed.ratings = remove_keyed(ratings, &keys, |r| r.user_id);
    }
    if let Ok(users) = self.table_mut::<User>() {
      removed.users = remove_keyed(users, &keys, |u| u.id);
    }
    if let Ok(workers) = self.table_mut::<Worker>() {
      removed.workers = remove_keyed(workers, &keys, |w| w.id);
    }
    let persons = self.table_mut::<Person>()?;
    persons.remove(position);
    removed.persons = 1;

    self.reindex_all();
    info!(id, ?removed, "person deleted");
    Ok(removed)
  }

  // ── Users ────────────────────────────────────────────────────────────────

  pub fn create_user(&mut self, draft: NewUser) -> Result<User> {
    self.require(dependencies(TableKind::User))?;
    let row = draft.check_types()?;
    self.insert_validated(row)
  }

  pub fn update_user(&mut self, id: i64, patch: &UserPatch) -> Result<User> {
    self.require(dependencies(TableKind::User))?;
    let (position, current) = self.position_of::<User>(id, "user")?;
    let row = patch.apply(&current)?;
    self.replace_validated(position, row)
  }

  /// Remove a user and its ratings, so no rating is left without a user.
  pub fn delete_user(&mut self, id: i64) -> Result<Removed> {
    self.require(dependencies(TableKind::User))?;
    let (position, _) = self.position_of::<User>(id, "user")?;
    let mut removed = Removed::default();
    if let Ok(ratings) = self.table_mut::<Rating>() {
      removed.ratings = remove_keyed(ratings, &HashSet::from([id]), |r| r.user_id);
    }
    self.table_mut::<User>()?.remove(position);
    removed.users = 1;

    self.reindex_all();
    info!(id, ?removed, "user deleted");
    Ok(removed)
  }

  // ── Workers ──────────────────────────────────────────────────────────────

  pub fn create_worker(&mut self, draft: NewWorker) -> Result<Worker> {
    self.require(dependencies(TableKind::Worker))?;
    let row = draft.check_types()?;
    self.insert_validated(row)
  }

  pub fn update_worker(&mut self, id: i64, patch: &WorkerPatch) -> Result<Worker> {
    self.require(dependencies(TableKind::Worker))?;
    let (position, current) = self.position_of::<Worker>(id, "worker")?;
    let row = patch.apply(&current)?;
    self.replace_validated(position, row)
  }

  pub fn delete_worker(&mut self, id: i64) -> Result<Worker> {
    self.require(dependencies(TableKind::Worker))?;
    let (position, _) = self.position_of::<Worker>(id, "worker")?;
    let workers = self.table_mut::<Worker>()?;
    let worker = workers.remove(position).ok_or_else(|| Error::not_found("worker", id))?;
    workers.reindex();
    info!(id, "worker deleted");
    Ok(worker)
  }

  // ── Movies ───────────────────────────────────────────────────────────────

  /// Insert a movie with `id = max + 1` (1 for an empty table).
  pub fn create_movie(&mut self, draft: NewMovie) -> Result<Movie> {
    self.require(dependencies(TableKind::Movie))?;
    let mut row = draft.check_types()?;
    row.id = self.table::<Movie>()?.next_id();
    self.insert_validated(row)
  }

  pub fn update_movie(&mut self, movie: &MovieRef, patch: &MoviePatch) -> Result<Movie> {
    self.require(dependencies(TableKind::Movie))?;
    let (position, current) = {
      let row = self.movie_row(movie)?;
      (row.position, row.record.clone())
    };
    let row = patch.apply(&current)?;
    self.replace_validated(position, row)
  }

  /// Remove a movie and every rating of it.
  pub fn delete_movie(&mut self, movie: &MovieRef) -> Result<Removed> {
    self.require(dependencies(TableKind::Movie))?;
    let (position, id) = {
      let row = self.movie_row(movie)?;
      (row.position, row.record.id)
    };
    let mut removed = Removed::default();
    if let Ok(ratings) = self.table_mut::<Rating>() {
      removed.ratings = remove_keyed(ratings, &HashSet::from([id]), |r| r.movie_id);
    }
    self.table_mut::<Movie>()?.remove(position);
    removed.movies = 1;

    self.reindex_all();
    info!(%movie, ?removed, "movie deleted");
    Ok(removed)
  }

  // ── Ratings ──────────────────────────────────────────────────────────────

  /// Insert a rating. Several ratings of the same (user, movie) pair are
  /// allowed; only an identical row is rejected.
  pub fn create_rating(&mut self, draft: NewRating) -> Result<Rating> {
    self.require(dependencies(TableKind::Rating))?;
    let row = draft.check_types()?;
    self.insert_validated(row)
  }

  /// Update the first rating matching `rating`.
  pub fn update_rating(&mut self, rating: RatingRef, patch: &RatingPatch) -> Result<Rating> {
    self.require(dependencies(TableKind::Rating))?;
    let (position, current) = {
      let row = self.rating_row(rating)?;
      (row.position, row.record.clone())
    };
    let row = patch.apply(&current)?;
    self.replace_validated(position, row)
  }

  /// Remove the rating at a position, or every rating of a pair.
  pub fn delete_rating(&mut self, rating: RatingRef) -> Result<usize> {
    self.require(dependencies(TableKind::Rating))?;
    self.rating_row(rating)?;
    let ratings = self.table_mut::<Rating>()?;
    let removed = match rating {
      RatingRef::Position(p) => ratings.retain_rows(|row| row.position != p),
      RatingRef::Pair(key) => ratings.retain(|r| r.key() != key),
    };
    ratings.reindex();
    info!(%rating, removed, "rating deleted");
    Ok(removed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{query::QueryEngine, record::RatingKey, testing::fixture};

  fn new_movie(name: &str, genres: &[&str]) -> NewMovie {
    NewMovie {
      name:         name.into(),
      release_date: "1999-03-31".into(),
      url:          None,
      genres:       genres.iter().map(|g| g.to_string()).collect(),
    }
  }

  fn new_person(name: &str) -> NewPerson {
    NewPerson {
      id:            None,
      full_name:     name.into(),
      year_of_birth: 1977,
      gender:        Gender::M,
      zip_code:      "90210".into(),
    }
  }

  // ── Movies ───────────────────────────────────────────────────────────────

  #[test]
  fn create_movie_assigns_max_plus_one_and_counts_grow_by_one() {
    let mut store = fixture();
    let before = QueryEngine::new(&store).count_movies(None).unwrap();

    let movie = store.create_movie(new_movie("The Matrix", &["Action", "Sci-Fi"])).unwrap();
    assert_eq!(movie.id, 17);
    assert_eq!(QueryEngine::new(&store).count_movies(None).unwrap(), before + 1);
  }

  #[test]
  fn rejected_movie_leaves_count_unchanged() {
    let mut store = fixture();
    let before = QueryEngine::new(&store).count_movies(None).unwrap();

    assert!(matches!(
      store.create_movie(new_movie("Ghost", &["Drama"])),
      Err(Error::Duplicate { table: TableKind::Movie, .. })
    ));
    assert!(matches!(
      store.create_movie(new_movie("Polka Party", &["Polka"])),
      Err(Error::UnknownGenre(ref g)) if g == "Polka"
    ));
    let mut bad_date = new_movie("Later", &["Drama"]);
    bad_date.release_date = "31/03/1999".into();
    assert!(matches!(store.create_movie(bad_date), Err(Error::DateFormat { .. })));
    assert!(matches!(
      store.create_movie(new_movie("No Genre", &[])),
      Err(Error::Range { field: "genres", .. })
    ));

    assert_eq!(QueryEngine::new(&store).count_movies(None).unwrap(), before);
  }

  #[test]
  fn create_movie_in_empty_table_starts_at_one() {
    let mut store = fixture();
    store.set_table::<Movie>(Default::default());
    assert_eq!(store.create_movie(new_movie("First", &["unknown"])).unwrap().id, 1);
  }

  #[test]
  fn update_movie_may_keep_its_own_name_but_not_take_another() {
    let mut store = fixture();
    let patch = MoviePatch { url: Some(None), ..Default::default() };
    let updated = store.update_movie(&MovieRef::Name("Ghost".into()), &patch).unwrap();
    assert_eq!(updated.url, None);

    let rename = MoviePatch { name: Some("Casablanca".into()), ..Default::default() };
    assert!(matches!(
      store.update_movie(&MovieRef::Id(13), &rename),
      Err(Error::Duplicate { .. })
    ));
    assert_eq!(store.movie(&MovieRef::Id(13)).unwrap().name, "Ghost");
  }

  #[test]
  fn delete_movie_cascades_to_its_ratings() {
    let mut store = fixture();
    let removed = store.delete_movie(&MovieRef::Id(10)).unwrap();
    assert_eq!(removed.movies, 1);
    assert_eq!(removed.ratings, 2);
    assert!(store.table::<Rating>().unwrap().iter().all(|r| r.movie_id != 10));
  }

  // ── Ratings ──────────────────────────────────────────────────────────────

  #[test]
  fn rating_of_six_is_rejected_before_writing() {
    let mut store = fixture();
    let before = store.table::<Rating>().unwrap().len();
    let draft = NewRating {
      user_id:  1,
      movie_id: 11,
      rating:   6,
      date:     "2001-01-01 10:00:00".into(),
    };
    assert!(matches!(store.create_rating(draft), Err(Error::Range { field: "rating", .. })));
    assert_eq!(store.table::<Rating>().unwrap().len(), before);
  }

  #[test]
  fn second_rating_of_same_pair_is_allowed_but_identical_row_is_not() {
    let mut store = fixture();
    let draft = NewRating {
      user_id:  1,
      movie_id: 10,
      rating:   2,
      date:     "2001-01-01 10:00:00".into(),
    };
    store.create_rating(draft.clone()).unwrap();
    assert!(matches!(store.create_rating(draft), Err(Error::Duplicate { .. })));

    let removed = store
      .delete_rating(RatingRef::Pair(RatingKey { user_id: 1, movie_id: 10 }))
      .unwrap();
    assert_eq!(removed, 2);
  }

  #[test]
  fn rating_date_must_be_a_timestamp() {
    let mut store = fixture();
    let draft = NewRating {
      user_id:  1,
      movie_id: 11,
      rating:   3,
      date:     "2001-01-01".into(),
    };
    assert!(matches!(store.create_rating(draft), Err(Error::DateFormat { .. })));
  }

  // ── Persons ──────────────────────────────────────────────────────────────

  #[test]
  fn delete_person_removes_exactly_the_rows_keyed_to_it() {
    let mut store = fixture();
    let ratings_before = store.table::<Rating>().unwrap().len();

    let removed = store.delete_person(2).unwrap();
    assert_eq!(
      removed,
      Removed { persons: 1, users: 1, workers: 1, movies: 0, ratings: 2 }
    );
    assert!(store.person(2).is_err());
    assert!(store.user(2).is_err());
    assert!(store.worker(2).is_err());
    assert_eq!(store.table::<Rating>().unwrap().len(), ratings_before - 2);
    assert_eq!(store.table::<Person>().unwrap().len(), 4);
    assert!(store.worker(4).is_ok());
  }

  #[test]
  fn deletes_need_the_same_tables_as_creates() {
    let mut store = TableStore::new();
    store.set_table::<User>([crate::testing::user(1, "engineer")].into_iter().collect());
    assert!(matches!(store.delete_user(1), Err(Error::NotLoaded(TableKind::Person))));
    assert!(store.user(1).is_ok());
  }

  #[test]
  fn create_person_without_conflict_gets_next_id() {
    let mut store = fixture();
    match store.create_person(new_person("Frank Green")) {
      PersonOutcome::Created(p) => assert_eq!(p.id, 6),
      other => panic!("unexpected outcome: {other:?}"),
    }
  }

  #[test]
  fn name_collision_needs_a_decision() {
    let mut store = fixture();
    let pending = match store.create_person(new_person("Alice Smith")) {
      PersonOutcome::NeedsDecision(p) => p,
      other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(pending.conflicts().len(), 1);
    assert_eq!(pending.conflicts()[0].id, 1);
    assert_eq!(store.table::<Person>().unwrap().len(), 5);

    match store.resolve_person(pending.clone(), PersonDecision::Abort) {
      PersonOutcome::Rejected(Error::Aborted) => {}
      other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.table::<Person>().unwrap().len(), 5);

    match store.resolve_person(pending.clone(), PersonDecision::AttachTo(1)) {
      PersonOutcome::Updated(p) => {
        assert_eq!(p.id, 1);
        assert_eq!(p.year_of_birth, 1977);
      }
      other => panic!("unexpected outcome: {other:?}"),
    }

    match store.resolve_person(pending, PersonDecision::ProceedAsNew) {
      PersonOutcome::Created(p) => assert_eq!(p.id, 6),
      other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.table::<Person>().unwrap().len(), 6);
  }

  #[test]
  fn explicit_person_id_collision_is_rejected_not_ambiguous() {
    let mut store = fixture();
    let mut draft = new_person("Alice Smith");
    draft.id = Some(1);
    assert!(matches!(
      store.create_person(draft),
      PersonOutcome::Rejected(Error::Duplicate { table: TableKind::Person, .. })
    ));
  }

  #[test]
  fn implausible_birth_year_is_rejected() {
    let mut store = fixture();
    let mut draft = new_person("Old Timer");
    draft.year_of_birth = 1492;
    assert!(matches!(
      store.create_person(draft),
      PersonOutcome::Rejected(Error::Range { field: "year of birth", .. })
    ));
  }

  #[test]
  fn renaming_onto_an_existing_name_needs_a_decision() {
    let mut store = fixture();
    let patch = PersonPatch { full_name: Some("Bob Jones".into()), ..Default::default() };
    let pending = match store.update_person(4, &patch) {
      PersonOutcome::NeedsDecision(p) => p,
      other => panic!("unexpected outcome: {other:?}"),
    };
    assert!(pending.is_update());
    match store.resolve_person(pending, PersonDecision::ProceedAsNew) {
      PersonOutcome::Updated(p) => assert_eq!((p.id, p.full_name.as_str()), (4, "Bob Jones")),
      other => panic!("unexpected outcome: {other:?}"),
    }
  }

  // ── Users & workers ──────────────────────────────────────────────────────

  #[test]
  fn user_requires_a_person_and_a_free_id() {
    let mut store = fixture();
    let draft = |id| NewUser {
      id,
      occupation:   "pilot".into(),
      active_since: Some("2022-01-01 08:00:00".into()),
    };
    assert!(matches!(store.create_user(draft(77)), Err(Error::Referential { .. })));
    assert!(matches!(store.create_user(draft(1)), Err(Error::Duplicate { .. })));
    assert_eq!(store.create_user(draft(4)).unwrap().occupation, "pilot");
  }

  #[test]
  fn delete_user_takes_its_ratings_along() {
    let mut store = fixture();
    let removed = store.delete_user(1).unwrap();
    assert_eq!(removed.users, 1);
    assert_eq!(removed.ratings, 3);
    assert!(store.person(1).is_ok());
  }

  #[test]
  fn update_worker_keeps_its_id() {
    let mut store = fixture();
    let patch = WorkerPatch { category: Some(Category::C), ..Default::default() };
    let w = store.update_worker(4, &patch).unwrap();
    assert_eq!((w.id, w.category), (4, Category::C));
  }

  #[test]
  fn operations_reject_missing_tables() {
    let mut store = TableStore::new();
    assert!(matches!(
      store.create_movie(new_movie("Anything", &["Drama"])),
      Err(Error::NotLoaded(TableKind::Person))
    ));
  }
}
