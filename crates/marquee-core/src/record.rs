//! Row types for the five tables.
//!
//! A [`User`] or [`Worker`] is a role played by a [`Person`]: it shares the
//! person's id and is linked to it by key only. A [`Rating`] joins a user and
//! a movie.

use std::{collections::BTreeSet, fmt, hash::Hash};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::genre::Genre;

// ─── Table kinds ─────────────────────────────────────────────────────────────

/// The five tables of the dataset.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumIter,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
  Person,
  User,
  Worker,
  Movie,
  Rating,
}

// ─── Enumerated columns ──────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
pub enum Gender {
  M,
  F,
}

/// Worker category: one of the three grades, or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
  A,
  B,
  C,
  Other(String),
}

impl From<String> for Category {
  fn from(s: String) -> Self {
    match s.as_str() {
      "A" => Self::A,
      "B" => Self::B,
      "C" => Self::C,
      _ => Self::Other(s),
    }
  }
}

impl From<Category> for String {
  fn from(c: Category) -> Self { c.to_string() }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::A => f.write_str("A"),
      Self::B => f.write_str("B"),
      Self::C => f.write_str("C"),
      Self::Other(s) => f.write_str(s),
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Person {
  pub id:            i64,
  pub full_name:     String,
  pub year_of_birth: i32,
  pub gender:        Gender,
  pub zip_code:      String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct User {
  /// Id of the [`Person`] playing this role.
  pub id:           i64,
  pub occupation:   String,
  pub active_since: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Worker {
  /// Id of the [`Person`] playing this role.
  pub id:            i64,
  pub position:      String,
  pub category:      Category,
  pub working_hours: String,
  pub start_date:    NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Movie {
  pub id:           i64,
  pub name:         String,
  pub release_date: NaiveDate,
  pub url:          Option<String>,
  pub genres:       BTreeSet<Genre>,
}

impl Movie {
  pub fn has_genre(&self, genre: Genre) -> bool { self.genres.contains(&genre) }

  pub fn has_any_genre(&self, genres: &BTreeSet<Genre>) -> bool {
    !self.genres.is_disjoint(genres)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rating {
  pub user_id:   i64,
  pub movie_id:  i64,
  pub rating:    i32,
  pub timestamp: NaiveDateTime,
}

/// Composite identity of a rating. Several rows may share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RatingKey {
  pub user_id:  i64,
  pub movie_id: i64,
}

impl fmt::Display for RatingKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "user {} / movie {}", self.user_id, self.movie_id)
  }
}

// ─── Record trait ────────────────────────────────────────────────────────────

/// Behaviour shared by every row type stored in a [`crate::table::Table`].
pub trait Record: Clone + Eq + Hash + fmt::Debug {
  const KIND: TableKind;

  type Key: Copy + Eq + Hash + fmt::Display;

  /// The identifier column(s) of the row.
  fn key(&self) -> Self::Key;
}

impl Record for Person {
  const KIND: TableKind = TableKind::Person;
  type Key = i64;

  fn key(&self) -> i64 { self.id }
}

impl Record for User {
  const KIND: TableKind = TableKind::User;
  type Key = i64;

  fn key(&self) -> i64 { self.id }
}

impl Record for Worker {
  const KIND: TableKind = TableKind::Worker;
  type Key = i64;

  fn key(&self) -> i64 { self.id }
}

impl Record for Movie {
  const KIND: TableKind = TableKind::Movie;
  type Key = i64;

  fn key(&self) -> i64 { self.id }
}

impl Record for Rating {
  const KIND: TableKind = TableKind::Rating;
  type Key = RatingKey;

  fn key(&self) -> RatingKey {
    RatingKey { user_id: self.user_id, movie_id: self.movie_id }
  }
}
