//! Conversion between CSV cells and the core row types.
//!
//! Dates are written as `YYYY-MM-DD` and timestamps as
//! `YYYY-MM-DD HH:MM:SS`. On read either shape is accepted in either kind of
//! column, because existing files mix them.

use std::{collections::HashMap, fmt::Display, path::Path, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use marquee_core::{
  Genre,
  format::{format_date, format_timestamp, parse_date_lenient, parse_timestamp_lenient},
  record::{Category, Gender, Movie, Person, Rating, User, Worker},
};

use crate::{
  Error, Result,
  schema::{movie, person, rating, user, worker},
};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Header name to column index.
pub struct Columns {
  index: HashMap<String, usize>,
}

impl Columns {
  /// Index `headers`, failing on the first of `required` that is absent.
  pub fn new<'h>(
    path: &Path,
    headers: &StringRecord,
    required: impl IntoIterator<Item = &'h str>,
  ) -> Result<Self> {
    let index: HashMap<String, usize> = headers
      .iter()
      .enumerate()
      .filter(|(_, h)| !h.is_empty())
      .map(|(i, h)| (h.to_owned(), i))
      .collect();
    if let Some(missing) = required.into_iter().find(|c| !index.contains_key(*c)) {
      return Err(Error::MissingColumn {
        path:   path.to_owned(),
        column: missing.to_owned(),
      });
    }
    Ok(Self { index })
  }
}

/// One data record, addressed by header name.
pub struct Cells<'r> {
  pub path:    &'r Path,
  pub line:    u64,
  pub record:  &'r StringRecord,
  pub columns: &'r Columns,
}

impl<'r> Cells<'r> {
  pub fn text(&self, column: &str) -> &'r str {
    self
      .columns
      .index
      .get(column)
      .and_then(|i| self.record.get(*i))
      .unwrap_or("")
  }

  pub fn invalid(&self, column: &str, value: &str, reason: impl Display) -> Error {
    Error::InvalidValue {
      path:   self.path.to_owned(),
      line:   self.line,
      column: column.to_owned(),
      value:  value.to_owned(),
      reason: reason.to_string(),
    }
  }

  pub fn parse<T>(&self, column: &str) -> Result<T>
  where
    T: FromStr,
    T::Err: Display,
  {
    let value = self.text(column);
    value.parse().map_err(|e| self.invalid(column, value, e))
  }

  pub fn date(&self, column: &str) -> Result<NaiveDate> {
    let value = self.text(column);
    parse_date_lenient(value).map_err(|e| self.invalid(column, value, e))
  }

  pub fn timestamp(&self, column: &str) -> Result<NaiveDateTime> {
    let value = self.text(column);
    parse_timestamp_lenient(value).map_err(|e| self.invalid(column, value, e))
  }

  /// A `0`/`1` flag column.
  pub fn flag(&self, column: &str) -> Result<bool> {
    match self.text(column) {
      "1" | "1.0" => Ok(true),
      "0" | "0.0" | "" => Ok(false),
      other => Err(self.invalid(column, other, "expected 0 or 1")),
    }
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

pub fn decode_person(c: &Cells<'_>) -> Result<Person> {
  Ok(Person {
    id:            c.parse(person::ID)?,
    full_name:     c.text(person::FULL_NAME).to_owned(),
    year_of_birth: c.parse(person::YEAR_OF_BIRTH)?,
    gender:        c.parse::<Gender>(person::GENDER)?,
    zip_code:      c.text(person::ZIP_CODE).to_owned(),
  })
}

pub fn encode_person(p: &Person) -> Vec<String> {
  vec![
    p.id.to_string(),
    p.full_name.clone(),
    p.year_of_birth.to_string(),
    p.gender.to_string(),
    p.zip_code.clone(),
  ]
}

// ─── User ────────────────────────────────────────────────────────────────────

pub fn decode_user(c: &Cells<'_>) -> Result<User> {
  Ok(User {
    id:           c.parse(user::ID)?,
    occupation:   c.text(user::OCCUPATION).to_owned(),
    active_since: c.timestamp(user::ACTIVE_SINCE)?,
  })
}

pub fn encode_user(u: &User) -> Vec<String> {
  vec![u.id.to_string(), u.occupation.clone(), format_timestamp(u.active_since)]
}

// ─── Worker ──────────────────────────────────────────────────────────────────

pub fn decode_worker(c: &Cells<'_>) -> Result<Worker> {
  Ok(Worker {
    id:            c.parse(worker::ID)?,
    position:      c.text(worker::POSITION).to_owned(),
    category:      Category::from(c.text(worker::CATEGORY).to_owned()),
    working_hours: c.text(worker::WORKING_HOURS).to_owned(),
    start_date:    c.timestamp(worker::START_DATE)?,
  })
}

pub fn encode_worker(w: &Worker) -> Vec<String> {
  vec![
    w.id.to_string(),
    w.position.clone(),
    w.category.to_string(),
    w.working_hours.clone(),
    format_timestamp(w.start_date),
  ]
}

// ─── Movie ───────────────────────────────────────────────────────────────────

pub fn decode_movie(c: &Cells<'_>) -> Result<Movie> {
  let mut genres = std::collections::BTreeSet::new();
  for genre in Genre::vocabulary() {
    if c.flag(genre.as_ref())? {
      genres.insert(genre);
    }
  }
  let url = c.text(movie::URL);
  Ok(Movie {
    id: c.parse(movie::ID)?,
    name: c.text(movie::NAME).to_owned(),
    release_date: c.date(movie::RELEASE_DATE)?,
    url: (!url.is_empty()).then(|| url.to_owned()),
    genres,
  })
}

pub fn encode_movie(m: &Movie) -> Vec<String> {
  let mut cells = vec![
    m.id.to_string(),
    m.name.clone(),
    format_date(m.release_date),
    m.url.clone().unwrap_or_default(),
  ];
  cells.extend(Genre::vocabulary().map(|g| if m.has_genre(g) { "1" } else { "0" }.to_owned()));
  cells
}

// ─── Rating ──────────────────────────────────────────────────────────────────

pub fn decode_rating(c: &Cells<'_>) -> Result<Rating> {
  Ok(Rating {
    user_id:   c.parse(rating::USER_ID)?,
    movie_id:  c.parse(rating::MOVIE_ID)?,
    rating:    c.parse(rating::RATING)?,
    timestamp: c.timestamp(rating::DATE)?,
  })
}

pub fn encode_rating(r: &Rating) -> Vec<String> {
  vec![
    r.user_id.to_string(),
    r.movie_id.to_string(),
    r.rating.to_string(),
    format_timestamp(r.timestamp),
  ]
}
