use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Datelike as _, Utc};
use serde::Serialize;

use super::{QueryEngine, list, selected_genres, stage};
use crate::{
  Error, Result,
  filter::Filter,
  genre::Genre,
  record::{Gender, Movie, Person, Rating, TableKind, User},
};

// ─── Filters & results ───────────────────────────────────────────────────────

/// Filters of [`QueryEngine::ratings_by_movie`], applied in field order.
#[derive(Debug, Clone, Default)]
pub struct MovieRatingFilter {
  pub user_ids:  Filter<i64>,
  pub movie_ids: Filter<i64>,
  /// Release years.
  pub years:     Filter<i32>,
  pub genres:    Filter<String>,
}

/// Filters of [`QueryEngine::ratings_by_user`], applied in field order.
#[derive(Debug, Clone, Default)]
pub struct UserRatingFilter {
  pub user_ids:       Filter<i64>,
  pub genders:        Filter<Gender>,
  pub occupations:    Filter<String>,
  /// Inclusive lower bound on the user's age.
  pub min_age:        Option<i32>,
  /// Inclusive upper bound on the user's age.
  pub max_age:        Option<i32>,
  /// Year ages are computed against; the current year when omitted.
  pub reference_year: Option<i32>,
}

/// Mean rating of the movies released in `year` carrying `genre`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRating {
  pub year:  i32,
  pub genre: Genre,
  pub mean:  f64,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
  pub mean:    f64,
  pub ratings: usize,
  pub users:   usize,
  pub movies:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRatingReport {
  pub summary:       RatingSummary,
  pub by_year_genre: Vec<MeanRating>,
}

// ─── Queries ─────────────────────────────────────────────────────────────────

impl<'a> QueryEngine<'a> {
  /// Mean rating per (release year, genre) of the ratings left after the
  /// movie-side filters.
  pub fn ratings_by_movie(&self, filter: &MovieRatingFilter) -> Result<Vec<MeanRating>> {
    self.require(&[TableKind::Movie, TableKind::Rating])?;
    let movies = self.table::<Movie>()?;
    let by_id: HashMap<i64, &Movie> = movies.iter().map(|m| (m.id, m)).collect();
    let mut rows: Vec<(&Rating, &Movie)> = self
      .non_empty::<Rating>()?
      .iter()
      .filter_map(|r| by_id.get(&r.movie_id).map(|m| (r, *m)))
      .collect();

    if !filter.user_ids.is_any() {
      let raters: BTreeSet<i64> = rows.iter().map(|(r, _)| r.user_id).collect();
      filter.user_ids.check_known("user with ratings", &raters)?;
      rows.retain(|(r, _)| filter.user_ids.matches(&r.user_id));
      rows = stage(rows, "user", || {
        format!("no ratings by users {}", list(filter.user_ids.values()))
      })?;
    }

    if !filter.movie_ids.is_any() {
      filter.movie_ids.check_known("movie", &movies.iter().map(|m| m.id).collect())?;
      rows.retain(|(_, m)| filter.movie_ids.matches(&m.id));
      rows = stage(rows, "movie", || {
        format!("no ratings of movies {}", list(filter.movie_ids.values()))
      })?;
    }

    if !filter.years.is_any() {
      let released: BTreeSet<i32> = movies.iter().map(|m| m.release_date.year()).collect();
      filter.years.check_known("release year", &released)?;
      rows.retain(|(_, m)| filter.years.matches(&m.release_date.year()));
      rows = stage(rows, "year", || {
        format!(
          "no rated movies released in {} match the search",
          list(filter.years.values())
        )
      })?;
    }

    let genres = selected_genres(&filter.genres)?;
    if !filter.genres.is_any() {
      rows.retain(|(_, m)| m.has_any_genre(&genres));
      rows = stage(rows, "genre", || {
        format!("no rated movies of genres {} match the search", list(filter.genres.values()))
      })?;
    }

    Ok(mean_by_year_genre(&rows, &genres))
  }

  /// Rating summary and per (release year, genre) means of the ratings left
  /// after the user-side filters.
  pub fn ratings_by_user(&self, filter: &UserRatingFilter) -> Result<UserRatingReport> {
    self.require(&[TableKind::Person, TableKind::User, TableKind::Movie, TableKind::Rating])?;
    check_ages(filter.min_age, filter.max_age)?;

    let persons: HashMap<i64, &Person> =
      self.table::<Person>()?.iter().map(|p| (p.id, p)).collect();
    let users = self.table::<User>()?;
    let occupation: HashMap<i64, &str> =
      users.iter().map(|u| (u.id, u.occupation.as_str())).collect();

    let mut rows: Vec<(&Rating, &Person)> = self
      .non_empty::<Rating>()?
      .iter()
      .filter_map(|r| persons.get(&r.user_id).map(|p| (r, *p)))
      .collect();

    if !filter.user_ids.is_any() {
      let known: BTreeSet<i64> = users.iter().map(|u| u.id).collect();
      filter.user_ids.check_known("user", &known)?;
      rows.retain(|(r, _)| filter.user_ids.matches(&r.user_id));
      rows = stage(rows, "user", || {
        format!("users {} have not rated any movie", list(filter.user_ids.values()))
      })?;
    }

    if !filter.genders.is_any() {
      rows.retain(|(_, p)| filter.genders.matches(&p.gender));
      rows = stage(rows, "gender", || {
        format!("no ratings by users of gender {}", list(filter.genders.values()))
      })?;
    }

    if !filter.occupations.is_any() {
      let known: BTreeSet<String> = users.iter().map(|u| u.occupation.clone()).collect();
      filter.occupations.check_known("occupation", &known)?;
      rows.retain(|(r, _)| {
        occupation
          .get(&r.user_id)
          .is_some_and(|o| filter.occupations.values().iter().any(|v| v.as_str() == *o))
      });
      rows = stage(rows, "occupation", || {
        format!("no ratings by users with occupation {}", list(filter.occupations.values()))
      })?;
    }

    if filter.min_age.is_some() || filter.max_age.is_some() {
      let year = filter.reference_year.unwrap_or_else(|| Utc::now().year());
      let min = filter.min_age.unwrap_or(i32::MIN);
      let max = filter.max_age.unwrap_or(i32::MAX);
      rows.retain(|(_, p)| {
        year.checked_sub(p.year_of_birth).is_some_and(|age| (min..=max).contains(&age))
      });
      rows = stage(rows, "age", || {
        format!(
          "no ratings by users aged {}..={} in {year}",
          filter.min_age.map_or_else(String::new, |a| a.to_string()),
          filter.max_age.map_or_else(String::new, |a| a.to_string()),
        )
      })?;
    }

    let summary = summarize(rows.iter().map(|(r, _)| *r));
    let movies: HashMap<i64, &Movie> =
      self.table::<Movie>()?.iter().map(|m| (m.id, m)).collect();
    let joined: Vec<(&Rating, &Movie)> = rows
      .iter()
      .filter_map(|(r, _)| movies.get(&r.movie_id).map(|m| (*r, *m)))
      .collect();
    let all_genres: BTreeSet<Genre> = Genre::vocabulary().collect();

    Ok(UserRatingReport {
      summary,
      by_year_genre: mean_by_year_genre(&joined, &all_genres),
    })
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

fn check_ages(min_age: Option<i32>, max_age: Option<i32>) -> Result<()> {
  if let Some(min) = min_age
    && min <= 0
  {
    return Err(Error::range("minimum age", min, "a positive age"));
  }
  if let Some(max) = max_age
    && max <= 0
  {
    return Err(Error::range("maximum age", max, "a positive age"));
  }
  if let (Some(min), Some(max)) = (min_age, max_age)
    && min > max
  {
    return Err(Error::range("minimum age", min, format!("at most {max}")));
  }
  Ok(())
}

/// Each rating counts once toward every (release year, genre) cell of its
/// movie, restricted to `genres`.
fn mean_by_year_genre(rows: &[(&Rating, &Movie)], genres: &BTreeSet<Genre>) -> Vec<MeanRating> {
  let mut cells: BTreeMap<(i32, Genre), (i64, usize)> = BTreeMap::new();
  for (rating, movie) in rows {
    let year = movie.release_date.year();
    for genre in movie.genres.intersection(genres) {
      let cell = cells.entry((year, *genre)).or_default();
      cell.0 += i64::from(rating.rating);
      cell.1 += 1;
    }
  }
  cells
    .into_iter()
    .map(|((year, genre), (sum, count))| MeanRating {
      year,
      genre,
      mean: sum as f64 / count as f64,
      count,
    })
    .collect()
}

fn summarize<'r>(ratings: impl Iterator<Item = &'r Rating>) -> RatingSummary {
  let mut users = HashSet::new();
  let mut movies = HashSet::new();
  let (mut sum, mut count) = (0_i64, 0_usize);
  for r in ratings {
    users.insert(r.user_id);
    movies.insert(r.movie_id);
    sum += i64::from(r.rating);
    count += 1;
  }
  RatingSummary {
    mean: if count == 0 { 0.0 } else { sum as f64 / count as f64 },
    ratings: count,
    users: users.len(),
    movies: movies.len(),
  }
}
