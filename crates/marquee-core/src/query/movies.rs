use std::collections::BTreeSet;

use chrono::Datelike as _;
use serde::Serialize;
use tracing::debug;

use super::{QueryEngine, selected_genres};
use crate::{
  Error, Result,
  filter::Filter,
  genre::Genre,
  record::{Movie, TableKind},
};

/// Number of movies released in `year` carrying `genre`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGenreCount {
  pub year:  i32,
  pub genre: Genre,
  pub count: usize,
}

impl<'a> QueryEngine<'a> {
  /// Movies carrying `genre`, or every movie.
  fn movies_in(&self, genre: Option<&str>) -> Result<Vec<&'a Movie>> {
    self.require(&[TableKind::Movie])?;
    let genre = genre.map(Genre::lookup).transpose()?;
    let movies = self.non_empty::<Movie>()?;
    Ok(
      movies
        .iter()
        .filter(|m| genre.is_none_or(|g| m.has_genre(g)))
        .collect(),
    )
  }

  /// The movie with the earliest release date; on ties the first row wins.
  pub fn oldest_movie(&self, genre: Option<&str>) -> Result<&'a Movie> {
    self
      .movies_in(genre)?
      .into_iter()
      .reduce(|best, m| if m.release_date < best.release_date { m } else { best })
      .ok_or_else(|| no_movie_in(genre))
  }

  /// The movie with the latest release date; on ties the first row wins.
  pub fn newest_movie(&self, genre: Option<&str>) -> Result<&'a Movie> {
    self
      .movies_in(genre)?
      .into_iter()
      .reduce(|best, m| if m.release_date > best.release_date { m } else { best })
      .ok_or_else(|| no_movie_in(genre))
  }

  pub fn count_movies(&self, genre: Option<&str>) -> Result<usize> {
    self.require(&[TableKind::Movie])?;
    let genre = genre.map(Genre::lookup).transpose()?;
    Ok(
      self
        .table::<Movie>()?
        .iter()
        .filter(|m| genre.is_none_or(|g| m.has_genre(g)))
        .count(),
    )
  }

  /// Movies released per year and genre.
  ///
  /// Omitted bounds default to the first and last release year in the data;
  /// omitted genres to the whole vocabulary. Only years with at least one
  /// movie in a selected genre are listed, each with a count for every
  /// selected genre (zero included).
  pub fn movies_per_year(
    &self,
    start: Option<i32>,
    end: Option<i32>,
    genres: &Filter<String>,
  ) -> Result<Vec<YearGenreCount>> {
    self.require(&[TableKind::Movie])?;
    let movies = self.non_empty::<Movie>()?;

    let years: BTreeSet<i32> = movies.iter().map(|m| m.release_date.year()).collect();
    let (first, last) = match (years.first(), years.last()) {
      (Some(first), Some(last)) => (*first, *last),
      _ => return Err(Error::EmptyTable(TableKind::Movie)),
    };
    let start = start.unwrap_or(first);
    let end = end.unwrap_or(last);
    if start > last {
      return Err(Error::range("start year", start, format!("at most {last}")));
    }
    if start > end {
      return Err(Error::range("end year", end, format!("at least {start}")));
    }

    let selected = selected_genres(genres)?;
    let in_span: Vec<&Movie> = movies
      .iter()
      .filter(|m| (start..=end).contains(&m.release_date.year()))
      .filter(|m| m.has_any_genre(&selected))
      .collect();
    debug!(start, end, genres = selected.len(), movies = in_span.len(), "movies per year");

    let listed: BTreeSet<i32> = in_span.iter().map(|m| m.release_date.year()).collect();
    let counts = listed
      .into_iter()
      .flat_map(|year| {
        let in_year: Vec<&&Movie> =
          in_span.iter().filter(|m| m.release_date.year() == year).collect();
        selected.iter().map(move |&genre| YearGenreCount {
          year,
          genre,
          count: in_year.iter().filter(|m| m.has_genre(genre)).count(),
        })
      })
      .collect();
    Ok(counts)
  }
}

fn no_movie_in(genre: Option<&str>) -> Error {
  match genre {
    Some(g) => Error::NoMatch(format!("no movie has the genre {g:?}")),
    None => Error::EmptyTable(TableKind::Movie),
  }
}
