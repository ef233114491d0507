//! File names and column headers of the five CSV tables.
//!
//! Headers are matched by name, so column order in an existing file does not
//! matter and an unnamed leading index column is ignored. Files are always
//! written with the columns in the order listed here.

use marquee_core::Genre;

pub const PERSONS_FILE: &str = "personas.csv";
pub const USERS_FILE: &str = "usuarios.csv";
pub const WORKERS_FILE: &str = "trabajadores.csv";
pub const MOVIES_FILE: &str = "peliculas.csv";
pub const RATINGS_FILE: &str = "scores.csv";

pub mod person {
  pub const ID: &str = "id";
  pub const FULL_NAME: &str = "Full Name";
  pub const YEAR_OF_BIRTH: &str = "year of birth";
  pub const GENDER: &str = "Gender";
  pub const ZIP_CODE: &str = "Zip Code";

  pub const HEADERS: [&str; 5] = [ID, FULL_NAME, YEAR_OF_BIRTH, GENDER, ZIP_CODE];
}

pub mod user {
  pub const ID: &str = "id";
  pub const OCCUPATION: &str = "Occupation";
  pub const ACTIVE_SINCE: &str = "Active Since";

  pub const HEADERS: [&str; 3] = [ID, OCCUPATION, ACTIVE_SINCE];
}

pub mod worker {
  pub const ID: &str = "id";
  pub const POSITION: &str = "Position";
  pub const CATEGORY: &str = "Category";
  pub const WORKING_HOURS: &str = "Working Hours";
  pub const START_DATE: &str = "Start Date";

  pub const HEADERS: [&str; 5] = [ID, POSITION, CATEGORY, WORKING_HOURS, START_DATE];
}

pub mod movie {
  pub const ID: &str = "id";
  pub const NAME: &str = "Name";
  pub const RELEASE_DATE: &str = "Release Date";
  pub const URL: &str = "IMDB URL";

  /// Columns before the per-genre `0/1` flags.
  pub const FIXED: [&str; 4] = [ID, NAME, RELEASE_DATE, URL];
}

pub mod rating {
  pub const USER_ID: &str = "user_id";
  pub const MOVIE_ID: &str = "movie_id";
  pub const RATING: &str = "rating";
  pub const DATE: &str = "Date";

  pub const HEADERS: [&str; 4] = [USER_ID, MOVIE_ID, RATING, DATE];
}

/// Movie headers: the fixed columns, then one column per registered genre.
pub fn movie_headers() -> Vec<String> {
  movie::FIXED
    .iter()
    .map(|h| h.to_string())
    .chain(Genre::vocabulary().map(|g| g.to_string()))
    .collect()
}
