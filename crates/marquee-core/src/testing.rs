//! Shared fixture for the unit tests.
//!
//! | person | born | gender | user       | worker        |
//! |--------|------|--------|------------|---------------|
//! | 1      | 1985 | F      | engineer   |               |
//! | 2      | 1990 | M      | writer     | Manager (A)   |
//! | 3      | 1985 | F      | engineer   |               |
//! | 4      | 1972 | M      |            | Clerk (B)     |
//! | 5      | 1990 | F      | artist     |               |

use std::collections::BTreeSet;

use crate::{
  format::{parse_date, parse_timestamp},
  genre::Genre,
  record::{Category, Gender, Movie, Person, Rating, User, Worker},
  store::TableStore,
  table::Table,
};

pub fn person(id: i64, full_name: &str, year_of_birth: i32, gender: Gender) -> Person {
  Person {
    id,
    full_name: full_name.into(),
    year_of_birth,
    gender,
    zip_code: format!("{id:05}"),
  }
}

pub fn user(id: i64, occupation: &str) -> User {
  User {
    id,
    occupation:   occupation.into(),
    active_since: parse_timestamp("2020-02-02 12:00:00").unwrap(),
  }
}

pub fn worker(id: i64, position: &str, category: Category) -> Worker {
  Worker {
    id,
    position: position.into(),
    category,
    working_hours: "Full Time".into(),
    start_date: parse_timestamp("2015-06-01 00:00:00").unwrap(),
  }
}

pub fn movie(id: i64, name: &str, release: &str, genres: &[Genre]) -> Movie {
  Movie {
    id,
    name: name.into(),
    release_date: parse_date(release).unwrap(),
    url: Some(format!("http://example.com/movie/{id}")),
    genres: genres.iter().copied().collect::<BTreeSet<_>>(),
  }
}

pub fn rating(user_id: i64, movie_id: i64, value: i32) -> Rating {
  Rating {
    user_id,
    movie_id,
    rating: value,
    timestamp: parse_timestamp("1998-03-04 10:11:12").unwrap(),
  }
}

pub fn fixture() -> TableStore {
  use Gender::{F, M};
  use Genre::*;

  let persons: Table<Person> = [
    person(1, "Alice Smith", 1985, F),
    person(2, "Bob Jones", 1990, M),
    person(3, "Carol White", 1985, F),
    person(4, "Dan Brown", 1972, M),
    person(5, "Eve Black", 1990, F),
  ]
  .into_iter()
  .collect();

  let users: Table<User> = [
    user(1, "engineer"),
    user(2, "writer"),
    user(3, "engineer"),
    user(5, "artist"),
  ]
  .into_iter()
  .collect();

  let workers: Table<Worker> = [
    worker(2, "Manager", Category::A),
    worker(4, "Clerk", Category::B),
  ]
  .into_iter()
  .collect();

  let movies: Table<Movie> = [
    movie(10, "Toy Story", "1995-01-01", &[Animation, Childrens, Comedy]),
    movie(11, "GoldenEye", "1995-01-01", &[Action, Adventure, Thriller]),
    movie(12, "Home Alone", "1990-11-16", &[Comedy, Childrens]),
    movie(13, "Ghost", "1990-07-13", &[Drama, Romance, Thriller]),
    movie(14, "The Addams Family", "1991-11-22", &[Comedy]),
    movie(15, "Terminator 2", "1991-07-03", &[Action, SciFi]),
    movie(16, "Casablanca", "1942-11-26", &[Drama, Romance, War]),
  ]
  .into_iter()
  .collect();

  let ratings: Table<Rating> = [
    rating(1, 10, 5),
    rating(1, 12, 4),
    rating(2, 10, 3),
    rating(2, 13, 4),
    rating(3, 14, 2),
    rating(3, 15, 5),
    rating(5, 16, 4),
    rating(1, 15, 4),
  ]
  .into_iter()
  .collect();

  TableStore::from_tables(persons, users, workers, movies, ratings)
}
