use super::*;
use crate::{record::Gender, testing::fixture};

fn names<'a>(movie: Result<&'a crate::record::Movie>) -> &'a str {
  movie.map(|m| m.name.as_str()).unwrap()
}

// ─── Movies ──────────────────────────────────────────────────────────────────

#[test]
fn oldest_and_newest_movie() {
  let store = fixture();
  let q = QueryEngine::new(&store);

  assert_eq!(names(q.oldest_movie(None)), "Casablanca");
  assert_eq!(names(q.oldest_movie(Some("Comedy"))), "Home Alone");
  assert_eq!(names(q.newest_movie(Some("Action"))), "GoldenEye");
}

#[test]
fn newest_movie_tie_goes_to_the_first_row() {
  let store = fixture();
  // Toy Story and GoldenEye share a release date.
  assert_eq!(names(QueryEngine::new(&store).newest_movie(None)), "Toy Story");
}

#[test]
fn movie_genre_must_be_registered() {
  let store = fixture();
  let q = QueryEngine::new(&store);

  assert!(matches!(
    q.oldest_movie(Some("Polka")),
    Err(Error::NotFound { what: "genre", ref value }) if value == "Polka"
  ));
  assert!(matches!(q.newest_movie(Some("Western")), Err(Error::NoMatch(_))));
  assert!(matches!(q.count_movies(Some("comedy")), Err(Error::NotFound { .. })));
}

#[test]
fn count_movies_with_and_without_genre() {
  let store = fixture();
  let q = QueryEngine::new(&store);
  assert_eq!(q.count_movies(None).unwrap(), 7);
  assert_eq!(q.count_movies(Some("Comedy")).unwrap(), 3);
  assert_eq!(q.count_movies(Some("Western")).unwrap(), 0);
}

#[test]
fn movies_per_year_limits_years_and_genres() {
  let store = fixture();
  let rows = QueryEngine::new(&store)
    .movies_per_year(Some(1990), Some(1991), &Filter::one("Comedy"))
    .unwrap();

  assert_eq!(rows, vec![
    YearGenreCount { year: 1990, genre: Genre::Comedy, count: 1 },
    YearGenreCount { year: 1991, genre: Genre::Comedy, count: 1 },
  ]);
  assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 2);
}

#[test]
fn movies_per_year_defaults_to_the_whole_dataset() {
  let store = fixture();
  let rows = QueryEngine::new(&store).movies_per_year(None, None, &Filter::Any).unwrap();

  let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
  assert_eq!(years, BTreeSet::from([1942, 1990, 1991, 1995]));
  assert_eq!(rows.len(), 4 * Genre::vocabulary().count());

  let drama: usize = rows.iter().filter(|r| r.genre == Genre::Drama).map(|r| r.count).sum();
  assert_eq!(drama, 2);
}

#[test]
fn movies_per_year_rejects_bad_spans() {
  let store = fixture();
  let q = QueryEngine::new(&store);

  assert!(matches!(
    q.movies_per_year(Some(2000), None, &Filter::Any),
    Err(Error::Range { field: "start year", .. })
  ));
  assert!(matches!(
    q.movies_per_year(Some(1995), Some(1990), &Filter::Any),
    Err(Error::Range { field: "end year", .. })
  ));
  assert!(matches!(
    q.movies_per_year(None, None, &Filter::many(["Comedy", "Polka"])),
    Err(Error::NotFound { what: "genre", ref value }) if value == "Polka"
  ));
}

// ─── People ──────────────────────────────────────────────────────────────────

#[test]
fn users_by_groups_by_birth_year_occupation_and_gender() {
  let store = fixture();
  let rows = QueryEngine::new(&store)
    .users_by(&Filter::Any, &Filter::Any, &Filter::Any)
    .unwrap();

  let flat: Vec<(i32, &str, Gender, usize)> = rows
    .iter()
    .map(|r| (r.year_of_birth, r.occupation.as_str(), r.gender, r.count))
    .collect();
  assert_eq!(flat, vec![
    (1985, "engineer", Gender::F, 2),
    (1990, "artist", Gender::F, 1),
    (1990, "writer", Gender::M, 1),
  ]);
}

#[test]
fn unknown_occupation_is_not_found() {
  let store = fixture();
  let err = QueryEngine::new(&store)
    .users_by(&Filter::one("unknown-occupation"), &Filter::Any, &Filter::Any)
    .unwrap_err();
  match err {
    Error::NotFound { what, value } => {
      assert_eq!(what, "occupation");
      assert_eq!(value, "unknown-occupation");
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn count_users_applies_the_same_filters() {
  let store = fixture();
  let q = QueryEngine::new(&store);

  assert_eq!(q.count_users(&Filter::Any, &Filter::Any, &Filter::Any).unwrap(), 4);
  assert_eq!(
    q.count_users(&Filter::one("engineer"), &Filter::Any, &Filter::one(Gender::F))
      .unwrap(),
    2
  );
  // Dan was born in 1972 but is not a user.
  assert_eq!(q.count_users(&Filter::Any, &Filter::One(1972), &Filter::Any).unwrap(), 0);
  assert!(matches!(
    q.count_users(&Filter::Any, &Filter::One(1900), &Filter::Any),
    Err(Error::NotFound { what: "year of birth", .. })
  ));
}

#[test]
fn persons_by_birth_year_within_a_span() {
  let store = fixture();
  let rows = QueryEngine::new(&store)
    .persons_by_birth_year(Some(1985), None, &Filter::One(Gender::F))
    .unwrap();
  assert_eq!(rows, vec![
    PersonGroupCount { year_of_birth: 1985, gender: Gender::F, count: 2 },
    PersonGroupCount { year_of_birth: 1990, gender: Gender::F, count: 1 },
  ]);
}

#[test]
fn persons_by_birth_year_rejects_spans_outside_the_data() {
  let store = fixture();
  let q = QueryEngine::new(&store);
  assert!(matches!(
    q.persons_by_birth_year(Some(2000), None, &Filter::Any),
    Err(Error::Range { field: "start year", .. })
  ));
  assert!(matches!(
    q.persons_by_birth_year(None, Some(1950), &Filter::Any),
    Err(Error::Range { field: "end year", .. })
  ));
}

#[test]
fn workers_by_position() {
  let store = fixture();
  let q = QueryEngine::new(&store);

  let rows = q.workers_by(&Filter::Any).unwrap();
  let flat: Vec<(&str, usize)> = rows.iter().map(|r| (r.position.as_str(), r.count)).collect();
  assert_eq!(flat, vec![("Clerk", 1), ("Manager", 1)]);

  assert!(matches!(
    q.workers_by(&Filter::one("Astronaut")),
    Err(Error::NotFound { what: "position", .. })
  ));
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

fn cell(year: i32, genre: Genre, mean: f64, count: usize) -> MeanRating {
  MeanRating { year, genre, mean, count }
}

#[test]
fn ratings_by_movie_restricted_to_a_genre() {
  let store = fixture();
  let filter = MovieRatingFilter { genres: Filter::one("Comedy"), ..Default::default() };
  let rows = QueryEngine::new(&store).ratings_by_movie(&filter).unwrap();

  assert_eq!(rows, vec![
    cell(1990, Genre::Comedy, 4.0, 1),
    cell(1991, Genre::Comedy, 2.0, 1),
    cell(1995, Genre::Comedy, 4.0, 2),
  ]);
}

#[test]
fn ratings_by_movie_by_release_year() {
  let store = fixture();
  let filter = MovieRatingFilter { years: Filter::One(1942), ..Default::default() };
  let rows = QueryEngine::new(&store).ratings_by_movie(&filter).unwrap();

  assert_eq!(rows, vec![
    cell(1942, Genre::Drama, 4.0, 1),
    cell(1942, Genre::Romance, 4.0, 1),
    cell(1942, Genre::War, 4.0, 1),
  ]);

  let filter = MovieRatingFilter { years: Filter::One(2001), ..Default::default() };
  assert!(matches!(
    QueryEngine::new(&store).ratings_by_movie(&filter),
    Err(Error::NotFound { what: "release year", .. })
  ));
}

#[test]
fn ratings_by_movie_reports_empty_stages() {
  let store = fixture();
  let q = QueryEngine::new(&store);

  // User 4 never rated anything.
  let filter = MovieRatingFilter { user_ids: Filter::One(4), ..Default::default() };
  assert!(matches!(q.ratings_by_movie(&filter), Err(Error::NotFound { .. })));

  // User 5 only rated Casablanca.
  let filter = MovieRatingFilter {
    user_ids: Filter::One(5),
    genres: Filter::one("Comedy"),
    ..Default::default()
  };
  assert!(matches!(q.ratings_by_movie(&filter), Err(Error::NoMatch(_))));
}

#[test]
fn ratings_by_absent_user_is_not_found() {
  let store = fixture();
  let filter = UserRatingFilter { user_ids: Filter::One(99), ..Default::default() };
  assert!(matches!(
    QueryEngine::new(&store).ratings_by_user(&filter),
    Err(Error::NotFound { what: "user", ref value }) if value == "99"
  ));
}

#[test]
fn ratings_by_user_summary_for_an_occupation() {
  let store = fixture();
  let filter = UserRatingFilter { occupations: Filter::one("engineer"), ..Default::default() };
  let report = QueryEngine::new(&store).ratings_by_user(&filter).unwrap();

  assert_eq!(report.summary, RatingSummary { mean: 4.0, ratings: 5, users: 2, movies: 4 });
  assert!(report.by_year_genre.contains(&cell(1991, Genre::Action, 4.5, 2)));
}

#[test]
fn ratings_by_user_gender_filter() {
  let store = fixture();
  let filter = UserRatingFilter { genders: Filter::One(Gender::M), ..Default::default() };
  let report = QueryEngine::new(&store).ratings_by_user(&filter).unwrap();
  assert_eq!(report.summary, RatingSummary { mean: 3.5, ratings: 2, users: 1, movies: 2 });
}

#[test]
fn ratings_by_user_age_window() {
  let store = fixture();
  let q = QueryEngine::new(&store);
  let window = |min_age, max_age| UserRatingFilter {
    min_age,
    max_age,
    reference_year: Some(2020),
    ..Default::default()
  };

  let older = q.ratings_by_user(&window(Some(31), None)).unwrap();
  assert_eq!(older.summary.ratings, 5);
  assert_eq!(older.summary.users, 2);

  let younger = q.ratings_by_user(&window(None, Some(30))).unwrap();
  assert_eq!(younger.summary.ratings, 3);
  assert_eq!(younger.summary.movies, 3);

  // Only Dan is over forty, and he is not a user.
  assert!(matches!(q.ratings_by_user(&window(Some(40), None)), Err(Error::NoMatch(_))));
  assert!(matches!(
    q.ratings_by_user(&window(Some(0), None)),
    Err(Error::Range { field: "minimum age", .. })
  ));
  assert!(matches!(
    q.ratings_by_user(&window(Some(40), Some(30))),
    Err(Error::Range { field: "minimum age", .. })
  ));
}

#[test]
fn queries_need_their_tables() {
  let store = crate::store::TableStore::new();
  assert!(matches!(
    QueryEngine::new(&store).count_movies(None),
    Err(Error::NotLoaded(TableKind::Movie))
  ));
}

#[test]
fn extreme_reference_year_excludes_rows_instead_of_overflowing() {
  let store = fixture();
  let filter = UserRatingFilter {
    min_age: Some(1),
    reference_year: Some(i32::MIN),
    ..Default::default()
  };
  assert!(matches!(
    QueryEngine::new(&store).ratings_by_user(&filter),
    Err(Error::NoMatch(_))
  ));
}
