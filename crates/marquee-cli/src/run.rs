//! Command dispatch over a loaded dataset.

use anyhow::{Result, bail};
use marquee_core::{
  Filter, TableStore,
  integrity::ConsistencyReport,
  mutate::{
    MoviePatch, NewMovie, NewPerson, NewRating, NewUser, NewWorker, PersonOutcome, PersonPatch,
    RatingPatch, UserPatch, WorkerPatch,
  },
  query::{MovieRatingFilter, QueryEngine, UserRatingFilter},
  record::Person,
};
use marquee_store_csv::CsvTables;
use tracing::{info, warn};

use crate::{
  args::{
    Command, MovieCommand, OnConflict, PersonCommand, RatingCommand, UserCommand, WorkerCommand,
  },
  prompt,
  render::Output,
};

/// A dataset loaded from CSV and made consistent, plus output settings.
pub struct Session {
  tables:  CsvTables,
  store:   TableStore,
  repairs: ConsistencyReport,
  out:     Output,
  policy:  OnConflict,
}

impl Session {
  /// Load every table and run the consistency pass. Tables that fail to load
  /// stay absent; commands that need them fail when they run.
  pub fn open(tables: CsvTables, out: Output, policy: OnConflict) -> Self {
    let (mut store, report) = TableStore::load(&tables);
    if !report.is_ok() {
      warn!(tables = ?report.failed_tables(), "continuing without some tables");
    }
    let repairs = store.enforce_consistency();
    if repairs.removed() > 0 {
      info!(removed = repairs.removed(), "inconsistent rows dropped from this session");
    }
    Self { tables, store, repairs, out, policy }
  }

  pub fn run(&mut self, command: Command) -> Result<()> {
    match command {
      Command::Check => self.check(),
      Command::Movie(c) => self.movie(c),
      Command::Person(c) => self.person(c),
      Command::User(c) => self.user(c),
      Command::Worker(c) => self.worker(c),
      Command::Rating(c) => self.rating(c),
    }
  }

  /// Write every present table back to its file.
  fn save(&self) -> Result<()> {
    let report = self.store.write(&self.tables);
    if !report.is_ok() {
      let failed: Vec<String> = report
        .failures
        .iter()
        .map(|f| format!("{} ({})", f.table, f.error))
        .collect();
      bail!("failed to write tables: {}", failed.join(", "));
    }
    Ok(())
  }

  fn check(&self) -> Result<()> {
    self.save()?;
    self.out.record(&self.repairs)
  }

  fn movie(&mut self, command: MovieCommand) -> Result<()> {
    let q = QueryEngine::new(&self.store);
    match command {
      MovieCommand::Oldest { genre } => self.out.record(q.oldest_movie(genre.as_deref())?),
      MovieCommand::Newest { genre } => self.out.record(q.newest_movie(genre.as_deref())?),
      MovieCommand::Count { genre } => {
        self.out.count("movies", q.count_movies(genre.as_deref())?)
      }
      MovieCommand::PerYear { start, end, genres } => {
        let rows = q.movies_per_year(start, end, &Filter::from_values(genres))?;
        self.out.rows(&rows)
      }
      MovieCommand::Show(target) => self.out.record(self.store.movie(&target.to_ref()?)?),
      MovieCommand::Add { name, release_date, url, genres } => {
        let movie = self.store.create_movie(NewMovie { name, release_date, url, genres })?;
        self.save()?;
        self.out.record(&movie)
      }
      MovieCommand::Update { target, new_name, release_date, url, clear_url, genres } => {
        let patch = MoviePatch {
          name: new_name,
          release_date,
          url: if clear_url { Some(None) } else { url.map(Some) },
          genres: (!genres.is_empty()).then_some(genres),
        };
        let movie = self.store.update_movie(&target.to_ref()?, &patch)?;
        self.save()?;
        self.out.record(&movie)
      }
      MovieCommand::Delete(target) => {
        let removed = self.store.delete_movie(&target.to_ref()?)?;
        self.save()?;
        self.out.record(&removed)
      }
    }
  }

  fn person(&mut self, command: PersonCommand) -> Result<()> {
    match command {
      PersonCommand::ByBirthYear { start, end, genders } => {
        let rows = QueryEngine::new(&self.store).persons_by_birth_year(
          start,
          end,
          &Filter::from_values(genders),
        )?;
        self.out.rows(&rows)
      }
      PersonCommand::Show { id } => self.out.record(self.store.person(id)?),
      PersonCommand::Add { id, full_name, year_of_birth, gender, zip_code, attach_to } => {
        let outcome = self.store.create_person(NewPerson {
          id,
          full_name,
          year_of_birth,
          gender,
          zip_code,
        });
        let person = self.settle(outcome, attach_to)?;
        self.save()?;
        self.out.record(&person)
      }
      PersonCommand::Update { id, full_name, year_of_birth, gender, zip_code, attach_to } => {
        let patch = PersonPatch { full_name, year_of_birth, gender, zip_code };
        let outcome = self.store.update_person(id, &patch);
        let person = self.settle(outcome, attach_to)?;
        self.save()?;
        self.out.record(&person)
      }
      PersonCommand::Delete { id } => {
        let removed = self.store.delete_person(id)?;
        self.save()?;
        self.out.record(&removed)
      }
    }
  }

  /// Drive a person write to completion, asking for a decision when the
  /// full name is ambiguous.
  fn settle(&mut self, mut outcome: PersonOutcome, attach_to: Option<i64>) -> Result<Person> {
    loop {
      outcome = match outcome {
        PersonOutcome::Created(p) | PersonOutcome::Updated(p) => return Ok(p),
        PersonOutcome::Rejected(e) => return Err(e.into()),
        PersonOutcome::NeedsDecision(pending) => {
          let decision = prompt::decide(&pending, self.policy, attach_to)?;
          self.store.resolve_person(pending, decision)
        }
      };
    }
  }

  fn user(&mut self, command: UserCommand) -> Result<()> {
    match command {
      UserCommand::By(filters) => {
        let (occupations, birth_years, genders) = filters.split();
        let rows =
          QueryEngine::new(&self.store).users_by(&occupations, &birth_years, &genders)?;
        self.out.rows(&rows)
      }
      UserCommand::Count(filters) => {
        let (occupations, birth_years, genders) = filters.split();
        let n = QueryEngine::new(&self.store).count_users(&occupations, &birth_years, &genders)?;
        self.out.count("users", n)
      }
      UserCommand::Show { id } => self.out.record(self.store.user(id)?),
      UserCommand::Add { id, occupation, active_since } => {
        let user = self.store.create_user(NewUser { id, occupation, active_since })?;
        self.save()?;
        self.out.record(&user)
      }
      UserCommand::Update { id, occupation, active_since } => {
        let user = self.store.update_user(id, &UserPatch { occupation, active_since })?;
        self.save()?;
        self.out.record(&user)
      }
      UserCommand::Delete { id } => {
        let removed = self.store.delete_user(id)?;
        self.save()?;
        self.out.record(&removed)
      }
    }
  }

  fn worker(&mut self, command: WorkerCommand) -> Result<()> {
    match command {
      WorkerCommand::By { positions } => {
        let rows = QueryEngine::new(&self.store).workers_by(&Filter::from_values(positions))?;
        self.out.rows(&rows)
      }
      WorkerCommand::Show { id } => self.out.record(self.store.worker(id)?),
      WorkerCommand::Add { id, position, category, working_hours, start_date } => {
        let worker = self.store.create_worker(NewWorker {
          id,
          position,
          category,
          working_hours,
          start_date,
        })?;
        self.save()?;
        self.out.record(&worker)
      }
      WorkerCommand::Update { id, position, category, working_hours, start_date } => {
        let patch = WorkerPatch { position, category, working_hours, start_date };
        let worker = self.store.update_worker(id, &patch)?;
        self.save()?;
        self.out.record(&worker)
      }
      WorkerCommand::Delete { id } => {
        let worker = self.store.delete_worker(id)?;
        self.save()?;
        self.out.record(&worker)
      }
    }
  }

  fn rating(&mut self, command: RatingCommand) -> Result<()> {
    match command {
      RatingCommand::ByMovie { users, movies, years, genres } => {
        let filter = MovieRatingFilter {
          user_ids:  Filter::from_values(users),
          movie_ids: Filter::from_values(movies),
          years:     Filter::from_values(years),
          genres:    Filter::from_values(genres),
        };
        let rows = QueryEngine::new(&self.store).ratings_by_movie(&filter)?;
        self.out.rows(&rows)
      }
      RatingCommand::ByUser {
        users,
        genders,
        occupations,
        min_age,
        max_age,
        reference_year,
      } => {
        let filter = UserRatingFilter {
          user_ids: Filter::from_values(users),
          genders: Filter::from_values(genders),
          occupations: Filter::from_values(occupations),
          min_age,
          max_age,
          reference_year,
        };
        let report = QueryEngine::new(&self.store).ratings_by_user(&filter)?;
        if self.out.json {
          return self.out.record(&report);
        }
        self.out.record(&report.summary)?;
        println!();
        self.out.rows(&report.by_year_genre)
      }
      RatingCommand::Show(target) => self.out.record(self.store.rating(target.to_ref()?)?),
      RatingCommand::Add { user, movie, rating, date } => {
        let rating = self.store.create_rating(NewRating {
          user_id: user,
          movie_id: movie,
          rating,
          date,
        })?;
        self.save()?;
        self.out.record(&rating)
      }
      RatingCommand::Update { target, rating, date } => {
        let rating = self.store.update_rating(target.to_ref()?, &RatingPatch { rating, date })?;
        self.save()?;
        self.out.record(&rating)
      }
      RatingCommand::Delete(target) => {
        let removed = self.store.delete_rating(target.to_ref()?)?;
        self.save()?;
        self.out.count("ratings removed", removed)
      }
    }
  }
}
