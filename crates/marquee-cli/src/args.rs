//! Command-line surface of `marquee`.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use marquee_core::{
  Filter,
  lookup::{MovieRef, RatingRef},
  record::{Category, Gender, RatingKey},
};

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Query and edit a movie-ratings dataset")]
pub struct Cli {
  /// Path to a TOML config file (data directory and table file names).
  #[arg(short, long, value_name = "FILE", default_value = "marquee.toml")]
  pub config: PathBuf,

  /// Directory holding the table files; overrides the config file.
  #[arg(short, long, value_name = "DIR", env = "MARQUEE_DATA_DIR")]
  pub data_dir: Option<PathBuf>,

  /// Print results as JSON instead of text tables.
  #[arg(long, global = true)]
  pub json: bool,

  /// What to do when a person's full name matches an existing person.
  #[arg(long, value_enum, default_value_t = OnConflict::Ask, global = true)]
  pub on_conflict: OnConflict,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
  /// Prompt on the terminal.
  Ask,
  /// Write the row as a separate person.
  New,
  /// Leave the dataset unchanged.
  Abort,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Run the consistency pass and write the repaired tables back.
  Check,
  /// Movie statistics and edits.
  #[command(subcommand)]
  Movie(MovieCommand),
  /// Person statistics and edits.
  #[command(subcommand)]
  Person(PersonCommand),
  /// User statistics and edits.
  #[command(subcommand)]
  User(UserCommand),
  /// Worker statistics and edits.
  #[command(subcommand)]
  Worker(WorkerCommand),
  /// Rating statistics and edits.
  #[command(subcommand)]
  Rating(RatingCommand),
}

// ─── Movies ──────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum MovieCommand {
  /// The movie with the earliest release date.
  Oldest {
    #[arg(long)]
    genre: Option<String>,
  },
  /// The movie with the latest release date.
  Newest {
    #[arg(long)]
    genre: Option<String>,
  },
  /// Number of movies, optionally in one genre.
  Count {
    #[arg(long)]
    genre: Option<String>,
  },
  /// Movies released per year and genre.
  PerYear {
    #[arg(long)]
    start: Option<i32>,
    #[arg(long)]
    end:   Option<i32>,
    /// Repeat for several genres; all genres when omitted.
    #[arg(long = "genre")]
    genres: Vec<String>,
  },
  Show(MovieTarget),
  Add {
    #[arg(long)]
    name:         String,
    /// YYYY-MM-DD
    #[arg(long)]
    release_date: String,
    #[arg(long)]
    url:          Option<String>,
    #[arg(long = "genre", required = true)]
    genres:       Vec<String>,
  },
  Update {
    #[command(flatten)]
    target:       MovieTarget,
    #[arg(long)]
    new_name:     Option<String>,
    #[arg(long)]
    release_date: Option<String>,
    #[arg(long, conflicts_with = "clear_url")]
    url:          Option<String>,
    #[arg(long)]
    clear_url:    bool,
    /// Replaces the whole genre set.
    #[arg(long = "genre")]
    genres:       Vec<String>,
  },
  /// Delete a movie and its ratings.
  Delete(MovieTarget),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct MovieTarget {
  #[arg(long)]
  pub id:   Option<i64>,
  #[arg(long)]
  pub name: Option<String>,
}

impl MovieTarget {
  pub fn to_ref(&self) -> Result<MovieRef> {
    match (self.id, &self.name) {
      (Some(id), _) => Ok(MovieRef::Id(id)),
      (None, Some(name)) => Ok(MovieRef::Name(name.clone())),
      (None, None) => bail!("either --id or --name is required"),
    }
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
  /// Persons per year of birth and gender.
  ByBirthYear {
    #[arg(long)]
    start:   Option<i32>,
    #[arg(long)]
    end:     Option<i32>,
    #[arg(long = "gender")]
    genders: Vec<Gender>,
  },
  Show {
    id: i64,
  },
  Add {
    /// Defaults to the highest id plus one.
    #[arg(long)]
    id:            Option<i64>,
    #[arg(long)]
    full_name:     String,
    #[arg(long)]
    year_of_birth: i32,
    #[arg(long)]
    gender:        Gender,
    #[arg(long)]
    zip_code:      String,
    /// On a name match, write onto this existing person instead.
    #[arg(long)]
    attach_to:     Option<i64>,
  },
  Update {
    id:            i64,
    #[arg(long)]
    full_name:     Option<String>,
    #[arg(long)]
    year_of_birth: Option<i32>,
    #[arg(long)]
    gender:        Option<Gender>,
    #[arg(long)]
    zip_code:      Option<String>,
    #[arg(long)]
    attach_to:     Option<i64>,
  },
  /// Delete a person with its user, worker and rating rows.
  Delete {
    id: i64,
  },
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct UserFilters {
  #[arg(long = "occupation")]
  pub occupations: Vec<String>,
  #[arg(long = "birth-year")]
  pub birth_years: Vec<i32>,
  #[arg(long = "gender")]
  pub genders:     Vec<Gender>,
}

impl UserFilters {
  pub fn split(&self) -> (Filter<String>, Filter<i32>, Filter<Gender>) {
    (
      Filter::from_values(self.occupations.clone()),
      Filter::from_values(self.birth_years.clone()),
      Filter::from_values(self.genders.clone()),
    )
  }
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
  /// Users per year of birth, occupation and gender.
  By(UserFilters),
  /// Number of users under the same filters.
  Count(UserFilters),
  Show {
    id: i64,
  },
  Add {
    /// Id of an existing person.
    #[arg(long)]
    id:           i64,
    #[arg(long)]
    occupation:   String,
    /// YYYY-MM-DD HH:MM:SS; now when omitted.
    #[arg(long)]
    active_since: Option<String>,
  },
  Update {
    id:           i64,
    #[arg(long)]
    occupation:   Option<String>,
    #[arg(long)]
    active_since: Option<String>,
  },
  /// Delete a user and its ratings.
  Delete {
    id: i64,
  },
}

// ─── Workers ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum WorkerCommand {
  /// Workers per position.
  By {
    #[arg(long = "position")]
    positions: Vec<String>,
  },
  Show {
    id: i64,
  },
  Add {
    /// Id of an existing person.
    #[arg(long)]
    id:            i64,
    #[arg(long)]
    position:      String,
    #[arg(long)]
    category:      Category,
    #[arg(long)]
    working_hours: String,
    /// YYYY-MM-DD HH:MM:SS; now when omitted.
    #[arg(long)]
    start_date:    Option<String>,
  },
  Update {
    id:            i64,
    #[arg(long)]
    position:      Option<String>,
    #[arg(long)]
    category:      Option<Category>,
    #[arg(long)]
    working_hours: Option<String>,
    #[arg(long)]
    start_date:    Option<String>,
  },
  Delete {
    id: i64,
  },
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum RatingCommand {
  /// Mean rating per release year and genre, filtered on the movie side.
  ByMovie {
    #[arg(long = "user")]
    users:  Vec<i64>,
    #[arg(long = "movie")]
    movies: Vec<i64>,
    #[arg(long = "year")]
    years:  Vec<i32>,
    #[arg(long = "genre")]
    genres: Vec<String>,
  },
  /// Rating summary and means, filtered on the user side.
  ByUser {
    #[arg(long = "user")]
    users:          Vec<i64>,
    #[arg(long = "gender")]
    genders:        Vec<Gender>,
    #[arg(long = "occupation")]
    occupations:    Vec<String>,
    #[arg(long)]
    min_age:        Option<i32>,
    #[arg(long)]
    max_age:        Option<i32>,
    /// Year ages are computed against; the current year when omitted.
    #[arg(long)]
    reference_year: Option<i32>,
  },
  Show(RatingTarget),
  Add {
    #[arg(long)]
    user:   i64,
    #[arg(long)]
    movie:  i64,
    #[arg(long)]
    rating: i32,
    /// YYYY-MM-DD HH:MM:SS
    #[arg(long)]
    date:   String,
  },
  /// Update the first rating matching the target.
  Update {
    #[command(flatten)]
    target: RatingTarget,
    #[arg(long)]
    rating: Option<i32>,
    #[arg(long)]
    date:   Option<String>,
  },
  /// Delete one row, or every rating of a (user, movie) pair.
  Delete(RatingTarget),
}

#[derive(Args, Debug)]
pub struct RatingTarget {
  /// Row position in the rating table.
  #[arg(long, conflicts_with_all = ["user", "movie"], required_unless_present_all = ["user", "movie"])]
  pub row:   Option<usize>,
  #[arg(long, requires = "movie")]
  pub user:  Option<i64>,
  #[arg(long, requires = "user")]
  pub movie: Option<i64>,
}

impl RatingTarget {
  pub fn to_ref(&self) -> Result<RatingRef> {
    match (self.row, self.user, self.movie) {
      (Some(row), _, _) => Ok(RatingRef::Position(row)),
      (None, Some(user_id), Some(movie_id)) => Ok(RatingRef::Pair(RatingKey { user_id, movie_id })),
      _ => bail!("either --row or both --user and --movie are required"),
    }
  }
}
