//! Error type for `marquee-store-csv`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot access {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed csv in {}: {source}", path.display())]
  Csv {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("{} has no {column:?} column", path.display())]
  MissingColumn { path: PathBuf, column: String },

  #[error("{}, line {line}: invalid {column} {value:?} ({reason})", path.display())]
  InvalidValue {
    path:   PathBuf,
    line:   u64,
    column: String,
    value:  String,
    reason: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
