//! Error types for `marquee-core`.

use thiserror::Error;

use crate::record::TableKind;

/// Boxed backend error carried by [`Error::Load`] and [`Error::Write`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A filter value, identifier or lookup key that does not occur in the
  /// data.
  #[error("{what} not found: {value}")]
  NotFound { what: &'static str, value: String },

  /// Every filter value was valid but a filter stage left no rows.
  #[error("no rows match: {0}")]
  NoMatch(String),

  #[error("{field} out of range: {value} (expected {expected})")]
  Range {
    field:    &'static str,
    value:    String,
    expected: String,
  },

  #[error("{table} {id} does not exist (referenced by {referrer})")]
  Referential {
    table:    TableKind,
    id:       i64,
    referrer: TableKind,
  },

  #[error("duplicate {table}: {detail}")]
  Duplicate { table: TableKind, detail: String },

  #[error("invalid date {value:?}: expected format {format}")]
  DateFormat { value: String, format: &'static str },

  #[error("genre {0:?} is not registered")]
  UnknownGenre(String),

  #[error("table {0} is not loaded")]
  NotLoaded(TableKind),

  #[error("table {0} is empty")]
  EmptyTable(TableKind),

  #[error("operation aborted by caller")]
  Aborted,

  #[error("failed to load {table}: {source}")]
  Load {
    table:  TableKind,
    #[source]
    source: BoxError,
  },

  #[error("failed to write {table}: {source}")]
  Write {
    table:  TableKind,
    #[source]
    source: BoxError,
  },
}

impl Error {
  pub(crate) fn not_found(what: &'static str, value: impl ToString) -> Self {
    Self::NotFound { what, value: value.to_string() }
  }

  pub(crate) fn range(
    field: &'static str,
    value: impl ToString,
    expected: impl Into<String>,
  ) -> Self {
    Self::Range {
      field,
      value: value.to_string(),
      expected: expected.into(),
    }
  }

  pub(crate) fn duplicate(table: TableKind, detail: impl Into<String>) -> Self {
    Self::Duplicate { table, detail: detail.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
