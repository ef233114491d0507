//! CSV backend for the Marquee dataset.
//!
//! Each table lives in its own headed CSV file. [`CsvTables`] implements
//! [`TableSource`](marquee_core::TableSource) and
//! [`TableSink`](marquee_core::TableSink), so a
//! [`TableStore`](marquee_core::TableStore) can be loaded from and written
//! back to a directory of files.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::{MOVIES_FILE, PERSONS_FILE, RATINGS_FILE, USERS_FILE, WORKERS_FILE};
pub use store::{CsvTables, TablePaths};
