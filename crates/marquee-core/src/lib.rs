//! Core types and operations for the Marquee movie-ratings dataset.
//!
//! The dataset is five related tables (persons, users, workers, movies and
//! ratings) owned by a [`TableStore`]. This crate holds the record types,
//! the integrity pass, validated mutations and the query engine. It is free
//! of any file format; storage backends implement [`TableSource`] and
//! [`TableSink`].

pub mod error;
pub mod filter;
pub mod format;
pub mod genre;
pub mod integrity;
pub mod lookup;
pub mod mutate;
pub mod query;
pub mod record;
pub mod source;
pub mod store;
pub mod table;
pub mod validate;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use filter::Filter;
pub use genre::Genre;
pub use source::{TableSink, TableSource};
pub use store::TableStore;
