//! The registered genre vocabulary.
//!
//! The movie table carries one boolean column per genre. The vocabulary is
//! closed: labels outside it are rejected on insert and reported as not found
//! by queries.

use std::str::FromStr as _;

use serde::{Serialize, Serializer};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoEnumIterator as _};

use crate::{Error, Result};

/// A registered genre. Declaration order is the column order of the movie
/// table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  AsRefStr,
  Display,
  EnumCount,
  EnumIter,
  EnumString,
)]
pub enum Genre {
  #[strum(to_string = "unknown")]
  Unknown,
  Action,
  Adventure,
  Animation,
  #[strum(to_string = "Children's")]
  Childrens,
  Comedy,
  Crime,
  Documentary,
  Drama,
  Fantasy,
  #[strum(to_string = "Film-Noir")]
  FilmNoir,
  Horror,
  Musical,
  Mystery,
  Romance,
  #[strum(to_string = "Sci-Fi")]
  SciFi,
  Thriller,
  War,
  Western,
}

impl Genre {
  /// Every registered genre, in column order.
  pub fn vocabulary() -> impl Iterator<Item = Genre> { Genre::iter() }

  /// Exact-label lookup; `None` for unregistered labels.
  pub fn from_label(label: &str) -> Option<Genre> {
    Genre::from_str(label).ok()
  }

  /// Lookup used by queries: an unregistered label is a `NotFound` naming it.
  pub fn lookup(label: &str) -> Result<Genre> {
    Self::from_label(label).ok_or_else(|| Error::not_found("genre", label))
  }

  /// Lookup used when staging a movie row.
  pub fn registered(label: &str) -> Result<Genre> {
    Self::from_label(label).ok_or_else(|| Error::UnknownGenre(label.to_owned()))
  }
}

impl Serialize for Genre {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_ref())
  }
}

#[cfg(test)]
mod tests {
  use strum::EnumCount as _;

  use super::*;

  #[test]
  fn vocabulary_has_nineteen_labels_starting_with_unknown() {
    let labels: Vec<String> = Genre::vocabulary().map(|g| g.to_string()).collect();
    assert_eq!(labels.len(), Genre::COUNT);
    assert_eq!(labels.len(), 19);
    assert_eq!(labels[0], "unknown");
    assert!(labels.contains(&"Children's".to_owned()));
    assert!(labels.contains(&"Film-Noir".to_owned()));
  }

  #[test]
  fn lookup_is_exact() {
    assert_eq!(Genre::lookup("Sci-Fi").unwrap(), Genre::SciFi);
    assert!(matches!(
      Genre::lookup("SciFi"),
      Err(Error::NotFound { what: "genre", ref value }) if value == "SciFi"
    ));
    assert!(matches!(Genre::registered("Polka"), Err(Error::UnknownGenre(_))));
  }
}
