//! Optional query arguments: omitted, a single value,
//! or a collection of values.

use std::{collections::BTreeSet, fmt::Display};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter<T> {
  /// No filter: every value matches.
  #[default]
  Any,
  One(T),
  Many(Vec<T>),
}

impl<T> Filter<T> {
  pub fn one(value: impl Into<T>) -> Self { Self::One(value.into()) }

  pub fn many<I, V>(values: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<T>,
  {
    Self::Many(values.into_iter().map(Into::into).collect())
  }

  /// Build from a list of command-line style values: empty means [`Any`],
  /// one value means [`One`].
  ///
  /// [`Any`]: Filter::Any
  /// [`One`]: Filter::One
  pub fn from_values(mut values: Vec<T>) -> Self {
    match values.len() {
      0 => Self::Any,
      1 => Self::One(values.remove(0)),
      _ => Self::Many(values),
    }
  }

  pub fn is_any(&self) -> bool {
    match self {
      Self::Any => true,
      Self::One(_) => false,
      Self::Many(values) => values.is_empty(),
    }
  }

  /// The requested values; empty for [`Filter::Any`].
  pub fn values(&self) -> &[T] {
    match self {
      Self::Any => &[],
      Self::One(value) => std::slice::from_ref(value),
      Self::Many(values) => values,
    }
  }
}

impl<T: PartialEq> Filter<T> {
  pub fn matches(&self, value: &T) -> bool {
    self.is_any() || self.values().contains(value)
  }
}

impl<T: Ord + Display> Filter<T> {
  /// Check every requested value against `known`; the first unknown value is
  /// reported as [`Error::NotFound`] naming it.
  pub fn check_known(&self, what: &'static str, known: &BTreeSet<T>) -> Result<()> {
    match self.values().iter().find(|v| !known.contains(v)) {
      Some(missing) => Err(Error::not_found(what, missing)),
      None => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn omitted_filter_matches_everything() {
    let f: Filter<i32> = Filter::Any;
    assert!(f.matches(&1990));
    assert!(Filter::<i32>::Many(vec![]).is_any());
    assert!(Filter::<i32>::from_values(vec![]).is_any());
  }

  #[test]
  fn check_known_names_the_first_unknown_value() {
    let known: BTreeSet<String> = ["engineer".to_owned(), "writer".to_owned()].into();
    let f: Filter<String> = Filter::many(["writer", "astronaut", "clown"]);
    match f.check_known("occupation", &known) {
      Err(Error::NotFound { what, value }) => {
        assert_eq!(what, "occupation");
        assert_eq!(value, "astronaut");
      }
      other => panic!("unexpected: {other:?}"),
    }
    assert!(Filter::<String>::one("engineer").check_known("occupation", &known).is_ok());
  }
}
