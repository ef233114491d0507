//! Ordered collections of rows of one record type.
//!
//! Every row carries a *position*, the table's row index. Appends take the
//! last position plus one; removals leave gaps until [`Table::reindex`] is
//! called. Positions are internal bookkeeping and never touch id columns.

use std::collections::HashSet;

use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<R> {
  pub position: usize,
  pub record:   R,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
  rows: Vec<Row<R>>,
}

impl<R> Default for Table<R> {
  fn default() -> Self { Self { rows: Vec::new() } }
}

impl<R: Record> FromIterator<R> for Table<R> {
  fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
    let rows = iter
      .into_iter()
      .enumerate()
      .map(|(position, record)| Row { position, record })
      .collect();
    Self { rows }
  }
}

impl<R: Record> Table<R> {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn rows(&self) -> &[Row<R>] { &self.rows }

  pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
    self.rows.iter().map(|row| &row.record)
  }

  /// Append a record and return its position.
  pub fn push(&mut self, record: R) -> usize {
    let position = self.rows.last().map_or(0, |row| row.position + 1);
    self.rows.push(Row { position, record });
    position
  }

  /// First row matching `pred`.
  pub fn find(&self, mut pred: impl FnMut(&R) -> bool) -> Option<&Row<R>> {
    self.rows.iter().find(|row| pred(&row.record))
  }

  /// First row whose key equals `key`.
  pub fn find_key(&self, key: R::Key) -> Option<&Row<R>> {
    self.find(|r| r.key() == key)
  }

  pub fn contains_key(&self, key: R::Key) -> bool { self.find_key(key).is_some() }

  pub fn keys(&self) -> HashSet<R::Key> { self.iter().map(|r| r.key()).collect() }

  /// Replace the record at `position`, returning the previous one.
  pub fn replace(&mut self, position: usize, record: R) -> Option<R> {
    let row = self.rows.iter_mut().find(|row| row.position == position)?;
    Some(std::mem::replace(&mut row.record, record))
  }

  /// Keep only the rows matching `keep`; returns how many were removed.
  pub fn retain(&mut self, mut keep: impl FnMut(&R) -> bool) -> usize {
    let before = self.rows.len();
    self.rows.retain(|row| keep(&row.record));
    before - self.rows.len()
  }

  /// Keep only the rows matching `keep`, which also sees the row position.
  pub fn retain_rows(&mut self, keep: impl FnMut(&Row<R>) -> bool) -> usize {
    let before = self.rows.len();
    self.rows.retain(keep);
    before - self.rows.len()
  }

  pub fn remove(&mut self, position: usize) -> Option<R> {
    let idx = self.rows.iter().position(|row| row.position == position)?;
    Some(self.rows.remove(idx).record)
  }

  /// Renumber positions contiguously from zero.
  pub fn reindex(&mut self) {
    for (position, row) in self.rows.iter_mut().enumerate() {
      row.position = position;
    }
  }

  /// True when any row other than the one at `exclude` satisfies `pred`.
  pub fn any_other(
    &self,
    exclude: Option<usize>,
    mut pred: impl FnMut(&R) -> bool,
  ) -> bool {
    self
      .rows
      .iter()
      .filter(|row| Some(row.position) != exclude)
      .any(|row| pred(&row.record))
  }
}

impl<R: Record<Key = i64>> Table<R> {
  /// `max(id) + 1`, or 1 for an empty table.
  pub fn next_id(&self) -> i64 {
    self.iter().map(|r| r.key()).max().map_or(1, |id| id + 1)
  }
}
