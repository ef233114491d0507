//! Referential integrity and de-duplication.
//!
//! The enforcer repairs what it finds instead of failing: orphaned and
//! duplicate rows are removed and a diagnostic is logged. Every function here
//! is idempotent.

use std::{collections::HashSet, hash::Hash};

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
  record::{Movie, Person, Rating, Record, TableKind, User, Worker},
  store::{Stored, TableStore},
  table::Table,
};

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Remove every `child` row whose `child_key` is absent from the set of
/// `parent_key` values. Returns the number of rows removed.
pub fn enforce_referential<P, C, K>(
  parent: &Table<P>,
  child: &mut Table<C>,
  parent_key: impl Fn(&P) -> K,
  child_key: impl Fn(&C) -> K,
) -> usize
where
  P: Record,
  C: Record,
  K: Eq + Hash,
{
  let keys: HashSet<K> = parent.iter().map(parent_key).collect();
  let removed = child.retain(|row| keys.contains(&child_key(row)));
  if removed > 0 {
    warn!(
      parent = %P::KIND,
      child = %C::KIND,
      removed,
      "inconsistent rows detected; removed child rows without a parent",
    );
  }
  removed
}

/// Remove every row whose `key` is in `keys`. Used by cascading deletes.
pub fn remove_keyed<C, K>(
  child: &mut Table<C>,
  keys: &HashSet<K>,
  key: impl Fn(&C) -> K,
) -> usize
where
  C: Record,
  K: Eq + Hash,
{
  let removed = child.retain(|row| !keys.contains(&key(row)));
  if removed > 0 {
    debug!(table = %C::KIND, removed, "cascaded delete");
  }
  removed
}

/// Remove exact duplicate rows, keeping the first occurrence.
pub fn dedupe<R: Record>(table: &mut Table<R>) -> usize {
  let mut seen = HashSet::new();
  let removed = table.retain(|row| seen.insert(row.clone()));
  if removed > 0 {
    warn!(table = %R::KIND, removed, "removed duplicate rows");
  }
  removed
}

/// Remove rows whose identifier repeats an earlier row's, keeping the first
/// occurrence. The other fields are not compared.
pub fn dedupe_by_key<R: Record>(table: &mut Table<R>) -> usize {
  let mut seen = HashSet::new();
  let removed = table.retain(|row| seen.insert(row.key()));
  if removed > 0 {
    warn!(table = %R::KIND, removed, "removed rows with a duplicate id");
  }
  removed
}

/// Renumber row positions contiguously from zero.
pub fn reindex<R: Record>(table: &mut Table<R>) { table.reindex(); }

// ─── Consistency pass ────────────────────────────────────────────────────────

macro_rules! for_each_table {
  ($store:expr, $f:ident) => {
    if let Ok(t) = $store.table_mut::<Person>() {
      $f(t);
    }
    if let Ok(t) = $store.table_mut::<User>() {
      $f(t);
    }
    if let Ok(t) = $store.table_mut::<Worker>() {
      $f(t);
    }
    if let Ok(t) = $store.table_mut::<Movie>() {
      $f(t);
    }
    if let Ok(t) = $store.table_mut::<Rating>() {
      $f(t);
    }
  };
}

/// Rows removed by each stage of [`TableStore::enforce_consistency`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
  pub duplicate_rows:        usize,
  pub duplicate_ids:         usize,
  pub orphan_users:          usize,
  pub orphan_workers:        usize,
  pub ratings_without_user:  usize,
  pub ratings_without_movie: usize,
  /// Tables that were present but empty.
  pub empty_tables:          Vec<TableKind>,
}

impl ConsistencyReport {
  pub fn removed(&self) -> usize {
    self.duplicate_rows
      + self.duplicate_ids
      + self.orphan_users
      + self.orphan_workers
      + self.ratings_without_user
      + self.ratings_without_movie
  }
}

impl TableStore {
  /// Run the full consistency pass over the present tables:
  ///
  /// 1. drop duplicate rows in every table;
  /// 2. drop duplicate ids in persons, users and workers;
  /// 3. prune users and workers without a person;
  /// 4. prune ratings without a user;
  /// 5. prune ratings without a movie;
  /// 6. reindex every table.
  ///
  /// Stages whose tables are absent are skipped.
  pub fn enforce_consistency(&mut self) -> ConsistencyReport {
    let mut report = ConsistencyReport::default();

    report.empty_tables = self
      .row_counts()
      .into_iter()
      .filter(|(_, rows)| *rows == 0)
      .map(|(kind, _)| kind)
      .collect();
    for kind in &report.empty_tables {
      warn!(table = %kind, "table is empty");
    }

    report.duplicate_rows = self.with_table(dedupe::<Person>)
      + self.with_table(dedupe::<User>)
      + self.with_table(dedupe::<Worker>)
      + self.with_table(dedupe::<Movie>)
      + self.with_table(dedupe::<Rating>);

    report.duplicate_ids = self.with_table(dedupe_by_key::<Person>)
      + self.with_table(dedupe_by_key::<User>)
      + self.with_table(dedupe_by_key::<Worker>);

    report.orphan_users = self.prune::<Person, User>(|p| p.id, |u| u.id);
    report.orphan_workers = self.prune::<Person, Worker>(|p| p.id, |w| w.id);
    report.ratings_without_user = self.prune::<User, Rating>(|u| u.id, |r| r.user_id);
    report.ratings_without_movie = self.prune::<Movie, Rating>(|m| m.id, |r| r.movie_id);

    self.reindex_all();

    debug!(removed = report.removed(), "consistency pass complete");
    report
  }

  /// Renumber the positions of every present table.
  pub fn reindex_all(&mut self) {
    for_each_table!(self, reindex);
  }

  fn with_table<R: Stored>(&mut self, f: impl FnOnce(&mut Table<R>) -> usize) -> usize {
    self.table_mut::<R>().map(f).unwrap_or(0)
  }

  /// Prune `C` rows against `P` when both tables are present.
  fn prune<P: Stored, C: Stored>(
    &mut self,
    parent_key: impl Fn(&P) -> i64,
    child_key: impl Fn(&C) -> i64,
  ) -> usize {
    if !self.has(P::KIND) {
      return 0;
    }
    // The child is lifted out of its slot so the parent can stay borrowed.
    let Some(mut child) = C::slot_mut(self).take() else { return 0 };
    let removed = match self.table::<P>() {
      Ok(parent) => enforce_referential(parent, &mut child, parent_key, child_key),
      Err(_) => 0,
    };
    *C::slot_mut(self) = Some(child);
    removed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{fixture, person, rating, user};

  fn dirty() -> TableStore {
    let mut store = fixture();
    let users = store.table_mut::<User>().unwrap();
    users.push(user(1, "engineer"));
    users.push(user(42, "ghost writer"));
    let persons = store.table_mut::<Person>().unwrap();
    persons.push(person(3, "Carol Whyte", 1986, crate::record::Gender::F));
    let ratings = store.table_mut::<Rating>().unwrap();
    ratings.push(rating(42, 10, 3));
    ratings.push(rating(1, 999, 3));
    ratings.push(rating(1, 10, 5));
    store
  }

  #[test]
  fn consistency_pass_repairs_every_kind_of_damage() {
    let mut store = dirty();
    let report = store.enforce_consistency();

    assert_eq!(report.duplicate_rows, 2);
    assert_eq!(report.duplicate_ids, 1);
    assert_eq!(report.orphan_users, 1);
    assert_eq!(report.ratings_without_user, 1);
    assert_eq!(report.ratings_without_movie, 1);
    assert!(report.empty_tables.is_empty());

    assert_eq!(store.person(3).unwrap().full_name, "Carol White");
    assert!(store.user(42).is_err());
  }

  #[test]
  fn every_foreign_key_resolves_afterwards() {
    let mut store = dirty();
    store.enforce_consistency();

    let persons = store.table::<Person>().unwrap().keys();
    let users = store.table::<User>().unwrap().keys();
    let movies = store.table::<Movie>().unwrap().keys();
    assert!(store.table::<User>().unwrap().iter().all(|u| persons.contains(&u.id)));
    assert!(store.table::<Worker>().unwrap().iter().all(|w| persons.contains(&w.id)));
    assert!(
      store
        .table::<Rating>()
        .unwrap()
        .iter()
        .all(|r| users.contains(&r.user_id) && movies.contains(&r.movie_id))
    );
  }

  #[test]
  fn consistency_pass_is_idempotent() {
    let mut store = dirty();
    store.enforce_consistency();
    let once = store.clone();

    let report = store.enforce_consistency();
    assert_eq!(report.removed(), 0);
    assert_eq!(
      store.table::<Rating>().unwrap(),
      once.table::<Rating>().unwrap()
    );
    assert_eq!(store.table::<User>().unwrap(), once.table::<User>().unwrap());
  }

  #[test]
  fn positions_are_contiguous_after_the_pass() {
    let mut store = dirty();
    store.enforce_consistency();
    let positions: Vec<usize> =
      store.table::<Rating>().unwrap().rows().iter().map(|r| r.position).collect();
    assert_eq!(positions, (0..positions.len()).collect::<Vec<_>>());
  }

  #[test]
  fn absent_parent_skips_the_stage_and_empty_tables_are_reported() {
    let mut store = TableStore::new();
    store.set_table::<User>([user(1, "engineer")].into_iter().collect());
    store.set_table::<Rating>(Table::new());

    let report = store.enforce_consistency();
    assert_eq!(report.orphan_users, 0);
    assert_eq!(report.empty_tables, vec![TableKind::Rating]);
    assert_eq!(store.table::<User>().unwrap().len(), 1);
  }
}
