use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::QueryEngine;
use crate::{
  Error, Result,
  filter::Filter,
  record::{Gender, Person, TableKind, User, Worker},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserGroupCount {
  pub year_of_birth: i32,
  pub occupation:    String,
  pub gender:        Gender,
  pub count:         usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonGroupCount {
  pub year_of_birth: i32,
  pub gender:        Gender,
  pub count:         usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionCount {
  pub position: String,
  pub count:    usize,
}

impl<'a> QueryEngine<'a> {
  /// Users joined to their person row, after checking every filter value
  /// against the data.
  fn users_matching(
    &self,
    occupations: &Filter<String>,
    birth_years: &Filter<i32>,
    genders: &Filter<Gender>,
  ) -> Result<Vec<(&'a User, &'a Person)>> {
    self.require(&[TableKind::Person, TableKind::User])?;
    let persons = self.table::<Person>()?;
    let users = self.table::<User>()?;

    let known: BTreeSet<String> = users.iter().map(|u| u.occupation.clone()).collect();
    occupations.check_known("occupation", &known)?;
    let known: BTreeSet<i32> = persons.iter().map(|p| p.year_of_birth).collect();
    birth_years.check_known("year of birth", &known)?;

    let by_id: HashMap<i64, &Person> = persons.iter().map(|p| (p.id, p)).collect();
    Ok(
      users
        .iter()
        .filter(|u| occupations.matches(&u.occupation))
        .filter_map(|u| by_id.get(&u.id).map(|p| (u, *p)))
        .filter(|(_, p)| birth_years.matches(&p.year_of_birth) && genders.matches(&p.gender))
        .collect(),
    )
  }

  /// User counts grouped by (year of birth, occupation, gender).
  pub fn users_by(
    &self,
    occupations: &Filter<String>,
    birth_years: &Filter<i32>,
    genders: &Filter<Gender>,
  ) -> Result<Vec<UserGroupCount>> {
    let mut groups: BTreeMap<(i32, &str, Gender), usize> = BTreeMap::new();
    for (user, person) in self.users_matching(occupations, birth_years, genders)? {
      *groups
        .entry((person.year_of_birth, user.occupation.as_str(), person.gender))
        .or_default() += 1;
    }
    Ok(
      groups
        .into_iter()
        .map(|((year_of_birth, occupation, gender), count)| UserGroupCount {
          year_of_birth,
          occupation: occupation.to_owned(),
          gender,
          count,
        })
        .collect(),
    )
  }

  /// Number of users under the [`Self::users_by`] filters.
  pub fn count_users(
    &self,
    occupations: &Filter<String>,
    birth_years: &Filter<i32>,
    genders: &Filter<Gender>,
  ) -> Result<usize> {
    Ok(self.users_matching(occupations, birth_years, genders)?.len())
  }

  /// Person counts grouped by (year of birth, gender) within an optional
  /// birth-year span.
  pub fn persons_by_birth_year(
    &self,
    start: Option<i32>,
    end: Option<i32>,
    genders: &Filter<Gender>,
  ) -> Result<Vec<PersonGroupCount>> {
    self.require(&[TableKind::Person])?;
    let persons = self.non_empty::<Person>()?;

    let years = || persons.iter().map(|p| p.year_of_birth);
    let (first, last) = match (years().min(), years().max()) {
      (Some(first), Some(last)) => (first, last),
      _ => return Err(Error::EmptyTable(TableKind::Person)),
    };
    if let Some(start) = start
      && start > last
    {
      return Err(Error::range("start year", start, format!("at most {last}")));
    }
    if let Some(end) = end
      && end < first
    {
      return Err(Error::range("end year", end, format!("at least {first}")));
    }
    if let (Some(start), Some(end)) = (start, end)
      && start > end
    {
      return Err(Error::range("end year", end, format!("at least {start}")));
    }

    let span = start.unwrap_or(first)..=end.unwrap_or(last);
    let mut groups: BTreeMap<(i32, Gender), usize> = BTreeMap::new();
    for p in persons.iter() {
      if span.contains(&p.year_of_birth) && genders.matches(&p.gender) {
        *groups.entry((p.year_of_birth, p.gender)).or_default() += 1;
      }
    }
    Ok(
      groups
        .into_iter()
        .map(|((year_of_birth, gender), count)| PersonGroupCount { year_of_birth, gender, count })
        .collect(),
    )
  }

  /// Worker counts per position.
  pub fn workers_by(&self, positions: &Filter<String>) -> Result<Vec<PositionCount>> {
    self.require(&[TableKind::Worker])?;
    let workers = self.table::<Worker>()?;
    let known: BTreeSet<String> = workers.iter().map(|w| w.position.clone()).collect();
    positions.check_known("position", &known)?;

    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for w in workers.iter().filter(|w| positions.matches(&w.position)) {
      *groups.entry(w.position.as_str()).or_default() += 1;
    }
    Ok(
      groups
        .into_iter()
        .map(|(position, count)| PositionCount { position: position.to_owned(), count })
        .collect(),
    )
  }
}
