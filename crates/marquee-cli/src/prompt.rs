//! Collecting the caller's decision on an ambiguous person write.

use std::io::{self, BufRead as _, Write as _};

use anyhow::Result;
use marquee_core::mutate::{PendingPerson, PersonDecision};

use crate::args::OnConflict;

/// Decide how to settle `pending`. An explicit `attach_to` wins over the
/// policy; `Ask` reads the answer from stdin and aborts on end of input.
pub fn decide(
  pending: &PendingPerson,
  policy: OnConflict,
  attach_to: Option<i64>,
) -> Result<PersonDecision> {
  if let Some(id) = attach_to {
    return Ok(PersonDecision::AttachTo(id));
  }
  match policy {
    OnConflict::New => Ok(PersonDecision::ProceedAsNew),
    OnConflict::Abort => Ok(PersonDecision::Abort),
    OnConflict::Ask => ask(pending),
  }
}

fn ask(pending: &PendingPerson) -> Result<PersonDecision> {
  let mut err = io::stderr().lock();
  writeln!(
    err,
    "{:?} matches {} existing person(s):",
    pending.staged().full_name,
    pending.conflicts().len()
  )?;
  for p in pending.conflicts() {
    writeln!(err, "  id {:<6} born {}  {}  zip {}", p.id, p.year_of_birth, p.gender, p.zip_code)?;
  }

  let stdin = io::stdin();
  let mut line = String::new();
  loop {
    let verb = if pending.is_update() { "apply anyway" } else { "add as new" };
    write!(err, "[n] {verb}, [a] abort, or an id above to write onto: ")?;
    err.flush()?;

    line.clear();
    if stdin.lock().read_line(&mut line)? == 0 {
      return Ok(PersonDecision::Abort);
    }
    match parse_answer(line.trim(), pending) {
      Some(decision) => return Ok(decision),
      None => writeln!(err, "unrecognised answer {:?}", line.trim())?,
    }
  }
}

fn parse_answer(answer: &str, pending: &PendingPerson) -> Option<PersonDecision> {
  match answer {
    "n" | "new" => Some(PersonDecision::ProceedAsNew),
    "a" | "abort" | "" => Some(PersonDecision::Abort),
    other => other
      .parse::<i64>()
      .ok()
      .filter(|id| pending.conflicts().iter().any(|p| p.id == *id))
      .map(PersonDecision::AttachTo),
  }
}

#[cfg(test)]
mod tests {
  use marquee_core::{
    TableStore,
    mutate::{NewPerson, PersonOutcome},
    record::{Gender, Person},
  };

  use super::*;

  fn pending() -> PendingPerson {
    let mut store = TableStore::new();
    store.set_table::<Person>(
      [Person {
        id:            7,
        full_name:     "Ana Pérez".into(),
        year_of_birth: 1980,
        gender:        Gender::F,
        zip_code:      "02139".into(),
      }]
      .into_iter()
      .collect(),
    );
    match store.create_person(NewPerson {
      id:            None,
      full_name:     "Ana Pérez".into(),
      year_of_birth: 1991,
      gender:        Gender::F,
      zip_code:      "10001".into(),
    }) {
      PersonOutcome::NeedsDecision(pending) => pending,
      other => panic!("expected a name conflict, got {other:?}"),
    }
  }

  #[test]
  fn answers_map_to_decisions() {
    let pending = pending();
    assert_eq!(parse_answer("n", &pending), Some(PersonDecision::ProceedAsNew));
    assert_eq!(parse_answer("", &pending), Some(PersonDecision::Abort));
    assert_eq!(parse_answer("7", &pending), Some(PersonDecision::AttachTo(7)));
    assert_eq!(parse_answer("8", &pending), None);
    assert_eq!(parse_answer("maybe", &pending), None);
  }

  #[test]
  fn explicit_attach_wins_over_the_policy() {
    let pending = pending();
    assert_eq!(
      decide(&pending, OnConflict::Abort, Some(7)).unwrap(),
      PersonDecision::AttachTo(7)
    );
    assert_eq!(decide(&pending, OnConflict::New, None).unwrap(), PersonDecision::ProceedAsNew);
  }
}
