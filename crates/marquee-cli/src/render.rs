//! Printing query results as aligned text tables or JSON.
//!
//! Rows are converted through `serde_json::Value`, so any serializable
//! result type renders without per-type formatting code. Field order is
//! declaration order.

use std::io::{self, Write as _};

use anyhow::{Context as _, Result};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct Output {
  pub json: bool,
}

impl Output {
  /// A list of result rows.
  pub fn rows<T: Serialize>(&self, rows: &[T]) -> Result<()> {
    if self.json {
      return self.json(rows);
    }
    let objects: Vec<Map<String, Value>> = rows
      .iter()
      .map(|r| match serde_json::to_value(r) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Ok(Map::from_iter([("value".to_owned(), other)])),
        Err(e) => Err(e),
      })
      .collect::<Result<_, _>>()
      .context("serializing result rows")?;
    print_table(&objects)
  }

  /// A single record, printed as `field: value` lines.
  pub fn record<T: Serialize>(&self, record: &T) -> Result<()> {
    if self.json {
      return self.json(record);
    }
    let value = serde_json::to_value(record).context("serializing record")?;
    let mut out = io::stdout().lock();
    match value {
      Value::Object(map) => {
        let width = map.keys().map(String::len).max().unwrap_or(0);
        for (key, value) in &map {
          writeln!(out, "{key:>width$}: {}", cell(value))?;
        }
      }
      other => writeln!(out, "{}", cell(&other))?,
    }
    Ok(())
  }

  /// A single labelled number.
  pub fn count(&self, label: &str, count: usize) -> Result<()> {
    if self.json {
      return self.json(&serde_json::json!({ label: count }));
    }
    writeln!(io::stdout().lock(), "{label}: {count}")?;
    Ok(())
  }

  fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing json output")?;
    writeln!(io::stdout().lock(), "{text}")?;
    Ok(())
  }
}

fn print_table(rows: &[Map<String, Value>]) -> Result<()> {
  let mut out = io::stdout().lock();
  let Some(first) = rows.first() else {
    writeln!(out, "(no rows)")?;
    return Ok(());
  };

  let headers: Vec<&str> = first.keys().map(String::as_str).collect();
  let cells: Vec<Vec<String>> = rows
    .iter()
    .map(|row| headers.iter().map(|h| row.get(*h).map(cell).unwrap_or_default()).collect())
    .collect();
  let widths: Vec<usize> = headers
    .iter()
    .enumerate()
    .map(|(i, h)| cells.iter().map(|r| r[i].chars().count()).fold(h.len(), usize::max))
    .collect();

  writeln!(out, "{}", line(&headers, &widths))?;
  let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
  writeln!(out, "{}", line(&rule, &widths))?;
  for row in &cells {
    writeln!(out, "{}", line(row, &widths))?;
  }
  Ok(())
}

fn line<S: AsRef<str>>(values: &[S], widths: &[usize]) -> String {
  values
    .iter()
    .zip(widths)
    .map(|(v, &w)| format!("{:<w$}", v.as_ref()))
    .collect::<Vec<_>>()
    .join("  ")
    .trim_end()
    .to_owned()
}

fn cell(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Number(n) if n.is_f64() => {
      n.as_f64().map_or_else(|| n.to_string(), |f| format!("{f:.2}"))
    }
    Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join("|"),
    other => other.to_string(),
  }
}
