//! Date and timestamp formats shared by validation and the storage backends.
//!
//! Validation is strict: a release date must be `YYYY-MM-DD` and a rating
//! timestamp `YYYY-MM-DD HH:MM:SS`. Loading is lenient because existing data
//! files mix both shapes in the same column.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_DISPLAY: &str = "YYYY-MM-DD";
const TIMESTAMP_DISPLAY: &str = "YYYY-MM-DD HH:MM:SS";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::DateFormat {
    value:  s.to_owned(),
    format: DATE_DISPLAY,
  })
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map_err(|_| {
    Error::DateFormat {
      value:  s.to_owned(),
      format: TIMESTAMP_DISPLAY,
    }
  })
}

/// Accepts a date, or a timestamp whose date part is kept.
pub fn parse_date_lenient(s: &str) -> Result<NaiveDate> {
  parse_date(s).or_else(|err| parse_timestamp(s).map(|ts| ts.date()).map_err(|_| err))
}

/// Accepts a timestamp, or a bare date taken as midnight.
pub fn parse_timestamp_lenient(s: &str) -> Result<NaiveDateTime> {
  parse_timestamp(s)
    .or_else(|err| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)).map_err(|_| err))
}

pub fn format_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn format_timestamp(ts: NaiveDateTime) -> String {
  ts.format(TIMESTAMP_FORMAT).to_string()
}
