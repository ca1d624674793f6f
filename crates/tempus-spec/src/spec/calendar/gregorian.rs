//! Proleptic Gregorian oracle with astronomical year numbering.

use chrono::{Datelike, NaiveDate};

use super::{Calendar, Resolved};
use crate::spec::core::{Range, Step, Unit};

/// Error reported by the [`Gregorian`] oracle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// A fixed context value is not legal for its unit.
    #[error("{value} is not a valid {unit}")]
    OutOfRange { unit: Unit, value: i64 },
}

/// The Gregorian calendar, backed by chrono.
///
/// Open ranges are clamped to the unit's legal bounds. Closed ranges pass
/// through unchanged since their members were spelled out explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gregorian;

impl Calendar for Gregorian {
    type Error = CalendarError;

    fn validate(
        &self,
        context: &[(Unit, Resolved)],
    ) -> Result<Vec<(Unit, Resolved)>, Self::Error> {
        let mut year = None;
        let mut month = None;
        let mut reply = Vec::with_capacity(context.len());

        for &(unit, entry) in context {
            let (lo, hi) = bounds(unit, year, month);
            let entry = match entry {
                Resolved::Value(value) => {
                    if value < lo || value > hi {
                        tracing::debug!(%unit, value, "Context value out of range");
                        return Err(CalendarError::OutOfRange { unit, value });
                    }
                    match unit {
                        Unit::Year => year = Some(value),
                        Unit::Month => month = Some(value),
                        _ => {}
                    }
                    Resolved::Value(value)
                }
                Resolved::Range(range) if range.step == Step::Open => Resolved::Range(Range::open(
                    range.first.max(lo),
                    range.last.min(hi),
                )),
                Resolved::Range(range) => Resolved::Range(range),
            };
            reply.push((unit, entry));
        }

        Ok(reply)
    }
}

/// Returns the inclusive legal bounds of `unit` given what is known so far.
fn bounds(unit: Unit, year: Option<i64>, month: Option<i64>) -> (i64, i64) {
    match unit {
        Unit::Year => (i64::from(NaiveDate::MIN.year()), i64::from(NaiveDate::MAX.year())),
        Unit::Month => (1, 12),
        Unit::Week => (1, year.and_then(iso_weeks).unwrap_or(53)),
        Unit::Day => (1, month.and_then(|m| days_in_month(year, m)).unwrap_or(31)),
        Unit::Weekday => (1, 7),
        Unit::Hour => (0, 23),
        Unit::Minute | Unit::Second => (0, 59),
    }
}

/// Number of ISO weeks in `year`: the week holding 28 December.
fn iso_weeks(year: i64) -> Option<i64> {
    let year = i32::try_from(year).ok()?;
    let last = NaiveDate::from_ymd_opt(year, 12, 28)?;
    Some(i64::from(last.iso_week().week()))
}

/// Days in `month`; without a year February admits the leap day.
fn days_in_month(year: Option<i64>, month: i64) -> Option<i64> {
    let year = match year {
        Some(year) => i32::try_from(year).ok()?,
        None => 2000,
    };
    let month = u32::try_from(month).ok()?;
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some(i64::from(last.day()))
}
