//! Plain, continuation-free view of an odometer position.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Candidate, OdometerState, Reading};
use crate::spec::core::Unit;

/// A unit's value with all cycling state stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plain {
    Value(i64),
    /// Not yet started, or nothing left to cycle.
    Candidates(Vec<Candidate>),
}

/// Ordered `(unit, value)` pairs, coarsest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collected {
    pub units: Vec<(Unit, Plain)>,
}

impl Collected {
    /// Returns the concrete value of `unit`, if it has one.
    #[must_use]
    pub fn value(&self, unit: Unit) -> Option<i64> {
        self.units.iter().find_map(|(u, plain)| match plain {
            Plain::Value(value) if *u == unit => Some(*value),
            Plain::Value(_) | Plain::Candidates(_) => None,
        })
    }

    /// ## Summary
    /// Interprets the collected values as a Gregorian date-time.
    ///
    /// Year, month and day are required; missing time units read as zero.
    /// Returns `None` if a required unit is missing or the date is invalid.
    #[must_use]
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        let part = |unit| self.value(unit).and_then(|value| u32::try_from(value).ok());
        let year = i32::try_from(self.value(Unit::Year)?).ok()?;
        let date = NaiveDate::from_ymd_opt(year, part(Unit::Month)?, part(Unit::Day)?)?;
        date.and_hms_opt(
            part(Unit::Hour).unwrap_or(0),
            part(Unit::Minute).unwrap_or(0),
            part(Unit::Second).unwrap_or(0),
        )
    }
}

/// Anything that can be reduced to a [`Collected`] view.
pub trait Collect {
    /// Strips cycling state. Collecting a [`Collected`] returns it unchanged.
    fn collect(&self) -> Collected;
}

impl<C> Collect for OdometerState<C>
where
    C: crate::spec::calendar::Calendar + Clone,
{
    fn collect(&self) -> Collected {
        let units = self
            .units()
            .iter()
            .map(|(unit, reading)| {
                let plain = match reading {
                    Reading::Anchored(value) | Reading::Active { current: value, .. } => {
                        Plain::Value(*value)
                    }
                    Reading::Pending(candidates) => Plain::Candidates(candidates.to_vec()),
                    Reading::Exhausted => Plain::Candidates(Vec::new()),
                };
                (*unit, plain)
            })
            .collect();
        Collected { units }
    }
}

impl Collect for Collected {
    fn collect(&self) -> Collected {
        self.clone()
    }
}

/// Reduces a state, or an already-collected view, to plain values.
#[must_use]
pub fn collect(state: &impl Collect) -> Collected {
    state.collect()
}
