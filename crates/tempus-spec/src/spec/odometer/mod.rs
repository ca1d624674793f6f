//! Next-occurrence computation with carry.
//!
//! An [`OdometerState`] is an ordered list of calendar units, coarsest first,
//! each holding a [`Reading`]. Advancing steps the finest cyclable unit; when
//! a unit wraps around it carries into the next coarser one, exactly like a
//! mechanical odometer. Unlike a mechanical one, a unit's width may depend on
//! its coarser neighbours (the days of a month), so open ranges are resolved
//! through a [`Calendar`](crate::spec::calendar::Calendar) every time they
//! are entered.
//!
//! States are plain data. Advancing never mutates: it derives a new state, so
//! earlier snapshots stay valid for replay or branching.

mod collect;
mod convert;
mod reading;
mod state;

#[cfg(test)]
mod tests;

pub use collect::{Collect, Collected, Plain, collect};
pub use convert::ConversionError;
pub use reading::{Cursor, Reading};
pub use state::{Occurrences, OdometerState};

use std::num::NonZeroI64;

use serde::{Deserialize, Serialize};

use crate::spec::core::Range;

/// One entry of a unit's candidate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Candidate {
    Literal(i64),
    Range(Range),
    /// Every `stride`-th value of an open range, counted from its first
    /// member. The calendar trims the bounds; the walk keeps its alignment.
    Stride { range: Range, stride: NonZeroI64 },
}

/// What a single unit step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tick {
    /// The next value in sequence.
    Next(i64),
    /// The sequence wrapped back to its first value; the next coarser unit
    /// must advance.
    Rollover(i64),
}

impl Tick {
    /// Returns the emitted value.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Next(value) | Self::Rollover(value) => value,
        }
    }
}
