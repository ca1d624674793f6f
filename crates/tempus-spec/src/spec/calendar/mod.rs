//! Validation oracle interface.
//!
//! The odometer cannot enumerate an open range until it knows the calendar
//! bounds the range lives in: "every day" means 1..=29 in February 2024 and
//! 1..=31 in March. A [`Calendar`] answers that question for a context of
//! already-fixed coarser units.

mod gregorian;

pub use gregorian::{CalendarError, Gregorian};

use serde::{Deserialize, Serialize};

use crate::spec::core::{Range, Unit};

/// A unit's value inside a validation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolved {
    Value(i64),
    Range(Range),
}

/// ## Summary
/// A calendar system that resolves contextual ranges.
///
/// `validate` receives the fixed values of the coarser units in significance
/// order followed by the unit being resolved. The reply keeps the same units
/// in the same order; the trailing entry carries the corrected bounds.
///
/// Implementations must be pure. The odometer never retries a failed call.
pub trait Calendar {
    type Error: std::error::Error + Send + Sync + 'static;

    /// ## Summary
    /// Resolves the trailing entry of `context` against the fixed prefix.
    ///
    /// ## Errors
    /// Returns an implementation-defined error when the context is illegal.
    fn validate(
        &self,
        context: &[(Unit, Resolved)],
    ) -> Result<Vec<(Unit, Resolved)>, Self::Error>;
}

impl<C: Calendar + ?Sized> Calendar for &C {
    type Error = C::Error;

    fn validate(
        &self,
        context: &[(Unit, Resolved)],
    ) -> Result<Vec<(Unit, Resolved)>, Self::Error> {
        (**self).validate(context)
    }
}
