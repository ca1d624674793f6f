//! Specification language components.
//!
//! Data flows text → [`parse`] → token tree → [`expand`] and/or
//! [`odometer`] → [`odometer::Collected`]. The [`calendar`] oracle supplies
//! calendar-relative bounds to the odometer.

pub mod calendar;
pub mod core;
pub mod expand;
pub mod odometer;
pub mod parse;

#[cfg(test)]
mod tests;

pub use calendar::{Calendar, CalendarError, Gregorian, Resolved};
pub use self::core::{
    Digit, Direction, Field, Member, Range, Recurrence, Scope, Selection, Step, TimeShift, Token,
    Unit, Value,
};
pub use expand::{cartesian, expand};
pub use odometer::{
    Candidate, Collect, Collected, ConversionError, Cursor, OdometerState, Plain, Reading, Tick,
    collect,
};
pub use parse::{ParseError, ParseResult, tokenize, tokenize_with};
