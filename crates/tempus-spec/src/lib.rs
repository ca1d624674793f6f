//! Extended ISO 8601 specification language.
//!
//! A specification is more than a timestamp: it may carry sets of candidates,
//! wildcard digits, open and closed ranges, "nth weekday" selections,
//! durations, intervals and recurrences.
//!
//! ## Submodules
//!
//! - [`spec::parse`] - text to token tree
//! - [`spec::expand`] - Cartesian expansion of `all_of` sets
//! - [`spec::odometer`] - next-occurrence computation with carry
//! - [`spec::calendar`] - the validation oracle interface and a Gregorian oracle

pub mod error;
pub mod spec;
