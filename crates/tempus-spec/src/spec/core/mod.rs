//! Token tree and value models.
//!
//! The token tree is the contract between the parser and every consumer
//! (expansion, odometer, external formatters). It is a closed sum type with
//! one variant per grammar production and serializes with serde so it can be
//! handed across process boundaries unchanged.

mod range;
mod token;
mod unit;

pub use range::{Range, Step};
pub use token::{
    Digit, Direction, Field, Member, Recurrence, Scope, Selection, TimeShift, Token, Value,
};
pub use unit::Unit;
