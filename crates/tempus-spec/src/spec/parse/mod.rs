//! Specification parsing.
//!
//! [`tokenize`] turns a literal specification into a token tree. The grammar
//! is an ordered choice at every alternative: the first alternative that
//! matches wins and a failed alternative rewinds the cursor. The whole input
//! must be consumed; leftovers are reported with the remainder verbatim.
//!
//! ## Examples
//!
//! - `2018Y3ML1K1IN` - the first Monday of March 2018
//! - `{2018..2022}YL2M29D1IN` - the first 29 February in each year
//! - `R5/2018-03-15T10:00Z/P1W` - five weekly repeats
//! - `XXX{0,2,4,6,8}Y11M` - November of every even-numbered year

mod datetime;
mod error;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::{tokenize, tokenize_with};
