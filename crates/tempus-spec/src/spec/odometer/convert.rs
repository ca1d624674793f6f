//! Building odometer readings from parsed tokens.

use std::num::NonZeroI64;

use super::{Candidate, OdometerState, Reading};
use crate::spec::calendar::Calendar;
use crate::spec::core::{Digit, Field, Member, Range, Token, Unit, Value};
use crate::spec::expand::cartesian;

/// Error converting a token list into an [`OdometerState`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The token has no per-unit reading (durations, intervals, selections).
    #[error("Cannot build a reading from a {kind} token")]
    Unsupported { kind: &'static str },

    /// Two tokens fix the same unit.
    #[error("Unit {0} is specified more than once")]
    DuplicateUnit(Unit),

    /// A mask has too many digits to represent.
    #[error("Mask of {0} digits is too wide")]
    MaskTooWide(usize),
}

impl<C: Calendar + Clone> OdometerState<C> {
    /// ## Summary
    /// Builds a state from `Field`, `Date`, `TimeOfDay` and `DateTime`
    /// tokens.
    ///
    /// Integers become anchored readings. Sets and masks become pending
    /// candidates; a run of wildcards becomes an open range over its span so
    /// the calendar can trim it. Units are ordered coarsest first regardless
    /// of the order they were written in.
    ///
    /// ## Errors
    /// Returns a [`ConversionError`] for any other token, for a unit given
    /// twice, or for a mask too wide to hold.
    pub fn from_tokens(tokens: &[Token], calendar: C) -> Result<Self, ConversionError> {
        let mut fields: Vec<&Field> = Vec::new();
        for token in tokens {
            match token {
                Token::Field(field) => fields.push(field),
                Token::Date { fields: inner, .. } | Token::TimeOfDay { fields: inner, .. } => {
                    fields.extend(inner);
                }
                Token::DateTime { date, time, .. } => fields.extend(date.iter().chain(time)),
                other => {
                    return Err(ConversionError::Unsupported { kind: other.kind() });
                }
            }
        }

        fields.sort_by_key(|field| field.unit);
        if let Some(pair) = fields.windows(2).find(|pair| pair[0].unit == pair[1].unit) {
            return Err(ConversionError::DuplicateUnit(pair[0].unit));
        }

        let units = fields
            .into_iter()
            .map(|field| Ok((field.unit, reading(&field.value)?)))
            .collect::<Result<Vec<_>, ConversionError>>()?;

        tracing::debug!(units = units.len(), "Built odometer state");
        Ok(Self::new(calendar, units))
    }
}

fn reading(value: &Value) -> Result<Reading, ConversionError> {
    Ok(match value {
        Value::Integer(value) => Reading::Anchored(*value),
        Value::AllOf(members) | Value::OneOf(members) => Reading::Pending(
            members
                .iter()
                .map(|member| match *member {
                    Member::Integer(value) => Candidate::Literal(value),
                    Member::Range(range) => Candidate::Range(range),
                })
                .collect(),
        ),
        Value::Mask(digits) => Reading::Pending(mask_candidates(digits)?.into()),
    })
}

/// Decomposes a mask into ascending candidates, one per enumerated head.
///
/// The mask splits into an enumerated head, a run of wildcards and a decimal
/// tail. With no tail the wildcard run is an open range over its span; with
/// a tail the run is walked in strides of the tail's width. Every candidate
/// stays open so the calendar vets it before it is emitted.
fn mask_candidates(digits: &[Digit]) -> Result<Vec<Candidate>, ConversionError> {
    let too_wide = || ConversionError::MaskTooWide(digits.len());

    let tail_len = digits
        .iter()
        .rev()
        .take_while(|d| matches!(d, Digit::Decimal(_)))
        .count();
    let (rest, tail) = digits.split_at(digits.len() - tail_len);
    let run_len = rest
        .iter()
        .rev()
        .take_while(|d| matches!(d, Digit::Wildcard))
        .count();
    let head = &rest[..rest.len() - run_len];

    let tail_value = decimal(tail).ok_or_else(too_wide)?;
    let tail_scale = scale(tail_len).ok_or_else(too_wide)?;
    let run_scale = scale(run_len).ok_or_else(too_wide)?;
    let stride = NonZeroI64::new(tail_scale).ok_or_else(too_wide)?;

    let heads = if head.is_empty() {
        vec![0]
    } else {
        cartesian(head, |digit| {
            Some(digit.choices().into_iter().map(Digit::Decimal).collect())
        })
        .iter()
        .map(|row| decimal(row).ok_or_else(too_wide))
        .collect::<Result<Vec<_>, _>>()?
    };

    heads
        .into_iter()
        .map(|prefix| {
            let base = prefix.checked_mul(run_scale)?;
            let value = |offset: i64| {
                base.checked_add(offset)?
                    .checked_mul(tail_scale)?
                    .checked_add(tail_value)
            };
            let range = Range::open(value(0)?, value(run_scale - 1)?);
            Some(if run_len > 0 && tail_len > 0 {
                Candidate::Stride { range, stride }
            } else {
                Candidate::Range(range)
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(too_wide)
}

fn scale(len: usize) -> Option<i64> {
    10_i64.checked_pow(u32::try_from(len).ok()?)
}

/// Reads decimal markers as a number. Empty reads as zero.
fn decimal(digits: &[Digit]) -> Option<i64> {
    digits.iter().try_fold(0_i64, |acc, digit| match digit {
        Digit::Decimal(d) => acc.checked_mul(10)?.checked_add(i64::from(*d)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::calendar::Gregorian;
    use crate::spec::parse::tokenize;

    fn state(text: &str) -> OdometerState<Gregorian> {
        OdometerState::from_tokens(&tokenize(text).unwrap(), Gregorian).unwrap()
    }

    #[test]
    fn designated_fields_become_readings() {
        let state = state("{2018,2019}Y3M{1..5}D");
        let units: Vec<Unit> = state.units().iter().map(|(unit, _)| *unit).collect();
        assert_eq!(units, vec![Unit::Year, Unit::Month, Unit::Day]);
        assert_eq!(state.reading(Unit::Month), Some(&Reading::Anchored(3)));
        assert_eq!(
            state.reading(Unit::Day),
            Some(&Reading::Pending(vec![Candidate::Range(Range::closed(1, 5))].into()))
        );
    }

    #[test]
    fn datetime_fields_are_ordered() {
        let state = state("2018-03-15T10:30");
        let units: Vec<Unit> = state.units().iter().map(|(unit, _)| *unit).collect();
        assert_eq!(
            units,
            vec![Unit::Year, Unit::Month, Unit::Day, Unit::Hour, Unit::Minute]
        );
    }

    #[test]
    fn unsupported_tokens() {
        let tokens = tokenize("2018Y3ML1K1IN").unwrap();
        assert_eq!(
            OdometerState::from_tokens(&tokens, Gregorian).unwrap_err(),
            ConversionError::Unsupported { kind: "selection" }
        );
    }

    #[test]
    fn duplicate_units() {
        let mut tokens = tokenize("2018Y").unwrap();
        tokens.extend(tokenize("2019-03").unwrap());
        assert_eq!(
            OdometerState::from_tokens(&tokens, Gregorian).unwrap_err(),
            ConversionError::DuplicateUnit(Unit::Year)
        );

        let tokens = vec![
            Token::Field(Field::integer(Unit::Day, 1)),
            Token::Field(Field::integer(Unit::Day, 2)),
        ];
        assert_eq!(
            OdometerState::from_tokens(&tokens, Gregorian).unwrap_err(),
            ConversionError::DuplicateUnit(Unit::Day)
        );
    }

    #[test]
    fn wildcard_run_becomes_open_span() {
        assert_eq!(
            mask_candidates(&[Digit::Decimal(1), Digit::Wildcard]).unwrap(),
            vec![Candidate::Range(Range::open(10, 19))]
        );
        assert_eq!(
            mask_candidates(&[Digit::Wildcard, Digit::Wildcard]).unwrap(),
            vec![Candidate::Range(Range::open(0, 99))]
        );
    }

    #[test]
    fn decimal_tail_becomes_a_stride() {
        let stride = |n| NonZeroI64::new(n).unwrap();
        assert_eq!(
            mask_candidates(&[Digit::Wildcard, Digit::Decimal(5)]).unwrap(),
            vec![Candidate::Stride {
                range: Range::open(5, 95),
                stride: stride(10),
            }]
        );
        let digits = [
            Digit::Decimal(1),
            Digit::Wildcard,
            Digit::Decimal(0),
            Digit::Decimal(3),
        ];
        assert_eq!(
            mask_candidates(&digits).unwrap(),
            vec![Candidate::Stride {
                range: Range::open(1003, 1903),
                stride: stride(100),
            }]
        );
    }

    #[test]
    fn wide_masks_stay_compact() {
        let state = state("XXXXXXX1Y");
        let Some(Reading::Pending(candidates)) = state.reading(Unit::Year) else {
            panic!("expected pending years, got {:?}", state.units());
        };
        assert_eq!(candidates.len(), 1);

        let years: Vec<i64> = state
            .occurrences()
            .take(3)
            .map(|state| state.unwrap().units()[0].1.fixed().unwrap())
            .collect();
        assert_eq!(years, vec![1, 11, 21]);
    }

    #[test]
    fn strided_days_realign_after_trimming() {
        let days: Vec<i64> = state("2024Y2MX0D")
            .occurrences()
            .map(|state| state.unwrap().units()[2].1.fixed().unwrap())
            .collect();
        assert_eq!(days, vec![10, 20]);
    }

    #[test]
    fn digit_sets_in_the_head() {
        let candidates = mask_candidates(&[
            Digit::Decimal(2),
            Digit::OneOf(vec![0, 1]),
            Digit::Wildcard,
        ])
        .unwrap();
        assert_eq!(
            candidates,
            vec![
                Candidate::Range(Range::open(200, 209)),
                Candidate::Range(Range::open(210, 219)),
            ]
        );
    }
}
