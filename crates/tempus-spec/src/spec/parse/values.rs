//! Value productions: integers, digit masks and integer sets.

use super::error::ParseErrorKind;
use super::parser::{Fail, Parsed, Parser};
use crate::spec::core::{Digit, Member, Range, Value};
use std::num::NonZeroI64;

impl Parser<'_> {
    /// `value := set | "-"? digit+ | markers`
    pub(super) fn value(&mut self) -> Parsed<Value> {
        match self.peek() {
            Some(b'{' | b'[') => self.integer_set(),
            Some(b'-') => self.signed_integer().map(Value::Integer),
            _ => {
                let markers = self.markers()?;
                self.masked_value(markers)
            }
        }
    }

    /// `"-"? digit+`
    pub(super) fn signed_integer(&mut self) -> Parsed<i64> {
        let negative = self.eat(b'-');
        let digits = self.digits()?;
        let magnitude: i64 = digits
            .parse()
            .map_err(|_e| self.fatal(ParseErrorKind::NumberOutOfRange))?;
        Ok(if negative { -magnitude } else { magnitude })
    }

    /// `"{" member ("," member)* "}"` (all of) or `"[" ... "]"` (one of).
    pub(super) fn integer_set(&mut self) -> Parsed<Value> {
        let (close, all_of) = match self.peek() {
            Some(b'{') => (b'}', true),
            Some(b'[') => (b']', false),
            _ => return Err(Fail::Mismatch),
        };
        self.bump();

        let mut members = vec![self.member()?];
        while self.eat(b',') {
            members.push(self.member()?);
        }
        self.expect(close)?;

        Ok(if all_of {
            Value::AllOf(members)
        } else {
            Value::OneOf(members)
        })
    }

    /// `signed (".." signed? (":" integer)?)? | ".." signed`
    fn member(&mut self) -> Parsed<Member> {
        if self.eat_range_separator() {
            let last = self.signed_integer()?;
            return Ok(Member::Range(Range::open(i64::MIN, last)));
        }

        let first = self.signed_integer()?;
        if !self.eat_range_separator() {
            return Ok(Member::Integer(first));
        }

        let Some(last) = self.attempt(Self::signed_integer)? else {
            return Ok(Member::Range(Range::open(first, i64::MAX)));
        };
        if !self.eat(b':') {
            return Ok(Member::Range(Range::closed(first, last)));
        }

        let step = self.signed_integer()?;
        let step = NonZeroI64::new(step).ok_or_else(|| self.fatal(ParseErrorKind::ZeroStep))?;
        Ok(Member::Range(Range::stepped(first, last, step)))
    }

    fn eat_range_separator(&mut self) -> bool {
        if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
            self.bump();
            self.bump();
            true
        } else {
            false
        }
    }

    /// `(digit | "X") (digit | "X" | digit-set)*`
    pub(super) fn markers(&mut self) -> Parsed<Vec<Digit>> {
        let mut markers = Vec::new();
        while let Some(marker) = self.attempt(|p| p.marker(!markers.is_empty()))? {
            markers.push(marker);
        }
        if markers.is_empty() {
            return Err(Fail::Mismatch);
        }
        Ok(markers)
    }

    /// Exactly `count` markers. Any position may be a digit set.
    pub(super) fn markers_exact(&mut self, count: usize) -> Parsed<Vec<Digit>> {
        (0..count).map(|_| self.marker(true)).collect()
    }

    fn marker(&mut self, allow_set: bool) -> Parsed<Digit> {
        match self.peek() {
            Some(b'X') => {
                self.bump();
                Ok(Digit::Wildcard)
            }
            Some(byte @ b'0'..=b'9') => {
                self.bump();
                Ok(Digit::Decimal(byte - b'0'))
            }
            Some(b'{' | b'[') if allow_set => self.digit_set(),
            _ => Err(Fail::Mismatch),
        }
    }

    /// `{0,2,4}` or `[0..4]`: a set of single digits at one position.
    fn digit_set(&mut self) -> Parsed<Digit> {
        let all_of = self.peek() == Some(b'{');
        let (Value::AllOf(members) | Value::OneOf(members)) = self.integer_set()? else {
            return Err(Fail::Mismatch);
        };

        let mut digits = Vec::new();
        for member in members {
            match member {
                Member::Integer(d @ 0..=9) => digits.push(d),
                Member::Range(range)
                    if !range.is_open() && range.first >= 0 && range.last <= 9 =>
                {
                    digits.extend(range.members());
                }
                _ => return Err(Fail::Mismatch),
            }
        }
        let digits = digits
            .into_iter()
            .map(|d| u8::try_from(d).map_err(|_e| Fail::Mismatch))
            .collect::<Parsed<Vec<u8>>>()?;

        Ok(if all_of {
            Digit::AllOf(digits)
        } else {
            Digit::OneOf(digits)
        })
    }

    /// Collapses markers into an integer when every marker is decimal.
    pub(super) fn masked_value(&self, markers: Vec<Digit>) -> Parsed<Value> {
        if !markers.iter().all(|d| matches!(d, Digit::Decimal(_))) {
            return Ok(Value::Mask(markers));
        }
        markers
            .iter()
            .try_fold(0_i64, |acc, digit| {
                let Digit::Decimal(d) = digit else {
                    return None;
                };
                acc.checked_mul(10)?.checked_add(i64::from(*d))
            })
            .map(Value::Integer)
            .ok_or_else(|| self.fatal(ParseErrorKind::NumberOutOfRange))
    }

    /// Applies the BC marker. Masks have no decimal year to flip.
    pub(super) fn astronomical(value: Value) -> Option<Value> {
        let flip = |member: Member| match member {
            Member::Integer(year) => Member::Integer(1_i64.saturating_sub(year)),
            Member::Range(range) => Member::Range(range.to_astronomical()),
        };
        match value {
            Value::Integer(year) => Some(Value::Integer(1_i64.saturating_sub(year))),
            Value::AllOf(members) => Some(Value::AllOf(members.into_iter().map(flip).collect())),
            Value::OneOf(members) => Some(Value::OneOf(members.into_iter().map(flip).collect())),
            Value::Mask(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::Parser;
    use super::*;
    use crate::spec::core::Step;

    fn parse_value(input: &str) -> Value {
        let mut parser = Parser::new(input, 8);
        let value = parser.value().unwrap_or_else(|fail| panic!("{input}: {fail:?}"));
        assert!(parser.remainder().is_empty(), "left over: {}", parser.remainder());
        value
    }

    #[test]
    fn integers() {
        assert_eq!(parse_value("2018"), Value::Integer(2018));
        assert_eq!(parse_value("-1"), Value::Integer(-1));
        assert_eq!(parse_value("007"), Value::Integer(7));
    }

    #[test]
    fn masks() {
        assert_eq!(
            parse_value("XXX{0,2,4,6,8}"),
            Value::Mask(vec![
                Digit::Wildcard,
                Digit::Wildcard,
                Digit::Wildcard,
                Digit::AllOf(vec![0, 2, 4, 6, 8]),
            ])
        );
        assert_eq!(
            parse_value("1[0..2]"),
            Value::Mask(vec![Digit::Decimal(1), Digit::OneOf(vec![0, 1, 2])])
        );
    }

    #[test]
    fn sets_and_ranges() {
        assert_eq!(
            parse_value("{1,3..5,10..20:5}"),
            Value::AllOf(vec![
                Member::Integer(1),
                Member::Range(Range::closed(3, 5)),
                Member::Range(Range::stepped(10, 20, NonZeroI64::new(5).unwrap())),
            ])
        );
        assert_eq!(
            parse_value("[-1,1]"),
            Value::OneOf(vec![Member::Integer(-1), Member::Integer(1)])
        );
    }

    #[test]
    fn open_members() {
        let Value::AllOf(members) = parse_value("{25..,..3}") else {
            panic!("expected all_of");
        };
        assert_eq!(members[0], Member::Range(Range::open(25, i64::MAX)));
        let Member::Range(lower) = members[1] else {
            panic!("expected a range");
        };
        assert_eq!(lower.step, Step::Open);
        assert_eq!(lower.last, 3);
    }

    #[test]
    fn zero_step_is_fatal() {
        let mut parser = Parser::new("{1..9:0}", 8);
        assert!(matches!(parser.value(), Err(Fail::Fatal(_))));
    }

    #[test]
    fn overflow_is_fatal() {
        let mut parser = Parser::new("99999999999999999999", 8);
        assert!(matches!(parser.value(), Err(Fail::Fatal(_))));
    }
}
