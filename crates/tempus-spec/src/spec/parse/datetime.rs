//! Explicit calendar, week and time-of-day forms (`2018-03-15T10:00Z`).

use super::error::{ParseError, ParseErrorKind};
use super::parser::{Fail, Parsed, Parser};
use crate::spec::core::{Field, TimeShift, Token, Unit, Value};

impl Parser<'_> {
    /// `date "T" time shift?`
    pub(super) fn datetime(&mut self) -> Parsed<Token> {
        let date = self.date_body()?;
        self.expect(b'T')?;
        let time = self.time_body()?;
        let shift = self.attempt(Self::shift)?;
        Ok(Token::DateTime { date, time, shift })
    }

    /// `date shift?`
    pub(super) fn date(&mut self) -> Parsed<Token> {
        let fields = self.date_body()?;
        let shift = self.attempt(Self::shift)?;
        Ok(Token::Date { fields, shift })
    }

    /// `("T" time | hh ":" mm (":" ss)?) shift?`
    pub(super) fn time(&mut self) -> Parsed<Token> {
        let fields = if self.eat(b'T') {
            self.time_body()?
        } else {
            let hour = self.two(Unit::Hour)?;
            if self.peek() != Some(b':') {
                return Err(Fail::Mismatch);
            }
            let mut fields = vec![hour];
            fields.extend(self.time_tail()?);
            fields
        };
        let shift = self.attempt(Self::shift)?;
        Ok(Token::TimeOfDay { fields, shift })
    }

    /// Tries the calendar, week, month and basic forms before a bare year.
    fn date_body(&mut self) -> Parsed<Vec<Field>> {
        if let Some(fields) = self.attempt(|p| {
            let year = p.year()?;
            p.expect(b'-')?;
            let month = p.two(Unit::Month)?;
            p.expect(b'-')?;
            let day = p.two(Unit::Day)?;
            Ok(vec![year, month, day])
        })? {
            return Ok(fields);
        }

        if let Some(fields) = self.attempt(|p| {
            let year = p.year()?;
            p.expect(b'-')?;
            p.expect(b'W')?;
            let mut fields = vec![year, p.two(Unit::Week)?];
            if let Some(weekday) = p.attempt(|p| {
                p.expect(b'-')?;
                p.one(Unit::Weekday)
            })? {
                fields.push(weekday);
            }
            Ok(fields)
        })? {
            return Ok(fields);
        }

        if let Some(fields) = self.attempt(|p| {
            let year = p.year()?;
            p.expect(b'-')?;
            Ok(vec![year, p.two(Unit::Month)?])
        })? {
            return Ok(fields);
        }

        if let Some(fields) = self.attempt(Self::basic_date)? {
            return Ok(fields);
        }

        Ok(vec![self.year()?])
    }

    /// `YYYYMMDD`
    fn basic_date(&mut self) -> Parsed<Vec<Field>> {
        let year = self.markers_exact(4)?;
        let month = self.markers_exact(2)?;
        let day = self.markers_exact(2)?;
        Ok(vec![
            Field::new(Unit::Year, self.masked_value(year)?),
            Field::new(Unit::Month, self.masked_value(month)?),
            Field::new(Unit::Day, self.masked_value(day)?),
        ])
    }

    /// `set "B"? | "-"? markers{4,} "B"?`
    fn year(&mut self) -> Parsed<Field> {
        let value = if matches!(self.peek(), Some(b'{' | b'[')) {
            self.integer_set()?
        } else {
            let negative = self.eat(b'-');
            let markers = self.markers()?;
            if markers.len() < 4 {
                return Err(Fail::Mismatch);
            }
            match self.masked_value(markers)? {
                Value::Integer(year) if negative => Value::Integer(-year),
                _ if negative => return Err(Fail::Mismatch),
                value => value,
            }
        };

        let bc_pos = self.pos();
        if !self.eat(b'B') {
            return Ok(Field::new(Unit::Year, value));
        }
        let value = Self::astronomical(value).ok_or_else(|| {
            Fail::Fatal(ParseError::new(
                ParseErrorKind::MaskedBcYear,
                self.remainder_from(bc_pos),
            ))
        })?;
        Ok(Field::new(Unit::Year, value))
    }

    /// `hh (":"? mm (":"? ss)?)?`
    fn time_body(&mut self) -> Parsed<Vec<Field>> {
        let mut fields = vec![self.two(Unit::Hour)?];
        fields.extend(self.time_tail()?);
        Ok(fields)
    }

    fn time_tail(&mut self) -> Parsed<Vec<Field>> {
        let mut fields = Vec::new();
        for unit in [Unit::Minute, Unit::Second] {
            let Some(field) = self.attempt(|p| {
                p.eat(b':');
                p.two(unit)
            })?
            else {
                break;
            };
            fields.push(field);
        }
        Ok(fields)
    }

    /// Two markers or an integer set.
    fn two(&mut self, unit: Unit) -> Parsed<Field> {
        let value = match self.attempt(|p| p.markers_exact(2))? {
            Some(markers) => self.masked_value(markers)?,
            None => self.integer_set()?,
        };
        Ok(Field::new(unit, value))
    }

    /// One marker or an integer set.
    fn one(&mut self, unit: Unit) -> Parsed<Field> {
        let value = match self.attempt(|p| p.markers_exact(1))? {
            Some(markers) => self.masked_value(markers)?,
            None => self.integer_set()?,
        };
        Ok(Field::new(unit, value))
    }

    /// `"Z" | ("+" | "-") hh (":"? mm)?`
    fn shift(&mut self) -> Parsed<TimeShift> {
        let sign = match self.peek() {
            Some(b'Z') => {
                self.bump();
                return Ok(TimeShift::Utc);
            }
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(Fail::Mismatch),
        };
        self.bump();

        let hours = self.two_digits()?;
        let minutes = match self.attempt(|p| {
            p.eat(b':');
            p.two_digits()
        })? {
            Some(minutes) => minutes,
            None => 0,
        };
        if hours > 23 || minutes > 59 {
            return Err(self.fatal(ParseErrorKind::NumberOutOfRange));
        }
        Ok(TimeShift::Offset {
            minutes: sign * (hours * 60 + minutes),
        })
    }

    fn two_digits(&mut self) -> Parsed<i32> {
        let mut total = 0;
        for _ in 0..2 {
            match self.peek() {
                Some(byte @ b'0'..=b'9') => {
                    self.bump();
                    total = total * 10 + i32::from(byte - b'0');
                }
                _ => return Err(Fail::Mismatch),
            }
        }
        Ok(total)
    }
}
