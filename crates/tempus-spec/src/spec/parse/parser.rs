//! Recursive-descent parser for the specification grammar.
//!
//! Structural productions (intervals, selections, groups, durations, sets of
//! tokens) live here; values live in `values` and explicit date/time forms in
//! `datetime`.

use tempus_core::config::ParserSettings;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::error::SpecResult;
use crate::spec::core::{Direction, Field, Recurrence, Scope, Selection, Token, Unit};

/// Date designators in the order they may appear.
pub(super) const DATE_UNITS: [Unit; 5] =
    [Unit::Year, Unit::Month, Unit::Week, Unit::Day, Unit::Weekday];

/// Duration designators before the `T` separator.
const DURATION_UNITS: [Unit; 4] = [Unit::Year, Unit::Month, Unit::Week, Unit::Day];

const TIME_UNITS: [Unit; 3] = [Unit::Hour, Unit::Minute, Unit::Second];

/// Tokenizes a specification with default parser settings.
///
/// ## Errors
/// Returns a [`ParseError`] naming the unparsed remainder if the input does
/// not match the grammar in full.
#[tracing::instrument(skip(text), fields(input_len = text.len()))]
pub fn tokenize(text: &str) -> ParseResult<Vec<Token>> {
    run(text, ParserSettings::default().max_depth)
}

/// Tokenizes a specification with explicit parser settings.
///
/// ## Errors
/// Returns an error if the settings are invalid or the input does not parse.
pub fn tokenize_with(text: &str, settings: &ParserSettings) -> SpecResult<Vec<Token>> {
    settings.validate()?;
    Ok(run(text, settings.max_depth)?)
}

fn run(text: &str, max_depth: usize) -> ParseResult<Vec<Token>> {
    if text.is_empty() {
        tracing::warn!("Empty specification");
        return Err(ParseError::empty());
    }

    let mut parser = Parser::new(text, max_depth);
    let tokens = parser.expression().map_err(|fail| match fail {
        Fail::Fatal(err) => err,
        Fail::Mismatch => ParseError::unexpected(text),
    })?;

    let remainder = parser.remainder();
    if !remainder.is_empty() {
        tracing::debug!(remainder, "Specification has unparsed input");
        return Err(ParseError::unexpected(remainder));
    }

    tracing::debug!(count = tokens.len(), "Specification tokenized");
    Ok(tokens)
}

/// Why an alternative did not produce a value.
#[derive(Debug)]
pub(super) enum Fail {
    /// The alternative does not apply here; the caller may try another.
    Mismatch,
    /// A committed production failed; no alternative may recover.
    Fatal(ParseError),
}

pub(super) type Parsed<T> = Result<T, Fail>;

pub(super) struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str, max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    // ---- cursor primitives ----

    pub(super) fn remainder(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(super) const fn pos(&self) -> usize {
        self.pos
    }

    /// The input from an earlier cursor position onwards.
    pub(super) fn remainder_from(&self, pos: usize) -> &'a str {
        &self.input[pos..]
    }

    pub(super) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub(super) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    pub(super) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, byte: u8) -> Parsed<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(Fail::Mismatch)
        }
    }

    /// Takes one or more ASCII digits.
    pub(super) fn digits(&mut self) -> Parsed<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == start {
            return Err(Fail::Mismatch);
        }
        Ok(&self.input[start..self.pos])
    }

    pub(super) fn fatal(&self, kind: ParseErrorKind) -> Fail {
        Fail::Fatal(ParseError::new(kind, self.remainder()))
    }

    /// Runs an alternative, rewinding the cursor if it does not match.
    pub(super) fn attempt<T>(
        &mut self,
        alt: impl FnOnce(&mut Self) -> Parsed<T>,
    ) -> Parsed<Option<T>> {
        let start = self.pos;
        match alt(self) {
            Ok(value) => Ok(Some(value)),
            Err(Fail::Mismatch) => {
                self.pos = start;
                Ok(None)
            }
            Err(fatal @ Fail::Fatal(_)) => Err(fatal),
        }
    }

    /// Runs a production one bracket level deeper.
    fn nested<T>(&mut self, production: impl FnOnce(&mut Self) -> Parsed<T>) -> Parsed<T> {
        if self.depth >= self.max_depth {
            return Err(self.fatal(ParseErrorKind::TooDeep {
                max_depth: self.max_depth,
            }));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    // ---- top level ----

    /// `expression := interval | element+`
    fn expression(&mut self) -> Parsed<Vec<Token>> {
        if let Some(interval) = self.attempt(Self::interval)? {
            return Ok(vec![interval]);
        }
        self.elements()
    }

    fn elements(&mut self) -> Parsed<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            if let Some(selection) = self.attempt(Self::selection)? {
                tokens.push(Token::Selection(selection));
            } else if let Some(group) = self.attempt(Self::group)? {
                tokens.push(group);
            } else if let Some(fields) = self.attempt(|p| p.designated(&DATE_UNITS, true))? {
                tokens.extend(fields.into_iter().map(Token::Field));
            } else if let Some(token) = self.attempt(Self::explicit)? {
                tokens.push(token);
            } else if let Some(duration) = self.attempt(Self::duration)? {
                tokens.push(duration);
            } else if let Some(set) = self.attempt(Self::token_set)? {
                tokens.push(set);
            } else {
                break;
            }
        }

        if tokens.is_empty() {
            return Err(Fail::Mismatch);
        }
        Ok(tokens)
    }

    /// `datetime | date | time`
    fn explicit(&mut self) -> Parsed<Token> {
        if let Some(datetime) = self.attempt(Self::datetime)? {
            return Ok(datetime);
        }
        if let Some(date) = self.attempt(Self::date)? {
            return Ok(date);
        }
        self.time()
    }

    // ---- intervals ----

    /// `("R" integer? "/")? side "/" side`
    fn interval(&mut self) -> Parsed<Token> {
        let recurrence = self.attempt(Self::recurrence)?;
        match self.side_or_interval(recurrence)? {
            interval @ Token::Interval { .. } => Ok(interval),
            _ => Err(Fail::Mismatch),
        }
    }

    /// `side ("/" side)?`, parsing the start side once.
    ///
    /// The separator commits: once it is consumed the end must parse. With a
    /// recurrence the separator is required.
    fn side_or_interval(&mut self, recurrence: Option<Recurrence>) -> Parsed<Token> {
        let start_pos = self.pos;

        let start = match self.attempt(Self::side)? {
            Some(start) => start,
            None if recurrence.is_some() => {
                return Err(self.fatal(ParseErrorKind::MissingEndpoint));
            }
            None => return Err(Fail::Mismatch),
        };
        if !self.eat(b'/') {
            if recurrence.is_some() {
                return Err(self.fatal(ParseErrorKind::MissingEndpoint));
            }
            return Ok(start);
        }

        let Some(end) = self.attempt(Self::side)? else {
            return Err(self.fatal(ParseErrorKind::MissingEndpoint));
        };
        if start.is_duration() && end.is_duration() {
            return Err(Fail::Fatal(ParseError::new(
                ParseErrorKind::DurationInterval,
                self.remainder_from(start_pos),
            )));
        }

        Ok(Token::Interval {
            recurrence,
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    /// `"R" integer? "/"`
    fn recurrence(&mut self) -> Parsed<Recurrence> {
        self.expect(b'R')?;
        let recurrence = match self.attempt(Self::digits)? {
            Some(count) => Recurrence::Count(
                count
                    .parse()
                    .map_err(|_e| self.fatal(ParseErrorKind::NumberOutOfRange))?,
            ),
            None => Recurrence::Infinite,
        };
        self.expect(b'/')?;
        Ok(recurrence)
    }

    /// An interval endpoint or duration.
    fn side(&mut self) -> Parsed<Token> {
        if let Some(duration) = self.attempt(Self::duration)? {
            return Ok(duration);
        }
        if let Some(token) = self.attempt(Self::explicit)? {
            return Ok(token);
        }
        if let Some(selection) = self.attempt(Self::selection)? {
            return Ok(Token::Selection(selection));
        }
        self.token_set()
    }

    // ---- sets of tokens ----

    /// `"{" side ("," side)* "}"` or the `[...]` alternative form.
    fn token_set(&mut self) -> Parsed<Token> {
        let (close, all_of) = match self.peek() {
            Some(b'{') => (b'}', true),
            Some(b'[') => (b']', false),
            _ => return Err(Fail::Mismatch),
        };
        self.bump();

        let members = self.nested(|p| {
            let mut members = vec![p.set_member()?];
            while p.eat(b',') {
                members.push(p.set_member()?);
            }
            p.expect(close)?;
            Ok(members)
        })?;

        Ok(if all_of {
            Token::AllOf(members)
        } else {
            Token::OneOf(members)
        })
    }

    fn set_member(&mut self) -> Parsed<Token> {
        let recurrence = self.attempt(Self::recurrence)?;
        self.side_or_interval(recurrence)
    }

    // ---- designated values ----

    /// `(value "Y")? (value "M")? ... ("T" (value "H")? ...)?` with at least
    /// one field. The BC marker is accepted before `Y` when `allow_bc`.
    pub(super) fn designated(
        &mut self,
        date_units: &[Unit],
        allow_bc: bool,
    ) -> Parsed<Vec<Field>> {
        let mut fields = Vec::new();
        for &unit in date_units {
            if let Some(field) = self.attempt(|p| p.designated_field(unit, allow_bc))? {
                fields.push(field);
            }
        }

        let time = self.attempt(|p| {
            p.expect(b'T')?;
            let mut time = Vec::new();
            for unit in TIME_UNITS {
                if let Some(field) = p.attempt(|p| p.designated_field(unit, false))? {
                    time.push(field);
                }
            }
            if time.is_empty() {
                return Err(Fail::Mismatch);
            }
            Ok(time)
        })?;
        fields.extend(time.unwrap_or_default());

        if fields.is_empty() {
            return Err(Fail::Mismatch);
        }
        Ok(fields)
    }

    fn designated_field(&mut self, unit: Unit, allow_bc: bool) -> Parsed<Field> {
        let value = self.value()?;
        let bc_pos = self.pos;
        let bc = allow_bc && unit == Unit::Year && self.eat(b'B');
        self.expect(unit.designator() as u8)?;

        let value = if bc {
            Self::astronomical(value).ok_or_else(|| {
                Fail::Fatal(ParseError::new(
                    ParseErrorKind::MaskedBcYear,
                    self.remainder_from(bc_pos),
                ))
            })?
        } else {
            value
        };
        Ok(Field::new(unit, value))
    }

    // ---- durations and groups ----

    /// `"-"? "P" duration-fields`
    fn duration(&mut self) -> Parsed<Token> {
        let direction = if self.eat(b'-') {
            Direction::Backward
        } else {
            Direction::Forward
        };
        self.expect(b'P')?;
        let fields = self.designated(&DURATION_UNITS, false)?;
        Ok(Token::Duration { direction, fields })
    }

    /// `value "G" duration-fields "U"`
    fn group(&mut self) -> Parsed<Token> {
        let count = self.value()?;
        self.expect(b'G')?;
        let elements = self.designated(&DURATION_UNITS, false)?;
        self.expect(b'U')?;
        Ok(Token::Group { count, elements })
    }

    // ---- selections ----

    /// `"L" (interval | selection)? designated? (signed "I")? ("N" | "E")`
    fn selection(&mut self) -> Parsed<Selection> {
        self.expect(b'L')?;
        self.nested(|p| {
            let period = p.period()?;
            let fields = p
                .attempt(|p| p.designated(&DATE_UNITS, true))?
                .unwrap_or_default();
            let instance = p.attempt(|p| {
                let instance = p.signed_integer()?;
                p.expect(b'I')?;
                Ok(instance)
            })?;

            if period.is_none() && fields.is_empty() && instance.is_none() {
                return Err(Fail::Mismatch);
            }
            let scope = if p.eat(b'N') {
                Scope::Instance
            } else if p.eat(b'E') {
                Scope::Every
            } else {
                return Err(Fail::Mismatch);
            };

            Ok(Selection {
                period: period.map(Box::new),
                fields,
                instance,
                scope,
            })
        })
    }

    /// `interval | selection`, or nothing. Any other side is left unread.
    fn period(&mut self) -> Parsed<Option<Token>> {
        let start = self.pos;
        let recurrence = self.attempt(Self::recurrence)?;
        match self.attempt(|p| p.side_or_interval(recurrence))? {
            Some(period @ (Token::Interval { .. } | Token::Selection(_))) => Ok(Some(period)),
            Some(_) | None => {
                self.pos = start;
                Ok(None)
            }
        }
    }
}
