//! Token tree produced by the parser.

use serde::{Deserialize, Serialize};

use super::{Range, Unit};

/// A member of an integer set: a literal or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Integer(i64),
    Range(Range),
}

/// One digit position of a masked value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Digit {
    Decimal(u8),
    /// `X`: any decimal digit.
    Wildcard,
    /// `{0,2,4}`: every listed digit, expanded as a dimension.
    AllOf(Vec<u8>),
    /// `[0,2,4]`: exactly one of the listed digits.
    OneOf(Vec<u8>),
}

impl Digit {
    /// Returns the digits this position admits, ascending.
    #[must_use]
    pub fn choices(&self) -> Vec<u8> {
        match self {
            Self::Decimal(d) => vec![*d],
            Self::Wildcard => (0..=9).collect(),
            Self::AllOf(ds) | Self::OneOf(ds) => {
                let mut ds = ds.clone();
                ds.sort_unstable();
                ds.dedup();
                ds
            }
        }
    }
}

/// The value attached to a unit designator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Integer(i64),
    /// Ordered digit markers, most significant first.
    Mask(Vec<Digit>),
    /// `{...}`: every member is simultaneously valid.
    AllOf(Vec<Member>),
    /// `[...]`: exactly one member applies.
    OneOf(Vec<Member>),
}

/// A value tagged with the calendar unit it measures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub unit: Unit,
    pub value: Value,
}

impl Field {
    #[must_use]
    pub const fn new(unit: Unit, value: Value) -> Self {
        Self { unit, value }
    }

    /// Creates a field holding a single integer.
    #[must_use]
    pub const fn integer(unit: Unit, value: i64) -> Self {
        Self::new(unit, Value::Integer(value))
    }
}

/// UTC time-shift suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeShift {
    /// `Z`
    Utc,
    /// `+hh:mm` / `-hh:mm`, in minutes east of UTC.
    Offset { minutes: i32 },
}

/// Direction of a duration. A leading `-` marks `Backward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Repeat count of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// `R5/`
    Count(u64),
    /// `R/`
    Infinite,
}

/// How a selection terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// `N`: this specific instance.
    Instance,
    /// `E`: every matching weekday.
    Every,
}

/// "nth weekday within a period" qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Period the selection counts within; the enclosing date when absent.
    pub period: Option<Box<Token>>,
    pub fields: Vec<Field>,
    /// Ordinal instance; negative values count from the end of the period.
    pub instance: Option<i64>,
    pub scope: Scope,
}

/// A parsed specification node, one variant per grammar production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Token {
    /// A designated value such as `2018Y` or `{1,3}D`.
    Field(Field),
    Date {
        fields: Vec<Field>,
        shift: Option<TimeShift>,
    },
    TimeOfDay {
        fields: Vec<Field>,
        shift: Option<TimeShift>,
    },
    DateTime {
        date: Vec<Field>,
        time: Vec<Field>,
        shift: Option<TimeShift>,
    },
    Duration {
        direction: Direction,
        fields: Vec<Field>,
    },
    Interval {
        recurrence: Option<Recurrence>,
        start: Box<Token>,
        end: Box<Token>,
    },
    AllOf(Vec<Token>),
    OneOf(Vec<Token>),
    /// `count G elements U`
    Group {
        count: Value,
        elements: Vec<Field>,
    },
    Selection(Selection),
}

impl Token {
    /// Returns the production name, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Field(_) => "field",
            Self::Date { .. } => "date",
            Self::TimeOfDay { .. } => "time_of_day",
            Self::DateTime { .. } => "datetime",
            Self::Duration { .. } => "duration",
            Self::Interval { .. } => "interval",
            Self::AllOf(_) => "all_of",
            Self::OneOf(_) => "one_of",
            Self::Group { .. } => "group",
            Self::Selection(_) => "selection",
        }
    }

    /// Returns whether this token is a duration.
    #[must_use]
    pub const fn is_duration(&self) -> bool {
        matches!(self, Self::Duration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_choices() {
        assert_eq!(Digit::Decimal(4).choices(), vec![4]);
        assert_eq!(Digit::Wildcard.choices().len(), 10);
        assert_eq!(Digit::OneOf(vec![8, 2, 2]).choices(), vec![2, 8]);
    }

    #[test]
    fn token_serializes_with_tag() {
        let token = Token::Field(Field::integer(Unit::Year, 2018));
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["type"], "field");
        assert_eq!(json["value"]["unit"], "year");
        assert_eq!(json["value"]["value"]["integer"], 2018);

        let back: Token = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn kinds() {
        let duration = Token::Duration {
            direction: Direction::Backward,
            fields: vec![Field::integer(Unit::Day, 9)],
        };
        assert_eq!(duration.kind(), "duration");
        assert!(duration.is_duration());
        assert_eq!(Token::AllOf(vec![]).kind(), "all_of");
    }
}
