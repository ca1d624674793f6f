//! Calendar units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar unit, listed coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Year,
    Month,
    /// ISO 8601 week of the year.
    Week,
    /// Day of the month.
    Day,
    /// Day of the week, 1 = Monday.
    Weekday,
    Hour,
    Minute,
    Second,
}

impl Unit {
    /// Returns the unit name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Weekday => "weekday",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }

    /// Returns the designator letter that follows a value of this unit.
    ///
    /// Month and minute share `M`; the `T` separator disambiguates them.
    #[must_use]
    pub const fn designator(self) -> char {
        match self {
            Self::Year => 'Y',
            Self::Month | Self::Minute => 'M',
            Self::Week => 'W',
            Self::Day => 'D',
            Self::Weekday => 'K',
            Self::Hour => 'H',
            Self::Second => 'S',
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designators() {
        assert_eq!(Unit::Year.designator(), 'Y');
        assert_eq!(Unit::Month.designator(), 'M');
        assert_eq!(Unit::Minute.designator(), 'M');
        assert_eq!(Unit::Weekday.designator(), 'K');
    }

    #[test]
    fn significance_order() {
        assert!(Unit::Year < Unit::Month);
        assert!(Unit::Day < Unit::Hour);
        assert!(Unit::Minute < Unit::Second);
    }
}
