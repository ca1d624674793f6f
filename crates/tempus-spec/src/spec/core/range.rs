//! Integer ranges with an optional calendar-relative form.

use serde::{Deserialize, Serialize};
use std::num::NonZeroI64;

const ONE: NonZeroI64 = match NonZeroI64::new(1) {
    Some(step) => step,
    None => unreachable!(),
};

/// Stride of a [`Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// A fixed, non-zero stride.
    By(NonZeroI64),
    /// Bounds are provisional and must be resolved against a calendar before
    /// the range can be enumerated.
    Open,
}

/// `first..=last` walked by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub first: i64,
    pub last: i64,
    pub step: Step,
}

impl Range {
    /// Creates a closed range with a stride of one.
    #[must_use]
    pub const fn closed(first: i64, last: i64) -> Self {
        Self {
            first,
            last,
            step: Step::By(ONE),
        }
    }

    /// Creates a closed range with an explicit stride.
    #[must_use]
    pub const fn stepped(first: i64, last: i64, step: NonZeroI64) -> Self {
        Self {
            first,
            last,
            step: Step::By(step),
        }
    }

    /// Creates an open range. Missing bounds are spelled `i64::MIN` and
    /// `i64::MAX`.
    #[must_use]
    pub const fn open(first: i64, last: i64) -> Self {
        Self {
            first,
            last,
            step: Step::Open,
        }
    }

    /// Returns whether the bounds still need calendar resolution.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.step, Step::Open)
    }

    /// Converts a resolved range into its closed form. A stride carried over
    /// from an open range is one.
    #[must_use]
    pub const fn into_closed(self) -> Self {
        match self.step {
            Step::By(_) => self,
            Step::Open => Self::closed(self.first, self.last),
        }
    }

    /// Returns whether the range has no members left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.step {
            Step::By(step) if step.get() < 0 => self.first < self.last,
            Step::By(_) | Step::Open => self.first > self.last,
        }
    }

    /// Splits off the first member. The remainder is `None` once the range is
    /// used up.
    ///
    /// Open ranges cannot be enumerated and always return `None`.
    #[must_use]
    pub fn split_first(&self) -> Option<(i64, Option<Self>)> {
        let Step::By(step) = self.step else {
            return None;
        };
        if self.is_empty() {
            return None;
        }

        let rest = self
            .first
            .checked_add(step.get())
            .map(|first| Self { first, ..*self })
            .filter(|rest| !rest.is_empty());
        Some((self.first, rest))
    }

    /// Iterates the members of a closed range.
    pub fn members(&self) -> impl Iterator<Item = i64> + use<> {
        let mut cursor = Some(*self);
        std::iter::from_fn(move || {
            let (value, rest) = cursor.take()?.split_first()?;
            cursor = rest;
            Some(value)
        })
    }

    /// Mirrors the range onto astronomical year numbering: BC year `n`
    /// becomes `-(n - 1)`. The result walks upwards so the oldest year comes
    /// first.
    #[must_use]
    pub fn to_astronomical(&self) -> Self {
        let flip = |year: i64| 1_i64.saturating_sub(year);
        let Step::By(step) = self.step else {
            return Self::open(flip(self.last), flip(self.first));
        };
        if self.is_empty() {
            return *self;
        }

        let stride = i128::from(step.get());
        let span = (i128::from(self.last) - i128::from(self.first)) / stride;
        let final_member =
            i64::try_from(i128::from(self.first) + span * stride).unwrap_or(self.last);
        let stride = step
            .get()
            .checked_abs()
            .and_then(NonZeroI64::new)
            .unwrap_or(ONE);

        Self::stepped(
            flip(self.first.max(final_member)),
            flip(self.first.min(final_member)),
            stride,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: i64) -> NonZeroI64 {
        NonZeroI64::new(n).unwrap()
    }

    #[test]
    fn closed_members() {
        let members: Vec<i64> = Range::closed(3, 6).members().collect();
        assert_eq!(members, vec![3, 4, 5, 6]);
    }

    #[test]
    fn stepped_members() {
        let members: Vec<i64> = Range::stepped(0, 10, step(4)).members().collect();
        assert_eq!(members, vec![0, 4, 8]);

        let down: Vec<i64> = Range::stepped(5, 1, step(-2)).members().collect();
        assert_eq!(down, vec![5, 3, 1]);
    }

    #[test]
    fn split_first_exhausts() {
        let (value, rest) = Range::closed(7, 7).split_first().unwrap();
        assert_eq!(value, 7);
        assert!(rest.is_none());
        assert!(Range::closed(8, 7).split_first().is_none());
    }

    #[test]
    fn split_first_near_overflow() {
        let (value, rest) = Range::closed(i64::MAX, i64::MAX).split_first().unwrap();
        assert_eq!(value, i64::MAX);
        assert!(rest.is_none());
    }

    #[test]
    fn open_ranges_do_not_enumerate() {
        let range = Range::open(1, i64::MAX);
        assert!(range.is_open());
        assert!(range.split_first().is_none());
        assert_eq!(range.into_closed(), Range::closed(1, i64::MAX));
    }

    #[test]
    fn astronomical_years() {
        // 1 BC ..= 10 BC is -9 ..= 0, oldest first.
        let flipped = Range::closed(1, 10).to_astronomical();
        assert_eq!(flipped, Range::closed(-9, 0));

        let stepped = Range::stepped(1, 10, step(4)).to_astronomical();
        assert_eq!(stepped.members().collect::<Vec<_>>(), vec![-8, -4, 0]);

        let descending = Range::stepped(5, 1, step(-2)).to_astronomical();
        assert_eq!(descending.members().collect::<Vec<_>>(), vec![-4, -2, 0]);

        let open = Range::open(44, i64::MAX).to_astronomical();
        assert!(open.is_open());
        assert_eq!(open.last, -43);
    }
}
