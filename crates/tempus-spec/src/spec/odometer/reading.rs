//! Per-unit readings and the unit step.

use std::num::NonZeroI64;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Candidate, Tick};
use crate::spec::calendar::{Calendar, Resolved};
use crate::spec::core::{Range, Unit};

/// Resumable position within a candidate sequence.
///
/// `original` is shared by every state derived from the same reading, so a
/// step never copies it. What is left to emit is the rest of `partial`
/// followed by `original[next..]`. A `partial` range has already been
/// resolved; it is closed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub original: Arc<[Candidate]>,
    pub next: usize,
    pub partial: Option<Range>,
}

impl Cursor {
    fn start(original: &Arc<[Candidate]>) -> Self {
        Self {
            original: Arc::clone(original),
            next: 0,
            partial: None,
        }
    }

    fn resume(&self, next: usize, partial: Option<Range>) -> Self {
        Self {
            original: Arc::clone(&self.original),
            next,
            partial,
        }
    }

    /// Emits the next value together with the cursor that follows it.
    ///
    /// Spent ranges are skipped. An open candidate is resolved first and is
    /// skipped when the calendar leaves it empty.
    fn step<C: Calendar>(
        &self,
        unit: Unit,
        calendar: &C,
        context: &[(Unit, i64)],
    ) -> Result<Option<(i64, Self)>, C::Error> {
        if let Some((value, rest)) = self.partial.and_then(|range| range.split_first()) {
            return Ok(Some((value, self.resume(self.next, rest))));
        }

        for (index, candidate) in self.original.iter().enumerate().skip(self.next) {
            let range = match *candidate {
                Candidate::Literal(value) => {
                    return Ok(Some((value, self.resume(index + 1, None))));
                }
                Candidate::Range(range) if range.is_open() => {
                    match resolve(range, unit, calendar, context)? {
                        Some(range) => range,
                        None => continue,
                    }
                }
                Candidate::Range(range) => range,
                Candidate::Stride { range, stride } => {
                    let walk = resolve(range, unit, calendar, context)?
                        .and_then(|bounds| align(range.first, bounds, stride));
                    match walk {
                        Some(range) => range,
                        None => continue,
                    }
                }
            };

            if let Some((value, rest)) = range.split_first() {
                return Ok(Some((value, self.resume(index + 1, rest))));
            }
            tracing::trace!(%unit, ?range, "Skipping spent range");
        }
        Ok(None)
    }
}

/// The value held by one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    /// Fixed; never cycles.
    Anchored(i64),
    /// Candidates not yet started.
    Pending(Arc<[Candidate]>),
    /// Mid-cycle: `current` was emitted last.
    Active { current: i64, cursor: Cursor },
    /// Nothing to cycle.
    Exhausted,
}

impl Reading {
    /// Returns whether stepping this reading can produce a value.
    #[must_use]
    pub const fn is_cyclable(&self) -> bool {
        matches!(self, Self::Pending(_) | Self::Active { .. })
    }

    /// Returns the value this unit is fixed at, if any.
    #[must_use]
    pub const fn fixed(&self) -> Option<i64> {
        match self {
            Self::Anchored(value) | Self::Active { current: value, .. } => Some(*value),
            Self::Pending(_) | Self::Exhausted => None,
        }
    }

    /// Returns this reading moved back to the start of its sequence. Readings
    /// that do not cycle are returned as they are.
    #[must_use]
    pub fn rewound(&self) -> Self {
        match self {
            Self::Active { cursor, .. } => Self::Pending(Arc::clone(&cursor.original)),
            other => other.clone(),
        }
    }

    /// ## Summary
    /// Steps this reading once.
    ///
    /// `context` holds the fixed values of every coarser unit, coarsest
    /// first; open ranges are resolved against it. A pending reading starts
    /// at its first value. An active reading emits its next value, or wraps
    /// to the first value with [`Tick::Rollover`] once its sequence is spent.
    ///
    /// Returns `None` when the reading is not cyclable or its sequence has no
    /// value in this context.
    ///
    /// ## Errors
    /// Propagates the calendar's error unmodified.
    pub fn cycle<C: Calendar>(
        &self,
        unit: Unit,
        calendar: &C,
        context: &[(Unit, i64)],
    ) -> Result<Option<(Self, Tick)>, C::Error> {
        let (step, wrapped) = match self {
            Self::Anchored(_) | Self::Exhausted => return Ok(None),
            Self::Pending(candidates) => {
                (Cursor::start(candidates).step(unit, calendar, context)?, false)
            }
            Self::Active { cursor, .. } => match cursor.step(unit, calendar, context)? {
                Some(step) => (Some(step), false),
                None => (
                    Cursor::start(&cursor.original).step(unit, calendar, context)?,
                    true,
                ),
            },
        };

        let Some((current, cursor)) = step else {
            return Ok(None);
        };
        let tick = if wrapped {
            Tick::Rollover(current)
        } else {
            Tick::Next(current)
        };
        Ok(Some((Self::Active { current, cursor }, tick)))
    }
}

/// ## Summary
/// Asks the calendar for the concrete bounds of an open range.
///
/// The resolved range is used as soon as it holds one member. A rule that
/// demanded two would never emit the last day of a month from an open range
/// starting on it, such as day `{31..}` in January.
fn resolve<C: Calendar>(
    range: Range,
    unit: Unit,
    calendar: &C,
    context: &[(Unit, i64)],
) -> Result<Option<Range>, C::Error> {
    let request: Vec<(Unit, Resolved)> = context
        .iter()
        .map(|&(unit, value)| (unit, Resolved::Value(value)))
        .chain(std::iter::once((unit, Resolved::Range(range))))
        .collect();

    let reply = calendar.validate(&request)?;
    let resolved = match reply.last() {
        Some(&(answered, Resolved::Range(range))) if answered == unit => range.into_closed(),
        Some(&(answered, Resolved::Value(value))) if answered == unit => {
            Range::closed(value, value)
        }
        other => {
            tracing::warn!(%unit, ?other, "Calendar reply does not end with the requested unit");
            return Ok(None);
        }
    };

    tracing::trace!(
        %unit,
        ?context,
        first = resolved.first,
        last = resolved.last,
        "Resolved open range"
    );
    Ok((!resolved.is_empty()).then_some(resolved))
}

/// Walks `bounds` by a positive `stride`, starting at the first member that
/// lies on the walk from `origin`.
fn align(origin: i64, bounds: Range, stride: NonZeroI64) -> Option<Range> {
    let width = stride.get();
    if width < 0 {
        return None;
    }
    let behind = bounds.first.checked_sub(origin)?.max(0);
    let skipped = behind.checked_add(width - 1)? / width;
    let first = skipped.checked_mul(width)?.checked_add(origin)?;
    Some(Range::stepped(first, bounds.last, stride))
}
