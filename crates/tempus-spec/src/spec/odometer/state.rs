//! The odometer proper: ordered readings and carry propagation.

use super::{Reading, Tick};
use crate::spec::calendar::Calendar;
use crate::spec::core::Unit;

/// Ordered readings paired with the calendar that resolves them.
///
/// Units are held coarsest first in the order the caller supplied; the order
/// never changes for the lifetime of the state or anything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdometerState<C> {
    calendar: C,
    units: Vec<(Unit, Reading)>,
}

impl<C: Calendar + Clone> OdometerState<C> {
    #[must_use]
    pub const fn new(calendar: C, units: Vec<(Unit, Reading)>) -> Self {
        Self { calendar, units }
    }

    #[must_use]
    pub const fn calendar(&self) -> &C {
        &self.calendar
    }

    #[must_use]
    pub fn units(&self) -> &[(Unit, Reading)] {
        &self.units
    }

    /// Returns the reading of `unit`, if the state tracks it.
    #[must_use]
    pub fn reading(&self, unit: Unit) -> Option<&Reading> {
        self.units
            .iter()
            .find_map(|(u, reading)| (*u == unit).then_some(reading))
    }

    /// ## Summary
    /// Computes the next position of the odometer.
    ///
    /// A state that still has pending units is started: those units take
    /// their first values, coarsest first, and nothing else moves. Otherwise
    /// the finest cyclable unit steps; each rollover carries into the next
    /// coarser cyclable unit, and every unit finer than the one that advanced
    /// restarts against the new coarser values. A unit with no legal value in
    /// its new context carries again.
    ///
    /// Returns `Ok(None)` when no unit can cycle or every unit rolled over.
    ///
    /// ## Errors
    /// Propagates the calendar's error unmodified.
    #[tracing::instrument(skip(self), fields(units = self.units.len()))]
    pub fn advance(&self) -> Result<Option<Self>, C::Error> {
        if !self.units.iter().any(|(_, reading)| reading.is_cyclable()) {
            tracing::debug!("No cyclable unit");
            return Ok(None);
        }

        let mut units = self.units.clone();
        let starting = units
            .iter()
            .any(|(_, reading)| matches!(reading, Reading::Pending(_)));

        let len = units.len();
        let mut restart_from = if starting {
            len
        } else {
            match self.carry(&mut units, len)? {
                Some(advanced) => advanced + 1,
                None => {
                    tracing::debug!("Every unit rolled over");
                    return Ok(None);
                }
            }
        };

        while let Some(stuck) = self.settle(&mut units, restart_from)? {
            match self.carry(&mut units, stuck)? {
                Some(advanced) => restart_from = advanced + 1,
                None => {
                    tracing::debug!(unit = %units[stuck].0, "No legal value left");
                    return Ok(None);
                }
            }
        }

        Ok(Some(Self {
            calendar: self.calendar.clone(),
            units,
        }))
    }

    /// Returns an iterator over successive positions.
    #[must_use]
    pub fn occurrences(&self) -> Occurrences<C> {
        Occurrences {
            state: Some(self.clone()),
        }
    }

    /// Steps cyclable units from `below - 1` toward the coarsest until one
    /// advances without rolling over. Returns its index, or `None` when the
    /// carry ran off the coarse end.
    fn carry(
        &self,
        units: &mut [(Unit, Reading)],
        below: usize,
    ) -> Result<Option<usize>, C::Error> {
        for index in (0..below).rev() {
            let (unit, reading) = &units[index];
            if !reading.is_cyclable() {
                continue;
            }
            let unit = *unit;
            let context = fixed_prefix(&units[..index]);

            match reading.cycle(unit, &self.calendar, &context)? {
                Some((next, Tick::Next(value))) => {
                    tracing::trace!(%unit, value, "Advanced");
                    units[index].1 = next;
                    return Ok(Some(index));
                }
                Some((next, Tick::Rollover(value))) => {
                    tracing::trace!(%unit, value, "Rolled over");
                    units[index].1 = next;
                }
                None => {
                    tracing::trace!(%unit, "No value in context");
                    units[index].1 = units[index].1.rewound();
                }
            }
        }
        Ok(None)
    }

    /// Restarts every pending unit, plus every cyclable unit at or after
    /// `from`, coarsest first. Returns the index of the first unit that has
    /// no value in its context.
    fn settle(
        &self,
        units: &mut [(Unit, Reading)],
        from: usize,
    ) -> Result<Option<usize>, C::Error> {
        for index in 0..units.len() {
            let (unit, reading) = &units[index];
            let restart = match reading {
                Reading::Pending(_) => true,
                Reading::Active { .. } => index >= from,
                Reading::Anchored(_) | Reading::Exhausted => false,
            };
            if !restart {
                continue;
            }

            let unit = *unit;
            let fresh = reading.rewound();
            let context = fixed_prefix(&units[..index]);
            match fresh.cycle(unit, &self.calendar, &context)? {
                Some((started, tick)) => {
                    tracing::trace!(%unit, value = tick.value(), "Started");
                    units[index].1 = started;
                }
                None => {
                    units[index].1 = fresh;
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }
}

/// Fixed values of the given units, in order. Only ever built from the units
/// coarser than the one being stepped.
fn fixed_prefix(units: &[(Unit, Reading)]) -> Vec<(Unit, i64)> {
    units
        .iter()
        .filter_map(|(unit, reading)| reading.fixed().map(|value| (*unit, value)))
        .collect()
}

/// Successive odometer positions, pulled one at a time.
///
/// Ends at exhaustion, or after yielding a calendar error.
#[derive(Debug, Clone)]
pub struct Occurrences<C> {
    state: Option<OdometerState<C>>,
}

impl<C: Calendar + Clone> Iterator for Occurrences<C> {
    type Item = Result<OdometerState<C>, C::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.take()?;
        match state.advance() {
            Ok(Some(next)) => {
                self.state = Some(next.clone());
                Some(Ok(next))
            }
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
