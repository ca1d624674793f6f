use std::time::{Duration, Instant};

use super::*;
use crate::spec::calendar::{Calendar, Gregorian, Resolved};
use crate::spec::core::Unit;

fn literals(values: &[i64]) -> Reading {
    Reading::Pending(values.iter().copied().map(Candidate::Literal).collect())
}

fn every_day() -> Reading {
    Reading::Pending(vec![Candidate::Range(Range::open(1, i64::MAX))].into())
}

/// Collects `(unit value, ...)` rows for every position until exhaustion.
fn positions(state: &OdometerState<Gregorian>, units: &[Unit]) -> Vec<Vec<i64>> {
    state
        .occurrences()
        .map(|state| {
            let collected = collect(&state.unwrap());
            units
                .iter()
                .map(|unit| collected.value(*unit).unwrap())
                .collect()
        })
        .collect()
}

#[test_log::test]
fn single_unit_cycles_in_source_order() {
    let state = OdometerState::new(Gregorian, vec![(Unit::Day, literals(&[5, 1, 9]))]);

    assert_eq!(positions(&state, &[Unit::Day]), vec![vec![5], vec![1], vec![9]]);
}

#[test_log::test]
fn full_rollover_ends_the_sequence() {
    let state = OdometerState::new(Gregorian, vec![(Unit::Day, literals(&[5]))]);
    let first = state.advance().unwrap().unwrap();

    assert!(first.advance().unwrap().is_none());
}

#[test_log::test]
fn finer_rollover_carries_into_coarser_unit() {
    let state = OdometerState::new(
        Gregorian,
        vec![
            (Unit::Year, Reading::Anchored(2018)),
            (Unit::Month, literals(&[1, 2])),
            (Unit::Day, literals(&[10, 20])),
        ],
    );

    let rows = positions(&state, &[Unit::Month, Unit::Day]);
    assert_eq!(rows, vec![vec![1, 10], vec![1, 20], vec![2, 10], vec![2, 20]]);
}

#[test_log::test]
fn day_range_is_re_resolved_after_month_carry() {
    let state = OdometerState::new(
        Gregorian,
        vec![
            (Unit::Year, Reading::Anchored(2024)),
            (Unit::Month, literals(&[2, 3])),
            (Unit::Day, every_day()),
        ],
    );

    let rows = positions(&state, &[Unit::Month, Unit::Day]);
    assert_eq!(rows.len(), 29 + 31);
    assert_eq!(rows[28], vec![2, 29]);
    assert_eq!(rows[29], vec![3, 1]);
    assert_eq!(rows.last(), Some(&vec![3, 31]));
}

#[test_log::test]
fn units_without_a_legal_value_carry_again() {
    let state = OdometerState::new(
        Gregorian,
        vec![
            (Unit::Year, Reading::Anchored(2023)),
            (
                Unit::Month,
                Reading::Pending(vec![Candidate::Range(Range::closed(1, 6))].into()),
            ),
            (
                Unit::Day,
                Reading::Pending(vec![Candidate::Range(Range::open(31, i64::MAX))].into()),
            ),
        ],
    );

    let rows = positions(&state, &[Unit::Month, Unit::Day]);
    assert_eq!(rows, vec![vec![1, 31], vec![3, 31], vec![5, 31]]);
}

#[test_log::test]
fn long_candidate_lists_step_in_constant_time() {
    let values: Vec<i64> = (0..200_000).collect();
    let state = OdometerState::new(Gregorian, vec![(Unit::Second, literals(&values))]);

    let started = Instant::now();
    let last = state.occurrences().take(1_000).last().unwrap().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(last.units()[0].1.fixed(), Some(999));
}

#[test_log::test]
fn nothing_cyclable_is_exhausted() {
    let state = OdometerState::new(
        Gregorian,
        vec![
            (Unit::Year, Reading::Anchored(2018)),
            (Unit::Month, Reading::Exhausted),
        ],
    );
    assert!(state.advance().unwrap().is_none());
    assert_eq!(state.occurrences().count(), 0);
}

#[test_log::test]
fn advancing_leaves_earlier_states_intact() {
    let state = OdometerState::new(Gregorian, vec![(Unit::Hour, literals(&[8, 12, 16]))]);
    let first = state.advance().unwrap().unwrap();
    let second = first.advance().unwrap().unwrap();

    assert_eq!(first.advance().unwrap().unwrap(), second);
    assert_eq!(collect(&first).value(Unit::Hour), Some(8));
    assert_eq!(collect(&second).value(Unit::Hour), Some(12));
    assert!(matches!(state.reading(Unit::Hour), Some(Reading::Pending(_))));
}

#[test_log::test]
fn collect_is_plain_and_idempotent() {
    let state = OdometerState::new(
        Gregorian,
        vec![
            (Unit::Year, Reading::Anchored(2018)),
            (Unit::Month, literals(&[3])),
            (Unit::Day, every_day()),
            (Unit::Hour, Reading::Exhausted),
        ],
    );
    let state = state.advance().unwrap().unwrap();

    let once = collect(&state);
    assert_eq!(
        once.units,
        vec![
            (Unit::Year, Plain::Value(2018)),
            (Unit::Month, Plain::Value(3)),
            (Unit::Day, Plain::Value(1)),
            (Unit::Hour, Plain::Candidates(Vec::new())),
        ]
    );
    assert_eq!(collect(&once), once);

    let json = serde_json::to_string(&once).unwrap();
    assert!(!json.contains("cursor"));
    assert!(!json.contains("rollover"));
}

#[test_log::test]
fn collected_as_datetime() {
    let state = OdometerState::new(
        Gregorian,
        vec![
            (Unit::Year, Reading::Anchored(2024)),
            (Unit::Month, literals(&[2])),
            (Unit::Day, literals(&[29])),
            (Unit::Hour, literals(&[9])),
        ],
    );
    let collected = collect(&state.advance().unwrap().unwrap());
    let datetime = collected.to_naive_datetime().unwrap();

    assert_eq!(datetime.to_string(), "2024-02-29 09:00:00");
    assert!(Collected::default().to_naive_datetime().is_none());
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("calendar offline")]
struct Offline;

#[derive(Debug, Clone)]
struct Failing;

impl Calendar for Failing {
    type Error = Offline;

    fn validate(&self, _context: &[(Unit, Resolved)]) -> Result<Vec<(Unit, Resolved)>, Offline> {
        Err(Offline)
    }
}

#[test_log::test]
fn calendar_errors_propagate_unmodified() {
    let state = OdometerState::new(Failing, vec![(Unit::Day, every_day())]);
    assert_eq!(state.advance().unwrap_err(), Offline);

    let mut occurrences = state.occurrences();
    assert!(matches!(occurrences.next(), Some(Err(Offline))));
    assert!(occurrences.next().is_none());
}

#[test_log::test]
fn literals_never_consult_the_calendar() {
    let state = OdometerState::new(Failing, vec![(Unit::Day, literals(&[1, 2]))]);
    assert_eq!(state.occurrences().count(), 2);
}
