//! Cartesian expansion of `all_of` dimensions.
//!
//! Every `all_of` set (and every range inside one) is a dimension. Expanding
//! a token list yields one row per combination, with the head-most dimension
//! outermost. `one_of` sets are alternatives and, like selections and
//! intervals, are left untouched.

use crate::spec::core::{Digit, Field, Member, Token, Value};

/// Accumulator threaded from the tail of the list toward its head.
///
/// Elements are pushed onto the back of each row and the rows are reversed
/// once at the end.
enum Rows<T> {
    /// Nothing has branched yet.
    Flat(Vec<T>),
    Expanded(Vec<Vec<T>>),
}

/// ## Summary
/// Multiplies out `items`, where `alternatives` returns the concrete choices
/// for a branching item and `None` for a plain one.
///
/// A plain item appears unchanged in every row. A branching item with `N`
/// choices over `M` existing rows yields `N × M` rows ordered choice-major.
/// An empty input yields no rows.
pub fn cartesian<T: Clone>(
    items: &[T],
    alternatives: impl Fn(&T) -> Option<Vec<T>>,
) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }

    let acc = items.iter().rev().fold(Rows::Flat(Vec::new()), |acc, item| {
        match (alternatives(item), acc) {
            (None, Rows::Flat(mut row)) => {
                row.push(item.clone());
                Rows::Flat(row)
            }
            (None, Rows::Expanded(mut rows)) => {
                for row in &mut rows {
                    row.push(item.clone());
                }
                Rows::Expanded(rows)
            }
            (Some(choices), Rows::Flat(tail)) => Rows::Expanded(
                choices
                    .into_iter()
                    .map(|choice| {
                        let mut row = tail.clone();
                        row.push(choice);
                        row
                    })
                    .collect(),
            ),
            (Some(choices), Rows::Expanded(rows)) => Rows::Expanded(
                choices
                    .into_iter()
                    .flat_map(|choice| {
                        rows.iter().map(move |row| {
                            let mut row = row.clone();
                            row.push(choice.clone());
                            row
                        })
                    })
                    .collect(),
            ),
        }
    });

    let mut rows = match acc {
        Rows::Flat(row) => vec![row],
        Rows::Expanded(rows) => rows,
    };
    for row in &mut rows {
        row.reverse();
    }
    rows
}

/// ## Summary
/// Expands a token list into the concrete rows it denotes.
///
/// A list without `all_of` dimensions comes back as a single row equal to the
/// input. Open ranges cannot be enumerated before calendar resolution and
/// stay whole.
#[must_use]
pub fn expand(tokens: &[Token]) -> Vec<Vec<Token>> {
    let rows = cartesian(tokens, token_alternatives);
    tracing::debug!(tokens = tokens.len(), rows = rows.len(), "Specification expanded");
    rows
}

fn token_alternatives(token: &Token) -> Option<Vec<Token>> {
    match token {
        Token::Field(field) => {
            field_alternatives(field).map(|fields| fields.into_iter().map(Token::Field).collect())
        }
        Token::AllOf(members) => Some(
            members
                .iter()
                .flat_map(|member| cartesian(std::slice::from_ref(member), token_alternatives))
                .flatten()
                .collect(),
        ),
        Token::Date { fields, shift } => fields_alternatives(fields).map(|rows| {
            rows.into_iter()
                .map(|fields| Token::Date {
                    fields,
                    shift: *shift,
                })
                .collect()
        }),
        Token::TimeOfDay { fields, shift } => fields_alternatives(fields).map(|rows| {
            rows.into_iter()
                .map(|fields| Token::TimeOfDay {
                    fields,
                    shift: *shift,
                })
                .collect()
        }),
        Token::DateTime { date, time, shift } => {
            let split = date.len();
            let fields: Vec<Field> = date.iter().chain(time).cloned().collect();
            fields_alternatives(&fields).map(|rows| {
                rows.into_iter()
                    .map(|mut date| {
                        let time = date.split_off(split);
                        Token::DateTime {
                            date,
                            time,
                            shift: *shift,
                        }
                    })
                    .collect()
            })
        }
        Token::Duration { direction, fields } => fields_alternatives(fields).map(|rows| {
            rows.into_iter()
                .map(|fields| Token::Duration {
                    direction: *direction,
                    fields,
                })
                .collect()
        }),
        Token::Group { count, elements } => value_alternatives(count).map(|counts| {
            counts
                .into_iter()
                .map(|count| Token::Group {
                    count,
                    elements: elements.clone(),
                })
                .collect()
        }),
        Token::Interval { .. } | Token::OneOf(_) | Token::Selection(_) => None,
    }
}

/// Rows of fields, or `None` when no field branches.
fn fields_alternatives(fields: &[Field]) -> Option<Vec<Vec<Field>>> {
    fields
        .iter()
        .any(|field| value_alternatives(&field.value).is_some())
        .then(|| cartesian(fields, field_alternatives))
}

fn field_alternatives(field: &Field) -> Option<Vec<Field>> {
    value_alternatives(&field.value).map(|values| {
        values
            .into_iter()
            .map(|value| Field::new(field.unit, value))
            .collect()
    })
}

fn value_alternatives(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::AllOf(members) => Some(
            members
                .iter()
                .flat_map(|member| -> Vec<Value> {
                    match member {
                        Member::Integer(n) => vec![Value::Integer(*n)],
                        Member::Range(range) if range.is_open() => {
                            vec![Value::AllOf(vec![Member::Range(*range)])]
                        }
                        Member::Range(range) => range.members().map(Value::Integer).collect(),
                    }
                })
                .collect(),
        ),
        Value::Mask(digits) if digits.iter().any(|d| matches!(d, Digit::AllOf(_))) => Some(
            cartesian(digits, |digit| match digit {
                Digit::AllOf(choices) => {
                    Some(choices.iter().map(|&d| Digit::Decimal(d)).collect())
                }
                _ => None,
            })
            .into_iter()
            .map(collapse_mask)
            .collect(),
        ),
        Value::Integer(_) | Value::Mask(_) | Value::OneOf(_) => None,
    }
}

/// A mask whose markers are all decimal becomes an integer.
fn collapse_mask(digits: Vec<Digit>) -> Value {
    digits
        .iter()
        .try_fold(0_i64, |acc, digit| match digit {
            Digit::Decimal(d) => acc.checked_mul(10)?.checked_add(i64::from(*d)),
            _ => None,
        })
        .map_or(Value::Mask(digits), Value::Integer)
}
