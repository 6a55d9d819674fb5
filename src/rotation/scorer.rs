//! Rotation priority scoring.
//!
//! One fairness score per (person, role type): the longer since the last
//! occurrence and the lighter the recent load, the higher the score.
//! Higher score = more deserving of the next slot.
//!
//! Deterministic by construction: the only time input is the supplied
//! `as_of` date: identical history and date always reproduce the same
//! score, across runs and process restarts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::weights::record_weight;
use super::whole_weeks_between;
use crate::models::{ParticipationHistory, Person, RoleType};

/// Points per week of waiting.
const WEEKS_FACTOR: i64 = 50;

/// Points subtracted per unit of recent load.
const LOAD_FACTOR: i64 = 5;

/// Load look-back window in weeks.
const LOAD_WINDOW_WEEKS: i64 = 52;

/// Sentinel weeks-since value for a person who never held the role type:
/// maximally overdue, above any real waiting time.
pub const NEVER_HELD_WEEKS: i64 = 1000;

/// Inputs that produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Whole weeks since the last occurrence of the role type
    /// ([`NEVER_HELD_WEEKS`] when never held).
    pub weeks_since_last: i64,
    /// Summed load weights over the last twelve months.
    pub cumulative_weight: i64,
    /// Date of the last occurrence, when any.
    pub last_date: Option<NaiveDate>,
}

/// A fairness score with its breakdown. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationScore {
    pub score: i64,
    pub breakdown: ScoreBreakdown,
}

/// Scores a person for a role type as of a date.
///
/// `score = weeks_since_last * 50 − cumulative_weight_12mo * 5`.
/// Weeks-since counts any occurrence of the same role type; cumulative
/// weight counts every weighted participation in the window (helper
/// records at helper weight).
pub fn score(
    person: &Person,
    history: &ParticipationHistory,
    role_type: &RoleType,
    as_of: NaiveDate,
) -> RotationScore {
    let last = history.last_in_role(person, role_type, as_of);
    let weeks_since_last = last
        .map(|r| whole_weeks_between(r.date, as_of))
        .unwrap_or(NEVER_HELD_WEEKS);
    compose(person, history, weeks_since_last, last.map(|r| r.date), as_of)
}

/// Role-type-agnostic score used by queue rebalancing.
///
/// Weeks-since counts the last principal occurrence of any role type.
pub fn generic_score(
    person: &Person,
    history: &ParticipationHistory,
    as_of: NaiveDate,
) -> RotationScore {
    let last = history.last_principal(person, as_of);
    let weeks_since_last = last
        .map(|r| whole_weeks_between(r.date, as_of))
        .unwrap_or(NEVER_HELD_WEEKS);
    compose(person, history, weeks_since_last, last.map(|r| r.date), as_of)
}

fn compose(
    person: &Person,
    history: &ParticipationHistory,
    weeks_since_last: i64,
    last_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> RotationScore {
    let window_start = as_of - chrono::Duration::weeks(LOAD_WINDOW_WEEKS);
    let cumulative_weight: i64 = history
        .records_in_window(person, window_start, as_of)
        .map(record_weight)
        .sum();

    RotationScore {
        score: weeks_since_last * WEEKS_FACTOR - cumulative_weight * LOAD_FACTOR,
        breakdown: ScoreBreakdown {
            weeks_since_last,
            cumulative_weight,
            last_date,
        },
    }
}
