//! Fairness scoring and cooldown signals.
//!
//! Converts the participation history into per-person fairness signals:
//! how long since the last occurrence of a role, how much load a person
//! carried recently, and whether a recommended rest gap is still open.
//!
//! Everything here is advisory input to ranking; the only hard
//! constraint in the engine (same-week exclusion) lives in the generator.

mod cooldown;
mod explain;
mod scorer;
pub mod weights;

pub use cooldown::{cooldown_info, is_load_blocked, recommended_gap_weeks, CooldownInfo};
pub use explain::{explain, explain_for};
pub use scorer::{generic_score, score, RotationScore, ScoreBreakdown, NEVER_HELD_WEEKS};

use chrono::NaiveDate;

/// Whole weeks elapsed between two dates (floor of days / 7).
pub fn whole_weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().div_euclid(7)
}
