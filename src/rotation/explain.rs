//! Score explanations.
//!
//! Renders a score breakdown as a short sentence for audit trails and
//! assignment review. Formatting only; nothing here feeds back into
//! ranking decisions.

use chrono::NaiveDate;

use super::scorer::{score, RotationScore, NEVER_HELD_WEEKS};
use crate::models::{ParticipationHistory, Person, RoleType};

/// Formats a score breakdown into a one-line justification.
///
/// `occurrences` is the number of past occurrences of the role type at
/// the time the score was computed, so a past-week review never leaks
/// later history into its explanation.
pub fn explain(
    person_name: &str,
    role_type: &RoleType,
    score: &RotationScore,
    occurrences: usize,
) -> String {
    if score.breakdown.weeks_since_last >= NEVER_HELD_WEEKS {
        return format!(
            "{person_name} has never held {role_type}; recent load {}",
            score.breakdown.cumulative_weight
        );
    }

    let when = match score.breakdown.weeks_since_last {
        0 => "this week".to_string(),
        1 => "1 week ago".to_string(),
        n => format!("{n} weeks ago"),
    };
    let times = if occurrences == 1 { "occurrence" } else { "occurrences" };
    format!(
        "{person_name} held {role_type} {when}; {occurrences} {times} on record, recent load {}",
        score.breakdown.cumulative_weight
    )
}

/// Scores and explains in one step, relative to `as_of`.
pub fn explain_for(
    person: &Person,
    role_type: &RoleType,
    history: &ParticipationHistory,
    as_of: NaiveDate,
) -> String {
    let s = score(person, history, role_type, as_of);
    let occurrences = history.occurrence_count(person, role_type, as_of);
    explain(&person.name, role_type, &s, occurrences)
}
