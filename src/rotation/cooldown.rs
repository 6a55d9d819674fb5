//! Cooldown signals.
//!
//! Per (person, role type): how long since the last occurrence, and
//! whether the recommended rest gap is still open. Cooldown is advisory:
//! it feeds ranking and UI warnings, it never blocks an assignment.

use chrono::NaiveDate;

use super::weights::record_weight;
use super::whole_weeks_between;
use crate::models::{ParticipationHistory, Person, RoleFunction, RoleType};

/// Recommended rest weeks after a substantial role.
const SUBSTANTIAL_GAP_WEEKS: i64 = 3;

/// Weeks a weighted principal role keeps a person out of the generic
/// fill pool.
const LOAD_BLOCK_WEEKS: i64 = 3;

/// Cooldown state of one person for one role type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownInfo {
    /// Inside the recommended gap.
    pub in_cooldown: bool,
    pub weeks_since_last: i64,
    pub last_role_type: RoleType,
    pub last_date: NaiveDate,
    /// Weeks until the recommended gap closes (0 when outside it).
    pub cooldown_remaining: i64,
}

/// Recommended minimum gap for a role type, in weeks.
///
/// Substantial teaching and conducting roles get the default gap;
/// negligible roles (songs, prayers, chair comments, counsel) get none
/// and are excluded from load scoring entirely.
pub fn recommended_gap_weeks(role_type: &RoleType) -> i64 {
    match role_type {
        RoleType::OpeningPrayer
        | RoleType::ClosingPrayer
        | RoleType::OpeningSong
        | RoleType::MiddleSong
        | RoleType::ClosingSong
        | RoleType::OpeningComments
        | RoleType::ClosingComments
        | RoleType::Counsel => 0,
        _ => SUBSTANTIAL_GAP_WEEKS,
    }
}

/// Cooldown state for a person and role type as of a date.
///
/// `None` when the person has never held the role type before `as_of`.
pub fn cooldown_info(
    person: &Person,
    role_type: &RoleType,
    history: &ParticipationHistory,
    as_of: NaiveDate,
) -> Option<CooldownInfo> {
    let last = history.last_in_role(person, role_type, as_of)?;
    let weeks_since_last = whole_weeks_between(last.date, as_of);
    let gap = recommended_gap_weeks(role_type);
    Some(CooldownInfo {
        in_cooldown: gap > 0 && weeks_since_last < gap,
        weeks_since_last,
        last_role_type: last.role_type.clone(),
        last_date: last.date,
        cooldown_remaining: (gap - weeks_since_last).max(0),
    })
}

/// Whether a person carried a weighted principal role too recently to be
/// picked up by the generic fill pass.
///
/// Unlike [`cooldown_info`], this looks across role types: any principal
/// participation with a non-zero load weight inside the block window
/// counts. Zero-weight roles (prayers, songs, comments) never block.
pub fn is_load_blocked(person: &Person, history: &ParticipationHistory, as_of: NaiveDate) -> bool {
    history
        .records_for(person)
        .filter(|r| {
            r.function == RoleFunction::Principal && r.date < as_of && record_weight(r) > 0
        })
        .map(|r| whole_weeks_between(r.date, as_of))
        .min()
        .map(|weeks| weeks < LOAD_BLOCK_WEEKS)
        .unwrap_or(false)
}
