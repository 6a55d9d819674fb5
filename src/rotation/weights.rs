//! Participation load weights.
//!
//! Heavier and longer roles weigh more when summing a person's recent
//! load. Prayers, songs, chair comments, and counsel weigh zero and are
//! excluded from load scoring entirely.

use crate::models::{ParticipationRecord, RoleFunction, RoleType};

/// Weight of any helper participation, regardless of role type.
pub const HELPER_WEIGHT: i64 = 2;

/// Weight used when a custom role type has no duration to go by.
pub const DEFAULT_WEIGHT: i64 = 5;

/// Load weight of one participation by role type and function.
pub fn participation_weight(role_type: &RoleType, function: RoleFunction) -> i64 {
    if function == RoleFunction::Helper {
        return HELPER_WEIGHT;
    }
    match role_type {
        RoleType::StudyConductor => 15,
        RoleType::TreasuresTalk
        | RoleType::SpiritualGems
        | RoleType::LivingTalk
        | RoleType::LocalNeeds => 10,
        RoleType::Chairman => 8,
        RoleType::StartingConversation
        | RoleType::FollowingUp
        | RoleType::MakingDisciples
        | RoleType::ExplainingBeliefs
        | RoleType::StudentTalk => 5,
        RoleType::BibleReading | RoleType::StudyReader => 3,
        RoleType::OpeningComments
        | RoleType::ClosingComments
        | RoleType::OpeningPrayer
        | RoleType::ClosingPrayer
        | RoleType::Counsel
        | RoleType::OpeningSong
        | RoleType::MiddleSong
        | RoleType::ClosingSong => 0,
        RoleType::Custom(_) => DEFAULT_WEIGHT,
    }
}

/// Duration-based fallback for roles outside the known taxonomy.
pub fn weight_from_duration(minutes: u32) -> i64 {
    match minutes {
        25.. => 15,
        10..=24 => 10,
        5..=9 => 5,
        3..=4 => 3,
        _ => 0,
    }
}

/// Load weight of a history record.
///
/// Known role types use the static table; custom types fall back to the
/// recorded duration when present.
pub fn record_weight(record: &ParticipationRecord) -> i64 {
    if record.function == RoleFunction::Helper {
        return HELPER_WEIGHT;
    }
    match &record.role_type {
        RoleType::Custom(_) => record
            .duration_minutes
            .map(weight_from_duration)
            .unwrap_or(DEFAULT_WEIGHT),
        known => participation_weight(known, RoleFunction::Principal),
    }
}
