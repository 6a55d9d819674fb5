//! Candidate ranking.
//!
//! Produces a total order over candidates for one slot by composing
//! three tiers, in this exact precedence:
//!
//! 1. eligibility: ineligible candidates always sort last;
//! 2. role-specific class order among eligible candidates;
//! 3. fairness score, with a collation-insensitive alphabetical tie-break.
//!
//! The tier order is load-bearing. Demonstration roles must prefer a
//! sister over a far more overdue elder; that is a rule, not a tie-break.

use chrono::NaiveDate;

use crate::eligibility::{evaluate, EligibilityContext};
use crate::models::{
    collation_key, Gender, Modality, ParticipationHistory, Person, Rank, RoleSlot,
};
use crate::rotation::{score, RotationScore};

/// Which class ordering a role imposes among eligible candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassPolicy {
    /// Sister > ordinary brother > ministerial servant > elder.
    Demonstration,
    /// Ordinary brother > ministerial servant > elder.
    StudyReading,
    /// No class tiers; pure score ordering.
    ScoreOnly,
}

impl ClassPolicy {
    /// Policy for a slot's role type.
    pub fn for_slot(slot: &RoleSlot) -> Self {
        match slot.modality() {
            Some(Modality::Demonstration) => ClassPolicy::Demonstration,
            Some(Modality::StudyReading) => ClassPolicy::StudyReading,
            // Unknown role types rank like demonstrations, mirroring the
            // generator's degradation for custom types.
            None => ClassPolicy::Demonstration,
            _ => ClassPolicy::ScoreOnly,
        }
    }

    /// Position of a person in this policy's class order (lower = first).
    pub fn class_rank(self, person: &Person) -> u8 {
        match self {
            ClassPolicy::Demonstration => match (person.gender, person.rank) {
                (Gender::Sister, _) => 0,
                (Gender::Brother, Rank::Publisher) => 1,
                (Gender::Brother, Rank::MinisterialServant) => 2,
                (Gender::Brother, Rank::Elder) => 3,
            },
            ClassPolicy::StudyReading => match person.rank {
                Rank::Publisher => 0,
                Rank::MinisterialServant => 1,
                Rank::Elder => 2,
            },
            ClassPolicy::ScoreOnly => 0,
        }
    }
}

/// One candidate's position in the ranking.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub person_id: String,
    pub person_name: String,
    pub eligible: bool,
    /// Why the candidate is ineligible, when they are.
    pub reason: Option<String>,
    pub score: RotationScore,
    /// Class position under the slot's policy.
    pub class_rank: u8,
}

/// Ranks candidates for one slot.
///
/// Eligibility and scoring are both evaluated here so callers hold one
/// ordered list with the full verdict per candidate.
pub fn rank(
    candidates: &[&Person],
    slot: &RoleSlot,
    history: &ParticipationHistory,
    ctx: &EligibilityContext,
    as_of: NaiveDate,
) -> Vec<RankedCandidate> {
    let modality = slot.modality().unwrap_or(Modality::Demonstration);
    let policy = ClassPolicy::for_slot(slot);

    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|person| {
            let outcome = evaluate(person, modality, slot.function, ctx);
            RankedCandidate {
                person_id: person.id.clone(),
                person_name: person.name.clone(),
                eligible: outcome.eligible,
                reason: outcome.reason,
                score: score(person, history, &slot.role_type, as_of),
                class_rank: policy.class_rank(person),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.eligible
            .cmp(&a.eligible)
            .then_with(|| a.class_rank.cmp(&b.class_rank))
            .then_with(|| b.score.score.cmp(&a.score.score))
            .then_with(|| collation_key(&a.person_name).cmp(&collation_key(&b.person_name)))
    });
    ranked
}
