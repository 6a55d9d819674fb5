//! Grouped rotation queues.
//!
//! One persisted round-robin queue per role group, periodically
//! resynchronized against fairness scores. Rebalancing is a maintenance
//! action, not part of the per-slot hot path: it rewrites every queue
//! wholesale and resets every cursor, because once the order changes the
//! old cursor position is meaningless. Deliberately linear: it runs
//! rarely, and correctness beats cleverness here.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{collation_key, Gender, ParticipationHistory, Person, Rank};
use crate::rotation::generic_score;
use crate::store::{QueueStore, StoreError};

/// Fixed role groups, each with its own queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationGroup {
    Presiding,
    Teaching,
    Student,
    HelperBrothers,
    HelperSisters,
    ClosingPrayer,
}

impl RotationGroup {
    /// All groups, in rebalance order.
    pub const ALL: [RotationGroup; 6] = [
        RotationGroup::Presiding,
        RotationGroup::Teaching,
        RotationGroup::Student,
        RotationGroup::HelperBrothers,
        RotationGroup::HelperSisters,
        RotationGroup::ClosingPrayer,
    ];
}

/// An ordered queue of person ids with a round-robin cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationQueue {
    pub members: Vec<String>,
    pub cursor: usize,
}

/// All persisted queues keyed by group.
pub type QueueMap = HashMap<RotationGroup, RotationQueue>;

/// Members of a role group.
///
/// The baseline (serving, not disqualified, not opted out) applies to
/// every group before the group predicate.
pub fn group_members<'a>(persons: &'a [Person], group: RotationGroup) -> Vec<&'a Person> {
    persons
        .iter()
        .filter(|p| p.active && !p.disqualified && !p.opted_out)
        .filter(|p| match group {
            RotationGroup::Presiding => {
                p.rank == Rank::Elder
                    || (p.rank == Rank::MinisterialServant && p.capabilities.can_preside)
            }
            RotationGroup::Teaching => {
                matches!(p.rank, Rank::Elder | Rank::MinisterialServant)
            }
            RotationGroup::Student => true,
            RotationGroup::HelperBrothers => p.gender == Gender::Brother,
            RotationGroup::HelperSisters => p.gender == Gender::Sister,
            RotationGroup::ClosingPrayer => {
                p.gender == Gender::Brother && p.baptized && p.capabilities.can_pray
            }
        })
        .collect()
}

/// Rewrites every queue from current fairness scores.
///
/// Members are ordered by the generic (role-type-agnostic) score,
/// highest first, so the queue head is always the most overdue member.
/// Cursors reset to the head: the previous position referred to an
/// order that no longer exists.
pub fn rebalance(
    persons: &[Person],
    history: &ParticipationHistory,
    as_of: NaiveDate,
    store: &mut dyn QueueStore,
) -> Result<(), StoreError> {
    let mut queues = QueueMap::new();

    for group in RotationGroup::ALL {
        let mut scored: Vec<(&Person, i64)> = group_members(persons, group)
            .into_iter()
            .map(|p| (p, generic_score(p, history, as_of).score))
            .collect();
        scored.sort_by(|(a, sa), (b, sb)| {
            sb.cmp(sa)
                .then_with(|| collation_key(&a.name).cmp(&collation_key(&b.name)))
        });

        debug!(
            group = ?group,
            members = scored.len(),
            head = scored.first().map(|(p, _)| p.name.as_str()).unwrap_or("-"),
            "queue rebalanced"
        );

        queues.insert(
            group,
            RotationQueue {
                members: scored.into_iter().map(|(p, _)| p.id.clone()).collect(),
                cursor: 0,
            },
        );
    }

    store.save_queues(&queues)
}

/// Consumes the next person id from a group's queue, advancing the
/// cursor (wrapping). `None` when the queue is empty or absent.
pub fn next_candidate(
    group: RotationGroup,
    store: &mut dyn QueueStore,
) -> Result<Option<String>, StoreError> {
    let mut queues = store.load_queues()?;
    let Some(queue) = queues.get_mut(&group) else {
        return Ok(None);
    };
    if queue.members.is_empty() {
        return Ok(None);
    }

    let at = queue.cursor % queue.members.len();
    let id = queue.members[at].clone();
    queue.cursor = (at + 1) % queue.members.len();
    store.save_queues(&queues)?;
    Ok(Some(id))
}
