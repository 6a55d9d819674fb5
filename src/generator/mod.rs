//! Weekly assignment generation.
//!
//! # Algorithm
//!
//! One generation run walks a fixed phase order over the filtered slots:
//!
//! 1. **Chairs**: chronologically across all weeks; the chosen chair is
//!    remembered per week.
//! 2. **Teaching roles**: per week; study readers fall back through
//!    rank classes.
//! 3. **Student roles**: per week; demonstrations fall back through
//!    class pools starting with sisters.
//! 4. **Remaining roles**: helpers (gender-bound to their principal),
//!    prayers, local needs, and everything else.
//! 5. **Commit**: per-slot writes, unless dry-run.
//!
//! Every successful pick is added to its week's exclusion set and to a
//! working copy of the history, so later slots in the run see earlier
//! picks. Each slot is scored as of its own date, which keeps the run
//! deterministic and lets picks in earlier weeks lower a person's
//! priority for later weeks.
//!
//! # Failure semantics
//!
//! A slot with no eligible candidate stays unassigned and is counted,
//! not errored. A failed commit becomes a warning; the batch continues.
//! Only an empty snapshot is fatal.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::eligibility::{evaluate, EligibilityContext};
use crate::models::{
    Gender, Modality, ParticipationHistory, ParticipationRecord, Person, Rank, RoleFunction,
    RoleSlot, RoleType, SlotStatus,
};
use crate::ranking::{rank, RankedCandidate};
use crate::rotation::is_load_blocked;
use crate::rotation::weights::participation_weight;
use crate::store::{LocalNeedsEntry, LocalNeedsSource, ProposalSink};

/// Teaching role types handled by phase 2, in processing order.
const TEACHING_ORDER: [RoleType; 4] = [
    RoleType::TreasuresTalk,
    RoleType::SpiritualGems,
    RoleType::StudyConductor,
    RoleType::StudyReader,
];

/// Configuration for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Compute picks but write nothing.
    pub dry_run: bool,
    /// Restrict generation to these week ids. When absent, only
    /// unassigned or nameless slots are considered.
    pub target_weeks: Option<Vec<String>>,
    /// Reference date: slots before it are out of scope. Supplied by the
    /// caller; the core never reads the clock.
    pub as_of: NaiveDate,
    /// Weekday the congregation meets on.
    pub meeting_weekday: Weekday,
}

impl GenerationConfig {
    /// Live run as of a date, meeting on Thursday.
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            dry_run: false,
            target_weeks: None,
            as_of,
            meeting_weekday: Weekday::Thu,
        }
    }

    /// Switches to dry-run.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Restricts generation to specific weeks.
    pub fn with_target_weeks(mut self, weeks: Vec<String>) -> Self {
        self.target_weeks = Some(weeks);
        self
    }

    /// Sets the meeting weekday.
    pub fn with_meeting_weekday(mut self, weekday: Weekday) -> Self {
        self.meeting_weekday = weekday;
        self
    }
}

/// Outcome of one generation run.
///
/// Always reports what succeeded, what was skipped, and why, never an
/// all-or-nothing verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Picks committed (live run) or computed (dry run).
    pub parts_generated: usize,
    /// Slots attempted but left without a candidate.
    pub unassigned_slots: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub dry_run: bool,
    /// Weeks touched by a live run.
    pub generated_weeks: Option<Vec<String>>,
}

impl GenerationResult {
    fn fatal(message: impl Into<String>, dry_run: bool) -> Self {
        Self {
            success: false,
            parts_generated: 0,
            unassigned_slots: 0,
            warnings: Vec::new(),
            errors: vec![message.into()],
            dry_run,
            generated_weeks: None,
        }
    }
}

/// One pick held in memory until the commit phase.
#[derive(Debug, Clone)]
struct Pick {
    person_id: String,
    person_name: String,
    /// Local-needs entry consumed by this pick, if any.
    local_needs_entry: Option<String>,
}

/// Mutable state threaded through the phases of one run.
struct RunState {
    /// History snapshot plus in-run picks, so later slots see earlier ones.
    working: ParticipationHistory,
    /// slot id → pick, in deterministic order for the commit phase.
    picks: BTreeMap<String, Pick>,
    /// week id → person ids already holding a role that week.
    excluded: BTreeMap<String, HashSet<String>>,
    /// week id → (person id, name) of the chosen chair.
    chairs: BTreeMap<String, (String, String)>,
    used_entries: HashSet<String>,
    warnings: Vec<String>,
}

impl RunState {
    /// Registers a pick: remembers it for commit, optionally adds it to
    /// the week's exclusion set, and feeds the working history.
    fn record_pick(
        &mut self,
        slot: &RoleSlot,
        person_id: String,
        person_name: String,
        local_needs_entry: Option<String>,
        exclude_in_week: bool,
    ) {
        if exclude_in_week {
            self.excluded
                .entry(slot.week_id.clone())
                .or_default()
                .insert(person_id.clone());
        }
        self.working.push(ParticipationRecord {
            person_id: Some(person_id.clone()),
            person_name: person_name.clone(),
            role_type: slot.role_type.clone(),
            modality: slot.modality(),
            function: slot.function,
            date: slot.date,
            duration_minutes: slot.duration_minutes,
        });
        self.picks.insert(
            slot.id.clone(),
            Pick {
                person_id,
                person_name,
                local_needs_entry,
            },
        );
    }

    fn week_excluded(&mut self, week_id: &str) -> &HashSet<String> {
        self.excluded.entry(week_id.to_string()).or_default()
    }
}

/// The orchestrator: applies ranking under same-week exclusion across
/// the phase order and commits the resulting proposals.
pub struct WeeklyAssignmentGenerator<'a> {
    proposals: &'a mut dyn ProposalSink,
    local_needs: &'a mut dyn LocalNeedsSource,
}

impl<'a> WeeklyAssignmentGenerator<'a> {
    pub fn new(
        proposals: &'a mut dyn ProposalSink,
        local_needs: &'a mut dyn LocalNeedsSource,
    ) -> Self {
        Self {
            proposals,
            local_needs,
        }
    }

    /// Generates assignment proposals for the given snapshot.
    pub fn generate(
        &mut self,
        slots: &[RoleSlot],
        persons: &[Person],
        history: &ParticipationHistory,
        config: &GenerationConfig,
    ) -> GenerationResult {
        if persons.is_empty() {
            return GenerationResult::fatal("roster snapshot is empty", config.dry_run);
        }

        // Collect inputs: future, open, assignable slots.
        let candidates: Vec<&RoleSlot> = slots
            .iter()
            .filter(|s| s.date >= config.as_of)
            .filter(|s| !s.status.is_terminal())
            .filter(|s| s.modality() != Some(Modality::Song))
            .filter(|s| match &config.target_weeks {
                Some(weeks) => weeks.contains(&s.week_id),
                None => s.status == SlotStatus::Unassigned || s.assigned.is_none(),
            })
            .collect();

        if candidates.is_empty() {
            return GenerationResult::fatal("no slots need assignment", config.dry_run);
        }

        let mut state = RunState {
            working: history.clone(),
            picks: BTreeMap::new(),
            excluded: BTreeMap::new(),
            chairs: BTreeMap::new(),
            used_entries: HashSet::new(),
            warnings: Vec::new(),
        };

        for slot in &candidates {
            if slot.function == RoleFunction::Principal
                && participation_weight(&slot.role_type, RoleFunction::Principal) > 0
                && slot.duration_minutes.unwrap_or(0) == 0
            {
                state.warnings.push(format!(
                    "slot {} ({}, week {}) has no duration",
                    slot.id, slot.role_type, slot.week_id
                ));
            }
        }

        let mut by_week: BTreeMap<String, Vec<&RoleSlot>> = BTreeMap::new();
        for slot in &candidates {
            by_week.entry(slot.week_id.clone()).or_default().push(slot);
        }
        for week_slots in by_week.values_mut() {
            week_slots.sort_by(|a, b| a.date.cmp(&b.date).then(a.sequence.cmp(&b.sequence)));
        }

        // Pairing resolution and exclusion seeding must see the whole
        // week, including slots already assigned and therefore filtered
        // from `candidates`.
        let mut all_by_week: BTreeMap<&str, Vec<&RoleSlot>> = BTreeMap::new();
        for slot in slots {
            all_by_week.entry(&slot.week_id).or_default().push(slot);
        }

        // People already holding a slot in a generated week are excluded
        // from further picks in that week.
        let candidate_ids: HashSet<&str> = candidates.iter().map(|s| s.id.as_str()).collect();
        for slot in slots {
            if candidate_ids.contains(slot.id.as_str())
                || !by_week.contains_key(&slot.week_id)
                || matches!(slot.status, SlotStatus::Rejected | SlotStatus::Cancelled)
            {
                continue;
            }
            if let Some(assigned) = &slot.assigned {
                let person_id = persons
                    .iter()
                    .find(|p| p.id == assigned.id || p.matches_name(&assigned.name))
                    .map(|p| p.id.clone())
                    .unwrap_or_else(|| assigned.id.clone());
                state
                    .excluded
                    .entry(slot.week_id.clone())
                    .or_default()
                    .insert(person_id);
            }
        }

        let pending_needs = match self.local_needs.pending_queue() {
            Ok(entries) => entries,
            Err(e) => {
                state
                    .warnings
                    .push(format!("failed to load local-needs queue: {e}"));
                Vec::new()
            }
        };

        phase_chairs(&candidates, persons, config, &mut state);
        phase_teaching(&by_week, persons, config, &mut state);
        phase_students(&by_week, persons, config, &mut state);
        phase_remaining(
            &by_week,
            &all_by_week,
            persons,
            config,
            &pending_needs,
            &mut state,
        );

        let unassigned_slots = candidates.len() - state.picks.len();

        if config.dry_run {
            return GenerationResult {
                success: true,
                parts_generated: state.picks.len(),
                unassigned_slots,
                warnings: state.warnings,
                errors: Vec::new(),
                dry_run: true,
                generated_weeks: None,
            };
        }

        // Commit: each slot is its own failure domain.
        let mut saved = 0;
        for (slot_id, pick) in &state.picks {
            if let Some(entry_id) = &pick.local_needs_entry {
                if let Err(e) = self.local_needs.consume_entry(entry_id, slot_id) {
                    warn!(slot = %slot_id, error = %e, "local-needs entry not consumed");
                    state.warnings.push(format!(
                        "failed to consume local-needs entry {entry_id}: {e}"
                    ));
                }
            }
            match self.proposals.commit_proposal(slot_id, &pick.person_name) {
                Ok(()) => saved += 1,
                Err(e) => {
                    warn!(slot = %slot_id, error = %e, "proposal not committed");
                    state
                        .warnings
                        .push(format!("failed to commit slot {slot_id}: {e}"));
                }
            }
        }

        GenerationResult {
            success: true,
            parts_generated: saved,
            unassigned_slots,
            warnings: state.warnings,
            errors: Vec::new(),
            dry_run: false,
            generated_weeks: Some(by_week.keys().cloned().collect()),
        }
    }
}

/// Phase 1: chairs, chronologically across all weeks.
fn phase_chairs(
    candidates: &[&RoleSlot],
    persons: &[Person],
    config: &GenerationConfig,
    state: &mut RunState,
) {
    let mut chair_slots: Vec<&RoleSlot> = candidates
        .iter()
        .copied()
        .filter(|s| s.role_type == RoleType::Chairman && s.function == RoleFunction::Principal)
        .collect();
    chair_slots.sort_by(|a, b| a.date.cmp(&b.date).then(a.sequence.cmp(&b.sequence)));
    debug!(slots = chair_slots.len(), "phase: chairs");

    for slot in chair_slots {
        if let Some((id, name)) = single_pick(slot, persons, config, state, None) {
            state
                .chairs
                .entry(slot.week_id.clone())
                .or_insert_with(|| (id.clone(), name.clone()));
            state.record_pick(slot, id, name, None, true);
        }
    }
}

/// Phase 2: teaching roles, per week in fixed role order.
fn phase_teaching(
    by_week: &BTreeMap<String, Vec<&RoleSlot>>,
    persons: &[Person],
    config: &GenerationConfig,
    state: &mut RunState,
) {
    debug!("phase: teaching roles");
    let publishers_only = |p: &Person| p.rank == Rank::Publisher;
    let up_to_servants = |p: &Person| matches!(p.rank, Rank::Publisher | Rank::MinisterialServant);
    let everyone = |_: &Person| true;
    let reader_stages: [&dyn Fn(&Person) -> bool; 3] =
        [&publishers_only, &up_to_servants, &everyone];

    for week_slots in by_week.values() {
        for role in &TEACHING_ORDER {
            let open: Vec<&RoleSlot> = week_slots
                .iter()
                .copied()
                .filter(|s| {
                    &s.role_type == role
                        && s.function == RoleFunction::Principal
                        && !state.picks.contains_key(&s.id)
                })
                .collect();

            for slot in open {
                let pick = if *role == RoleType::StudyReader {
                    // Ordinary brothers first, then servants, then elders.
                    staged_pick(slot, persons, config, state, &reader_stages, None)
                } else {
                    single_pick(slot, persons, config, state, None)
                };

                if let Some((id, name)) = pick {
                    state.record_pick(slot, id, name, None, true);
                }
            }
        }
    }
}

/// Phase 3: student roles, per week.
fn phase_students(
    by_week: &BTreeMap<String, Vec<&RoleSlot>>,
    persons: &[Person],
    config: &GenerationConfig,
    state: &mut RunState,
) {
    debug!("phase: student roles");
    let sisters = |p: &Person| p.gender == Gender::Sister;
    let with_publishers = |p: &Person| p.gender == Gender::Sister || p.rank == Rank::Publisher;
    let with_servants = |p: &Person| p.gender == Gender::Sister || p.rank != Rank::Elder;
    let everyone = |_: &Person| true;
    let demo_stages: [&dyn Fn(&Person) -> bool; 4] =
        [&sisters, &with_publishers, &with_servants, &everyone];

    for week_slots in by_week.values() {
        let open: Vec<&RoleSlot> = week_slots
            .iter()
            .copied()
            .filter(|s| {
                s.function == RoleFunction::Principal
                    && !state.picks.contains_key(&s.id)
                    && matches!(
                        s.modality(),
                        Some(
                            Modality::StudentReading
                                | Modality::Demonstration
                                | Modality::StudentTalk
                        )
                    )
            })
            .collect();

        for slot in open {
            let pick = if slot.modality() == Some(Modality::Demonstration) {
                // Sisters first, then brothers by ascending rank.
                staged_pick(slot, persons, config, state, &demo_stages, None)
            } else {
                single_pick(slot, persons, config, state, None)
            };

            if let Some((id, name)) = pick {
                state.record_pick(slot, id, name, None, true);
            }
        }
    }
}

/// Phase 4: helpers, prayers, local needs, and everything left.
fn phase_remaining(
    by_week: &BTreeMap<String, Vec<&RoleSlot>>,
    all_by_week: &BTreeMap<&str, Vec<&RoleSlot>>,
    persons: &[Person],
    config: &GenerationConfig,
    pending_needs: &[LocalNeedsEntry],
    state: &mut RunState,
) {
    debug!("phase: remaining roles");
    for (week_id, week_slots) in by_week {
        let remaining: Vec<&RoleSlot> = week_slots
            .iter()
            .copied()
            .filter(|s| !state.picks.contains_key(&s.id))
            .collect();

        for slot in remaining {
            if slot.modality().is_none() {
                warn!(slot = %slot.id, role = %slot.role_type, "unknown role type, treated as demonstration");
                state.warnings.push(format!(
                    "unknown role type '{}' on slot {} treated as demonstration",
                    slot.role_type, slot.id
                ));
            }

            // Opening prayer follows the week's chair when one is known.
            if slot.role_type == RoleType::OpeningPrayer && slot.function == RoleFunction::Principal
            {
                if let Some((id, name)) = state.chairs.get(week_id).cloned() {
                    state.record_pick(slot, id, name, None, false);
                } else if let Some((id, name)) = single_pick(slot, persons, config, state, None) {
                    state.record_pick(slot, id, name, None, true);
                }
                continue;
            }

            // Local needs draws from the pre-assignment queue, not from
            // the ranking pipeline.
            if slot.role_type == RoleType::LocalNeeds && slot.function == RoleFunction::Principal {
                let entry = pending_needs
                    .iter()
                    .find(|e| {
                        e.target_week.as_deref() == Some(week_id.as_str())
                            && !state.used_entries.contains(&e.id)
                    })
                    .or_else(|| {
                        pending_needs.iter().find(|e| {
                            e.target_week.is_none() && !state.used_entries.contains(&e.id)
                        })
                    });

                if let Some(entry) = entry {
                    state.used_entries.insert(entry.id.clone());
                    let person_id = persons
                        .iter()
                        .find(|p| p.matches_name(&entry.assignee_name))
                        .map(|p| p.id.clone())
                        .unwrap_or_else(|| "preassigned".to_string());
                    state.record_pick(
                        slot,
                        person_id,
                        entry.assignee_name.clone(),
                        Some(entry.id.clone()),
                        true,
                    );
                }
                continue;
            }

            // Closing prayer ranks by plain score with no same-week
            // exclusion, since the presider often also prays. Deliberate
            // asymmetry; see DESIGN.md.
            if slot.role_type == RoleType::ClosingPrayer && slot.function == RoleFunction::Principal
            {
                let ctx = context_for(slot, config);
                let pool: Vec<&Person> = persons.iter().collect();
                let ranked = rank(&pool, slot, &state.working, &ctx, slot.date);
                if let Some(candidate) = ranked.iter().find(|c| c.eligible) {
                    let (id, name) = (candidate.person_id.clone(), candidate.person_name.clone());
                    state.record_pick(slot, id, name, None, false);
                }
                continue;
            }

            // Helpers are gender-bound to their principal.
            if slot.function == RoleFunction::Helper {
                let week = all_by_week
                    .get(week_id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let genders = match resolve_principal_gender(slot, week, state, persons) {
                    Some(gender) => [gender, opposite(gender)],
                    // Unknown principal: try sisters, then brothers.
                    None => [Gender::Sister, Gender::Brother],
                };

                let is_brother = |p: &Person| p.gender == Gender::Brother;
                let is_sister = |p: &Person| p.gender == Gender::Sister;
                let mut pick = None;
                for gender in genders {
                    let stage: &dyn Fn(&Person) -> bool = match gender {
                        Gender::Brother => &is_brother,
                        Gender::Sister => &is_sister,
                    };
                    pick = staged_pick(slot, persons, config, state, &[stage], Some(gender));
                    if pick.is_some() {
                        break;
                    }
                }

                if let Some((id, name)) = pick {
                    state.record_pick(slot, id, name, None, true);
                }
                continue;
            }

            // Generic fill: eligible, unexcluded, not load-blocked; first
            // match in roster order.
            let ctx = context_for(slot, config);
            let modality = slot.modality().unwrap_or(Modality::Demonstration);
            let week_excluded = state.excluded.get(week_id).cloned().unwrap_or_default();
            let working = &state.working;
            let pick = persons
                .iter()
                .find(|p| {
                    !week_excluded.contains(&p.id)
                        && !is_load_blocked(p, working, slot.date)
                        && evaluate(p, modality, slot.function, &ctx).eligible
                })
                .map(|p| (p.id.clone(), p.name.clone()));
            if let Some((id, name)) = pick {
                state.record_pick(slot, id, name, None, true);
            }
        }
    }
}

/// Gender opposite, for the helper fallback chain.
fn opposite(gender: Gender) -> Gender {
    match gender {
        Gender::Brother => Gender::Sister,
        Gender::Sister => Gender::Brother,
    }
}

/// Eligibility context for a slot under a config.
fn context_for(slot: &RoleSlot, config: &GenerationConfig) -> EligibilityContext {
    let mut ctx = EligibilityContext::for_date(slot.date)
        .with_section(slot.section)
        .with_meeting_weekday(config.meeting_weekday);
    if slot.role_type == RoleType::OpeningPrayer {
        ctx = ctx.opening_flavored();
    }
    ctx
}

/// First ranked candidate that is eligible and not excluded this week.
fn first_available<'r>(
    ranked: &'r [RankedCandidate],
    week_excluded: &HashSet<String>,
) -> Option<&'r RankedCandidate> {
    ranked
        .iter()
        .find(|c| c.eligible && !week_excluded.contains(&c.person_id))
}

/// Ranks the full roster for a slot and takes the first available pick.
fn single_pick(
    slot: &RoleSlot,
    persons: &[Person],
    config: &GenerationConfig,
    state: &mut RunState,
    principal_gender: Option<Gender>,
) -> Option<(String, String)> {
    let everyone = |_: &Person| true;
    let stages: [&dyn Fn(&Person) -> bool; 1] = [&everyone];
    staged_pick(slot, persons, config, state, &stages, principal_gender)
}

/// Retries ranking against progressively broader pools until one yields
/// an available pick.
fn staged_pick(
    slot: &RoleSlot,
    persons: &[Person],
    config: &GenerationConfig,
    state: &mut RunState,
    stages: &[&dyn Fn(&Person) -> bool],
    principal_gender: Option<Gender>,
) -> Option<(String, String)> {
    let mut ctx = context_for(slot, config);
    if let Some(gender) = principal_gender {
        ctx = ctx.with_principal_gender(gender);
    }

    for stage in stages {
        let pool: Vec<&Person> = persons.iter().filter(|p| stage(p)).collect();
        if pool.is_empty() {
            continue;
        }
        let ranked = rank(&pool, slot, &state.working, &ctx, slot.date);
        let week_excluded = state.week_excluded(&slot.week_id);
        if let Some(candidate) = first_available(&ranked, week_excluded) {
            return Some((candidate.person_id.clone(), candidate.person_name.clone()));
        }
    }
    None
}

/// Finds the paired principal's gender for a helper slot.
///
/// Canonical rule: same `pairing_key` wins; without one, same week +
/// same sequence. The principal may have been picked this run or may
/// already be assigned on the stored slot.
fn resolve_principal_gender(
    helper: &RoleSlot,
    week_slots: &[&RoleSlot],
    state: &RunState,
    persons: &[Person],
) -> Option<Gender> {
    let principal = week_slots
        .iter()
        .filter(|s| s.function == RoleFunction::Principal)
        .find(|s| helper.pairing_key.is_some() && s.pairing_key == helper.pairing_key)
        .or_else(|| {
            week_slots
                .iter()
                .filter(|s| s.function == RoleFunction::Principal)
                .find(|s| s.sequence == helper.sequence && s.id != helper.id)
        })?;

    let person = match state.picks.get(&principal.id) {
        Some(pick) => persons
            .iter()
            .find(|p| p.id == pick.person_id || p.matches_name(&pick.person_name)),
        None => principal.assigned.as_ref().and_then(|assigned| {
            persons
                .iter()
                .find(|p| p.id == assigned.id || p.matches_name(&assigned.name))
        }),
    }?;
    Some(person.gender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capabilities, Section};
    use crate::store::{MemoryLocalNeeds, MemoryProposalSink};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_caps() -> Capabilities {
        Capabilities {
            can_preside: true,
            can_pray: true,
            can_teach: true,
            can_give_student_talks: true,
            can_conduct_study: true,
            can_read_study: true,
        }
    }

    fn roster() -> Vec<Person> {
        vec![
            Person::brother("e1", "Tiago Luz")
                .with_rank(Rank::Elder)
                .with_capabilities(full_caps()),
            Person::brother("e2", "Carlos Mota")
                .with_rank(Rank::Elder)
                .with_capabilities(full_caps()),
            Person::brother("e3", "Hugo Sá")
                .with_rank(Rank::Elder)
                .with_capabilities(full_caps()),
            Person::brother("ms1", "Rui Costa")
                .with_rank(Rank::MinisterialServant)
                .with_capabilities(Capabilities {
                    can_preside: true,
                    can_pray: true,
                    can_teach: true,
                    can_read_study: true,
                    ..Default::default()
                }),
            Person::brother("b1", "Ivo Neto").with_capabilities(Capabilities {
                can_pray: true,
                can_read_study: true,
                can_give_student_talks: true,
                ..Default::default()
            }),
            Person::brother("b2", "André Gil").with_capabilities(Capabilities {
                can_give_student_talks: true,
                ..Default::default()
            }),
            Person::sister("s1", "Ana Reis"),
            Person::sister("s2", "Bia Dias"),
        ]
    }

    /// A typical week: chair, prayers, teaching, reading, demo + helper,
    /// study conductor + reader.
    fn week_slots(week_id: &str, meeting: NaiveDate) -> Vec<RoleSlot> {
        let slot = |id: &str, seq: u32, role: RoleType| {
            RoleSlot::new(format!("{week_id}-{id}"), week_id, seq, meeting, role).with_duration(10)
        };
        vec![
            slot("chair", 1, RoleType::Chairman),
            slot("opening-prayer", 2, RoleType::OpeningPrayer),
            slot("treasures", 3, RoleType::TreasuresTalk),
            slot("gems", 4, RoleType::SpiritualGems),
            slot("reading", 5, RoleType::BibleReading),
            slot("demo", 6, RoleType::StartingConversation).with_pairing_key("demo-1"),
            slot("demo-helper", 6, RoleType::StartingConversation)
                .with_function(RoleFunction::Helper)
                .with_pairing_key("demo-1"),
            slot("conductor", 7, RoleType::StudyConductor),
            slot("reader", 8, RoleType::StudyReader),
            slot("closing-prayer", 9, RoleType::ClosingPrayer),
        ]
    }

    fn config() -> GenerationConfig {
        GenerationConfig::new(date(2026, 3, 2))
    }

    #[test]
    fn test_generates_a_full_week() {
        let persons = roster();
        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        assert!(result.success);
        assert_eq!(result.parts_generated, 10);
        assert_eq!(result.unassigned_slots, 0);
        assert_eq!(sink.committed.len(), 10);
        assert_eq!(
            result.generated_weeks.as_deref(),
            Some(&["2026-W11".to_string()][..])
        );
    }

    #[test]
    fn test_no_same_week_double_booking_except_exemptions() {
        let persons = roster();
        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        // Chair + opening prayer share a person by design; closing prayer
        // is exempt from exclusion. Everything else must be distinct.
        let exempt = ["2026-W11-opening-prayer", "2026-W11-closing-prayer"];
        let mut seen = HashSet::new();
        for (slot_id, name) in &sink.committed {
            if exempt.contains(&slot_id.as_str()) {
                continue;
            }
            assert!(seen.insert(name.clone()), "{name} double-booked");
        }
    }

    #[test]
    fn test_opening_prayer_goes_to_chair() {
        let persons = roster();
        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        let committed: std::collections::HashMap<_, _> = sink.committed.iter().cloned().collect();
        assert_eq!(
            committed["2026-W11-chair"],
            committed["2026-W11-opening-prayer"]
        );
    }

    #[test]
    fn test_demonstration_prefers_sisters_and_helper_matches_gender() {
        let persons = roster();
        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        let committed: std::collections::HashMap<_, _> = sink.committed.iter().cloned().collect();
        let sisters = ["Ana Reis", "Bia Dias"];
        assert!(sisters.contains(&committed["2026-W11-demo"].as_str()));
        assert!(sisters.contains(&committed["2026-W11-demo-helper"].as_str()));
        assert_ne!(committed["2026-W11-demo"], committed["2026-W11-demo-helper"]);
    }

    #[test]
    fn test_helper_follows_male_principal() {
        // Principal already approved on the stored slot: a brother.
        let persons = roster();
        let meeting = date(2026, 3, 12);
        let principal = RoleSlot::new("p", "2026-W11", 6, meeting, RoleType::StartingConversation)
            .with_pairing_key("demo-1")
            .with_duration(4)
            .with_assigned("b1", "Ivo Neto")
            .with_status(SlotStatus::Approved);
        let helper = RoleSlot::new("h", "2026-W11", 6, meeting, RoleType::StartingConversation)
            .with_function(RoleFunction::Helper)
            .with_pairing_key("demo-1");
        let slots = vec![principal, helper];
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        // Pool restricted to the principal's gender: a brother helper,
        // never the (otherwise preferred) sisters, and never the
        // principal himself.
        assert_eq!(sink.committed.len(), 1);
        let (slot_id, name) = &sink.committed[0];
        assert_eq!(slot_id, "h");
        assert_ne!(name, "Ivo Neto");
        let person = persons.iter().find(|p| &p.name == name).unwrap();
        assert_eq!(person.gender, Gender::Brother);
    }

    #[test]
    fn test_dry_run_counts_match_live_run_with_zero_writes() {
        let persons = roster();
        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let history = ParticipationHistory::default();

        let mut dry_sink = MemoryProposalSink::new();
        let mut dry_needs = MemoryLocalNeeds::default();
        let dry = WeeklyAssignmentGenerator::new(&mut dry_sink, &mut dry_needs).generate(
            &slots,
            &persons,
            &history,
            &config().dry_run(),
        );

        let mut live_sink = MemoryProposalSink::new();
        let mut live_needs = MemoryLocalNeeds::default();
        let live = WeeklyAssignmentGenerator::new(&mut live_sink, &mut live_needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        assert!(dry.dry_run);
        assert!(dry_sink.committed.is_empty());
        assert_eq!(dry.parts_generated, live.parts_generated);
        assert!(dry.generated_weeks.is_none());
    }

    #[test]
    fn test_unassignable_slots_are_counted_not_errors() {
        // Two local-needs slots with an empty pre-assignment queue stay
        // open: counted, not errored.
        let persons = roster();
        let meeting = date(2026, 3, 12);
        let mut slots = week_slots("2026-W11", meeting);
        slots.push(
            RoleSlot::new("x1", "2026-W11", 10, meeting, RoleType::LocalNeeds).with_duration(10),
        );
        slots.push(
            RoleSlot::new("x2", "2026-W11", 11, meeting, RoleType::LocalNeeds).with_duration(10),
        );
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        assert!(result.success);
        assert_eq!(result.parts_generated, 10);
        assert_eq!(result.unassigned_slots, 2);
    }

    #[test]
    fn test_local_needs_consumes_queue_entries() {
        let persons = roster();
        let meeting = date(2026, 3, 12);
        let slots = vec![
            RoleSlot::new("ln1", "2026-W11", 7, meeting, RoleType::LocalNeeds).with_duration(10),
        ];
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::new(vec![
            LocalNeedsEntry {
                id: "q1".into(),
                theme: "Hospitality".into(),
                target_week: None,
                assignee_name: "Carlos Mota".into(),
            },
            LocalNeedsEntry {
                id: "q2".into(),
                theme: "Territory care".into(),
                target_week: Some("2026-W11".into()),
                assignee_name: "Tiago Luz".into(),
            },
        ]);

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        // Week-targeted entry wins over the older generic one.
        assert_eq!(result.parts_generated, 1);
        assert_eq!(sink.committed[0], ("ln1".to_string(), "Tiago Luz".to_string()));
        assert_eq!(needs.consumed, vec![("q2".to_string(), "ln1".to_string())]);
    }

    #[test]
    fn test_commit_failure_is_a_warning_not_an_abort() {
        let persons = roster();
        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        sink.fail_on.insert("2026-W11-treasures".to_string());
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        assert!(result.success);
        assert_eq!(result.parts_generated, 9);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("2026-W11-treasures")));
        assert_eq!(sink.committed.len(), 9);
    }

    #[test]
    fn test_empty_inputs_are_fatal() {
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &[],
            &roster(),
            &history,
            &config(),
        );
        assert!(!result.success);
        assert!(!result.errors.is_empty());

        let slots = week_slots("2026-W11", date(2026, 3, 12));
        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &[],
            &history,
            &config(),
        );
        assert!(!result.success);
        assert!(sink.committed.is_empty());
    }

    #[test]
    fn test_past_and_terminal_slots_are_skipped() {
        let persons = roster();
        let meeting = date(2026, 3, 12);
        let past = RoleSlot::new("past", "2026-W09", 1, date(2026, 2, 26), RoleType::Chairman)
            .with_duration(10);
        let done = RoleSlot::new("done", "2026-W11", 1, meeting, RoleType::Chairman)
            .with_duration(10)
            .with_assigned("e1", "Tiago Luz")
            .with_status(SlotStatus::Completed);
        let open = RoleSlot::new("open", "2026-W11", 2, meeting, RoleType::TreasuresTalk)
            .with_duration(10);
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &[past, done, open],
            &persons,
            &history,
            &config(),
        );

        assert_eq!(result.parts_generated, 1);
        assert_eq!(sink.committed[0].0, "open");
        // The completed chair keeps Tiago Luz booked for the week.
        assert_ne!(sink.committed[0].1, "Tiago Luz");
    }

    #[test]
    fn test_unknown_role_type_degrades_with_warning() {
        let persons = roster();
        let meeting = date(2026, 3, 12);
        let slots = vec![RoleSlot::new(
            "odd",
            "2026-W11",
            5,
            meeting,
            RoleType::Custom("Branch Video".into()),
        )
        .with_section(Section::General)];
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        assert!(result.success);
        assert_eq!(result.parts_generated, 1);
        assert!(result.warnings.iter().any(|w| w.contains("Branch Video")));
    }

    #[test]
    fn test_target_weeks_limits_scope() {
        let persons = roster();
        let mut slots = week_slots("2026-W11", date(2026, 3, 12));
        slots.extend(week_slots("2026-W12", date(2026, 3, 19)));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        let result = WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config().with_target_weeks(vec!["2026-W12".to_string()]),
        );

        assert!(result.success);
        assert!(sink
            .committed
            .iter()
            .all(|(id, _)| id.starts_with("2026-W12")));
    }

    #[test]
    fn test_picks_rotate_across_weeks() {
        // With an empty history, two consecutive weeks must not get the
        // same chair: the week-1 pick enters the working history and
        // deprioritizes that elder for week 2.
        let persons = roster();
        let mut slots = week_slots("2026-W11", date(2026, 3, 12));
        slots.extend(week_slots("2026-W12", date(2026, 3, 19)));
        let history = ParticipationHistory::default();
        let mut sink = MemoryProposalSink::new();
        let mut needs = MemoryLocalNeeds::default();

        WeeklyAssignmentGenerator::new(&mut sink, &mut needs).generate(
            &slots,
            &persons,
            &history,
            &config(),
        );

        let committed: std::collections::HashMap<_, _> = sink.committed.iter().cloned().collect();
        assert_ne!(committed["2026-W11-chair"], committed["2026-W12-chair"]);
    }
}
