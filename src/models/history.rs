//! Participation history.
//!
//! A flat, chronological log of past role occurrences, projected from
//! committed slots. Scoring and cooldown logic read it; nothing writes
//! back; records are immutable facts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::person::Person;
use super::slot::{Modality, RoleFunction, RoleSlot, RoleType};

/// One past role occurrence by one person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipationRecord {
    /// Roster id when known. Imported history may only carry a name.
    pub person_id: Option<String>,
    /// Name as recorded at the time; matched against current names and
    /// aliases when id is absent.
    pub person_name: String,
    pub role_type: RoleType,
    pub modality: Option<Modality>,
    pub function: RoleFunction,
    pub date: NaiveDate,
    pub duration_minutes: Option<u32>,
}

impl ParticipationRecord {
    /// Projects a record from a slot, if it has an assigned person.
    pub fn from_slot(slot: &RoleSlot) -> Option<Self> {
        let assigned = slot.assigned.as_ref()?;
        Some(Self {
            person_id: Some(assigned.id.clone()),
            person_name: assigned.name.clone(),
            role_type: slot.role_type.clone(),
            modality: slot.modality(),
            function: slot.function,
            date: slot.date,
            duration_minutes: slot.duration_minutes,
        })
    }

    /// Whether this record belongs to the given person.
    ///
    /// Id match wins; name match (collation- and alias-aware) is the
    /// fallback for imported records.
    pub fn belongs_to(&self, person: &Person) -> bool {
        match &self.person_id {
            Some(id) => id == &person.id,
            None => person.matches_name(&self.person_name),
        }
    }
}

/// Chronological participation log with the queries scoring needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipationHistory {
    records: Vec<ParticipationRecord>,
}

impl ParticipationHistory {
    /// Builds a history from records, sorting chronologically.
    pub fn new(mut records: Vec<ParticipationRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    /// Projects a history from committed slots.
    pub fn from_slots<'a>(slots: impl IntoIterator<Item = &'a RoleSlot>) -> Self {
        Self::new(
            slots
                .into_iter()
                .filter_map(ParticipationRecord::from_slot)
                .collect(),
        )
    }

    /// Appends a record, keeping chronological order.
    ///
    /// The generator uses this to make in-run picks visible to the
    /// scoring of later slots in the same run.
    pub fn push(&mut self, record: ParticipationRecord) {
        let at = self.records.partition_point(|r| r.date <= record.date);
        self.records.insert(at, record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[ParticipationRecord] {
        &self.records
    }

    /// Records belonging to a person, oldest first.
    pub fn records_for<'a, 'p>(
        &'a self,
        person: &'p Person,
    ) -> impl Iterator<Item = &'a ParticipationRecord> + use<'a, 'p> {
        self.records.iter().filter(move |r| r.belongs_to(person))
    }

    /// Most recent occurrence of a role type by a person strictly before
    /// `before`.
    pub fn last_in_role(
        &self,
        person: &Person,
        role_type: &RoleType,
        before: NaiveDate,
    ) -> Option<&ParticipationRecord> {
        self.records_for(person)
            .filter(|r| &r.role_type == role_type && r.date < before)
            .max_by_key(|r| r.date)
    }

    /// Most recent principal occurrence of any role strictly before
    /// `before`.
    pub fn last_principal(&self, person: &Person, before: NaiveDate) -> Option<&ParticipationRecord> {
        self.records_for(person)
            .filter(|r| r.function == RoleFunction::Principal && r.date < before)
            .max_by_key(|r| r.date)
    }

    /// Number of occurrences of a role type by a person strictly before
    /// `before`.
    pub fn occurrence_count(&self, person: &Person, role_type: &RoleType, before: NaiveDate) -> usize {
        self.records_for(person)
            .filter(|r| &r.role_type == role_type && r.date < before)
            .count()
    }

    /// Records for a person within `[from, to)`.
    pub fn records_in_window<'a>(
        &'a self,
        person: &'a Person,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = &'a ParticipationRecord> {
        self.records_for(person)
            .filter(move |r| r.date >= from && r.date < to)
    }
}
