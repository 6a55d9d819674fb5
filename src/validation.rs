//! Input validation for assignment snapshots.
//!
//! Checks structural integrity of roster and slot snapshots before
//! generation. Detects:
//! - Duplicate ids
//! - Assigned names that resolve to no roster member
//! - Helper slots whose pairing resolves to no principal slot
//!
//! Advisory to callers: the generator itself only treats an empty input
//! set as fatal.

use std::collections::HashSet;

use crate::models::{Person, RoleFunction, RoleSlot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same id.
    DuplicateId,
    /// A slot's assigned person matches nobody on the roster.
    UnknownAssignee,
    /// A helper slot has no resolvable principal slot.
    UnpairedHelper,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster and slot snapshot.
///
/// Checks:
/// 1. No duplicate person ids
/// 2. No duplicate slot ids
/// 3. Every assigned name resolves to a roster member (by id, name, or alias)
/// 4. Every helper slot pairs with a principal slot (pairing key, or
///    same week + sequence)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(persons: &[Person], slots: &[RoleSlot]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut person_ids = HashSet::new();
    for p in persons {
        if !person_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate person id: {}", p.id),
            ));
        }
    }

    let mut slot_ids = HashSet::new();
    for s in slots {
        if !slot_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate slot id: {}", s.id),
            ));
        }
    }

    for s in slots {
        if let Some(assigned) = &s.assigned {
            let known = persons
                .iter()
                .any(|p| p.id == assigned.id || p.matches_name(&assigned.name));
            if !known {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownAssignee,
                    format!(
                        "Slot '{}' is assigned to unknown person '{}'",
                        s.id, assigned.name
                    ),
                ));
            }
        }
    }

    for helper in slots.iter().filter(|s| s.function == RoleFunction::Helper) {
        let paired = slots.iter().any(|s| {
            s.function == RoleFunction::Principal
                && s.week_id == helper.week_id
                && ((helper.pairing_key.is_some() && s.pairing_key == helper.pairing_key)
                    || s.sequence == helper.sequence)
        });
        if !paired {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnpairedHelper,
                format!("Helper slot '{}' has no principal slot", helper.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleType;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_persons() -> Vec<Person> {
        vec![
            Person::brother("p1", "Tiago Luz"),
            Person::sister("p2", "Ana Reis").with_alias("A. Reis"),
        ]
    }

    fn sample_slots() -> Vec<RoleSlot> {
        vec![
            RoleSlot::new("s1", "2026-W11", 1, date(2026, 3, 12), RoleType::Chairman),
            RoleSlot::new(
                "s2",
                "2026-W11",
                6,
                date(2026, 3, 12),
                RoleType::StartingConversation,
            )
            .with_pairing_key("demo-1"),
            RoleSlot::new(
                "s3",
                "2026-W11",
                6,
                date(2026, 3, 12),
                RoleType::StartingConversation,
            )
            .with_function(RoleFunction::Helper)
            .with_pairing_key("demo-1"),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_persons(), &sample_slots()).is_ok());
    }

    #[test]
    fn test_duplicate_person_id() {
        let persons = vec![
            Person::brother("p1", "Tiago Luz"),
            Person::brother("p1", "Carlos Mota"),
        ];
        let errors = validate_input(&persons, &sample_slots()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("person")));
    }

    #[test]
    fn test_duplicate_slot_id() {
        let mut slots = sample_slots();
        slots.push(RoleSlot::new(
            "s1",
            "2026-W12",
            1,
            date(2026, 3, 19),
            RoleType::Chairman,
        ));
        let errors = validate_input(&sample_persons(), &slots).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("slot")));
    }

    #[test]
    fn test_unknown_assignee() {
        let mut slots = sample_slots();
        slots[0] = slots[0].clone().with_assigned("ghost", "Nobody Real");
        let errors = validate_input(&sample_persons(), &slots).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownAssignee));
    }

    #[test]
    fn test_alias_resolves_assignee() {
        let mut slots = sample_slots();
        // Name matches p2's alias: valid despite the unknown id.
        slots[0] = slots[0].clone().with_assigned("old-id", "A. Reis");
        assert!(validate_input(&sample_persons(), &slots).is_ok());
    }

    #[test]
    fn test_unpaired_helper() {
        let slots = vec![RoleSlot::new(
            "h1",
            "2026-W11",
            6,
            date(2026, 3, 12),
            RoleType::StartingConversation,
        )
        .with_function(RoleFunction::Helper)
        .with_pairing_key("demo-9")];
        let errors = validate_input(&sample_persons(), &slots).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnpairedHelper));
    }
}
