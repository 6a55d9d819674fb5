//! Domain models for roster assignment.
//!
//! Provides the core data types the engine operates on: roster members,
//! agenda slots, and the participation history projected from committed
//! slots. All types are plain serde-derived data; the core never talks
//! to storage directly.

mod history;
mod person;
mod slot;

pub use history::{ParticipationHistory, ParticipationRecord};
pub use person::{
    collation_key, AgeGroup, Availability, Capabilities, Gender, Person, Rank, SectionPrivileges,
};
pub use slot::{
    AssignedPerson, InvalidTransition, Modality, RoleFunction, RoleSlot, RoleType, Section,
    SlotStatus,
};
