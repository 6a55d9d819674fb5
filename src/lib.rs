//! Fair-rotation assignment engine for recurring meeting rosters.
//!
//! Assigns members of a fixed roster to typed agenda roles across weekly
//! meetings, subject to eligibility rules (who may hold a role), fairness
//! rules (who has waited longest and carried least load), and same-week
//! conflict rules (no double-booking within a week).
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Person`, `RoleSlot`, `RoleType`,
//!   `Modality`, `ParticipationHistory`
//! - **`eligibility`**: Pure per-person, per-modality eligibility rules
//! - **`rotation`**: Fairness scoring, cooldown signals, explanations
//! - **`ranking`**: The three-tier candidate order (eligibility → class
//!   → score) applied per slot
//! - **`queues`**: Persisted per-group rotation queues and rebalancing
//! - **`generator`**: The phase-ordered weekly generation run
//! - **`store`**: Trait boundary to persistence, with in-memory
//!   implementations
//! - **`validation`**: Input integrity checks on snapshots
//!
//! # Design
//!
//! The engine is a single-threaded, synchronous computation over
//! in-memory snapshots: read the roster, slots, and history once,
//! generate, then commit each proposal through its own failure domain.
//! All time arithmetic is anchored to a caller-supplied reference date;
//! the core never reads the clock, so identical inputs always produce
//! identical output.

pub mod eligibility;
pub mod generator;
pub mod models;
pub mod queues;
pub mod ranking;
pub mod rotation;
pub mod store;
pub mod validation;

pub use generator::{GenerationConfig, GenerationResult, WeeklyAssignmentGenerator};
pub use models::{
    Gender, Modality, ParticipationHistory, ParticipationRecord, Person, Rank, RoleFunction,
    RoleSlot, RoleType, SlotStatus,
};
pub use ranking::{rank, RankedCandidate};
pub use rotation::{cooldown_info, score, RotationScore};
