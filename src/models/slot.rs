//! Role slot model.
//!
//! A slot is one bookable position in one week's agenda: a role type, a
//! function (principal or helper), a date, and an assignment status that
//! moves through a fixed state machine.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Closed taxonomy of agenda role types.
///
/// `Custom` carries role types introduced by imports or calendar
/// exceptions; it has no modality of its own and is degraded explicitly
/// by the generator, never silently here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Chairman,
    OpeningComments,
    ClosingComments,
    OpeningPrayer,
    ClosingPrayer,
    TreasuresTalk,
    SpiritualGems,
    BibleReading,
    StartingConversation,
    FollowingUp,
    MakingDisciples,
    ExplainingBeliefs,
    StudentTalk,
    LivingTalk,
    LocalNeeds,
    StudyConductor,
    StudyReader,
    Counsel,
    OpeningSong,
    MiddleSong,
    ClosingSong,
    /// Role type outside the known taxonomy.
    Custom(String),
}

/// Coarser eligibility category derived from the role type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Presiding,
    Prayer,
    Teaching,
    StudentReading,
    Demonstration,
    StudentTalk,
    StudyConduct,
    StudyReading,
    Counsel,
    LocalNeeds,
    Song,
}

impl RoleType {
    /// Derives the eligibility modality.
    ///
    /// Returns `None` for `Custom` role types: the mapping for unknown
    /// types is a generator policy (degrade + warn), not a property of
    /// the taxonomy.
    pub fn modality(&self) -> Option<Modality> {
        Some(match self {
            RoleType::Chairman | RoleType::OpeningComments | RoleType::ClosingComments => {
                Modality::Presiding
            }
            RoleType::OpeningPrayer | RoleType::ClosingPrayer => Modality::Prayer,
            RoleType::TreasuresTalk | RoleType::SpiritualGems | RoleType::LivingTalk => {
                Modality::Teaching
            }
            RoleType::BibleReading => Modality::StudentReading,
            RoleType::StartingConversation
            | RoleType::FollowingUp
            | RoleType::MakingDisciples
            | RoleType::ExplainingBeliefs => Modality::Demonstration,
            RoleType::StudentTalk => Modality::StudentTalk,
            RoleType::LocalNeeds => Modality::LocalNeeds,
            RoleType::StudyConductor => Modality::StudyConduct,
            RoleType::StudyReader => Modality::StudyReading,
            RoleType::Counsel => Modality::Counsel,
            RoleType::OpeningSong | RoleType::MiddleSong | RoleType::ClosingSong => Modality::Song,
            RoleType::Custom(_) => return None,
        })
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            RoleType::Chairman => "Chairman",
            RoleType::OpeningComments => "Opening Comments",
            RoleType::ClosingComments => "Closing Comments",
            RoleType::OpeningPrayer => "Opening Prayer",
            RoleType::ClosingPrayer => "Closing Prayer",
            RoleType::TreasuresTalk => "Treasures Talk",
            RoleType::SpiritualGems => "Spiritual Gems",
            RoleType::BibleReading => "Bible Reading",
            RoleType::StartingConversation => "Starting a Conversation",
            RoleType::FollowingUp => "Following Up",
            RoleType::MakingDisciples => "Making Disciples",
            RoleType::ExplainingBeliefs => "Explaining Your Beliefs",
            RoleType::StudentTalk => "Student Talk",
            RoleType::LivingTalk => "Living Talk",
            RoleType::LocalNeeds => "Local Needs",
            RoleType::StudyConductor => "Study Conductor",
            RoleType::StudyReader => "Study Reader",
            RoleType::Counsel => "Counsel",
            RoleType::OpeningSong => "Opening Song",
            RoleType::MiddleSong => "Middle Song",
            RoleType::ClosingSong => "Closing Song",
            RoleType::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a slot is a principal part or its helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleFunction {
    Principal,
    Helper,
}

/// Meeting section a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Treasures,
    Ministry,
    Living,
    General,
}

/// Assignment status state machine.
///
/// `Unassigned → Proposed → Approved → Completed`, with rejection
/// returning to `Unassigned` and cancellation closing the slot.
/// `Completed → Approved` is the explicit "undo completion" reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    Unassigned,
    Proposed,
    Approved,
    Completed,
    Rejected,
    Cancelled,
}

impl SlotStatus {
    /// Whether the transition to `next` is a legal edge.
    pub fn can_transition_to(self, next: SlotStatus) -> bool {
        use SlotStatus::*;
        matches!(
            (self, next),
            (Unassigned, Proposed)
                | (Proposed, Approved)
                | (Proposed, Rejected)
                | (Approved, Completed)
                | (Approved, Rejected)
                | (Approved, Cancelled)
                | (Completed, Cancelled)
                | (Completed, Approved)
                | (Rejected, Unassigned)
        )
    }

    /// Whether the slot is closed to automatic generation.
    pub fn is_terminal(self) -> bool {
        matches!(self, SlotStatus::Completed | SlotStatus::Cancelled)
    }
}

/// Illegal status transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid slot status transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: SlotStatus,
    pub to: SlotStatus,
}

/// The person currently attached to a slot.
///
/// Name is denormalized so display and history survive roster renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPerson {
    pub id: String,
    pub name: String,
}

/// One bookable position in one week's agenda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSlot {
    pub id: String,
    /// Week identifier, e.g. "2026-W11".
    pub week_id: String,
    /// Position within the week's agenda.
    pub sequence: u32,
    /// Scheduled date.
    pub date: NaiveDate,
    pub role_type: RoleType,
    pub function: RoleFunction,
    pub section: Section,
    pub duration_minutes: Option<u32>,
    pub start_time: Option<NaiveTime>,
    pub status: SlotStatus,
    pub assigned: Option<AssignedPerson>,
    /// Reason recorded on rejection or cancellation.
    pub status_reason: Option<String>,
    /// Links a helper slot to its principal slot. Set at creation time;
    /// slots from legacy imports may lack it and fall back to
    /// week + sequence matching.
    pub pairing_key: Option<String>,
    /// Created or altered by a calendar exception event. Preserved, not
    /// interpreted by the core.
    pub from_calendar_exception: bool,
}

impl RoleSlot {
    /// Creates an unassigned principal slot.
    pub fn new(
        id: impl Into<String>,
        week_id: impl Into<String>,
        sequence: u32,
        date: NaiveDate,
        role_type: RoleType,
    ) -> Self {
        let section = default_section(&role_type);
        Self {
            id: id.into(),
            week_id: week_id.into(),
            sequence,
            date,
            role_type,
            function: RoleFunction::Principal,
            section,
            duration_minutes: None,
            start_time: None,
            status: SlotStatus::Unassigned,
            assigned: None,
            status_reason: None,
            pairing_key: None,
            from_calendar_exception: false,
        }
    }

    /// Sets the function.
    pub fn with_function(mut self, function: RoleFunction) -> Self {
        self.function = function;
        self
    }

    /// Sets the section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.section = section;
        self
    }

    /// Sets the duration in minutes.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Sets the scheduled start time.
    pub fn with_start_time(mut self, time: NaiveTime) -> Self {
        self.start_time = Some(time);
        self
    }

    /// Sets the pairing key.
    pub fn with_pairing_key(mut self, key: impl Into<String>) -> Self {
        self.pairing_key = Some(key.into());
        self
    }

    /// Sets the status without transition checking. Snapshot loading only.
    pub fn with_status(mut self, status: SlotStatus) -> Self {
        self.status = status;
        self
    }

    /// Attaches an assigned person.
    pub fn with_assigned(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.assigned = Some(AssignedPerson {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Marks the slot as originating from a calendar exception.
    pub fn from_calendar_exception(mut self) -> Self {
        self.from_calendar_exception = true;
        self
    }

    /// Derived eligibility modality, `None` for custom role types.
    pub fn modality(&self) -> Option<Modality> {
        self.role_type.modality()
    }

    /// Moves the slot through the status state machine.
    ///
    /// A `Completed → Approved` edge is the "undo completion" reversal
    /// and is logged. Rejection and cancellation record `reason`.
    pub fn transition(
        &mut self,
        next: SlotStatus,
        reason: Option<String>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if self.status == SlotStatus::Completed && next == SlotStatus::Approved {
            warn!(slot = %self.id, "completion reversed");
        }
        match next {
            SlotStatus::Rejected | SlotStatus::Cancelled => self.status_reason = reason,
            SlotStatus::Unassigned => {
                self.assigned = None;
                self.status_reason = None;
            }
            _ => {}
        }
        self.status = next;
        Ok(())
    }
}

/// Default section for a role type; overridable per slot.
fn default_section(role_type: &RoleType) -> Section {
    match role_type {
        RoleType::TreasuresTalk | RoleType::SpiritualGems | RoleType::BibleReading => {
            Section::Treasures
        }
        RoleType::StartingConversation
        | RoleType::FollowingUp
        | RoleType::MakingDisciples
        | RoleType::ExplainingBeliefs
        | RoleType::StudentTalk => Section::Ministry,
        RoleType::LivingTalk
        | RoleType::LocalNeeds
        | RoleType::StudyConductor
        | RoleType::StudyReader => Section::Living,
        _ => Section::General,
    }
}
