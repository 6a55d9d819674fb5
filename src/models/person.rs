//! Roster member model.
//!
//! Persons are the entities that hold agenda roles. Each person carries
//! capability flags, a rank, availability, and the disqualification flags
//! that gate every assignment decision.
//!
//! The core treats persons as read-only: they are created and edited by an
//! external management surface and snapshotted at generation start.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Gender of a roster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Brother,
    Sister,
}

/// Congregation rank.
///
/// Determines access to teaching and conducting roles and the class
/// ordering used by demonstration and study-reader ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    /// Ordinary publisher, no appointed rank.
    Publisher,
    MinisterialServant,
    Elder,
}

/// Age classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    Adult,
    Youth,
    Child,
}

/// Capability flags granted to a person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May chair a meeting.
    pub can_preside: bool,
    /// May offer public prayer.
    pub can_pray: bool,
    /// May give teaching talks.
    pub can_teach: bool,
    /// May give student talks.
    pub can_give_student_talks: bool,
    /// May conduct the congregation Bible study.
    pub can_conduct_study: bool,
    /// May read at the congregation Bible study.
    pub can_read_study: bool,
}

/// Per-section participation gates.
///
/// All sections are open by default; a management surface may close
/// individual sections for a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPrivileges {
    pub treasures: bool,
    pub ministry: bool,
    pub living: bool,
}

impl Default for SectionPrivileges {
    fn default() -> Self {
        Self {
            treasures: true,
            ministry: true,
            living: true,
        }
    }
}

/// Availability specification.
///
/// Dates are always compared against the week's reference meeting date,
/// not the raw slot date; callers normalize before asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Available every week except the listed dates.
    AlwaysExcept(Vec<NaiveDate>),
    /// Unavailable except on the listed dates.
    OnlyOn(Vec<NaiveDate>),
}

impl Availability {
    /// Whether the person is available on the given meeting date.
    pub fn permits(&self, date: NaiveDate) -> bool {
        match self {
            Availability::AlwaysExcept(blocked) => !blocked.contains(&date),
            Availability::OnlyOn(open) => open.contains(&date),
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::AlwaysExcept(Vec::new())
    }
}

/// A roster member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Stable identifier. Display name may change; id never does.
    pub id: String,
    /// Current display name.
    pub name: String,
    /// Former or alternate names, used for history look-ups by name.
    pub aliases: Vec<String>,
    pub gender: Gender,
    pub rank: Rank,
    pub age_group: AgeGroup,
    pub baptized: bool,
    /// Actively serving. Inactive members are excluded everywhere.
    pub active: bool,
    /// May only hold Helper slots.
    pub helper_only: bool,
    pub capabilities: Capabilities,
    pub section_privileges: SectionPrivileges,
    /// Ids of responsible adults. Relevant only for youth/child members.
    pub guardians: Vec<String>,
    /// Whether a youth/child may be paired with a non-guardian adult.
    pub pair_with_non_guardian: bool,
    /// Administratively not qualified for any role.
    pub disqualified: bool,
    pub disqualified_reason: Option<String>,
    /// Asked not to be assigned.
    pub opted_out: bool,
    pub opted_out_reason: Option<String>,
    pub availability: Availability,
}

impl Person {
    /// Creates an active adult member with no capabilities.
    pub fn new(id: impl Into<String>, name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            gender,
            rank: Rank::Publisher,
            age_group: AgeGroup::Adult,
            baptized: true,
            active: true,
            helper_only: false,
            capabilities: Capabilities::default(),
            section_privileges: SectionPrivileges::default(),
            guardians: Vec::new(),
            pair_with_non_guardian: true,
            disqualified: false,
            disqualified_reason: None,
            opted_out: false,
            opted_out_reason: None,
            availability: Availability::default(),
        }
    }

    /// Creates a brother.
    pub fn brother(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Gender::Brother)
    }

    /// Creates a sister.
    pub fn sister(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Gender::Sister)
    }

    /// Sets the rank.
    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    /// Sets the age group.
    pub fn with_age_group(mut self, age_group: AgeGroup) -> Self {
        self.age_group = age_group;
        self
    }

    /// Sets the baptized flag.
    pub fn with_baptized(mut self, baptized: bool) -> Self {
        self.baptized = baptized;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Marks the person as helper-only.
    pub fn helper_only(mut self) -> Self {
        self.helper_only = true;
        self
    }

    /// Sets capability flags.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets section privileges.
    pub fn with_section_privileges(mut self, privileges: SectionPrivileges) -> Self {
        self.section_privileges = privileges;
        self
    }

    /// Adds an alias name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the availability spec.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Marks the person as disqualified.
    pub fn disqualified(mut self, reason: Option<String>) -> Self {
        self.disqualified = true;
        self.disqualified_reason = reason;
        self
    }

    /// Marks the person as opted out of participation.
    pub fn opted_out(mut self, reason: Option<String>) -> Self {
        self.opted_out = true;
        self.opted_out_reason = reason;
        self
    }

    /// Whether the person is available on the given meeting date.
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.availability.permits(date)
    }

    /// Collation-insensitive match against the display name and aliases.
    ///
    /// History records reference people by the name in force when the
    /// record was written; renames are bridged through the alias list.
    pub fn matches_name(&self, name: &str) -> bool {
        let key = collation_key(name);
        key == collation_key(&self.name) || self.aliases.iter().any(|a| collation_key(a) == key)
    }
}

/// Case- and accent-insensitive collation key.
///
/// NFD-decomposes, strips combining marks, and lowercases, so that
/// "José" and "jose" compare equal.
pub fn collation_key(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
