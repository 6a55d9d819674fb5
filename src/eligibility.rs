//! Eligibility evaluation.
//!
//! Pure predicate over a person, a role modality, and a function: may this
//! person hold this kind of role? Returns a verdict with a reason rather
//! than a bare bool so callers can surface why someone was passed over.
//!
//! Rule order matters and is fixed: global disqualifiers short-circuit
//! before any modality rule runs; helper evaluation uses a separate,
//! looser check than principal evaluation.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{Gender, Modality, Person, Rank, RoleFunction, Section};

/// Situational context for one eligibility question.
#[derive(Debug, Clone)]
pub struct EligibilityContext {
    /// Target slot date. When absent, availability is not checked.
    pub date: Option<NaiveDate>,
    /// Whether the role is opening-flavored (opening prayer follows the
    /// chair's qualifications).
    pub opening_flavored: bool,
    /// Meeting section, when section gates should apply.
    pub section: Option<Section>,
    /// Target week already in the past: availability is not checked, the
    /// factual record stands.
    pub past_week: bool,
    /// Gender of the already-chosen principal, for helper evaluation.
    pub principal_gender: Option<Gender>,
    /// Weekday the congregation meets on. Availability is evaluated
    /// against this weekday within the slot's week.
    pub meeting_weekday: Weekday,
}

impl EligibilityContext {
    /// Context with no date and default meeting weekday.
    pub fn new() -> Self {
        Self {
            date: None,
            opening_flavored: false,
            section: None,
            past_week: false,
            principal_gender: None,
            meeting_weekday: Weekday::Thu,
        }
    }

    /// Context for a slot on the given date.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::new()
        }
    }

    /// Marks the role as opening-flavored.
    pub fn opening_flavored(mut self) -> Self {
        self.opening_flavored = true;
        self
    }

    /// Sets the meeting section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    /// Marks the target week as already past.
    pub fn past_week(mut self) -> Self {
        self.past_week = true;
        self
    }

    /// Sets the paired principal's gender.
    pub fn with_principal_gender(mut self, gender: Gender) -> Self {
        self.principal_gender = Some(gender);
        self
    }

    /// Sets the meeting weekday.
    pub fn with_meeting_weekday(mut self, weekday: Weekday) -> Self {
        self.meeting_weekday = weekday;
        self
    }
}

impl Default for EligibilityContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Verdict of one eligibility question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityOutcome {
    pub eligible: bool,
    pub reason: Option<String>,
}

impl EligibilityOutcome {
    fn ok() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    fn blocked(reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: Some(reason.into()),
        }
    }
}

/// The meeting date within a slot date's week.
///
/// Slot dates may be recorded as the first day of the week; availability
/// is always judged against the actual meeting weekday, found by rolling
/// the date forward (0–6 days).
pub fn reference_meeting_date(date: NaiveDate, meeting_weekday: Weekday) -> NaiveDate {
    let current = date.weekday().num_days_from_monday() as i64;
    let target = meeting_weekday.num_days_from_monday() as i64;
    date + chrono::Duration::days((target - current).rem_euclid(7))
}

/// Evaluates whether a person may hold a role of the given modality and
/// function under the given context.
///
/// Pure: no side effects, never fails for expected inputs.
pub fn evaluate(
    person: &Person,
    modality: Modality,
    function: RoleFunction,
    ctx: &EligibilityContext,
) -> EligibilityOutcome {
    // Global disqualifiers run before everything else, unconditionally.
    if person.disqualified {
        return EligibilityOutcome::blocked("not qualified for assignments");
    }
    if person.opted_out {
        return EligibilityOutcome::blocked("asked not to participate");
    }
    if !person.active {
        return EligibilityOutcome::blocked("not actively serving");
    }

    // Availability applies to future weeks only; past records stand as fact.
    if let Some(date) = ctx.date {
        if !ctx.past_week {
            let meeting_date = reference_meeting_date(date, ctx.meeting_weekday);
            if !person.is_available_on(meeting_date) {
                return EligibilityOutcome::blocked("unavailable on this date");
            }
        }
    }

    if person.helper_only && function == RoleFunction::Principal {
        return EligibilityOutcome::blocked("helper-only member");
    }

    if let Some(section) = ctx.section {
        let open = match section {
            Section::Treasures => person.section_privileges.treasures,
            Section::Ministry => person.section_privileges.ministry,
            Section::Living => person.section_privileges.living,
            Section::General => true,
        };
        if !open {
            return EligibilityOutcome::blocked("section closed for this member");
        }
    }

    if function == RoleFunction::Helper {
        return evaluate_helper(person, ctx);
    }

    evaluate_principal(person, modality, ctx)
}

/// Helper evaluation: looser than principal, but gender-bound to the
/// principal once the principal is known. An unknown principal gender
/// imposes no gender constraint.
fn evaluate_helper(person: &Person, ctx: &EligibilityContext) -> EligibilityOutcome {
    if let Some(principal_gender) = ctx.principal_gender {
        if person.gender != principal_gender {
            return EligibilityOutcome::blocked("gender does not match the principal");
        }
    }
    EligibilityOutcome::ok()
}

fn evaluate_principal(
    person: &Person,
    modality: Modality,
    ctx: &EligibilityContext,
) -> EligibilityOutcome {
    match modality {
        Modality::Presiding => {
            if !person.capabilities.can_preside {
                return EligibilityOutcome::blocked("no presiding capability");
            }
            EligibilityOutcome::ok()
        }
        Modality::Song => EligibilityOutcome::blocked("songs are not assigned"),
        Modality::Prayer => {
            if !person.baptized {
                return EligibilityOutcome::blocked("not baptized");
            }
            if person.gender != Gender::Brother {
                return EligibilityOutcome::blocked("prayer is offered by brothers");
            }
            if !person.capabilities.can_pray {
                return EligibilityOutcome::blocked("no prayer capability");
            }
            if ctx.opening_flavored && !person.capabilities.can_preside {
                return EligibilityOutcome::blocked("opening prayer requires presiding capability");
            }
            EligibilityOutcome::ok()
        }
        Modality::Counsel => {
            if !matches!(person.rank, Rank::Elder | Rank::MinisterialServant) {
                return EligibilityOutcome::blocked("counsel requires an appointed brother");
            }
            EligibilityOutcome::ok()
        }
        Modality::Teaching => {
            if !person.capabilities.can_teach {
                return EligibilityOutcome::blocked("no teaching capability");
            }
            if !matches!(person.rank, Rank::Elder | Rank::MinisterialServant) {
                return EligibilityOutcome::blocked("teaching talks require an appointed brother");
            }
            EligibilityOutcome::ok()
        }
        Modality::StudentReading => {
            if person.gender != Gender::Brother {
                return EligibilityOutcome::blocked("the reading is done by brothers");
            }
            student_eligible(person)
        }
        Modality::Demonstration => student_eligible(person),
        Modality::StudentTalk => {
            if person.gender != Gender::Brother {
                return EligibilityOutcome::blocked("student talks are given by brothers");
            }
            if !person.capabilities.can_give_student_talks {
                return EligibilityOutcome::blocked("no student-talk capability");
            }
            student_eligible(person)
        }
        Modality::StudyConduct => {
            if person.rank != Rank::Elder {
                return EligibilityOutcome::blocked("conducting the study requires an elder");
            }
            if !person.capabilities.can_conduct_study {
                return EligibilityOutcome::blocked("no study-conducting capability");
            }
            EligibilityOutcome::ok()
        }
        Modality::StudyReading => {
            if person.gender != Gender::Brother {
                return EligibilityOutcome::blocked("study reading is done by brothers");
            }
            if !person.capabilities.can_read_study {
                return EligibilityOutcome::blocked("no study-reading capability");
            }
            EligibilityOutcome::ok()
        }
        Modality::LocalNeeds => {
            if person.rank != Rank::Elder {
                return EligibilityOutcome::blocked("local needs is handled by an elder");
            }
            if !person.capabilities.can_teach {
                return EligibilityOutcome::blocked("no teaching capability");
            }
            EligibilityOutcome::ok()
        }
    }
}

/// Baseline for student roles: serving, baptized, and not a child.
fn student_eligible(person: &Person) -> EligibilityOutcome {
    if !person.baptized {
        return EligibilityOutcome::blocked("not baptized");
    }
    if person.age_group == crate::models::AgeGroup::Child {
        return EligibilityOutcome::blocked("children do not hold student roles");
    }
    EligibilityOutcome::ok()
}

/// Filters a roster down to persons eligible for a modality/function.
pub fn eligible_persons<'a>(
    persons: &'a [Person],
    modality: Modality,
    function: RoleFunction,
    ctx: &EligibilityContext,
) -> Vec<&'a Person> {
    persons
        .iter()
        .filter(|p| evaluate(p, modality, function, ctx).eligible)
        .collect()
}
