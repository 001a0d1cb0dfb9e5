//! Who may join a class, and in which role.
//!
//! A student "qualifies" for a class when their rank sits in the class's
//! three-rank band (its minimum through two above it). A student may "help"
//! when they are Brown Belt or higher, or at least Blue Belt and two full
//! ranks above the class minimum. Open programs (sparring, weapons,
//! special, eskrima) take every rank as a student.

use serde::{Deserialize, Serialize};

use crate::rank::{class_rank_requirement, rank_value};

/// Any rank at or above this may help in every class.
const SENIOR_HELPER_VALUE: u8 = 8;
/// Floor for helping in a class below senior level.
const MIN_HELPER_VALUE: u8 = 6;
/// Ranks above a class minimum that still count as that class's band,
/// and the lead a helper needs over the minimum.
const RANK_BAND: u8 = 2;

/// Program sections of the schedule document, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Kids,
    TeensAdults,
    Sparring,
    Weapons,
    Special,
    Eskrima,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Kids,
        Category::TeensAdults,
        Category::Sparring,
        Category::Weapons,
        Category::Special,
        Category::Eskrima,
    ];

    /// Section key used in the schedule document and class ids.
    pub fn key(self) -> &'static str {
        match self {
            Category::Kids => "kids",
            Category::TeensAdults => "teensAdults",
            Category::Sparring => "sparring",
            Category::Weapons => "weapons",
            Category::Special => "special",
            Category::Eskrima => "eskrima",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Open programs accept every rank as a student.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            Category::Sparring | Category::Weapons | Category::Special | Category::Eskrima
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Role a check-in is recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Helper,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Helper => "helper",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "helper" => Ok(Role::Helper),
            other => Err(format!("unknown role '{other}' (expected student or helper)")),
        }
    }
}

/// Outcome of matching a student against a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDecision {
    /// Only qualifies as a student.
    Student,
    /// Too advanced for the class, may only help.
    Helper,
    /// Qualifies both ways; the person at the kiosk picks.
    Choose,
    /// Qualifies neither way. Joins as a student anyway; usually means the
    /// class name is missing from the requirement table.
    Fallback,
}

impl RoleDecision {
    /// Role to record when no choice is made.
    pub fn default_role(self) -> Option<Role> {
        match self {
            RoleDecision::Student | RoleDecision::Fallback => Some(Role::Student),
            RoleDecision::Helper => Some(Role::Helper),
            RoleDecision::Choose => None,
        }
    }

    pub fn allows(self, role: Role) -> bool {
        match self {
            RoleDecision::Choose => true,
            other => other.default_role() == Some(role),
        }
    }
}

/// Whether a student may help out in a class.
pub fn can_help(student_rank: &str, class_name: &str) -> bool {
    let value = rank_value(student_rank);
    let requirement = class_rank_requirement(class_name);
    value >= SENIOR_HELPER_VALUE
        || (value >= requirement + RANK_BAND && value >= MIN_HELPER_VALUE)
}

/// Whether a student may join a class as a participant.
///
/// `category` is the schedule section key; unknown keys are gated like a
/// regular class.
pub fn qualifies_for_class(student_rank: &str, class_name: &str, category: &str) -> bool {
    if Category::from_key(category).is_some_and(Category::is_open) {
        return true;
    }
    let value = rank_value(student_rank);
    let requirement = class_rank_requirement(class_name);
    (requirement..=requirement + RANK_BAND).contains(&value)
}

/// Decide which roles a student may take in a class.
pub fn resolve_role(student_rank: &str, class_name: &str, category: &str) -> RoleDecision {
    let helper = can_help(student_rank, class_name);
    let student = qualifies_for_class(student_rank, class_name, category);
    match (student, helper) {
        (true, false) => RoleDecision::Student,
        (false, true) => RoleDecision::Helper,
        (true, true) => RoleDecision::Choose,
        (false, false) => {
            tracing::warn!(
                rank = student_rank,
                class = class_name,
                category,
                "student matches no role for class, defaulting to student"
            );
            RoleDecision::Fallback
        }
    }
}
