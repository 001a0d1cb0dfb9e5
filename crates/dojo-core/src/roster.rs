//! Student roster.
//!
//! Loaded once from the static roster document and read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::rank::{rank_value, BeltRank};

/// Most students shown for one search.
pub const DEFAULT_SEARCH_LIMIT: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Belt label, possibly with stripes.
    pub rank: String,
    pub pin: String,
    #[serde(default)]
    pub total_classes: u32,
    /// Anything else the roster carries.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Student {
    pub fn verify_pin(&self, pin: &str) -> bool {
        self.pin == pin
    }

    pub fn belt(&self) -> Option<BeltRank> {
        BeltRank::parse(&self.rank)
    }

    pub fn rank_value(&self) -> u8 {
        rank_value(&self.rank)
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    pub fn last_name(&self) -> &str {
        self.name.split(' ').next_back().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn find(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Students whose name contains `query` (case-insensitive), sorted by
    /// last name, at most `limit` of them. An empty query matches everyone.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Student> {
        let query = query.trim().to_lowercase();
        let mut found: Vec<&Student> = self
            .students
            .iter()
            .filter(|s| query.is_empty() || s.name.to_lowercase().contains(&query))
            .collect();
        found.sort_by(|a, b| a.last_name().cmp(b.last_name()));
        found.truncate(limit);
        found
    }
}
