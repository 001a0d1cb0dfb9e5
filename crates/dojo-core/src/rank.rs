//! Belt ranks and class-level requirements.
//!
//! Rank labels come from the roster as free text ("Blue Belt w/ 2 stripes").
//! Stripes are a sub-increment and never change rank comparisons. Every
//! lookup here is total: labels we don't recognise rank as 0 so legacy
//! roster entries keep working.

use serde::{Deserialize, Serialize};

/// Suffix marking stripes on a belt label.
const STRIPE_MARKER: &str = " w/";

/// Ordered belt ranks, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BeltRank {
    White,
    Gold,
    Orange,
    Green,
    Purple,
    Blue,
    Red,
    Brown,
    Black,
    FirstDegreeBlack,
    SecondDegreeBlack,
    ThirdDegreeBlack,
    FourthDegreeBlack,
    FifthDegreeBlack,
}

impl BeltRank {
    pub const ALL: [BeltRank; 14] = [
        BeltRank::White,
        BeltRank::Gold,
        BeltRank::Orange,
        BeltRank::Green,
        BeltRank::Purple,
        BeltRank::Blue,
        BeltRank::Red,
        BeltRank::Brown,
        BeltRank::Black,
        BeltRank::FirstDegreeBlack,
        BeltRank::SecondDegreeBlack,
        BeltRank::ThirdDegreeBlack,
        BeltRank::FourthDegreeBlack,
        BeltRank::FifthDegreeBlack,
    ];

    /// Position on the 1..=14 scale.
    pub fn value(self) -> u8 {
        match self {
            BeltRank::White => 1,
            BeltRank::Gold => 2,
            BeltRank::Orange => 3,
            BeltRank::Green => 4,
            BeltRank::Purple => 5,
            BeltRank::Blue => 6,
            BeltRank::Red => 7,
            BeltRank::Brown => 8,
            BeltRank::Black => 9,
            BeltRank::FirstDegreeBlack => 10,
            BeltRank::SecondDegreeBlack => 11,
            BeltRank::ThirdDegreeBlack => 12,
            BeltRank::FourthDegreeBlack => 13,
            BeltRank::FifthDegreeBlack => 14,
        }
    }

    /// Canonical roster label.
    pub fn label(self) -> &'static str {
        match self {
            BeltRank::White => "White Belt",
            BeltRank::Gold => "Gold Belt",
            BeltRank::Orange => "Orange Belt",
            BeltRank::Green => "Green Belt",
            BeltRank::Purple => "Purple Belt",
            BeltRank::Blue => "Blue Belt",
            BeltRank::Red => "Red Belt",
            BeltRank::Brown => "Brown Belt",
            BeltRank::Black => "Black Belt",
            BeltRank::FirstDegreeBlack => "1st Degree Black Belt",
            BeltRank::SecondDegreeBlack => "2nd Degree Black Belt",
            BeltRank::ThirdDegreeBlack => "3rd Degree Black Belt",
            BeltRank::FourthDegreeBlack => "4th Degree Black Belt",
            BeltRank::FifthDegreeBlack => "5th Degree Black Belt",
        }
    }

    /// Parse a roster label, ignoring any stripe suffix.
    pub fn parse(label: &str) -> Option<Self> {
        let base = strip_stripes(label);
        Self::ALL.into_iter().find(|rank| rank.label() == base)
    }
}

impl std::fmt::Display for BeltRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn strip_stripes(label: &str) -> &str {
    let base = match label.find(STRIPE_MARKER) {
        Some(idx) => &label[..idx],
        None => label,
    };
    base.trim()
}

/// Numeric rank for a label; 0 when the label is not a known belt.
pub fn rank_value(label: &str) -> u8 {
    BeltRank::parse(label).map(BeltRank::value).unwrap_or(0)
}

/// Minimum rank for a class group, keyed by its display name.
///
/// Unknown class names require 0.
pub fn class_rank_requirement(class_name: &str) -> u8 {
    match class_name {
        "White • Gold" => 1,
        "Orange" => 3,
        "Green • Purple" => 4,
        "Blue • Red" => 6,
        "Brown" => 8,
        "Black" => 9,
        "White • Gold • Orange" => 1,
        "Green Belt & Up" => 4,
        _ => 0,
    }
}
