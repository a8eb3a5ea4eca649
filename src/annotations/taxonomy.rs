use serde::{Serialize, Serializer};
use std::fmt;

/// The closed set of object/state classes the PPE model was trained on.
///
/// Declaration order matches the model's class indices, with `Unknown` last as the sentinel for
/// indices the model should never produce. Derived ordering follows declaration order and is what
/// makes safety messages reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonomyLabel {
    Hardhat,
    Mask,
    NoHardhat,
    NoMask,
    NoSafetyVest,
    Person,
    SafetyCone,
    SafetyVest,
    Machinery,
    Vehicle,
    Unknown,
}

impl TaxonomyLabel {
    /// Known labels, indexed by model class id.
    pub const KNOWN: [TaxonomyLabel; 10] = [
        TaxonomyLabel::Hardhat,
        TaxonomyLabel::Mask,
        TaxonomyLabel::NoHardhat,
        TaxonomyLabel::NoMask,
        TaxonomyLabel::NoSafetyVest,
        TaxonomyLabel::Person,
        TaxonomyLabel::SafetyCone,
        TaxonomyLabel::SafetyVest,
        TaxonomyLabel::Machinery,
        TaxonomyLabel::Vehicle,
    ];

    /// Labels that denote missing equipment.
    pub const VIOLATIONS: [TaxonomyLabel; 3] = [
        TaxonomyLabel::NoHardhat,
        TaxonomyLabel::NoMask,
        TaxonomyLabel::NoSafetyVest,
    ];

    /// Total mapping from a detector class index. Never fails.
    pub fn from_class_index(class_index: usize) -> Self {
        Self::KNOWN
            .get(class_index)
            .copied()
            .unwrap_or(TaxonomyLabel::Unknown)
    }

    pub fn class_index(self) -> Option<usize> {
        Self::KNOWN.iter().position(|label| *label == self)
    }

    pub fn is_violation(self) -> bool {
        matches!(
            self,
            TaxonomyLabel::NoHardhat | TaxonomyLabel::NoMask | TaxonomyLabel::NoSafetyVest
        )
    }

    /// Display name as used in the model's class list and in reports.
    pub fn name(self) -> &'static str {
        match self {
            TaxonomyLabel::Hardhat => "Hardhat",
            TaxonomyLabel::Mask => "Mask",
            TaxonomyLabel::NoHardhat => "NO-Hardhat",
            TaxonomyLabel::NoMask => "NO-Mask",
            TaxonomyLabel::NoSafetyVest => "NO-Safety Vest",
            TaxonomyLabel::Person => "Person",
            TaxonomyLabel::SafetyCone => "Safety Cone",
            TaxonomyLabel::SafetyVest => "Safety Vest",
            TaxonomyLabel::Machinery => "machinery",
            TaxonomyLabel::Vehicle => "vehicle",
            TaxonomyLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TaxonomyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TaxonomyLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
