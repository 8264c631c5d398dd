//! Command priority used for tie-breaking and visibility
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::cmp::Ordering;
use std::fmt;

/// Ranked priority of a command
///
/// When several commands match the same input, the one with the highest
/// rank wins. `Hidden` commands are left out of listings and `Ignored`
/// commands are skipped by prefix-less lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    System,
    High,
    #[default]
    Normal,
    Low,
    Hidden,
    Ignored,
}

impl Priority {
    pub const fn rank(self) -> u8 {
        match self {
            Priority::System => 100,
            Priority::High => 75,
            Priority::Normal => 50,
            Priority::Low => 25,
            Priority::Hidden => 10,
            Priority::Ignored => 0,
        }
    }

    pub const fn is_greater_than(self, other: Priority) -> bool {
        self.rank() > other.rank()
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::System => "system",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
            Priority::Hidden => "hidden",
            Priority::Ignored => "ignored",
        };
        write!(f, "{s}")
    }
}
