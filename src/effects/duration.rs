//! Effect lifetime taxonomy.

use serde::{Deserialize, Serialize};

/// How an effect's lifetime ends.
///
/// A closed set: every retraction site matches exhaustively, so adding a
/// variant forces a review of each handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Duration {
    /// Lives as long as its source stays in an active location.
    /// Created inactive; takes hold at bulk activation.
    #[default]
    Persistent,
    /// Ends when a bound event satisfies its predicate.
    Custom,
    /// Ends when the shootout phase finishes.
    UntilEndOfShootoutPhase,
    /// Ends when the current shootout round finishes.
    UntilEndOfShootoutRound,
    /// Ends when a phase ends (optionally a specific one).
    UntilEndOfPhase,
    /// Ends at the at-end-of-phase marker (optionally a specific phase).
    AtEndOfPhase,
    /// Ends when the whole round ends.
    UntilEndOfRound,
}

impl Duration {
    /// Does this duration tie the effect's life to its source's presence?
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        matches!(self, Duration::Persistent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_persistent() {
        assert_eq!(Duration::default(), Duration::Persistent);
        assert!(Duration::default().is_persistent());
        assert!(!Duration::Custom.is_persistent());
    }

    #[test]
    fn test_serialization() {
        let duration = Duration::UntilEndOfShootoutRound;
        let json = serde_json::to_string(&duration).unwrap();
        let deserialized: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(duration, deserialized);
    }
}
