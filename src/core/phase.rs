//! Turn structure: phases, play windows, blanking.
//!
//! Phase-scoped effect durations retract when the matching phase ends;
//! play windows gate window-scoped bookkeeping; blank kinds qualify the
//! card-blanked event.

use serde::{Deserialize, Serialize};

/// A phase of the game round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Gambling,
    Upkeep,
    HighNoon,
    Shootout,
    Sundown,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Gambling => "gambling",
            Phase::Upkeep => "upkeep",
            Phase::HighNoon => "high noon",
            Phase::Shootout => "shootout",
            Phase::Sundown => "sundown",
        };
        write!(f, "{}", name)
    }
}

/// A named window in which players may take actions.
///
/// Closing a window is announced to the effect engine; the
/// shootout-resolution and gambling windows additionally reset per-player
/// cheatin' resolution bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayWindow {
    Gambling,
    HighNoon,
    ShootoutPlays,
    ShootoutResolution,
    Sundown,
}

impl PlayWindow {
    /// Windows whose closure resets cheatin' resolution bookkeeping.
    #[must_use]
    pub const fn resets_cheatin_res(self) -> bool {
        matches!(self, PlayWindow::ShootoutResolution | PlayWindow::Gambling)
    }
}

/// How a card was blanked.
///
/// Trait blanking suspends only effects that originate from a trait;
/// full blanking suspends everything the card gives out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlankKind {
    Full,
    Trait,
}
