//! Card locations.
//!
//! Locations are the fixed places a card can occupy during a game. The
//! effect engine cares about two properties: which locations make a card
//! eligible to *receive* effects (the tracked set), and which locations
//! keep a card's own effects alive (the active set).

use serde::{Deserialize, Serialize};

/// Where a card currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// In its owner's hand.
    Hand,
    /// Face down in the draw deck.
    DrawDeck,
    /// In the discard pile.
    DiscardPile,
    /// In the dead pile (aced).
    DeadPile,
    /// In play on the table.
    PlayArea,
    /// Mid-resolution: announced but not yet in its final location.
    BeingPlayed,
    /// In a drawn lowball/shootout hand.
    DrawHand,
    /// Removed from the game entirely.
    OutOfGame,
}

impl Location {
    /// Locations whose cards are eligible to receive effects.
    ///
    /// This is the fixed whitelist the target universe is built from;
    /// only `OutOfGame` is excluded.
    #[must_use]
    pub const fn is_tracked(self) -> bool {
        !matches!(self, Location::OutOfGame)
    }

    /// Locations that keep a card's own effects alive.
    ///
    /// An effect whose source card leaves these locations is retracted
    /// (or silently dropped at add time).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Location::PlayArea | Location::BeingPlayed)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Location::Hand => "hand",
            Location::DrawDeck => "draw deck",
            Location::DiscardPile => "discard pile",
            Location::DeadPile => "dead pile",
            Location::PlayArea => "play area",
            Location::BeingPlayed => "being played",
            Location::DrawHand => "draw hand",
            Location::OutOfGame => "out of game",
        };
        write!(f, "{}", name)
    }
}
