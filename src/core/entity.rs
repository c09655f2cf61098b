//! Entity identification system.
//!
//! Every object that can give or receive effects (player, card, the game
//! itself, an in-progress shootout) has a unique `EntityId`.
//!
//! ## ID Layout
//!
//! IDs are allocated as follows:
//! - `0..player_count`: Reserved for players
//! - `player_count..`: The game entity, cards, and the shootout entity,
//!   allocated by `GameState` in creation order
//!
//! This layout is configured per-game via `player_count`, not hardcoded.
//!
//! ## Usage
//!
//! ```
//! use frontier_ccg::core::EntityId;
//!
//! let player_count = 2;
//!
//! // Player entity IDs
//! let player_0 = EntityId::player_id(0);
//! let player_1 = EntityId::player_id(1);
//!
//! assert!(player_0.is_player(player_count));
//! assert!(player_1.is_player(player_count));
//!
//! // Card entity ID (allocated by the game state)
//! let card = EntityId(10);
//! assert!(!card.is_player(player_count));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any game entity.
///
/// Players, cards, the game object, and the shootout all have EntityIds.
/// Use `is_player(player_count)` to check if an ID refers to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID for a player by index.
    ///
    /// Player indices are 0-based: player 0, player 1, etc.
    #[must_use]
    pub const fn player_id(index: u8) -> Self {
        Self(index as u32)
    }

    /// Get the first entity ID available for non-player entities.
    ///
    /// In a game with `player_count` players, entity IDs 0..player_count
    /// are reserved for players. This returns `player_count` as the first
    /// available ID for the game entity, cards, etc.
    #[must_use]
    pub const fn first_non_player(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Check if this entity ID refers to a player.
    ///
    /// Player IDs are 0..player_count. This requires knowing the player count.
    ///
    /// ```
    /// use frontier_ccg::core::EntityId;
    ///
    /// let id = EntityId(1);
    /// assert!(id.is_player(2));  // Valid player in 2-player game
    /// assert!(!id.is_player(1)); // NOT valid in 1-player game (only player 0)
    /// ```
    #[must_use]
    pub const fn is_player(self, player_count: usize) -> bool {
        self.0 < player_count as u32
    }

    /// Convert to player index if this is a player entity.
    ///
    /// Returns `Some(index)` if this is a valid player ID, `None` otherwise.
    #[must_use]
    pub const fn as_player_index(self, player_count: usize) -> Option<u8> {
        if self.is_player(player_count) {
            Some(self.0 as u8)
        } else {
            None
        }
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Convert to PlayerId if this is a player entity.
    ///
    /// ```
    /// use frontier_ccg::core::{EntityId, PlayerId};
    ///
    /// let player = EntityId(1);
    /// assert_eq!(player.as_player(2), Some(PlayerId::new(1)));
    /// assert_eq!(player.as_player(1), None); // Not a player in 1-player game
    /// ```
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<super::PlayerId> {
        self.as_player_index(player_count).map(super::PlayerId::new)
    }

    /// Create entity ID for a player.
    ///
    /// Convenience method that takes a PlayerId instead of a raw index.
    #[must_use]
    pub const fn player(id: super::PlayerId) -> Self {
        Self(id.0 as u32)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
