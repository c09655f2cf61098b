//! Card instances - runtime card state.
//!
//! `CardInstance` represents a specific card in a game at a specific
//! moment: where it is, who owns and controls it, whether a
//! recalculation-relevant attribute changed since the last settle pass,
//! and a mutable state map that effect modifiers act on.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::entity::EntityId;
use crate::core::location::Location;
use crate::core::player::PlayerId;

/// Identifier for a printed card (the catalog entry an instance was made
/// from). The catalog itself lives outside this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// A card instance in a game.
///
/// ## State Values (i64 only)
///
/// The `state` field uses `FxHashMap<String, i64>`. To store non-integer
/// values:
/// - Booleans: use 0/1
/// - Entity references: use EntityId.0 as i64
/// - Enums: use discriminant values
///
/// ## Dirty flag
///
/// Game-state mutation code sets `dirty` when an eligibility-relevant
/// attribute changes; the effect engine's deferred recalculation pass
/// clears it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    /// Reference to the printed card.
    pub card_id: CardId,

    /// Owner (who brought this card to the game).
    pub owner: PlayerId,

    /// Controller (who currently controls it).
    pub controller: PlayerId,

    /// Current location.
    pub location: Location,

    /// Eligibility-relevant attributes changed since the last settle pass.
    pub dirty: bool,

    /// Mutable instance state (bullet bonuses, control points, etc.)
    #[serde(default)]
    pub state: FxHashMap<String, i64>,
}

impl CardInstance {
    /// Create a card instance.
    #[must_use]
    pub fn new(entity_id: EntityId, card_id: CardId, owner: PlayerId, location: Location) -> Self {
        Self {
            entity_id,
            card_id,
            owner,
            controller: owner,
            location,
            dirty: false,
            state: FxHashMap::default(),
        }
    }

    /// Set the controller.
    pub fn set_controller(&mut self, controller: PlayerId) {
        self.controller = controller;
    }

    /// Did the controller diverge from the owner?
    #[must_use]
    pub fn is_taken_over(&self) -> bool {
        self.controller != self.owner
    }

    /// Flag this card for the next recalculation pass.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the recalculation flag.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Get a state value with a default.
    #[must_use]
    pub fn get_state(&self, key: &str, default: i64) -> i64 {
        self.state.get(key).copied().unwrap_or(default)
    }

    /// Set a state value.
    pub fn set_state(&mut self, key: impl Into<String>, value: i64) {
        self.state.insert(key.into(), value);
    }

    /// Modify a state value by delta.
    pub fn modify_state(&mut self, key: &str, delta: i64) {
        let current = self.get_state(key, 0);
        self.state.insert(key.to_string(), current + delta);
    }

    /// Check if a state flag is set (non-zero).
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.get_state(key, 0) != 0
    }

    /// Set a boolean flag (1 for true, 0 for false).
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set_state(key, if value { 1 } else { 0 });
    }

    /// Clear all state (e.g., when card changes locations).
    pub fn clear_state(&mut self) {
        self.state.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> CardInstance {
        CardInstance::new(
            EntityId(10),
            CardId::new(1),
            PlayerId::new(0),
            Location::PlayArea,
        )
    }

    #[test]
    fn test_card_instance_new() {
        let instance = sample_card();

        assert_eq!(instance.entity_id, EntityId(10));
        assert_eq!(instance.card_id, CardId::new(1));
        assert_eq!(instance.owner, PlayerId::new(0));
        assert_eq!(instance.controller, PlayerId::new(0));
        assert_eq!(instance.location, Location::PlayArea);
        assert!(!instance.dirty);
    }

    #[test]
    fn test_card_instance_state() {
        let mut instance = sample_card();

        assert_eq!(instance.get_state("bullets", 0), 0);

        instance.set_state("bullets", 3);
        assert_eq!(instance.get_state("bullets", 0), 3);

        instance.modify_state("bullets", -2);
        assert_eq!(instance.get_state("bullets", 0), 1);
    }

    #[test]
    fn test_card_instance_flags() {
        let mut instance = sample_card();

        assert!(!instance.has_flag("booted"));

        instance.set_flag("booted", true);
        assert!(instance.has_flag("booted"));

        instance.set_flag("booted", false);
        assert!(!instance.has_flag("booted"));
    }

    #[test]
    fn test_card_instance_dirty_flag() {
        let mut instance = sample_card();

        instance.mark_dirty();
        assert!(instance.dirty);

        instance.clear_dirty();
        assert!(!instance.dirty);
    }

    #[test]
    fn test_card_instance_controller_change() {
        let mut instance = sample_card();

        assert!(!instance.is_taken_over());

        instance.set_controller(PlayerId::new(1));
        assert!(instance.is_taken_over());
        assert_eq!(instance.owner, PlayerId::new(0)); // Owner unchanged
    }

    #[test]
    fn test_card_instance_serialization() {
        let mut instance = sample_card();
        instance.set_state("bullets", 3);

        let json = serde_json::to_string(&instance).unwrap();
        let deserialized: CardInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(instance, deserialized);
    }
}
