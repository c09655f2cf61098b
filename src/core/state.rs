//! Game state snapshot.
//!
//! `GameState` is the queryable view the effect engine works against:
//! every card with its location and dirty flag, the set of players with
//! their window-scoped bookkeeping, the current phase, the optional
//! in-progress shootout, and the game entity itself.
//!
//! The engine never mutates game structure (it does not move cards or
//! change controllers); it reads eligibility and writes effect state
//! through the uniform entity-state accessors. Structure mutations are
//! made by the surrounding action pipeline, which then raises the
//! matching events.

use rustc_hash::FxHashMap;

use super::entity::EntityId;
use super::location::Location;
use super::phase::Phase;
use super::player::{PlayerFlags, PlayerId, PlayerMap};
use crate::cards::CardInstance;

/// Complete game state for one running game instance.
#[derive(Clone, Debug)]
pub struct GameState {
    player_count: usize,

    /// Current phase.
    phase: Phase,

    /// Per-player window-scoped bookkeeping.
    players: PlayerMap<PlayerFlags>,

    /// Card instances by entity ID.
    cards: FxHashMap<EntityId, CardInstance>,

    /// State maps for non-card entities (players, the game, the shootout).
    entity_state: FxHashMap<EntityId, FxHashMap<String, i64>>,

    /// The entity representing the game itself.
    game_entity: EntityId,

    /// The active shootout entity, if a shootout is in progress.
    shootout: Option<EntityId>,

    /// Next entity ID to allocate.
    next_entity_id: u32,
}

impl GameState {
    /// Create a new game state.
    ///
    /// The game entity is allocated immediately; it always exists and is
    /// always an eligible effect target.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        let mut state = Self {
            player_count,
            phase: Phase::Setup,
            players: PlayerMap::with_default(player_count),
            cards: FxHashMap::default(),
            entity_state: FxHashMap::default(),
            game_entity: EntityId(0),
            shootout: None,
            next_entity_id: EntityId::first_non_player(player_count),
        };
        state.game_entity = state.alloc_entity();
        state
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    /// Get the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set the current phase.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    // === Entity Management ===

    /// Allocate a new entity ID.
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// The entity representing the game itself.
    #[must_use]
    pub fn game_entity(&self) -> EntityId {
        self.game_entity
    }

    /// The active shootout entity, if any.
    #[must_use]
    pub fn shootout(&self) -> Option<EntityId> {
        self.shootout
    }

    /// Start a shootout, allocating its entity.
    ///
    /// Returns the existing entity unchanged if a shootout is already in
    /// progress.
    pub fn begin_shootout(&mut self) -> EntityId {
        if let Some(entity) = self.shootout {
            return entity;
        }
        let entity = self.alloc_entity();
        self.shootout = Some(entity);
        entity
    }

    /// End the active shootout, discarding its entity state.
    pub fn end_shootout(&mut self) {
        if let Some(entity) = self.shootout.take() {
            self.entity_state.remove(&entity);
        }
    }

    // === Cards ===

    /// Add a card instance.
    ///
    /// Panics if the entity is already present.
    pub fn add_card(&mut self, card: CardInstance) {
        let entity_id = card.entity_id;
        if self.cards.insert(entity_id, card).is_some() {
            panic!("Entity {} already exists in game state", entity_id);
        }
    }

    /// Get a card instance.
    #[must_use]
    pub fn card(&self, entity_id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&entity_id)
    }

    /// Get a mutable card instance.
    pub fn card_mut(&mut self, entity_id: EntityId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&entity_id)
    }

    /// Iterate over all card instances.
    pub fn all_cards(&self) -> impl Iterator<Item = &CardInstance> {
        self.cards.values()
    }

    /// Move a card to a new location.
    ///
    /// Returns the prior location, or `None` if the entity is not a card.
    pub fn move_card(&mut self, entity_id: EntityId, to: Location) -> Option<Location> {
        let card = self.cards.get_mut(&entity_id)?;
        let from = card.location;
        card.location = to;
        Some(from)
    }

    /// Change a card's controller.
    ///
    /// Returns the prior controller, or `None` if the entity is not a card.
    pub fn take_control(&mut self, entity_id: EntityId, controller: PlayerId) -> Option<PlayerId> {
        let card = self.cards.get_mut(&entity_id)?;
        let prior = card.controller;
        card.set_controller(controller);
        Some(prior)
    }

    // === Dirty tracking ===

    /// Flag a card for the next recalculation pass. No-op for non-cards.
    pub fn mark_dirty(&mut self, entity_id: EntityId) {
        if let Some(card) = self.cards.get_mut(&entity_id) {
            card.mark_dirty();
        }
    }

    /// Clear a card's recalculation flag. No-op for non-cards.
    pub fn clear_dirty(&mut self, entity_id: EntityId) {
        if let Some(card) = self.cards.get_mut(&entity_id) {
            card.clear_dirty();
        }
    }

    /// All cards currently flagged dirty.
    #[must_use]
    pub fn dirty_cards(&self) -> Vec<EntityId> {
        let mut dirty: Vec<EntityId> = self
            .cards
            .values()
            .filter(|card| card.dirty)
            .map(|card| card.entity_id)
            .collect();
        dirty.sort_by_key(|entity| entity.raw());
        dirty
    }

    // === Effect eligibility ===

    /// Can this entity keep effects alive as a source?
    ///
    /// Cards must occupy an active location; players, the game entity, and
    /// the live shootout always qualify. Unknown entities never do.
    #[must_use]
    pub fn is_in_active_location(&self, entity_id: EntityId) -> bool {
        if let Some(card) = self.cards.get(&entity_id) {
            return card.location.is_active();
        }
        entity_id.is_player(self.player_count)
            || entity_id == self.game_entity
            || self.shootout == Some(entity_id)
    }

    // === Entity state ===

    /// Get a state value for any entity, with a default.
    ///
    /// Cards resolve through their own state map; players, the game, and
    /// the shootout share the auxiliary entity-state table.
    #[must_use]
    pub fn get_state(&self, entity_id: EntityId, key: &str, default: i64) -> i64 {
        if let Some(card) = self.cards.get(&entity_id) {
            return card.get_state(key, default);
        }
        self.entity_state
            .get(&entity_id)
            .and_then(|map| map.get(key))
            .copied()
            .unwrap_or(default)
    }

    /// Set a state value for any entity.
    pub fn set_state(&mut self, entity_id: EntityId, key: impl Into<String>, value: i64) {
        if let Some(card) = self.cards.get_mut(&entity_id) {
            card.set_state(key, value);
            return;
        }
        self.entity_state
            .entry(entity_id)
            .or_default()
            .insert(key.into(), value);
    }

    /// Modify a state value for any entity by delta.
    pub fn modify_state(&mut self, entity_id: EntityId, key: &str, delta: i64) {
        let current = self.get_state(entity_id, key, 0);
        self.set_state(entity_id, key.to_string(), current + delta);
    }

    // === Player bookkeeping ===

    /// Get a player's window-scoped bookkeeping.
    #[must_use]
    pub fn player_flags(&self, player: PlayerId) -> &PlayerFlags {
        &self.players[player]
    }

    /// Record one cheatin' resolution use for a player.
    pub fn note_cheatin_resolution(&mut self, player: PlayerId) {
        self.players[player].note_cheatin_resolution();
    }

    /// Reset every player's window-scoped bookkeeping.
    pub fn reset_cheatin_res_info(&mut self) {
        for (_, flags) in self.players.iter_mut() {
            flags.reset_cheatin_res_info();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;

    fn card_in(state: &mut GameState, location: Location) -> EntityId {
        let entity = state.alloc_entity();
        state.add_card(CardInstance::new(
            entity,
            CardId::new(1),
            PlayerId::new(0),
            location,
        ));
        entity
    }

    #[test]
    fn test_game_state_new() {
        let state = GameState::new(2);

        assert_eq!(state.player_count(), 2);
        assert_eq!(state.phase(), Phase::Setup);
        assert_eq!(state.game_entity(), EntityId(2)); // First non-player
        assert!(state.shootout().is_none());
    }

    #[test]
    fn test_alloc_entity() {
        let mut state = GameState::new(2);

        let e1 = state.alloc_entity();
        let e2 = state.alloc_entity();

        assert_eq!(e1.0, 3); // Game entity took 2
        assert_eq!(e2.0, 4);
    }

    #[test]
    fn test_shootout_lifecycle() {
        let mut state = GameState::new(2);

        let shootout = state.begin_shootout();
        assert_eq!(state.shootout(), Some(shootout));

        // Starting again returns the same entity
        assert_eq!(state.begin_shootout(), shootout);

        state.set_state(shootout, "casualties", 2);
        state.end_shootout();
        assert!(state.shootout().is_none());
        assert_eq!(state.get_state(shootout, "casualties", 0), 0);
    }

    #[test]
    fn test_move_card() {
        let mut state = GameState::new(2);
        let card = card_in(&mut state, Location::Hand);

        let prior = state.move_card(card, Location::PlayArea);
        assert_eq!(prior, Some(Location::Hand));
        assert_eq!(state.card(card).unwrap().location, Location::PlayArea);

        assert_eq!(state.move_card(EntityId(99), Location::Hand), None);
    }

    #[test]
    fn test_take_control() {
        let mut state = GameState::new(2);
        let card = card_in(&mut state, Location::PlayArea);

        let prior = state.take_control(card, PlayerId::new(1));
        assert_eq!(prior, Some(PlayerId::new(0)));
        assert!(state.card(card).unwrap().is_taken_over());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut state = GameState::new(2);
        let c1 = card_in(&mut state, Location::PlayArea);
        let c2 = card_in(&mut state, Location::Hand);

        assert!(state.dirty_cards().is_empty());

        state.mark_dirty(c1);
        state.mark_dirty(c2);
        assert_eq!(state.dirty_cards(), vec![c1, c2]);

        state.clear_dirty(c1);
        assert_eq!(state.dirty_cards(), vec![c2]);
    }

    #[test]
    fn test_active_location_check() {
        let mut state = GameState::new(2);
        let in_play = card_in(&mut state, Location::PlayArea);
        let in_hand = card_in(&mut state, Location::Hand);

        assert!(state.is_in_active_location(in_play));
        assert!(!state.is_in_active_location(in_hand));

        // Players and the game entity are always active sources
        assert!(state.is_in_active_location(EntityId::player(PlayerId::new(0))));
        assert!(state.is_in_active_location(state.game_entity()));

        // Unknown entities are not
        assert!(!state.is_in_active_location(EntityId(99)));

        let shootout = state.begin_shootout();
        assert!(state.is_in_active_location(shootout));
    }

    #[test]
    fn test_entity_state_routing() {
        let mut state = GameState::new(2);
        let card = card_in(&mut state, Location::PlayArea);
        let player = EntityId::player(PlayerId::new(1));
        let game = state.game_entity();

        state.modify_state(card, "bullets", 2);
        state.modify_state(player, "hand_rank", 1);
        state.modify_state(game, "sundown_delayed", 1);

        assert_eq!(state.get_state(card, "bullets", 0), 2);
        assert_eq!(state.card(card).unwrap().get_state("bullets", 0), 2);
        assert_eq!(state.get_state(player, "hand_rank", 0), 1);
        assert_eq!(state.get_state(game, "sundown_delayed", 0), 1);
    }

    #[test]
    fn test_cheatin_res_bookkeeping() {
        let mut state = GameState::new(2);

        state.note_cheatin_resolution(PlayerId::new(0));
        state.note_cheatin_resolution(PlayerId::new(1));
        state.note_cheatin_resolution(PlayerId::new(1));

        assert_eq!(state.player_flags(PlayerId::new(0)).cheatin_resolutions, 1);
        assert_eq!(state.player_flags(PlayerId::new(1)).cheatin_resolutions, 2);

        state.reset_cheatin_res_info();
        assert_eq!(state.player_flags(PlayerId::new(0)).cheatin_resolutions, 0);
        assert_eq!(state.player_flags(PlayerId::new(1)).cheatin_resolutions, 0);
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_duplicate_card_panics() {
        let mut state = GameState::new(2);
        let entity = state.alloc_entity();

        let card = CardInstance::new(entity, CardId::new(1), PlayerId::new(0), Location::Hand);
        state.add_card(card.clone());
        state.add_card(card);
    }
}
