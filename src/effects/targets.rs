//! Target universe provider.
//!
//! Computes the set of entities eligible to receive effects right now.
//! Pure function of game state; recomputed fresh on every insertion and
//! every recalculation, never cached across mutations.

use crate::core::{EntityId, GameState};

/// Every entity an effect may legally target at this moment: cards in
/// tracked locations (in id order, for determinism), the active shootout
/// if one is in progress, every player, and the game entity itself.
#[must_use]
pub fn target_universe(state: &GameState) -> Vec<EntityId> {
    let mut universe: Vec<EntityId> = state
        .all_cards()
        .filter(|card| card.location.is_tracked())
        .map(|card| card.entity_id)
        .collect();
    universe.sort_by_key(|entity| entity.raw());

    if let Some(shootout) = state.shootout() {
        universe.push(shootout);
    }

    universe.extend(state.player_ids().map(EntityId::player));
    universe.push(state.game_entity());
    universe
}
