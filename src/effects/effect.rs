//! The effect container.
//!
//! An [`Effect`] is one live modifier: a source entity, a lifetime, an
//! ordering key, and the bookkeeping of which targets it currently tracks
//! and which of those it is actually applied to. What "applying" means is
//! supplied by the ability layer behind the [`Modifier`] trait; the
//! container only guarantees the lifecycle invariants:
//!
//! - applied targets are always a subset of tracked targets
//! - the modifier is applied only while the effect is active and its
//!   condition holds
//! - every apply is eventually balanced by exactly one unapply
//!
//! Target and applied bookkeeping is mutated exclusively through the
//! engine; callers build an effect, hand it to `EffectEngine::add`, and
//! observe it afterwards only through the read-only queries.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{EntityId, GameState, Location, Phase};
use crate::events::{EventName, GameEvent};

use super::duration::Duration;

/// Unique identifier for a live effect, assigned by the engine at add time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EffectId(pub u32);

impl EffectId {
    /// Create a new effect ID.
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

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// The pluggable behavior of an effect.
///
/// The ability layer implements this per modifier kind; the engine calls
/// `apply` and `unapply` in balanced pairs as targets enter and leave the
/// effect's applied set.
pub trait Modifier {
    /// Apply the modification to one target.
    fn apply(&mut self, target: EntityId, state: &mut GameState);

    /// Reverse the modification on one target.
    fn unapply(&mut self, target: EntityId, state: &mut GameState);
}

/// Stock modifier: add a delta to a state key on each target, reversed on
/// unapply.
///
/// Covers the common "plus/minus N to some stat" abilities without a
/// custom `Modifier` implementation.
#[derive(Clone, Debug)]
pub struct StateModifier {
    key: String,
    delta: i64,
}

impl StateModifier {
    /// Create a state modifier.
    pub fn new(key: impl Into<String>, delta: i64) -> Self {
        Self {
            key: key.into(),
            delta,
        }
    }
}

impl Modifier for StateModifier {
    fn apply(&mut self, target: EntityId, state: &mut GameState) {
        state.modify_state(target, &self.key, self.delta);
    }

    fn unapply(&mut self, target: EntityId, state: &mut GameState) {
        state.modify_state(target, &self.key, -self.delta);
    }
}

/// Which location an effect's retraction scope is tied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LocationScope {
    /// Retract-on-move never applies for context changes.
    Any,
    /// Retract when the source leaves this location.
    From(Location),
}

/// Predicate over game state (conditions, end conditions).
pub type StatePredicate = Box<dyn Fn(&GameState) -> bool>;

/// Predicate deciding whether an entity is a valid target.
pub type TargetPredicate = Box<dyn Fn(EntityId, &GameState) -> bool>;

/// Predicate over a bound event's payload.
pub type UntilPredicate = Box<dyn Fn(&GameEvent) -> bool>;

/// Event name to end-condition predicate, for custom durations.
pub type UntilMap = FxHashMap<EventName, UntilPredicate>;

/// A live modifier tracked by the effect engine.
///
/// Built with the builder methods, then consumed by `EffectEngine::add`:
///
/// ```
/// use frontier_ccg::core::{EntityId, Phase};
/// use frontier_ccg::effects::{Duration, Effect, StateModifier};
///
/// let effect = Effect::new(EntityId(10), StateModifier::new("bullets", 2))
///     .with_order(5)
///     .with_duration(Duration::UntilEndOfPhase)
///     .with_phase(Phase::HighNoon)
///     .matching(|entity, _state| entity == EntityId(12));
///
/// assert_eq!(effect.order(), 5);
/// assert_eq!(effect.duration(), Duration::UntilEndOfPhase);
/// ```
pub struct Effect {
    id: EffectId,
    source: EntityId,
    order: i32,
    duration: Duration,
    location_scope: LocationScope,
    phase_scope: Option<Phase>,
    from_trait: bool,
    explicitly_state_dependent: bool,
    active: bool,
    matcher: Option<TargetPredicate>,
    condition: Option<StatePredicate>,
    ended: Option<StatePredicate>,
    until: UntilMap,
    modifier: Box<dyn Modifier>,
    targets: SmallVec<[EntityId; 4]>,
    applied: SmallVec<[EntityId; 4]>,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("order", &self.order)
            .field("duration", &self.duration)
            .field("active", &self.active)
            .field("targets", &self.targets)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

impl Effect {
    /// Create an effect with a source and a modifier.
    ///
    /// Defaults: `Persistent` duration (created inactive, takes hold at
    /// bulk activation), order 0, play-area location scope, every
    /// universe entity a valid target.
    pub fn new(source: EntityId, modifier: impl Modifier + 'static) -> Self {
        Self {
            id: EffectId(0),
            source,
            order: 0,
            duration: Duration::Persistent,
            location_scope: LocationScope::From(Location::PlayArea),
            phase_scope: None,
            from_trait: false,
            explicitly_state_dependent: false,
            active: false,
            matcher: None,
            condition: None,
            ended: None,
            until: UntilMap::default(),
            modifier: Box::new(modifier),
            targets: SmallVec::new(),
            applied: SmallVec::new(),
        }
    }

    // === Builders ===

    /// Set the ordering key (builder pattern). Effects apply in ascending
    /// order.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set the duration (builder pattern).
    ///
    /// Persistent effects start inactive; every other duration starts
    /// active.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self.active = !duration.is_persistent();
        self
    }

    /// Set the location scope used by retract-on-move (builder pattern).
    #[must_use]
    pub fn with_location_scope(mut self, scope: LocationScope) -> Self {
        self.location_scope = scope;
        self
    }

    /// Restrict phase-scoped retraction to one phase (builder pattern).
    #[must_use]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase_scope = Some(phase);
        self
    }

    /// Mark this effect as originating from a trait-derived ability
    /// (builder pattern). Trait blanking suspends only these.
    #[must_use]
    pub fn from_trait(mut self) -> Self {
        self.from_trait = true;
        self
    }

    /// Set the target validity predicate (builder pattern). Without one,
    /// every universe entity is a valid target.
    #[must_use]
    pub fn matching(mut self, matcher: impl Fn(EntityId, &GameState) -> bool + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Gate application on a game-state condition (builder pattern).
    ///
    /// While the condition is false, targets are still tracked but the
    /// modifier stays unapplied. Makes the effect state-dependent.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Fn(&GameState) -> bool + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Set a game-state end condition (builder pattern). Makes the effect
    /// state-dependent; checked during state-dependent recalculation.
    #[must_use]
    pub fn with_ended(mut self, ended: impl Fn(&GameState) -> bool + 'static) -> Self {
        self.ended = Some(Box::new(ended));
        self
    }

    /// Explicitly mark the effect state-dependent (builder pattern).
    #[must_use]
    pub fn state_dependent(mut self) -> Self {
        self.explicitly_state_dependent = true;
        self
    }

    /// Bind the effect's end to a named event (builder pattern).
    ///
    /// The effect ends when the named event fires and the predicate
    /// accepts its payload. Forces the duration to `Custom`.
    #[must_use]
    pub fn until(
        mut self,
        name: EventName,
        predicate: impl Fn(&GameEvent) -> bool + 'static,
    ) -> Self {
        self.until.insert(name, Box::new(predicate));
        self.duration = Duration::Custom;
        self.active = true;
        self
    }

    // === Queries ===

    /// The engine-assigned identity. Zero until added.
    #[must_use]
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// The entity that created this effect.
    #[must_use]
    pub fn source(&self) -> EntityId {
        self.source
    }

    /// The ordering key.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// The lifetime category.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The location scope used by retract-on-move.
    #[must_use]
    pub fn location_scope(&self) -> LocationScope {
        self.location_scope
    }

    /// The phase restriction for phase-scoped retraction, if any.
    #[must_use]
    pub fn phase_scope(&self) -> Option<Phase> {
        self.phase_scope
    }

    /// Does this effect originate from a trait-derived ability?
    #[must_use]
    pub fn is_from_trait(&self) -> bool {
        self.from_trait
    }

    /// Is the effect currently active (not suspended)?
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Must applicability be re-derived from game state continuously?
    #[must_use]
    pub fn is_state_dependent(&self) -> bool {
        self.explicitly_state_dependent || self.condition.is_some() || self.ended.is_some()
    }

    /// Does the effect carry custom end-condition bindings?
    #[must_use]
    pub fn has_until(&self) -> bool {
        !self.until.is_empty()
    }

    /// The event names the effect's end is bound to.
    pub fn until_events(&self) -> impl Iterator<Item = &EventName> {
        self.until.keys()
    }

    /// Is the effect's source still able to keep it alive?
    #[must_use]
    pub fn is_in_active_location(&self, state: &GameState) -> bool {
        state.is_in_active_location(self.source)
    }

    /// Has the game-state end condition been met?
    #[must_use]
    pub fn has_ended(&self, state: &GameState) -> bool {
        self.ended.as_ref().is_some_and(|ended| ended(state))
    }

    /// Is this entity currently tracked as a target?
    #[must_use]
    pub fn has_target(&self, entity: EntityId) -> bool {
        self.targets.contains(&entity)
    }

    /// Is the modifier currently applied to this entity?
    #[must_use]
    pub fn is_applied_to(&self, entity: EntityId) -> bool {
        self.applied.contains(&entity)
    }

    /// Currently tracked targets, in the order they were picked up.
    #[must_use]
    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    /// Targets the modifier is currently applied to.
    #[must_use]
    pub fn applied_targets(&self) -> &[EntityId] {
        &self.applied
    }

    // === Engine-side lifecycle ===

    pub(crate) fn assign_id(&mut self, id: EffectId) {
        self.id = id;
    }

    /// Evaluate the until-predicate for this specific event, if one is
    /// bound to its name.
    pub(crate) fn until_matches(&self, event: &GameEvent) -> bool {
        self.until
            .get(&event.name)
            .is_some_and(|predicate| predicate(event))
    }

    fn is_valid_target(&self, entity: EntityId, state: &GameState) -> bool {
        self.matcher
            .as_ref()
            .map_or(true, |matcher| matcher(entity, state))
    }

    fn condition_met(&self, state: &GameState) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(state))
    }

    fn apply_to(&mut self, entity: EntityId, state: &mut GameState) {
        self.modifier.apply(entity, state);
        self.applied.push(entity);
    }

    fn unapply_from(&mut self, entity: EntityId, state: &mut GameState) {
        if let Some(index) = self.applied.iter().position(|&e| e == entity) {
            self.applied.remove(index);
            self.modifier.unapply(entity, state);
        }
    }

    /// Diff candidates into the target set, applying to new valid targets
    /// when the effect is live.
    pub(crate) fn add_targets(&mut self, state: &mut GameState, candidates: &[EntityId]) {
        let fresh: Vec<EntityId> = candidates
            .iter()
            .copied()
            .filter(|&entity| !self.targets.contains(&entity) && self.is_valid_target(entity, state))
            .collect();

        let should_apply = self.active && self.condition_met(state);
        for entity in fresh {
            self.targets.push(entity);
            if should_apply {
                self.apply_to(entity, state);
            }
        }
    }

    /// Drop targets the matcher no longer accepts, unapplying as needed.
    pub(crate) fn clear_invalid_targets(&mut self, state: &mut GameState) {
        let stale: Vec<EntityId> = self
            .targets
            .iter()
            .copied()
            .filter(|&entity| !self.is_valid_target(entity, state))
            .collect();

        for entity in stale {
            self.unapply_from(entity, state);
            self.targets.retain(|e| *e != entity);
        }
    }

    /// Reconcile the applied set with the current activity and condition.
    pub(crate) fn update_applied_targets(&mut self, state: &mut GameState) {
        let should_apply = self.active && self.condition_met(state);
        let targets: Vec<EntityId> = self.targets.to_vec();

        for entity in targets {
            let applied = self.applied.contains(&entity);
            if should_apply && !applied {
                self.apply_to(entity, state);
            } else if !should_apply && applied {
                self.unapply_from(entity, state);
            }
        }
    }

    /// Full re-diff against a fresh universe: drop invalid targets, pick
    /// up new ones, reconcile applied state.
    pub(crate) fn reapply(&mut self, state: &mut GameState, universe: &[EntityId]) {
        self.clear_invalid_targets(state);
        self.add_targets(state, universe);
        self.update_applied_targets(state);
    }

    /// Suspend or resume the effect.
    ///
    /// Suspension unapplies everything but keeps the effect live; resuming
    /// re-diffs against the provided universe.
    pub(crate) fn set_active(&mut self, active: bool, state: &mut GameState, universe: &[EntityId]) {
        let was_active = self.active;
        self.active = active;

        if was_active && !active {
            self.unapply_all(state);
        } else if !was_active && active {
            self.add_targets(state, universe);
            self.update_applied_targets(state);
        }
    }

    /// Unapply everything and forget all targets. The effect is about to
    /// leave the live list.
    pub(crate) fn cancel(&mut self, state: &mut GameState) {
        self.unapply_all(state);
        self.targets.clear();
    }

    fn unapply_all(&mut self, state: &mut GameState) {
        let applied: Vec<EntityId> = self.applied.to_vec();
        for entity in applied {
            self.unapply_from(entity, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardInstance};
    use crate::core::PlayerId;

    fn state_with_cards(locations: &[Location]) -> (GameState, Vec<EntityId>) {
        let mut state = GameState::new(2);
        let cards = locations
            .iter()
            .map(|&location| {
                let entity = state.alloc_entity();
                state.add_card(CardInstance::new(
                    entity,
                    CardId::new(1),
                    PlayerId::new(0),
                    location,
                ));
                entity
            })
            .collect();
        (state, cards)
    }

    #[test]
    fn test_defaults() {
        let effect = Effect::new(EntityId(10), StateModifier::new("bullets", 1));

        assert_eq!(effect.id(), EffectId(0));
        assert_eq!(effect.order(), 0);
        assert_eq!(effect.duration(), Duration::Persistent);
        assert!(!effect.is_active()); // Persistent effects start inactive
        assert!(!effect.is_state_dependent());
        assert!(!effect.has_until());
    }

    #[test]
    fn test_non_persistent_starts_active() {
        let effect = Effect::new(EntityId(10), StateModifier::new("bullets", 1))
            .with_duration(Duration::UntilEndOfRound);

        assert!(effect.is_active());
    }

    #[test]
    fn test_until_forces_custom_duration() {
        let effect = Effect::new(EntityId(10), StateModifier::new("bullets", 1))
            .until(EventName::custom("onBountyPaid"), |event| {
                event.value(0, 0) >= 1
            });

        assert_eq!(effect.duration(), Duration::Custom);
        assert!(effect.is_active());
        assert!(effect.has_until());
    }

    #[test]
    fn test_state_dependence_derivation() {
        let plain = Effect::new(EntityId(10), StateModifier::new("bullets", 1));
        assert!(!plain.is_state_dependent());

        let conditional = Effect::new(EntityId(10), StateModifier::new("bullets", 1))
            .with_condition(|_| true);
        assert!(conditional.is_state_dependent());

        let ending = Effect::new(EntityId(10), StateModifier::new("bullets", 1))
            .with_ended(|_| false);
        assert!(ending.is_state_dependent());

        let explicit =
            Effect::new(EntityId(10), StateModifier::new("bullets", 1)).state_dependent();
        assert!(explicit.is_state_dependent());
    }

    #[test]
    fn test_add_targets_applies_when_active() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea, Location::PlayArea]);
        let mut effect = Effect::new(cards[0], StateModifier::new("bullets", 2))
            .with_duration(Duration::UntilEndOfRound);

        effect.add_targets(&mut state, &cards.clone());

        assert!(effect.has_target(cards[0]));
        assert!(effect.is_applied_to(cards[1]));
        assert_eq!(state.get_state(cards[1], "bullets", 0), 2);

        // Re-adding the same candidates is a no-op
        effect.add_targets(&mut state, &cards);
        assert_eq!(state.get_state(cards[1], "bullets", 0), 2);
        assert_eq!(effect.targets().len(), 2);
    }

    #[test]
    fn test_add_targets_inactive_tracks_without_applying() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea]);
        let mut effect = Effect::new(EntityId(50), StateModifier::new("bullets", 2));
        assert!(!effect.is_active());

        effect.add_targets(&mut state, &cards);

        assert!(effect.has_target(cards[0]));
        assert!(!effect.is_applied_to(cards[0]));
        assert_eq!(state.get_state(cards[0], "bullets", 0), 0);
    }

    #[test]
    fn test_matcher_restricts_targets() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea, Location::Hand]);
        let in_play_only = cards[0];
        let mut effect = Effect::new(EntityId(50), StateModifier::new("bullets", 1))
            .with_duration(Duration::UntilEndOfRound)
            .matching(|entity, state| {
                state
                    .card(entity)
                    .is_some_and(|card| card.location == Location::PlayArea)
            });

        effect.add_targets(&mut state, &cards.clone());

        assert!(effect.has_target(in_play_only));
        assert!(!effect.has_target(cards[1]));
    }

    #[test]
    fn test_clear_invalid_targets_unapplies() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea]);
        let mut effect = Effect::new(EntityId(50), StateModifier::new("bullets", 1))
            .with_duration(Duration::UntilEndOfRound)
            .matching(|entity, state| {
                state
                    .card(entity)
                    .is_some_and(|card| card.location == Location::PlayArea)
            });

        effect.add_targets(&mut state, &cards.clone());
        assert_eq!(state.get_state(cards[0], "bullets", 0), 1);

        state.move_card(cards[0], Location::DiscardPile);
        effect.clear_invalid_targets(&mut state);

        assert!(!effect.has_target(cards[0]));
        assert_eq!(state.get_state(cards[0], "bullets", 0), 0);
    }

    #[test]
    fn test_condition_gates_application() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea]);
        let mut effect = Effect::new(EntityId(50), StateModifier::new("bullets", 1))
            .with_duration(Duration::UntilEndOfRound)
            .with_condition(|state| state.shootout().is_some());

        // No shootout: tracked but not applied
        effect.add_targets(&mut state, &cards.clone());
        assert!(effect.has_target(cards[0]));
        assert!(!effect.is_applied_to(cards[0]));

        // Shootout starts: reconciliation applies
        state.begin_shootout();
        effect.update_applied_targets(&mut state);
        assert!(effect.is_applied_to(cards[0]));
        assert_eq!(state.get_state(cards[0], "bullets", 0), 1);

        // Shootout ends: reconciliation unapplies
        state.end_shootout();
        effect.update_applied_targets(&mut state);
        assert!(!effect.is_applied_to(cards[0]));
        assert_eq!(state.get_state(cards[0], "bullets", 0), 0);
    }

    #[test]
    fn test_set_active_suspend_resume() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea]);
        let universe = cards.clone();
        let mut effect = Effect::new(EntityId(50), StateModifier::new("bullets", 3))
            .with_duration(Duration::UntilEndOfRound);

        effect.add_targets(&mut state, &universe);
        assert_eq!(state.get_state(cards[0], "bullets", 0), 3);

        effect.set_active(false, &mut state, &universe);
        assert!(!effect.is_active());
        assert_eq!(state.get_state(cards[0], "bullets", 0), 0);

        effect.set_active(true, &mut state, &universe);
        assert!(effect.is_active());
        assert_eq!(state.get_state(cards[0], "bullets", 0), 3);
    }

    #[test]
    fn test_cancel_unapplies_and_forgets() {
        let (mut state, cards) = state_with_cards(&[Location::PlayArea]);
        let mut effect = Effect::new(EntityId(50), StateModifier::new("bullets", 2))
            .with_duration(Duration::UntilEndOfRound);

        effect.add_targets(&mut state, &cards.clone());
        effect.cancel(&mut state);

        assert!(effect.targets().is_empty());
        assert!(effect.applied_targets().is_empty());
        assert_eq!(state.get_state(cards[0], "bullets", 0), 0);
    }

    #[test]
    fn test_until_matches_specific_event() {
        let effect = Effect::new(EntityId(10), StateModifier::new("bullets", 1))
            .until(EventName::custom("onBountyPaid"), |event| {
                event.value(0, 0) >= 1
            });

        let low = GameEvent::custom("onBountyPaid").with_value(0);
        let high = GameEvent::custom("onBountyPaid").with_value(1);
        let other = GameEvent::custom("onSomethingElse").with_value(5);

        assert!(!effect.until_matches(&low));
        assert!(effect.until_matches(&high));
        assert!(!effect.until_matches(&other));
    }

    #[test]
    fn test_has_ended() {
        let mut state = GameState::new(2);
        let effect = Effect::new(EntityId(10), StateModifier::new("bullets", 1))
            .with_ended(|state| state.shootout().is_none());

        assert!(effect.has_ended(&state));
        state.begin_shootout();
        assert!(!effect.has_ended(&state));
    }
}
