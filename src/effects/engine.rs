//! The effect engine.
//!
//! Owns the ordered list of every live effect and mediates every
//! lifecycle transition: insertion, deferred recalculation, suspension,
//! and retraction. It is the only component that may mutate the live
//! list, the custom-duration bindings, or the recalculation guard set;
//! other subsystems add effects through [`EffectEngine::add`] and
//! otherwise influence it only by raising events.
//!
//! ## Event routing
//!
//! All events funnel through [`EffectEngine::handle_event`], which routes
//! the closed lifecycle variants through an exhaustive match and then
//! checks every event (lifecycle or custom) against the registered
//! custom-duration bindings.
//!
//! ## Deferred work
//!
//! `recalculate_dirty_targets` and `reapply_state_dependent_effects`
//! never recalculate inline; they enqueue [`EngineStep`]s for the game
//! loop to hand back via [`EffectEngine::run_step`] once the current
//! mutation settles.

use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::core::{BlankKind, EntityId, GameState, PlayWindow};
use crate::events::{EventName, GameEvent};

use super::bindings::CustomDurationBindings;
use super::duration::Duration;
use super::effect::{Effect, EffectId, LocationScope};
use super::steps::{EngineStep, StepQueue};
use super::targets::target_universe;

/// Orchestrator for every live effect in one running game.
#[derive(Debug)]
pub struct EffectEngine {
    /// The live list, kept sorted ascending by order (stable for ties).
    effects: Vec<Effect>,

    /// Custom-duration subscriptions, one record per (event, effect).
    bindings: CustomDurationBindings,

    /// State-dependent effects with an in-flight recalculation.
    recalculating: FxHashSet<EffectId>,

    /// Next effect ID to assign.
    next_id: u32,
}

impl EffectEngine {
    /// Create an engine with no live effects.
    #[must_use]
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            bindings: CustomDurationBindings::new(),
            recalculating: FxHashSet::default(),
            next_id: 1,
        }
    }

    // === Insertion ===

    /// Insert one effect.
    ///
    /// Returns `None` without any state change if the effect's source is
    /// not in an active location - an expected, frequent occurrence in
    /// normal play, not an error. Otherwise the effect joins the live
    /// list (which is re-sorted by order), is immediately diffed against
    /// the full target universe, and has its custom-duration bindings
    /// registered if it carries any.
    pub fn add(&mut self, mut effect: Effect, state: &mut GameState) -> Option<EffectId> {
        if !effect.is_in_active_location(state) {
            trace!("dropping effect from inactive source {}", effect.source());
            return None;
        }

        let id = EffectId::new(self.next_id);
        self.next_id += 1;
        effect.assign_id(id);

        let needs_binding = effect.duration() == Duration::Custom || effect.has_until();
        debug!(
            "adding {} from {} (order {}, {:?})",
            id,
            effect.source(),
            effect.order(),
            effect.duration()
        );

        self.effects.push(effect);
        // Stable sort: equal orders keep insertion order.
        self.effects.sort_by_key(|effect| effect.order());

        let universe = target_universe(state);
        if let Some(index) = self.index_of(id) {
            self.effects[index].add_targets(state, &universe);
            if needs_binding {
                self.bindings.register(&self.effects[index]);
            }
        }

        Some(id)
    }

    /// Insert a batch created by one rule resolution.
    ///
    /// The batch is sorted by order first so its members respect the
    /// global ordering invariant relative to each other regardless of
    /// creation order.
    pub fn add_simultaneous(
        &mut self,
        effects: Vec<Effect>,
        state: &mut GameState,
    ) -> Vec<EffectId> {
        let mut batch = effects;
        batch.sort_by_key(|effect| effect.order());
        batch
            .into_iter()
            .filter_map(|effect| self.add(effect, state))
            .collect()
    }

    // === Deferred recalculation ===

    /// Schedule a re-diff of every live effect against the cards flagged
    /// dirty.
    ///
    /// No-op when nothing is dirty: no step is enqueued and no flag is
    /// cleared. The dirty set is captured now; flags are cleared when the
    /// step runs, after all synchronous mutation in the current game step
    /// has settled.
    pub fn recalculate_dirty_targets(&self, state: &GameState, steps: &mut StepQueue) {
        let dirty = state.dirty_cards();
        if dirty.is_empty() {
            return;
        }

        trace!("deferring recalculation for {} dirty cards", dirty.len());
        steps.push(EngineStep::RecalculateDirty { cards: dirty });
    }

    /// Schedule re-evaluation of state-dependent effects.
    ///
    /// Selects the state-dependent effects with no in-flight
    /// recalculation and enqueues two steps: one that re-evaluates them
    /// (cancelling any whose end condition now holds), and a later one
    /// that releases them from the guard set. Guard entries are taken at
    /// enqueue time, so calling this again before the steps run selects
    /// nothing. Re-entrant evaluation is thereby deferred to the next
    /// logical step, not suppressed.
    pub fn reapply_state_dependent_effects(&mut self, steps: &mut StepQueue) {
        let selected: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|effect| {
                effect.is_state_dependent() && !self.recalculating.contains(&effect.id())
            })
            .map(Effect::id)
            .collect();

        if selected.is_empty() {
            return;
        }

        trace!("deferring reapply for {} state-dependent effects", selected.len());
        self.recalculating.extend(selected.iter().copied());
        steps.push(EngineStep::ReapplyStateDependent {
            effects: selected.clone(),
        });
        steps.push(EngineStep::ClearRecalculationGuard { effects: selected });
    }

    /// Execute one deferred step. Called by the game loop, in queue order.
    pub fn run_step(&mut self, step: EngineStep, state: &mut GameState) {
        match step {
            EngineStep::RecalculateDirty { cards } => {
                for &card in &cards {
                    state.clear_dirty(card);
                }

                for effect in &mut self.effects {
                    effect.clear_invalid_targets(state);
                    effect.add_targets(state, &cards);
                    effect.update_applied_targets(state);
                }
            }

            EngineStep::ReapplyStateDependent { effects } => {
                for id in effects {
                    // The effect may have been retracted since selection.
                    let Some(index) = self.index_of(id) else {
                        continue;
                    };

                    if self.effects[index].has_ended(state) {
                        debug!("{} ended during recalculation", id);
                        let mut effect = self.effects.remove(index);
                        effect.cancel(state);
                        self.bindings.unregister(id);
                    } else {
                        let universe = target_universe(state);
                        self.effects[index].reapply(state, &universe);
                    }
                }
            }

            EngineStep::ClearRecalculationGuard { effects } => {
                for id in &effects {
                    self.recalculating.remove(id);
                }
            }
        }
    }

    // === Activation ===

    /// Bulk-activate every persistent effect against the full universe.
    ///
    /// Called once when the game transitions into a state where
    /// persistent effects take hold (setup completion).
    pub fn activate_persistent_effects(&mut self, state: &mut GameState) {
        let universe = target_universe(state);
        for effect in &mut self.effects {
            if effect.duration().is_persistent() {
                effect.set_active(true, state, &universe);
            }
        }
    }

    // === Event handling ===

    /// React to a game event.
    ///
    /// Lifecycle events route through the retraction table below; every
    /// event, lifecycle or custom, is then checked against the registered
    /// custom-duration bindings.
    pub fn handle_event(&mut self, event: &GameEvent, state: &mut GameState) {
        match &event.name {
            EventName::CardMoved => self.on_card_moved(event, state),
            EventName::CardTakenControl => self.on_card_taken_control(event, state),
            EventName::CardBlankToggled => self.on_card_blank_toggled(event, state),
            EventName::ShootoutPhaseFinished => self.unapply_and_remove(state, |effect| {
                effect.duration() == Duration::UntilEndOfShootoutPhase
            }),
            EventName::ShootoutRoundFinished => self.unapply_and_remove(state, |effect| {
                effect.duration() == Duration::UntilEndOfShootoutRound
            }),
            EventName::PhaseEnded => self.on_phase_ended(event, state),
            EventName::AtEndOfPhase => self.on_at_end_of_phase(event, state),
            EventName::RoundEnded => self.unapply_and_remove(state, |effect| {
                effect.duration() == Duration::UntilEndOfRound
            }),
            EventName::PlayWindowClosed => self.on_play_window_closed(event, state),
            EventName::Custom(_) => {}
        }

        self.fire_custom_duration_bindings(event, state);
    }

    fn on_card_moved(&mut self, event: &GameEvent, state: &mut GameState) {
        let Some(card) = event.card else {
            return;
        };
        let original = event.original_location;
        let parent_changed = event.parent_changed;

        self.unapply_and_remove(state, |effect| {
            if !effect.duration().is_persistent() || effect.source() != card {
                return false;
            }
            match effect.location_scope() {
                LocationScope::From(scope) => Some(scope) == original || parent_changed,
                LocationScope::Any => false,
            }
        });

        for effect in &mut self.effects {
            effect.clear_invalid_targets(state);
            effect.add_targets(state, &[card]);
            effect.update_applied_targets(state);
        }
    }

    fn on_card_taken_control(&mut self, event: &GameEvent, state: &mut GameState) {
        let Some(card) = event.card else {
            return;
        };

        for effect in &mut self.effects {
            effect.clear_invalid_targets(state);
            if effect.duration().is_persistent() && effect.source() == card {
                // Controller-relative conditions can flip anywhere on the
                // board, so effects given out by this card re-diff against
                // the whole universe, not just the moved card.
                let universe = target_universe(state);
                effect.add_targets(state, &universe);
            } else {
                effect.add_targets(state, &[card]);
            }
            effect.update_applied_targets(state);
        }
    }

    fn on_card_blank_toggled(&mut self, event: &GameEvent, state: &mut GameState) {
        let Some(card) = event.card else {
            return;
        };
        let trait_only = event.blank_kind == Some(BlankKind::Trait);
        let universe = target_universe(state);

        for effect in &mut self.effects {
            if effect.duration().is_persistent()
                && effect.source() == card
                && (!trait_only || effect.is_from_trait())
            {
                effect.set_active(!event.is_blank, state, &universe);
            }
        }
    }

    fn on_phase_ended(&mut self, event: &GameEvent, state: &mut GameState) {
        let phase = event.phase;
        self.unapply_and_remove(state, |effect| {
            effect.duration() == Duration::UntilEndOfPhase
                && effect
                    .phase_scope()
                    .map_or(true, |scope| Some(scope) == phase)
        });
    }

    fn on_at_end_of_phase(&mut self, event: &GameEvent, state: &mut GameState) {
        let phase = event.phase;
        self.unapply_and_remove(state, |effect| {
            effect.duration() == Duration::AtEndOfPhase
                && effect
                    .phase_scope()
                    .map_or(true, |scope| Some(scope) == phase)
        });
    }

    fn on_play_window_closed(&mut self, event: &GameEvent, state: &mut GameState) {
        if event.window.is_some_and(PlayWindow::resets_cheatin_res) {
            state.reset_cheatin_res_info();
        }
    }

    fn fire_custom_duration_bindings(&mut self, event: &GameEvent, state: &mut GameState) {
        for id in self.bindings.bound_effects(&event.name) {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            if self.effects[index].until_matches(event) {
                debug!("custom duration fired for {} on \"{}\"", id, event.name);
                let mut effect = self.effects.remove(index);
                effect.cancel(state);
                self.bindings.unregister(id);
            }
        }
    }

    // === Retraction ===

    /// Cancel and drop every effect matching the predicate.
    ///
    /// Snapshot, partition, replace: the list is never mutated while a
    /// consumer is mid-iteration. Matches are cancelled back to front
    /// because later-ordered effects may have been computed assuming the
    /// earlier ones were still applied.
    fn unapply_and_remove(
        &mut self,
        state: &mut GameState,
        predicate: impl Fn(&Effect) -> bool,
    ) {
        let (matching, remaining): (Vec<Effect>, Vec<Effect>) =
            self.effects.drain(..).partition(|effect| predicate(effect));

        if !matching.is_empty() {
            debug!("retracting {} effects", matching.len());
        }

        for mut effect in matching.into_iter().rev() {
            effect.cancel(state);
            self.bindings.unregister(effect.id());
        }

        self.effects = remaining;
    }

    // === Introspection ===

    /// Effects currently tracking this entity as a target, in list order.
    ///
    /// Reflects state after the most recent completed recalculation step;
    /// querying between a mutation and its deferred recalculation is a
    /// usage error. Chain `.filter(...)` for caller-specific predicates.
    pub fn effects_targeting(&self, entity: EntityId) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .filter(move |effect| effect.has_target(entity))
    }

    /// Effects currently applied to this entity, in list order.
    ///
    /// Same freshness contract as [`EffectEngine::effects_targeting`].
    pub fn effects_applied_to(&self, entity: EntityId) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .filter(move |effect| effect.is_applied_to(entity))
    }

    /// The live list, in application order. Read-only.
    #[must_use]
    pub fn live_effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Number of live effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if no effects are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Is this effect's recalculation currently in flight?
    #[must_use]
    pub fn is_recalculating(&self, effect: EffectId) -> bool {
        self.recalculating.contains(&effect)
    }

    /// Does this effect still hold custom-duration bindings?
    #[must_use]
    pub fn has_custom_bindings(&self, effect: EffectId) -> bool {
        self.bindings.is_bound(effect)
    }

    fn index_of(&self, id: EffectId) -> Option<usize> {
        self.effects.iter().position(|effect| effect.id() == id)
    }
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
