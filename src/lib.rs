//! # frontier-ccg
//!
//! The continuous effect engine of a card-game rules server: the
//! subsystem that applies, tracks, recalculates, and retracts the timed
//! modifiers cards, players, and other game objects exert on each other
//! as the game progresses.
//!
//! ## Design Principles
//!
//! 1. **Generic container, pluggable behavior**: the engine never knows
//!    what an effect does. Abilities implement `Modifier`; the engine
//!    guarantees ordering, balanced apply/unapply, and clean teardown.
//!
//! 2. **Single writer**: the live effect list, custom-duration bindings,
//!    and recalculation guard set are mutated only by the engine. Other
//!    subsystems add effects and raise events; they never retract.
//!
//! 3. **Deferred settling**: recalculation never runs mid-mutation. It is
//!    queued as explicit steps the game loop executes in strict order,
//!    with a guard set breaking feedback between state-dependent effects.
//!
//! ## Architecture
//!
//! - Effects carry a closed [`Duration`](effects::Duration) taxonomy;
//!   every retraction site matches it exhaustively.
//! - Lifecycle events route through one match-based dispatch point,
//!   [`EffectEngine::handle_event`](effects::EffectEngine::handle_event);
//!   custom end conditions are engine-owned binding records, not
//!   callbacks.
//! - The live list is rebuilt by snapshot/partition/replace on every
//!   retraction, never mutated mid-iteration.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, locations, turn structure, game state
//! - `cards`: Runtime card instances
//! - `events`: Game event payloads
//! - `effects`: The effect container, engine, and deferred-step machinery

pub mod cards;
pub mod core;
pub mod effects;
pub mod events;

// Re-export commonly used types
pub use crate::core::{
    BlankKind, EntityId, GameState, Location, Phase, PlayWindow, PlayerFlags, PlayerId, PlayerMap,
};

pub use crate::cards::{CardId, CardInstance};

pub use crate::events::{EventName, GameEvent};

pub use crate::effects::{
    Duration, Effect, EffectEngine, EffectId, EngineStep, LocationScope, Modifier, StateModifier,
    StepQueue, target_universe,
};
