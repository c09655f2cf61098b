//! The continuous effect system.
//!
//! Timed modifiers ("effects") that cards, players, and other game
//! objects exert on each other while the game state changes:
//!
//! - [`Effect`]: the generic lifecycle container; the ability layer plugs
//!   behavior in behind [`Modifier`]
//! - [`Duration`]: the closed lifetime taxonomy
//! - [`EffectEngine`]: the orchestrator owning the live list
//! - [`StepQueue`]/[`EngineStep`]: the deferred-recalculation machinery
//! - [`target_universe`]: who can receive effects right now
//!
//! ## Design Philosophy
//!
//! The engine knows nothing about any specific ability's rules. It
//! guarantees the container invariants - deterministic ordering, balanced
//! apply/unapply, exactly-once deferred recalculation, clean binding
//! teardown - and leaves "what the modifier does" to implementors of
//! [`Modifier`].

mod bindings;
mod duration;
mod effect;
mod engine;
mod steps;
mod targets;

pub use bindings::CustomDurationBindings;
pub use duration::Duration;
pub use effect::{
    Effect, EffectId, LocationScope, Modifier, StateModifier, StatePredicate, TargetPredicate,
    UntilMap, UntilPredicate,
};
pub use engine::EffectEngine;
pub use steps::{EngineStep, StepQueue};
pub use targets::target_universe;
