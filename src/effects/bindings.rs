//! Custom-duration binding records.
//!
//! An effect with an `until` map is bound to each named event exactly
//! once. The records live here, owned by the engine; when any event
//! arrives, the engine asks which bound effects care about that name and
//! evaluates their predicates. Unregistration removes every record for an
//! effect and is idempotent - tearing down an effect whose bindings are
//! already gone is a safe no-op.

use crate::events::EventName;

use super::effect::{Effect, EffectId};

/// One (event name, owning effect) subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
struct BindingRecord {
    name: EventName,
    effect: EffectId,
}

/// The set of live custom-duration bindings.
#[derive(Clone, Debug, Default)]
pub struct CustomDurationBindings {
    records: Vec<BindingRecord>,
}

impl CustomDurationBindings {
    /// Create an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one record per event name in the effect's until map.
    ///
    /// Duplicate (event, effect) pairs are suppressed, so re-registering
    /// an already-bound effect changes nothing.
    pub fn register(&mut self, effect: &Effect) {
        let id = effect.id();
        for name in effect.until_events() {
            let exists = self
                .records
                .iter()
                .any(|record| record.effect == id && record.name == *name);
            if !exists {
                self.records.push(BindingRecord {
                    name: name.clone(),
                    effect: id,
                });
            }
        }
    }

    /// Remove every record owned by the effect. Idempotent.
    pub fn unregister(&mut self, effect: EffectId) {
        self.records.retain(|record| record.effect != effect);
    }

    /// Effects bound to this event name, in registration order.
    #[must_use]
    pub fn bound_effects(&self, name: &EventName) -> Vec<EffectId> {
        self.records
            .iter()
            .filter(|record| record.name == *name)
            .map(|record| record.effect)
            .collect()
    }

    /// Does this effect hold any binding?
    #[must_use]
    pub fn is_bound(&self, effect: EffectId) -> bool {
        self.records.iter().any(|record| record.effect == effect)
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no bindings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::effects::StateModifier;

    fn bound_effect(id: u32, events: &[&str]) -> Effect {
        let mut effect = Effect::new(EntityId(10), StateModifier::new("bullets", 1));
        for name in events {
            effect = effect.until(EventName::custom(*name), |_| true);
        }
        effect.assign_id(EffectId(id));
        effect
    }

    #[test]
    fn test_register_one_record_per_event() {
        let mut bindings = CustomDurationBindings::new();
        let effect = bound_effect(1, &["onBountyPaid", "onDudeBooted"]);

        bindings.register(&effect);

        assert_eq!(bindings.len(), 2);
        assert!(bindings.is_bound(EffectId(1)));
        assert_eq!(
            bindings.bound_effects(&EventName::custom("onBountyPaid")),
            vec![EffectId(1)]
        );
        assert_eq!(
            bindings.bound_effects(&EventName::custom("onDudeBooted")),
            vec![EffectId(1)]
        );
    }

    #[test]
    fn test_register_suppresses_duplicates() {
        let mut bindings = CustomDurationBindings::new();
        let effect = bound_effect(1, &["onBountyPaid"]);

        bindings.register(&effect);
        bindings.register(&effect);

        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_unregister_removes_all_and_is_idempotent() {
        let mut bindings = CustomDurationBindings::new();
        let first = bound_effect(1, &["onBountyPaid", "onDudeBooted"]);
        let second = bound_effect(2, &["onBountyPaid"]);

        bindings.register(&first);
        bindings.register(&second);
        assert_eq!(bindings.len(), 3);

        bindings.unregister(EffectId(1));
        assert!(!bindings.is_bound(EffectId(1)));
        assert_eq!(
            bindings.bound_effects(&EventName::custom("onBountyPaid")),
            vec![EffectId(2)]
        );

        // Already torn down: safe no-op
        bindings.unregister(EffectId(1));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_bound_effects_preserves_registration_order() {
        let mut bindings = CustomDurationBindings::new();
        let first = bound_effect(1, &["onBountyPaid"]);
        let second = bound_effect(2, &["onBountyPaid"]);

        bindings.register(&first);
        bindings.register(&second);

        assert_eq!(
            bindings.bound_effects(&EventName::custom("onBountyPaid")),
            vec![EffectId(1), EffectId(2)]
        );
    }
}
