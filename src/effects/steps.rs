//! Deferred engine steps.
//!
//! The engine never recalculates mid-mutation. Operations that must wait
//! for the current game step to settle push an [`EngineStep`] descriptor
//! onto the [`StepQueue`]; the surrounding game loop pops steps in FIFO
//! order and hands each back to `EffectEngine::run_step`. Each step runs
//! to completion before the next begins, and two steps enqueued in order
//! X then Y always execute in that order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::EntityId;

use super::effect::EffectId;

/// A unit of deferred engine work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStep {
    /// Clear the captured dirty flags and re-diff every live effect
    /// against the captured cards.
    RecalculateDirty { cards: Vec<EntityId> },

    /// Re-evaluate the selected state-dependent effects: cancel the ended
    /// ones, re-diff the rest against a fresh universe.
    ReapplyStateDependent { effects: Vec<EffectId> },

    /// Release the selected effects from the recalculation guard set.
    ClearRecalculationGuard { effects: Vec<EffectId> },
}

/// Strictly-ordered FIFO of deferred engine work.
///
/// Owned by the surrounding game loop; the engine only enqueues.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StepQueue {
    steps: VecDeque<EngineStep>,
}

impl StepQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a step after all currently queued work.
    pub fn push(&mut self, step: EngineStep) {
        self.steps.push_back(step);
    }

    /// Dequeue the next step.
    pub fn pop(&mut self) -> Option<EngineStep> {
        self.steps.pop_front()
    }

    /// Number of queued steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no work is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = StepQueue::new();

        queue.push(EngineStep::RecalculateDirty {
            cards: vec![EntityId(1)],
        });
        queue.push(EngineStep::ClearRecalculationGuard {
            effects: vec![EffectId(1)],
        });

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.pop(),
            Some(EngineStep::RecalculateDirty {
                cards: vec![EntityId(1)],
            })
        );
        assert_eq!(
            queue.pop(),
            Some(EngineStep::ClearRecalculationGuard {
                effects: vec![EffectId(1)],
            })
        );
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }
}
