//! Game events.
//!
//! Events represent things that happened during a game. The surrounding
//! action pipeline raises them after mutating game state; the effect
//! engine reacts by retracting, re-diffing, or suspending effects.
//!
//! ## Names
//!
//! The lifecycle events the engine routes on are a closed set of variants.
//! `Custom` names exist for card-defined end conditions ("until this event
//! satisfies this predicate"); the engine never interprets them beyond
//! matching bindings.

use serde::{Deserialize, Serialize};

use crate::core::{BlankKind, EntityId, Location, Phase, PlayWindow, PlayerId};

/// The name of a game event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    /// A card changed location.
    CardMoved,
    /// A card's controller changed.
    CardTakenControl,
    /// A card's abilities were blanked or unblanked.
    CardBlankToggled,
    /// The shootout phase finished.
    ShootoutPhaseFinished,
    /// One round within a shootout finished.
    ShootoutRoundFinished,
    /// A phase ended.
    PhaseEnded,
    /// The at-end-of-phase marker for a phase.
    AtEndOfPhase,
    /// The whole round ended.
    RoundEnded,
    /// A play window closed.
    PlayWindowClosed,
    /// A card-defined event, matched only by custom-duration bindings.
    Custom(String),
}

impl EventName {
    /// Create a custom event name.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventName::CardMoved => write!(f, "card moved"),
            EventName::CardTakenControl => write!(f, "card taken control"),
            EventName::CardBlankToggled => write!(f, "card blank toggled"),
            EventName::ShootoutPhaseFinished => write!(f, "shootout phase finished"),
            EventName::ShootoutRoundFinished => write!(f, "shootout round finished"),
            EventName::PhaseEnded => write!(f, "phase ended"),
            EventName::AtEndOfPhase => write!(f, "at end of phase"),
            EventName::RoundEnded => write!(f, "round ended"),
            EventName::PlayWindowClosed => write!(f, "play window closed"),
            EventName::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A game event with contextual data.
///
/// A flat payload carrier: each event kind fills the fields it needs and
/// leaves the rest empty. Custom events carry arbitrary numeric values and
/// string tags for their predicates to inspect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// What happened.
    pub name: EventName,

    /// The card the event concerns.
    pub card: Option<EntityId>,

    /// The player associated with the event.
    pub player: Option<PlayerId>,

    /// The location the card occupied before a move.
    pub original_location: Option<Location>,

    /// Did the card's owning context change during the move?
    pub parent_changed: bool,

    /// New blank state for blank-toggle events.
    pub is_blank: bool,

    /// How the card was blanked.
    pub blank_kind: Option<BlankKind>,

    /// The phase that ended.
    pub phase: Option<Phase>,

    /// The play window that closed.
    pub window: Option<PlayWindow>,

    /// Numeric values for custom events (amounts, counts).
    pub values: Vec<i64>,

    /// String tags for custom events.
    pub tags: Vec<String>,
}

impl GameEvent {
    /// Create a bare event with just a name.
    #[must_use]
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            card: None,
            player: None,
            original_location: None,
            parent_changed: false,
            is_blank: false,
            blank_kind: None,
            phase: None,
            window: None,
            values: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// A card changed location.
    #[must_use]
    pub fn card_moved(card: EntityId, original_location: Location, parent_changed: bool) -> Self {
        let mut event = Self::new(EventName::CardMoved);
        event.card = Some(card);
        event.original_location = Some(original_location);
        event.parent_changed = parent_changed;
        event
    }

    /// A card's controller changed.
    #[must_use]
    pub fn card_taken_control(card: EntityId) -> Self {
        Self::new(EventName::CardTakenControl).with_card(card)
    }

    /// A card was blanked or unblanked.
    #[must_use]
    pub fn card_blank_toggled(card: EntityId, is_blank: bool, kind: BlankKind) -> Self {
        let mut event = Self::new(EventName::CardBlankToggled);
        event.card = Some(card);
        event.is_blank = is_blank;
        event.blank_kind = Some(kind);
        event
    }

    /// The shootout phase finished.
    #[must_use]
    pub fn shootout_phase_finished() -> Self {
        Self::new(EventName::ShootoutPhaseFinished)
    }

    /// One round within a shootout finished.
    #[must_use]
    pub fn shootout_round_finished() -> Self {
        Self::new(EventName::ShootoutRoundFinished)
    }

    /// A phase ended.
    #[must_use]
    pub fn phase_ended(phase: Phase) -> Self {
        let mut event = Self::new(EventName::PhaseEnded);
        event.phase = Some(phase);
        event
    }

    /// The at-end-of-phase marker for a phase.
    #[must_use]
    pub fn at_end_of_phase(phase: Phase) -> Self {
        let mut event = Self::new(EventName::AtEndOfPhase);
        event.phase = Some(phase);
        event
    }

    /// The whole round ended.
    #[must_use]
    pub fn round_ended() -> Self {
        Self::new(EventName::RoundEnded)
    }

    /// A play window closed.
    #[must_use]
    pub fn play_window_closed(window: PlayWindow) -> Self {
        let mut event = Self::new(EventName::PlayWindowClosed);
        event.window = Some(window);
        event
    }

    /// A card-defined custom event.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(EventName::custom(name))
    }

    /// Set the card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: EntityId) -> Self {
        self.card = Some(card);
        self
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Add a numeric value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.values.push(value);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get a value by index, or a default.
    #[must_use]
    pub fn value(&self, index: usize, default: i64) -> i64 {
        self.values.get(index).copied().unwrap_or(default)
    }

    /// Check if the event has a specific tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
