//! Card system: runtime card instances.
//!
//! The card catalog (printed definitions, abilities) lives outside this
//! crate; the engine only needs the runtime shell a definition is played
//! into - identity, location, control, and the mutable state effect
//! modifiers act on.

mod instance;

pub use instance::{CardId, CardInstance};
