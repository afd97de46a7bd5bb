//! Narrative Events
//!
//! Event kinds, their choices and outcomes, the pending queue, the weighted
//! generator and the resolver that applies a chosen outcome.

pub mod catalog;
pub mod generator;
pub mod kinds;
pub mod queue;
pub mod resolver;

pub use catalog::{choices, pick_outcome, Effect, EventChoice, Outcome};
pub use generator::{candidates, maybe_raise, roll_event, Candidate};
pub use kinds::{EnvoyOffer, EventKind, GameEvent, Grievance};
pub use queue::EventQueue;
pub use resolver::{active_choices, apply_effect, dismiss, emit, resolve, Resolution};
