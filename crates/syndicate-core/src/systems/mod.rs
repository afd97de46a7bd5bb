//! Simulation Systems
//!
//! Daily upkeep, conflict resolution, the relationship model, council voting
//! and the phase controller that ties them together.

pub mod conflict;
pub mod council;
pub mod phase;
pub mod relationship;
pub mod upkeep;

pub use conflict::{resolve_conflict, ConflictKind, ConflictReport, ConflictSpec, Opponent};
pub use council::{cast_vote, force_vote, CouncilMotion, CouncilSession, MotionEffect, VoteOutcome};
pub use phase::{advance_phase, tick, PhaseChange, TickOutcome};
pub use relationship::{
    leader_interact, loyalty_shock, peer_interact, LeaderInteraction, LeaderOutcome,
    PeerInteraction, PeerOutcome,
};
pub use upkeep::{build_daily_upkeep, run_daily_upkeep, DailyBooks, DailyUpkeep};
