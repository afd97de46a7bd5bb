//! Shared data types for the syndicate simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces them; presentation layers and tools consume them.

pub mod chronicle;
pub mod ids;
pub mod snapshot;
pub mod time;

// Re-export time types
pub use time::{GameTime, ParseTimeError, Phase, Scene, COUNCIL_INTERVAL_DAYS};

// Re-export id types
pub use ids::EventId;

// Re-export chronicle types
pub use chronicle::{generate_entry_id, tags, ChronicleEntry, EntryCategory};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, BuildingSnapshot, CriticalNeed, EngineSnapshot, EventSummary,
    LedgerSnapshot, OfficerSnapshot, RelationshipSnapshot, RivalSnapshot, SoldierSummary,
};
