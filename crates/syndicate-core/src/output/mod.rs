//! Output Generation
//!
//! Snapshots, query views and the critical-needs list.

pub mod needs;
pub mod snapshot;

pub use needs::{critical_needs, daily_upkeep};
pub use snapshot::*;
