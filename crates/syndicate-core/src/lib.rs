//! Syndicate Simulation Engine
//!
//! Headless engine for running a street syndicate: a phase/day clock, a
//! resource ledger, narrative events, conflicts, officer loyalty and
//! relationships, and council votes.

pub mod chronicle;
pub mod commands;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod output;
pub mod rng;
pub mod scheduler;
pub mod setup;
pub mod systems;

pub use chronicle::{Chronicle, ChronicleWriter};
pub use commands::{CommandOutcome, PlayerCommand};
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::CommandError;
pub use rng::{RandomSource, ScriptedRolls, SeededRolls, SimRng};
pub use scheduler::{AutoAdvance, SharedEngine};
