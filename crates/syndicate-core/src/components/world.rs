//! World State Components
//!
//! The game clock, internal friction, and id sequences.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::{GameTime, Phase, Scene};

use super::ledger::clamp_percent;

/// Phase progress at which the auto-advance timer moves to the next phase
pub const PHASE_PROGRESS_MAX: u32 = 100;

/// Resource: current day, phase, scene and timer state
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    pub time: GameTime,
    pub scene: Scene,
    /// Timer speed multiplier, 1-4
    pub speed: u8,
    pub paused: bool,
    /// Progress toward the next phase, 0-100
    pub progress: u32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            time: GameTime::start(),
            scene: Scene::District,
            speed: 1,
            paused: true,
            progress: 0,
        }
    }
}

/// Which parts of a restored clock had to be reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockRepair {
    pub phase_reset: bool,
    pub scene_reset: bool,
    pub day_reset: bool,
}

impl ClockRepair {
    pub fn any(&self) -> bool {
        self.phase_reset || self.scene_reset || self.day_reset
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self) -> u32 {
        self.time.day
    }

    pub fn phase(&self) -> Phase {
        self.time.phase
    }

    pub fn in_council(&self) -> bool {
        self.scene == Scene::Council
    }

    pub fn set_speed(&mut self, speed: u8, max_speed: u8) -> u8 {
        self.speed = speed.clamp(1, max_speed.max(1));
        self.speed
    }

    /// Rebuild a clock from raw persisted values. Anything unrecognized falls
    /// back to day 1 / morning / district.
    pub fn restore(day: u32, phase: &str, scene: &str) -> (Self, ClockRepair) {
        let mut repair = ClockRepair::default();

        let phase = phase.parse::<Phase>().unwrap_or_else(|_| {
            repair.phase_reset = true;
            Phase::Morning
        });
        let scene = scene.parse::<Scene>().unwrap_or_else(|_| {
            repair.scene_reset = true;
            Scene::District
        });
        let day = if day == 0 {
            repair.day_reset = true;
            1
        } else {
            day
        };

        let clock = Self {
            time: GameTime::new(day, phase),
            scene,
            ..Self::default()
        };
        (clock, repair)
    }
}

/// Resource: accumulated internal friction, 0-100. Feeds coup attempts.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InternalFriction(pub i32);

impl InternalFriction {
    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn adjust(&mut self, delta: i32) {
        self.0 = clamp_percent(self.0 as i64 + delta as i64);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Resource: sequences for human-readable entity ids
#[derive(Resource, Debug, Default)]
pub struct IdSequence {
    officers: u64,
    soldiers: u64,
    buildings: u64,
    motions: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_officer_id(&mut self) -> String {
        self.officers += 1;
        format!("officer_{:03}", self.officers)
    }

    pub fn next_soldier_id(&mut self) -> String {
        self.soldiers += 1;
        format!("soldier_{:03}", self.soldiers)
    }

    pub fn next_building_id(&mut self) -> String {
        self.buildings += 1;
        format!("building_{:03}", self.buildings)
    }

    pub fn next_motion_id(&mut self) -> String {
        self.motions += 1;
        format!("motion_{:03}", self.motions)
    }
}
