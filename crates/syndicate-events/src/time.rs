//! Game Time Types
//!
//! A day counter plus the four-phase cycle, with a human-readable string form.
//!
//! # Example
//!
//! ```
//! use syndicate_events::{GameTime, Phase};
//!
//! let mut t = GameTime::new(12, Phase::Night);
//! assert_eq!(t.to_string(), "day_12.night");
//! assert!(t.advance());
//! assert_eq!(t.to_string(), "day_13.morning");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of days between council sessions.
pub const COUNCIL_INTERVAL_DAYS: u32 = 10;

/// Phase of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Morning,
    Day,
    Evening,
    Night,
}

impl Phase {
    /// Returns the next phase in the cycle.
    pub fn next(self) -> Self {
        match self {
            Phase::Morning => Phase::Day,
            Phase::Day => Phase::Evening,
            Phase::Evening => Phase::Night,
            Phase::Night => Phase::Morning,
        }
    }

    /// Returns true if leaving this phase starts a new day.
    pub fn is_day_end(self) -> bool {
        matches!(self, Phase::Night)
    }

    /// Returns all phases in cycle order.
    pub fn all() -> &'static [Phase] {
        &[Phase::Morning, Phase::Day, Phase::Evening, Phase::Night]
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Morning => write!(f, "morning"),
            Phase::Day => write!(f, "day"),
            Phase::Evening => write!(f, "evening"),
            Phase::Night => write!(f, "night"),
        }
    }
}

impl FromStr for Phase {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(Phase::Morning),
            "day" => Ok(Phase::Day),
            "evening" => Ok(Phase::Evening),
            "night" => Ok(Phase::Night),
            _ => Err(ParseTimeError::InvalidPhase(s.to_string())),
        }
    }
}

/// Which screen the engine is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    /// Normal district view: phases advance, events fire
    #[default]
    District,
    /// Council session: time is frozen until every motion is resolved
    Council,
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scene::District => write!(f, "district"),
            Scene::Council => write!(f, "council"),
        }
    }
}

impl FromStr for Scene {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "district" => Ok(Scene::District),
            "council" => Ok(Scene::Council),
            _ => Err(ParseTimeError::InvalidScene(s.to_string())),
        }
    }
}

/// A point in game time.
///
/// Serializes to strings like "day_12.evening".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameTime {
    pub day: u32,
    pub phase: Phase,
}

impl GameTime {
    /// Creates a new GameTime.
    pub fn new(day: u32, phase: Phase) -> Self {
        Self { day, phase }
    }

    /// The first morning of a session.
    pub fn start() -> Self {
        Self {
            day: 1,
            phase: Phase::Morning,
        }
    }

    /// Moves to the next phase. Returns true when a new day began.
    pub fn advance(&mut self) -> bool {
        let rolled = self.phase.is_day_end();
        self.phase = self.phase.next();
        if rolled {
            self.day += 1;
        }
        rolled
    }

    /// Whether the current day is a council day.
    pub fn is_council_day(&self, interval: u32) -> bool {
        interval > 0 && self.day % interval == 0
    }
}

impl Default for GameTime {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day_{}.{}", self.day, self.phase)
    }
}

/// Error type for parsing time values from strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTimeError {
    InvalidFormat(String),
    InvalidDay(String),
    InvalidPhase(String),
    InvalidScene(String),
}

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTimeError::InvalidFormat(s) => {
                write!(f, "invalid time format: '{}', expected 'day_N.phase'", s)
            }
            ParseTimeError::InvalidDay(s) => write!(f, "invalid day: '{}'", s),
            ParseTimeError::InvalidPhase(s) => write!(f, "invalid phase: '{}'", s),
            ParseTimeError::InvalidScene(s) => write!(f, "invalid scene: '{}'", s),
        }
    }
}

impl std::error::Error for ParseTimeError {}

impl FromStr for GameTime {
    type Err = ParseTimeError;

    /// Parses a GameTime from a string like "day_12.evening".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day_part, phase_part) = s
            .split_once('.')
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?;

        let day = day_part
            .strip_prefix("day_")
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidDay(day_part.to_string()))?;

        let phase = phase_part.parse::<Phase>()?;

        Ok(GameTime { day, phase })
    }
}

// Serialized as a string so chronicle lines stay readable
impl Serialize for GameTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GameTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
