//! Snapshot Types
//!
//! Serialization structs for the engine's read-only views.
//!
//! A snapshot captures the complete observable state at one moment, for
//! presentation layers, debugging and the headless runner's reports.

use serde::{Deserialize, Serialize};

use crate::{EventId, GameTime, Scene};

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Scalar economy values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub cash: i64,
    pub reputation: i32,
    pub heat: i32,
    pub intel: i32,
    pub influence: i32,
}

/// Officer snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerSnapshot {
    pub officer_id: String,
    pub name: String,
    pub rank: String,
    pub energy: u32,
    pub max_energy: u32,
    pub loyalty: i32,
    pub face: i32,
    #[serde(default)]
    pub assigned_building: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
    #[serde(default)]
    pub wounded: bool,
    #[serde(default)]
    pub arrested: bool,
    #[serde(default)]
    pub traitor: bool,
    #[serde(default)]
    pub successor: bool,
    #[serde(default)]
    pub testing_waters: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
}

/// Building snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub building_id: String,
    pub building_type: String,
    pub occupied: bool,
    #[serde(default)]
    pub assigned_officer: Option<String>,
    #[serde(default)]
    pub inactive_until_day: Option<u32>,
    #[serde(default)]
    pub upgraded: bool,
    /// Rebel soldier count when the building is held by a defector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebel_soldiers: Option<u32>,
}

/// Aggregate soldier state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoldierSummary {
    pub count: usize,
    pub deserting: usize,
    pub average_loyalty: f32,
    pub average_skill: f32,
    pub average_food: f32,
    pub average_entertainment: f32,
    pub average_pay: f32,
}

/// Rival faction snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalSnapshot {
    pub rival_id: String,
    pub name: String,
    pub strength: u32,
    pub relationship: i32,
    pub trade_agreement: bool,
    pub alliance: bool,
    pub active_conflict: bool,
    pub tension: i32,
}

/// One directed relationship with its derived categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub from: String,
    pub to: String,
    pub affinity: i32,
    pub respect: i32,
    pub romantic_interest: i32,
    pub friend: bool,
    pub enemy: bool,
    pub mortal_enemy: bool,
    pub lover: bool,
    pub in_love: bool,
    pub memory_count: usize,
    pub grudge_count: usize,
}

/// Compact description of a queued or active event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: EventId,
    pub kind: String,
    pub title: String,
    pub blocking: bool,
}

/// Something the player should deal with soon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "need", rename_all = "snake_case")]
pub enum CriticalNeed {
    LowCash { cash: i64, daily_upkeep: i64 },
    HighHeat { heat: i32 },
    DisloyalOfficer { officer_id: String, loyalty: i32 },
    WoundedOfficer { officer_id: String, days_left: u32 },
    ArrestedOfficer { officer_id: String },
    IdleBuilding { building_id: String },
    HungrySoldiers { satisfaction: f32 },
    BoredSoldiers { satisfaction: f32 },
    UnpaidSoldiers { satisfaction: f32 },
    DesertingSoldiers { count: usize },
    HostileRival { rival_id: String, tension: i32 },
    RebelBase { building_id: String, soldiers: u32 },
}

impl CriticalNeed {
    /// Short machine-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CriticalNeed::LowCash { .. } => "low_cash",
            CriticalNeed::HighHeat { .. } => "high_heat",
            CriticalNeed::DisloyalOfficer { .. } => "disloyal_officer",
            CriticalNeed::WoundedOfficer { .. } => "wounded_officer",
            CriticalNeed::ArrestedOfficer { .. } => "arrested_officer",
            CriticalNeed::IdleBuilding { .. } => "idle_building",
            CriticalNeed::HungrySoldiers { .. } => "hungry_soldiers",
            CriticalNeed::BoredSoldiers { .. } => "bored_soldiers",
            CriticalNeed::UnpaidSoldiers { .. } => "unpaid_soldiers",
            CriticalNeed::DesertingSoldiers { .. } => "deserting_soldiers",
            CriticalNeed::HostileRival { .. } => "hostile_rival",
            CriticalNeed::RebelBase { .. } => "rebel_base",
        }
    }
}

/// Full engine snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub snapshot_id: String,
    pub time: GameTime,
    pub scene: Scene,
    pub speed: u8,
    pub paused: bool,
    pub phase_progress: u32,
    pub ledger: LedgerSnapshot,
    pub officers: Vec<OfficerSnapshot>,
    pub buildings: Vec<BuildingSnapshot>,
    pub soldiers: SoldierSummary,
    pub rivals: Vec<RivalSnapshot>,
    #[serde(default)]
    pub relationships: Vec<RelationshipSnapshot>,
    #[serde(default)]
    pub active_event: Option<EventSummary>,
    #[serde(default)]
    pub pending_events: Vec<EventSummary>,
    #[serde(default)]
    pub critical_needs: Vec<CriticalNeed>,
}

impl EngineSnapshot {
    pub fn officer(&self, officer_id: &str) -> Option<&OfficerSnapshot> {
        self.officers.iter().find(|o| o.officer_id == officer_id)
    }

    pub fn building(&self, building_id: &str) -> Option<&BuildingSnapshot> {
        self.buildings.iter().find(|b| b.building_id == building_id)
    }
}
