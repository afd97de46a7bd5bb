//! Building Components
//!
//! Income-generating sites, their fixed per-type stats, and the registry.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syndicate_events::BuildingSnapshot;

/// Building types with fixed economic stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    NoodleStall,
    Teahouse,
    Restaurant,
    MahjongParlor,
    KaraokeBar,
    Nightclub,
    GamblingDen,
    Warehouse,
}

/// Fixed stats of a building type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingStats {
    /// Daily revenue while staffed
    pub revenue: i64,
    /// Daily heat while staffed
    pub heat: i32,
    pub illicit: bool,
    /// Daily food contribution to soldier needs
    pub food: i32,
    /// Daily entertainment contribution to soldier needs
    pub entertainment: i32,
    pub acquire_cost: i64,
    pub upgrade_cost: i64,
}

impl BuildingType {
    pub fn all() -> &'static [BuildingType] {
        &[
            BuildingType::NoodleStall,
            BuildingType::Teahouse,
            BuildingType::Restaurant,
            BuildingType::MahjongParlor,
            BuildingType::KaraokeBar,
            BuildingType::Nightclub,
            BuildingType::GamblingDen,
            BuildingType::Warehouse,
        ]
    }

    pub fn stats(&self) -> BuildingStats {
        let (revenue, heat, illicit, food, entertainment, acquire_cost, upgrade_cost) = match self {
            BuildingType::NoodleStall => (200, 0, false, 2, 0, 2_000, 1_000),
            BuildingType::Teahouse => (350, 0, false, 1, 1, 4_000, 2_000),
            BuildingType::Restaurant => (500, 1, false, 3, 0, 6_000, 3_000),
            BuildingType::MahjongParlor => (600, 2, true, 0, 2, 5_000, 2_500),
            BuildingType::KaraokeBar => (700, 2, false, 0, 3, 7_000, 3_500),
            BuildingType::Nightclub => (1_000, 3, true, 1, 3, 8_000, 4_000),
            BuildingType::GamblingDen => (1_200, 5, true, 0, 2, 10_000, 5_000),
            BuildingType::Warehouse => (800, 4, true, 0, 0, 9_000, 4_500),
        };
        BuildingStats {
            revenue,
            heat,
            illicit,
            food,
            entertainment,
            acquire_cost,
            upgrade_cost,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildingType::NoodleStall => "noodle_stall",
            BuildingType::Teahouse => "teahouse",
            BuildingType::Restaurant => "restaurant",
            BuildingType::MahjongParlor => "mahjong_parlor",
            BuildingType::KaraokeBar => "karaoke_bar",
            BuildingType::Nightclub => "nightclub",
            BuildingType::GamblingDen => "gambling_den",
            BuildingType::Warehouse => "warehouse",
        }
    }
}

/// A defector's stronghold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebelBase {
    pub officer_id: String,
    pub soldiers: u32,
}

/// A building held by the organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub building_type: BuildingType,
    pub assigned_officer: Option<String>,
    /// Closed while the current day is below this
    pub inactive_until_day: Option<u32>,
    pub upgraded: bool,
    pub rebel_base: Option<RebelBase>,
}

impl Building {
    pub fn new(id: impl Into<String>, building_type: BuildingType) -> Self {
        Self {
            id: id.into(),
            building_type,
            assigned_officer: None,
            inactive_until_day: None,
            upgraded: false,
            rebel_base: None,
        }
    }

    pub fn occupied(&self) -> bool {
        self.assigned_officer.is_some()
    }

    pub fn is_closed(&self, day: u32) -> bool {
        self.inactive_until_day.is_some_and(|until| day < until)
    }

    /// Staffed, open and not in rebel hands
    pub fn is_operating(&self, day: u32) -> bool {
        self.occupied() && !self.is_closed(day) && self.rebel_base.is_none()
    }

    /// Can take a new officer
    pub fn can_staff(&self, day: u32) -> bool {
        !self.occupied() && !self.is_closed(day) && self.rebel_base.is_none()
    }

    pub fn daily_revenue(&self, upgrade_multiplier: f64) -> i64 {
        let base = self.building_type.stats().revenue;
        if self.upgraded {
            (base as f64 * upgrade_multiplier).round() as i64
        } else {
            base
        }
    }

    /// Hand the building to a rebel. Clears normal occupancy.
    pub fn seize(&mut self, officer_id: impl Into<String>, soldiers: u32) {
        self.assigned_officer = None;
        self.rebel_base = Some(RebelBase {
            officer_id: officer_id.into(),
            soldiers,
        });
    }

    pub fn snapshot(&self) -> BuildingSnapshot {
        BuildingSnapshot {
            building_id: self.id.clone(),
            building_type: self.building_type.label().to_string(),
            occupied: self.occupied(),
            assigned_officer: self.assigned_officer.clone(),
            inactive_until_day: self.inactive_until_day,
            upgraded: self.upgraded,
            rebel_soldiers: self.rebel_base.as_ref().map(|r| r.soldiers),
        }
    }
}

/// Resource: Registry of all held buildings
#[derive(Resource, Debug, Default)]
pub struct BuildingRegistry {
    buildings: BTreeMap<String, Building>,
}

impl BuildingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, building: Building) {
        self.buildings.insert(building.id.clone(), building);
    }

    pub fn get(&self, id: &str) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Building> {
        self.buildings.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Building> {
        self.buildings.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Building> {
        self.buildings.values_mut()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn building_ids(&self) -> Vec<String> {
        self.buildings.keys().cloned().collect()
    }

    /// Building currently staffed by `officer_id`
    pub fn held_by(&self, officer_id: &str) -> Option<&Building> {
        self.buildings
            .values()
            .find(|b| b.assigned_officer.as_deref() == Some(officer_id))
    }

    /// Clear whatever post `officer_id` holds.
    pub fn vacate(&mut self, officer_id: &str) {
        for building in self.buildings.values_mut() {
            if building.assigned_officer.as_deref() == Some(officer_id) {
                building.assigned_officer = None;
            }
        }
    }

    pub fn rebel_bases(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values().filter(|b| b.rebel_base.is_some())
    }

    pub fn staffable(&self, day: u32) -> impl Iterator<Item = &Building> {
        self.buildings.values().filter(move |b| b.can_staff(day))
    }
}
