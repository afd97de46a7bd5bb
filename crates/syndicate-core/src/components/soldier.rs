//! Soldier Components
//!
//! The rank and file. Soldiers are anonymous; only their aggregate is shown.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::SoldierSummary;

use super::ledger::clamp_percent;
use super::world::IdSequence;

/// Soldier needs, each 0-100 (100 = fully satisfied)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldierNeeds {
    pub food: i32,
    pub entertainment: i32,
    pub pay: i32,
}

impl Default for SoldierNeeds {
    fn default() -> Self {
        Self {
            food: 70,
            entertainment: 60,
            pay: 70,
        }
    }
}

impl SoldierNeeds {
    /// Mean satisfaction across all needs
    pub fn satisfaction(&self) -> i32 {
        (self.food + self.entertainment + self.pay) / 3
    }

    pub fn adjust(&mut self, food: i32, entertainment: i32, pay: i32) {
        self.food = clamp_percent(self.food as i64 + food as i64);
        self.entertainment = clamp_percent(self.entertainment as i64 + entertainment as i64);
        self.pay = clamp_percent(self.pay as i64 + pay as i64);
    }
}

/// A soldier
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Soldier {
    pub id: String,
    pub loyalty: i32,
    pub needs: SoldierNeeds,
    /// Fighting skill, 1-10
    pub skill: u32,
    pub deserting: bool,
}

impl Soldier {
    pub fn new(id: impl Into<String>, skill: u32) -> Self {
        Self {
            id: id.into(),
            loyalty: 60,
            needs: SoldierNeeds::default(),
            skill: skill.clamp(1, 10),
            deserting: false,
        }
    }

    pub fn with_loyalty(mut self, loyalty: i32) -> Self {
        self.loyalty = clamp_percent(loyalty as i64);
        self
    }

    pub fn adjust_loyalty(&mut self, delta: i32) {
        self.loyalty = clamp_percent(self.loyalty as i64 + delta as i64);
    }

    /// Fights for the organization only when loyalty is above `threshold`
    pub fn will_fight(&self, threshold: i32) -> bool {
        self.loyalty > threshold && !self.deserting
    }
}

/// All soldiers, sorted by id.
pub fn all_soldiers(world: &World) -> Vec<&Soldier> {
    let mut soldiers: Vec<&Soldier> = world
        .iter_entities()
        .filter_map(|e| e.get::<Soldier>())
        .collect();
    soldiers.sort_by(|a, b| a.id.cmp(&b.id));
    soldiers
}

/// Soldier entities with their ids, sorted by id.
pub fn soldier_entities(world: &World) -> Vec<(Entity, String)> {
    let mut soldiers: Vec<(Entity, String)> = world
        .iter_entities()
        .filter_map(|e| e.get::<Soldier>().map(|s| (e.id(), s.id.clone())))
        .collect();
    soldiers.sort_by(|a, b| a.1.cmp(&b.1));
    soldiers
}

/// Spawn a soldier with the next free id.
pub fn spawn_soldier(world: &mut World, skill: u32, loyalty: i32) -> String {
    let id = world.resource_mut::<IdSequence>().next_soldier_id();
    world.spawn(Soldier::new(id.clone(), skill).with_loyalty(loyalty));
    id
}

/// Aggregate view of a group of soldiers.
pub fn summarize<'a>(soldiers: impl IntoIterator<Item = &'a Soldier>) -> SoldierSummary {
    let soldiers: Vec<&Soldier> = soldiers.into_iter().collect();
    let count = soldiers.len();
    if count == 0 {
        return SoldierSummary::default();
    }

    let mean = |f: &dyn Fn(&Soldier) -> i64| -> f32 {
        soldiers.iter().map(|s| f(s)).sum::<i64>() as f32 / count as f32
    };

    SoldierSummary {
        count,
        deserting: soldiers.iter().filter(|s| s.deserting).count(),
        average_loyalty: mean(&|s| s.loyalty as i64),
        average_skill: mean(&|s| s.skill as i64),
        average_food: mean(&|s| s.needs.food as i64),
        average_entertainment: mean(&|s| s.needs.entertainment as i64),
        average_pay: mean(&|s| s.needs.pay as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_is_clamped() {
        assert_eq!(Soldier::new("s", 0).skill, 1);
        assert_eq!(Soldier::new("s", 42).skill, 10);
    }

    #[test]
    fn test_will_fight_is_strictly_above_threshold() {
        let soldier = Soldier::new("soldier_001", 5).with_loyalty(30);
        assert!(!soldier.will_fight(30));
        assert!(soldier.will_fight(29));

        let mut deserter = Soldier::new("soldier_002", 5).with_loyalty(90);
        deserter.deserting = true;
        assert!(!deserter.will_fight(30));
    }

    #[test]
    fn test_needs_clamp() {
        let mut needs = SoldierNeeds::default();
        needs.adjust(-500, 500, 0);
        assert_eq!(needs.food, 0);
        assert_eq!(needs.entertainment, 100);
        assert_eq!(needs.satisfaction(), (0 + 100 + 70) / 3);
    }

    #[test]
    fn test_summary() {
        let a = Soldier::new("a", 4).with_loyalty(40);
        let mut b = Soldier::new("b", 6).with_loyalty(80);
        b.deserting = true;

        let summary = summarize([&a, &b]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.deserting, 1);
        assert_eq!(summary.average_loyalty, 60.0);
        assert_eq!(summary.average_skill, 5.0);

        assert_eq!(summarize(std::iter::empty()).count, 0);
    }
}
