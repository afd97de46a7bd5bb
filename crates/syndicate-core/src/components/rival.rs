//! Rival Faction Components
//!
//! Other organizations on the same streets, and the registry that holds them.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syndicate_events::RivalSnapshot;

use super::ledger::clamp_percent;

/// Relationship at or below which a rival counts as hostile
pub const HOSTILE_RELATIONSHIP: i32 = -30;

/// A rival organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RivalFaction {
    pub id: String,
    pub name: String,
    pub strength: u32,
    /// -100 (blood feud) to 100 (sworn brothers)
    pub relationship: i32,
    pub trade_agreement: bool,
    pub alliance: bool,
    pub active_conflict: bool,
    /// Friction counter, 0-100
    pub tension: i32,
}

impl RivalFaction {
    pub fn new(id: impl Into<String>, name: impl Into<String>, strength: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            strength,
            relationship: 0,
            trade_agreement: false,
            alliance: false,
            active_conflict: false,
            tension: 0,
        }
    }

    pub fn with_relationship(mut self, relationship: i32) -> Self {
        self.relationship = relationship.clamp(-100, 100);
        self
    }

    pub fn with_tension(mut self, tension: i32) -> Self {
        self.tension = clamp_percent(tension as i64);
        self
    }

    pub fn adjust_relationship(&mut self, delta: i32) {
        self.relationship = (self.relationship as i64 + delta as i64).clamp(-100, 100) as i32;
    }

    pub fn adjust_tension(&mut self, delta: i32) {
        self.tension = clamp_percent(self.tension as i64 + delta as i64);
    }

    pub fn is_hostile(&self) -> bool {
        self.relationship <= HOSTILE_RELATIONSHIP || self.active_conflict
    }

    /// Conflict has been resolved one way or the other
    pub fn settle_conflict(&mut self) {
        self.active_conflict = false;
        self.tension = 0;
    }

    /// Declaring war ends any agreements
    pub fn declare_war(&mut self) {
        self.active_conflict = true;
        self.trade_agreement = false;
        self.alliance = false;
    }

    pub fn snapshot(&self) -> RivalSnapshot {
        RivalSnapshot {
            rival_id: self.id.clone(),
            name: self.name.clone(),
            strength: self.strength,
            relationship: self.relationship,
            trade_agreement: self.trade_agreement,
            alliance: self.alliance,
            active_conflict: self.active_conflict,
            tension: self.tension,
        }
    }
}

/// Resource: Registry of all rival factions
#[derive(Resource, Debug, Default)]
pub struct RivalRegistry {
    rivals: BTreeMap<String, RivalFaction>,
}

impl RivalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rival: RivalFaction) {
        self.rivals.insert(rival.id.clone(), rival);
    }

    pub fn get(&self, id: &str) -> Option<&RivalFaction> {
        self.rivals.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut RivalFaction> {
        self.rivals.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RivalFaction> {
        self.rivals.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RivalFaction> {
        self.rivals.values_mut()
    }

    pub fn rival_ids(&self) -> Vec<String> {
        self.rivals.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rivals.is_empty()
    }

    /// Total strength lent by allies in a fight against `opponent_id`
    pub fn allied_strength(&self, opponent_id: Option<&str>, share: f64) -> u32 {
        self.rivals
            .values()
            .filter(|r| r.alliance && Some(r.id.as_str()) != opponent_id)
            .map(|r| (r.strength as f64 * share).floor() as u32)
            .sum()
    }

    pub fn trade_partners(&self) -> usize {
        self.rivals.values().filter(|r| r.trade_agreement).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_clamps() {
        let mut rival = RivalFaction::new("rival_001", "Iron Lotus", 40).with_relationship(-90);
        rival.adjust_relationship(-50);
        assert_eq!(rival.relationship, -100);
        rival.adjust_relationship(i32::MAX);
        assert_eq!(rival.relationship, 100);
    }

    #[test]
    fn test_war_cancels_agreements() {
        let mut rival = RivalFaction::new("rival_001", "Iron Lotus", 40);
        rival.trade_agreement = true;
        rival.alliance = true;
        rival.declare_war();
        assert!(rival.active_conflict);
        assert!(!rival.trade_agreement);
        assert!(!rival.alliance);
        assert!(rival.is_hostile());

        rival.tension = 70;
        rival.settle_conflict();
        assert!(!rival.active_conflict);
        assert_eq!(rival.tension, 0);
    }

    #[test]
    fn test_allied_strength_excludes_opponent() {
        let mut registry = RivalRegistry::new();
        let mut ally = RivalFaction::new("rival_001", "Iron Lotus", 40);
        ally.alliance = true;
        registry.register(ally);
        registry.register(RivalFaction::new("rival_002", "Jade Serpent Society", 60));

        assert_eq!(registry.allied_strength(Some("rival_002"), 0.25), 10);
        assert_eq!(registry.allied_strength(Some("rival_001"), 0.25), 0);
        assert_eq!(registry.allied_strength(None, 0.25), 10);
    }
}
