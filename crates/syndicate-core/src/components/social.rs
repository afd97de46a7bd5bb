//! Social Components
//!
//! Directed relationships between officers, with shared memories and grudges.
//! The friend/enemy/lover categories are never stored; they are read off the
//! scalar values every time.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syndicate_events::RelationshipSnapshot;

use super::ledger::clamp_percent;

/// Thresholds for derived relationship categories
pub mod relationship_thresholds {
    /// Affinity at or above which two officers are friends
    pub const FRIEND_AFFINITY: i32 = 50;
    /// Affinity at or below which two officers are enemies
    pub const ENEMY_AFFINITY: i32 = -50;
    /// Affinity at or below which an enemy becomes a mortal enemy
    pub const MORTAL_ENEMY_AFFINITY: i32 = -80;
    /// Mortal enemies have no respect left above this
    pub const MORTAL_ENEMY_MAX_RESPECT: i32 = 20;
    /// Romantic interest at or above which an officer is in love
    pub const IN_LOVE_INTEREST: i32 = 60;
    /// Romantic interest at or above which a pair can be lovers
    pub const LOVER_INTEREST: i32 = 80;
    /// Affinity lovers must also share
    pub const LOVER_AFFINITY: i32 = 60;
}

use relationship_thresholds::*;

/// Something two officers went through together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedMemory {
    pub day: u32,
    pub description: String,
}

/// A held grievance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grudge {
    pub day: u32,
    pub reason: String,
}

impl Grudge {
    pub fn new(day: u32, reason: impl Into<String>) -> Self {
        Self {
            day,
            reason: reason.into(),
        }
    }
}

/// How one officer feels about another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub target_id: String,
    /// -100 to 100
    pub affinity: i32,
    /// 0 to 100
    pub respect: i32,
    /// 0 to 100
    pub romantic_interest: i32,
    pub memories: Vec<SharedMemory>,
    pub grudges: Vec<Grudge>,
    pub last_interaction_day: Option<u32>,
}

impl Relationship {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            affinity: 0,
            respect: 50,
            romantic_interest: 0,
            memories: Vec::new(),
            grudges: Vec::new(),
            last_interaction_day: None,
        }
    }

    pub fn with_affinity(mut self, affinity: i32) -> Self {
        self.affinity = affinity.clamp(-100, 100);
        self
    }

    pub fn with_respect(mut self, respect: i32) -> Self {
        self.respect = clamp_percent(respect as i64);
        self
    }

    pub fn with_romantic_interest(mut self, interest: i32) -> Self {
        self.romantic_interest = clamp_percent(interest as i64);
        self
    }

    pub fn adjust_affinity(&mut self, delta: i32) {
        self.affinity = (self.affinity as i64 + delta as i64).clamp(-100, 100) as i32;
    }

    pub fn adjust_respect(&mut self, delta: i32) {
        self.respect = clamp_percent(self.respect as i64 + delta as i64);
    }

    pub fn adjust_romantic_interest(&mut self, delta: i32) {
        self.romantic_interest = clamp_percent(self.romantic_interest as i64 + delta as i64);
    }

    pub fn remember(&mut self, day: u32, description: impl Into<String>) {
        self.memories.push(SharedMemory {
            day,
            description: description.into(),
        });
    }

    pub fn hold_grudge(&mut self, day: u32, reason: impl Into<String>) {
        self.grudges.push(Grudge::new(day, reason));
    }

    pub fn is_friend(&self) -> bool {
        self.affinity >= FRIEND_AFFINITY
    }

    pub fn is_enemy(&self) -> bool {
        self.affinity <= ENEMY_AFFINITY
    }

    pub fn is_mortal_enemy(&self) -> bool {
        self.affinity <= MORTAL_ENEMY_AFFINITY && self.respect <= MORTAL_ENEMY_MAX_RESPECT
    }

    pub fn is_in_love(&self) -> bool {
        self.romantic_interest >= IN_LOVE_INTEREST
    }

    pub fn is_lover(&self) -> bool {
        self.romantic_interest >= LOVER_INTEREST && self.affinity >= LOVER_AFFINITY
    }

    pub fn snapshot(&self, from: &str) -> RelationshipSnapshot {
        RelationshipSnapshot {
            from: from.to_string(),
            to: self.target_id.clone(),
            affinity: self.affinity,
            respect: self.respect,
            romantic_interest: self.romantic_interest,
            friend: self.is_friend(),
            enemy: self.is_enemy(),
            mortal_enemy: self.is_mortal_enemy(),
            lover: self.is_lover(),
            in_love: self.is_in_love(),
            memory_count: self.memories.len(),
            grudge_count: self.grudges.len(),
        }
    }
}

/// Resource: Graph of all relationships between officers
#[derive(Resource, Debug, Default)]
pub struct RelationshipGraph {
    /// Maps (from_officer_id, to_officer_id) -> Relationship
    relationships: BTreeMap<(String, String), Relationship>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from: &str, to: &str) -> Option<&Relationship> {
        self.relationships.get(&(from.to_string(), to.to_string()))
    }

    pub fn get_mut(&mut self, from: &str, to: &str) -> Option<&mut Relationship> {
        self.relationships.get_mut(&(from.to_string(), to.to_string()))
    }

    pub fn set(&mut self, from: impl Into<String>, relationship: Relationship) {
        let to = relationship.target_id.clone();
        self.relationships.insert((from.into(), to), relationship);
    }

    pub fn has_relationship(&self, from: &str, to: &str) -> bool {
        self.relationships
            .contains_key(&(from.to_string(), to.to_string()))
    }

    /// Create or get relationship (ensures it exists)
    pub fn ensure_relationship(&mut self, from: &str, to: &str) -> &mut Relationship {
        self.relationships
            .entry((from.to_string(), to.to_string()))
            .or_insert_with(|| Relationship::new(to))
    }

    /// Records exist in both directions once either side exists
    pub fn ensure_pair(&mut self, a: &str, b: &str) {
        self.ensure_relationship(a, b);
        self.ensure_relationship(b, a);
    }

    /// Outgoing relationships of an officer, sorted by target
    pub fn relationships_for(&self, officer_id: &str) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|((from, _), _)| from == officer_id)
            .map(|(_, rel)| rel)
            .collect()
    }

    /// Drop every record touching `officer_id`
    pub fn forget(&mut self, officer_id: &str) {
        self.relationships
            .retain(|(from, to), _| from != officer_id && to != officer_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.relationships
            .iter()
            .map(|((from, _), rel)| (from.as_str(), rel))
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_categories_follow_scalars() {
        let mut rel = Relationship::new("officer_002");
        assert!(!rel.is_friend());
        assert!(!rel.is_enemy());

        rel.adjust_affinity(50);
        assert!(rel.is_friend());

        rel.adjust_affinity(-140);
        assert!(rel.is_enemy());
        assert!(!rel.is_mortal_enemy());

        rel.adjust_respect(-40);
        assert!(rel.is_mortal_enemy());

        rel.adjust_affinity(20);
        assert!(!rel.is_mortal_enemy());
    }

    #[test]
    fn test_love_thresholds() {
        let rel = Relationship::new("officer_002")
            .with_romantic_interest(65)
            .with_affinity(70);
        assert!(rel.is_in_love());
        assert!(!rel.is_lover());

        let rel = rel.with_romantic_interest(85);
        assert!(rel.is_lover());

        let rel = rel.with_affinity(10);
        assert!(!rel.is_lover());
        assert!(rel.is_in_love());
    }

    #[test]
    fn test_values_clamp() {
        let mut rel = Relationship::new("x");
        rel.adjust_affinity(i32::MIN);
        rel.adjust_respect(i32::MAX);
        rel.adjust_romantic_interest(-10);
        assert_eq!(rel.affinity, -100);
        assert_eq!(rel.respect, 100);
        assert_eq!(rel.romantic_interest, 0);
    }

    #[test]
    fn test_graph_pairs_are_directed() {
        let mut graph = RelationshipGraph::new();
        graph.ensure_pair("officer_001", "officer_002");
        graph
            .ensure_relationship("officer_001", "officer_002")
            .adjust_affinity(30);

        assert_eq!(graph.get("officer_001", "officer_002").unwrap().affinity, 30);
        assert_eq!(graph.get("officer_002", "officer_001").unwrap().affinity, 0);
        assert_eq!(graph.relationships_for("officer_001").len(), 1);

        graph.forget("officer_002");
        assert!(graph.is_empty());
    }

    #[test]
    fn test_snapshot_reports_derived_flags() {
        let mut rel = Relationship::new("officer_002").with_affinity(60);
        rel.remember(3, "shared a bottle of baijiu");
        let snap = rel.snapshot("officer_001");
        assert!(snap.friend);
        assert_eq!(snap.memory_count, 1);
        assert_eq!(snap.from, "officer_001");
    }
}
