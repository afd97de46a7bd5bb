//! Officer Components
//!
//! Named members of the organization: rank, loyalty, face, traits, skills and
//! status flags.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use syndicate_events::OfficerSnapshot;

use super::ledger::clamp_percent;
use super::social::Grudge;

/// Officer ranks. Ordering is by tier, and the three specialist ranks share a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    BlueLantern,
    StrawSandal,
    WhitePaperFan,
    RedPole,
    Deputy,
    Dragonhead,
}

impl Rank {
    pub fn tier(&self) -> u8 {
        match self {
            Rank::BlueLantern => 0,
            Rank::StrawSandal | Rank::WhitePaperFan | Rank::RedPole => 1,
            Rank::Deputy => 2,
            Rank::Dragonhead => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::BlueLantern => "blue_lantern",
            Rank::StrawSandal => "straw_sandal",
            Rank::WhitePaperFan => "white_paper_fan",
            Rank::RedPole => "red_pole",
            Rank::Deputy => "deputy",
            Rank::Dragonhead => "dragonhead",
        }
    }

    /// The next rank up. Blue lanterns are promoted into the specialist
    /// matching their strongest skill.
    pub fn promoted(&self, skills: &Skills) -> Option<Rank> {
        match self {
            Rank::BlueLantern => Some(skills.specialty()),
            Rank::StrawSandal | Rank::WhitePaperFan | Rank::RedPole => Some(Rank::Deputy),
            Rank::Deputy | Rank::Dragonhead => None,
        }
    }

    pub fn outranks(&self, other: &Rank) -> bool {
        self.tier() > other.tier()
    }
}

/// Personality traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerTrait {
    Ambitious,
    Loyal,
    Greedy,
    Charismatic,
    Ruthless,
    Cautious,
    Romantic,
    Hothead,
    BattleHardened,
    Scholar,
}

impl OfficerTrait {
    pub fn label(&self) -> &'static str {
        match self {
            OfficerTrait::Ambitious => "ambitious",
            OfficerTrait::Loyal => "loyal",
            OfficerTrait::Greedy => "greedy",
            OfficerTrait::Charismatic => "charismatic",
            OfficerTrait::Ruthless => "ruthless",
            OfficerTrait::Cautious => "cautious",
            OfficerTrait::Romantic => "romantic",
            OfficerTrait::Hothead => "hothead",
            OfficerTrait::BattleHardened => "battle_hardened",
            OfficerTrait::Scholar => "scholar",
        }
    }
}

/// Skill levels, 0-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Skills {
    pub enforcement: u32,
    pub diplomacy: u32,
    pub business: u32,
}

impl Skills {
    pub fn new(enforcement: u32, diplomacy: u32, business: u32) -> Self {
        Self {
            enforcement: enforcement.min(100),
            diplomacy: diplomacy.min(100),
            business: business.min(100),
        }
    }

    /// Specialist rank for the strongest skill
    pub fn specialty(&self) -> Rank {
        if self.enforcement >= self.diplomacy && self.enforcement >= self.business {
            Rank::RedPole
        } else if self.diplomacy >= self.business {
            Rank::WhitePaperFan
        } else {
            Rank::StrawSandal
        }
    }
}

/// An officer of the organization
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Officer {
    pub id: String,
    pub name: String,
    pub rank: Rank,
    pub energy: u32,
    pub max_energy: u32,
    pub loyalty: i32,
    pub face: i32,
    pub assigned_building: Option<String>,
    pub traits: BTreeSet<OfficerTrait>,
    pub skills: Skills,
    /// Days left until a wound heals; wounded while non-zero
    pub wounded_days: u32,
    pub arrested: bool,
    pub traitor: bool,
    pub successor: bool,
    pub testing_waters: bool,
    pub agenda: Option<String>,
    /// Grievances against the leader
    pub leader_grudges: Vec<Grudge>,
    pub last_interaction_day: Option<u32>,
}

impl Officer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rank: Rank) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank,
            energy: 100,
            max_energy: 100,
            loyalty: 60,
            face: 30,
            assigned_building: None,
            traits: BTreeSet::new(),
            skills: Skills::default(),
            wounded_days: 0,
            arrested: false,
            traitor: false,
            successor: false,
            testing_waters: false,
            agenda: None,
            leader_grudges: Vec::new(),
            last_interaction_day: None,
        }
    }

    pub fn with_loyalty(mut self, loyalty: i32) -> Self {
        self.loyalty = clamp_percent(loyalty as i64);
        self
    }

    pub fn with_face(mut self, face: i32) -> Self {
        self.face = clamp_percent(face as i64);
        self
    }

    pub fn with_traits(mut self, traits: impl IntoIterator<Item = OfficerTrait>) -> Self {
        self.traits.extend(traits);
        self
    }

    pub fn with_skills(mut self, skills: Skills) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_energy(mut self, energy: u32) -> Self {
        self.energy = energy.min(self.max_energy);
        self
    }

    pub fn has_trait(&self, t: OfficerTrait) -> bool {
        self.traits.contains(&t)
    }

    pub fn is_wounded(&self) -> bool {
        self.wounded_days > 0
    }

    /// Can be assigned, interacted with, or sent into a fight
    pub fn is_available(&self) -> bool {
        !self.is_wounded() && !self.arrested && !self.traitor
    }

    pub fn adjust_loyalty(&mut self, delta: i32) {
        self.loyalty = clamp_percent(self.loyalty as i64 + delta as i64);
    }

    pub fn adjust_face(&mut self, delta: i32) {
        self.face = clamp_percent(self.face as i64 + delta as i64);
    }

    /// Spend energy if enough is left.
    pub fn spend_energy(&mut self, amount: u32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        true
    }

    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    /// Wound for `days`, dropping energy to at most `energy_floor`. Vacates any post.
    pub fn wound(&mut self, days: u32, energy_floor: u32) -> Option<String> {
        self.wounded_days = self.wounded_days.max(days.max(1));
        self.energy = self.energy.min(energy_floor);
        self.assigned_building.take()
    }

    /// Arrest and vacate any post.
    pub fn arrest(&mut self) -> Option<String> {
        self.arrested = true;
        self.assigned_building.take()
    }

    pub fn add_trait(&mut self, t: OfficerTrait) -> bool {
        self.traits.insert(t)
    }

    pub fn snapshot(&self) -> OfficerSnapshot {
        OfficerSnapshot {
            officer_id: self.id.clone(),
            name: self.name.clone(),
            rank: self.rank.label().to_string(),
            energy: self.energy,
            max_energy: self.max_energy,
            loyalty: self.loyalty,
            face: self.face,
            assigned_building: self.assigned_building.clone(),
            traits: self.traits.iter().map(|t| t.label().to_string()).collect(),
            wounded: self.is_wounded(),
            arrested: self.arrested,
            traitor: self.traitor,
            successor: self.successor,
            testing_waters: self.testing_waters,
            agenda: self.agenda.clone(),
        }
    }
}

/// Find the entity carrying the officer with `officer_id`.
pub fn find_officer(world: &World, officer_id: &str) -> Option<Entity> {
    world
        .iter_entities()
        .find(|e| e.get::<Officer>().is_some_and(|o| o.id == officer_id))
        .map(|e| e.id())
}

/// Read an officer by id.
pub fn officer_by_id<'w>(world: &'w World, officer_id: &str) -> Option<&'w Officer> {
    world
        .iter_entities()
        .filter_map(|e| e.get::<Officer>())
        .find(|o| o.id == officer_id)
}

/// Mutate the officer with `officer_id` in place.
pub fn update_officer<R>(
    world: &mut World,
    officer_id: &str,
    f: impl FnOnce(&mut Officer) -> R,
) -> Option<R> {
    let entity = find_officer(world, officer_id)?;
    world.get_mut::<Officer>(entity).map(|mut officer| f(&mut officer))
}

/// All officers, sorted by id.
pub fn all_officers(world: &World) -> Vec<&Officer> {
    let mut officers: Vec<&Officer> = world
        .iter_entities()
        .filter_map(|e| e.get::<Officer>())
        .collect();
    officers.sort_by(|a, b| a.id.cmp(&b.id));
    officers
}

/// Ids of officers who are not traitors and can act, sorted.
pub fn available_officer_ids(world: &World) -> Vec<String> {
    all_officers(world)
        .into_iter()
        .filter(|o| o.is_available())
        .map(|o| o.id.clone())
        .collect()
}
