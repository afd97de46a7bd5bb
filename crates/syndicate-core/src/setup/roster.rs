//! Roster Setup
//!
//! The founding officers, their first soldiers and how they feel about each
//! other. Recruits drawn later come from the same name pool.

use bevy_ecs::prelude::*;

use crate::components::{
    spawn_soldier, BuildingRegistry, IdSequence, Officer, OfficerTrait, Rank, RelationshipGraph,
    Skills,
};
use crate::rng::SimRng;

/// Soldiers hired on day one
pub const STARTING_SOLDIERS: usize = 8;

/// Names for officers recruited during play
pub const RECRUIT_NAMES: &[&str] = &[
    "Ah Fai",
    "Big Eyes Lam",
    "Scarface Ho",
    "Kitty Chan",
    "Lucky Ng",
    "Silent Lau",
    "Ginger Tse",
    "Four Fingers Yip",
    "Crane Wong",
    "Auntie So",
];

/// Traits a recruit may arrive with
const RECRUIT_TRAITS: &[OfficerTrait] = &[
    OfficerTrait::Ambitious,
    OfficerTrait::Loyal,
    OfficerTrait::Greedy,
    OfficerTrait::Charismatic,
    OfficerTrait::Ruthless,
    OfficerTrait::Cautious,
    OfficerTrait::Romantic,
    OfficerTrait::Hothead,
    OfficerTrait::Scholar,
];

struct Founder {
    name: &'static str,
    rank: Rank,
    loyalty: i32,
    face: i32,
    skills: (u32, u32, u32),
    traits: &'static [OfficerTrait],
    /// Index into the starting buildings, if posted on day one
    post: Option<usize>,
}

const FOUNDERS: &[Founder] = &[
    Founder {
        name: "Uncle Wah",
        rank: Rank::Deputy,
        loyalty: 75,
        face: 55,
        skills: (40, 60, 55),
        traits: &[OfficerTrait::Loyal, OfficerTrait::Cautious],
        post: Some(0),
    },
    Founder {
        name: "Ah Keung",
        rank: Rank::RedPole,
        loyalty: 60,
        face: 40,
        skills: (75, 20, 25),
        traits: &[OfficerTrait::Hothead, OfficerTrait::BattleHardened],
        post: None,
    },
    Founder {
        name: "Mei Ling",
        rank: Rank::WhitePaperFan,
        loyalty: 65,
        face: 45,
        skills: (25, 70, 45),
        traits: &[OfficerTrait::Charismatic, OfficerTrait::Romantic],
        post: None,
    },
    Founder {
        name: "Fat Choi",
        rank: Rank::StrawSandal,
        loyalty: 45,
        face: 35,
        skills: (30, 45, 70),
        traits: &[OfficerTrait::Greedy, OfficerTrait::Ambitious],
        post: Some(1),
    },
    Founder {
        name: "Little Tiger",
        rank: Rank::BlueLantern,
        loyalty: 55,
        face: 20,
        skills: (45, 20, 25),
        traits: &[OfficerTrait::Ambitious, OfficerTrait::Hothead],
        post: None,
    },
];

/// Spawn the founding officers and post them. Returns their ids in order.
pub fn spawn_founders(world: &mut World) -> Vec<String> {
    let building_ids = world.resource::<BuildingRegistry>().building_ids();
    let mut ids = Vec::with_capacity(FOUNDERS.len());

    for founder in FOUNDERS {
        let id = world.resource_mut::<IdSequence>().next_officer_id();
        let (enforcement, diplomacy, business) = founder.skills;
        let mut officer = Officer::new(id.clone(), founder.name, founder.rank)
            .with_loyalty(founder.loyalty)
            .with_face(founder.face)
            .with_skills(Skills::new(enforcement, diplomacy, business))
            .with_traits(founder.traits.iter().copied());

        if let Some(building_id) = founder.post.and_then(|i| building_ids.get(i)) {
            if let Some(building) = world
                .resource_mut::<BuildingRegistry>()
                .get_mut(building_id)
            {
                building.assigned_officer = Some(id.clone());
                officer.assigned_building = Some(building_id.clone());
            }
        }

        world.spawn(officer);
        ids.push(id);
    }

    ids
}

/// Every pair of founders knows each other; a few already have history.
pub fn seed_relationships(world: &mut World, officer_ids: &[String]) {
    let mut graph = world.resource_mut::<RelationshipGraph>();
    for (i, a) in officer_ids.iter().enumerate() {
        for b in officer_ids.iter().skip(i + 1) {
            graph.ensure_pair(a, b);
        }
    }

    let pair = |i: usize, j: usize| officer_ids.get(i).zip(officer_ids.get(j));

    // Ah Keung took Little Tiger off the street
    if let Some((keung, tiger)) = pair(1, 4) {
        graph.ensure_relationship(keung, tiger).adjust_affinity(30);
        let back = graph.ensure_relationship(tiger, keung);
        back.adjust_affinity(35);
        back.adjust_respect(20);
    }
    // Everyone defers to the old deputy
    if let Some(wah) = officer_ids.first() {
        for other in officer_ids.iter().skip(1) {
            graph.ensure_relationship(other, wah).adjust_respect(15);
        }
    }
    // Fat Choi skims and Ah Keung knows it
    if let Some((keung, choi)) = pair(1, 3) {
        graph.ensure_relationship(keung, choi).adjust_affinity(-20);
        graph.ensure_relationship(choi, keung).adjust_affinity(-10);
    }
}

/// Hire the day-one crew.
pub fn spawn_starting_soldiers(world: &mut World) -> Vec<String> {
    (0..STARTING_SOLDIERS)
        .map(|_| {
            let (skill, loyalty) = {
                let mut rng = world.resource_mut::<SimRng>();
                (rng.range_inclusive(3, 6), rng.range_inclusive(55, 75) as i32)
            };
            spawn_soldier(world, skill, loyalty)
        })
        .collect()
}

/// A fresh blue lantern with a random name, skills and trait.
pub fn generate_recruit(rng: &mut SimRng, id: String) -> Officer {
    let name = rng
        .pick_index(RECRUIT_NAMES.len())
        .map(|i| RECRUIT_NAMES[i])
        .unwrap_or("New Face");
    let skills = Skills::new(
        rng.range_inclusive(15, 50),
        rng.range_inclusive(15, 50),
        rng.range_inclusive(15, 50),
    );
    let mut officer = Officer::new(id, name, Rank::BlueLantern)
        .with_loyalty(rng.range_inclusive(45, 65) as i32)
        .with_face(10)
        .with_skills(skills);
    if let Some(i) = rng.pick_index(RECRUIT_TRAITS.len()) {
        officer.add_trait(RECRUIT_TRAITS[i]);
    }
    officer
}
