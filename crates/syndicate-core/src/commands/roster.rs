//! Roster Commands
//!
//! Posting officers, hiring, healing, bail, promotion, succession and exile.

use bevy_ecs::prelude::*;
use syndicate_events::EntryCategory;

use crate::chronicle;
use crate::components::{
    all_officers, find_officer, officer_by_id, spawn_soldier, update_officer, BuildingRegistry,
    Cost, GameClock, IdSequence, InternalFriction, Ledger, Officer, Rank, RelationshipGraph,
};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::rng::SimRng;
use crate::setup::generate_recruit;

/// Loyalty changes from roster decisions
pub mod roster_constants {
    /// Loyalty gained from being promoted
    pub const PROMOTION_LOYALTY: i32 = 10;
    /// Loyalty gained from being named successor
    pub const SUCCESSOR_LOYALTY: i32 = 10;
    /// Loyalty lost by officers who liked an exile
    pub const EXILE_FRIEND_LOYALTY: i32 = -8;
    /// Friction relieved by exiling a troublemaker
    pub const EXILE_FRICTION: i32 = -10;
    pub const HEAL_ENERGY: u32 = 50;
    pub const RECRUIT_SKILL_MIN: u32 = 2;
    pub const RECRUIT_SKILL_MAX: u32 = 5;
    pub const RECRUIT_LOYALTY: i32 = 50;
}

use roster_constants::*;

fn existing_officer(world: &World, officer_id: &str) -> Result<Officer, CommandError> {
    officer_by_id(world, officer_id)
        .cloned()
        .ok_or_else(|| CommandError::OfficerNotFound(officer_id.to_string()))
}

fn record_roster(world: &mut World, summary: String, officer_id: &str) {
    let subject = officer_id.to_string();
    chronicle::record(world, EntryCategory::Roster, summary, |e| {
        e.with_subject(subject)
    });
}

/// Post an officer to a building.
pub fn assign_officer(
    world: &mut World,
    officer_id: &str,
    building_id: &str,
) -> Result<(), CommandError> {
    let officer = existing_officer(world, officer_id)?;
    if !officer.is_available() {
        return Err(CommandError::OfficerUnavailable(officer_id.to_string()));
    }
    if officer.assigned_building.is_some() {
        return Err(CommandError::OfficerAlreadyAssigned(officer_id.to_string()));
    }

    let day = world.resource::<GameClock>().day();
    let building = world
        .resource::<BuildingRegistry>()
        .get(building_id)
        .cloned()
        .ok_or_else(|| CommandError::BuildingNotFound(building_id.to_string()))?;
    if building.occupied() {
        return Err(CommandError::BuildingOccupied(building_id.to_string()));
    }
    if !building.can_staff(day) {
        return Err(CommandError::BuildingUnavailable(building_id.to_string()));
    }

    if let Some(b) = world.resource_mut::<BuildingRegistry>().get_mut(building_id) {
        b.assigned_officer = Some(officer_id.to_string());
    }
    update_officer(world, officer_id, |o| {
        o.assigned_building = Some(building_id.to_string())
    });
    tracing::debug!(officer = officer_id, building = building_id, "Officer assigned");
    record_roster(
        world,
        format!("{} now runs {}", officer.name, building.building_type.label()),
        officer_id,
    );
    Ok(())
}

/// Take an officer off their post.
pub fn unassign_officer(world: &mut World, officer_id: &str) -> Result<String, CommandError> {
    let officer = existing_officer(world, officer_id)?;
    let building_id = officer
        .assigned_building
        .ok_or_else(|| CommandError::OfficerNotAssigned(officer_id.to_string()))?;
    world.resource_mut::<BuildingRegistry>().vacate(officer_id);
    update_officer(world, officer_id, |o| o.assigned_building = None);
    tracing::debug!(officer = officer_id, building = %building_id, "Officer unassigned");
    Ok(building_id)
}

/// Hire a soldier off the street.
pub fn recruit_soldier(world: &mut World) -> Result<String, CommandError> {
    let cost = Cost::cash(world.resource::<EngineConfig>().economy.soldier_recruit_cost);
    world.resource_mut::<Ledger>().try_spend(&cost)?;
    let skill = world
        .resource_mut::<SimRng>()
        .range_inclusive(RECRUIT_SKILL_MIN, RECRUIT_SKILL_MAX);
    let id = spawn_soldier(world, skill, RECRUIT_LOYALTY);
    tracing::info!(soldier = %id, skill, "Soldier recruited");
    Ok(id)
}

/// Bring a new officer into the organization.
pub fn recruit_officer(world: &mut World) -> Result<String, CommandError> {
    let economy = world.resource::<EngineConfig>().economy.clone();
    let reputation = world.resource::<Ledger>().reputation();
    if reputation < economy.officer_recruit_min_reputation {
        return Err(CommandError::NotEligible(format!(
            "nobody will join an organization with reputation {}",
            reputation
        )));
    }
    world
        .resource_mut::<Ledger>()
        .try_spend(&Cost::cash(economy.officer_recruit_cost))?;

    let id = world.resource_mut::<IdSequence>().next_officer_id();
    let recruit = generate_recruit(&mut world.resource_mut::<SimRng>(), id.clone());
    let name = recruit.name.clone();
    let others: Vec<String> = all_officers(world).iter().map(|o| o.id.clone()).collect();
    world.spawn(recruit);
    {
        let mut graph = world.resource_mut::<RelationshipGraph>();
        for other in &others {
            graph.ensure_pair(&id, other);
        }
    }
    tracing::info!(officer = %id, "Officer recruited");
    record_roster(world, format!("{} joins as a blue lantern", name), &id);
    Ok(id)
}

/// Pay a doctor to patch up a wounded officer.
pub fn heal_officer(world: &mut World, officer_id: &str) -> Result<(), CommandError> {
    let officer = existing_officer(world, officer_id)?;
    if !officer.is_wounded() {
        return Err(CommandError::NotEligible(format!(
            "{} is not wounded",
            officer.name
        )));
    }
    let cost = Cost::cash(world.resource::<EngineConfig>().economy.heal_cost);
    world.resource_mut::<Ledger>().try_spend(&cost)?;
    update_officer(world, officer_id, |o| {
        o.wounded_days = 0;
        o.restore_energy(HEAL_ENERGY);
    });
    record_roster(world, format!("{} is back on their feet", officer.name), officer_id);
    Ok(())
}

/// Post bail for an arrested officer.
pub fn release_officer(world: &mut World, officer_id: &str) -> Result<(), CommandError> {
    let officer = existing_officer(world, officer_id)?;
    if !officer.arrested {
        return Err(CommandError::NotEligible(format!(
            "{} is not in custody",
            officer.name
        )));
    }
    let economy = &world.resource::<EngineConfig>().economy;
    let cost = Cost::cash(economy.bail_cost).with_influence(economy.bail_influence);
    world.resource_mut::<Ledger>().try_spend(&cost)?;
    update_officer(world, officer_id, |o| o.arrested = false);
    record_roster(world, format!("{} made bail", officer.name), officer_id);
    Ok(())
}

/// Raise an officer one rank. Requires enough face.
pub fn promote_officer(world: &mut World, officer_id: &str) -> Result<Rank, CommandError> {
    let officer = existing_officer(world, officer_id)?;
    if !officer.is_available() {
        return Err(CommandError::OfficerUnavailable(officer_id.to_string()));
    }
    let min_face = world.resource::<EngineConfig>().loyalty.promotion_face;
    if officer.face < min_face {
        return Err(CommandError::NotEligible(format!(
            "{} needs {} face to be promoted, has {}",
            officer.name, min_face, officer.face
        )));
    }
    let rank = officer.rank.promoted(&officer.skills).ok_or_else(|| {
        CommandError::NotEligible(format!("{} cannot rise any higher", officer.name))
    })?;

    update_officer(world, officer_id, |o| {
        o.rank = rank;
        o.adjust_loyalty(PROMOTION_LOYALTY);
    });
    tracing::info!(officer = officer_id, rank = rank.label(), "Officer promoted");
    record_roster(
        world,
        format!("{} promoted to {}", officer.name, rank.label()),
        officer_id,
    );
    Ok(rank)
}

/// Name the officer who takes over if the leader falls. Replaces any
/// previous successor.
pub fn designate_successor(world: &mut World, officer_id: &str) -> Result<(), CommandError> {
    let officer = existing_officer(world, officer_id)?;
    if !officer.is_available() {
        return Err(CommandError::OfficerUnavailable(officer_id.to_string()));
    }
    if officer.successor {
        return Err(CommandError::NotEligible(format!(
            "{} is already the successor",
            officer.name
        )));
    }

    let mut officers = world.query::<&mut Officer>();
    for mut o in officers.iter_mut(world) {
        if o.id == officer_id {
            o.successor = true;
            o.adjust_loyalty(SUCCESSOR_LOYALTY);
        } else if o.successor {
            o.successor = false;
        }
    }
    record_roster(
        world,
        format!("{} is named successor", officer.name),
        officer_id,
    );
    Ok(())
}

/// Drive an officer out of the organization for good.
pub fn exile_officer(world: &mut World, officer_id: &str) -> Result<(), CommandError> {
    let officer = existing_officer(world, officer_id)?;
    let entity = find_officer(world, officer_id)
        .ok_or_else(|| CommandError::OfficerNotFound(officer_id.to_string()))?;

    let friends: Vec<String> = {
        let graph = world.resource::<RelationshipGraph>();
        graph
            .iter()
            .filter(|(_, rel)| rel.target_id == officer_id && rel.is_friend())
            .map(|(from, _)| from.to_string())
            .collect()
    };

    world.despawn(entity);
    world.resource_mut::<BuildingRegistry>().vacate(officer_id);
    world.resource_mut::<RelationshipGraph>().forget(officer_id);
    world.resource_mut::<InternalFriction>().adjust(EXILE_FRICTION);
    for friend in &friends {
        update_officer(world, friend, |o| o.adjust_loyalty(EXILE_FRIEND_LOYALTY));
    }

    tracing::info!(officer = officer_id, friends = friends.len(), "Officer exiled");
    record_roster(world, format!("{} has been exiled", officer.name), officer_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Building, BuildingType, Relationship, Soldier};
    use crate::rng::ScriptedRolls;
    use crate::setup::init_resources;

    fn setup() -> World {
        let mut world = World::new();
        init_resources(
            &mut world,
            EngineConfig::default(),
            SimRng::new(ScriptedRolls::constant(0.0)),
        );
        world.spawn(Officer::new("officer_001", "Uncle Wah", Rank::Deputy));
        world.spawn(Officer::new("officer_002", "Ah Keung", Rank::RedPole).with_face(70));
        {
            let mut ids = world.resource_mut::<IdSequence>();
            ids.next_officer_id();
            ids.next_officer_id();
        }
        {
            let mut buildings = world.resource_mut::<BuildingRegistry>();
            buildings.register(Building::new("building_001", BuildingType::Teahouse));
            buildings.register(Building::new("building_002", BuildingType::NoodleStall));
        }
        world
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut world = setup();
        assign_officer(&mut world, "officer_001", "building_001").unwrap();
        assert_eq!(
            world
                .resource::<BuildingRegistry>()
                .get("building_001")
                .unwrap()
                .assigned_officer
                .as_deref(),
            Some("officer_001")
        );

        assert_eq!(
            unassign_officer(&mut world, "officer_001").unwrap(),
            "building_001"
        );
        assert!(!world
            .resource::<BuildingRegistry>()
            .get("building_001")
            .unwrap()
            .occupied());
        assert_eq!(
            unassign_officer(&mut world, "officer_001"),
            Err(CommandError::OfficerNotAssigned("officer_001".into()))
        );
    }

    #[test]
    fn test_assignment_rejections() {
        let mut world = setup();
        assign_officer(&mut world, "officer_001", "building_001").unwrap();

        assert_eq!(
            assign_officer(&mut world, "officer_002", "building_001"),
            Err(CommandError::BuildingOccupied("building_001".into()))
        );
        assert_eq!(
            assign_officer(&mut world, "officer_001", "building_002"),
            Err(CommandError::OfficerAlreadyAssigned("officer_001".into()))
        );
        assert_eq!(
            assign_officer(&mut world, "officer_009", "building_002"),
            Err(CommandError::OfficerNotFound("officer_009".into()))
        );
        assert_eq!(
            assign_officer(&mut world, "officer_002", "building_404"),
            Err(CommandError::BuildingNotFound("building_404".into()))
        );

        update_officer(&mut world, "officer_002", |o| o.wounded_days = 2);
        assert_eq!(
            assign_officer(&mut world, "officer_002", "building_002"),
            Err(CommandError::OfficerUnavailable("officer_002".into()))
        );

        update_officer(&mut world, "officer_002", |o| o.wounded_days = 0);
        world
            .resource_mut::<BuildingRegistry>()
            .get_mut("building_002")
            .unwrap()
            .inactive_until_day = Some(5);
        assert_eq!(
            assign_officer(&mut world, "officer_002", "building_002"),
            Err(CommandError::BuildingUnavailable("building_002".into()))
        );
    }

    #[test]
    fn test_recruit_soldier_spends_cash() {
        let mut world = setup();
        let before = world.resource::<Ledger>().cash();
        let id = recruit_soldier(&mut world).unwrap();
        assert_eq!(id, "soldier_001");
        assert_eq!(world.resource::<Ledger>().cash(), before - 500);

        world.insert_resource(Ledger::new(100, 30, 10, 20, 20));
        assert!(matches!(
            recruit_soldier(&mut world),
            Err(CommandError::InsufficientResources { resource: "cash", .. })
        ));
        let soldiers = world.query::<&Soldier>().iter(&world).count();
        assert_eq!(soldiers, 1);
    }

    #[test]
    fn test_recruit_officer_needs_reputation() {
        let mut world = setup();
        world.insert_resource(Ledger::new(10_000, 10, 10, 20, 20));
        assert!(matches!(
            recruit_officer(&mut world),
            Err(CommandError::NotEligible(_))
        ));
        assert_eq!(world.resource::<Ledger>().cash(), 10_000);

        world.insert_resource(Ledger::new(10_000, 30, 10, 20, 20));
        let id = recruit_officer(&mut world).unwrap();
        assert_eq!(id, "officer_003");
        let graph = world.resource::<RelationshipGraph>();
        assert!(graph.has_relationship("officer_002", &id));
    }

    #[test]
    fn test_heal_and_bail() {
        let mut world = setup();
        assert!(matches!(
            heal_officer(&mut world, "officer_001"),
            Err(CommandError::NotEligible(_))
        ));
        update_officer(&mut world, "officer_001", |o| {
            o.wound(3, 10);
        });
        heal_officer(&mut world, "officer_001").unwrap();
        let wah = officer_by_id(&world, "officer_001").unwrap();
        assert!(!wah.is_wounded());
        assert_eq!(wah.energy, 60);

        update_officer(&mut world, "officer_002", |o| {
            o.arrest();
        });
        let influence = world.resource::<Ledger>().influence();
        release_officer(&mut world, "officer_002").unwrap();
        assert!(!officer_by_id(&world, "officer_002").unwrap().arrested);
        assert_eq!(world.resource::<Ledger>().influence(), influence - 5);
    }

    #[test]
    fn test_promotion_is_face_gated() {
        let mut world = setup();
        assert!(matches!(
            promote_officer(&mut world, "officer_001"),
            Err(CommandError::NotEligible(_))
        ));
        assert_eq!(promote_officer(&mut world, "officer_002"), Ok(Rank::Deputy));
        assert_eq!(officer_by_id(&world, "officer_002").unwrap().loyalty, 70);
    }

    #[test]
    fn test_single_successor() {
        let mut world = setup();
        designate_successor(&mut world, "officer_001").unwrap();
        designate_successor(&mut world, "officer_002").unwrap();
        assert!(!officer_by_id(&world, "officer_001").unwrap().successor);
        assert!(officer_by_id(&world, "officer_002").unwrap().successor);
    }

    #[test]
    fn test_exile_removes_everything() {
        let mut world = setup();
        assign_officer(&mut world, "officer_002", "building_002").unwrap();
        world.resource_mut::<RelationshipGraph>().set(
            "officer_001",
            Relationship::new("officer_002").with_affinity(70),
        );
        world.resource_mut::<RelationshipGraph>().ensure_pair("officer_001", "officer_002");

        exile_officer(&mut world, "officer_002").unwrap();
        assert!(officer_by_id(&world, "officer_002").is_none());
        assert!(!world
            .resource::<BuildingRegistry>()
            .get("building_002")
            .unwrap()
            .occupied());
        assert!(world.resource::<RelationshipGraph>().is_empty());
        assert_eq!(officer_by_id(&world, "officer_001").unwrap().loyalty, 52);
    }
}
