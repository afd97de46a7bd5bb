//! District Setup
//!
//! Engine resources, the starting businesses and the rival organizations.

use bevy_ecs::prelude::*;

use crate::chronicle::Chronicle;
use crate::commands::diplomacy::PendingProposal;
use crate::components::{
    Building, BuildingRegistry, BuildingType, GameClock, IdSequence, InternalFriction, Ledger,
    RelationshipGraph, RivalFaction, RivalRegistry,
};
use crate::config::EngineConfig;
use crate::events::EventQueue;
use crate::output::SnapshotCounter;
use crate::rng::SimRng;
use crate::systems::council::CouncilSession;
use crate::systems::upkeep::{build_daily_upkeep, DailyBooks};

/// Insert every resource the engine reads, with empty registries.
pub fn init_resources(world: &mut World, config: EngineConfig, rng: SimRng) {
    world.insert_resource(Ledger::from_config(&config.economy));
    world.insert_resource(config);
    world.insert_resource(GameClock::new());
    world.insert_resource(BuildingRegistry::new());
    world.insert_resource(RivalRegistry::new());
    world.insert_resource(RelationshipGraph::new());
    world.insert_resource(InternalFriction::default());
    world.insert_resource(EventQueue::new());
    world.insert_resource(IdSequence::new());
    world.insert_resource(Chronicle::default());
    world.insert_resource(DailyBooks::default());
    world.insert_resource(CouncilSession::default());
    world.insert_resource(PendingProposal::default());
    world.insert_resource(SnapshotCounter::default());
    world.insert_resource(rng);
    world.add_schedule(build_daily_upkeep());
}

/// The businesses held at the start, in id order. The first is the home base.
pub fn create_buildings(ids: &mut IdSequence) -> BuildingRegistry {
    let mut registry = BuildingRegistry::new();
    for building_type in [
        BuildingType::Teahouse,
        BuildingType::NoodleStall,
        BuildingType::MahjongParlor,
    ] {
        registry.register(Building::new(ids.next_building_id(), building_type));
    }
    registry
}

/// The other organizations working the same streets.
pub fn create_rivals() -> RivalRegistry {
    let mut registry = RivalRegistry::new();

    // Old-money society with police friends
    registry.register(RivalFaction::new("rival_001", "Iron Lotus", 45));

    // Expanding hard into the market streets
    registry.register(
        RivalFaction::new("rival_002", "Jade Serpent Society", 60)
            .with_relationship(-20)
            .with_tension(20),
    );

    // Dockside crew, small and open to business
    registry.register(RivalFaction::new("rival_003", "Harbour Boys", 30).with_relationship(10));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buildings_take_sequence_ids() {
        let mut ids = IdSequence::new();
        let registry = create_buildings(&mut ids);
        assert_eq!(
            registry.building_ids(),
            vec!["building_001", "building_002", "building_003"]
        );
        assert_eq!(ids.next_building_id(), "building_004");
    }

    #[test]
    fn test_rivals_start_unaligned() {
        let rivals = create_rivals();
        assert_eq!(rivals.len(), 3);
        assert!(rivals.iter().all(|r| !r.alliance && !r.trade_agreement));
        assert!(rivals.iter().all(|r| !r.is_hostile()));
    }
}
