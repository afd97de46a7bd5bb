//! Territory Commands
//!
//! Buying new businesses and upgrading the ones already held.

use bevy_ecs::prelude::*;
use syndicate_events::EntryCategory;

use crate::chronicle;
use crate::components::{Building, BuildingRegistry, BuildingType, Cost, IdSequence, Ledger};
use crate::error::CommandError;

/// Buy a business of the given type. Returns the new building id.
pub fn acquire_building(
    world: &mut World,
    building_type: BuildingType,
) -> Result<String, CommandError> {
    let cost = Cost::cash(building_type.stats().acquire_cost);
    world.resource_mut::<Ledger>().try_spend(&cost)?;

    let id = world.resource_mut::<IdSequence>().next_building_id();
    world
        .resource_mut::<BuildingRegistry>()
        .register(Building::new(id.clone(), building_type));

    tracing::info!(building = %id, kind = building_type.label(), cost = cost.cash, "Building acquired");
    let subject = id.clone();
    chronicle::record(
        world,
        EntryCategory::Economy,
        format!("Bought a {} for {}", building_type.label(), cost.cash),
        |e| e.with_subject(subject),
    );
    Ok(id)
}

/// Refit a building for the upgraded revenue multiplier.
pub fn upgrade_building(world: &mut World, building_id: &str) -> Result<(), CommandError> {
    let building = world
        .resource::<BuildingRegistry>()
        .get(building_id)
        .cloned()
        .ok_or_else(|| CommandError::BuildingNotFound(building_id.to_string()))?;
    if building.rebel_base.is_some() {
        return Err(CommandError::BuildingUnavailable(building_id.to_string()));
    }
    if building.upgraded {
        return Err(CommandError::NotEligible(format!(
            "{} is already upgraded",
            building_id
        )));
    }

    let cost = Cost::cash(building.building_type.stats().upgrade_cost);
    world.resource_mut::<Ledger>().try_spend(&cost)?;
    if let Some(b) = world.resource_mut::<BuildingRegistry>().get_mut(building_id) {
        b.upgraded = true;
    }

    tracing::info!(building = building_id, "Building upgraded");
    let subject = building_id.to_string();
    chronicle::record(
        world,
        EntryCategory::Economy,
        format!("Upgraded the {}", building.building_type.label()),
        |e| e.with_subject(subject),
    );
    Ok(())
}
