//! World Setup
//!
//! Resource initialization and the starting district: buildings, rivals,
//! founding officers and soldiers.

pub mod district;
pub mod roster;

pub use district::*;
pub use roster::*;

use bevy_ecs::prelude::*;

use crate::components::IdSequence;

/// Fill an initialized world with the starting district.
pub fn populate_district(world: &mut World) {
    let buildings = {
        let mut ids = world.resource_mut::<IdSequence>();
        create_buildings(&mut ids)
    };
    world.insert_resource(buildings);
    world.insert_resource(create_rivals());

    let officers = spawn_founders(world);
    seed_relationships(world, &officers);
    let soldiers = spawn_starting_soldiers(world);

    tracing::info!(
        officers = officers.len(),
        soldiers = soldiers.len(),
        "Starting district populated"
    );
}
