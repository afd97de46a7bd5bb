//! Snapshot Generation
//!
//! Read-only views of the engine for presentation layers and the headless
//! runner.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use syndicate_events::{
    generate_snapshot_id, EngineSnapshot, EventSummary, RelationshipSnapshot, SoldierSummary,
};

use super::needs::critical_needs;
use crate::components::{
    all_officers, all_soldiers, summarize, BuildingRegistry, GameClock, Ledger, RelationshipGraph,
    RivalRegistry,
};
use crate::events::{active_choices, EventQueue};

/// Resource: numbers snapshots as they are taken
#[derive(Resource, Debug, Default)]
pub struct SnapshotCounter {
    taken: u64,
}

impl SnapshotCounter {
    pub fn next_id(&mut self) -> String {
        self.taken += 1;
        generate_snapshot_id(self.taken)
    }

    pub fn count(&self) -> u64 {
        self.taken
    }
}

/// A choice on the active event, with whether the player can pay for it now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceView {
    pub choice_id: String,
    pub label: String,
    pub affordable: bool,
}

/// The event waiting on the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEventView {
    pub event: EventSummary,
    pub choices: Vec<ChoiceView>,
}

pub fn active_event_view(world: &World) -> Option<ActiveEventView> {
    let event = world.resource::<EventQueue>().active()?.summary();
    let ledger = world.resource::<Ledger>();
    let choices = active_choices(world)
        .into_iter()
        .map(|c| ChoiceView {
            affordable: ledger.can_afford(&c.requires),
            choice_id: c.id,
            label: c.label,
        })
        .collect();
    Some(ActiveEventView { event, choices })
}

pub fn pending_events(world: &World) -> Vec<EventSummary> {
    world
        .resource::<EventQueue>()
        .pending()
        .map(|e| e.summary())
        .collect()
}

pub fn soldier_summary(world: &World) -> SoldierSummary {
    summarize(all_soldiers(world))
}

/// How `officer_id` sees everyone they know, with derived categories.
pub fn relationship_view(world: &World, officer_id: &str) -> Vec<RelationshipSnapshot> {
    world
        .resource::<RelationshipGraph>()
        .relationships_for(officer_id)
        .into_iter()
        .map(|r| r.snapshot(officer_id))
        .collect()
}

/// Generate a complete engine snapshot
pub fn generate_snapshot(world: &mut World) -> EngineSnapshot {
    let snapshot_id = world.resource_mut::<SnapshotCounter>().next_id();
    let clock = world.resource::<GameClock>().clone();

    let relationships = world
        .resource::<RelationshipGraph>()
        .iter()
        .map(|(from, rel)| rel.snapshot(from))
        .collect();

    EngineSnapshot {
        snapshot_id,
        time: clock.time,
        scene: clock.scene,
        speed: clock.speed,
        paused: clock.paused,
        phase_progress: clock.progress,
        ledger: world.resource::<Ledger>().snapshot(),
        officers: all_officers(world).iter().map(|o| o.snapshot()).collect(),
        buildings: world
            .resource::<BuildingRegistry>()
            .iter()
            .map(|b| b.snapshot())
            .collect(),
        soldiers: soldier_summary(world),
        rivals: world
            .resource::<RivalRegistry>()
            .iter()
            .map(|r| r.snapshot())
            .collect(),
        relationships,
        active_event: world
            .resource::<EventQueue>()
            .active()
            .map(|e| e.summary()),
        pending_events: pending_events(world),
        critical_needs: critical_needs(world),
    }
}

/// Write a snapshot as pretty JSON, creating parent directories.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &EngineSnapshot) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::events::{emit, EventKind};
    use crate::rng::{ScriptedRolls, SimRng};
    use crate::setup::{init_resources, populate_district};

    fn setup() -> World {
        let mut world = World::new();
        init_resources(
            &mut world,
            EngineConfig::default(),
            SimRng::new(ScriptedRolls::constant(0.5)),
        );
        populate_district(&mut world);
        world
    }

    #[test]
    fn test_snapshot_reflects_district() {
        let mut world = setup();
        let snapshot = generate_snapshot(&mut world);
        assert_eq!(snapshot.snapshot_id, "snap_000001");
        assert_eq!(snapshot.officers.len(), 5);
        assert_eq!(snapshot.buildings.len(), 3);
        assert_eq!(snapshot.soldiers.count, 8);
        assert_eq!(snapshot.rivals.len(), 3);
        assert_eq!(snapshot.ledger.cash, 10_000);
        assert!(snapshot.active_event.is_none());
        assert!(snapshot
            .building("building_001")
            .is_some_and(|b| b.assigned_officer.as_deref() == Some("officer_001")));

        let second = generate_snapshot(&mut world);
        assert_eq!(second.snapshot_id, "snap_000002");
    }

    #[test]
    fn test_active_event_marks_affordability() {
        let mut world = setup();
        emit(
            &mut world,
            EventKind::PoliceShakedown { demand: 20_000 },
        );
        let view = active_event_view(&world).unwrap();
        assert_eq!(view.event.kind, "police_shakedown");
        let pay = view.choices.iter().find(|c| c.choice_id == "pay").unwrap();
        assert!(!pay.affordable);
        let refuse = view.choices.iter().find(|c| c.choice_id == "refuse").unwrap();
        assert!(refuse.affordable);
    }

    #[test]
    fn test_relationship_view_has_categories() {
        let world = setup();
        let view = relationship_view(&world, "officer_005");
        assert_eq!(view.len(), 4);
        let keung = view.iter().find(|r| r.to == "officer_002").unwrap();
        assert_eq!(keung.affinity, 35);
        assert!(!keung.friend);
    }

    #[test]
    fn test_write_snapshot() {
        let mut world = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots").join("current.json");
        let snapshot = generate_snapshot(&mut world);
        write_snapshot(&path, &snapshot).unwrap();
        let loaded: EngineSnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.snapshot_id, snapshot.snapshot_id);
        assert_eq!(loaded.officers.len(), 5);
    }
}
