//! Event Resolution
//!
//! Raising events onto the queue, resolving the active one with a choice, and
//! applying outcome effects to the world.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::{tags, EntryCategory, EventId};

use super::catalog::{self, pick_outcome, Effect, EventChoice, Outcome};
use super::kinds::{EventKind, GameEvent, Grievance};
use super::queue::EventQueue;
use crate::chronicle;
use crate::components::{
    find_officer, spawn_soldier, update_officer, Building, BuildingRegistry, GameClock,
    IdSequence, InternalFriction, Ledger, RelationshipGraph, ResourceDelta, RivalRegistry,
    Soldier,
};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::rng::SimRng;
use crate::systems::conflict::{remove_random_soldiers, resolve_conflict, ConflictReport};
use crate::systems::relationship::loyalty_shock;

/// Loyalty a reconciled rebel returns with
const RECONCILED_LOYALTY: i32 = 40;

/// What resolving an event did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub event_id: EventId,
    pub choice_id: String,
    pub description: String,
    pub delta: ResourceDelta,
    pub conflict: Option<ConflictReport>,
}

/// Queue an event. Coup attempts split the organization the moment they are
/// raised: the officer turns and takes the building and some soldiers along.
pub fn emit(world: &mut World, kind: EventKind) -> EventId {
    let kind = match kind {
        EventKind::CoupAttempt {
            officer_id,
            building_id,
            rebel_soldiers,
            defender,
        } => {
            let rebels = split_off_rebels(world, &officer_id, &building_id, rebel_soldiers);
            EventKind::CoupAttempt {
                officer_id,
                building_id,
                rebel_soldiers: rebels,
                defender,
            }
        }
        other => other,
    };

    let time = world.resource::<GameClock>().time;
    let event = GameEvent::new(kind, time);
    let event_id = event.id;
    let blocking = event.is_blocking();
    let title = event.kind.title();
    let label = event.kind.label();
    let subjects = event.kind.subjects();

    let became_active = world.resource_mut::<EventQueue>().push(event);
    tracing::info!(kind = label, blocking, became_active, "Event raised: {}", title);

    chronicle::record(world, EntryCategory::Event, title, |mut e| {
        e = e.with_event(event_id).with_tag(label);
        if blocking {
            e = e.with_tag(tags::BLOCKING);
        }
        match label {
            "officer_betrayal" => e = e.with_tag(tags::BETRAYAL),
            "coup_attempt" => e = e.with_tag(tags::REBELLION),
            "romance_scandal" => e = e.with_tag(tags::ROMANCE),
            _ => {}
        }
        for subject in subjects {
            e = e.with_subject(subject);
        }
        e
    });

    event_id
}

fn split_off_rebels(world: &mut World, officer_id: &str, building_id: &str, wanted: u32) -> u32 {
    update_officer(world, officer_id, |officer| {
        officer.traitor = true;
        officer.assigned_building = None;
    });
    let rebels = remove_random_soldiers(world, wanted);
    let mut buildings = world.resource_mut::<BuildingRegistry>();
    buildings.vacate(officer_id);
    if let Some(building) = buildings.get_mut(building_id) {
        building.seize(officer_id, rebels);
    }
    rebels
}

/// Choices for the currently active event.
pub fn active_choices(world: &World) -> Vec<EventChoice> {
    let config = world.resource::<EngineConfig>();
    world
        .resource::<EventQueue>()
        .active()
        .map(|event| catalog::choices(&event.kind, config))
        .unwrap_or_default()
}

/// Resolve the active event with one of its choices.
pub fn resolve(
    world: &mut World,
    event_id: EventId,
    choice_id: &str,
) -> Result<Resolution, CommandError> {
    let event = world
        .resource::<EventQueue>()
        .active()
        .filter(|e| e.id == event_id)
        .cloned()
        .ok_or(CommandError::EventNotActive(event_id))?;

    let choice = catalog::choices(&event.kind, world.resource::<EngineConfig>())
        .into_iter()
        .find(|c| c.id == choice_id)
        .ok_or_else(|| CommandError::UnknownChoice(choice_id.to_string()))?;

    if !world.resource::<Ledger>().can_afford(&choice.requires) {
        tracing::debug!(choice = choice_id, "Choice requirements not met");
        return Err(CommandError::RequirementsNotMet(choice_id.to_string()));
    }

    world.resource_mut::<EventQueue>().take_active();

    let roll = world.resource_mut::<SimRng>().roll();
    let outcome = pick_outcome(roll, &choice.outcomes)
        .cloned()
        .unwrap_or_else(|| Outcome::certain("Nothing comes of it"));

    world.resource_mut::<Ledger>().apply(&outcome.delta);

    let mut conflict = None;
    for effect in &outcome.effects {
        if let Some(report) = apply_effect(world, effect) {
            conflict = Some(report);
        }
    }

    tracing::info!(
        kind = event.kind.label(),
        choice = choice_id,
        "Event resolved: {}",
        outcome.description
    );
    let summary = format!("{}: {}", choice.label, outcome.description);
    chronicle::record(world, EntryCategory::Event, summary, |e| {
        e.with_event(event_id).with_tag(event.kind.label())
    });

    Ok(Resolution {
        event_id,
        choice_id: choice.id,
        description: outcome.description,
        delta: outcome.delta,
        conflict,
    })
}

/// Close a non-blocking active event without choosing.
pub fn dismiss(world: &mut World, event_id: EventId) -> Result<(), CommandError> {
    let mut queue = world.resource_mut::<EventQueue>();
    let blocking = queue
        .active()
        .filter(|e| e.id == event_id)
        .map(|e| e.is_blocking())
        .ok_or(CommandError::EventNotActive(event_id))?;
    if blocking {
        return Err(CommandError::ChoiceRequired);
    }
    if let Some(event) = queue.take_active() {
        tracing::debug!(kind = event.kind.label(), "Event dismissed");
    }
    Ok(())
}

/// Apply one outcome effect. Returns the report when the effect was a fight.
pub fn apply_effect(world: &mut World, effect: &Effect) -> Option<ConflictReport> {
    match effect {
        Effect::Conflict(spec) => return Some(resolve_conflict(world, spec)),

        Effect::OfficerLoyalty { officer_id, delta } => {
            update_officer(world, officer_id, |o| o.adjust_loyalty(*delta));
        }
        Effect::OfficerFace { officer_id, delta } => {
            update_officer(world, officer_id, |o| o.adjust_face(*delta));
        }
        Effect::WoundOfficer { officer_id, days } => {
            let floor = world.resource::<EngineConfig>().conflict.wound_energy_floor;
            update_officer(world, officer_id, |o| o.wound(*days, floor));
            world.resource_mut::<BuildingRegistry>().vacate(officer_id);
        }
        Effect::MarkTraitor { officer_id } => {
            update_officer(world, officer_id, |o| {
                o.traitor = true;
                o.successor = false;
                o.assigned_building = None;
            });
            world.resource_mut::<BuildingRegistry>().vacate(officer_id);
            let subject = officer_id.clone();
            chronicle::record(
                world,
                EntryCategory::Loyalty,
                format!("{} has defected", officer_id),
                |e| e.with_tag(tags::BETRAYAL).with_subject(subject),
            );
        }
        Effect::RemoveOfficer { officer_id } => {
            if let Some(entity) = find_officer(world, officer_id) {
                world.despawn(entity);
            }
            world.resource_mut::<BuildingRegistry>().vacate(officer_id);
            world.resource_mut::<RelationshipGraph>().forget(officer_id);
        }
        Effect::Reconcile {
            officer_id,
            building_id,
        } => reconcile(world, officer_id, building_id),
        Effect::Promote { officer_id } => {
            let promoted = update_officer(world, officer_id, |o| {
                o.rank.promoted(&o.skills).map(|rank| {
                    o.rank = rank;
                    rank
                })
            })
            .flatten();
            if let Some(rank) = promoted {
                let subject = officer_id.clone();
                chronicle::record(
                    world,
                    EntryCategory::Roster,
                    format!("{} promoted to {}", officer_id, rank.label()),
                    |e| e.with_subject(subject),
                );
            }
        }
        Effect::LoyaltyShock { reason } => loyalty_shock(world, reason),

        Effect::SoldierLoyalty(delta) => {
            let mut soldiers = world.query::<&mut Soldier>();
            for mut soldier in soldiers.iter_mut(world) {
                soldier.adjust_loyalty(*delta);
            }
        }
        Effect::SoldierNeeds { grievance, delta } => {
            let (food, entertainment, pay) = match grievance {
                Grievance::Food => (*delta, 0, 0),
                Grievance::Entertainment => (0, *delta, 0),
                Grievance::Pay => (0, 0, *delta),
            };
            let mut soldiers = world.query::<&mut Soldier>();
            for mut soldier in soldiers.iter_mut(world) {
                soldier.needs.adjust(food, entertainment, pay);
            }
        }
        Effect::LoseSoldiers(count) => {
            remove_random_soldiers(world, *count);
        }

        Effect::CloseBuilding { building_id, days } => {
            let day = world.resource::<GameClock>().day();
            if let Some(building) = world.resource_mut::<BuildingRegistry>().get_mut(building_id) {
                building.inactive_until_day = Some(day + days);
            }
        }
        Effect::LoseBuilding { building_id } => {
            let removed = world.resource_mut::<BuildingRegistry>().remove(building_id);
            if let Some(officer_id) = removed.and_then(|b| b.assigned_officer) {
                update_officer(world, &officer_id, |o| o.assigned_building = None);
            }
        }
        Effect::AcquireBuilding(building_type) => {
            let id = world.resource_mut::<IdSequence>().next_building_id();
            world
                .resource_mut::<BuildingRegistry>()
                .register(Building::new(id.clone(), *building_type));
            chronicle::record(
                world,
                EntryCategory::Economy,
                format!("Acquired a {} as {}", building_type.label(), id),
                |e| e.with_subject(id.clone()),
            );
        }
        Effect::RebelReinforcements {
            building_id,
            soldiers,
        } => {
            let defected = remove_random_soldiers(world, *soldiers);
            let mut buildings = world.resource_mut::<BuildingRegistry>();
            if let Some(base) = buildings
                .get_mut(building_id)
                .and_then(|b| b.rebel_base.as_mut())
            {
                base.soldiers += defected;
            }
        }

        Effect::RivalRelationship { rival_id, delta } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.adjust_relationship(*delta);
            }
        }
        Effect::RivalTension { rival_id, delta } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.adjust_tension(*delta);
            }
        }
        Effect::RivalStrength { rival_id, delta } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.strength = (rival.strength as i64 + *delta as i64).max(0) as u32;
            }
        }
        Effect::TradeAgreement { rival_id } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.trade_agreement = true;
            }
        }
        Effect::Alliance { rival_id } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.alliance = true;
            }
        }
        Effect::Truce { rival_id } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.settle_conflict();
            }
        }

        Effect::PairAffinity { a, b, delta } => {
            let mut graph = world.resource_mut::<RelationshipGraph>();
            graph.ensure_relationship(a, b).adjust_affinity(*delta);
            graph.ensure_relationship(b, a).adjust_affinity(*delta);
        }
        Effect::PairRomance { a, b, delta } => {
            let mut graph = world.resource_mut::<RelationshipGraph>();
            graph.ensure_relationship(a, b).adjust_romantic_interest(*delta);
            graph.ensure_relationship(b, a).adjust_romantic_interest(*delta);
        }
        Effect::Friction(delta) => world.resource_mut::<InternalFriction>().adjust(*delta),
    }
    None
}

/// A rebel officer returns with their soldiers and keeps the building.
fn reconcile(world: &mut World, officer_id: &str, building_id: &str) {
    let base = world
        .resource_mut::<BuildingRegistry>()
        .get_mut(building_id)
        .and_then(|b| b.rebel_base.take());
    let Some(base) = base else {
        tracing::warn!("No rebel base at {} to reconcile", building_id);
        return;
    };

    let present = update_officer(world, officer_id, |o| {
        o.traitor = false;
        o.loyalty = o.loyalty.max(RECONCILED_LOYALTY);
        o.assigned_building = Some(building_id.to_string());
    })
    .is_some();
    if present {
        if let Some(building) = world.resource_mut::<BuildingRegistry>().get_mut(building_id) {
            building.assigned_officer = Some(officer_id.to_string());
        }
    }

    for _ in 0..base.soldiers {
        let skill = world.resource_mut::<SimRng>().range_inclusive(3, 6);
        spawn_soldier(world, skill, RECONCILED_LOYALTY);
    }
    world.resource_mut::<InternalFriction>().reset();

    let subject = officer_id.to_string();
    chronicle::record(
        world,
        EntryCategory::Loyalty,
        format!("{} returns to the fold with {} soldiers", officer_id, base.soldiers),
        |e| e.with_tag(tags::REBELLION).with_subject(subject),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronicle::Chronicle;
    use crate::components::{BuildingType, Officer, Rank, RivalFaction};
    use crate::rng::ScriptedRolls;

    fn world_with(roll: f64) -> World {
        let mut world = World::new();
        world.insert_resource(EngineConfig::default());
        world.insert_resource(GameClock::new());
        world.insert_resource(Ledger::new(5_000, 30, 40, 20, 20));
        world.insert_resource(EventQueue::new());
        world.insert_resource(BuildingRegistry::new());
        world.insert_resource(RivalRegistry::new());
        world.insert_resource(RelationshipGraph::new());
        world.insert_resource(InternalFriction::default());
        world.insert_resource(IdSequence::new());
        world.insert_resource(Chronicle::default());
        world.insert_resource(SimRng::new(ScriptedRolls::constant(roll)));
        world
    }

    #[test]
    fn test_resolve_applies_outcome_and_promotes_next() {
        let mut world = world_with(0.1);
        let first = emit(&mut world, EventKind::PoliceShakedown { demand: 400 });
        let second = emit(&mut world, EventKind::PoliceShakedown { demand: 600 });

        let resolution = resolve(&mut world, first, "pay").unwrap();
        assert_eq!(resolution.delta.cash, -400);
        assert_eq!(world.resource::<Ledger>().cash(), 4_600);
        assert_eq!(world.resource::<Ledger>().heat(), 35);
        assert!(world.resource::<EventQueue>().is_active(second));
    }

    #[test]
    fn test_unaffordable_choice_is_a_no_op() {
        let mut world = world_with(0.1);
        let id = emit(&mut world, EventKind::PoliceShakedown { demand: 9_000 });

        let err = resolve(&mut world, id, "pay").unwrap_err();
        assert_eq!(err, CommandError::RequirementsNotMet("pay".into()));
        assert_eq!(world.resource::<Ledger>().cash(), 5_000);
        assert!(world.resource::<EventQueue>().is_active(id));
    }

    #[test]
    fn test_unknown_choice_and_stale_event() {
        let mut world = world_with(0.1);
        let id = emit(&mut world, EventKind::PoliceShakedown { demand: 100 });
        assert_eq!(
            resolve(&mut world, id, "shoot_the_sergeant").unwrap_err(),
            CommandError::UnknownChoice("shoot_the_sergeant".into())
        );
        let stale = EventId::new();
        assert_eq!(
            resolve(&mut world, stale, "pay").unwrap_err(),
            CommandError::EventNotActive(stale)
        );
    }

    #[test]
    fn test_blocking_event_cannot_be_dismissed() {
        let mut world = world_with(0.1);
        world.resource_mut::<RivalRegistry>().register(RivalFaction::new(
            "rival_001",
            "Jade Serpent Society",
            60,
        ));
        let id = emit(
            &mut world,
            EventKind::StreetWar {
                rival_id: "rival_001".into(),
                officer_id: None,
            },
        );
        assert_eq!(dismiss(&mut world, id), Err(CommandError::ChoiceRequired));
        assert!(world.resource::<EventQueue>().is_blocked());

        let info = emit(&mut world, EventKind::PoliceShakedown { demand: 100 });
        assert!(!world.resource::<EventQueue>().is_active(info));
    }

    #[test]
    fn test_dismiss_informational() {
        let mut world = world_with(0.1);
        let id = emit(
            &mut world,
            EventKind::InformantTip {
                rival_id: "rival_001".into(),
                price: 300,
            },
        );
        dismiss(&mut world, id).unwrap();
        assert!(world.resource::<EventQueue>().is_empty());
    }

    #[test]
    fn test_coup_splits_building_and_soldiers() {
        let mut world = world_with(0.0);
        world.spawn(
            Officer::new("officer_004", "Fat Choi", Rank::StrawSandal).with_loyalty(10),
        );
        update_officer(&mut world, "officer_004", |o| {
            o.assigned_building = Some("building_002".into())
        });
        let mut building = Building::new("building_002", BuildingType::MahjongParlor);
        building.assigned_officer = Some("officer_004".into());
        world.resource_mut::<BuildingRegistry>().register(building);
        for i in 0..6 {
            world.spawn(Soldier::new(format!("soldier_{:03}", i), 4));
        }

        emit(
            &mut world,
            EventKind::CoupAttempt {
                officer_id: "officer_004".into(),
                building_id: "building_002".into(),
                rebel_soldiers: 2,
                defender: None,
            },
        );

        let buildings = world.resource::<BuildingRegistry>();
        let building = buildings.get("building_002").unwrap();
        assert!(!building.occupied());
        assert_eq!(building.rebel_base.as_ref().map(|b| b.soldiers), Some(2));
        assert_eq!(crate::components::all_soldiers(&world).len(), 4);
        let officer = crate::components::officer_by_id(&world, "officer_004").unwrap();
        assert!(officer.traitor);
        assert!(officer.assigned_building.is_none());
        assert!(world.resource::<EventQueue>().is_blocked());
    }

    #[test]
    fn test_loyalty_shock_chronicles_its_reason() {
        let mut world = world_with(0.1);
        world.spawn(Officer::new("officer_001", "Big Brother Wah", Rank::Deputy).with_loyalty(75));
        apply_effect(
            &mut world,
            &Effect::LoyaltyShock {
                reason: "officer_004 was executed as a traitor".into(),
            },
        );
        let chronicle = world.resource::<Chronicle>();
        let entry = chronicle.with_tag(tags::LOYALTY_SHOCK).last().unwrap();
        assert!(entry.summary.starts_with("officer_004 was executed as a traitor"));
        assert!(!entry.summary.contains("assassins"));
    }

    #[test]
    fn test_acquire_building_effect_uses_next_id() {
        let mut world = world_with(0.1);
        apply_effect(&mut world, &Effect::AcquireBuilding(BuildingType::Teahouse));
        let buildings = world.resource::<BuildingRegistry>();
        assert_eq!(buildings.building_ids(), vec!["building_001".to_string()]);
    }
}
