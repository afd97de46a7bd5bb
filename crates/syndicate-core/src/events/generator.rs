//! Event Generator
//!
//! Each event kind has a validity predicate over the world and a weight that
//! may scale with resources. One valid candidate is drawn by weight.

use bevy_ecs::prelude::*;
use syndicate_events::EventId;

use super::kinds::{EnvoyOffer, EventKind, Grievance};
use super::queue::EventQueue;
use super::resolver::emit;
use crate::components::{
    all_officers, all_soldiers, summarize, BuildingRegistry, BuildingType, GameClock,
    InternalFriction, Ledger, Officer, RelationshipGraph, RivalRegistry,
};
use crate::config::EngineConfig;
use crate::rng::SimRng;

/// Generation thresholds not exposed in tuning
pub mod generator_constants {
    /// Heat at which police raids become possible
    pub const RAID_MIN_HEAT: i32 = 50;
    /// Average need below which soldiers grumble
    pub const UNREST_NEED: f32 = 40.0;
    /// Rival relationship needed before an envoy is sent
    pub const ENVOY_MIN_RELATIONSHIP: i32 = -30;
    /// Rival relationship needed before an alliance is offered
    pub const ALLIANCE_MIN_RELATIONSHIP: i32 = 30;
    pub const STREET_WAR_WEIGHT: f64 = 6.0;
    pub const BETRAYAL_BASE_WEIGHT: f64 = 8.0;
    pub const COUP_WEIGHT: f64 = 12.0;
    pub const UNREST_WEIGHT: f64 = 6.0;
    pub const INFORMANT_WEIGHT: f64 = 4.0;
    pub const PROMOTION_WEIGHT: f64 = 5.0;
    pub const ROMANCE_WEIGHT: f64 = 3.0;
    pub const FEUD_WEIGHT: f64 = 4.0;
    pub const ENVOY_WEIGHT: f64 = 4.0;
    pub const ASSASSINATION_WEIGHT: f64 = 3.0;
}

use generator_constants::*;

/// A valid event with its draw weight
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: EventKind,
    pub weight: f64,
}

impl Candidate {
    fn new(kind: EventKind, weight: f64) -> Self {
        Self { kind, weight }
    }
}

/// The strongest available fighter, used as the key officer in fights.
fn best_fighter<'a>(officers: &[&'a Officer]) -> Option<&'a Officer> {
    officers
        .iter()
        .filter(|o| o.is_available())
        .max_by(|a, b| {
            a.skills
                .enforcement
                .cmp(&b.skills.enforcement)
                .then(b.id.cmp(&a.id))
        })
        .copied()
}

/// Every event that could fire right now.
pub fn candidates(world: &World) -> Vec<Candidate> {
    let config = world.resource::<EngineConfig>();
    let day = world.resource::<GameClock>().day();
    let ledger = world.resource::<Ledger>();
    let buildings = world.resource::<BuildingRegistry>();
    let rivals = world.resource::<RivalRegistry>();
    let graph = world.resource::<RelationshipGraph>();
    let friction = world.resource::<InternalFriction>().value();
    let officers = all_officers(world);
    let soldiers = all_soldiers(world);
    let heat = ledger.heat();

    let mut out = Vec::new();

    // police
    if heat >= RAID_MIN_HEAT {
        let target = buildings
            .iter()
            .filter(|b| b.is_operating(day) && b.building_type.stats().illicit)
            .max_by(|a, b| {
                a.building_type
                    .stats()
                    .heat
                    .cmp(&b.building_type.stats().heat)
                    .then(b.id.cmp(&a.id))
            });
        if let Some(building) = target {
            out.push(Candidate::new(
                EventKind::PoliceRaid {
                    building_id: building.id.clone(),
                    officer_id: building.assigned_officer.clone(),
                    bribe: 1_000 + heat as i64 * 10,
                },
                heat as f64 / 5.0,
            ));
        }
    }
    if heat >= config.events.shakedown_min_heat {
        out.push(Candidate::new(
            EventKind::PoliceShakedown {
                demand: 200 + heat as i64 * 5,
            },
            heat as f64 / 10.0,
        ));
    }

    // rivals
    let richest = buildings
        .iter()
        .filter(|b| b.is_operating(day))
        .max_by(|a, b| {
            a.building_type
                .stats()
                .revenue
                .cmp(&b.building_type.stats().revenue)
                .then(b.id.cmp(&a.id))
        });
    let fighter = best_fighter(&officers);
    for rival in rivals.iter() {
        if rival.tension >= config.events.rival_attack_min_tension && !rival.alliance {
            out.push(Candidate::new(
                EventKind::RivalAttack {
                    rival_id: rival.id.clone(),
                    building_id: richest.map(|b| b.id.clone()),
                    officer_id: richest.and_then(|b| b.assigned_officer.clone()),
                    tribute: rival.strength as i64 * 20,
                },
                rival.tension as f64 / 10.0,
            ));
        }
        if rival.active_conflict {
            out.push(Candidate::new(
                EventKind::StreetWar {
                    rival_id: rival.id.clone(),
                    officer_id: fighter.map(|o| o.id.clone()),
                },
                STREET_WAR_WEIGHT,
            ));
        }
        if rival.relationship <= config.events.assassination_max_relationship {
            out.push(Candidate::new(
                EventKind::AssassinationAttempt {
                    rival_id: rival.id.clone(),
                    officer_id: fighter.map(|o| o.id.clone()),
                },
                ASSASSINATION_WEIGHT,
            ));
        }
        if rival.relationship > ENVOY_MIN_RELATIONSHIP && !rival.active_conflict {
            let offer = if !rival.trade_agreement {
                Some(EnvoyOffer::Trade)
            } else if !rival.alliance && rival.relationship >= ALLIANCE_MIN_RELATIONSHIP {
                Some(EnvoyOffer::Alliance)
            } else {
                None
            };
            if let Some(offer) = offer {
                out.push(Candidate::new(
                    EventKind::RivalEnvoy {
                        rival_id: rival.id.clone(),
                        offer,
                    },
                    ENVOY_WEIGHT,
                ));
            }
        }
    }
    let shadiest = rivals
        .iter()
        .min_by(|a, b| a.relationship.cmp(&b.relationship).then(a.id.cmp(&b.id)));
    if let Some(rival) = shadiest {
        out.push(Candidate::new(
            EventKind::InformantTip {
                rival_id: rival.id.clone(),
                price: 300 + rival.strength as i64 * 5,
            },
            INFORMANT_WEIGHT,
        ));
    }

    // officers
    let strongest_rival = rivals
        .iter()
        .max_by(|a, b| a.strength.cmp(&b.strength).then(b.id.cmp(&a.id)));
    for officer in officers.iter().filter(|o| o.is_available()) {
        let loyalty = &config.loyalty;
        if officer.loyalty < loyalty.disloyal_threshold {
            if let Some(rival) = strongest_rival {
                let gap = (loyalty.disloyal_threshold - officer.loyalty) as f64;
                out.push(Candidate::new(
                    EventKind::OfficerBetrayal {
                        officer_id: officer.id.clone(),
                        rival_id: rival.id.clone(),
                        bribe: 1_000 + gap as i64 * 100,
                    },
                    BETRAYAL_BASE_WEIGHT + gap / 2.0,
                ));
            }
        }
        if officer.loyalty <= loyalty.coup_loyalty_threshold
            && friction >= loyalty.coup_friction_threshold
        {
            if let Some(building_id) = officer
                .assigned_building
                .as_ref()
                .filter(|id| buildings.get(id).is_some())
            {
                if soldiers.len() >= loyalty.coup_min_soldiers {
                    let loyalists: Vec<&Officer> = officers
                        .iter()
                        .filter(|o| o.id != officer.id && o.loyalty >= loyalty.disloyal_threshold)
                        .copied()
                        .collect();
                    out.push(Candidate::new(
                        EventKind::CoupAttempt {
                            officer_id: officer.id.clone(),
                            building_id: building_id.clone(),
                            rebel_soldiers: (soldiers.len() as u32 / 3).max(1),
                            defender: best_fighter(&loyalists).map(|o| o.id.clone()),
                        },
                        COUP_WEIGHT,
                    ));
                } else {
                    tracing::warn!(
                        officer = %officer.id,
                        soldiers = soldiers.len(),
                        "Coup conditions met but too few soldiers to split"
                    );
                }
            }
        }
        if officer.face >= loyalty.promotion_face
            && officer.rank.promoted(&officer.skills).is_some()
        {
            out.push(Candidate::new(
                EventKind::PromotionRequest {
                    officer_id: officer.id.clone(),
                },
                PROMOTION_WEIGHT,
            ));
        }
    }

    // pairs
    let available: Vec<&str> = officers
        .iter()
        .filter(|o| o.is_available())
        .map(|o| o.id.as_str())
        .collect();
    for (i, a) in available.iter().enumerate() {
        for b in available.iter().skip(i + 1) {
            let forward = graph.get(a, b);
            let backward = graph.get(b, a);
            if forward.is_some_and(|r| r.is_in_love()) || backward.is_some_and(|r| r.is_in_love())
            {
                out.push(Candidate::new(
                    EventKind::RomanceScandal {
                        officer_id: a.to_string(),
                        partner_id: b.to_string(),
                    },
                    ROMANCE_WEIGHT,
                ));
            }
            if forward.is_some_and(|r| r.is_enemy()) || backward.is_some_and(|r| r.is_enemy()) {
                out.push(Candidate::new(
                    EventKind::OfficerFeud {
                        officer_id: a.to_string(),
                        rival_officer_id: b.to_string(),
                    },
                    FEUD_WEIGHT,
                ));
            }
        }
    }

    // soldiers
    if !soldiers.is_empty() {
        let summary = summarize(soldiers.iter().copied());
        let needs = [
            (Grievance::Food, summary.average_food),
            (Grievance::Entertainment, summary.average_entertainment),
            (Grievance::Pay, summary.average_pay),
        ];
        let worst = needs
            .iter()
            .filter(|(_, avg)| *avg < UNREST_NEED)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((grievance, _)) = worst {
            out.push(Candidate::new(
                EventKind::SoldierUnrest {
                    grievance: *grievance,
                    cost: soldiers.len() as i64 * 60,
                },
                UNREST_WEIGHT,
            ));
        }
    }

    // business
    let types = BuildingType::all();
    let building_type = types[day as usize % types.len()];
    out.push(Candidate::new(
        EventKind::BusinessOpportunity {
            building_type,
            price: building_type.stats().acquire_cost * 3 / 4,
        },
        config.events.opportunity_base_weight * (0.5 + ledger.reputation() as f64 / 100.0),
    ));

    let queue = world.resource::<EventQueue>();
    out.retain(|c| !queue.contains_situation(&c.kind));
    out
}

/// Draw one event by weight and raise it.
pub fn roll_event(world: &mut World) -> Option<EventId> {
    let pool = candidates(world);
    let weights: Vec<f64> = pool.iter().map(|c| c.weight).collect();
    let index = world.resource_mut::<SimRng>().weighted_index(&weights)?;
    let kind = pool.into_iter().nth(index)?.kind;
    Some(emit(world, kind))
}

/// Raise an event with probability `chance`.
pub fn maybe_raise(world: &mut World, chance: f64) -> Option<EventId> {
    if world.resource_mut::<SimRng>().chance(chance) {
        roll_event(world)
    } else {
        None
    }
}
