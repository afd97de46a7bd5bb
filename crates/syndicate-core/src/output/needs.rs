//! Critical Needs
//!
//! Reads the world and lists what the player should deal with soon, most
//! urgent first.

use bevy_ecs::prelude::*;
use syndicate_events::CriticalNeed;

use crate::components::{
    all_officers, all_soldiers, summarize, BuildingRegistry, GameClock, Ledger, RivalRegistry,
};
use crate::config::EngineConfig;

/// Warning thresholds
pub mod needs_constants {
    /// Cash below this many days of upkeep is flagged
    pub const LOW_CASH_DAYS: i64 = 3;
    /// Average soldier need below which it is flagged
    pub const SOLDIER_NEED_WARNING: f32 = 40.0;
}

use needs_constants::*;

/// Daily fixed costs: stipends plus any police payoff.
pub fn daily_upkeep(world: &World) -> i64 {
    let economy = &world.resource::<EngineConfig>().economy;
    let stipend = all_soldiers(world).len() as i64 * economy.soldier_stipend;
    let payoff = if world.resource::<Ledger>().heat() >= economy.payoff_heat_threshold {
        economy.police_payoff
    } else {
        0
    };
    stipend + payoff
}

pub fn critical_needs(world: &World) -> Vec<CriticalNeed> {
    let config = world.resource::<EngineConfig>();
    let ledger = world.resource::<Ledger>();
    let day = world.resource::<GameClock>().day();
    let mut needs = Vec::new();

    let upkeep = daily_upkeep(world);
    if upkeep > 0 && ledger.cash() < upkeep * LOW_CASH_DAYS {
        needs.push(CriticalNeed::LowCash {
            cash: ledger.cash(),
            daily_upkeep: upkeep,
        });
    }
    if ledger.heat() >= config.economy.payoff_heat_threshold {
        needs.push(CriticalNeed::HighHeat {
            heat: ledger.heat(),
        });
    }

    for building in world.resource::<BuildingRegistry>().iter() {
        if let Some(base) = &building.rebel_base {
            needs.push(CriticalNeed::RebelBase {
                building_id: building.id.clone(),
                soldiers: base.soldiers,
            });
        }
    }

    for officer in all_officers(world).into_iter().filter(|o| !o.traitor) {
        if officer.loyalty < config.loyalty.disloyal_threshold {
            needs.push(CriticalNeed::DisloyalOfficer {
                officer_id: officer.id.clone(),
                loyalty: officer.loyalty,
            });
        }
        if officer.is_wounded() {
            needs.push(CriticalNeed::WoundedOfficer {
                officer_id: officer.id.clone(),
                days_left: officer.wounded_days,
            });
        }
        if officer.arrested {
            needs.push(CriticalNeed::ArrestedOfficer {
                officer_id: officer.id.clone(),
            });
        }
    }

    let soldiers = all_soldiers(world);
    if !soldiers.is_empty() {
        let summary = summarize(soldiers.iter().copied());
        if summary.average_food < SOLDIER_NEED_WARNING {
            needs.push(CriticalNeed::HungrySoldiers {
                satisfaction: summary.average_food,
            });
        }
        if summary.average_entertainment < SOLDIER_NEED_WARNING {
            needs.push(CriticalNeed::BoredSoldiers {
                satisfaction: summary.average_entertainment,
            });
        }
        if summary.average_pay < SOLDIER_NEED_WARNING {
            needs.push(CriticalNeed::UnpaidSoldiers {
                satisfaction: summary.average_pay,
            });
        }
        if summary.deserting > 0 {
            needs.push(CriticalNeed::DesertingSoldiers {
                count: summary.deserting,
            });
        }
    }

    for rival in world.resource::<RivalRegistry>().iter() {
        if rival.is_hostile() || rival.tension >= config.events.rival_attack_min_tension {
            needs.push(CriticalNeed::HostileRival {
                rival_id: rival.id.clone(),
                tension: rival.tension,
            });
        }
    }

    for building in world.resource::<BuildingRegistry>().staffable(day) {
        needs.push(CriticalNeed::IdleBuilding {
            building_id: building.id.clone(),
        });
    }

    needs
}
