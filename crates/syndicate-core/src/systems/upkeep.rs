//! Daily Upkeep
//!
//! Systems that run once at every night-to-morning rollover, in a fixed
//! order: books, heat, reopenings, officer recovery, soldier needs and
//! loyalty, rival tension, friction, agendas.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, ScheduleLabel};
use serde::{Deserialize, Serialize};
use syndicate_events::{tags, EntryCategory};

use crate::chronicle::Chronicle;
use crate::components::{
    BuildingRegistry, GameClock, InternalFriction, Ledger, Officer, OfficerTrait, RivalRegistry,
    Soldier,
};
use crate::config::EngineConfig;
use crate::rng::SimRng;

/// Constants for daily upkeep
pub mod upkeep_constants {
    /// Energy restored overnight
    pub const NIGHTLY_ENERGY: u32 = 30;
    /// Reputation at which the home racket breaks even
    pub const RACKET_BREAK_EVEN_REPUTATION: i64 = 20;
    pub const RACKET_REPUTATION_SCALE: i64 = 30;
    pub const FOOD_DECAY: i32 = -8;
    pub const FOOD_PER_POINT: i32 = 4;
    pub const ENTERTAINMENT_DECAY: i32 = -6;
    pub const ENTERTAINMENT_PER_POINT: i32 = 3;
    pub const PAID_PAY: i32 = 10;
    pub const UNPAID_PAY: i32 = -25;
    pub const CONTENT_SATISFACTION: i32 = 60;
    pub const CONTENT_LOYALTY: i32 = 2;
    pub const UNHAPPY_SATISFACTION: i32 = 40;
    pub const UNHAPPY_LOYALTY: i32 = -3;
    pub const WAR_TENSION: i32 = 12;
    pub const HOSTILE_TENSION: i32 = 8;
    pub const TRADE_TENSION: i32 = -5;
    pub const CALM_TENSION: i32 = -3;
    pub const MAX_STRENGTH_DRIFT: u32 = 2;
    pub const FRICTION_PER_DISLOYAL: i32 = 5;
    pub const FRICTION_EASE: i32 = -3;
}

use upkeep_constants::*;

/// Label for the daily upkeep schedule
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DailyUpkeep;

/// Resource: the last day's income statement
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBooks {
    /// The day these books close
    pub day: u32,
    pub revenue: i64,
    pub racket: i64,
    pub trade: i64,
    pub stipend: i64,
    pub payoff: i64,
    pub net: i64,
    /// Whether the soldiers got their full stipend
    pub paid_in_full: bool,
}

/// The day that just ended. Upkeep runs after the clock has rolled over.
fn closing_day(clock: &GameClock) -> u32 {
    clock.day().saturating_sub(1).max(1)
}

/// Income from the home district racket, negative when reputation is poor.
pub fn racket_income(racket_base: i64, reputation: i32) -> i64 {
    racket_base * (reputation as i64 - RACKET_BREAK_EVEN_REPUTATION) / RACKET_REPUTATION_SCALE
}

/// System: collect building revenue and pay the soldiers
pub fn collect_revenue(
    config: Res<EngineConfig>,
    clock: Res<GameClock>,
    buildings: Res<BuildingRegistry>,
    rivals: Res<RivalRegistry>,
    soldiers: Query<&Soldier>,
    mut ledger: ResMut<Ledger>,
    mut books: ResMut<DailyBooks>,
) {
    let economy = &config.economy;
    let day = closing_day(&clock);

    let revenue: i64 = buildings
        .iter()
        .filter(|b| b.is_operating(day))
        .map(|b| b.daily_revenue(economy.upgrade_multiplier))
        .sum();
    let racket = racket_income(economy.racket_base, ledger.reputation());
    let trade = rivals.trade_partners() as i64 * economy.trade_income;
    let stipend = soldiers.iter().count() as i64 * economy.soldier_stipend;
    let payoff = if ledger.heat() >= economy.payoff_heat_threshold {
        economy.police_payoff
    } else {
        0
    };

    let net = revenue + racket + trade - stipend - payoff;
    let paid_in_full = ledger.cash() + net >= 0;
    ledger.add_cash(net);

    tracing::info!(day, revenue, racket, stipend, net, "Books closed");
    *books = DailyBooks {
        day,
        revenue,
        racket,
        trade,
        stipend,
        payoff,
        net,
        paid_in_full,
    };
}

/// System: illicit business draws heat, which otherwise cools
pub fn update_heat(
    config: Res<EngineConfig>,
    clock: Res<GameClock>,
    buildings: Res<BuildingRegistry>,
    mut ledger: ResMut<Ledger>,
) {
    let day = closing_day(&clock);
    let generated: i32 = buildings
        .iter()
        .filter(|b| b.is_operating(day))
        .map(|b| b.building_type.stats().heat)
        .sum();
    ledger.adjust_heat(generated - config.economy.heat_decay);
}

/// System: clear closure windows that have run out
pub fn reopen_buildings(clock: Res<GameClock>, mut buildings: ResMut<BuildingRegistry>) {
    let today = clock.day();
    for building in buildings.iter_mut() {
        if building.inactive_until_day.is_some_and(|until| until <= today) {
            tracing::debug!("{} reopens", building.id);
            building.inactive_until_day = None;
        }
    }
}

/// System: rest, heal, and let doubts fester
pub fn recover_officers(config: Res<EngineConfig>, mut officers: Query<&mut Officer>) {
    for mut officer in officers.iter_mut() {
        officer.restore_energy(NIGHTLY_ENERGY);
        if officer.wounded_days > 0 {
            officer.wounded_days -= 1;
        }
        if officer.testing_waters && !officer.traitor {
            officer.adjust_loyalty(-config.loyalty.testing_waters_decay);
        }
    }
}

/// System: buildings feed and entertain the soldiers; the books decide pay
pub fn update_soldier_needs(
    clock: Res<GameClock>,
    buildings: Res<BuildingRegistry>,
    books: Res<DailyBooks>,
    mut soldiers: Query<&mut Soldier>,
) {
    let day = closing_day(&clock);
    let (food, entertainment) = buildings
        .iter()
        .filter(|b| b.is_operating(day))
        .map(|b| b.building_type.stats())
        .fold((0, 0), |(f, e), s| (f + s.food, e + s.entertainment));

    let food = FOOD_DECAY + food * FOOD_PER_POINT;
    let entertainment = ENTERTAINMENT_DECAY + entertainment * ENTERTAINMENT_PER_POINT;
    let pay = if books.paid_in_full { PAID_PAY } else { UNPAID_PAY };

    for mut soldier in soldiers.iter_mut() {
        soldier.needs.adjust(food, entertainment, pay);
    }
}

/// System: satisfaction drives loyalty; the disloyal desert
pub fn update_soldier_loyalty(
    mut commands: Commands,
    config: Res<EngineConfig>,
    clock: Res<GameClock>,
    mut rng: ResMut<SimRng>,
    mut chronicle: ResMut<Chronicle>,
    mut soldiers: Query<(Entity, &mut Soldier)>,
) {
    let loyalty = &config.loyalty;
    let mut roster: Vec<(Entity, Mut<Soldier>)> = soldiers.iter_mut().collect();
    roster.sort_by(|a, b| a.1.id.cmp(&b.1.id));

    let mut deserted = Vec::new();
    for (entity, soldier) in roster.iter_mut() {
        let satisfaction = soldier.needs.satisfaction();
        if satisfaction >= CONTENT_SATISFACTION {
            soldier.adjust_loyalty(CONTENT_LOYALTY);
        } else if satisfaction < UNHAPPY_SATISFACTION {
            soldier.adjust_loyalty(UNHAPPY_LOYALTY);
        }

        soldier.deserting = soldier.loyalty < loyalty.desertion_threshold;
        if soldier.deserting && rng.chance(loyalty.desertion_chance) {
            commands.entity(*entity).despawn();
            deserted.push(soldier.id.clone());
        }
    }

    if !deserted.is_empty() {
        tracing::info!(count = deserted.len(), "Soldiers deserted");
        let entry = chronicle.entry(
            clock.time,
            EntryCategory::Loyalty,
            format!("{} soldiers slipped away in the night", deserted.len()),
        );
        chronicle.push(entry.with_tag(tags::DESERTION));
    }
}

/// System: rival tension builds while relations are bad
pub fn update_rival_tension(mut rivals: ResMut<RivalRegistry>, mut rng: ResMut<SimRng>) {
    for rival in rivals.iter_mut() {
        let delta = if rival.active_conflict {
            WAR_TENSION
        } else if rival.is_hostile() {
            HOSTILE_TENSION
        } else if rival.trade_agreement {
            TRADE_TENSION
        } else {
            CALM_TENSION
        };
        rival.adjust_tension(delta);
        rival.strength += rng.range_inclusive(0, MAX_STRENGTH_DRIFT);
    }
}

/// System: disloyal officers breed friction
pub fn update_friction(
    config: Res<EngineConfig>,
    officers: Query<&Officer>,
    mut friction: ResMut<InternalFriction>,
) {
    let disloyal = officers
        .iter()
        .filter(|o| !o.traitor && o.loyalty < config.loyalty.disloyal_threshold)
        .count() as i32;
    if disloyal > 0 {
        friction.adjust(disloyal * FRICTION_PER_DISLOYAL);
    } else {
        friction.adjust(FRICTION_EASE);
    }
}

/// What an officer is quietly working toward.
pub fn agenda_for(officer: &Officer, config: &EngineConfig) -> Option<String> {
    let loyalty = &config.loyalty;
    if officer.traitor {
        None
    } else if officer.loyalty <= loyalty.coup_loyalty_threshold {
        Some("plotting to break away".to_string())
    } else if officer.loyalty < loyalty.disloyal_threshold {
        Some("listening to offers from rivals".to_string())
    } else if officer.has_trait(OfficerTrait::Ambitious) && officer.face >= loyalty.promotion_face {
        Some("angling for promotion".to_string())
    } else if officer.testing_waters {
        Some("testing the waters".to_string())
    } else {
        None
    }
}

/// System: refresh officer agendas
pub fn update_agendas(config: Res<EngineConfig>, mut officers: Query<&mut Officer>) {
    for mut officer in officers.iter_mut() {
        let agenda = agenda_for(&officer, &config);
        if officer.agenda != agenda {
            officer.agenda = agenda;
        }
    }
}

/// Build the upkeep schedule.
pub fn build_daily_upkeep() -> Schedule {
    let mut schedule = Schedule::new(DailyUpkeep);
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            collect_revenue,
            update_heat,
            reopen_buildings,
            recover_officers,
            update_soldier_needs,
            update_soldier_loyalty,
            update_rival_tension,
            update_friction,
            update_agendas,
        )
            .chain(),
    );
    schedule
}

/// Run the upkeep schedule, adding it to the world first if needed.
pub fn run_daily_upkeep(world: &mut World) {
    if world.try_run_schedule(DailyUpkeep).is_err() {
        tracing::warn!("Daily upkeep schedule missing, rebuilding it");
        world.add_schedule(build_daily_upkeep());
        world.run_schedule(DailyUpkeep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Building, BuildingType, Rank, RivalFaction};
    use crate::rng::ScriptedRolls;
    use syndicate_events::{GameTime, Phase};

    fn setup(cash: i64, reputation: i32, heat: i32) -> World {
        let mut world = World::new();
        world.insert_resource(EngineConfig::default());
        let mut clock = GameClock::new();
        clock.time = GameTime::new(2, Phase::Morning);
        world.insert_resource(clock);
        world.insert_resource(Ledger::new(cash, reputation, heat, 20, 20));
        world.insert_resource(BuildingRegistry::new());
        world.insert_resource(RivalRegistry::new());
        world.insert_resource(InternalFriction::default());
        world.insert_resource(DailyBooks::default());
        world.insert_resource(Chronicle::default());
        world.insert_resource(SimRng::new(ScriptedRolls::constant(0.0)));
        world.add_schedule(build_daily_upkeep());
        world
    }

    fn staffed(id: &str, building_type: BuildingType) -> Building {
        let mut building = Building::new(id, building_type);
        building.assigned_officer = Some(format!("officer_for_{}", id));
        building
    }

    #[test]
    fn test_racket_income_scales_with_reputation() {
        assert_eq!(racket_income(300, 20), 0);
        assert_eq!(racket_income(300, 50), 300);
        assert_eq!(racket_income(300, 5), -150);
    }

    #[test]
    fn test_books_count_only_operating_buildings() {
        let mut world = setup(1_000, 50, 10);
        {
            let mut buildings = world.resource_mut::<BuildingRegistry>();
            buildings.register(staffed("building_001", BuildingType::Teahouse));
            buildings.register(Building::new("building_002", BuildingType::Nightclub));
            let mut closed = staffed("building_003", BuildingType::GamblingDen);
            closed.inactive_until_day = Some(3);
            buildings.register(closed);
        }
        for i in 0..4 {
            world.spawn(Soldier::new(format!("soldier_{:03}", i), 5));
        }

        run_daily_upkeep(&mut world);

        let books = world.resource::<DailyBooks>().clone();
        assert_eq!(books.day, 1);
        assert_eq!(books.revenue, 350);
        assert_eq!(books.racket, 300);
        assert_eq!(books.stipend, 200);
        assert_eq!(books.net, 450);
        assert!(books.paid_in_full);
        assert_eq!(world.resource::<Ledger>().cash(), 1_450);
        // teahouse draws no heat, decay 3
        assert_eq!(world.resource::<Ledger>().heat(), 7);
    }

    #[test]
    fn test_unpaid_soldiers_lose_pay_satisfaction() {
        let mut world = setup(0, 10, 10);
        world.spawn(Soldier::new("soldier_001", 5));
        run_daily_upkeep(&mut world);

        assert!(!world.resource::<DailyBooks>().paid_in_full);
        assert_eq!(world.resource::<Ledger>().cash(), 0);
        let soldier = crate::components::all_soldiers(&world)[0].clone();
        assert_eq!(soldier.needs.pay, 45);
        assert_eq!(soldier.needs.food, 62);
    }

    #[test]
    fn test_police_payoff_at_high_heat() {
        let mut world = setup(5_000, 20, 80);
        run_daily_upkeep(&mut world);
        assert_eq!(world.resource::<DailyBooks>().payoff, 400);
        assert_eq!(world.resource::<Ledger>().cash(), 4_600);
    }

    #[test]
    fn test_closure_ends_on_its_day() {
        let mut world = setup(1_000, 30, 10);
        let mut building = staffed("building_001", BuildingType::Restaurant);
        building.inactive_until_day = Some(2);
        world.resource_mut::<BuildingRegistry>().register(building);
        run_daily_upkeep(&mut world);
        let buildings = world.resource::<BuildingRegistry>();
        assert!(buildings.get("building_001").unwrap().inactive_until_day.is_none());
    }

    #[test]
    fn test_officer_recovery_and_testing_waters() {
        let mut world = setup(1_000, 30, 10);
        let mut officer = Officer::new("officer_002", "Ah Keung", Rank::RedPole).with_energy(50);
        officer.wounded_days = 2;
        officer.testing_waters = true;
        world.spawn(officer);
        run_daily_upkeep(&mut world);

        let officer = crate::components::officer_by_id(&world, "officer_002").unwrap();
        assert_eq!(officer.energy, 80);
        assert_eq!(officer.wounded_days, 1);
        assert_eq!(officer.loyalty, 58);
        assert_eq!(officer.agenda.as_deref(), Some("testing the waters"));
    }

    #[test]
    fn test_deserters_leave() {
        let mut world = setup(1_000, 30, 10);
        world.spawn(Soldier::new("soldier_001", 5).with_loyalty(10));
        world.spawn(Soldier::new("soldier_002", 5).with_loyalty(80));
        run_daily_upkeep(&mut world);

        let remaining = crate::components::all_soldiers(&world);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "soldier_002");
        let chronicle = world.resource::<Chronicle>();
        assert_eq!(chronicle.with_tag(tags::DESERTION).count(), 1);
    }

    #[test]
    fn test_rival_tension_and_friction() {
        let mut world = setup(1_000, 30, 10);
        {
            let mut rivals = world.resource_mut::<RivalRegistry>();
            rivals.register(RivalFaction::new("rival_001", "Black Harbor Boys", 75).with_relationship(-40));
            rivals.register(RivalFaction::new("rival_002", "Iron Lotus", 45).with_tension(10));
        }
        world.spawn(Officer::new("officer_004", "Fat Choi", Rank::StrawSandal).with_loyalty(10));
        run_daily_upkeep(&mut world);

        let rivals = world.resource::<RivalRegistry>();
        assert_eq!(rivals.get("rival_001").unwrap().tension, HOSTILE_TENSION);
        assert_eq!(rivals.get("rival_002").unwrap().tension, 7);
        assert_eq!(world.resource::<InternalFriction>().value(), FRICTION_PER_DISLOYAL);
    }
}
