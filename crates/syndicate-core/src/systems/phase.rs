//! Phase and Day Controller
//!
//! Morning, day, evening and night cycle forever. Leaving night runs the daily
//! upkeep and may open a council session. Blocking events and open councils
//! freeze the clock.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::{tags, EntryCategory, EventId, GameTime, Phase};

use crate::chronicle;
use crate::components::{GameClock, PHASE_PROGRESS_MAX};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::events::{self, EventQueue};
use crate::systems::council::{self, CouncilSession};
use crate::systems::relationship::{self, PeerOutcome};
use crate::systems::upkeep::{run_daily_upkeep, DailyBooks};

/// What happened when the clock moved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: GameTime,
    pub to: GameTime,
    pub new_day: bool,
    /// A council session opened on the new morning
    pub council_convened: bool,
    /// An open council was closed instead of moving the clock
    pub adjourned: bool,
    pub books: Option<DailyBooks>,
    pub mingle: Option<PeerOutcome>,
    pub event: Option<EventId>,
}

impl PhaseChange {
    fn stay(time: GameTime) -> Self {
        Self {
            from: time,
            to: time,
            new_day: false,
            council_convened: false,
            adjourned: false,
            books: None,
            mingle: None,
            event: None,
        }
    }
}

/// Result of one timer tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Paused,
    Blocked,
    InCouncil,
    Progressed {
        progress: u32,
        spontaneous: Option<EventId>,
    },
    Advanced {
        change: PhaseChange,
        spontaneous: Option<EventId>,
    },
}

impl TickOutcome {
    pub fn advanced(&self) -> bool {
        matches!(self, TickOutcome::Advanced { .. })
    }
}

/// Move to the next phase.
///
/// While a council sits this either closes it (all motions decided) or
/// rejects. The clock never moves while a blocking event is active.
pub fn advance_phase(world: &mut World) -> Result<PhaseChange, CommandError> {
    if world.resource::<EventQueue>().is_blocked() {
        tracing::debug!("Phase advance rejected: blocking event active");
        return Err(CommandError::BlockedByEvent);
    }

    let now = world.resource::<GameClock>().time;
    if world.resource::<GameClock>().in_council() {
        if !world.resource::<CouncilSession>().all_resolved() {
            return Err(CommandError::CouncilInSession);
        }
        council::adjourn(world);
        let mut change = PhaseChange::stay(now);
        change.adjourned = true;
        return Ok(change);
    }

    let (from, to, new_day) = {
        let mut clock = world.resource_mut::<GameClock>();
        let from = clock.time;
        let new_day = clock.time.advance();
        clock.progress = 0;
        (from, clock.time, new_day)
    };
    tracing::info!(from = %from, to = %to, "Phase advanced");

    let mut change = PhaseChange::stay(from);
    change.to = to;
    change.new_day = new_day;

    if new_day {
        run_daily_upkeep(world);
        let books = world.resource::<DailyBooks>().clone();
        chronicle::record(
            world,
            EntryCategory::Economy,
            format!("Day {} closed with a net of {}", books.day, books.net),
            |e| e,
        );
        change.books = Some(books);

        let interval = world.resource::<EngineConfig>().council.interval_days;
        if to.is_council_day(interval) {
            council::convene(world);
            change.council_convened = true;
        }
    }

    chronicle::record(world, EntryCategory::Phase, format!("{} begins", to), |e| e);

    if to.phase == Phase::Evening {
        change.mingle = relationship::evening_mingle(world);
    }

    if !world.resource::<GameClock>().in_council() {
        let chance = world.resource::<EngineConfig>().events.phase_event_chance;
        change.event = events::maybe_raise(world, chance);
    }

    Ok(change)
}

/// One timer step: fill the progress bar and roll for a spontaneous event.
pub fn tick(world: &mut World) -> TickOutcome {
    let (paused, in_council, speed) = {
        let clock = world.resource::<GameClock>();
        (clock.paused, clock.in_council(), clock.speed)
    };
    if paused {
        return TickOutcome::Paused;
    }
    if world.resource::<EventQueue>().is_blocked() {
        return TickOutcome::Blocked;
    }
    if in_council {
        return TickOutcome::InCouncil;
    }

    let timer = world.resource::<EngineConfig>().timer.clone();
    let progress = {
        let mut clock = world.resource_mut::<GameClock>();
        clock.progress = (clock.progress + timer.progress_per_tick).min(PHASE_PROGRESS_MAX);
        clock.progress
    };

    let spontaneous = events::maybe_raise(
        world,
        timer.spontaneous_event_chance * speed.max(1) as f64,
    );

    if progress < PHASE_PROGRESS_MAX {
        return TickOutcome::Progressed {
            progress,
            spontaneous,
        };
    }

    match advance_phase(world) {
        Ok(change) => TickOutcome::Advanced {
            change,
            spontaneous,
        },
        // The spontaneous event blocked the clock; progress waits at the top.
        Err(_) => TickOutcome::Blocked,
    }
}

pub fn set_paused(world: &mut World, paused: bool) {
    world.resource_mut::<GameClock>().paused = paused;
    tracing::debug!(paused, "Timer paused state changed");
}

/// Change the timer speed, clamped to 1..=max. Returns the applied speed.
pub fn set_speed(world: &mut World, speed: u8) -> u8 {
    let max_speed = world.resource::<EngineConfig>().timer.max_speed;
    let applied = world
        .resource_mut::<GameClock>()
        .set_speed(speed, max_speed);
    tracing::debug!(requested = speed, applied, "Timer speed changed");
    applied
}

/// Replace the clock from raw values, resetting whatever is unrecognized.
pub fn restore_clock(world: &mut World, day: u32, phase: &str, scene: &str) {
    let (clock, repair) = GameClock::restore(day, phase, scene);
    world.insert_resource(clock);
    if repair.any() {
        tracing::warn!(
            day,
            phase,
            scene,
            "Restored clock had invalid values, reset to safe defaults"
        );
        chronicle::record(
            world,
            EntryCategory::Phase,
            "The clock was reset to a safe state",
            |e| e.with_tag(tags::STATE_RESET),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronicle::Chronicle;
    use crate::components::{Building, BuildingRegistry, BuildingType, Ledger, Officer, Rank};
    use crate::events::EventKind;
    use crate::rng::{ScriptedRolls, SimRng};
    use crate::setup::init_resources;
    use syndicate_events::Scene;

    fn setup() -> World {
        let mut world = World::new();
        init_resources(
            &mut world,
            EngineConfig::default(),
            SimRng::new(ScriptedRolls::constant(0.99)),
        );
        world
    }

    fn raise_raid(world: &mut World) {
        events::emit(
            world,
            EventKind::PoliceRaid {
                building_id: "building_001".into(),
                officer_id: None,
                bribe: 1_500,
            },
        );
    }

    #[test]
    fn test_phases_cycle_strictly() {
        let mut world = setup();
        let mut seen = Vec::new();
        for _ in 0..8 {
            let change = advance_phase(&mut world).unwrap();
            seen.push(change.to.phase);
        }
        assert_eq!(
            seen,
            vec![
                Phase::Day,
                Phase::Evening,
                Phase::Night,
                Phase::Morning,
                Phase::Day,
                Phase::Evening,
                Phase::Night,
                Phase::Morning,
            ]
        );
        assert_eq!(world.resource::<GameClock>().day(), 3);
    }

    #[test]
    fn test_rollover_runs_upkeep() {
        let mut world = setup();
        world.spawn(Officer::new("officer_001", "Uncle Wah", Rank::StrawSandal));
        let mut stall = Building::new("building_001", BuildingType::NoodleStall);
        stall.assigned_officer = Some("officer_001".into());
        world.resource_mut::<BuildingRegistry>().register(stall);
        let cash = world.resource::<Ledger>().cash();

        for _ in 0..3 {
            let change = advance_phase(&mut world).unwrap();
            assert!(!change.new_day);
        }
        let change = advance_phase(&mut world).unwrap();
        assert!(change.new_day);
        let books = change.books.unwrap();
        assert_eq!(books.day, 1);
        assert_eq!(world.resource::<Ledger>().cash(), cash + books.net);
    }

    #[test]
    fn test_blocking_event_freezes_clock() {
        let mut world = setup();
        raise_raid(&mut world);
        let before = world.resource::<GameClock>().time;
        assert_eq!(advance_phase(&mut world), Err(CommandError::BlockedByEvent));
        assert_eq!(world.resource::<GameClock>().time, before);

        world.resource_mut::<GameClock>().paused = false;
        assert_eq!(tick(&mut world), TickOutcome::Blocked);
        assert_eq!(world.resource::<GameClock>().progress, 0);
    }

    #[test]
    fn test_day_ten_opens_council() {
        let mut world = setup();
        world.resource_mut::<GameClock>().time = GameTime::new(9, Phase::Night);
        let change = advance_phase(&mut world).unwrap();
        assert!(change.council_convened);
        assert_eq!(world.resource::<GameClock>().scene, Scene::Council);
        assert_eq!(world.resource::<GameClock>().day(), 10);
        assert!(world.resource::<CouncilSession>().active);
        assert!(change.event.is_none());
    }

    #[test]
    fn test_council_holds_until_motions_decided() {
        let mut world = setup();
        world.resource_mut::<GameClock>().time = GameTime::new(9, Phase::Night);
        advance_phase(&mut world).unwrap();

        let unresolved = !world.resource::<CouncilSession>().all_resolved();
        if unresolved {
            assert_eq!(advance_phase(&mut world), Err(CommandError::CouncilInSession));
            let ids: Vec<String> = world
                .resource::<CouncilSession>()
                .motions
                .iter()
                .map(|m| m.id.clone())
                .collect();
            for id in ids {
                let _ = council::cast_vote(&mut world, &id, false);
            }
        }
        if world.resource::<GameClock>().in_council() {
            let change = advance_phase(&mut world).unwrap();
            assert!(change.adjourned);
        }
        assert_eq!(world.resource::<GameClock>().scene, Scene::District);
        assert_eq!(world.resource::<GameClock>().phase(), Phase::Morning);
    }

    #[test]
    fn test_tick_fills_progress_then_advances() {
        let mut world = setup();
        assert_eq!(tick(&mut world), TickOutcome::Paused);

        set_paused(&mut world, false);
        let per_tick = world.resource::<EngineConfig>().timer.progress_per_tick;
        let ticks = PHASE_PROGRESS_MAX / per_tick;
        for _ in 1..ticks {
            assert!(!tick(&mut world).advanced());
        }
        assert!(tick(&mut world).advanced());
        let clock = world.resource::<GameClock>();
        assert_eq!(clock.phase(), Phase::Day);
        assert_eq!(clock.progress, 0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut world = setup();
        assert_eq!(set_speed(&mut world, 9), 4);
        assert_eq!(set_speed(&mut world, 0), 1);
    }

    #[test]
    fn test_restore_resets_unknown_phase() {
        let mut world = setup();
        restore_clock(&mut world, 7, "twilight", "district");
        let clock = world.resource::<GameClock>();
        assert_eq!(clock.time, GameTime::new(7, Phase::Morning));
        assert!(world
            .resource::<Chronicle>()
            .with_tag(tags::STATE_RESET)
            .next()
            .is_some());
    }
}
