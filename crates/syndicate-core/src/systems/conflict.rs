//! Conflict Resolution
//!
//! Strength comparison between the organization and the police, a rival, or
//! rebels, followed by casualty and injury rolls.
//!
//! Player strength is the summed skill of soldiers loyal enough to fight, plus
//! the key officer's enforcement bonus and any allied help. The player wins
//! only when strictly stronger.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::{tags, EntryCategory};

use crate::chronicle;
use crate::components::{
    all_soldiers, find_officer, officer_by_id, soldier_entities, BuildingRegistry, GameClock,
    InternalFriction, Ledger, Officer, OfficerTrait, RelationshipGraph, RivalRegistry, Soldier,
};
use crate::config::{ConflictConfig, EngineConfig};
use crate::events::{self, EventKind};
use crate::rng::SimRng;

/// Days a building stays shut after a lost raid
pub const RAID_CLOSURE_DAYS: u32 = 2;
/// Days a building stays shut after a lost rival attack
pub const ATTACK_CLOSURE_DAYS: u32 = 3;

/// What kind of fight this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Raid,
    RivalAttack,
    StreetWar,
    Coup,
    Retaliation,
}

impl ConflictKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictKind::Raid => "raid",
            ConflictKind::RivalAttack => "rival_attack",
            ConflictKind::StreetWar => "street_war",
            ConflictKind::Coup => "coup",
            ConflictKind::Retaliation => "retaliation",
        }
    }
}

/// Who is on the other side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "snake_case")]
pub enum Opponent {
    Police,
    Rival { rival_id: String },
    Rebels { building_id: String, officer_id: String },
}

/// A fight to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSpec {
    pub kind: ConflictKind,
    pub opponent: Opponent,
    /// Officer leading the organization's side
    pub key_officer: Option<String>,
    /// Building that closes if the fight is lost
    pub stake_building: Option<String>,
}

/// What happened to the key officer after a loss
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fate", rename_all = "snake_case")]
pub enum OfficerFate {
    Wounded { days: u32 },
    Arrested,
}

/// Outcome of a resolved conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub kind: ConflictKind,
    pub opponent: Opponent,
    pub player_strength: u32,
    pub opponent_strength: u32,
    pub victory: bool,
    pub casualties: u32,
    pub key_officer: Option<String>,
    pub officer_fate: Option<OfficerFate>,
    pub battle_hardened: bool,
}

/// Strength the organization brings to a fight.
pub fn player_strength(
    soldiers: &[&Soldier],
    key_officer: Option<&Officer>,
    allied_strength: u32,
    config: &ConflictConfig,
) -> u32 {
    let troops: u32 = soldiers
        .iter()
        .filter(|s| s.will_fight(config.soldier_loyalty_threshold))
        .map(|s| s.skill)
        .sum();

    let specialist = key_officer
        .filter(|o| o.is_available())
        .map(|o| {
            let hardened = if o.has_trait(OfficerTrait::BattleHardened) {
                config.battle_hardened_bonus
            } else {
                0
            };
            o.skills.enforcement / config.specialist_divisor.max(1) + hardened
        })
        .unwrap_or(0);

    troops + specialist + allied_strength
}

/// Strength of the other side.
pub fn opponent_strength(
    opponent: &Opponent,
    rivals: &RivalRegistry,
    buildings: &BuildingRegistry,
    heat: i32,
    config: &ConflictConfig,
) -> u32 {
    match opponent {
        Opponent::Police => (heat.max(0) as f64 * config.police_strength_per_heat).round() as u32,
        Opponent::Rival { rival_id } => rivals.get(rival_id).map(|r| r.strength).unwrap_or(0),
        Opponent::Rebels { building_id, .. } => buildings
            .get(building_id)
            .and_then(|b| b.rebel_base.as_ref())
            .map(|base| base.soldiers * config.rebel_soldier_value)
            .unwrap_or(0),
    }
}

/// Ties go to the defender.
pub fn is_victory(player: u32, opponent: u32) -> bool {
    player > opponent
}

/// Despawn up to `count` randomly chosen soldiers. Returns how many left.
pub fn remove_random_soldiers(world: &mut World, count: u32) -> u32 {
    let mut roster = soldier_entities(world);
    let mut removed = 0;
    for _ in 0..count {
        let pick = world.resource_mut::<SimRng>().pick_index(roster.len());
        let Some(index) = pick else {
            break;
        };
        let (entity, _) = roster.remove(index);
        world.despawn(entity);
        removed += 1;
    }
    removed
}

/// Resolve a conflict and apply every consequence.
pub fn resolve_conflict(world: &mut World, spec: &ConflictSpec) -> ConflictReport {
    let config = world.resource::<EngineConfig>().conflict.clone();

    let (player, opponent, soldier_count) = {
        let soldiers = all_soldiers(world);
        let key = spec
            .key_officer
            .as_deref()
            .and_then(|id| officer_by_id(world, id));
        let rivals = world.resource::<RivalRegistry>();
        let allied = match &spec.opponent {
            Opponent::Police => 0,
            Opponent::Rival { rival_id } => {
                rivals.allied_strength(Some(rival_id), config.ally_strength_share)
            }
            Opponent::Rebels { .. } => rivals.allied_strength(None, config.ally_strength_share),
        };
        let player = player_strength(&soldiers, key, allied, &config);
        let opponent = opponent_strength(
            &spec.opponent,
            rivals,
            world.resource::<BuildingRegistry>(),
            world.resource::<Ledger>().heat(),
            &config,
        );
        (player, opponent, soldiers.len() as u32)
    };

    let victory = is_victory(player, opponent);
    let (min, max) = if victory {
        (config.victory_casualties_min, config.victory_casualties_max)
    } else {
        (config.defeat_casualties_min, config.defeat_casualties_max)
    };
    let percent = world.resource_mut::<SimRng>().range_inclusive(min, max);
    let casualties = remove_random_soldiers(world, (soldier_count * percent + 50) / 100);

    let mut report = ConflictReport {
        kind: spec.kind,
        opponent: spec.opponent.clone(),
        player_strength: player,
        opponent_strength: opponent,
        victory,
        casualties,
        key_officer: spec.key_officer.clone(),
        officer_fate: None,
        battle_hardened: false,
    };

    if victory {
        apply_victory(world, spec, &config, &mut report);
    } else {
        apply_defeat(world, spec, &config, &mut report);
    }

    match &spec.opponent {
        Opponent::Rival { rival_id } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.settle_conflict();
            }
        }
        Opponent::Rebels { .. } => world.resource_mut::<InternalFriction>().reset(),
        Opponent::Police => {}
    }

    tracing::info!(
        kind = spec.kind.label(),
        player,
        opponent,
        victory,
        casualties,
        "Conflict resolved"
    );

    let summary = format!(
        "{} {}: {} against {}, {} soldiers lost",
        spec.kind.label(),
        if victory { "won" } else { "lost" },
        player,
        opponent,
        casualties
    );
    let fate = report.officer_fate.clone();
    let subjects = spec.key_officer.clone();
    chronicle::record(world, EntryCategory::Conflict, summary, |mut e| {
        e = e.with_tag(if victory { tags::VICTORY } else { tags::DEFEAT });
        if casualties > 0 {
            e = e.with_tag(tags::CASUALTIES);
        }
        match fate {
            Some(OfficerFate::Wounded { .. }) => e = e.with_tag(tags::WOUNDED),
            Some(OfficerFate::Arrested) => e = e.with_tag(tags::ARRESTED),
            None => {}
        }
        if let Some(officer) = subjects {
            e = e.with_subject(officer);
        }
        e
    });

    events::emit(
        world,
        EventKind::PostConflictReport {
            report: report.clone(),
        },
    );

    report
}

fn apply_victory(
    world: &mut World,
    spec: &ConflictSpec,
    config: &ConflictConfig,
    report: &mut ConflictReport,
) {
    world
        .resource_mut::<Ledger>()
        .adjust_reputation(config.victory_reputation);

    if let Some(entity) = spec.key_officer.as_deref().and_then(|id| find_officer(world, id)) {
        let hardened = world
            .resource_mut::<SimRng>()
            .chance(config.battle_hardened_chance);
        if let Some(mut officer) = world.get_mut::<Officer>(entity) {
            officer.adjust_face(config.victory_face);
            if hardened {
                report.battle_hardened = officer.add_trait(OfficerTrait::BattleHardened);
            }
        }
    }

    match &spec.opponent {
        Opponent::Police => world.resource_mut::<Ledger>().adjust_heat(10),
        Opponent::Rival { rival_id } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.strength = rival.strength * 9 / 10;
                rival.adjust_relationship(-10);
            }
        }
        Opponent::Rebels {
            building_id,
            officer_id,
        } => {
            if let Some(building) = world.resource_mut::<BuildingRegistry>().get_mut(building_id) {
                building.rebel_base = None;
            }
            if let Some(entity) = find_officer(world, officer_id) {
                world.despawn(entity);
            }
            world.resource_mut::<RelationshipGraph>().forget(officer_id);
            let building = building_id.clone();
            chronicle::record(
                world,
                EntryCategory::Loyalty,
                format!("The rebellion at {} is crushed", building_id),
                |e| e.with_tag(tags::REBELLION).with_subject(building),
            );
        }
    }
}

fn apply_defeat(
    world: &mut World,
    spec: &ConflictSpec,
    config: &ConflictConfig,
    report: &mut ConflictReport,
) {
    world
        .resource_mut::<Ledger>()
        .adjust_reputation(-config.defeat_reputation);

    let mut officers = world.query::<&mut Officer>();
    for mut officer in officers.iter_mut(world) {
        if !officer.traitor {
            officer.adjust_loyalty(-config.defeat_loyalty);
        }
    }

    if let Some(entity) = spec.key_officer.as_deref().and_then(|id| find_officer(world, id)) {
        let injured = world
            .resource_mut::<SimRng>()
            .chance(config.key_officer_injury_chance);
        if injured {
            let vacated = world.get_mut::<Officer>(entity).and_then(|mut officer| {
                if !officer.is_available() {
                    return None;
                }
                if spec.kind == ConflictKind::Raid {
                    report.officer_fate = Some(OfficerFate::Arrested);
                    officer.arrest()
                } else {
                    report.officer_fate = Some(OfficerFate::Wounded {
                        days: config.wound_days,
                    });
                    officer.wound(config.wound_days, config.wound_energy_floor)
                }
            });
            if let Some(building_id) = vacated {
                if let Some(building) = world.resource_mut::<BuildingRegistry>().get_mut(&building_id) {
                    building.assigned_officer = None;
                }
            }
        }
    }

    let closure = match spec.kind {
        ConflictKind::Raid => Some(RAID_CLOSURE_DAYS),
        ConflictKind::RivalAttack => Some(ATTACK_CLOSURE_DAYS),
        _ => None,
    };
    if let (Some(days), Some(building_id)) = (closure, spec.stake_building.as_deref()) {
        let day = world.resource::<GameClock>().day();
        if let Some(building) = world.resource_mut::<BuildingRegistry>().get_mut(building_id) {
            building.inactive_until_day = Some(day + days);
        }
    }

    match &spec.opponent {
        Opponent::Police => world.resource_mut::<Ledger>().adjust_heat(-10),
        Opponent::Rival { rival_id } => {
            if let Some(rival) = world.resource_mut::<RivalRegistry>().get_mut(rival_id) {
                rival.adjust_relationship(-5);
            }
        }
        Opponent::Rebels { building_id, .. } => {
            tracing::info!("Rebel base at {} still stands", building_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Rank, Skills};

    fn soldiers(n: usize, skill: u32, loyalty: i32) -> Vec<Soldier> {
        (0..n)
            .map(|i| Soldier::new(format!("soldier_{:03}", i), skill).with_loyalty(loyalty))
            .collect()
    }

    #[test]
    fn test_only_loyal_soldiers_fight() {
        let config = ConflictConfig::default();
        let mut roster = soldiers(4, 5, 60);
        roster.push(Soldier::new("soldier_x", 10).with_loyalty(30));
        let refs: Vec<&Soldier> = roster.iter().collect();
        assert_eq!(player_strength(&refs, None, 0, &config), 20);
    }

    #[test]
    fn test_specialist_bonus() {
        let config = ConflictConfig::default();
        let roster = soldiers(2, 5, 60);
        let refs: Vec<&Soldier> = roster.iter().collect();
        let mut officer = Officer::new("officer_001", "Ah Keung", Rank::RedPole)
            .with_skills(Skills::new(80, 10, 10));
        assert_eq!(player_strength(&refs, Some(&officer), 0, &config), 10 + 40);

        officer.add_trait(OfficerTrait::BattleHardened);
        assert_eq!(player_strength(&refs, Some(&officer), 0, &config), 10 + 40 + 5);

        officer.wounded_days = 2;
        assert_eq!(player_strength(&refs, Some(&officer), 0, &config), 10);
    }

    #[test]
    fn test_strength_is_monotonic_in_soldiers() {
        let config = ConflictConfig::default();
        let mut roster = Vec::new();
        let mut last = 0;
        for i in 0..20 {
            roster.push(Soldier::new(format!("s{}", i), (i % 10) as u32 + 1).with_loyalty(70));
            let refs: Vec<&Soldier> = roster.iter().collect();
            let strength = player_strength(&refs, None, 0, &config);
            assert!(strength >= last);
            last = strength;
        }
    }

    #[test]
    fn test_ties_lose() {
        assert!(!is_victory(40, 40));
        assert!(is_victory(41, 40));
        assert!(!is_victory(0, 0));
    }

    #[test]
    fn test_police_strength_scales_with_heat() {
        let config = ConflictConfig::default();
        let rivals = RivalRegistry::new();
        let buildings = BuildingRegistry::new();
        assert_eq!(
            opponent_strength(&Opponent::Police, &rivals, &buildings, 50, &config),
            60
        );
        assert_eq!(
            opponent_strength(&Opponent::Police, &rivals, &buildings, 0, &config),
            0
        );
    }
}
