//! Relationship System
//!
//! Leader interactions with officers, officer-to-officer social interactions,
//! and organization-wide loyalty shocks.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::{tags, EntryCategory};

use crate::chronicle;
use crate::components::{
    all_officers, officer_by_id, update_officer, Cost, GameClock, InternalFriction,
    Ledger, Officer, OfficerTrait, RelationshipGraph,
};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::rng::SimRng;

/// Fixed interaction deltas
pub mod interaction_constants {
    pub const TALK_LOYALTY: i32 = 3;
    pub const GIFT_LOYALTY: i32 = 8;
    pub const GIFT_LOYALTY_GREEDY: i32 = 12;
    pub const THREATEN_LOYALTY: i32 = -10;
    pub const THREATEN_LOYALTY_RUTHLESS: i32 = -2;
    pub const THREATEN_FACE: i32 = -5;
    pub const THREATEN_FRICTION: i32 = 3;
    pub const BONUS_LOYALTY: i32 = 10;
    pub const BONUS_FACE: i32 = 5;

    /// Energy each participant spends on a peer interaction
    pub const PEER_ENERGY_COST: u32 = 10;
    pub const DEEP_TALK_AFFINITY: i32 = 8;
    pub const DEEP_TALK_AFFINITY_BACK: i32 = 6;
    pub const DEEP_TALK_RESPECT: i32 = 3;
    pub const JOKE_FLAT_CHANCE: f64 = 0.25;
    pub const JOKE_LANDS: i32 = 5;
    pub const JOKE_FALLS_FLAT: i32 = -3;
    pub const FLIRT_INTEREST: i32 = 10;
    pub const FLIRT_ROMANTIC_BONUS: i32 = 5;
    /// Affinity the target needs to feel anything back
    pub const FLIRT_RECIPROCATE_AFFINITY: i32 = 30;
    pub const FLIRT_RECIPROCATED_INTEREST: i32 = 8;
    pub const ARGUMENT_AFFINITY: i32 = -10;
    pub const ARGUMENT_AFFINITY_HOTHEAD: i32 = -15;
    /// Below this affinity an argument leaves a grudge
    pub const ARGUMENT_GRUDGE_AFFINITY: i32 = -30;
    pub const INTRIGUE_RESPECT: i32 = 5;
    pub const INTRIGUE_AFFINITY: i32 = 4;
    pub const INTRIGUE_FRICTION: i32 = 2;
    pub const PEER_GIFT_AFFINITY: i32 = 10;
    pub const PEER_GIFT_AFFINITY_GREEDY: i32 = 15;
    pub const PEER_GIFT_AFFINITY_BACK: i32 = 2;
}

use interaction_constants::*;

/// Things the leader can do with an officer, once per officer per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderInteraction {
    Talk,
    Gift,
    Threaten,
    Bonus,
}

impl LeaderInteraction {
    pub fn label(&self) -> &'static str {
        match self {
            LeaderInteraction::Talk => "talk",
            LeaderInteraction::Gift => "gift",
            LeaderInteraction::Threaten => "threaten",
            LeaderInteraction::Bonus => "bonus",
        }
    }

    pub fn cost(&self, config: &EngineConfig) -> Cost {
        match self {
            LeaderInteraction::Gift => Cost::cash(config.economy.gift_cost),
            LeaderInteraction::Bonus => Cost::cash(config.economy.bonus_cost),
            LeaderInteraction::Talk | LeaderInteraction::Threaten => Cost::free(),
        }
    }
}

/// Result of a leader interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderOutcome {
    pub loyalty_delta: i32,
    pub face_delta: i32,
}

/// Officer-to-officer interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerInteraction {
    DeepConversation,
    Joke,
    Flirtation,
    Argument,
    Intrigue,
    Gift,
}

impl PeerInteraction {
    pub fn all() -> &'static [PeerInteraction] {
        &[
            PeerInteraction::DeepConversation,
            PeerInteraction::Joke,
            PeerInteraction::Flirtation,
            PeerInteraction::Argument,
            PeerInteraction::Intrigue,
            PeerInteraction::Gift,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeerInteraction::DeepConversation => "deep_conversation",
            PeerInteraction::Joke => "joke",
            PeerInteraction::Flirtation => "flirtation",
            PeerInteraction::Argument => "argument",
            PeerInteraction::Intrigue => "intrigue",
            PeerInteraction::Gift => "gift",
        }
    }
}

/// Result of a peer interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerOutcome {
    pub interaction: PeerInteraction,
    pub initiator: String,
    pub target: String,
    /// Affinity change of initiator toward target
    pub affinity_delta: i32,
    /// Affinity change of target toward initiator
    pub affinity_delta_back: i32,
    /// Joke fell flat, or flirtation went unanswered
    pub misfired: bool,
    pub grudge_formed: bool,
}

fn available_officer(world: &World, officer_id: &str) -> Result<Officer, CommandError> {
    let officer = officer_by_id(world, officer_id)
        .ok_or_else(|| CommandError::OfficerNotFound(officer_id.to_string()))?;
    if !officer.is_available() {
        return Err(CommandError::OfficerUnavailable(officer_id.to_string()));
    }
    Ok(officer.clone())
}

/// Leader spends time with an officer.
pub fn leader_interact(
    world: &mut World,
    officer_id: &str,
    interaction: LeaderInteraction,
) -> Result<LeaderOutcome, CommandError> {
    let officer = available_officer(world, officer_id)?;
    let day = world.resource::<GameClock>().day();
    if officer.last_interaction_day == Some(day) {
        return Err(CommandError::AlreadyInteractedToday(officer_id.to_string()));
    }

    let cost = interaction.cost(world.resource::<EngineConfig>());
    world.resource_mut::<Ledger>().try_spend(&cost)?;

    let outcome = match interaction {
        LeaderInteraction::Talk => LeaderOutcome {
            loyalty_delta: TALK_LOYALTY,
            face_delta: 0,
        },
        LeaderInteraction::Gift => LeaderOutcome {
            loyalty_delta: if officer.has_trait(OfficerTrait::Greedy) {
                GIFT_LOYALTY_GREEDY
            } else {
                GIFT_LOYALTY
            },
            face_delta: 0,
        },
        LeaderInteraction::Threaten => LeaderOutcome {
            loyalty_delta: if officer.has_trait(OfficerTrait::Ruthless) {
                THREATEN_LOYALTY_RUTHLESS
            } else {
                THREATEN_LOYALTY
            },
            face_delta: THREATEN_FACE,
        },
        LeaderInteraction::Bonus => LeaderOutcome {
            loyalty_delta: BONUS_LOYALTY,
            face_delta: BONUS_FACE,
        },
    };

    update_officer(world, officer_id, |o| {
        o.adjust_loyalty(outcome.loyalty_delta);
        o.adjust_face(outcome.face_delta);
        o.last_interaction_day = Some(day);
        if interaction == LeaderInteraction::Talk {
            o.testing_waters = false;
        }
    });
    if interaction == LeaderInteraction::Threaten {
        world.resource_mut::<InternalFriction>().adjust(THREATEN_FRICTION);
    }

    tracing::debug!(
        officer = officer_id,
        interaction = interaction.label(),
        loyalty = outcome.loyalty_delta,
        "Leader interaction"
    );
    let subject = officer_id.to_string();
    chronicle::record(
        world,
        EntryCategory::Social,
        format!("The leader and {}: {}", officer.name, interaction.label()),
        |e| e.with_subject(subject),
    );

    Ok(outcome)
}

/// Two officers interact. Both spend energy.
pub fn peer_interact(
    world: &mut World,
    initiator_id: &str,
    target_id: &str,
    interaction: PeerInteraction,
) -> Result<PeerOutcome, CommandError> {
    if initiator_id == target_id {
        return Err(CommandError::NotEligible(
            "an officer cannot socialize with themselves".into(),
        ));
    }
    let initiator = available_officer(world, initiator_id)?;
    let target = available_officer(world, target_id)?;
    for officer in [&initiator, &target] {
        if officer.energy < PEER_ENERGY_COST {
            return Err(CommandError::OfficerExhausted(officer.id.clone()));
        }
    }

    let day = world.resource::<GameClock>().day();
    let flat_roll = if interaction == PeerInteraction::Joke {
        world.resource_mut::<SimRng>().roll()
    } else {
        1.0
    };

    for id in [initiator_id, target_id] {
        update_officer(world, id, |o| o.spend_energy(PEER_ENERGY_COST));
    }

    let mut outcome = PeerOutcome {
        interaction,
        initiator: initiator_id.to_string(),
        target: target_id.to_string(),
        affinity_delta: 0,
        affinity_delta_back: 0,
        misfired: false,
        grudge_formed: false,
    };
    let mut friction = 0;
    let mut romance = false;

    {
        let mut graph = world.resource_mut::<RelationshipGraph>();
        graph.ensure_pair(initiator_id, target_id);

        match interaction {
            PeerInteraction::DeepConversation => {
                outcome.affinity_delta = DEEP_TALK_AFFINITY;
                outcome.affinity_delta_back = DEEP_TALK_AFFINITY_BACK;
                let memory = format!("A long talk late into the night on day {}", day);
                for (from, to) in [(initiator_id, target_id), (target_id, initiator_id)] {
                    let rel = graph.ensure_relationship(from, to);
                    rel.adjust_respect(DEEP_TALK_RESPECT);
                    rel.remember(day, memory.clone());
                }
            }
            PeerInteraction::Joke => {
                let flat = !initiator.has_trait(OfficerTrait::Charismatic)
                    && flat_roll < JOKE_FLAT_CHANCE;
                let delta = if flat { JOKE_FALLS_FLAT } else { JOKE_LANDS };
                outcome.misfired = flat;
                outcome.affinity_delta = delta;
                outcome.affinity_delta_back = delta;
            }
            PeerInteraction::Flirtation => {
                let interest = if initiator.has_trait(OfficerTrait::Romantic) {
                    FLIRT_INTEREST + FLIRT_ROMANTIC_BONUS
                } else {
                    FLIRT_INTEREST
                };
                graph
                    .ensure_relationship(initiator_id, target_id)
                    .adjust_romantic_interest(interest);
                let back = graph.ensure_relationship(target_id, initiator_id);
                if back.affinity >= FLIRT_RECIPROCATE_AFFINITY {
                    back.adjust_romantic_interest(FLIRT_RECIPROCATED_INTEREST);
                    romance = back.is_in_love()
                        && graph
                            .get(initiator_id, target_id)
                            .is_some_and(|r| r.is_in_love());
                } else {
                    outcome.misfired = true;
                }
            }
            PeerInteraction::Argument => {
                let delta = if initiator.has_trait(OfficerTrait::Hothead) {
                    ARGUMENT_AFFINITY_HOTHEAD
                } else {
                    ARGUMENT_AFFINITY
                };
                outcome.affinity_delta = delta;
                outcome.affinity_delta_back = delta;
            }
            PeerInteraction::Intrigue => {
                outcome.affinity_delta = INTRIGUE_AFFINITY;
                outcome.affinity_delta_back = INTRIGUE_AFFINITY;
                friction = INTRIGUE_FRICTION;
                for (from, to) in [(initiator_id, target_id), (target_id, initiator_id)] {
                    let rel = graph.ensure_relationship(from, to);
                    rel.adjust_respect(INTRIGUE_RESPECT);
                    rel.remember(day, "Whispered plans behind closed doors");
                }
            }
            PeerInteraction::Gift => {
                outcome.affinity_delta = PEER_GIFT_AFFINITY_BACK;
                outcome.affinity_delta_back = if target.has_trait(OfficerTrait::Greedy) {
                    PEER_GIFT_AFFINITY_GREEDY
                } else {
                    PEER_GIFT_AFFINITY
                };
            }
        }

        let forward = graph.ensure_relationship(initiator_id, target_id);
        forward.adjust_affinity(outcome.affinity_delta);
        forward.last_interaction_day = Some(day);
        let forward_affinity = forward.affinity;
        let backward = graph.ensure_relationship(target_id, initiator_id);
        backward.adjust_affinity(outcome.affinity_delta_back);
        backward.last_interaction_day = Some(day);

        if interaction == PeerInteraction::Argument
            && forward_affinity < ARGUMENT_GRUDGE_AFFINITY
        {
            let reason = format!("A bitter argument on day {}", day);
            graph
                .ensure_relationship(initiator_id, target_id)
                .hold_grudge(day, reason.clone());
            graph
                .ensure_relationship(target_id, initiator_id)
                .hold_grudge(day, reason);
            outcome.grudge_formed = true;
        }
    }

    if friction != 0 {
        world.resource_mut::<InternalFriction>().adjust(friction);
    }

    tracing::debug!(
        initiator = initiator_id,
        target = target_id,
        interaction = interaction.label(),
        affinity = outcome.affinity_delta,
        "Peer interaction"
    );
    let summary = format!(
        "{} and {}: {}",
        initiator.name,
        target.name,
        interaction.label()
    );
    let subjects = [initiator_id.to_string(), target_id.to_string()];
    chronicle::record(world, EntryCategory::Social, summary, |mut e| {
        if romance {
            e = e.with_tag(tags::ROMANCE);
        }
        for subject in subjects {
            e = e.with_subject(subject);
        }
        e
    });

    Ok(outcome)
}

/// Flat loyalty penalty across the organization. Everyone except a designated
/// successor starts testing the waters. A successor halves the penalty.
pub fn loyalty_shock(world: &mut World, reason: &str) {
    let base = world.resource::<EngineConfig>().loyalty.shock_penalty;
    let has_successor = all_officers(world)
        .iter()
        .any(|o| o.successor && !o.traitor);
    let penalty = if has_successor { base / 2 } else { base };

    let mut officers = world.query::<&mut Officer>();
    for mut officer in officers.iter_mut(world) {
        if officer.traitor {
            continue;
        }
        officer.adjust_loyalty(-penalty);
        if !officer.successor {
            officer.testing_waters = true;
        }
    }

    tracing::info!(penalty, has_successor, "Loyalty shock: {}", reason);
    chronicle::record(
        world,
        EntryCategory::Loyalty,
        format!("{} (loyalty -{})", reason, penalty),
        |e| e.with_tag(tags::LOYALTY_SHOCK),
    );
}

/// Weights for which interaction two officers fall into, by how they feel
/// about each other.
fn mingle_weights(affinity: i32) -> [f64; 6] {
    // deep, joke, flirt, argument, intrigue, gift
    if affinity >= 30 {
        [4.0, 3.0, 2.0, 0.5, 1.0, 1.0]
    } else if affinity <= -30 {
        [0.5, 1.0, 0.0, 5.0, 1.0, 0.5]
    } else {
        [2.0, 3.0, 0.5, 1.5, 1.0, 1.0]
    }
}

/// Evening free time: two random officers interact on their own.
pub fn evening_mingle(world: &mut World) -> Option<PeerOutcome> {
    let candidates: Vec<String> = all_officers(world)
        .into_iter()
        .filter(|o| o.is_available() && o.energy >= PEER_ENERGY_COST)
        .map(|o| o.id.clone())
        .collect();
    if candidates.len() < 2 {
        return None;
    }

    let (a, b, interaction) = {
        let mut rng = world.resource_mut::<SimRng>();
        let first = rng.pick_index(candidates.len())?;
        let mut second = rng.pick_index(candidates.len() - 1)?;
        if second >= first {
            second += 1;
        }
        (candidates[first].clone(), candidates[second].clone(), rng.roll())
    };

    let affinity = world
        .resource::<RelationshipGraph>()
        .get(&a, &b)
        .map(|r| r.affinity)
        .unwrap_or(0);
    let index = crate::rng::weighted_pick(interaction, &mingle_weights(affinity))?;
    let interaction = PeerInteraction::all()[index];

    match peer_interact(world, &a, &b, interaction) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::debug!("Evening mingle skipped: {}", e);
            None
        }
    }
}

/// Whether the officer exists and can be spoken to right now.
pub fn can_interact(world: &World, officer_id: &str) -> bool {
    let day = world.resource::<GameClock>().day();
    officer_by_id(world, officer_id)
        .is_some_and(|o| o.is_available() && o.last_interaction_day != Some(day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronicle::Chronicle;
    use crate::components::{Rank, Relationship};
    use crate::rng::ScriptedRolls;

    fn setup(roll: f64) -> World {
        let mut world = World::new();
        world.insert_resource(EngineConfig::default());
        world.insert_resource(GameClock::new());
        world.insert_resource(Ledger::new(5_000, 30, 10, 20, 20));
        world.insert_resource(RelationshipGraph::new());
        world.insert_resource(InternalFriction::default());
        world.insert_resource(Chronicle::default());
        world.insert_resource(SimRng::new(ScriptedRolls::constant(roll)));
        world.spawn(Officer::new("officer_001", "Big Brother Wah", Rank::Deputy));
        world.spawn(
            Officer::new("officer_002", "Ah Keung", Rank::RedPole)
                .with_traits([OfficerTrait::Hothead]),
        );
        world.spawn(
            Officer::new("officer_003", "Mei Ling", Rank::WhitePaperFan)
                .with_traits([OfficerTrait::Greedy, OfficerTrait::Charismatic]),
        );
        world
    }

    fn loyalty(world: &World, id: &str) -> i32 {
        officer_by_id(world, id).unwrap().loyalty
    }

    #[test]
    fn test_deep_conversation_creates_both_records() {
        let mut world = setup(0.5);
        assert!(!world
            .resource::<RelationshipGraph>()
            .has_relationship("officer_001", "officer_002"));

        peer_interact(
            &mut world,
            "officer_001",
            "officer_002",
            PeerInteraction::DeepConversation,
        )
        .unwrap();

        let graph = world.resource::<RelationshipGraph>();
        let forward = graph.get("officer_001", "officer_002").unwrap();
        let backward = graph.get("officer_002", "officer_001").unwrap();
        assert_eq!(forward.affinity, DEEP_TALK_AFFINITY);
        assert_eq!(backward.affinity, DEEP_TALK_AFFINITY_BACK);
        assert_eq!(forward.memories.len(), 1);
        assert_eq!(backward.memories.len(), 1);
        assert_eq!(officer_by_id(&world, "officer_001").unwrap().energy, 90);
    }

    #[test]
    fn test_joke_can_fall_flat_unless_charismatic() {
        let mut world = setup(0.1);
        let flat = peer_interact(&mut world, "officer_001", "officer_002", PeerInteraction::Joke)
            .unwrap();
        assert!(flat.misfired);
        assert_eq!(flat.affinity_delta, JOKE_FALLS_FLAT);

        let landed = peer_interact(&mut world, "officer_003", "officer_002", PeerInteraction::Joke)
            .unwrap();
        assert!(!landed.misfired);
        assert_eq!(landed.affinity_delta, JOKE_LANDS);
    }

    #[test]
    fn test_argument_grudge_below_threshold() {
        let mut world = setup(0.5);
        world.resource_mut::<RelationshipGraph>().set(
            "officer_002",
            Relationship::new("officer_001").with_affinity(-25),
        );
        let outcome = peer_interact(
            &mut world,
            "officer_002",
            "officer_001",
            PeerInteraction::Argument,
        )
        .unwrap();
        assert_eq!(outcome.affinity_delta, ARGUMENT_AFFINITY_HOTHEAD);
        assert!(outcome.grudge_formed);
        let graph = world.resource::<RelationshipGraph>();
        assert_eq!(graph.get("officer_002", "officer_001").unwrap().grudges.len(), 1);
        assert_eq!(graph.get("officer_001", "officer_002").unwrap().grudges.len(), 1);
    }

    #[test]
    fn test_self_interaction_and_exhaustion_rejected() {
        let mut world = setup(0.5);
        assert!(matches!(
            peer_interact(&mut world, "officer_001", "officer_001", PeerInteraction::Gift),
            Err(CommandError::NotEligible(_))
        ));

        update_officer(&mut world, "officer_002", |o| o.energy = 5);
        let err = peer_interact(&mut world, "officer_001", "officer_002", PeerInteraction::Gift)
            .unwrap_err();
        assert_eq!(err, CommandError::OfficerExhausted("officer_002".into()));
        assert_eq!(officer_by_id(&world, "officer_001").unwrap().energy, 100);
    }

    #[test]
    fn test_leader_gift_greedy_and_once_per_day() {
        let mut world = setup(0.5);
        let outcome = leader_interact(&mut world, "officer_003", LeaderInteraction::Gift).unwrap();
        assert_eq!(outcome.loyalty_delta, GIFT_LOYALTY_GREEDY);
        assert_eq!(loyalty(&world, "officer_003"), 60 + GIFT_LOYALTY_GREEDY);
        assert_eq!(world.resource::<Ledger>().cash(), 4_500);

        let again = leader_interact(&mut world, "officer_003", LeaderInteraction::Talk);
        assert_eq!(
            again,
            Err(CommandError::AlreadyInteractedToday("officer_003".into()))
        );
    }

    #[test]
    fn test_unaffordable_bonus_changes_nothing() {
        let mut world = setup(0.5);
        world.insert_resource(Ledger::new(200, 30, 10, 20, 20));
        let err = leader_interact(&mut world, "officer_001", LeaderInteraction::Bonus).unwrap_err();
        assert!(matches!(err, CommandError::InsufficientResources { .. }));
        assert_eq!(loyalty(&world, "officer_001"), 60);
        assert!(officer_by_id(&world, "officer_001")
            .unwrap()
            .last_interaction_day
            .is_none());
    }

    #[test]
    fn test_loyalty_shock_clamps_and_talk_reassures() {
        let mut world = setup(0.5);
        update_officer(&mut world, "officer_002", |o| o.loyalty = 5);
        loyalty_shock(&mut world, "test");
        assert_eq!(loyalty(&world, "officer_002"), 0);
        assert_eq!(loyalty(&world, "officer_001"), 45);
        assert!(officer_by_id(&world, "officer_001").unwrap().testing_waters);

        leader_interact(&mut world, "officer_001", LeaderInteraction::Talk).unwrap();
        assert!(!officer_by_id(&world, "officer_001").unwrap().testing_waters);
    }

    #[test]
    fn test_successor_halves_shock() {
        let mut world = setup(0.5);
        update_officer(&mut world, "officer_001", |o| o.successor = true);
        loyalty_shock(&mut world, "test");
        assert_eq!(loyalty(&world, "officer_002"), 53);
        let successor = officer_by_id(&world, "officer_001").unwrap();
        assert!(!successor.testing_waters);
        assert_eq!(successor.loyalty, 53);
    }

    #[test]
    fn test_evening_mingle_picks_distinct_pair() {
        let mut world = setup(0.0);
        let outcome = evening_mingle(&mut world).unwrap();
        assert_ne!(outcome.initiator, outcome.target);
    }
}
