//! Council System
//!
//! Every few days the senior officers sit as a council and vote on motions.
//! The leader casts the deciding vote: going against the council majority is a
//! veto, which costs influence and breeds resentment among the majority.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use syndicate_events::{tags, EntryCategory, Scene};

use crate::chronicle;
use crate::components::{
    all_officers, update_officer, Building, BuildingRegistry, BuildingType, Cost, GameClock,
    Grudge, IdSequence, InternalFriction, Ledger, Officer, OfficerTrait, Soldier,
};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::rng::SimRng;

/// Vote score at or above which an officer votes yes
pub const VOTE_YES_THRESHOLD: f64 = 50.0;

/// Motion categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    Expansion,
    Internal,
}

/// What a motion does if passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "building_type", rename_all = "snake_case")]
pub enum MotionEffect {
    SeizeStorefront(BuildingType),
    ExpandRacket,
    RaiseStipend,
    Crackdown,
    ShareProfits,
}

impl MotionEffect {
    pub fn motion_type(&self) -> MotionType {
        match self {
            MotionEffect::SeizeStorefront(_) | MotionEffect::ExpandRacket => MotionType::Expansion,
            MotionEffect::RaiseStipend | MotionEffect::Crackdown | MotionEffect::ShareProfits => {
                MotionType::Internal
            }
        }
    }

    pub fn title(&self) -> String {
        match self {
            MotionEffect::SeizeStorefront(t) => format!("Take over a {} on the next street", t.label()),
            MotionEffect::ExpandRacket => "Push protection money into new blocks".to_string(),
            MotionEffect::RaiseStipend => "Raise the soldiers' stipend".to_string(),
            MotionEffect::Crackdown => "Crack down on loose talk in the ranks".to_string(),
            MotionEffect::ShareProfits => "Share this month's profits with the officers".to_string(),
        }
    }

    /// What the treasury pays out if the motion passes
    pub fn cost(&self) -> Cost {
        match self {
            MotionEffect::RaiseStipend => Cost::cash(STIPEND_RAISE_COST),
            MotionEffect::ShareProfits => Cost::cash(PROFIT_SHARE_COST),
            _ => Cost::free(),
        }
    }

    /// Apply a passed motion. The payout is all or nothing: when the ledger
    /// cannot cover it nothing changes.
    pub fn apply(&self, world: &mut World) -> Result<(), CommandError> {
        world.resource_mut::<Ledger>().try_spend(&self.cost())?;
        match self {
            MotionEffect::SeizeStorefront(building_type) => {
                let id = world.resource_mut::<IdSequence>().next_building_id();
                world
                    .resource_mut::<BuildingRegistry>()
                    .register(Building::new(id, *building_type));
                world.resource_mut::<Ledger>().adjust_heat(5);
            }
            MotionEffect::ExpandRacket => {
                let mut ledger = world.resource_mut::<Ledger>();
                ledger.adjust_reputation(5);
                ledger.adjust_heat(8);
            }
            MotionEffect::RaiseStipend => {
                let mut soldiers = world.query::<&mut Soldier>();
                for mut soldier in soldiers.iter_mut(world) {
                    soldier.needs.adjust(0, 0, 15);
                    soldier.adjust_loyalty(5);
                }
            }
            MotionEffect::Crackdown => {
                world.resource_mut::<Ledger>().adjust_reputation(3);
                world.resource_mut::<InternalFriction>().adjust(-20);
                let mut soldiers = world.query::<&mut Soldier>();
                for mut soldier in soldiers.iter_mut(world) {
                    soldier.adjust_loyalty(-5);
                }
            }
            MotionEffect::ShareProfits => {
                let mut officers = world.query::<&mut Officer>();
                for mut officer in officers.iter_mut(world) {
                    if !officer.traitor {
                        officer.adjust_loyalty(5);
                    }
                }
            }
        }
        Ok(())
    }
}

const STIPEND_RAISE_COST: i64 = 500;
const PROFIT_SHARE_COST: i64 = 1_000;

const EXPANSION_MOTIONS: &[MotionEffect] = &[
    MotionEffect::SeizeStorefront(BuildingType::NoodleStall),
    MotionEffect::SeizeStorefront(BuildingType::Teahouse),
    MotionEffect::ExpandRacket,
];

const INTERNAL_MOTIONS: &[MotionEffect] = &[
    MotionEffect::RaiseStipend,
    MotionEffect::Crackdown,
    MotionEffect::ShareProfits,
];

/// A motion before the council
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilMotion {
    pub id: String,
    pub title: String,
    pub motion_type: MotionType,
    pub effect: MotionEffect,
    /// Officer id -> yes/no
    pub votes: BTreeMap<String, bool>,
    /// Votes the leader paid to dictate
    pub forced: BTreeSet<String>,
    pub vetoed: bool,
    pub resolved: bool,
    pub player_vote: Option<bool>,
}

impl CouncilMotion {
    pub fn new(id: impl Into<String>, effect: MotionEffect) -> Self {
        Self {
            id: id.into(),
            title: effect.title(),
            motion_type: effect.motion_type(),
            effect,
            votes: BTreeMap::new(),
            forced: BTreeSet::new(),
            vetoed: false,
            resolved: false,
            player_vote: None,
        }
    }

    pub fn yes_votes(&self) -> usize {
        self.votes.values().filter(|v| **v).count()
    }

    /// Strict majority of recorded votes in favor
    pub fn majority(&self) -> bool {
        self.yes_votes() * 2 > self.votes.len()
    }
}

/// How an officer leans on a motion.
pub fn vote_score(officer: &Officer, effect: &MotionEffect) -> f64 {
    let mut score = officer.loyalty as f64 * 0.6 + officer.rank.tier() as f64 * 10.0;
    if officer.has_trait(OfficerTrait::Loyal) {
        score += 10.0;
    }
    if officer.has_trait(OfficerTrait::Ambitious) {
        score += match effect.motion_type() {
            MotionType::Expansion => 15.0,
            MotionType::Internal => -5.0,
        };
    }
    if officer.has_trait(OfficerTrait::Cautious) && effect.motion_type() == MotionType::Expansion {
        score -= 15.0;
    }
    match effect {
        MotionEffect::ShareProfits if officer.has_trait(OfficerTrait::Greedy) => score += 20.0,
        MotionEffect::RaiseStipend if officer.has_trait(OfficerTrait::Greedy) => score -= 10.0,
        MotionEffect::Crackdown if officer.has_trait(OfficerTrait::Ruthless) => score += 15.0,
        _ => {}
    }
    score
}

pub fn predicted_vote(officer: &Officer, effect: &MotionEffect) -> bool {
    vote_score(officer, effect) >= VOTE_YES_THRESHOLD
}

/// Resource: the current council session, if any
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouncilSession {
    pub active: bool,
    pub day: u32,
    pub members: Vec<String>,
    pub motions: Vec<CouncilMotion>,
}

impl CouncilSession {
    pub fn is_member(&self, officer_id: &str) -> bool {
        self.members.iter().any(|m| m == officer_id)
    }

    pub fn motion(&self, motion_id: &str) -> Option<&CouncilMotion> {
        self.motions.iter().find(|m| m.id == motion_id)
    }

    pub fn motion_mut(&mut self, motion_id: &str) -> Option<&mut CouncilMotion> {
        self.motions.iter_mut().find(|m| m.id == motion_id)
    }

    pub fn unresolved(&self) -> usize {
        self.motions.iter().filter(|m| !m.resolved).count()
    }

    pub fn all_resolved(&self) -> bool {
        self.unresolved() == 0
    }
}

/// Council seats go to the highest ranked, then most loyal, officers.
pub fn select_members(officers: &[&Officer], seats: usize) -> Vec<String> {
    let mut eligible: Vec<&&Officer> = officers.iter().filter(|o| o.is_available()).collect();
    eligible.sort_by(|a, b| {
        b.rank
            .tier()
            .cmp(&a.rank.tier())
            .then(b.loyalty.cmp(&a.loyalty))
            .then(a.id.cmp(&b.id))
    });
    eligible.into_iter().take(seats).map(|o| o.id.clone()).collect()
}

/// Open a council session for today. Motions and votes are generated up front.
pub fn convene(world: &mut World) {
    let config = world.resource::<EngineConfig>().council.clone();
    let day = world.resource::<GameClock>().day();

    let members = select_members(&all_officers(world), config.seats);

    let effects: Vec<MotionEffect> = {
        let mut rng = world.resource_mut::<SimRng>();
        let count = ((rng.roll() * 3.0) as usize).min(config.max_motions);
        (0..count)
            .filter_map(|_| {
                let pool = if rng.chance(0.5) {
                    EXPANSION_MOTIONS
                } else {
                    INTERNAL_MOTIONS
                };
                rng.pick_index(pool.len()).map(|i| pool[i])
            })
            .collect()
    };

    let mut motions = Vec::with_capacity(effects.len());
    for effect in effects {
        let id = world.resource_mut::<IdSequence>().next_motion_id();
        let mut motion = CouncilMotion::new(id, effect);
        for officer in all_officers(world)
            .into_iter()
            .filter(|o| members.contains(&o.id))
        {
            motion.votes.insert(officer.id.clone(), predicted_vote(officer, &effect));
        }
        motions.push(motion);
    }

    let motion_count = motions.len();
    world.insert_resource(CouncilSession {
        active: true,
        day,
        members: members.clone(),
        motions,
    });
    world.resource_mut::<GameClock>().scene = Scene::Council;

    tracing::info!(day, motions = motion_count, "Council convened");
    chronicle::record(
        world,
        EntryCategory::Council,
        format!("The council sits with {} motions", motion_count),
        |mut e| {
            for member in members {
                e = e.with_subject(member);
            }
            e
        },
    );
}

/// Close the session and return to the district.
pub fn adjourn(world: &mut World) {
    world.resource_mut::<CouncilSession>().active = false;
    world.resource_mut::<GameClock>().scene = Scene::District;
    tracing::info!("Council adjourned");
}

/// Result of the leader's vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub motion_id: String,
    pub approve: bool,
    pub majority: bool,
    pub vetoed: bool,
    /// The motion's effect was applied
    pub passed: bool,
    pub adjourned: bool,
}

/// The leader votes on a motion.
pub fn cast_vote(
    world: &mut World,
    motion_id: &str,
    approve: bool,
) -> Result<VoteOutcome, CommandError> {
    let config = world.resource::<EngineConfig>().council.clone();
    let session = world.resource::<CouncilSession>();
    if !session.active {
        return Err(CommandError::NoCouncilSession);
    }
    let motion = session
        .motion(motion_id)
        .ok_or_else(|| CommandError::MotionNotFound(motion_id.to_string()))?;
    if motion.resolved {
        return Err(CommandError::MotionResolved(motion_id.to_string()));
    }
    let motion = motion.clone();
    let majority = motion.majority();
    let vetoed = approve != majority;
    let mut passed = false;

    if vetoed {
        world
            .resource_mut::<Ledger>()
            .try_spend(&Cost::influence(config.veto_cost))?;

        let day = world.resource::<GameClock>().day();
        let resentful: Vec<String> = motion
            .votes
            .iter()
            .filter(|(id, vote)| **vote == majority && !motion.forced.contains(*id))
            .map(|(id, _)| id.clone())
            .collect();
        for officer_id in &resentful {
            update_officer(world, officer_id, |o| {
                o.adjust_loyalty(-config.veto_loyalty_penalty);
                o.leader_grudges
                    .push(Grudge::new(day, format!("Overruled on: {}", motion.title)));
            });
        }
        tracing::info!(motion = motion_id, "Leader vetoed the council");
        chronicle::record(
            world,
            EntryCategory::Council,
            format!("The leader overrules the council: {}", motion.title),
            |mut e| {
                e = e.with_tag(tags::VETO);
                for officer_id in resentful {
                    e = e.with_subject(officer_id);
                }
                e
            },
        );
    } else {
        let verdict = if approve {
            match motion.effect.apply(world) {
                Ok(()) => {
                    passed = true;
                    "passes"
                }
                Err(e) => {
                    tracing::info!(motion = motion_id, error = %e, "Motion passed but went unpaid");
                    "passes, but the coffers cannot cover it"
                }
            }
        } else {
            "fails"
        };
        world
            .resource_mut::<Ledger>()
            .adjust_influence(config.concur_influence);
        chronicle::record(
            world,
            EntryCategory::Council,
            format!("{} {}", motion.title, verdict),
            |e| e,
        );
    }

    let adjourned = {
        let mut session = world.resource_mut::<CouncilSession>();
        if let Some(m) = session.motion_mut(motion_id) {
            m.resolved = true;
            m.vetoed = vetoed;
            m.player_vote = Some(approve);
        }
        session.all_resolved()
    };
    if adjourned {
        adjourn(world);
    }

    Ok(VoteOutcome {
        motion_id: motion_id.to_string(),
        approve,
        majority,
        vetoed,
        passed,
        adjourned,
    })
}

/// Pay influence to dictate one member's vote. The member bears no grudge for
/// a vote they were told to cast.
pub fn force_vote(
    world: &mut World,
    motion_id: &str,
    officer_id: &str,
    approve: bool,
) -> Result<(), CommandError> {
    let cost = world.resource::<EngineConfig>().council.force_vote_cost;
    let session = world.resource::<CouncilSession>();
    if !session.active {
        return Err(CommandError::NoCouncilSession);
    }
    let motion = session
        .motion(motion_id)
        .ok_or_else(|| CommandError::MotionNotFound(motion_id.to_string()))?;
    if motion.resolved {
        return Err(CommandError::MotionResolved(motion_id.to_string()));
    }
    if !session.is_member(officer_id) {
        return Err(CommandError::NotCouncilMember(officer_id.to_string()));
    }

    world
        .resource_mut::<Ledger>()
        .try_spend(&Cost::influence(cost))?;

    let mut session = world.resource_mut::<CouncilSession>();
    if let Some(motion) = session.motion_mut(motion_id) {
        motion.votes.insert(officer_id.to_string(), approve);
        motion.forced.insert(officer_id.to_string());
    }
    tracing::debug!(motion = motion_id, officer = officer_id, approve, "Vote forced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronicle::Chronicle;
    use crate::components::{officer_by_id, Rank};
    use crate::rng::ScriptedRolls;

    fn setup(rolls: Vec<f64>) -> World {
        let mut world = World::new();
        world.insert_resource(EngineConfig::default());
        world.insert_resource(GameClock::new());
        world.insert_resource(Ledger::new(5_000, 30, 10, 20, 30));
        world.insert_resource(BuildingRegistry::new());
        world.insert_resource(InternalFriction::default());
        world.insert_resource(IdSequence::new());
        world.insert_resource(Chronicle::default());
        world.insert_resource(CouncilSession::default());
        world.insert_resource(SimRng::new(ScriptedRolls::new(rolls)));
        world.spawn(Officer::new("officer_001", "Big Brother Wah", Rank::Deputy).with_loyalty(80));
        world.spawn(Officer::new("officer_002", "Ah Keung", Rank::RedPole).with_loyalty(70));
        world.spawn(Officer::new("officer_003", "Mei Ling", Rank::WhitePaperFan).with_loyalty(20));
        world.spawn(Officer::new("officer_005", "Little Tiger", Rank::BlueLantern).with_loyalty(95));
        world
    }

    fn open_session(world: &mut World, effect: MotionEffect) -> String {
        let members = select_members(&all_officers(world), 3);
        let mut motion = CouncilMotion::new("motion_001", effect);
        for officer in all_officers(world) {
            if members.contains(&officer.id) {
                motion.votes.insert(officer.id.clone(), predicted_vote(officer, &effect));
            }
        }
        world.insert_resource(CouncilSession {
            active: true,
            day: 10,
            members,
            motions: vec![motion],
        });
        world.resource_mut::<GameClock>().scene = Scene::Council;
        "motion_001".to_string()
    }

    #[test]
    fn test_member_selection_by_tier_then_loyalty() {
        let world = setup(vec![0.5]);
        let members = select_members(&all_officers(&world), 3);
        assert_eq!(members, vec!["officer_001", "officer_002", "officer_003"]);
    }

    #[test]
    fn test_vote_scores() {
        let deputy = Officer::new("a", "A", Rank::Deputy).with_loyalty(80);
        // 48 + 20
        assert!(predicted_vote(&deputy, &MotionEffect::ExpandRacket));
        let disloyal = Officer::new("b", "B", Rank::WhitePaperFan).with_loyalty(20);
        // 12 + 10
        assert!(!predicted_vote(&disloyal, &MotionEffect::ExpandRacket));
        let greedy = disloyal.clone().with_traits([OfficerTrait::Greedy]);
        assert!(!predicted_vote(&greedy, &MotionEffect::ShareProfits));
    }

    #[test]
    fn test_convene_generates_votes_for_members() {
        // count roll 0.9 -> 2 motions, then type/template rolls
        let mut world = setup(vec![0.9, 0.1, 0.0, 0.9, 0.0]);
        convene(&mut world);
        let session = world.resource::<CouncilSession>();
        assert!(session.active);
        assert_eq!(session.motions.len(), 2);
        assert_eq!(
            session.motions[0].effect,
            MotionEffect::SeizeStorefront(BuildingType::NoodleStall)
        );
        assert_eq!(session.motions[1].effect, MotionEffect::RaiseStipend);
        for motion in &session.motions {
            assert_eq!(motion.votes.len(), 3);
            assert!(!motion.votes.contains_key("officer_005"));
        }
        assert_eq!(world.resource::<GameClock>().scene, Scene::Council);
    }

    #[test]
    fn test_concurrence_applies_effect_and_adjourns() {
        let mut world = setup(vec![0.5]);
        let motion = open_session(&mut world, MotionEffect::ExpandRacket);
        assert!(world.resource::<CouncilSession>().motion(&motion).unwrap().majority());

        let outcome = cast_vote(&mut world, &motion, true).unwrap();
        assert!(outcome.passed);
        assert!(outcome.adjourned);
        let ledger = world.resource::<Ledger>();
        assert_eq!(ledger.reputation(), 35);
        assert_eq!(ledger.influence(), 35);
        assert_eq!(world.resource::<GameClock>().scene, Scene::District);
    }

    #[test]
    fn test_veto_never_applies_effect() {
        let mut world = setup(vec![0.5]);
        let motion = open_session(&mut world, MotionEffect::ExpandRacket);

        let outcome = cast_vote(&mut world, &motion, false).unwrap();
        assert!(outcome.vetoed);
        assert!(!outcome.passed);
        let ledger = world.resource::<Ledger>();
        assert_eq!(ledger.reputation(), 30);
        assert_eq!(ledger.heat(), 10);
        assert_eq!(ledger.influence(), 20);

        let wah = officer_by_id(&world, "officer_001").unwrap();
        assert_eq!(wah.loyalty, 75);
        assert_eq!(wah.leader_grudges.len(), 1);
        // voted against the majority, keeps their loyalty
        assert_eq!(officer_by_id(&world, "officer_003").unwrap().loyalty, 20);
    }

    #[test]
    fn test_forced_vote_spares_grudge() {
        let mut world = setup(vec![0.5]);
        let motion = open_session(&mut world, MotionEffect::ExpandRacket);
        force_vote(&mut world, &motion, "officer_002", true).unwrap();
        assert_eq!(world.resource::<Ledger>().influence(), 15);

        cast_vote(&mut world, &motion, false).unwrap();
        assert_eq!(officer_by_id(&world, "officer_002").unwrap().loyalty, 70);
        assert_eq!(officer_by_id(&world, "officer_001").unwrap().loyalty, 75);
    }

    #[test]
    fn test_unpaid_profit_share_grants_nothing() {
        let mut world = setup(vec![0.5]);
        world.resource_mut::<Ledger>().add_cash(-4_400);
        let motion = open_session(&mut world, MotionEffect::ShareProfits);
        assert!(world.resource::<CouncilSession>().motion(&motion).unwrap().majority());

        let outcome = cast_vote(&mut world, &motion, true).unwrap();
        assert!(!outcome.vetoed);
        assert!(!outcome.passed);
        assert!(outcome.adjourned);
        assert_eq!(world.resource::<Ledger>().cash(), 600);
        assert_eq!(officer_by_id(&world, "officer_001").unwrap().loyalty, 80);
        assert_eq!(officer_by_id(&world, "officer_005").unwrap().loyalty, 95);
    }

    #[test]
    fn test_payout_needs_the_full_amount() {
        let mut world = setup(vec![0.5]);
        world.resource_mut::<Ledger>().add_cash(-4_900);

        let err = MotionEffect::RaiseStipend.apply(&mut world).unwrap_err();
        assert!(matches!(err, CommandError::InsufficientResources { .. }));
        assert_eq!(world.resource::<Ledger>().cash(), 100);

        world.resource_mut::<Ledger>().add_cash(400);
        MotionEffect::RaiseStipend.apply(&mut world).unwrap();
        assert_eq!(world.resource::<Ledger>().cash(), 0);
    }

    #[test]
    fn test_vote_rejections() {
        let mut world = setup(vec![0.5]);
        assert_eq!(
            cast_vote(&mut world, "motion_001", true),
            Err(CommandError::NoCouncilSession)
        );
        let motion = open_session(&mut world, MotionEffect::Crackdown);
        assert_eq!(
            force_vote(&mut world, &motion, "officer_005", true),
            Err(CommandError::NotCouncilMember("officer_005".into()))
        );
        assert_eq!(
            cast_vote(&mut world, "motion_999", true),
            Err(CommandError::MotionNotFound("motion_999".into()))
        );
        world.resource_mut::<Ledger>().adjust_influence(-100);
        let majority = world.resource::<CouncilSession>().motion(&motion).unwrap().majority();
        let err = cast_vote(&mut world, &motion, !majority).unwrap_err();
        assert!(matches!(err, CommandError::InsufficientResources { .. }));
        assert!(!world.resource::<CouncilSession>().motion(&motion).unwrap().resolved);
    }
}
