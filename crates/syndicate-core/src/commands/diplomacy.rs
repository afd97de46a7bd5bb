//! Diplomacy Commands
//!
//! Proposals to rival organizations go through two steps. `propose` prices the
//! deal and estimates the odds; `confirm` pays and rolls; `cancel` walks away.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::EntryCategory;

use crate::chronicle;
use crate::components::{all_officers, Cost, Ledger, RivalFaction, RivalRegistry};
use crate::error::CommandError;
use crate::rng::SimRng;

/// Diplomatic prices and odds
pub mod diplomacy_constants {
    pub const TRADE_CASH: i64 = 500;
    pub const TRADE_INFLUENCE: i32 = 5;
    /// Rivals colder than this will not trade
    pub const TRADE_MIN_RELATIONSHIP: i32 = -20;
    pub const TRADE_BASE_ACCEPTANCE: f64 = 0.5;

    pub const ALLIANCE_CASH: i64 = 2_000;
    pub const ALLIANCE_INFLUENCE: i32 = 15;
    pub const ALLIANCE_MIN_RELATIONSHIP: i32 = 30;
    pub const ALLIANCE_BASE_ACCEPTANCE: f64 = 0.35;

    /// Intel needed to pick targets for a turf war
    pub const TURF_WAR_INTEL: i32 = 10;
    pub const TURF_WAR_RELATIONSHIP: i32 = -40;
    pub const TURF_WAR_REPUTATION: i32 = 5;
    pub const TURF_WAR_HEAT: i32 = 5;

    pub const ACCEPTED_RELATIONSHIP: i32 = 10;
    pub const REJECTED_RELATIONSHIP: i32 = -5;
    pub const MIN_ACCEPTANCE: f64 = 0.05;
    pub const MAX_ACCEPTANCE: f64 = 0.95;
}

use diplomacy_constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomacyAction {
    Trade,
    Alliance,
    TurfWar,
}

impl DiplomacyAction {
    pub fn label(&self) -> &'static str {
        match self {
            DiplomacyAction::Trade => "trade agreement",
            DiplomacyAction::Alliance => "alliance",
            DiplomacyAction::TurfWar => "turf war",
        }
    }

    pub fn cost(&self) -> Cost {
        match self {
            DiplomacyAction::Trade => Cost::cash(TRADE_CASH).with_influence(TRADE_INFLUENCE),
            DiplomacyAction::Alliance => {
                Cost::cash(ALLIANCE_CASH).with_influence(ALLIANCE_INFLUENCE)
            }
            DiplomacyAction::TurfWar => Cost::free().with_intel(TURF_WAR_INTEL),
        }
    }
}

/// A priced deal waiting for confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub rival_id: String,
    pub action: DiplomacyAction,
    pub cost: Cost,
    /// Chance the rival agrees, 0-1
    pub acceptance: f64,
}

/// Resource: the proposal awaiting confirm or cancel
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingProposal(pub Option<Proposal>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyOutcome {
    pub proposal: Proposal,
    pub accepted: bool,
}

fn check_eligible(rival: &RivalFaction, action: DiplomacyAction) -> Result<(), CommandError> {
    let refuse = |reason: &str| Err(CommandError::NotEligible(format!("{}: {}", rival.name, reason)));
    match action {
        DiplomacyAction::Trade => {
            if rival.trade_agreement {
                return refuse("already trading");
            }
            if rival.active_conflict {
                return refuse("at war");
            }
            if rival.relationship < TRADE_MIN_RELATIONSHIP {
                return refuse("relations too cold to trade");
            }
        }
        DiplomacyAction::Alliance => {
            if rival.alliance {
                return refuse("already allied");
            }
            if !rival.trade_agreement {
                return refuse("no trade agreement yet");
            }
            if rival.relationship < ALLIANCE_MIN_RELATIONSHIP {
                return refuse("not trusted enough for an alliance");
            }
        }
        DiplomacyAction::TurfWar => {
            if rival.active_conflict {
                return refuse("already at war");
            }
        }
    }
    Ok(())
}

/// Odds a rival accepts, from relations and the best diplomat available.
pub fn acceptance_chance(rival: &RivalFaction, action: DiplomacyAction, diplomacy: u32) -> f64 {
    let base = match action {
        DiplomacyAction::Trade => TRADE_BASE_ACCEPTANCE,
        DiplomacyAction::Alliance => ALLIANCE_BASE_ACCEPTANCE,
        DiplomacyAction::TurfWar => return 1.0,
    };
    (base + rival.relationship as f64 / 200.0 + diplomacy as f64 / 200.0)
        .clamp(MIN_ACCEPTANCE, MAX_ACCEPTANCE)
}

/// Price a deal with a rival and hold it for confirmation. Replaces any
/// earlier proposal.
pub fn propose(
    world: &mut World,
    rival_id: &str,
    action: DiplomacyAction,
) -> Result<Proposal, CommandError> {
    let rival = world
        .resource::<RivalRegistry>()
        .get(rival_id)
        .cloned()
        .ok_or_else(|| CommandError::RivalNotFound(rival_id.to_string()))?;
    check_eligible(&rival, action)?;

    let diplomacy = all_officers(world)
        .iter()
        .filter(|o| o.is_available())
        .map(|o| o.skills.diplomacy)
        .max()
        .unwrap_or(0);
    let proposal = Proposal {
        rival_id: rival_id.to_string(),
        action,
        cost: action.cost(),
        acceptance: acceptance_chance(&rival, action, diplomacy),
    };
    tracing::debug!(
        rival = rival_id,
        action = action.label(),
        acceptance = proposal.acceptance,
        "Diplomatic proposal drafted"
    );
    world.resource_mut::<PendingProposal>().0 = Some(proposal.clone());
    Ok(proposal)
}

/// Pay for the pending proposal and learn the rival's answer.
pub fn confirm(world: &mut World) -> Result<DiplomacyOutcome, CommandError> {
    let proposal = world
        .resource::<PendingProposal>()
        .0
        .clone()
        .ok_or(CommandError::NoPendingProposal)?;
    let rival = world
        .resource::<RivalRegistry>()
        .get(&proposal.rival_id)
        .cloned()
        .ok_or_else(|| CommandError::RivalNotFound(proposal.rival_id.clone()))?;
    check_eligible(&rival, proposal.action)?;
    world.resource_mut::<Ledger>().try_spend(&proposal.cost)?;
    world.resource_mut::<PendingProposal>().0 = None;

    let accepted = world.resource_mut::<SimRng>().chance(proposal.acceptance);
    {
        let mut rivals = world.resource_mut::<RivalRegistry>();
        if let Some(rival) = rivals.get_mut(&proposal.rival_id) {
            match (proposal.action, accepted) {
                (DiplomacyAction::TurfWar, _) => {
                    rival.declare_war();
                    rival.adjust_relationship(TURF_WAR_RELATIONSHIP);
                }
                (DiplomacyAction::Trade, true) => {
                    rival.trade_agreement = true;
                    rival.adjust_relationship(ACCEPTED_RELATIONSHIP);
                }
                (DiplomacyAction::Alliance, true) => {
                    rival.alliance = true;
                    rival.adjust_relationship(ACCEPTED_RELATIONSHIP);
                }
                (_, false) => rival.adjust_relationship(REJECTED_RELATIONSHIP),
            }
        }
    }
    if proposal.action == DiplomacyAction::TurfWar {
        let mut ledger = world.resource_mut::<Ledger>();
        ledger.adjust_reputation(TURF_WAR_REPUTATION);
        ledger.adjust_heat(TURF_WAR_HEAT);
    }

    let summary = match (proposal.action, accepted) {
        (DiplomacyAction::TurfWar, _) => format!("War declared on {}", rival.name),
        (action, true) => format!("{} agreed to a {}", rival.name, action.label()),
        (action, false) => format!("{} turned down a {}", rival.name, action.label()),
    };
    tracing::info!(rival = %rival.id, accepted, "{}", summary);
    let subject = rival.id.clone();
    chronicle::record(world, EntryCategory::Diplomacy, summary, |e| {
        e.with_subject(subject)
    });

    Ok(DiplomacyOutcome { proposal, accepted })
}

/// Drop the pending proposal without paying.
pub fn cancel(world: &mut World) -> Result<Proposal, CommandError> {
    world
        .resource_mut::<PendingProposal>()
        .0
        .take()
        .ok_or(CommandError::NoPendingProposal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Officer, Rank, Skills};
    use crate::rng::ScriptedRolls;

    fn setup(roll: f64) -> World {
        let mut world = World::new();
        world.insert_resource(Ledger::new(10_000, 30, 10, 20, 20));
        world.insert_resource(PendingProposal::default());
        world.insert_resource(SimRng::new(ScriptedRolls::constant(roll)));
        let mut rivals = RivalRegistry::new();
        rivals.register(RivalFaction::new("rival_001", "Iron Lotus", 45).with_relationship(20));
        rivals.register(
            RivalFaction::new("rival_002", "Jade Serpent Society", 60).with_relationship(-50),
        );
        world.insert_resource(rivals);
        world.spawn(
            Officer::new("officer_003", "Mei Ling", Rank::WhitePaperFan)
                .with_skills(Skills::new(25, 70, 45)),
        );
        world
    }

    #[test]
    fn test_acceptance_uses_relations_and_diplomat() {
        let mut world = setup(0.0);
        let proposal = propose(&mut world, "rival_001", DiplomacyAction::Trade).unwrap();
        assert!((proposal.acceptance - 0.95).abs() < 1e-9);
        assert_eq!(proposal.cost, Cost::cash(500).with_influence(5));
    }

    #[test]
    fn test_trade_accepted() {
        let mut world = setup(0.1);
        propose(&mut world, "rival_001", DiplomacyAction::Trade).unwrap();
        let outcome = confirm(&mut world).unwrap();
        assert!(outcome.accepted);
        let rivals = world.resource::<RivalRegistry>();
        let rival = rivals.get("rival_001").unwrap();
        assert!(rival.trade_agreement);
        assert_eq!(rival.relationship, 30);
        assert_eq!(world.resource::<Ledger>().cash(), 9_500);
        assert!(world.resource::<PendingProposal>().0.is_none());
    }

    #[test]
    fn test_cold_rival_refuses_to_trade() {
        let mut world = setup(0.0);
        assert!(matches!(
            propose(&mut world, "rival_002", DiplomacyAction::Trade),
            Err(CommandError::NotEligible(_))
        ));
        assert_eq!(
            propose(&mut world, "rival_404", DiplomacyAction::Trade),
            Err(CommandError::RivalNotFound("rival_404".into()))
        );
    }

    #[test]
    fn test_alliance_requires_trade_first() {
        let mut world = setup(0.0);
        assert!(matches!(
            propose(&mut world, "rival_001", DiplomacyAction::Alliance),
            Err(CommandError::NotEligible(_))
        ));
    }

    #[test]
    fn test_turf_war_always_lands() {
        let mut world = setup(0.99);
        propose(&mut world, "rival_002", DiplomacyAction::TurfWar).unwrap();
        let outcome = confirm(&mut world).unwrap();
        assert!(outcome.accepted);
        let rival = world.resource::<RivalRegistry>().get("rival_002").cloned().unwrap();
        assert!(rival.active_conflict);
        assert_eq!(rival.relationship, -90);
        let ledger = world.resource::<Ledger>();
        assert_eq!(ledger.intel(), 10);
        assert_eq!(ledger.reputation(), 35);
    }

    #[test]
    fn test_unaffordable_confirm_keeps_proposal() {
        let mut world = setup(0.0);
        world.insert_resource(Ledger::new(100, 30, 10, 20, 20));
        propose(&mut world, "rival_001", DiplomacyAction::Trade).unwrap();
        assert!(matches!(
            confirm(&mut world),
            Err(CommandError::InsufficientResources { .. })
        ));
        assert!(world.resource::<PendingProposal>().0.is_some());
        assert!(!world.resource::<RivalRegistry>().get("rival_001").unwrap().trade_agreement);
    }

    #[test]
    fn test_cancel() {
        let mut world = setup(0.0);
        assert_eq!(cancel(&mut world), Err(CommandError::NoPendingProposal));
        propose(&mut world, "rival_001", DiplomacyAction::Trade).unwrap();
        assert_eq!(cancel(&mut world).unwrap().rival_id, "rival_001");
        assert_eq!(confirm(&mut world), Err(CommandError::NoPendingProposal));
    }
}
