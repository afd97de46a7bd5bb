//! Player Commands
//!
//! Every action the player can take, as plain functions over the world and
//! as a serializable `PlayerCommand` for presentation layers. A rejected
//! command leaves the world untouched.

pub mod diplomacy;
pub mod roster;
pub mod territory;

pub use diplomacy::{DiplomacyAction, DiplomacyOutcome, PendingProposal, Proposal};
pub use roster::*;
pub use territory::*;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::EventId;

use crate::components::{BuildingType, Rank};
use crate::error::CommandError;
use crate::events::{self, Resolution};
use crate::systems::council::{self, VoteOutcome};
use crate::systems::phase::{self, PhaseChange};
use crate::systems::relationship::{
    self, LeaderInteraction, LeaderOutcome, PeerInteraction, PeerOutcome,
};

/// A player action in wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    AdvancePhase,
    SetSpeed {
        speed: u8,
    },
    SetPaused {
        paused: bool,
    },
    AssignOfficer {
        officer_id: String,
        building_id: String,
    },
    UnassignOfficer {
        officer_id: String,
    },
    ResolveEvent {
        event_id: EventId,
        choice_id: String,
    },
    DismissEvent {
        event_id: EventId,
    },
    CastVote {
        motion_id: String,
        approve: bool,
    },
    ForceVote {
        motion_id: String,
        officer_id: String,
        approve: bool,
    },
    Interact {
        officer_id: String,
        interaction: LeaderInteraction,
    },
    PeerInteract {
        initiator: String,
        target: String,
        interaction: PeerInteraction,
    },
    AcquireBuilding {
        building_type: BuildingType,
    },
    UpgradeBuilding {
        building_id: String,
    },
    RecruitSoldier,
    RecruitOfficer,
    ProposeDiplomacy {
        rival_id: String,
        action: DiplomacyAction,
    },
    ConfirmDiplomacy,
    CancelDiplomacy,
    HealOfficer {
        officer_id: String,
    },
    ReleaseOfficer {
        officer_id: String,
    },
    PromoteOfficer {
        officer_id: String,
    },
    DesignateSuccessor {
        officer_id: String,
    },
    ExileOfficer {
        officer_id: String,
    },
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    Phase { change: PhaseChange },
    Speed { speed: u8 },
    Resolved { resolution: Resolution },
    Vote { outcome: VoteOutcome },
    Leader { outcome: LeaderOutcome },
    Peer { outcome: PeerOutcome },
    Created { id: String },
    Unassigned { building_id: String },
    Promoted { rank: Rank },
    Proposed { proposal: Proposal },
    Diplomacy { outcome: DiplomacyOutcome },
    Cancelled { proposal: Proposal },
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::AdvancePhase => "advance_phase",
            PlayerCommand::SetSpeed { .. } => "set_speed",
            PlayerCommand::SetPaused { .. } => "set_paused",
            PlayerCommand::AssignOfficer { .. } => "assign_officer",
            PlayerCommand::UnassignOfficer { .. } => "unassign_officer",
            PlayerCommand::ResolveEvent { .. } => "resolve_event",
            PlayerCommand::DismissEvent { .. } => "dismiss_event",
            PlayerCommand::CastVote { .. } => "cast_vote",
            PlayerCommand::ForceVote { .. } => "force_vote",
            PlayerCommand::Interact { .. } => "interact",
            PlayerCommand::PeerInteract { .. } => "peer_interact",
            PlayerCommand::AcquireBuilding { .. } => "acquire_building",
            PlayerCommand::UpgradeBuilding { .. } => "upgrade_building",
            PlayerCommand::RecruitSoldier => "recruit_soldier",
            PlayerCommand::RecruitOfficer => "recruit_officer",
            PlayerCommand::ProposeDiplomacy { .. } => "propose_diplomacy",
            PlayerCommand::ConfirmDiplomacy => "confirm_diplomacy",
            PlayerCommand::CancelDiplomacy => "cancel_diplomacy",
            PlayerCommand::HealOfficer { .. } => "heal_officer",
            PlayerCommand::ReleaseOfficer { .. } => "release_officer",
            PlayerCommand::PromoteOfficer { .. } => "promote_officer",
            PlayerCommand::DesignateSuccessor { .. } => "designate_successor",
            PlayerCommand::ExileOfficer { .. } => "exile_officer",
        }
    }
}

/// Apply one player command.
pub fn execute(world: &mut World, command: PlayerCommand) -> Result<CommandOutcome, CommandError> {
    let name = command.name();
    let result = dispatch(world, command);
    if let Err(e) = &result {
        tracing::debug!(command = name, "Command rejected: {}", e);
    }
    result
}

fn dispatch(world: &mut World, command: PlayerCommand) -> Result<CommandOutcome, CommandError> {
    use CommandOutcome as Out;

    Ok(match command {
        PlayerCommand::AdvancePhase => Out::Phase {
            change: phase::advance_phase(world)?,
        },
        PlayerCommand::SetSpeed { speed } => Out::Speed {
            speed: phase::set_speed(world, speed),
        },
        PlayerCommand::SetPaused { paused } => {
            phase::set_paused(world, paused);
            Out::Done
        }
        PlayerCommand::AssignOfficer {
            officer_id,
            building_id,
        } => {
            assign_officer(world, &officer_id, &building_id)?;
            Out::Done
        }
        PlayerCommand::UnassignOfficer { officer_id } => Out::Unassigned {
            building_id: unassign_officer(world, &officer_id)?,
        },
        PlayerCommand::ResolveEvent {
            event_id,
            choice_id,
        } => Out::Resolved {
            resolution: events::resolve(world, event_id, &choice_id)?,
        },
        PlayerCommand::DismissEvent { event_id } => {
            events::dismiss(world, event_id)?;
            Out::Done
        }
        PlayerCommand::CastVote { motion_id, approve } => Out::Vote {
            outcome: council::cast_vote(world, &motion_id, approve)?,
        },
        PlayerCommand::ForceVote {
            motion_id,
            officer_id,
            approve,
        } => {
            council::force_vote(world, &motion_id, &officer_id, approve)?;
            Out::Done
        }
        PlayerCommand::Interact {
            officer_id,
            interaction,
        } => Out::Leader {
            outcome: relationship::leader_interact(world, &officer_id, interaction)?,
        },
        PlayerCommand::PeerInteract {
            initiator,
            target,
            interaction,
        } => Out::Peer {
            outcome: relationship::peer_interact(world, &initiator, &target, interaction)?,
        },
        PlayerCommand::AcquireBuilding { building_type } => Out::Created {
            id: acquire_building(world, building_type)?,
        },
        PlayerCommand::UpgradeBuilding { building_id } => {
            upgrade_building(world, &building_id)?;
            Out::Done
        }
        PlayerCommand::RecruitSoldier => Out::Created {
            id: recruit_soldier(world)?,
        },
        PlayerCommand::RecruitOfficer => Out::Created {
            id: recruit_officer(world)?,
        },
        PlayerCommand::ProposeDiplomacy { rival_id, action } => Out::Proposed {
            proposal: diplomacy::propose(world, &rival_id, action)?,
        },
        PlayerCommand::ConfirmDiplomacy => Out::Diplomacy {
            outcome: diplomacy::confirm(world)?,
        },
        PlayerCommand::CancelDiplomacy => Out::Cancelled {
            proposal: diplomacy::cancel(world)?,
        },
        PlayerCommand::HealOfficer { officer_id } => {
            heal_officer(world, &officer_id)?;
            Out::Done
        }
        PlayerCommand::ReleaseOfficer { officer_id } => {
            release_officer(world, &officer_id)?;
            Out::Done
        }
        PlayerCommand::PromoteOfficer { officer_id } => Out::Promoted {
            rank: promote_officer(world, &officer_id)?,
        },
        PlayerCommand::DesignateSuccessor { officer_id } => {
            designate_successor(world, &officer_id)?;
            Out::Done
        }
        PlayerCommand::ExileOfficer { officer_id } => {
            exile_officer(world, &officer_id)?;
            Out::Done
        }
    })
}
