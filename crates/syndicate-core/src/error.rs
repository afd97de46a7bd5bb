//! Command rejections.
//!
//! Every command either applies completely or returns one of these and leaves
//! the engine untouched.

use syndicate_events::EventId;
use thiserror::Error;

/// Why a command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("not enough {resource}: need {required}, have {available}")]
    InsufficientResources {
        resource: &'static str,
        required: i64,
        available: i64,
    },
    #[error("officer not found: {0}")]
    OfficerNotFound(String),
    #[error("building not found: {0}")]
    BuildingNotFound(String),
    #[error("rival not found: {0}")]
    RivalNotFound(String),
    #[error("officer {0} is wounded, arrested or has turned traitor")]
    OfficerUnavailable(String),
    #[error("officer {0} already holds a post")]
    OfficerAlreadyAssigned(String),
    #[error("officer {0} holds no post")]
    OfficerNotAssigned(String),
    #[error("building {0} is already occupied")]
    BuildingOccupied(String),
    #[error("building {0} cannot be staffed right now")]
    BuildingUnavailable(String),
    #[error("officer {0} has already been seen today")]
    AlreadyInteractedToday(String),
    #[error("officer {0} is too tired")]
    OfficerExhausted(String),
    #[error("a blocking event must be resolved first")]
    BlockedByEvent,
    #[error("the council is in session")]
    CouncilInSession,
    #[error("event {0} is not the active event")]
    EventNotActive(EventId),
    #[error("event has no choice named {0}")]
    UnknownChoice(String),
    #[error("requirements not met for choice {0}")]
    RequirementsNotMet(String),
    #[error("this event must be resolved with a choice")]
    ChoiceRequired,
    #[error("no council is in session")]
    NoCouncilSession,
    #[error("motion not found: {0}")]
    MotionNotFound(String),
    #[error("motion {0} has already been decided")]
    MotionResolved(String),
    #[error("officer {0} does not sit on the council")]
    NotCouncilMember(String),
    #[error("no diplomatic proposal is pending")]
    NoPendingProposal,
    #[error("{0}")]
    NotEligible(String),
}
