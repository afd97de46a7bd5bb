//! Engine
//!
//! Owns the ECS world and exposes the query and command surfaces. All state
//! changes go through `&mut Engine`.

use bevy_ecs::prelude::*;
use syndicate_events::{
    BuildingSnapshot, ChronicleEntry, CriticalNeed, EngineSnapshot, EventId, EventSummary,
    LedgerSnapshot, OfficerSnapshot, RelationshipSnapshot, RivalSnapshot, SoldierSummary,
};

use crate::chronicle::{Chronicle, ChronicleWriter};
use crate::commands::{self, CommandOutcome, DiplomacyAction, DiplomacyOutcome, PlayerCommand, Proposal};
use crate::components::{
    all_officers, officer_by_id, BuildingRegistry, BuildingType, GameClock, Ledger, Rank,
    RivalRegistry,
};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::events::{self, Resolution};
use crate::output::{self, ActiveEventView};
use crate::rng::{RandomSource, SeededRolls, SimRng};
use crate::setup::{init_resources, populate_district};
use crate::systems::council::{self, CouncilSession, VoteOutcome};
use crate::systems::phase::{self, PhaseChange, TickOutcome};
use crate::systems::relationship::{
    self, LeaderInteraction, LeaderOutcome, PeerInteraction, PeerOutcome,
};

/// The simulation: one world, one writer.
pub struct Engine {
    world: World,
}

impl Engine {
    /// A new game in the starting district.
    pub fn new(config: EngineConfig, source: impl RandomSource + 'static) -> Self {
        let mut engine = Self::empty(config, source);
        populate_district(&mut engine.world);
        engine
    }

    /// A new game rolling from a seeded `SmallRng`.
    pub fn seeded(config: EngineConfig, seed: u64) -> Self {
        Self::new(config, SeededRolls::new(seed))
    }

    /// All resources in place but no officers, buildings or rivals.
    pub fn empty(config: EngineConfig, source: impl RandomSource + 'static) -> Self {
        let mut world = World::new();
        init_resources(&mut world, config, SimRng::new(source));
        tracing::debug!("Engine initialized");
        Self { world }
    }

    /// Stream chronicle entries to `writer` from now on.
    pub fn with_chronicle_writer(mut self, writer: ChronicleWriter) -> Self {
        self.world.insert_resource(Chronicle::new(writer));
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // ---------------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------------

    pub fn advance_phase(&mut self) -> Result<PhaseChange, CommandError> {
        phase::advance_phase(&mut self.world)
    }

    pub fn tick(&mut self) -> TickOutcome {
        phase::tick(&mut self.world)
    }

    pub fn set_speed(&mut self, speed: u8) -> u8 {
        phase::set_speed(&mut self.world, speed)
    }

    pub fn pause(&mut self) {
        phase::set_paused(&mut self.world, true);
    }

    pub fn resume(&mut self) {
        phase::set_paused(&mut self.world, false);
    }

    /// Replace the clock from raw values, resetting anything unrecognized.
    pub fn restore_clock(&mut self, day: u32, phase: &str, scene: &str) {
        phase::restore_clock(&mut self.world, day, phase, scene);
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    pub fn execute(&mut self, command: PlayerCommand) -> Result<CommandOutcome, CommandError> {
        commands::execute(&mut self.world, command)
    }

    pub fn resolve_event(
        &mut self,
        event_id: EventId,
        choice_id: &str,
    ) -> Result<Resolution, CommandError> {
        events::resolve(&mut self.world, event_id, choice_id)
    }

    pub fn dismiss_event(&mut self, event_id: EventId) -> Result<(), CommandError> {
        events::dismiss(&mut self.world, event_id)
    }

    pub fn cast_vote(&mut self, motion_id: &str, approve: bool) -> Result<VoteOutcome, CommandError> {
        council::cast_vote(&mut self.world, motion_id, approve)
    }

    pub fn force_vote(
        &mut self,
        motion_id: &str,
        officer_id: &str,
        approve: bool,
    ) -> Result<(), CommandError> {
        council::force_vote(&mut self.world, motion_id, officer_id, approve)
    }

    pub fn interact(
        &mut self,
        officer_id: &str,
        interaction: LeaderInteraction,
    ) -> Result<LeaderOutcome, CommandError> {
        relationship::leader_interact(&mut self.world, officer_id, interaction)
    }

    pub fn peer_interact(
        &mut self,
        initiator: &str,
        target: &str,
        interaction: PeerInteraction,
    ) -> Result<PeerOutcome, CommandError> {
        relationship::peer_interact(&mut self.world, initiator, target, interaction)
    }

    pub fn assign_officer(&mut self, officer_id: &str, building_id: &str) -> Result<(), CommandError> {
        commands::assign_officer(&mut self.world, officer_id, building_id)
    }

    pub fn unassign_officer(&mut self, officer_id: &str) -> Result<String, CommandError> {
        commands::unassign_officer(&mut self.world, officer_id)
    }

    pub fn acquire_building(&mut self, building_type: BuildingType) -> Result<String, CommandError> {
        commands::acquire_building(&mut self.world, building_type)
    }

    pub fn upgrade_building(&mut self, building_id: &str) -> Result<(), CommandError> {
        commands::upgrade_building(&mut self.world, building_id)
    }

    pub fn recruit_soldier(&mut self) -> Result<String, CommandError> {
        commands::recruit_soldier(&mut self.world)
    }

    pub fn recruit_officer(&mut self) -> Result<String, CommandError> {
        commands::recruit_officer(&mut self.world)
    }

    pub fn propose_diplomacy(
        &mut self,
        rival_id: &str,
        action: DiplomacyAction,
    ) -> Result<Proposal, CommandError> {
        commands::diplomacy::propose(&mut self.world, rival_id, action)
    }

    pub fn confirm_diplomacy(&mut self) -> Result<DiplomacyOutcome, CommandError> {
        commands::diplomacy::confirm(&mut self.world)
    }

    pub fn cancel_diplomacy(&mut self) -> Result<Proposal, CommandError> {
        commands::diplomacy::cancel(&mut self.world)
    }

    pub fn heal_officer(&mut self, officer_id: &str) -> Result<(), CommandError> {
        commands::heal_officer(&mut self.world, officer_id)
    }

    pub fn release_officer(&mut self, officer_id: &str) -> Result<(), CommandError> {
        commands::release_officer(&mut self.world, officer_id)
    }

    pub fn promote_officer(&mut self, officer_id: &str) -> Result<Rank, CommandError> {
        commands::promote_officer(&mut self.world, officer_id)
    }

    pub fn designate_successor(&mut self, officer_id: &str) -> Result<(), CommandError> {
        commands::designate_successor(&mut self.world, officer_id)
    }

    pub fn exile_officer(&mut self, officer_id: &str) -> Result<(), CommandError> {
        commands::exile_officer(&mut self.world, officer_id)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn ledger(&self) -> LedgerSnapshot {
        self.world.resource::<Ledger>().snapshot()
    }

    pub fn clock(&self) -> &GameClock {
        self.world.resource::<GameClock>()
    }

    pub fn config(&self) -> &EngineConfig {
        self.world.resource::<EngineConfig>()
    }

    pub fn officers(&self) -> Vec<OfficerSnapshot> {
        all_officers(&self.world).iter().map(|o| o.snapshot()).collect()
    }

    pub fn officer(&self, officer_id: &str) -> Option<OfficerSnapshot> {
        officer_by_id(&self.world, officer_id).map(|o| o.snapshot())
    }

    pub fn buildings(&self) -> Vec<BuildingSnapshot> {
        self.world
            .resource::<BuildingRegistry>()
            .iter()
            .map(|b| b.snapshot())
            .collect()
    }

    pub fn soldiers(&self) -> SoldierSummary {
        output::soldier_summary(&self.world)
    }

    pub fn rivals(&self) -> Vec<RivalSnapshot> {
        self.world
            .resource::<RivalRegistry>()
            .iter()
            .map(|r| r.snapshot())
            .collect()
    }

    pub fn active_event(&self) -> Option<ActiveEventView> {
        output::active_event_view(&self.world)
    }

    pub fn pending_events(&self) -> Vec<EventSummary> {
        output::pending_events(&self.world)
    }

    pub fn council(&self) -> &CouncilSession {
        self.world.resource::<CouncilSession>()
    }

    pub fn relationships(&self, officer_id: &str) -> Vec<RelationshipSnapshot> {
        output::relationship_view(&self.world, officer_id)
    }

    pub fn critical_needs(&self) -> Vec<CriticalNeed> {
        output::critical_needs(&self.world)
    }

    pub fn chronicle(&self) -> &Chronicle {
        self.world.resource::<Chronicle>()
    }

    pub fn recent_chronicle(&self, n: usize) -> Vec<&ChronicleEntry> {
        self.chronicle().recent(n)
    }

    pub fn snapshot(&mut self) -> EngineSnapshot {
        output::generate_snapshot(&mut self.world)
    }

    pub fn flush_chronicle(&mut self) -> std::io::Result<()> {
        self.world.resource_mut::<Chronicle>().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;
    use syndicate_events::Phase;

    #[test]
    fn test_new_engine_starts_paused_on_day_one() {
        let engine = Engine::new(EngineConfig::default(), ScriptedRolls::constant(0.5));
        let clock = engine.clock();
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.phase(), Phase::Morning);
        assert!(clock.paused);
        assert_eq!(engine.officers().len(), 5);
        assert!(engine.active_event().is_none());
    }

    #[test]
    fn test_execute_routes_commands() {
        let mut engine = Engine::new(EngineConfig::default(), ScriptedRolls::constant(0.99));
        let outcome = engine
            .execute(PlayerCommand::AssignOfficer {
                officer_id: "officer_002".into(),
                building_id: "building_003".into(),
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Done);
        assert_eq!(
            engine.officer("officer_002").unwrap().assigned_building.as_deref(),
            Some("building_003")
        );

        let rejected = engine.execute(PlayerCommand::AssignOfficer {
            officer_id: "officer_003".into(),
            building_id: "building_003".into(),
        });
        assert_eq!(
            rejected,
            Err(CommandError::BuildingOccupied("building_003".into()))
        );
    }

    #[test]
    fn test_empty_engine_has_no_roster() {
        let engine = Engine::empty(EngineConfig::default(), ScriptedRolls::constant(0.5));
        assert!(engine.officers().is_empty());
        assert!(engine.buildings().is_empty());
        assert_eq!(engine.ledger().cash, 10_000);
    }
}
