//! Event Types
//!
//! Every narrative event the engine can raise, with the ids and amounts fixed
//! at generation time.

use serde::{Deserialize, Serialize};
use syndicate_events::{EventId, EventSummary, GameTime};

use crate::components::BuildingType;
use crate::systems::conflict::ConflictReport;

/// Which soldier need is driving unrest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grievance {
    Food,
    Entertainment,
    Pay,
}

impl Grievance {
    pub fn label(&self) -> &'static str {
        match self {
            Grievance::Food => "food",
            Grievance::Entertainment => "entertainment",
            Grievance::Pay => "pay",
        }
    }
}

/// What a rival envoy has come to offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvoyOffer {
    Trade,
    Alliance,
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    PoliceRaid {
        building_id: String,
        officer_id: Option<String>,
        bribe: i64,
    },
    PoliceShakedown {
        demand: i64,
    },
    RivalAttack {
        rival_id: String,
        building_id: Option<String>,
        officer_id: Option<String>,
        tribute: i64,
    },
    StreetWar {
        rival_id: String,
        officer_id: Option<String>,
    },
    OfficerBetrayal {
        officer_id: String,
        rival_id: String,
        bribe: i64,
    },
    CoupAttempt {
        officer_id: String,
        building_id: String,
        rebel_soldiers: u32,
        /// Loyal officer who leads the counterattack
        #[serde(default)]
        defender: Option<String>,
    },
    SoldierUnrest {
        grievance: Grievance,
        cost: i64,
    },
    BusinessOpportunity {
        building_type: BuildingType,
        price: i64,
    },
    InformantTip {
        rival_id: String,
        price: i64,
    },
    PromotionRequest {
        officer_id: String,
    },
    RomanceScandal {
        officer_id: String,
        partner_id: String,
    },
    OfficerFeud {
        officer_id: String,
        rival_officer_id: String,
    },
    RivalEnvoy {
        rival_id: String,
        offer: EnvoyOffer,
    },
    AssassinationAttempt {
        rival_id: String,
        officer_id: Option<String>,
    },
    PostConflictReport {
        report: ConflictReport,
    },
}

impl EventKind {
    /// Blocking events freeze the phase controller and cannot be dismissed.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            EventKind::PoliceRaid { .. }
                | EventKind::RivalAttack { .. }
                | EventKind::StreetWar { .. }
                | EventKind::OfficerBetrayal { .. }
                | EventKind::CoupAttempt { .. }
                | EventKind::AssassinationAttempt { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::PoliceRaid { .. } => "police_raid",
            EventKind::PoliceShakedown { .. } => "police_shakedown",
            EventKind::RivalAttack { .. } => "rival_attack",
            EventKind::StreetWar { .. } => "street_war",
            EventKind::OfficerBetrayal { .. } => "officer_betrayal",
            EventKind::CoupAttempt { .. } => "coup_attempt",
            EventKind::SoldierUnrest { .. } => "soldier_unrest",
            EventKind::BusinessOpportunity { .. } => "business_opportunity",
            EventKind::InformantTip { .. } => "informant_tip",
            EventKind::PromotionRequest { .. } => "promotion_request",
            EventKind::RomanceScandal { .. } => "romance_scandal",
            EventKind::OfficerFeud { .. } => "officer_feud",
            EventKind::RivalEnvoy { .. } => "rival_envoy",
            EventKind::AssassinationAttempt { .. } => "assassination_attempt",
            EventKind::PostConflictReport { .. } => "post_conflict_report",
        }
    }

    pub fn title(&self) -> String {
        match self {
            EventKind::PoliceRaid { building_id, .. } => format!("Police raid on {}", building_id),
            EventKind::PoliceShakedown { demand } => {
                format!("A sergeant wants {} to look the other way", demand)
            }
            EventKind::RivalAttack { rival_id, .. } => format!("{} hits our turf", rival_id),
            EventKind::StreetWar { rival_id, .. } => format!("Street war with {}", rival_id),
            EventKind::OfficerBetrayal { officer_id, .. } => {
                format!("{} has been taking meetings with the other side", officer_id)
            }
            EventKind::CoupAttempt { officer_id, building_id, .. } => {
                format!("{} has seized {} and broken away", officer_id, building_id)
            }
            EventKind::SoldierUnrest { grievance, .. } => {
                format!("The soldiers grumble about {}", grievance.label())
            }
            EventKind::BusinessOpportunity { building_type, .. } => {
                format!("A {} is up for sale", building_type.label())
            }
            EventKind::InformantTip { rival_id, .. } => {
                format!("An informant has word on {}", rival_id)
            }
            EventKind::PromotionRequest { officer_id } => {
                format!("{} asks for a promotion", officer_id)
            }
            EventKind::RomanceScandal { officer_id, partner_id } => {
                format!("Tongues wag about {} and {}", officer_id, partner_id)
            }
            EventKind::OfficerFeud { officer_id, rival_officer_id } => {
                format!("{} and {} are at each other's throats", officer_id, rival_officer_id)
            }
            EventKind::RivalEnvoy { rival_id, .. } => format!("An envoy from {}", rival_id),
            EventKind::AssassinationAttempt { rival_id, .. } => {
                format!("Assassins sent by {}", rival_id)
            }
            EventKind::PostConflictReport { report } => {
                if report.victory {
                    format!("Victory report: {}", report.kind.label())
                } else {
                    format!("Defeat report: {}", report.kind.label())
                }
            }
        }
    }

    /// The rival, officer or building the event is mainly about
    pub fn subject(&self) -> Option<String> {
        self.subjects().into_iter().next()
    }

    /// Same kind about the same subject
    pub fn same_situation(&self, other: &EventKind) -> bool {
        self.label() == other.label() && self.subject() == other.subject()
    }

    /// Officer, building and rival ids named by the payload
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects = Vec::new();
        let mut add = |id: &Option<String>| {
            if let Some(id) = id {
                subjects.push(id.clone());
            }
        };
        match self {
            EventKind::PoliceRaid { building_id, officer_id, .. } => {
                add(&Some(building_id.clone()));
                add(officer_id);
            }
            EventKind::RivalAttack { rival_id, building_id, officer_id, .. } => {
                add(&Some(rival_id.clone()));
                add(building_id);
                add(officer_id);
            }
            EventKind::StreetWar { rival_id, officer_id }
            | EventKind::AssassinationAttempt { rival_id, officer_id } => {
                add(&Some(rival_id.clone()));
                add(officer_id);
            }
            EventKind::OfficerBetrayal { officer_id, rival_id, .. } => {
                add(&Some(officer_id.clone()));
                add(&Some(rival_id.clone()));
            }
            EventKind::CoupAttempt { officer_id, building_id, defender, .. } => {
                add(&Some(officer_id.clone()));
                add(&Some(building_id.clone()));
                add(defender);
            }
            EventKind::InformantTip { rival_id, .. } | EventKind::RivalEnvoy { rival_id, .. } => {
                add(&Some(rival_id.clone()));
            }
            EventKind::PromotionRequest { officer_id } => add(&Some(officer_id.clone())),
            EventKind::RomanceScandal { officer_id, partner_id: other }
            | EventKind::OfficerFeud { officer_id, rival_officer_id: other } => {
                add(&Some(officer_id.clone()));
                add(&Some(other.clone()));
            }
            EventKind::PostConflictReport { report } => add(&report.key_officer),
            EventKind::PoliceShakedown { .. }
            | EventKind::SoldierUnrest { .. }
            | EventKind::BusinessOpportunity { .. } => {}
        }
        subjects
    }
}

/// A raised event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    pub raised_at: GameTime,
    pub kind: EventKind,
}

impl GameEvent {
    pub fn new(kind: EventKind, raised_at: GameTime) -> Self {
        Self {
            id: EventId::new(),
            raised_at,
            kind,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            event_id: self.id,
            kind: self.kind.label().to_string(),
            title: self.kind.title(),
            blocking: self.is_blocking(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_allow_list() {
        let blocking = EventKind::StreetWar {
            rival_id: "rival_001".into(),
            officer_id: None,
        };
        let informational = EventKind::PoliceShakedown { demand: 500 };
        assert!(blocking.is_blocking());
        assert!(!informational.is_blocking());
        assert!(!EventKind::PromotionRequest {
            officer_id: "officer_001".into()
        }
        .is_blocking());
    }

    #[test]
    fn test_payload_serialization_is_tagged() {
        let kind = EventKind::CoupAttempt {
            officer_id: "officer_004".into(),
            building_id: "building_002".into(),
            rebel_soldiers: 3,
            defender: Some("officer_002".into()),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"kind\":\"coup_attempt\""));
        let parsed: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn test_subjects() {
        let kind = EventKind::RivalAttack {
            rival_id: "rival_002".into(),
            building_id: Some("building_001".into()),
            officer_id: None,
            tribute: 800,
        };
        assert_eq!(kind.subjects(), vec!["rival_002", "building_001"]);
    }

    #[test]
    fn test_summary() {
        let event = GameEvent::new(
            EventKind::AssassinationAttempt {
                rival_id: "rival_003".into(),
                officer_id: None,
            },
            GameTime::start(),
        );
        let summary = event.summary();
        assert_eq!(summary.kind, "assassination_attempt");
        assert!(summary.blocking);
        assert_eq!(summary.event_id, event.id);
    }
}
