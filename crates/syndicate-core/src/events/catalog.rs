//! Event Catalog
//!
//! Choices and outcome tables for every event kind. Each choice has a
//! requirement and a list of outcomes whose probabilities sum to 100.

use serde::{Deserialize, Serialize};

use super::kinds::{EnvoyOffer, EventKind, Grievance};
use crate::components::{BuildingType, Cost, ResourceDelta};
use crate::config::EngineConfig;
use crate::systems::conflict::{ConflictKind, ConflictSpec, Opponent};

/// Side effects an outcome can carry besides its resource delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Conflict(ConflictSpec),
    OfficerLoyalty { officer_id: String, delta: i32 },
    OfficerFace { officer_id: String, delta: i32 },
    WoundOfficer { officer_id: String, days: u32 },
    /// The officer defects and abandons any post
    MarkTraitor { officer_id: String },
    /// The officer is removed from the organization
    RemoveOfficer { officer_id: String },
    /// A turned officer comes back into the fold
    Reconcile { officer_id: String, building_id: String },
    Promote { officer_id: String },
    /// Every officer's loyalty drops; the reason goes to the chronicle
    LoyaltyShock { reason: String },
    SoldierLoyalty(i32),
    SoldierNeeds { grievance: Grievance, delta: i32 },
    LoseSoldiers(u32),
    CloseBuilding { building_id: String, days: u32 },
    LoseBuilding { building_id: String },
    AcquireBuilding(BuildingType),
    RebelReinforcements { building_id: String, soldiers: u32 },
    RivalRelationship { rival_id: String, delta: i32 },
    RivalTension { rival_id: String, delta: i32 },
    RivalStrength { rival_id: String, delta: i32 },
    TradeAgreement { rival_id: String },
    Alliance { rival_id: String },
    Truce { rival_id: String },
    PairAffinity { a: String, b: String, delta: i32 },
    PairRomance { a: String, b: String, delta: i32 },
    Friction(i32),
}

/// One possible result of a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Percent chance, all outcomes of a choice sum to 100
    pub probability: u32,
    pub description: String,
    pub delta: ResourceDelta,
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub fn certain(description: impl Into<String>) -> Self {
        Self::with_chance(100, description)
    }

    pub fn with_chance(probability: u32, description: impl Into<String>) -> Self {
        Self {
            probability,
            description: description.into(),
            delta: ResourceDelta::none(),
            effects: Vec::new(),
        }
    }

    pub fn with_delta(mut self, delta: ResourceDelta) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A choice offered by an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChoice {
    pub id: String,
    pub label: String,
    pub requires: Cost,
    pub outcomes: Vec<Outcome>,
}

impl EventChoice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            requires: Cost::free(),
            outcomes: Vec::new(),
        }
    }

    pub fn requiring(mut self, cost: Cost) -> Self {
        self.requires = cost;
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    pub fn total_probability(&self) -> u32 {
        self.outcomes.iter().map(|o| o.probability).sum()
    }
}

/// Pick an outcome with a roll in `[0, 1)` by cumulative scan.
pub fn pick_outcome(roll: f64, outcomes: &[Outcome]) -> Option<&Outcome> {
    let target = roll * 100.0;
    let mut cumulative = 0.0;
    for outcome in outcomes {
        cumulative += outcome.probability as f64;
        if target < cumulative {
            return Some(outcome);
        }
    }
    outcomes.last()
}

fn fight(spec: ConflictSpec, label: &str) -> EventChoice {
    EventChoice::new("fight", label).outcome(
        Outcome::certain("Steel decides it").with_effect(Effect::Conflict(spec)),
    )
}

/// Build the choices for an event.
pub fn choices(kind: &EventKind, config: &EngineConfig) -> Vec<EventChoice> {
    match kind {
        EventKind::PoliceRaid {
            building_id,
            officer_id,
            bribe,
        } => vec![
            fight(
                ConflictSpec {
                    kind: ConflictKind::Raid,
                    opponent: Opponent::Police,
                    key_officer: officer_id.clone(),
                    stake_building: Some(building_id.clone()),
                },
                "Hold the door",
            ),
            EventChoice::new("bribe", "Pay off the captain")
                .requiring(Cost::cash(*bribe))
                .outcome(
                    Outcome::with_chance(80, "The captain pockets it and the vans drive on")
                        .with_delta(ResourceDelta::cash(-bribe).with_heat(-10)),
                )
                .outcome(
                    Outcome::with_chance(20, "The captain takes the money and raids anyway")
                        .with_delta(ResourceDelta::cash(-bribe).with_heat(5))
                        .with_effect(Effect::CloseBuilding {
                            building_id: building_id.clone(),
                            days: 2,
                        }),
                ),
            EventChoice::new("lie_low", "Shut the doors and wait it out").outcome(
                Outcome::certain("The place goes dark for a few days")
                    .with_delta(ResourceDelta::none().with_heat(-15).with_reputation(-3))
                    .with_effect(Effect::CloseBuilding {
                        building_id: building_id.clone(),
                        days: 3,
                    }),
            ),
        ],

        EventKind::PoliceShakedown { demand } => vec![
            EventChoice::new("pay", "Pay the sergeant")
                .requiring(Cost::cash(*demand))
                .outcome(
                    Outcome::certain("Money changes hands")
                        .with_delta(ResourceDelta::cash(-demand).with_heat(-5)),
                ),
            EventChoice::new("refuse", "Send the sergeant away")
                .outcome(
                    Outcome::with_chance(60, "The sergeant leaves muttering threats")
                        .with_delta(ResourceDelta::none().with_heat(10)),
                )
                .outcome(
                    Outcome::with_chance(40, "Word spreads that you don't pay cops")
                        .with_delta(ResourceDelta::none().with_heat(20).with_reputation(3)),
                ),
        ],

        EventKind::RivalAttack {
            rival_id,
            building_id,
            officer_id,
            tribute,
        } => {
            let mut choices = vec![
                fight(
                    ConflictSpec {
                        kind: ConflictKind::RivalAttack,
                        opponent: Opponent::Rival {
                            rival_id: rival_id.clone(),
                        },
                        key_officer: officer_id.clone(),
                        stake_building: building_id.clone(),
                    },
                    "Meet them in the street",
                ),
                EventChoice::new("tribute", "Pay them to go away")
                    .requiring(Cost::cash(*tribute))
                    .outcome(
                        Outcome::certain("They take the envelope and leave")
                            .with_delta(ResourceDelta::cash(-tribute).with_reputation(-5))
                            .with_effect(Effect::RivalTension {
                                rival_id: rival_id.clone(),
                                delta: -20,
                            })
                            .with_effect(Effect::RivalRelationship {
                                rival_id: rival_id.clone(),
                                delta: 5,
                            }),
                    ),
            ];
            if let Some(building_id) = building_id {
                choices.push(
                    EventChoice::new("fall_back", "Abandon the building for now").outcome(
                        Outcome::certain("They trash the place")
                            .with_delta(ResourceDelta::none().with_reputation(-8))
                            .with_effect(Effect::CloseBuilding {
                                building_id: building_id.clone(),
                                days: 3,
                            })
                            .with_effect(Effect::SoldierLoyalty(-5)),
                    ),
                );
            }
            choices
        }

        EventKind::StreetWar {
            rival_id,
            officer_id,
        } => vec![
            fight(
                ConflictSpec {
                    kind: ConflictKind::StreetWar,
                    opponent: Opponent::Rival {
                        rival_id: rival_id.clone(),
                    },
                    key_officer: officer_id.clone(),
                    stake_building: None,
                },
                "Go all in",
            ),
            EventChoice::new("sue_for_peace", "Send a white paper fan to talk")
                .requiring(Cost::influence(10))
                .outcome(
                    Outcome::with_chance(70, "They agree to a truce")
                        .with_delta(ResourceDelta::none().with_influence(-10).with_reputation(-5))
                        .with_effect(Effect::Truce {
                            rival_id: rival_id.clone(),
                        }),
                )
                .outcome(
                    Outcome::with_chance(30, "Your envoy comes back with a split lip")
                        .with_delta(ResourceDelta::none().with_influence(-10))
                        .with_effect(Effect::RivalTension {
                            rival_id: rival_id.clone(),
                            delta: 10,
                        }),
                ),
        ],

        EventKind::OfficerBetrayal {
            officer_id,
            rival_id,
            bribe,
        } => vec![
            EventChoice::new("confront", "Confront them")
                .outcome(
                    Outcome::with_chance(60, "They break down and swear loyalty")
                        .with_effect(Effect::OfficerLoyalty {
                            officer_id: officer_id.clone(),
                            delta: 15,
                        })
                        .with_effect(Effect::OfficerFace {
                            officer_id: officer_id.clone(),
                            delta: -10,
                        }),
                )
                .outcome(
                    Outcome::with_chance(40, "They walk out and never come back")
                        .with_delta(ResourceDelta::none().with_reputation(-5))
                        .with_effect(Effect::MarkTraitor {
                            officer_id: officer_id.clone(),
                        })
                        .with_effect(Effect::RivalStrength {
                            rival_id: rival_id.clone(),
                            delta: 5,
                        }),
                ),
            EventChoice::new("match_offer", "Match the offer")
                .requiring(Cost::cash(*bribe))
                .outcome(
                    Outcome::certain("Money buys loyalty, for now")
                        .with_delta(ResourceDelta::cash(-bribe))
                        .with_effect(Effect::OfficerLoyalty {
                            officer_id: officer_id.clone(),
                            delta: 25,
                        }),
                ),
            EventChoice::new("execute", "Make an example of them").outcome(
                Outcome::certain("The body is found in the harbor")
                    .with_delta(ResourceDelta::none().with_heat(5).with_reputation(5))
                    .with_effect(Effect::RemoveOfficer {
                        officer_id: officer_id.clone(),
                    })
                    .with_effect(Effect::LoyaltyShock {
                        reason: format!("{} was executed as a traitor", officer_id),
                    }),
            ),
        ],

        EventKind::CoupAttempt {
            officer_id,
            building_id,
            defender,
            ..
        } => vec![
            fight(
                ConflictSpec {
                    kind: ConflictKind::Coup,
                    opponent: Opponent::Rebels {
                        building_id: building_id.clone(),
                        officer_id: officer_id.clone(),
                    },
                    key_officer: defender.clone(),
                    stake_building: Some(building_id.clone()),
                },
                "Crush the rebellion",
            ),
            EventChoice::new("negotiate", "Offer terms")
                .requiring(Cost::influence(15))
                .outcome(
                    Outcome::with_chance(50, "The rebels come home")
                        .with_delta(ResourceDelta::none().with_influence(-15))
                        .with_effect(Effect::Reconcile {
                            officer_id: officer_id.clone(),
                            building_id: building_id.clone(),
                        }),
                )
                .outcome(
                    Outcome::with_chance(50, "Talks collapse and more soldiers defect")
                        .with_delta(ResourceDelta::none().with_influence(-15))
                        .with_effect(Effect::RebelReinforcements {
                            building_id: building_id.clone(),
                            soldiers: 2,
                        }),
                ),
            EventChoice::new("let_go", "Let them go").outcome(
                Outcome::certain("The building and the rebels are gone")
                    .with_delta(ResourceDelta::none().with_reputation(-10))
                    .with_effect(Effect::LoseBuilding {
                        building_id: building_id.clone(),
                    })
                    .with_effect(Effect::RemoveOfficer {
                        officer_id: officer_id.clone(),
                    })
                    .with_effect(Effect::Friction(-100)),
            ),
        ],

        EventKind::SoldierUnrest { grievance, cost } => vec![
            EventChoice::new("address", format!("Fix the {} problem", grievance.label()))
                .requiring(Cost::cash(*cost))
                .outcome(
                    Outcome::certain("The grumbling stops")
                        .with_delta(ResourceDelta::cash(-cost))
                        .with_effect(Effect::SoldierNeeds {
                            grievance: *grievance,
                            delta: 30,
                        })
                        .with_effect(Effect::SoldierLoyalty(5)),
                ),
            EventChoice::new("speech", "Give a speech")
                .outcome(
                    Outcome::with_chance(50, "They cheer")
                        .with_effect(Effect::SoldierLoyalty(5)),
                )
                .outcome(
                    Outcome::with_chance(50, "Nobody is listening")
                        .with_effect(Effect::SoldierLoyalty(-5)),
                ),
            EventChoice::new("crack_down", "Crack down on the complainers").outcome(
                Outcome::certain("One of them is beaten and thrown out")
                    .with_delta(ResourceDelta::none().with_reputation(2))
                    .with_effect(Effect::SoldierLoyalty(-10))
                    .with_effect(Effect::LoseSoldiers(1)),
            ),
        ],

        EventKind::BusinessOpportunity {
            building_type,
            price,
        } => vec![
            EventChoice::new("buy", "Buy it")
                .requiring(Cost::cash(*price))
                .outcome(
                    Outcome::certain("The deed is yours")
                        .with_delta(ResourceDelta::cash(-price))
                        .with_effect(Effect::AcquireBuilding(*building_type)),
                ),
            EventChoice::new("pass", "Pass").outcome(Outcome::certain("Someone else buys it")),
        ],

        EventKind::InformantTip { rival_id, price } => vec![
            EventChoice::new("pay", "Pay for the information")
                .requiring(Cost::cash(*price))
                .outcome(
                    Outcome::with_chance(70, "The tip exposes a stash house")
                        .with_delta(ResourceDelta::cash(-price).with_intel(15))
                        .with_effect(Effect::RivalStrength {
                            rival_id: rival_id.clone(),
                            delta: -5,
                        }),
                )
                .outcome(
                    Outcome::with_chance(30, "Stale news")
                        .with_delta(ResourceDelta::cash(-price).with_intel(3)),
                ),
            EventChoice::new("ignore", "Send the informant away")
                .outcome(Outcome::certain("Nothing comes of it")),
        ],

        EventKind::PromotionRequest { officer_id } => vec![
            EventChoice::new("promote", "Promote them").outcome(
                Outcome::certain("A new rank and a new swagger")
                    .with_effect(Effect::Promote {
                        officer_id: officer_id.clone(),
                    })
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: officer_id.clone(),
                        delta: 10,
                    }),
            ),
            EventChoice::new("deny", "Tell them to wait").outcome(
                Outcome::certain("They swallow their pride")
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: officer_id.clone(),
                        delta: -10,
                    })
                    .with_effect(Effect::OfficerFace {
                        officer_id: officer_id.clone(),
                        delta: -5,
                    }),
            ),
        ],

        EventKind::RomanceScandal {
            officer_id,
            partner_id,
        } => vec![
            EventChoice::new("bless", "Give them your blessing").outcome(
                Outcome::certain("The pair are inseparable")
                    .with_delta(ResourceDelta::none().with_reputation(-2))
                    .with_effect(Effect::PairRomance {
                        a: officer_id.clone(),
                        b: partner_id.clone(),
                        delta: 10,
                    })
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: officer_id.clone(),
                        delta: 5,
                    })
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: partner_id.clone(),
                        delta: 5,
                    }),
            ),
            EventChoice::new("forbid", "Forbid it").outcome(
                Outcome::certain("They keep their distance and their resentment")
                    .with_effect(Effect::PairRomance {
                        a: officer_id.clone(),
                        b: partner_id.clone(),
                        delta: -30,
                    })
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: officer_id.clone(),
                        delta: -8,
                    })
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: partner_id.clone(),
                        delta: -8,
                    }),
            ),
            EventChoice::new("ignore", "Ignore the gossip")
                .outcome(Outcome::with_chance(60, "It blows over"))
                .outcome(
                    Outcome::with_chance(40, "The gossip reaches the papers")
                        .with_delta(ResourceDelta::none().with_heat(5).with_reputation(-3)),
                ),
        ],

        EventKind::OfficerFeud {
            officer_id,
            rival_officer_id,
        } => vec![
            EventChoice::new("mediate", "Sit them down together")
                .requiring(Cost::influence(5))
                .outcome(
                    Outcome::with_chance(70, "A grudging handshake")
                        .with_delta(ResourceDelta::none().with_influence(-5))
                        .with_effect(Effect::PairAffinity {
                            a: officer_id.clone(),
                            b: rival_officer_id.clone(),
                            delta: 25,
                        }),
                )
                .outcome(
                    Outcome::with_chance(30, "The meeting ends in shouting")
                        .with_delta(ResourceDelta::none().with_influence(-5))
                        .with_effect(Effect::PairAffinity {
                            a: officer_id.clone(),
                            b: rival_officer_id.clone(),
                            delta: -10,
                        }),
                ),
            EventChoice::new("take_side", format!("Back {}", officer_id)).outcome(
                Outcome::certain("One is grateful, the other bitter")
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: officer_id.clone(),
                        delta: 10,
                    })
                    .with_effect(Effect::OfficerLoyalty {
                        officer_id: rival_officer_id.clone(),
                        delta: -15,
                    }),
            ),
            EventChoice::new("let_fight", "Let them settle it")
                .outcome(
                    Outcome::with_chance(50, format!("{} ends up in hospital", rival_officer_id))
                        .with_effect(Effect::WoundOfficer {
                            officer_id: rival_officer_id.clone(),
                            days: 2,
                        })
                        .with_effect(Effect::PairAffinity {
                            a: officer_id.clone(),
                            b: rival_officer_id.clone(),
                            delta: -20,
                        }),
                )
                .outcome(
                    Outcome::with_chance(50, format!("{} ends up in hospital", officer_id))
                        .with_effect(Effect::WoundOfficer {
                            officer_id: officer_id.clone(),
                            days: 2,
                        })
                        .with_effect(Effect::PairAffinity {
                            a: officer_id.clone(),
                            b: rival_officer_id.clone(),
                            delta: -20,
                        }),
                ),
        ],

        EventKind::RivalEnvoy { rival_id, offer } => {
            let accept = match offer {
                EnvoyOffer::Trade => EventChoice::new("accept", "Shake on a trade deal").outcome(
                    Outcome::certain("Goods start moving both ways")
                        .with_effect(Effect::TradeAgreement {
                            rival_id: rival_id.clone(),
                        })
                        .with_effect(Effect::RivalRelationship {
                            rival_id: rival_id.clone(),
                            delta: 15,
                        }),
                ),
                EnvoyOffer::Alliance => EventChoice::new("accept", "Swear brotherhood")
                    .requiring(Cost::influence(5))
                    .outcome(
                        Outcome::certain("Incense is burned and oaths are sworn")
                            .with_delta(ResourceDelta::none().with_influence(-5))
                            .with_effect(Effect::Alliance {
                                rival_id: rival_id.clone(),
                            })
                            .with_effect(Effect::RivalRelationship {
                                rival_id: rival_id.clone(),
                                delta: 15,
                            }),
                    ),
            };
            vec![
                accept,
                EventChoice::new("decline", "Send the envoy home").outcome(
                    Outcome::certain("The envoy leaves insulted")
                        .with_effect(Effect::RivalRelationship {
                            rival_id: rival_id.clone(),
                            delta: -10,
                        })
                        .with_effect(Effect::RivalTension {
                            rival_id: rival_id.clone(),
                            delta: 10,
                        }),
                ),
            ]
        }

        EventKind::AssassinationAttempt {
            rival_id,
            officer_id,
        } => {
            // guards are paid at one and a half times a doctor's fee
            let fee = config.economy.heal_cost * 3 / 2;
            vec![
                EventChoice::new("bodyguards", "Double the bodyguards")
                    .requiring(Cost::cash(fee))
                    .outcome(
                        Outcome::with_chance(80, "The gunman is caught on the stairs")
                            .with_delta(ResourceDelta::cash(-fee).with_reputation(3))
                            .with_effect(Effect::RivalTension {
                                rival_id: rival_id.clone(),
                                delta: 10,
                            }),
                    )
                    .outcome(
                        Outcome::with_chance(20, "A blade gets through; you survive, barely")
                            .with_delta(ResourceDelta::cash(-fee))
                            .with_effect(Effect::LoyaltyShock {
                                reason: "The leader was wounded by assassins".into(),
                            }),
                    ),
                EventChoice::new("hide", "Go to ground")
                    .outcome(
                        Outcome::with_chance(60, "You slip away unseen")
                            .with_delta(ResourceDelta::none().with_reputation(-5)),
                    )
                    .outcome(
                        Outcome::with_chance(40, "They find you anyway; you are wounded")
                            .with_effect(Effect::LoyaltyShock {
                                reason: "The leader was wounded by assassins".into(),
                            }),
                    ),
                fight(
                    ConflictSpec {
                        kind: ConflictKind::Retaliation,
                        opponent: Opponent::Rival {
                            rival_id: rival_id.clone(),
                        },
                        key_officer: officer_id.clone(),
                        stake_building: None,
                    },
                    "Strike first",
                ),
            ]
        }

        EventKind::PostConflictReport { .. } => {
            vec![EventChoice::new("acknowledge", "Acknowledge")
                .outcome(Outcome::certain("Noted"))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRolls;
    use crate::rng::RandomSource;
    use crate::systems::conflict::{ConflictKind, ConflictReport};

    fn every_kind() -> Vec<EventKind> {
        vec![
            EventKind::PoliceRaid {
                building_id: "building_001".into(),
                officer_id: Some("officer_001".into()),
                bribe: 1_200,
            },
            EventKind::PoliceShakedown { demand: 400 },
            EventKind::RivalAttack {
                rival_id: "rival_001".into(),
                building_id: Some("building_002".into()),
                officer_id: None,
                tribute: 900,
            },
            EventKind::StreetWar {
                rival_id: "rival_001".into(),
                officer_id: None,
            },
            EventKind::OfficerBetrayal {
                officer_id: "officer_004".into(),
                rival_id: "rival_002".into(),
                bribe: 2_000,
            },
            EventKind::CoupAttempt {
                officer_id: "officer_004".into(),
                building_id: "building_002".into(),
                rebel_soldiers: 3,
                defender: Some("officer_002".into()),
            },
            EventKind::SoldierUnrest {
                grievance: Grievance::Pay,
                cost: 600,
            },
            EventKind::BusinessOpportunity {
                building_type: BuildingType::Teahouse,
                price: 3_000,
            },
            EventKind::InformantTip {
                rival_id: "rival_003".into(),
                price: 300,
            },
            EventKind::PromotionRequest {
                officer_id: "officer_005".into(),
            },
            EventKind::RomanceScandal {
                officer_id: "officer_003".into(),
                partner_id: "officer_004".into(),
            },
            EventKind::OfficerFeud {
                officer_id: "officer_002".into(),
                rival_officer_id: "officer_005".into(),
            },
            EventKind::RivalEnvoy {
                rival_id: "rival_002".into(),
                offer: EnvoyOffer::Alliance,
            },
            EventKind::AssassinationAttempt {
                rival_id: "rival_003".into(),
                officer_id: None,
            },
            EventKind::PostConflictReport {
                report: ConflictReport {
                    kind: ConflictKind::StreetWar,
                    opponent: Opponent::Police,
                    player_strength: 10,
                    opponent_strength: 5,
                    victory: true,
                    casualties: 0,
                    key_officer: None,
                    officer_fate: None,
                    battle_hardened: false,
                },
            },
        ]
    }

    #[test]
    fn test_every_choice_sums_to_100() {
        let config = EngineConfig::default();
        for kind in every_kind() {
            let choices = choices(&kind, &config);
            assert!(!choices.is_empty(), "{} has no choices", kind.label());
            for choice in &choices {
                assert_eq!(
                    choice.total_probability(),
                    100,
                    "{}/{} does not sum to 100",
                    kind.label(),
                    choice.id
                );
            }
        }
    }

    #[test]
    fn test_choice_counts() {
        let config = EngineConfig::default();
        for kind in every_kind() {
            let count = choices(&kind, &config).len();
            match kind {
                EventKind::PostConflictReport { .. } => assert_eq!(count, 1),
                _ => assert!((2..=4).contains(&count), "{} has {} choices", kind.label(), count),
            }
        }
    }

    #[test]
    fn test_pick_outcome_boundaries() {
        let outcomes = vec![
            Outcome::with_chance(80, "a"),
            Outcome::with_chance(20, "b"),
        ];
        assert_eq!(pick_outcome(0.0, &outcomes).unwrap().description, "a");
        assert_eq!(pick_outcome(0.7999, &outcomes).unwrap().description, "a");
        assert_eq!(pick_outcome(0.80, &outcomes).unwrap().description, "b");
        assert_eq!(pick_outcome(0.9999, &outcomes).unwrap().description, "b");
        assert!(pick_outcome(0.5, &[]).is_none());
    }

    #[test]
    fn test_outcome_frequencies_converge() {
        let outcomes = vec![
            Outcome::with_chance(70, "hit"),
            Outcome::with_chance(30, "miss"),
        ];
        let mut rolls = SeededRolls::new(2024);
        let trials = 10_000;
        let hits = (0..trials)
            .filter(|_| pick_outcome(rolls.next_f64(), &outcomes).unwrap().description == "hit")
            .count();
        let observed = hits as f64 / trials as f64;
        assert!((observed - 0.70).abs() < 0.03, "observed {}", observed);
    }

    #[test]
    fn test_bodyguard_fee_follows_heal_cost() {
        let mut config = EngineConfig::default();
        config.economy.heal_cost = 2_000;
        let attempt = EventKind::AssassinationAttempt {
            rival_id: "rival_003".into(),
            officer_id: None,
        };
        let bodyguards = choices(&attempt, &config)
            .into_iter()
            .find(|c| c.id == "bodyguards")
            .unwrap();
        assert_eq!(bodyguards.requires.cash, 3_000);
        for outcome in &bodyguards.outcomes {
            assert_eq!(outcome.delta.cash, -3_000);
        }
    }

    #[test]
    fn test_coup_fight_is_led_by_the_defender() {
        let config = EngineConfig::default();
        let coup = EventKind::CoupAttempt {
            officer_id: "officer_004".into(),
            building_id: "building_002".into(),
            rebel_soldiers: 2,
            defender: Some("officer_002".into()),
        };
        let fight = choices(&coup, &config)
            .into_iter()
            .find(|c| c.id == "fight")
            .unwrap();
        match &fight.outcomes[0].effects[0] {
            Effect::Conflict(spec) => {
                assert_eq!(spec.key_officer.as_deref(), Some("officer_002"));
                assert_eq!(spec.kind, ConflictKind::Coup);
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_execution_is_chronicled_as_an_execution() {
        let config = EngineConfig::default();
        let betrayal = EventKind::OfficerBetrayal {
            officer_id: "officer_004".into(),
            rival_id: "rival_002".into(),
            bribe: 2_000,
        };
        let execute = choices(&betrayal, &config)
            .into_iter()
            .find(|c| c.id == "execute")
            .unwrap();
        let reason = execute.outcomes[0].effects.iter().find_map(|e| match e {
            Effect::LoyaltyShock { reason } => Some(reason.clone()),
            _ => None,
        });
        assert_eq!(reason.as_deref(), Some("officer_004 was executed as a traitor"));
    }

    #[test]
    fn test_raid_bribe_requires_the_quoted_amount() {
        let config = EngineConfig::default();
        let raid = EventKind::PoliceRaid {
            building_id: "building_001".into(),
            officer_id: None,
            bribe: 1_000,
        };
        let bribe = choices(&raid, &config)
            .into_iter()
            .find(|c| c.id == "bribe")
            .unwrap();
        assert_eq!(bribe.requires.cash, 1_000);
    }
}
