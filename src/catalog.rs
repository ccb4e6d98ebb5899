//! Static game content: behaviors with their dialogs, the level campaign,
//! the upgrade store, deck obstacles and tuning constants.

use rand::Rng;

use crate::entities::{HazardState, NpcType};
use crate::geometry::Rect;

// ── Deck & tuning ─────────────────────────────────────────────────────────────

pub const DECK_WIDTH: f64 = 800.0;
pub const DECK_HEIGHT: f64 = 600.0;

pub const PLAYER_SPEED: f64 = 250.0;
pub const PLAYER_RADIUS: f64 = 15.0;
/// Each speed upgrade level adds this fraction of the base speed.
pub const SPEED_PER_UPGRADE: f64 = 0.2;

pub const NPC_SPEED: f64 = 50.0;
pub const NPC_SIZE: f64 = 30.0;

/// Player must stand this close to an NPC to talk to it.
pub const INTERACTION_DISTANCE: f64 = 70.0;
/// A click selects the first NPC whose center is within this radius.
pub const CLICK_RADIUS: f64 = 40.0;
pub const HAZARD_ZONE_MARGIN: f64 = 40.0;

pub const ARRIVAL_EPSILON: f64 = 5.0;
/// Drift keeps NPCs inside `[DRIFT_BOUND, DECK_HEIGHT - DRIFT_BOUND]`.
pub const DRIFT_BOUND: f64 = 70.0;
pub const DRIFT_PER_ROCKING_LEVEL: f64 = 30.0;

/// Base hazard chance per 1/60 s frame, scaled by the level multiplier.
pub const BASE_HAZARD_CHANCE: f64 = 0.005;
pub const IDLE_REPICK_CHANCE: f64 = 0.3;

/// Seconds an NPC stays in ACCIDENT before the deck is cleaned up.
pub const ACCIDENT_REVERT_DELAY: f64 = 3.0;
/// Milliseconds a defiant NPC claws back after a wrong dialog answer.
pub const DEFIANT_PENALTY_MS: f64 = 1500.0;

pub const WHISTLE_COOLDOWN: f64 = 15.0;

// ── Scoring ───────────────────────────────────────────────────────────────────

pub const SCORE_INTERVENE_YELLOW: i64 = 100;
pub const SCORE_INTERVENE_ORANGE: i64 = 60;
pub const SCORE_INTERVENE_RED: i64 = 30;
pub const SCORE_ACCIDENT: i64 = -300;
pub const SCORE_DIALOG_BONUS: i64 = 50;

pub const COINS_LEVEL_BASE: u32 = 50;
pub const COINS_NO_ACCIDENTS: u32 = 100;

/// Score awarded for stepping in, by how far the hazard had escalated.
pub fn intervention_score(state: HazardState) -> i64 {
    match state {
        HazardState::Yellow => SCORE_INTERVENE_YELLOW,
        HazardState::Orange => SCORE_INTERVENE_ORANGE,
        HazardState::Red => SCORE_INTERVENE_RED,
        HazardState::Safe | HazardState::Accident => 0,
    }
}

/// Coins paid out when a level's timer runs out.
pub fn level_reward(score: i64, accidents: u32) -> u32 {
    let score_share = u32::try_from(score.max(0) / 10).unwrap_or(u32::MAX);
    let clean_bonus = if accidents == 0 { COINS_NO_ACCIDENTS } else { 0 };
    COINS_LEVEL_BASE
        .saturating_add(score_share)
        .saturating_add(clean_bonus)
}

/// Rough seas shorten every hazard tier.
pub fn rocking_timer_multiplier(rocking: u8) -> f64 {
    match rocking {
        0 => 1.0,
        1 => 0.8,
        _ => 0.6,
    }
}

// ── Behaviors & dialogs ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorType {
    SelfieRail,
    LeaningRail,
    TakeOffLifejacket,
    KidsRunning,
    DrinkingNearEdge,
}

pub const ALL_BEHAVIORS: [BehaviorType; 5] = [
    BehaviorType::SelfieRail,
    BehaviorType::LeaningRail,
    BehaviorType::TakeOffLifejacket,
    BehaviorType::KidsRunning,
    BehaviorType::DrinkingNearEdge,
];

#[derive(Clone, Debug, PartialEq)]
pub struct DialogOption {
    pub text: &'static str,
    pub is_correct: bool,
    /// Correct answers flagged as bonus pay an extra `SCORE_DIALOG_BONUS`.
    pub is_bonus: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DialogData {
    pub action_name: &'static str,
    pub excuse: &'static str,
    pub options: &'static [DialogOption],
}

#[derive(Debug)]
pub struct BehaviorConfig {
    /// Tier durations in milliseconds.
    pub duration_yellow: f64,
    pub duration_orange: f64,
    pub duration_red: f64,
    /// The NPC walks to a ship edge before the hazard starts.
    pub requires_edge: bool,
    pub dialogs: &'static [DialogData],
}

impl BehaviorConfig {
    /// Full tier duration in milliseconds, before rocking compression.
    pub fn tier_duration(&self, state: HazardState) -> Option<f64> {
        match state {
            HazardState::Yellow => Some(self.duration_yellow),
            HazardState::Orange => Some(self.duration_orange),
            HazardState::Red => Some(self.duration_red),
            HazardState::Safe | HazardState::Accident => None,
        }
    }
}

const fn option(text: &'static str, is_correct: bool, is_bonus: bool) -> DialogOption {
    DialogOption { text, is_correct, is_bonus }
}

static SELFIE_RAIL: BehaviorConfig = BehaviorConfig {
    duration_yellow: 3000.0,
    duration_orange: 2000.0,
    duration_red: 1000.0,
    requires_edge: true,
    dialogs: &[DialogData {
        action_name: "Selfie against the rail",
        excuse: "This angle is the best view! I'm doing a trend video!",
        options: &[
            option("Careful, you'll drop your phone!", false, false),
            option("Climbing past the rail is against the rules, ma'am!", true, false),
            option("Let me take a great shot for you from somewhere safer!", true, true),
        ],
    }],
};

static LEANING_RAIL: BehaviorConfig = BehaviorConfig {
    duration_yellow: 4000.0,
    duration_orange: 3000.0,
    duration_red: 1500.0,
    requires_edge: true,
    dialogs: &[DialogData {
        action_name: "Leaning over the rail",
        excuse: "I just want to see how the propeller spins!",
        options: &[
            option("Don't look down, you'll get dizzy!", false, false),
            option("This spot is very dangerous when the ship rolls!", true, false),
            option("The glass viewing room over there is much safer!", true, true),
        ],
    }],
};

static TAKE_OFF_LIFEJACKET: BehaviorConfig = BehaviorConfig {
    duration_yellow: 5000.0,
    duration_orange: 3000.0,
    duration_red: 2000.0,
    requires_edge: false,
    dialogs: &[DialogData {
        action_name: "Taking off a life jacket",
        excuse: "This jacket is ugly, it ruins every photo!",
        options: &[
            option("Life jackets look cool anyway!", false, false),
            option("It's a mandatory safety rule, sorry!", true, false),
            option("Keep it on for now, you can take it off once you're inside!", true, true),
        ],
    }],
};

static KIDS_RUNNING: BehaviorConfig = BehaviorConfig {
    duration_yellow: 4000.0,
    duration_orange: 3000.0,
    duration_red: 1000.0,
    requires_edge: false,
    dialogs: &[DialogData {
        action_name: "Letting the kids run around",
        excuse: "Kids have energy, it's cruel to make them sit still!",
        options: &[
            option("Fishing a kid out of the sea is a real hassle!", false, false),
            option("They're handing out candy to kids below deck!", true, true),
            option("The deck is slippery, they could easily fall.", true, false),
        ],
    }],
};

static DRINKING_NEAR_EDGE: BehaviorConfig = BehaviorConfig {
    duration_yellow: 6000.0,
    duration_orange: 4000.0,
    duration_red: 1000.0,
    requires_edge: true,
    dialogs: &[
        DialogData {
            action_name: "Drunk at the ship's side",
            excuse: "I'm having fuuun! Cheers! Want a drink?",
            options: &[
                option("I'm on duty.", false, false),
                option("There's a great live show inside, come check it out!", true, false),
                option("You're drunk, step back!", false, false),
            ],
        },
        DialogData {
            action_name: "Drinking at the rail",
            excuse: "Hey, do you know who I am to be giving me orders?",
            options: &[
                option("I'm the safety officer, sir.", false, false),
                option("Sir, allow me to walk you back to the lounge.", true, true),
                option("Whoever you are, maritime safety rules apply.", true, false),
            ],
        },
    ],
};

pub fn behavior(kind: BehaviorType) -> &'static BehaviorConfig {
    match kind {
        BehaviorType::SelfieRail => &SELFIE_RAIL,
        BehaviorType::LeaningRail => &LEANING_RAIL,
        BehaviorType::TakeOffLifejacket => &TAKE_OFF_LIFEJACKET,
        BehaviorType::KidsRunning => &KIDS_RUNNING,
        BehaviorType::DrinkingNearEdge => &DRINKING_NEAR_EDGE,
    }
}

/// Each passenger type leans towards its own kind of trouble.
pub fn pick_behavior(kind: NpcType, rng: &mut impl Rng) -> BehaviorType {
    let r: f64 = rng.gen();
    match kind {
        NpcType::PhotoJunkie if r > 0.3 => BehaviorType::SelfieRail,
        NpcType::PhotoJunkie => BehaviorType::TakeOffLifejacket,
        NpcType::Family if r > 0.4 => BehaviorType::KidsRunning,
        NpcType::Family => BehaviorType::LeaningRail,
        NpcType::PartyGuest if r > 0.2 => BehaviorType::DrinkingNearEdge,
        NpcType::PartyGuest => BehaviorType::SelfieRail,
        NpcType::Trendy if r > 0.5 => BehaviorType::TakeOffLifejacket,
        NpcType::Trendy => BehaviorType::SelfieRail,
        NpcType::Curious | NpcType::Vip => {
            ALL_BEHAVIORS[rng.gen_range(0..ALL_BEHAVIORS.len())]
        }
    }
}

// ── Levels ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    pub name: &'static str,
    pub npc_count: u32,
    pub duration_seconds: f64,
    pub hazard_spawn_rate_multiplier: f64,
    pub allowed_accidents: u32,
    /// 0 = calm, 1 = moderate, 2 = severe.
    pub rocking_modifier: u8,
    pub is_night: bool,
    pub is_party: bool,
}

const fn level(
    name: &'static str,
    npc_count: u32,
    duration_seconds: f64,
    hazard_spawn_rate_multiplier: f64,
    allowed_accidents: u32,
) -> LevelConfig {
    LevelConfig {
        name,
        npc_count,
        duration_seconds,
        hazard_spawn_rate_multiplier,
        allowed_accidents,
        rocking_modifier: 0,
        is_night: false,
        is_party: false,
    }
}

pub static LEVELS: [LevelConfig; 8] = [
    level("First Day on the Job", 4, 60.0, 0.8, 3),
    level("Busy Weekend", 8, 90.0, 1.2, 3),
    level("Tour Groups & VIPs", 15, 120.0, 1.5, 2),
    LevelConfig {
        rocking_modifier: 1,
        ..level("Choppy Waters", 20, 90.0, 2.0, 2)
    },
    LevelConfig {
        rocking_modifier: 2,
        ..level("Super Storm", 25, 120.0, 2.5, 1)
    },
    LevelConfig {
        is_night: true,
        ..level("Dark Night at Sea", 20, 120.0, 2.0, 3)
    },
    LevelConfig {
        rocking_modifier: 2,
        is_night: true,
        ..level("Deadly Night Storm", 28, 150.0, 2.8, 2)
    },
    LevelConfig {
        is_night: true,
        is_party: true,
        ..level("New Year's Eve (Final Boss)", 40, 180.0, 3.5, 1)
    },
];

// ── Upgrade store ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeId {
    Speed,
    Whistle,
    Radar,
}

#[derive(Debug)]
pub struct UpgradeConfig {
    pub id: UpgradeId,
    pub name: &'static str,
    pub description: &'static str,
    pub max_level: u32,
    /// `costs[n]` buys level `n + 1`.
    pub costs: &'static [u32],
}

pub static UPGRADE_STORE: [UpgradeConfig; 3] = [
    UpgradeConfig {
        id: UpgradeId::Speed,
        name: "Running Shoes",
        description: "+20% running speed per level.",
        max_level: 3,
        costs: &[100, 250, 500],
    },
    UpgradeConfig {
        id: UpgradeId::Whistle,
        name: "Emergency Whistle",
        description: "Freezes hazardous passengers: 2s at level 1, 4s at level 2. Has a cooldown.",
        max_level: 2,
        costs: &[300, 600],
    },
    UpgradeConfig {
        id: UpgradeId::Radar,
        name: "Radar Map",
        description: "Reveals hazard hot spots, invaluable at night.",
        max_level: 1,
        costs: &[400],
    },
];

pub fn upgrade(id: UpgradeId) -> &'static UpgradeConfig {
    match id {
        UpgradeId::Speed => &UPGRADE_STORE[0],
        UpgradeId::Whistle => &UPGRADE_STORE[1],
        UpgradeId::Radar => &UPGRADE_STORE[2],
    }
}

/// Stun length in seconds for a whistle upgrade level (0 = not owned).
pub fn whistle_stun_duration(level: u32) -> f64 {
    match level {
        0 => 0.0,
        1 => 2.0,
        _ => 4.0,
    }
}

// ── Deck obstacles ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObstacleKind {
    Bar,
    Chairs,
    Equipment,
}

#[derive(Clone, Debug)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
}

pub static OBSTACLES: [Obstacle; 4] = [
    Obstacle {
        rect: Rect::new(350.0, 150.0, 100.0, 40.0),
        kind: ObstacleKind::Bar,
    },
    Obstacle {
        rect: Rect::new(200.0, 400.0, 60.0, 60.0),
        kind: ObstacleKind::Chairs,
    },
    Obstacle {
        rect: Rect::new(550.0, 350.0, 60.0, 60.0),
        kind: ObstacleKind::Chairs,
    },
    Obstacle {
        rect: Rect::new(DECK_WIDTH / 2.0 - 40.0, DECK_HEIGHT - 120.0, 80.0, 50.0),
        kind: ObstacleKind::Equipment,
    },
];

pub fn obstacle_rects() -> Vec<Rect> {
    OBSTACLES.iter().map(|o| o.rect).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_reward_floors_and_ignores_negative_score() {
        assert_eq!(level_reward(0, 0), 150);
        assert_eq!(level_reward(999, 1), 50 + 99);
        assert_eq!(level_reward(-600, 2), 50);
        assert_eq!(level_reward(i64::MAX, 0), u32::MAX);
    }

    #[test]
    fn every_behavior_has_a_correct_answer() {
        for kind in ALL_BEHAVIORS {
            let def = behavior(kind);
            assert!(!def.dialogs.is_empty());
            for dialog in def.dialogs {
                assert!(dialog.options.iter().any(|o| o.is_correct));
            }
        }
    }

    #[test]
    fn upgrade_costs_cover_every_level() {
        for u in &UPGRADE_STORE {
            assert_eq!(u.costs.len() as u32, u.max_level);
            assert_eq!(upgrade(u.id).id, u.id);
        }
    }
}
