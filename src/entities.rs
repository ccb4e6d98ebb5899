//! All game entity types: plain data plus the small state transitions that
//! belong to a single NPC.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{
    self, BehaviorType, DialogData, LevelConfig, DECK_HEIGHT, DECK_WIDTH, HAZARD_ZONE_MARGIN,
    NPC_SIZE, NPC_SPEED, PLAYER_RADIUS, PLAYER_SPEED, SPEED_PER_UPGRADE,
};
use crate::geometry::{self, Rect, Vec2};
use crate::storage::ProgressStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NpcType {
    PhotoJunkie,
    Curious,
    Family,
    Trendy,
    PartyGuest,
    Vip,
}

pub const ALL_NPC_TYPES: [NpcType; 6] = [
    NpcType::PhotoJunkie,
    NpcType::Curious,
    NpcType::Family,
    NpcType::Trendy,
    NpcType::PartyGuest,
    NpcType::Vip,
];

impl NpcType {
    /// Defiant passengers push back on a wrong answer instead of backing down.
    pub fn is_defiant(self) -> bool {
        matches!(self, NpcType::Vip | NpcType::PartyGuest)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HazardState {
    Safe,
    Yellow,
    Orange,
    Red,
    Accident,
}

impl HazardState {
    /// One of the three escalation tiers.
    pub fn is_hazard(self) -> bool {
        matches!(self, HazardState::Yellow | HazardState::Orange | HazardState::Red)
    }

    /// Tier reached when the current tier's timer runs out.
    pub fn next_tier(self) -> Option<HazardState> {
        match self {
            HazardState::Yellow => Some(HazardState::Orange),
            HazardState::Orange => Some(HazardState::Red),
            HazardState::Red => Some(HazardState::Accident),
            HazardState::Safe | HazardState::Accident => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    LevelComplete,
    Shop,
    GameOver,
    Victory,
}

// ── Movable bodies ────────────────────────────────────────────────────────────

/// Position and steering data shared by the player and every NPC.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub radius: f64,
    /// Units per second.
    pub speed: f64,
    pub target: Option<Vec2>,
    /// Radians, `atan2` of the last non-zero heading.
    pub facing: f64,
}

/// Who is being moved; drift and stuck handling differ per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoverKind {
    Player,
    Npc { state: HazardState },
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
}

impl Player {
    /// Fresh player in the middle of the deck.
    pub fn new(speed_level: u32) -> Self {
        Player {
            body: Body {
                pos: Vec2::new(DECK_WIDTH / 2.0, DECK_HEIGHT / 2.0),
                radius: PLAYER_RADIUS,
                speed: PLAYER_SPEED * (1.0 + SPEED_PER_UPGRADE * speed_level as f64),
                target: None,
                facing: 0.0,
            },
        }
    }
}

// ── NPC ───────────────────────────────────────────────────────────────────────

/// Spawn attempts before accepting a position that overlaps an obstacle.
const SPAWN_ATTEMPTS: u32 = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct Npc {
    /// Unique within a level, equal to the spawn index.
    pub id: u32,
    pub body: Body,
    pub width: f64,
    pub height: f64,
    pub kind: NpcType,
    pub state: HazardState,
    /// Set only while YELLOW, ORANGE or RED (and through the ACCIDENT cleanup).
    pub current_behavior: Option<BehaviorType>,
    /// Edge behavior the NPC is walking to the rail for; becomes
    /// `current_behavior` on arrival.
    pub pending_behavior: Option<BehaviorType>,
    /// Milliseconds left in the current tier.
    pub state_timer: f64,
    /// Full length of the current tier in milliseconds.
    pub max_state_timer: f64,
    /// Seconds left frozen by the whistle.
    pub stun_timer: f64,
}

impl Npc {
    /// Build a SAFE passenger of the given type at `pos`, with no target yet.
    pub fn new(id: u32, kind: NpcType, pos: Vec2) -> Self {
        Npc {
            id,
            body: Body {
                pos,
                radius: NPC_SIZE / 2.0,
                speed: NPC_SPEED,
                target: None,
                facing: 0.0,
            },
            width: NPC_SIZE,
            height: NPC_SIZE,
            kind,
            state: HazardState::Safe,
            current_behavior: None,
            pending_behavior: None,
            state_timer: 0.0,
            max_state_timer: 0.0,
            stun_timer: 0.0,
        }
    }

    /// Random passenger somewhere on the open deck, already wandering.
    pub fn spawn(id: u32, obstacles: &[Rect], rng: &mut impl Rng) -> Self {
        let mut pos = random_spawn_point(rng);
        for _ in 1..SPAWN_ATTEMPTS {
            if !geometry::circle_hits_any(pos, NPC_SIZE / 2.0, obstacles) {
                break;
            }
            pos = random_spawn_point(rng);
        }
        let kind = random_npc_type(rng);
        let mut npc = Npc::new(id, kind, pos);
        npc.pick_new_random_target(rng);
        npc
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    pub fn mover_kind(&self) -> MoverKind {
        MoverKind::Npc { state: self.state }
    }

    /// SAFE with a chosen edge behavior, still walking towards the rail.
    pub fn is_seeking_edge(&self) -> bool {
        self.state == HazardState::Safe && self.pending_behavior.is_some()
    }

    /// SAFE with nothing planned: eligible for a new hazard roll.
    pub fn is_idle(&self) -> bool {
        self.state == HazardState::Safe
            && self.current_behavior.is_none()
            && self.pending_behavior.is_none()
    }

    pub fn pick_new_random_target(&mut self, rng: &mut impl Rng) {
        self.body.target = Some(Vec2::new(
            120.0 + rng.gen::<f64>() * (DECK_WIDTH - 240.0),
            70.0 + rng.gen::<f64>() * (DECK_HEIGHT - 140.0),
        ));
    }

    /// Roll a behavior for this passenger type and start it. Ignored unless SAFE.
    pub fn start_hazard_behavior(&mut self, rocking: u8, rng: &mut impl Rng) {
        if self.state != HazardState::Safe {
            return;
        }
        let behavior = catalog::pick_behavior(self.kind, rng);
        self.begin_behavior(behavior, rocking, rng);
    }

    /// Start `behavior`: edge behaviors first walk to a random ship edge and
    /// turn YELLOW on arrival, the rest turn YELLOW immediately.
    pub fn begin_behavior(&mut self, behavior: BehaviorType, rocking: u8, rng: &mut impl Rng) {
        if self.state != HazardState::Safe {
            return;
        }
        if catalog::behavior(behavior).requires_edge {
            self.pending_behavior = Some(behavior);
            self.seek_edge(rng);
        } else {
            self.current_behavior = Some(behavior);
            self.escalate_to(HazardState::Yellow, rocking);
        }
    }

    /// Reached the rail: the planned behavior starts at YELLOW.
    pub fn arrive_at_edge(&mut self, rocking: u8) {
        if let Some(behavior) = self.pending_behavior.take() {
            self.current_behavior = Some(behavior);
            self.escalate_to(HazardState::Yellow, rocking);
        }
    }

    /// Target a random point along one of the four ship edges.
    pub fn seek_edge(&mut self, rng: &mut impl Rng) {
        let half_margin = HAZARD_ZONE_MARGIN / 2.0;
        let along_x = 100.0 + rng.gen::<f64>() * (DECK_WIDTH - 200.0);
        let along_y = 50.0 + rng.gen::<f64>() * (DECK_HEIGHT - 100.0);
        let target = match rng.gen_range(0..4) {
            0 => Vec2::new(along_x, 50.0 + half_margin),
            1 => Vec2::new(along_x, DECK_HEIGHT - 50.0 - half_margin),
            2 => Vec2::new(100.0 + half_margin, along_y),
            _ => Vec2::new(DECK_WIDTH - 100.0 - half_margin, along_y),
        };
        self.body.target = Some(target);
    }

    /// Enter a hazard tier, loading its timer (compressed by rough seas) and
    /// stopping in place. A tier without a behavior has nothing to time.
    pub fn escalate_to(&mut self, state: HazardState, rocking: u8) {
        self.state = state;
        let Some(behavior) = self.current_behavior else {
            return;
        };
        if let Some(duration) = catalog::behavior(behavior).tier_duration(state) {
            let ms = duration * catalog::rocking_timer_multiplier(rocking);
            self.state_timer = ms;
            self.max_state_timer = ms;
        }
        self.body.target = None;
    }

    /// Drop the behavior and wander off somewhere new.
    pub fn return_to_safe(&mut self, rng: &mut impl Rng) {
        self.state = HazardState::Safe;
        self.current_behavior = None;
        self.pending_behavior = None;
        self.stun_timer = 0.0;
        self.state_timer = 0.0;
        self.max_state_timer = 0.0;
        self.pick_new_random_target(rng);
    }
}

fn random_spawn_point(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        150.0 + rng.gen::<f64>() * (DECK_WIDTH - 300.0),
        100.0 + rng.gen::<f64>() * (DECK_HEIGHT - 200.0),
    )
}

fn random_npc_type(rng: &mut impl Rng) -> NpcType {
    ALL_NPC_TYPES[rng.gen_range(0..ALL_NPC_TYPES.len())]
}

// ── Dialogs, upgrades, deferred events ────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveDialog {
    pub npc_id: u32,
    pub dialog: &'static DialogData,
}

/// Purchased upgrade levels. Persist across levels and runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub speed: u32,
    pub whistle: u32,
    pub radar: u32,
}

impl Upgrades {
    pub fn level(&self, id: catalog::UpgradeId) -> u32 {
        match id {
            catalog::UpgradeId::Speed => self.speed,
            catalog::UpgradeId::Whistle => self.whistle,
            catalog::UpgradeId::Radar => self.radar,
        }
    }

    pub fn level_mut(&mut self, id: catalog::UpgradeId) -> &mut u32 {
        match id {
            catalog::UpgradeId::Speed => &mut self.speed,
            catalog::UpgradeId::Whistle => &mut self.whistle,
            catalog::UpgradeId::Radar => &mut self.radar,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DelayedAction {
    /// Clean up after an accident: the NPC goes back to SAFE.
    RevertAccident { npc_id: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayedEvent {
    /// Compared against `GameState::total_time`.
    pub fire_at: f64,
    pub action: DelayedAction,
}

/// One entry in `GameState::radar_contacts`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadarContact {
    pub npc_id: u32,
    pub pos: Vec2,
    pub state: HazardState,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state. The presentation layer reads these fields every
/// frame; all mutation goes through the methods in `compute`.
#[derive(Debug)]
pub struct GameState {
    pub screen: Screen,
    pub score: i64,
    pub coins: u32,
    /// Accidents this level.
    pub accidents: u32,
    pub current_level_index: usize,
    /// Seconds elapsed in the current level.
    pub level_timer: f64,
    pub max_level_timer: f64,
    /// Seconds since the run started; drives drift and deferred events.
    pub total_time: f64,
    pub upgrades: Upgrades,
    /// Seconds until the whistle can be used again.
    pub whistle_cooldown: f64,
    pub player: Player,
    /// Spawn order, which is also id order.
    pub npcs: Vec<Npc>,
    pub active_dialog: Option<ActiveDialog>,
    /// Sorted by `fire_at`.
    pub pending_events: Vec<DelayedEvent>,
    /// Level index found in the last loaded save.
    pub saved_level_index: Option<usize>,
    /// Screen to go back to when the shop closes.
    pub shop_return: Option<Screen>,
    pub levels: Vec<LevelConfig>,
    pub obstacles: Vec<Rect>,
    pub store: Box<dyn ProgressStore>,
}
