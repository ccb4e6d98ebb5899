//! Game state machine.
//!
//! Every operation mutates the `GameState` in place. All randomness comes
//! through the `rng` argument so callers control determinism (tests pass a
//! seeded `StdRng`). Nothing here ever fails: missing levels mean victory,
//! stale npc ids are ignored and storage problems are logged.

use rand::Rng;

use crate::catalog::{
    self, DialogData, DialogOption, LevelConfig, UpgradeId, ACCIDENT_REVERT_DELAY,
    BASE_HAZARD_CHANCE, CLICK_RADIUS, DECK_HEIGHT, DEFIANT_PENALTY_MS, IDLE_REPICK_CHANCE,
    INTERACTION_DISTANCE, SCORE_ACCIDENT, SCORE_DIALOG_BONUS, WHISTLE_COOLDOWN,
};
use crate::entities::{
    ActiveDialog, DelayedAction, DelayedEvent, GameState, HazardState, MoverKind, Npc, Player,
    RadarContact, Screen, Upgrades,
};
use crate::geometry::{point_in_circle, Vec2};
use crate::movement::{advance, Environment};
use crate::storage::{ProgressStore, SaveData, PROGRESS_KEY};

// ── Constructors & accessors ─────────────────────────────────────────────────

impl GameState {
    /// Fresh game on the START screen using the built-in campaign.
    pub fn new(store: Box<dyn ProgressStore>) -> Self {
        Self::with_levels(catalog::LEVELS.to_vec(), store)
    }

    /// Fresh game with a custom level catalog.
    pub fn with_levels(levels: Vec<LevelConfig>, store: Box<dyn ProgressStore>) -> Self {
        GameState {
            screen: Screen::Start,
            score: 0,
            coins: 0,
            accidents: 0,
            current_level_index: 0,
            level_timer: 0.0,
            max_level_timer: 0.0,
            total_time: 0.0,
            upgrades: Upgrades::default(),
            whistle_cooldown: 0.0,
            player: Player::new(0),
            npcs: Vec::new(),
            active_dialog: None,
            pending_events: Vec::new(),
            saved_level_index: None,
            shop_return: None,
            levels,
            obstacles: catalog::obstacle_rects(),
            store,
        }
    }

    pub fn level_config(&self) -> Option<&LevelConfig> {
        self.levels.get(self.current_level_index)
    }

    pub fn rocking(&self) -> u8 {
        self.level_config().map_or(0, |c| c.rocking_modifier)
    }

    pub fn time_remaining(&self) -> f64 {
        (self.max_level_timer - self.level_timer).max(0.0)
    }

    pub fn npc(&self, id: u32) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    /// Hazardous NPCs, revealed only once the radar upgrade is owned.
    pub fn radar_contacts(&self) -> Vec<RadarContact> {
        if self.upgrades.radar == 0 {
            return Vec::new();
        }
        self.npcs
            .iter()
            .filter(|n| n.state.is_hazard())
            .map(|n| RadarContact {
                npc_id: n.id,
                pos: n.body.pos,
                state: n.state,
            })
            .collect()
    }
}

// ── Screen flow ──────────────────────────────────────────────────────────────

impl GameState {
    /// Enter level `index`, replacing the player and every NPC. Past the last
    /// level this is the VICTORY screen instead.
    pub fn start_level(&mut self, index: usize, rng: &mut impl Rng) {
        self.current_level_index = index;
        self.active_dialog = None;
        self.pending_events.clear();
        self.shop_return = None;

        let Some(config) = self.levels.get(index) else {
            log::info!("No level {index}: campaign complete with score {}", self.score);
            self.screen = Screen::Victory;
            return;
        };

        self.accidents = 0;
        self.level_timer = 0.0;
        self.max_level_timer = config.duration_seconds;
        self.whistle_cooldown = 0.0;
        self.player = Player::new(self.upgrades.speed);
        self.npcs = (0..config.npc_count)
            .map(|id| Npc::spawn(id, &self.obstacles, rng))
            .collect();
        self.screen = Screen::Playing;

        log::info!(
            "Starting level {} \"{}\": {} passengers, {}s, {} accidents allowed",
            index + 1,
            config.name,
            config.npc_count,
            config.duration_seconds,
            config.allowed_accidents
        );
    }

    /// Begin a run at the first level. Score, coins and upgrades carry over.
    pub fn start_run(&mut self, rng: &mut impl Rng) -> bool {
        if !matches!(self.screen, Screen::Start | Screen::GameOver | Screen::Victory) {
            return false;
        }
        self.start_level(0, rng);
        true
    }

    /// Advance past a completed level, either from its summary screen or from
    /// the shop opened there.
    pub fn next_level(&mut self, rng: &mut impl Rng) -> bool {
        let after_level = match self.screen {
            Screen::LevelComplete => true,
            Screen::Shop => self.shop_return == Some(Screen::LevelComplete),
            _ => false,
        };
        if !after_level {
            return false;
        }
        self.start_level(self.current_level_index + 1, rng);
        true
    }

    pub fn open_shop(&mut self) -> bool {
        if !matches!(self.screen, Screen::LevelComplete | Screen::Start) {
            return false;
        }
        self.shop_return = Some(self.screen);
        self.screen = Screen::Shop;
        true
    }

    pub fn close_shop(&mut self) -> bool {
        if self.screen != Screen::Shop {
            return false;
        }
        self.screen = self.shop_return.take().unwrap_or(Screen::Start);
        true
    }

    pub fn return_to_start(&mut self) -> bool {
        if !matches!(self.screen, Screen::GameOver | Screen::Victory) {
            return false;
        }
        self.screen = Screen::Start;
        true
    }

    fn complete_level(&mut self) {
        let reward = catalog::level_reward(self.score, self.accidents);
        self.coins = self.coins.saturating_add(reward);
        self.screen = Screen::LevelComplete;
        log::info!(
            "Level {} complete: score {}, {} accidents, +{} coins",
            self.current_level_index + 1,
            self.score,
            self.accidents,
            reward
        );
        self.save_progress();
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// What happened to one NPC during a tick.
#[derive(Debug, PartialEq)]
enum NpcTick {
    Quiet,
    Accident,
}

impl GameState {
    /// Advance the simulation by `dt` seconds. Does nothing outside PLAYING
    /// or while a dialog is open.
    pub fn update(&mut self, dt: f64, rng: &mut impl Rng) {
        if self.screen != Screen::Playing || self.active_dialog.is_some() {
            return;
        }
        let Some(config) = self.levels.get(self.current_level_index) else {
            return;
        };
        let allowed_accidents = config.allowed_accidents;
        let spawn_multiplier = config.hazard_spawn_rate_multiplier;
        let rocking = config.rocking_modifier;

        self.level_timer += dt;
        self.total_time += dt;

        if self.level_timer >= self.max_level_timer {
            self.complete_level();
            return;
        }

        if self.accidents >= allowed_accidents {
            log::info!(
                "Game over on level {}: {} accidents",
                self.current_level_index + 1,
                self.accidents
            );
            self.screen = Screen::GameOver;
            return;
        }

        self.run_due_events(rng);

        let env = Environment {
            obstacles: &self.obstacles,
            rocking,
            total_time: self.total_time,
            deck_height: DECK_HEIGHT,
        };

        advance(&mut self.player.body, MoverKind::Player, dt, &env);
        self.whistle_cooldown = (self.whistle_cooldown - dt).max(0.0);

        let spawn_chance = BASE_HAZARD_CHANCE * dt * 60.0 * spawn_multiplier;
        for npc in &mut self.npcs {
            if tick_npc(npc, dt, spawn_chance, &env, rng) == NpcTick::Accident {
                self.score += SCORE_ACCIDENT;
                self.accidents += 1;
                let event = DelayedEvent {
                    fire_at: self.total_time + ACCIDENT_REVERT_DELAY,
                    action: DelayedAction::RevertAccident { npc_id: npc.id },
                };
                let at = self
                    .pending_events
                    .partition_point(|e| e.fire_at <= event.fire_at);
                self.pending_events.insert(at, event);
                log::warn!(
                    "Accident: passenger {} ({:?}), {} this level",
                    npc.id,
                    npc.current_behavior,
                    self.accidents
                );
            }
        }
    }

    /// Fire every deferred event whose time has come. Events whose NPC has
    /// vanished or already recovered are dropped.
    fn run_due_events(&mut self, rng: &mut impl Rng) {
        let due = self
            .pending_events
            .partition_point(|e| e.fire_at <= self.total_time);
        let fired: Vec<DelayedEvent> = self.pending_events.drain(..due).collect();
        for event in fired {
            match event.action {
                DelayedAction::RevertAccident { npc_id } => {
                    if let Some(npc) = self
                        .npcs
                        .iter_mut()
                        .find(|n| n.id == npc_id && n.state == HazardState::Accident)
                    {
                        npc.return_to_safe(rng);
                    }
                }
            }
        }
    }
}

/// Movement, hazard roll and tier countdown for one NPC.
fn tick_npc(
    npc: &mut Npc,
    dt: f64,
    spawn_chance: f64,
    env: &Environment,
    rng: &mut impl Rng,
) -> NpcTick {
    if npc.is_stunned() {
        npc.stun_timer = (npc.stun_timer - dt).max(0.0);
        return NpcTick::Quiet;
    }

    // A stuck approach dropped its target; head for another stretch of rail.
    if npc.is_seeking_edge() && npc.body.target.is_none() {
        npc.seek_edge(rng);
    }

    let had_target = npc.body.target.is_some();
    let kind = npc.mover_kind();
    let arrived = advance(&mut npc.body, kind, dt, env);
    if had_target && arrived {
        if npc.is_seeking_edge() {
            npc.arrive_at_edge(env.rocking);
        } else if npc.state == HazardState::Safe && rng.gen::<f64>() < IDLE_REPICK_CHANCE {
            npc.pick_new_random_target(rng);
        }
    } else if had_target && npc.body.target.is_none() && npc.is_idle() {
        // Blocked wanderer: head somewhere else from the next tick on.
        npc.pick_new_random_target(rng);
    }

    if npc.is_idle() && rng.gen::<f64>() < spawn_chance {
        npc.start_hazard_behavior(env.rocking, rng);
    }

    if npc.state.is_hazard() {
        npc.state_timer -= dt * 1000.0;
        if npc.state_timer <= 0.0 {
            match npc.state.next_tier() {
                Some(HazardState::Accident) => {
                    npc.state = HazardState::Accident;
                    return NpcTick::Accident;
                }
                Some(next) => npc.escalate_to(next, env.rocking),
                None => {}
            }
        }
    }
    NpcTick::Quiet
}

// ── Player actions ───────────────────────────────────────────────────────────

impl GameState {
    /// Try to step in at the clicked spot. Only the first NPC (in spawn order)
    /// under the click is considered, and it only counts when the player is
    /// close enough and the NPC is mid-hazard.
    pub fn handle_intervention(&mut self, x: f64, y: f64, rng: &mut impl Rng) -> bool {
        if self.screen != Screen::Playing || self.active_dialog.is_some() {
            return false;
        }
        let click = Vec2::new(x, y);
        let Some(npc) = self
            .npcs
            .iter_mut()
            .find(|n| point_in_circle(click, n.body.pos, CLICK_RADIUS))
        else {
            return false;
        };

        if npc.body.pos.distance(self.player.body.pos) > INTERACTION_DISTANCE
            || !npc.state.is_hazard()
        {
            return false;
        }

        self.score += catalog::intervention_score(npc.state);
        let dialogs: &'static [DialogData] = match npc.current_behavior {
            Some(behavior) => catalog::behavior(behavior).dialogs,
            None => &[],
        };
        if dialogs.is_empty() {
            npc.return_to_safe(rng);
        } else {
            let dialog = &dialogs[rng.gen_range(0..dialogs.len())];
            log::debug!("Passenger {} dialog: {}", npc.id, dialog.action_name);
            self.active_dialog = Some(ActiveDialog {
                npc_id: npc.id,
                dialog,
            });
        }
        true
    }

    /// A click on the deck: intervene if possible, otherwise walk there.
    pub fn handle_click(&mut self, x: f64, y: f64, rng: &mut impl Rng) -> bool {
        if self.screen != Screen::Playing {
            return false;
        }
        let interacted = self.handle_intervention(x, y, rng);
        if !interacted && self.active_dialog.is_none() {
            self.player.body.target = Some(Vec2::new(x, y));
        }
        interacted
    }

    /// Close the open dialog with the chosen answer.
    pub fn resolve_dialog(&mut self, option: &DialogOption, rng: &mut impl Rng) {
        let Some(active) = self.active_dialog.take() else {
            return;
        };
        let Some(npc) = self.npcs.iter_mut().find(|n| n.id == active.npc_id) else {
            return;
        };
        if !npc.state.is_hazard() {
            return;
        }

        if option.is_correct {
            if option.is_bonus {
                self.score += SCORE_DIALOG_BONUS;
            }
            npc.return_to_safe(rng);
        } else if npc.kind.is_defiant() {
            npc.state_timer = (npc.state_timer + DEFIANT_PENALTY_MS).min(npc.max_state_timer);
            log::debug!("Passenger {} ({:?}) shrugged off a wrong answer", npc.id, npc.kind);
        } else {
            npc.return_to_safe(rng);
        }
    }

    /// Freeze every hazardous NPC. Only goes on cooldown if someone was hit.
    pub fn use_whistle(&mut self) -> bool {
        if self.upgrades.whistle == 0
            || self.whistle_cooldown > 0.0
            || self.screen != Screen::Playing
        {
            return false;
        }
        let duration = catalog::whistle_stun_duration(self.upgrades.whistle);
        let mut stunned = 0;
        for npc in self.npcs.iter_mut().filter(|n| n.state.is_hazard()) {
            npc.stun_timer = duration;
            stunned += 1;
        }
        if stunned == 0 {
            return false;
        }
        self.whistle_cooldown = WHISTLE_COOLDOWN;
        log::info!("Whistle froze {stunned} passengers for {duration}s");
        true
    }
}

// ── Upgrade store ────────────────────────────────────────────────────────────

impl GameState {
    /// Price of the next level of `id`, or `None` when already maxed.
    pub fn upgrade_cost(&self, id: UpgradeId) -> Option<u32> {
        let config = catalog::upgrade(id);
        let level = self.upgrades.level(id);
        if level >= config.max_level {
            return None;
        }
        config.costs.get(level as usize).copied()
    }

    /// Buy the next level of `id`. Rejected without side effects when maxed
    /// out or short on coins.
    pub fn buy_upgrade(&mut self, id: UpgradeId) -> bool {
        let Some(cost) = self.upgrade_cost(id) else {
            return false;
        };
        if self.coins < cost {
            return false;
        }
        self.coins -= cost;
        *self.upgrades.level_mut(id) += 1;
        log::info!(
            "Bought {} level {} for {} coins",
            catalog::upgrade(id).name,
            self.upgrades.level(id),
            cost
        );
        self.save_progress();
        true
    }
}

// ── Persistence ──────────────────────────────────────────────────────────────

impl GameState {
    pub fn save_progress(&mut self) {
        let data = SaveData {
            current_level_index: self.current_level_index,
            score: self.score,
            coins: self.coins,
            upgrades: self.upgrades,
        };
        let result = data
            .to_json()
            .and_then(|json| self.store.write(PROGRESS_KEY, &json));
        if let Err(e) = result {
            log::warn!("Failed to save progress: {e}");
        }
    }

    /// Restore score, coins and upgrades. Unreadable saves are logged and
    /// ignored. The saved level index is only recorded in `saved_level_index`.
    pub fn load_progress(&mut self) {
        let loaded = self
            .store
            .read(PROGRESS_KEY)
            .and_then(|raw| raw.map(|r| SaveData::from_json(&r)).transpose());
        let data = match loaded {
            Ok(Some(data)) => data,
            Ok(None) => {
                log::debug!("No saved progress");
                return;
            }
            Err(e) => {
                log::warn!("Ignoring unreadable saved progress: {e}");
                return;
            }
        };
        self.score = data.score;
        self.coins = data.coins;
        self.upgrades = data.upgrades;
        self.saved_level_index = Some(data.current_level_index);
        log::info!(
            "Loaded progress: score {}, {} coins, upgrades {:?}",
            self.score,
            self.coins,
            self.upgrades
        );
    }
}
