//! Game session and lifecycle.
//!
//! [`Game`] owns everything a session needs: the entity state, the timer
//! scheduler, the wave sequencer, the banners and the RNG.  A front-end drives
//! it by calling [`Game::update`] once per frame with the held input and the
//! frame's elapsed time, plus the `on_*` handlers for discrete actions.
//!
//! Each update first advances the scheduler and dispatches whatever fired
//! (autonomous fire, spawns, wave steps) in chronological order, then runs the
//! per-frame pipeline from [`crate::compute`].  While paused or after game
//! over, update does nothing except hand back a fresh snapshot.

use std::mem;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::compute;
use crate::config::{GameConfig, SpawnPolicy};
use crate::entities::{Banner, BannerKind, Direction, GameState, GameStatus};
use crate::scheduler::{Repeat, Scheduler, TimerKind};
use crate::spawner;
use crate::waves::{WaveAction, WavePhase, WaveSequencer};

/// Input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    /// Wall time since the previous frame.
    pub dt: Duration,
}

impl InputState {
    pub fn idle(dt: Duration) -> Self {
        InputState {
            left: false,
            right: false,
            dt,
        }
    }
}

/// Read-only view of a session handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub state: GameState,
    pub banners: Vec<Banner>,
    /// `None` under the lane spawn policy.
    pub wave_phase: Option<WavePhase>,
    pub stage_index: usize,
    pub wave_index: usize,
    pub turret_limit: usize,
    pub turret_cost: u32,
}

pub struct Game<R = StdRng> {
    config: GameConfig,
    state: GameState,
    scheduler: Scheduler<TimerKind>,
    sequencer: Option<WaveSequencer>,
    banners: Vec<Banner>,
    rng: R,
}

impl Game<StdRng> {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Game<R> {
    /// Start a session with an injected RNG.  The session is live right away:
    /// autonomous fire and the spawn source are armed.
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        let sequencer = match config.spawn_policy {
            SpawnPolicy::Lanes => None,
            SpawnPolicy::Waves => Some(WaveSequencer::from_config(&config)),
        };
        let mut game = Game {
            state: compute::init_state(&config),
            config,
            scheduler: Scheduler::new(),
            sequencer,
            banners: Vec::new(),
            rng,
        };
        game.arm_session();
        game
    }

    /// Wipe every timer and arm exactly one fire stream and one spawn source.
    fn arm_session(&mut self) {
        self.scheduler.clear();
        self.scheduler.arm(
            TimerKind::AutoFire,
            self.config.auto_fire_interval(),
            Repeat::Every,
        );
        match self.config.spawn_policy {
            SpawnPolicy::Lanes => self.scheduler.arm(
                TimerKind::LaneSpawn,
                self.config.lane_spawn_interval(),
                Repeat::Every,
            ),
            SpawnPolicy::Waves => {
                let actions = match self.sequencer.as_mut() {
                    Some(seq) => seq.start_next_wave(),
                    None => Vec::new(),
                };
                self.apply(actions);
            }
        }
    }

    // ── Frame update ────────────────────────────────────────────────────────

    /// Advance one logical frame and return the resulting snapshot.
    pub fn update(&mut self, input: InputState) -> Snapshot {
        if self.state.status != GameStatus::Playing {
            return self.snapshot();
        }

        self.state.elapsed += input.dt;
        self.expire_banners(input.dt);

        for kind in self.scheduler.advance(input.dt) {
            self.on_timer(kind);
        }

        self.state = compute::tick(&self.state, input.left, input.right, &self.config);
        if self.state.status == GameStatus::GameOver {
            self.enter_game_over();
            return self.snapshot();
        }

        let remaining = self.state.enemies.len();
        let actions = match self.sequencer.as_mut() {
            Some(seq) => seq.on_frame(remaining),
            None => Vec::new(),
        };
        self.apply(actions);

        self.snapshot()
    }

    fn on_timer(&mut self, kind: TimerKind) {
        debug!(?kind, "timer fired");
        match kind {
            TimerKind::AutoFire => {
                self.state = compute::player_shoot(&self.state, &self.config);
            }
            TimerKind::LaneSpawn => {
                self.state = spawner::spawn_lane_enemy(
                    &self.state,
                    &self.config.lane_xs,
                    self.config.lane_hp_min,
                    self.config.lane_hp_max,
                    &mut self.rng,
                );
            }
            TimerKind::GroupSpawn | TimerKind::BossDelay | TimerKind::WaveCooldown => {
                let actions = match self.sequencer.as_mut() {
                    Some(seq) => match kind {
                        TimerKind::GroupSpawn => seq.on_group_tick(),
                        TimerKind::BossDelay => seq.on_boss_delay(),
                        _ => seq.on_cooldown(),
                    },
                    None => Vec::new(),
                };
                self.apply(actions);
            }
        }
    }

    fn apply(&mut self, actions: Vec<WaveAction>) {
        for action in actions {
            match action {
                WaveAction::SpawnGroup { hp } => {
                    let count = spawner::roll_group_size(&mut self.rng);
                    self.state = spawner::spawn_group(&self.state, count, hp, &mut self.rng);
                }
                WaveAction::SpawnBoss(kind) => {
                    self.state = spawner::spawn_boss(&self.state, kind);
                }
                WaveAction::Arm(kind, period, repeat) => self.scheduler.arm(kind, period, repeat),
                WaveAction::Cancel(kind) => {
                    self.scheduler.cancel(kind);
                }
                WaveAction::Announce(kind) => self.announce(kind),
            }
        }
    }

    fn announce(&mut self, kind: BannerKind) {
        // One banner per kind of message; a newer wave banner replaces the old.
        self.banners
            .retain(|b| mem::discriminant(&b.kind) != mem::discriminant(&kind));
        self.banners
            .push(Banner::new(kind, self.config.banner_duration()));
    }

    fn expire_banners(&mut self, dt: Duration) {
        for banner in self.banners.iter_mut() {
            banner.remaining = banner.remaining.saturating_sub(dt);
        }
        self.banners.retain(|b| !b.remaining.is_zero());
    }

    fn enter_game_over(&mut self) {
        self.scheduler.clear();
        info!(
            score = self.state.score,
            elapsed_secs = self.state.elapsed.as_secs(),
            "game over"
        );
    }

    // ── Discrete actions ────────────────────────────────────────────────────

    /// Fire one bullet from the player's muzzle.  Ignored unless playing.
    pub fn on_fire_requested(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.state = compute::player_shoot(&self.state, &self.config);
        }
    }

    /// Nudge the player a few frames' worth of distance.  Ignored unless playing.
    pub fn on_move(&mut self, dir: Direction) {
        if self.state.status == GameStatus::Playing {
            let distance = self.state.player.speed * self.config.nudge_multiplier;
            self.state = compute::move_player(&self.state, dir, distance);
        }
    }

    /// Try to buy a turret.  Returns whether the purchase went through.
    pub fn on_place_turret_requested(&mut self) -> bool {
        if self.state.status != GameStatus::Playing {
            return false;
        }
        match compute::place_turret(&self.state, &self.config) {
            Some(next) => {
                self.state = next;
                info!(
                    turrets = self.state.turrets.len(),
                    score = self.state.score,
                    "turret placed"
                );
                true
            }
            None => {
                debug!(
                    score = self.state.score,
                    turrets = self.state.turrets.len(),
                    "turret purchase rejected"
                );
                false
            }
        }
    }

    pub fn on_pause_toggle(&mut self) {
        self.state.status = match self.state.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            GameStatus::GameOver => GameStatus::GameOver,
        };
        debug!(status = ?self.state.status, "pause toggled");
    }

    /// Throw the session away and start a fresh one with the same config.
    pub fn on_restart(&mut self) {
        self.state = compute::init_state(&self.config);
        self.banners.clear();
        if let Some(seq) = self.sequencer.as_mut() {
            seq.reset();
        }
        self.arm_session();
        info!("session restarted");
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn elapsed(&self) -> Duration {
        self.state.elapsed
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn scheduler(&self) -> &Scheduler<TimerKind> {
        &self.scheduler
    }

    pub fn wave_phase(&self) -> Option<WavePhase> {
        self.sequencer.as_ref().map(|s| s.phase())
    }

    pub fn stage_index(&self) -> usize {
        self.sequencer.as_ref().map_or(0, |s| s.stage_index())
    }

    pub fn wave_index(&self) -> usize {
        self.sequencer.as_ref().map_or(0, |s| s.wave_index())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            banners: self.banners.clone(),
            wave_phase: self.wave_phase(),
            stage_index: self.stage_index(),
            wave_index: self.wave_index(),
            turret_limit: self.config.turret_limit,
            turret_cost: self.config.turret_cost,
        }
    }

    /// Direct access for tests that need to stage a scenario.
    #[doc(hidden)]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
