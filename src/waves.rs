//! Wave/stage sequencer.
//!
//! The sequencer walks the stage table one wave at a time:
//!
//! ```text
//! Idle ──start──▶ SpawningGroups ──groups done──▶ WaitingForBossDelay ──▶ WaveActive
//!   ▲                    │                                                  │
//!   │                    └──────────────── no boss ─────────────────────────┤
//!   └──────────── cooldown ◀──────────── field cleared ◀────────────────────┘
//! ```
//!
//! It owns no entities and no timers.  Every operation returns the
//! [`WaveAction`]s the session must carry out, which keeps the state machine
//! testable on its own.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::{ExhaustionPolicy, GameConfig};
use crate::entities::{BannerKind, BossKind, Stage, WaveSpec};
use crate::scheduler::{Repeat, TimerKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    Idle,
    SpawningGroups { spawned: u32 },
    WaitingForBossDelay,
    WaveActive,
    /// The stage table ran out under [`ExhaustionPolicy::Halt`].
    StageExhausted,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WaveAction {
    SpawnGroup { hp: u32 },
    SpawnBoss(BossKind),
    Arm(TimerKind, Duration, Repeat),
    Cancel(TimerKind),
    Announce(BannerKind),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveTiming {
    pub group_interval: Duration,
    pub boss_delay: Duration,
    pub cooldown: Duration,
}

impl WaveTiming {
    pub fn from_config(config: &GameConfig) -> Self {
        WaveTiming {
            group_interval: config.group_interval(),
            boss_delay: config.boss_delay(),
            cooldown: config.wave_cooldown(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WaveSequencer {
    stages: Vec<Stage>,
    timing: WaveTiming,
    exhaustion: ExhaustionPolicy,
    stage: usize,
    wave: usize,
    phase: WavePhase,
}

impl WaveSequencer {
    pub fn new(stages: Vec<Stage>, timing: WaveTiming, exhaustion: ExhaustionPolicy) -> Self {
        WaveSequencer {
            stages,
            timing,
            exhaustion,
            stage: 0,
            wave: 0,
            phase: WavePhase::Idle,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.stages.clone(),
            WaveTiming::from_config(config),
            config.exhaustion,
        )
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn stage_index(&self) -> usize {
        self.stage
    }

    pub fn wave_index(&self) -> usize {
        self.wave
    }

    pub fn current_wave(&self) -> Option<&WaveSpec> {
        self.stages.get(self.stage)?.waves.get(self.wave)
    }

    /// Back to the first wave of the first stage.
    pub fn reset(&mut self) {
        self.stage = 0;
        self.wave = 0;
        self.phase = WavePhase::Idle;
    }

    /// Begin the next wave.  When the current stage has no waves left the
    /// sequencer rolls over into the next stage and starts its first wave;
    /// past the last stage the exhaustion policy decides.  Ignored unless
    /// idle, so only one wave sequence can ever be running.
    pub fn start_next_wave(&mut self) -> Vec<WaveAction> {
        if self.phase != WavePhase::Idle {
            debug!(phase = ?self.phase, "wave start ignored");
            return Vec::new();
        }

        // Each stage is visited at most once per call, which also bounds
        // the search when every stage is empty.
        let mut hops = 0;
        while self.current_wave().is_none() {
            if hops > self.stages.len() {
                return self.exhaust();
            }
            hops += 1;
            self.stage += 1;
            self.wave = 0;
            if self.stage >= self.stages.len() {
                match self.exhaustion {
                    ExhaustionPolicy::Halt => return self.exhaust(),
                    ExhaustionPolicy::Loop => {
                        info!("stage table exhausted, looping to stage 1");
                        self.stage = 0;
                    }
                }
            }
        }

        self.phase = WavePhase::SpawningGroups { spawned: 0 };
        let banner = BannerKind::WaveIncoming {
            stage: self.stage as u32 + 1,
            wave: self.wave as u32 + 1,
        };
        info!(stage = self.stage + 1, wave = self.wave + 1, "wave started");
        vec![
            WaveAction::Announce(banner),
            WaveAction::Arm(
                TimerKind::GroupSpawn,
                self.timing.group_interval,
                Repeat::Every,
            ),
        ]
    }

    fn exhaust(&mut self) -> Vec<WaveAction> {
        info!("stage table exhausted, no more waves");
        self.phase = WavePhase::StageExhausted;
        vec![WaveAction::Announce(BannerKind::AllStagesCleared)]
    }

    /// Group timer fired.  Spawns groups until the wave's count is reached;
    /// the tick after that stops the timer and moves on to the boss (if any).
    pub fn on_group_tick(&mut self) -> Vec<WaveAction> {
        let WavePhase::SpawningGroups { spawned } = self.phase else {
            return Vec::new();
        };
        let Some(spec) = self.current_wave().cloned() else {
            self.phase = WavePhase::WaveActive;
            return vec![WaveAction::Cancel(TimerKind::GroupSpawn)];
        };

        if spawned < spec.groups {
            self.phase = WavePhase::SpawningGroups {
                spawned: spawned + 1,
            };
            return vec![WaveAction::SpawnGroup { hp: spec.enemy_hp }];
        }

        match spec.boss {
            Some(_) => {
                self.phase = WavePhase::WaitingForBossDelay;
                vec![
                    WaveAction::Cancel(TimerKind::GroupSpawn),
                    WaveAction::Arm(TimerKind::BossDelay, self.timing.boss_delay, Repeat::Once),
                ]
            }
            None => {
                self.phase = WavePhase::WaveActive;
                vec![WaveAction::Cancel(TimerKind::GroupSpawn)]
            }
        }
    }

    /// Boss delay expired: bring in the boss and announce it.
    pub fn on_boss_delay(&mut self) -> Vec<WaveAction> {
        if self.phase != WavePhase::WaitingForBossDelay {
            return Vec::new();
        }
        self.phase = WavePhase::WaveActive;
        match self.current_wave().and_then(|w| w.boss) {
            Some(kind) => vec![
                WaveAction::SpawnBoss(kind),
                WaveAction::Announce(BannerKind::ThreatApproaching),
            ],
            None => Vec::new(),
        }
    }

    /// Per-frame check.  Once an active wave's enemies are all gone the
    /// sequencer advances and arms the cooldown before the next wave.
    pub fn on_frame(&mut self, enemies_remaining: usize) -> Vec<WaveAction> {
        if self.phase != WavePhase::WaveActive || enemies_remaining > 0 {
            return Vec::new();
        }
        debug!(stage = self.stage + 1, wave = self.wave + 1, "wave cleared");
        self.wave += 1;
        self.phase = WavePhase::Idle;
        vec![WaveAction::Arm(
            TimerKind::WaveCooldown,
            self.timing.cooldown,
            Repeat::Once,
        )]
    }

    /// Cooldown expired.
    pub fn on_cooldown(&mut self) -> Vec<WaveAction> {
        self.start_next_wave()
    }
}
