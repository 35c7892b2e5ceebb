//! Runtime configuration.
//!
//! [`GameConfig`] mirrors every constant in [`crate::constants`] plus the
//! stage table and the rule policies.  `GameConfig::default()` is the built-in
//! game; [`GameConfig::load`] reads a TOML file where any subset of keys may be
//! present and missing keys fall back to the defaults:
//!
//! ```toml
//! spawn_policy = "lanes"
//! hit_policy = "multi_target"
//! turret_cost = 300
//!
//! [[stages]]
//! waves = [
//!     { groups = 2, enemy_hp = 1 },
//!     { groups = 3, enemy_hp = 2, boss = "mid" },
//! ]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::constants::*;
use crate::entities::{BossKind, Stage, WaveSpec};
use crate::error::ConfigError;

// ── Policies ──────────────────────────────────────────────────────────────────

/// Where enemies come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// One enemy per fixed interval at a random lane.
    Lanes,
    /// Staged waves of enemy groups and bosses.
    #[default]
    Waves,
}

/// How many enemies a single bullet may damage in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPolicy {
    /// A bullet is spent on the first enemy it overlaps.
    #[default]
    SingleTarget,
    /// A bullet damages every enemy it overlaps in the frame it lands.
    MultiTarget,
}

/// What counts as an enemy reaching the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachRule {
    /// Any enemy whose bottom edge reaches the player's row.
    #[default]
    AnyColumn,
    /// The enemy must also overlap the player horizontally.
    Overlapping,
}

/// What the wave sequencer does after the last wave of the last stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Stop spawning; the session continues until game over or restart.
    #[default]
    Halt,
    /// Start again from the first stage.
    Loop,
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Arena ─────────────────────────────────────────────────────────────────
    pub arena_width: f32,
    pub arena_height: f32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player_start_x: f32,
    pub player_start_y: f32,
    pub player_size: f32,
    pub player_speed: f32,
    pub nudge_multiplier: f32,

    // ── Bullets ───────────────────────────────────────────────────────────────
    pub bullet_dx: f32,
    pub bullet_dy: f32,
    pub auto_fire_interval_ms: u64,

    // ── Enemies ───────────────────────────────────────────────────────────────
    pub enemy_descent_speed: f32,

    // ── Rules ─────────────────────────────────────────────────────────────────
    pub spawn_policy: SpawnPolicy,
    pub hit_policy: HitPolicy,
    pub breach_rule: BreachRule,
    pub exhaustion: ExhaustionPolicy,

    // ── Lane spawner ──────────────────────────────────────────────────────────
    pub lane_xs: Vec<f32>,
    pub lane_spawn_interval_ms: u64,
    pub lane_hp_min: u32,
    pub lane_hp_max: u32,

    // ── Wave sequencer ────────────────────────────────────────────────────────
    pub group_interval_ms: u64,
    pub boss_delay_ms: u64,
    pub wave_cooldown_ms: u64,
    pub banner_duration_ms: u64,
    pub stages: Vec<Stage>,

    // ── Turrets ───────────────────────────────────────────────────────────────
    pub turret_cost: u32,
    pub turret_limit: usize,
    pub turret_ammo: u32,
    pub turret_cooldown: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            player_start_x: PLAYER_START_X,
            player_start_y: PLAYER_START_Y,
            player_size: PLAYER_SIZE,
            player_speed: PLAYER_SPEED,
            nudge_multiplier: NUDGE_MULTIPLIER,
            bullet_dx: BULLET_DX,
            bullet_dy: BULLET_DY,
            auto_fire_interval_ms: AUTO_FIRE_INTERVAL_MS,
            enemy_descent_speed: ENEMY_DESCENT_SPEED,
            spawn_policy: SpawnPolicy::default(),
            hit_policy: HitPolicy::default(),
            breach_rule: BreachRule::default(),
            exhaustion: ExhaustionPolicy::default(),
            lane_xs: LANE_XS.to_vec(),
            lane_spawn_interval_ms: LANE_SPAWN_INTERVAL_MS,
            lane_hp_min: LANE_HP_MIN,
            lane_hp_max: LANE_HP_MAX,
            group_interval_ms: GROUP_INTERVAL_MS,
            boss_delay_ms: BOSS_DELAY_MS,
            wave_cooldown_ms: WAVE_COOLDOWN_MS,
            banner_duration_ms: BANNER_DURATION_MS,
            stages: default_stages(),
            turret_cost: TURRET_COST,
            turret_limit: TURRET_LIMIT,
            turret_ammo: TURRET_AMMO,
            turret_cooldown: TURRET_COOLDOWN,
        }
    }
}

/// The built-in three-stage campaign.
pub fn default_stages() -> Vec<Stage> {
    fn wave(groups: u32, enemy_hp: u32, boss: Option<BossKind>) -> WaveSpec {
        WaveSpec {
            groups,
            enemy_hp,
            boss,
        }
    }

    vec![
        Stage {
            waves: vec![wave(3, 1, None), wave(4, 1, Some(BossKind::Big))],
        },
        Stage {
            waves: vec![wave(4, 2, None), wave(5, 2, Some(BossKind::Big))],
        },
        Stage {
            waves: vec![
                wave(3, 2, None),
                wave(5, 3, Some(BossKind::Small)),
                wave(6, 3, Some(BossKind::Mid)),
            ],
        },
    ]
}

impl GameConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<GameConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<GameConfig, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the scheduler or break the arena geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reals = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("player_start_x", self.player_start_x),
            ("player_start_y", self.player_start_y),
            ("player_size", self.player_size),
            ("player_speed", self.player_speed),
            ("nudge_multiplier", self.nudge_multiplier),
            ("bullet_dx", self.bullet_dx),
            ("bullet_dy", self.bullet_dy),
            ("enemy_descent_speed", self.enemy_descent_speed),
        ];
        for (field, value) in reals {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("{} is not a finite number", value)));
            }
        }
        if let Some(x) = self.lane_xs.iter().find(|x| !x.is_finite()) {
            return Err(ConfigError::invalid("lane_xs", format!("{} is not a finite number", x)));
        }

        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return Err(ConfigError::invalid("arena_width", "arena dimensions must be positive"));
        }
        // A wave only ends once its enemies have left the field.
        if self.enemy_descent_speed <= 0.0 {
            return Err(ConfigError::invalid(
                "enemy_descent_speed",
                "enemies must move down the arena",
            ));
        }
        if self.player_size <= 0.0 || self.player_size > self.arena_width {
            return Err(ConfigError::invalid(
                "player_size",
                format!("must be in (0, {}]", self.arena_width),
            ));
        }

        let periods = [
            ("auto_fire_interval_ms", self.auto_fire_interval_ms),
            ("lane_spawn_interval_ms", self.lane_spawn_interval_ms),
            ("group_interval_ms", self.group_interval_ms),
            ("boss_delay_ms", self.boss_delay_ms),
            ("wave_cooldown_ms", self.wave_cooldown_ms),
            ("banner_duration_ms", self.banner_duration_ms),
        ];
        for (field, ms) in periods {
            if ms == 0 {
                return Err(ConfigError::invalid(field, "timer periods must be non-zero"));
            }
        }

        if self.lane_hp_min == 0 {
            return Err(ConfigError::invalid("lane_hp_min", "enemies need at least 1 hp"));
        }
        if self.lane_hp_min > self.lane_hp_max {
            return Err(ConfigError::invalid(
                "lane_hp_max",
                format!("{} is below lane_hp_min {}", self.lane_hp_max, self.lane_hp_min),
            ));
        }

        for (s, stage) in self.stages.iter().enumerate() {
            if let Some(w) = stage.waves.iter().position(|w| w.enemy_hp == 0) {
                return Err(ConfigError::invalid(
                    "stages",
                    format!("stage {} wave {} has zero enemy_hp", s + 1, w + 1),
                ));
            }
        }
        Ok(())
    }

    pub fn auto_fire_interval(&self) -> Duration {
        Duration::from_millis(self.auto_fire_interval_ms)
    }

    pub fn lane_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.lane_spawn_interval_ms)
    }

    pub fn group_interval(&self) -> Duration {
        Duration::from_millis(self.group_interval_ms)
    }

    pub fn boss_delay(&self) -> Duration {
        Duration::from_millis(self.boss_delay_ms)
    }

    pub fn wave_cooldown(&self) -> Duration {
        Duration::from_millis(self.wave_cooldown_ms)
    }

    pub fn banner_duration(&self) -> Duration {
        Duration::from_millis(self.banner_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("turret_cost = 300\nhit_policy = \"multi_target\"")
            .expect("valid config");
        assert_eq!(config.turret_cost, 300);
        assert_eq!(config.hit_policy, HitPolicy::MultiTarget);
        assert_eq!(config.turret_limit, TURRET_LIMIT);
        assert_eq!(config.stages, default_stages());
    }

    #[test]
    fn stage_table_parses_boss_kinds() {
        let toml = r#"
            [[stages]]
            waves = [
                { groups = 2, enemy_hp = 1 },
                { groups = 3, enemy_hp = 2, boss = "mid" },
            ]
        "#;
        let config = GameConfig::from_toml_str(toml).expect("valid config");
        assert_eq!(config.stages.len(), 1);
        assert_eq!(config.stages[0].waves[0].boss, None);
        assert_eq!(config.stages[0].waves[1].boss, Some(BossKind::Mid));
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = GameConfig::from_toml_str("group_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "group_interval_ms", .. }));
    }

    #[test]
    fn inverted_lane_hp_range_is_rejected() {
        let err = GameConfig::from_toml_str("lane_hp_min = 4\nlane_hp_max = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lane_hp_max", .. }));
    }

    #[test]
    fn zero_hp_wave_is_rejected() {
        let toml = r#"
            [[stages]]
            waves = [{ groups = 1, enemy_hp = 0 }]
        "#;
        assert!(GameConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn non_finite_arena_is_rejected() {
        let config = GameConfig {
            arena_width: f32::NAN,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "arena_width", .. }));

        let config = GameConfig {
            arena_height: f32::INFINITY,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_descent_is_rejected() {
        for speed in ["0.0", "-1.0"] {
            let toml = format!("enemy_descent_speed = {}", speed);
            let err = GameConfig::from_toml_str(&toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "enemy_descent_speed", .. }));
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("turret_cost = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
