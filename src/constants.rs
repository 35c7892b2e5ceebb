//! Compile-time defaults for every tunable.  `GameConfig::default()` reads
//! from here; a TOML file can override any subset at startup.

// ── Arena ─────────────────────────────────────────────────────────────────────

pub const ARENA_WIDTH: f32 = 360.0;
pub const ARENA_HEIGHT: f32 = 640.0;

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_START_X: f32 = 160.0;
pub const PLAYER_START_Y: f32 = 580.0;
pub const PLAYER_SIZE: f32 = 20.0;
/// Units per frame while a direction is held.
pub const PLAYER_SPEED: f32 = 4.0;
/// A discrete nudge moves this many frames' worth of `PLAYER_SPEED`.
pub const NUDGE_MULTIPLIER: f32 = 3.0;

// ── Bullets ───────────────────────────────────────────────────────────────────

pub const BULLET_DX: f32 = 0.0;
pub const BULLET_DY: f32 = -5.0;
/// Bullets may drift this far past the top/left edge before they are pruned.
pub const BULLET_MARGIN: f32 = 10.0;
pub const AUTO_FIRE_INTERVAL_MS: u64 = 150;

// ── Enemies ───────────────────────────────────────────────────────────────────

pub const ENEMY_SIZE: f32 = 20.0;
/// Units per frame, identical for every enemy.
pub const ENEMY_DESCENT_SPEED: f32 = 1.0;
pub const SCORE_PER_KILL: u32 = 10;

// ── Lane spawner ──────────────────────────────────────────────────────────────

pub const LANE_XS: [f32; 5] = [20.0, 90.0, 170.0, 250.0, 320.0];
pub const LANE_SPAWN_INTERVAL_MS: u64 = 1000;
pub const LANE_HP_MIN: u32 = 1;
pub const LANE_HP_MAX: u32 = 3;

// ── Wave sequencer ────────────────────────────────────────────────────────────

pub const GROUP_SIZE_MIN: usize = 10;
pub const GROUP_SIZE_MAX: usize = 19;
pub const GROUP_ROW_LEN: usize = 10;
pub const GROUP_SPACING: f32 = 10.0;
pub const GROUP_CENTER_MIN: f32 = 40.0;
pub const GROUP_CENTER_SPREAD: f32 = 240.0;
pub const GROUP_JITTER: f32 = 5.0;
pub const GROUP_ROW_HEIGHT: f32 = 20.0;

pub const GROUP_INTERVAL_MS: u64 = 1500;
pub const BOSS_DELAY_MS: u64 = 1500;
pub const WAVE_COOLDOWN_MS: u64 = 2000;
pub const BANNER_DURATION_MS: u64 = 2000;

// ── Turrets ───────────────────────────────────────────────────────────────────

pub const TURRET_COST: u32 = 500;
pub const TURRET_LIMIT: usize = 4;
pub const TURRET_AMMO: u32 = 1000;
/// Frames between volleys.
pub const TURRET_COOLDOWN: u32 = 20;
pub const TURRET_SIZE: f32 = 10.0;
pub const TURRET_BULLET_DX: f32 = 2.0;
pub const TURRET_BULLET_DY: f32 = -4.0;
pub const TURRET_LEFT_X: f32 = 40.0;
/// Right-hand slots sit this far in from the right edge.
pub const TURRET_RIGHT_INSET: f32 = 50.0;
/// The first row of slots sits this far above the bottom edge.
pub const TURRET_BASE_INSET: f32 = 100.0;
pub const TURRET_ROW_SPACING: f32 = 40.0;
