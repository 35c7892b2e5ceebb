//! All game entity types.  Pure data, no logic beyond kind lookups.

use std::time::Duration;

use serde::Deserialize;

use crate::constants::ENEMY_SIZE;

pub type EntityId = u64;

// ── Enemy kinds ───────────────────────────────────────────────────────────────

/// Boss tiers.  Size and hit points are fixed per tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossKind {
    /// Fallback for a boss entry that names no tier.
    Basic,
    Small,
    Mid,
    Big,
}

impl BossKind {
    pub fn size(self) -> f32 {
        match self {
            BossKind::Basic => 20.0,
            BossKind::Small => 40.0,
            BossKind::Mid => 60.0,
            BossKind::Big => 80.0,
        }
    }

    pub fn hp(self) -> u32 {
        match self {
            BossKind::Basic => 5,
            BossKind::Small => 10,
            BossKind::Mid => 20,
            BossKind::Big => 40,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Normal,
    Boss(BossKind),
}

impl EnemyKind {
    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Normal => ENEMY_SIZE,
            EnemyKind::Boss(kind) => kind.size(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletSource {
    Player,
    Turret,
}

/// A projectile.  Collision treats it as the point `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    /// Per-frame velocity.
    pub dx: f32,
    pub dy: f32,
    pub source: BulletSource,
}

// ── Player, enemies, turrets ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
}

/// Enemies are axis-aligned squares anchored at their top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub hp: u32,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn size(&self) -> f32 {
        self.kind.size()
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Turret {
    pub x: f32,
    pub y: f32,
    pub ammo: u32,
    /// Frames until the next volley; fires when it reaches zero.
    pub cooldown: u32,
}

// ── Stage table ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WaveSpec {
    pub groups: u32,
    pub enemy_hp: u32,
    #[serde(default)]
    pub boss: Option<BossKind>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Stage {
    pub waves: Vec<WaveSpec>,
}

// ── Banners ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    /// Stage and wave numbers are 1-based.
    WaveIncoming { stage: u32, wave: u32 },
    ThreatApproaching,
    AllStagesCleared,
}

impl BannerKind {
    pub fn text(self) -> String {
        match self {
            BannerKind::WaveIncoming { stage, wave } => {
                format!("Enemy formation incoming!  Stage {} - Wave {}", stage, wave)
            }
            BannerKind::ThreatApproaching => "Threat approaching".to_string(),
            BannerKind::AllStagesCleared => "All stages cleared".to_string(),
        }
    }
}

/// A transient notification shown until `remaining` runs out.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub remaining: Duration,
}

impl Banner {
    pub fn new(kind: BannerKind, duration: Duration) -> Self {
        Banner {
            kind,
            text: kind.text(),
            remaining: duration,
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

/// The entire entity state of one session.  Cloneable so the pure update
/// functions in `compute` can return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub turrets: Vec<Turret>,
    pub score: u32,
    pub status: GameStatus,
    pub frame: u64,
    /// Play time; does not advance while paused or after game over.
    pub elapsed: Duration,
    pub arena: Arena,
    /// Next id handed out to a bullet or enemy.
    pub next_id: EntityId,
}

impl GameState {
    pub fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
