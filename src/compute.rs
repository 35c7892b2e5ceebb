//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameState` and returns a brand-new `GameState`.  No randomness lives
//! here; spawning (the only random part) is in `spawner`.

use crate::config::{BreachRule, GameConfig, HitPolicy};
use crate::constants::{
    BULLET_MARGIN, SCORE_PER_KILL, TURRET_BASE_INSET, TURRET_BULLET_DX, TURRET_BULLET_DY,
    TURRET_LEFT_X, TURRET_RIGHT_INSET, TURRET_ROW_SPACING,
};
use crate::entities::{
    Arena, Bullet, BulletSource, Direction, Enemy, GameState, GameStatus, Player, Turret,
};

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial state of a session.
pub fn init_state(config: &GameConfig) -> GameState {
    let arena = Arena {
        width: config.arena_width,
        height: config.arena_height,
    };
    let player = Player {
        x: config.player_start_x,
        y: config.player_start_y,
        size: config.player_size,
        speed: config.player_speed,
    };
    GameState {
        player: clamp_player(player, &arena),
        bullets: Vec::new(),
        enemies: Vec::new(),
        turrets: Vec::new(),
        score: 0,
        status: GameStatus::Playing,
        frame: 0,
        elapsed: std::time::Duration::ZERO,
        arena,
        next_id: 0,
    }
}

fn clamp_player(player: Player, arena: &Arena) -> Player {
    let max_x = (arena.width - player.size).max(0.0);
    Player {
        x: player.x.clamp(0.0, max_x),
        ..player
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Shift the player horizontally by `distance` in `dir`, clamped to the arena.
pub fn move_player(state: &GameState, dir: Direction, distance: f32) -> GameState {
    let dx = match dir {
        Direction::Left => -distance,
        Direction::Right => distance,
    };
    let player = Player {
        x: state.player.x + dx,
        ..state.player.clone()
    };
    GameState {
        player: clamp_player(player, &state.arena),
        ..state.clone()
    }
}

/// Apply one frame of held direction keys.  Holding both cancels out.
pub fn apply_held_input(state: &GameState, left: bool, right: bool) -> GameState {
    match (left, right) {
        (true, false) => move_player(state, Direction::Left, state.player.speed),
        (false, true) => move_player(state, Direction::Right, state.player.speed),
        _ => state.clone(),
    }
}

/// Fire a bullet straight up from the centre of the player's top edge.
pub fn player_shoot(state: &GameState, config: &GameConfig) -> GameState {
    let mut next = state.clone();
    let id = next.alloc_id();
    next.bullets.push(Bullet {
        id,
        x: state.player.x + state.player.size / 2.0,
        y: state.player.y,
        dx: config.bullet_dx,
        dy: config.bullet_dy,
        source: BulletSource::Player,
    });
    next
}

/// Where turret number `index` goes.  Slots alternate left/right and stack
/// upward in pairs.
pub fn turret_slot(arena: &Arena, index: usize) -> (f32, f32) {
    let x = if index % 2 == 0 {
        TURRET_LEFT_X
    } else {
        arena.width - TURRET_RIGHT_INSET
    };
    let y = arena.height - TURRET_BASE_INSET - (index / 2) as f32 * TURRET_ROW_SPACING;
    (x, y)
}

/// Buy a turret.  Returns `None` when the score cannot cover the cost or the
/// turret limit is reached; the score is only charged on success.
pub fn place_turret(state: &GameState, config: &GameConfig) -> Option<GameState> {
    if state.turrets.len() >= config.turret_limit {
        return None;
    }
    let score = state.score.checked_sub(config.turret_cost)?;
    let (x, y) = turret_slot(&state.arena, state.turrets.len());

    let mut turrets = state.turrets.clone();
    turrets.push(Turret {
        x,
        y,
        ammo: config.turret_ammo,
        cooldown: 0,
    });
    Some(GameState {
        turrets,
        score,
        ..state.clone()
    })
}

// ── Physics ──────────────────────────────────────────────────────────────────

pub fn bullet_in_arena(bullet: &Bullet, arena: &Arena) -> bool {
    bullet.y > -BULLET_MARGIN
        && bullet.y < arena.height
        && bullet.x > -BULLET_MARGIN
        && bullet.x < arena.width
}

/// Move bullets and enemies one frame.  Bullets that leave the arena are
/// dropped; so are enemies that have fallen completely below it.
pub fn advance_motion(state: &GameState, config: &GameConfig) -> GameState {
    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .map(|b| Bullet {
            x: b.x + b.dx,
            y: b.y + b.dy,
            ..b.clone()
        })
        .filter(|b| bullet_in_arena(b, &state.arena))
        .collect();

    let enemies: Vec<Enemy> = state
        .enemies
        .iter()
        .map(|e| Enemy {
            y: e.y + config.enemy_descent_speed,
            ..e.clone()
        })
        .filter(|e| e.y <= state.arena.height)
        .collect();

    GameState {
        bullets,
        enemies,
        ..state.clone()
    }
}

/// Tick every turret's cooldown and let the ready ones fire a two-bullet
/// spread.  A turret with no ammo left stays on the field but never fires.
pub fn fire_turrets(state: &GameState, config: &GameConfig) -> GameState {
    let mut next = state.clone();
    let mut volley: Vec<(f32, f32)> = Vec::new();

    for turret in next.turrets.iter_mut() {
        turret.cooldown = turret.cooldown.saturating_sub(1);
        if turret.ammo > 0 && turret.cooldown == 0 {
            volley.push((turret.x, turret.y));
            turret.cooldown = config.turret_cooldown;
            turret.ammo -= 1;
        }
    }

    for (x, y) in volley {
        for dx in [-TURRET_BULLET_DX, TURRET_BULLET_DX] {
            let id = next.alloc_id();
            next.bullets.push(Bullet {
                id,
                x,
                y,
                dx,
                dy: TURRET_BULLET_DY,
                source: BulletSource::Turret,
            });
        }
    }
    next
}

// ── Collision ────────────────────────────────────────────────────────────────

/// Strict interior test: a bullet sitting exactly on an enemy's edge misses.
pub fn bullet_hits(bullet: &Bullet, enemy: &Enemy) -> bool {
    let size = enemy.size();
    bullet.x > enemy.x
        && bullet.x < enemy.x + size
        && bullet.y > enemy.y
        && bullet.y < enemy.y + size
}

/// Resolve every bullet against every enemy.  Each hit costs the enemy
/// exactly one hp and consumes the bullet.  Under `SingleTarget` a bullet
/// stops at its first hit; under `MultiTarget` it keeps going through the
/// rest of the enemy list.  Enemies already destroyed this frame are skipped,
/// so each kill is scored once.
pub fn resolve_collisions(state: &GameState, policy: HitPolicy) -> GameState {
    let mut enemies = state.enemies.clone();
    let mut consumed = vec![false; state.bullets.len()];

    for (bi, bullet) in state.bullets.iter().enumerate() {
        for enemy in enemies.iter_mut() {
            if enemy.hp == 0 || !bullet_hits(bullet, enemy) {
                continue;
            }
            enemy.hp -= 1;
            consumed[bi] = true;
            if policy == HitPolicy::SingleTarget {
                break;
            }
        }
    }

    let kills = state
        .enemies
        .iter()
        .zip(&enemies)
        .filter(|(before, after)| before.hp > 0 && after.hp == 0)
        .count() as u32;

    let enemies: Vec<Enemy> = enemies.into_iter().filter(|e| e.hp > 0).collect();
    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .zip(&consumed)
        .filter(|&(_, used)| !*used)
        .map(|(b, _)| b.clone())
        .collect();

    GameState {
        enemies,
        bullets,
        score: state.score + kills * SCORE_PER_KILL,
        ..state.clone()
    }
}

/// True when an enemy has reached the player's row under `rule`.  The
/// vertical test is edge-inclusive.  `Overlapping` needs a full rectangle
/// overlap, so an enemy already below the player never counts.
pub fn breach_detected(state: &GameState, rule: BreachRule) -> bool {
    let p = &state.player;
    state.enemies.iter().any(|e| {
        let size = e.size();
        let reached_row = e.y + size >= p.y;
        match rule {
            BreachRule::AnyColumn => reached_row,
            BreachRule::Overlapping => {
                reached_row
                    && e.y <= p.y + p.size
                    && e.x <= p.x + p.size
                    && e.x + size >= p.x
            }
        }
    })
}

// ── Per-frame tick ──────────────────────────────────────────────────────────

/// Advance the simulation by one frame: held input, motion, collisions,
/// breach check, turret fire.  A breach flips the status to `GameOver`.
/// Non-playing states come back unchanged.
pub fn tick(state: &GameState, left: bool, right: bool, config: &GameConfig) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }

    let state = apply_held_input(state, left, right);
    let state = advance_motion(&state, config);
    let state = resolve_collisions(&state, config.hit_policy);

    let status = if breach_detected(&state, config.breach_rule) {
        GameStatus::GameOver
    } else {
        GameStatus::Playing
    };

    let state = fire_turrets(&state, config);
    GameState {
        status,
        frame: state.frame + 1,
        ..state
    }
}
