//! Enemy spawning.  Like `compute`, each function returns a new state; the
//! RNG is injected so tests can seed it.

use rand::Rng;
use tracing::debug;

use crate::constants::{
    ENEMY_SIZE, GROUP_CENTER_MIN, GROUP_CENTER_SPREAD, GROUP_JITTER, GROUP_ROW_HEIGHT,
    GROUP_ROW_LEN, GROUP_SIZE_MAX, GROUP_SIZE_MIN, GROUP_SPACING,
};
use crate::entities::{BossKind, Enemy, EnemyKind, GameState};

/// Spawn one normal enemy just above the arena at a random lane.  An empty
/// lane table spawns nothing.
pub fn spawn_lane_enemy(
    state: &GameState,
    lanes: &[f32],
    hp_min: u32,
    hp_max: u32,
    rng: &mut impl Rng,
) -> GameState {
    if lanes.is_empty() {
        return state.clone();
    }
    let x = lanes[rng.gen_range(0..lanes.len())];
    let hp = rng.gen_range(hp_min..=hp_max.max(hp_min));

    let mut next = state.clone();
    let id = next.alloc_id();
    next.enemies.push(Enemy {
        id,
        x,
        y: -ENEMY_SIZE,
        hp,
        kind: EnemyKind::Normal,
    });
    debug!(id, x, hp, "lane enemy spawned");
    next
}

/// How many enemies the next group holds.
pub fn roll_group_size(rng: &mut impl Rng) -> usize {
    rng.gen_range(GROUP_SIZE_MIN..=GROUP_SIZE_MAX)
}

/// Spawn a cluster of `count` enemies around a random centre, in rows of
/// ten stacked upward above the arena.
pub fn spawn_group(state: &GameState, count: usize, hp: u32, rng: &mut impl Rng) -> GameState {
    let center_x = GROUP_CENTER_MIN + rng.gen::<f32>() * GROUP_CENTER_SPREAD;
    let half_row = (GROUP_ROW_LEN as f32 - 1.0) * GROUP_SPACING / 2.0;

    let mut next = state.clone();
    for i in 0..count {
        let offset = (i % GROUP_ROW_LEN) as f32 * GROUP_SPACING - half_row
            + rng.gen::<f32>() * GROUP_JITTER;
        let row = (i / GROUP_ROW_LEN) as f32;
        let id = next.alloc_id();
        next.enemies.push(Enemy {
            id,
            x: center_x + offset,
            y: -GROUP_ROW_HEIGHT * row,
            hp,
            kind: EnemyKind::Normal,
        });
    }
    debug!(count, hp, center_x, "enemy group spawned");
    next
}

/// Spawn a boss centred horizontally, just above the arena.
pub fn spawn_boss(state: &GameState, kind: BossKind) -> GameState {
    let size = kind.size();
    let mut next = state.clone();
    let id = next.alloc_id();
    next.enemies.push(Enemy {
        id,
        x: state.arena.width / 2.0 - size / 2.0,
        y: -size,
        hp: kind.hp(),
        kind: EnemyKind::Boss(kind),
    });
    debug!(id, ?kind, "boss spawned");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::init_state;
    use crate::config::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn group_rows_hold_ten() {
        let state = init_state(&GameConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let next = spawn_group(&state, 15, 2, &mut rng);

        assert_eq!(next.enemies.len(), 15);
        assert!(next.enemies[..10].iter().all(|e| e.y == 0.0));
        assert!(next.enemies[10..].iter().all(|e| e.y == -GROUP_ROW_HEIGHT));
        assert!(next.enemies.iter().all(|e| e.hp == 2));
    }

    #[test]
    fn group_members_stay_near_centre() {
        let state = init_state(&GameConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let next = spawn_group(&state, 19, 1, &mut rng);

        let min = next.enemies.iter().map(|e| e.x).fold(f32::INFINITY, f32::min);
        let max = next.enemies.iter().map(|e| e.x).fold(f32::NEG_INFINITY, f32::max);
        assert!(min >= GROUP_CENTER_MIN - 45.0);
        assert!(max <= GROUP_CENTER_MIN + GROUP_CENTER_SPREAD + 45.0 + GROUP_JITTER);
    }

    #[test]
    fn group_size_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let n = roll_group_size(&mut rng);
            assert!((GROUP_SIZE_MIN..=GROUP_SIZE_MAX).contains(&n));
        }
    }

    #[test]
    fn boss_is_centred_above_arena() {
        let state = init_state(&GameConfig::default());
        let next = spawn_boss(&state, BossKind::Big);
        let boss = &next.enemies[0];

        assert_eq!(boss.kind, EnemyKind::Boss(BossKind::Big));
        assert_eq!(boss.hp, 40);
        assert_eq!(boss.x, 140.0);
        assert_eq!(boss.y, -80.0);
    }

    #[test]
    fn lane_enemy_uses_a_lane() {
        let state = init_state(&GameConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        let lanes = [20.0, 90.0];
        let next = spawn_lane_enemy(&state, &lanes, 1, 3, &mut rng);

        let e = &next.enemies[0];
        assert!(lanes.contains(&e.x));
        assert!((1..=3).contains(&e.hp));
        assert_eq!(e.y, -ENEMY_SIZE);
    }

    #[test]
    fn empty_lane_table_is_a_no_op() {
        let state = init_state(&GameConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(spawn_lane_enemy(&state, &[], 1, 3, &mut rng), state);
    }
}
