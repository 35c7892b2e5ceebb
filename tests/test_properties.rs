use proptest::prelude::*;

use arcade_shooter::compute::*;
use arcade_shooter::config::HitPolicy;
use arcade_shooter::entities::*;
use arcade_shooter::GameConfig;

fn fresh() -> GameState {
    init_state(&GameConfig::default())
}

#[derive(Clone, Debug)]
enum Step {
    Held { left: bool, right: bool },
    Nudge(Direction),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (any::<bool>(), any::<bool>()).prop_map(|(left, right)| Step::Held { left, right }),
        Just(Step::Nudge(Direction::Left)),
        Just(Step::Nudge(Direction::Right)),
    ]
}

fn bullet() -> impl Strategy<Value = (f32, f32, f32, f32)> {
    (-50.0f32..410.0, -50.0f32..700.0, -6.0f32..6.0, -6.0f32..6.0)
}

fn enemy() -> impl Strategy<Value = (f32, f32, u32, bool)> {
    (0.0f32..340.0, 0.0f32..300.0, 1u32..4, any::<bool>())
}

fn populate(
    state: &mut GameState,
    bullets: &[(f32, f32, f32, f32)],
    enemies: &[(f32, f32, u32, bool)],
) {
    for &(x, y, dx, dy) in bullets {
        let id = state.alloc_id();
        state.bullets.push(Bullet {
            id,
            x,
            y,
            dx,
            dy,
            source: BulletSource::Player,
        });
    }
    for &(x, y, hp, boss) in enemies {
        let id = state.alloc_id();
        let kind = if boss {
            EnemyKind::Boss(BossKind::Small)
        } else {
            EnemyKind::Normal
        };
        state.enemies.push(Enemy { id, x, y, hp, kind });
    }
}

proptest! {
    #[test]
    fn player_never_leaves_arena(steps in prop::collection::vec(step(), 0..200)) {
        let config = GameConfig::default();
        let mut s = fresh();
        for st in steps {
            s = match st {
                Step::Held { left, right } => apply_held_input(&s, left, right),
                Step::Nudge(dir) => {
                    let distance = s.player.speed * config.nudge_multiplier;
                    move_player(&s, dir, distance)
                }
            };
            prop_assert!(s.player.x >= 0.0);
            prop_assert!(s.player.x <= s.arena.width - s.player.size);
        }
    }

    #[test]
    fn motion_keeps_only_in_arena_bullets(bullets in prop::collection::vec(bullet(), 0..40)) {
        let config = GameConfig::default();
        let mut s = fresh();
        populate(&mut s, &bullets, &[]);

        let next = advance_motion(&s, &config);
        for b in &next.bullets {
            prop_assert!(bullet_in_arena(b, &next.arena));
        }
        let expected = s
            .bullets
            .iter()
            .filter(|b| {
                let moved = Bullet { x: b.x + b.dx, y: b.y + b.dy, ..(*b).clone() };
                bullet_in_arena(&moved, &s.arena)
            })
            .count();
        prop_assert_eq!(next.bullets.len(), expected);
    }

    #[test]
    fn score_rises_ten_per_kill(
        bullets in prop::collection::vec(bullet(), 0..40),
        enemies in prop::collection::vec(enemy(), 0..15),
        multi in any::<bool>(),
    ) {
        let policy = if multi { HitPolicy::MultiTarget } else { HitPolicy::SingleTarget };
        let mut s = fresh();
        populate(&mut s, &bullets, &enemies);

        let next = resolve_collisions(&s, policy);
        let killed = (s.enemies.len() - next.enemies.len()) as u32;
        prop_assert_eq!(next.score, s.score + killed * 10);
        prop_assert!(next.enemies.iter().all(|e| e.hp > 0));
    }

    #[test]
    fn single_target_bullet_costs_exactly_one_hp(
        bullets in prop::collection::vec(bullet(), 0..40),
        enemies in prop::collection::vec(enemy(), 0..15),
    ) {
        let mut s = fresh();
        populate(&mut s, &bullets, &enemies);

        let next = resolve_collisions(&s, HitPolicy::SingleTarget);
        let consumed = s.bullets.len() - next.bullets.len();

        let hp_before: u32 = s.enemies.iter().map(|e| e.hp).sum();
        let hp_after: u32 = next.enemies.iter().map(|e| e.hp).sum();
        prop_assert_eq!((hp_before - hp_after) as usize, consumed);
    }

    #[test]
    fn multi_target_drains_at_least_as_much(
        bullets in prop::collection::vec(bullet(), 0..40),
        enemies in prop::collection::vec(enemy(), 0..15),
    ) {
        let mut s = fresh();
        populate(&mut s, &bullets, &enemies);

        let single = resolve_collisions(&s, HitPolicy::SingleTarget);
        let multi = resolve_collisions(&s, HitPolicy::MultiTarget);

        let single_hp: u32 = single.enemies.iter().map(|e| e.hp).sum();
        let multi_hp: u32 = multi.enemies.iter().map(|e| e.hp).sum();
        prop_assert!(multi_hp <= single_hp);
    }

    #[test]
    fn tick_never_revives_a_finished_game(
        enemies in prop::collection::vec(enemy(), 0..15),
        left in any::<bool>(),
        right in any::<bool>(),
    ) {
        let config = GameConfig::default();
        let mut s = fresh();
        populate(&mut s, &[], &enemies);
        s.status = GameStatus::GameOver;

        let next = tick(&s, left, right, &config);
        prop_assert_eq!(next, s);
    }
}
