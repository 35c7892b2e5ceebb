//! Logical-clock timers.
//!
//! Each concern (autonomous fire, lane spawn, group spawn, ...) owns at most
//! one slot.  Arming a slot that is already armed replaces it, so a restart
//! that re-arms everything can never stack duplicate timer streams.  Time only
//! moves when the owner calls [`Scheduler::advance`], which makes pausing a
//! matter of not advancing.

use std::fmt;
use std::time::Duration;

use tracing::trace;

/// Timer concerns used by the game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AutoFire,
    LaneSpawn,
    GroupSpawn,
    BossDelay,
    WaveCooldown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Every,
}

#[derive(Clone, Debug)]
struct Timer<K> {
    key: K,
    period: Duration,
    remaining: Duration,
    repeat: Repeat,
}

#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    // Insertion order breaks ties between timers expiring at the same instant.
    timers: Vec<Timer<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Scheduler { timers: Vec::new() }
    }
}

impl<K: Copy + Eq + fmt::Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire after `period` (and every `period` thereafter for
    /// [`Repeat::Every`]).  Replaces any timer already armed under `key`.
    pub fn arm(&mut self, key: K, period: Duration, repeat: Repeat) {
        self.timers.retain(|t| t.key != key);
        self.timers.push(Timer {
            key,
            period,
            remaining: period,
            repeat,
        });
    }

    /// Returns whether a timer was armed under `key`.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.key != key);
        self.timers.len() != before
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, key: K) -> bool {
        self.timers.iter().any(|t| t.key == key)
    }

    pub fn armed(&self) -> impl Iterator<Item = K> + '_ {
        self.timers.iter().map(|t| t.key)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Time left until `key` next fires.
    pub fn remaining(&self, key: K) -> Option<Duration> {
        self.timers.iter().find(|t| t.key == key).map(|t| t.remaining)
    }

    /// Move the clock forward by `dt` and return every firing in
    /// chronological order.  A repeating timer can fire several times within
    /// one long step; one-shot timers are disarmed once they fire.
    pub fn advance(&mut self, dt: Duration) -> Vec<K> {
        let mut fired: Vec<(Duration, usize, K)> = Vec::new();

        for (order, timer) in self.timers.iter_mut().enumerate() {
            let mut budget = dt;
            let mut at = Duration::ZERO;
            loop {
                if timer.remaining > budget {
                    timer.remaining -= budget;
                    break;
                }
                at += timer.remaining;
                budget -= timer.remaining;
                fired.push((at, order, timer.key));
                timer.remaining = timer.period;

                // A zero-period repeater would otherwise spin forever.
                if timer.repeat == Repeat::Once || timer.period.is_zero() {
                    break;
                }
            }
        }

        fired.sort_by_key(|&(at, order, _)| (at, order));
        let keys: Vec<K> = fired.into_iter().map(|(_, _, key)| key).collect();

        self.timers
            .retain(|t| t.repeat == Repeat::Every || !keys.contains(&t.key));

        if !keys.is_empty() {
            trace!(?keys, "timers fired");
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn repeating_timer_fires_each_period() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::AutoFire, ms(150), Repeat::Every);

        assert!(s.advance(ms(100)).is_empty());
        assert_eq!(s.advance(ms(50)), vec![TimerKind::AutoFire]);
        assert_eq!(s.remaining(TimerKind::AutoFire), Some(ms(150)));
    }

    #[test]
    fn long_step_fires_repeatedly() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::AutoFire, ms(150), Repeat::Every);

        let fired = s.advance(ms(460));
        assert_eq!(fired.len(), 3);
        assert_eq!(s.remaining(TimerKind::AutoFire), Some(ms(140)));
    }

    #[test]
    fn one_shot_disarms_after_firing() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::BossDelay, ms(1500), Repeat::Once);

        assert_eq!(s.advance(ms(2000)), vec![TimerKind::BossDelay]);
        assert!(!s.is_armed(TimerKind::BossDelay));
        assert!(s.advance(ms(5000)).is_empty());
    }

    #[test]
    fn rearming_replaces_instead_of_stacking() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::LaneSpawn, ms(1000), Repeat::Every);
        s.advance(ms(600));
        s.arm(TimerKind::LaneSpawn, ms(1000), Repeat::Every);

        assert_eq!(s.len(), 1);
        assert_eq!(s.remaining(TimerKind::LaneSpawn), Some(ms(1000)));
        assert_eq!(s.advance(ms(1000)), vec![TimerKind::LaneSpawn]);
    }

    #[test]
    fn firings_are_chronological_across_timers() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::GroupSpawn, ms(300), Repeat::Every);
        s.arm(TimerKind::AutoFire, ms(200), Repeat::Every);

        let fired = s.advance(ms(600));
        assert_eq!(
            fired,
            vec![
                TimerKind::AutoFire,   // 200
                TimerKind::GroupSpawn, // 300
                TimerKind::AutoFire,   // 400
                TimerKind::GroupSpawn, // 600 (armed first)
                TimerKind::AutoFire,   // 600
            ]
        );
    }

    #[test]
    fn cancel_and_clear() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::AutoFire, ms(150), Repeat::Every);
        s.arm(TimerKind::WaveCooldown, ms(2000), Repeat::Once);

        assert!(s.cancel(TimerKind::WaveCooldown));
        assert!(!s.cancel(TimerKind::WaveCooldown));
        assert_eq!(s.armed().collect::<Vec<_>>(), vec![TimerKind::AutoFire]);

        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn zero_period_repeater_fires_once_per_step() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::AutoFire, Duration::ZERO, Repeat::Every);
        assert_eq!(s.advance(ms(10)).len(), 1);
    }
}
