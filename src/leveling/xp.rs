//! Per-message XP awards.
//!
//! Every counted message bumps the user's message total. XP is only granted
//! when the user's cooldown has elapsed, as a uniform roll between the
//! configured bounds.

use log::{debug, info};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::curve::LevelCurve;
use crate::config::LevelingConfig;
use crate::logutil::member_tag;
use crate::metrics;
use crate::store::{ServerId, Store, UserId};

/// Outcome of one counted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub gained: u64,
    pub total_xp: u64,
    pub messages: u64,
    pub old_level: u32,
    pub new_level: u32,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

pub struct XpTracker {
    curve: LevelCurve,
    min_xp: u64,
    max_xp: u64,
    cooldown: Duration,
    last_award: Mutex<HashMap<(ServerId, UserId), Instant>>,
}

impl XpTracker {
    pub fn new(curve: LevelCurve, min_xp: u64, max_xp: u64, cooldown: Duration) -> Self {
        Self {
            curve,
            min_xp: min_xp.min(max_xp),
            max_xp: max_xp.max(min_xp),
            cooldown,
            last_award: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(cfg: &LevelingConfig) -> Self {
        Self::new(
            LevelCurve::from_config(cfg),
            cfg.message_xp_min,
            cfg.message_xp_max,
            Duration::from_secs(cfg.cooldown_seconds),
        )
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    /// XP to grant for a message at `now`; zero while on cooldown.
    pub fn roll_at<R: Rng + ?Sized>(&self, server: ServerId, user: UserId, now: Instant, rng: &mut R) -> u64 {
        let mut last = self.last_award.lock().unwrap_or_else(PoisonError::into_inner);
        match last.get(&(server, user)) {
            Some(prev) if now.saturating_duration_since(*prev) < self.cooldown => 0,
            _ => {
                let cooldown = self.cooldown;
                last.retain(|_, prev| now.saturating_duration_since(*prev) < cooldown);
                last.insert((server, user), now);
                rng.gen_range(self.min_xp..=self.max_xp)
            }
        }
    }

    /// Seconds until `user` can earn XP again.
    pub fn cooldown_remaining(&self, server: ServerId, user: UserId) -> u64 {
        let last = self.last_award.lock().unwrap_or_else(PoisonError::into_inner);
        last.get(&(server, user))
            .map(|prev| self.cooldown.saturating_sub(prev.elapsed()).as_secs())
            .unwrap_or(0)
    }

    /// Members currently on cooldown.
    pub fn tracked_members(&self) -> usize {
        self.last_award.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Count a message and apply whatever XP the roll yields.
    pub fn award_message_at<R: Rng + ?Sized>(
        &self,
        store: &Store,
        server: ServerId,
        user: UserId,
        now: Instant,
        rng: &mut R,
    ) -> XpAward {
        let gained = self.roll_at(server, user, now, rng);
        let (before, after) = store.record_message(server, user, gained);
        metrics::inc_messages_seen();
        let award = XpAward {
            gained,
            total_xp: after.xp,
            messages: after.messages,
            old_level: self.curve.level_info(before.xp).level,
            new_level: self.curve.level_info(after.xp).level,
        };
        if gained > 0 {
            metrics::add_xp_awarded(gained);
            debug!("{} +{} XP (total {})", member_tag(server, user), gained, after.xp);
        }
        if award.leveled_up() {
            metrics::inc_level_ups();
            info!("{} reached level {}", member_tag(server, user), award.new_level);
        }
        award
    }

    pub fn award_message(&self, store: &Store, server: ServerId, user: UserId) -> XpAward {
        self.award_message_at(store, server, user, Instant::now(), &mut rand::thread_rng())
    }

    /// Grant XP outside the message flow (rewards, admin grants).
    pub fn grant(&self, store: &Store, server: ServerId, user: UserId, amount: u64) -> XpAward {
        let (before, after) = store.add_xp(server, user, amount);
        metrics::add_xp_awarded(amount);
        let award = XpAward {
            gained: amount,
            total_xp: after.xp,
            messages: after.messages,
            old_level: self.curve.level_info(before.xp).level,
            new_level: self.curve.level_info(after.xp).level,
        };
        if award.leveled_up() {
            metrics::inc_level_ups();
        }
        award
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracker() -> XpTracker {
        XpTracker::new(LevelCurve::default(), 15, 25, Duration::from_secs(60))
    }

    #[test]
    fn roll_respects_bounds_and_cooldown() {
        let t = tracker();
        let mut rng = StdRng::seed_from_u64(7);
        let start = Instant::now();
        let first = t.roll_at(1, 2, start, &mut rng);
        assert!((15..=25).contains(&first));
        assert_eq!(t.roll_at(1, 2, start + Duration::from_secs(30), &mut rng), 0);
        // other users and other servers are independent
        assert!(t.roll_at(1, 3, start, &mut rng) > 0);
        assert!(t.roll_at(9, 2, start, &mut rng) > 0);
        assert!(t.roll_at(1, 2, start + Duration::from_secs(60), &mut rng) > 0);
    }

    #[test]
    fn finished_cooldowns_are_forgotten() {
        let t = tracker();
        let mut rng = StdRng::seed_from_u64(3);
        let start = Instant::now();
        for user in 0..10 {
            t.roll_at(1, user, start, &mut rng);
        }
        assert_eq!(t.tracked_members(), 10);
        t.roll_at(1, 50, start + Duration::from_secs(30), &mut rng);
        assert_eq!(t.tracked_members(), 11);
        t.roll_at(1, 51, start + Duration::from_secs(61), &mut rng);
        // only the user 50 entry is still inside its window
        assert_eq!(t.tracked_members(), 2);
    }

    #[test]
    fn swapped_bounds_are_normalised() {
        let t = XpTracker::new(LevelCurve::default(), 30, 10, Duration::ZERO);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let xp = t.roll_at(1, 1, Instant::now(), &mut rng);
            assert!((10..=30).contains(&xp));
        }
    }

    #[test]
    fn leveled_up_compares_levels() {
        let a = XpAward { gained: 20, total_xp: 105, messages: 5, old_level: 0, new_level: 1 };
        assert!(a.leveled_up());
        let b = XpAward { old_level: 1, ..a };
        assert!(!b.leveled_up());
    }
}
