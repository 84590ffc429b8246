//! Achievement evaluation and reward payout.
//!
//! Achievements are derived from counters the store already keeps, so there
//! is no separate progress record: [`evaluate`] reads the current counters,
//! awards every newly satisfied definition once, and pays its reward.

use log::{info, warn};

use crate::catalog::{AchievementDef, AchievementTrigger, Catalog, Cosmetic};
use crate::leveling::XpTracker;
use crate::logutil::member_tag;
use crate::metrics;
use crate::store::{Rejection, ServerId, Store, UserId};

/// Counters achievements are checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub messages: u64,
    pub level: u32,
    pub total_xp: u64,
    pub married: bool,
    pub friends: usize,
    pub reputation: u64,
    pub gifts: u64,
    pub profile_views: u64,
}

impl Progress {
    pub fn gather(store: &Store, tracker: &XpTracker, server: ServerId, user: UserId) -> Self {
        let levels = store.get_level_record(server, user);
        Self {
            messages: levels.messages,
            level: tracker.curve().level_info(levels.xp).level,
            total_xp: levels.xp,
            married: store.is_married(server, user),
            friends: store.get_friends(server, user).len(),
            reputation: store.get_reputation(server, user),
            gifts: store.get_gifts(server, user),
            profile_views: store.get_profile(server, user).profile_views,
        }
    }

    /// `(current, target)` for a trigger, for progress display.
    pub fn measure(&self, trigger: AchievementTrigger) -> (u64, u64) {
        match trigger {
            AchievementTrigger::Messages(n) => (self.messages, n),
            AchievementTrigger::Level(n) => (u64::from(self.level), u64::from(n)),
            AchievementTrigger::TotalXp(n) => (self.total_xp, n),
            AchievementTrigger::Married => (u64::from(self.married), 1),
            AchievementTrigger::Friends(n) => (self.friends as u64, n as u64),
            AchievementTrigger::Reputation(n) => (self.reputation, n),
            AchievementTrigger::GiftsReceived(n) => (self.gifts, n),
            AchievementTrigger::ProfileViews(n) => (self.profile_views, n),
        }
    }

    pub fn satisfies(&self, trigger: AchievementTrigger) -> bool {
        let (current, target) = self.measure(trigger);
        current >= target
    }
}

/// Award every achievement whose trigger is now met and pay its reward.
///
/// Reward XP can satisfy further triggers (a level or total-XP goal), so
/// evaluation repeats until a pass awards nothing. Each definition is
/// awarded at most once per user.
pub fn evaluate(
    store: &Store,
    tracker: &XpTracker,
    achievements: &Catalog<AchievementDef>,
    banners: &Catalog<Cosmetic>,
    server: ServerId,
    user: UserId,
) -> Vec<AchievementDef> {
    let mut awarded: Vec<AchievementDef> = Vec::new();
    loop {
        let progress = Progress::gather(store, tracker, server, user);
        let mut new_this_pass = false;
        for def in achievements {
            if !progress.satisfies(def.trigger) {
                continue;
            }
            if !store.add_achievement(server, user, def) {
                continue;
            }
            new_this_pass = true;
            metrics::inc_achievements_awarded();
            info!("{} earned achievement '{}'", member_tag(server, user), def.id);
            pay_reward(store, tracker, banners, server, user, def);
            awarded.push(def.clone());
        }
        if !new_this_pass {
            break;
        }
    }
    awarded
}

fn pay_reward(
    store: &Store,
    tracker: &XpTracker,
    banners: &Catalog<Cosmetic>,
    server: ServerId,
    user: UserId,
    def: &AchievementDef,
) {
    if def.reward.xp > 0 {
        tracker.grant(store, server, user, def.reward.xp);
    }
    let Some(banner_id) = def.reward.banner else {
        return;
    };
    match banners.get(banner_id) {
        Some(banner) => match store.unlock_cosmetic(server, user, banner) {
            Ok(()) | Err(Rejection::AlreadyUnlocked) => {}
            Err(e) => warn!("Reward banner '{}' for {} not unlocked: {}", banner_id, def.id, e),
        },
        None => warn!("Achievement '{}' rewards unknown banner '{}'", def.id, banner_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_reports_target() {
        let p = Progress { friends: 3, married: true, ..Progress::default() };
        assert_eq!(p.measure(AchievementTrigger::Friends(25)), (3, 25));
        assert!(p.satisfies(AchievementTrigger::Married));
        assert!(!p.satisfies(AchievementTrigger::Messages(1)));
    }
}
