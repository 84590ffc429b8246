use super::{Catalog, CatalogEntry, Rarity};

/// Condition that earns an achievement, checked against stored counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementTrigger {
    Messages(u64),
    Level(u32),
    TotalXp(u64),
    Married,
    Friends(usize),
    Reputation(u64),
    GiftsReceived(u64),
    ProfileViews(u64),
}

/// Paid once when the achievement is earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub xp: u64,
    pub banner: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub trigger: AchievementTrigger,
    pub reward: Reward,
}

impl CatalogEntry for AchievementDef {
    fn id(&self) -> &str {
        self.id
    }
    fn name(&self) -> &str {
        self.name
    }
}

const fn reward(xp: u64, banner: &'static str) -> Reward {
    Reward {
        xp,
        banner: Some(banner),
    }
}

const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_message",
        name: "First Words",
        description: "Send your first message in the server",
        icon: "💬",
        rarity: Rarity::Common,
        trigger: AchievementTrigger::Messages(1),
        reward: reward(100, "guardian"),
    },
    AchievementDef {
        id: "level_10",
        name: "Rising Star",
        description: "Reach level 10",
        icon: "⭐",
        rarity: Rarity::Common,
        trigger: AchievementTrigger::Level(10),
        reward: reward(500, "berserker"),
    },
    AchievementDef {
        id: "level_50",
        name: "Veteran",
        description: "Reach level 50",
        icon: "🏆",
        rarity: Rarity::Rare,
        trigger: AchievementTrigger::Level(50),
        reward: reward(2000, "techno"),
    },
    AchievementDef {
        id: "married",
        name: "Happily Married",
        description: "Get married to another user",
        icon: "💍",
        rarity: Rarity::Uncommon,
        trigger: AchievementTrigger::Married,
        reward: reward(300, "baddie"),
    },
    AchievementDef {
        id: "social_butterfly",
        name: "Social Butterfly",
        description: "Have 25 friends",
        icon: "🦋",
        rarity: Rarity::Rare,
        trigger: AchievementTrigger::Friends(25),
        reward: reward(800, "aura_farmer"),
    },
    AchievementDef {
        id: "rep_legend",
        name: "Respected Legend",
        description: "Reach 100 reputation points",
        icon: "👑",
        rarity: Rarity::Epic,
        trigger: AchievementTrigger::Reputation(100),
        reward: reward(1500, "space"),
    },
    AchievementDef {
        id: "gift_master",
        name: "Generous Heart",
        description: "Receive 50 gifts",
        icon: "🎁",
        rarity: Rarity::Rare,
        trigger: AchievementTrigger::GiftsReceived(50),
        reward: reward(1000, "russian_ghost"),
    },
    AchievementDef {
        id: "popular",
        name: "Popular Person",
        description: "Get 500 profile views",
        icon: "👀",
        rarity: Rarity::Epic,
        trigger: AchievementTrigger::ProfileViews(500),
        reward: reward(1200, "neon"),
    },
    AchievementDef {
        id: "chatty",
        name: "Chatty Cathy",
        description: "Send 1000 messages",
        icon: "💬",
        rarity: Rarity::Uncommon,
        trigger: AchievementTrigger::Messages(1000),
        reward: reward(600, "spartan"),
    },
    AchievementDef {
        id: "rich",
        name: "Wealthy",
        description: "Earn 10,000 XP total",
        icon: "💰",
        rarity: Rarity::Epic,
        trigger: AchievementTrigger::TotalXp(10_000),
        reward: reward(2000, "mikey"),
    },
];

pub fn achievements() -> Catalog<AchievementDef> {
    Catalog::new(ACHIEVEMENTS.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::banners;

    #[test]
    fn reward_banners_exist() {
        let b = banners();
        for a in ACHIEVEMENTS {
            if let Some(id) = a.reward.banner {
                assert!(b.contains(id), "{} rewards unknown banner {}", a.id, id);
            }
        }
    }
}
