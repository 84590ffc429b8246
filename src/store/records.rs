//! Persisted record shapes.
//!
//! The whole store serialises as one [`Document`]. Each top-level section maps
//! a server id to a map of user id to that user's record. Ids are written as
//! JSON strings (serde_json's handling of integer map keys).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ServerId = u64;
pub type UserId = u64;

/// `server -> user -> T`
pub type Section<T> = BTreeMap<ServerId, BTreeMap<UserId, T>>;

pub const DEFAULT_BIO: &str = "No bio set yet...";
pub const DEFAULT_TITLE: &str = "Newcomer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub bio: String,
    pub title: String,
    /// Active banner id from the cosmetic catalog.
    pub banner: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub profile_views: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(default_banner: &str) -> Self {
        let now = Utc::now();
        Self {
            bio: DEFAULT_BIO.to_string(),
            title: DEFAULT_TITLE.to_string(),
            banner: default_banner.to_string(),
            badges: Vec::new(),
            profile_views: 0,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.badges.iter().any(|b| b == badge_id)
    }
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub title: Option<String>,
}

impl ProfileUpdate {
    pub fn bio(bio: impl Into<String>) -> Self {
        Self {
            bio: Some(bio.into()),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub xp: u64,
    pub messages: u64,
    /// Whether level-ups are announced for this member.
    #[serde(default = "default_true")]
    pub level_up_notifications: bool,
}

impl Default for LevelRecord {
    fn default() -> Self {
        Self {
            xp: 0,
            messages: 0,
            level_up_notifications: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One side of a marriage. Both partners carry a record pointing at the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageRecord {
    pub partner: UserId,
    pub married_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub name: String,
    pub adopted_at: DateTime<Utc>,
    pub level: u32,
    pub happiness: u8,
}

impl ChildRecord {
    pub fn new(name: String) -> Self {
        Self {
            name,
            adopted_at: Utc::now(),
            level: 1,
            happiness: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: String,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedCosmetic {
    pub id: String,
    pub name: String,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteRecord {
    pub muted_at: DateTime<Utc>,
    /// Duration in seconds; `None` mutes until explicitly lifted.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub unmute_at: Option<DateTime<Utc>>,
}

impl MuteRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.unmute_at, Some(at) if at <= now)
    }
}

/// The persisted document. Field names are the on-disk top-level keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub muted_users: Section<MuteRecord>,
    #[serde(default)]
    pub warnings: Section<Vec<Warning>>,
    #[serde(default)]
    pub user_levels: Section<LevelRecord>,
    #[serde(default)]
    pub marriages: Section<MarriageRecord>,
    #[serde(default)]
    pub children: Section<Vec<ChildRecord>>,
    #[serde(default)]
    pub friends: Section<Vec<UserId>>,
    #[serde(default)]
    pub reputation: Section<u64>,
    #[serde(default)]
    pub gifts: Section<u64>,
    #[serde(default)]
    pub user_profiles: Section<UserProfile>,
    #[serde(default)]
    pub achievements: Section<Vec<UnlockedAchievement>>,
    /// Unlocked cosmetics; the key keeps its historical name.
    #[serde(default)]
    pub backgrounds: Section<Vec<UnlockedCosmetic>>,
}

/// Look up `section[server][user]` without creating anything.
pub(crate) fn peek<T>(section: &Section<T>, server: ServerId, user: UserId) -> Option<&T> {
    section.get(&server).and_then(|users| users.get(&user))
}

/// Entry for `section[server][user]`, creating the server map on demand.
pub(crate) fn slot<T>(
    section: &mut Section<T>,
    server: ServerId,
    user: UserId,
) -> std::collections::btree_map::Entry<'_, UserId, T> {
    section.entry(server).or_default().entry(user)
}

/// Remove `section[server][user]`, dropping the server map once empty.
pub(crate) fn evict<T>(section: &mut Section<T>, server: ServerId, user: UserId) -> Option<T> {
    let users = section.get_mut(&server)?;
    let removed = users.remove(&user);
    if users.is_empty() {
        section.remove(&server);
    }
    removed
}
