//! # Store - Profile, Social and Moderation Records
//!
//! A keyed store (server -> user -> record) held in memory and mirrored to a
//! single JSON document.
//!
//! ## Concurrency
//!
//! The whole [`Document`] sits behind one mutex. Every read-modify-write
//! sequence (a marriage touching two users, an idempotent unlock) runs under
//! that lock, so invariants hold even when handlers run on different worker
//! threads. The lock is never held across an `.await`.
//!
//! ## Persistence
//!
//! Each effective mutation bumps a generation counter and wakes the
//! background flusher (see [`flusher`]). Flushes capture a full snapshot,
//! write it atomically, and are serialized through a single async mutex.
//! A save therefore always contains every mutation made before its snapshot
//! and never goes backwards. Save errors are logged; memory stays
//! authoritative until the next successful save.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use merlin::store::{Store, StoreOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Store::open(StoreOptions::new("./data/merlin_data.json")).await;
//!     let profile = store.get_profile(1, 42);
//!     println!("{}", profile.bio);
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
mod flusher;
pub mod persist;
pub mod records;

use chrono::{Duration as ChronoDuration, Utc};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::catalog::{AchievementDef, Cosmetic};
use crate::config::Config;
use crate::logutil::{escape_log, member_tag};
use crate::metrics;
use crate::validation::{normalize_reason, validate_bio, validate_child_name, validate_title};

pub use errors::{Rejection, StoreError};
pub use records::{
    ChildRecord, Document, LevelRecord, MarriageRecord, MuteRecord, ProfileUpdate, ServerId,
    UnlockedAchievement, UnlockedCosmetic, UserId, UserProfile, Warning,
};
use records::{evict, peek, slot};

/// Construction parameters for a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub path: PathBuf,
    pub default_banner: String,
    pub bio_max_chars: usize,
    pub title_max_chars: usize,
    pub max_friends: usize,
    pub save_debounce: Duration,
}

impl StoreOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_banner: "assassin".to_string(),
            bio_max_chars: 200,
            title_max_chars: 25,
            max_friends: 50,
            save_debounce: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            path: PathBuf::from(&config.storage.data_file),
            default_banner: config.profile.default_banner.clone(),
            bio_max_chars: config.profile.bio_max_chars,
            title_max_chars: config.profile.title_max_chars,
            max_friends: config.social.max_friends,
            save_debounce: Duration::from_millis(config.storage.save_debounce_ms),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.save_debounce = debounce;
        self
    }
}

/// Result of a closure run under the document lock.
enum Edit<R> {
    Changed(R),
    Unchanged(R),
}

pub(crate) struct Shared {
    pub(crate) path: PathBuf,
    doc: Mutex<Document>,
    generation: AtomicU64,
    /// Single-writer gate; holds the generation of the last successful save.
    persisted: tokio::sync::Mutex<u64>,
    pub(crate) dirty: Notify,
    pub(crate) closing: AtomicBool,
}

impl Shared {
    fn lock_doc(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the current state if anything changed since the last save.
    /// Returns whether a write happened.
    pub(crate) async fn flush(&self) -> Result<bool, StoreError> {
        let mut persisted = self.persisted.lock().await;
        let (generation, content) = {
            let doc = self.lock_doc();
            let generation = self.generation.load(Ordering::Acquire);
            if generation == *persisted {
                return Ok(false);
            }
            (generation, persist::encode_document(&doc)?)
        };

        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || persist::write_file_locked(&path, &content)).await?;
        match result {
            Ok(()) => {
                *persisted = generation;
                metrics::inc_save_ok();
                debug!("Saved bot data (generation {}) to {}", generation, self.path.display());
                Ok(true)
            }
            Err(e) => {
                metrics::inc_save_failed();
                Err(e)
            }
        }
    }
}

/// Summary counts for status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub servers: usize,
    pub profiles: usize,
    pub level_records: usize,
    pub marriages: usize,
    pub warnings: usize,
    pub active_mutes: usize,
    pub unlocked_cosmetics: usize,
    pub achievements: usize,
}

/// Shared handle to the record store. Cloning is cheap.
#[derive(Clone)]
pub struct Store {
    shared: Arc<Shared>,
    options: Arc<StoreOptions>,
    flusher: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Store {
    /// Load the document at `options.path` and start the background flusher.
    /// Must be called inside a Tokio runtime.
    pub async fn open(options: StoreOptions) -> Self {
        let doc = persist::load_document(&options.path).await;
        let shared = Arc::new(Shared {
            path: options.path.clone(),
            doc: Mutex::new(doc),
            generation: AtomicU64::new(0),
            persisted: tokio::sync::Mutex::new(0),
            dirty: Notify::new(),
            closing: AtomicBool::new(false),
        });
        let handle = tokio::spawn(flusher::run(shared.clone(), options.save_debounce));
        info!("Store ready at {}", options.path.display());
        Self {
            shared,
            options: Arc::new(options),
            flusher: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.options.path
    }

    pub fn default_banner(&self) -> &str {
        &self.options.default_banner
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Write pending changes now. Returns whether anything was written.
    pub async fn flush(&self) -> Result<bool, StoreError> {
        self.shared.flush().await
    }

    /// Stop the flusher and write any pending changes.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.shared.closing.store(true, Ordering::Release);
        self.shared.dirty.notify_one();
        let handle = self
            .flusher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.await?;
        }
        self.shared.flush().await?;
        Ok(())
    }

    /// Deep copy of the in-memory document.
    pub fn snapshot(&self) -> Document {
        self.shared.lock_doc().clone()
    }

    fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let doc = self.shared.lock_doc();
        f(&doc)
    }

    fn edit<R>(&self, f: impl FnOnce(&mut Document) -> Edit<R>) -> R {
        let mut doc = self.shared.lock_doc();
        match f(&mut doc) {
            Edit::Changed(out) => {
                self.shared.generation.fetch_add(1, Ordering::AcqRel);
                drop(doc);
                self.shared.dirty.notify_one();
                out
            }
            Edit::Unchanged(out) => out,
        }
    }

    fn try_edit<R>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<Edit<R>, Rejection>,
    ) -> Result<R, Rejection> {
        self.edit(|doc| match f(doc) {
            Ok(Edit::Changed(out)) => Edit::Changed(Ok(out)),
            Ok(Edit::Unchanged(out)) => Edit::Unchanged(Ok(out)),
            Err(rejection) => Edit::Unchanged(Err(rejection)),
        })
    }

    // ---------------------------------------------------------------------
    // Profiles
    // ---------------------------------------------------------------------

    fn profile_mut<'a>(
        doc: &'a mut Document,
        default_banner: &str,
        server: ServerId,
        user: UserId,
    ) -> (&'a mut UserProfile, bool) {
        let mut created = false;
        let profile = slot(&mut doc.user_profiles, server, user).or_insert_with(|| {
            created = true;
            UserProfile::new(default_banner)
        });
        (profile, created)
    }

    /// Read-through: a missing profile is created with defaults.
    pub fn get_profile(&self, server: ServerId, user: UserId) -> UserProfile {
        let banner = self.options.default_banner.as_str();
        self.edit(|doc| {
            let (profile, created) = Self::profile_mut(doc, banner, server, user);
            let out = profile.clone();
            if created {
                debug!("Created profile for {}", member_tag(server, user));
                Edit::Changed(out)
            } else {
                Edit::Unchanged(out)
            }
        })
    }

    /// Validate and merge `update`, stamping `last_updated`.
    pub fn update_profile(
        &self,
        server: ServerId,
        user: UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, Rejection> {
        let bio = update
            .bio
            .map(|b| validate_bio(&b, self.options.bio_max_chars))
            .transpose()?;
        let title = update
            .title
            .map(|t| validate_title(&t, self.options.title_max_chars))
            .transpose()?;
        let banner = self.options.default_banner.as_str();

        Ok(self.edit(|doc| {
            let (profile, _) = Self::profile_mut(doc, banner, server, user);
            if let Some(bio) = bio {
                debug!("Bio for {} set to '{}'", member_tag(server, user), escape_log(&bio));
                profile.bio = bio;
            }
            if let Some(title) = title {
                profile.title = title;
            }
            profile.last_updated = Utc::now();
            Edit::Changed(profile.clone())
        }))
    }

    pub fn increment_profile_views(&self, server: ServerId, user: UserId) -> u64 {
        let banner = self.options.default_banner.as_str();
        self.edit(|doc| {
            let (profile, _) = Self::profile_mut(doc, banner, server, user);
            profile.profile_views = profile.profile_views.saturating_add(1);
            Edit::Changed(profile.profile_views)
        })
    }

    pub fn give_badge(&self, server: ServerId, user: UserId, badge_id: &str) -> Result<(), Rejection> {
        let banner = self.options.default_banner.as_str();
        self.try_edit(|doc| {
            let (profile, _) = Self::profile_mut(doc, banner, server, user);
            if profile.has_badge(badge_id) {
                return Err(Rejection::AlreadyHasBadge);
            }
            profile.badges.push(badge_id.to_string());
            profile.last_updated = Utc::now();
            Ok(Edit::Changed(()))
        })
    }

    // ---------------------------------------------------------------------
    // Cosmetics
    // ---------------------------------------------------------------------

    pub fn get_unlocked_cosmetics(&self, server: ServerId, user: UserId) -> Vec<UnlockedCosmetic> {
        self.read(|doc| peek(&doc.backgrounds, server, user).cloned().unwrap_or_default())
    }

    /// True for unlocked cosmetics and for the default banner.
    pub fn has_cosmetic(&self, server: ServerId, user: UserId, cosmetic_id: &str) -> bool {
        cosmetic_id == self.options.default_banner
            || self.read(|doc| {
                peek(&doc.backgrounds, server, user)
                    .map(|list| list.iter().any(|c| c.id == cosmetic_id))
                    .unwrap_or(false)
            })
    }

    /// Idempotent: a second unlock is rejected with `AlreadyUnlocked` and
    /// leaves the state untouched.
    pub fn unlock_cosmetic(&self, server: ServerId, user: UserId, cosmetic: &Cosmetic) -> Result<(), Rejection> {
        if cosmetic.id == self.options.default_banner {
            return Err(Rejection::AlreadyUnlocked);
        }
        self.try_edit(|doc| {
            let list = slot(&mut doc.backgrounds, server, user).or_default();
            if list.iter().any(|c| c.id == cosmetic.id) {
                return Err(Rejection::AlreadyUnlocked);
            }
            list.push(UnlockedCosmetic {
                id: cosmetic.id.to_string(),
                name: cosmetic.name.to_string(),
                unlocked_at: Utc::now(),
            });
            info!("Unlocked cosmetic '{}' for {}", cosmetic.id, member_tag(server, user));
            Ok(Edit::Changed(()))
        })
    }

    /// Equip a cosmetic the user owns (or the default banner).
    pub fn set_active_cosmetic(&self, server: ServerId, user: UserId, cosmetic_id: &str) -> Result<(), Rejection> {
        let default_banner = self.options.default_banner.as_str();
        self.try_edit(|doc| {
            let owned = cosmetic_id == default_banner
                || peek(&doc.backgrounds, server, user)
                    .map(|list| list.iter().any(|c| c.id == cosmetic_id))
                    .unwrap_or(false);
            if !owned {
                return Err(Rejection::NotUnlocked(cosmetic_id.to_string()));
            }
            let (profile, _) = Self::profile_mut(doc, default_banner, server, user);
            profile.banner = cosmetic_id.to_string();
            profile.last_updated = Utc::now();
            Ok(Edit::Changed(()))
        })
    }

    // ---------------------------------------------------------------------
    // Achievements
    // ---------------------------------------------------------------------

    /// Record an earned achievement. Returns false if it was already earned.
    pub fn add_achievement(&self, server: ServerId, user: UserId, def: &AchievementDef) -> bool {
        self.edit(|doc| {
            let list = slot(&mut doc.achievements, server, user).or_default();
            if list.iter().any(|a| a.id == def.id) {
                return Edit::Unchanged(false);
            }
            list.push(UnlockedAchievement {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                icon: def.icon.to_string(),
                rarity: def.rarity.as_str().to_string(),
                unlocked_at: Utc::now(),
            });
            Edit::Changed(true)
        })
    }

    pub fn get_achievements(&self, server: ServerId, user: UserId) -> Vec<UnlockedAchievement> {
        self.read(|doc| peek(&doc.achievements, server, user).cloned().unwrap_or_default())
    }

    // ---------------------------------------------------------------------
    // Levels
    // ---------------------------------------------------------------------

    pub fn get_level_record(&self, server: ServerId, user: UserId) -> LevelRecord {
        self.read(|doc| peek(&doc.user_levels, server, user).cloned().unwrap_or_default())
    }

    /// Count one message and add `xp_gain`. Returns (before, after).
    pub fn record_message(&self, server: ServerId, user: UserId, xp_gain: u64) -> (LevelRecord, LevelRecord) {
        self.edit(|doc| {
            let rec = slot(&mut doc.user_levels, server, user).or_default();
            let before = rec.clone();
            rec.messages = rec.messages.saturating_add(1);
            rec.xp = rec.xp.saturating_add(xp_gain);
            Edit::Changed((before, rec.clone()))
        })
    }

    /// Add XP without counting a message (rewards, admin grants).
    pub fn add_xp(&self, server: ServerId, user: UserId, amount: u64) -> (LevelRecord, LevelRecord) {
        self.edit(|doc| {
            let rec = slot(&mut doc.user_levels, server, user).or_default();
            let before = rec.clone();
            rec.xp = rec.xp.saturating_add(amount);
            Edit::Changed((before, rec.clone()))
        })
    }

    /// Admin adjustment; the only path that can lower XP.
    pub fn set_xp(&self, server: ServerId, user: UserId, xp: u64) -> LevelRecord {
        self.edit(|doc| {
            let rec = slot(&mut doc.user_levels, server, user).or_default();
            rec.xp = xp;
            Edit::Changed(rec.clone())
        })
    }

    /// Flip the member's level-up announcement flag. Returns the new setting.
    pub fn toggle_level_notifications(&self, server: ServerId, user: UserId) -> bool {
        self.edit(|doc| {
            let rec = slot(&mut doc.user_levels, server, user).or_default();
            rec.level_up_notifications = !rec.level_up_notifications;
            Edit::Changed(rec.level_up_notifications)
        })
    }

    /// Highest-XP members of a server, ties broken by user id.
    pub fn leaderboard(&self, server: ServerId, limit: usize) -> Vec<(UserId, LevelRecord)> {
        self.read(|doc| {
            let mut rows: Vec<(UserId, LevelRecord)> = doc
                .user_levels
                .get(&server)
                .map(|users| users.iter().map(|(id, rec)| (*id, rec.clone())).collect())
                .unwrap_or_default();
            rows.sort_by(|a, b| b.1.xp.cmp(&a.1.xp).then(a.0.cmp(&b.0)));
            rows.truncate(limit);
            rows
        })
    }

    // ---------------------------------------------------------------------
    // Marriage and children
    // ---------------------------------------------------------------------

    pub fn get_marriage(&self, server: ServerId, user: UserId) -> Option<MarriageRecord> {
        self.read(|doc| peek(&doc.marriages, server, user).cloned())
    }

    pub fn is_married(&self, server: ServerId, user: UserId) -> bool {
        self.get_marriage(server, user).is_some()
    }

    /// Marry `a` and `b`. Both records are written under one lock, so either
    /// both sides exist afterwards or neither does.
    pub fn add_marriage(&self, server: ServerId, a: UserId, b: UserId) -> Result<MarriageRecord, Rejection> {
        if a == b {
            return Err(Rejection::SelfTarget);
        }
        self.try_edit(|doc| {
            if peek(&doc.marriages, server, a).is_some() {
                return Err(Rejection::AlreadyMarried);
            }
            if peek(&doc.marriages, server, b).is_some() {
                return Err(Rejection::PartnerAlreadyMarried);
            }
            let married_at = Utc::now();
            let users = doc.marriages.entry(server).or_default();
            users.insert(a, MarriageRecord { partner: b, married_at });
            users.insert(b, MarriageRecord { partner: a, married_at });
            info!("{} married {}", member_tag(server, a), b);
            Ok(Edit::Changed(MarriageRecord { partner: b, married_at }))
        })
    }

    /// Remove both sides of `user`'s marriage. Returns the former partner.
    pub fn remove_marriage(&self, server: ServerId, user: UserId) -> Option<UserId> {
        self.edit(|doc| {
            let Some(record) = evict(&mut doc.marriages, server, user) else {
                return Edit::Unchanged(None);
            };
            // Only drop the partner's side if it still points back at us.
            if peek(&doc.marriages, server, record.partner).map(|r| r.partner) == Some(user) {
                evict(&mut doc.marriages, server, record.partner);
            }
            info!("{} divorced {}", member_tag(server, user), record.partner);
            Edit::Changed(Some(record.partner))
        })
    }

    /// Adopt a child. Requires the parent to be married.
    pub fn add_child(&self, server: ServerId, parent: UserId, name: &str) -> Result<usize, Rejection> {
        let name = validate_child_name(name)?;
        self.try_edit(|doc| {
            if peek(&doc.marriages, server, parent).is_none() {
                return Err(Rejection::NotMarried);
            }
            let kids = slot(&mut doc.children, server, parent).or_default();
            debug!("{} adopted '{}'", member_tag(server, parent), escape_log(&name));
            kids.push(ChildRecord::new(name));
            Ok(Edit::Changed(kids.len()))
        })
    }

    pub fn get_children(&self, server: ServerId, parent: UserId) -> Vec<ChildRecord> {
        self.read(|doc| peek(&doc.children, server, parent).cloned().unwrap_or_default())
    }

    // ---------------------------------------------------------------------
    // Friends, reputation, gifts
    // ---------------------------------------------------------------------

    pub fn get_friends(&self, server: ServerId, user: UserId) -> Vec<UserId> {
        self.read(|doc| peek(&doc.friends, server, user).cloned().unwrap_or_default())
    }

    /// Add `friend` to `user`'s list. Ok(false) when already present.
    pub fn add_friend(&self, server: ServerId, user: UserId, friend: UserId) -> Result<bool, Rejection> {
        if user == friend {
            return Err(Rejection::SelfTarget);
        }
        let max = self.options.max_friends;
        self.try_edit(|doc| {
            let list = slot(&mut doc.friends, server, user).or_default();
            if list.contains(&friend) {
                return Ok(Edit::Unchanged(false));
            }
            if list.len() >= max {
                return Err(Rejection::FriendLimit { max });
            }
            list.push(friend);
            Ok(Edit::Changed(true))
        })
    }

    /// Remove `friend` from `user`'s list. Returns whether it was present.
    pub fn remove_friend(&self, server: ServerId, user: UserId, friend: UserId) -> bool {
        self.edit(|doc| {
            let Some(list) = doc.friends.get_mut(&server).and_then(|u| u.get_mut(&user)) else {
                return Edit::Unchanged(false);
            };
            let before = list.len();
            list.retain(|f| *f != friend);
            if list.len() == before {
                return Edit::Unchanged(false);
            }
            if list.is_empty() {
                evict(&mut doc.friends, server, user);
            }
            Edit::Changed(true)
        })
    }

    pub fn get_reputation(&self, server: ServerId, user: UserId) -> u64 {
        self.read(|doc| peek(&doc.reputation, server, user).copied().unwrap_or(0))
    }

    pub fn add_reputation(&self, server: ServerId, user: UserId, amount: u64) -> u64 {
        self.edit(|doc| {
            let total = slot(&mut doc.reputation, server, user).or_insert(0);
            *total = total.saturating_add(amount);
            Edit::Changed(*total)
        })
    }

    pub fn get_gifts(&self, server: ServerId, user: UserId) -> u64 {
        self.read(|doc| peek(&doc.gifts, server, user).copied().unwrap_or(0))
    }

    pub fn add_gift(&self, server: ServerId, user: UserId) -> u64 {
        self.edit(|doc| {
            let total = slot(&mut doc.gifts, server, user).or_insert(0);
            *total = total.saturating_add(1);
            Edit::Changed(*total)
        })
    }

    // ---------------------------------------------------------------------
    // Moderation
    // ---------------------------------------------------------------------

    /// Record a warning and return the user's warning count.
    pub fn add_warning(&self, server: ServerId, user: UserId, reason: &str, issued_by: Option<UserId>) -> usize {
        let reason = normalize_reason(reason);
        self.edit(|doc| {
            let list = slot(&mut doc.warnings, server, user).or_default();
            info!("Warning for {}: {}", member_tag(server, user), escape_log(&reason));
            list.push(Warning {
                reason,
                timestamp: Utc::now(),
                issued_by,
            });
            Edit::Changed(list.len())
        })
    }

    pub fn get_warnings(&self, server: ServerId, user: UserId) -> Vec<Warning> {
        self.read(|doc| peek(&doc.warnings, server, user).cloned().unwrap_or_default())
    }

    /// Drop all warnings for a user. Returns how many were removed.
    pub fn clear_warnings(&self, server: ServerId, user: UserId) -> usize {
        self.edit(|doc| match evict(&mut doc.warnings, server, user) {
            Some(list) => Edit::Changed(list.len()),
            None => Edit::Unchanged(0),
        })
    }

    /// Mute a user, optionally for `duration_secs`. Replaces an existing mute.
    pub fn mute(&self, server: ServerId, user: UserId, duration_secs: Option<u64>) -> MuteRecord {
        let muted_at = Utc::now();
        let unmute_at = duration_secs.map(|secs| {
            let secs = i64::try_from(secs).unwrap_or(i64::MAX);
            muted_at
                .checked_add_signed(ChronoDuration::seconds(secs.min(100 * 365 * 86_400)))
                .unwrap_or(muted_at)
        });
        let record = MuteRecord {
            muted_at,
            duration: duration_secs,
            unmute_at,
        };
        self.edit(|doc| {
            doc.muted_users.entry(server).or_default().insert(user, record.clone());
            info!("Muted {} ({:?}s)", member_tag(server, user), duration_secs);
            Edit::Changed(record)
        })
    }

    pub fn unmute(&self, server: ServerId, user: UserId) -> Result<(), Rejection> {
        self.try_edit(|doc| match evict(&mut doc.muted_users, server, user) {
            Some(_) => Ok(Edit::Changed(())),
            None => Err(Rejection::NotMuted),
        })
    }

    /// True while a mute is active. Expired timed mutes are removed here.
    pub fn is_muted(&self, server: ServerId, user: UserId) -> bool {
        let now = Utc::now();
        self.edit(|doc| {
            let expired = peek(&doc.muted_users, server, user).map(|m| m.is_expired(now));
            match expired {
                None => Edit::Unchanged(false),
                Some(true) => {
                    evict(&mut doc.muted_users, server, user);
                    debug!("Mute expired for {}", member_tag(server, user));
                    Edit::Changed(false)
                }
                Some(false) => Edit::Unchanged(true),
            }
        })
    }

    pub fn muted_users(&self, server: ServerId) -> BTreeMap<UserId, MuteRecord> {
        self.read(|doc| doc.muted_users.get(&server).cloned().unwrap_or_default())
    }

    // ---------------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------------

    pub fn stats(&self) -> StoreStats {
        fn count<T>(section: &records::Section<T>) -> usize {
            section.values().map(|users| users.len()).sum()
        }
        self.read(|doc| {
            let mut servers: BTreeSet<ServerId> = BTreeSet::new();
            servers.extend(doc.user_profiles.keys());
            servers.extend(doc.user_levels.keys());
            servers.extend(doc.marriages.keys());
            servers.extend(doc.warnings.keys());
            StoreStats {
                servers: servers.len(),
                profiles: count(&doc.user_profiles),
                level_records: count(&doc.user_levels),
                marriages: count(&doc.marriages) / 2,
                warnings: doc.warnings.values().flat_map(|u| u.values()).map(Vec::len).sum(),
                active_mutes: count(&doc.muted_users),
                unlocked_cosmetics: doc.backgrounds.values().flat_map(|u| u.values()).map(Vec::len).sum(),
                achievements: doc.achievements.values().flat_map(|u| u.values()).map(Vec::len).sum(),
            }
        })
    }
}
