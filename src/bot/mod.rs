//! # Bot - Inbound Message Pipeline
//!
//! Everything a guild message passes through once the gateway has delivered
//! it. The gateway client itself lives outside this crate and only needs to
//! build an [`Inbound`] and post the returned replies.
//!
//! ## Pipeline
//!
//! 1. Messages from bots are ignored.
//! 2. Messages from muted members are ignored (expired mutes are lifted).
//! 3. XP is awarded through the [`XpTracker`] and mirrored to the ledger.
//! 4. Achievements are evaluated and rewards paid.
//! 5. Prefixed text is parsed into a [`Command`] and handled.
//!
//! The store is passed in explicitly; there is no global instance.

pub mod commands;
pub mod parser;
pub mod social;

use anyhow::{anyhow, Result};
use log::{debug, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::achievements;
use crate::catalog::{self, AchievementDef, Badge, Catalog, Cosmetic};
use crate::config::Config;
use crate::leveling::{Ledger, LedgerRow, XpAward, XpTracker};
use crate::logutil::{escape_log, member_tag};
use crate::metrics;
use crate::store::{ServerId, Store, UserId};

pub use commands::Ctx;
pub use parser::{Command, CommandParser};
pub use social::SocialState;

/// A message as delivered by the gateway.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub server: ServerId,
    pub author: UserId,
    pub author_is_bot: bool,
    pub content: String,
}

impl Inbound {
    pub fn new(server: ServerId, author: UserId, content: impl Into<String>) -> Self {
        Self {
            server,
            author,
            author_is_bot: false,
            content: content.into(),
        }
    }
}

/// What the pipeline did with one message.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Text to post back to the channel, in order.
    pub replies: Vec<String>,
    pub award: Option<XpAward>,
    pub achievements: Vec<AchievementDef>,
    /// Set when the message was dropped before any processing.
    pub ignored: bool,
}

pub struct Bot {
    config: Config,
    store: Store,
    tracker: XpTracker,
    ledger: Option<Ledger>,
    parser: CommandParser,
    social: Mutex<SocialState>,
    banners: Catalog<Cosmetic>,
    badges: Catalog<Badge>,
    achievements: Catalog<AchievementDef>,
}

impl Bot {
    pub fn new(config: Config, store: Store) -> Result<Self> {
        let ledger = match &config.leveling.ledger_path {
            Some(path) => Some(
                Ledger::open(path).map_err(|e| anyhow!("Failed to open leveling ledger {}: {}", path, e))?,
            ),
            None => None,
        };
        Ok(Self {
            tracker: XpTracker::from_config(&config.leveling),
            parser: CommandParser::new(config.bot.command_prefix()),
            social: Mutex::new(SocialState::new(&config.social)),
            banners: catalog::banners(),
            badges: catalog::badges(),
            achievements: catalog::achievements(),
            ledger,
            store,
            config,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &XpTracker {
        &self.tracker
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    fn social(&self) -> MutexGuard<'_, SocialState> {
        self.social.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one message through the pipeline.
    pub fn handle_message(&self, msg: &Inbound) -> Outcome {
        self.handle_message_at(msg, Instant::now())
    }

    pub fn handle_message_at(&self, msg: &Inbound, now: Instant) -> Outcome {
        let mut out = Outcome::default();
        if msg.author_is_bot {
            out.ignored = true;
            return out;
        }
        if self.store.is_muted(msg.server, msg.author) {
            debug!("Dropping message from muted {}", member_tag(msg.server, msg.author));
            out.ignored = true;
            return out;
        }

        let award = self
            .tracker
            .award_message_at(&self.store, msg.server, msg.author, now, &mut rand::thread_rng());
        if award.leveled_up() && self.announces_level_ups(msg.server, msg.author) {
            out.replies.push(format!(
                "🎉 <@{}> reached **level {}**!",
                msg.author, award.new_level
            ));
        }
        out.award = Some(award);
        self.check_achievements(msg.server, msg.author, &mut out);

        if let Some(cmd) = self.parser.parse(&msg.content) {
            debug!(
                "Command from {}: '{}'",
                member_tag(msg.server, msg.author),
                escape_log(&msg.content)
            );
            let mut ctx = Ctx::new(msg.server, msg.author, self.config.bot.is_owner(msg.author), now);
            match self.run_command(&mut ctx, cmd) {
                Ok(reply) => {
                    metrics::inc_commands_handled();
                    out.replies.push(reply);
                }
                Err(rejection) => {
                    metrics::inc_commands_rejected();
                    out.replies.push(format!("❌ {}", capitalize(&rejection.to_string())));
                }
            }
            for user in ctx.touched {
                self.check_achievements(msg.server, user, &mut out);
            }
        }
        out
    }

    /// Evaluate achievements for `user`, keep the ledger current and
    /// announce anything new.
    fn check_achievements(&self, server: ServerId, user: UserId, out: &mut Outcome) {
        let before = self.tracker.curve().level_info(self.store.get_level_record(server, user).xp);
        let earned = achievements::evaluate(
            &self.store,
            &self.tracker,
            &self.achievements,
            &self.banners,
            server,
            user,
        );
        for def in &earned {
            let mut line = format!("🏆 <@{}> unlocked **{} {}**", user, def.icon, def.name);
            if def.reward.xp > 0 {
                line.push_str(&format!(" (+{} XP)", def.reward.xp));
            }
            if let Some(banner) = def.reward.banner.and_then(|id| self.banners.get(id)) {
                line.push_str(&format!(" and the {} banner", banner.display()));
            }
            out.replies.push(line);
        }
        let after = self.tracker.curve().level_info(self.store.get_level_record(server, user).xp);
        if after.level > before.level && self.announces_level_ups(server, user) {
            out.replies.push(format!("🎉 <@{}> reached **level {}**!", user, after.level));
        }
        out.achievements.extend(earned);
        self.sync_ledger(server, user);
    }

    fn announces_level_ups(&self, server: ServerId, user: UserId) -> bool {
        self.store.get_level_record(server, user).level_up_notifications
    }

    fn sync_ledger(&self, server: ServerId, user: UserId) {
        let Some(ledger) = &self.ledger else {
            return;
        };
        let rec = self.store.get_level_record(server, user);
        let row = LedgerRow {
            user_id: user,
            xp: rec.xp,
            level: self.tracker.curve().level_info(rec.xp).level,
            messages: rec.messages,
        };
        if let Err(e) = ledger.upsert(server, row) {
            warn!("Ledger update failed for {}: {}", member_tag(server, user), e);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
