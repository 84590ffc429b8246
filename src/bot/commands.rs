//! Command handlers. Each returns the reply text or a [`Rejection`] whose
//! message is shown to the caller.

use chrono::Utc;
use log::info;
use std::fmt::Write as _;
use std::time::Instant;

use super::{Bot, Command};
use crate::catalog::{Cosmetic, Rarity};
use crate::leveling::LevelInfo;
use crate::logutil::member_tag;
use crate::store::{ProfileUpdate, Rejection, ServerId, UserId};
use crate::validation::validate_child_name;

const LEADERBOARD_SIZE: usize = 10;

/// Per-command context.
#[derive(Debug)]
pub struct Ctx {
    pub server: ServerId,
    pub author: UserId,
    pub is_owner: bool,
    pub now: Instant,
    /// Users whose counters changed; achievements are re-checked for them.
    pub touched: Vec<UserId>,
}

impl Ctx {
    pub fn new(server: ServerId, author: UserId, is_owner: bool, now: Instant) -> Self {
        Self {
            server,
            author,
            is_owner,
            now,
            touched: Vec::new(),
        }
    }

    fn require_owner(&self) -> Result<(), Rejection> {
        if self.is_owner {
            Ok(())
        } else {
            Err(Rejection::NotAuthorized)
        }
    }

    fn touch(&mut self, user: UserId) {
        if !self.touched.contains(&user) {
            self.touched.push(user);
        }
    }
}

fn mention(user: UserId) -> String {
    format!("<@{}>", user)
}

fn level_line(info: &LevelInfo) -> String {
    if info.is_max_level() {
        format!("Level {} (max) {} {} XP", info.level, info.progress_bar(), info.total_xp)
    } else {
        format!(
            "Level {} {} {}/{} XP ({}%)",
            info.level,
            info.progress_bar(),
            info.current_xp_in_level,
            info.required_xp_for_level,
            info.progress_percent
        )
    }
}

/// Label shown next to a reputation score.
pub fn reputation_rank(points: u64) -> &'static str {
    match points {
        0 => "Newcomer",
        1..=9 => "Trusted",
        10..=49 => "Respected",
        50..=99 => "Famous",
        _ => "Legendary",
    }
}

impl Bot {
    pub fn run_command(&self, ctx: &mut Ctx, cmd: Command) -> Result<String, Rejection> {
        match cmd {
            Command::Help => Ok(self.help()),
            Command::Profile(target) => Ok(self.profile(ctx, target)),
            Command::Rank(target) => Ok(self.rank(ctx, target)),
            Command::Leaderboard => Ok(self.leaderboard(ctx)),
            Command::SetBio(text) => {
                let profile = self.store.update_profile(ctx.server, ctx.author, ProfileUpdate::bio(text))?;
                Ok(format!("✅ Bio updated: {}", profile.bio))
            }
            Command::SetTitle(text) => {
                let profile = self.store.update_profile(ctx.server, ctx.author, ProfileUpdate::title(text))?;
                Ok(format!("✅ Title set to **{}**", profile.title))
            }
            Command::GiveXp { target, amount } => {
                ctx.require_owner()?;
                let award = self.tracker.grant(&self.store, ctx.server, target, amount);
                ctx.touch(target);
                info!("{} granted {} XP to {}", ctx.author, amount, member_tag(ctx.server, target));
                let mut reply = format!("✅ Gave {} XP to {} (total {})", amount, mention(target), award.total_xp);
                if award.leveled_up() {
                    let _ = write!(reply, "\n🎉 {} reached **level {}**!", mention(target), award.new_level);
                }
                Ok(reply)
            }
            Command::ToggleNotifications => {
                if self.store.toggle_level_notifications(ctx.server, ctx.author) {
                    Ok("🔔 Level-up notifications are now **on**".to_string())
                } else {
                    Ok("🔕 Level-up notifications are now **off**".to_string())
                }
            }
            Command::Banners => Ok(self.list_banners(ctx)),
            Command::BannerPreview(query) => self.banner_preview(ctx, &query),
            Command::SetBanner(query) => {
                let banner = self.find_banner(&query)?;
                self.store.set_active_cosmetic(ctx.server, ctx.author, banner.id)?;
                Ok(format!("🎨 Your profile banner is now {}", banner.display()))
            }
            Command::MyBanners(target) => Ok(self.owned_banners(ctx, target)),
            Command::GiveBanner { target, query } => {
                ctx.require_owner()?;
                let banner = self.find_banner(&query)?;
                self.store.unlock_cosmetic(ctx.server, target, banner)?;
                Ok(format!("🎁 {} received the {} banner ({})", mention(target), banner.display(), banner.rarity.label()))
            }
            Command::Marry(target) => self.marry(ctx, target),
            Command::Accept => {
                let mut social = self.social();
                let proposal = social
                    .pending_for(ctx.server, ctx.author, ctx.now)
                    .ok_or(Rejection::NoProposal)?;
                // Accepter first, so each rejection names the right person.
                match self.store.add_marriage(ctx.server, ctx.author, proposal.from) {
                    Ok(_) => social.withdraw(ctx.server, ctx.author),
                    Err(Rejection::PartnerAlreadyMarried) => {
                        // The proposer married someone else; the proposal is void.
                        social.withdraw(ctx.server, ctx.author);
                        return Err(Rejection::PartnerAlreadyMarried);
                    }
                    Err(e) => return Err(e),
                }
                drop(social);
                ctx.touch(proposal.from);
                ctx.touch(ctx.author);
                Ok(format!("💒 {} and {} are now married! Congratulations!", mention(proposal.from), mention(ctx.author)))
            }
            Command::Reject => {
                let proposal = self.social().take_proposal(ctx.server, ctx.author, ctx.now)?;
                Ok(format!("💔 {} rejected the proposal from {}.", mention(ctx.author), mention(proposal.from)))
            }
            Command::Divorce => match self.store.remove_marriage(ctx.server, ctx.author) {
                Some(former) => Ok(format!("💔 {} and {} are now divorced.", mention(ctx.author), mention(former))),
                None => Err(Rejection::NotMarried),
            },
            Command::Marriage(target) => Ok(self.marriage(ctx, target)),
            Command::Adopt(name) => {
                let marriage = self.store.get_marriage(ctx.server, ctx.author).ok_or(Rejection::NotMarried)?;
                validate_child_name(&name)?;
                self.social().allow_adopt(ctx.server, ctx.author, ctx.now)?;
                let count = self.store.add_child(ctx.server, ctx.author, &name)?;
                let child = self
                    .store
                    .get_children(ctx.server, ctx.author)
                    .pop()
                    .map(|c| c.name)
                    .unwrap_or(name);
                Ok(format!(
                    "👶 **{}** has been adopted by {} and {}! ({} children)",
                    child,
                    mention(ctx.author),
                    mention(marriage.partner),
                    count
                ))
            }
            Command::Children(target) => Ok(self.children(ctx, target)),
            Command::AddFriend(target) => {
                if self.store.add_friend(ctx.server, ctx.author, target)? {
                    ctx.touch(ctx.author);
                    Ok(format!("👥 {} is now on your friends list.", mention(target)))
                } else {
                    Err(Rejection::AlreadyFriends)
                }
            }
            Command::Unfriend(target) => {
                if self.store.remove_friend(ctx.server, ctx.author, target) {
                    Ok(format!("👋 Removed {} from your friends list.", mention(target)))
                } else {
                    Err(Rejection::NotFriends)
                }
            }
            Command::Friends(target) => Ok(self.friends(ctx, target)),
            Command::Rep(target) => {
                if target == ctx.author {
                    return Err(Rejection::SelfTarget);
                }
                self.social().allow_rep(ctx.server, ctx.author, ctx.now)?;
                let total = self.store.add_reputation(ctx.server, target, 1);
                ctx.touch(target);
                Ok(format!("⭐ {} gave +1 reputation to {} (now {})", mention(ctx.author), mention(target), total))
            }
            Command::Reputation(target) => {
                let target = target.unwrap_or(ctx.author);
                let points = self.store.get_reputation(ctx.server, target);
                Ok(format!("⭐ {} has **{}** reputation ({})", mention(target), points, reputation_rank(points)))
            }
            Command::Gift(target) => {
                if target == ctx.author {
                    return Err(Rejection::SelfTarget);
                }
                let total = self.store.add_gift(ctx.server, target);
                ctx.touch(target);
                Ok(format!("🎁 {} sent a gift to {}! ({} gifts received)", mention(ctx.author), mention(target), total))
            }
            Command::SocialStats(target) => Ok(self.social_stats(ctx, target)),
            Command::Achievements(target) => Ok(self.list_achievements(ctx, target)),
            Command::Badges(target) => Ok(self.list_badges(ctx, target)),
            Command::GiveBadge { target, query } => {
                ctx.require_owner()?;
                let badge = self
                    .badges
                    .find_by_name(&query)
                    .ok_or_else(|| Rejection::BadgeNotFound(query.clone()))?;
                self.store.give_badge(ctx.server, target, badge.id)?;
                Ok(format!("🏅 {} received the {} {} badge", mention(target), badge.emoji, badge.name))
            }
            Command::Warn { target, reason } => {
                ctx.require_owner()?;
                let count = self.store.add_warning(ctx.server, target, &reason, Some(ctx.author));
                let stored = self
                    .store
                    .get_warnings(ctx.server, target)
                    .pop()
                    .map(|w| w.reason)
                    .unwrap_or(reason);
                Ok(format!("⚠️ {} has been warned: {} (warning #{})", mention(target), stored, count))
            }
            Command::Warnings(target) => {
                let target = target.unwrap_or(ctx.author);
                if target != ctx.author {
                    ctx.require_owner()?;
                }
                Ok(self.warnings(ctx, target))
            }
            Command::ClearWarnings(target) => {
                ctx.require_owner()?;
                let cleared = self.store.clear_warnings(ctx.server, target);
                Ok(format!("🧹 Cleared {} warning(s) for {}", cleared, mention(target)))
            }
            Command::Mute { target, seconds } => {
                ctx.require_owner()?;
                if target == ctx.author {
                    return Err(Rejection::SelfTarget);
                }
                self.store.mute(ctx.server, target, seconds);
                Ok(match seconds {
                    Some(secs) => format!("🔇 {} has been muted for {}s", mention(target), secs),
                    None => format!("🔇 {} has been muted", mention(target)),
                })
            }
            Command::Unmute(target) => {
                ctx.require_owner()?;
                self.store.unmute(ctx.server, target)?;
                Ok(format!("🔊 {} has been unmuted", mention(target)))
            }
            Command::Unknown(name) => Ok(format!(
                "Unknown command `{}{}`. Try `{}help`.",
                self.parser.prefix(),
                name,
                self.parser.prefix()
            )),
            Command::Invalid(usage) => Ok(usage),
        }
    }

    fn find_banner(&self, query: &str) -> Result<&Cosmetic, Rejection> {
        self.banners
            .find_by_name(query)
            .ok_or_else(|| Rejection::CosmeticNotFound(query.trim().to_string()))
    }

    fn help(&self) -> String {
        let p = self.parser.prefix();
        let mut out = format!("📖 **{} commands**\n", self.config.bot.name);
        let sections: [(&str, &[&str]); 6] = [
            ("Profile", &["profile [@user]", "rank [@user]", "leaderboard", "setbio <text>", "settitle <text>", "togglenotifications", "warnings"]),
            ("Banners", &["banners", "bannerpreview <name>", "setbanner <name>", "mybanners [@user]"]),
            ("Family", &["marry @user", "accept", "reject", "divorce", "marriage [@user]", "adopt <name>", "children [@user]"]),
            ("Social", &["addfriend @user", "unfriend @user", "friends [@user]", "rep @user", "reputation [@user]", "gift @user", "socialstats [@user]"]),
            ("Achievements", &["achievements [@user]", "badges [@user]"]),
            ("Owner", &["givexp @user <n>", "givebanner @user <name>", "givebadge @user <name>", "warn @user [reason]", "warnings @user", "clearwarnings @user", "mute @user [duration]", "unmute @user"]),
        ];
        for (title, cmds) in sections {
            let list: Vec<String> = cmds.iter().map(|c| format!("`{}{}`", p, c)).collect();
            let _ = writeln!(out, "**{}:** {}", title, list.join(", "));
        }
        out.trim_end().to_string()
    }

    fn profile(&self, ctx: &mut Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        if target != ctx.author {
            self.store.increment_profile_views(ctx.server, target);
            ctx.touch(target);
        }
        let profile = self.store.get_profile(ctx.server, target);
        let levels = self.store.get_level_record(ctx.server, target);
        let info = self.tracker.curve().level_info(levels.xp);
        let banner = self
            .banners
            .get(&profile.banner)
            .or_else(|| self.banners.get(self.store.default_banner()));

        let mut out = String::new();
        let emoji = banner.map(|b| b.emoji).unwrap_or("👤");
        let _ = writeln!(out, "{} **Profile of {}** - {}", emoji, mention(target), profile.title);
        let _ = writeln!(out, "{}", profile.bio);
        let _ = writeln!(out, "{}", level_line(&info));
        if let Some(b) = banner {
            let _ = writeln!(out, "Banner: {} ({})", b.display(), b.rarity.label());
        }
        let _ = writeln!(
            out,
            "Messages: {} | Reputation: {} | Views: {}",
            levels.messages,
            self.store.get_reputation(ctx.server, target),
            profile.profile_views
        );
        let badges: Vec<String> = profile
            .badges
            .iter()
            .filter_map(|id| self.badges.get(id))
            .map(|b| format!("{} {}", b.emoji, b.name))
            .collect();
        if !badges.is_empty() {
            let _ = writeln!(out, "Badges: {}", badges.join(", "));
        }
        let _ = writeln!(
            out,
            "Achievements: {}/{}",
            self.store.get_achievements(ctx.server, target).len(),
            self.achievements.len()
        );
        let _ = write!(out, "Member since {}", profile.created_at.format("%Y-%m-%d"));
        out
    }

    fn rank(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let levels = self.store.get_level_record(ctx.server, target);
        let info = self.tracker.curve().level_info(levels.xp);
        let board = self.store.leaderboard(ctx.server, usize::MAX);
        let position = board.iter().position(|(id, _)| *id == target);
        let rank = match position {
            Some(idx) => format!("#{} of {}", idx + 1, board.len()),
            None => "unranked".to_string(),
        };
        format!(
            "📊 {} - {}\n{}\nTotal XP: {} | Messages: {}",
            mention(target),
            rank,
            level_line(&info),
            levels.xp,
            levels.messages
        )
    }

    fn leaderboard(&self, ctx: &Ctx) -> String {
        let rows = self.store.leaderboard(ctx.server, LEADERBOARD_SIZE);
        if rows.is_empty() {
            return "🏆 Nobody has earned XP here yet.".to_string();
        }
        let mut out = String::from("🏆 **Leaderboard**");
        for (idx, (user, rec)) in rows.iter().enumerate() {
            let level = self.tracker.curve().level_info(rec.xp).level;
            let _ = write!(out, "\n{}. {} - level {} ({} XP)", idx + 1, mention(*user), level, rec.xp);
        }
        out
    }

    fn list_banners(&self, ctx: &Ctx) -> String {
        let profile = self.store.get_profile(ctx.server, ctx.author);
        let mut out = String::from("🎨 **Banners**");
        for rarity in Rarity::ALL {
            let entries: Vec<String> = self
                .banners
                .iter()
                .filter(|b| b.rarity == rarity)
                .map(|b| {
                    let mut line = b.display();
                    line.push_str(if self.store.has_cosmetic(ctx.server, ctx.author, b.id) { " ✅" } else { " 🔒" });
                    if b.id == profile.banner {
                        line.push_str(" 🎯");
                    }
                    line
                })
                .collect();
            if !entries.is_empty() {
                let _ = write!(out, "\n**{}:** {}", rarity.label(), entries.join(", "));
            }
        }
        let _ = write!(
            out,
            "\nUse `{p}bannerpreview <name>` to preview and `{p}setbanner <name>` to equip.",
            p = self.parser.prefix()
        );
        out
    }

    fn banner_preview(&self, ctx: &Ctx, query: &str) -> Result<String, Rejection> {
        let banner = self.find_banner(query)?;
        let status = if self.store.has_cosmetic(ctx.server, ctx.author, banner.id) {
            format!("✅ Unlocked. Use `{}setbanner {}` to equip it.", self.parser.prefix(), banner.name)
        } else {
            "🔒 Locked. Complete achievements to unlock it.".to_string()
        };
        Ok(format!(
            "🎨 **{}** ({})\n{}\n{}",
            banner.display(),
            banner.rarity.label(),
            banner.image_url,
            status
        ))
    }

    fn owned_banners(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let profile = self.store.get_profile(ctx.server, target);
        let mut owned: Vec<String> = Vec::new();
        if let Some(default) = self.banners.get(self.store.default_banner()) {
            owned.push(default.display());
        }
        owned.extend(
            self.store
                .get_unlocked_cosmetics(ctx.server, target)
                .iter()
                .map(|c| match self.banners.get(&c.id) {
                    Some(b) => b.display(),
                    None => c.name.clone(),
                }),
        );
        format!(
            "🎨 {} owns {}/{} banners: {}\nActive: {}",
            mention(target),
            owned.len(),
            self.banners.len(),
            owned.join(", "),
            self.banners.get(&profile.banner).map(|b| b.display()).unwrap_or(profile.banner)
        )
    }

    fn marry(&self, ctx: &mut Ctx, target: UserId) -> Result<String, Rejection> {
        if target == ctx.author {
            return Err(Rejection::SelfTarget);
        }
        if self.store.is_married(ctx.server, ctx.author) {
            return Err(Rejection::AlreadyMarried);
        }
        if self.store.is_married(ctx.server, target) {
            return Err(Rejection::PartnerAlreadyMarried);
        }
        self.social().propose(ctx.server, ctx.author, target, ctx.now)?;
        let p = self.parser.prefix();
        Ok(format!(
            "💍 {} proposed to {}! Reply `{}accept` or `{}reject` within {} seconds.",
            mention(ctx.author),
            mention(target),
            p,
            p,
            self.config.social.proposal_timeout_seconds
        ))
    }

    fn marriage(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        match self.store.get_marriage(ctx.server, target) {
            Some(m) => {
                let days = (Utc::now() - m.married_at).num_days().max(0);
                format!(
                    "💍 {} is married to {} since {} ({} days)",
                    mention(target),
                    mention(m.partner),
                    m.married_at.format("%Y-%m-%d"),
                    days
                )
            }
            None => match self.social().pending_for(ctx.server, target, ctx.now) {
                Some(p) => format!("💍 {} is single, with a pending proposal from {}", mention(target), mention(p.from)),
                None => format!("💍 {} is single", mention(target)),
            },
        }
    }

    fn children(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let kids = self.store.get_children(ctx.server, target);
        if kids.is_empty() {
            return format!("👶 {} has no children yet.", mention(target));
        }
        let mut out = format!("👨‍👩‍👧 **Children of {}**", mention(target));
        for kid in &kids {
            let _ = write!(
                out,
                "\n• {} (level {}, happiness {}%, adopted {})",
                kid.name,
                kid.level,
                kid.happiness,
                kid.adopted_at.format("%Y-%m-%d")
            );
        }
        out
    }

    fn friends(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let friends = self.store.get_friends(ctx.server, target);
        if friends.is_empty() {
            return format!("👥 {} has no friends listed yet.", mention(target));
        }
        let list: Vec<String> = friends.iter().map(|f| mention(*f)).collect();
        format!(
            "👥 {} has {}/{} friends: {}",
            mention(target),
            friends.len(),
            self.config.social.max_friends,
            list.join(", ")
        )
    }

    fn social_stats(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let status = match self.store.get_marriage(ctx.server, target) {
            Some(m) => format!("married to {}", mention(m.partner)),
            None => "single".to_string(),
        };
        let rep = self.store.get_reputation(ctx.server, target);
        format!(
            "📊 **Social stats for {}**\nStatus: {}\nChildren: {} | Friends: {}\nReputation: {} ({}) | Gifts received: {}",
            mention(target),
            status,
            self.store.get_children(ctx.server, target).len(),
            self.store.get_friends(ctx.server, target).len(),
            rep,
            reputation_rank(rep),
            self.store.get_gifts(ctx.server, target)
        )
    }

    fn list_achievements(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let earned = self.store.get_achievements(ctx.server, target);
        let progress = crate::achievements::Progress::gather(&self.store, &self.tracker, ctx.server, target);
        let mut out = format!(
            "🏆 **Achievements of {}** ({}/{})",
            mention(target),
            earned.len(),
            self.achievements.len()
        );
        for def in &self.achievements {
            if earned.iter().any(|a| a.id == def.id) {
                let _ = write!(out, "\n✅ {} {} - {}", def.icon, def.name, def.description);
            } else {
                let (current, goal) = progress.measure(def.trigger);
                let _ = write!(
                    out,
                    "\n🔒 {} {} - {} ({}/{})",
                    def.icon,
                    def.name,
                    def.description,
                    current.min(goal),
                    goal
                );
            }
        }
        out
    }

    fn list_badges(&self, ctx: &Ctx, target: Option<UserId>) -> String {
        let target = target.unwrap_or(ctx.author);
        let profile = self.store.get_profile(ctx.server, target);
        if profile.badges.is_empty() {
            return format!("🏅 {} has no badges yet.", mention(target));
        }
        let mut out = format!("🏅 **Badges of {}**", mention(target));
        for id in &profile.badges {
            match self.badges.get(id) {
                Some(b) => {
                    let _ = write!(out, "\n{} {} - {}", b.emoji, b.name, b.description);
                }
                None => {
                    let _ = write!(out, "\n{}", id);
                }
            }
        }
        out
    }

    fn warnings(&self, ctx: &Ctx, target: UserId) -> String {
        let warnings = self.store.get_warnings(ctx.server, target);
        if warnings.is_empty() {
            return format!("✅ {} has no warnings.", mention(target));
        }
        let mut out = format!("⚠️ **{} warning(s) for {}**", warnings.len(), mention(target));
        for (idx, w) in warnings.iter().enumerate() {
            let _ = write!(out, "\n{}. {} ({})", idx + 1, w.reason, w.timestamp.format("%Y-%m-%d %H:%M"));
        }
        out
    }
}
