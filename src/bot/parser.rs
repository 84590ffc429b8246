//! Prefix command parser.
//!
//! Turns `!name args...` into a [`Command`]. Names are case-insensitive and
//! a few aliases from the older command set are kept (`level`, `lb`).
//! Text without the prefix is not a command and yields `None`.

use log::trace;

use crate::store::UserId;
use crate::validation::parse_user_ref;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    // profile and leveling
    Profile(Option<UserId>),
    Rank(Option<UserId>),
    Leaderboard,
    SetBio(String),
    SetTitle(String),
    GiveXp { target: UserId, amount: u64 },
    ToggleNotifications,
    // banners
    Banners,
    BannerPreview(String),
    SetBanner(String),
    MyBanners(Option<UserId>),
    GiveBanner { target: UserId, query: String },
    // marriage and family
    Marry(UserId),
    Accept,
    Reject,
    Divorce,
    Marriage(Option<UserId>),
    Adopt(String),
    Children(Option<UserId>),
    // friends, reputation, gifts
    AddFriend(UserId),
    Unfriend(UserId),
    Friends(Option<UserId>),
    Rep(UserId),
    Reputation(Option<UserId>),
    Gift(UserId),
    SocialStats(Option<UserId>),
    // achievements and badges
    Achievements(Option<UserId>),
    Badges(Option<UserId>),
    GiveBadge { target: UserId, query: String },
    // moderation
    Warn { target: UserId, reason: String },
    /// `None` is the author's own list.
    Warnings(Option<UserId>),
    ClearWarnings(UserId),
    Mute { target: UserId, seconds: Option<u64> },
    Unmute(UserId),
    /// Prefixed but not a known command name.
    Unknown(String),
    /// Known command with missing or malformed arguments; carries usage text.
    Invalid(String),
}

pub struct CommandParser {
    prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, raw: &str) -> Option<Command> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix(self.prefix.as_str())?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        if name.is_empty() {
            return None;
        }
        let cmd = self.parse_named(&name.to_ascii_lowercase(), rest);
        trace!("Parsed {:?} from '{}'", cmd, raw);
        Some(cmd)
    }

    fn usage(&self, text: &str) -> Command {
        Command::Invalid(format!("Usage: {}{}", self.prefix, text))
    }

    fn parse_named(&self, name: &str, rest: &str) -> Command {
        match name {
            "help" | "commands" => Command::Help,
            "profile" => Command::Profile(optional_user(rest)),
            "rank" | "level" => Command::Rank(optional_user(rest)),
            "leaderboard" | "lb" | "top" => Command::Leaderboard,
            "setbio" => text_arg(rest).map(Command::SetBio).unwrap_or_else(|| self.usage("setbio <text>")),
            "settitle" => text_arg(rest).map(Command::SetTitle).unwrap_or_else(|| self.usage("settitle <text>")),
            "givexp" => match user_then_rest(rest) {
                Some((target, amount)) => match amount.parse::<u64>() {
                    Ok(amount) => Command::GiveXp { target, amount },
                    Err(_) => self.usage("givexp @user <amount>"),
                },
                None => self.usage("givexp @user <amount>"),
            },
            "togglenotifications" | "levelnotifications" => Command::ToggleNotifications,
            "banners" => Command::Banners,
            "bannerpreview" => text_arg(rest).map(Command::BannerPreview).unwrap_or_else(|| self.usage("bannerpreview <name>")),
            "setbanner" => text_arg(rest).map(Command::SetBanner).unwrap_or_else(|| self.usage("setbanner <name>")),
            "mybanners" | "userbanners" => Command::MyBanners(optional_user(rest)),
            "givebanner" => match user_then_rest(rest) {
                Some((target, query)) if !query.is_empty() => Command::GiveBanner { target, query: query.to_string() },
                _ => self.usage("givebanner @user <banner>"),
            },
            "marry" => required_user(rest).map(Command::Marry).unwrap_or_else(|| self.usage("marry @user")),
            "accept" => Command::Accept,
            "reject" | "decline" => Command::Reject,
            "divorce" => Command::Divorce,
            "marriage" | "spouse" => Command::Marriage(optional_user(rest)),
            "adopt" => text_arg(rest).map(Command::Adopt).unwrap_or_else(|| self.usage("adopt <name>")),
            "children" | "kids" => Command::Children(optional_user(rest)),
            "addfriend" | "friend" => required_user(rest).map(Command::AddFriend).unwrap_or_else(|| self.usage("addfriend @user")),
            "unfriend" | "removefriend" => required_user(rest).map(Command::Unfriend).unwrap_or_else(|| self.usage("unfriend @user")),
            "friends" => Command::Friends(optional_user(rest)),
            "rep" => required_user(rest).map(Command::Rep).unwrap_or_else(|| self.usage("rep @user")),
            "reputation" => Command::Reputation(optional_user(rest)),
            "gift" => required_user(rest).map(Command::Gift).unwrap_or_else(|| self.usage("gift @user")),
            "socialstats" => Command::SocialStats(optional_user(rest)),
            "achievements" => Command::Achievements(optional_user(rest)),
            "badges" => Command::Badges(optional_user(rest)),
            "givebadge" => match user_then_rest(rest) {
                Some((target, query)) if !query.is_empty() => Command::GiveBadge { target, query: query.to_string() },
                _ => self.usage("givebadge @user <badge>"),
            },
            "warn" => match user_then_rest(rest) {
                Some((target, reason)) => Command::Warn { target, reason: reason.to_string() },
                None => self.usage("warn @user [reason]"),
            },
            "warnings" | "mywarnings" => Command::Warnings(optional_user(rest)),
            "clearwarnings" => required_user(rest).map(Command::ClearWarnings).unwrap_or_else(|| self.usage("clearwarnings @user")),
            "mute" => match user_then_rest(rest) {
                Some((target, "")) => Command::Mute { target, seconds: None },
                Some((target, secs)) => match parse_duration(secs) {
                    Some(seconds) => Command::Mute { target, seconds: Some(seconds) },
                    None => self.usage("mute @user [seconds|10m|2h|1d]"),
                },
                None => self.usage("mute @user [seconds|10m|2h|1d]"),
            },
            "unmute" => required_user(rest).map(Command::Unmute).unwrap_or_else(|| self.usage("unmute @user")),
            other => Command::Unknown(other.to_string()),
        }
    }
}

fn text_arg(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

fn optional_user(rest: &str) -> Option<UserId> {
    rest.split_whitespace().next().and_then(parse_user_ref)
}

fn required_user(rest: &str) -> Option<UserId> {
    optional_user(rest)
}

/// First token as a user, remainder trimmed.
fn user_then_rest(rest: &str) -> Option<(UserId, &str)> {
    let (first, tail) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail.trim()),
        None => (rest, ""),
    };
    parse_user_ref(first).map(|id| (id, tail))
}

/// `90`, `90s`, `10m`, `2h`, `1d`. Zero is rejected.
pub fn parse_duration(input: &str) -> Option<u64> {
    let s = input.trim().to_ascii_lowercase();
    let (digits, unit) = match s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => s.split_at(idx),
        None => (s.as_str(), ""),
    };
    let n: u64 = digits.parse().ok()?;
    let factor = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        _ => return None,
    };
    n.checked_mul(factor).filter(|secs| *secs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> CommandParser {
        CommandParser::new("!")
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(p().parse("hello there"), None);
        assert_eq!(p().parse("!"), None);
        assert_eq!(p().parse("?profile"), None);
    }

    #[test]
    fn test_mentions_and_aliases() {
        assert_eq!(p().parse("!profile <@!42>"), Some(Command::Profile(Some(42))));
        assert_eq!(p().parse("!PROFILE"), Some(Command::Profile(None)));
        assert_eq!(p().parse("!level <@7>"), Some(Command::Rank(Some(7))));
        assert_eq!(p().parse("!marry 99"), Some(Command::Marry(99)));
        assert!(matches!(p().parse("!marry someone"), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_text_arguments_keep_spacing() {
        assert_eq!(
            p().parse("!setbio  I like   turtles "),
            Some(Command::SetBio("I like   turtles".into()))
        );
        assert_eq!(
            p().parse("!givebanner <@5> aura farmer"),
            Some(Command::GiveBanner { target: 5, query: "aura farmer".into() })
        );
        assert!(matches!(p().parse("!setbio"), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_warn_reason_is_optional() {
        assert_eq!(
            p().parse("!warn <@3>"),
            Some(Command::Warn { target: 3, reason: String::new() })
        );
        assert_eq!(
            p().parse("!warn <@3> spamming links"),
            Some(Command::Warn { target: 3, reason: "spamming links".into() })
        );
    }

    #[test]
    fn test_warnings_target_is_optional() {
        assert_eq!(p().parse("!warnings"), Some(Command::Warnings(None)));
        assert_eq!(p().parse("!mywarnings"), Some(Command::Warnings(None)));
        assert_eq!(p().parse("!warnings <@3>"), Some(Command::Warnings(Some(3))));
        assert_eq!(p().parse("!togglenotifications"), Some(Command::ToggleNotifications));
    }

    #[test]
    fn test_mute_durations() {
        assert_eq!(p().parse("!mute <@3>"), Some(Command::Mute { target: 3, seconds: None }));
        assert_eq!(p().parse("!mute <@3> 10m"), Some(Command::Mute { target: 3, seconds: Some(600) }));
        assert!(matches!(p().parse("!mute <@3> 0"), Some(Command::Invalid(_))));
        assert_eq!(parse_duration("2h"), Some(7200));
        assert_eq!(parse_duration("1w"), None);
    }

    #[test]
    fn test_custom_prefix_and_unknown() {
        let parser = CommandParser::new("?");
        assert_eq!(parser.parse("?help"), Some(Command::Help));
        assert_eq!(parser.parse("?dance"), Some(Command::Unknown("dance".into())));
    }
}
