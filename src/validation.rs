//! Input validation for user-authored profile and social text.
//!
//! Limits are counted in characters, not bytes, so emoji-heavy bios are not
//! penalised. Control characters other than newline are stripped before the
//! length check.

use crate::store::Rejection;

/// Longest name a child record may carry.
pub const MAX_CHILD_NAME_CHARS: usize = 32;

/// Longest reason stored with a warning.
pub const MAX_REASON_CHARS: usize = 300;

/// Strip control characters (keeping `\n`) and surrounding whitespace.
pub fn clean_text(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn validate_bio(bio: &str, max_chars: usize) -> Result<String, Rejection> {
    let cleaned = clean_text(bio);
    if cleaned.is_empty() {
        return Err(Rejection::EmptyText("bio"));
    }
    if cleaned.chars().count() > max_chars {
        return Err(Rejection::BioTooLong { max: max_chars });
    }
    Ok(cleaned)
}

pub fn validate_title(title: &str, max_chars: usize) -> Result<String, Rejection> {
    // Titles render inline, so newlines are folded to spaces.
    let cleaned = clean_text(&title.replace('\n', " "));
    if cleaned.is_empty() {
        return Err(Rejection::EmptyText("title"));
    }
    if cleaned.chars().count() > max_chars {
        return Err(Rejection::TitleTooLong { max: max_chars });
    }
    Ok(cleaned)
}

pub fn validate_child_name(name: &str) -> Result<String, Rejection> {
    let cleaned = clean_text(&name.replace('\n', " "));
    if cleaned.is_empty() {
        return Err(Rejection::EmptyText("child name"));
    }
    if cleaned.chars().count() > MAX_CHILD_NAME_CHARS {
        return Err(Rejection::NameTooLong {
            max: MAX_CHILD_NAME_CHARS,
        });
    }
    Ok(cleaned)
}

/// Warning reasons are optional; an empty reason becomes the stock text.
pub fn normalize_reason(reason: &str) -> String {
    let cleaned = clean_text(&reason.replace('\n', " "));
    if cleaned.is_empty() {
        return "No reason provided".to_string();
    }
    cleaned.chars().take(MAX_REASON_CHARS).collect()
}

/// Parse a user mention (`<@123>`, `<@!123>`) or a bare numeric id.
pub fn parse_user_ref(token: &str) -> Option<u64> {
    let t = token.trim();
    let inner = t
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches('!'))
        .unwrap_or(t);
    if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    inner.parse::<u64>().ok().filter(|id| *id != 0)
}
