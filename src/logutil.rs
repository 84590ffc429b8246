//! Helpers for keeping user-authored text (bios, warning reasons, child names)
//! on a single log line.

const MAX_PREVIEW: usize = 120;

/// Escape newlines, tabs, backslashes and other control characters so the text
/// cannot split a log record, truncating after a short preview.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:04X}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Compact `guild/user` tag used as the subject of store log lines.
pub fn member_tag(server_id: u64, user_id: u64) -> String {
    format!("{}/{}", server_id, user_id)
}
