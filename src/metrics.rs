//! Process-wide counters. Cheap to bump from anywhere; read via [`snapshot`].
use std::sync::atomic::{AtomicU64, Ordering};

static SAVES_OK: AtomicU64 = AtomicU64::new(0);
static SAVES_FAILED: AtomicU64 = AtomicU64::new(0);
static MESSAGES_SEEN: AtomicU64 = AtomicU64::new(0);
static XP_AWARDED: AtomicU64 = AtomicU64::new(0);
static LEVEL_UPS: AtomicU64 = AtomicU64::new(0);
static ACHIEVEMENTS_AWARDED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_HANDLED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_REJECTED: AtomicU64 = AtomicU64::new(0);

pub fn inc_save_ok() {
    SAVES_OK.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_save_failed() {
    SAVES_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_messages_seen() {
    MESSAGES_SEEN.fetch_add(1, Ordering::Relaxed);
}

pub fn add_xp_awarded(amount: u64) {
    XP_AWARDED.fetch_add(amount, Ordering::Relaxed);
}

pub fn inc_level_ups() {
    LEVEL_UPS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_achievements_awarded() {
    ACHIEVEMENTS_AWARDED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_commands_handled() {
    COMMANDS_HANDLED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_commands_rejected() {
    COMMANDS_REJECTED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub saves_ok: u64,
    pub saves_failed: u64,
    pub messages_seen: u64,
    pub xp_awarded: u64,
    pub level_ups: u64,
    pub achievements_awarded: u64,
    pub commands_handled: u64,
    pub commands_rejected: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        saves_ok: SAVES_OK.load(Ordering::Relaxed),
        saves_failed: SAVES_FAILED.load(Ordering::Relaxed),
        messages_seen: MESSAGES_SEEN.load(Ordering::Relaxed),
        xp_awarded: XP_AWARDED.load(Ordering::Relaxed),
        level_ups: LEVEL_UPS.load(Ordering::Relaxed),
        achievements_awarded: ACHIEVEMENTS_AWARDED.load(Ordering::Relaxed),
        commands_handled: COMMANDS_HANDLED.load(Ordering::Relaxed),
        commands_rejected: COMMANDS_REJECTED.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_grow() {
        let before = snapshot();
        inc_commands_handled();
        add_xp_awarded(20);
        let after = snapshot();
        // Other tests run concurrently, so only lower bounds hold
        assert!(after.commands_handled >= before.commands_handled + 1);
        assert!(after.xp_awarded >= before.xp_awarded + 20);
    }
}
