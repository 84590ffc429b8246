//! Level curve arithmetic.
//!
//! Completing level `L` (counting from 1) costs `floor(base * multiplier^(L-1))`
//! experience. Levels are "levels completed": a user below the first
//! threshold is level 0. Everything here is pure and never fails for any
//! `u64` input.

use serde::{Deserialize, Serialize};

use crate::config::LevelingConfig;

/// Default width of a rendered progress bar.
pub const BAR_LENGTH: usize = 20;
pub const BAR_FILLED: char = '█';
pub const BAR_EMPTY: char = '░';

/// Derived view of a user's experience. Computed from total XP alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub current_xp_in_level: u64,
    /// Experience needed to complete the current level. Zero at the level cap.
    pub required_xp_for_level: u64,
    pub progress_percent: u8,
    pub total_xp: u64,
}

impl LevelInfo {
    pub fn progress_bar(&self) -> String {
        progress_bar(self.progress_percent, BAR_LENGTH)
    }

    pub fn is_max_level(&self) -> bool {
        self.required_xp_for_level == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCurve {
    base_xp: u64,
    multiplier: f64,
    max_level: u32,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::new(100, 1.5, 100)
    }
}

impl LevelCurve {
    pub fn new(base_xp: u64, multiplier: f64, max_level: u32) -> Self {
        Self {
            base_xp,
            multiplier,
            max_level,
        }
    }

    pub fn from_config(cfg: &LevelingConfig) -> Self {
        Self::new(cfg.base_xp, cfg.xp_multiplier, cfg.max_level)
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Experience needed to complete `level` (1-based). Saturates at `u64::MAX`.
    pub fn requirement(&self, level: u32) -> u64 {
        if level == 0 {
            return 0;
        }
        let exp = i32::try_from(level - 1).unwrap_or(i32::MAX);
        let raw = self.base_xp as f64 * self.multiplier.powi(exp);
        // float -> int casts saturate, NaN becomes 0
        raw.floor() as u64
    }

    /// Total experience at which `level` is reached.
    pub fn threshold(&self, level: u32) -> u64 {
        (1..=level.min(self.max_level)).fold(0u64, |acc, l| acc.saturating_add(self.requirement(l)))
    }

    pub fn level_info(&self, total_xp: u64) -> LevelInfo {
        let mut level: u32 = 0;
        let mut floor: u64 = 0;

        loop {
            if level >= self.max_level {
                return self.capped(level, floor, total_xp);
            }
            let req = self.requirement(level + 1);
            if req == 0 || floor == u64::MAX {
                return self.capped(level, floor, total_xp);
            }
            let next = floor.saturating_add(req);
            if total_xp < next {
                let current = total_xp - floor;
                let pct = (current as u128 * 100 / req as u128).min(100) as u8;
                return LevelInfo {
                    level,
                    current_xp_in_level: current,
                    required_xp_for_level: req,
                    progress_percent: pct,
                    total_xp,
                };
            }
            level += 1;
            floor = next;
        }
    }

    fn capped(&self, level: u32, floor: u64, total_xp: u64) -> LevelInfo {
        LevelInfo {
            level,
            current_xp_in_level: total_xp.saturating_sub(floor),
            required_xp_for_level: 0,
            progress_percent: 100,
            total_xp,
        }
    }
}

/// Level info on the default curve (base 100, multiplier 1.5, cap 100).
pub fn level_info(total_xp: u64) -> LevelInfo {
    LevelCurve::default().level_info(total_xp)
}

/// Fixed-width bar of `length` glyphs; percentages above 100 are clamped.
pub fn progress_bar(percent: u8, length: usize) -> String {
    let pct = usize::from(percent.min(100));
    let filled = length * pct / 100;
    let mut bar = String::with_capacity(length * 3);
    bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(length - filled));
    bar
}
