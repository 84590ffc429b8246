//! Leveling: the XP curve, per-message awards and the optional ledger.

pub mod curve;
pub mod ledger;
pub mod xp;

pub use curve::{level_info, progress_bar, LevelCurve, LevelInfo, BAR_LENGTH};
pub use ledger::{Ledger, LedgerError, LedgerRow};
pub use xp::{XpAward, XpTracker};
