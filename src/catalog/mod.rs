//! # Cosmetic Catalog
//!
//! Static, code-defined registries of banners, badges and achievements. Each
//! registry is an explicitly ordered list: fuzzy name resolution returns the
//! first entry that matches, so the order is part of the contract.
//!
//! ## Name resolution
//!
//! [`Catalog::find_by_name`] tries, in priority order:
//!
//! 1. exact id (case-insensitive)
//! 2. exact display name (case-insensitive)
//! 3. substring in either direction after lowercasing and stripping spaces,
//!    underscores and hyphens
//!
//! ```
//! use merlin::catalog::banners;
//!
//! let catalog = banners();
//! assert_eq!(catalog.find_by_name("AURA").map(|b| b.id), Some("aura_farmer"));
//! ```

pub mod achievements;
pub mod badges;
pub mod banners;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use achievements::{achievements, AchievementDef, AchievementTrigger, Reward};
pub use badges::{badges, Badge};
pub use banners::{banners, Cosmetic};

/// Presentation-only rarity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Anything addressable by id and display name.
pub trait CatalogEntry {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Ordered registry of entries.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    entries: Vec<T>,
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl<T: CatalogEntry> Catalog<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a user-typed name to an entry. See the module docs for the
    /// matching tiers.
    pub fn find_by_name(&self, query: &str) -> Option<&T> {
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        if let Some(hit) = self.entries.iter().find(|e| e.id().to_lowercase() == wanted) {
            return Some(hit);
        }
        if let Some(hit) = self.entries.iter().find(|e| e.name().to_lowercase() == wanted) {
            return Some(hit);
        }

        let needle = squash(&wanted);
        if needle.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| {
            let hay = squash(e.name());
            !hay.is_empty() && (hay.contains(&needle) || needle.contains(&hay))
        })
    }
}

impl<'a, T> IntoIterator for &'a Catalog<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Entry(&'static str, &'static str);

    impl CatalogEntry for Entry {
        fn id(&self) -> &str {
            self.0
        }
        fn name(&self) -> &str {
            self.1
        }
    }

    fn sample() -> Catalog<Entry> {
        Catalog::new(vec![
            Entry("assassin", "Assassin"),
            Entry("aura_farmer", "Aura Farmer"),
            Entry("space", "Deep Space"),
            Entry("spacey", "Space"),
        ])
    }

    #[test]
    fn substring_match_scenario() {
        assert_eq!(sample().find_by_name("AURA").map(|e| e.0), Some("aura_farmer"));
    }

    #[test]
    fn id_beats_name() {
        // "space" is the id of Deep Space and the display name of another entry
        assert_eq!(sample().find_by_name("space").map(|e| e.0), Some("space"));
    }

    #[test]
    fn exact_name_beats_substring() {
        assert_eq!(sample().find_by_name("deep space").map(|e| e.0), Some("space"));
        assert_eq!(sample().find_by_name("Aura Farmer").map(|e| e.0), Some("aura_farmer"));
    }

    #[test]
    fn separators_are_ignored() {
        assert_eq!(sample().find_by_name("aura-farmer").map(|e| e.0), Some("aura_farmer"));
        assert_eq!(sample().find_by_name("deepspace").map(|e| e.0), Some("space"));
        // query containing the whole name also matches
        assert_eq!(sample().find_by_name("the assassin banner").map(|e| e.0), Some("assassin"));
    }

    #[test]
    fn first_in_order_wins_on_ambiguity() {
        // "as" is inside both "assassin" and "deepspace"; catalog order decides
        assert_eq!(sample().find_by_name("as").map(|e| e.0), Some("assassin"));
    }

    #[test]
    fn empty_and_unknown() {
        assert!(sample().find_by_name("").is_none());
        assert!(sample().find_by_name(" - _ ").is_none());
        assert!(sample().find_by_name("dragon").is_none());
    }

    #[test]
    fn rarity_ordering_and_serde() {
        assert!(Rarity::Common < Rarity::Legendary);
        assert_eq!(serde_json::to_string(&Rarity::Epic).unwrap(), "\"epic\"");
        assert_eq!(Rarity::Rare.to_string(), "Rare");
    }
}
