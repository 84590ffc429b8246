use super::{Catalog, CatalogEntry, Rarity};

/// A profile banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cosmetic {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub rarity: Rarity,
    pub image_url: &'static str,
    /// Accent colour as `#RRGGBB`.
    pub color: &'static str,
}

impl Cosmetic {
    /// Accent colour as a 24-bit integer, for embed-style renderers.
    pub fn color_value(&self) -> Option<u32> {
        u32::from_str_radix(self.color.trim_start_matches('#'), 16).ok()
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

impl CatalogEntry for Cosmetic {
    fn id(&self) -> &str {
        self.id
    }
    fn name(&self) -> &str {
        self.name
    }
}

const fn banner(
    id: &'static str,
    name: &'static str,
    emoji: &'static str,
    rarity: Rarity,
    image_url: &'static str,
    color: &'static str,
) -> Cosmetic {
    Cosmetic {
        id,
        name,
        emoji,
        rarity,
        image_url,
        color,
    }
}

const BANNERS: &[Cosmetic] = &[
    banner("assassin", "Assassin", "🗡️", Rarity::Common, "https://i.postimg.cc/XvP8qJZN/1000240088.png", "#7289DA"),
    banner("aura_farmer", "Aura Farmer", "🌟", Rarity::Rare, "https://i.postimg.cc/fbSdHvLx/1000240087.png", "#FFD700"),
    banner("unholy", "Unholy", "☠️", Rarity::Common, "https://i.postimg.cc/mk8LQhvz/1000240136.png", "#1E90FF"),
    banner("guardian", "Guardian", "🛡️", Rarity::Common, "https://i.postimg.cc/rp1L1K4N/1000240138.png", "#1E90FF"),
    banner("spartan", "Spartan", "⚔️", Rarity::Common, "https://i.postimg.cc/XqXhzJZy/1000240140.png", "#1E90FF"),
    banner("berserker", "Berserker", "⚡", Rarity::Rare, "https://i.postimg.cc/fbTvKPtF/1000240134.png", "#FFD700"),
    banner("russian_ghost", "Russian Ghost", "🩸", Rarity::Rare, "https://i.postimg.cc/5y5fLbH4/1000240210.png", "#FF08DF"),
    banner("baddie", "Baddie", "😈", Rarity::Uncommon, "https://i.postimg.cc/fyR8jvyZ/1000240227.png", "#C7C7C7"),
    banner("techno", "Techno Blade", "💘", Rarity::Legendary, "https://i.postimg.cc/QdGpjbDF/1000240218.png", "#C20A0A"),
    banner("deadpool", "Deadpool", "♦️", Rarity::Common, "https://i.postimg.cc/BnRZrYGv/1000240221.png", "#C20A0A"),
    banner("mikey", "Mikey", "👽", Rarity::Legendary, "https://i.postimg.cc/yYy3mzcz/1000240143.png", "#C2540A"),
    banner("space", "Deep Space", "🚀", Rarity::Legendary, "https://i.imgur.com/3Q3fZ8p.png", "#000080"),
    banner("fire", "Inferno", "🔥", Rarity::Epic, "https://i.imgur.com/2Q4gY9q.png", "#FF4500"),
    banner("ice", "Frozen", "❄️", Rarity::Rare, "https://i.imgur.com/1Q5hX0r.png", "#00CED1"),
    banner("neon", "Neon City", "💡", Rarity::Epic, "https://i.imgur.com/0Q6jZ1s.png", "#00FF00"),
];

/// The banner registry, in display and match order.
pub fn banners() -> Catalog<Cosmetic> {
    Catalog::new(BANNERS.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = BANNERS.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BANNERS.len());
    }

    #[test]
    fn colors_parse() {
        for b in BANNERS {
            assert!(b.color_value().is_some(), "bad colour on {}", b.id);
        }
        assert_eq!(banners().get("assassin").unwrap().color_value(), Some(0x7289DA));
    }

    #[test]
    fn resolves_display_names() {
        let c = banners();
        assert_eq!(c.find_by_name("techno blade").unwrap().id, "techno");
        assert_eq!(c.find_by_name("frozen").unwrap().id, "ice");
        assert_eq!(c.find_by_name("ghost").unwrap().id, "russian_ghost");
    }
}
