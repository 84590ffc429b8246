use super::{Catalog, CatalogEntry};

/// Hand-awarded profile badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

impl CatalogEntry for Badge {
    fn id(&self) -> &str {
        self.id
    }
    fn name(&self) -> &str {
        self.name
    }
}

const BADGES: &[Badge] = &[
    Badge { id: "early_supporter", name: "Early Supporter", emoji: "🌟", description: "Joined in early days" },
    Badge { id: "booster", name: "Server Booster", emoji: "💎", description: "Boosting the server" },
    Badge { id: "vip", name: "VIP Member", emoji: "🎖️", description: "Special VIP status" },
    Badge { id: "helper", name: "Community Helper", emoji: "🛠️", description: "Helped other members" },
    Badge { id: "creative", name: "Creative Soul", emoji: "🎨", description: "Creative content creator" },
    Badge { id: "friendly", name: "Friendly Face", emoji: "😊", description: "Always friendly and positive" },
];

pub fn badges() -> Catalog<Badge> {
    Catalog::new(BADGES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_lookup() {
        let c = badges();
        assert_eq!(c.len(), 6);
        assert_eq!(c.find_by_name("VIP").unwrap().id, "vip");
        assert_eq!(c.find_by_name("booster").unwrap().name, "Server Booster");
        assert_eq!(c.find_by_name("helper").unwrap().id, "helper");
    }
}
