//! # Configuration Management Module
//!
//! All tunables for the bot core live in a single TOML file. Every section has
//! sensible defaults so a partially written file still loads.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - Bot identity, command prefix and owner ids
//! - [`StorageConfig`] - Location of the persisted data document and flush pacing
//! - [`LevelingConfig`] - Level curve constants and per-message XP awards
//! - [`ProfileConfig`] - Profile text limits and the starter banner
//! - [`SocialConfig`] - Proposal timeouts, cooldowns and friend limits
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use merlin::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Prefix: {}", config.bot.command_prefix());
//!     println!("Data file: {}", config.storage.data_file);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "Merlin"
//! prefix = "!"
//! owner_ids = [717689371293384766]
//!
//! [storage]
//! data_file = "./data/merlin_data.json"
//! save_debounce_ms = 500
//!
//! [leveling]
//! base_xp = 100
//! xp_multiplier = 1.5
//! message_xp_min = 15
//! message_xp_max = 25
//! cooldown_seconds = 60
//! max_level = 100
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Prefixes accepted for text commands. Anything else falls back to `!`.
pub const ALLOWED_PREFIXES: &[&str] = &["!", "?", ".", "$", ">", "^", "+"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Users allowed to run owner-only commands (grant banners, moderation).
    #[serde(default)]
    pub owner_ids: Vec<u64>,
}

fn default_prefix() -> String {
    "!".to_string()
}

impl BotConfig {
    /// The configured prefix if it is one of [`ALLOWED_PREFIXES`], otherwise `!`.
    pub fn command_prefix(&self) -> &str {
        let p = self.prefix.trim();
        if ALLOWED_PREFIXES.contains(&p) {
            p
        } else {
            "!"
        }
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Merlin".to_string(),
            prefix: default_prefix(),
            owner_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_file: String,
    /// Quiet period after a mutation before the document is written (ms).
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

fn default_save_debounce_ms() -> u64 {
    500
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "./data/merlin_data.json".to_string(),
            save_debounce_ms: default_save_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelingConfig {
    pub base_xp: u64,
    pub xp_multiplier: f64,
    pub message_xp_min: u64,
    pub message_xp_max: u64,
    pub cooldown_seconds: u64,
    pub max_level: u32,
    /// Optional sled directory mirroring the external `users` leveling table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<String>,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base_xp: 100,
            xp_multiplier: 1.5,
            message_xp_min: 15,
            message_xp_max: 25,
            cooldown_seconds: 60,
            max_level: 100,
            ledger_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub bio_max_chars: usize,
    pub title_max_chars: usize,
    /// Banner every profile starts with; always usable without unlocking.
    pub default_banner: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            bio_max_chars: 200,
            title_max_chars: 25,
            default_banner: "assassin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    pub proposal_timeout_seconds: u64,
    pub proposal_cooldown_seconds: u64,
    pub rep_cooldown_seconds: u64,
    pub max_friends: usize,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            proposal_timeout_seconds: 120,
            proposal_cooldown_seconds: 3600,
            rep_cooldown_seconds: 43200,
            max_friends: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("merlin.log".to_string()),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub leveling: LevelingConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file is `Ok(None)`.
    ///
    /// A file that exists and fails to parse or validate is still an error.
    pub async fn load_if_present(path: &str) -> Result<Option<Self>> {
        match fs::metadata(path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            _ => Self::load(path).await.map(Some),
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the level curve or the store cannot work with.
    pub fn validate(&self) -> Result<()> {
        let lv = &self.leveling;
        if lv.base_xp == 0 {
            return Err(anyhow!("leveling.base_xp must be greater than zero"));
        }
        if !(lv.xp_multiplier.is_finite() && lv.xp_multiplier > 1.0) {
            return Err(anyhow!(
                "leveling.xp_multiplier must be a finite number above 1.0 (got {})",
                lv.xp_multiplier
            ));
        }
        if lv.message_xp_min > lv.message_xp_max {
            return Err(anyhow!(
                "leveling.message_xp_min ({}) exceeds message_xp_max ({})",
                lv.message_xp_min,
                lv.message_xp_max
            ));
        }
        if lv.max_level == 0 {
            return Err(anyhow!("leveling.max_level must be at least 1"));
        }
        if self.storage.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        if self.profile.default_banner.trim().is_empty() {
            return Err(anyhow!("profile.default_banner must not be empty"));
        }
        if !crate::catalog::banners().contains(&self.profile.default_banner) {
            return Err(anyhow!(
                "profile.default_banner '{}' is not a known banner id",
                self.profile.default_banner
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.leveling.base_xp, 100);
        assert_eq!(config.profile.default_banner, "assassin");
        assert_eq!(config.bot.command_prefix(), "!");
    }

    #[test]
    fn test_invalid_prefix_falls_back() {
        let mut bot = BotConfig::default();
        bot.prefix = "##".into();
        assert_eq!(bot.command_prefix(), "!");
        bot.prefix = "?".into();
        assert_eq!(bot.command_prefix(), "?");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [bot]
            name = "Test"
            owner_ids = [42]

            [leveling]
            base_xp = 50
            xp_multiplier = 2.0
            message_xp_min = 1
            message_xp_max = 1
            cooldown_seconds = 0
            max_level = 10
            "#,
        )
        .unwrap();
        assert!(cfg.bot.is_owner(42));
        assert_eq!(cfg.bot.prefix, "!");
        assert_eq!(cfg.leveling.base_xp, 50);
        assert_eq!(cfg.storage.save_debounce_ms, 500);
        assert_eq!(cfg.social.max_friends, 50);
    }

    #[test]
    fn test_validation_rejects_bad_leveling() {
        let mut cfg = Config::default();
        cfg.leveling.message_xp_min = 30;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.leveling.xp_multiplier = 1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.leveling.max_level = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_default_banner() {
        let mut cfg = Config::default();
        cfg.profile.default_banner = "assasin".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("assasin"));

        cfg.profile.default_banner = "neon".into();
        assert!(cfg.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_if_present_only_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let missing = missing.to_str().unwrap();
        assert!(Config::load_if_present(missing).await.unwrap().is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[leveling]\nxp_multiplier = 1.0\n").unwrap();
        let err = Config::load_if_present(bad.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("xp_multiplier"));

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[storage]\ndata_file = \"./custom.json\"\n").unwrap();
        let cfg = Config::load_if_present(good.to_str().unwrap()).await.unwrap().unwrap();
        assert_eq!(cfg.storage.data_file, "./custom.json");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.storage.data_file, cfg.storage.data_file);
        assert_eq!(back.social.rep_cooldown_seconds, 43200);
    }
}
