//! Test utilities & fixtures.
//! Every helper works inside a fresh temp dir so tests never share a data file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use merlin::bot::Bot;
use merlin::config::Config;
use merlin::store::{Store, StoreOptions};

pub const OWNER: u64 = 900;

/// Data file location inside `dir`.
pub fn data_file(dir: &Path) -> PathBuf {
    dir.join("data").join("merlin_data.json")
}

/// Store with no debounce so the flusher writes as soon as it is poked.
#[allow(dead_code)]
pub async fn open_store(dir: &Path) -> Store {
    Store::open(StoreOptions::new(data_file(dir)).with_debounce(Duration::ZERO)).await
}

/// Config with deterministic XP (20 per message) and one owner.
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.bot.owner_ids = vec![OWNER];
    config.storage.data_file = data_file(dir).to_string_lossy().into_owned();
    config.storage.save_debounce_ms = 0;
    config.leveling.message_xp_min = 20;
    config.leveling.message_xp_max = 20;
    config.logging.file = None;
    config
}

#[allow(dead_code)]
pub async fn bot_with_config(config: Config) -> Bot {
    let store = Store::open(StoreOptions::from_config(&config)).await;
    Bot::new(config, store).expect("bot")
}

#[allow(dead_code)]
pub async fn test_bot(dir: &Path) -> Bot {
    bot_with_config(test_config(dir)).await
}
