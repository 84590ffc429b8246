//! # Merlin - Community Bot Core
//!
//! Merlin is the engine behind a community chat bot: it turns member activity
//! into experience and levels, keeps per-server profiles and a small social
//! graph, manages unlockable cosmetic banners and records moderation actions.
//! The chat gateway is deliberately outside this crate; it hands messages to
//! [`bot::Bot`] and posts whatever text comes back.
//!
//! ## Features
//!
//! - **Level Curve**: Exponential per-level cost with progress bars, pure and total over every `u64`.
//! - **Record Store**: Profiles, marriages, children, friends, reputation, gifts, achievements,
//!   unlocked cosmetics, warnings and mutes, keyed by server then user and saved atomically as JSON.
//! - **Cosmetic Catalog**: Ordered banner, badge and achievement registries with fuzzy name lookup.
//! - **Command Surface**: Prefix text commands over the store, with proposals and cooldowns.
//! - **Leveling Ledger**: Optional sled table mirroring each member's XP and level.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use merlin::bot::{Bot, Inbound};
//! use merlin::config::Config;
//! use merlin::store::{Store, StoreOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = Store::open(StoreOptions::from_config(&config)).await;
//!     let bot = Bot::new(config, store.clone())?;
//!
//!     let outcome = bot.handle_message(&Inbound::new(1, 42, "!rank"));
//!     for reply in outcome.replies {
//!         println!("{}", reply);
//!     }
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`leveling`] - Level curve, per-message XP awards and the optional ledger
//! - [`store`] - Persistent per-server user records
//! - [`catalog`] - Banners, badges and achievement definitions
//! - [`achievements`] - Achievement evaluation and reward payout
//! - [`bot`] - Message pipeline and command handlers
//! - [`config`] - Configuration loading and validation
//! - [`validation`] - Input validation for user-authored text
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Bot           │ ← Message pipeline, commands
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Leveling /      │ ← Curve, XP awards, achievements, catalog
//! │ Catalog         │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Store         │ ← Records + debounced atomic persistence
//! └─────────────────┘
//! ```

pub mod achievements;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod leveling;
pub mod logutil;
pub mod metrics;
pub mod store;
pub mod validation;
