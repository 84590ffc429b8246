//! Binary entrypoint for the Merlin CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `status` - load the data document and print record counts
//! - `level <xp>` - show the level, progress and bar for an XP total
//! - `console --server <id> --user <id>` - feed stdin lines through the message pipeline
//!
//! See the library crate docs for module-level details: `merlin::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use merlin::bot::{Bot, Inbound};
use merlin::config::Config;
use merlin::leveling::LevelCurve;
use merlin::metrics;
use merlin::store::{Store, StoreOptions};

#[derive(Parser)]
#[command(name = "merlin")]
#[command(about = "Leveling, profiles and social records for a community bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show stored record counts
    Status,
    /// Show level progress for an XP total
    Level {
        /// Total experience points
        xp: u64,
    },
    /// Read messages from stdin and run them through the bot
    Console {
        /// Server id the messages belong to
        #[arg(short, long, default_value_t = 1)]
        server: u64,
        /// Author id of the messages
        #[arg(short, long, default_value_t = 1)]
        user: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init runs before a config exists; elsewhere only a missing file means defaults
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load_if_present(&cli.config).await?,
    };
    if !matches!(cli.command, Commands::Init) {
        init_logging(&pre_config, cli.verbose);
    }

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Created default configuration at {}", cli.config);
            println!("Edit it, then run `merlin status` or `merlin console`.");
        }
        Commands::Status => {
            let config = load_or_default(pre_config, &cli.config);
            let store = Store::open(StoreOptions::from_config(&config)).await;
            let stats = store.stats();
            println!("{} status", config.bot.name);
            println!("  data file:          {}", store.path().display());
            println!("  servers:            {}", stats.servers);
            println!("  profiles:           {}", stats.profiles);
            println!("  level records:      {}", stats.level_records);
            println!("  marriages:          {}", stats.marriages);
            println!("  warnings:           {}", stats.warnings);
            println!("  active mutes:       {}", stats.active_mutes);
            println!("  unlocked cosmetics: {}", stats.unlocked_cosmetics);
            println!("  achievements:       {}", stats.achievements);
            store.shutdown().await?;
        }
        Commands::Level { xp } => {
            let config = load_or_default(pre_config, &cli.config);
            let info = LevelCurve::from_config(&config.leveling).level_info(xp);
            println!("Level {}", info.level);
            println!("{}", info.progress_bar());
            if info.is_max_level() {
                println!("{} XP (max level)", info.total_xp);
            } else {
                println!(
                    "{}/{} XP ({}%)",
                    info.current_xp_in_level, info.required_xp_for_level, info.progress_percent
                );
            }
        }
        Commands::Console { server, user } => {
            let config = load_or_default(pre_config, &cli.config);
            let store = Store::open(StoreOptions::from_config(&config)).await;
            let bot = Bot::new(config, store.clone())?;
            info!("Starting Merlin v{} console (server {}, user {})", env!("CARGO_PKG_VERSION"), server, user);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        let Some(line) = line? else { break };
                        let outcome = bot.handle_message(&Inbound::new(server, user, line));
                        for reply in outcome.replies {
                            println!("{}", reply);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                        break;
                    }
                }
            }

            store.shutdown().await?;
            let m = metrics::snapshot();
            info!(
                "Session totals: {} messages, {} XP, {} level-ups, {} commands ({} rejected), {} saves ({} failed)",
                m.messages_seen,
                m.xp_awarded,
                m.level_ups,
                m.commands_handled,
                m.commands_rejected,
                m.saves_ok,
                m.saves_failed
            );
        }
    }

    Ok(())
}

fn load_or_default(config: Option<Config>, path: &str) -> Config {
    config.unwrap_or_else(|| {
        warn!("No config file at {}; using defaults", path);
        Config::default()
    })
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity beats the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| std::fs::OpenOptions::new().create(true).append(true).open(path).ok());

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
