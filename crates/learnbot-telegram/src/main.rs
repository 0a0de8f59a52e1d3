//! Learnbot Telegram binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx SUPER_ADMIN_ID=123 cargo run -p learnbot-telegram
//! ```

use std::path::PathBuf;

use clap::Parser;
use learnbot_core::config::{self, BotConfig, STATE_DIR_ENV};
use learnbot_telegram::TelegramBot;
use tracing_subscriber::EnvFilter;

/// Learnbot - teach a Telegram bot to answer trigger phrases
#[derive(Parser, Debug)]
#[command(name = "learnbot-telegram")]
#[command(about = "Telegram bot that learns trigger phrases and answers them")]
struct Args {
    /// State directory (default: ~/.learnbot)
    #[arg(long, env = STATE_DIR_ENV)]
    state_dir: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(dir) = &args.state_dir {
        std::env::set_var(STATE_DIR_ENV, dir);
    }

    // Secrets from the config directory win over a local .env
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let filter = match args.verbose {
        0 => "learnbot_telegram=info,learnbot_core=info,teloxide=warn",
        1 => "learnbot_telegram=debug,learnbot_core=debug,teloxide=info",
        2 => "learnbot_telegram=trace,learnbot_core=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create all directories");
    }

    let config = BotConfig::from_env()?;
    let data_dir = config.data_dir.clone();
    let bot = TelegramBot::new(config)?;

    let identity = match bot.get_me().await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    };
    let username = identity.username.clone().unwrap_or_default();
    tracing::info!(username = %username, "Bot initialized successfully");

    println!("\n[robot] Learnbot");
    println!("   Bot: @{}", username);
    println!("   Data: {}", data_dir.display());
    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling(identity).await?;

    Ok(())
}
