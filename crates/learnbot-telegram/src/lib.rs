//! Telegram bot interface for Learnbot.
//!
//! Admins teach the bot trigger phrases with `/learn`; afterwards anyone
//! sending that exact phrase (any letter case) gets the learned text,
//! photo, GIF or sticker back as a reply.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `SUPER_ADMIN_ID`: Always-authorized admin
//! - `LEARNBOT_UTC_OFFSET`: Offset for time placeholders (default: +07:00)
//! - `LEARNBOT_DEFAULT_LANG`: Fallback language (default: en)
//!
//! # Example
//!
//! ```no_run
//! use learnbot_core::BotConfig;
//! use learnbot_telegram::TelegramBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bot = TelegramBot::new(BotConfig::from_env()?)?;
//!     let identity = bot.get_me().await?;
//!     bot.start_polling(identity).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start`, `/help`, `/cancel`
//! - `/learn` - Teach a trigger (admins)
//! - `/deletetrigger` - Delete a trigger (admins)
//! - `/placeholders` - List text placeholders (admins)
//! - `/addadmin`, `/removeadmin`, `/listadmins` - Manage admins (admins)

pub mod bot;
pub mod callback;
pub mod error;
pub mod handlers;

pub use bot::TelegramBot;
pub use error::{Result, TelegramError};
pub use handlers::Command;
