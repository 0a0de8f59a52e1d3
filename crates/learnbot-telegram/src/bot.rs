//! Main Telegram bot implementation.

use std::sync::Arc;

use learnbot_core::{BotConfig, BotIdentity, Dialogue, DialogueOptions, Localizer};
use learnbot_persistence::{JsonAdminStore, JsonTriggerStore};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::error::{Result, TelegramError};
use crate::handlers::{handle_callback, handle_command, handle_message, Command};

/// The Telegram bot for Learnbot.
pub struct TelegramBot {
    /// The teloxide bot instance.
    bot: Bot,
    config: BotConfig,
    triggers: Arc<JsonTriggerStore>,
    admins: Arc<JsonAdminStore>,
    locales: Localizer,
}

impl TelegramBot {
    /// Create a bot from startup settings, opening both tables and the
    /// locale directory.
    pub fn new(config: BotConfig) -> Result<Self> {
        let triggers = JsonTriggerStore::open(config.triggers_path())?;
        let admins = JsonAdminStore::open(config.admins_path())?;
        let locales = Localizer::load(&config.locales_dir, &config.default_language)?;

        Ok(Self {
            bot: Bot::new(config.token.clone()),
            config,
            triggers: Arc::new(triggers),
            admins: Arc::new(admins),
            locales,
        })
    }

    /// Get the bot's own name and username.
    pub async fn get_me(&self) -> Result<BotIdentity> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(BotIdentity {
            first_name: me.first_name.clone(),
            username: me.username.clone(),
        })
    }

    /// Start the bot in polling mode. Returns after Ctrl+C.
    pub async fn start_polling(self, identity: BotIdentity) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let options = DialogueOptions {
            super_admin: self.config.super_admin_id,
            utc_offset: self.config.utc_offset,
            bot: identity,
        };
        let dialogue = Arc::new(Dialogue::new(
            self.triggers,
            self.admins,
            self.locales,
            options,
        ));

        if self.config.super_admin_id.is_none() {
            warn!("SUPER_ADMIN_ID is not set; only admins already on the roster can teach");
        }
        if !dialogue.init().await {
            warn!("Admin roster could not be loaded, will retry on first privileged command");
        }

        let dialogue_for_commands = Arc::clone(&dialogue);
        let dialogue_for_messages = Arc::clone(&dialogue);
        let dialogue_for_callbacks = Arc::clone(&dialogue);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query()
                    .endpoint(move |bot: Bot, q: CallbackQuery| {
                        let dialogue = Arc::clone(&dialogue_for_callbacks);
                        async move { handle_callback(bot, q, dialogue).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let dialogue = Arc::clone(&dialogue_for_commands);
                        async move { handle_command(bot, msg, cmd, dialogue).await }
                    }),
            )
            .branch(
                // Everything else, including commands that didn't parse.
                Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                    let dialogue = Arc::clone(&dialogue_for_messages);
                    async move { handle_message(bot, msg, dialogue).await }
                }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot, handler)
            .distribution_function(sender_key)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Bot stopped");
        Ok(())
    }
}

/// Updates from the same user are handled one at a time, in order.
fn sender_key(update: &Update) -> Option<UserId> {
    update.from().map(|user| user.id)
}
