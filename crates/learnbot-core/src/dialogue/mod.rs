//! Routes inbound events to the flows, the matcher and the admin commands.
//!
//! The transport calls one method per command, [`Dialogue::handle_message`]
//! for every other message, and [`Dialogue::handle_action`] for button
//! presses. Each returns the replies to deliver, possibly none.

mod admin;

use std::sync::Arc;

use chrono::FixedOffset;
use learnbot_persistence::{AdminStore, TriggerStore};
use tracing::debug;

use crate::auth::AuthorizationCache;
use crate::conversation::{Conversation, Origin, SessionState};
use crate::event::{Action, BotIdentity, Button, Inbound, Keyboard, Reply, Sender};
use crate::locale::Localizer;
use crate::matcher::Matcher;
use crate::placeholders::html_escape;
use crate::triggers::TriggerRepository;

/// Settings the dialogue needs beyond its stores.
#[derive(Debug, Clone)]
pub struct DialogueOptions {
    pub super_admin: Option<i64>,
    /// Offset for `{date}`, `{time}` and `{datetime}`.
    pub utc_offset: FixedOffset,
    pub bot: BotIdentity,
}

/// The bot's conversational behaviour, independent of any transport.
pub struct Dialogue {
    auth: Arc<AuthorizationCache>,
    admins: Arc<dyn AdminStore>,
    conversation: Conversation,
    matcher: Matcher,
    locales: Arc<Localizer>,
}

impl Dialogue {
    pub fn new(
        triggers: Arc<dyn TriggerStore>,
        admins: Arc<dyn AdminStore>,
        locales: Localizer,
        options: DialogueOptions,
    ) -> Self {
        let locales = Arc::new(locales);
        let auth = Arc::new(AuthorizationCache::new(admins.clone(), options.super_admin));
        let triggers = TriggerRepository::new(triggers);

        Self {
            conversation: Conversation::new(auth.clone(), triggers.clone(), locales.clone()),
            matcher: Matcher::new(triggers, options.bot, options.utc_offset),
            auth,
            admins,
            locales,
        }
    }

    /// Loads the admin roster into the authorization cache.
    ///
    /// A failure is logged and retried lazily on the next privileged check.
    pub async fn init(&self) -> bool {
        self.auth.load().await
    }

    /// Step of the user's current flow, if any.
    pub async fn session_state(&self, user_id: i64) -> Option<SessionState> {
        self.conversation.state(user_id).await
    }

    fn t(&self, sender: &Sender, key: &str, params: &[(&str, &str)]) -> String {
        self.locales.text(sender.lang(), key, params)
    }

    /// `/start`: welcome text, plus a teach button for admins.
    pub async fn start(&self, sender: &Sender) -> Vec<Reply> {
        self.conversation.clear(sender.id).await;
        let text = self.t(sender, "start_message", &[]);

        if self.auth.is_authorized(sender.id).await {
            let keyboard = Keyboard::column([Button::new(
                self.t(sender, "button_learn_start", &[]),
                Action::LearnFromStart,
            )]);
            vec![Reply::with_keyboard(text, keyboard)]
        } else {
            vec![Reply::text(text)]
        }
    }

    /// `/help`: command overview, plus admin management for admins.
    pub async fn help(&self, sender: &Sender) -> Vec<Reply> {
        self.conversation.clear(sender.id).await;
        let mut text = self.t(sender, "help_message", &[]);

        if self.auth.is_authorized(sender.id).await {
            text.push_str(&self.t(sender, "admin_commands_header", &[]));
            for key in ["add_admin_usage", "remove_admin_usage", "list_admins_usage"] {
                text.push_str("\n- ");
                text.push_str(&self.t(sender, key, &[]));
            }
        }
        vec![Reply::text(text)]
    }

    /// `/cancel`.
    pub async fn cancel(&self, sender: &Sender) -> Vec<Reply> {
        self.conversation.cancel(sender).await
    }

    /// `/learn`.
    pub async fn learn(&self, sender: &Sender) -> Vec<Reply> {
        self.conversation.start_learn(sender, Origin::Message).await
    }

    /// `/deletetrigger`.
    pub async fn delete_trigger(&self, sender: &Sender) -> Vec<Reply> {
        self.conversation.start_delete(sender).await
    }

    /// `/placeholders`: tokens usable in text responses.
    pub async fn placeholders(&self, sender: &Sender) -> Vec<Reply> {
        if !self.auth.is_authorized(sender.id).await {
            return vec![Reply::text(self.t(sender, "permission_denied_placeholders", &[])).quoting()];
        }

        let mut text = self.t(sender, "placeholders_command_header", &[]);
        text.push('\n');
        let items = self.locales.lookup_list(sender.lang(), "placeholders_list");
        if items.is_empty() {
            text.push('\n');
            text.push_str(&self.t(sender, "placeholders_empty", &[]));
        }
        for item in items {
            text.push('\n');
            match item.split_once(" - ") {
                Some((token, description)) => text.push_str(&format!(
                    "<code>{}</code> - {}",
                    html_escape(token),
                    html_escape(description)
                )),
                None => text.push_str(&html_escape(&item)),
            }
        }
        vec![Reply::text(text)]
    }

    /// Any message that is not a recognised command.
    ///
    /// A user inside a flow feeds it; anyone else gets a learned response
    /// if the text is a trigger.
    pub async fn handle_message(&self, inbound: &Inbound) -> Vec<Reply> {
        if let Some(replies) = self.conversation.on_message(inbound).await {
            return replies;
        }
        match self.matcher.respond(inbound).await {
            Some(reply) => vec![reply],
            None => Vec::new(),
        }
    }

    /// An inline button press.
    pub async fn handle_action(&self, sender: &Sender, action: Action) -> Vec<Reply> {
        debug!(user_id = sender.id, ?action, "Button pressed");
        match action {
            Action::LearnFromStart => self.conversation.start_learn(sender, Origin::Button).await,
            Action::ChooseKind(kind) => self.conversation.choose_kind(sender, kind).await,
            Action::SelectTrigger(index) => self.conversation.select_trigger(sender, index).await,
            Action::Page(page) => self.conversation.show_page(sender, page).await,
            Action::ConfirmDelete => self.conversation.confirm_delete(sender).await,
            Action::RejectDelete => self.conversation.reject_delete(sender).await,
            Action::Noop => Vec::new(),
        }
    }
}
