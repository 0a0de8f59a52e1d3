//! Command, message and callback handlers for the Telegram bot.
//!
//! Handlers convert teloxide types into the dialogue's events and deliver
//! whatever replies come back. Delivery failures are logged and dropped.

use std::sync::Arc;

use learnbot_core::{
    Chat, Content, Dialogue, Inbound, Keyboard, Reply, Sender, TextReply,
};
use learnbot_models::ResponseKind;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ParseMode, ReplyParameters,
    User,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::callback;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Welcome message")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Cancel the current action")]
    Cancel,

    #[command(description = "Teach a new trigger")]
    Learn,

    #[command(description = "Delete a trigger")]
    DeleteTrigger,

    #[command(description = "Add an admin: /addadmin <user_id> or reply to their message")]
    AddAdmin(String),

    #[command(description = "Remove an admin: /removeadmin <user_id> or reply to their message")]
    RemoveAdmin(String),

    #[command(description = "List admins")]
    ListAdmins,

    #[command(description = "Show placeholders usable in text responses")]
    Placeholders,
}

/// Convert a Telegram user.
pub fn sender_of(user: &User) -> Sender {
    Sender {
        id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
    }
}

/// Convert a message into a dialogue event. Messages without a sender
/// (channel posts) have none.
pub fn inbound_from(msg: &Message) -> Option<Inbound> {
    let sender = sender_of(msg.from.as_ref()?);

    let content = if let Some(text) = msg.text() {
        Content::Text(text.to_string())
    } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        media(ResponseKind::Photo, &photo.file.id)
    } else if let Some(animation) = msg.animation() {
        media(ResponseKind::Animation, &animation.file.id)
    } else if let Some(sticker) = msg.sticker() {
        media(ResponseKind::Sticker, &sticker.file.id)
    } else {
        Content::Unsupported
    };

    Some(Inbound {
        sender,
        chat: Chat {
            id: msg.chat.id.0,
            title: msg.chat.title().map(str::to_string),
        },
        content,
        reply_to: msg
            .reply_to_message()
            .and_then(|m| m.from.as_ref())
            .map(sender_of),
    })
}

fn media(kind: ResponseKind, id: &str) -> Content {
    Content::Media {
        kind,
        file_id: id.to_string(),
    }
}

/// Inline keyboard for `keyboard`.
pub fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| {
                InlineKeyboardButton::callback(button.label.clone(), callback::encode(&button.action))
            })
            .collect::<Vec<_>>()
    }))
}

/// Where replies go.
struct Target {
    chat_id: ChatId,
    /// Message a quoting reply answers.
    quote: Option<MessageId>,
    /// Message whose button was pressed.
    pressed: Option<MessageId>,
}

/// Send `replies` in order. Returns the alert text for a callback answer.
async fn deliver(bot: &Bot, target: &Target, replies: Vec<Reply>) -> Option<String> {
    let mut alert = None;

    for reply in replies {
        match reply {
            Reply::Text(text) => send_text(bot, target, text).await,
            Reply::Media {
                kind,
                file_id,
                quote,
            } => send_media(bot, target, kind, file_id, quote).await,
            Reply::Alert(text) => alert = Some(text),
            Reply::ClearKeyboard => {
                if let Some(pressed) = target.pressed {
                    if let Err(e) = bot.edit_message_reply_markup(target.chat_id, pressed).await {
                        warn!(chat_id = %target.chat_id, error = %e, "Failed to clear keyboard");
                    }
                }
            }
        }
    }

    alert
}

async fn send_text(bot: &Bot, target: &Target, reply: TextReply) {
    if let (true, Some(pressed)) = (reply.replace, target.pressed) {
        let mut edit = bot
            .edit_message_text(target.chat_id, pressed, reply.text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = &reply.keyboard {
            edit = edit.reply_markup(markup(keyboard));
        }
        match edit.await {
            Ok(_) => return,
            Err(e) => {
                debug!(chat_id = %target.chat_id, error = %e, "Edit failed, sending a new message")
            }
        }
    }

    let mut send = bot
        .send_message(target.chat_id, reply.text)
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = &reply.keyboard {
        send = send.reply_markup(markup(keyboard));
    }
    if let (true, Some(quote)) = (reply.quote, target.quote) {
        send = send.reply_parameters(ReplyParameters::new(quote));
    }
    if let Err(e) = send.await {
        warn!(chat_id = %target.chat_id, error = %e, "Failed to send message");
    }
}

async fn send_media(bot: &Bot, target: &Target, kind: ResponseKind, file_id: String, quote: bool) {
    let file = InputFile::file_id(file_id);
    let reply_to = target
        .quote
        .filter(|_| quote)
        .map(ReplyParameters::new);

    let result = match kind {
        ResponseKind::Photo => {
            let mut req = bot.send_photo(target.chat_id, file);
            if let Some(params) = reply_to {
                req = req.reply_parameters(params);
            }
            req.await.map(|_| ())
        }
        ResponseKind::Animation => {
            let mut req = bot.send_animation(target.chat_id, file);
            if let Some(params) = reply_to {
                req = req.reply_parameters(params);
            }
            req.await.map(|_| ())
        }
        ResponseKind::Sticker => {
            let mut req = bot.send_sticker(target.chat_id, file);
            if let Some(params) = reply_to {
                req = req.reply_parameters(params);
            }
            req.await.map(|_| ())
        }
        ResponseKind::Text => {
            warn!("Text reply delivered as media, ignoring");
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!(chat_id = %target.chat_id, kind = %kind, error = %e, "Failed to send media");
    }
}

/// Dispatch commands to the dialogue.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: Arc<Dialogue>,
) -> ResponseResult<()> {
    let Some(inbound) = inbound_from(&msg) else {
        return Ok(());
    };
    let sender = &inbound.sender;
    info!(chat_id = %msg.chat.id, user_id = sender.id, "Command matched: {:?}", cmd);

    let replies = match cmd {
        Command::Start => dialogue.start(sender).await,
        Command::Help => dialogue.help(sender).await,
        Command::Cancel => dialogue.cancel(sender).await,
        Command::Learn => dialogue.learn(sender).await,
        Command::DeleteTrigger => dialogue.delete_trigger(sender).await,
        Command::AddAdmin(arg) => dialogue.add_admin(&inbound, &arg).await,
        Command::RemoveAdmin(arg) => dialogue.remove_admin(&inbound, &arg).await,
        Command::ListAdmins => dialogue.list_admins(sender).await,
        Command::Placeholders => dialogue.placeholders(sender).await,
    };

    let target = Target {
        chat_id: msg.chat.id,
        quote: Some(msg.id),
        pressed: None,
    };
    deliver(&bot, &target, replies).await;
    Ok(())
}

/// Handle any message that is not a known command.
pub async fn handle_message(bot: Bot, msg: Message, dialogue: Arc<Dialogue>) -> ResponseResult<()> {
    let Some(inbound) = inbound_from(&msg) else {
        return Ok(());
    };
    debug!(chat_id = %msg.chat.id, user_id = inbound.sender.id, "Message received");

    let replies = dialogue.handle_message(&inbound).await;
    let target = Target {
        chat_id: msg.chat.id,
        quote: Some(msg.id),
        pressed: None,
    };
    deliver(&bot, &target, replies).await;
    Ok(())
}

/// Handle inline button presses.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: Arc<Dialogue>,
) -> ResponseResult<()> {
    let sender = sender_of(&q.from);
    let replies = match q.data.as_deref().and_then(callback::decode) {
        Some(action) => dialogue.handle_action(&sender, action).await,
        None => {
            debug!(user_id = sender.id, data = ?q.data, "Unknown callback payload");
            Vec::new()
        }
    };

    let alert = match &q.message {
        Some(message) => {
            let target = Target {
                chat_id: message.chat().id,
                quote: None,
                pressed: Some(message.id()),
            };
            deliver(&bot, &target, replies).await
        }
        None => replies.into_iter().find_map(|r| match r {
            Reply::Alert(text) => Some(text),
            _ => None,
        }),
    };

    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(text) = alert {
        answer = answer.text(text).show_alert(true);
    }
    if let Err(e) = answer.await {
        warn!(user_id = sender.id, error = %e, "Failed to answer callback query");
    }
    Ok(())
}
