//! `{token}` substitution for learned text responses.
//!
//! Substitution is a single left-to-right pass: a value inserted for one
//! token is never scanned again, so a user named `{id}` stays `{id}`.

use chrono::{DateTime, FixedOffset};

use crate::event::{BotIdentity, Chat, Sender};

/// Everything a token can expand to.
pub struct PlaceholderContext<'a> {
    pub sender: &'a Sender,
    pub chat: &'a Chat,
    pub bot: &'a BotIdentity,
    pub now: DateTime<FixedOffset>,
}

impl PlaceholderContext<'_> {
    /// Value for a token, HTML-escaped where it comes from a user.
    fn value(&self, token: &str) -> Option<String> {
        let value = match token {
            "date" => self.now.format("%Y-%m-%d").to_string(),
            "time" => self.now.format("%H:%M:%S").to_string(),
            "datetime" => self.now.format("%Y-%m-%d %H:%M:%S").to_string(),
            "firstname" => html_escape(&self.sender.first_name),
            "lastname" => html_escape(self.sender.last_name.as_deref().unwrap_or("")),
            "fullname" => html_escape(&self.sender.full_name()),
            "username" => html_escape(self.sender.username.as_deref().unwrap_or("")),
            "id" => self.sender.id.to_string(),
            "mention" => mention_html(self.sender),
            "chat_id" => self.chat.id.to_string(),
            "chat_title" => html_escape(self.chat.title.as_deref().unwrap_or("")),
            "bot_firstname" => html_escape(&self.bot.first_name),
            "bot_username" => html_escape(self.bot.username.as_deref().unwrap_or("")),
            _ => return None,
        };
        Some(value)
    }
}

/// Expands every known token in `template`.
pub fn render(template: &str, ctx: &PlaceholderContext<'_>) -> String {
    substitute(template, |token| ctx.value(token))
}

/// Replaces `{name}` occurrences for which `resolve` returns a value.
///
/// Unknown names and unbalanced braces are copied through untouched.
pub fn substitute<F>(template: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                match resolve(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Clickable mention of a user.
pub fn mention_html(sender: &Sender) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        sender.id,
        html_escape(&sender.full_name())
    )
}
