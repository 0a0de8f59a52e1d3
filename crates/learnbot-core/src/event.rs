//! Transport-neutral inbound events and outbound replies.
//!
//! The transport converts what it receives into [`Inbound`] values and
//! delivers the [`Reply`] values the dialogue hands back. Nothing in this
//! module knows about the Bot API.

use learnbot_models::ResponseKind;

/// The user an event came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    /// IETF language tag reported by the client, e.g. `en-US`.
    pub language_code: Option<String>,
}

impl Sender {
    /// Creates a sender with only an id and first name.
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            language_code: None,
        }
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// Language code to localize replies with, if the client sent one.
    pub fn lang(&self) -> Option<&str> {
        self.language_code.as_deref()
    }
}

/// The chat an event happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    /// Group or channel title. Private chats have none.
    pub title: Option<String>,
}

impl Chat {
    pub fn private(id: i64) -> Self {
        Self { id, title: None }
    }
}

/// What an inbound message carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    /// Photo, animation or sticker, referenced by the transport's file id.
    Media { kind: ResponseKind, file_id: String },
    /// Anything else (documents, voice notes, locations ...).
    Unsupported,
}

/// A message event, as seen by the dialogue.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub sender: Sender,
    pub chat: Chat,
    pub content: Content,
    /// Sender of the message this one replies to.
    pub reply_to: Option<Sender>,
}

impl Inbound {
    /// A plain text message.
    pub fn text(sender: Sender, chat: Chat, text: impl Into<String>) -> Self {
        Self {
            sender,
            chat,
            content: Content::Text(text.into()),
            reply_to: None,
        }
    }

    /// The message text, if it is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// What pressing an inline button asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// "Teach" button shown on the welcome message.
    LearnFromStart,
    /// Response kind picked while teaching.
    ChooseKind(ResponseKind),
    /// Trigger picked from the delete list, by its position on the page.
    SelectTrigger(usize),
    /// Jump to a page of the delete list.
    Page(usize),
    ConfirmDelete,
    RejectDelete,
    /// Label-only button.
    Noop,
}

/// An inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons attached to a text reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// One button per row.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// All buttons, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// A text message to send, in Telegram's HTML subset with user values
/// already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    /// Send as a reply to the triggering message.
    pub quote: bool,
    /// Edit the message whose button was pressed instead of sending anew.
    pub replace: bool,
}

/// Something the dialogue wants delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(TextReply),
    /// Media by file id, for a learned photo/animation/sticker response.
    Media {
        kind: ResponseKind,
        file_id: String,
        quote: bool,
    },
    /// Transient notice answering the pressed button.
    Alert(String),
    /// Remove the keyboard from the message whose button was pressed.
    ClearKeyboard,
}

impl Reply {
    /// An HTML text message without keyboard.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextReply {
            text: text.into(),
            keyboard: None,
            quote: false,
            replace: false,
        })
    }

    /// An HTML text message with buttons.
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text(TextReply {
            text: text.into(),
            keyboard: Some(keyboard),
            quote: false,
            replace: false,
        })
    }

    /// Marks a text reply as replacing the pressed button's message.
    pub fn replacing(mut self) -> Self {
        if let Self::Text(ref mut t) = self {
            t.replace = true;
        }
        self
    }

    /// Marks a text reply as quoting the triggering message.
    pub fn quoting(mut self) -> Self {
        if let Self::Text(ref mut t) = self {
            t.quote = true;
        }
        self
    }

    /// Text of a text reply or alert.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.text),
            Self::Alert(a) => Some(a),
            _ => None,
        }
    }

    /// Keyboard of a text reply.
    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Text(t) => t.keyboard.as_ref(),
            _ => None,
        }
    }
}

/// The bot's own name, fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    pub first_name: String,
    pub username: Option<String>,
}
