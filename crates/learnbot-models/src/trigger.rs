//! Learned trigger types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of response a trigger produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Plain text with placeholder substitution.
    Text,
    /// A photo, referenced by its channel file id.
    Photo,
    /// A GIF/animation, referenced by its channel file id.
    Animation,
    /// A sticker, referenced by its channel file id.
    Sticker,
}

impl ResponseKind {
    /// All kinds, in the order they are offered to an admin.
    pub const ALL: [ResponseKind; 4] = [
        ResponseKind::Text,
        ResponseKind::Photo,
        ResponseKind::Animation,
        ResponseKind::Sticker,
    ];

    /// Stable lowercase name, as stored and as carried in callback payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Animation => "animation",
            Self::Sticker => "sticker",
        }
    }

}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names none of the four response kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown response kind: {0}")]
pub struct ParseResponseKindError(pub String);

impl FromStr for ResponseKind {
    type Err = ParseResponseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "photo" => Ok(Self::Photo),
            "animation" => Ok(Self::Animation),
            "sticker" => Ok(Self::Sticker),
            _ => Err(ParseResponseKindError(s.to_string())),
        }
    }
}

/// Canonical form of a trigger phrase: trimmed and lower-cased.
///
/// Every store key and every lookup goes through this function.
pub fn canonical(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A learned trigger and the response it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// Canonical trigger text (unique key).
    pub trigger_text: String,

    /// Kind of the stored response.
    pub response_type: ResponseKind,

    /// Raw text, or an opaque media reference for media kinds.
    pub response_content: String,

    /// User who taught the trigger.
    pub creator_id: i64,

    /// When the trigger was taught.
    pub created_at: DateTime<Utc>,
}

impl TriggerRecord {
    /// Creates a record stamped with the current time. The trigger text is
    /// canonicalized.
    pub fn new(
        trigger_text: &str,
        response_type: ResponseKind,
        response_content: impl Into<String>,
        creator_id: i64,
    ) -> Self {
        Self {
            trigger_text: canonical(trigger_text),
            response_type,
            response_content: response_content.into(),
            creator_id,
            created_at: Utc::now(),
        }
    }
}
