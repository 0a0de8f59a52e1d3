//! Inline button payloads.
//!
//! Telegram hands back at most 64 bytes of `callback_data` per button, so
//! payloads carry a prefix and at most one number or kind name. Delete-list
//! buttons refer to their trigger by position on the page.

use learnbot_core::Action;
use learnbot_models::ResponseKind;

const LEARN_FROM_START: &str = "start_learn_button";
const CHOOSE_KIND: &str = "learn_type:";
const SELECT_TRIGGER: &str = "del_trigger:";
const PAGE: &str = "del_page:";
const CONFIRM_DELETE: &str = "confirm_delete_yes";
const REJECT_DELETE: &str = "confirm_delete_no";
const NOOP: &str = "noop_page_display";

/// Payload for `action`.
pub fn encode(action: &Action) -> String {
    match action {
        Action::LearnFromStart => LEARN_FROM_START.to_string(),
        Action::ChooseKind(kind) => format!("{}{}", CHOOSE_KIND, kind.as_str()),
        Action::SelectTrigger(index) => format!("{}{}", SELECT_TRIGGER, index),
        Action::Page(page) => format!("{}{}", PAGE, page),
        Action::ConfirmDelete => CONFIRM_DELETE.to_string(),
        Action::RejectDelete => REJECT_DELETE.to_string(),
        Action::Noop => NOOP.to_string(),
    }
}

/// Parse a payload back into an action.
pub fn decode(data: &str) -> Option<Action> {
    match data {
        LEARN_FROM_START => return Some(Action::LearnFromStart),
        CONFIRM_DELETE => return Some(Action::ConfirmDelete),
        REJECT_DELETE => return Some(Action::RejectDelete),
        NOOP => return Some(Action::Noop),
        _ => {}
    }

    if let Some(kind) = data.strip_prefix(CHOOSE_KIND) {
        kind.parse::<ResponseKind>().ok().map(Action::ChooseKind)
    } else if let Some(index) = data.strip_prefix(SELECT_TRIGGER) {
        index.parse().ok().map(Action::SelectTrigger)
    } else if let Some(page) = data.strip_prefix(PAGE) {
        page.parse().ok().map(Action::Page)
    } else {
        None
    }
}
