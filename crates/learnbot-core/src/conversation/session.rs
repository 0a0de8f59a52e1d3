//! Per-user session data.

use std::collections::HashMap;

use crate::error::Flow;

/// Step a user is at inside a guided flow. No session means idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingTrigger,
    AwaitingResponseType,
    AwaitingResponseContent,
    BrowsingTriggerPages,
    AwaitingDeleteConfirmation,
}

impl SessionState {
    /// The flow this step belongs to.
    pub fn flow(&self) -> Flow {
        match self {
            Self::AwaitingTrigger | Self::AwaitingResponseType | Self::AwaitingResponseContent => {
                Flow::Learn
            }
            Self::BrowsingTriggerPages | Self::AwaitingDeleteConfirmation => Flow::Delete,
        }
    }
}

/// Values collected along the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingKey {
    TriggerText,
    ResponseKind,
    DeleteTarget,
    DeletePage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    pub state: SessionState,
    pending: HashMap<PendingKey, String>,
    /// Trigger texts on the delete-list page being shown, in button order.
    page_items: Vec<String>,
}

impl ConversationSession {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            pending: HashMap::new(),
            page_items: Vec::new(),
        }
    }

    pub fn get(&self, key: PendingKey) -> Option<&str> {
        self.pending.get(&key).map(String::as_str)
    }

    pub fn set(&mut self, key: PendingKey, value: impl Into<String>) {
        self.pending.insert(key, value.into());
    }

    /// Stored delete-list page, 0 if none was recorded.
    pub fn page(&self) -> usize {
        self.get(PendingKey::DeletePage)
            .and_then(|p| p.parse().ok())
            .unwrap_or(0)
    }

    pub fn set_page_items(&mut self, items: Vec<String>) {
        self.page_items = items;
    }

    /// Trigger text behind the `index`-th button of the shown page.
    pub fn page_item(&self, index: usize) -> Option<&str> {
        self.page_items.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_values() {
        let mut session = ConversationSession::new(SessionState::AwaitingTrigger);
        assert_eq!(session.get(PendingKey::TriggerText), None);
        assert_eq!(session.page(), 0);

        session.set(PendingKey::TriggerText, "hello");
        session.set(PendingKey::DeletePage, "2");
        assert_eq!(session.get(PendingKey::TriggerText), Some("hello"));
        assert_eq!(session.page(), 2);
    }

    #[test]
    fn test_page_items_by_index() {
        let mut session = ConversationSession::new(SessionState::BrowsingTriggerPages);
        assert_eq!(session.page_item(0), None);

        session.set_page_items(vec!["alpha".into(), "beta".into()]);
        assert_eq!(session.page_item(1), Some("beta"));
        assert_eq!(session.page_item(2), None);
    }

    #[test]
    fn test_state_flow() {
        assert_eq!(SessionState::AwaitingResponseContent.flow(), Flow::Learn);
        assert_eq!(SessionState::AwaitingDeleteConfirmation.flow(), Flow::Delete);
    }
}
