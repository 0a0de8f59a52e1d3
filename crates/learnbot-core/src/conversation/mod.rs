//! Teach and delete flows.
//!
//! Each user has at most one [`ConversationSession`]. Every operation here
//! takes the caller, advances (or ends) their session and returns the
//! replies to send. A step that cannot continue yields a [`FlowError`],
//! which clears the session and is turned into a message in one place.
//!
//! The session map lock is only held to read or write a session, never
//! while the trigger or admin store is being called.

mod pages;
mod session;

pub use pages::{item_label, paginate, PageView, LABEL_CHARS, PAGE_SIZE};
pub use session::{ConversationSession, PendingKey, SessionState};

use std::collections::HashMap;
use std::sync::Arc;

use learnbot_models::ResponseKind;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::auth::AuthorizationCache;
use crate::error::{Flow, FlowError};
use crate::event::{Action, Button, Content, Inbound, Keyboard, Reply, Sender};
use crate::locale::Localizer;
use crate::placeholders::html_escape;
use crate::triggers::{AddOutcome, TriggerRepository};

/// How the event that started a step reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Message,
    /// An inline button press; replies edit the pressed message and
    /// denials answer as an alert.
    Button,
}

type Step = Result<Vec<Reply>, FlowError>;

/// Session owner for the guided flows.
pub struct Conversation {
    sessions: Mutex<HashMap<i64, ConversationSession>>,
    auth: Arc<AuthorizationCache>,
    triggers: TriggerRepository,
    locales: Arc<Localizer>,
}

impl Conversation {
    pub fn new(
        auth: Arc<AuthorizationCache>,
        triggers: TriggerRepository,
        locales: Arc<Localizer>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            auth,
            triggers,
            locales,
        }
    }

    /// Current step of a user's session.
    pub async fn state(&self, user_id: i64) -> Option<SessionState> {
        self.sessions.lock().await.get(&user_id).map(|s| s.state)
    }

    pub async fn has_session(&self, user_id: i64) -> bool {
        self.sessions.lock().await.contains_key(&user_id)
    }

    /// Drops a user's session, returning whether there was one.
    pub async fn clear(&self, user_id: i64) -> bool {
        let cleared = self.sessions.lock().await.remove(&user_id).is_some();
        if cleared {
            debug!(user_id, "Session cleared");
        }
        cleared
    }

    async fn session(&self, user_id: i64) -> Option<ConversationSession> {
        self.sessions.lock().await.get(&user_id).cloned()
    }

    async fn put(&self, user_id: i64, session: ConversationSession) {
        debug!(user_id, state = ?session.state, "Session updated");
        self.sessions.lock().await.insert(user_id, session);
    }

    async fn update<F>(&self, user_id: i64, flow: Flow, f: F) -> Result<(), FlowError>
    where
        F: FnOnce(&mut ConversationSession),
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user_id).ok_or(FlowError::InternalState {
            flow,
            missing: "session",
        })?;
        f(session);
        debug!(user_id, state = ?session.state, "Session updated");
        Ok(())
    }

    fn t(&self, sender: &Sender, key: &str, params: &[(&str, &str)]) -> String {
        self.locales.text(sender.lang(), key, params)
    }

    async fn authorize(&self, sender: &Sender, flow: Flow) -> Result<(), FlowError> {
        if self.auth.is_authorized(sender.id).await {
            Ok(())
        } else {
            Err(FlowError::AuthorizationDenied(flow))
        }
    }

    async fn finish(&self, sender: &Sender, origin: Origin, step: Step) -> Vec<Reply> {
        match step {
            Ok(replies) => replies,
            Err(e) => self.fail(sender, origin, e).await,
        }
    }

    /// Ends the caller's flow and describes why.
    async fn fail(&self, sender: &Sender, origin: Origin, err: FlowError) -> Vec<Reply> {
        self.clear(sender.id).await;

        let text = match &err {
            FlowError::AuthorizationDenied(flow) => {
                warn!(user_id = sender.id, ?flow, "Authorization denied");
                let key = match flow {
                    Flow::Learn => "permission_denied_learn",
                    Flow::Delete => "permission_denied_delete",
                };
                let text = self.t(sender, key, &[]);
                if origin == Origin::Button {
                    return vec![Reply::Alert(text)];
                }
                text
            }
            FlowError::Validation { value } => {
                debug!(user_id = sender.id, value = %value, "Invalid flow input");
                self.t(sender, "learn_invalid_type_selection", &[("value", html_escape(value).as_str())])
            }
            FlowError::Conflict { trigger } => {
                debug!(user_id = sender.id, trigger = %trigger, "Trigger already taught");
                self.t(sender, "learn_trigger_exists", &[("trigger", html_escape(trigger).as_str())])
            }
            FlowError::BackendUnavailable(flow) => {
                error!(user_id = sender.id, ?flow, "Store unavailable, flow aborted");
                let key = match flow {
                    Flow::Learn => "generic_error_learn",
                    Flow::Delete => "generic_error_delete",
                };
                self.t(sender, key, &[])
            }
            FlowError::InternalState { flow, missing } => {
                error!(user_id = sender.id, ?flow, missing, "Session data missing, flow aborted");
                self.t(sender, "flow_state_lost", &[("command", flow.command())])
            }
        };

        vec![shaped(Reply::text(text), origin == Origin::Button)]
    }

    // --- teach flow ---

    /// Starts teaching a trigger, superseding any current session.
    pub async fn start_learn(&self, sender: &Sender, origin: Origin) -> Vec<Reply> {
        let step = self.begin_learn(sender).await;
        self.finish(sender, origin, step).await
    }

    async fn begin_learn(&self, sender: &Sender) -> Step {
        self.authorize(sender, Flow::Learn).await?;
        self.put(sender.id, ConversationSession::new(SessionState::AwaitingTrigger))
            .await;
        info!(user_id = sender.id, "Learn flow started");
        Ok(vec![Reply::text(self.t(sender, "learn_command_prompt", &[]))])
    }

    /// Feeds a message into the caller's flow.
    ///
    /// Returns `None` when the caller has no session, so the message can be
    /// matched against triggers instead.
    pub async fn on_message(&self, inbound: &Inbound) -> Option<Vec<Reply>> {
        let sender = &inbound.sender;
        let session = self.session(sender.id).await?;

        let step = match session.state {
            SessionState::AwaitingTrigger => self.receive_trigger(inbound).await,
            SessionState::AwaitingResponseType => {
                let value = match &inbound.content {
                    Content::Text(text) => text.clone(),
                    Content::Media { kind, .. } => format!("[{}]", kind),
                    Content::Unsupported => String::new(),
                };
                self.select_kind(sender, &value).await
            }
            SessionState::AwaitingResponseContent => self.receive_content(inbound, &session).await,
            SessionState::BrowsingTriggerPages | SessionState::AwaitingDeleteConfirmation => {
                debug!(user_id = sender.id, "Message ignored while deleting");
                Ok(Vec::new())
            }
        };

        Some(self.finish(sender, Origin::Message, step).await)
    }

    async fn receive_trigger(&self, inbound: &Inbound) -> Step {
        let sender = &inbound.sender;
        let text = match inbound.as_text().map(str::trim) {
            Some(text) if !text.is_empty() && !text.starts_with('/') => text.to_string(),
            _ => return Ok(vec![Reply::text(self.t(sender, "invalid_input_for_trigger", &[]))]),
        };

        self.authorize(sender, Flow::Learn).await?;
        if self.triggers.exists(&text).await {
            return Err(FlowError::Conflict { trigger: text });
        }

        self.update(sender.id, Flow::Learn, |s| {
            s.set(PendingKey::TriggerText, text.as_str());
            s.state = SessionState::AwaitingResponseType;
        })
        .await?;

        let prompt = self.t(sender, "learn_ask_response_type", &[("trigger", html_escape(&text).as_str())]);
        Ok(vec![Reply::with_keyboard(prompt, self.kind_keyboard(sender))])
    }

    fn kind_keyboard(&self, sender: &Sender) -> Keyboard {
        let button = |kind: ResponseKind| {
            let key = match kind {
                ResponseKind::Text => "learn_button_text",
                ResponseKind::Photo => "learn_button_image",
                ResponseKind::Animation => "learn_button_gif",
                ResponseKind::Sticker => "learn_button_sticker",
            };
            Button::new(self.t(sender, key, &[]), Action::ChooseKind(kind))
        };
        Keyboard::new(
            ResponseKind::ALL
                .chunks(2)
                .map(|pair| pair.iter().copied().map(&button).collect())
                .collect(),
        )
    }

    /// Response kind picked with a button.
    pub async fn choose_kind(&self, sender: &Sender, kind: ResponseKind) -> Vec<Reply> {
        let step = match self.state(sender.id).await {
            Some(SessionState::AwaitingResponseType) => {
                self.apply_kind(sender, kind, Origin::Button).await
            }
            _ => {
                debug!(user_id = sender.id, "Kind button pressed outside the learn flow");
                Ok(vec![
                    Reply::ClearKeyboard,
                    Reply::Alert(self.t(sender, "flow_state_lost", &[("command", Flow::Learn.command())])),
                ])
            }
        };
        self.finish(sender, Origin::Button, step).await
    }

    /// Response kind typed as text.
    async fn select_kind(&self, sender: &Sender, value: &str) -> Step {
        match value.parse::<ResponseKind>() {
            Ok(kind) => self.apply_kind(sender, kind, Origin::Message).await,
            Err(_) => Err(FlowError::Validation {
                value: value.trim().to_string(),
            }),
        }
    }

    async fn apply_kind(&self, sender: &Sender, kind: ResponseKind, origin: Origin) -> Step {
        self.authorize(sender, Flow::Learn).await?;
        self.update(sender.id, Flow::Learn, |s| {
            s.set(PendingKey::ResponseKind, kind.as_str());
            s.state = SessionState::AwaitingResponseContent;
        })
        .await?;

        let key = match kind {
            ResponseKind::Text => "learn_prompt_text_response",
            ResponseKind::Photo => "learn_prompt_image_response",
            ResponseKind::Animation => "learn_prompt_gif_response",
            ResponseKind::Sticker => "learn_prompt_sticker_response",
        };
        let prompt = Reply::text(self.t(sender, key, &[]));
        Ok(match origin {
            Origin::Button => vec![Reply::ClearKeyboard, prompt],
            Origin::Message => vec![prompt],
        })
    }

    async fn receive_content(&self, inbound: &Inbound, session: &ConversationSession) -> Step {
        let sender = &inbound.sender;
        let expected: ResponseKind = session
            .get(PendingKey::ResponseKind)
            .and_then(|k| k.parse().ok())
            .ok_or(FlowError::InternalState {
                flow: Flow::Learn,
                missing: "response kind",
            })?;

        let content = match (&inbound.content, expected) {
            (Content::Text(text), ResponseKind::Text) => {
                if text.trim_start().starts_with('/') {
                    return Ok(vec![Reply::text(self.t(sender, "invalid_response_type", &[]))]);
                }
                text.clone()
            }
            (Content::Media { kind, file_id }, expected) if *kind == expected => file_id.clone(),
            _ => {
                let params = [("expected_type", expected.as_str())];
                return Ok(vec![Reply::text(self.t(sender, "learn_response_type_mismatch", &params))]);
            }
        };

        self.authorize(sender, Flow::Learn).await?;
        let trigger = session
            .get(PendingKey::TriggerText)
            .map(str::to_string)
            .ok_or(FlowError::InternalState {
                flow: Flow::Learn,
                missing: "trigger text",
            })?;

        match self.triggers.add(&trigger, expected, &content, sender.id).await {
            AddOutcome::Created => {
                self.clear(sender.id).await;
                let trigger = html_escape(&trigger);
                let text = match expected {
                    ResponseKind::Text => self.t(
                        sender,
                        "learn_response_received_text",
                        &[("response", html_escape(&content).as_str()), ("trigger", trigger.as_str())],
                    ),
                    media => self.t(
                        sender,
                        "learn_response_received_media",
                        &[("media_type", media.as_str()), ("trigger", trigger.as_str())],
                    ),
                };
                Ok(vec![Reply::text(text)])
            }
            AddOutcome::AlreadyExists => Err(FlowError::Conflict { trigger }),
            AddOutcome::Failed => Err(FlowError::BackendUnavailable(Flow::Learn)),
        }
    }

    /// Cancels a teach flow. Silent with no session and during the delete
    /// flow, which keeps its session.
    pub async fn cancel(&self, sender: &Sender) -> Vec<Reply> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&sender.id).map(|s| s.state.flow()) {
            Some(Flow::Learn) => {
                sessions.remove(&sender.id);
                drop(sessions);
                info!(user_id = sender.id, "Learn flow cancelled");
                vec![Reply::text(self.t(sender, "action_cancelled", &[]))]
            }
            _ => Vec::new(),
        }
    }

    // --- delete flow ---

    /// Lists triggers for deletion, superseding any current session.
    pub async fn start_delete(&self, sender: &Sender) -> Vec<Reply> {
        let step = self.begin_delete(sender).await;
        self.finish(sender, Origin::Message, step).await
    }

    async fn begin_delete(&self, sender: &Sender) -> Step {
        self.authorize(sender, Flow::Delete).await?;
        self.clear(sender.id).await;
        info!(user_id = sender.id, "Delete flow started");
        self.browse(sender, 0, false).await
    }

    /// Shows a page of the delete list in a fresh browsing session.
    async fn browse(&self, sender: &Sender, page: usize, replace: bool) -> Step {
        let records = self.triggers.list_all().await.map_err(|e| {
            error!(user_id = sender.id, error = %e, "Failed to list triggers");
            FlowError::BackendUnavailable(Flow::Delete)
        })?;
        let texts: Vec<String> = records.into_iter().map(|r| r.trigger_text).collect();

        let Some(view) = paginate(&texts, page) else {
            self.clear(sender.id).await;
            let notice = Reply::text(self.t(sender, "delete_trigger_list_empty", &[]));
            return Ok(vec![shaped(notice, replace)]);
        };

        let mut session = ConversationSession::new(SessionState::BrowsingTriggerPages);
        session.set(PendingKey::DeletePage, view.page.to_string());
        session.set_page_items(view.items.clone());
        self.put(sender.id, session).await;

        let current = (view.page + 1).to_string();
        let total = view.total_pages.to_string();
        let params = [("current_page", current.as_str()), ("total_pages", total.as_str())];

        let mut rows: Vec<Vec<Button>> = view
            .items
            .iter()
            .enumerate()
            .map(|(index, text)| vec![Button::new(item_label(text), Action::SelectTrigger(index))])
            .collect();

        let mut nav = Vec::new();
        if view.has_prev() {
            nav.push(Button::new(
                self.t(sender, "button_prev_page", &[]),
                Action::Page(view.page - 1),
            ));
        }
        nav.push(Button::new(self.t(sender, "button_page_info", &params), Action::Noop));
        if view.has_next() {
            nav.push(Button::new(
                self.t(sender, "button_next_page", &[]),
                Action::Page(view.page + 1),
            ));
        }
        rows.push(nav);

        let text = self.t(sender, "delete_trigger_select", &params);
        Ok(vec![shaped(Reply::with_keyboard(text, Keyboard::new(rows)), replace)])
    }

    async fn in_delete_flow(&self, user_id: i64) -> bool {
        matches!(self.state(user_id).await, Some(s) if s.flow() == Flow::Delete)
    }

    /// Navigation button. Without a delete session the list restarts at
    /// the first page.
    pub async fn show_page(&self, sender: &Sender, page: usize) -> Vec<Reply> {
        let step = self.navigate(sender, page).await;
        self.finish(sender, Origin::Button, step).await
    }

    async fn navigate(&self, sender: &Sender, page: usize) -> Step {
        self.authorize(sender, Flow::Delete).await?;
        let page = if self.in_delete_flow(sender.id).await {
            page
        } else {
            info!(user_id = sender.id, "Delete flow re-entered from a stale button");
            0
        };
        self.browse(sender, page, true).await
    }

    /// Trigger button on the delete list. `index` is the button's position
    /// on the page the session is showing.
    pub async fn select_trigger(&self, sender: &Sender, index: usize) -> Vec<Reply> {
        let step = self.ask_confirmation(sender, index).await;
        self.finish(sender, Origin::Button, step).await
    }

    async fn ask_confirmation(&self, sender: &Sender, index: usize) -> Step {
        self.authorize(sender, Flow::Delete).await?;
        let session = match self.session(sender.id).await {
            Some(session) if session.state.flow() == Flow::Delete => session,
            _ => {
                info!(user_id = sender.id, "Delete flow re-entered from a stale button");
                return self.browse(sender, 0, true).await;
            }
        };
        let Some(trigger_text) = session.page_item(index).map(str::to_string) else {
            debug!(user_id = sender.id, index, "Select button does not match the shown page");
            return self.browse(sender, session.page(), true).await;
        };

        // The page recorded while browsing stays as the page to return to.
        self.update(sender.id, Flow::Delete, |s| {
            s.set(PendingKey::DeleteTarget, trigger_text.as_str());
            s.state = SessionState::AwaitingDeleteConfirmation;
        })
        .await?;

        let prompt = self.t(
            sender,
            "delete_trigger_confirm_prompt",
            &[("trigger_text", html_escape(&trigger_text).as_str())],
        );
        let keyboard = Keyboard::new(vec![vec![
            Button::new(self.t(sender, "confirm_yes", &[]), Action::ConfirmDelete),
            Button::new(self.t(sender, "confirm_no", &[]), Action::RejectDelete),
        ]]);
        Ok(vec![Reply::with_keyboard(prompt, keyboard).replacing()])
    }

    /// "Yes" on the delete confirmation.
    pub async fn confirm_delete(&self, sender: &Sender) -> Vec<Reply> {
        let step = self.delete_selected(sender).await;
        self.finish(sender, Origin::Button, step).await
    }

    async fn delete_selected(&self, sender: &Sender) -> Step {
        self.authorize(sender, Flow::Delete).await?;
        let target = self
            .session(sender.id)
            .await
            .and_then(|s| s.get(PendingKey::DeleteTarget).map(str::to_string))
            .ok_or(FlowError::InternalState {
                flow: Flow::Delete,
                missing: "delete target",
            })?;

        let deleted = self.triggers.delete(&target).await;
        self.clear(sender.id).await;

        let key = if deleted {
            "delete_trigger_successful"
        } else {
            "delete_trigger_not_found_or_failed"
        };
        let text = self.t(sender, key, &[("trigger_text", html_escape(&target).as_str())]);
        Ok(vec![Reply::text(text).replacing()])
    }

    /// "No" on the delete confirmation: back to the page it came from.
    pub async fn reject_delete(&self, sender: &Sender) -> Vec<Reply> {
        let step = self.back_to_list(sender).await;
        self.finish(sender, Origin::Button, step).await
    }

    async fn back_to_list(&self, sender: &Sender) -> Step {
        self.authorize(sender, Flow::Delete).await?;
        let page = self.session(sender.id).await.map(|s| s.page()).unwrap_or(0);
        self.browse(sender, page, true).await
    }
}

fn shaped(reply: Reply, replace: bool) -> Reply {
    if replace {
        reply.replacing()
    } else {
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Chat;
    use learnbot_persistence::{JsonAdminStore, JsonTriggerStore};
    use tempfile::{tempdir, TempDir};

    const ADMIN: i64 = 1;

    struct Fixture {
        _dir: TempDir,
        conversation: Conversation,
        triggers: TriggerRepository,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let admins = JsonAdminStore::open(dir.path().join("admins.json")).unwrap();
        let store = JsonTriggerStore::open(dir.path().join("triggers.json")).unwrap();
        let auth = Arc::new(AuthorizationCache::new(Arc::new(admins), Some(ADMIN)));
        let triggers = TriggerRepository::new(Arc::new(store));
        let conversation =
            Conversation::new(auth, triggers.clone(), Arc::new(Localizer::builtin("en")));
        Fixture {
            _dir: dir,
            conversation,
            triggers,
        }
    }

    fn text(sender: &Sender, body: &str) -> Inbound {
        Inbound::text(sender.clone(), Chat::private(sender.id), body)
    }

    #[tokio::test]
    async fn test_learn_media_trigger() {
        let f = fixture();
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_learn(&admin, Origin::Message).await;
        c.on_message(&text(&admin, "cat pic")).await.unwrap();
        let replies = c.choose_kind(&admin, ResponseKind::Photo).await;
        assert_eq!(replies[0], Reply::ClearKeyboard);
        assert_eq!(c.state(ADMIN).await, Some(SessionState::AwaitingResponseContent));

        // Wrong kind keeps the session.
        let sticker = Inbound {
            content: Content::Media {
                kind: ResponseKind::Sticker,
                file_id: "S1".into(),
            },
            ..text(&admin, "")
        };
        c.on_message(&sticker).await.unwrap();
        assert_eq!(c.state(ADMIN).await, Some(SessionState::AwaitingResponseContent));

        let photo = Inbound {
            content: Content::Media {
                kind: ResponseKind::Photo,
                file_id: "P1".into(),
            },
            ..text(&admin, "")
        };
        c.on_message(&photo).await.unwrap();
        assert!(!c.has_session(ADMIN).await);

        let stored = f.triggers.find_response("Cat Pic").await.unwrap();
        assert_eq!(stored.response_type, ResponseKind::Photo);
        assert_eq!(stored.response_content, "P1");
    }

    #[tokio::test]
    async fn test_kind_keyboard_offers_every_kind() {
        let f = fixture();
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_learn(&admin, Origin::Message).await;
        let replies = c.on_message(&text(&admin, "wave")).await.unwrap();
        let keyboard = replies[0].keyboard().unwrap();
        assert_eq!(keyboard.rows.len(), 2);
        let kinds: Vec<Action> = keyboard.buttons().map(|b| b.action.clone()).collect();
        let expected: Vec<Action> = ResponseKind::ALL.into_iter().map(Action::ChooseKind).collect();
        assert_eq!(kinds, expected);
    }

    #[tokio::test]
    async fn test_invalid_trigger_reprompts() {
        let f = fixture();
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;
        c.start_learn(&admin, Origin::Message).await;

        for body in ["   ", "/stats"] {
            let replies = c.on_message(&text(&admin, body)).await.unwrap();
            assert_eq!(replies.len(), 1);
            assert_eq!(c.state(ADMIN).await, Some(SessionState::AwaitingTrigger));
        }
    }

    #[tokio::test]
    async fn test_existing_trigger_ends_flow() {
        let f = fixture();
        f.triggers.add("hello", ResponseKind::Text, "hi", ADMIN).await;
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_learn(&admin, Origin::Message).await;
        let replies = c.on_message(&text(&admin, "HELLO")).await.unwrap();
        assert!(replies[0].body().unwrap().contains("already exists"));
        assert!(!c.has_session(ADMIN).await);
    }

    #[tokio::test]
    async fn test_stale_kind_button() {
        let f = fixture();
        let admin = Sender::new(ADMIN, "Root");
        let replies = f.conversation.choose_kind(&admin, ResponseKind::Text).await;
        assert_eq!(replies[0], Reply::ClearKeyboard);
        assert!(matches!(replies[1], Reply::Alert(_)));
        assert!(!f.conversation.has_session(ADMIN).await);
    }

    #[tokio::test]
    async fn test_delete_flow_confirm_and_reject() {
        let f = fixture();
        for i in 0..10 {
            f.triggers.add(&format!("t{}", i), ResponseKind::Text, "x", ADMIN).await;
        }
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_delete(&admin).await;
        c.show_page(&admin, 1).await;
        // Page 1 holds t7, t8, t9.
        c.select_trigger(&admin, 1).await;
        assert_eq!(c.state(ADMIN).await, Some(SessionState::AwaitingDeleteConfirmation));

        // Rejecting returns to page 1.
        let replies = c.reject_delete(&admin).await;
        assert!(replies[0].body().unwrap().contains("page 2/2"));
        assert_eq!(c.state(ADMIN).await, Some(SessionState::BrowsingTriggerPages));

        c.select_trigger(&admin, 1).await;
        let replies = c.confirm_delete(&admin).await;
        assert!(replies[0].body().unwrap().contains("deleted"));
        assert!(!c.has_session(ADMIN).await);
        assert!(!f.triggers.exists("t8").await);
    }

    #[tokio::test]
    async fn test_select_index_outside_page_reshows_page() {
        let f = fixture();
        f.triggers.add("only", ResponseKind::Text, "x", ADMIN).await;
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_delete(&admin).await;
        let replies = c.select_trigger(&admin, 5).await;
        assert!(replies[0].body().unwrap().contains("page 1/1"));
        assert_eq!(c.state(ADMIN).await, Some(SessionState::BrowsingTriggerPages));
        assert!(f.triggers.exists("only").await);
    }

    #[tokio::test]
    async fn test_confirm_without_target_is_internal_error() {
        let f = fixture();
        let admin = Sender::new(ADMIN, "Root");
        let replies = f.conversation.confirm_delete(&admin).await;
        assert!(replies[0].body().unwrap().contains("/deletetrigger"));
        assert!(!f.conversation.has_session(ADMIN).await);
    }

    #[tokio::test]
    async fn test_navigation_after_store_emptied() {
        let f = fixture();
        f.triggers.add("only", ResponseKind::Text, "x", ADMIN).await;
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_delete(&admin).await;
        f.triggers.delete("only").await;
        let replies = c.show_page(&admin, 0).await;

        assert!(replies[0].body().unwrap().contains("no triggers"));
        assert!(!c.has_session(ADMIN).await);
    }

    #[tokio::test]
    async fn test_cancel_silent_during_delete() {
        let f = fixture();
        f.triggers.add("keep", ResponseKind::Text, "x", ADMIN).await;
        let admin = Sender::new(ADMIN, "Root");
        let c = &f.conversation;

        c.start_delete(&admin).await;
        assert!(c.cancel(&admin).await.is_empty());
        assert_eq!(c.state(ADMIN).await, Some(SessionState::BrowsingTriggerPages));
    }

    #[tokio::test]
    async fn test_denied_button_answers_with_alert() {
        let f = fixture();
        let stranger = Sender::new(99, "Eve");
        let replies = f.conversation.show_page(&stranger, 0).await;
        assert!(matches!(replies.as_slice(), [Reply::Alert(_)]));
    }
}
