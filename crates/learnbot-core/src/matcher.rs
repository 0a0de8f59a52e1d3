//! Answers plain messages that match a learned trigger.

use chrono::{DateTime, FixedOffset, Utc};
use learnbot_models::ResponseKind;
use tracing::debug;

use crate::event::{BotIdentity, Inbound, Reply};
use crate::placeholders::{render, PlaceholderContext};
use crate::triggers::TriggerRepository;

/// Exact, case-folded trigger matcher.
pub struct Matcher {
    triggers: TriggerRepository,
    bot: BotIdentity,
    utc_offset: FixedOffset,
}

impl Matcher {
    pub fn new(triggers: TriggerRepository, bot: BotIdentity, utc_offset: FixedOffset) -> Self {
        Self {
            triggers,
            bot,
            utc_offset,
        }
    }

    /// The learned response to `inbound`, if its text is a trigger.
    ///
    /// Commands and non-text messages never match.
    pub async fn respond(&self, inbound: &Inbound) -> Option<Reply> {
        let now = Utc::now().with_timezone(&self.utc_offset);
        self.respond_at(inbound, now).await
    }

    pub(crate) async fn respond_at(
        &self,
        inbound: &Inbound,
        now: DateTime<FixedOffset>,
    ) -> Option<Reply> {
        let text = inbound.as_text()?;
        if text.starts_with('/') || text.trim().is_empty() {
            return None;
        }

        let record = self.triggers.find_response(text).await?;
        debug!(
            user_id = inbound.sender.id,
            trigger = %record.trigger_text,
            kind = %record.response_type,
            "Trigger matched"
        );

        let reply = match record.response_type {
            ResponseKind::Text => {
                let ctx = PlaceholderContext {
                    sender: &inbound.sender,
                    chat: &inbound.chat,
                    bot: &self.bot,
                    now,
                };
                Reply::text(render(&record.response_content, &ctx)).quoting()
            }
            kind => Reply::Media {
                kind,
                file_id: record.response_content,
                quote: true,
            },
        };
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Chat, Content, Sender};
    use chrono::TimeZone;
    use learnbot_persistence::JsonTriggerStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn matcher(dir: &std::path::Path) -> (Matcher, TriggerRepository) {
        let store = JsonTriggerStore::open(dir.join("triggers.json")).unwrap();
        let repo = TriggerRepository::new(Arc::new(store));
        let bot = BotIdentity {
            first_name: "Learnbot".into(),
            username: Some("learn_bot".into()),
        };
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        (Matcher::new(repo.clone(), bot, offset), repo)
    }

    fn message(body: &str) -> Inbound {
        Inbound::text(Sender::new(5, "Budi"), Chat::private(5), body)
    }

    #[tokio::test]
    async fn test_text_response_rendered_and_quoted() {
        let dir = tempdir().unwrap();
        let (matcher, repo) = matcher(dir.path());
        repo.add("hello", ResponseKind::Text, "Hi {firstname}, it is {date}", 1)
            .await;

        let now = FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 12, 31, 23, 0, 0)
            .unwrap();
        let reply = matcher.respond_at(&message("HeLLo"), now).await.unwrap();

        match reply {
            Reply::Text(t) => {
                assert_eq!(t.text, "Hi Budi, it is 2024-12-31");
                assert!(t.quote);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_media_response_passes_file_id() {
        let dir = tempdir().unwrap();
        let (matcher, repo) = matcher(dir.path());
        repo.add("party", ResponseKind::Animation, "GIF123", 1).await;

        let reply = matcher.respond(&message("party")).await.unwrap();
        assert_eq!(
            reply,
            Reply::Media {
                kind: ResponseKind::Animation,
                file_id: "GIF123".into(),
                quote: true,
            }
        );
    }

    #[tokio::test]
    async fn test_commands_and_media_never_match() {
        let dir = tempdir().unwrap();
        let (matcher, repo) = matcher(dir.path());
        repo.add("/start", ResponseKind::Text, "nope", 1).await;

        assert!(matcher.respond(&message("/start")).await.is_none());
        assert!(matcher.respond(&message("unknown")).await.is_none());

        let mut photo = message("");
        photo.content = Content::Media {
            kind: ResponseKind::Photo,
            file_id: "x".into(),
        };
        assert!(matcher.respond(&photo).await.is_none());
    }
}
