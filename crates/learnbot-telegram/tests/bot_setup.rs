//! Startup and button wiring, without talking to Telegram.

use std::path::Path;
use std::sync::Arc;

use chrono::FixedOffset;
use learnbot_core::{Action, BotConfig, BotIdentity, Dialogue, DialogueOptions, Localizer, Sender};
use learnbot_models::ResponseKind;
use learnbot_persistence::{JsonAdminStore, JsonTriggerStore, TriggerStore};
use learnbot_telegram::callback::{decode, encode};
use learnbot_telegram::handlers::markup;
use learnbot_telegram::{TelegramBot, TelegramError};
use tempfile::tempdir;

fn config(dir: &Path) -> BotConfig {
    BotConfig {
        token: "123:TEST".to_string(),
        super_admin_id: Some(1),
        utc_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        default_language: "en".to_string(),
        data_dir: dir.join("data"),
        locales_dir: dir.join("locales"),
    }
}

#[tokio::test]
async fn test_new_bot_creates_data_dir_lazily() {
    let dir = tempdir().unwrap();
    assert!(TelegramBot::new(config(dir.path())).is_ok());
}

#[tokio::test]
async fn test_malformed_locale_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("locales")).unwrap();
    std::fs::write(dir.path().join("locales/en.json"), "{ not json").unwrap();

    match TelegramBot::new(config(dir.path())) {
        Err(TelegramError::Config(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("malformed locale file accepted"),
    }
}

#[tokio::test]
async fn test_delete_browser_buttons_survive_the_wire() {
    let dir = tempdir().unwrap();
    let triggers = Arc::new(JsonTriggerStore::open(dir.path().join("triggers.json")).unwrap());
    let long = "a".repeat(100);
    let cyrillic = "привет".repeat(5);
    let mut texts: Vec<String> = (0..7).map(|i| format!("trigger {}", i)).collect();
    texts[1] = long.clone();
    texts[2] = cyrillic.clone();
    for text in &texts {
        let record = learnbot_models::TriggerRecord::new(text, ResponseKind::Text, "hi", 1);
        triggers.insert(record).await.unwrap();
    }
    triggers
        .insert(learnbot_models::TriggerRecord::new("trigger 7", ResponseKind::Text, "hi", 1))
        .await
        .unwrap();

    let admins = Arc::new(JsonAdminStore::open(dir.path().join("admins.json")).unwrap());
    let dialogue = Dialogue::new(
        triggers.clone(),
        admins,
        Localizer::builtin("en"),
        DialogueOptions {
            super_admin: Some(1),
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            bot: BotIdentity::default(),
        },
    );
    let admin = Sender::new(1, "Root");

    let replies = dialogue.delete_trigger(&admin).await;
    let keyboard = replies[0].keyboard().unwrap();
    let actions: Vec<Action> = keyboard.buttons().map(|b| b.action.clone()).collect();
    for action in &actions {
        assert_eq!(decode(&encode(action)).as_ref(), Some(action));
    }
    assert!(actions.contains(&Action::Page(1)));

    let rows = markup(keyboard).inline_keyboard;
    assert_eq!(rows.iter().map(Vec::len).sum::<usize>(), actions.len());

    // Delete the 100-character trigger through its wire payload.
    let pressed = decode(&encode(&Action::SelectTrigger(1))).unwrap();
    dialogue.handle_action(&admin, pressed).await;
    dialogue.handle_action(&admin, Action::ConfirmDelete).await;
    assert!(!triggers.contains(&long).await.unwrap());

    // The list shifts after a delete; the Cyrillic trigger is now second.
    dialogue.delete_trigger(&admin).await;
    dialogue.handle_action(&admin, Action::SelectTrigger(1)).await;
    dialogue.handle_action(&admin, Action::ConfirmDelete).await;
    assert!(!triggers.contains(&cyrillic).await.unwrap());
    assert!(triggers.contains("trigger 0").await.unwrap());
}
