//! Tests for scope resolution

use std::time::Duration;

use prometheus_admission::config::SchedulerSettings;
use prometheus_admission::core::{ChatId, ScopeKey, ScopeKind};

#[test]
fn test_numeric_chat_ids_keep_their_key() {
    assert_eq!(ScopeKey::from(ChatId::Id(123_456)), ScopeKey::new(123_456));
    assert_eq!(ScopeKey::from(ChatId::Id(-100_200)), ScopeKey::new(-100_200));
}

#[test]
fn test_usernames_resolve_to_group_scope() {
    let key = ScopeKey::from(ChatId::from("@SomeChannel"));
    assert_eq!(key.kind(), ScopeKind::Group);
    assert_eq!(key, ScopeKey::from("somechannel"));
}

#[test]
fn test_interval_by_kind() {
    let settings = SchedulerSettings::default();
    assert_eq!(ScopeKey::GENERAL.interval(&settings), Duration::from_millis(34));
    assert_eq!(ScopeKey::new(7).interval(&settings), Duration::from_millis(1000));
    assert_eq!(ScopeKey::new(-7).interval(&settings), Duration::from_millis(3000));
}

#[test]
fn test_chat_id_deserializes_untagged() {
    let id: ChatId = serde_json::from_str("42").unwrap();
    assert_eq!(id, ChatId::Id(42));
    let name: ChatId = serde_json::from_str(r#""@bot_news""#).unwrap();
    assert_eq!(name, ChatId::Username("@bot_news".to_string()));
}

#[test]
fn test_scope_key_display_is_raw_number() {
    assert_eq!(ScopeKey::new(-15).to_string(), "-15");
    assert_eq!(serde_json::to_string(&ScopeKey::new(9)).unwrap(), "9");
}
