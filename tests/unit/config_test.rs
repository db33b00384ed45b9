//! Tests for configuration validation

use std::time::Duration;

use prometheus_admission::config::settings::ENV_SWEEP_EVENT_LIMIT;
use prometheus_admission::config::SchedulerSettings;

#[test]
fn test_defaults_match_platform_limits() {
    let settings = SchedulerSettings::default();
    assert_eq!(settings.general_interval(), Duration::from_millis(34));
    assert_eq!(settings.private_chat_interval(), Duration::from_millis(1000));
    assert_eq!(settings.group_chat_interval(), Duration::from_millis(3000));
    assert_eq!(settings.reset_threshold_duration(), Duration::from_millis(170));
    assert!(settings.validate().is_ok());
}

#[test]
fn test_new_validates() {
    assert!(SchedulerSettings::new(
        Duration::from_millis(10),
        Duration::from_millis(100),
        Duration::from_millis(200),
    )
    .is_ok());
    assert!(SchedulerSettings::new(
        Duration::ZERO,
        Duration::from_millis(100),
        Duration::from_millis(200),
    )
    .is_err());
}

#[test]
fn test_scope_interval_shorter_than_general_rejected() {
    let settings = SchedulerSettings::default().with_group_chat_interval(Duration::from_millis(20));
    let err = settings.validate().unwrap_err();
    assert!(err.contains("group_chat_interval_ms"));
}

#[test]
fn test_zero_limits_rejected() {
    assert!(SchedulerSettings::default()
        .with_reset_threshold(0)
        .validate()
        .is_err());
    assert!(SchedulerSettings::default()
        .with_sweep_event_limit(0)
        .validate()
        .is_err());
}

#[test]
fn test_partial_json_fills_defaults() {
    let settings = SchedulerSettings::from_json_str(r#"{"private_chat_interval_ms": 1500}"#).unwrap();
    assert_eq!(settings.private_chat_interval(), Duration::from_millis(1500));
    assert_eq!(settings.general_interval(), Duration::from_millis(34));
    assert_eq!(settings.sweep_event_limit, 1000);
}

#[test]
fn test_invalid_json_values_rejected() {
    assert!(SchedulerSettings::from_json_str(r#"{"general_interval_ms": 0}"#).is_err());
    assert!(SchedulerSettings::from_json_str("not json").is_err());
}

#[test]
fn test_settings_serialize_round_trip() {
    let settings = SchedulerSettings::default().with_reset_threshold(8);
    let json = serde_json::to_string(&settings).unwrap();
    assert_eq!(SchedulerSettings::from_json_str(&json).unwrap(), settings);
}

#[test]
fn test_from_env_reports_bad_numbers() {
    std::env::set_var(ENV_SWEEP_EVENT_LIMIT, "lots");
    let result = SchedulerSettings::from_env();
    std::env::remove_var(ENV_SWEEP_EVENT_LIMIT);
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains(ENV_SWEEP_EVENT_LIMIT));
}
