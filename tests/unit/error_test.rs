//! Tests for error types

use prometheus_admission::core::{AppResult, SchedulerError};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("general_interval_ms must be greater than 0".to_string());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: general_interval_ms must be greater than 0"
    );
}

#[test]
fn test_cancelled_error() {
    assert_eq!(format!("{}", SchedulerError::Cancelled), "admission cancelled");
}

#[test]
fn test_closed_error() {
    assert_eq!(format!("{}", SchedulerError::Closed), "scheduler closed");
}

#[test]
fn test_spawn_error() {
    let err = SchedulerError::Spawn("resource temporarily unavailable".to_string());
    assert_eq!(
        format!("{err}"),
        "failed to start sweeper: resource temporarily unavailable"
    );
}

#[test]
fn test_converts_into_app_result() {
    fn admit() -> AppResult<()> {
        Err(SchedulerError::Closed)?;
        Ok(())
    }
    let err = admit().unwrap_err();
    assert_eq!(
        err.downcast_ref::<SchedulerError>(),
        Some(&SchedulerError::Closed)
    );
}
