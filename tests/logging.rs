//! File sinks of the global subscriber.
//!
//! Kept in its own test binary: installing the global subscriber is a
//! one-shot per process.

use steadfast::config::Settings;
use steadfast::logging::{init_from_settings, COMBINED_LOG, ERROR_LOG};

#[test]
fn errors_reach_both_files_and_info_only_combined() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let settings = Settings::from_lookup(|key| match key {
        "LOG_LEVEL" => Some("info".to_string()),
        "LOG_DIR" => log_dir.to_str().map(str::to_string),
        _ => None,
    })
    .unwrap();

    let guards = init_from_settings(&settings).unwrap();
    tracing::info!("navigating to storefront");
    tracing::error!("all attempts exhausted");
    drop(guards);

    let combined = std::fs::read_to_string(settings.log_dir.join(COMBINED_LOG)).unwrap();
    let errors = std::fs::read_to_string(settings.log_dir.join(ERROR_LOG)).unwrap();

    assert!(combined.contains("navigating to storefront"));
    assert!(combined.contains("all attempts exhausted"));
    assert!(errors.contains("all attempts exhausted"));
    assert!(!errors.contains("navigating to storefront"));
    assert!(combined.contains("INFO"));
    assert!(errors.contains("ERROR"));
}
