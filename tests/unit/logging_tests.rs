// Logging tests: filter parsing and subscriber installation

use utsushi::config::LogFormat;
use utsushi::logging::{build_filter, init_subscriber, LoggingError};

#[test]
fn test_default_filter_is_info() {
    let filter = build_filter(None).expect("default filter should build");
    assert_eq!(filter.to_string(), "info");

    let blank = build_filter(Some("   ")).expect("blank filter should fall back");
    assert_eq!(blank.to_string(), "info");
}

#[test]
fn test_module_directives_are_accepted() {
    assert!(build_filter(Some("utsushi=debug,hyper=warn")).is_ok());
}

#[test]
fn test_invalid_directive_reports_it() {
    let err = build_filter(Some("utsushi=loud")).unwrap_err();
    let LoggingError::InvalidFilter { directive, .. } = &err;
    assert_eq!(directive, "utsushi=loud");
    assert!(err.to_string().contains("utsushi=loud"));
}

#[test]
fn test_init_subscriber_is_idempotent() {
    assert!(init_subscriber(LogFormat::Json).is_ok());
    // A second install keeps the first subscriber and still succeeds
    assert!(init_subscriber(LogFormat::Text).is_ok());

    tracing::info!(request_id = "test", "logging after init");
}
