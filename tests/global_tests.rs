//! Process-wide default configuration
//!
//! Kept in its own test binary: the default is fixed on first read, so the
//! whole lifecycle is exercised by a single test.

use rust_logger_core::config::global;
use rust_logger_core::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_default_configuration_lifecycle() {
    let memory = MemoryLogProvider::new();
    let handle = memory.clone();
    let mut registry = ProviderRegistry::new();
    registry.register_provider("memory", move |_| Ok(handle.clone()));

    let configuration = LoggingConfiguration::builder(ConfigSection::root(json!([
        { "providers": "memory" },
        { "name": "audit", "level": "Audit", "providers": "memory" }
    ])))
    .registry(registry)
    .build();

    assert!(!global::is_configuration_locked());
    tokio_test::assert_ok!(global::set_configuration(configuration.clone()));

    let default = global::default_logger().expect("default logger is defined");
    assert!(global::is_configuration_locked());
    assert!(global::configuration().ptr_eq(&configuration));

    // Fixed once read
    let err = tokio_test::assert_err!(global::set_configuration(LoggingConfiguration::new(
        ConfigSection::empty()
    )));
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

    assert!(Arc::ptr_eq(&default, &global::get_cached(DEFAULT_LOGGER_NAME).unwrap()));
    assert!(!Arc::ptr_eq(&default, &global::create(DEFAULT_LOGGER_NAME).unwrap()));

    let audit = global::get_cached("audit").unwrap();
    assert!(!audit.is_enabled(LogLevel::Fatal));
    audit
        .log(LogEntry::new(LogLevel::Audit, "login"), Some(DispatchMode::Blocking), None)
        .await
        .unwrap();
    default
        .log(LogEntry::new(LogLevel::Debug, "started"), Some(DispatchMode::Blocking), None)
        .await
        .unwrap();

    assert_eq!(memory.messages(), vec!["login", "started"]);
    assert!(matches!(
        global::get_cached("missing"),
        Err(LoggerError::LoggerNotFound { .. })
    ));
}
