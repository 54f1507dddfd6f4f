//! Integration tests for logging system

use core_runtime::logging::{LogFormat, LogLevel, LoggingConfig};

#[test]
fn test_logging_configuration() {
    // We can only initialize once per process, so we test the config builder

    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_spans(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(config.enable_spans);
}

#[test]
fn test_format_selection() {
    // Debug builds should default to Pretty
    #[cfg(debug_assertions)]
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
    }

    // Release builds should default to JSON
    #[cfg(not(debug_assertions))]
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
    }
}

#[test]
fn test_filter_configuration() {
    let config = LoggingConfig::default().with_filter("core_sync=trace,sqlx=warn");

    assert_eq!(config.filter, Some("core_sync=trace,sqlx=warn".to_string()));
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
}
