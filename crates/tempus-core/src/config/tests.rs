//! Tests for configuration module.

use super::*;

fn environment_with(vars: &[(&str, &str)]) -> Environment {
    let vars = vars
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    environment().source(Some(vars))
}

#[test_log::test]
fn test_defaults_apply_without_sources() {
    tracing::debug!("Loading settings from an empty document");

    let settings = Settings::from_toml("").unwrap();

    assert_eq!(settings.parser.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_toml_overrides_defaults() {
    let settings = Settings::from_toml(
        r#"
        [parser]
        max_depth = 4

        [logging]
        level = "trace"
        "#,
    )
    .unwrap();

    assert_eq!(settings.parser, ParserSettings { max_depth: 4 });
    assert_eq!(settings.logging.level, "trace");
}

#[test]
fn test_zero_depth_is_rejected() {
    let err = Settings::from_toml("[parser]\nmax_depth = 0\n").unwrap_err();

    assert!(err.to_string().contains("max_depth"));
}

#[test]
fn test_parser_settings_default() {
    let settings = ParserSettings::default();

    assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
    assert!(settings.validate().is_ok());
}

#[test_log::test]
fn test_environment_overrides_defaults() {
    let settings = Settings::layered(environment_with(&[
        ("TEMPUS_PARSER__MAX_DEPTH", "7"),
        ("TEMPUS_LOGGING__LEVEL", "tempus_spec=trace"),
        ("OTHER_PARSER__MAX_DEPTH", "99"),
    ]))
    .unwrap();

    assert_eq!(settings.parser.max_depth, 7);
    assert_eq!(settings.logging.level, "tempus_spec=trace");
}

#[test]
fn test_environment_is_validated() {
    let err = Settings::layered(environment_with(&[("TEMPUS_PARSER__MAX_DEPTH", "0")]))
        .unwrap_err();

    assert!(err.to_string().contains("max_depth"));
}

#[test]
fn test_logging_level_builds_a_filter() {
    let logging = LoggingConfig {
        level: "info,tempus_spec=trace".to_string(),
    };
    assert!(logging.filter().is_ok());

    let err = Settings::from_toml("[logging]\nlevel = \"tempus_spec=loud\"\n").unwrap_err();
    assert!(err.to_string().contains("logging.level"));
}
