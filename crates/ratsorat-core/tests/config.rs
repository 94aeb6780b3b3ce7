use ratsorat_core::config::ResolverConfig;

#[test]
fn test_resolver_config_defaults() {
    let config = ResolverConfig::default();
    assert_eq!(config.max_passes, 1024);
    assert!(config.max_concurrency.is_none());
}

#[test]
fn test_resolver_config_empty_toml_uses_defaults() {
    let config = ResolverConfig::from_toml_str("").unwrap();
    assert_eq!(config, ResolverConfig::default());
}

#[test]
fn test_resolver_config_parse_from_toml() {
    let toml = r#"
max-passes = 8
max-concurrency = 2
"#;
    let config = ResolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.max_passes, 8);
    assert_eq!(config.max_concurrency, Some(2));
}

#[test]
fn test_resolver_config_rejects_zero_passes() {
    let err = ResolverConfig::from_toml_str("max-passes = 0").unwrap_err();
    assert!(err.to_string().contains("max-passes"), "got: {err}");
}

#[test]
fn test_resolver_config_rejects_zero_concurrency() {
    let err = ResolverConfig::from_toml_str("max-concurrency = 0").unwrap_err();
    assert!(err.to_string().contains("max-concurrency"), "got: {err}");
}

#[test]
fn test_resolver_config_rejects_malformed_toml() {
    let err = ResolverConfig::from_toml_str("max-passes = \"many\"").unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"), "got: {err}");
}

#[test]
fn test_resolver_config_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ResolverConfig::load(&dir.path().join("ratsorat.toml")).unwrap();
    assert_eq!(config, ResolverConfig::default());
}

#[test]
fn test_resolver_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratsorat.toml");
    std::fs::write(&path, "max-passes = 3\n").unwrap();
    let config = ResolverConfig::load(&path).unwrap();
    assert_eq!(config.max_passes, 3);
}

#[test]
fn test_resolver_config_from_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = ResolverConfig::from_path(&dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_resolver_config_validate_struct_literal() {
    let config = ResolverConfig {
        max_passes: 4,
        max_concurrency: Some(0),
    };
    let err = config.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: max-concurrency must be at least 1"
    );
    assert!(ResolverConfig::default().validate().is_ok());
}
