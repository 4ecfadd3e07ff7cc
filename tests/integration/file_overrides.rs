//! File-backed options: defaults and every kind of override

use super::test_utils::{yaml, Fixtures};
use configurable::{ConfigError, FileOptions, Handle, OptionRegistry, OptionValue, Overrides};
use serde_yaml::Mapping;

fn registry(fixtures: &Fixtures) -> OptionRegistry {
    let mut registry = OptionRegistry::new();
    registry.configure(|config| {
        config.option("flag", true);
        config.config_file(
            "config",
            fixtures.path("environment_config.yml"),
            FileOptions::default(),
        );
        config.config_file(
            "basic_config",
            fixtures.path("basic_config.yml"),
            FileOptions::default()
                .environment_based(false)
                .keys(["foo", "bar"]),
        );
    });
    registry
}

fn overriding(name: &str, value: impl Into<OptionValue>) -> Overrides {
    let mut overrides = Overrides::new();
    overrides.insert(name.to_string(), value.into());
    overrides
}

#[test]
fn test_file_defaults_are_loaded() {
    let fixtures = Fixtures::new();
    let config = registry(&fixtures)
        .load_configuration("production", &Overrides::new())
        .unwrap();

    assert_eq!(
        config.value("config"),
        Some(&yaml("{foo: production, bar: prod_value}"))
    );
    assert_eq!(
        config.value("basic_config"),
        Some(&yaml("{foo: foo value, bar: bar value}"))
    );
}

#[test]
fn test_alternate_filename_override() {
    let fixtures = Fixtures::new();
    let registry = registry(&fixtures);

    let overrides = overriding("config", fixtures.path_str("alternate_config.yml"));
    let config = registry.load_configuration("production", &overrides).unwrap();
    assert_eq!(config.value("config"), Some(&yaml("{foo: alt, bar: prod}")));

    // A later resolution without overrides uses the declared path again.
    let config = registry
        .load_configuration("production", &Overrides::new())
        .unwrap();
    assert_eq!(
        config.value("config"),
        Some(&yaml("{foo: production, bar: prod_value}"))
    );
    let file = registry
        .get("config")
        .and_then(|d| d.as_config_file())
        .unwrap();
    assert_eq!(file.path(), fixtures.path("environment_config.yml"));
}

#[test]
fn test_alternate_filename_for_basic_config() {
    let fixtures = Fixtures::new();
    let overrides = overriding("basic_config", fixtures.path_str("alternate_config.yml"));
    // The alternate document has neither foo nor bar at the top level.
    let err = registry(&fixtures)
        .load_configuration("production", &overrides)
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "foo"));
}

#[test]
fn test_alternate_environment_override() {
    let fixtures = Fixtures::new();
    let config = registry(&fixtures)
        .load_configuration("production", &overriding("config", "test"))
        .unwrap();
    assert_eq!(
        config.value("config"),
        Some(&yaml("{foo: test, bar: test_value}"))
    );
}

#[test]
fn test_missing_alternate_environment() {
    let fixtures = Fixtures::new();
    let err = registry(&fixtures)
        .load_configuration("production", &overriding("config", "development"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::EnvironmentNotFound { .. }));
    let msg = err.to_string();
    assert!(msg.contains("development"));
    assert!(msg.contains("environment_config.yml"));
}

#[test]
fn test_mapping_override() {
    let fixtures = Fixtures::new();
    let mut map = Mapping::new();
    map.insert("foo".into(), "lol".into());
    map.insert("what".into(), "no way".into());

    let config = registry(&fixtures)
        .load_configuration("production", &overriding("config", map))
        .unwrap();
    let resolved = config.file("config").unwrap();
    assert_eq!(*resolved, yaml("{foo: lol, what: no way}"));
    assert!(resolved.is_detached());
    assert!(matches!(
        resolved.alternate("test"),
        Err(ConfigError::NotEnvironmentBased)
    ));
}

#[test]
fn test_null_and_false_clear_the_option() {
    let fixtures = Fixtures::new();
    let registry = registry(&fixtures);

    for cleared in [OptionValue::null(), OptionValue::from(false)] {
        let config = registry
            .load_configuration("production", &overriding("config", cleared))
            .unwrap();
        assert!(config.is_absent("config"));
        assert!(config.value("config").is_none());
        assert!(config.get("config").is_some());
    }
}

#[test]
fn test_invalid_override_for_file_option() {
    let fixtures = Fixtures::new();
    let registry = registry(&fixtures);

    let err = registry
        .load_configuration("production", &overriding("config", 42i64))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOverride { ref option, .. } if option == "config"));
    assert!(err.to_string().starts_with("invalid override for config:"));

    let err = registry
        .load_configuration("production", &overriding("config", Handle::new(1u8)))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOverride { .. }));
}

#[test]
fn test_required_key_missing() {
    let fixtures = Fixtures::new();
    let mut registry = OptionRegistry::new();
    registry.config_file(
        "basic_config",
        fixtures.path("invalid_basic_config.yml"),
        FileOptions::default()
            .environment_based(false)
            .keys(["foo", "bar"]),
    );

    let err = registry
        .load_configuration("env", &Overrides::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "bar"));
    assert!(err.to_string().contains("bar"));
}

#[test]
fn test_missing_default_file() {
    let mut registry = OptionRegistry::new();
    registry.config_file("config", "nowhere/config.yml", FileOptions::default());
    let err = registry
        .load_configuration("production", &Overrides::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn test_files_are_reread_each_resolution() {
    let fixtures = Fixtures::new();
    let registry = registry(&fixtures);
    registry
        .load_configuration("production", &Overrides::new())
        .unwrap();

    std::fs::write(
        fixtures.path("environment_config.yml"),
        "production:\n  foo: rewritten\n",
    )
    .unwrap();

    let config = registry
        .load_configuration("production", &Overrides::new())
        .unwrap();
    assert_eq!(config.value("config"), Some(&yaml("{foo: rewritten}")));
}

#[test]
fn test_required_keys_on_environment_based_file() {
    let fixtures = Fixtures::new();
    std::fs::write(
        fixtures.path("partial_env.yml"),
        "production:\n  foo: production\ntest:\n  foo: test\n  bar: test_value\n",
    )
    .unwrap();
    let mut registry = OptionRegistry::new();
    registry.config_file(
        "config",
        fixtures.path("partial_env.yml"),
        FileOptions::default().keys(["foo", "bar"]),
    );

    let err = registry
        .load_configuration("production", &Overrides::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "bar"));

    let config = registry
        .load_configuration("test", &Overrides::new())
        .unwrap();
    assert_eq!(
        config.value("config"),
        Some(&yaml("{foo: test, bar: test_value}"))
    );
}

#[test]
fn test_environment_override_matching_a_directory() {
    // Integration tests run from the package root, where `src/` is a directory.
    assert!(std::path::Path::new("src").is_dir());
    let fixtures = Fixtures::new();
    std::fs::write(
        fixtures.path("dir_env.yml"),
        "production:\n  foo: 1\nsrc:\n  foo: 2\n",
    )
    .unwrap();
    let mut registry = OptionRegistry::new();
    registry.config_file("config", fixtures.path("dir_env.yml"), FileOptions::default());

    let config = registry
        .load_configuration("production", &overriding("config", "src"))
        .unwrap();
    assert_eq!(config.value("config"), Some(&yaml("{foo: 2}")));
}
