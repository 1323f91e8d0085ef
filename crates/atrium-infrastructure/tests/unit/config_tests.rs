//! Tests for configuration loading and validation

use atrium_domain::{CachePolicy, CacheTiming, KeyKind};
use atrium_infrastructure::config::{AppConfig, CacheConfig, ConfigBuilder, ConfigLoader};
use figment::Jail;

fn load() -> figment::error::Result<AppConfig> {
    ConfigLoader::new().load().map_err(|e| e.to_string().into())
}

#[test]
fn test_defaults_without_file_or_env() {
    Jail::expect_with(|_jail| {
        let config = load()?;

        assert!(config.cache.enabled);
        assert_eq!(config.cache.default_ttl_secs, 300);
        assert!(!config.cache.distributed.enabled);
        assert!(config.cache.sync.load_on_start);
        assert!(config.cache.policies.is_empty());
        assert_eq!(config.logging.level, "info");
        Ok(())
    });
}

#[test]
fn test_policies_load_from_toml_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "atrium.toml",
            r#"
            [cache]
            default_ttl_secs = 120

            [[cache.policies]]
            type_name = "Widget"
            ttl_secs = 60
            backing_source_type = "widgets"
            cache_timing = "on_application_start"
            key_kind = "integer"

            [[cache.policies]]
            type_name = "Tag"
            use_sliding_expiration = true
            "#,
        )?;

        let config = load()?;

        assert_eq!(config.cache.default_ttl_secs, 120);
        assert_eq!(config.cache.policies.len(), 2);
        let widget = &config.cache.policies[0];
        assert_eq!(widget.backing_source(), Some("widgets"));
        assert_eq!(widget.cache_timing, CacheTiming::OnApplicationStart);
        assert_eq!(widget.key_kind, KeyKind::Integer);
        assert!(widget.remove_on_delete);
        assert!(config.cache.policies[1].use_sliding_expiration);
        Ok(())
    });
}

#[test]
fn test_environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("atrium.toml", "[cache]\ndefault_ttl_secs = 120\n")?;
        jail.set_env("ATRIUM_CACHE__DEFAULT_TTL_SECS", "42");
        jail.set_env("ATRIUM_CACHE__DISTRIBUTED__KEY_PREFIX", "backoffice");
        jail.set_env("ATRIUM_LOGGING__JSON_FORMAT", "true");

        let config = load()?;

        assert_eq!(config.cache.default_ttl_secs, 42);
        assert_eq!(config.cache.distributed.key_prefix, "backoffice");
        assert!(config.logging.json_format);
        Ok(())
    });
}

#[test]
fn test_explicit_missing_path_falls_back_to_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("atrium.toml", "[cache]\ndefault_ttl_secs = 120\n")?;

        let loader = ConfigLoader::new().with_config_path("missing.toml");
        let config = loader.load().map_err(|e| e.to_string())?;

        assert_eq!(loader.config_path().unwrap().to_str(), Some("missing.toml"));
        assert_eq!(config.cache.default_ttl_secs, 300);
        Ok(())
    });
}

#[test]
fn test_custom_env_prefix() {
    Jail::expect_with(|jail| {
        jail.set_env("BACKOFFICE_CACHE__ENABLED", "false");

        let config = ConfigLoader::new()
            .with_env_prefix("BACKOFFICE")
            .load()
            .map_err(|e| e.to_string())?;

        assert!(!config.cache.enabled);
        Ok(())
    });
}

#[test]
fn test_zero_ttl_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("ATRIUM_CACHE__DEFAULT_TTL_SECS", "0");
        assert!(load().is_err());
        Ok(())
    });
}

#[test]
fn test_distributed_tier_requires_url() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "atrium.toml",
            "[cache.distributed]\nenabled = true\nredis_url = \" \"\n",
        )?;
        let message = load().unwrap_err().to_string();
        assert!(message.contains("Redis URL"), "unexpected error: {message}");
        Ok(())
    });
}

#[test]
fn test_invalid_log_level_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("ATRIUM_LOGGING__LEVEL", "loud");
        assert!(load().is_err());
        Ok(())
    });
}

#[test]
fn test_duplicate_policies_are_rejected() {
    let result = ConfigBuilder::new()
        .with_policy(CachePolicy::new("Widget"))
        .with_policy(CachePolicy::new("Widget "))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_zero_page_size_is_rejected() {
    let mut cache = CacheConfig::default();
    cache.sync.page_size = 0;
    assert!(ConfigBuilder::new().with_cache(cache).build().is_err());
}

#[test]
fn test_save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atrium.toml");
    let config = ConfigBuilder::new()
        .with_policy(
            CachePolicy::new("Widget")
                .with_ttl_secs(60)
                .with_backing_source("widgets")
                .with_mapped_fields(["id", "name"]),
        )
        .build()
        .unwrap();

    let loader = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_prefix("ATRIUM_ROUND_TRIP");
    loader.save_to_file(&config, &path).unwrap();
    let loaded = loader.load().unwrap();

    assert_eq!(loaded, config);
}
