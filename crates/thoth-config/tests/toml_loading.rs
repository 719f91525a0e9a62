//! Integration tests for layered configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use thoth_config::{ConfigError, ThothConfig};

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[index]
db_path = "build/graph.db"

[regions]
allow_nesting = true
begin_marker = "GOV:BEGIN"
end_marker = "GOV:END"

[symbols]
rename_threshold = 0.75

[pipeline]
workers = 4
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(ThothConfig::default()))
            .merge(Toml::file("config.toml"));
        let config = ThothConfig::from_figment(&figment).expect("valid config");

        assert_eq!(config.index.db_path, "build/graph.db");
        assert!(config.regions.allow_nesting);
        assert_eq!(config.regions.begin_marker, "GOV:BEGIN");
        assert!((config.symbols.rename_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.general.default_limit, 20);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[general]\ndefault_limit = 5\n")?;
        jail.set_env("THOTH_GENERAL__DEFAULT_LIMIT", "50");

        let figment = Figment::from(Serialized::defaults(ThothConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("THOTH_").split("__"));
        let config = ThothConfig::from_figment(&figment).expect("valid config");

        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn project_config_is_discovered_under_dot_thoth() {
    Jail::expect_with(|jail| {
        jail.create_dir(".thoth")?;
        jail.create_file(".thoth/config.toml", "[pipeline]\nfile_timeout_ms = 750\n")?;

        let config = ThothConfig::load(jail.directory()).expect("valid config");
        assert_eq!(config.pipeline.file_timeout_ms, 750);
        Ok(())
    });
}

#[test]
fn rejects_out_of_range_rename_threshold() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[symbols]\nrename_threshold = 1.5\n")?;

        let figment = Figment::from(Serialized::defaults(ThothConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = ThothConfig::from_figment(&figment).expect_err("threshold out of range");

        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "symbols.rename_threshold"
        ));
        Ok(())
    });
}

#[test]
fn rejects_identical_markers() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            "[regions]\nbegin_marker = \"X\"\nend_marker = \"X\"\n",
        )?;

        let figment = Figment::from(Serialized::defaults(ThothConfig::default()))
            .merge(Toml::file("config.toml"));
        assert!(ThothConfig::from_figment(&figment).is_err());
        Ok(())
    });
}

#[test]
fn rejects_markers_containing_each_other() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            "[regions]\nbegin_marker = \"REGION\"\nend_marker = \"REGION_END\"\n",
        )?;

        let figment = Figment::from(Serialized::defaults(ThothConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = ThothConfig::from_figment(&figment).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "regions.end_marker"
        ));
        Ok(())
    });
}
